//! Core pricing calculation functions.
//!
//! Pure functions for pricing math - no I/O, no shared state. Every amount
//! stays exact until `round_money` is applied for display.

use rust_decimal::prelude::*;
use rust_decimal::Decimal;

use super::errors::{InvalidOption, PolicyError, PricingError};
use super::models::{
    DiscountThreshold, LocationRule, LocationSelector, PriceBreakdown, PricingOptions,
    PricingPolicy, VolumeStep,
};

const MONTHS_PER_YEAR: u32 = 12;

/// Round to specified decimal places, halves away from zero.
///
/// Whole-unit display of non-negative amounts matches what the calculator
/// page has always shown (`2.5` displays as `3`).
///
/// # Examples
/// ```
/// use rust_decimal_macros::dec;
/// use signage_pricing::pricing::round_money;
///
/// assert_eq!(round_money(dec!(2.5), 0), dec!(3));
/// assert_eq!(round_money(dec!(1295.4), 0), dec!(1295));
/// assert_eq!(round_money(dec!(1.234), 2), dec!(1.23));
/// ```
pub fn round_money(amount: Decimal, places: u32) -> Decimal {
    amount.round_dp_with_strategy(places, RoundingStrategy::MidpointAwayFromZero)
}

/// Network base price for `count` locations under a volume step function.
///
/// Listed steps price their exact count. Past the last step the price grows
/// linearly by `per_additional` per location. Returns `None` when `count`
/// falls before the first step, into a gap, or past what `Decimal` can hold.
pub fn volume_price(steps: &[VolumeStep], per_additional: Decimal, count: u32) -> Option<Decimal> {
    if let Some(step) = steps.iter().find(|s| s.count == count) {
        return Some(step.price);
    }

    let last = steps.iter().max_by_key(|s| s.count)?;
    if count > last.count {
        Decimal::from(count - last.count)
            .checked_mul(per_additional)?
            .checked_add(last.price)
    } else {
        None
    }
}

/// Discount rate of the highest threshold reached by `count`, zero if none.
pub fn threshold_discount_rate(thresholds: &[DiscountThreshold], count: u32) -> Decimal {
    thresholds
        .iter()
        .filter(|t| t.min_count <= count)
        .max_by_key(|t| t.min_count)
        .map(|t| t.discount_rate)
        .unwrap_or(Decimal::ZERO)
}

/// Clamp a raw location count to at least 1.
pub fn clamp_location_count(count: i64) -> Result<u32, InvalidOption> {
    if count < 1 {
        tracing::debug!(count, "Location count below 1, clamping to 1");
        return Ok(1);
    }
    u32::try_from(count).map_err(|_| InvalidOption::LocationCountTooLarge { count })
}

/// How the selected locations translate into billing
#[derive(Debug, Clone, PartialEq)]
struct LocationResolution {
    location_count: u32,
    billed_units: u32,
    /// Locations covered by one billed unit (add-ons are charged per location)
    locations_per_unit: u32,
    discount_rate: Decimal,
    /// Base price from the volume step function, when the rule provides one
    volume_base: Option<Decimal>,
}

fn resolve_location(
    selector: &LocationSelector,
    policy: &PricingPolicy,
) -> Result<LocationResolution, PricingError> {
    match (selector, &policy.location_rule) {
        (LocationSelector::Tier(tag), LocationRule::Brackets { brackets }) => {
            let bracket = brackets.iter().find(|b| &b.tag == tag).ok_or_else(|| {
                InvalidOption::UnknownLocationTier {
                    policy: policy.name.clone(),
                    tag: tag.clone(),
                }
            })?;
            Ok(LocationResolution {
                location_count: bracket.headcount,
                billed_units: bracket.headcount,
                locations_per_unit: 1,
                discount_rate: bracket.discount_rate,
                volume_base: None,
            })
        }
        (LocationSelector::Tier(_), _) => Err(InvalidOption::TierNotOffered {
            policy: policy.name.clone(),
        }
        .into()),
        (LocationSelector::Count(_), LocationRule::Brackets { .. }) => {
            Err(InvalidOption::CountNotOffered {
                policy: policy.name.clone(),
            }
            .into())
        }
        (
            LocationSelector::Count(raw),
            LocationRule::Volume {
                steps,
                per_additional,
            },
        ) => {
            let count = clamp_location_count(*raw)?;
            let base = volume_price(steps, *per_additional, count).ok_or_else(|| {
                PolicyError::InvalidVolumeSteps {
                    policy: policy.name.clone(),
                    message: format!("no volume price for {} locations", count),
                }
            })?;
            Ok(LocationResolution {
                location_count: count,
                billed_units: 1,
                locations_per_unit: count,
                discount_rate: Decimal::ZERO,
                volume_base: Some(base),
            })
        }
        (LocationSelector::Count(raw), LocationRule::Thresholds { thresholds }) => {
            let count = clamp_location_count(*raw)?;
            Ok(LocationResolution {
                location_count: count,
                billed_units: count,
                locations_per_unit: 1,
                discount_rate: threshold_discount_rate(thresholds, count),
                volume_base: None,
            })
        }
    }
}

/// Base price per billed unit, from the duration table or the volume step function.
fn resolve_base_price(
    options: &PricingOptions,
    policy: &PricingPolicy,
    location: &LocationResolution,
) -> Result<Decimal, InvalidOption> {
    if let Some(base) = location.volume_base {
        if options.spot_duration.is_some() {
            return Err(InvalidOption::DurationNotOffered {
                policy: policy.name.clone(),
            });
        }
        return Ok(base);
    }

    if !policy.has_duration_selector() {
        return Err(InvalidOption::DurationNotOffered {
            policy: policy.name.clone(),
        });
    }

    let duration = options
        .spot_duration
        .ok_or_else(|| InvalidOption::MissingDuration {
            policy: policy.name.clone(),
        })?;

    policy
        .durations
        .get(&duration.seconds())
        .copied()
        .ok_or_else(|| InvalidOption::UnsupportedDuration {
            policy: policy.name.clone(),
            seconds: duration.seconds(),
        })
}

/// Sum of enabled add-on surcharges for a single location.
fn add_on_surcharge_per_location(
    options: &PricingOptions,
    policy: &PricingPolicy,
) -> Result<Decimal, InvalidOption> {
    options.add_ons.iter().try_fold(Decimal::ZERO, |total, name| {
        let add_on = policy
            .add_ons
            .get(name)
            .ok_or_else(|| InvalidOption::UnknownAddOn {
                policy: policy.name.clone(),
                name: name.clone(),
            })?;
        total
            .checked_add(add_on.surcharge)
            .ok_or_else(|| InvalidOption::AmountOverflow {
                policy: policy.name.clone(),
            })
    })
}

/// Calculate the monthly price breakdown for `options` under `policy`.
///
/// The term discount comes off the unit subtotal first, then the location
/// discount comes off the aggregated total. Options are fully validated
/// before any arithmetic; no partial breakdown is ever returned. Totals too
/// large for `Decimal` are rejected as `AmountOverflow`.
pub fn compute(
    options: &PricingOptions,
    policy: &PricingPolicy,
) -> Result<PriceBreakdown, PricingError> {
    let overflow = || InvalidOption::AmountOverflow {
        policy: policy.name.clone(),
    };

    let location = resolve_location(&options.location, policy)?;
    let base_price = resolve_base_price(options, policy, &location)?;
    let add_on_total = add_on_surcharge_per_location(options, policy)?
        .checked_mul(Decimal::from(location.locations_per_unit))
        .ok_or_else(overflow)?;

    let subtotal_per_location = base_price.checked_add(add_on_total).ok_or_else(overflow)?;

    let term_discount_rate = policy.term_discount_rate(options.contract_term);
    let discounted_per_location = Decimal::ONE
        .checked_sub(term_discount_rate)
        .and_then(|keep| subtotal_per_location.checked_mul(keep))
        .ok_or_else(overflow)?;

    let units = Decimal::from(location.billed_units);
    let subtotal_aggregate = discounted_per_location
        .checked_mul(units)
        .ok_or_else(overflow)?;

    let location_discount_rate = location.discount_rate;
    let location_discount_amount = subtotal_aggregate
        .checked_mul(location_discount_rate)
        .ok_or_else(overflow)?;
    let final_price = subtotal_aggregate
        .checked_sub(location_discount_amount)
        .ok_or_else(overflow)?;

    let original_price = subtotal_per_location.checked_mul(units).ok_or_else(overflow)?;
    let term_discount_amount = subtotal_per_location
        .checked_mul(term_discount_rate)
        .and_then(|per_unit| per_unit.checked_mul(units))
        .ok_or_else(overflow)?;
    let total_savings = original_price.checked_sub(final_price).ok_or_else(overflow)?;
    let annual_savings = total_savings
        .checked_mul(Decimal::from(MONTHS_PER_YEAR))
        .ok_or_else(overflow)?;

    Ok(PriceBreakdown {
        base_price,
        add_on_total,
        subtotal_per_location,
        location_count: location.location_count,
        billed_units: location.billed_units,
        term_discount_rate,
        location_discount_rate,
        term_discount_amount,
        location_discount_amount,
        original_price,
        final_price,
        total_savings,
        annual_savings,
    })
}
