//! Built-in pricing policies and policy validation.
//!
//! Three calculators have been deployed on the site, each with its own
//! numbers. They are kept here as data so the engine never forks per variant.

use std::collections::{BTreeMap, HashSet};

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::errors::PolicyError;
use super::models::{
    AddOn, DiscountThreshold, LocationBracket, LocationRule, PricingPolicy, VolumeStep,
};

pub const PEAK_TIME: &str = "peak_time";
pub const SCREEN_TAKEOVER: &str = "screen_takeover";

/// Largest price or surcharge a policy may list. Keeps every quote for up to
/// `u32::MAX` locations inside `Decimal` range.
pub const MAX_AMOUNT: Decimal = dec!(1000000000);

fn standard_durations() -> BTreeMap<u32, Decimal> {
    BTreeMap::from([(10, dec!(100)), (20, dec!(150)), (30, dec!(200))])
}

fn standard_add_ons(surcharge: Decimal) -> BTreeMap<String, AddOn> {
    BTreeMap::from([
        (
            PEAK_TIME.to_string(),
            AddOn {
                label: "Peak Time Upgrade".to_string(),
                surcharge,
            },
        ),
        (
            SCREEN_TAKEOVER.to_string(),
            AddOn {
                label: "Screen Takeover".to_string(),
                surcharge,
            },
        ),
    ])
}

fn bracket(tag: &str, min_count: u32, max_count: Option<u32>, headcount: u32, rate: Decimal) -> LocationBracket {
    LocationBracket {
        tag: tag.to_string(),
        min_count,
        max_count,
        headcount,
        discount_rate: rate,
    }
}

/// Duration pricing with discrete location brackets.
pub fn community_tiers() -> PricingPolicy {
    PricingPolicy {
        name: "community".to_string(),
        label: "Community tiers".to_string(),
        currency: "USD".to_string(),
        durations: standard_durations(),
        location_rule: LocationRule::Brackets {
            brackets: vec![
                bracket("1", 1, Some(1), 1, dec!(0)),
                bracket("2-5", 2, Some(5), 3, dec!(0.05)),
                bracket("6-10", 6, Some(10), 8, dec!(0.10)),
                bracket("11+", 11, None, 15, dec!(0.15)),
            ],
        },
        long_term_discount_rate: dec!(0.10),
        add_ons: standard_add_ons(dec!(50)),
    }
}

/// Volume pricing by raw location count, no duration selector.
pub fn volume_network() -> PricingPolicy {
    PricingPolicy {
        name: "volume".to_string(),
        label: "Network volume pricing".to_string(),
        currency: "USD".to_string(),
        durations: BTreeMap::new(),
        location_rule: LocationRule::Volume {
            steps: vec![
                VolumeStep {
                    count: 1,
                    price: dec!(75),
                },
                VolumeStep {
                    count: 2,
                    price: dec!(125),
                },
                VolumeStep {
                    count: 3,
                    price: dec!(150),
                },
            ],
            per_additional: dec!(50),
        },
        long_term_discount_rate: dec!(0.05),
        add_ons: standard_add_ons(dec!(5)),
    }
}

/// Duration pricing with count thresholds for the location discount.
pub fn threshold_network() -> PricingPolicy {
    PricingPolicy {
        name: "threshold".to_string(),
        label: "Location count discounts".to_string(),
        currency: "USD".to_string(),
        durations: standard_durations(),
        location_rule: LocationRule::Thresholds {
            thresholds: vec![
                DiscountThreshold {
                    min_count: 2,
                    discount_rate: dec!(0.05),
                },
                DiscountThreshold {
                    min_count: 6,
                    discount_rate: dec!(0.10),
                },
                DiscountThreshold {
                    min_count: 11,
                    discount_rate: dec!(0.15),
                },
            ],
        },
        long_term_discount_rate: dec!(0.10),
        add_ons: standard_add_ons(dec!(50)),
    }
}

/// All built-in policies. The first is the default.
pub fn builtin_policies() -> Vec<PricingPolicy> {
    vec![community_tiers(), volume_network(), threshold_network()]
}

impl PricingPolicy {
    /// Check the policy is internally consistent.
    pub fn validate(&self) -> Result<(), PolicyError> {
        if self.name.trim().is_empty() {
            return Err(PolicyError::MissingName);
        }
        if self.currency.trim().is_empty() {
            return Err(PolicyError::MissingCurrency {
                policy: self.name.clone(),
            });
        }

        self.validate_durations()?;
        self.check_rate("long_term_discount_rate", self.long_term_discount_rate)?;

        for (name, add_on) in &self.add_ons {
            self.check_amount(&format!("add-on '{}' surcharge", name), add_on.surcharge)?;
        }

        match &self.location_rule {
            LocationRule::Brackets { brackets } => self.validate_brackets(brackets),
            LocationRule::Volume {
                steps,
                per_additional,
            } => self.validate_volume(steps, *per_additional),
            LocationRule::Thresholds { thresholds } => self.validate_thresholds(thresholds),
        }
    }

    fn validate_durations(&self) -> Result<(), PolicyError> {
        let volume = matches!(self.location_rule, LocationRule::Volume { .. });
        match (volume, self.durations.is_empty()) {
            (true, false) => {
                return Err(PolicyError::DurationsWithVolumePricing {
                    policy: self.name.clone(),
                })
            }
            (false, true) => {
                return Err(PolicyError::MissingDurationPrices {
                    policy: self.name.clone(),
                })
            }
            _ => {}
        }

        for (seconds, price) in &self.durations {
            if *seconds == 0 {
                return Err(PolicyError::ZeroDuration {
                    policy: self.name.clone(),
                });
            }
            self.check_amount(&format!("{}s duration price", seconds), *price)?;
        }
        Ok(())
    }

    fn validate_brackets(&self, brackets: &[LocationBracket]) -> Result<(), PolicyError> {
        if brackets.is_empty() {
            return Err(PolicyError::EmptyLocationRule {
                policy: self.name.clone(),
                kind: self.location_rule.kind(),
            });
        }

        let invalid = |message: String| PolicyError::InvalidBrackets {
            policy: self.name.clone(),
            message,
        };

        let mut tags = HashSet::new();
        let mut next_min = 1;
        let last = brackets.len() - 1;

        for (i, b) in brackets.iter().enumerate() {
            if !tags.insert(b.tag.as_str()) {
                return Err(invalid(format!("bracket tag '{}' is repeated", b.tag)));
            }
            if b.min_count != next_min {
                return Err(invalid(format!(
                    "bracket '{}' starts at {} but {} was expected",
                    b.tag, b.min_count, next_min
                )));
            }
            match b.max_count {
                Some(max) if max < b.min_count => {
                    return Err(invalid(format!("bracket '{}' ends before it starts", b.tag)));
                }
                Some(max) if i == last => {
                    return Err(invalid(format!(
                        "last bracket '{}' must be open-ended, not capped at {}",
                        b.tag, max
                    )));
                }
                Some(max) => next_min = max.saturating_add(1),
                None if i != last => {
                    return Err(invalid(format!(
                        "only the last bracket may be open-ended, '{}' is not last",
                        b.tag
                    )));
                }
                None => {}
            }
            if !b.contains(b.headcount) {
                return Err(invalid(format!(
                    "bracket '{}' headcount {} is outside its range",
                    b.tag, b.headcount
                )));
            }
            self.check_rate(&format!("bracket '{}' discount_rate", b.tag), b.discount_rate)?;
        }
        Ok(())
    }

    fn validate_volume(&self, steps: &[VolumeStep], per_additional: Decimal) -> Result<(), PolicyError> {
        if steps.is_empty() {
            return Err(PolicyError::EmptyLocationRule {
                policy: self.name.clone(),
                kind: self.location_rule.kind(),
            });
        }

        let invalid = |message: String| PolicyError::InvalidVolumeSteps {
            policy: self.name.clone(),
            message,
        };

        let mut previous: Option<&VolumeStep> = None;
        for (i, step) in steps.iter().enumerate() {
            let expected = i as u32 + 1;
            if step.count != expected {
                return Err(invalid(format!(
                    "volume step {} is for {} locations, expected {}",
                    i + 1,
                    step.count,
                    expected
                )));
            }
            self.check_amount(&format!("volume price for {} locations", step.count), step.price)?;
            if let Some(prev) = previous {
                if step.price < prev.price {
                    return Err(invalid(format!(
                        "volume price for {} locations is lower than for {}",
                        step.count, prev.count
                    )));
                }
            }
            previous = Some(step);
        }

        self.check_amount("per_additional", per_additional)
    }

    fn validate_thresholds(&self, thresholds: &[DiscountThreshold]) -> Result<(), PolicyError> {
        if thresholds.is_empty() {
            return Err(PolicyError::EmptyLocationRule {
                policy: self.name.clone(),
                kind: self.location_rule.kind(),
            });
        }

        let invalid = |message: String| PolicyError::InvalidThresholds {
            policy: self.name.clone(),
            message,
        };

        let mut previous: Option<&DiscountThreshold> = None;
        for t in thresholds {
            if t.min_count == 0 {
                return Err(invalid("threshold min_count must be at least 1".to_string()));
            }
            self.check_rate(&format!("threshold {} discount_rate", t.min_count), t.discount_rate)?;
            if let Some(prev) = previous {
                if t.min_count <= prev.min_count {
                    return Err(invalid(format!(
                        "threshold {} overlaps or precedes threshold {}",
                        t.min_count, prev.min_count
                    )));
                }
                if t.discount_rate < prev.discount_rate {
                    return Err(invalid(format!(
                        "threshold {} discounts less than threshold {}",
                        t.min_count, prev.min_count
                    )));
                }
            }
            previous = Some(t);
        }
        Ok(())
    }

    fn check_amount(&self, field: &str, value: Decimal) -> Result<(), PolicyError> {
        if value < Decimal::ZERO {
            return Err(PolicyError::NegativeAmount {
                policy: self.name.clone(),
                field: field.to_string(),
                value,
            });
        }
        if value > MAX_AMOUNT {
            return Err(PolicyError::AmountTooLarge {
                policy: self.name.clone(),
                field: field.to_string(),
                value,
                max: MAX_AMOUNT,
            });
        }
        Ok(())
    }

    fn check_rate(&self, field: &str, value: Decimal) -> Result<(), PolicyError> {
        if value < Decimal::ZERO || value > Decimal::ONE {
            return Err(PolicyError::RateOutOfRange {
                policy: self.name.clone(),
                field: field.to_string(),
                value,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_policies_are_valid() {
        for policy in builtin_policies() {
            assert_eq!(policy.validate(), Ok(()), "policy {}", policy.name);
        }
    }

    #[test]
    fn test_validate_rejects_volume_with_durations() {
        let mut policy = volume_network();
        policy.durations.insert(10, dec!(100));

        assert!(matches!(
            policy.validate(),
            Err(PolicyError::DurationsWithVolumePricing { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_missing_durations() {
        let mut policy = threshold_network();
        policy.durations.clear();

        assert!(matches!(
            policy.validate(),
            Err(PolicyError::MissingDurationPrices { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_rate_out_of_range() {
        let mut policy = community_tiers();
        policy.long_term_discount_rate = dec!(1.5);

        assert!(matches!(
            policy.validate(),
            Err(PolicyError::RateOutOfRange { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_negative_surcharge() {
        let mut policy = community_tiers();
        policy.add_ons.insert(
            "discount".to_string(),
            AddOn {
                label: "Discount".to_string(),
                surcharge: dec!(-5),
            },
        );

        assert!(matches!(
            policy.validate(),
            Err(PolicyError::NegativeAmount { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_oversized_price() {
        let mut policy = threshold_network();
        policy
            .durations
            .insert(10, Decimal::from_i128_with_scale(10_i128.pow(20), 0));

        assert!(matches!(
            policy.validate(),
            Err(PolicyError::AmountTooLarge { .. })
        ));

        let mut policy = volume_network();
        policy.location_rule = LocationRule::Volume {
            steps: vec![VolumeStep {
                count: 1,
                price: dec!(75),
            }],
            per_additional: MAX_AMOUNT + dec!(1),
        };

        assert!(matches!(
            policy.validate(),
            Err(PolicyError::AmountTooLarge { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_overlapping_brackets() {
        let mut policy = community_tiers();
        policy.location_rule = LocationRule::Brackets {
            brackets: vec![
                bracket("1-3", 1, Some(3), 2, dec!(0)),
                bracket("3+", 3, None, 5, dec!(0.05)),
            ],
        };

        assert!(matches!(
            policy.validate(),
            Err(PolicyError::InvalidBrackets { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_capped_last_bracket() {
        let mut policy = community_tiers();
        policy.location_rule = LocationRule::Brackets {
            brackets: vec![bracket("1-5", 1, Some(5), 3, dec!(0))],
        };

        assert!(matches!(
            policy.validate(),
            Err(PolicyError::InvalidBrackets { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_headcount_outside_bracket() {
        let mut policy = community_tiers();
        policy.location_rule = LocationRule::Brackets {
            brackets: vec![
                bracket("1", 1, Some(1), 1, dec!(0)),
                bracket("2+", 2, None, 1, dec!(0.05)),
            ],
        };

        assert!(matches!(
            policy.validate(),
            Err(PolicyError::InvalidBrackets { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_gap_in_volume_steps() {
        let mut policy = volume_network();
        policy.location_rule = LocationRule::Volume {
            steps: vec![
                VolumeStep {
                    count: 1,
                    price: dec!(75),
                },
                VolumeStep {
                    count: 3,
                    price: dec!(150),
                },
            ],
            per_additional: dec!(50),
        };

        assert!(matches!(
            policy.validate(),
            Err(PolicyError::InvalidVolumeSteps { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_duplicate_thresholds() {
        let mut policy = threshold_network();
        policy.location_rule = LocationRule::Thresholds {
            thresholds: vec![
                DiscountThreshold {
                    min_count: 2,
                    discount_rate: dec!(0.05),
                },
                DiscountThreshold {
                    min_count: 2,
                    discount_rate: dec!(0.10),
                },
            ],
        };

        assert!(matches!(
            policy.validate(),
            Err(PolicyError::InvalidThresholds { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_empty_rule() {
        let mut policy = threshold_network();
        policy.location_rule = LocationRule::Thresholds { thresholds: vec![] };

        assert_eq!(
            policy.validate(),
            Err(PolicyError::EmptyLocationRule {
                policy: "threshold".to_string(),
                kind: "thresholds",
            })
        );
    }
}
