//! Pricing calculator page

use askama::Template;
use axum::{
    extract::{Query, State},
    response::Html,
};
use rust_decimal::Decimal;

use crate::error::Result;
use crate::pricing::calculators::{compute, round_money};
use crate::pricing::models::{LocationRule, PriceBreakdown, PricingOptions, PricingPolicy};
use crate::pricing::requests::CalculatorQuery;
use crate::pricing::PricingError;
use crate::AppState;

/// Duration preselected on a fresh page, when the policy offers it
const POPULAR_DURATION: u32 = 20;

pub struct PolicyOption {
    pub name: String,
    pub label: String,
    pub selected: bool,
}

pub struct DurationOption {
    pub seconds: u32,
    pub price: String,
    pub popular: bool,
    pub selected: bool,
}

pub struct TierOption {
    pub tag: String,
    pub discount: String,
    pub selected: bool,
}

pub struct AddOnOption {
    pub name: String,
    pub label: String,
    pub surcharge: String,
    pub checked: bool,
}

/// Rendered breakdown, whole currency units
pub struct ResultView {
    pub final_price: String,
    pub total_savings: String,
    pub annual_savings: String,
    pub term_discount: String,
    pub location_discount: String,
    pub base_price: String,
    pub add_on_total: String,
    pub subtotal: String,
    pub location_count: u32,
    pub has_savings: bool,
    pub has_term_discount: bool,
    pub has_location_discount: bool,
    pub has_add_ons: bool,
}

/// Calculator page template
#[derive(Template)]
#[template(path = "pricing/calculator.html")]
struct CalculatorTemplate {
    policies: Vec<PolicyOption>,
    policy_name: String,
    policy_label: String,
    durations: Vec<DurationOption>,
    has_durations: bool,
    tiers: Vec<TierOption>,
    has_tiers: bool,
    locations: i64,
    long_term_discount: String,
    long_term_selected: bool,
    add_ons: Vec<AddOnOption>,
    result: Option<ResultView>,
    error: Option<String>,
}

/// Calculator page handler
pub async fn calculator(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Html<String>> {
    let (query, malformed) = match CalculatorQuery::from_pairs(&pairs) {
        Ok(query) => (query, None),
        Err(e) => (CalculatorQuery::default(), Some(e.to_string())),
    };

    let set = state.policies.snapshot();
    let policy = set.resolve(query.policy.as_deref())?;

    let request = with_default_selection(query, &policy).into_request();

    let outcome = PricingOptions::try_from(&request)
        .map_err(PricingError::from)
        .and_then(|options| compute(&options, &policy));

    let (result, error) = match outcome {
        Ok(breakdown) => (Some(result_view(&breakdown, &policy.currency)), malformed),
        Err(e @ PricingError::InvalidOption(_)) => {
            tracing::debug!(policy = %policy.name, error = %e, "Calculator input rejected");
            (None, Some(e.to_string()))
        }
        Err(e) => return Err(e.into()),
    };

    let currency = policy.currency.as_str();
    let template = CalculatorTemplate {
        policies: set
            .policies()
            .map(|p| PolicyOption {
                name: p.name.clone(),
                label: if p.label.is_empty() {
                    p.name.clone()
                } else {
                    p.label.clone()
                },
                selected: p.name == policy.name,
            })
            .collect(),
        policy_name: policy.name.clone(),
        policy_label: policy.label.clone(),
        durations: policy
            .durations
            .iter()
            .map(|(seconds, price)| DurationOption {
                seconds: *seconds,
                price: format_whole(*price, currency),
                popular: *seconds == POPULAR_DURATION,
                selected: request.duration == Some(*seconds),
            })
            .collect(),
        has_durations: policy.has_duration_selector(),
        tiers: match &policy.location_rule {
            LocationRule::Brackets { brackets } => brackets
                .iter()
                .map(|b| TierOption {
                    tag: b.tag.clone(),
                    discount: format_percent(b.discount_rate),
                    selected: request.tier.as_deref() == Some(b.tag.as_str()),
                })
                .collect(),
            _ => Vec::new(),
        },
        has_tiers: matches!(policy.location_rule, LocationRule::Brackets { .. }),
        locations: request.locations.unwrap_or(1).max(1),
        long_term_discount: format_percent(policy.long_term_discount_rate),
        long_term_selected: request.term_months == 12,
        add_ons: policy
            .add_ons
            .iter()
            .map(|(name, add_on)| AddOnOption {
                name: name.clone(),
                label: add_on.label.clone(),
                surcharge: format_whole(add_on.surcharge, currency),
                checked: request.add_ons.iter().any(|a| a == name),
            })
            .collect(),
        result,
        error,
    };

    Ok(Html(template.render()?))
}

/// Fill in a duration and location for a visitor who has not picked either.
///
/// Term and add-ons from the query are kept as sent.
fn with_default_selection(mut query: CalculatorQuery, policy: &PricingPolicy) -> CalculatorQuery {
    if !query.is_empty() {
        return query;
    }

    query.duration = if policy.durations.contains_key(&POPULAR_DURATION) {
        Some(POPULAR_DURATION)
    } else {
        policy.durations.keys().next().copied()
    };

    match &policy.location_rule {
        LocationRule::Brackets { brackets } => query.tier = brackets.first().map(|b| b.tag.clone()),
        _ => query.locations = Some(1),
    }

    query.policy.get_or_insert_with(|| policy.name.clone());
    query
}

fn result_view(b: &PriceBreakdown, currency: &str) -> ResultView {
    ResultView {
        final_price: format_whole(b.final_price, currency),
        total_savings: format_whole(b.total_savings, currency),
        annual_savings: format_whole(b.annual_savings, currency),
        term_discount: format_whole(b.term_discount_amount, currency),
        location_discount: format_whole(b.location_discount_amount, currency),
        base_price: format_whole(b.base_price, currency),
        add_on_total: format_whole(b.add_on_total, currency),
        subtotal: format_whole(b.subtotal_per_location, currency),
        location_count: b.location_count,
        has_savings: b.total_savings > Decimal::ZERO,
        has_term_discount: b.term_discount_amount > Decimal::ZERO,
        has_location_discount: b.location_discount_amount > Decimal::ZERO,
        has_add_ons: b.add_on_total > Decimal::ZERO,
    }
}

/// Whole-unit currency display, e.g. `$1296`
pub fn format_whole(amount: Decimal, currency: &str) -> String {
    let rounded = round_money(amount, 0).normalize();
    match currency {
        "USD" => format!("${}", rounded),
        other => format!("{} {}", rounded, other),
    }
}

/// Rate as a whole percentage, e.g. `0.15` -> `15%`
pub fn format_percent(rate: Decimal) -> String {
    format!("{}%", (rate * Decimal::ONE_HUNDRED).normalize())
}
