//! Response DTOs for pricing API endpoints.

use rust_decimal::Decimal;
use serde::Serialize;

use super::calculators::round_money;
use super::errors::PricingError;
use super::models::{LocationRule, PriceBreakdown, PricingPolicy};

/// Money value for JSON responses
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MoneyResponse {
    #[serde(with = "rust_decimal::serde::str")]
    pub amount: Decimal,
    pub currency: String,
}

impl MoneyResponse {
    pub fn new(amount: Decimal, currency: &str) -> Self {
        Self {
            amount,
            currency: currency.to_string(),
        }
    }

    /// Same amount rounded to whole currency units
    pub fn whole(&self) -> Self {
        Self {
            amount: round_money(self.amount, 0),
            currency: self.currency.clone(),
        }
    }
}

/// Exact breakdown amounts
#[derive(Debug, Clone, Serialize)]
pub struct BreakdownAmounts {
    pub base_price: MoneyResponse,
    pub add_on_total: MoneyResponse,
    pub subtotal_per_location: MoneyResponse,
    pub term_discount_amount: MoneyResponse,
    pub location_discount_amount: MoneyResponse,
    pub original_price: MoneyResponse,
    pub final_price: MoneyResponse,
    pub total_savings: MoneyResponse,
    pub annual_savings: MoneyResponse,
}

impl BreakdownAmounts {
    fn new(b: &PriceBreakdown, currency: &str) -> Self {
        Self {
            base_price: MoneyResponse::new(b.base_price, currency),
            add_on_total: MoneyResponse::new(b.add_on_total, currency),
            subtotal_per_location: MoneyResponse::new(b.subtotal_per_location, currency),
            term_discount_amount: MoneyResponse::new(b.term_discount_amount, currency),
            location_discount_amount: MoneyResponse::new(b.location_discount_amount, currency),
            original_price: MoneyResponse::new(b.original_price, currency),
            final_price: MoneyResponse::new(b.final_price, currency),
            total_savings: MoneyResponse::new(b.total_savings, currency),
            annual_savings: MoneyResponse::new(b.annual_savings, currency),
        }
    }

    fn whole(&self) -> Self {
        Self {
            base_price: self.base_price.whole(),
            add_on_total: self.add_on_total.whole(),
            subtotal_per_location: self.subtotal_per_location.whole(),
            term_discount_amount: self.term_discount_amount.whole(),
            location_discount_amount: self.location_discount_amount.whole(),
            original_price: self.original_price.whole(),
            final_price: self.final_price.whole(),
            total_savings: self.total_savings.whole(),
            annual_savings: self.annual_savings.whole(),
        }
    }
}

/// Response for a price quote
#[derive(Debug, Clone, Serialize)]
pub struct QuoteResponse {
    pub policy: String,
    pub location_count: u32,
    pub billed_units: u32,
    #[serde(with = "rust_decimal::serde::str")]
    pub term_discount_rate: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub location_discount_rate: Decimal,
    /// Unrounded amounts
    pub exact: BreakdownAmounts,
    /// Amounts rounded to whole units for display
    pub display: BreakdownAmounts,
}

impl QuoteResponse {
    pub fn new(policy: &PricingPolicy, breakdown: &PriceBreakdown) -> Self {
        let exact = BreakdownAmounts::new(breakdown, &policy.currency);
        let display = exact.whole();
        Self {
            policy: policy.name.clone(),
            location_count: breakdown.location_count,
            billed_units: breakdown.billed_units,
            term_discount_rate: breakdown.term_discount_rate,
            location_discount_rate: breakdown.location_discount_rate,
            exact,
            display,
        }
    }
}

/// Selectable add-on
#[derive(Debug, Clone, Serialize)]
pub struct AddOnResponse {
    pub name: String,
    pub label: String,
    pub surcharge: MoneyResponse,
}

/// Selectable spot duration
#[derive(Debug, Clone, Serialize)]
pub struct DurationResponse {
    pub seconds: u32,
    pub price: MoneyResponse,
}

/// Selectable location bracket
#[derive(Debug, Clone, Serialize)]
pub struct TierResponse {
    pub tag: String,
    pub headcount: u32,
    #[serde(with = "rust_decimal::serde::str")]
    pub discount_rate: Decimal,
}

/// Options a policy offers, for building a calculator form
#[derive(Debug, Clone, Serialize)]
pub struct PolicySummaryResponse {
    pub name: String,
    pub label: String,
    pub currency: String,
    pub location_rule: &'static str,
    pub durations: Vec<DurationResponse>,
    /// Empty unless the policy prices by bracket
    pub tiers: Vec<TierResponse>,
    pub term_months: Vec<u32>,
    #[serde(with = "rust_decimal::serde::str")]
    pub long_term_discount_rate: Decimal,
    pub add_ons: Vec<AddOnResponse>,
    pub is_default: bool,
}

impl PolicySummaryResponse {
    pub fn new(policy: &PricingPolicy, is_default: bool) -> Self {
        let currency = policy.currency.as_str();
        let tiers = match &policy.location_rule {
            LocationRule::Brackets { brackets } => brackets
                .iter()
                .map(|b| TierResponse {
                    tag: b.tag.clone(),
                    headcount: b.headcount,
                    discount_rate: b.discount_rate,
                })
                .collect(),
            _ => Vec::new(),
        };

        Self {
            name: policy.name.clone(),
            label: policy.label.clone(),
            currency: policy.currency.clone(),
            location_rule: policy.location_rule.kind(),
            durations: policy
                .durations
                .iter()
                .map(|(seconds, price)| DurationResponse {
                    seconds: *seconds,
                    price: MoneyResponse::new(*price, currency),
                })
                .collect(),
            tiers,
            term_months: vec![6, 12],
            long_term_discount_rate: policy.long_term_discount_rate,
            add_ons: policy
                .add_ons
                .iter()
                .map(|(name, add_on)| AddOnResponse {
                    name: name.clone(),
                    label: add_on.label.clone(),
                    surcharge: MoneyResponse::new(add_on.surcharge, currency),
                })
                .collect(),
            is_default,
        }
    }
}

/// Generic pricing error response
#[derive(Debug, Serialize)]
pub struct PricingErrorResponse {
    pub error_type: String,
    pub message: String,
}

impl From<&PricingError> for PricingErrorResponse {
    fn from(err: &PricingError) -> Self {
        Self {
            error_type: err.error_type().to_string(),
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::calculators::compute;
    use crate::pricing::models::{ContractTerm, LocationSelector, PricingOptions};
    use crate::pricing::policies::{community_tiers, volume_network};
    use rust_decimal_macros::dec;

    #[test]
    fn test_quote_response_rounds_display_only() {
        let policy = volume_network();
        let options = PricingOptions::new(None, LocationSelector::Count(3), ContractTerm::Long);
        let breakdown = compute(&options, &policy).unwrap();

        let response = QuoteResponse::new(&policy, &breakdown);

        assert_eq!(response.exact.final_price.amount, dec!(142.5));
        assert_eq!(response.display.final_price.amount, dec!(143));
        assert_eq!(response.exact.final_price.currency, "USD");
    }

    #[test]
    fn test_quote_response_serializes_amounts_as_strings() {
        let policy = volume_network();
        let options = PricingOptions::new(None, LocationSelector::Count(5), ContractTerm::Short)
            .with_add_on("screen_takeover");
        let breakdown = compute(&options, &policy).unwrap();

        let json = serde_json::to_value(QuoteResponse::new(&policy, &breakdown)).unwrap();

        assert_eq!(json["exact"]["final_price"]["amount"], "275");
        assert_eq!(json["location_count"], 5);
        assert_eq!(json["billed_units"], 1);
        assert_eq!(json["term_discount_rate"], "0");
    }

    #[test]
    fn test_policy_summary_lists_tiers_for_brackets_only() {
        let summary = PolicySummaryResponse::new(&community_tiers(), true);
        assert_eq!(summary.location_rule, "brackets");
        assert_eq!(summary.tiers.len(), 4);
        assert_eq!(summary.durations.len(), 3);
        assert_eq!(summary.add_ons.len(), 2);

        let summary = PolicySummaryResponse::new(&volume_network(), false);
        assert_eq!(summary.location_rule, "volume");
        assert!(summary.tiers.is_empty());
        assert!(summary.durations.is_empty());
    }
}
