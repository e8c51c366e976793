//! Domain models for pricing calculations.
//!
//! Options describe what a customer picked, policies describe what the
//! business charges, and a breakdown is the derived result of the two.

use std::collections::{BTreeMap, BTreeSet};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::errors::InvalidOption;

/// Length of an advertising slot in seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpotDuration(pub u32);

impl SpotDuration {
    pub fn seconds(self) -> u32 {
        self.0
    }
}

/// How the customer expressed the number of locations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocationSelector {
    /// Discrete bracket tag such as "2-5" or "11+"
    Tier(String),
    /// Raw location count. Values below 1 are clamped to 1.
    Count(i64),
}

/// Contract commitment length
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContractTerm {
    /// 6 month commitment, standard rate
    Short,
    /// 12 month commitment, discounted
    Long,
}

impl ContractTerm {
    pub fn months(self) -> u32 {
        match self {
            ContractTerm::Short => 6,
            ContractTerm::Long => 12,
        }
    }
}

impl TryFrom<u32> for ContractTerm {
    type Error = InvalidOption;

    fn try_from(months: u32) -> Result<Self, Self::Error> {
        match months {
            6 => Ok(ContractTerm::Short),
            12 => Ok(ContractTerm::Long),
            other => Err(InvalidOption::UnsupportedContractTerm { months: other }),
        }
    }
}

/// Options selected for a single calculation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricingOptions {
    /// Required when the policy prices by duration, absent for volume pricing
    pub spot_duration: Option<SpotDuration>,
    pub location: LocationSelector,
    pub contract_term: ContractTerm,
    /// Names of enabled add-ons
    pub add_ons: BTreeSet<String>,
}

impl PricingOptions {
    pub fn new(
        spot_duration: Option<SpotDuration>,
        location: LocationSelector,
        contract_term: ContractTerm,
    ) -> Self {
        Self {
            spot_duration,
            location,
            contract_term,
            add_ons: BTreeSet::new(),
        }
    }

    pub fn with_add_on(mut self, name: impl Into<String>) -> Self {
        self.add_ons.insert(name.into());
        self
    }
}

/// Optional per-location upgrade
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddOn {
    pub label: String,
    /// Monthly surcharge per location
    pub surcharge: Decimal,
}

/// Discrete location bracket with a flat headcount and discount rate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationBracket {
    pub tag: String,
    pub min_count: u32,
    /// Inclusive upper bound, `None` for the open-ended top bracket
    #[serde(default)]
    pub max_count: Option<u32>,
    /// Number of locations billed for this bracket
    pub headcount: u32,
    pub discount_rate: Decimal,
}

impl LocationBracket {
    pub fn contains(&self, count: u32) -> bool {
        count >= self.min_count && self.max_count.map_or(true, |max| count <= max)
    }
}

/// Flat network price for an exact location count
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeStep {
    pub count: u32,
    pub price: Decimal,
}

/// Discount applied once the location count reaches `min_count`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscountThreshold {
    pub min_count: u32,
    pub discount_rate: Decimal,
}

/// How the number of locations affects the price
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LocationRule {
    /// Bracket tag gives a flat headcount and discount rate
    Brackets { brackets: Vec<LocationBracket> },
    /// Step function from count to network base price, linear past the last step
    Volume {
        steps: Vec<VolumeStep>,
        per_additional: Decimal,
    },
    /// Discount rate picked by the highest threshold reached
    Thresholds { thresholds: Vec<DiscountThreshold> },
}

impl LocationRule {
    pub fn kind(&self) -> &'static str {
        match self {
            LocationRule::Brackets { .. } => "brackets",
            LocationRule::Volume { .. } => "volume",
            LocationRule::Thresholds { .. } => "thresholds",
        }
    }
}

/// Pricing configuration for one deployed calculator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingPolicy {
    pub name: String,
    #[serde(default)]
    pub label: String,
    #[serde(default = "default_currency")]
    pub currency: String,
    /// Duration in seconds -> base price per location per month
    #[serde(default)]
    pub durations: BTreeMap<u32, Decimal>,
    pub location_rule: LocationRule,
    /// Rate taken off the unit price for the 12 month term
    pub long_term_discount_rate: Decimal,
    #[serde(default)]
    pub add_ons: BTreeMap<String, AddOn>,
}

fn default_currency() -> String {
    "USD".to_string()
}

impl PricingPolicy {
    /// Term discount rate, zero for the short term
    pub fn term_discount_rate(&self, term: ContractTerm) -> Decimal {
        match term {
            ContractTerm::Short => Decimal::ZERO,
            ContractTerm::Long => self.long_term_discount_rate,
        }
    }

    /// Whether customers pick a spot duration under this policy
    pub fn has_duration_selector(&self) -> bool {
        !self.durations.is_empty()
    }
}

/// Itemized monthly price. Amounts are exact and unrounded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceBreakdown {
    /// Base price per billed unit
    pub base_price: Decimal,
    /// Add-on surcharges per billed unit.
    ///
    /// Under volume pricing the whole network is one billed unit, so this is
    /// the surcharge times the location count (5 locations at $5 gives 25).
    pub add_on_total: Decimal,
    /// `base_price + add_on_total`.
    ///
    /// Per location for bracket and threshold pricing. Under volume pricing it
    /// is the network-wide subtotal, e.g. 275 for 5 locations, not a
    /// per-location amount.
    pub subtotal_per_location: Decimal,
    /// Locations the quote covers (bracket headcount or raw count)
    pub location_count: u32,
    /// Multiplier applied to the unit subtotal. 1 for volume pricing.
    pub billed_units: u32,
    pub term_discount_rate: Decimal,
    pub location_discount_rate: Decimal,
    pub term_discount_amount: Decimal,
    pub location_discount_amount: Decimal,
    /// Price with no discounts applied
    pub original_price: Decimal,
    pub final_price: Decimal,
    pub total_savings: Decimal,
    pub annual_savings: Decimal,
}
