//! Request DTOs for pricing API endpoints.

use std::collections::BTreeSet;

use serde::Deserialize;

use super::errors::InvalidOption;
use super::models::{ContractTerm, LocationSelector, PricingOptions, SpotDuration};

/// Request to price a set of calculator options
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuoteRequest {
    /// Policy name, the registry default when omitted
    #[serde(default)]
    pub policy: Option<String>,
    /// Spot duration in seconds
    #[serde(default)]
    pub duration: Option<u32>,
    /// Location bracket tag
    #[serde(default)]
    pub tier: Option<String>,
    /// Raw location count
    #[serde(default)]
    pub locations: Option<i64>,
    #[serde(default = "default_term_months")]
    pub term_months: u32,
    #[serde(default)]
    pub add_ons: Vec<String>,
}

fn default_term_months() -> u32 {
    6
}

impl TryFrom<&QuoteRequest> for PricingOptions {
    type Error = InvalidOption;

    fn try_from(req: &QuoteRequest) -> Result<Self, Self::Error> {
        let location = match (&req.tier, req.locations) {
            (Some(_), Some(_)) => return Err(InvalidOption::ConflictingLocationSelectors),
            (Some(tag), None) => LocationSelector::Tier(tag.clone()),
            (None, Some(count)) => LocationSelector::Count(count),
            (None, None) => return Err(InvalidOption::MissingLocationSelector),
        };

        Ok(PricingOptions {
            spot_duration: req.duration.map(SpotDuration),
            location,
            contract_term: ContractTerm::try_from(req.term_months)?,
            add_ons: req
                .add_ons
                .iter()
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect::<BTreeSet<_>>(),
        })
    }
}

/// Query string for the calculator page
///
/// The page is a plain GET form, so add-on checkboxes repeat the `add_ons`
/// key. Each value may also hold a comma separated list.
#[derive(Debug, Clone, Default)]
pub struct CalculatorQuery {
    pub policy: Option<String>,
    pub duration: Option<u32>,
    pub tier: Option<String>,
    pub locations: Option<i64>,
    pub term: Option<u32>,
    pub add_ons: Vec<String>,
}

impl CalculatorQuery {
    /// Build from decoded query pairs. Unknown keys are ignored.
    pub fn from_pairs(pairs: &[(String, String)]) -> Result<Self, InvalidOption> {
        let mut query = Self::default();
        for (key, value) in pairs {
            let value = value.trim();
            match key.as_str() {
                "policy" => query.policy = non_empty(value),
                "tier" => query.tier = non_empty(value),
                "duration" => query.duration = parse_field("duration", value)?,
                "locations" => query.locations = parse_field("locations", value)?,
                "term" => query.term = parse_field("term", value)?,
                "add_ons" => query.add_ons.extend(
                    value
                        .split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(str::to_string),
                ),
                _ => {}
            }
        }
        Ok(query)
    }

    /// True when the visitor has not picked anything yet
    pub fn is_empty(&self) -> bool {
        self.duration.is_none() && self.tier.is_none() && self.locations.is_none()
    }

    pub fn into_request(self) -> QuoteRequest {
        QuoteRequest {
            policy: self.policy,
            duration: self.duration,
            tier: self.tier,
            locations: self.locations,
            term_months: self.term.unwrap_or_else(default_term_months),
            add_ons: self.add_ons,
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

fn parse_field<T: std::str::FromStr>(field: &'static str, value: &str) -> Result<Option<T>, InvalidOption> {
    if value.is_empty() {
        return Ok(None);
    }
    value
        .parse()
        .map(Some)
        .map_err(|_| InvalidOption::MalformedField {
            field,
            value: value.to_string(),
        })
}
