//! Pricing error types.

use rust_decimal::Decimal;

/// Option outside the set a policy permits. Rejected before any arithmetic.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidOption {
    #[error("Spot duration {seconds}s is not offered by policy '{policy}'")]
    UnsupportedDuration { policy: String, seconds: u32 },

    #[error("Policy '{policy}' prices by spot duration, but none was selected")]
    MissingDuration { policy: String },

    #[error("Policy '{policy}' has no spot duration selector")]
    DurationNotOffered { policy: String },

    #[error("Contract term of {months} months is not offered (expected 6 or 12)")]
    UnsupportedContractTerm { months: u32 },

    #[error("Unknown add-on '{name}' for policy '{policy}'")]
    UnknownAddOn { policy: String, name: String },

    #[error("Unknown location tier '{tag}' for policy '{policy}'")]
    UnknownLocationTier { policy: String, tag: String },

    #[error("Policy '{policy}' prices by location count, not by tier")]
    TierNotOffered { policy: String },

    #[error("Policy '{policy}' prices by location tier, not by count")]
    CountNotOffered { policy: String },

    #[error("Location count {count} is too large")]
    LocationCountTooLarge { count: i64 },

    #[error("Select either a location tier or a location count, not both")]
    ConflictingLocationSelectors,

    #[error("A location tier or location count is required")]
    MissingLocationSelector,

    #[error("Invalid value '{value}' for {field}")]
    MalformedField { field: &'static str, value: String },

    #[error("Quote under policy '{policy}' exceeds the largest representable amount")]
    AmountOverflow { policy: String },
}

/// Malformed policy configuration. Fatal when the policy is loaded.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PolicyError {
    #[error("Policy name must not be empty")]
    MissingName,

    #[error("Policy '{policy}' has no currency")]
    MissingCurrency { policy: String },

    #[error("Policy '{policy}' has no duration prices")]
    MissingDurationPrices { policy: String },

    #[error("Policy '{policy}' uses volume pricing and must not list duration prices")]
    DurationsWithVolumePricing { policy: String },

    #[error("Policy '{policy}' lists a zero second spot duration")]
    ZeroDuration { policy: String },

    #[error("Policy '{policy}': {field} must not be negative (got {value})")]
    NegativeAmount {
        policy: String,
        field: String,
        value: Decimal,
    },

    #[error("Policy '{policy}': {field} must not exceed {max} (got {value})")]
    AmountTooLarge {
        policy: String,
        field: String,
        value: Decimal,
        max: Decimal,
    },

    #[error("Policy '{policy}': {field} must be between 0 and 1 (got {value})")]
    RateOutOfRange {
        policy: String,
        field: String,
        value: Decimal,
    },

    #[error("Policy '{policy}' has an empty {kind} location rule")]
    EmptyLocationRule { policy: String, kind: &'static str },

    #[error("Policy '{policy}': {message}")]
    InvalidBrackets { policy: String, message: String },

    #[error("Policy '{policy}': {message}")]
    InvalidVolumeSteps { policy: String, message: String },

    #[error("Policy '{policy}': {message}")]
    InvalidThresholds { policy: String, message: String },

    #[error("Policy set has no policies")]
    EmptyPolicySet,

    #[error("Policy '{policy}' is defined more than once")]
    DuplicatePolicy { policy: String },

    #[error("Default policy '{policy}' is not defined")]
    MissingDefault { policy: String },

    #[error("Failed to read policy file {path}: {message}")]
    Io { path: String, message: String },

    #[error("Failed to parse policy file {path}: {message}")]
    Parse { path: String, message: String },
}

/// Error surfaced by the quote service
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PricingError {
    #[error(transparent)]
    InvalidOption(#[from] InvalidOption),

    #[error(transparent)]
    Policy(#[from] PolicyError),

    #[error("Unknown pricing policy '{name}'")]
    UnknownPolicy { name: String },
}

impl PricingError {
    /// Stable identifier used in API error bodies
    pub fn error_type(&self) -> &'static str {
        match self {
            PricingError::InvalidOption(_) => "invalid_option",
            PricingError::Policy(_) => "policy_configuration",
            PricingError::UnknownPolicy { .. } => "unknown_policy",
        }
    }
}
