//! Pricing engine module.
//!
//! Turns calculator options (spot duration, locations, contract term,
//! add-ons) into an itemized monthly price under a configurable policy.
//! The engine itself is pure; the registry and routes wrap it for the site.

pub mod calculators;
pub mod errors;
pub mod models;
pub mod policies;
pub mod registry;
pub mod requests;
pub mod responses;
pub mod routes;
pub mod services;

// Re-export commonly used items
pub use calculators::{compute, round_money};
pub use errors::{InvalidOption, PolicyError, PricingError};
pub use models::{
    ContractTerm, LocationRule, LocationSelector, PriceBreakdown, PricingOptions, PricingPolicy,
    SpotDuration,
};
pub use registry::{PolicyRegistry, PolicySet};
pub use routes::router;
pub use services::{quote, Quote};
