//! Quote service: resolves a policy from the registry and runs the engine.

use std::sync::Arc;

use super::calculators::compute;
use super::errors::PricingError;
use super::models::{PriceBreakdown, PricingOptions, PricingPolicy};
use super::registry::PolicyRegistry;
use super::requests::QuoteRequest;

/// A breakdown together with the policy that produced it
#[derive(Debug, Clone)]
pub struct Quote {
    pub policy: Arc<PricingPolicy>,
    pub options: PricingOptions,
    pub breakdown: PriceBreakdown,
}

/// Price a quote request against the current policy set.
///
/// The policy snapshot is taken once, so a concurrent reload cannot mix two
/// policy versions into one quote.
pub fn quote(registry: &PolicyRegistry, request: &QuoteRequest) -> Result<Quote, PricingError> {
    let policies = registry.snapshot();
    let policy = policies.resolve(request.policy.as_deref())?;
    let options = PricingOptions::try_from(request)?;

    let breakdown = compute(&options, &policy).map_err(|e| {
        tracing::debug!(policy = %policy.name, error = %e, "Quote rejected");
        e
    })?;

    tracing::debug!(
        policy = %policy.name,
        location_count = breakdown.location_count,
        final_price = %breakdown.final_price,
        "Quote computed"
    );

    Ok(Quote {
        policy,
        options,
        breakdown,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::errors::InvalidOption;
    use crate::pricing::registry::PolicySet;
    use rust_decimal_macros::dec;

    fn registry() -> PolicyRegistry {
        PolicyRegistry::new(PolicySet::builtin().unwrap())
    }

    #[test]
    fn test_quote_uses_default_policy() {
        let request = QuoteRequest {
            duration: Some(20),
            tier: Some("6-10".to_string()),
            term_months: 12,
            add_ons: vec!["peak_time".to_string()],
            ..Default::default()
        };

        let quote = quote(&registry(), &request).unwrap();

        assert_eq!(quote.policy.name, "community");
        assert_eq!(quote.breakdown.final_price, dec!(1296));
    }

    #[test]
    fn test_quote_named_policy() {
        let request = QuoteRequest {
            policy: Some("threshold".to_string()),
            duration: Some(10),
            locations: Some(12),
            term_months: 6,
            ..Default::default()
        };

        let quote = quote(&registry(), &request).unwrap();

        assert_eq!(quote.breakdown.final_price, dec!(1020));
        assert_eq!(quote.breakdown.annual_savings, dec!(2160));
    }

    #[test]
    fn test_quote_unknown_policy() {
        let request = QuoteRequest {
            policy: Some("enterprise".to_string()),
            locations: Some(1),
            term_months: 6,
            ..Default::default()
        };

        let err = quote(&registry(), &request).unwrap_err();

        assert_eq!(err.error_type(), "unknown_policy");
    }

    #[test]
    fn test_quote_invalid_option() {
        let request = QuoteRequest {
            policy: Some("volume".to_string()),
            locations: Some(4),
            term_months: 24,
            ..Default::default()
        };

        let err = quote(&registry(), &request).unwrap_err();

        assert_eq!(
            err,
            PricingError::InvalidOption(InvalidOption::UnsupportedContractTerm { months: 24 })
        );
    }
}
