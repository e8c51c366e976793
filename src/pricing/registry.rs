//! Read-only policy set with atomic replacement.
//!
//! Readers load a snapshot and price against it; a reload validates the whole
//! new set before swapping, so no reader ever sees a half-updated policy.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arc_swap::ArcSwap;
use serde::Deserialize;
use tracing::{info, warn};

use super::errors::{PolicyError, PricingError};
use super::models::PricingPolicy;
use super::policies::builtin_policies;

/// On-disk policy file layout
#[derive(Debug, Deserialize)]
pub struct PolicyFile {
    /// Policy used when a request names none. Defaults to the first entry.
    #[serde(default)]
    pub default: Option<String>,
    pub policies: Vec<PricingPolicy>,
}

/// Validated collection of policies
#[derive(Debug, Clone)]
pub struct PolicySet {
    default: String,
    policies: BTreeMap<String, Arc<PricingPolicy>>,
}

impl PolicySet {
    /// Validate every policy and build the set.
    pub fn new(policies: Vec<PricingPolicy>, default: Option<String>) -> Result<Self, PolicyError> {
        let first = policies.first().ok_or(PolicyError::EmptyPolicySet)?.name.clone();
        let default = default.unwrap_or(first);

        let mut seen = HashSet::new();
        let mut map = BTreeMap::new();
        for policy in policies {
            policy.validate()?;
            if !seen.insert(policy.name.clone()) {
                return Err(PolicyError::DuplicatePolicy {
                    policy: policy.name,
                });
            }
            map.insert(policy.name.clone(), Arc::new(policy));
        }

        if !map.contains_key(&default) {
            return Err(PolicyError::MissingDefault { policy: default });
        }

        Ok(Self {
            default,
            policies: map,
        })
    }

    /// The three policies the site ships with
    pub fn builtin() -> Result<Self, PolicyError> {
        Self::new(builtin_policies(), None)
    }

    /// Parse and validate a JSON policy file.
    pub fn from_json(json: &str, origin: &str) -> Result<Self, PolicyError> {
        let file: PolicyFile = serde_json::from_str(json).map_err(|e| PolicyError::Parse {
            path: origin.to_string(),
            message: e.to_string(),
        })?;
        Self::new(file.policies, file.default)
    }

    pub fn load_file(path: &Path) -> Result<Self, PolicyError> {
        let origin = path.display().to_string();
        let json = std::fs::read_to_string(path).map_err(|e| PolicyError::Io {
            path: origin.clone(),
            message: e.to_string(),
        })?;
        Self::from_json(&json, &origin)
    }

    pub fn default_name(&self) -> &str {
        &self.default
    }

    pub fn get(&self, name: &str) -> Option<Arc<PricingPolicy>> {
        self.policies.get(name).cloned()
    }

    /// Look up `name`, or the default policy when `None`.
    pub fn resolve(&self, name: Option<&str>) -> Result<Arc<PricingPolicy>, PricingError> {
        let name = name.unwrap_or(&self.default);
        self.get(name).ok_or_else(|| PricingError::UnknownPolicy {
            name: name.to_string(),
        })
    }

    pub fn policies(&self) -> impl Iterator<Item = &Arc<PricingPolicy>> {
        self.policies.values()
    }

    pub fn len(&self) -> usize {
        self.policies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }
}

/// Shared handle to the current policy set
#[derive(Clone)]
pub struct PolicyRegistry {
    current: Arc<ArcSwap<PolicySet>>,
    source: Option<PathBuf>,
}

impl PolicyRegistry {
    pub fn new(set: PolicySet) -> Self {
        Self {
            current: Arc::new(ArcSwap::from_pointee(set)),
            source: None,
        }
    }

    /// Registry backed by a policy file, reloadable with `reload`.
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self, PolicyError> {
        let path = path.into();
        let set = PolicySet::load_file(&path)?;
        info!(
            path = %path.display(),
            policies = set.len(),
            default = set.default_name(),
            "Loaded pricing policies"
        );
        Ok(Self {
            current: Arc::new(ArcSwap::from_pointee(set)),
            source: Some(path),
        })
    }

    /// Current snapshot. Holding it keeps the set alive across a reload.
    pub fn snapshot(&self) -> Arc<PolicySet> {
        self.current.load_full()
    }

    /// Swap in a new, already validated set.
    pub fn replace(&self, set: PolicySet) {
        info!(policies = set.len(), default = set.default_name(), "Pricing policies replaced");
        self.current.store(Arc::new(set));
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Re-read the backing policy file. On failure the current set stays.
    pub fn reload(&self) -> Result<(), PolicyError> {
        let Some(path) = &self.source else {
            info!("No policy file configured, keeping built-in policies");
            return Ok(());
        };

        match PolicySet::load_file(path) {
            Ok(set) => {
                self.replace(set);
                Ok(())
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Policy reload rejected, keeping current policies");
                Err(e)
            }
        }
    }
}
