//! Client configuration: runtime knobs plus the declarative non-stop policy
//! document applied at bootstrap.
//!
//! The document form lets deployments ship policies as data (JSON) instead
//! of registration code. Each entry targets a type, optionally narrowed by
//! method and/or instance, and carries a full policy; entries are applied in
//! order through the registry's normal registration calls, so each entry is
//! validated all-or-nothing.

use serde::{Deserialize, Serialize};

use gridkit_core::{NonStopPolicy, ObjectType, PolicyError};

use crate::nonstop::NonStopRegistry;

/// Runtime configuration for the client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Human-readable client identifier used in logs.
    pub client_name: String,
    /// Timeout applied to cluster calls that no non-stop policy governs.
    pub default_operation_timeout_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            client_name: String::new(),
            default_operation_timeout_ms: 30_000,
        }
    }
}

/// Errors from parsing or applying a policy document.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The document is not valid JSON or does not match the schema.
    #[error("invalid non-stop policy document: {0}")]
    Parse(#[from] serde_json::Error),
    /// An entry failed registration validation.
    #[error(transparent)]
    Policy(#[from] PolicyError),
}

/// One declarative policy registration.
///
/// Specificity follows from which optional fields are present: type-only,
/// instance, method, or instance+method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyEntry {
    /// The targeted data structure category.
    pub object_type: ObjectType,
    /// Narrow to one method, if present.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub method: Option<String>,
    /// Narrow to one named instance, if present.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub instance: Option<String>,
    /// The policy to register. Omitted fields take their defaults.
    pub policy: NonStopPolicy,
}

/// A set of policy registrations shipped as configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NonStopConfigDocument {
    /// Registrations, applied in order; later entries win on key collision.
    pub policies: Vec<PolicyEntry>,
}

impl NonStopConfigDocument {
    /// Parses a document from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed input.
    pub fn from_json(data: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(data)?)
    }

    /// Applies every entry to `registry` in order.
    ///
    /// Stops at the first invalid entry. Entries already applied stay
    /// registered — bootstrap treats any error here as fatal and discards
    /// the registry, so partial application is never observed by callers.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Policy`] naming the offending type/behavior.
    pub fn apply(&self, registry: &NonStopRegistry) -> Result<(), ConfigError> {
        for entry in &self.policies {
            let policy = entry.policy.clone();
            match (entry.method.as_deref(), entry.instance.as_deref()) {
                (Some(method), Some(instance)) => registry.register_for_instance_method(
                    policy,
                    method,
                    instance,
                    entry.object_type,
                )?,
                (Some(method), None) => {
                    registry.register_for_type_method(policy, method, entry.object_type)?;
                }
                (None, Some(instance)) => {
                    registry.register_for_instance(policy, instance, entry.object_type)?;
                }
                (None, None) => registry.register_for_type(policy, &[entry.object_type])?,
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
