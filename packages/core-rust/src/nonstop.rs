//! Non-stop policy value types and registration validation.
//!
//! A non-stop operation is a distributed call that, instead of blocking
//! indefinitely while the cluster is unreachable, is bounded by a
//! policy-defined timeout and a substituted outcome. These are the immutable
//! values a policy registry stores and resolves; [`verify`] is the pure
//! validation every registration runs, kept independent of any storage so it
//! is unit-testable on its own.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Category of clustered data structure an operation targets.
///
/// `Map` and `Set` exist in the toolkit's type space but are not yet in the
/// non-stop supported set; registering a policy for them fails validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectType {
    /// Serialized key/value store.
    Store,
    /// Cache with eviction semantics.
    Cache,
    /// Cluster-replicated list.
    List,
    /// Distributed lock.
    Lock,
    /// Plain replicated map (not yet non-stop capable).
    Map,
    /// Replicated set (not yet non-stop capable).
    Set,
}

impl ObjectType {
    /// Whether this type participates in non-stop operation at all.
    #[must_use]
    pub fn supports_non_stop(self) -> bool {
        SUPPORTED_TYPES.contains(&self)
    }

    /// Whether this type may substitute a non-exception outcome on timeout.
    ///
    /// Only stores and caches have a meaningful degraded mode (empty or
    /// locally-cached values); lists and locks must raise. A deliberate
    /// restriction, not an omission.
    #[must_use]
    pub fn supports_degraded_behavior(self) -> bool {
        matches!(self, Self::Store | Self::Cache)
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Store => "store",
            Self::Cache => "cache",
            Self::List => "list",
            Self::Lock => "lock",
            Self::Map => "map",
            Self::Set => "set",
        };
        f.write_str(name)
    }
}

/// The data structure types that support non-stop operation.
pub const SUPPORTED_TYPES: [ObjectType; 4] = [
    ObjectType::Store,
    ObjectType::Cache,
    ObjectType::List,
    ObjectType::Lock,
];

/// Substituted outcome for a read that hit its non-stop timeout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReadTimeoutBehavior {
    /// Raise a timeout error to the caller.
    Exception,
    /// Return an empty/default result.
    NoOp,
    /// Return the locally cached value, if any.
    LocalRead,
}

impl fmt::Display for ReadTimeoutBehavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Exception => "exception",
            Self::NoOp => "no-op",
            Self::LocalRead => "local-read",
        };
        f.write_str(name)
    }
}

/// Substituted outcome for a write that hit its non-stop timeout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WriteTimeoutBehavior {
    /// Raise a timeout error to the caller.
    Exception,
    /// Discard the write.
    NoOp,
}

impl fmt::Display for WriteTimeoutBehavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Exception => "exception",
            Self::NoOp => "no-op",
        };
        f.write_str(name)
    }
}

/// Default bounded wait before a non-stop operation degrades.
pub const DEFAULT_TIMEOUT_MILLIS: u64 = 30_000;

/// Immutable non-stop configuration for one class of operations.
///
/// Registered once, never mutated; replacing a policy means re-registering
/// under the same key. [`NonStopPolicy::default`] is the built-in fallback
/// returned when nothing is registered: non-stop disabled, default timeout,
/// exception behavior both ways.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NonStopPolicy {
    /// Maximum wait in milliseconds; 0 means no wait.
    pub timeout_millis: u64,
    /// Whether non-stop behavior applies at all. When false, the operation
    /// is an ordinary blocking call and the remaining fields are ignored.
    pub enabled: bool,
    /// Skip waiting entirely; substitute the timeout outcome at once.
    pub immediate_timeout: bool,
    /// Outcome substituted for a timed-out read.
    pub read_behavior: ReadTimeoutBehavior,
    /// Outcome substituted for a timed-out write.
    pub write_behavior: WriteTimeoutBehavior,
}

impl Default for NonStopPolicy {
    fn default() -> Self {
        Self {
            timeout_millis: DEFAULT_TIMEOUT_MILLIS,
            enabled: false,
            immediate_timeout: false,
            read_behavior: ReadTimeoutBehavior::Exception,
            write_behavior: WriteTimeoutBehavior::Exception,
        }
    }
}

impl NonStopPolicy {
    /// An enabled policy with the given timeout and exception behavior both
    /// ways — valid for every supported type.
    #[must_use]
    pub fn exception_bound(timeout_millis: u64) -> Self {
        Self {
            timeout_millis,
            enabled: true,
            ..Self::default()
        }
    }
}

/// Registration-time configuration errors.
///
/// Raised synchronously to whoever called the registration API; a failed
/// registration has no effect on the registry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PolicyError {
    /// The type is not in [`SUPPORTED_TYPES`].
    #[error("{object_type} is not supported as a non-stop data structure")]
    UnsupportedType {
        /// The offending type.
        object_type: ObjectType,
    },

    /// A non-exception read behavior was given for a type that only
    /// supports raising.
    #[error("read behavior {behavior} not supported for {object_type}")]
    UnsupportedReadBehavior {
        /// The offending type.
        object_type: ObjectType,
        /// The rejected behavior.
        behavior: ReadTimeoutBehavior,
    },

    /// A non-exception write behavior was given for a type that only
    /// supports raising.
    #[error("write behavior {behavior} not supported for {object_type}")]
    UnsupportedWriteBehavior {
        /// The offending type.
        object_type: ObjectType,
        /// The rejected behavior.
        behavior: WriteTimeoutBehavior,
    },
}

/// Validates a candidate policy against the target types.
///
/// Every type must be in [`SUPPORTED_TYPES`]; types without a degraded mode
/// (everything outside store/cache) additionally require exception behavior
/// for both reads and writes. Runs before any registry mutation so
/// registration stays all-or-nothing. An empty type list checks nothing
/// beyond the (vacuous) membership rule, matching scope-override
/// registration.
///
/// # Errors
///
/// Returns the [`PolicyError`] naming the first offending type/behavior.
pub fn verify(policy: &NonStopPolicy, types: &[ObjectType]) -> Result<(), PolicyError> {
    for &object_type in types {
        if !object_type.supports_non_stop() {
            return Err(PolicyError::UnsupportedType { object_type });
        }
        if !object_type.supports_degraded_behavior() {
            if policy.write_behavior != WriteTimeoutBehavior::Exception {
                return Err(PolicyError::UnsupportedWriteBehavior {
                    object_type,
                    behavior: policy.write_behavior,
                });
            }
            if policy.read_behavior != ReadTimeoutBehavior::Exception {
                return Err(PolicyError::UnsupportedReadBehavior {
                    object_type,
                    behavior: policy.read_behavior,
                });
            }
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn no_op_policy() -> NonStopPolicy {
        NonStopPolicy {
            enabled: true,
            read_behavior: ReadTimeoutBehavior::NoOp,
            write_behavior: WriteTimeoutBehavior::NoOp,
            ..NonStopPolicy::default()
        }
    }

    #[test]
    fn default_policy_is_disabled_exception_both_ways() {
        let policy = NonStopPolicy::default();
        assert!(!policy.enabled);
        assert!(!policy.immediate_timeout);
        assert_eq!(policy.timeout_millis, DEFAULT_TIMEOUT_MILLIS);
        assert_eq!(policy.read_behavior, ReadTimeoutBehavior::Exception);
        assert_eq!(policy.write_behavior, WriteTimeoutBehavior::Exception);
    }

    #[test]
    fn unsupported_type_rejected() {
        let err = verify(&NonStopPolicy::default(), &[ObjectType::Map]).unwrap_err();
        assert_eq!(
            err,
            PolicyError::UnsupportedType {
                object_type: ObjectType::Map
            }
        );
    }

    #[test]
    fn degraded_behavior_allowed_for_store_and_cache() {
        let policy = no_op_policy();
        assert!(verify(&policy, &[ObjectType::Store, ObjectType::Cache]).is_ok());
    }

    #[test]
    fn degraded_behavior_rejected_for_list_and_lock() {
        let policy = no_op_policy();
        for object_type in [ObjectType::List, ObjectType::Lock] {
            let err = verify(&policy, &[object_type]).unwrap_err();
            assert_eq!(
                err,
                PolicyError::UnsupportedWriteBehavior {
                    object_type,
                    behavior: WriteTimeoutBehavior::NoOp
                }
            );
        }
    }

    #[test]
    fn local_read_rejected_for_lock_even_with_exception_writes() {
        let policy = NonStopPolicy {
            enabled: true,
            read_behavior: ReadTimeoutBehavior::LocalRead,
            ..NonStopPolicy::default()
        };
        let err = verify(&policy, &[ObjectType::Lock]).unwrap_err();
        assert_eq!(
            err,
            PolicyError::UnsupportedReadBehavior {
                object_type: ObjectType::Lock,
                behavior: ReadTimeoutBehavior::LocalRead
            }
        );
    }

    #[test]
    fn exception_policy_valid_for_every_supported_type() {
        let policy = NonStopPolicy::exception_bound(100);
        assert!(verify(&policy, &SUPPORTED_TYPES).is_ok());
    }

    #[test]
    fn empty_type_list_is_vacuously_valid() {
        assert!(verify(&no_op_policy(), &[]).is_ok());
    }

    #[test]
    fn error_messages_name_the_offender() {
        let err = verify(&no_op_policy(), &[ObjectType::List]).unwrap_err();
        assert_eq!(err.to_string(), "write behavior no-op not supported for list");
    }

    #[test]
    fn policy_json_roundtrip_with_defaults() {
        let parsed: NonStopPolicy =
            serde_json::from_str(r#"{"timeoutMillis": 500, "enabled": true}"#).unwrap();
        assert_eq!(parsed.timeout_millis, 500);
        assert!(parsed.enabled);
        assert_eq!(parsed.read_behavior, ReadTimeoutBehavior::Exception);
    }
}
