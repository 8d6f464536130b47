//! Concurrent non-stop policy registry.
//!
//! Registrations happen at startup/configuration time; resolutions happen on
//! every distributed operation. The backing map is a `DashMap` so readers
//! stay lock-free and never observe a partially constructed entry, matching
//! the read-mostly access pattern.
//!
//! Resolution precedence, for every accessor: scope override first, then the
//! most specific registration, falling back one specificity level at a time
//! (instance+method, method-only, instance-only, type-only), and finally the
//! built-in default policy.

use std::sync::Arc;

use dashmap::DashMap;
use gridkit_core::{verify, NonStopPolicy, ObjectType, PolicyError};
use tracing::debug;

use super::key::PolicyKey;
use super::scope::CallScope;

/// Process-wide mapping from [`PolicyKey`] to registered policy.
///
/// Validation runs before any mutation, so a failed registration leaves the
/// registry untouched — including multi-type registrations, which are
/// all-or-nothing. The last registration for a key wins.
#[derive(Debug)]
pub struct NonStopRegistry {
    policies: DashMap<PolicyKey, Arc<NonStopPolicy>>,
    default_policy: Arc<NonStopPolicy>,
}

impl NonStopRegistry {
    /// Creates an empty registry with the built-in default policy.
    #[must_use]
    pub fn new() -> Self {
        Self {
            policies: DashMap::new(),
            default_policy: Arc::new(NonStopPolicy::default()),
        }
    }

    // -- registration -------------------------------------------------------

    /// Registers `policy` at the "any method, any instance" key of each
    /// given type.
    ///
    /// # Errors
    ///
    /// Returns a [`PolicyError`] if any type is unsupported or requires
    /// exception behavior the policy does not have; no type is registered
    /// on failure.
    pub fn register_for_type(
        &self,
        policy: NonStopPolicy,
        types: &[ObjectType],
    ) -> Result<(), PolicyError> {
        verify(&policy, types)?;
        let policy = Arc::new(policy);
        for &object_type in types {
            debug!(%object_type, "registering type-level non-stop policy");
            self.policies
                .insert(PolicyKey::for_type(object_type), Arc::clone(&policy));
        }
        Ok(())
    }

    /// Registers `policy` for one named instance of `object_type`.
    ///
    /// # Errors
    ///
    /// Same validation as [`NonStopRegistry::register_for_type`].
    pub fn register_for_instance(
        &self,
        policy: NonStopPolicy,
        instance: &str,
        object_type: ObjectType,
    ) -> Result<(), PolicyError> {
        verify(&policy, &[object_type])?;
        debug!(%object_type, instance, "registering instance-level non-stop policy");
        self.policies
            .insert(PolicyKey::for_instance(instance, object_type), Arc::new(policy));
        Ok(())
    }

    /// Registers `policy` for one method across all instances of a type.
    ///
    /// # Errors
    ///
    /// Same validation as [`NonStopRegistry::register_for_type`].
    pub fn register_for_type_method(
        &self,
        policy: NonStopPolicy,
        method: &str,
        object_type: ObjectType,
    ) -> Result<(), PolicyError> {
        verify(&policy, &[object_type])?;
        debug!(%object_type, method, "registering method-level non-stop policy");
        self.policies.insert(
            PolicyKey::for_type_method(method, object_type),
            Arc::new(policy),
        );
        Ok(())
    }

    /// Registers `policy` for one method of one named instance.
    ///
    /// # Errors
    ///
    /// Same validation as [`NonStopRegistry::register_for_type`].
    pub fn register_for_instance_method(
        &self,
        policy: NonStopPolicy,
        method: &str,
        instance: &str,
        object_type: ObjectType,
    ) -> Result<(), PolicyError> {
        verify(&policy, &[object_type])?;
        debug!(%object_type, instance, method, "registering instance-method non-stop policy");
        self.policies.insert(
            PolicyKey::for_instance_method(method, instance, object_type),
            Arc::new(policy),
        );
        Ok(())
    }

    /// Sets the scope's override so that every resolution against it
    /// returns `policy` until cleared. Validation still runs (with an empty
    /// type list, so only the unconditional rules apply).
    ///
    /// # Errors
    ///
    /// Currently never fails — kept fallible so scope registration and key
    /// registration share one contract.
    pub fn register_for_scope(
        &self,
        scope: &mut CallScope,
        policy: NonStopPolicy,
    ) -> Result<(), PolicyError> {
        verify(&policy, &[])?;
        scope.set(Arc::new(policy));
        Ok(())
    }

    // -- deregistration -----------------------------------------------------

    /// Removes the exact type-level registration, returning it.
    pub fn deregister_for_type(&self, object_type: ObjectType) -> Option<Arc<NonStopPolicy>> {
        self.policies
            .remove(&PolicyKey::for_type(object_type))
            .map(|(_, policy)| policy)
    }

    /// Removes the exact instance-level registration, returning it.
    pub fn deregister_for_instance(
        &self,
        instance: &str,
        object_type: ObjectType,
    ) -> Option<Arc<NonStopPolicy>> {
        self.policies
            .remove(&PolicyKey::for_instance(instance, object_type))
            .map(|(_, policy)| policy)
    }

    /// Removes the exact method-level registration, returning it.
    pub fn deregister_for_type_method(
        &self,
        method: &str,
        object_type: ObjectType,
    ) -> Option<Arc<NonStopPolicy>> {
        self.policies
            .remove(&PolicyKey::for_type_method(method, object_type))
            .map(|(_, policy)| policy)
    }

    /// Removes the exact instance-method registration, returning it.
    pub fn deregister_for_instance_method(
        &self,
        method: &str,
        instance: &str,
        object_type: ObjectType,
    ) -> Option<Arc<NonStopPolicy>> {
        self.policies
            .remove(&PolicyKey::for_instance_method(method, instance, object_type))
            .map(|(_, policy)| policy)
    }

    /// Clears the scope override, returning the value that was set so the
    /// caller can restore a prior span's state.
    pub fn deregister_for_scope(&self, scope: &mut CallScope) -> Option<Arc<NonStopPolicy>> {
        scope.clear_override()
    }

    // -- resolution ---------------------------------------------------------

    /// Effective policy for any operation on a type.
    #[must_use]
    pub fn config_for_type(&self, scope: &CallScope, object_type: ObjectType) -> Arc<NonStopPolicy> {
        self.resolve(scope, &PolicyKey::type_chain(object_type))
    }

    /// Effective policy for any operation on one named instance.
    #[must_use]
    pub fn config_for_instance(
        &self,
        scope: &CallScope,
        instance: &str,
        object_type: ObjectType,
    ) -> Arc<NonStopPolicy> {
        self.resolve(scope, &PolicyKey::instance_chain(instance, object_type))
    }

    /// Effective policy for one method across all instances of a type.
    #[must_use]
    pub fn config_for_type_method(
        &self,
        scope: &CallScope,
        method: &str,
        object_type: ObjectType,
    ) -> Arc<NonStopPolicy> {
        self.resolve(scope, &PolicyKey::type_method_chain(method, object_type))
    }

    /// Effective policy for one method of one named instance — the most
    /// specific lookup.
    #[must_use]
    pub fn config_for_instance_method(
        &self,
        scope: &CallScope,
        method: &str,
        instance: &str,
        object_type: ObjectType,
    ) -> Arc<NonStopPolicy> {
        self.resolve(
            scope,
            &PolicyKey::instance_method_chain(method, instance, object_type),
        )
    }

    fn resolve(&self, scope: &CallScope, chain: &[PolicyKey]) -> Arc<NonStopPolicy> {
        if let Some(policy) = scope.override_policy() {
            return Arc::clone(policy);
        }
        for key in chain {
            if let Some(entry) = self.policies.get(key) {
                return Arc::clone(entry.value());
            }
        }
        Arc::clone(&self.default_policy)
    }

    /// Number of key registrations currently held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.policies.len()
    }

    /// Whether no policy has been registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }
}

impl Default for NonStopRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
