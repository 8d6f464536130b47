//! Composite lookup key for policy registrations, plus the explicit
//! fallback probe chains used during resolution.

use gridkit_core::ObjectType;

/// Addresses one policy registration: (method, object type, instance).
///
/// An absent method means "any method"; an absent instance means "any
/// instance of this type". Absence is a distinct comparable value, never a
/// lookup wildcard — wildcarding happens through the ordered probe chains
/// below, not through key equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PolicyKey {
    /// Operation method name, or `None` for any method.
    pub method: Option<String>,
    /// The targeted data structure category.
    pub object_type: ObjectType,
    /// Named instance, or `None` for any instance of the type.
    pub instance: Option<String>,
}

impl PolicyKey {
    /// Key for "any method, any instance" of a type.
    #[must_use]
    pub fn for_type(object_type: ObjectType) -> Self {
        Self {
            method: None,
            object_type,
            instance: None,
        }
    }

    /// Key for one named instance, any method.
    #[must_use]
    pub fn for_instance(instance: &str, object_type: ObjectType) -> Self {
        Self {
            method: None,
            object_type,
            instance: Some(instance.to_string()),
        }
    }

    /// Key for one method across all instances of a type.
    #[must_use]
    pub fn for_type_method(method: &str, object_type: ObjectType) -> Self {
        Self {
            method: Some(method.to_string()),
            object_type,
            instance: None,
        }
    }

    /// Key for one method of one named instance.
    #[must_use]
    pub fn for_instance_method(method: &str, instance: &str, object_type: ObjectType) -> Self {
        Self {
            method: Some(method.to_string()),
            object_type,
            instance: Some(instance.to_string()),
        }
    }

    /// Probe chain for a type-level lookup: just the type key.
    #[must_use]
    pub fn type_chain(object_type: ObjectType) -> Vec<Self> {
        vec![Self::for_type(object_type)]
    }

    /// Probe chain for an instance-level lookup: instance, then type.
    #[must_use]
    pub fn instance_chain(instance: &str, object_type: ObjectType) -> Vec<Self> {
        vec![
            Self::for_instance(instance, object_type),
            Self::for_type(object_type),
        ]
    }

    /// Probe chain for a type+method lookup: method, then type.
    #[must_use]
    pub fn type_method_chain(method: &str, object_type: ObjectType) -> Vec<Self> {
        vec![
            Self::for_type_method(method, object_type),
            Self::for_type(object_type),
        ]
    }

    /// Probe chain for the most specific lookup, dropping one level of
    /// specificity at a time: instance+method, method-only, instance-only,
    /// type-only.
    #[must_use]
    pub fn instance_method_chain(
        method: &str,
        instance: &str,
        object_type: ObjectType,
    ) -> Vec<Self> {
        vec![
            Self::for_instance_method(method, instance, object_type),
            Self::for_type_method(method, object_type),
            Self::for_instance(instance, object_type),
            Self::for_type(object_type),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_components_are_distinct_not_wildcards() {
        let type_key = PolicyKey::for_type(ObjectType::Cache);
        let instance_key = PolicyKey::for_instance("prices", ObjectType::Cache);
        let method_key = PolicyKey::for_type_method("get", ObjectType::Cache);
        assert_ne!(type_key, instance_key);
        assert_ne!(type_key, method_key);
        assert_ne!(instance_key, method_key);
    }

    #[test]
    fn equality_requires_all_three_components() {
        let a = PolicyKey::for_instance_method("get", "prices", ObjectType::Cache);
        let b = PolicyKey::for_instance_method("get", "prices", ObjectType::Cache);
        let c = PolicyKey::for_instance_method("get", "prices", ObjectType::Store);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn instance_method_chain_drops_specificity_in_order() {
        let chain = PolicyKey::instance_method_chain("put", "prices", ObjectType::Store);
        assert_eq!(
            chain,
            vec![
                PolicyKey::for_instance_method("put", "prices", ObjectType::Store),
                PolicyKey::for_type_method("put", ObjectType::Store),
                PolicyKey::for_instance("prices", ObjectType::Store),
                PolicyKey::for_type(ObjectType::Store),
            ]
        );
    }

    #[test]
    fn partial_chains_end_at_the_type_key() {
        assert_eq!(
            PolicyKey::instance_chain("l", ObjectType::List).last(),
            Some(&PolicyKey::for_type(ObjectType::List))
        );
        assert_eq!(
            PolicyKey::type_method_chain("size", ObjectType::List).last(),
            Some(&PolicyKey::for_type(ObjectType::List))
        );
    }
}
