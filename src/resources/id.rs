//! # Resource identity.
//!
//! A [`ResourceId`] is the `(name, instance)` pair under which one snapshot is
//! tracked. Single-instance resources use their own name as the instance id;
//! replicas carry an explicit instance id.

use std::fmt;
use std::sync::Arc;

/// Key of a tracked snapshot.
///
/// Equality and hashing are by value (exact, case-sensitive).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId {
    name: Arc<str>,
    instance: Arc<str>,
}

impl ResourceId {
    /// Identity of a specific replica of `name`.
    pub fn new(name: impl Into<Arc<str>>, instance: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            instance: instance.into(),
        }
    }

    /// Identity of a single-instance resource (`instance == name`).
    pub fn primary(name: impl Into<Arc<str>>) -> Self {
        let name = name.into();
        Self {
            instance: Arc::clone(&name),
            name,
        }
    }

    /// Resource name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Instance id (equals [`name`](Self::name) for single-instance resources).
    #[inline]
    pub fn instance(&self) -> &str {
        &self.instance
    }

    /// True if this identity is the resource's own (non-replica) instance.
    #[inline]
    pub fn is_primary(&self) -> bool {
        self.name == self.instance
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.name, self.instance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primary_uses_name_as_instance() {
        let id = ResourceId::primary("db");
        assert_eq!(id.name(), "db");
        assert_eq!(id.instance(), "db");
        assert!(id.is_primary());
        assert_eq!(id, ResourceId::new("db", "db"));
    }

    #[test]
    fn replica_is_distinct_from_primary() {
        let replica = ResourceId::new("db", "db-1");
        assert!(!replica.is_primary());
        assert_ne!(replica, ResourceId::primary("db"));
        assert_eq!(replica.to_string(), "db/db-1");
    }
}
