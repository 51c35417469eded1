//! # Resource handle.
//!
//! [`Resource`] describes a named resource as the notifier sees it: a stable
//! name, a kind used as the default snapshot type, and an optional
//! [`InitialState`] seeded into the first snapshot of every instance.
//! The shared handle type is [`ResourceRef`] (`Arc<Resource>`); events carry
//! the same handle that was passed to `publish_update`.
//!
//! ## Example
//! ```rust
//! use statevisor::{InitialState, Resource, ResourceRef};
//!
//! let api: ResourceRef = Resource::new("api")
//!     .with_kind("Project")
//!     .with_initial_state(InitialState::new("Project").with_property("A", "B"))
//!     .into_ref();
//!
//! assert_eq!(api.name(), "api");
//! assert_eq!(api.initial_snapshot().property("A"), Some("B"));
//! ```

use std::sync::Arc;

use super::{EnvVar, Property, ResourceId, ResourceSnapshot};

/// Shared handle to a resource.
pub type ResourceRef = Arc<Resource>;

/// Snapshot type used when neither a kind nor an initial state is given.
const DEFAULT_KIND: &str = "CustomResource";

/// State supplied once when a resource is registered.
///
/// Merged into the first snapshot of each instance of the resource.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InitialState {
    pub resource_type: String,
    pub properties: Vec<Property>,
    pub environment_variables: Vec<EnvVar>,
}

impl InitialState {
    pub fn new(resource_type: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            ..Self::default()
        }
    }

    #[inline]
    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.push(Property::new(name, value));
        self
    }

    #[inline]
    pub fn with_env(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.environment_variables.push(EnvVar::new(name, value));
        self
    }
}

/// Named resource tracked by the notifier.
#[derive(Debug)]
pub struct Resource {
    name: Arc<str>,
    kind: Arc<str>,
    initial: Option<InitialState>,
}

impl Resource {
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            kind: Arc::from(DEFAULT_KIND),
            initial: None,
        }
    }

    /// Sets the kind reported as `resource_type` when no initial state is given.
    #[inline]
    pub fn with_kind(mut self, kind: impl Into<Arc<str>>) -> Self {
        self.kind = kind.into();
        self
    }

    #[inline]
    pub fn with_initial_state(mut self, initial: InitialState) -> Self {
        self.initial = Some(initial);
        self
    }

    /// Wraps the resource into a shared [`ResourceRef`].
    #[inline]
    pub fn into_ref(self) -> ResourceRef {
        Arc::new(self)
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    #[inline]
    pub fn initial_state(&self) -> Option<&InitialState> {
        self.initial.as_ref()
    }

    /// Identity of the resource's own instance.
    pub fn id(&self) -> ResourceId {
        ResourceId::primary(Arc::clone(&self.name))
    }

    /// Identity of the replica `instance`.
    pub fn replica_id(&self, instance: impl Into<Arc<str>>) -> ResourceId {
        ResourceId::new(Arc::clone(&self.name), instance)
    }

    /// Snapshot every instance starts from before its first update.
    pub fn initial_snapshot(&self) -> ResourceSnapshot {
        match &self.initial {
            Some(init) => ResourceSnapshot {
                resource_type: init.resource_type.clone(),
                properties: init.properties.clone(),
                environment_variables: init.environment_variables.clone(),
                ..ResourceSnapshot::default()
            },
            None => ResourceSnapshot::new(&*self.kind),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_snapshot_uses_kind() {
        let r = Resource::new("myResource");
        let snap = r.initial_snapshot();
        assert_eq!(snap.resource_type, "CustomResource");
        assert!(snap.properties.is_empty());
        assert!(snap.environment_variables.is_empty());
        assert_eq!(snap.state, None);

        let typed = Resource::new("db").with_kind("Container").initial_snapshot();
        assert_eq!(typed.resource_type, "Container");
    }

    #[test]
    fn initial_state_is_seeded() {
        let r = Resource::new("myResource")
            .with_kind("Ignored")
            .with_initial_state(InitialState::new("MyResource").with_property("A", "B"));

        let snap = r.initial_snapshot();
        assert_eq!(snap.resource_type, "MyResource");
        assert!(snap.environment_variables.is_empty());
        assert_eq!(snap.properties, vec![Property::new("A", "B")]);
    }

    #[test]
    fn ids() {
        let r = Resource::new("svc");
        assert_eq!(r.id(), ResourceId::primary("svc"));
        assert_eq!(r.replica_id("svc-a").instance(), "svc-a");
    }
}
