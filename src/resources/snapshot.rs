//! # Immutable resource snapshots.
//!
//! A [`ResourceSnapshot`] is what observers see for one resource instance at
//! one point in time. Snapshots are never mutated after being published: the
//! notifier hands out `Arc<ResourceSnapshot>` and every update is a pure
//! `ResourceSnapshot -> ResourceSnapshot` transform applied to a clone of the
//! previous value.
//!
//! ## Example
//! ```rust
//! use statevisor::{KnownStates, ResourceSnapshot};
//!
//! let snap = ResourceSnapshot::new("Container")
//!     .with_state(KnownStates::RUNNING)
//!     .with_property("port", "8080")
//!     .with_property("port", "8443");
//!
//! assert_eq!(snap.state_text(), Some("Running"));
//! assert_eq!(snap.property("port"), Some("8080"));
//! assert_eq!(snap.properties_named("port").count(), 2);
//! ```

use chrono::{DateTime, Utc};

/// State label plus an optional display style (e.g. `"success"`, `"error"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceState {
    pub text: String,
    pub style: Option<String>,
}

impl ResourceState {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: None,
        }
    }

    #[inline]
    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = Some(style.into());
        self
    }
}

impl From<&str> for ResourceState {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for ResourceState {
    fn from(text: String) -> Self {
        Self::new(text)
    }
}

/// Named property value. Names are not unique within a snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    pub name: String,
    pub value: String,
}

impl Property {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Environment variable as seen by the resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvVar {
    pub name: String,
    pub value: Option<String>,
}

impl EnvVar {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: Some(value.into()),
        }
    }
}

/// Observable state of one resource instance.
///
/// ### Field semantics
/// - `resource_type`: type tag (e.g. `"Container"`, `"Project"`)
/// - `state`: current state label, `None` when unknown
/// - `creation_timestamp`: when the underlying resource was created
/// - `exit_code`: set once the resource has exited
/// - `environment_variables`, `properties`: ordered, duplicates retained
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResourceSnapshot {
    pub resource_type: String,
    pub state: Option<ResourceState>,
    pub creation_timestamp: Option<DateTime<Utc>>,
    pub exit_code: Option<i32>,
    pub environment_variables: Vec<EnvVar>,
    pub properties: Vec<Property>,
}

impl ResourceSnapshot {
    /// Empty snapshot of the given type.
    pub fn new(resource_type: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            ..Self::default()
        }
    }

    /// Current state label, if any.
    #[inline]
    pub fn state_text(&self) -> Option<&str> {
        self.state.as_ref().map(|s| s.text.as_str())
    }

    /// Value of the first property called `name`.
    pub fn property(&self, name: &str) -> Option<&str> {
        self.properties
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.value.as_str())
    }

    /// Values of every property called `name`, in insertion order.
    pub fn properties_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.properties
            .iter()
            .filter(move |p| p.name == name)
            .map(|p| p.value.as_str())
    }

    #[inline]
    pub fn with_resource_type(mut self, resource_type: impl Into<String>) -> Self {
        self.resource_type = resource_type.into();
        self
    }

    /// Replaces the state.
    #[inline]
    pub fn with_state(mut self, state: impl Into<ResourceState>) -> Self {
        self.state = Some(state.into());
        self
    }

    /// Clears the state.
    #[inline]
    pub fn without_state(mut self) -> Self {
        self.state = None;
        self
    }

    /// Appends a property; earlier entries with the same name are kept.
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

    #[inline]
    pub fn with_exit_code(mut self, code: i32) -> Self {
        self.exit_code = Some(code);
        self
    }

    #[inline]
    pub fn with_creation_timestamp(mut self, at: DateTime<Utc>) -> Self {
        self.creation_timestamp = Some(at);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn properties_keep_duplicates_in_order() {
        let snap = ResourceSnapshot::new("Custom")
            .with_property("A", "1")
            .with_property("B", "2")
            .with_property("A", "3");

        let names: Vec<&str> = snap.properties.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["A", "B", "A"]);
        assert_eq!(snap.properties_named("A").collect::<Vec<_>>(), ["1", "3"]);
        assert_eq!(snap.property("B"), Some("2"));
        assert_eq!(snap.property("C"), None);
    }

    #[test]
    fn builders_do_not_touch_the_source() {
        let before = ResourceSnapshot::new("Custom").with_state("Starting");
        let after = before.clone().with_state("Running").with_exit_code(0);

        assert_eq!(before.state_text(), Some("Starting"));
        assert_eq!(before.exit_code, None);
        assert_eq!(after.state_text(), Some("Running"));
        assert_eq!(after.exit_code, Some(0));
    }

    #[test]
    fn state_can_be_cleared() {
        let snap = ResourceSnapshot::new("Custom")
            .with_state(ResourceState::new("Running").with_style("success"))
            .without_state();
        assert_eq!(snap.state_text(), None);
    }
}
