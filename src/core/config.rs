//! # Notifier configuration.
//!
//! Provides [`Config`], passed to [`ResourceNotifier::builder`](crate::ResourceNotifier::builder).
//!
//! ## Sentinel values
//! - `default_target_states = []` → falls back to `["Running"]`

use crate::resources::KnownStates;

/// Settings for a [`ResourceNotifier`](crate::ResourceNotifier).
///
/// ## Field semantics
/// - `default_target_states`: states a wait resolves on when the caller gives none
#[derive(Clone, Debug)]
pub struct Config {
    /// States used by `wait_for_resource` when called with no target state.
    ///
    /// Compared case-insensitively. An empty list is treated as `["Running"]`.
    pub default_target_states: Vec<String>,
}

impl Config {
    /// Returns the default wait targets, never empty.
    pub fn default_targets(&self) -> Vec<String> {
        if self.default_target_states.is_empty() {
            vec![KnownStates::RUNNING.to_owned()]
        } else {
            self.default_target_states.clone()
        }
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `default_target_states = ["Running"]`
    fn default() -> Self {
        Self {
            default_target_states: vec![KnownStates::RUNNING.to_owned()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_targets_fall_back_to_running() {
        let cfg = Config {
            default_target_states: Vec::new(),
        };
        assert_eq!(cfg.default_targets(), ["Running"]);
        assert_eq!(Config::default().default_targets(), ["Running"]);
    }
}
