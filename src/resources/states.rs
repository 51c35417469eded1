//! Well-known state labels and case-insensitive label matching.

/// Well-known resource state labels.
///
/// State labels are free text; these are the ones the runtime itself uses.
/// Matching against a label is always case-insensitive.
pub struct KnownStates;

impl KnownStates {
    pub const RUNNING: &'static str = "Running";
    pub const STARTING: &'static str = "Starting";
    pub const STOPPING: &'static str = "Stopping";
    pub const EXITED: &'static str = "Exited";
    pub const FINISHED: &'static str = "Finished";
    pub const FAILED_TO_START: &'static str = "FailedToStart";
    pub const WAITING: &'static str = "Waiting";
    pub const NOT_STARTED: &'static str = "NotStarted";
    pub const HIDDEN: &'static str = "Hidden";
    pub const RUNTIME_UNHEALTHY: &'static str = "RuntimeUnhealthy";

    /// States after which a resource will not change on its own.
    pub const TERMINAL: [&'static str; 3] = [Self::EXITED, Self::FINISHED, Self::FAILED_TO_START];

    /// True if `state` is one of [`TERMINAL`](Self::TERMINAL) (case-insensitive).
    pub fn is_terminal(state: &str) -> bool {
        Self::TERMINAL.iter().any(|t| eq_ignore_case(t, state))
    }
}

/// Unicode-aware case-insensitive comparison.
pub(crate) fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.chars()
        .flat_map(char::to_lowercase)
        .eq(b.chars().flat_map(char::to_lowercase))
}

/// Lookup key for a resource name.
pub(crate) fn fold_name(name: &str) -> String {
    name.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matching_ignores_case() {
        assert!(eq_ignore_case("SomeState", "sOmeSTAtE"));
        assert!(eq_ignore_case("Ünit", "üNIT"));
        assert!(!eq_ignore_case("Running", "Runnin"));
    }

    #[test]
    fn terminal_states() {
        assert!(KnownStates::is_terminal("exited"));
        assert!(KnownStates::is_terminal(KnownStates::FAILED_TO_START));
        assert!(!KnownStates::is_terminal(KnownStates::RUNNING));
    }

    #[test]
    fn folded_names_collide_across_case() {
        assert_eq!(fold_name("MYreSouRCe1"), fold_name("myResource1"));
    }
}
