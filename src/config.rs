//! Parse options, from code or from the environment.

/// Skip decoding map-level labels and jump to the room section.
pub const ENV_SKIP_LABELS: &str = "MAPSNAP_SKIP_LABELS";

/// Emit byte-offset traces while decoding.
pub const ENV_VERBOSE: &str = "MAPSNAP_VERBOSE";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Read only the label section's group count, then resynchronize on the rooms
    pub skip_labels: bool,
    /// Log section and record offsets at debug level
    pub verbose: bool,
    /// Allow heuristic resynchronization after a misaligned section
    pub resync: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self { skip_labels: false, verbose: false, resync: true }
    }
}

impl ParseOptions {
    /// Defaults overridden by `MAPSNAP_SKIP_LABELS` / `MAPSNAP_VERBOSE`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let flag = |key: &str| lookup(key).is_some_and(|v| is_truthy(&v));
        Self {
            skip_labels: flag(ENV_SKIP_LABELS),
            verbose: flag(ENV_VERBOSE),
            ..Self::default()
        }
    }

    /// No heuristic recovery: the first section failure ends the parse.
    pub fn strict(mut self) -> Self {
        self.resync = false;
        self
    }

    pub fn with_skip_labels(mut self, skip: bool) -> Self {
        self.skip_labels = skip;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_allow_resync() {
        let opts = ParseOptions::default();
        assert!(opts.resync);
        assert!(!opts.skip_labels);
        assert!(!opts.strict().resync);
    }

    #[test]
    fn test_env_lookup() {
        let opts = ParseOptions::from_lookup(|key| match key {
            ENV_SKIP_LABELS => Some("Yes".to_string()),
            ENV_VERBOSE => Some("0".to_string()),
            _ => None,
        });
        assert!(opts.skip_labels);
        assert!(!opts.verbose);
        assert!(opts.resync);
    }

    #[test]
    fn test_truthy_values() {
        for v in ["1", "true", "ON", " yes "] {
            assert!(is_truthy(v), "{v}");
        }
        for v in ["", "0", "false", "off", "nope"] {
            assert!(!is_truthy(v), "{v}");
        }
    }
}
