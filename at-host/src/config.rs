//! Simulator configuration
//!
//! Loaded from an optional JSON file; every field has a default, so `{}` is a
//! valid config.
//!
//! ```json
//! {
//!   "log_level": "debug",
//!   "quiet_gap_ms": 20,
//!   "session": {
//!     "timing": { "reinit_settle_ms": 15, "reset_settle_ms": 25, "help_line_settle_ms": 15 },
//!     "overflow": "flush_and_reset"
//!   }
//! }
//! ```

use std::path::Path;
use std::time::Duration;

use at_core::SessionConfig;
use serde::{Deserialize, Serialize};

use crate::error::HostError;

/// Default quiet time on the input before a cycle runs
pub const DEFAULT_QUIET_GAP_MS: u64 = 20;

/// Configuration for the terminal simulator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// `env_logger` filter, e.g. `info` or `at_core=trace`
    pub log_level: String,
    /// How long input must be idle before the queued bytes are processed
    pub quiet_gap_ms: u64,
    /// Core session settings
    pub session: SessionConfig,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            quiet_gap_ms: DEFAULT_QUIET_GAP_MS,
            session: SessionConfig::default(),
        }
    }
}

impl HostConfig {
    /// Read and parse a JSON config file
    pub fn load(path: &Path) -> Result<Self, HostError> {
        let text = std::fs::read_to_string(path).map_err(|source| HostError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    /// Parse a JSON config document
    pub fn from_json(text: &str) -> Result<Self, HostError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Quiet gap as a `Duration`
    pub fn quiet_gap(&self) -> Duration {
        Duration::from_millis(self.quiet_gap_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use at_core::OverflowPolicy;

    #[test]
    fn test_host_config_default() {
        let config = HostConfig::default();
        assert_eq!(config.log_level, "info");
        assert_eq!(config.quiet_gap(), Duration::from_millis(20));
        assert_eq!(config.session, SessionConfig::default());
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        assert_eq!(HostConfig::from_json("{}").unwrap(), HostConfig::default());
    }

    #[test]
    fn test_partial_override() {
        let config = HostConfig::from_json(
            r#"{ "quiet_gap_ms": 5, "session": { "timing": { "reset_settle_ms": 100 }, "overflow": "truncate" } }"#,
        )
        .unwrap();

        assert_eq!(config.quiet_gap_ms, 5);
        assert_eq!(config.session.timing.reset_settle_ms, 100);
        assert_eq!(config.session.timing.reinit_settle_ms, 15);
        assert_eq!(config.session.overflow, OverflowPolicy::Truncate);
    }

    #[test]
    fn test_invalid_json_is_reported() {
        let result = HostConfig::from_json(r#"{ "quiet_gap_ms": "soon" }"#);
        assert!(matches!(result, Err(HostError::ConfigParse(_))));
    }

    #[test]
    fn test_missing_file_is_reported() {
        let result = HostConfig::load(Path::new("/nonexistent/at-term.json"));
        assert!(matches!(result, Err(HostError::ConfigIo { .. })));
    }
}
