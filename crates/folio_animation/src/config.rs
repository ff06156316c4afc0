//! Engine configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::binding::ReplayPolicy;
use crate::error::Result;

/// Tunables for [`crate::ScrollEngine`]
///
/// Every field has a default, so an empty TOML table is a valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Quiet period after the last resize/reflow before ranges are recomputed
    pub resize_debounce_ms: u64,
    /// Replay policy for once bindings that do not set their own
    pub default_replay: ReplayPolicy,
    /// Maximum number of buffered diagnostics
    pub diagnostics_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            resize_debounce_ms: 200,
            default_replay: ReplayPolicy::Replay,
            diagnostics_capacity: 256,
        }
    }
}

impl EngineConfig {
    /// Parse from a TOML document containing the engine fields at top level
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn resize_debounce(&self) -> Duration {
        Duration::from_millis(self.resize_debounce_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnimationError;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = EngineConfig::from_toml_str("").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.resize_debounce(), Duration::from_millis(200));
    }

    #[test]
    fn test_partial_config() {
        let config = EngineConfig::from_toml_str(
            r#"
            resize_debounce_ms = 50
            default_replay = "freeze"
            "#,
        )
        .unwrap();
        assert_eq!(config.resize_debounce_ms, 50);
        assert_eq!(config.default_replay, ReplayPolicy::Freeze);
        assert_eq!(config.diagnostics_capacity, 256);
    }

    #[test]
    fn test_bad_config_is_error() {
        let err = EngineConfig::from_toml_str("default_replay = \"sometimes\"").unwrap_err();
        assert!(matches!(err, AnimationError::Config(_)));
    }
}
