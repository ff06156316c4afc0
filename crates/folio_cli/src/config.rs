//! Folio configuration file handling
//!
//! `folio.toml` has three optional tables:
//! - `[engine]` - animation engine tunables
//! - `[viewport]` - simulated window size
//! - `[simulation]` - scroll simulation pacing

use anyhow::{Context, Result};
use folio_animation::EngineConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Default config file name, looked up in the working directory
pub const CONFIG_FILE: &str = "folio.toml";

/// Contents of `folio.toml`
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct FolioConfig {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub viewport: ViewportConfig,
    #[serde(default)]
    pub simulation: SimulationConfig,
}

/// Simulated browser window
#[derive(Debug, Deserialize, Serialize)]
pub struct ViewportConfig {
    #[serde(default = "default_viewport_height")]
    pub height: f32,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            height: default_viewport_height(),
        }
    }
}

fn default_viewport_height() -> f32 {
    1000.0
}

/// Scroll simulation pacing
#[derive(Debug, Deserialize, Serialize)]
pub struct SimulationConfig {
    /// Scroll positions visited between top and bottom
    #[serde(default = "default_steps")]
    pub steps: u32,
    /// Simulated frame interval
    #[serde(default = "default_frame_ms")]
    pub frame_ms: u64,
    /// Frames run at each position so smoothed and timed bindings settle
    #[serde(default = "default_settle_frames")]
    pub settle_frames: u32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            steps: default_steps(),
            frame_ms: default_frame_ms(),
            settle_frames: default_settle_frames(),
        }
    }
}

fn default_steps() -> u32 {
    10
}

fn default_frame_ms() -> u64 {
    16
}

fn default_settle_frames() -> u32 {
    120
}

impl FolioConfig {
    /// Load from `path`, or from `folio.toml` in the working directory if it
    /// exists, or fall back to defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::load_from_file(path)?,
            None if Path::new(CONFIG_FILE).exists() => {
                Self::load_from_file(Path::new(CONFIG_FILE))?
            }
            None => {
                tracing::debug!("no {} found, using defaults", CONFIG_FILE);
                Self::default()
            }
        };
        config.validate()?;
        Ok(config)
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.viewport.height.is_finite() && self.viewport.height > 0.0) {
            anyhow::bail!("viewport.height must be positive, got {}", self.viewport.height);
        }
        if self.simulation.steps == 0 {
            anyhow::bail!("simulation.steps must be at least 1");
        }
        if self.simulation.frame_ms == 0 {
            anyhow::bail!("simulation.frame_ms must be at least 1");
        }
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_animation::ReplayPolicy;

    #[test]
    fn test_empty_file_is_default() {
        let config = FolioConfig::parse("").unwrap();
        assert_eq!(config.engine, EngineConfig::default());
        assert_eq!(config.viewport.height, 1000.0);
        assert_eq!(config.simulation.steps, 10);
        config.validate().unwrap();
    }

    #[test]
    fn test_tables() {
        let config = FolioConfig::parse(
            r#"
            [engine]
            resize_debounce_ms = 50
            default_replay = "freeze"

            [viewport]
            height = 800.0

            [simulation]
            steps = 4
            "#,
        )
        .unwrap();
        assert_eq!(config.engine.resize_debounce_ms, 50);
        assert_eq!(config.engine.default_replay, ReplayPolicy::Freeze);
        assert_eq!(config.viewport.height, 800.0);
        assert_eq!(config.simulation.steps, 4);
        assert_eq!(config.simulation.frame_ms, 16);
    }

    #[test]
    fn test_validate_rejects_zero_steps() {
        let config = FolioConfig::parse("[simulation]\nsteps = 0\n").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_serialized_config_parses_back() {
        let config = FolioConfig::default();
        let text = config.to_toml().unwrap();
        let parsed = FolioConfig::parse(&text).unwrap();
        assert_eq!(parsed.engine, config.engine);
        assert_eq!(parsed.simulation.settle_frames, 120);
    }
}
