//! Simulation settings, loaded from an optional YAML file.

use std::path::Path;

use ai_bt::BuildOptions;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

/// Settings for `btree run`. Every field has a default, so an empty file (or
/// no file at all) is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Seconds per simulated frame
    #[serde(default = "default_dt")]
    pub dt: f32,

    /// Number of frames to simulate
    #[serde(default = "default_frames")]
    pub frames: u32,

    /// Refuse entries that skip depth levels while building
    pub reject_depth_skips: bool,

    /// Initial value of the `signal` blackboard entry
    pub signal: bool,
}

fn default_dt() -> f32 {
    0.016
}

fn default_frames() -> u32 {
    60
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            dt: default_dt(),
            frames: default_frames(),
            reject_depth_skips: false,
            signal: false,
        }
    }
}

impl SimulationConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;
        Self::from_yaml_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))
    }

    /// Defaults when `path` is `None`.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        // An empty document deserializes to unit, not to a map.
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.dt.is_finite() || self.dt <= 0.0 {
            bail!("dt must be a positive number of seconds, got {}", self.dt);
        }
        Ok(())
    }

    pub fn build_options(&self) -> BuildOptions {
        BuildOptions {
            reject_depth_skips: self.reject_depth_skips,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let config = SimulationConfig::from_yaml_str("frames: 10\n").unwrap();
        assert_eq!(config.frames, 10);
        assert_eq!(config.dt, 0.016);
        assert!(!config.reject_depth_skips);
        assert!(!config.signal);
    }

    #[test]
    fn empty_file_is_the_default_config() {
        assert_eq!(
            SimulationConfig::from_yaml_str("\n").unwrap(),
            SimulationConfig::default()
        );
    }

    #[test]
    fn non_positive_dt_is_rejected() {
        assert!(SimulationConfig::from_yaml_str("dt: 0\n").is_err());
        assert!(SimulationConfig::from_yaml_str("dt: -0.5\n").is_err());
    }

    #[test]
    fn strict_flag_maps_to_build_options() {
        let config = SimulationConfig::from_yaml_str("reject_depth_skips: true\nsignal: true\n").unwrap();
        assert!(config.build_options().reject_depth_skips);
        assert!(config.signal);
    }

    #[test]
    fn load_reads_from_disk() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("sim.yaml");
        std::fs::write(&path, "dt: 0.5\nframes: 4\n").unwrap();

        let config = SimulationConfig::load_or_default(Some(&path)).unwrap();
        assert_eq!(config.dt, 0.5);
        assert_eq!(config.frames, 4);

        assert!(SimulationConfig::load(&dir.path().join("absent.yaml")).is_err());
    }
}
