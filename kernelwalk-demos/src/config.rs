//! Demo configuration

use kernelwalk_backend::DeviceSelector;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{DemoError, DemoResult};

/// Sizes and device choice shared by every demo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemoConfig {
    /// Device selection
    #[serde(default)]
    pub device: DeviceSelector,

    /// Invocations per workgroup (power of two)
    #[serde(default = "default_workgroup_size")]
    pub workgroup_size: u32,

    /// Array processing length
    #[serde(default = "default_array_len")]
    pub array_len: u32,

    /// Multi-dimensional volume `[width, height, depth]`
    #[serde(default = "default_volume")]
    pub volume: [u32; 3],

    /// Reduction input length
    #[serde(default = "default_reduce_len")]
    pub reduce_len: u32,

    /// Large loops array length
    #[serde(default = "default_loop_len")]
    pub loop_len: u32,

    /// Inner loop iterations per work item
    #[serde(default = "default_loop_iterations")]
    pub loop_iterations: u32,

    /// Check every n-th element of large outputs
    #[serde(default = "default_verify_stride")]
    pub verify_stride: usize,
}

fn default_workgroup_size() -> u32 { 64 }
fn default_array_len() -> u32 { 1024 }
fn default_volume() -> [u32; 3] { [16, 8, 4] }
fn default_reduce_len() -> u32 { 1 << 20 }
fn default_loop_len() -> u32 { 1 << 22 }
fn default_loop_iterations() -> u32 { 256 }
fn default_verify_stride() -> usize { 1 }

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            device: DeviceSelector::default(),
            workgroup_size: default_workgroup_size(),
            array_len: default_array_len(),
            volume: default_volume(),
            reduce_len: default_reduce_len(),
            loop_len: default_loop_len(),
            loop_iterations: default_loop_iterations(),
            verify_stride: default_verify_stride(),
        }
    }
}

impl DemoConfig {
    /// Load from a JSON file; missing fields take their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> DemoResult<Self> {
        let content = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> DemoResult<()> {
        let wg = self.workgroup_size;
        if wg == 0 || wg > 256 || !wg.is_power_of_two() {
            return Err(DemoError::Config(format!(
                "workgroup_size must be a power of two in 1..=256, got {wg}"
            )));
        }
        let sizes = [
            ("array_len", self.array_len),
            ("volume width", self.volume[0]),
            ("volume height", self.volume[1]),
            ("volume depth", self.volume[2]),
            ("reduce_len", self.reduce_len),
            ("loop_len", self.loop_len),
            ("loop_iterations", self.loop_iterations),
        ];
        for (name, value) in sizes {
            if value == 0 {
                return Err(DemoError::Config(format!("{name} must be non-zero")));
            }
        }
        if self.verify_stride == 0 {
            return Err(DemoError::Config("verify_stride must be non-zero".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = DemoConfig::default();
        config.validate().unwrap();
        assert_eq!(config.workgroup_size, 64);
        assert_eq!(config.volume, [16, 8, 4]);
        assert!(config.device.require_gpu);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: DemoConfig =
            serde_json::from_str(r#"{"array_len": 10, "device": {"require_gpu": false}}"#).unwrap();
        assert_eq!(config.array_len, 10);
        assert_eq!(config.reduce_len, 1 << 20);
        assert!(!config.device.require_gpu);
    }

    #[test]
    fn rejects_bad_workgroup_size() {
        for wg in [0, 3, 48, 512] {
            let config = DemoConfig {
                workgroup_size: wg,
                ..Default::default()
            };
            assert!(matches!(config.validate(), Err(DemoError::Config(_))), "{wg}");
        }
    }

    #[test]
    fn rejects_zero_sizes() {
        let config = DemoConfig {
            volume: [4, 0, 1],
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = DemoConfig {
            verify_stride: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_file_is_io_error() {
        assert!(matches!(
            DemoConfig::from_file("/nonexistent/kernelwalk.json"),
            Err(DemoError::Io(_))
        ));
    }
}
