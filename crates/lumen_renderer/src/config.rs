//! Render configuration, loadable from JSON.

use std::path::{Path, PathBuf};

use lumen_core::color::DEFAULT_GAMMA;
use serde::{Deserialize, Serialize};

use crate::bucket::DEFAULT_BUCKET_SIZE;
use crate::error::{RenderError, RenderResult};

/// Default monitor group: an administratively scoped multicast address.
pub const DEFAULT_MONITOR_ADDRESS: &str = "239.255.77.77:4711";

/// Settings for a render session. Missing JSON fields take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Seed for the per-pixel random streams
    pub seed: u64,
    /// Worker threads; `None` uses the global rayon pool
    pub threads: Option<usize>,
    pub bucket_size: u32,
    /// Gamma used to encode PNG output and monitor colours
    pub output_gamma: f32,
    pub png_path: Option<PathBuf>,
    pub raw_path: Option<PathBuf>,
    /// Base directory for relative texture paths
    pub texture_dir: Option<PathBuf>,
    pub monitor: Option<MonitorConfig>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            threads: None,
            bucket_size: DEFAULT_BUCKET_SIZE,
            output_gamma: DEFAULT_GAMMA,
            png_path: None,
            raw_path: None,
            texture_dir: None,
            monitor: None,
        }
    }
}

impl RenderConfig {
    pub fn from_json_str(json: &str) -> RenderResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> RenderResult<Self> {
        let json = std::fs::read_to_string(path).map_err(|source| RenderError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// `host:port` of the monitor, usually a multicast group
    pub address: String,
    pub image_group: String,
    pub image_name: String,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_MONITOR_ADDRESS.to_string(),
            image_group: "lumen".to_string(),
            image_name: "render".to_string(),
        }
    }
}
