//! Viewer configuration loaded from TOML.
//!
//! Every field has a default matching the reference dashboard, so an empty
//! file (or no file at all) yields a working configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::brush::TimelineLayout;
use crate::chart::ChartLayout;
use crate::error::{Error, Result};
use crate::panels::PanelLayout;
use crate::sample::{Metric, Resolution};

/// Placeholder in [`ViewerConfig::file_pattern`] replaced by the bin minutes.
pub const BIN_PLACEHOLDER: &str = "{bin}";

/// Top-level viewer configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Directory holding one JSON sample file per resolution.
    pub data_dir: PathBuf,
    /// File name pattern; `{bin}` is replaced by the resolution in minutes.
    pub file_pattern: String,
    /// Resolutions loaded at startup. All must load before the first render.
    pub resolutions: Vec<Resolution>,
    /// Resolution shown first.
    pub default_resolution: Resolution,
    /// Metric shown first.
    pub default_metric: Metric,
    /// Largest selectable day; derived from the data when unset.
    pub max_day: Option<u32>,
    /// Resolution drawn in the small-multiples panels.
    pub panel_resolution: Resolution,
    /// Metric drawn in the small-multiples panels.
    pub panel_metric: Metric,
    /// Primary chart geometry.
    pub chart: ChartLayout,
    /// Range selector geometry.
    pub timeline: TimelineLayout,
    /// Small-multiples geometry.
    pub panels: PanelLayout,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            file_pattern: "hourly_{bin}min.json".to_string(),
            resolutions: Resolution::ALL.to_vec(),
            default_resolution: Resolution::Min60,
            default_metric: Metric::Activity,
            max_day: None,
            panel_resolution: Resolution::Min60,
            panel_metric: Metric::Activity,
            chart: ChartLayout::default(),
            timeline: TimelineLayout::default(),
            panels: PanelLayout::default(),
        }
    }
}

impl ViewerConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Read and parse a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text).map_err(|source| Error::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Data file for a resolution.
    pub fn data_path(&self, resolution: Resolution) -> PathBuf {
        let name = self
            .file_pattern
            .replace(BIN_PLACEHOLDER, &resolution.minutes().to_string());
        self.data_dir.join(name)
    }
}
