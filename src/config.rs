//! Session tunables with TOML overrides.
//!
//! A session starts from defaults; a host may hand in a TOML fragment to
//! adjust them. Nothing is persisted: the config lives and dies with the
//! session.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Complete session configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub display: DisplayConfig,
    pub chart: ChartConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Maximum number of rows rendered in a preview.
    pub preview_rows: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    /// Maximum number of rows charted per series.
    pub row_limit: usize,
    /// Rendered canvas size in pixels.
    pub width: u32,
    pub height: u32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self { preview_rows: 20 }
    }
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            row_limit: 10_000,
            width: 800,
            height: 480,
        }
    }
}

impl SessionConfig {
    /// Parse a TOML fragment; missing keys fall back to defaults.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }
}
