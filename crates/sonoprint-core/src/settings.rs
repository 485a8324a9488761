//! Application settings for Sonoprint
//!
//! TOML configuration selecting the catalog location, the search
//! parameters and optional analysis overrides.

use crate::config::AnalysisConfig;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default)]
    pub catalog: CatalogSettings,
    #[serde(default)]
    pub search: SearchSettings,
    #[serde(default)]
    pub analysis: AnalysisConfig,
}

/// Catalog location
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CatalogSettings {
    #[serde(default = "default_directory")]
    pub directory: String,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            directory: default_directory(),
        }
    }
}

fn default_directory() -> String {
    "./catalog".to_string()
}

/// Search parameters
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchSettings {
    /// Weight of the feature score against the fingerprint score
    #[serde(default = "default_alpha")]
    pub alpha: f64,
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    /// Candidate count above which scoring is spread over the worker pool
    #[serde(default = "default_parallel_threshold")]
    pub parallel_threshold: usize,
    /// Worker pool size, 0 lets rayon decide
    #[serde(default)]
    pub max_workers: usize,
    /// Per-search deadline in milliseconds, 0 disables it
    #[serde(default)]
    pub timeout_ms: u64,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            alpha: default_alpha(),
            top_n: default_top_n(),
            parallel_threshold: default_parallel_threshold(),
            max_workers: 0,
            timeout_ms: 0,
        }
    }
}

fn default_alpha() -> f64 {
    0.65
}
fn default_top_n() -> usize {
    5
}
fn default_parallel_threshold() -> usize {
    64
}

impl SearchSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.alpha) {
            return Err(ConfigError(format!(
                "search.alpha must be within [0, 1], got {}",
                self.alpha
            )));
        }
        if self.top_n == 0 {
            return Err(ConfigError("search.top_n must be > 0".into()));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_ms > 0).then(|| Duration::from_millis(self.timeout_ms))
    }
}

impl Settings {
    /// Load configuration from TOML file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config file {}: {}", path.display(), e))?;
        let settings: Settings = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse TOML config {}: {}", path.display(), e))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load from `path` when it exists, otherwise fall back to defaults
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            log::debug!("No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.analysis.validate()?;
        self.search.validate()
    }
}
