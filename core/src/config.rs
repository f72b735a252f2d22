//! Analysis configuration
//!
//! Thresholds for wipe-call detection and the caps applied to report lists.
//! Loaded from a TOML file; every field has a default, so a partial file
//! (or none at all) is valid.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use wipecall_types::UNKNOWN_DAMAGE;

/// Tunables for the wipe-call detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WipeCallConfig {
    /// Deaths that must pile up inside one window
    pub min_deaths: usize,
    /// Maximum span of that window, in seconds
    pub window_secs: f64,
    /// Window must start past this fraction of the attempt duration
    pub min_fight_fraction: f64,
}

impl Default for WipeCallConfig {
    fn default() -> Self {
        Self {
            min_deaths: 5,
            window_secs: 10.0,
            min_fight_fraction: 0.5,
        }
    }
}

/// Caps on the lists a comparison report returns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportLimits {
    pub top_abilities: usize,
    pub max_combos: usize,
    pub min_combo_count: u32,
    pub max_first_deaths: usize,
    pub critical_deaths_per_attempt: usize,
}

impl Default for ReportLimits {
    fn default() -> Self {
        Self {
            top_abilities: 10,
            max_combos: 15,
            min_combo_count: 2,
            max_first_deaths: 20,
            critical_deaths_per_attempt: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DpsConfig {
    /// Damage-table actor types that never count as players
    pub excluded_actor_types: Vec<String>,
    /// Difficulty used for spec baselines when the request has none
    pub baseline_difficulty: u32,
    pub baseline_region: String,
}

impl Default for DpsConfig {
    fn default() -> Self {
        Self {
            excluded_actor_types: vec!["Pet".to_string(), "NPC".to_string()],
            baseline_difficulty: 4,
            baseline_region: "EU".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub unknown_damage_label: String,
    pub wipe_call: WipeCallConfig,
    pub limits: ReportLimits,
    pub dps: DpsConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            unknown_damage_label: UNKNOWN_DAMAGE.to_string(),
            wipe_call: WipeCallConfig::default(),
            limits: ReportLimits::default(),
            dps: DpsConfig::default(),
        }
    }
}

/// Load an analysis config from a TOML file
pub fn load_file(path: &Path) -> Result<AnalysisConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    toml::from_str(&contents).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Save an analysis config to a TOML file
pub fn save_file(path: &Path, config: &AnalysisConfig) -> Result<(), ConfigError> {
    let contents = toml::to_string_pretty(config).map_err(|e| ConfigError::Serialize {
        path: path.to_path_buf(),
        source: e,
    })?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    fs::write(path, contents).map_err(|e| ConfigError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Default location of the analysis config
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("wipecall").join("analysis.toml"))
}

/// Errors that can occur during config loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Parse error in {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Serialize error for {path:?}: {source}")]
    Serialize {
        path: PathBuf,
        source: toml::ser::Error,
    },
}
