use std::path::PathBuf;

use serde::{Deserialize, Serialize};

const APP_NAME: &str = "wipecall";

/// Persistent CLI settings, stored by confy in the user's config directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CliSettings {
    /// Directory holding one JSON dump per session
    pub data_directory: PathBuf,
    /// Analysis thresholds; the default analysis config path when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis_config: Option<PathBuf>,
    /// Print numbers with `,` decimals and `.` thousands
    pub european_numbers: bool,
}

impl Default for CliSettings {
    fn default() -> Self {
        Self {
            data_directory: dirs::data_dir()
                .map(|d| d.join(APP_NAME).join("sessions"))
                .unwrap_or_else(|| PathBuf::from("sessions")),
            analysis_config: None,
            european_numbers: false,
        }
    }
}

impl CliSettings {
    pub fn load() -> Self {
        match confy::load(APP_NAME, None) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load settings, using defaults");
                Self::default()
            }
        }
    }

    pub fn store(&self) -> Result<(), String> {
        confy::store(APP_NAME, None, self).map_err(|e| e.to_string())
    }
}
