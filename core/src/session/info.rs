use chrono::DateTime;
use serde::{Deserialize, Serialize};

use crate::source::lenient;

/// Session (one logged raid night) as reported by the attempt source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    pub code: String,
    #[serde(default)]
    pub title: String,
    /// Session start, milliseconds since the Unix epoch
    pub start_time: i64,
    #[serde(default, rename = "fights")]
    pub attempts: Vec<AttemptInfo>,
}

impl SessionInfo {
    /// Calendar date of the session start as `YYYY-MM-DD` (UTC).
    pub fn date(&self) -> String {
        DateTime::from_timestamp_millis(self.start_time)
            .map(|dt| dt.format("%Y-%m-%d").to_string())
            .unwrap_or_default()
    }

    pub fn attempt(&self, attempt_id: i64) -> Option<&AttemptInfo> {
        self.attempts.iter().find(|a| a.id == attempt_id)
    }
}

/// One pull inside a session.
///
/// Start and end are on the session clock (milliseconds since the session start).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptInfo {
    pub id: i64,
    pub name: String,
    #[serde(default, rename = "encounterID")]
    pub encounter_id: i64,
    pub start_time: i64,
    pub end_time: i64,
    #[serde(default)]
    pub kill: bool,
    #[serde(default, deserialize_with = "lenient")]
    pub difficulty: Option<u32>,
    /// Boss health remaining when the attempt ended
    #[serde(default, deserialize_with = "lenient")]
    pub fight_percentage: Option<f64>,
    /// Actor ids of the players in the raid for this pull, when known
    #[serde(default, deserialize_with = "lenient")]
    pub friendly_players: Option<Vec<i64>>,
}

impl AttemptInfo {
    pub fn duration_secs(&self) -> f64 {
        (self.end_time - self.start_time) as f64 / 1000.0
    }
}
