//! Report types shared between the analysis core and its consumers.
//!
//! Everything here is a plain value object: built once by an analysis pass,
//! serialized as-is, never mutated afterwards. Maps that reach the output are
//! `BTreeMap`s so serialized reports are byte-stable across runs.

pub mod formatting;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Label used when a death carries no resolvable killing ability.
pub const UNKNOWN_DAMAGE: &str = "Unknown Damage";

// ─────────────────────────────────────────────────────────────────────────────
// Single attempt
// ─────────────────────────────────────────────────────────────────────────────

/// One player death inside an attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeathEvent {
    /// Upstream timestamp in milliseconds (session clock)
    pub timestamp: i64,
    pub player_name: String,
    pub player_id: i64,
    pub killing_ability: String,
    pub killing_ability_id: Option<i64>,
    pub killing_source: Option<String>,
    /// Seconds since the attempt started
    pub fight_time_secs: f64,
    pub is_after_wipe_call: bool,
}

/// Death breakdown of a single attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeathAnalysis {
    pub attempt_id: i64,
    pub attempt_name: String,
    pub total_deaths: u32,
    pub deaths_before_wipe: u32,
    pub deaths_after_wipe: u32,
    /// Estimated moment the raid gave up, in seconds since pull
    pub wipe_call_secs: Option<f64>,
    /// Sorted by `fight_time_secs`
    pub deaths: Vec<DeathEvent>,
}

impl DeathAnalysis {
    /// Deaths that happened while the attempt was still being played.
    pub fn pre_wipe_deaths(&self) -> impl Iterator<Item = &DeathEvent> {
        self.deaths.iter().filter(|d| !d.is_after_wipe_call)
    }
}

/// One attempt as seen by a cross-session comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FightComparison {
    pub session_id: String,
    /// `YYYY-MM-DD` of the session start (UTC)
    pub session_date: String,
    pub attempt_id: i64,
    /// 1-based position among the session's attempts matching the boss filter
    pub attempt_number: u32,
    pub duration_secs: f64,
    pub kill: bool,
    /// Boss health remaining at the end of the attempt
    pub fight_percentage: Option<f64>,
    /// Players known to be in the raid for this attempt, when the source reports it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roster: Option<Vec<String>>,
    pub death_analysis: DeathAnalysis,
}

// ─────────────────────────────────────────────────────────────────────────────
// Fail analysis
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerFailStats {
    pub player_name: String,
    pub total_deaths: u32,
    pub deaths_by_ability: BTreeMap<String, u32>,
    pub average_death_time: f64,
    /// Times this player opened the death log of a wipe
    pub first_death_count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbilityFailStats {
    pub ability_name: String,
    pub total_kills: u32,
    pub player_victims: BTreeMap<String, u32>,
    pub average_kill_time: f64,
}

/// A (player, ability) pair that keeps recurring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeadlyCombo {
    pub player: String,
    pub ability: String,
    pub count: u32,
}

/// Deaths falling into one fight-time bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseDeaths {
    pub phase: String,
    pub count: u32,
    /// Distinct victims, first-seen order
    pub players: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FirstDeath {
    pub player: String,
    pub ability: String,
    pub time_secs: f64,
    pub attempt_number: u32,
    pub date: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriticalDeath {
    pub player: String,
    pub ability: String,
    pub source: String,
    pub time_secs: f64,
    /// 1-based rank within the attempt
    pub death_number: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptCriticalDeaths {
    pub attempt_number: u32,
    pub fight_percentage: Option<f64>,
    pub kill: bool,
    /// Empty for kills
    pub critical_deaths: Vec<CriticalDeath>,
}

/// All attempts of one session (raid night) with their opening deaths.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NightCriticalDeaths {
    pub date: String,
    pub session_id: String,
    pub attempts: Vec<AttemptCriticalDeaths>,
}

/// Survival profile of one player across a comparison.
///
/// Presence comes from the attempt roster when the source provides one. Without
/// a roster the only signal is the death log, so every analyzed attempt counts
/// as present and an attempt without a recorded death counts as survived; a
/// player absent that night is indistinguishable from one who survived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSurvivalStats {
    pub player_name: String,
    pub total_fights_present: u32,
    pub total_deaths: u32,
    pub deaths_before_wipe_call: u32,
    pub deaths_after_wipe_call: u32,
    pub fights_survived_full: u32,
    pub average_survival_time: f64,
    pub average_survival_time_before_wipe: f64,
    pub average_survival_time_after_wipe: f64,
    pub survival_times: Vec<f64>,
    pub survival_times_before_wipe: Vec<f64>,
    pub survival_times_after_wipe: Vec<f64>,
    /// Duration of every attempt the player was present for
    pub fight_durations: Vec<f64>,
    /// Percent of present attempts survived
    pub survival_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailAnalysis {
    pub player_ranking: Vec<PlayerFailStats>,
    pub ability_ranking: Vec<AbilityFailStats>,
    pub deadly_combos: Vec<DeadlyCombo>,
    pub deaths_by_phase: Vec<PhaseDeaths>,
    pub first_deaths: Vec<FirstDeath>,
    pub critical_deaths_by_night: Vec<NightCriticalDeaths>,
    pub survival_stats: Vec<PlayerSurvivalStats>,
    pub global_average_survival: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbilityDeathCount {
    pub ability: String,
    pub death_count: u32,
}

/// Everything known about one boss across the compared sessions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BossComparison {
    pub boss_name: String,
    pub difficulty: Option<u32>,
    pub comparisons: Vec<FightComparison>,
    pub total_attempts: u32,
    pub total_kills: u32,
    pub total_wipes: u32,
    /// Mean pre-wipe-call death count over wipes only
    pub average_deaths_before_wipe: f64,
    pub most_deadly_abilities: Vec<AbilityDeathCount>,
    pub fail_analysis: FailAnalysis,
}

/// A boss as it appears across a set of sessions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BossSummary {
    pub name: String,
    pub encounter_id: i64,
    pub difficulty: Option<u32>,
    pub attempts: u32,
    pub kills: u32,
}

// ─────────────────────────────────────────────────────────────────────────────
// DPS
// ─────────────────────────────────────────────────────────────────────────────

/// Optional slice of an attempt, in seconds since pull. Either end may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start_secs: Option<f64>,
    pub end_secs: Option<f64>,
}

impl TimeWindow {
    pub fn new(start_secs: Option<f64>, end_secs: Option<f64>) -> Self {
        Self { start_secs, end_secs }
    }

    pub fn is_open(&self) -> bool {
        self.start_secs.is_none() && self.end_secs.is_none()
    }

    /// Length of the window clipped to an attempt of `duration_secs`.
    ///
    /// May be zero or negative when the window lies past the end of the attempt.
    pub fn effective_duration(&self, duration_secs: f64) -> f64 {
        let end = self.end_secs.map_or(duration_secs, |end| end.min(duration_secs));
        end - self.start_secs.unwrap_or(0.0)
    }

    /// Whether a point in fight time falls inside `[start, end)`.
    pub fn contains(&self, fight_time_secs: f64) -> bool {
        self.start_secs.is_none_or(|start| fight_time_secs >= start)
            && self.end_secs.is_none_or(|end| fight_time_secs < end)
    }
}

/// Reference DPS for a specialization on an encounter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecBaseline {
    pub average_dps: f64,
    pub median_dps: f64,
    pub sample_size: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecComparison {
    pub spec_average_dps: f64,
    pub spec_median_dps: f64,
    /// Player average as a percentage of the spec average
    pub vs_average: f64,
    /// Player average as a percentage of the spec median
    pub vs_median: f64,
    pub sample_size: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerDpsStats {
    pub name: String,
    pub spec: Option<String>,
    /// Total damage over total effective time
    pub average_dps: f64,
    pub median_dps: f64,
    pub min_dps: f64,
    pub max_dps: f64,
    pub total_damage: i64,
    pub fight_count: u32,
    /// 0..=100, higher is steadier
    pub consistency: i32,
    pub spec_comparison: Option<SpecComparison>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DpsReport {
    pub boss_name: String,
    pub difficulty: Option<u32>,
    pub total_fights: u32,
    pub average_fight_duration: f64,
    pub time_filter: TimeWindow,
    pub global_average_dps: f64,
    /// Sorted by average DPS, highest first
    pub players: Vec<PlayerDpsStats>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_duration_open_window() {
        assert!(TimeWindow::default().is_open());
        assert!(!TimeWindow::new(None, Some(90.0)).is_open());
        assert_eq!(TimeWindow::default().effective_duration(240.0), 240.0);
    }

    #[test]
    fn test_effective_duration_clipped() {
        assert_eq!(TimeWindow::new(Some(30.0), Some(60.0)).effective_duration(240.0), 30.0);
        assert_eq!(TimeWindow::new(Some(30.0), Some(600.0)).effective_duration(240.0), 210.0);
        assert_eq!(TimeWindow::new(None, Some(90.0)).effective_duration(60.0), 60.0);
        assert_eq!(TimeWindow::new(Some(100.0), None).effective_duration(240.0), 140.0);
    }

    #[test]
    fn test_effective_duration_past_end() {
        assert!(TimeWindow::new(Some(300.0), None).effective_duration(240.0) <= 0.0);
        assert!(TimeWindow::new(Some(300.0), Some(400.0)).effective_duration(240.0) <= 0.0);
    }

    #[test]
    fn test_window_contains_is_half_open() {
        let window = TimeWindow::new(Some(30.0), Some(60.0));
        assert!(window.contains(30.0));
        assert!(window.contains(59.9));
        assert!(!window.contains(60.0));
        assert!(!window.contains(29.9));
        assert!(TimeWindow::default().contains(-5.0));
    }

    #[test]
    fn test_comparison_roster_omitted_when_absent() {
        let fight = FightComparison {
            session_id: "abc".to_string(),
            session_date: "2025-01-07".to_string(),
            attempt_id: 3,
            attempt_number: 1,
            duration_secs: 120.0,
            kill: false,
            fight_percentage: Some(42.0),
            roster: None,
            death_analysis: DeathAnalysis {
                attempt_id: 3,
                attempt_name: "Boss".to_string(),
                total_deaths: 0,
                deaths_before_wipe: 0,
                deaths_after_wipe: 0,
                wipe_call_secs: None,
                deaths: vec![],
            },
        };
        let json = serde_json::to_string(&fight).unwrap();
        assert!(!json.contains("roster"));
    }
}
