//! Cross-attempt aggregation
//!
//! Folds the per-attempt [`FightComparison`]s of one boss into a
//! [`BossComparison`]. The fold is pure: it owns its accumulators for the
//! duration of one call and visits attempts in the order given (session order,
//! then attempt order within a session), which is what makes "first death" and
//! "most recent" semantics reproducible.
//!
//! ```text
//! comparisons ──┬── fail::FailTally ─────► rankings, combos, first deaths
//!               ├── phase ───────────────► deaths_by_phase
//!               ├── fail::critical_deaths_by_night
//!               └── survival ────────────► survival_stats, global average
//! ```

pub mod bosses;
mod fail;
mod phase;
mod survival;

#[cfg(test)]
mod aggregate_tests;

pub use bosses::list_bosses;
pub use phase::{PHASES, phase_label};

use crate::config::AnalysisConfig;
use crate::session::AttemptInfo;
use wipecall_types::{BossComparison, FailAnalysis, FightComparison};

use fail::{FailTally, critical_deaths_by_night};

/// Which attempts of a session belong to a boss.
#[derive(Debug, Clone, PartialEq)]
pub struct BossFilter {
    name: String,
    needle: String,
    difficulty: Option<u32>,
}

impl BossFilter {
    pub fn new(boss_name: &str, difficulty: Option<u32>) -> Self {
        Self {
            name: boss_name.to_string(),
            needle: boss_name.to_lowercase(),
            difficulty,
        }
    }

    /// Case-insensitive substring match on the name, exact match on difficulty when set.
    pub fn matches(&self, attempt: &AttemptInfo) -> bool {
        attempt.name.to_lowercase().contains(&self.needle)
            && self
                .difficulty
                .is_none_or(|difficulty| attempt.difficulty == Some(difficulty))
    }

    pub fn boss_name(&self) -> &str {
        &self.name
    }

    pub fn difficulty(&self) -> Option<u32> {
        self.difficulty
    }
}

/// Build the full comparison report for one boss.
pub fn summarize(
    filter: &BossFilter,
    comparisons: Vec<FightComparison>,
    config: &AnalysisConfig,
) -> BossComparison {
    let limits = &config.limits;

    let mut tally = FailTally::default();
    for fight in &comparisons {
        tally.add(fight);
    }

    let pre_wipe = comparisons
        .iter()
        .flat_map(|fight| fight.death_analysis.pre_wipe_deaths());
    let deaths_by_phase = phase::deaths_by_phase(pre_wipe);
    let critical_deaths_by_night =
        critical_deaths_by_night(&comparisons, limits.critical_deaths_per_attempt);
    let (survival_stats, global_average_survival) = survival::survival_stats(&comparisons);

    let total_attempts = comparisons.len() as u32;
    let total_kills = comparisons.iter().filter(|c| c.kill).count() as u32;
    let total_wipes = total_attempts - total_kills;

    let wipe_deaths: u32 = comparisons
        .iter()
        .filter(|c| !c.kill)
        .map(|c| c.death_analysis.deaths_before_wipe)
        .sum();
    let average_deaths_before_wipe = if total_wipes > 0 {
        wipe_deaths as f64 / total_wipes as f64
    } else {
        0.0
    };

    let most_deadly_abilities = tally.most_deadly_abilities(limits.top_abilities);
    let deadly_combos = tally.deadly_combos(limits.min_combo_count, limits.max_combos);
    let first_deaths = tally.first_deaths(limits.max_first_deaths);
    let (player_ranking, ability_ranking) = tally.into_rankings();

    BossComparison {
        boss_name: filter.boss_name().to_string(),
        difficulty: filter.difficulty(),
        comparisons,
        total_attempts,
        total_kills,
        total_wipes,
        average_deaths_before_wipe,
        most_deadly_abilities,
        fail_analysis: FailAnalysis {
            player_ranking,
            ability_ranking,
            deadly_combos,
            deaths_by_phase,
            first_deaths,
            critical_deaths_by_night,
            survival_stats,
            global_average_survival,
        },
    }
}
