//! DPS aggregation
//!
//! Runs beside the death analysis over the same boss filter. Each attempt's
//! damage table is scaled by the attempt's effective duration (the requested
//! window clipped to the attempt) and folded per player. A player's average is
//! time-weighted: total damage over total effective time.

pub mod baseline;
pub mod stats;

pub use baseline::{SpecRanking, baselines_from_rankings, compare_to_spec};

use hashbrown::HashMap;

use crate::aggregate::BossFilter;
use crate::source::DamageTable;
use crate::tally::OrderedTally;
use wipecall_types::{DpsReport, PlayerDpsStats, SpecBaseline, TimeWindow};

/// Parameters of one DPS aggregation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DpsRequest {
    pub session_ids: Vec<String>,
    pub boss_name: String,
    pub difficulty: Option<u32>,
    pub window: TimeWindow,
    /// Region for spec baselines; the configured default when absent
    pub region: Option<String>,
}

impl DpsRequest {
    pub fn new(session_ids: Vec<String>, boss_name: impl Into<String>) -> Self {
        Self {
            session_ids,
            boss_name: boss_name.into(),
            ..Default::default()
        }
    }

    pub fn with_difficulty(mut self, difficulty: Option<u32>) -> Self {
        self.difficulty = difficulty;
        self
    }

    pub fn with_window(mut self, window: TimeWindow) -> Self {
        self.window = window;
        self
    }

    pub fn filter(&self) -> BossFilter {
        BossFilter::new(&self.boss_name, self.difficulty)
    }
}

#[derive(Debug, Default)]
struct PlayerDps {
    spec: Option<String>,
    total_damage: i64,
    total_time: f64,
    fights: u32,
    samples: Vec<f64>,
}

/// Per-player damage totals across attempts.
#[derive(Debug, Default)]
pub struct DpsAccumulator {
    players: OrderedTally<String, PlayerDps>,
    excluded_types: Vec<String>,
    total_fights: u32,
    total_duration: f64,
}

impl DpsAccumulator {
    pub fn new(excluded_types: &[String]) -> Self {
        Self {
            excluded_types: excluded_types.to_vec(),
            ..Default::default()
        }
    }

    /// Fold one attempt's table. Returns false, and ignores the table, when
    /// the effective duration is not positive.
    ///
    /// A row without its own spec takes the actor's subtype from the table's
    /// directory.
    pub fn add_table(&mut self, table: &DamageTable, effective_duration: f64) -> bool {
        if effective_duration <= 0.0 {
            return false;
        }
        self.total_fights += 1;
        self.total_duration += effective_duration;

        let directory_specs: HashMap<i64, &str> = table
            .master_data
            .iter()
            .flat_map(|data| &data.actors)
            .filter_map(|actor| Some((actor.id, actor.sub_type.as_deref()?)))
            .collect();

        for entry in &table.entries {
            if self.excluded_types.iter().any(|kind| *kind == entry.kind) {
                continue;
            }
            let player = self.players.entry(entry.name.clone());
            if player.spec.is_none() {
                player.spec = entry
                    .spec
                    .as_deref()
                    .filter(|s| !s.is_empty())
                    .or_else(|| directory_specs.get(&entry.id).copied())
                    .filter(|s| !s.is_empty())
                    .map(str::to_string);
            }
            player.total_damage += entry.total;
            player.total_time += effective_duration;
            player.fights += 1;
            player.samples.push(entry.total as f64 / effective_duration);
        }
        true
    }

    pub fn total_fights(&self) -> u32 {
        self.total_fights
    }

    /// Final report, players sorted by average DPS (highest first).
    pub fn finish(
        self,
        filter: &BossFilter,
        window: TimeWindow,
        baselines: Option<&HashMap<String, SpecBaseline>>,
    ) -> DpsReport {
        let mut players: Vec<PlayerDpsStats> = self
            .players
            .into_entries()
            .into_iter()
            .map(|(name, player)| {
                let average_dps = if player.total_time > 0.0 {
                    player.total_damage as f64 / player.total_time
                } else {
                    0.0
                };
                let spec_comparison = player
                    .spec
                    .as_ref()
                    .and_then(|spec| baselines?.get(spec))
                    .and_then(|baseline| compare_to_spec(average_dps, baseline));

                PlayerDpsStats {
                    name,
                    average_dps,
                    median_dps: stats::median(&player.samples),
                    min_dps: player.samples.iter().copied().fold(f64::INFINITY, f64::min),
                    max_dps: player.samples.iter().copied().fold(f64::NEG_INFINITY, f64::max),
                    total_damage: player.total_damage,
                    fight_count: player.fights,
                    consistency: stats::consistency(&player.samples, average_dps),
                    spec: player.spec,
                    spec_comparison,
                }
            })
            .collect();
        players.sort_by(|a, b| b.average_dps.total_cmp(&a.average_dps));

        let averages: Vec<f64> = players.iter().map(|p| p.average_dps).collect();
        let average_fight_duration = if self.total_fights > 0 {
            self.total_duration / self.total_fights as f64
        } else {
            0.0
        };

        DpsReport {
            boss_name: filter.boss_name().to_string(),
            difficulty: filter.difficulty(),
            total_fights: self.total_fights,
            average_fight_duration,
            time_filter: window,
            global_average_dps: stats::mean(&averages),
            players,
        }
    }
}
