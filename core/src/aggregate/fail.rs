//! Death rankings: who dies, to what, and who opens the wipes.

use std::collections::BTreeMap;

use crate::tally::OrderedTally;
use wipecall_types::{
    AbilityDeathCount, AbilityFailStats, AttemptCriticalDeaths, CriticalDeath, DeadlyCombo,
    FightComparison, FirstDeath, NightCriticalDeaths, PlayerFailStats,
};

#[derive(Debug, Default)]
struct PlayerTally {
    deaths: u32,
    by_ability: BTreeMap<String, u32>,
    time_sum: f64,
    first_deaths: u32,
}

#[derive(Debug, Default)]
struct AbilityTally {
    kills: u32,
    victims: BTreeMap<String, u32>,
    time_sum: f64,
}

/// Accumulates pre-wipe-call deaths across attempts.
#[derive(Debug, Default)]
pub(super) struct FailTally {
    players: OrderedTally<String, PlayerTally>,
    abilities: OrderedTally<String, AbilityTally>,
    combos: OrderedTally<(String, String), u32>,
    /// Processing order
    first_deaths: Vec<FirstDeath>,
}

impl FailTally {
    pub fn add(&mut self, fight: &FightComparison) {
        let mut deaths = fight.death_analysis.pre_wipe_deaths().peekable();

        if !fight.kill
            && let Some(first) = deaths.peek()
        {
            self.first_deaths.push(FirstDeath {
                player: first.player_name.clone(),
                ability: first.killing_ability.clone(),
                time_secs: first.fight_time_secs,
                attempt_number: fight.attempt_number,
                date: fight.session_date.clone(),
            });
            self.players.entry(first.player_name.clone()).first_deaths += 1;
        }

        for death in deaths {
            let player = self.players.entry(death.player_name.clone());
            player.deaths += 1;
            player.time_sum += death.fight_time_secs;
            *player
                .by_ability
                .entry(death.killing_ability.clone())
                .or_default() += 1;

            let ability = self.abilities.entry(death.killing_ability.clone());
            ability.kills += 1;
            ability.time_sum += death.fight_time_secs;
            *ability
                .victims
                .entry(death.player_name.clone())
                .or_default() += 1;

            *self
                .combos
                .entry((death.player_name.clone(), death.killing_ability.clone())) += 1;
        }
    }

    pub fn most_deadly_abilities(&self, limit: usize) -> Vec<AbilityDeathCount> {
        let mut counts: Vec<AbilityDeathCount> = self
            .abilities
            .iter()
            .map(|(ability, tally)| AbilityDeathCount {
                ability: ability.clone(),
                death_count: tally.kills,
            })
            .collect();
        counts.sort_by(|a, b| b.death_count.cmp(&a.death_count));
        counts.truncate(limit);
        counts
    }

    pub fn deadly_combos(&self, min_count: u32, limit: usize) -> Vec<DeadlyCombo> {
        let mut combos: Vec<DeadlyCombo> = self
            .combos
            .iter()
            .filter(|&(_, &count)| count >= min_count)
            .map(|((player, ability), &count)| DeadlyCombo {
                player: player.clone(),
                ability: ability.clone(),
                count,
            })
            .collect();
        combos.sort_by(|a, b| b.count.cmp(&a.count));
        combos.truncate(limit);
        combos
    }

    /// The earliest recorded first deaths, in processing order.
    pub fn first_deaths(&self, limit: usize) -> Vec<FirstDeath> {
        self.first_deaths.iter().take(limit).cloned().collect()
    }

    pub fn into_rankings(self) -> (Vec<PlayerFailStats>, Vec<AbilityFailStats>) {
        let mut players: Vec<PlayerFailStats> = self
            .players
            .into_entries()
            .into_iter()
            .map(|(player_name, tally)| PlayerFailStats {
                player_name,
                total_deaths: tally.deaths,
                average_death_time: average(tally.time_sum, tally.deaths),
                deaths_by_ability: tally.by_ability,
                first_death_count: tally.first_deaths,
            })
            .collect();
        players.sort_by(|a, b| b.total_deaths.cmp(&a.total_deaths));

        let mut abilities: Vec<AbilityFailStats> = self
            .abilities
            .into_entries()
            .into_iter()
            .map(|(ability_name, tally)| AbilityFailStats {
                ability_name,
                total_kills: tally.kills,
                average_kill_time: average(tally.time_sum, tally.kills),
                player_victims: tally.victims,
            })
            .collect();
        abilities.sort_by(|a, b| b.total_kills.cmp(&a.total_kills));

        (players, abilities)
    }
}

fn average(sum: f64, count: u32) -> f64 {
    if count == 0 { 0.0 } else { sum / count as f64 }
}

/// Opening deaths of every attempt, grouped by raid night.
///
/// Consecutive comparisons sharing a session form one night. Kills are listed
/// without death detail.
pub(super) fn critical_deaths_by_night(
    comparisons: &[FightComparison],
    per_attempt: usize,
) -> Vec<NightCriticalDeaths> {
    let mut nights: Vec<NightCriticalDeaths> = Vec::new();

    for fight in comparisons {
        let critical_deaths = if fight.kill {
            Vec::new()
        } else {
            fight
                .death_analysis
                .pre_wipe_deaths()
                .take(per_attempt)
                .enumerate()
                .map(|(i, death)| CriticalDeath {
                    player: death.player_name.clone(),
                    ability: death.killing_ability.clone(),
                    source: death.killing_source.clone().unwrap_or_default(),
                    time_secs: death.fight_time_secs,
                    death_number: i as u32 + 1,
                })
                .collect()
        };

        let attempt = AttemptCriticalDeaths {
            attempt_number: fight.attempt_number,
            fight_percentage: fight.fight_percentage,
            kill: fight.kill,
            critical_deaths,
        };

        match nights.last_mut() {
            Some(night) if night.session_id == fight.session_id => night.attempts.push(attempt),
            _ => nights.push(NightCriticalDeaths {
                date: fight.session_date.clone(),
                session_id: fight.session_id.clone(),
                attempts: vec![attempt],
            }),
        }
    }

    nights
}
