//! Per-player survival profile.
//!
//! An attempt carrying a roster makes presence exact: the roster plus anyone
//! found in that attempt's death log. Attempts without a roster count as
//! present for every player of the table (see [`PlayerSurvivalStats`]).

use hashbrown::HashSet;

use crate::dps::stats::mean;
use crate::tally::OrderedTally;
use wipecall_types::{FightComparison, PlayerSurvivalStats};

#[derive(Debug, Default)]
struct SurvivalTally {
    deaths_before: u32,
    deaths_after: u32,
    survived: u32,
    times: Vec<f64>,
    times_before: Vec<f64>,
    times_after: Vec<f64>,
    durations: Vec<f64>,
}

impl SurvivalTally {
    fn finish(self, player_name: String) -> PlayerSurvivalStats {
        let present = self.durations.len() as u32;
        let survival_rate = if present > 0 {
            self.survived as f64 / present as f64 * 100.0
        } else {
            0.0
        };

        PlayerSurvivalStats {
            player_name,
            total_fights_present: present,
            total_deaths: self.deaths_before + self.deaths_after,
            deaths_before_wipe_call: self.deaths_before,
            deaths_after_wipe_call: self.deaths_after,
            fights_survived_full: self.survived,
            average_survival_time: mean(&self.times),
            average_survival_time_before_wipe: mean(&self.times_before),
            average_survival_time_after_wipe: mean(&self.times_after),
            survival_times: self.times,
            survival_times_before_wipe: self.times_before,
            survival_times_after_wipe: self.times_after,
            fight_durations: self.durations,
            survival_rate,
        }
    }
}

/// Survival table sorted by average survival time (longest first, then by
/// name), plus the mean of every recorded death time.
pub(super) fn survival_stats(comparisons: &[FightComparison]) -> (Vec<PlayerSurvivalStats>, f64) {
    let mut tally: OrderedTally<String, SurvivalTally> = OrderedTally::new();
    for fight in comparisons {
        let roster = fight.roster.iter().flatten();
        let victims = fight.death_analysis.deaths.iter().map(|d| &d.player_name);
        for name in roster.chain(victims) {
            tally.entry(name.clone());
        }
    }
    let names: Vec<String> = tally.iter().map(|(name, _)| name.clone()).collect();

    for fight in comparisons {
        let deaths = &fight.death_analysis.deaths;
        let present: Option<HashSet<&str>> = fight.roster.as_ref().map(|roster| {
            roster
                .iter()
                .map(String::as_str)
                .chain(deaths.iter().map(|d| d.player_name.as_str()))
                .collect()
        });

        for name in &names {
            if present
                .as_ref()
                .is_some_and(|present| !present.contains(name.as_str()))
            {
                continue;
            }

            let player = tally.entry(name.clone());
            player.durations.push(fight.duration_secs);

            let mut died = false;
            for death in deaths.iter().filter(|d| &d.player_name == name) {
                died = true;
                player.times.push(death.fight_time_secs);
                if death.is_after_wipe_call {
                    player.deaths_after += 1;
                    player.times_after.push(death.fight_time_secs);
                } else {
                    player.deaths_before += 1;
                    player.times_before.push(death.fight_time_secs);
                }
            }
            if !died {
                player.survived += 1;
            }
        }
    }

    let mut stats: Vec<PlayerSurvivalStats> = tally
        .into_entries()
        .into_iter()
        .map(|(name, player)| player.finish(name))
        .collect();
    stats.sort_by(|a, b| {
        b.average_survival_time
            .total_cmp(&a.average_survival_time)
            .then_with(|| a.player_name.cmp(&b.player_name))
    });

    let samples: Vec<f64> = stats
        .iter()
        .flat_map(|s| s.survival_times.iter().copied())
        .collect();
    let global_average = mean(&samples);

    (stats, global_average)
}
