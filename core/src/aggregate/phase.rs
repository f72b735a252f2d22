//! Fight-time histogram of deaths.

use wipecall_types::{DeathEvent, PhaseDeaths};

/// Bucket labels with their exclusive upper bound in seconds.
///
/// Each bucket starts where the previous one ends; the first one also takes
/// anything before the pull.
pub const PHASES: [(&str, f64); 6] = [
    ("0-30s", 30.0),
    ("30s-1min", 60.0),
    ("1-2min", 120.0),
    ("2-3min", 180.0),
    ("3-5min", 300.0),
    ("5min+", f64::INFINITY),
];

fn phase_index(fight_time_secs: f64) -> usize {
    PHASES
        .iter()
        .position(|&(_, upper)| fight_time_secs < upper)
        .unwrap_or(PHASES.len() - 1)
}

pub fn phase_label(fight_time_secs: f64) -> &'static str {
    PHASES[phase_index(fight_time_secs)].0
}

/// Non-empty buckets in fight order, each with its distinct victims.
pub(super) fn deaths_by_phase<'a>(deaths: impl Iterator<Item = &'a DeathEvent>) -> Vec<PhaseDeaths> {
    let mut buckets: [(u32, Vec<String>); PHASES.len()] = std::array::from_fn(|_| (0, Vec::new()));

    for death in deaths {
        let (count, players) = &mut buckets[phase_index(death.fight_time_secs)];
        *count += 1;
        if !players.contains(&death.player_name) {
            players.push(death.player_name.clone());
        }
    }

    PHASES
        .iter()
        .zip(buckets)
        .filter(|(_, (count, _))| *count > 0)
        .map(|(&(phase, _), (count, players))| PhaseDeaths {
            phase: phase.to_string(),
            count,
            players,
        })
        .collect()
}
