//! Wipe-call detection
//!
//! A raid calls the wipe when deaths pile up fast enough, late enough, that
//! the pull cannot be recovered. The detector slides a window of
//! `min_deaths` consecutive deaths over the sorted death list and returns the
//! start of the first window that is both tight (`window_secs`) and late
//! (starts after `min_fight_fraction` of the attempt).

use crate::config::WipeCallConfig;
use wipecall_types::DeathEvent;

/// Fight time (seconds) of the estimated wipe call, if any.
///
/// `deaths` must be sorted by `fight_time_secs`. Fewer deaths than the window
/// size never produce a wipe call. When several windows qualify, the earliest wins.
pub fn detect_wipe_call(
    deaths: &[DeathEvent],
    duration_secs: f64,
    config: &WipeCallConfig,
) -> Option<f64> {
    debug_assert!(
        deaths
            .windows(2)
            .all(|w| w[0].fight_time_secs <= w[1].fight_time_secs),
        "deaths must be sorted by fight time"
    );

    let size = config.min_deaths.max(1);
    if deaths.len() < size {
        return None;
    }

    let earliest_start = duration_secs * config.min_fight_fraction;
    deaths
        .windows(size)
        .map(|w| (w[0].fight_time_secs, w[size - 1].fight_time_secs))
        .find(|&(start, end)| end - start <= config.window_secs && start > earliest_start)
        .map(|(start, _)| start)
}
