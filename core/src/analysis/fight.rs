//! Fight analysis: normalize, detect, classify.

use crate::config::AnalysisConfig;
use crate::session::AttemptInfo;
use crate::source::AttemptEvents;
use wipecall_types::{DeathAnalysis, DeathEvent};

use super::normalize::{Directory, normalize_deaths};
use super::wipe_call::detect_wipe_call;

/// Flag deaths after the wipe call and return `(before, after)` counts.
///
/// A death exactly at the wipe-call time opens the wipe and counts as before.
/// Without a wipe call every death counts as before.
pub fn classify_deaths(deaths: &mut [DeathEvent], wipe_call_secs: Option<f64>) -> (u32, u32) {
    let mut before = 0;
    let mut after = 0;
    for death in deaths.iter_mut() {
        death.is_after_wipe_call = wipe_call_secs.is_some_and(|wipe| death.fight_time_secs > wipe);
        if death.is_after_wipe_call {
            after += 1;
        } else {
            before += 1;
        }
    }
    (before, after)
}

/// Build the `DeathAnalysis` of one attempt from its already fetched events.
///
/// Bounds reported by the event query take precedence over the session metadata.
pub fn analyze_attempt_events(
    attempt: &AttemptInfo,
    events: &AttemptEvents,
    config: &AnalysisConfig,
) -> DeathAnalysis {
    let start = events.start_time.unwrap_or(attempt.start_time);
    let end = events.end_time.unwrap_or(attempt.end_time);
    let duration_secs = (end - start) as f64 / 1000.0;

    let directory = Directory::new(events.master_data.as_ref());
    let mut deaths = normalize_deaths(
        &events.events,
        &directory,
        start,
        &config.unknown_damage_label,
    );
    let wipe_call_secs = detect_wipe_call(&deaths, duration_secs, &config.wipe_call);
    let (deaths_before_wipe, deaths_after_wipe) = classify_deaths(&mut deaths, wipe_call_secs);

    tracing::debug!(
        attempt = attempt.id,
        deaths = deaths.len(),
        wipe_call = ?wipe_call_secs,
        "Analyzed attempt"
    );

    DeathAnalysis {
        attempt_id: attempt.id,
        attempt_name: attempt.name.clone(),
        total_deaths: deaths.len() as u32,
        deaths_before_wipe,
        deaths_after_wipe,
        wipe_call_secs,
        deaths,
    }
}

/// Player names of the attempt's roster, when the session reports one.
///
/// Ids that do not resolve to a player actor are dropped.
pub fn resolve_roster(attempt: &AttemptInfo, events: &AttemptEvents) -> Option<Vec<String>> {
    let ids = attempt.friendly_players.as_ref()?;
    let directory = Directory::new(events.master_data.as_ref());
    Some(
        ids.iter()
            .filter_map(|&id| directory.player(id))
            .map(|actor| actor.name.clone())
            .collect(),
    )
}
