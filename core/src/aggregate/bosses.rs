//! Boss list across sessions.

use crate::session::SessionInfo;
use crate::tally::OrderedTally;
use wipecall_types::BossSummary;

#[derive(Debug, Default)]
struct BossTally {
    encounter_id: i64,
    attempts: u32,
    kills: u32,
}

/// Every (boss name, difficulty) pair pulled in `sessions`, first-seen order.
pub fn list_bosses(sessions: &[SessionInfo]) -> Vec<BossSummary> {
    let mut bosses: OrderedTally<(String, Option<u32>), BossTally> = OrderedTally::new();

    for attempt in sessions.iter().flat_map(|s| &s.attempts) {
        let boss = bosses.entry((attempt.name.clone(), attempt.difficulty));
        if boss.attempts == 0 {
            boss.encounter_id = attempt.encounter_id;
        }
        boss.attempts += 1;
        if attempt.kill {
            boss.kills += 1;
        }
    }

    bosses
        .into_entries()
        .into_iter()
        .map(|((name, difficulty), tally)| BossSummary {
            name,
            encounter_id: tally.encounter_id,
            difficulty,
            attempts: tally.attempts,
            kills: tally.kills,
        })
        .collect()
}
