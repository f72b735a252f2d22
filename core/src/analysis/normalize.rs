//! Raw death events → canonical, time-sorted `DeathEvent`s.

use hashbrown::HashMap;

use crate::source::{Actor, MasterData, RawDeathEvent};
use wipecall_types::DeathEvent;

/// Actor and ability lookups for one session.
///
/// Built from optional master data: a session without directories yields an
/// empty directory, which resolves nothing and never fails.
#[derive(Debug, Default)]
pub struct Directory<'a> {
    actors: HashMap<i64, &'a Actor>,
    abilities: HashMap<i64, &'a str>,
}

impl<'a> Directory<'a> {
    pub fn new(master_data: Option<&'a MasterData>) -> Self {
        let Some(data) = master_data else {
            return Self::default();
        };
        Self {
            actors: data.actors.iter().map(|a| (a.id, a)).collect(),
            abilities: data
                .abilities
                .iter()
                .map(|a| (a.game_id, a.name.as_str()))
                .collect(),
        }
    }

    pub fn actor(&self, id: i64) -> Option<&'a Actor> {
        self.actors.get(&id).copied()
    }

    pub fn ability_name(&self, id: i64) -> Option<&'a str> {
        self.abilities.get(&id).copied()
    }

    /// The actor behind `id`, if it is a player.
    pub fn player(&self, id: i64) -> Option<&'a Actor> {
        self.actor(id).filter(|a| a.is_player())
    }
}

fn killing_ability_id(event: &RawDeathEvent) -> Option<i64> {
    event
        .killing_ability_id
        .or_else(|| event.ability.as_ref().and_then(|a| a.guid))
}

/// Killing ability name for an event.
///
/// Fallback order: inline ability name, then ability directory by id, then `fallback`.
pub fn resolve_ability_name(event: &RawDeathEvent, directory: &Directory, fallback: &str) -> String {
    event
        .ability
        .as_ref()
        .and_then(|a| a.name.as_deref())
        .filter(|name| !name.is_empty())
        .or_else(|| killing_ability_id(event).and_then(|id| directory.ability_name(id)))
        .unwrap_or(fallback)
        .to_string()
}

/// Convert one attempt's raw events into player deaths sorted by fight time.
///
/// Non-death events and deaths of anything that is not a player (pets, NPCs,
/// unknown actors) are dropped. The sort is stable, so deaths sharing a
/// timestamp keep their upstream order.
pub fn normalize_deaths(
    events: &[RawDeathEvent],
    directory: &Directory,
    attempt_start: i64,
    unknown_label: &str,
) -> Vec<DeathEvent> {
    let mut deaths: Vec<DeathEvent> = events
        .iter()
        .filter(|event| event.is_death())
        .filter_map(|event| {
            let victim = directory.player(event.target_id?)?;
            Some(DeathEvent {
                timestamp: event.timestamp,
                player_name: victim.name.clone(),
                player_id: victim.id,
                killing_ability: resolve_ability_name(event, directory, unknown_label),
                killing_ability_id: killing_ability_id(event),
                killing_source: event
                    .killer_id
                    .and_then(|id| directory.actor(id))
                    .map(|a| a.name.clone()),
                fight_time_secs: (event.timestamp - attempt_start) as f64 / 1000.0,
                is_after_wipe_call: false,
            })
        })
        .collect();

    deaths.sort_by(|a, b| a.fight_time_secs.total_cmp(&b.fight_time_secs));
    deaths
}
