//! Attempt, damage-table and baseline sources
//!
//! The analysis core never talks to the network. Everything it needs comes
//! through the traits below, as plain data shaped like the upstream payloads.
//! Payloads are parsed into a strict schema here: optional fields that are
//! missing, null or of the wrong type are treated as absent, so the rest of
//! the core never has to second-guess upstream shapes.

mod memory;

pub use memory::{
    AttemptDump, DamageSample, EncounterRankings, MemorySource, SessionDump, load_dump,
};

use hashbrown::HashMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::AnalysisError;
use crate::session::SessionInfo;
use wipecall_types::{SpecBaseline, TimeWindow};

/// Deserialize an optional field, turning anything unparseable into `None`.
pub(crate) fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

// ─────────────────────────────────────────────────────────────────────────────
// Raw event schema
// ─────────────────────────────────────────────────────────────────────────────

/// Inline ability reference carried by some death events.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawAbilityRef {
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub guid: Option<i64>,
}

/// A death record as the upstream event stream reports it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawDeathEvent {
    /// Milliseconds on the session clock
    pub timestamp: i64,
    #[serde(default, rename = "type", deserialize_with = "lenient")]
    pub kind: Option<String>,
    #[serde(default, rename = "targetID", deserialize_with = "lenient")]
    pub target_id: Option<i64>,
    #[serde(default, rename = "killerID", deserialize_with = "lenient")]
    pub killer_id: Option<i64>,
    #[serde(default, rename = "killingAbilityGameID", deserialize_with = "lenient")]
    pub killing_ability_id: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    pub ability: Option<RawAbilityRef>,
}

impl RawDeathEvent {
    /// Only events explicitly typed `death`; untyped records are dropped.
    pub fn is_death(&self) -> bool {
        self.kind.as_deref() == Some("death")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Actor {
    pub id: i64,
    pub name: String,
    /// "Player", "Pet", "NPC", ...
    #[serde(default, rename = "type")]
    pub kind: String,
    /// Class or specialization, depending on the actor kind
    #[serde(default, deserialize_with = "lenient")]
    pub sub_type: Option<String>,
}

impl Actor {
    pub fn is_player(&self) -> bool {
        self.kind == "Player"
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ability {
    #[serde(rename = "gameID")]
    pub game_id: i64,
    pub name: String,
}

/// Actor and ability directories for a session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MasterData {
    #[serde(default)]
    pub actors: Vec<Actor>,
    #[serde(default)]
    pub abilities: Vec<Ability>,
}

/// Everything the event query returns for one attempt.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptEvents {
    /// Attempt bounds as seen by the event query; override session metadata when present
    #[serde(default, deserialize_with = "lenient")]
    pub start_time: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    pub end_time: Option<i64>,
    #[serde(default)]
    pub events: Vec<RawDeathEvent>,
    #[serde(default, deserialize_with = "lenient")]
    pub master_data: Option<MasterData>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Damage tables
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DamageAbility {
    pub name: String,
    #[serde(default)]
    pub total: i64,
}

/// One actor's row in a damage-done table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DamageEntry {
    pub name: String,
    #[serde(default)]
    pub id: i64,
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub total: i64,
    #[serde(default, deserialize_with = "lenient")]
    pub spec: Option<String>,
    #[serde(default)]
    pub abilities: Vec<DamageAbility>,
}

/// Damage-done table for one attempt (optionally windowed).
///
/// Accepts both the nested `{"data": {"entries": [...]}}` shape and a flat
/// `{"entries": [...]}` object.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DamageTable {
    pub entries: Vec<DamageEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub master_data: Option<MasterData>,
}

impl<'de> Deserialize<'de> for DamageTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Flat {
            #[serde(default)]
            entries: Vec<DamageEntry>,
            #[serde(default, deserialize_with = "lenient")]
            master_data: Option<MasterData>,
        }

        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Shape {
            Nested {
                data: Flat,
                #[serde(default, rename = "masterData", deserialize_with = "lenient")]
                master_data: Option<MasterData>,
            },
            Flat(Flat),
        }

        Ok(match Shape::deserialize(deserializer)? {
            Shape::Nested { data, master_data } => DamageTable {
                entries: data.entries,
                master_data: master_data.or(data.master_data),
            },
            Shape::Flat(flat) => DamageTable {
                entries: flat.entries,
                master_data: flat.master_data,
            },
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Collaborator traits
// ─────────────────────────────────────────────────────────────────────────────

/// Session metadata and raw death events.
pub trait AttemptSource {
    fn session(&self, session_id: &str) -> Result<SessionInfo, AnalysisError>;

    fn attempt_events(&self, session_id: &str, attempt_id: i64)
    -> Result<AttemptEvents, AnalysisError>;
}

/// Damage-done tables, optionally restricted to a window of fight time.
pub trait DamageTableSource {
    fn damage_table(
        &self,
        session_id: &str,
        attempt_id: i64,
        window: &TimeWindow,
    ) -> Result<DamageTable, AnalysisError>;
}

/// Reference DPS per specialization for an encounter.
pub trait SpecBaselineSource {
    fn spec_baselines(
        &self,
        encounter_id: i64,
        difficulty: u32,
        region: &str,
    ) -> Result<HashMap<String, SpecBaseline>, AnalysisError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_death_event_with_bad_fields() {
        let json = r#"{"timestamp": 1500, "type": "death", "targetID": 4,
                       "killerID": "boss", "ability": {"name": null, "guid": 1234}}"#;
        let event: RawDeathEvent = serde_json::from_str(json).unwrap();
        assert!(event.is_death());
        assert_eq!(event.target_id, Some(4));
        assert_eq!(event.killer_id, None);
        assert_eq!(event.killing_ability_id, None);
        let ability = event.ability.unwrap();
        assert_eq!(ability.name, None);
        assert_eq!(ability.guid, Some(1234));
    }

    #[test]
    fn test_only_typed_deaths_count() {
        let event: RawDeathEvent = serde_json::from_str(r#"{"timestamp": 0}"#).unwrap();
        assert!(!event.is_death());

        let event: RawDeathEvent =
            serde_json::from_str(r#"{"timestamp": 0, "type": 7}"#).unwrap();
        assert!(!event.is_death());

        let event: RawDeathEvent =
            serde_json::from_str(r#"{"timestamp": 0, "type": "resurrect"}"#).unwrap();
        assert!(!event.is_death());
    }

    #[test]
    fn test_damage_table_nested_shape() {
        let json = r#"{"data": {"entries": [
            {"name": "Vexa", "id": 3, "type": "Mage", "total": 1200000}
        ]}}"#;
        let table: DamageTable = serde_json::from_str(json).unwrap();
        assert_eq!(table.entries.len(), 1);
        assert_eq!(table.entries[0].total, 1_200_000);
    }

    #[test]
    fn test_damage_table_flat_shape() {
        let json = r#"{"entries": [
            {"name": "Vexa", "id": 3, "type": "Mage", "total": 1200000},
            {"name": "Wolf", "id": 9, "type": "Pet", "total": 5000}
        ]}"#;
        let table: DamageTable = serde_json::from_str(json).unwrap();
        assert_eq!(table.entries.len(), 2);
        assert_eq!(table.entries[1].kind, "Pet");
    }

    #[test]
    fn test_damage_table_without_entries() {
        let table: DamageTable = serde_json::from_str("{}").unwrap();
        assert!(table.entries.is_empty());
    }
}
