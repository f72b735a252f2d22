//! In-memory source backed by session dumps.
//!
//! A dump is one JSON file per session: the session metadata, its actor and
//! ability directories, and per attempt the raw death events plus timestamped
//! damage samples. Damage tables are built on demand by summing the samples
//! that fall inside the requested window.

use std::fs;
use std::path::Path;

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use super::{
    AttemptEvents, AttemptSource, DamageAbility, DamageEntry, DamageTable, DamageTableSource,
    MasterData, RawDeathEvent, SpecBaselineSource,
};
use crate::dps::{SpecRanking, baselines_from_rankings};
use crate::error::{AnalysisError, SourceError};
use crate::session::SessionInfo;
use crate::tally::OrderedTally;
use wipecall_types::{SpecBaseline, TimeWindow};

/// Damage dealt by one actor at one point in time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DamageSample {
    /// Milliseconds on the session clock
    pub timestamp: i64,
    #[serde(rename = "sourceID")]
    pub source_id: i64,
    pub amount: i64,
    #[serde(default)]
    pub ability: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttemptDump {
    pub id: i64,
    #[serde(default)]
    pub events: Vec<RawDeathEvent>,
    #[serde(default)]
    pub damage: Vec<DamageSample>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionDump {
    pub session: SessionInfo,
    #[serde(default)]
    pub master_data: MasterData,
    #[serde(default)]
    pub attempts: Vec<AttemptDump>,
}

/// Ranking rows for one encounter, difficulty and region.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncounterRankings {
    #[serde(rename = "encounterID")]
    pub encounter_id: i64,
    pub difficulty: u32,
    pub region: String,
    pub rankings: Vec<SpecRanking>,
}

#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    sessions: HashMap<String, SessionDump>,
    rankings: Vec<EncounterRankings>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a session dump, replacing any previous dump with the same code.
    pub fn insert(&mut self, dump: SessionDump) {
        self.sessions.insert(dump.session.code.clone(), dump);
    }

    pub fn add_rankings(&mut self, rankings: EncounterRankings) {
        self.rankings.push(rankings);
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Session codes, sorted
    pub fn session_codes(&self) -> Vec<String> {
        let mut codes: Vec<String> = self.sessions.keys().cloned().collect();
        codes.sort();
        codes
    }

    /// Load every `*.json` session dump in a directory.
    pub fn load_dir(dir: &Path) -> Result<Self, SourceError> {
        let read_err = |e: std::io::Error| SourceError::Io {
            path: dir.to_path_buf(),
            source: e,
        };

        let mut paths: Vec<_> = fs::read_dir(dir)
            .map_err(read_err)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
            .collect();
        paths.sort();

        let mut source = Self::new();
        for path in paths {
            source.insert(load_dump(&path)?);
        }
        tracing::info!(sessions = source.len(), dir = %dir.display(), "Loaded session dumps");
        Ok(source)
    }

    /// Load baseline ranking rows from a JSON array of [`EncounterRankings`].
    pub fn load_rankings(&mut self, path: &Path) -> Result<(), SourceError> {
        let contents = fs::read_to_string(path).map_err(|e| SourceError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let rankings: Vec<EncounterRankings> =
            serde_json::from_str(&contents).map_err(|e| SourceError::Json {
                path: path.to_path_buf(),
                source: e,
            })?;
        self.rankings.extend(rankings);
        Ok(())
    }

    fn dump(&self, session_id: &str) -> Result<&SessionDump, AnalysisError> {
        self.sessions
            .get(session_id)
            .ok_or_else(|| AnalysisError::SessionNotFound(session_id.to_string()))
    }

    fn attempt_dump(&self, session_id: &str, attempt_id: i64) -> Result<&AttemptDump, AnalysisError> {
        self.dump(session_id)?
            .attempts
            .iter()
            .find(|a| a.id == attempt_id)
            .ok_or_else(|| AnalysisError::AttemptNotFound {
                session_id: session_id.to_string(),
                attempt_id,
            })
    }
}

/// Read a single session dump file.
pub fn load_dump(path: &Path) -> Result<SessionDump, SourceError> {
    let contents = fs::read_to_string(path).map_err(|e| SourceError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    serde_json::from_str(&contents).map_err(|e| SourceError::Json {
        path: path.to_path_buf(),
        source: e,
    })
}

impl AttemptSource for MemorySource {
    fn session(&self, session_id: &str) -> Result<SessionInfo, AnalysisError> {
        Ok(self.dump(session_id)?.session.clone())
    }

    fn attempt_events(&self, session_id: &str, attempt_id: i64) -> Result<AttemptEvents, AnalysisError> {
        let dump = self.dump(session_id)?;
        let attempt = self.attempt_dump(session_id, attempt_id)?;
        let info = dump.session.attempt(attempt_id);

        Ok(AttemptEvents {
            start_time: info.map(|a| a.start_time),
            end_time: info.map(|a| a.end_time),
            events: attempt.events.clone(),
            master_data: Some(dump.master_data.clone()),
        })
    }
}

#[derive(Debug, Default)]
struct ActorDamage {
    total: i64,
    abilities: OrderedTally<String, i64>,
}

impl DamageTableSource for MemorySource {
    fn damage_table(
        &self,
        session_id: &str,
        attempt_id: i64,
        window: &TimeWindow,
    ) -> Result<DamageTable, AnalysisError> {
        let dump = self.dump(session_id)?;
        let attempt = self.attempt_dump(session_id, attempt_id)?;
        let start = dump
            .session
            .attempt(attempt_id)
            .map(|a| a.start_time)
            .ok_or_else(|| AnalysisError::AttemptNotFound {
                session_id: session_id.to_string(),
                attempt_id,
            })?;

        let mut by_actor: OrderedTally<i64, ActorDamage> = OrderedTally::new();
        for sample in &attempt.damage {
            let fight_time = (sample.timestamp - start) as f64 / 1000.0;
            if !window.contains(fight_time) {
                continue;
            }
            let actor = by_actor.entry(sample.source_id);
            actor.total += sample.amount;
            if let Some(ability) = &sample.ability {
                *actor.abilities.entry(ability.clone()) += sample.amount;
            }
        }

        let actors: HashMap<i64, _> = dump.master_data.actors.iter().map(|a| (a.id, a)).collect();
        let entries = by_actor
            .into_entries()
            .into_iter()
            .filter_map(|(id, damage)| {
                // Samples from actors missing in the directory have no identity to report
                let actor = actors.get(&id)?;
                Some(DamageEntry {
                    name: actor.name.clone(),
                    id,
                    kind: actor.kind.clone(),
                    total: damage.total,
                    spec: actor.sub_type.clone(),
                    abilities: damage
                        .abilities
                        .into_entries()
                        .into_iter()
                        .map(|(name, total)| DamageAbility { name, total })
                        .collect(),
                })
            })
            .collect();

        Ok(DamageTable {
            entries,
            master_data: Some(dump.master_data.clone()),
        })
    }
}

impl SpecBaselineSource for MemorySource {
    fn spec_baselines(
        &self,
        encounter_id: i64,
        difficulty: u32,
        region: &str,
    ) -> Result<HashMap<String, SpecBaseline>, AnalysisError> {
        let rows: Vec<SpecRanking> = self
            .rankings
            .iter()
            .filter(|r| {
                r.encounter_id == encounter_id
                    && r.difficulty == difficulty
                    && r.region.eq_ignore_ascii_case(region)
            })
            .flat_map(|r| r.rankings.iter().cloned())
            .collect();
        Ok(baselines_from_rankings(&rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::AttemptInfo;
    use crate::source::Actor;

    fn dump() -> SessionDump {
        SessionDump {
            session: SessionInfo {
                code: "night1".to_string(),
                title: "Night 1".to_string(),
                start_time: 1_736_276_400_000,
                attempts: vec![AttemptInfo {
                    id: 1,
                    name: "Boss".to_string(),
                    encounter_id: 42,
                    start_time: 10_000,
                    end_time: 130_000,
                    ..Default::default()
                }],
            },
            master_data: MasterData {
                actors: vec![
                    Actor {
                        id: 1,
                        name: "Vexa".to_string(),
                        kind: "Player".to_string(),
                        sub_type: Some("Fire".to_string()),
                    },
                    Actor {
                        id: 2,
                        name: "Wolf".to_string(),
                        kind: "Pet".to_string(),
                        sub_type: None,
                    },
                ],
                abilities: vec![],
            },
            attempts: vec![AttemptDump {
                id: 1,
                events: vec![],
                damage: vec![
                    DamageSample { timestamp: 15_000, source_id: 1, amount: 100, ability: Some("Fireball".to_string()) },
                    DamageSample { timestamp: 45_000, source_id: 1, amount: 300, ability: Some("Pyroblast".to_string()) },
                    DamageSample { timestamp: 50_000, source_id: 2, amount: 50, ability: None },
                    DamageSample { timestamp: 50_000, source_id: 99, amount: 70, ability: None },
                ],
            }],
        }
    }

    #[test]
    fn test_damage_table_respects_window() {
        let mut source = MemorySource::new();
        source.insert(dump());

        let full = source.damage_table("night1", 1, &TimeWindow::default()).unwrap();
        assert_eq!(full.entries.len(), 2);
        assert_eq!(full.entries[0].name, "Vexa");
        assert_eq!(full.entries[0].total, 400);
        assert_eq!(full.entries[0].spec.as_deref(), Some("Fire"));
        assert_eq!(full.entries[0].abilities.len(), 2);
        assert_eq!(full.entries[1].kind, "Pet");

        // Sample at 35s is outside [0, 30)
        let opener = source
            .damage_table("night1", 1, &TimeWindow::new(Some(0.0), Some(30.0)))
            .unwrap();
        assert_eq!(opener.entries.len(), 1);
        assert_eq!(opener.entries[0].total, 100);
    }

    #[test]
    fn test_missing_lookups() {
        let mut source = MemorySource::new();
        source.insert(dump());

        assert!(matches!(
            source.session("nope"),
            Err(AnalysisError::SessionNotFound(_))
        ));
        assert!(matches!(
            source.attempt_events("night1", 9),
            Err(AnalysisError::AttemptNotFound { attempt_id: 9, .. })
        ));
    }

    #[test]
    fn test_attempt_events_carry_bounds_and_directory() {
        let mut source = MemorySource::new();
        source.insert(dump());

        let events = source.attempt_events("night1", 1).unwrap();
        assert_eq!(events.start_time, Some(10_000));
        assert_eq!(events.end_time, Some(130_000));
        assert_eq!(events.master_data.unwrap().actors.len(), 2);
    }

    #[test]
    fn test_spec_baselines_filter_by_encounter() {
        let mut source = MemorySource::new();
        source.add_rankings(EncounterRankings {
            encounter_id: 42,
            difficulty: 4,
            region: "EU".to_string(),
            rankings: vec![
                SpecRanking { spec: Some("Fire".to_string()), amount: 100.0 },
                SpecRanking { spec: Some("Fire".to_string()), amount: 200.0 },
            ],
        });
        source.add_rankings(EncounterRankings {
            encounter_id: 43,
            difficulty: 4,
            region: "EU".to_string(),
            rankings: vec![SpecRanking { spec: Some("Fire".to_string()), amount: 900.0 }],
        });

        let baselines = source.spec_baselines(42, 4, "eu").unwrap();
        assert_eq!(baselines["Fire"].sample_size, 2);
        assert_eq!(baselines["Fire"].average_dps, 150.0);
        assert!(source.spec_baselines(42, 5, "EU").unwrap().is_empty());
    }
}
