//! Entry point tying sources, analysis and aggregation together.

use crate::aggregate::{self, BossFilter};
use crate::analysis::{analyze_attempt_events, resolve_roster};
use crate::config::AnalysisConfig;
use crate::dps::{DpsAccumulator, DpsRequest};
use crate::error::AnalysisError;
use crate::session::{AnalysisCache, AttemptInfo, CachedAttempt, SessionInfo};
use crate::source::{AttemptSource, DamageTableSource, SpecBaselineSource};
use wipecall_types::{BossComparison, BossSummary, DeathAnalysis, DpsReport, FightComparison};

/// Runs attempt analyses and cross-session reports against one source.
///
/// Attempt analyses are memoized for the analyzer's lifetime.
pub struct RaidAnalyzer<S> {
    source: S,
    config: AnalysisConfig,
    cache: AnalysisCache,
}

impl<S: AttemptSource> RaidAnalyzer<S> {
    pub fn new(source: S) -> Self {
        Self::with_config(source, AnalysisConfig::default())
    }

    pub fn with_config(source: S, config: AnalysisConfig) -> Self {
        Self {
            source,
            config,
            cache: AnalysisCache::new(),
        }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn cache(&self) -> &AnalysisCache {
        &self.cache
    }

    /// Death analysis of a single attempt.
    pub fn analyze_attempt(
        &mut self,
        session_id: &str,
        attempt_id: i64,
    ) -> Result<DeathAnalysis, AnalysisError> {
        if let Some(cached) = self.cache.get(session_id, attempt_id) {
            return Ok(cached.analysis.clone());
        }

        let session = self.source.session(session_id)?;
        let attempt = session
            .attempt(attempt_id)
            .ok_or_else(|| AnalysisError::AttemptNotFound {
                session_id: session_id.to_string(),
                attempt_id,
            })?;
        Ok(self.load_attempt(session_id, attempt)?.analysis)
    }

    fn cached_attempt(
        &mut self,
        session_id: &str,
        attempt: &AttemptInfo,
    ) -> Result<CachedAttempt, AnalysisError> {
        if let Some(cached) = self.cache.get(session_id, attempt.id) {
            return Ok(cached.clone());
        }
        self.load_attempt(session_id, attempt)
    }

    fn load_attempt(
        &mut self,
        session_id: &str,
        attempt: &AttemptInfo,
    ) -> Result<CachedAttempt, AnalysisError> {
        let events = self.source.attempt_events(session_id, attempt.id)?;
        let analysis = analyze_attempt_events(attempt, &events, &self.config);
        let roster = resolve_roster(attempt, &events);

        self.cache
            .insert(session_id, analysis.clone(), roster.clone());
        Ok(CachedAttempt { analysis, roster })
    }

    /// Compare every attempt on a boss across sessions.
    ///
    /// Sessions or attempts that fail to load are logged and left out; the
    /// report covers whatever could be analyzed.
    pub fn compare_across_sessions<I: AsRef<str>>(
        &mut self,
        session_ids: &[I],
        boss_name: &str,
        difficulty: Option<u32>,
    ) -> BossComparison {
        let filter = BossFilter::new(boss_name, difficulty);
        let mut comparisons = Vec::new();

        for session_id in session_ids {
            let session_id: &str = session_id.as_ref();
            let Some(session) = self.load_session(session_id) else {
                continue;
            };
            let session_date = session.date();
            let matching: Vec<&AttemptInfo> =
                session.attempts.iter().filter(|a| filter.matches(a)).collect();
            tracing::info!(
                session = session_id,
                boss = boss_name,
                attempts = matching.len(),
                "Processing session"
            );

            for (idx, attempt) in matching.into_iter().enumerate() {
                let attempt_number = idx as u32 + 1;
                let loaded = match self.cached_attempt(session_id, attempt) {
                    Ok(loaded) => loaded,
                    Err(e) => {
                        tracing::warn!(
                            session = session_id,
                            attempt = attempt.id,
                            error = %e,
                            "Skipping attempt"
                        );
                        continue;
                    }
                };

                comparisons.push(FightComparison {
                    session_id: session_id.to_string(),
                    session_date: session_date.clone(),
                    attempt_id: attempt.id,
                    attempt_number,
                    duration_secs: attempt.duration_secs(),
                    kill: attempt.kill,
                    fight_percentage: attempt.fight_percentage,
                    roster: loaded.roster,
                    death_analysis: loaded.analysis,
                });
            }
        }

        let report = aggregate::summarize(&filter, comparisons, &self.config);
        tracing::info!(
            boss = boss_name,
            attempts = report.total_attempts,
            kills = report.total_kills,
            players = report.fail_analysis.player_ranking.len(),
            "Comparison complete"
        );
        tracing::debug!(
            cached = self.cache.len(),
            hits = self.cache.hits(),
            misses = self.cache.misses(),
            "Analysis cache"
        );
        report
    }

    /// Bosses pulled across `session_ids`, grouped by name and difficulty.
    pub fn list_bosses<I: AsRef<str>>(&self, session_ids: &[I]) -> Vec<BossSummary> {
        let sessions: Vec<SessionInfo> = session_ids
            .iter()
            .filter_map(|id| self.load_session(id.as_ref()))
            .collect();
        aggregate::list_bosses(&sessions)
    }

    fn load_session(&self, session_id: &str) -> Option<SessionInfo> {
        match self.source.session(session_id) {
            Ok(session) => Some(session),
            Err(e) => {
                tracing::warn!(session = session_id, error = %e, "Skipping session");
                None
            }
        }
    }
}

impl<S: AttemptSource + DamageTableSource> RaidAnalyzer<S> {
    /// Per-player DPS over every matching attempt, optionally windowed.
    ///
    /// With a baseline source, players whose spec is known are also compared
    /// against the spec's reference DPS for the encounter.
    pub fn aggregate_dps(
        &self,
        request: &DpsRequest,
        baselines: Option<&dyn SpecBaselineSource>,
    ) -> DpsReport {
        let filter = request.filter();
        let mut accumulator = DpsAccumulator::new(&self.config.dps.excluded_actor_types);
        let mut encounter_id = None;

        for session_id in &request.session_ids {
            let Some(session) = self.load_session(session_id) else {
                continue;
            };

            for attempt in session.attempts.iter().filter(|a| filter.matches(a)) {
                encounter_id.get_or_insert(attempt.encounter_id);

                let effective = request.window.effective_duration(attempt.duration_secs());
                if effective <= 0.0 {
                    tracing::debug!(
                        session = %session_id,
                        attempt = attempt.id,
                        "Window outside attempt, skipping"
                    );
                    continue;
                }

                match self
                    .source
                    .damage_table(session_id, attempt.id, &request.window)
                {
                    Ok(table) => {
                        accumulator.add_table(&table, effective);
                    }
                    Err(e) => tracing::warn!(
                        session = %session_id,
                        attempt = attempt.id,
                        error = %e,
                        "Skipping damage table"
                    ),
                }
            }
        }

        let spec_baselines = match (baselines, encounter_id) {
            (Some(source), Some(encounter_id)) => {
                let difficulty = request
                    .difficulty
                    .unwrap_or(self.config.dps.baseline_difficulty);
                let region = request
                    .region
                    .as_deref()
                    .unwrap_or(&self.config.dps.baseline_region);
                match source.spec_baselines(encounter_id, difficulty, region) {
                    Ok(found) => Some(found),
                    Err(e) => {
                        tracing::warn!(encounter_id, error = %e, "Spec baselines unavailable");
                        None
                    }
                }
            }
            _ => None,
        };

        tracing::info!(
            boss = %request.boss_name,
            fights = accumulator.total_fights(),
            "DPS aggregation complete"
        );
        accumulator.finish(&filter, request.window, spec_baselines.as_ref())
    }
}
