use hashbrown::HashMap;

use wipecall_types::DeathAnalysis;

/// One memoized attempt: its analysis plus the roster resolved alongside it.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedAttempt {
    pub analysis: DeathAnalysis,
    pub roster: Option<Vec<String>>,
}

/// Memoized attempt analyses, keyed by (session, attempt).
///
/// A closed historical attempt never changes upstream, so entries are never
/// invalidated; the cache lives as long as the analyzer that owns it.
#[derive(Debug, Clone, Default)]
pub struct AnalysisCache {
    entries: HashMap<(String, i64), CachedAttempt>,
    hits: u64,
    misses: u64,
}

impl AnalysisCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up an attempt, counting the hit or miss.
    pub fn get(&mut self, session_id: &str, attempt_id: i64) -> Option<&CachedAttempt> {
        let found = self.entries.get(&(session_id.to_string(), attempt_id));
        if found.is_some() {
            self.hits += 1;
        } else {
            self.misses += 1;
        }
        found
    }

    pub fn insert(&mut self, session_id: &str, analysis: DeathAnalysis, roster: Option<Vec<String>>) {
        self.entries.insert(
            (session_id.to_string(), analysis.attempt_id),
            CachedAttempt { analysis, roster },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }
}
