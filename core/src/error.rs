use std::path::PathBuf;

use thiserror::Error;

/// Failure to analyze a single unit of work (one session or one attempt).
///
/// Aggregations catch these per attempt and keep going; only
/// `RaidAnalyzer::analyze_attempt` surfaces them to the caller.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("session {0} not found")]
    SessionNotFound(String),

    #[error("attempt {attempt_id} not found in session {session_id}")]
    AttemptNotFound { session_id: String, attempt_id: i64 },

    #[error("attempt source failed: {0}")]
    Source(String),
}

/// Errors raised while loading session dumps from disk.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("IO error reading {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid session dump {path:?}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}
