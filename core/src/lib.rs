pub mod aggregate;
pub mod analysis;
pub mod analyzer;
pub mod config;
pub mod dps;
pub mod error;
pub mod session;
pub mod source;
mod tally;

// Re-exports for convenience
pub use aggregate::BossFilter;
pub use analyzer::RaidAnalyzer;
pub use config::AnalysisConfig;
pub use dps::DpsRequest;
pub use error::AnalysisError;
pub use session::{AnalysisCache, AttemptInfo, SessionInfo};
pub use source::{AttemptSource, DamageTableSource, MemorySource, SpecBaselineSource};
pub use wipecall_types::*;
