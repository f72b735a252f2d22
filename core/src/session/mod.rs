pub mod cache;
pub mod info;

pub use cache::{AnalysisCache, CachedAttempt};
pub use info::{AttemptInfo, SessionInfo};
