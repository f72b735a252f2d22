//! Single-attempt analysis
//!
//! ```text
//!  raw events + directories ──► normalize ──► sorted DeathEvents
//!                                                  │
//!                                   detect_wipe_call (5 deaths / 10s, 2nd half)
//!                                                  │
//!                                                  ▼
//!                                      classify ──► DeathAnalysis
//! ```

pub mod fight;
pub mod normalize;
pub mod wipe_call;

pub use fight::{analyze_attempt_events, classify_deaths, resolve_roster};
pub use normalize::{Directory, normalize_deaths, resolve_ability_name};
pub use wipe_call::detect_wipe_call;
