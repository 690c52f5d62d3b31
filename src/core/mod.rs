//! Core business logic: fortune scoring, profile history and persistence

pub mod config;
pub mod fortune;
pub mod history;
pub mod log;
pub mod manager;
pub mod narration;
pub mod personality;
pub mod profile;
pub mod storage;

// Re-export main types for cleaner imports
pub use fortune::{BaseScores, Dimension, FortuneEngine, FortuneLevel, FortuneResult, Trend};
pub use history::{HistoryTrend, Suggestion, TrendSummary};
pub use manager::ProfileManager;
pub use narration::{Narration, Narrator};
pub use personality::PersonalityType;
pub use profile::{Achievement, UserProfile};
pub use storage::ProfileStore;
