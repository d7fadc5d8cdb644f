//! # kids-core - progression core for Cambridge Kids English
//!
//! Pure Rust, I/O-free building blocks:
//!
//! - **Progression Engine** - coins, stars, unlocks, streaks, mistakes, avatars
//! - **Catalogs** - Cambridge YLE syllabus and the avatar shop
//! - **Mini games** - matching game, quiz rounds, spelling tests
//! - **Content** - lesson shapes, offline fallback content, JSON repair
//!
//! ## Module layout
//!
//! - [`state`] - the persisted `AppState` document
//! - [`progression`] - pure reducers over the document
//! - [`syllabus`] / [`avatars`] - static catalogs
//! - [`matching`] / [`quiz`] / [`spelling`] - rule-bearing screen state
//! - [`content`] - vocabulary cards, quiz questions, offline content
//! - [`json_repair`] - tolerant parsing of model output
//! - [`generation`] - stale-response guard for async requests
//! - [`types`] - shared enums and reward constants
//!
//! ## Example
//!
//! ```rust
//! use kids_core::progression::{complete_unit, default_state, UnlockPolicy};
//!
//! let state = default_state(UnlockPolicy::AllUnlocked);
//! let state = complete_unit(&state, "starters-1", 3, UnlockPolicy::AllUnlocked).unwrap();
//! assert_eq!(state.progress.total_stars, 3);
//! assert_eq!(state.coins, 130);
//! ```

pub mod avatars;
pub mod content;
pub mod generation;
pub mod json_repair;
pub mod matching;
pub mod progression;
pub mod quiz;
pub mod spelling;
pub mod state;
pub mod syllabus;
pub mod types;

pub use content::{ChatMessage, ChatRole, ContentOrigin, QuizQuestion, Sourced, VocabularyCard};
pub use generation::{RequestGenerations, Ticket};
pub use progression::{Action, ActionContext, DailyLogin, ProgressionError, UnlockPolicy};
pub use state::{AppState, MistakeRecord, UserProgress};
pub use syllabus::SyllabusUnit;
pub use types::{Level, SoundEffect, Tab};
