//! Screen controllers
//!
//! Each controller holds the short-lived state of one tab (current card,
//! game board, quiz round, spelling test, conversation) and talks to the
//! [`LearnerSession`](crate::session::LearnerSession) for anything that
//! touches the persisted document. Content requests are split into a
//! `begin_*` step that hands out a ticket and a `finish_*` step that drops
//! results whose ticket went stale while the request was in flight.

pub mod chat;
pub mod lesson;
pub mod quiz;
pub mod review;

use thiserror::Error;

use kids_core::ProgressionError;

pub use chat::ChatScreen;
pub use lesson::LessonScreen;
pub use quiz::QuizScreen;
pub use review::ReviewScreen;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScreenError {
    #[error("unknown unit: {0}")]
    UnknownUnit(String),
    #[error("unit is locked: {0}")]
    LockedUnit(String),
    #[error("no words available for this test")]
    NoWords,
    #[error("nothing loaded")]
    NothingLoaded,
    #[error(transparent)]
    Progression(#[from] ProgressionError),
}

pub type ScreenResult<T> = Result<T, ScreenError>;
