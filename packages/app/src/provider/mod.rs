//! Content Provider
//!
//! [`ContentProvider`] is the raw, fallible capability: a remote model that
//! writes lesson cards, quizzes, illustrations, translations and chat
//! replies. [`ContentService`] wraps an optional provider and never fails,
//! substituting offline content whenever the provider is absent or errors.

pub mod gemini;
pub mod service;

use async_trait::async_trait;
use thiserror::Error;

use kids_core::json_repair::RepairError;
use kids_core::{ChatMessage, Level, QuizQuestion, VocabularyCard};

pub use gemini::GeminiProvider;
pub use service::ContentService;

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("provider not configured: {0}")]
    NotConfigured(&'static str),
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("HTTP {status}: {body}")]
    HttpStatus { status: reqwest::StatusCode, body: String },
    #[error("JSON decode failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("malformed content: {0}")]
    Malformed(String),
    #[error("empty response")]
    Empty,
}

impl From<RepairError> for ContentError {
    fn from(err: RepairError) -> Self {
        ContentError::Malformed(err.to_string())
    }
}

pub type ContentResult<T> = Result<T, ContentError>;

/// Decoded image bytes returned by the illustration capability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Illustration {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

#[async_trait]
pub trait ContentProvider: Send + Sync {
    async fn vocabulary(&self, level: Level, words: &[String]) -> ContentResult<Vec<VocabularyCard>>;

    /// `Ok(None)` when the model answered without an image.
    async fn illustration(&self, prompt: &str) -> ContentResult<Option<Illustration>>;

    async fn quiz(&self, level: Level) -> ContentResult<Vec<QuizQuestion>>;

    async fn translate(&self, text: &str) -> ContentResult<String>;

    /// Next model turn for a conversation whose last message is the learner's.
    async fn chat(&self, level: Level, history: &[ChatMessage]) -> ContentResult<String>;
}
