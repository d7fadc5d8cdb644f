use std::sync::Arc;

use tracing::{debug, warn};
use uuid::Uuid;

use kids_core::content::{
    offline_quiz, offline_vocabulary, CHAT_EMPTY_REPLY, CHAT_FAILURE_REPLY, CHAT_GREETING_FALLBACK,
    TRANSLATION_FAILED, TRANSLATION_UNAVAILABLE,
};
use kids_core::{ChatMessage, ChatRole, ContentOrigin, Level, QuizQuestion, Sourced, VocabularyCard};

use super::{ContentProvider, Illustration};

/// Replaces emoji strings the cards cannot display in one glyph slot.
pub const FALLBACK_EMOJI: &str = "✨";
const MAX_EMOJI_CHARS: usize = 2;

/// Opening line sent on the learner's behalf when a conversation starts.
pub const CHAT_OPENER: &str = "Hello! Introduce yourself to me.";

/// Never-failing content access with offline fallback.
#[derive(Clone, Default)]
pub struct ContentService {
    provider: Option<Arc<dyn ContentProvider>>,
}

impl ContentService {
    pub fn new(provider: Arc<dyn ContentProvider>) -> Self {
        Self { provider: Some(provider) }
    }

    pub fn offline() -> Self {
        Self { provider: None }
    }

    pub fn is_online(&self) -> bool {
        self.provider.is_some()
    }

    /// Generated cards, or exactly one offline card per requested word.
    ///
    /// Generated responses may hold a different number of cards than words
    /// requested; callers index by position in the returned list.
    pub async fn fetch_vocabulary(&self, level: Level, words: &[String]) -> Sourced<Vec<VocabularyCard>> {
        let Some(provider) = &self.provider else {
            debug!(count = words.len(), "no provider, serving offline vocabulary");
            return Sourced::offline(offline_vocabulary(words));
        };
        match provider.vocabulary(level, words).await {
            Ok(cards) if !cards.is_empty() => Sourced::generated(cards.into_iter().map(finish_card).collect()),
            Ok(_) => {
                warn!(%level, "provider returned no cards, serving offline vocabulary");
                Sourced::offline(offline_vocabulary(words))
            }
            Err(err) => {
                warn!(%level, error = %err, "vocabulary generation failed, serving offline vocabulary");
                Sourced::offline(offline_vocabulary(words))
            }
        }
    }

    pub async fn fetch_illustration(&self, prompt: &str) -> Option<Illustration> {
        let provider = self.provider.as_ref()?;
        match provider.illustration(prompt).await {
            Ok(Some(image)) if !image.bytes.is_empty() => Some(image),
            Ok(_) => None,
            Err(err) => {
                warn!(error = %err, "illustration failed");
                None
            }
        }
    }

    /// Generated questions when every one is playable, otherwise the offline quiz.
    pub async fn fetch_quiz(&self, level: Level) -> Sourced<Vec<QuizQuestion>> {
        let Some(provider) = &self.provider else {
            return Sourced::offline(offline_quiz());
        };
        match provider.quiz(level).await {
            Ok(questions) if !questions.is_empty() && questions.iter().all(QuizQuestion::is_playable) => {
                Sourced::generated(questions)
            }
            Ok(questions) => {
                warn!(%level, count = questions.len(), "quiz response unusable, serving offline quiz");
                Sourced::offline(offline_quiz())
            }
            Err(err) => {
                warn!(%level, error = %err, "quiz generation failed, serving offline quiz");
                Sourced::offline(offline_quiz())
            }
        }
    }

    pub async fn translate(&self, text: &str) -> Sourced<String> {
        let Some(provider) = &self.provider else {
            return Sourced::offline(TRANSLATION_UNAVAILABLE.to_string());
        };
        match provider.translate(text).await {
            Ok(translation) if !translation.trim().is_empty() => Sourced::generated(translation),
            Ok(_) => Sourced::offline(TRANSLATION_FAILED.to_string()),
            Err(err) => {
                warn!(error = %err, "translation failed");
                Sourced::offline(TRANSLATION_FAILED.to_string())
            }
        }
    }

    /// Next tutor message for `history`, or a placeholder reply.
    pub async fn chat_reply(&self, level: Level, history: &[ChatMessage]) -> Sourced<String> {
        let Some(provider) = &self.provider else {
            return Sourced::offline(CHAT_FAILURE_REPLY.to_string());
        };
        match provider.chat(level, history).await {
            Ok(reply) if !reply.trim().is_empty() => Sourced::generated(reply),
            Ok(_) => Sourced::generated(CHAT_EMPTY_REPLY.to_string()),
            Err(err) => {
                warn!(%level, error = %err, "chat reply failed");
                Sourced::offline(CHAT_FAILURE_REPLY.to_string())
            }
        }
    }

    /// Tutor introduction that opens a conversation.
    pub async fn chat_greeting(&self, level: Level, now_ms: i64) -> Sourced<String> {
        let Some(provider) = &self.provider else {
            return Sourced::offline(CHAT_GREETING_FALLBACK.to_string());
        };
        let opener = [ChatMessage {
            id: Uuid::new_v4().to_string(),
            role: ChatRole::User,
            text: CHAT_OPENER.to_string(),
            timestamp: now_ms,
            translation: None,
        }];
        match provider.chat(level, &opener).await {
            Ok(reply) if !reply.trim().is_empty() => Sourced::generated(reply),
            Ok(_) => Sourced::generated(CHAT_GREETING_FALLBACK.to_string()),
            Err(err) => {
                warn!(%level, error = %err, "chat greeting failed");
                Sourced::offline(CHAT_GREETING_FALLBACK.to_string())
            }
        }
    }
}

fn finish_card(mut card: VocabularyCard) -> VocabularyCard {
    card.id = Uuid::new_v4().to_string();
    card.origin = ContentOrigin::Generated;
    card.emoji = normalize_emoji(&card.emoji);
    card
}

pub fn normalize_emoji(emoji: &str) -> String {
    let emoji = emoji.trim();
    if emoji.is_empty() || emoji.chars().count() > MAX_EMOJI_CHARS {
        FALLBACK_EMOJI.to_string()
    } else {
        emoji.to_string()
    }
}
