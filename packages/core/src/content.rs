//! Lesson content shapes and offline fallback content
//!
//! Generated content arrives from the provider as JSON in these shapes. When
//! the provider is unavailable the deterministic builders at the bottom of
//! this module stand in, and everything they produce is tagged
//! [`ContentOrigin::Offline`].

use serde::{Deserialize, Serialize};

/// Where a piece of content came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ContentOrigin {
    #[default]
    Generated,
    Offline,
}

impl ContentOrigin {
    pub fn is_offline(&self) -> bool {
        matches!(self, ContentOrigin::Offline)
    }
}

/// A value plus the origin the UI should disclose.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sourced<T> {
    pub value: T,
    pub origin: ContentOrigin,
}

impl<T> Sourced<T> {
    pub fn generated(value: T) -> Self {
        Self { value, origin: ContentOrigin::Generated }
    }

    pub fn offline(value: T) -> Self {
        Self { value, origin: ContentOrigin::Offline }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VocabularyCard {
    #[serde(default)]
    pub id: String,
    pub word: String,
    /// IPA
    #[serde(default)]
    pub pronunciation: String,
    pub definition: String,
    pub example_sentence: String,
    /// Simplified Chinese translation of the example sentence
    #[serde(default)]
    pub sentence_translation: String,
    #[serde(default)]
    pub emoji: String,
    #[serde(default)]
    pub image_prompt: String,
    #[serde(default)]
    pub origin: ContentOrigin,
}

impl VocabularyCard {
    /// Prompt for the illustration capability.
    pub fn illustration_prompt(&self) -> String {
        if self.image_prompt.trim().is_empty() {
            self.word.clone()
        } else {
            format!("{}, {}", self.word, self.image_prompt)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum QuizQuestion {
    #[serde(rename = "multiple-choice", rename_all = "camelCase")]
    MultipleChoice {
        question: String,
        options: Vec<String>,
        correct_answer: usize,
        #[serde(default)]
        explanation: String,
    },
    #[serde(rename = "scramble", rename_all = "camelCase")]
    Scramble {
        question: String,
        scramble_sentence: String,
        #[serde(default)]
        explanation: String,
    },
}

impl QuizQuestion {
    pub fn prompt(&self) -> &str {
        match self {
            QuizQuestion::MultipleChoice { question, .. } | QuizQuestion::Scramble { question, .. } => question,
        }
    }

    pub fn explanation(&self) -> &str {
        match self {
            QuizQuestion::MultipleChoice { explanation, .. } | QuizQuestion::Scramble { explanation, .. } => {
                explanation
            }
        }
    }

    /// Shape check beyond what deserialization enforces.
    pub fn is_playable(&self) -> bool {
        match self {
            QuizQuestion::MultipleChoice { options, correct_answer, .. } => {
                options.len() >= 2 && *correct_answer < options.len()
            }
            QuizQuestion::Scramble { scramble_sentence, .. } => {
                scramble_sentence.split_whitespace().count() >= 2
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Model,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: String,
    pub role: ChatRole,
    pub text: String,
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translation: Option<String>,
}

// ==================== Offline content ====================

pub const OFFLINE_CARD_PREFIX: &str = "offline-";
pub const OFFLINE_EMOJI: &str = "📚";
pub const TRANSLATION_UNAVAILABLE: &str = "翻译暂不可用 (离线)";
pub const TRANSLATION_FAILED: &str = "翻译失败";
pub const CHAT_GREETING_FALLBACK: &str = "Hello! I am your AI buddy.";
pub const CHAT_EMPTY_REPLY: &str = "I didn't quite catch that.";
pub const CHAT_FAILURE_REPLY: &str = "Oops, I fell asleep. Try saying that again!";

/// Exactly one card per requested word, in request order.
pub fn offline_vocabulary(words: &[String]) -> Vec<VocabularyCard> {
    words
        .iter()
        .enumerate()
        .map(|(i, w)| VocabularyCard {
            id: format!("{OFFLINE_CARD_PREFIX}{w}-{i}"),
            word: w.clone(),
            pronunciation: format!("/{}/", w.to_lowercase()),
            definition: format!("The definition of {w} (Offline Mode)"),
            example_sentence: format!("This is a simple sentence about {w}."),
            sentence_translation: format!("这是关于 {w} 的一个简单句子。（离线模式）"),
            emoji: OFFLINE_EMOJI.to_string(),
            image_prompt: w.clone(),
            origin: ContentOrigin::Offline,
        })
        .collect()
}

pub fn offline_quiz() -> Vec<QuizQuestion> {
    vec![
        QuizQuestion::MultipleChoice {
            question: "Which word is an animal? (Offline Mode)".to_string(),
            options: vec!["Car".into(), "Dog".into(), "Apple".into(), "Blue".into()],
            correct_answer: 1,
            explanation: "A Dog is an animal.".to_string(),
        },
        QuizQuestion::Scramble {
            question: "Make a sentence.".to_string(),
            scramble_sentence: "I like apples".to_string(),
            explanation: "Subject + Verb + Object".to_string(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offline_vocabulary_one_card_per_word() {
        let words = vec!["cat".to_string(), "Dog".to_string(), "cat".to_string()];
        let cards = offline_vocabulary(&words);
        assert_eq!(cards.len(), 3);
        assert!(cards.iter().all(|c| c.origin == ContentOrigin::Offline));
        assert_eq!(cards[1].pronunciation, "/dog/");
        // Duplicate words still get distinct ids.
        assert_ne!(cards[0].id, cards[2].id);
        assert_eq!(offline_vocabulary(&words), cards);
    }

    #[test]
    fn test_quiz_question_wire_shape() {
        let raw = r#"[
            {"type": "multiple-choice", "question": "Q?", "options": ["a", "b"], "correctAnswer": 0, "explanation": "e"},
            {"type": "scramble", "question": "Make it", "scrambleSentence": "I am happy"}
        ]"#;
        let questions: Vec<QuizQuestion> = serde_json::from_str(raw).unwrap();
        assert_eq!(questions.len(), 2);
        assert!(questions.iter().all(QuizQuestion::is_playable));
        assert_eq!(questions[1].explanation(), "");
    }

    #[test]
    fn test_unplayable_questions() {
        let bad = QuizQuestion::MultipleChoice {
            question: "Q".into(),
            options: vec!["a".into(), "b".into()],
            correct_answer: 2,
            explanation: String::new(),
        };
        assert!(!bad.is_playable());
        assert!(offline_quiz().iter().all(QuizQuestion::is_playable));
    }

    #[test]
    fn test_card_missing_definition_is_rejected() {
        let raw = r#"{"word": "cat", "exampleSentence": "A cat."}"#;
        assert!(serde_json::from_str::<VocabularyCard>(raw).is_err());
    }

    #[test]
    fn test_illustration_prompt() {
        let mut card = offline_vocabulary(&["owl".to_string()]).remove(0);
        assert_eq!(card.illustration_prompt(), "owl, owl");
        card.image_prompt.clear();
        assert_eq!(card.illustration_prompt(), "owl");
    }
}
