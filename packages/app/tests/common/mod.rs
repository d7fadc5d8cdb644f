#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use parking_lot::Mutex;

use kids_app::capabilities::{Capabilities, SoundPlayer, Speaker, SpeechSettings};
use kids_app::provider::{ContentError, ContentProvider, ContentResult, Illustration};
use kids_app::session::LearnerSession;
use kids_app::store::{MemoryBackend, StateStore};
use kids_core::{ChatMessage, Level, QuizQuestion, SoundEffect, UnlockPolicy, VocabularyCard};

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

pub const TODAY: &str = "2025-03-10";

// ==================== Capabilities ====================

#[derive(Default)]
pub struct RecordingSounds {
    effects: Mutex<Vec<SoundEffect>>,
}

impl RecordingSounds {
    pub fn effects(&self) -> Vec<SoundEffect> {
        self.effects.lock().clone()
    }

    pub fn count(&self, effect: SoundEffect) -> usize {
        self.effects.lock().iter().filter(|e| **e == effect).count()
    }
}

impl SoundPlayer for RecordingSounds {
    fn play(&self, effect: SoundEffect) {
        self.effects.lock().push(effect);
    }
}

#[derive(Default)]
pub struct RecordingSpeaker {
    spoken: Mutex<Vec<(String, SpeechSettings)>>,
}

impl RecordingSpeaker {
    pub fn spoken(&self) -> Vec<String> {
        self.spoken.lock().iter().map(|(t, _)| t.clone()).collect()
    }

    pub fn last_settings(&self) -> Option<SpeechSettings> {
        self.spoken.lock().last().map(|(_, s)| s.clone())
    }
}

impl Speaker for RecordingSpeaker {
    fn speak(&self, text: &str, settings: &SpeechSettings) {
        self.spoken.lock().push((text.to_string(), settings.clone()));
    }
}

// ==================== Session harness ====================

pub struct Harness {
    pub session: LearnerSession,
    pub backend: Arc<MemoryBackend>,
    pub sounds: Arc<RecordingSounds>,
    pub speaker: Arc<RecordingSpeaker>,
}

pub fn open_with(backend: Arc<MemoryBackend>, policy: UnlockPolicy, today: &str) -> Harness {
    let sounds = Arc::new(RecordingSounds::default());
    let speaker = Arc::new(RecordingSpeaker::default());
    let capabilities = Capabilities::new(speaker.clone(), sounds.clone());
    let store = StateStore::new(backend.clone(), policy);
    let session = LearnerSession::open(store, capabilities, date(today));
    Harness { session, backend, sounds, speaker }
}

pub fn harness(policy: UnlockPolicy) -> Harness {
    open_with(Arc::new(MemoryBackend::new()), policy, TODAY)
}

// ==================== Providers ====================

/// Every call fails as if the quota were exhausted.
#[derive(Default)]
pub struct FailingProvider {
    pub calls: AtomicUsize,
}

impl FailingProvider {
    fn fail<T>(&self) -> ContentResult<T> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(ContentError::Malformed("RESOURCE_EXHAUSTED".to_string()))
    }
}

#[async_trait]
impl ContentProvider for FailingProvider {
    async fn vocabulary(&self, _level: Level, _words: &[String]) -> ContentResult<Vec<VocabularyCard>> {
        self.fail()
    }

    async fn illustration(&self, _prompt: &str) -> ContentResult<Option<Illustration>> {
        self.fail()
    }

    async fn quiz(&self, _level: Level) -> ContentResult<Vec<QuizQuestion>> {
        self.fail()
    }

    async fn translate(&self, _text: &str) -> ContentResult<String> {
        self.fail()
    }

    async fn chat(&self, _level: Level, _history: &[ChatMessage]) -> ContentResult<String> {
        self.fail()
    }
}

/// Returns canned answers and counts calls.
#[derive(Default)]
pub struct ScriptedProvider {
    pub cards: Vec<VocabularyCard>,
    pub image: Option<Illustration>,
    pub questions: Vec<QuizQuestion>,
    pub translation: String,
    pub replies: Mutex<VecDeque<String>>,
    pub vocabulary_calls: AtomicUsize,
    pub illustration_calls: AtomicUsize,
    pub translate_calls: AtomicUsize,
    pub chat_histories: Mutex<Vec<Vec<ChatMessage>>>,
}

impl ScriptedProvider {
    pub fn with_replies(replies: &[&str]) -> Self {
        Self { replies: Mutex::new(replies.iter().map(|r| r.to_string()).collect()), ..Self::default() }
    }
}

#[async_trait]
impl ContentProvider for ScriptedProvider {
    async fn vocabulary(&self, _level: Level, _words: &[String]) -> ContentResult<Vec<VocabularyCard>> {
        self.vocabulary_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.cards.clone())
    }

    async fn illustration(&self, _prompt: &str) -> ContentResult<Option<Illustration>> {
        self.illustration_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.image.clone())
    }

    async fn quiz(&self, _level: Level) -> ContentResult<Vec<QuizQuestion>> {
        Ok(self.questions.clone())
    }

    async fn translate(&self, _text: &str) -> ContentResult<String> {
        self.translate_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.translation.clone())
    }

    async fn chat(&self, _level: Level, history: &[ChatMessage]) -> ContentResult<String> {
        self.chat_histories.lock().push(history.to_vec());
        self.replies.lock().pop_front().ok_or(ContentError::Empty)
    }
}

pub fn card(word: &str, definition: &str, emoji: &str) -> VocabularyCard {
    VocabularyCard {
        id: String::new(),
        word: word.to_string(),
        pronunciation: format!("/{word}/"),
        definition: definition.to_string(),
        example_sentence: format!("I see a {word}."),
        sentence_translation: String::new(),
        emoji: emoji.to_string(),
        image_prompt: format!("a happy {word}"),
        origin: Default::default(),
    }
}

pub fn png() -> Illustration {
    Illustration { bytes: vec![0x89, b'P', b'N', b'G'], mime_type: "image/png".to_string() }
}
