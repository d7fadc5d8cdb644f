//! Injected audio capabilities
//!
//! Speech and sound effects are platform services. The session only knows
//! these traits; the defaults here just log what would have been played.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use kids_core::SoundEffect;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeechSettings {
    pub language: String,
    pub rate: f32,
    pub pitch: f32,
}

impl Default for SpeechSettings {
    fn default() -> Self {
        Self { language: "en-US".to_string(), rate: 0.9, pitch: 1.05 }
    }
}

pub trait Speaker: Send + Sync {
    fn speak(&self, text: &str, settings: &SpeechSettings);
}

pub trait SoundPlayer: Send + Sync {
    fn play(&self, effect: SoundEffect);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct LogSpeaker;

impl Speaker for LogSpeaker {
    fn speak(&self, text: &str, settings: &SpeechSettings) {
        debug!(text, language = %settings.language, rate = settings.rate, "speak");
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct LogSoundPlayer;

impl SoundPlayer for LogSoundPlayer {
    fn play(&self, effect: SoundEffect) {
        debug!(?effect, "sound effect");
    }
}

/// Audio services handed to the session.
#[derive(Clone)]
pub struct Capabilities {
    pub speaker: Arc<dyn Speaker>,
    pub sounds: Arc<dyn SoundPlayer>,
    pub speech: SpeechSettings,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::new(Arc::new(LogSpeaker), Arc::new(LogSoundPlayer))
    }
}

impl Capabilities {
    pub fn new(speaker: Arc<dyn Speaker>, sounds: Arc<dyn SoundPlayer>) -> Self {
        Self { speaker, sounds, speech: SpeechSettings::default() }
    }

    pub fn speak(&self, text: &str) {
        if !text.trim().is_empty() {
            self.speaker.speak(text, &self.speech);
        }
    }

    pub fn play(&self, effect: SoundEffect) {
        self.sounds.play(effect);
    }
}
