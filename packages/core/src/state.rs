//! Persisted application document
//!
//! `AppState` is the single JSON document written to storage. Field names
//! follow the camelCase shape the store has always used, and every field
//! carries a serde default so documents written by older builds under the
//! same key still load (reconciliation fills the rest).

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::avatars::{DEFAULT_AVATAR, DEFAULT_AVATARS};
use crate::types::{Level, Tab, STARTING_COINS};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MistakeRecord {
    pub word: String,
    pub unit_id: String,
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserProgress {
    pub unlocked_units: BTreeSet<String>,
    pub completed_units: BTreeMap<String, u8>,
    pub total_stars: u32,
    pub mistakes: Vec<MistakeRecord>,
}

impl UserProgress {
    pub fn is_unlocked(&self, unit_id: &str) -> bool {
        self.unlocked_units.contains(unit_id)
    }

    pub fn stars_for(&self, unit_id: &str) -> Option<u8> {
        self.completed_units.get(unit_id).copied()
    }

    pub fn has_mistake(&self, word: &str) -> bool {
        self.mistakes.iter().any(|m| m.word == word)
    }

    pub fn star_sum(&self) -> u32 {
        self.completed_units.values().map(|&s| u32::from(s)).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    #[serde(default)]
    pub current_tab: Tab,
    #[serde(default)]
    pub level: Level,
    #[serde(default = "default_coins")]
    pub coins: u32,
    #[serde(default)]
    pub progress: UserProgress,
    /// `YYYY-MM-DD`, empty before the first session
    #[serde(default)]
    pub last_login_date: String,
    #[serde(default)]
    pub streak_days: u32,
    #[serde(default = "default_avatar")]
    pub current_avatar: String,
    #[serde(default = "default_unlocked_avatars")]
    pub unlocked_avatars: Vec<String>,
}

impl AppState {
    /// Blank document with no units unlocked; see `progression::default_state`
    /// for the policy-aware starting document.
    pub fn blank() -> Self {
        Self {
            current_tab: Tab::default(),
            level: Level::default(),
            coins: STARTING_COINS,
            progress: UserProgress::default(),
            last_login_date: String::new(),
            streak_days: 0,
            current_avatar: default_avatar(),
            unlocked_avatars: default_unlocked_avatars(),
        }
    }

    pub fn owns_avatar(&self, avatar_id: &str) -> bool {
        self.unlocked_avatars.iter().any(|a| a == avatar_id)
    }

    pub fn mistake_count(&self) -> usize {
        self.progress.mistakes.len()
    }
}

fn default_coins() -> u32 {
    STARTING_COINS
}

fn default_avatar() -> String {
    DEFAULT_AVATAR.to_string()
}

fn default_unlocked_avatars() -> Vec<String> {
    DEFAULT_AVATARS.iter().map(|a| a.to_string()).collect()
}
