//! Common Types and Constants
//!
//! Shared enums and reward constants used across the core modules.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

// ==================== Constants ====================

/// Coins in a freshly created document
pub const STARTING_COINS: u32 = 100;

/// Default reward of `add_coin` when no amount is given
pub const DEFAULT_COIN_REWARD: u32 = 5;

/// Daily login bonus
pub const DAILY_BONUS_COINS: u32 = 20;

/// Coins awarded per star on unit completion
pub const COINS_PER_STAR: u32 = 10;

/// Highest star rating a unit can hold
pub const MAX_STARS: u8 = 3;

/// Reward for one matched pair in the matching game
pub const MATCH_REWARD: u32 = 2;

/// Reward for a freshly painted illustration
pub const ILLUSTRATION_REWARD: u32 = DEFAULT_COIN_REWARD;

/// Reward for a correct multiple-choice answer
pub const MULTIPLE_CHOICE_REWARD: u32 = 10;

/// Reward for a correct scramble answer
pub const SCRAMBLE_REWARD: u32 = 15;

/// Reward for one correctly spelled word
pub const SPELLING_REWARD: u32 = DEFAULT_COIN_REWARD;

/// Bonus for finishing a spelling test
pub const SPELLING_COMPLETION_BONUS: u32 = 50;

/// Maximum words drawn for one spelling test
pub const SPELLING_TEST_LENGTH: usize = 10;

/// Unit id recorded against mistakes from a mixed spelling test
pub const MIXED_UNIT_ID: &str = "mixed";

// ==================== Level ====================

/// Cambridge Young Learners difficulty tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Default)]
pub enum Level {
    #[default]
    Starters,
    Movers,
    Flyers,
}

impl Level {
    pub const ALL: [Level; 3] = [Level::Starters, Level::Movers, Level::Flyers];

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Starters => "Starters",
            Level::Movers => "Movers",
            Level::Flyers => "Flyers",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "starters" => Ok(Level::Starters),
            "movers" => Ok(Level::Movers),
            "flyers" => Ok(Level::Flyers),
            other => Err(format!("unknown level: {other}")),
        }
    }
}

// Hand-edited or older documents may spell the level in lowercase; an
// unknown level resets to `Starters` instead of discarding saved progress.
impl<'de> Deserialize<'de> for Level {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(raw.parse().unwrap_or_default())
    }
}

// ==================== Tab ====================

/// Screen selector persisted with the document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    #[default]
    Learn,
    Quiz,
    Chat,
    Review,
}

impl Tab {
    pub fn parse(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "quiz" => Self::Quiz,
            "chat" => Self::Chat,
            "review" => Self::Review,
            _ => Self::Learn,
        }
    }
}

// Older builds persisted a `settings` tab; anything unknown lands on `learn`
// instead of failing the whole document.
impl<'de> Deserialize<'de> for Tab {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(Tab::parse(&raw))
    }
}

// ==================== Sound ====================

/// Sound effects the presentation layer can trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SoundEffect {
    Correct,
    Wrong,
    Click,
    Success,
    Coin,
}
