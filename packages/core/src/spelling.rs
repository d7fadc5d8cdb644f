//! Spelling test
//!
//! The target word is spoken and the learner types it. A wrong attempt stays
//! on the same word; a correct one moves on. Words come from one unit or,
//! for a mixed test, from every unlocked unit of the current level.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::state::UserProgress;
use crate::syllabus;
use crate::types::{Level, MIXED_UNIT_ID, SPELLING_COMPLETION_BONUS, SPELLING_REWARD, SPELLING_TEST_LENGTH};

/// Which words a test draws from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpellingScope {
    Unit(String),
    AllUnlocked,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpellingItem {
    pub word: String,
    /// Unit id mistakes are recorded against
    pub unit_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpellingOutcome {
    Correct { word: String, reward: u32, finished: bool, bonus: u32 },
    Wrong { word: String, unit_id: String },
    Finished,
}

#[derive(Debug, Clone)]
pub struct SpellingTest {
    items: Vec<SpellingItem>,
    index: usize,
}

/// Candidate words for a scope at `level`, before shuffling.
pub fn candidate_words(scope: &SpellingScope, level: Level, progress: &UserProgress) -> Vec<String> {
    match scope {
        SpellingScope::Unit(unit_id) => syllabus::units_for_level(level)
            .find(|u| u.id == unit_id)
            .map(|u| u.word_list())
            .unwrap_or_default(),
        SpellingScope::AllUnlocked => syllabus::units_for_level(level)
            .filter(|u| progress.is_unlocked(u.id))
            .flat_map(|u| u.word_list())
            .collect(),
    }
}

impl SpellingTest {
    /// `None` when the scope has no words for this level.
    pub fn new<R: Rng + ?Sized>(
        scope: &SpellingScope,
        level: Level,
        progress: &UserProgress,
        rng: &mut R,
    ) -> Option<Self> {
        let mut words = candidate_words(scope, level, progress);
        if words.is_empty() {
            return None;
        }
        words.shuffle(rng);
        words.truncate(SPELLING_TEST_LENGTH);

        let unit_id = match scope {
            SpellingScope::Unit(id) => id.clone(),
            SpellingScope::AllUnlocked => MIXED_UNIT_ID.to_string(),
        };
        let items = words
            .into_iter()
            .map(|word| SpellingItem { word, unit_id: unit_id.clone() })
            .collect();
        Some(Self { items, index: 0 })
    }

    pub fn current(&self) -> Option<&SpellingItem> {
        self.items.get(self.index)
    }

    pub fn position(&self) -> (usize, usize) {
        (self.index, self.items.len())
    }

    pub fn is_finished(&self) -> bool {
        self.index >= self.items.len()
    }

    pub fn check(&mut self, input: &str) -> SpellingOutcome {
        let Some(item) = self.current().cloned() else {
            return SpellingOutcome::Finished;
        };
        if input.trim().to_lowercase() != item.word.to_lowercase() {
            return SpellingOutcome::Wrong { word: item.word, unit_id: item.unit_id };
        }
        self.index += 1;
        let finished = self.is_finished();
        SpellingOutcome::Correct {
            word: item.word,
            reward: SPELLING_REWARD,
            finished,
            bonus: if finished { SPELLING_COMPLETION_BONUS } else { 0 },
        }
    }
}
