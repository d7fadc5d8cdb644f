//! Matching game
//!
//! Words on one deck, definitions on the other, each deck shuffled on its
//! own. The learner picks one card, then a card on the other deck. Same pair
//! id is a match; anything else is a mismatch charged against the word that
//! was picked first. The game completes exactly once, when every pair is
//! matched.
//!
//! A second pick on the same deck only moves the selection: picking the same
//! card again clears it, another card replaces it. Treating that as a
//! comparison would let a double tap on one word card count as its match.
//! Charging the first pick keeps the mistake on the word the learner was
//! trying to place rather than whichever card happens to come first in the
//! lesson.

use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

use crate::content::VocabularyCard;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Deck {
    Words,
    Definitions,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchTile {
    pub pair_id: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchOutcome {
    /// Already matched, unknown, or the game is over.
    Ignored,
    Selected,
    Deselected,
    Matched { word: String, completed: bool },
    Mismatch { word: String },
}

#[derive(Debug, Clone)]
pub struct MatchingGame {
    unit_id: String,
    words: Vec<MatchTile>,
    definitions: Vec<MatchTile>,
    pending: Option<(String, Deck)>,
    matched: HashSet<String>,
    completed: bool,
}

impl MatchingGame {
    /// `None` when there is nothing to match.
    pub fn new<R: Rng + ?Sized>(unit_id: &str, cards: &[VocabularyCard], rng: &mut R) -> Option<Self> {
        if cards.is_empty() {
            return None;
        }
        let mut words: Vec<MatchTile> = cards
            .iter()
            .map(|c| MatchTile { pair_id: c.id.clone(), text: c.word.clone() })
            .collect();
        let mut definitions: Vec<MatchTile> = cards
            .iter()
            .map(|c| MatchTile { pair_id: c.id.clone(), text: c.definition.clone() })
            .collect();
        words.shuffle(rng);
        definitions.shuffle(rng);

        Some(Self {
            unit_id: unit_id.to_string(),
            words,
            definitions,
            pending: None,
            matched: HashSet::new(),
            completed: false,
        })
    }

    pub fn unit_id(&self) -> &str {
        &self.unit_id
    }

    pub fn deck(&self, deck: Deck) -> &[MatchTile] {
        match deck {
            Deck::Words => &self.words,
            Deck::Definitions => &self.definitions,
        }
    }

    pub fn pending(&self) -> Option<(&str, Deck)> {
        self.pending.as_ref().map(|(id, deck)| (id.as_str(), *deck))
    }

    pub fn matched_ids(&self) -> &HashSet<String> {
        &self.matched
    }

    pub fn is_matched(&self, pair_id: &str) -> bool {
        self.matched.contains(pair_id)
    }

    pub fn pair_count(&self) -> usize {
        self.words.len()
    }

    pub fn is_complete(&self) -> bool {
        self.completed
    }

    pub fn select(&mut self, pair_id: &str, deck: Deck) -> MatchOutcome {
        if self.completed || self.matched.contains(pair_id) || self.word_of(pair_id).is_none() {
            return MatchOutcome::Ignored;
        }

        let Some((pending_id, pending_deck)) = self.pending.take() else {
            self.pending = Some((pair_id.to_string(), deck));
            return MatchOutcome::Selected;
        };

        if pending_deck == deck {
            if pending_id == pair_id {
                return MatchOutcome::Deselected;
            }
            self.pending = Some((pair_id.to_string(), deck));
            return MatchOutcome::Selected;
        }

        if pending_id == pair_id {
            self.matched.insert(pending_id.clone());
            self.completed = self.matched.len() == self.pair_count();
            let word = self.word_of(&pending_id).unwrap_or_default().to_string();
            return MatchOutcome::Matched { word, completed: self.completed };
        }

        let word = self.word_of(&pending_id).unwrap_or_default().to_string();
        MatchOutcome::Mismatch { word }
    }

    fn word_of(&self, pair_id: &str) -> Option<&str> {
        self.words.iter().find(|t| t.pair_id == pair_id).map(|t| t.text.as_str())
    }
}
