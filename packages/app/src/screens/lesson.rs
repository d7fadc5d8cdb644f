//! Lesson screen: unit picker, flashcards, illustrations and the matching game.

use std::collections::HashMap;

use rand::Rng;
use tracing::{debug, info};

use kids_core::matching::{Deck, MatchOutcome, MatchingGame};
use kids_core::syllabus::{self, SyllabusUnit};
use kids_core::types::{ILLUSTRATION_REWARD, MATCH_REWARD};
use kids_core::{Action, ContentOrigin, Level, RequestGenerations, SoundEffect, Sourced, Ticket, VocabularyCard};

use super::{ScreenError, ScreenResult};
use crate::provider::{ContentService, Illustration};
use crate::session::LearnerSession;

/// Stars awarded when the matching game is cleared.
pub const MATCH_COMPLETION_STARS: u8 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LessonMode {
    Picking,
    Loading,
    Studying,
    Matching,
}

/// What to ask the content service for, tagged with its ticket.
#[derive(Debug, Clone)]
pub struct VocabularyRequest {
    pub ticket: Ticket,
    pub unit_id: String,
    pub level: Level,
    pub words: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct IllustrationRequest {
    pub ticket: Ticket,
    pub card_id: String,
    pub prompt: String,
}

#[derive(Debug)]
pub struct LessonScreen {
    generations: RequestGenerations,
    lesson_ticket: Option<Ticket>,
    mode: LessonMode,
    unit_id: Option<String>,
    cards: Vec<VocabularyCard>,
    origin: ContentOrigin,
    index: usize,
    illustrations: HashMap<String, Illustration>,
    game: Option<MatchingGame>,
}

impl Default for LessonScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl LessonScreen {
    pub fn new() -> Self {
        Self {
            generations: RequestGenerations::new(),
            lesson_ticket: None,
            mode: LessonMode::Picking,
            unit_id: None,
            cards: Vec::new(),
            origin: ContentOrigin::Generated,
            index: 0,
            illustrations: HashMap::new(),
            game: None,
        }
    }

    pub fn mode(&self) -> LessonMode {
        self.mode
    }

    pub fn unit_id(&self) -> Option<&str> {
        self.unit_id.as_deref()
    }

    pub fn cards(&self) -> &[VocabularyCard] {
        &self.cards
    }

    pub fn origin(&self) -> ContentOrigin {
        self.origin
    }

    pub fn game(&self) -> Option<&MatchingGame> {
        self.game.as_ref()
    }

    /// Units of the session's level with their lock state, for the picker.
    pub fn units<'a>(&self, session: &'a LearnerSession) -> impl Iterator<Item = (&'static SyllabusUnit, bool)> + 'a {
        let progress = &session.state().progress;
        syllabus::units_for_level(session.state().level).map(move |u| (u, progress.is_unlocked(u.id)))
    }

    // ==================== Loading ====================

    /// Starts a lesson; any request still in flight for another unit goes stale.
    pub fn select_unit(&mut self, session: &LearnerSession, unit_id: &str) -> ScreenResult<VocabularyRequest> {
        let unit = syllabus::find_unit(unit_id).ok_or_else(|| ScreenError::UnknownUnit(unit_id.to_string()))?;
        if !session.state().progress.is_unlocked(unit.id) {
            session.play(SoundEffect::Wrong);
            return Err(ScreenError::LockedUnit(unit_id.to_string()));
        }
        session.play(SoundEffect::Click);

        let ticket = self.generations.begin();
        self.lesson_ticket = Some(ticket);
        self.mode = LessonMode::Loading;
        self.unit_id = Some(unit.id.to_string());
        self.cards.clear();
        self.index = 0;
        self.illustrations.clear();
        self.game = None;

        debug!(unit = unit.id, "loading lesson");
        Ok(VocabularyRequest { ticket, unit_id: unit.id.to_string(), level: unit.level, words: unit.word_list() })
    }

    /// Installs the cards unless the request was superseded.
    pub fn finish_loading(&mut self, ticket: Ticket, cards: Sourced<Vec<VocabularyCard>>) -> bool {
        if !self.generations.is_current(ticket) {
            debug!(generation = ticket.generation(), "discarding stale lesson content");
            return false;
        }
        self.cards = cards.value;
        self.origin = cards.origin;
        self.index = 0;
        self.mode = LessonMode::Studying;
        true
    }

    pub async fn open_unit(
        &mut self,
        session: &LearnerSession,
        service: &ContentService,
        unit_id: &str,
    ) -> ScreenResult<bool> {
        let request = self.select_unit(session, unit_id)?;
        let cards = service.fetch_vocabulary(request.level, &request.words).await;
        Ok(self.finish_loading(request.ticket, cards))
    }

    /// Back to the unit picker.
    pub fn leave(&mut self) {
        self.generations.invalidate();
        self.lesson_ticket = None;
        self.mode = LessonMode::Picking;
        self.unit_id = None;
        self.cards.clear();
        self.illustrations.clear();
        self.game = None;
    }

    /// Following unit of the same level, if any.
    pub fn next_unit(&self) -> Option<&'static SyllabusUnit> {
        syllabus::next_unit(self.unit_id.as_deref()?)
    }

    // ==================== Flashcards ====================

    pub fn current_card(&self) -> Option<&VocabularyCard> {
        self.cards.get(self.index)
    }

    /// Zero-based index and card count.
    pub fn position(&self) -> (usize, usize) {
        (self.index, self.cards.len())
    }

    pub fn next_card(&mut self) -> bool {
        if self.index + 1 < self.cards.len() {
            self.index += 1;
            true
        } else {
            false
        }
    }

    pub fn previous_card(&mut self) -> bool {
        if self.index > 0 {
            self.index -= 1;
            true
        } else {
            false
        }
    }

    pub fn speak_word(&self, session: &LearnerSession) {
        if let Some(card) = self.current_card() {
            session.speak(&card.word);
        }
    }

    pub fn speak_sentence(&self, session: &LearnerSession) {
        if let Some(card) = self.current_card() {
            session.speak(&card.example_sentence);
        }
    }

    // ==================== Illustrations ====================

    pub fn illustration(&self, card_id: &str) -> Option<&Illustration> {
        self.illustrations.get(card_id)
    }

    /// `None` for offline lessons and for cards already painted.
    pub fn begin_illustration(&self) -> Option<IllustrationRequest> {
        if self.origin.is_offline() || self.mode != LessonMode::Studying {
            return None;
        }
        let ticket = self.lesson_ticket?;
        let card = self.current_card()?;
        if self.illustrations.contains_key(&card.id) {
            return None;
        }
        Some(IllustrationRequest { ticket, card_id: card.id.clone(), prompt: card.illustration_prompt() })
    }

    /// Caches a fresh picture and pays for it. Stale or empty results are dropped.
    pub fn finish_illustration(
        &mut self,
        session: &mut LearnerSession,
        request: IllustrationRequest,
        image: Option<Illustration>,
    ) -> bool {
        if !self.generations.is_current(request.ticket) || self.illustrations.contains_key(&request.card_id) {
            return false;
        }
        let Some(image) = image else {
            return false;
        };
        self.illustrations.insert(request.card_id, image);
        if session.apply(Action::AddCoins(ILLUSTRATION_REWARD)).is_ok() {
            session.play(SoundEffect::Coin);
        }
        true
    }

    pub async fn paint_current(&mut self, session: &mut LearnerSession, service: &ContentService) -> bool {
        let Some(request) = self.begin_illustration() else {
            return false;
        };
        let image = service.fetch_illustration(&request.prompt).await;
        self.finish_illustration(session, request, image)
    }

    // ==================== Matching game ====================

    pub fn start_game<R: Rng + ?Sized>(&mut self, session: &LearnerSession, rng: &mut R) -> ScreenResult<()> {
        let unit_id = self.unit_id.clone().ok_or(ScreenError::NothingLoaded)?;
        let game = MatchingGame::new(&unit_id, &self.cards, rng).ok_or(ScreenError::NothingLoaded)?;
        session.play(SoundEffect::Click);
        self.game = Some(game);
        self.mode = LessonMode::Matching;
        Ok(())
    }

    pub fn select_tile(&mut self, session: &mut LearnerSession, pair_id: &str, deck: Deck) -> MatchOutcome {
        let Some(game) = self.game.as_mut() else {
            return MatchOutcome::Ignored;
        };
        let outcome = game.select(pair_id, deck);
        let unit_id = game.unit_id().to_string();

        match &outcome {
            MatchOutcome::Ignored => {}
            MatchOutcome::Selected | MatchOutcome::Deselected => session.play(SoundEffect::Click),
            MatchOutcome::Matched { completed, .. } => {
                session.play(SoundEffect::Correct);
                session.apply_or_warn(Action::AddCoins(MATCH_REWARD));
                if *completed {
                    let completion = Action::CompleteUnit { unit_id: unit_id.clone(), stars: MATCH_COMPLETION_STARS };
                    if session.apply_or_warn(completion) {
                        info!(unit = %unit_id, "unit completed");
                        session.play(SoundEffect::Success);
                    }
                }
            }
            MatchOutcome::Mismatch { word } => {
                session.play(SoundEffect::Wrong);
                session.apply_or_warn(Action::RecordMistake { word: word.clone(), unit_id });
            }
        }
        outcome
    }
}
