//! Review screen: the mistakes list and spelling tests.

use rand::Rng;
use tracing::info;

use kids_core::spelling::{SpellingOutcome, SpellingScope, SpellingTest};
use kids_core::{Action, MistakeRecord, SoundEffect};

use super::{ScreenError, ScreenResult};
use crate::session::LearnerSession;

#[derive(Debug, Default)]
pub struct ReviewScreen {
    test: Option<SpellingTest>,
}

impl ReviewScreen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mistakes<'a>(&self, session: &'a LearnerSession) -> &'a [MistakeRecord] {
        &session.state().progress.mistakes
    }

    pub fn speak_mistake(&self, session: &LearnerSession, word: &str) {
        session.speak(word);
    }

    /// "I know this now": drops the word from the list.
    pub fn mark_known(&self, session: &mut LearnerSession, word: &str) {
        if session.apply(Action::ResolveMistake { word: word.to_string() }).is_ok() {
            session.play(SoundEffect::Success);
        }
    }

    // ==================== Spelling ====================

    pub fn test(&self) -> Option<&SpellingTest> {
        self.test.as_ref()
    }

    /// Builds a test for the session's level and speaks the first word.
    pub fn start_spelling<R: Rng + ?Sized>(
        &mut self,
        session: &LearnerSession,
        scope: SpellingScope,
        rng: &mut R,
    ) -> ScreenResult<()> {
        let state = session.state();
        if let SpellingScope::Unit(unit_id) = &scope {
            if !state.progress.is_unlocked(unit_id) {
                return Err(ScreenError::LockedUnit(unit_id.clone()));
            }
        }
        let test = SpellingTest::new(&scope, state.level, &state.progress, rng).ok_or(ScreenError::NoWords)?;
        if let Some(item) = test.current() {
            session.speak(&item.word);
        }
        self.test = Some(test);
        Ok(())
    }

    pub fn repeat_word(&self, session: &LearnerSession) {
        if let Some(item) = self.test.as_ref().and_then(SpellingTest::current) {
            session.speak(&item.word);
        }
    }

    pub fn submit(&mut self, session: &mut LearnerSession, input: &str) -> SpellingOutcome {
        let Some(test) = self.test.as_mut() else {
            return SpellingOutcome::Finished;
        };
        let outcome = test.check(input);

        match &outcome {
            SpellingOutcome::Correct { word, reward, finished, bonus } => {
                session.play(SoundEffect::Correct);
                session.apply_or_warn(Action::AddCoins(*reward));
                if session.state().progress.has_mistake(word) {
                    session.apply_or_warn(Action::ResolveMistake { word: word.clone() });
                }
                if *finished {
                    info!(bonus, "spelling test finished");
                    session.play(SoundEffect::Success);
                    session.apply_or_warn(Action::AddCoins(*bonus));
                    self.test = None;
                } else if let Some(item) = test.current() {
                    session.speak(&item.word);
                }
            }
            SpellingOutcome::Wrong { word, unit_id } => {
                session.play(SoundEffect::Wrong);
                session.apply_or_warn(Action::RecordMistake { word: word.clone(), unit_id: unit_id.clone() });
            }
            SpellingOutcome::Finished => self.test = None,
        }
        outcome
    }

    pub fn stop(&mut self) {
        self.test = None;
    }
}
