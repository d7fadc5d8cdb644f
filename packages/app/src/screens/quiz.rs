//! Quiz screen: one generated round per level.

use rand::Rng;
use tracing::{debug, info};

use kids_core::quiz::{AnswerResult, QuizRound};
use kids_core::{Action, ContentOrigin, Level, QuizQuestion, RequestGenerations, SoundEffect, Sourced, Ticket};

use crate::provider::ContentService;
use crate::session::LearnerSession;

#[derive(Debug, Clone, Copy)]
pub struct QuizRequest {
    pub ticket: Ticket,
    pub level: Level,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizSummary {
    pub score: usize,
    pub total: usize,
}

#[derive(Debug, Default)]
pub struct QuizScreen {
    generations: RequestGenerations,
    level: Option<Level>,
    loading: bool,
    round: Option<QuizRound>,
    origin: ContentOrigin,
}

impl QuizScreen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn round(&self) -> Option<&QuizRound> {
        self.round.as_ref()
    }

    pub fn origin(&self) -> ContentOrigin {
        self.origin
    }

    /// True when nothing is loaded for the session's current level.
    pub fn needs_reload(&self, session: &LearnerSession) -> bool {
        self.level != Some(session.state().level)
    }

    pub fn begin_loading(&mut self, session: &LearnerSession) -> QuizRequest {
        let level = session.state().level;
        let ticket = self.generations.begin();
        self.level = Some(level);
        self.loading = true;
        self.round = None;
        QuizRequest { ticket, level }
    }

    pub fn finish_loading<R: Rng + ?Sized>(
        &mut self,
        ticket: Ticket,
        questions: Sourced<Vec<QuizQuestion>>,
        rng: &mut R,
    ) -> bool {
        if !self.generations.is_current(ticket) {
            debug!(generation = ticket.generation(), "discarding stale quiz");
            return false;
        }
        self.loading = false;
        self.origin = questions.origin;
        self.round = Some(QuizRound::new(questions.value, rng));
        true
    }

    pub async fn load<R: Rng + ?Sized>(&mut self, session: &LearnerSession, service: &ContentService, rng: &mut R) -> bool {
        let request = self.begin_loading(session);
        let questions = service.fetch_quiz(request.level).await;
        self.finish_loading(request.ticket, questions, rng)
    }

    pub fn leave(&mut self) {
        self.generations.invalidate();
        self.loading = false;
        self.level = None;
        self.round = None;
    }

    pub fn choose(&mut self, session: &mut LearnerSession, option: usize) -> Option<AnswerResult> {
        let result = self.round.as_mut()?.choose(option)?;
        reward(session, result);
        Some(result)
    }

    pub fn pick_token(&mut self, session: &LearnerSession, token_id: usize) -> bool {
        let moved = self.round.as_mut().is_some_and(|r| r.pick_token(token_id));
        if moved {
            session.play(SoundEffect::Click);
        }
        moved
    }

    pub fn unpick_token(&mut self, session: &LearnerSession, token_id: usize) -> bool {
        let moved = self.round.as_mut().is_some_and(|r| r.unpick_token(token_id));
        if moved {
            session.play(SoundEffect::Click);
        }
        moved
    }

    pub fn check_scramble(&mut self, session: &mut LearnerSession) -> Option<AnswerResult> {
        let result = self.round.as_mut()?.check_scramble()?;
        reward(session, result);
        Some(result)
    }

    /// Moves to the next question; returns the summary once the round ends.
    pub fn next<R: Rng + ?Sized>(&mut self, session: &LearnerSession, rng: &mut R) -> Option<QuizSummary> {
        let round = self.round.as_mut()?;
        if round.advance(rng) {
            return None;
        }
        let summary = QuizSummary { score: round.score(), total: round.total() };
        info!(score = summary.score, total = summary.total, "quiz finished");
        session.play(SoundEffect::Success);
        Some(summary)
    }

    pub fn summary(&self) -> Option<QuizSummary> {
        let round = self.round.as_ref()?;
        round.is_finished().then(|| QuizSummary { score: round.score(), total: round.total() })
    }
}

fn reward(session: &mut LearnerSession, result: AnswerResult) {
    if result.correct {
        session.play(SoundEffect::Correct);
        session.apply_or_warn(Action::AddCoins(result.reward));
    } else {
        session.play(SoundEffect::Wrong);
    }
}
