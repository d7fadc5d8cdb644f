//! Quiz round scoring
//!
//! Multiple-choice answers lock on the first pick. Scramble questions are
//! answered by moving shuffled tokens onto an answer line and checking the
//! joined sentence against the canonical one after normalization.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

use crate::content::QuizQuestion;
use crate::types::{MULTIPLE_CHOICE_REWARD, SCRAMBLE_REWARD};

/// Lowercases, drops `. , ! ?` and collapses whitespace.
pub fn normalize_sentence(s: &str) -> String {
    s.chars()
        .filter(|c| !matches!(c, '.' | ',' | '!' | '?'))
        .collect::<String>()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScrambleToken {
    pub id: usize,
    pub word: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrambleBoard {
    pool: Vec<ScrambleToken>,
    answer: Vec<ScrambleToken>,
}

impl ScrambleBoard {
    pub fn new<R: Rng + ?Sized>(sentence: &str, rng: &mut R) -> Self {
        let mut pool: Vec<ScrambleToken> = sentence
            .split_whitespace()
            .enumerate()
            .map(|(id, w)| ScrambleToken { id, word: w.to_string() })
            .collect();
        pool.shuffle(rng);
        Self { pool, answer: Vec::new() }
    }

    pub fn pool(&self) -> &[ScrambleToken] {
        &self.pool
    }

    pub fn answer(&self) -> &[ScrambleToken] {
        &self.answer
    }

    /// Moves a token from the pool to the end of the answer line.
    pub fn pick(&mut self, token_id: usize) -> bool {
        move_token(&mut self.pool, &mut self.answer, token_id)
    }

    /// Moves a token from the answer line back to the pool.
    pub fn unpick(&mut self, token_id: usize) -> bool {
        move_token(&mut self.answer, &mut self.pool, token_id)
    }

    pub fn built_sentence(&self) -> String {
        self.answer.iter().map(|t| t.word.as_str()).collect::<Vec<_>>().join(" ")
    }
}

fn move_token(from: &mut Vec<ScrambleToken>, to: &mut Vec<ScrambleToken>, token_id: usize) -> bool {
    match from.iter().position(|t| t.id == token_id) {
        Some(pos) => {
            to.push(from.remove(pos));
            true
        }
        None => false,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AnswerResult {
    pub correct: bool,
    pub reward: u32,
    /// Option picked for multiple-choice questions
    pub selected: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct QuizRound {
    questions: Vec<QuizQuestion>,
    index: usize,
    score: usize,
    result: Option<AnswerResult>,
    board: Option<ScrambleBoard>,
}

impl QuizRound {
    pub fn new<R: Rng + ?Sized>(questions: Vec<QuizQuestion>, rng: &mut R) -> Self {
        let mut round = Self { questions, index: 0, score: 0, result: None, board: None };
        round.prepare_current(rng);
        round
    }

    pub fn current(&self) -> Option<&QuizQuestion> {
        self.questions.get(self.index)
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn total(&self) -> usize {
        self.questions.len()
    }

    pub fn score(&self) -> usize {
        self.score
    }

    pub fn result(&self) -> Option<AnswerResult> {
        self.result
    }

    pub fn board(&self) -> Option<&ScrambleBoard> {
        self.board.as_ref()
    }

    pub fn is_finished(&self) -> bool {
        self.index >= self.questions.len()
    }

    /// Answers the current multiple-choice question. Later picks are ignored.
    pub fn choose(&mut self, option: usize) -> Option<AnswerResult> {
        if self.result.is_some() {
            return None;
        }
        let Some(QuizQuestion::MultipleChoice { correct_answer, .. }) = self.current() else {
            return None;
        };
        let correct = option == *correct_answer;
        Some(self.lock(correct, MULTIPLE_CHOICE_REWARD, Some(option)))
    }

    pub fn pick_token(&mut self, token_id: usize) -> bool {
        self.result.is_none() && self.board.as_mut().is_some_and(|b| b.pick(token_id))
    }

    pub fn unpick_token(&mut self, token_id: usize) -> bool {
        self.result.is_none() && self.board.as_mut().is_some_and(|b| b.unpick(token_id))
    }

    pub fn check_scramble(&mut self) -> Option<AnswerResult> {
        if self.result.is_some() {
            return None;
        }
        let Some(QuizQuestion::Scramble { scramble_sentence, .. }) = self.current() else {
            return None;
        };
        let target = normalize_sentence(scramble_sentence);
        let built = normalize_sentence(&self.board.as_ref()?.built_sentence());
        Some(self.lock(built == target, SCRAMBLE_REWARD, None))
    }

    /// Moves on; returns `false` once the round is over.
    pub fn advance<R: Rng + ?Sized>(&mut self, rng: &mut R) -> bool {
        if self.is_finished() {
            return false;
        }
        self.index += 1;
        self.result = None;
        self.prepare_current(rng);
        !self.is_finished()
    }

    fn lock(&mut self, correct: bool, reward: u32, selected: Option<usize>) -> AnswerResult {
        if correct {
            self.score += 1;
        }
        let result = AnswerResult { correct, reward: if correct { reward } else { 0 }, selected };
        self.result = Some(result);
        result
    }

    fn prepare_current<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.board = match self.current() {
            Some(QuizQuestion::Scramble { scramble_sentence, .. }) => Some(ScrambleBoard::new(scramble_sentence, rng)),
            _ => None,
        };
    }
}
