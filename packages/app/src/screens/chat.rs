//! Chat tutor screen
//!
//! A conversation belongs to one level. Switching level starts a new one
//! and every reply or translation still in flight for the old conversation
//! is dropped when it lands.

use chrono::Utc;
use tracing::debug;
use uuid::Uuid;

use kids_core::{ChatMessage, ChatRole, ContentOrigin, Level, RequestGenerations, SoundEffect, Sourced, Ticket};

use crate::provider::ContentService;
use crate::session::LearnerSession;

#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub ticket: Ticket,
    pub level: Level,
    pub history: Vec<ChatMessage>,
}

#[derive(Debug, Clone)]
pub struct TranslationRequest {
    pub ticket: Ticket,
    pub message_id: String,
    pub text: String,
}

#[derive(Debug, Default)]
pub struct ChatScreen {
    generations: RequestGenerations,
    conversation: Option<Ticket>,
    level: Option<Level>,
    messages: Vec<ChatMessage>,
    awaiting_reply: bool,
    origin: ContentOrigin,
}

impl ChatScreen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn level(&self) -> Option<Level> {
        self.level
    }

    pub fn is_awaiting_reply(&self) -> bool {
        self.awaiting_reply
    }

    /// Origin of the latest tutor message.
    pub fn origin(&self) -> ContentOrigin {
        self.origin
    }

    pub fn needs_restart(&self, session: &LearnerSession) -> bool {
        self.level != Some(session.state().level)
    }

    /// Clears the transcript and opens a conversation at the session's level.
    pub fn begin_conversation(&mut self, session: &LearnerSession) -> ChatRequest {
        let level = session.state().level;
        let ticket = self.generations.begin();
        self.conversation = Some(ticket);
        self.level = Some(level);
        self.messages.clear();
        self.awaiting_reply = true;
        debug!(%level, "starting chat conversation");
        ChatRequest { ticket, level, history: Vec::new() }
    }

    /// Adds the learner's message. `None` for blank input or while a reply is pending.
    pub fn send(&mut self, session: &LearnerSession, text: &str, now_ms: i64) -> Option<ChatRequest> {
        let text = text.trim();
        if text.is_empty() || self.awaiting_reply {
            return None;
        }
        let ticket = self.conversation?;
        let level = self.level?;
        session.play(SoundEffect::Click);
        self.messages.push(new_message(ChatRole::User, text.to_string(), now_ms));
        self.awaiting_reply = true;
        Some(ChatRequest { ticket, level, history: self.messages.clone() })
    }

    /// Appends a tutor message unless its conversation is gone.
    pub fn receive(&mut self, ticket: Ticket, reply: Sourced<String>, now_ms: i64) -> bool {
        if !self.generations.is_current(ticket) {
            debug!(generation = ticket.generation(), "discarding reply from an old conversation");
            return false;
        }
        self.awaiting_reply = false;
        self.origin = reply.origin;
        self.messages.push(new_message(ChatRole::Model, reply.value, now_ms));
        true
    }

    pub fn leave(&mut self) {
        self.generations.invalidate();
        self.conversation = None;
        self.level = None;
        self.messages.clear();
        self.awaiting_reply = false;
    }

    pub async fn start(&mut self, session: &LearnerSession, service: &ContentService) -> bool {
        let request = self.begin_conversation(session);
        let greeting = service.chat_greeting(request.level, now_ms()).await;
        self.receive(request.ticket, greeting, now_ms())
    }

    pub async fn say(&mut self, session: &LearnerSession, service: &ContentService, text: &str) -> bool {
        let Some(request) = self.send(session, text, now_ms()) else {
            return false;
        };
        let reply = service.chat_reply(request.level, &request.history).await;
        self.receive(request.ticket, reply, now_ms())
    }

    // ==================== Per-message actions ====================

    pub fn speak_message(&self, session: &LearnerSession, message_id: &str) {
        if let Some(message) = self.find(message_id) {
            session.speak(&message.text);
        }
    }

    /// `None` when the message is unknown or already translated.
    pub fn translation_request(&self, message_id: &str) -> Option<TranslationRequest> {
        let ticket = self.conversation?;
        let message = self.find(message_id)?;
        if message.translation.is_some() {
            return None;
        }
        Some(TranslationRequest { ticket, message_id: message.id.clone(), text: message.text.clone() })
    }

    pub fn apply_translation(&mut self, request: TranslationRequest, translation: Sourced<String>) -> bool {
        if !self.generations.is_current(request.ticket) {
            return false;
        }
        match self.messages.iter_mut().find(|m| m.id == request.message_id) {
            Some(message) if message.translation.is_none() => {
                message.translation = Some(translation.value);
                true
            }
            _ => false,
        }
    }

    pub async fn translate(&mut self, service: &ContentService, message_id: &str) -> Option<&str> {
        if let Some(request) = self.translation_request(message_id) {
            let translation = service.translate(&request.text).await;
            self.apply_translation(request, translation);
        }
        self.find(message_id)?.translation.as_deref()
    }

    fn find(&self, message_id: &str) -> Option<&ChatMessage> {
        self.messages.iter().find(|m| m.id == message_id)
    }
}

fn new_message(role: ChatRole, text: String, timestamp: i64) -> ChatMessage {
    ChatMessage { id: Uuid::new_v4().to_string(), role, text, timestamp, translation: None }
}

fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}
