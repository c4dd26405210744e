use chrono::{DateTime, Local};

use crate::ai::{build_prompt, PendingReply, TextGenerator};

pub const WELCOME_TEXT: &str =
    "¡Hola! Soy AnatomAR, tu asistente virtual de anatomía humana. ¿En qué puedo ayudarte hoy?";

/// Role of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    User,
    Assistant,
}

/// A single chat message
#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub id: u64,
    pub role: ChatRole,
    pub text: String,
    pub timestamp: DateTime<Local>,
    pub is_error: bool,
}

impl ChatMessage {
    /// Local time as HH:MM
    pub fn time_label(&self) -> String {
        self.timestamp.format("%H:%M").to_string()
    }
}

/// Transcript plus the one in-flight request, if any
pub struct ChatSession {
    pub messages: Vec<ChatMessage>,
    pub input: String,
    pending: Option<PendingReply>,
    next_id: u64,
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatSession {
    pub fn new() -> Self {
        let mut session = Self {
            messages: Vec::new(),
            input: String::new(),
            pending: None,
            next_id: 1,
        };
        session.push(ChatRole::Assistant, WELCOME_TEXT.to_string(), false);
        session
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    pub fn can_send(&self) -> bool {
        !self.is_loading() && !self.input.trim().is_empty()
    }

    fn push(&mut self, role: ChatRole, text: String, is_error: bool) {
        self.messages.push(ChatMessage {
            id: self.next_id,
            role,
            text,
            timestamp: Local::now(),
            is_error,
        });
        self.next_id += 1;
    }

    /// Send the current input. Returns false if nothing was sent.
    pub fn send_message(&mut self, generator: &dyn TextGenerator) -> bool {
        let text = self.input.trim().to_string();
        if !self.send(&text, generator) {
            return false;
        }
        self.input.clear();
        true
    }

    /// Append a user turn and issue exactly one request for it.
    /// Ignored while a request is in flight or when `text` is blank.
    pub fn send(&mut self, text: &str, generator: &dyn TextGenerator) -> bool {
        let text = text.trim();
        if self.is_loading() || text.is_empty() {
            return false;
        }
        self.push(ChatRole::User, text.to_string(), false);
        self.pending = Some(generator.generate(build_prompt(text)));
        true
    }

    /// Append the reply (or its fallback) once it has arrived.
    /// Returns true when the transcript changed.
    pub fn poll_responses(&mut self) -> bool {
        let Some(pending) = self.pending.as_mut() else {
            return false;
        };
        let Some(result) = pending.try_take() else {
            return false;
        };
        self.pending = None;

        match result {
            Ok(reply) => self.push(ChatRole::Assistant, reply, false),
            Err(e) => {
                tracing::warn!("Chat reply replaced by fallback: {e}");
                self.push(ChatRole::Assistant, e.fallback_text().to_string(), true);
            }
        }
        true
    }

    /// Back to the welcome turn; an in-flight reply is discarded
    pub fn clear(&mut self) {
        self.messages.clear();
        self.input.clear();
        self.pending = None;
        self.push(ChatRole::Assistant, WELCOME_TEXT.to_string(), false);
    }
}
