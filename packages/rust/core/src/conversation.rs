//! The append-only message log plus the "assistant is composing" flag.

use noahaid_shared::Message;
use serde::Serialize;

/// Conversation state for one session. Insertion order is display order;
/// messages are never edited or removed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConversationState {
    messages: Vec<Message>,
    composing: bool,
}

impl ConversationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// True while at least one reply delay is running (last write wins).
    pub fn is_composing(&self) -> bool {
        self.composing
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub(crate) fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub(crate) fn set_composing(&mut self, composing: bool) {
        self.composing = composing;
    }
}
