//! ---
//! reop_section: "03-assistant"
//! reop_subsection: "module"
//! reop_type: "source"
//! reop_scope: "code"
//! reop_description: "Rule-based assistant replies and conversation transcript."
//! reop_version: "v0.1.0"
//! reop_owner: "tbd"
//! ---
use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Upper bound on retained messages before the oldest are dropped.
const MAX_MESSAGES: usize = 256;

/// One entry in the assistant conversation.
///
/// The dashboard keys its bubble styling off the serialized `type` field, so
/// the wire name diverges from the Rust-side `role`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    /// Unique message id.
    pub id: Uuid,
    #[serde(rename = "type")]
    pub role: ChatRole,
    pub content: String,
    /// When the message was recorded.
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self::stamped(ChatRole::User, content)
    }

    pub fn bot(content: impl Into<String>) -> Self {
        Self::stamped(ChatRole::Bot, content)
    }

    fn stamped(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Author of a [`ChatMessage`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Bot,
}

impl ChatRole {
    /// Lowercase label matching the serialized form.
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatRole::User => "user",
            ChatRole::Bot => "bot",
        }
    }
}

/// Bounded in-memory conversation log.
///
/// Messages are kept in arrival order. Once [`MAX_MESSAGES`] is exceeded the
/// oldest entries are discarded, greeting included; the dashboard only ever
/// renders the recent tail.
#[derive(Debug, Default)]
pub struct Transcript {
    messages: VecDeque<ChatMessage>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message, evicting from the front when over capacity.
    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push_back(message);
        while self.messages.len() > MAX_MESSAGES {
            self.messages.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Copy of the retained conversation, oldest first.
    pub fn messages(&self) -> Vec<ChatMessage> {
        self.messages.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_keeps_arrival_order() {
        let mut transcript = Transcript::new();
        transcript.push(ChatMessage::bot("hello"));
        transcript.push(ChatMessage::user("status?"));

        let messages = transcript.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, ChatRole::Bot);
        assert_eq!(messages[1].role, ChatRole::User);
        assert_ne!(messages[0].id, messages[1].id);
    }

    #[test]
    fn capacity_evicts_oldest_first() {
        let mut transcript = Transcript::new();
        for i in 0..MAX_MESSAGES + 10 {
            transcript.push(ChatMessage::user(format!("message {i}")));
        }
        assert_eq!(transcript.len(), MAX_MESSAGES);
        assert_eq!(transcript.messages()[0].content, "message 10");
    }

    #[test]
    fn serializes_with_dashboard_field_names() {
        let message = ChatMessage::bot("reply text");
        let value = serde_json::to_value(&message).unwrap();
        assert_eq!(value["type"], "bot");
        assert!(value["content"].is_string());
        assert!(value["id"].is_string());
        assert!(value["timestamp"].is_string());
    }
}
