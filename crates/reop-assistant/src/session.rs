//! ---
//! reop_section: "03-assistant"
//! reop_subsection: "module"
//! reop_type: "source"
//! reop_scope: "code"
//! reop_description: "Rule-based assistant replies and conversation transcript."
//! reop_version: "v0.1.0"
//! reop_owner: "tbd"
//! ---
use reop_telemetry::model::EnergySnapshot;

use crate::responder::{Responder, GREETING};
use crate::transcript::{ChatMessage, Transcript};

/// User question and the bot message it produced.
#[derive(Debug, Clone)]
pub struct ChatExchange {
    pub user: ChatMessage,
    pub reply: ChatMessage,
    /// Topic label the responder routed the question to.
    pub topic: &'static str,
}

/// A responder plus its running transcript.
///
/// The session itself is not thread safe; callers that share it across
/// handlers wrap it in a lock and keep the critical section synchronous.
#[derive(Debug)]
pub struct AssistantSession {
    responder: Responder,
    transcript: Transcript,
}

impl AssistantSession {
    /// Start a session with the greeting already on the transcript.
    pub fn new(seed: Option<u64>) -> Self {
        let mut transcript = Transcript::new();
        transcript.push(ChatMessage::bot(GREETING));
        Self {
            responder: Responder::new(seed),
            transcript,
        }
    }

    /// Answer `query` against `snapshot`, recording both sides of the exchange.
    pub fn ask(&mut self, query: &str, snapshot: &EnergySnapshot) -> ChatExchange {
        let user = ChatMessage::user(query);
        let answer = self.responder.reply(query, snapshot);
        let reply = ChatMessage::bot(answer.text);

        self.transcript.push(user.clone());
        self.transcript.push(reply.clone());

        ChatExchange {
            user,
            reply,
            topic: answer.topic,
        }
    }

    /// Copy of the conversation so far, greeting first.
    pub fn transcript(&self) -> Vec<ChatMessage> {
        self.transcript.messages()
    }
}
