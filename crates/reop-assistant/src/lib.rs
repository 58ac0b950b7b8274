//! ---
//! reop_section: "03-assistant"
//! reop_subsection: "module"
//! reop_type: "source"
//! reop_scope: "code"
//! reop_description: "Rule-based assistant replies and conversation transcript."
//! reop_version: "v0.1.0"
//! reop_owner: "tbd"
//! ---
//! The REOP assistant: a deterministic keyword router that answers operator
//! questions from the latest telemetry snapshot. No model inference, no
//! network calls, just an ordered dispatch table over canned templates.

pub mod responder;
pub mod session;
pub mod transcript;

pub use responder::{AssistantReply, Responder, GREETING};
pub use session::{AssistantSession, ChatExchange};
pub use transcript::{ChatMessage, ChatRole, Transcript};
