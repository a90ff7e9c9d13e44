//! Conversation engine for the mock interview
//!
//! The server holds no session state: the client keeps the full conversation
//! history and sends it with every request. This module owns the interviewer
//! and evaluation personas, classifies each transcribed utterance, and
//! decides what reaches the language model.

mod engine;
pub mod prompts;

pub use engine::{InterviewEngine, TurnReply};

use serde::{Deserialize, Serialize};

/// Role of one conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One role-tagged message in a conversation history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    /// Create a system turn
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into() }
    }

    /// Create a user turn
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }

    /// Create an assistant turn
    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into() }
    }
}

/// Phrases the transcription backend produces for silence, breathing, or
/// background noise, matched after trimming and lowercasing
const JUNK_UTTERANCES: &[&str] = &[
    "you",
    "bye",
    "thank you",
    "thank you.",
    "thanks for watching",
    "thanks for watching.",
    "thank you for watching",
];

/// Classification of a transcribed utterance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Utterance {
    /// No speech was detected
    Empty,
    /// A known artifact of transcribing silence or noise
    Junk,
    /// A real answer worth forwarding to the language model
    Substantive,
}

/// Classify a transcribed utterance
#[must_use]
pub fn classify(text: &str) -> Utterance {
    let normalized = text.trim().to_lowercase();
    if normalized.is_empty() {
        Utterance::Empty
    } else if JUNK_UTTERANCES.contains(&normalized.as_str()) {
        Utterance::Junk
    } else {
        Utterance::Substantive
    }
}

/// Interview phase, derived from the request shape; used for logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Greeting,
    AwaitingAnswer,
    Summary,
}
