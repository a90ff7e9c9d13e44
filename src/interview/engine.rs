//! Turn handling and final evaluation

use std::sync::Arc;

use crate::Result;
use crate::llm::ChatCompletion;

use super::{Role, Turn, Utterance, classify, prompts};

/// Outcome of one interview turn
///
/// Serializes as the `X-Conversation-Data` payload the browser client reads.
#[derive(Debug, Clone, serde::Serialize)]
pub struct TurnReply {
    /// What the candidate was heard to say, after transcription filtering
    pub user_text: String,
    /// What the interviewer says next
    pub ai_text: String,
    /// Updated history for the client to send with the next request
    pub history: Vec<Turn>,
}

/// Drives the interview conversation over a chat completion capability
///
/// The engine owns the personas and prepends the right one to every model
/// prompt. Caller-supplied histories never contribute system turns, so each
/// prompt carries exactly one.
pub struct InterviewEngine {
    chat: Arc<dyn ChatCompletion>,
    turn_temperature: f32,
    summary_temperature: f32,
}

impl InterviewEngine {
    #[must_use]
    pub fn new(chat: Arc<dyn ChatCompletion>, turn_temperature: f32, summary_temperature: f32) -> Self {
        Self { chat, turn_temperature, summary_temperature }
    }

    /// Fixed opening prompt; identical for every session, no model call
    #[must_use]
    pub fn opening_prompt(&self) -> &'static str {
        prompts::GREETING
    }

    /// Handle one spoken answer.
    ///
    /// Empty or junk utterances produce the fixed clarification request and
    /// leave the history untouched. A substantive answer goes to the model
    /// and appends a user turn and an assistant turn, in that order.
    ///
    /// # Errors
    ///
    /// Returns an error if the chat completion call fails.
    pub async fn handle_turn(&self, history: Vec<Turn>, user_text: &str) -> Result<TurnReply> {
        match classify(user_text) {
            Utterance::Empty | Utterance::Junk => {
                tracing::debug!(transcript = %user_text, "no usable speech, asking candidate to repeat");
                Ok(TurnReply {
                    user_text: user_text.to_string(),
                    ai_text: prompts::CLARIFICATION_REQUEST.to_string(),
                    history,
                })
            }
            Utterance::Substantive => {
                let mut messages = Vec::with_capacity(history.len() + 2);
                messages.push(Turn::system(prompts::INTERVIEWER_PERSONA));
                messages.extend(history.iter().filter(|t| t.role != Role::System).cloned());
                messages.push(Turn::user(user_text));

                let ai_text = self.chat.complete(&messages, self.turn_temperature).await?;

                let mut history = history;
                history.push(Turn::user(user_text));
                history.push(Turn::assistant(ai_text.clone()));

                Ok(TurnReply { user_text: user_text.to_string(), ai_text, history })
            }
        }
    }

    /// Produce the final scored debrief for a finished interview.
    ///
    /// A history without a single user turn means the candidate never
    /// answered; the fixed early-end message is returned without a model
    /// call.
    ///
    /// # Errors
    ///
    /// Returns an error if the chat completion call fails.
    pub async fn summarize(&self, history: &[Turn]) -> Result<String> {
        let user_turns = history.iter().filter(|t| t.role == Role::User).count();
        if user_turns == 0 {
            tracing::info!("summary requested before any answer was given");
            return Ok(prompts::EARLY_END_FEEDBACK.to_string());
        }

        let mut messages = Vec::with_capacity(history.len() + 1);
        messages.push(Turn::system(prompts::EVALUATION_PERSONA));
        messages.extend(history.iter().filter(|t| t.role != Role::System).cloned());

        tracing::debug!(user_turns, "requesting final evaluation");
        self.chat.complete(&messages, self.summary_temperature).await
    }
}
