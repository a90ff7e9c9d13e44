//! Viva Gateway - voice-driven mock interview server
//!
//! This library provides the core functionality for the viva gateway:
//! - Interview conversation engine (personas, turn handling, final scoring)
//! - Speech-to-text via an OpenAI-compatible transcription API
//! - Speech synthesis through a local piper voice piped into ffmpeg
//! - Ephemeral spooling of synthesized audio for streamed responses
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                  Browser client                      │
//! │   records answers, plays replies, and keeps the     │
//! │   conversation history between requests             │
//! └────────────────────┬────────────────────────────────┘
//!                      │  multipart audio + history
//! ┌────────────────────▼────────────────────────────────┐
//! │                  Viva Gateway                        │
//! │   API  │  Engine  │  STT  │  Synthesis  │  Spool   │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │              Upstream capabilities                   │
//! │   Whisper API  │  chat completions  │ piper+ffmpeg │
//! └─────────────────────────────────────────────────────┘
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod interview;
pub mod llm;
pub mod spool;
pub mod voice;

pub use config::Config;
pub use error::{Error, Result};
pub use interview::{InterviewEngine, Role, Turn, TurnReply, Utterance, classify};
pub use llm::{ChatCompletion, OpenAiChat};
pub use spool::{SpoolDir, SpoolFile};
pub use voice::{SpeechToText, Synthesizer, Transcriber};
