//! Voice processing module
//!
//! Speech-to-text and speech synthesis. Transcription goes through an
//! OpenAI-compatible API behind a lazily built engine; synthesis pipes a
//! local piper voice through ffmpeg (see `tts.rs`).

mod stt;
mod tts;

pub use stt::{SpeechToText, Transcriber, WhisperApi};
pub use tts::{
    AudioEncoder, FfmpegEncoder, PcmStream, PiperEngine, SpeechEngine, StageGuard, Synthesizer,
    is_mp3,
};
