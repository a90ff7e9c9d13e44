//! Speech-to-text adapter
//!
//! Wraps a transcription capability behind the junk filter and the
//! recover-to-silence failure policy. The underlying engine is built lazily
//! on first use; concurrent first calls initialize it exactly once.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::OnceCell;

use crate::config::SttConfig;
use crate::{Error, Result};

/// Phrases the transcription backend emits for silence or background noise,
/// matched after trimming and lowercasing
const JUNK_TRANSCRIPTIONS: &[&str] = &["you", "thank you.", "thanks for watching."];

/// Transcription capability
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe audio bytes to text.
    ///
    /// `file_name` is a container hint (e.g. `answer.webm`) for backends
    /// that sniff the format from the upload name.
    ///
    /// # Errors
    ///
    /// Returns an error if transcription fails.
    async fn transcribe(&self, audio: Vec<u8>, file_name: &str) -> Result<String>;
}

/// Response from the transcriptions endpoint
#[derive(serde::Deserialize)]
struct TranscriptionResponse {
    text: String,
}

/// Transcription over an OpenAI-compatible Whisper HTTP API
pub struct WhisperApi {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
}

impl WhisperApi {
    /// Create a client from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if no API key is configured or the HTTP client
    /// cannot be built.
    pub fn new(config: &SttConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| Error::Config("OPENAI_API_KEY is required for transcription".to_string()))?;

        let client = reqwest::Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            api_key,
            model: config.model.clone(),
        })
    }
}

/// Content type for an upload, from its file extension
fn mime_for(file_name: &str) -> &'static str {
    match Path::new(file_name).extension().and_then(|ext| ext.to_str()) {
        Some("wav") => "audio/wav",
        Some("webm") => "audio/webm",
        Some("ogg") => "audio/ogg",
        Some("mp3") => "audio/mpeg",
        _ => "application/octet-stream",
    }
}

#[async_trait]
impl Transcriber for WhisperApi {
    async fn transcribe(&self, audio: Vec<u8>, file_name: &str) -> Result<String> {
        tracing::debug!(audio_bytes = audio.len(), file_name, "starting transcription");

        let part = reqwest::multipart::Part::bytes(audio)
            .file_name(file_name.to_string())
            .mime_str(mime_for(file_name))
            .map_err(|e| Error::Transcription(format!("invalid upload part: {e}")))?;

        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("model", self.model.clone());

        let response = self
            .client
            .post(format!("{}/audio/transcriptions", self.api_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .multipart(form)
            .send()
            .await
            .map_err(|e| Error::Transcription(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Transcription(format!("transcription API error {status}: {body}")));
        }

        let parsed: TranscriptionResponse = response
            .json()
            .await
            .map_err(|e| Error::Transcription(format!("malformed transcription response: {e}")))?;

        tracing::debug!(transcript = %parsed.text, "transcription complete");
        Ok(parsed.text)
    }
}

/// Builds the transcription engine on first use
type EngineLoader = Box<dyn Fn() -> Result<Arc<dyn Transcriber>> + Send + Sync>;

/// Transcribes candidate answers, recovering every failure into an empty
/// transcript
///
/// An empty transcript reads as "no usable speech" downstream, which the
/// engine answers with a clarification request instead of an error page.
pub struct SpeechToText {
    loader: EngineLoader,
    engine: OnceCell<Arc<dyn Transcriber>>,
}

impl SpeechToText {
    /// Adapter that lazily builds a [`WhisperApi`] engine on first use
    #[must_use]
    pub fn new(config: SttConfig) -> Self {
        Self::with_loader(move || {
            let engine = WhisperApi::new(&config)?;
            Ok(Arc::new(engine) as Arc<dyn Transcriber>)
        })
    }

    /// Adapter over an already-built engine
    pub fn from_engine(engine: Arc<dyn Transcriber>) -> Self {
        Self::with_loader(move || Ok(engine.clone()))
    }

    /// Adapter with a custom engine loader
    pub fn with_loader(loader: impl Fn() -> Result<Arc<dyn Transcriber>> + Send + Sync + 'static) -> Self {
        Self { loader: Box::new(loader), engine: OnceCell::new() }
    }

    async fn engine(&self) -> Result<&Arc<dyn Transcriber>> {
        self.engine.get_or_try_init(|| async { (self.loader)() }).await
    }

    /// Transcribe one answer, filtering junk and recovering failures.
    ///
    /// Never fails: an unavailable engine or a failed transcription becomes
    /// an empty transcript, logged at warn level.
    pub async fn transcribe(&self, audio: Vec<u8>, file_name: &str) -> String {
        let engine = match self.engine().await {
            Ok(engine) => engine,
            Err(e) => {
                tracing::warn!(error = %e, "transcription engine unavailable");
                return String::new();
            }
        };

        match engine.transcribe(audio, file_name).await {
            Ok(text) => filter_junk(&text),
            Err(e) => {
                tracing::warn!(error = %e, "transcription failed, treating as silence");
                String::new()
            }
        }
    }
}

/// Map known junk transcriptions to silence and trim the rest
fn filter_junk(text: &str) -> String {
    let trimmed = text.trim();
    if JUNK_TRANSCRIPTIONS.contains(&trimmed.to_lowercase().as_str()) {
        String::new()
    } else {
        trimmed.to_string()
    }
}
