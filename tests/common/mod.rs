//! Shared test fixtures
//!
//! Fake upstream capabilities and a router builder wired entirely from
//! in-memory stages, so endpoint tests run without network access, piper,
//! or ffmpeg.

use std::io::Cursor;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncReadExt;
use viva_gateway::api::ApiState;
use viva_gateway::config::{Config, LlmConfig, ServerConfig, SttConfig, SynthConfig};
use viva_gateway::interview::{InterviewEngine, Role, Turn};
use viva_gateway::voice::{
    AudioEncoder, PcmStream, SpeechEngine, SpeechToText, StageGuard, Synthesizer, Transcriber,
};
use viva_gateway::{ChatCompletion, Error, Result, SpoolDir};

/// Multipart boundary used by the request builders below
pub const BOUNDARY: &str = "viva-test-boundary";

/// Chat completion that records every prompt and plays back a scripted reply
pub struct ScriptedChat {
    reply: String,
    pub calls: Mutex<Vec<(Vec<Turn>, f32)>>,
}

impl ScriptedChat {
    pub fn new(reply: &str) -> Arc<Self> {
        Arc::new(Self { reply: reply.to_string(), calls: Mutex::new(Vec::new()) })
    }

    pub fn prompts(&self) -> Vec<Vec<Turn>> {
        self.calls.lock().unwrap().iter().map(|(messages, _)| messages.clone()).collect()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl ChatCompletion for ScriptedChat {
    async fn complete(&self, messages: &[Turn], temperature: f32) -> Result<String> {
        self.calls.lock().unwrap().push((messages.to_vec(), temperature));
        Ok(self.reply.clone())
    }
}

/// Chat completion that always fails
pub struct FailingChat;

#[async_trait]
impl ChatCompletion for FailingChat {
    async fn complete(&self, _messages: &[Turn], _temperature: f32) -> Result<String> {
        Err(Error::Completion("model offline".to_string()))
    }
}

/// Chat completion that answers with the last user turn's content
pub struct EchoChat;

#[async_trait]
impl ChatCompletion for EchoChat {
    async fn complete(&self, messages: &[Turn], _temperature: f32) -> Result<String> {
        let last_user = messages
            .iter()
            .rev()
            .find(|t| t.role == Role::User)
            .map(|t| t.content.clone())
            .unwrap_or_default();
        Ok(format!("Reply to: {last_user}"))
    }
}

/// Transcriber returning a fixed transcript, counting calls
pub struct CannedTranscriber {
    transcript: String,
    pub calls: AtomicUsize,
}

impl CannedTranscriber {
    pub fn new(transcript: &str) -> Arc<Self> {
        Arc::new(Self { transcript: transcript.to_string(), calls: AtomicUsize::new(0) })
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transcriber for CannedTranscriber {
    async fn transcribe(&self, _audio: Vec<u8>, _file_name: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.transcript.clone())
    }
}

/// Speech engine producing a short fixed PCM buffer
pub struct TestPcmEngine;

#[async_trait]
impl SpeechEngine for TestPcmEngine {
    async fn raw_synth(&self, _text: &str) -> Result<PcmStream> {
        Ok(PcmStream {
            reader: Box::new(Cursor::new(vec![0u8; 64])),
            guard: StageGuard::completed("test pcm"),
        })
    }
}

/// Encoder that drains the stream and emits an MP3-framed payload
pub struct TestMp3Encoder;

#[async_trait]
impl AudioEncoder for TestMp3Encoder {
    async fn encode(&self, pcm: PcmStream) -> Result<Vec<u8>> {
        let PcmStream { mut reader, guard } = pcm;
        let mut pcm_bytes = Vec::new();
        reader
            .read_to_end(&mut pcm_bytes)
            .await
            .map_err(|e| Error::Synthesis { stage: "test encoder", detail: e.to_string() })?;
        guard.finish().await?;

        let mut out = vec![0xFF, 0xFB, 0x90, 0x00];
        out.extend_from_slice(&pcm_bytes);
        Ok(out)
    }
}

/// Encoder that always fails
pub struct BrokenEncoder;

#[async_trait]
impl AudioEncoder for BrokenEncoder {
    async fn encode(&self, _pcm: PcmStream) -> Result<Vec<u8>> {
        Err(Error::Synthesis { stage: "test encoder", detail: "codec exploded".to_string() })
    }
}

/// Configuration for states built entirely from fakes
pub fn test_config(spool_dir: &Path) -> Config {
    Config {
        server: ServerConfig { port: 0, spool_dir: spool_dir.to_path_buf() },
        stt: SttConfig {
            api_url: "http://127.0.0.1:9".to_string(),
            api_key: None,
            model: "whisper-1".to_string(),
            timeout: Duration::from_secs(5),
        },
        llm: LlmConfig {
            api_url: "http://127.0.0.1:9".to_string(),
            api_key: None,
            model: "gpt-3.5-turbo".to_string(),
            turn_temperature: 0.7,
            summary_temperature: 0.5,
            timeout: Duration::from_secs(5),
        },
        synth: SynthConfig {
            piper_bin: "piper".to_string(),
            voice_model: "voice.onnx".into(),
            ffmpeg_bin: "ffmpeg".to_string(),
            sample_rate: 22050,
            timeout: Duration::from_secs(5),
        },
    }
}

/// Build a router over fake upstream capabilities
pub fn test_router(
    spool_dir: &Path,
    chat: Arc<dyn ChatCompletion>,
    transcriber: Arc<dyn Transcriber>,
) -> axum::Router {
    test_router_with_encoder(spool_dir, chat, transcriber, Arc::new(TestMp3Encoder))
}

/// Build a router with a custom encoder stage
pub fn test_router_with_encoder(
    spool_dir: &Path,
    chat: Arc<dyn ChatCompletion>,
    transcriber: Arc<dyn Transcriber>,
    encoder: Arc<dyn AudioEncoder>,
) -> axum::Router {
    let config = test_config(spool_dir);
    let engine =
        InterviewEngine::new(chat, config.llm.turn_temperature, config.llm.summary_temperature);

    let state = Arc::new(ApiState {
        engine,
        stt: SpeechToText::from_engine(transcriber),
        synthesizer: Synthesizer::new(Arc::new(TestPcmEngine), encoder, Duration::from_secs(5)),
        spool: SpoolDir::new(spool_dir).expect("failed to create test spool"),
        config,
    });

    viva_gateway::api::router(state)
}

/// 0.2 second 440 Hz mono WAV, the shape a browser recorder would upload
#[allow(clippy::cast_possible_truncation)]
pub fn wav_fixture() -> Vec<u8> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 16_000,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    let mut writer = hound::WavWriter::new(&mut cursor, spec).expect("failed to create wav writer");
    for i in 0..3200_u32 {
        #[allow(clippy::cast_precision_loss)]
        let t = i as f32 / 16_000.0;
        let sample = (2.0 * std::f32::consts::PI * 440.0 * t).sin() * 0.4;
        writer
            .write_sample((sample * f32::from(i16::MAX)) as i16)
            .expect("failed to write sample");
    }
    writer.finalize().expect("failed to finalize wav");

    cursor.into_inner()
}

/// Multipart body carrying an `audio` file and a `history_json` field
pub fn multipart_turn_body(audio: &[u8], history_json: &str) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        b"Content-Disposition: form-data; name=\"audio\"; filename=\"user_answer.wav\"\r\n",
    );
    body.extend_from_slice(b"Content-Type: audio/wav\r\n\r\n");
    body.extend_from_slice(audio);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(b"Content-Disposition: form-data; name=\"history_json\"\r\n\r\n");
    body.extend_from_slice(history_json.as_bytes());
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

/// Multipart body with only the `history_json` field
pub fn multipart_history_only(history_json: &str) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(b"Content-Disposition: form-data; name=\"history_json\"\r\n\r\n");
    body.extend_from_slice(history_json.as_bytes());
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

/// Number of files currently in the spool directory
pub fn spool_entries(spool_dir: &Path) -> usize {
    std::fs::read_dir(spool_dir).map(|entries| entries.count()).unwrap_or(0)
}
