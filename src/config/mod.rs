//! Configuration management for the viva gateway

pub mod file;

use std::path::PathBuf;
use std::time::Duration;

/// Default OpenAI-compatible API base URL, used for both transcription and
/// chat completion unless overridden per section
pub const DEFAULT_API_URL: &str = "https://api.openai.com/v1";

/// Gateway configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server configuration
    pub server: ServerConfig,

    /// Speech-to-text configuration
    pub stt: SttConfig,

    /// Chat completion configuration
    pub llm: LlmConfig,

    /// Speech synthesis configuration
    pub synth: SynthConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to listen on
    pub port: u16,

    /// Directory for ephemeral audio spool files
    pub spool_dir: PathBuf,
}

/// Speech-to-text configuration
#[derive(Debug, Clone)]
pub struct SttConfig {
    /// OpenAI-compatible API base URL
    pub api_url: String,

    /// API credential (from `OPENAI_API_KEY`)
    pub api_key: Option<String>,

    /// Transcription model identifier
    pub model: String,

    /// Request deadline
    pub timeout: Duration,
}

/// Chat completion configuration
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// OpenAI-compatible API base URL
    pub api_url: String,

    /// API credential (from `OPENAI_API_KEY`)
    pub api_key: Option<String>,

    /// Completion model identifier
    pub model: String,

    /// Sampling temperature for interview turns
    pub turn_temperature: f32,

    /// Sampling temperature for the final evaluation
    pub summary_temperature: f32,

    /// Request deadline
    pub timeout: Duration,
}

/// Speech synthesis configuration
#[derive(Debug, Clone)]
pub struct SynthConfig {
    /// Piper binary name or path
    pub piper_bin: String,

    /// Piper voice model path (.onnx)
    pub voice_model: PathBuf,

    /// ffmpeg binary name or path
    pub ffmpeg_bin: String,

    /// PCM sample rate produced by the voice model
    pub sample_rate: u32,

    /// Whole-pipeline deadline
    pub timeout: Duration,
}

/// Default spool directory: `$TMPDIR/viva-spool`
fn default_spool_dir() -> PathBuf {
    std::env::temp_dir().join("viva-spool")
}

impl Config {
    /// Load configuration with precedence: env var > config file > default
    #[must_use]
    pub fn load() -> Self {
        let fc = file::load_config_file();

        let server = ServerConfig {
            port: std::env::var("VIVA_PORT")
                .or_else(|_| std::env::var("PORT"))
                .ok()
                .and_then(|s| s.parse().ok())
                .or(fc.server.port)
                .unwrap_or(8000),
            spool_dir: std::env::var("VIVA_SPOOL_DIR")
                .ok()
                .map(PathBuf::from)
                .or_else(|| fc.server.spool_dir.map(PathBuf::from))
                .unwrap_or_else(default_spool_dir),
        };

        // One credential and base URL serve both OpenAI-compatible endpoints
        let api_key = std::env::var("OPENAI_API_KEY").ok();
        let api_url = std::env::var("VIVA_API_URL").ok();

        let stt = SttConfig {
            api_url: api_url
                .clone()
                .or(fc.stt.api_url)
                .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            api_key: api_key.clone(),
            model: std::env::var("VIVA_STT_MODEL")
                .ok()
                .or(fc.stt.model)
                .unwrap_or_else(|| "whisper-1".to_string()),
            timeout: Duration::from_secs(fc.stt.timeout_secs.unwrap_or(60)),
        };

        let llm = LlmConfig {
            api_url: api_url
                .or(fc.llm.api_url)
                .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            api_key,
            model: std::env::var("VIVA_LLM_MODEL")
                .ok()
                .or(fc.llm.model)
                .unwrap_or_else(|| "gpt-3.5-turbo".to_string()),
            turn_temperature: fc.llm.turn_temperature.unwrap_or(0.7),
            summary_temperature: fc.llm.summary_temperature.unwrap_or(0.5),
            timeout: Duration::from_secs(fc.llm.timeout_secs.unwrap_or(60)),
        };

        let synth = SynthConfig {
            piper_bin: std::env::var("VIVA_PIPER_BIN")
                .ok()
                .or(fc.synth.piper_bin)
                .unwrap_or_else(|| "piper".to_string()),
            voice_model: std::env::var("VIVA_VOICE_MODEL")
                .ok()
                .map(PathBuf::from)
                .or_else(|| fc.synth.voice_model.map(PathBuf::from))
                .unwrap_or_else(|| PathBuf::from("en_US-hfc_female-medium.onnx")),
            ffmpeg_bin: std::env::var("VIVA_FFMPEG_BIN")
                .ok()
                .or(fc.synth.ffmpeg_bin)
                .unwrap_or_else(|| "ffmpeg".to_string()),
            sample_rate: fc.synth.sample_rate.unwrap_or(22050),
            timeout: Duration::from_secs(fc.synth.timeout_secs.unwrap_or(120)),
        };

        Self {
            server,
            stt,
            llm,
            synth,
        }
    }
}
