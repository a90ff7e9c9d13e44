//! TOML configuration file loading
//!
//! Supports `~/.config/viva/config.toml` as a persistent config source.
//! All fields are optional — the file is a partial overlay on top of defaults.

use std::path::PathBuf;

use serde::Deserialize;

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize)]
pub struct VivaConfigFile {
    /// Server/runtime configuration
    #[serde(default)]
    pub server: ServerFileConfig,

    /// Speech-to-text configuration
    #[serde(default)]
    pub stt: SttFileConfig,

    /// Chat completion configuration
    #[serde(default)]
    pub llm: LlmFileConfig,

    /// Speech synthesis configuration
    #[serde(default)]
    pub synth: SynthFileConfig,
}

/// Server/runtime configuration
#[derive(Debug, Default, Deserialize)]
pub struct ServerFileConfig {
    /// HTTP listen port
    pub port: Option<u16>,

    /// Directory for ephemeral audio spool files
    pub spool_dir: Option<String>,
}

/// Speech-to-text configuration
#[derive(Debug, Default, Deserialize)]
pub struct SttFileConfig {
    /// OpenAI-compatible API base URL
    pub api_url: Option<String>,

    /// Transcription model (e.g. "whisper-1")
    pub model: Option<String>,

    /// Request deadline in seconds
    pub timeout_secs: Option<u64>,
}

/// Chat completion configuration
#[derive(Debug, Default, Deserialize)]
pub struct LlmFileConfig {
    /// OpenAI-compatible API base URL
    pub api_url: Option<String>,

    /// Completion model (e.g. "gpt-3.5-turbo")
    pub model: Option<String>,

    /// Sampling temperature for interview turns
    pub turn_temperature: Option<f32>,

    /// Sampling temperature for the final evaluation
    pub summary_temperature: Option<f32>,

    /// Request deadline in seconds
    pub timeout_secs: Option<u64>,
}

/// Speech synthesis configuration
#[derive(Debug, Default, Deserialize)]
pub struct SynthFileConfig {
    /// Piper binary name or path
    pub piper_bin: Option<String>,

    /// Piper voice model path (.onnx)
    pub voice_model: Option<String>,

    /// ffmpeg binary name or path
    pub ffmpeg_bin: Option<String>,

    /// PCM sample rate produced by the voice model
    pub sample_rate: Option<u32>,

    /// Whole-pipeline deadline in seconds
    pub timeout_secs: Option<u64>,
}

/// Load the TOML config file from the standard path
///
/// Returns `VivaConfigFile::default()` if the file doesn't exist or can't be
/// parsed.
pub fn load_config_file() -> VivaConfigFile {
    let Some(path) = config_file_path() else {
        return VivaConfigFile::default();
    };

    if !path.exists() {
        return VivaConfigFile::default();
    }

    match std::fs::read_to_string(&path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "loaded config file");
                config
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to parse config file, using defaults"
                );
                VivaConfigFile::default()
            }
        },
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to read config file"
            );
            VivaConfigFile::default()
        }
    }
}

/// Return the config file path: `~/.config/viva/config.toml`
pub fn config_file_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.config_dir().join("viva").join("config.toml"))
}
