//! Speech synthesis pipeline
//!
//! Two staged capabilities produce each spoken reply: a speech engine
//! renders text to raw PCM (s16le, mono) and an encoder turns the PCM
//! stream into a finished MP3. The default stages spawn `piper` and
//! `ffmpeg` connected by a pipe, one isolated pair per call, so a failure
//! in either stage surfaces with that stage's own diagnostics and no
//! partial audio ever leaves the pipeline.

use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::{Child, Command};

use crate::config::SynthConfig;
use crate::{Error, Result};

/// Raw PCM from a speech engine, plus the handle that settles the
/// producing stage once the stream is drained
pub struct PcmStream {
    pub reader: Box<dyn AsyncRead + Send + Unpin>,
    pub guard: StageGuard,
}

/// Tracks one pipeline stage until its exit status is known
pub struct StageGuard {
    stage: &'static str,
    child: Option<Child>,
    stderr: Option<tokio::task::JoinHandle<String>>,
}

impl StageGuard {
    /// Guard for an in-process stage that cannot fail after producing
    /// its output
    #[must_use]
    pub fn completed(stage: &'static str) -> Self {
        Self { stage, child: None, stderr: None }
    }

    /// Guard for a subprocess stage; starts draining its stderr so the
    /// process never stalls on a full pipe
    fn for_child(stage: &'static str, mut child: Child) -> Self {
        let stderr = child.stderr.take().map(|mut pipe| {
            tokio::spawn(async move {
                let mut buf = Vec::new();
                let _ = pipe.read_to_end(&mut buf).await;
                String::from_utf8_lossy(&buf).into_owned()
            })
        });
        Self { stage, child: Some(child), stderr }
    }

    /// Wait for the stage to exit, failing with its diagnostics on a
    /// non-zero status.
    ///
    /// # Errors
    ///
    /// Returns an error if the stage exited abnormally.
    pub async fn finish(mut self) -> Result<()> {
        let Some(mut child) = self.child.take() else {
            return Ok(());
        };

        let status = child
            .wait()
            .await
            .map_err(|e| Error::Synthesis { stage: self.stage, detail: format!("wait failed: {e}") })?;

        let stderr = match self.stderr.take() {
            Some(handle) => handle.await.unwrap_or_default(),
            None => String::new(),
        };

        if status.success() {
            if !stderr.is_empty() {
                tracing::trace!(stage = self.stage, stderr = %stderr.trim_end(), "stage diagnostics");
            }
            Ok(())
        } else {
            Err(Error::Synthesis {
                stage: self.stage,
                detail: format!("exited with {status}: {}", stderr.trim_end()),
            })
        }
    }
}

/// Stage one: render text to raw PCM
#[async_trait]
pub trait SpeechEngine: Send + Sync {
    /// Start rendering `text`, returning the PCM stream as it is produced.
    ///
    /// # Errors
    ///
    /// Returns an error if the stage cannot start.
    async fn raw_synth(&self, text: &str) -> Result<PcmStream>;
}

/// Stage two: encode a PCM stream into a finished MP3
#[async_trait]
pub trait AudioEncoder: Send + Sync {
    /// Consume `pcm` to completion and return the encoded bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails or the producing stage failed.
    async fn encode(&self, pcm: PcmStream) -> Result<Vec<u8>>;
}

/// Piper subprocess speech engine
pub struct PiperEngine {
    piper_bin: String,
    voice_model: PathBuf,
}

impl PiperEngine {
    #[must_use]
    pub fn new(config: &SynthConfig) -> Self {
        Self { piper_bin: config.piper_bin.clone(), voice_model: config.voice_model.clone() }
    }
}

#[async_trait]
impl SpeechEngine for PiperEngine {
    async fn raw_synth(&self, text: &str) -> Result<PcmStream> {
        tracing::debug!(chars = text.len(), voice = %self.voice_model.display(), "starting piper");

        let mut child = Command::new(&self.piper_bin)
            .arg("--model")
            .arg(&self.voice_model)
            .arg("--output-raw")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| Error::Synthesis {
                stage: "piper",
                detail: format!("failed to spawn {}: {e}", self.piper_bin),
            })?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| Error::Synthesis { stage: "piper", detail: "stdin unavailable".to_string() })?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| Error::Synthesis { stage: "piper", detail: "stdout unavailable".to_string() })?;

        // Write the text from a task so the caller can start draining
        // stdout; writing inline could deadlock on a full pipe.
        let text = text.to_string();
        tokio::spawn(async move {
            if let Err(e) = stdin.write_all(text.as_bytes()).await {
                tracing::warn!(error = %e, "failed to write text to piper");
            }
        });

        Ok(PcmStream { reader: Box::new(stdout), guard: StageGuard::for_child("piper", child) })
    }
}

/// ffmpeg subprocess MP3 encoder
pub struct FfmpegEncoder {
    ffmpeg_bin: String,
    sample_rate: u32,
}

impl FfmpegEncoder {
    #[must_use]
    pub fn new(config: &SynthConfig) -> Self {
        Self { ffmpeg_bin: config.ffmpeg_bin.clone(), sample_rate: config.sample_rate }
    }
}

#[async_trait]
impl AudioEncoder for FfmpegEncoder {
    async fn encode(&self, pcm: PcmStream) -> Result<Vec<u8>> {
        let PcmStream { mut reader, guard: engine_guard } = pcm;

        let mut child = Command::new(&self.ffmpeg_bin)
            .args(["-f", "s16le", "-ar"])
            .arg(self.sample_rate.to_string())
            .args(["-ac", "1", "-i", "pipe:0", "-f", "mp3", "-q:a", "0", "pipe:1"])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| Error::Synthesis {
                stage: "ffmpeg",
                detail: format!("failed to spawn {}: {e}", self.ffmpeg_bin),
            })?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| Error::Synthesis { stage: "ffmpeg", detail: "stdin unavailable".to_string() })?;
        let mut stdout = child
            .stdout
            .take()
            .ok_or_else(|| Error::Synthesis { stage: "ffmpeg", detail: "stdout unavailable".to_string() })?;

        let ffmpeg_guard = StageGuard::for_child("ffmpeg", child);

        // Feed PCM in while draining MP3 out; either side stalling would
        // otherwise deadlock the pipe pair.
        let feeder = tokio::spawn(async move {
            let copied = tokio::io::copy(&mut reader, &mut stdin).await;
            drop(stdin);
            copied
        });

        let mut mp3 = Vec::new();
        stdout.read_to_end(&mut mp3).await.map_err(|e| Error::Synthesis {
            stage: "ffmpeg",
            detail: format!("failed to read encoded output: {e}"),
        })?;

        match feeder.await {
            Ok(Ok(bytes)) => tracing::trace!(bytes, "pcm transfer complete"),
            Ok(Err(e)) => tracing::debug!(error = %e, "pcm transfer interrupted"),
            Err(e) => tracing::debug!(error = %e, "pcm feeder task failed"),
        }

        engine_guard.finish().await?;
        ffmpeg_guard.finish().await?;

        Ok(mp3)
    }
}

/// Composes the two synthesis stages under one deadline
pub struct Synthesizer {
    engine: Arc<dyn SpeechEngine>,
    encoder: Arc<dyn AudioEncoder>,
    timeout: Duration,
}

impl Synthesizer {
    #[must_use]
    pub fn new(engine: Arc<dyn SpeechEngine>, encoder: Arc<dyn AudioEncoder>, timeout: Duration) -> Self {
        Self { engine, encoder, timeout }
    }

    /// Default piper + ffmpeg pipeline from configuration
    #[must_use]
    pub fn from_config(config: &SynthConfig) -> Self {
        Self::new(
            Arc::new(PiperEngine::new(config)),
            Arc::new(FfmpegEncoder::new(config)),
            config.timeout,
        )
    }

    /// Render `text` to a finished MP3.
    ///
    /// Produces all of the audio or none of it: a failing stage, a timeout,
    /// or output that is not MP3 yields an error, never partial bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if a stage fails, the deadline passes, or the
    /// encoder output is not MP3.
    pub async fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
        if text.trim().is_empty() {
            return Err(Error::Synthesis {
                stage: "speech engine",
                detail: "refusing to synthesize empty text".to_string(),
            });
        }

        tracing::debug!(chars = text.len(), "synthesizing speech");

        let run = async {
            let pcm = self.engine.raw_synth(text).await?;
            self.encoder.encode(pcm).await
        };

        let mp3 = tokio::time::timeout(self.timeout, run)
            .await
            .map_err(|_| Error::UpstreamTimeout { stage: "speech synthesis" })??;

        if !is_mp3(&mp3) {
            return Err(Error::Synthesis {
                stage: "encoder",
                detail: format!("output is not MP3 ({} bytes)", mp3.len()),
            });
        }

        tracing::debug!(bytes = mp3.len(), "synthesis complete");
        Ok(mp3)
    }
}

/// True when `bytes` begin with an MP3 frame sync or an ID3v2 tag
#[must_use]
pub fn is_mp3(bytes: &[u8]) -> bool {
    if bytes.starts_with(b"ID3") {
        return true;
    }
    match bytes {
        [0xFF, second, ..] => *second & 0xE0 == 0xE0,
        _ => false,
    }
}
