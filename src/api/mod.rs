//! HTTP API server for the viva gateway

pub mod health;
pub mod interview;

use std::sync::Arc;

use axum::{Router, extract::DefaultBodyLimit};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::Result;
use crate::config::Config;
use crate::interview::InterviewEngine;
use crate::llm::OpenAiChat;
use crate::spool::SpoolDir;
use crate::voice::{SpeechToText, Synthesizer};

/// Largest accepted request body; matches the transcription API's own
/// upload limit
const MAX_BODY_BYTES: usize = 25 * 1024 * 1024;

/// Shared state for API handlers
pub struct ApiState {
    pub config: Config,
    pub engine: InterviewEngine,
    pub stt: SpeechToText,
    pub synthesizer: Synthesizer,
    pub spool: SpoolDir,
}

impl ApiState {
    /// Build runtime state from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the completion client cannot be built or the
    /// spool directory cannot be created.
    pub fn from_config(config: Config) -> Result<Self> {
        let chat = Arc::new(OpenAiChat::new(&config.llm)?);
        let engine =
            InterviewEngine::new(chat, config.llm.turn_temperature, config.llm.summary_temperature);
        let stt = SpeechToText::new(config.stt.clone());
        let synthesizer = Synthesizer::from_config(&config.synth);
        let spool = SpoolDir::new(config.server.spool_dir.clone())?;

        Ok(Self { config, engine, stt, synthesizer, spool })
    }
}

/// Build the router with all routes and middleware
#[must_use]
pub fn router(state: Arc<ApiState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .expose_headers([interview::CONVERSATION_DATA, interview::FEEDBACK_TEXT]);

    Router::new()
        .merge(interview::router(state.clone()))
        .merge(health::ready_router(state))
        .merge(health::router())
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// API server
pub struct ApiServer {
    state: Arc<ApiState>,
    port: u16,
}

impl ApiServer {
    #[must_use]
    pub fn new(state: Arc<ApiState>, port: u16) -> Self {
        Self { state, port }
    }

    /// Run the API server
    ///
    /// # Errors
    ///
    /// Returns error if server fails to bind or run
    pub async fn run(self) -> Result<()> {
        let addr = format!("0.0.0.0:{}", self.port);
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| crate::Error::Config(format!("failed to bind API server: {e}")))?;

        tracing::info!(port = self.port, "API server listening");

        axum::serve(listener, router(self.state))
            .await
            .map_err(|e| crate::Error::Config(format!("API server error: {e}")))?;

        Ok(())
    }

    /// Run the API server in a background task
    #[must_use]
    pub fn spawn(self) -> tokio::task::JoinHandle<Result<()>> {
        tokio::spawn(async move { self.run().await })
    }
}
