//! Health check endpoints

use std::sync::Arc;

use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use serde::Serialize;

use super::ApiState;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// Detailed readiness response
#[derive(Serialize)]
pub struct ReadinessResponse {
    pub status: &'static str,
    pub checks: ReadinessChecks,
}

/// Individual readiness checks
#[derive(Serialize)]
pub struct ReadinessChecks {
    pub spool: CheckResult,
    pub transcription: CheckResult,
    pub completion: CheckResult,
    pub synthesis: CheckResult,
}

/// Result of a single health check
#[derive(Serialize)]
pub struct CheckResult {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl CheckResult {
    const fn ok() -> Self {
        Self {
            status: "ok",
            message: None,
        }
    }

    fn fail(message: impl Into<String>) -> Self {
        Self {
            status: "fail",
            message: Some(message.into()),
        }
    }
}

/// Liveness probe - is the service running?
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Readiness probe - can the service serve a full interview?
async fn ready(State(state): State<Arc<ApiState>>) -> (StatusCode, Json<ReadinessResponse>) {
    let checks = ReadinessChecks {
        spool: check_spool(&state),
        transcription: check_transcription(&state),
        completion: check_completion(&state),
        synthesis: check_synthesis(&state),
    };

    let all_ok = [&checks.spool, &checks.transcription, &checks.completion, &checks.synthesis]
        .iter()
        .all(|check| check.status == "ok");

    let status = if all_ok { "ok" } else { "degraded" };
    let http_status = if all_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (http_status, Json(ReadinessResponse { status, checks }))
}

/// Check that the spool directory accepts writes
fn check_spool(state: &ApiState) -> CheckResult {
    let probe = state.spool.path().join(".readyz");
    match std::fs::write(&probe, b"ok") {
        Ok(()) => {
            let _ = std::fs::remove_file(&probe);
            CheckResult::ok()
        }
        Err(e) => CheckResult::fail(format!("spool not writable: {e}")),
    }
}

/// Check that a transcription credential is configured
fn check_transcription(state: &ApiState) -> CheckResult {
    if state.config.stt.api_key.is_some() {
        CheckResult::ok()
    } else {
        CheckResult::fail("no API credential configured")
    }
}

/// Check that a completion credential is configured
fn check_completion(state: &ApiState) -> CheckResult {
    if state.config.llm.api_key.is_some() {
        CheckResult::ok()
    } else {
        CheckResult::fail("no API credential configured")
    }
}

/// Check that the synthesis binaries are on PATH
fn check_synthesis(state: &ApiState) -> CheckResult {
    let synth = &state.config.synth;
    match (which::which(&synth.piper_bin), which::which(&synth.ffmpeg_bin)) {
        (Ok(_), Ok(_)) => CheckResult::ok(),
        (Err(e), _) => CheckResult::fail(format!("{} not found: {e}", synth.piper_bin)),
        (_, Err(e)) => CheckResult::fail(format!("{} not found: {e}", synth.ffmpeg_bin)),
    }
}

/// Build health router (liveness only, no state needed)
pub fn router() -> Router {
    Router::new().route("/health", get(health))
}

/// Build readiness router (needs state for checks)
pub fn ready_router(state: Arc<ApiState>) -> Router {
    Router::new().route("/ready", get(ready)).with_state(state)
}
