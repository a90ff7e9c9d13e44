//! Interview session endpoints
//!
//! Three stateless operations: greet the candidate, take one spoken answer,
//! and deliver the final debrief. Each streams an MP3 reply; turn and
//! summary responses carry their text metadata in JSON response headers for
//! the browser client.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Multipart, State},
    http::{HeaderName, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;

use super::ApiState;
use crate::Error;
use crate::interview::{Phase, Turn};
use crate::spool::SpoolFile;

/// Header carrying `{user_text, ai_text, history}` after a turn
pub const CONVERSATION_DATA: HeaderName = HeaderName::from_static("x-conversation-data");

/// Header carrying `{text}` with the final feedback
pub const FEEDBACK_TEXT: HeaderName = HeaderName::from_static("x-feedback-text");

/// Build the interview router
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/start_interview", get(start_interview))
        .route("/interview_turn", post(interview_turn))
        .route("/end_interview_summary", post(end_interview_summary))
        .with_state(state)
}

/// Greet the candidate with the fixed opening prompt
async fn start_interview(State(state): State<Arc<ApiState>>) -> Result<Response, InterviewError> {
    tracing::info!(phase = ?Phase::Greeting, "starting interview");

    let greeting = state.engine.opening_prompt();
    let audio = state.synthesizer.synthesize(greeting).await?;
    let spooled = state.spool.write("greeting", "mp3", &audio).await?;

    audio_response(spooled, None).await
}

/// Metadata returned alongside the spoken turn reply
#[derive(Serialize)]
struct ConversationData<'a> {
    user_text: &'a str,
    ai_text: &'a str,
    history: &'a [Turn],
}

/// Take one spoken answer and reply with the interviewer's next prompt
async fn interview_turn(
    State(state): State<Arc<ApiState>>,
    multipart: Multipart,
) -> Result<Response, InterviewError> {
    let upload = read_turn_upload(multipart).await?;
    let history = parse_history(&upload.history_json)?;

    tracing::info!(
        phase = ?Phase::AwaitingAnswer,
        audio_bytes = upload.audio.len(),
        history_turns = history.len(),
        "handling interview turn"
    );

    let user_text = state.stt.transcribe(upload.audio, &upload.file_name).await;
    let reply = state.engine.handle_turn(history, &user_text).await?;

    let audio = state.synthesizer.synthesize(&reply.ai_text).await?;
    let spooled = state.spool.write("turn", "mp3", &audio).await?;

    let metadata = metadata_header(
        CONVERSATION_DATA,
        &ConversationData {
            user_text: &reply.user_text,
            ai_text: &reply.ai_text,
            history: &reply.history,
        },
    )?;

    audio_response(spooled, Some(metadata)).await
}

/// Feedback payload carried in the summary response header
#[derive(Serialize)]
struct FeedbackData<'a> {
    text: &'a str,
}

/// End the interview and deliver the spoken, scored debrief
async fn end_interview_summary(
    State(state): State<Arc<ApiState>>,
    Json(raw): Json<serde_json::Value>,
) -> Result<Response, InterviewError> {
    let history: Vec<Turn> = serde_json::from_value(raw)
        .map_err(|e| InterviewError::MalformedHistory(format!("body is not a turn array: {e}")))?;

    tracing::info!(phase = ?Phase::Summary, history_turns = history.len(), "generating final feedback");

    let feedback = state.engine.summarize(&history).await?;
    let audio = state.synthesizer.synthesize(&feedback).await?;
    let spooled = state.spool.write("summary", "mp3", &audio).await?;

    let metadata = metadata_header(FEEDBACK_TEXT, &FeedbackData { text: &feedback })?;
    audio_response(spooled, Some(metadata)).await
}

/// Decoded multipart form for one turn
struct TurnUpload {
    audio: Vec<u8>,
    file_name: String,
    history_json: String,
}

/// Read the `audio` and `history_json` multipart fields
async fn read_turn_upload(mut multipart: Multipart) -> Result<TurnUpload, InterviewError> {
    let mut audio: Option<(Vec<u8>, String)> = None;
    let mut history_json: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| InterviewError::BadRequest(format!("invalid multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "audio" => {
                let file_name = field.file_name().unwrap_or("answer.wav").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| InterviewError::BadRequest(format!("failed to read audio field: {e}")))?;
                audio = Some((bytes.to_vec(), file_name));
            }
            "history_json" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| InterviewError::BadRequest(format!("failed to read history field: {e}")))?;
                history_json = Some(text);
            }
            _ => {}
        }
    }

    let (audio, file_name) = audio.ok_or(InterviewError::MissingField("audio"))?;
    let history_json = history_json.ok_or(InterviewError::MissingField("history_json"))?;

    Ok(TurnUpload { audio, file_name, history_json })
}

/// Parse the caller-held history, failing fast before any upstream call
fn parse_history(raw: &str) -> Result<Vec<Turn>, InterviewError> {
    serde_json::from_str(raw)
        .map_err(|e| InterviewError::MalformedHistory(format!("history_json is not a turn array: {e}")))
}

/// Serialize a metadata payload into a response header
fn metadata_header<T: Serialize>(
    name: HeaderName,
    payload: &T,
) -> Result<(HeaderName, HeaderValue), InterviewError> {
    let json = serde_json::to_string(payload)
        .map_err(|e| InterviewError::Internal(format!("failed to serialize metadata: {e}")))?;
    let value = HeaderValue::from_str(&json)
        .map_err(|e| InterviewError::Internal(format!("metadata is not header-safe: {e}")))?;
    Ok((name, value))
}

/// Stream a spooled MP3, optionally with a metadata header
async fn audio_response(
    spooled: SpoolFile,
    metadata: Option<(HeaderName, HeaderValue)>,
) -> Result<Response, InterviewError> {
    let body = spooled.into_body().await?;

    let mut response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "audio/mpeg");
    if let Some((name, value)) = metadata {
        response = response.header(name, value);
    }
    response
        .body(body)
        .map_err(|e| InterviewError::Internal(format!("failed to build response: {e}")))
}

/// Interview endpoint errors
#[derive(Debug)]
enum InterviewError {
    BadRequest(String),
    MissingField(&'static str),
    MalformedHistory(String),
    SynthesisFailed { stage: &'static str, detail: String },
    CompletionFailed(String),
    UpstreamTimeout(&'static str),
    Internal(String),
}

impl From<Error> for InterviewError {
    fn from(e: Error) -> Self {
        match e {
            Error::MalformedHistory(msg) => Self::MalformedHistory(msg),
            Error::Synthesis { stage, detail } => Self::SynthesisFailed { stage, detail },
            Error::Completion(msg) => Self::CompletionFailed(msg),
            Error::UpstreamTimeout { stage } => Self::UpstreamTimeout(stage),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for InterviewError {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct ErrorResponse {
            error: ErrorBody,
        }

        #[derive(Serialize)]
        struct ErrorBody {
            code: &'static str,
            message: String,
        }

        let (status, code, message) = match self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
            Self::MissingField(name) => {
                (StatusCode::BAD_REQUEST, "missing_field", format!("missing multipart field: {name}"))
            }
            Self::MalformedHistory(msg) => (StatusCode::BAD_REQUEST, "malformed_history", msg),
            Self::SynthesisFailed { stage, detail } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "synthesis_failed", format!("{stage}: {detail}"))
            }
            Self::CompletionFailed(msg) => (StatusCode::BAD_GATEWAY, "completion_failed", msg),
            Self::UpstreamTimeout(stage) => {
                (StatusCode::GATEWAY_TIMEOUT, "upstream_timeout", format!("timed out in {stage}"))
            }
            Self::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg),
        };

        if status.is_server_error() {
            tracing::error!(code, message = %message, "interview request failed");
        } else {
            tracing::debug!(code, message = %message, "rejected interview request");
        }

        (status, Json(ErrorResponse { error: ErrorBody { code, message } })).into_response()
    }
}
