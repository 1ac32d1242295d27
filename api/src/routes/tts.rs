use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::response::IntoResponse;
use axum::{Router, routing::post};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::error::AppError;
use crate::extract::AppJson;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/tts", post(synthesize))
}

#[derive(Deserialize, ToSchema)]
pub struct TtsRequest {
    pub text: String,
    /// Overrides the configured synthesis model
    #[serde(default)]
    pub model: Option<String>,
    /// Overrides the configured voice
    #[serde(default)]
    pub voice: Option<String>,
}

/// Speak a feedback message. Returns MP3 bytes.
#[utoipa::path(
    post,
    path = "/api/tts",
    request_body = TtsRequest,
    responses(
        (status = 200, description = "Synthesized audio", content_type = "audio/mpeg", body = Vec<u8>),
        (status = 400, description = "Empty text", body = focuseye_core::error::ApiError),
        (status = 502, description = "Speech service failed", body = focuseye_core::error::ApiError),
        (status = 429, description = "Rate limited")
    ),
    tag = "speech"
)]
pub async fn synthesize(
    State(state): State<AppState>,
    AppJson(req): AppJson<TtsRequest>,
) -> Result<impl IntoResponse, AppError> {
    let text = req.text.trim();
    if text.is_empty() {
        return Err(AppError::Validation {
            message: "text must not be empty".to_string(),
            field: Some("text".to_string()),
            received: Some(serde_json::Value::String(req.text.clone())),
            docs_hint: Some("Send the judgment message to be spoken.".to_string()),
        });
    }

    let audio = state
        .speech
        .synthesize(text, req.model.as_deref(), req.voice.as_deref())
        .await?;
    Ok(([(CONTENT_TYPE, "audio/mpeg")], audio))
}
