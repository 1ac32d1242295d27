use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Json, Router, routing::post};
use focuseye_core::image::{self, ImageError};
use focuseye_core::scene::DEFAULT_SCENE;
use focuseye_core::{CounterInput, Evaluation, Notification, Status};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::AppError;
use crate::extract::AppJson;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/analyze", post(analyze))
}

#[derive(Deserialize, ToSchema)]
pub struct AnalyzeRequest {
    /// Snapshot as a `data:image/<fmt>;base64,` URI
    pub image: String,
    /// Session counters; `context` is accepted as an alias
    #[serde(default, alias = "context")]
    pub stats: Option<CounterInput>,
    /// Scene id; falls back to `stats.scene`, then `reading`
    #[serde(default)]
    pub scene: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    /// False only when the request itself was unusable
    pub success: bool,
    pub status: Status,
    pub message: String,
    pub confidence: f64,
    pub should_speak: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification: Option<Notification>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<Evaluation> for AnalyzeResponse {
    fn from(evaluation: Evaluation) -> Self {
        let judgment = evaluation.judgment;
        Self {
            success: true,
            status: judgment.status,
            message: judgment.message,
            confidence: judgment.confidence,
            should_speak: judgment.should_speak,
            notification: evaluation.notification,
            error: None,
        }
    }
}

fn image_rejection(err: ImageError) -> Response {
    tracing::warn!(error = %err, "Rejected snapshot");
    let message = match err {
        ImageError::TooLarge { .. } => "图片太大，请压缩后重试",
        _ => "图片格式不正确",
    };
    let body = AnalyzeResponse {
        success: false,
        status: Status::Error,
        message: message.to_string(),
        confidence: 0.0,
        should_speak: false,
        notification: None,
        error: Some(err.to_string()),
    };
    (StatusCode::BAD_REQUEST, Json(body)).into_response()
}

/// Judge one snapshot against a scene and the caller's session counters.
///
/// Classifier failures are reported as `status: "error"` with HTTP 200;
/// only unusable input yields 400.
#[utoipa::path(
    post,
    path = "/api/analyze",
    request_body = AnalyzeRequest,
    responses(
        (status = 200, description = "Snapshot judged", body = AnalyzeResponse),
        (status = 400, description = "Invalid image (AnalyzeResponse with success=false) or invalid counters/body (ApiError)", body = AnalyzeResponse),
        (status = 429, description = "Rate limited")
    ),
    tag = "analysis"
)]
pub async fn analyze(
    State(state): State<AppState>,
    AppJson(req): AppJson<AnalyzeRequest>,
) -> Result<Response, AppError> {
    let image = match image::prepare(&req.image, state.settings.max_image_mb) {
        Ok(image) => image,
        Err(err) => return Ok(image_rejection(err)),
    };

    let mut stats = req.stats;
    let scene = req
        .scene
        .or_else(|| stats.as_mut().and_then(|stats| stats.scene.take()))
        .unwrap_or_else(|| DEFAULT_SCENE.to_string());
    let counters = stats
        .map(|stats| stats.resolve(&state.settings.intervals))
        .transpose()?;

    tracing::debug!(
        scene = %scene,
        image_bytes = image::estimate_size(&image),
        format = image::image_format(&image).unwrap_or("unknown"),
        with_counters = counters.is_some(),
        "Analyzing snapshot"
    );

    let evaluation = state.engine.evaluate(&image, &scene, counters.as_ref()).await;
    Ok(Json(AnalyzeResponse::from(evaluation)).into_response())
}
