use axum::extract::State;
use axum::{Json, Router, routing::get};
use serde::Serialize;
use utoipa::ToSchema;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/health", get(health_check))
}

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub success: bool,
    pub status: String,
    pub message: String,
    pub version: String,
    pub config: PublicConfig,
}

/// Settings a client needs to drive a session. Never includes credentials.
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublicConfig {
    pub model: String,
    /// First 30 characters of the classifier base URL
    pub api_base: String,
    /// Seconds between snapshots
    pub monitor_interval: u64,
    /// Random jitter added to the interval, in seconds
    pub monitor_interval_random: u64,
    /// Minutes of focus per encouragement
    pub encouragement_interval: u32,
    /// Minutes of focus per rest reminder
    pub rest_reminder_interval: u32,
    pub max_image_size_mb: f64,
    pub scenes: Vec<String>,
}

/// Service status and public configuration
#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    ),
    tag = "system"
)]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let settings = &state.settings;
    Json(HealthResponse {
        success: true,
        status: "healthy".to_string(),
        message: "服务运行正常".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        config: PublicConfig {
            model: state.engine.model().to_string(),
            api_base: settings.api_base_display(),
            monitor_interval: settings.monitor.interval_secs,
            monitor_interval_random: settings.monitor.interval_random_secs,
            encouragement_interval: settings.intervals.encouragement_interval,
            rest_reminder_interval: settings.intervals.rest_reminder_interval,
            max_image_size_mb: settings.max_image_mb,
            scenes: state
                .engine
                .catalog()
                .scenes()
                .iter()
                .map(|scene| scene.id.clone())
                .collect(),
        },
    })
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use super::*;
    use crate::routes::test_support::{read_json, test_state};

    #[tokio::test]
    async fn reports_public_config_without_secrets() {
        let app = router().with_state(test_state(Ok("{}")));

        for path in ["/health", "/api/health"] {
            let response = app
                .clone()
                .oneshot(Request::get(path).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);

            let body = read_json(response).await;
            assert_eq!(body["status"], "healthy");
            assert_eq!(body["config"]["model"], "stub-vl");
            assert_eq!(body["config"]["apiBase"], "https://dashscope.aliyuncs.com...");
            assert_eq!(body["config"]["encouragementInterval"], 20);
            assert_eq!(body["config"]["restReminderInterval"], 3);
            assert_eq!(body["config"]["scenes"][0], "reading");
            assert!(!body.to_string().contains("sk-test"));
        }
    }
}
