use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use focuseye_core::counters::CounterError;
use focuseye_core::error::{ApiError, codes};

use crate::speech::SpeechError;

/// Handler failure, rendered as an [`ApiError`] body.
///
/// Classifier failures never land here; they are part of a normal analyze
/// response.
#[derive(Debug)]
pub enum AppError {
    /// 400
    Validation {
        message: String,
        field: Option<String>,
        received: Option<serde_json::Value>,
        docs_hint: Option<String>,
    },
    /// 502, speech service unreachable or unhappy
    Upstream { message: String },
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let request_id = uuid::Uuid::now_v7().to_string();

        match self {
            AppError::Validation {
                message,
                field,
                received,
                docs_hint,
            } => {
                tracing::debug!(request_id = %request_id, field = ?field, "Rejected request: {}", message);
                let body = ApiError {
                    field,
                    received,
                    docs_hint,
                    ..ApiError::new(codes::VALIDATION_FAILED, message, request_id)
                };
                (StatusCode::BAD_REQUEST, Json(body)).into_response()
            }
            AppError::Upstream { message } => {
                tracing::warn!(request_id = %request_id, "Upstream failure: {}", message);
                let body = ApiError::new(codes::UPSTREAM_FAILED, message, request_id);
                (StatusCode::BAD_GATEWAY, Json(body)).into_response()
            }
        }
    }
}

impl From<CounterError> for AppError {
    fn from(err: CounterError) -> Self {
        AppError::Validation {
            message: err.to_string(),
            field: Some(format!("stats.{}", err.field())),
            received: None,
            docs_hint: Some(
                "Minute counters must be finite and non-negative; intervals must be positive."
                    .to_string(),
            ),
        }
    }
}

impl From<SpeechError> for AppError {
    fn from(err: SpeechError) -> Self {
        AppError::Upstream {
            message: format!("Speech synthesis failed: {err}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counter_errors_point_at_the_stats_field() {
        let err = AppError::from(CounterError::ZeroInterval {
            field: "restReminderInterval",
        });
        match err {
            AppError::Validation { field, .. } => {
                assert_eq!(field.as_deref(), Some("stats.restReminderInterval"))
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn upstream_maps_to_bad_gateway() {
        let response = AppError::Upstream {
            message: "down".into(),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }
}
