//! JSON extractor that converts axum rejections to structured `AppError` responses.
//!
//! Use `AppJson<T>` in place of `axum::Json<T>` in handler signatures so a
//! malformed body yields the `ApiError` shape instead of axum's plain-text 422.

use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
};

use crate::error::AppError;

pub struct AppJson<T>(pub T);

impl<S, T> FromRequest<S> for AppJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(AppJson(value)),
            Err(rejection) => Err(map_json_rejection(rejection)),
        }
    }
}

pub fn map_json_rejection(rejection: JsonRejection) -> AppError {
    let body_text = rejection.body_text();

    AppError::Validation {
        message: format!("Invalid request body: {body_text}"),
        field: Some(extract_field_from_serde_message(&body_text).unwrap_or_else(|| "body".to_string())),
        received: None,
        docs_hint: Some(
            "Check the request body against the endpoint's schema (GET /api-doc/openapi.json)."
                .to_string(),
        ),
    }
}

/// Field name from serde's "missing field `x`" / "unknown field `x`" messages.
fn extract_field_from_serde_message(msg: &str) -> Option<String> {
    ["missing field `", "unknown field `"]
        .iter()
        .find_map(|pattern| {
            let start = msg.find(pattern)? + pattern.len();
            let after = &msg[start..];
            after.find('`').map(|end| after[..end].to_string())
        })
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::header::CONTENT_TYPE;
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Deserialize)]
    #[allow(dead_code)]
    struct Speak {
        text: String,
    }

    #[test]
    fn extracts_missing_field_name() {
        let msg = "Failed to deserialize the JSON body: missing field `image` at line 1 column 2";
        assert_eq!(extract_field_from_serde_message(msg), Some("image".to_string()));
    }

    #[test]
    fn extracts_unknown_field_name() {
        let msg = "unknown field `foo`, expected one of `text`, `voice`";
        assert_eq!(extract_field_from_serde_message(msg), Some("foo".to_string()));
    }

    #[test]
    fn returns_none_for_generic_error() {
        let msg = "invalid type: string, expected f64";
        assert_eq!(extract_field_from_serde_message(msg), None);
    }

    #[tokio::test]
    async fn rejection_becomes_validation_error_naming_the_field() {
        let request = Request::builder()
            .method("POST")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from("{}"))
            .unwrap();

        let err = AppJson::<Speak>::from_request(request, &())
            .await
            .err()
            .expect("empty object must be rejected");
        match err {
            AppError::Validation { field, .. } => assert_eq!(field.as_deref(), Some("text")),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
