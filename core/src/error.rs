use serde::Serialize;
use utoipa::ToSchema;

/// Error body shared by the HTTP API and the CLI.
///
/// A classifier that times out is not an error here: it comes back as a
/// normal analyze response with `status: "error"`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiError {
    /// One of [`codes`]
    pub error: String,
    pub message: String,
    /// Offending request field, dotted for nested fields (`stats.checkCount`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub received: Option<serde_json::Value>,
    pub request_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub docs_hint: Option<String>,
}

impl ApiError {
    pub fn new(code: &str, message: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self {
            error: code.to_string(),
            message: message.into(),
            field: None,
            received: None,
            request_id: request_id.into(),
            docs_hint: None,
        }
    }
}

pub mod codes {
    pub const VALIDATION_FAILED: &str = "validation_failed";
    pub const UPSTREAM_FAILED: &str = "upstream_failed";
    pub const RATE_LIMITED: &str = "rate_limited";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optional_fields_are_omitted() {
        let body = serde_json::to_value(ApiError::new(codes::UPSTREAM_FAILED, "boom", "r-1")).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"error": "upstream_failed", "message": "boom", "request_id": "r-1"})
        );
    }
}
