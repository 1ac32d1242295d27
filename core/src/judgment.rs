use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const DEFAULT_CONFIDENCE: f64 = 0.8;
pub const DEFAULT_SHOULD_SPEAK: bool = true;

/// Label prepended to diagnostics in terminal error judgments.
pub const ERROR_MESSAGE_LABEL: &str = "分析失败：";
const ERROR_DIAGNOSTIC_MAX_CHARS: usize = 20;

/// Activity state reported for one snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Focused,
    Distracted,
    Away,
    /// Terminal outcome when the classifier could not be reached.
    Error,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Focused => "focused",
            Status::Distracted => "distracted",
            Status::Away => "away",
            Status::Error => "error",
        }
    }
}

/// Outcome of one classification call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Judgment {
    pub status: Status,
    /// Feedback text for the user, meant to stay within 30 characters.
    pub message: String,
    /// Classifier certainty in [0, 1].
    pub confidence: f64,
    /// Whether the message should be spoken aloud.
    #[serde(rename = "shouldSpeak")]
    pub should_speak: bool,
}

impl Judgment {
    pub fn new(status: Status, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            confidence: DEFAULT_CONFIDENCE,
            should_speak: DEFAULT_SHOULD_SPEAK,
        }
    }

    /// Terminal judgment for a failed classifier call. The diagnostic is cut
    /// to 20 characters so upstream error bodies never reach the speaker.
    pub fn error(diagnostic: &str) -> Self {
        let short: String = diagnostic.chars().take(ERROR_DIAGNOSTIC_MAX_CHARS).collect();
        Self {
            status: Status::Error,
            message: format!("{ERROR_MESSAGE_LABEL}{short}"),
            confidence: 0.0,
            should_speak: DEFAULT_SHOULD_SPEAK,
        }
    }

    pub fn is_error(&self) -> bool {
        self.status == Status::Error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_judgment_uses_defaults() {
        let judgment = Judgment::new(Status::Away, "人呢");
        assert_eq!(judgment.confidence, DEFAULT_CONFIDENCE);
        assert!(judgment.should_speak);
    }

    #[test]
    fn error_judgment_truncates_diagnostic() {
        let judgment = Judgment::error("connection refused by upstream gateway at 10.0.0.1");
        assert_eq!(judgment.status, Status::Error);
        assert_eq!(judgment.confidence, 0.0);
        assert_eq!(judgment.message, "分析失败：connection refused b");
        assert!(judgment.is_error());
    }

    #[test]
    fn serializes_with_camel_case_speak_flag() {
        let judgment = Judgment {
            status: Status::Focused,
            message: "很好".to_string(),
            confidence: 0.9,
            should_speak: false,
        };
        let value = serde_json::to_value(&judgment).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "status": "focused",
                "message": "很好",
                "confidence": 0.9,
                "shouldSpeak": false
            })
        );
    }
}
