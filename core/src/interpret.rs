//! Turning raw classifier text into a [`Judgment`].
//!
//! Two stages: a strict structured decode that can fail with a typed
//! [`ParseError`], and a keyword heuristic that cannot fail.

use serde::Deserialize;

use crate::judgment::{DEFAULT_CONFIDENCE, DEFAULT_SHOULD_SPEAK, Judgment, Status};

pub const FALLBACK_CONFIDENCE: f64 = 0.5;
const FALLBACK_MESSAGE_MAX_CHARS: usize = 30;

const AWAY_MARKERS: [&str; 2] = ["离开", "away"];
const FOCUSED_MARKERS: [&str; 2] = ["专注", "focused"];

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("reply contains no JSON object")]
    NoJsonObject,
    #[error("reply is not a valid judgment: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("status '{0}' is not one of focused, distracted, away, error")]
    UnknownStatus(String),
    #[error("confidence {0} is outside [0, 1]")]
    ConfidenceOutOfRange(f64),
}

/// Wire shape of the classifier reply. `status` stays a string so unknown
/// values surface as [`ParseError::UnknownStatus`] rather than a serde message.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawJudgment {
    status: String,
    message: String,
    #[serde(default = "default_confidence")]
    confidence: f64,
    #[serde(default = "default_should_speak")]
    should_speak: bool,
}

fn default_confidence() -> f64 {
    DEFAULT_CONFIDENCE
}

fn default_should_speak() -> bool {
    DEFAULT_SHOULD_SPEAK
}

/// Parse a classifier reply. Never fails: strict decoding first, keyword
/// heuristics when the structure is unusable.
pub fn parse(raw: &str) -> Judgment {
    match try_strict_parse(raw) {
        Ok(judgment) => judgment,
        Err(err) => {
            tracing::warn!(
                error = %err,
                reply_chars = raw.chars().count(),
                "Falling back to heuristic parse"
            );
            heuristic_parse(raw)
        }
    }
}

/// Decode the reply as a judgment object. Accepts the object bare, inside a
/// Markdown code fence, or surrounded by prose.
pub fn try_strict_parse(raw: &str) -> Result<Judgment, ParseError> {
    let reply = decode_first_object(raw)?;

    let status = match reply.status.trim().to_ascii_lowercase().as_str() {
        "focused" => Status::Focused,
        "distracted" => Status::Distracted,
        "away" => Status::Away,
        "error" => Status::Error,
        _ => return Err(ParseError::UnknownStatus(reply.status)),
    };
    if !(0.0..=1.0).contains(&reply.confidence) {
        return Err(ParseError::ConfidenceOutOfRange(reply.confidence));
    }

    Ok(Judgment {
        status,
        message: reply.message,
        confidence: reply.confidence,
        should_speak: reply.should_speak,
    })
}

/// First judgment object in the reply. Each `{` is tried as a start and
/// decoding stops at the end of that object, so braces in trailing (or
/// leading) prose do not matter. The first decode error is reported when no
/// start yields a judgment.
fn decode_first_object(raw: &str) -> Result<RawJudgment, ParseError> {
    let trimmed = raw.trim();
    let body = strip_code_fence(trimmed).unwrap_or(trimmed);

    let mut first_error = None;
    for (start, _) in body.match_indices('{') {
        let mut values = serde_json::Deserializer::from_str(&body[start..]).into_iter::<RawJudgment>();
        match values.next() {
            Some(Ok(reply)) => return Ok(reply),
            Some(Err(err)) => {
                first_error.get_or_insert(err);
            }
            None => {}
        }
    }
    Err(first_error.map_or(ParseError::NoJsonObject, ParseError::Malformed))
}

fn strip_code_fence(text: &str) -> Option<&str> {
    let open = text.find("```")?;
    let after_open = &text[open + 3..];
    // skip an info string such as `json`
    let body_start = after_open.find('\n').map(|i| i + 1).unwrap_or(0);
    let body = &after_open[body_start..];
    let close = body.find("```")?;
    Some(body[..close].trim())
}

/// Keyword fallback for replies without usable structure.
///
/// Away markers win over focused markers; no marker at all means
/// `distracted`, since missing evidence of focus is treated as non-focus.
pub fn heuristic_parse(raw: &str) -> Judgment {
    let lowered = raw.to_lowercase();
    let contains_any = |markers: &[&str]| markers.iter().any(|marker| lowered.contains(marker));

    let status = if contains_any(&AWAY_MARKERS[..]) {
        Status::Away
    } else if contains_any(&FOCUSED_MARKERS[..]) {
        Status::Focused
    } else {
        Status::Distracted
    };

    let message: String = raw.chars().take(FALLBACK_MESSAGE_MAX_CHARS).collect();

    Judgment {
        status,
        message: message.trim().to_string(),
        confidence: FALLBACK_CONFIDENCE,
        should_speak: DEFAULT_SHOULD_SPEAK,
    }
}
