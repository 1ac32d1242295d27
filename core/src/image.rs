//! Validation of data-URI encoded snapshots before they reach the classifier.

use std::sync::LazyLock;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use regex::Regex;

pub const DEFAULT_MAX_IMAGE_MB: f64 = 5.0;
const DATA_URI_PREFIX: &str = "data:image/";
const BASE64_MARKER: &str = ";base64,";

static DATA_URI_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^data:image/([A-Za-z0-9.+-]+);base64,").expect("valid data uri regex")
});

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ImageError {
    #[error("image data is empty")]
    Empty,
    #[error("image is missing the data:image/ prefix")]
    MissingPrefix,
    #[error("image is missing the ;base64, marker")]
    MissingBase64Marker,
    #[error("image payload is not valid base64: {0}")]
    InvalidBase64(String),
    #[error("image is too large: {actual_mb:.2}MB, at most {max_mb}MB allowed")]
    TooLarge { actual_mb: f64, max_mb: f64 },
}

/// Remove whitespace from the base64 payload, keeping the header intact.
pub fn clean_data_uri(raw: &str) -> String {
    match raw.split_once(BASE64_MARKER) {
        Some((prefix, data)) => {
            let data: String = data.chars().filter(|c| !c.is_whitespace()).collect();
            format!("{}{BASE64_MARKER}{data}", prefix.trim())
        }
        None => raw.chars().filter(|c| !c.is_whitespace()).collect(),
    }
}

/// Prefix bare base64 with a JPEG data-URI header.
pub fn normalize(raw: &str) -> String {
    if raw.starts_with(DATA_URI_PREFIX) {
        raw.to_string()
    } else {
        format!("data:image/jpeg;base64,{raw}")
    }
}

pub fn validate_data_uri(uri: &str) -> Result<(), ImageError> {
    if uri.is_empty() {
        return Err(ImageError::Empty);
    }
    if !uri.starts_with(DATA_URI_PREFIX) {
        return Err(ImageError::MissingPrefix);
    }
    let (_, payload) = uri
        .split_once(BASE64_MARKER)
        .ok_or(ImageError::MissingBase64Marker)?;
    STANDARD
        .decode(payload)
        .map_err(|e| ImageError::InvalidBase64(e.to_string()))?;
    Ok(())
}

/// Image subtype from the header, e.g. `jpeg` or `png`.
pub fn image_format(uri: &str) -> Option<&str> {
    DATA_URI_RE
        .captures(uri)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Decoded size estimate in bytes (base64 is 4/3 of the raw size).
pub fn estimate_size(uri: &str) -> usize {
    let payload = uri
        .split_once(BASE64_MARKER)
        .map(|(_, payload)| payload)
        .unwrap_or(uri);
    payload.len() * 3 / 4
}

pub fn validate_size(uri: &str, max_mb: f64) -> Result<(), ImageError> {
    let size = estimate_size(uri);
    let max_bytes = (max_mb * 1024.0 * 1024.0) as usize;
    if size > max_bytes {
        return Err(ImageError::TooLarge {
            actual_mb: size as f64 / 1024.0 / 1024.0,
            max_mb,
        });
    }
    Ok(())
}

/// Clean, then check format and size. Returns the cleaned URI.
pub fn prepare(raw: &str, max_mb: f64) -> Result<String, ImageError> {
    let uri = clean_data_uri(raw);
    validate_data_uri(&uri)?;
    validate_size(&uri, max_mb)?;
    Ok(uri)
}
