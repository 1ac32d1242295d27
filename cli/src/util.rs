use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use focuseye_core::image;
use serde_json::json;

pub fn client() -> reqwest::Client {
    reqwest::Client::new()
}

pub fn exit_error(message: &str, docs_hint: Option<&str>) -> ! {
    let mut err = json!({
        "error": "cli_error",
        "message": message
    });
    if let Some(hint) = docs_hint {
        err["docs_hint"] = json!(hint);
    }
    print_json(&err, true);
    std::process::exit(4);
}

pub fn print_json(value: &serde_json::Value, to_stderr: bool) {
    let formatted = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
    if to_stderr {
        eprintln!("{formatted}");
    } else {
        println!("{formatted}");
    }
}

/// Exit code for an HTTP status: 0=2xx, 1=4xx, 2=anything else.
pub fn exit_code_for(status: u16) -> i32 {
    match status {
        200..=299 => 0,
        400..=499 => 1,
        _ => 2,
    }
}

pub fn connection_error(api_url: &str, err: &reqwest::Error) -> i32 {
    print_json(
        &json!({
            "error": "connection_error",
            "message": format!("{err}"),
            "docs_hint": format!("Is the API server running at {api_url}? Check FOCUSEYE_API_URL.")
        }),
        true,
    );
    3
}

/// Send a JSON request and decode a JSON reply.
///
/// On failure the error body is printed and the exit code returned:
/// 1=client error (4xx), 2=server error (5xx), 3=connection error.
pub async fn request_json(
    api_url: &str,
    method: reqwest::Method,
    path: &str,
    body: Option<&serde_json::Value>,
) -> Result<serde_json::Value, i32> {
    let mut req = client().request(method, format!("{api_url}{path}"));
    if let Some(body) = body {
        req = req.json(body);
    }

    let resp = req.send().await.map_err(|e| connection_error(api_url, &e))?;
    let exit_code = exit_code_for(resp.status().as_u16());

    let resp_body: serde_json::Value = match resp.json().await {
        Ok(v) => v,
        Err(e) => json!({"raw_error": format!("Failed to parse response as JSON: {e}")}),
    };

    if exit_code == 0 {
        Ok(resp_body)
    } else {
        print_json(&resp_body, true);
        Err(exit_code)
    }
}

/// Execute an API request, print the response, return the exit code.
///
/// Exit codes: 0=success (2xx), 1=client error (4xx), 2=server error (5xx),
///             3=connection error, 4=usage error
pub async fn api_request(
    api_url: &str,
    method: reqwest::Method,
    path: &str,
    body: Option<serde_json::Value>,
) -> i32 {
    match request_json(api_url, method, path, body.as_ref()).await {
        Ok(value) => {
            print_json(&value, false);
            0
        }
        Err(code) => code,
    }
}

/// Read JSON from a file path or stdin (when path is "-").
pub fn read_json_from_file(path: &str) -> Result<serde_json::Value, String> {
    let raw = if path == "-" {
        std::io::read_to_string(std::io::stdin()).map_err(|e| format!("Failed to read stdin: {e}"))?
    } else {
        std::fs::read_to_string(path).map_err(|e| format!("Failed to read file '{path}': {e}"))?
    };
    serde_json::from_str(&raw).map_err(|e| format!("Invalid JSON in '{path}': {e}"))
}

/// Image subtype for a file extension, as used in data URIs.
fn image_subtype(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some("jpeg"),
        "png" => Some("png"),
        "webp" => Some("webp"),
        "gif" => Some("gif"),
        "bmp" => Some("bmp"),
        _ => None,
    }
}

/// Turn an `--image` argument into a data URI.
///
/// Accepts a data URI as-is, an image file path, or bare base64 (assumed
/// JPEG).
pub fn image_data_uri(arg: &str) -> Result<String, String> {
    if arg.starts_with("data:image/") {
        return Ok(arg.to_string());
    }

    let path = Path::new(arg);
    if path.is_file() {
        let subtype = image_subtype(path).ok_or_else(|| {
            format!("Unsupported image extension for '{arg}' (use jpg, png, webp, gif or bmp)")
        })?;
        let bytes = std::fs::read(path).map_err(|e| format!("Failed to read image '{arg}': {e}"))?;
        return Ok(format!("data:image/{subtype};base64,{}", STANDARD.encode(bytes)));
    }

    let uri = image::normalize(arg);
    image::validate_data_uri(&uri)
        .map_err(|e| format!("'{arg}' is neither an image file nor base64 data: {e}"))?;
    Ok(uri)
}
