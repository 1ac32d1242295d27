use clap::Args;
use serde_json::json;

use crate::util::{api_request, exit_error, image_data_uri, read_json_from_file};

#[derive(Args)]
pub struct AnalyzeArgs {
    /// Image file, data URI, or bare base64 (treated as JPEG)
    #[arg(long)]
    pub image: String,

    /// Scene id (e.g. reading, homework, computer)
    #[arg(long)]
    pub scene: Option<String>,

    /// Session counters as JSON (use '-' for stdin)
    #[arg(long, short = 'f')]
    pub stats_file: Option<String>,
}

pub async fn run(api_url: &str, args: AnalyzeArgs) -> i32 {
    let image = image_data_uri(&args.image).unwrap_or_else(|e| {
        exit_error(&e, Some("Pass a .jpg/.png file or a data:image/...;base64, URI"))
    });

    let mut body = json!({ "image": image });
    if let Some(path) = args.stats_file.as_deref() {
        let stats = read_json_from_file(path).unwrap_or_else(|e| {
            exit_error(&e, Some("Counters use camelCase keys, e.g. {\"incrementalFocusMinutes\": 25}"))
        });
        body["stats"] = stats;
    }
    if let Some(scene) = args.scene {
        body["scene"] = json!(scene);
    }

    api_request(api_url, reqwest::Method::POST, "/api/analyze", Some(body)).await
}
