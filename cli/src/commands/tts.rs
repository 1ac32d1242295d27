use std::path::PathBuf;

use clap::Args;
use serde_json::json;

use crate::util::{client, connection_error, exit_code_for, exit_error, print_json};

#[derive(Args)]
pub struct TtsArgs {
    /// Text to speak
    #[arg(long)]
    pub text: String,

    /// Voice override
    #[arg(long)]
    pub voice: Option<String>,

    /// Synthesis model override
    #[arg(long)]
    pub model: Option<String>,

    /// Where to write the MP3
    #[arg(long, short = 'o')]
    pub out: PathBuf,
}

pub async fn run(api_url: &str, args: TtsArgs) -> i32 {
    let mut body = json!({ "text": args.text });
    if let Some(voice) = args.voice {
        body["voice"] = json!(voice);
    }
    if let Some(model) = args.model {
        body["model"] = json!(model);
    }

    let resp = match client()
        .post(format!("{api_url}/api/tts"))
        .json(&body)
        .send()
        .await
    {
        Ok(resp) => resp,
        Err(e) => return connection_error(api_url, &e),
    };

    let exit_code = exit_code_for(resp.status().as_u16());
    if exit_code != 0 {
        let err_body = resp
            .json()
            .await
            .unwrap_or_else(|e| json!({"raw_error": format!("Failed to parse response as JSON: {e}")}));
        print_json(&err_body, true);
        return exit_code;
    }

    let audio = match resp.bytes().await {
        Ok(audio) => audio,
        Err(e) => return connection_error(api_url, &e),
    };
    if let Err(e) = std::fs::write(&args.out, &audio) {
        exit_error(
            &format!("Failed to write '{}': {e}", args.out.display()),
            None,
        );
    }

    print_json(
        &json!({
            "written": args.out.display().to_string(),
            "bytes": audio.len()
        }),
        false,
    );
    0
}
