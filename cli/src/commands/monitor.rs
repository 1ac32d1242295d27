use std::time::Duration;

use clap::Args;
use focuseye_core::counters::IntervalDefaults;
use focuseye_core::scene::DEFAULT_SCENE;
use focuseye_core::{Notification, Status};
use serde::Deserialize;
use serde_json::json;
use tokio::time::Instant;

use crate::session::{CheckOutcome, SessionCounters};
use crate::util::{exit_error, image_data_uri, print_json, request_json};

const FALLBACK_INTERVAL_SECS: u64 = 60;

#[derive(Args)]
pub struct MonitorArgs {
    /// Snapshot file, re-read before every check
    #[arg(long)]
    pub image: String,

    /// Scene id
    #[arg(long, default_value = DEFAULT_SCENE)]
    pub scene: String,

    /// Number of checks to run
    #[arg(long, default_value_t = 10)]
    pub checks: u32,

    /// Seconds between checks (default: the server's monitor interval)
    #[arg(long)]
    pub interval_secs: Option<u64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServerConfig {
    monitor_interval: u64,
    encouragement_interval: u32,
    rest_reminder_interval: u32,
}

#[derive(Deserialize)]
struct HealthReply {
    config: ServerConfig,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeReply {
    status: Status,
    message: String,
    should_speak: bool,
    #[serde(default)]
    notification: Option<Notification>,
}

pub async fn run(api_url: &str, args: MonitorArgs) -> i32 {
    let health = match request_json(api_url, reqwest::Method::GET, "/api/health", None).await {
        Ok(value) => value,
        Err(code) => return code,
    };
    let (intervals, server_interval) = match serde_json::from_value::<HealthReply>(health) {
        Ok(reply) => (
            IntervalDefaults {
                encouragement_interval: reply.config.encouragement_interval,
                rest_reminder_interval: reply.config.rest_reminder_interval,
            },
            reply.config.monitor_interval,
        ),
        Err(_) => (IntervalDefaults::default(), FALLBACK_INTERVAL_SECS),
    };

    let interval_secs = args.interval_secs.unwrap_or(server_interval).max(1);
    let interval = Duration::from_secs(interval_secs);
    let mut session = SessionCounters::new(&args.scene, intervals, interval_secs as f64 / 60.0);
    let mut last_check = Instant::now();

    for check in 0..args.checks {
        if check > 0 {
            tokio::time::sleep(interval).await;
        }
        let now = Instant::now();
        session.advance(now.duration_since(last_check).as_secs_f64());
        last_check = now;

        let image = image_data_uri(&args.image).unwrap_or_else(|e| exit_error(&e, None));
        let stats = session.snapshot(&chrono::Local::now().format("%H:%M:%S").to_string());
        let body = json!({ "image": image, "stats": stats });

        let reply = match request_json(api_url, reqwest::Method::POST, "/api/analyze", Some(&body))
            .await
        {
            Ok(value) => value,
            Err(code) => return code,
        };
        let reply: AnalyzeReply = match serde_json::from_value(reply) {
            Ok(reply) => reply,
            Err(e) => {
                print_json(
                    &json!({"error": "unexpected_response", "message": e.to_string()}),
                    true,
                );
                return 2;
            }
        };

        session.record(CheckOutcome {
            status: reply.status,
            notification: reply.notification,
        });
        print_json(
            &json!({
                "check": check + 1,
                "status": reply.status,
                "message": reply.message,
                "shouldSpeak": reply.should_speak,
                "notification": reply.notification,
                "counters": stats,
            }),
            false,
        );
    }
    0
}
