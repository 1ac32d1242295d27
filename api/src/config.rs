use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use focuseye_core::counters::{
    DEFAULT_ENCOURAGEMENT_INTERVAL, DEFAULT_REST_REMINDER_INTERVAL, IntervalDefaults,
};
use focuseye_core::image::DEFAULT_MAX_IMAGE_MB;

pub const DEFAULT_TTS_API_URL: &str =
    "https://dashscope.aliyuncs.com/api/v1/services/audio/tts/synthesis";
pub const DEFAULT_TTS_MODEL: &str = "cosyvoice-v3-flash";
pub const DEFAULT_TTS_VOICE: &str = "longanyang";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_MONITOR_INTERVAL_SECS: u64 = 60;
const DEFAULT_MONITOR_INTERVAL_RANDOM_SECS: u64 = 10;
const DEFAULT_PORT: u16 = 5001;
const API_BASE_DISPLAY_CHARS: usize = 30;

#[derive(Debug, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{key} has invalid value '{value}'")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct ClassifierSettings {
    pub api_key: String,
    pub api_base: String,
    pub model: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct SpeechSettings {
    pub api_key: String,
    pub api_url: String,
    pub model: String,
    pub voice: String,
}

/// Client polling cadence. Only reported through `/api/health`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonitorSettings {
    pub interval_secs: u64,
    pub interval_random_secs: u64,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub classifier: ClassifierSettings,
    pub speech: SpeechSettings,
    pub intervals: IntervalDefaults,
    pub monitor: MonitorSettings,
    pub max_image_mb: f64,
    pub scenes_path: Option<PathBuf>,
    pub port: u16,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from any key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let required = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));

        let api_key = required("API_KEY")?;
        let classifier = ClassifierSettings {
            api_key: api_key.clone(),
            api_base: required("API_BASE")?,
            model: required("MODEL_NAME")?,
            timeout: Duration::from_secs(parse_or(
                get("REQUEST_TIMEOUT"),
                "REQUEST_TIMEOUT",
                DEFAULT_REQUEST_TIMEOUT_SECS,
            )?),
        };

        let speech = SpeechSettings {
            api_key: get("TTS_API_KEY").unwrap_or(api_key),
            api_url: get("TTS_API_URL").unwrap_or_else(|| DEFAULT_TTS_API_URL.to_string()),
            model: get("TTS_MODEL").unwrap_or_else(|| DEFAULT_TTS_MODEL.to_string()),
            voice: get("TTS_VOICE").unwrap_or_else(|| DEFAULT_TTS_VOICE.to_string()),
        };

        let intervals = IntervalDefaults {
            encouragement_interval: positive(
                get("ENCOURAGEMENT_INTERVAL"),
                "ENCOURAGEMENT_INTERVAL",
                DEFAULT_ENCOURAGEMENT_INTERVAL,
            )?,
            rest_reminder_interval: positive(
                get("REST_REMINDER_INTERVAL"),
                "REST_REMINDER_INTERVAL",
                DEFAULT_REST_REMINDER_INTERVAL,
            )?,
        };

        let monitor = MonitorSettings {
            interval_secs: parse_or(
                get("MONITOR_INTERVAL"),
                "MONITOR_INTERVAL",
                DEFAULT_MONITOR_INTERVAL_SECS,
            )?,
            interval_random_secs: parse_or(
                get("MONITOR_INTERVAL_RANDOM"),
                "MONITOR_INTERVAL_RANDOM",
                DEFAULT_MONITOR_INTERVAL_RANDOM_SECS,
            )?,
        };

        let max_image_mb: f64 = parse_or(
            get("MAX_IMAGE_SIZE_MB"),
            "MAX_IMAGE_SIZE_MB",
            DEFAULT_MAX_IMAGE_MB,
        )?;
        if !(max_image_mb.is_finite() && max_image_mb > 0.0) {
            return Err(ConfigError::Invalid {
                key: "MAX_IMAGE_SIZE_MB",
                value: max_image_mb.to_string(),
            });
        }

        Ok(Self {
            classifier,
            speech,
            intervals,
            monitor,
            max_image_mb,
            scenes_path: get("FOCUSEYE_SCENES_PATH").map(PathBuf::from),
            port: parse_or(get("PORT"), "PORT", DEFAULT_PORT)?,
        })
    }

    /// API base cut to 30 characters for public display.
    pub fn api_base_display(&self) -> String {
        let base = &self.classifier.api_base;
        if base.chars().count() > API_BASE_DISPLAY_CHARS {
            let short: String = base.chars().take(API_BASE_DISPLAY_CHARS).collect();
            format!("{short}...")
        } else {
            base.clone()
        }
    }

    /// Body limit that fits the largest accepted image once base64 encoded,
    /// plus room for the counters.
    pub fn body_limit_bytes(&self) -> usize {
        let image_bytes = self.max_image_mb * 1024.0 * 1024.0;
        (image_bytes * 4.0 / 3.0) as usize + 64 * 1024
    }
}

fn parse_or<T: FromStr>(raw: Option<String>, key: &'static str, default: T) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => value
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
    }
}

fn positive(raw: Option<String>, key: &'static str, default: u32) -> Result<u32, ConfigError> {
    let value = parse_or(raw, key, default)?;
    if value == 0 {
        return Err(ConfigError::Invalid {
            key,
            value: value.to_string(),
        });
    }
    Ok(value)
}
