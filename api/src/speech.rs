//! Speech synthesis through the DashScope HTTP endpoint.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::SpeechSettings;

const SYNTHESIS_TIMEOUT: Duration = Duration::from_secs(30);
const AUDIO_FETCH_TIMEOUT: Duration = Duration::from_secs(10);
const FORMAT: &str = "mp3";
const SAMPLE_RATE: u32 = 22050;
const VOLUME: u32 = 50;

#[derive(Debug, thiserror::Error)]
pub enum SpeechError {
    #[error("speech request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("speech service returned HTTP {status}")]
    Upstream { status: u16, body: String },
    #[error("speech service reply carried no audio")]
    NoAudio,
}

#[derive(Debug, Serialize)]
struct SynthesisRequest<'a> {
    model: &'a str,
    input: SynthesisInput<'a>,
    parameters: SynthesisParameters<'a>,
}

#[derive(Debug, Serialize)]
struct SynthesisInput<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct SynthesisParameters<'a> {
    voice: &'a str,
    format: &'static str,
    sample_rate: u32,
    volume: u32,
    speech_rate: f64,
    pitch_rate: f64,
}

#[derive(Debug, Deserialize)]
struct SynthesisReply {
    output: Option<SynthesisOutput>,
}

#[derive(Debug, Deserialize)]
struct SynthesisOutput {
    audio_url: Option<String>,
}

pub struct SpeechClient {
    client: reqwest::Client,
    settings: SpeechSettings,
}

impl SpeechClient {
    pub fn new(settings: SpeechSettings) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(SYNTHESIS_TIMEOUT)
            .build()?;
        Ok(Self { client, settings })
    }

    /// Synthesize `text` to MP3. `model` and `voice` override the configured
    /// defaults.
    pub async fn synthesize(
        &self,
        text: &str,
        model: Option<&str>,
        voice: Option<&str>,
    ) -> Result<Vec<u8>, SpeechError> {
        let model = model.unwrap_or(&self.settings.model);
        let voice = voice.unwrap_or(&self.settings.voice);
        tracing::debug!(model, voice, text_chars = text.chars().count(), "Synthesizing speech");

        let response = self
            .client
            .post(&self.settings.api_url)
            .bearer_auth(&self.settings.api_key)
            .json(&synthesis_request(text, model, voice))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SpeechError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let body = response.bytes().await?;

        let audio = if is_audio(&content_type) {
            body.to_vec()
        } else {
            let url = audio_url(&body).ok_or(SpeechError::NoAudio)?;
            self.fetch_audio(&url).await?
        };
        if audio.is_empty() {
            return Err(SpeechError::NoAudio);
        }

        tracing::info!(bytes = audio.len(), "Speech synthesized");
        Ok(audio)
    }

    async fn fetch_audio(&self, url: &str) -> Result<Vec<u8>, SpeechError> {
        let response = self
            .client
            .get(url)
            .timeout(AUDIO_FETCH_TIMEOUT)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SpeechError::Upstream {
                status: status.as_u16(),
                body: String::new(),
            });
        }
        Ok(response.bytes().await?.to_vec())
    }
}

fn synthesis_request<'a>(text: &'a str, model: &'a str, voice: &'a str) -> SynthesisRequest<'a> {
    SynthesisRequest {
        model,
        input: SynthesisInput { text },
        parameters: SynthesisParameters {
            voice,
            format: FORMAT,
            sample_rate: SAMPLE_RATE,
            volume: VOLUME,
            speech_rate: 1.0,
            pitch_rate: 1.0,
        },
    }
}

fn is_audio(content_type: &str) -> bool {
    content_type.contains("audio") || content_type.contains("octet-stream")
}

fn audio_url(body: &[u8]) -> Option<String> {
    serde_json::from_slice::<SynthesisReply>(body)
        .ok()?
        .output?
        .audio_url
        .filter(|url| !url.is_empty())
}
