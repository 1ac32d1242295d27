//! Vision classifier backed by an OpenAI-compatible chat-completions endpoint.

use focuseye_core::classifier::{Classifier, ClassifierError, ClassifierRequest, ClassifyFuture};
use focuseye_core::prompt::ObservationMessage;
use serde::{Deserialize, Serialize};

use crate::config::ClassifierSettings;

const TEMPERATURE: f64 = 0.5;
const MAX_TOKENS: u32 = 500;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f64,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
#[serde(tag = "role", rename_all = "lowercase")]
enum ChatMessage<'a> {
    System { content: &'a str },
    User { content: &'a ObservationMessage },
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Debug, Deserialize)]
struct ReplyMessage {
    #[serde(default)]
    content: Option<ReplyContent>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ReplyContent {
    Text(String),
    Parts(Vec<ReplyPart>),
}

#[derive(Debug, Deserialize)]
struct ReplyPart {
    #[serde(default)]
    text: Option<String>,
}

/// Owns one pooled HTTP client for the process lifetime.
pub struct OpenAiClassifier {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl OpenAiClassifier {
    pub fn new(settings: &ClassifierSettings) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()?;
        Ok(Self {
            client,
            endpoint: format!(
                "{}/chat/completions",
                settings.api_base.trim_end_matches('/')
            ),
            api_key: settings.api_key.clone(),
            model: settings.model.clone(),
        })
    }

    async fn complete(&self, request: &ClassifierRequest) -> Result<String, ClassifierError> {
        let body = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage::System {
                    content: &request.instruction,
                },
                ChatMessage::User {
                    content: &request.observation,
                },
            ],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = %status, model = %self.model, "Classifier returned non-success status");
            return Err(ClassifierError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let reply: ChatResponse = response.json().await.map_err(transport_error)?;
        reply_text(reply)
    }
}

impl Classifier for OpenAiClassifier {
    fn classify<'a>(&'a self, request: &'a ClassifierRequest) -> ClassifyFuture<'a> {
        Box::pin(self.complete(request))
    }

    fn model(&self) -> &str {
        &self.model
    }
}

fn transport_error(err: reqwest::Error) -> ClassifierError {
    if err.is_timeout() {
        ClassifierError::Timeout
    } else {
        ClassifierError::Transport(err.to_string())
    }
}

fn reply_text(reply: ChatResponse) -> Result<String, ClassifierError> {
    let content = reply
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or(ClassifierError::EmptyReply)?;

    let text = match content {
        ReplyContent::Text(text) => text,
        ReplyContent::Parts(parts) => parts.into_iter().filter_map(|part| part.text).collect(),
    };
    if text.trim().is_empty() {
        return Err(ClassifierError::EmptyReply);
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use focuseye_core::prompt::{ContentPart, ImageUrl};
    use serde_json::json;

    use super::*;

    fn parse(value: serde_json::Value) -> Result<String, ClassifierError> {
        reply_text(serde_json::from_value(value).unwrap())
    }

    #[test]
    fn request_body_matches_chat_completions_shape() {
        let observation = ObservationMessage {
            parts: vec![
                ContentPart::Text {
                    text: "请分析".to_string(),
                },
                ContentPart::ImageUrl {
                    image_url: ImageUrl {
                        url: "data:image/jpeg;base64,AAAA".to_string(),
                    },
                },
            ],
        };
        let body = ChatRequest {
            model: "qwen-vl-max",
            messages: [
                ChatMessage::System { content: "rules" },
                ChatMessage::User {
                    content: &observation,
                },
            ],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({
                "model": "qwen-vl-max",
                "messages": [
                    {"role": "system", "content": "rules"},
                    {"role": "user", "content": [
                        {"type": "text", "text": "请分析"},
                        {"type": "image_url", "image_url": {"url": "data:image/jpeg;base64,AAAA"}}
                    ]}
                ],
                "temperature": 0.5,
                "max_tokens": 500
            })
        );
    }

    #[test]
    fn reads_string_content() {
        let text = parse(json!({
            "choices": [{"message": {"role": "assistant", "content": "{\"status\":\"focused\"}"}}]
        }))
        .unwrap();
        assert_eq!(text, "{\"status\":\"focused\"}");
    }

    #[test]
    fn joins_text_parts() {
        let text = parse(json!({
            "choices": [{"message": {"content": [
                {"type": "text", "text": "{\"status\":"},
                {"type": "text", "text": "\"away\"}"}
            ]}}]
        }))
        .unwrap();
        assert_eq!(text, "{\"status\":\"away\"}");
    }

    #[test]
    fn empty_replies_are_errors() {
        assert!(matches!(
            parse(json!({"choices": []})),
            Err(ClassifierError::EmptyReply)
        ));
        assert!(matches!(
            parse(json!({"choices": [{"message": {"content": null}}]})),
            Err(ClassifierError::EmptyReply)
        ));
        assert!(matches!(
            parse(json!({"choices": [{"message": {"content": "  "}}]})),
            Err(ClassifierError::EmptyReply)
        ));
    }
}
