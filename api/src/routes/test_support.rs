use std::sync::Arc;

use axum::response::Response;
use focuseye_core::classifier::{Classifier, ClassifierError, ClassifierRequest, ClassifyFuture};
use focuseye_core::{DecisionEngine, SceneCatalog};

use crate::config::Settings;
use crate::speech::SpeechClient;
use crate::state::AppState;

/// Classifier that answers every request with the same canned reply.
pub struct CannedClassifier {
    reply: Result<String, String>,
}

impl Classifier for CannedClassifier {
    fn classify<'a>(&'a self, _request: &'a ClassifierRequest) -> ClassifyFuture<'a> {
        let reply = self.reply.clone().map_err(ClassifierError::Transport);
        Box::pin(async move { reply })
    }

    fn model(&self) -> &str {
        "stub-vl"
    }
}

pub fn test_settings() -> Settings {
    Settings::from_lookup(|key| {
        let value = match key {
            "API_KEY" => "sk-test",
            "API_BASE" => "https://dashscope.aliyuncs.com/compatible-mode/v1",
            "MODEL_NAME" => "stub-vl",
            // nothing listens on the discard port
            "TTS_API_URL" => "http://127.0.0.1:9/tts",
            "MAX_IMAGE_SIZE_MB" => "0.01",
            _ => return None,
        };
        Some(value.to_string())
    })
    .unwrap()
}

/// App state with a canned classifier. `Err` replies become transport errors.
pub fn test_state(reply: Result<&str, &str>) -> AppState {
    let settings = test_settings();
    let classifier = Arc::new(CannedClassifier {
        reply: reply.map(str::to_string).map_err(str::to_string),
    });
    let catalog = Arc::new(SceneCatalog::builtin().unwrap());
    AppState {
        engine: DecisionEngine::new(classifier, catalog),
        speech: Arc::new(SpeechClient::new(settings.speech.clone()).unwrap()),
        settings: Arc::new(settings),
    }
}

pub async fn read_json(response: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
