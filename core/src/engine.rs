use std::sync::Arc;

use serde::Serialize;
use utoipa::ToSchema;

use crate::arbitrate::{Notification, arbitrate};
use crate::classifier::{Classifier, ClassifierRequest};
use crate::counters::CounterSnapshot;
use crate::interpret;
use crate::judgment::Judgment;
use crate::prompt::{build_instruction_prompt, build_observation_message};
use crate::scene::SceneCatalog;

/// Result of one evaluation: the judgment plus which notification rule,
/// if any, overrode the classifier.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Evaluation {
    #[serde(flatten)]
    pub judgment: Judgment,
    /// Absent when the classifier call failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification: Option<Notification>,
}

/// Stateless orchestrator. Safe to share across concurrent requests; all
/// session state arrives through the counters argument.
#[derive(Clone)]
pub struct DecisionEngine {
    classifier: Arc<dyn Classifier>,
    catalog: Arc<SceneCatalog>,
}

impl DecisionEngine {
    pub fn new(classifier: Arc<dyn Classifier>, catalog: Arc<SceneCatalog>) -> Self {
        Self {
            classifier,
            catalog,
        }
    }

    pub fn catalog(&self) -> &SceneCatalog {
        &self.catalog
    }

    pub fn model(&self) -> &str {
        self.classifier.model()
    }

    /// Compose, classify once, interpret, arbitrate.
    ///
    /// Never fails: a failed classifier call becomes an error judgment and
    /// skips arbitration. Every reply that did arrive is arbitrated, whatever
    /// status it claims. Without counters the interpreted judgment is
    /// returned unchanged.
    pub async fn evaluate(
        &self,
        image: &str,
        scene_id: &str,
        counters: Option<&CounterSnapshot>,
    ) -> Evaluation {
        if !self.catalog.contains(scene_id) {
            tracing::debug!(scene = scene_id, "Unknown scene, using default");
        }
        let scene = self.catalog.lookup(scene_id);

        let request = ClassifierRequest {
            instruction: build_instruction_prompt(scene),
            observation: build_observation_message(image, counters),
        };
        tracing::debug!(
            scene = %scene.id,
            instruction_chars = request.instruction.chars().count(),
            image_bytes = image.len(),
            with_counters = counters.is_some(),
            "Prompt composed"
        );

        let raw = match self.classifier.classify(&request).await {
            Ok(raw) => raw,
            Err(err) => {
                tracing::warn!(scene = %scene.id, error = %err, "Classifier call failed");
                return Evaluation {
                    judgment: Judgment::error(&err.to_string()),
                    notification: None,
                };
            }
        };

        // an "error" status written by the model is still a reply and gets arbitrated
        let mut judgment = interpret::parse(&raw);
        let notification = match counters {
            Some(counters) => arbitrate(&mut judgment, scene, counters),
            None => Notification::Routine,
        };

        tracing::info!(
            scene = %scene.id,
            status = judgment.status.as_str(),
            notification = notification.as_str(),
            should_speak = judgment.should_speak,
            "Evaluation complete"
        );

        Evaluation {
            judgment,
            notification: Some(notification),
        }
    }
}
