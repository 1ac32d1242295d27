use std::sync::Arc;

use focuseye_core::DecisionEngine;

use crate::config::Settings;
use crate::speech::SpeechClient;

#[derive(Clone)]
pub struct AppState {
    pub engine: DecisionEngine,
    pub speech: Arc<SpeechClient>,
    pub settings: Arc<Settings>,
}
