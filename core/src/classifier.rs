use std::future::Future;
use std::pin::Pin;

use crate::prompt::ObservationMessage;

/// Everything the vision model receives for one snapshot.
#[derive(Debug, Clone)]
pub struct ClassifierRequest {
    /// System instruction with the scene's rules.
    pub instruction: String,
    /// Counters text and the image.
    pub observation: ObservationMessage,
}

#[derive(Debug, thiserror::Error)]
pub enum ClassifierError {
    #[error("classifier request timed out")]
    Timeout,
    #[error("classifier transport error: {0}")]
    Transport(String),
    #[error("classifier returned HTTP {status}: {body}")]
    Upstream { status: u16, body: String },
    #[error("classifier reply carried no text")]
    EmptyReply,
}

pub type ClassifyFuture<'a> =
    Pin<Box<dyn Future<Output = Result<String, ClassifierError>> + Send + 'a>>;

/// Opaque vision-language classifier: instruction + observation in, raw text
/// out. Implementations own their connection handle and timeout; the engine
/// calls `classify` exactly once per evaluation and never retries.
pub trait Classifier: Send + Sync {
    fn classify<'a>(&'a self, request: &'a ClassifierRequest) -> ClassifyFuture<'a>;

    /// Model identifier, for logs and health output.
    fn model(&self) -> &str;
}
