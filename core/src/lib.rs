//! FocusEye decision engine.
//!
//! Turns one camera snapshot plus session counters into a [`Judgment`]:
//! scene rules are composed into a prompt, an opaque [`Classifier`] replies
//! with text, the reply is interpreted, and the notification rules are
//! re-applied so rest reminders and encouragement fire deterministically.

pub mod arbitrate;
pub mod classifier;
pub mod counters;
pub mod engine;
pub mod error;
pub mod image;
pub mod interpret;
pub mod judgment;
pub mod prompt;
pub mod scene;

pub use arbitrate::Notification;
pub use classifier::{Classifier, ClassifierError, ClassifierRequest, ClassifyFuture};
pub use counters::{CounterInput, CounterSnapshot, IntervalDefaults};
pub use engine::{DecisionEngine, Evaluation};
pub use judgment::{Judgment, Status};
pub use scene::{SceneCatalog, SceneDefinition};
