//! Notification arbitration.
//!
//! Re-applies the threshold rules to the interpreted judgment, so the final
//! notification does not depend on whether the classifier obeyed the
//! imperative text in the observation message.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::counters::{CounterSnapshot, whole_minutes};
use crate::judgment::{Judgment, Status};
use crate::scene::SceneDefinition;

/// Which notification, if any, took priority for one evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Notification {
    RestReminder,
    Encouragement,
    /// The classifier's own judgment stands.
    Routine,
}

impl Notification {
    pub fn as_str(self) -> &'static str {
        match self {
            Notification::RestReminder => "rest_reminder",
            Notification::Encouragement => "encouragement",
            Notification::Routine => "routine",
        }
    }
}

/// Decision table over the counters. Rest outranks encouragement.
pub fn decide(counters: &CounterSnapshot) -> Notification {
    if counters.reached_rest() {
        Notification::RestReminder
    } else if counters.reached_encouragement() {
        Notification::Encouragement
    } else {
        Notification::Routine
    }
}

pub fn rest_message(scene: &SceneDefinition, counters: &CounterSnapshot) -> String {
    format!(
        "{}，已累计专注{}分钟，站起来活动5分钟吧！",
        scene.rest_prefix,
        whole_minutes(counters.total_focus_minutes)
    )
}

pub fn encouragement_message(scene: &SceneDefinition, counters: &CounterSnapshot) -> String {
    format!(
        "{}{}分钟了，继续加油！",
        scene.encourage_prefix,
        whole_minutes(counters.continuous_focus_minutes)
    )
}

/// Apply the decision table to a judgment in place and report which rule
/// fired. A firing rule forces `focused`, forces speech and replaces the
/// message; the routine case leaves the judgment untouched, including any
/// posture-driven `shouldSpeak`.
pub fn arbitrate(
    judgment: &mut Judgment,
    scene: &SceneDefinition,
    counters: &CounterSnapshot,
) -> Notification {
    let notification = decide(counters);
    let message = match notification {
        Notification::RestReminder => rest_message(scene, counters),
        Notification::Encouragement => encouragement_message(scene, counters),
        Notification::Routine => return notification,
    };

    judgment.status = Status::Focused;
    judgment.should_speak = true;
    judgment.message = message;
    notification
}
