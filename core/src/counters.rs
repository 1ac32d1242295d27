use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const DEFAULT_ENCOURAGEMENT_INTERVAL: u32 = 20;
pub const DEFAULT_REST_REMINDER_INTERVAL: u32 = 3;
const ZERO_DURATION: &str = "00:00:00";

/// Intervals applied when the caller leaves them out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntervalDefaults {
    pub encouragement_interval: u32,
    pub rest_reminder_interval: u32,
}

impl Default for IntervalDefaults {
    fn default() -> Self {
        Self {
            encouragement_interval: DEFAULT_ENCOURAGEMENT_INTERVAL,
            rest_reminder_interval: DEFAULT_REST_REMINDER_INTERVAL,
        }
    }
}

/// Session counters as sent by the client. Every field may be omitted.
///
/// Continuity lives entirely on the caller side: the client resets
/// `continuousFocusMinutes` on any non-focused check, and resets the two
/// incremental counters after the matching notification was delivered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct CounterInput {
    pub check_count: u64,
    /// Wall-clock session length, formatted `HH:MM:SS`
    pub running_time: String,
    /// Accumulated focus, formatted `HH:MM:SS`
    pub focus_time: String,
    /// Client-side clock reading, shown to the classifier as-is
    pub current_time: String,
    pub total_focus_minutes: f64,
    pub continuous_focus_minutes: f64,
    /// Continuous focus since the last encouragement
    pub incremental_focus_minutes: f64,
    /// Accumulated focus since the last rest reminder
    pub incremental_rest_minutes: f64,
    /// Minutes; server default when omitted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encouragement_interval: Option<u32>,
    /// Minutes; server default when omitted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rest_reminder_interval: Option<u32>,
    pub suppress_encouragement: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scene: Option<String>,
}

impl Default for CounterInput {
    fn default() -> Self {
        Self {
            check_count: 0,
            running_time: ZERO_DURATION.to_string(),
            focus_time: ZERO_DURATION.to_string(),
            current_time: String::new(),
            total_focus_minutes: 0.0,
            continuous_focus_minutes: 0.0,
            incremental_focus_minutes: 0.0,
            incremental_rest_minutes: 0.0,
            encouragement_interval: None,
            rest_reminder_interval: None,
            suppress_encouragement: false,
            scene: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CounterError {
    #[error("{field} must be a finite, non-negative number of minutes (got {value})")]
    InvalidMinutes { field: &'static str, value: f64 },
    #[error("{field} must be a positive number of minutes")]
    ZeroInterval { field: &'static str },
}

impl CounterError {
    /// Wire name of the offending field.
    pub fn field(&self) -> &'static str {
        match self {
            CounterError::InvalidMinutes { field, .. } | CounterError::ZeroInterval { field } => {
                field
            }
        }
    }
}

impl CounterInput {
    /// Validate once at the boundary and fill in missing intervals.
    pub fn resolve(self, defaults: &IntervalDefaults) -> Result<CounterSnapshot, CounterError> {
        let minutes = [
            ("totalFocusMinutes", self.total_focus_minutes),
            ("continuousFocusMinutes", self.continuous_focus_minutes),
            ("incrementalFocusMinutes", self.incremental_focus_minutes),
            ("incrementalRestMinutes", self.incremental_rest_minutes),
        ];
        for (field, value) in minutes {
            if !value.is_finite() || value < 0.0 {
                return Err(CounterError::InvalidMinutes { field, value });
            }
        }

        let encouragement_interval = self
            .encouragement_interval
            .unwrap_or(defaults.encouragement_interval);
        if encouragement_interval == 0 {
            return Err(CounterError::ZeroInterval {
                field: "encouragementInterval",
            });
        }
        let rest_reminder_interval = self
            .rest_reminder_interval
            .unwrap_or(defaults.rest_reminder_interval);
        if rest_reminder_interval == 0 {
            return Err(CounterError::ZeroInterval {
                field: "restReminderInterval",
            });
        }

        Ok(CounterSnapshot {
            check_count: self.check_count,
            running_time: self.running_time,
            focus_time: self.focus_time,
            current_time: self.current_time,
            total_focus_minutes: self.total_focus_minutes,
            continuous_focus_minutes: self.continuous_focus_minutes,
            incremental_focus_minutes: self.incremental_focus_minutes,
            incremental_rest_minutes: self.incremental_rest_minutes,
            encouragement_interval,
            rest_reminder_interval,
            suppress_encouragement: self.suppress_encouragement,
        })
    }
}

/// Validated, read-only counters for one evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct CounterSnapshot {
    pub check_count: u64,
    pub running_time: String,
    pub focus_time: String,
    pub current_time: String,
    pub total_focus_minutes: f64,
    pub continuous_focus_minutes: f64,
    pub incremental_focus_minutes: f64,
    pub incremental_rest_minutes: f64,
    pub encouragement_interval: u32,
    pub rest_reminder_interval: u32,
    pub suppress_encouragement: bool,
}

impl CounterSnapshot {
    /// Encouragement milestone reached and not suppressed by the caller.
    pub fn reached_encouragement(&self) -> bool {
        self.incremental_focus_minutes >= f64::from(self.encouragement_interval)
            && !self.suppress_encouragement
    }

    /// Raw milestone comparison, ignoring suppression. Shown to the classifier
    /// next to the suppression flag.
    pub fn encouragement_threshold_met(&self) -> bool {
        self.incremental_focus_minutes >= f64::from(self.encouragement_interval)
    }

    pub fn reached_rest(&self) -> bool {
        self.incremental_rest_minutes >= f64::from(self.rest_reminder_interval)
    }
}

/// Render minutes the way they are spoken: whole minutes, rounded down.
pub fn whole_minutes(minutes: f64) -> u64 {
    if minutes.is_finite() && minutes > 0.0 {
        minutes.floor() as u64
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(input: CounterInput) -> CounterSnapshot {
        input.resolve(&IntervalDefaults::default()).unwrap()
    }

    #[test]
    fn empty_payload_uses_documented_defaults() {
        let input: CounterInput = serde_json::from_str("{}").unwrap();
        assert_eq!(input, CounterInput::default());

        let counters = snapshot(input);
        assert_eq!(counters.running_time, "00:00:00");
        assert_eq!(counters.encouragement_interval, 20);
        assert_eq!(counters.rest_reminder_interval, 3);
        assert!(!counters.reached_encouragement());
        assert!(!counters.reached_rest());
    }

    #[test]
    fn reads_camel_case_fields() {
        let input: CounterInput = serde_json::from_value(serde_json::json!({
            "checkCount": 12,
            "incrementalFocusMinutes": 25,
            "encouragementInterval": 20,
            "suppressEncouragement": true,
            "scene": "homework"
        }))
        .unwrap();
        assert_eq!(input.check_count, 12);
        assert_eq!(input.incremental_focus_minutes, 25.0);
        assert_eq!(input.encouragement_interval, Some(20));
        assert!(input.suppress_encouragement);
        assert_eq!(input.scene.as_deref(), Some("homework"));
    }

    #[test]
    fn server_defaults_fill_missing_intervals() {
        let defaults = IntervalDefaults {
            encouragement_interval: 45,
            rest_reminder_interval: 50,
        };
        let counters = CounterInput {
            rest_reminder_interval: Some(10),
            ..CounterInput::default()
        }
        .resolve(&defaults)
        .unwrap();
        assert_eq!(counters.encouragement_interval, 45);
        assert_eq!(counters.rest_reminder_interval, 10);
    }

    #[test]
    fn rejects_negative_minutes() {
        let err = CounterInput {
            incremental_rest_minutes: -1.0,
            ..CounterInput::default()
        }
        .resolve(&IntervalDefaults::default())
        .unwrap_err();
        assert_eq!(err.field(), "incrementalRestMinutes");
    }

    #[test]
    fn rejects_zero_interval() {
        let err = CounterInput {
            encouragement_interval: Some(0),
            ..CounterInput::default()
        }
        .resolve(&IntervalDefaults::default())
        .unwrap_err();
        assert_eq!(
            err,
            CounterError::ZeroInterval {
                field: "encouragementInterval"
            }
        );
    }

    #[test]
    fn suppression_blocks_encouragement_but_not_raw_comparison() {
        let counters = snapshot(CounterInput {
            incremental_focus_minutes: 30.0,
            suppress_encouragement: true,
            ..CounterInput::default()
        });
        assert!(counters.encouragement_threshold_met());
        assert!(!counters.reached_encouragement());
    }

    #[test]
    fn thresholds_are_inclusive() {
        let counters = snapshot(CounterInput {
            incremental_focus_minutes: 20.0,
            incremental_rest_minutes: 3.0,
            ..CounterInput::default()
        });
        assert!(counters.reached_encouragement());
        assert!(counters.reached_rest());
    }

    #[test]
    fn whole_minutes_rounds_down() {
        assert_eq!(whole_minutes(25.9), 25);
        assert_eq!(whole_minutes(0.0), 0);
        assert_eq!(whole_minutes(f64::NAN), 0);
    }
}
