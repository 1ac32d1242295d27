//! Caller-side session bookkeeping for `focuseye monitor`.
//!
//! The engine is stateless; every check carries the counters below, and the
//! resets happen here once a result comes back.

use focuseye_core::counters::IntervalDefaults;
use focuseye_core::{CounterInput, Notification, Status};

/// Outcome of one check, as far as the counters care.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CheckOutcome {
    pub status: Status,
    pub notification: Option<Notification>,
}

#[derive(Debug, Clone)]
pub struct SessionCounters {
    scene: String,
    intervals: IntervalDefaults,
    /// Expected minutes between two checks
    step_minutes: f64,
    check_count: u64,
    running_secs: f64,
    focus_secs: f64,
    continuous_focus_minutes: f64,
    incremental_focus_minutes: f64,
    incremental_rest_minutes: f64,
    last_status: Option<Status>,
}

impl SessionCounters {
    pub fn new(scene: &str, intervals: IntervalDefaults, step_minutes: f64) -> Self {
        Self {
            scene: scene.to_string(),
            intervals,
            step_minutes,
            check_count: 0,
            running_secs: 0.0,
            focus_secs: 0.0,
            continuous_focus_minutes: 0.0,
            incremental_focus_minutes: 0.0,
            incremental_rest_minutes: 0.0,
            last_status: None,
        }
    }

    /// Credit the time since the previous check. Focus time accrues only if
    /// the previous check found the user focused.
    pub fn advance(&mut self, elapsed_secs: f64) {
        self.running_secs += elapsed_secs;
        if self.last_status == Some(Status::Focused) {
            let minutes = elapsed_secs / 60.0;
            self.focus_secs += elapsed_secs;
            self.continuous_focus_minutes += minutes;
            self.incremental_focus_minutes += minutes;
            self.incremental_rest_minutes += minutes;
        }
    }

    /// Counters for the next request.
    pub fn snapshot(&self, current_time: &str) -> CounterInput {
        let rest_interval = f64::from(self.intervals.rest_reminder_interval);
        CounterInput {
            check_count: self.check_count + 1,
            running_time: format_duration(self.running_secs),
            focus_time: format_duration(self.focus_secs),
            current_time: current_time.to_string(),
            total_focus_minutes: self.focus_secs / 60.0,
            continuous_focus_minutes: self.continuous_focus_minutes,
            incremental_focus_minutes: self.incremental_focus_minutes,
            incremental_rest_minutes: self.incremental_rest_minutes,
            encouragement_interval: Some(self.intervals.encouragement_interval),
            rest_reminder_interval: Some(self.intervals.rest_reminder_interval),
            // a rest reminder is due on the next check anyway
            suppress_encouragement: self.incremental_rest_minutes + self.step_minutes
                >= rest_interval,
            scene: Some(self.scene.clone()),
        }
    }

    /// Apply the resets a delivered result implies. An `error` status is no
    /// observation at all: counters and the last known status stay as they
    /// were.
    pub fn record(&mut self, outcome: CheckOutcome) {
        self.check_count += 1;
        if outcome.status == Status::Error {
            return;
        }
        match outcome.notification {
            Some(Notification::RestReminder) => self.incremental_rest_minutes = 0.0,
            Some(Notification::Encouragement) => self.incremental_focus_minutes = 0.0,
            Some(Notification::Routine) | None => {}
        }
        if outcome.status != Status::Focused {
            self.continuous_focus_minutes = 0.0;
            self.incremental_focus_minutes = 0.0;
        }
        self.last_status = Some(outcome.status);
    }
}

/// `HH:MM:SS`, hours not capped at 24.
pub fn format_duration(secs: f64) -> String {
    let total = if secs.is_finite() && secs > 0.0 { secs as u64 } else { 0 };
    format!("{:02}:{:02}:{:02}", total / 3600, (total % 3600) / 60, total % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn focused(notification: Option<Notification>) -> CheckOutcome {
        CheckOutcome {
            status: Status::Focused,
            notification,
        }
    }

    fn session() -> SessionCounters {
        SessionCounters::new(
            "homework",
            IntervalDefaults {
                encouragement_interval: 20,
                rest_reminder_interval: 45,
            },
            1.0,
        )
    }

    #[test]
    fn formats_durations() {
        assert_eq!(format_duration(0.0), "00:00:00");
        assert_eq!(format_duration(3725.9), "01:02:05");
        assert_eq!(format_duration(-3.0), "00:00:00");
    }

    #[test]
    fn focus_accrues_only_after_a_focused_check() {
        let mut s = session();
        s.advance(60.0);
        let first = s.snapshot("09:00:00");
        assert_eq!(first.check_count, 1);
        assert_eq!(first.running_time, "00:01:00");
        assert_eq!(first.total_focus_minutes, 0.0);

        s.record(focused(Some(Notification::Routine)));
        s.advance(120.0);
        let second = s.snapshot("09:02:00");
        assert_eq!(second.check_count, 2);
        assert_eq!(second.focus_time, "00:02:00");
        assert_eq!(second.continuous_focus_minutes, 2.0);
        assert_eq!(second.incremental_rest_minutes, 2.0);
        assert_eq!(second.scene.as_deref(), Some("homework"));
    }

    #[test]
    fn distraction_resets_continuous_but_not_rest_counter() {
        let mut s = session();
        s.record(focused(None));
        s.advance(600.0);
        s.record(CheckOutcome {
            status: Status::Distracted,
            notification: Some(Notification::Routine),
        });
        s.advance(60.0);

        let snapshot = s.snapshot("");
        assert_eq!(snapshot.continuous_focus_minutes, 0.0);
        assert_eq!(snapshot.incremental_focus_minutes, 0.0);
        assert_eq!(snapshot.incremental_rest_minutes, 10.0);
        assert_eq!(snapshot.total_focus_minutes, 10.0);
    }

    #[test]
    fn notifications_reset_their_own_counter() {
        let mut s = session();
        s.record(focused(None));
        s.advance(1500.0);

        s.record(focused(Some(Notification::Encouragement)));
        let after_encouragement = s.snapshot("");
        assert_eq!(after_encouragement.incremental_focus_minutes, 0.0);
        assert_eq!(after_encouragement.continuous_focus_minutes, 25.0);
        assert_eq!(after_encouragement.incremental_rest_minutes, 25.0);

        s.record(focused(Some(Notification::RestReminder)));
        let after_rest = s.snapshot("");
        assert_eq!(after_rest.incremental_rest_minutes, 0.0);
        assert_eq!(after_rest.total_focus_minutes, 25.0);
    }

    #[test]
    fn failed_check_keeps_the_focus_streak() {
        let mut s = session();
        s.record(focused(None));
        s.advance(600.0);
        s.record(CheckOutcome {
            status: Status::Error,
            notification: None,
        });
        s.advance(60.0);

        let snapshot = s.snapshot("");
        assert_eq!(snapshot.check_count, 3);
        assert_eq!(snapshot.continuous_focus_minutes, 11.0);
        assert_eq!(snapshot.incremental_focus_minutes, 11.0);
        assert_eq!(snapshot.total_focus_minutes, 11.0);
    }

    #[test]
    fn encouragement_is_suppressed_right_before_a_rest_reminder() {
        let mut s = session();
        s.record(focused(None));
        s.advance(43.0 * 60.0);
        assert!(!s.snapshot("").suppress_encouragement);

        s.advance(60.0);
        assert!(s.snapshot("").suppress_encouragement);
    }
}
