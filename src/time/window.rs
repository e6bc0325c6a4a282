use chrono::{DateTime, Utc};
use std::time::Duration;

/// Largest delay a timer is asked to wait. Timers that store their delay in a
/// signed 32-bit millisecond field fire immediately when given more.
pub const MAX_TIMER_DELAY: Duration = Duration::from_millis(i32::MAX as u64);

/// Where `now` falls relative to an event's scheduled start and end.
///
/// `has_started` and `has_ended` are `None` when the corresponding timestamp
/// is unknown, or when the event is not live at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    /// `now >= start`
    pub has_started: Option<bool>,
    /// `now >= end`
    pub has_ended: Option<bool>,
    /// Scheduled start
    pub start_time: Option<DateTime<Utc>>,
    /// Scheduled end
    pub end_time: Option<DateTime<Utc>>,
}

impl TimeWindow {
    /// Evaluates the window at `now`. Start and end are ignored for non-live events.
    pub fn evaluate(
        is_live: bool,
        start_time: Option<DateTime<Utc>>,
        end_time: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Self {
        if !is_live {
            return Self {
                has_started: None,
                has_ended: None,
                start_time: None,
                end_time: None,
            };
        }

        Self {
            has_started: start_time.map(|start| now >= start),
            has_ended: end_time.map(|end| now >= end),
            start_time,
            end_time,
        }
    }

    /// Whether a timer is needed for the start transition.
    pub fn awaits_start(&self) -> bool {
        self.has_started == Some(false)
    }

    /// Whether a timer is needed for the end transition.
    pub fn awaits_end(&self) -> bool {
        self.has_ended == Some(false)
    }
}

/// Time to wait from `now` until `target` has passed, plus `grace`.
///
/// Never negative and never above [`MAX_TIMER_DELAY`].
pub fn delay_till(target: DateTime<Utc>, now: DateTime<Utc>, grace: Duration) -> Duration {
    let grace_ms = i64::try_from(grace.as_millis()).unwrap_or(i64::MAX);
    let raw = (target - now).num_milliseconds().saturating_add(grace_ms);
    let max = MAX_TIMER_DELAY.as_millis() as i64;
    Duration::from_millis(raw.clamp(0, max) as u64)
}
