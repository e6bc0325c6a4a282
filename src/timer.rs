//! One-shot timers that can be cancelled, used for live state transitions.

use log::trace;
use std::time::Duration;
use tokio::task::JoinHandle;

/// A callback that runs once after a delay unless cancelled first.
///
/// Dropping the task cancels it.
#[derive(Debug)]
pub struct ScheduledTask {
    delay: Duration,
    handle: JoinHandle<()>,
}

impl ScheduledTask {
    /// Schedules `f` to run after `delay`. Must be called within a Tokio runtime.
    pub fn spawn<F>(delay: Duration, f: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        // Deadline is fixed now, not when the task first gets polled
        let sleep = tokio::time::sleep(delay);
        let handle = tokio::spawn(async move {
            sleep.await;
            f();
        });
        Self { delay, handle }
    }

    /// The delay this task was scheduled with
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Cancels the task if it has not fired yet.
    pub fn cancel(&self) {
        self.handle.abort();
    }

    /// Whether the task has fired or was cancelled.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for ScheduledTask {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// The (at most two) timers waiting for a live event to start or end.
#[derive(Debug, Default)]
pub struct TransitionTimers {
    start: Option<ScheduledTask>,
    end: Option<ScheduledTask>,
}

impl TransitionTimers {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the start timer, cancelling the previous one.
    pub fn schedule_start<F>(&mut self, delay: Duration, f: F)
    where
        F: FnOnce() + Send + 'static,
    {
        trace!("Scheduling start transition in {:?}", delay);
        self.start = Some(ScheduledTask::spawn(delay, f));
    }

    /// Replaces the end timer, cancelling the previous one.
    pub fn schedule_end<F>(&mut self, delay: Duration, f: F)
    where
        F: FnOnce() + Send + 'static,
    {
        trace!("Scheduling end transition in {:?}", delay);
        self.end = Some(ScheduledTask::spawn(delay, f));
    }

    /// Cancels both timers.
    pub fn cancel_all(&mut self) {
        self.start = None;
        self.end = None;
    }

    /// Number of timers that have not fired yet.
    pub fn pending(&self) -> usize {
        [&self.start, &self.end]
            .into_iter()
            .flatten()
            .filter(|t| !t.is_finished())
            .count()
    }
}
