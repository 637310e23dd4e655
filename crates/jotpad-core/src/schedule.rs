use std::time::{Duration, Instant};

/// A single slot holding at most one deferred task.
///
/// Arming replaces whatever was pending, so at most one task is ever
/// outstanding. The owner polls [`DeferredTask::take_due`] with the current
/// time and runs the returned task itself.
#[derive(Clone, Debug)]
pub struct DeferredTask<T> {
    slot: Option<(Instant, T)>,
}

impl<T> Default for DeferredTask<T> {
    fn default() -> Self {
        Self { slot: None }
    }
}

impl<T> DeferredTask<T> {
    pub const fn new() -> Self {
        Self { slot: None }
    }

    /// Schedule `task` to become due `delay` after `now`, returning the task
    /// it cancelled, if any.
    pub fn arm(&mut self, now: Instant, delay: Duration, task: T) -> Option<T> {
        let deadline = now.checked_add(delay).unwrap_or(now);
        self.slot.replace((deadline, task)).map(|(_, old)| old)
    }

    pub fn cancel(&mut self) -> Option<T> {
        self.slot.take().map(|(_, task)| task)
    }

    pub const fn is_armed(&self) -> bool {
        self.slot.is_some()
    }

    /// Time left until the pending task is due; zero once it is overdue.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.slot
            .as_ref()
            .map(|(deadline, _)| deadline.saturating_duration_since(now))
    }

    pub fn take_due(&mut self, now: Instant) -> Option<T> {
        match &self.slot {
            Some((deadline, _)) if *deadline <= now => self.cancel(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DELAY: Duration = Duration::from_millis(3000);

    #[test]
    fn fires_once_after_delay() {
        let t0 = Instant::now();
        let mut task = DeferredTask::new();
        assert!(task.arm(t0, DELAY, 1).is_none());

        assert_eq!(task.take_due(t0 + Duration::from_millis(2999)), None);
        assert_eq!(task.take_due(t0 + DELAY), Some(1));
        assert_eq!(task.take_due(t0 + DELAY * 2), None);
        assert!(!task.is_armed());
    }

    #[test]
    fn rearm_cancels_predecessor_and_pushes_deadline() {
        let t0 = Instant::now();
        let mut task = DeferredTask::new();
        task.arm(t0, DELAY, "first");

        let later = t0 + Duration::from_millis(2000);
        assert_eq!(task.arm(later, DELAY, "second"), Some("first"));

        assert_eq!(task.take_due(t0 + DELAY), None);
        assert_eq!(task.remaining(t0 + DELAY), Some(Duration::from_millis(2000)));
        assert_eq!(task.take_due(later + DELAY), Some("second"));
    }

    #[test]
    fn remaining_saturates_and_cancel_empties() {
        let t0 = Instant::now();
        let mut task = DeferredTask::new();
        assert_eq!(task.remaining(t0), None);

        task.arm(t0, DELAY, ());
        assert_eq!(task.remaining(t0 + DELAY * 2), Some(Duration::ZERO));
        assert_eq!(task.cancel(), Some(()));
        assert_eq!(task.remaining(t0), None);
    }
}
