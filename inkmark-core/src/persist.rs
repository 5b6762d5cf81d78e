//! Debounced hand-off of snapshots to an external writer.
//!
//! Time is passed in explicitly so callers drive the schedule from their own
//! event loop (a timer callback, a poll in the CLI, `Date.now()` in wasm).

use chrono::{DateTime, Duration, Utc};

#[derive(Debug, Clone)]
struct Pending<T> {
    due: DateTime<Utc>,
    payload: T,
}

/// A single-slot scheduled task: scheduling again replaces the payload and
/// resets the deadline, so at most one write is ever pending.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<Pending<T>>,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn from_millis(ms: u64) -> Self {
        Self::new(Duration::milliseconds(ms.min(u64::from(u32::MAX)) as i64))
    }

    /// Schedule `payload` to fire at `now + delay`. Returns `true` when an
    /// earlier pending payload was superseded.
    pub fn schedule(&mut self, payload: T, now: DateTime<Utc>) -> bool {
        let superseded = self.pending.is_some();
        self.pending = Some(Pending {
            due: now + self.delay,
            payload,
        });
        if superseded {
            tracing::trace!(target: "inkmark::persist", "superseded pending save");
        }
        superseded
    }

    /// Take the payload if its deadline has passed.
    pub fn poll(&mut self, now: DateTime<Utc>) -> Option<T> {
        if self.pending.as_ref().is_some_and(|p| p.due <= now) {
            return self.flush();
        }
        None
    }

    /// Take the payload immediately, ignoring the deadline.
    pub fn flush(&mut self) -> Option<T> {
        self.pending.take().map(|p| p.payload)
    }

    /// Drop the pending payload without firing it.
    pub fn cancel(&mut self) -> bool {
        self.pending.take().is_some()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn due(&self) -> Option<DateTime<Utc>> {
        self.pending.as_ref().map(|p| p.due)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(ms: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(ms).unwrap()
    }

    #[test]
    fn test_fires_after_delay() {
        let mut saver = Debouncer::from_millis(500);
        saver.schedule("a", at(1_000));

        assert_eq!(saver.poll(at(1_499)), None);
        assert_eq!(saver.poll(at(1_500)), Some("a"));
        assert_eq!(saver.poll(at(5_000)), None);
    }

    #[test]
    fn test_reschedule_supersedes_and_resets() {
        let mut saver = Debouncer::from_millis(500);
        assert!(!saver.schedule("a", at(0)));
        assert!(saver.schedule("b", at(400)));

        // The first deadline no longer applies.
        assert_eq!(saver.poll(at(600)), None);
        assert_eq!(saver.due(), Some(at(900)));
        assert_eq!(saver.poll(at(900)), Some("b"));
    }

    #[test]
    fn test_flush_and_cancel() {
        let mut saver = Debouncer::from_millis(500);
        saver.schedule(1, at(0));
        assert_eq!(saver.flush(), Some(1));
        assert!(!saver.is_pending());

        saver.schedule(2, at(0));
        assert!(saver.cancel());
        assert_eq!(saver.poll(at(10_000)), None);
    }
}
