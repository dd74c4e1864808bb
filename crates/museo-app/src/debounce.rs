// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::time::{Duration, Instant};

/// Single-value relay: the settled value tracks the input, but only after the
/// input has been stable for the full delay. Rapid updates replace the pending
/// value and restart the window, so superseded intermediates are never
/// observed. Dropping the relay cancels any pending propagation.
#[derive(Debug, Clone, PartialEq)]
pub struct Debouncer<T> {
    settled: T,
    pending: Option<(T, Instant)>,
    delay: Duration,
}

impl<T: Clone + PartialEq> Debouncer<T> {
    pub fn new(initial: T, delay: Duration) -> Self {
        Self {
            settled: initial,
            pending: None,
            delay,
        }
    }

    /// The last committed value.
    pub fn settled(&self) -> &T {
        &self.settled
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Record a new input value, discarding any pending one.
    pub fn update(&mut self, value: T, now: Instant) {
        if value == self.settled {
            self.pending = None;
            return;
        }
        self.pending = Some((value, now));
    }

    /// Commit the pending value if its quiet window has elapsed. Returns the
    /// newly settled value exactly once per commit.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        let (_, since) = self.pending.as_ref()?;
        if now.duration_since(*since) < self.delay {
            return None;
        }
        let (value, _) = self.pending.take()?;
        self.settled = value.clone();
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::Debouncer;
    use std::time::{Duration, Instant};

    const DELAY: Duration = Duration::from_millis(400);

    #[test]
    fn settles_only_after_the_quiet_window() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(String::new(), DELAY);

        debouncer.update("monet".to_owned(), start);
        assert_eq!(debouncer.poll(start + Duration::from_millis(399)), None);
        assert_eq!(debouncer.settled(), "");

        assert_eq!(
            debouncer.poll(start + DELAY),
            Some("monet".to_owned())
        );
        assert_eq!(debouncer.settled(), "monet");
    }

    #[test]
    fn rapid_updates_propagate_only_the_last_value_once() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(String::new(), DELAY);

        debouncer.update("m".to_owned(), start);
        debouncer.update("mo".to_owned(), start + Duration::from_millis(100));
        debouncer.update("mon".to_owned(), start + Duration::from_millis(200));

        // window restarts from the last update
        assert_eq!(debouncer.poll(start + Duration::from_millis(550)), None);
        assert_eq!(
            debouncer.poll(start + Duration::from_millis(600)),
            Some("mon".to_owned())
        );
        // committed exactly once
        assert_eq!(debouncer.poll(start + Duration::from_secs(5)), None);
    }

    #[test]
    fn returning_to_the_settled_value_cancels_the_pending_one() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new("monet".to_owned(), DELAY);

        debouncer.update("mone".to_owned(), start);
        assert!(debouncer.is_pending());
        debouncer.update("monet".to_owned(), start + Duration::from_millis(50));
        assert!(!debouncer.is_pending());
        assert_eq!(debouncer.poll(start + Duration::from_secs(1)), None);
    }

    #[test]
    fn poll_without_updates_yields_nothing() {
        let mut debouncer = Debouncer::new(0_u32, DELAY);
        assert_eq!(debouncer.poll(Instant::now()), None);
        assert_eq!(*debouncer.settled(), 0);
    }
}
