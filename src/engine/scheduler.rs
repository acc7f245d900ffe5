//! Debouncing of the mutation feed
//!
//! The scheduler never looks at a clock: every transition takes the current [`Instant`], so the
//! host decides what time it is and tests can move time by hand.
use std::time::{Duration, Instant};

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);
pub const DEFAULT_MAX_WAIT: Duration = Duration::from_millis(2000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    Idle,
    /// Waiting for the feed to calm down; `first` is the notification that armed the timer and
    /// `last` the latest one
    AwaitingDebounce { first: Instant, last: Instant },
    Scanning,
}

#[derive(Debug, Clone)]
pub struct Scheduler {
    state: ScanState,
    debounce: Duration,
    max_wait: Duration,
}

impl Scheduler {
    /// `max_wait` is never shorter than `debounce`
    pub fn new(debounce: Duration, max_wait: Duration) -> Self {
        Scheduler {
            state: ScanState::Idle,
            debounce,
            max_wait: max_wait.max(debounce),
        }
    }

    pub fn state(&self) -> ScanState {
        self.state
    }
    pub fn debounce(&self) -> Duration {
        self.debounce
    }
    pub fn max_wait(&self) -> Duration {
        self.max_wait
    }

    /// Something changed. Returns whether the timer was armed or pushed back.
    pub fn notify(&mut self, now: Instant) -> bool {
        match self.state {
            ScanState::Idle => {
                self.state = ScanState::AwaitingDebounce {
                    first: now,
                    last: now,
                };
                true
            }
            ScanState::AwaitingDebounce { first, last } => {
                self.state = ScanState::AwaitingDebounce {
                    first,
                    last: now.max(last),
                };
                true
            }
            ScanState::Scanning => false,
        }
    }

    /// When the pending pass should run
    pub fn deadline(&self) -> Option<Instant> {
        match self.state {
            ScanState::AwaitingDebounce { first, last } => {
                Some((last + self.debounce).min(first + self.max_wait))
            }
            _ => None,
        }
    }

    pub fn is_due(&self, now: Instant) -> bool {
        self.deadline().map_or(false, |x| now >= x)
    }

    /// Moves to `Scanning` when a pass may start now: from `Idle` (a pass asked for directly) or
    /// when the pending pass is due
    pub fn begin_pass(&mut self, now: Instant) -> bool {
        let ready = match self.state {
            ScanState::Idle => true,
            ScanState::AwaitingDebounce { .. } => self.is_due(now),
            ScanState::Scanning => false,
        };
        if ready {
            self.state = ScanState::Scanning;
        }
        ready
    }

    pub fn finish_pass(&mut self) {
        if self.state == ScanState::Scanning {
            self.state = ScanState::Idle;
        }
    }

    /// Drops a pending pass
    pub fn cancel(&mut self) {
        if let ScanState::AwaitingDebounce { .. } = self.state {
            self.state = ScanState::Idle;
        }
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Scheduler::new(DEFAULT_DEBOUNCE, DEFAULT_MAX_WAIT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(x: u64) -> Duration {
        Duration::from_millis(x)
    }

    #[test]
    fn debounce() {
        let t0 = Instant::now();
        let mut scheduler = Scheduler::default();
        assert_eq!(scheduler.deadline(), None);
        assert!(scheduler.notify(t0));
        assert_eq!(scheduler.deadline(), Some(t0 + ms(500)));
        assert!(!scheduler.is_due(t0 + ms(499)));
        assert!(!scheduler.begin_pass(t0 + ms(499)));

        // restarts the timer
        scheduler.notify(t0 + ms(300));
        assert_eq!(scheduler.deadline(), Some(t0 + ms(800)));
        assert!(!scheduler.is_due(t0 + ms(500)));
        assert!(scheduler.begin_pass(t0 + ms(800)));
        assert_eq!(scheduler.state(), ScanState::Scanning);
        scheduler.finish_pass();
        assert_eq!(scheduler.state(), ScanState::Idle);
    }

    #[test]
    fn bursts_are_capped() {
        let t0 = Instant::now();
        let mut scheduler = Scheduler::default();
        for i in 0..10 {
            scheduler.notify(t0 + ms(i * 400));
        }
        assert_eq!(scheduler.deadline(), Some(t0 + ms(2000)));
        assert!(scheduler.is_due(t0 + ms(2000)));
    }

    #[test]
    fn no_reentry() {
        let t0 = Instant::now();
        let mut scheduler = Scheduler::default();
        assert!(scheduler.begin_pass(t0));
        assert!(!scheduler.notify(t0));
        assert!(!scheduler.begin_pass(t0 + ms(10_000)));
        assert_eq!(scheduler.deadline(), None);
        scheduler.finish_pass();
        assert!(scheduler.notify(t0 + ms(1)));
    }

    #[test]
    fn cancel_and_clamp() {
        let t0 = Instant::now();
        let mut scheduler = Scheduler::new(ms(1000), ms(100));
        assert_eq!(scheduler.max_wait(), ms(1000));
        scheduler.notify(t0);
        scheduler.cancel();
        assert_eq!(scheduler.state(), ScanState::Idle);
        assert!(!scheduler.is_due(t0 + ms(5000)));
    }
}
