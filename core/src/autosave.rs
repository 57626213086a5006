//! Coalescing autosave scheduler.
//!
//! The first state change after a flush arms a deadline `delay` in the
//! future. Later changes fold into that same deadline, so a burst of
//! purchases costs one write. The tick loop polls; it never blocks on a
//! save and never depends on whether the save succeeded.

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct Debouncer {
    delay:     Duration,
    deadline:  Option<Instant>,
    coalesced: u32,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self { delay, deadline: None, coalesced: 0 }
    }

    /// Record a state change at `now`.
    pub fn notify(&mut self, now: Instant) {
        match self.deadline {
            Some(_) => self.coalesced += 1,
            None => {
                self.deadline = Some(now + self.delay);
                self.coalesced = 0;
            }
        }
    }

    /// True exactly once per armed deadline, when `now` reaches it.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                if self.coalesced > 0 {
                    log::debug!("autosave firing, {} change(s) coalesced", self.coalesced);
                }
                self.deadline = None;
                self.coalesced = 0;
                true
            }
            _ => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Drop any pending save (teardown).
    pub fn cancel(&mut self) {
        self.deadline = None;
        self.coalesced = 0;
    }
}
