//! Debounced auto-save scheduling.
//!
//! The debouncer only decides *when* to save; the caller performs the save
//! (see `Editor::autosave_tick`) and reports back through [`AutoSave::finish`].
//! Time is passed in explicitly so the schedule is deterministic under test.

use std::time::{Duration, Instant};

/// Default idle delay before an auto-save, in seconds.
pub const DEFAULT_AUTOSAVE_DELAY_SECS: u64 = 5;

/// Cancel-and-reschedule debouncer with an in-flight guard.
///
/// Every edit pushes the deadline back by `delay`. A save that is running
/// is never cancelled; edits made meanwhile leave a deadline behind so the
/// next [`AutoSave::poll`] after it finishes saves again.
#[derive(Debug, Clone)]
pub struct AutoSave {
    delay: Duration,
    deadline: Option<Instant>,
    in_flight: bool,
}

impl Default for AutoSave {
    fn default() -> Self {
        Self::new(Duration::from_secs(DEFAULT_AUTOSAVE_DELAY_SECS))
    }
}

impl AutoSave {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
            in_flight: false,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Restart the idle timer after an edit.
    pub fn schedule(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    /// Drop any pending deadline.
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    /// A save is waiting for its deadline.
    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    /// Returns `true` and marks a save in flight when the deadline has
    /// passed and no other save is running.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if !self.in_flight && now >= deadline => self.begin(),
            _ => false,
        }
    }

    /// Start a save right away (e.g. an explicit "save" command). Refused
    /// while another save is in flight.
    pub fn begin(&mut self) -> bool {
        if self.in_flight {
            return false;
        }
        self.in_flight = true;
        self.deadline = None;
        true
    }

    /// Report the outcome of the save started by `poll`/`begin`. A failed
    /// save is retried after another full delay.
    pub fn finish(&mut self, ok: bool, now: Instant) {
        self.in_flight = false;
        if !ok && self.deadline.is_none() {
            self.schedule(now);
        }
    }
}
