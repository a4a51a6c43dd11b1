//! Single-slot deferred scheduling.
//!
//! A [`DebounceSlot`] holds at most one pending timer. Scheduling again
//! cancels the pending timer first, so a burst of requests collapses into one
//! task that fires `delay` after the last request.

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;

use std::fmt;
use std::time::Duration;

use tracing::{debug, warn};

use crate::host::TimerHost;
use crate::lifecycle::NavigationKind;

/// Identifier of a scheduled timer, unique per [`TimerHost`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(pub u64);

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "timer-{}", self.0)
    }
}

/// Why a scan runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanReason {
    /// First scan after the document became ready.
    Initial,
    /// Debounced rebuild after nodes were added.
    Mutation,
    /// Settled rebuild after a route change.
    Navigation(NavigationKind),
}

impl fmt::Display for ScanReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanReason::Initial => f.write_str("initial"),
            ScanReason::Mutation => f.write_str("mutation"),
            ScanReason::Navigation(kind) => write!(f, "navigation:{}", kind),
        }
    }
}

/// Work carried by a timer and handed back to the loader when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineTask {
    Rescan(ScanReason),
}

/// Scheduler owning at most one pending timer.
#[derive(Debug)]
pub struct DebounceSlot {
    name: &'static str,
    delay: Duration,
    task: EngineTask,
    pending: Option<TimerId>,
}

impl DebounceSlot {
    pub fn new(name: &'static str, delay: Duration, task: EngineTask) -> Self {
        Self {
            name,
            delay,
            task,
            pending: None,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn pending(&self) -> Option<TimerId> {
        self.pending
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Cancel the pending timer, if any, and start a new one.
    ///
    /// Returns `None` when the host refused the timer; the slot is then idle.
    pub fn schedule(&mut self, timers: &dyn TimerHost) -> Option<TimerId> {
        self.cancel_pending(timers);
        match timers.set_timeout(self.delay, self.task) {
            Ok(id) => {
                debug!("{} slot scheduled {} in {:?}", self.name, id, self.delay);
                self.pending = Some(id);
                Some(id)
            }
            Err(e) => {
                warn!("{} slot could not schedule: {}", self.name, e);
                None
            }
        }
    }

    /// Cancel the pending timer, if any.
    pub fn cancel_pending(&mut self, timers: &dyn TimerHost) {
        if let Some(id) = self.pending.take() {
            timers.clear_timeout(id);
            debug!("{} slot cancelled {}", self.name, id);
        }
    }

    /// Acknowledge a fired timer.
    ///
    /// Returns `true` when `id` is the slot's current timer. A stale id (a
    /// timer that fired although it was replaced) returns `false` and leaves
    /// the current timer pending.
    pub fn complete(&mut self, id: TimerId) -> bool {
        if self.pending == Some(id) {
            self.pending = None;
            true
        } else {
            debug!("{} slot ignoring stale {}", self.name, id);
            false
        }
    }
}
