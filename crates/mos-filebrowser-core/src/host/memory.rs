//! In-memory host implementations.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

use tokio::sync::broadcast;
use tracing::trace;

use super::{EventChannel, LocationFragment, Router, SessionStore, TimerHost};
use crate::dispatcher::NavigationIntent;
use crate::error::HostError;
use crate::scheduler::{EngineTask, TimerId};

impl<T: TimerHost + ?Sized> TimerHost for Rc<T> {
    fn set_timeout(&self, delay: Duration, task: EngineTask) -> Result<TimerId, HostError> {
        (**self).set_timeout(delay, task)
    }

    fn clear_timeout(&self, id: TimerId) {
        (**self).clear_timeout(id)
    }
}

#[derive(Debug)]
struct PendingTimer {
    id: TimerId,
    due: Duration,
    task: EngineTask,
}

/// Timers driven by a virtual clock.
///
/// Nothing fires on its own: [`ManualTimers::advance`] moves the clock and
/// returns the timers that came due, in firing order.
#[derive(Debug, Default)]
pub struct ManualTimers {
    now: Cell<Duration>,
    next_id: Cell<u64>,
    pending: RefCell<Vec<PendingTimer>>,
}

impl ManualTimers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time.
    pub fn now(&self) -> Duration {
        self.now.get()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Move the clock forward by `by` and drain every timer due by then.
    pub fn advance(&self, by: Duration) -> Vec<(TimerId, EngineTask)> {
        let now = self.now.get() + by;
        self.now.set(now);

        let mut pending = self.pending.borrow_mut();
        let (mut due, rest): (Vec<_>, Vec<_>) = pending.drain(..).partition(|t| t.due <= now);
        *pending = rest;

        due.sort_by_key(|t| (t.due, t.id));
        due.into_iter().map(|t| (t.id, t.task)).collect()
    }
}

impl TimerHost for ManualTimers {
    fn set_timeout(&self, delay: Duration, task: EngineTask) -> Result<TimerId, HostError> {
        let id = TimerId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.pending.borrow_mut().push(PendingTimer {
            id,
            due: self.now.get() + delay,
            task,
        });
        trace!("manual timer {} due in {:?}", id, delay);
        Ok(id)
    }

    fn clear_timeout(&self, id: TimerId) {
        self.pending.borrow_mut().retain(|t| t.id != id);
    }
}

/// A notification emitted on a [`BroadcastEvents`] channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationEvent {
    pub name: String,
    pub intent: NavigationIntent,
}

/// Event channel backed by a tokio broadcast channel.
#[derive(Debug, Clone)]
pub struct BroadcastEvents {
    sender: broadcast::Sender<NavigationEvent>,
}

impl BroadcastEvents {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to emitted events.
    pub fn subscribe(&self) -> broadcast::Receiver<NavigationEvent> {
        self.sender.subscribe()
    }
}

impl Default for BroadcastEvents {
    fn default() -> Self {
        Self::new(64)
    }
}

impl EventChannel for BroadcastEvents {
    fn emit(&self, event_name: &str, intent: &NavigationIntent) -> Result<(), HostError> {
        // No subscriber is not an error: nobody handled the notification.
        let _ = self.sender.send(NavigationEvent {
            name: event_name.to_string(),
            intent: intent.clone(),
        });
        Ok(())
    }
}

/// Session store kept in memory.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    items: RefCell<HashMap<String, String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_item(&self, key: &str) -> Option<String> {
        self.items.borrow().get(key).cloned()
    }
}

impl SessionStore for MemorySessionStore {
    fn set_item(&self, key: &str, value: &str) -> Result<(), HostError> {
        self.items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Location fragment kept in memory.
#[derive(Debug, Default)]
pub struct MemoryLocation {
    hash: RefCell<String>,
}

impl MemoryLocation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current fragment without the leading `#`.
    pub fn hash(&self) -> String {
        self.hash.borrow().clone()
    }
}

impl LocationFragment for MemoryLocation {
    fn set_hash(&self, fragment: &str) -> Result<(), HostError> {
        *self.hash.borrow_mut() = fragment.trim_start_matches('#').to_string();
        Ok(())
    }
}

/// Router that records every pushed URL.
#[derive(Debug, Default)]
pub struct RecordingRouter {
    visited: RefCell<Vec<String>>,
}

impl RecordingRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn visited(&self) -> Vec<String> {
        self.visited.borrow().clone()
    }
}

impl Router for RecordingRouter {
    fn navigate(&self, url: &str) -> Result<(), HostError> {
        self.visited.borrow_mut().push(url.to_string());
        Ok(())
    }
}
