use super::*;
use crate::error::HostError;
use crate::host::memory::ManualTimers;

const TASK: EngineTask = EngineTask::Rescan(ScanReason::Mutation);

fn slot() -> DebounceSlot {
    DebounceSlot::new("rebuild", Duration::from_millis(300), TASK)
}

struct RefusingTimers;

impl TimerHost for RefusingTimers {
    fn set_timeout(&self, _delay: Duration, _task: EngineTask) -> Result<TimerId, HostError> {
        Err(HostError::Timer("no event loop".to_string()))
    }

    fn clear_timeout(&self, _id: TimerId) {}
}

#[test]
fn test_schedule_sets_pending() {
    let timers = ManualTimers::new();
    let mut slot = slot();
    assert!(!slot.is_pending());

    let id = slot.schedule(&timers).unwrap();
    assert_eq!(slot.pending(), Some(id));
    assert_eq!(timers.pending_count(), 1);
    assert_eq!(slot.delay(), Duration::from_millis(300));
    assert_eq!(slot.name(), "rebuild");
}

#[test]
fn test_reschedule_cancels_previous() {
    let timers = ManualTimers::new();
    let mut slot = slot();

    let first = slot.schedule(&timers).unwrap();
    timers.advance(Duration::from_millis(200));
    let second = slot.schedule(&timers).unwrap();

    assert_ne!(first, second);
    assert_eq!(timers.pending_count(), 1);

    // The first deadline (300ms) passes without firing.
    assert!(timers.advance(Duration::from_millis(200)).is_empty());
    let fired = timers.advance(Duration::from_millis(100));
    assert_eq!(fired, vec![(second, TASK)]);
}

#[test]
fn test_cancel_pending() {
    let timers = ManualTimers::new();
    let mut slot = slot();
    slot.schedule(&timers);
    slot.cancel_pending(&timers);

    assert!(!slot.is_pending());
    assert_eq!(timers.pending_count(), 0);
    // Cancelling an idle slot is a no-op.
    slot.cancel_pending(&timers);
}

#[test]
fn test_complete_current_and_stale() {
    let timers = ManualTimers::new();
    let mut slot = slot();
    let first = slot.schedule(&timers).unwrap();
    let second = slot.schedule(&timers).unwrap();

    assert!(!slot.complete(first));
    assert!(slot.is_pending());
    assert!(slot.complete(second));
    assert!(!slot.is_pending());
    assert!(!slot.complete(second));
}

#[test]
fn test_schedule_refused_by_host() {
    let mut slot = slot();
    assert!(slot.schedule(&RefusingTimers).is_none());
    assert!(!slot.is_pending());
}

#[test]
fn test_scan_reason_display() {
    assert_eq!(ScanReason::Initial.to_string(), "initial");
    assert_eq!(ScanReason::Mutation.to_string(), "mutation");
    assert_eq!(
        ScanReason::Navigation(NavigationKind::HashChange).to_string(),
        "navigation:hashchange"
    );
    assert_eq!(TimerId(7).to_string(), "timer-7");
}
