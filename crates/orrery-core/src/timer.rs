//! Timer system for Orrery.
//!
//! One-shot and repeating timers ordered by deadline. The host loop owns
//! a [`TimerService`] and periodically drains expired timers with
//! [`TimerService::process_expired`], routing each fired ID to the
//! widget that armed it. Widgets hold a clone of the same service so
//! they can arm and cancel their own timers.
//!
//! A cancelled timer never fires again: cancellation removes it from the
//! table, and the drain step skips queue entries whose timer is gone.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use slotmap::{SlotMap, new_key_type};

use crate::error::{Result, TimerError};

new_key_type! {
    /// A unique identifier for a timer.
    pub struct TimerId;
}

/// The type of timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    /// Fires once after the given duration.
    OneShot,
    /// Fires repeatedly at the given interval.
    Repeating,
}

/// Internal timer record.
#[derive(Debug)]
struct TimerData {
    /// When this timer next fires.
    deadline: Instant,
    /// Re-arm interval for repeating timers.
    interval: Duration,
    kind: TimerKind,
}

/// An entry in the deadline queue (min-heap by deadline).
#[derive(Debug, Clone, Copy)]
struct QueueEntry {
    id: TimerId,
    deadline: Instant,
}

impl PartialEq for QueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.deadline == other.deadline
    }
}

impl Eq for QueueEntry {}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed: BinaryHeap is a max-heap, we want the earliest deadline first.
        other.deadline.cmp(&self.deadline)
    }
}

/// Tracks all timers and drains the ones whose deadline has passed.
#[derive(Debug, Default)]
pub struct TimerManager {
    /// Live timers. Cancellation removes the entry.
    timers: SlotMap<TimerId, TimerData>,
    /// Pending deadlines. May contain entries for cancelled timers; those
    /// are discarded during draining.
    queue: BinaryHeap<QueueEntry>,
}

impl TimerManager {
    /// Create an empty timer manager.
    pub fn new() -> Self {
        Self {
            timers: SlotMap::with_key(),
            queue: BinaryHeap::new(),
        }
    }

    /// Arm a one-shot timer that fires once after `duration`.
    pub fn start_one_shot(&mut self, duration: Duration) -> TimerId {
        self.arm(duration, TimerKind::OneShot)
    }

    /// Arm a repeating timer firing every `interval`, first after `interval`.
    pub fn start_repeating(&mut self, interval: Duration) -> TimerId {
        self.arm(interval, TimerKind::Repeating)
    }

    fn arm(&mut self, interval: Duration, kind: TimerKind) -> TimerId {
        let deadline = Instant::now() + interval;
        let id = self.timers.insert(TimerData {
            deadline,
            interval,
            kind,
        });
        self.queue.push(QueueEntry { id, deadline });
        tracing::trace!(target: "orrery_core::timer", ?id, ?kind, ?interval, "timer armed");
        id
    }

    /// Cancel a timer.
    ///
    /// After this returns, the timer will never fire again.
    pub fn stop(&mut self, id: TimerId) -> Result<()> {
        if self.timers.remove(id).is_some() {
            tracing::trace!(target: "orrery_core::timer", ?id, "timer cancelled");
            Ok(())
        } else {
            Err(TimerError::InvalidTimerId.into())
        }
    }

    /// Check whether a timer is still armed.
    pub fn is_active(&self, id: TimerId) -> bool {
        self.timers.contains_key(id)
    }

    /// Duration until the earliest pending deadline, or `None` when no
    /// timer is armed. Returns `Duration::ZERO` for overdue timers.
    pub fn time_until_next(&mut self) -> Option<Duration> {
        // Discard stale entries for cancelled timers.
        while let Some(entry) = self.queue.peek() {
            if self.timers.contains_key(entry.id) {
                break;
            }
            self.queue.pop();
        }

        let now = Instant::now();
        self.queue
            .peek()
            .map(|entry| entry.deadline.saturating_duration_since(now))
    }

    /// Drain every timer whose deadline has passed, in deadline order.
    ///
    /// One-shot timers are removed; repeating timers are re-armed one
    /// interval from now. Returns the IDs that fired.
    pub fn process_expired(&mut self) -> Vec<TimerId> {
        let now = Instant::now();
        let mut fired = Vec::new();

        while let Some(entry) = self.queue.peek() {
            if entry.deadline > now {
                break;
            }
            let QueueEntry { id, deadline } = self.queue.pop().expect("peeked entry");

            let Some(timer) = self.timers.get_mut(id) else {
                // Cancelled after this entry was queued.
                continue;
            };
            if timer.deadline != deadline {
                // Superseded entry from before a re-arm.
                continue;
            }

            tracing::trace!(target: "orrery_core::timer", ?id, "timer fired");
            fired.push(id);

            match timer.kind {
                TimerKind::OneShot => {
                    self.timers.remove(id);
                }
                TimerKind::Repeating => {
                    timer.deadline = now + timer.interval;
                    let deadline = timer.deadline;
                    self.queue.push(QueueEntry { id, deadline });
                }
            }
        }

        fired
    }

    /// Number of armed timers.
    pub fn active_count(&self) -> usize {
        self.timers.len()
    }
}

/// A cloneable, thread-safe handle to a shared [`TimerManager`].
///
/// The host loop and the widgets it drives hold clones of one service:
/// widgets arm and cancel their own timers through it, the host drains
/// expirations and dispatches the fired IDs as widget events.
#[derive(Clone, Debug, Default)]
pub struct TimerService {
    inner: Arc<Mutex<TimerManager>>,
}

impl TimerService {
    /// Create a service wrapping a fresh [`TimerManager`].
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(TimerManager::new())),
        }
    }

    /// Arm a one-shot timer. See [`TimerManager::start_one_shot`].
    pub fn start_one_shot(&self, duration: Duration) -> TimerId {
        self.inner.lock().start_one_shot(duration)
    }

    /// Arm a repeating timer. See [`TimerManager::start_repeating`].
    pub fn start_repeating(&self, interval: Duration) -> TimerId {
        self.inner.lock().start_repeating(interval)
    }

    /// Cancel a timer. See [`TimerManager::stop`].
    pub fn stop(&self, id: TimerId) -> Result<()> {
        self.inner.lock().stop(id)
    }

    /// Check whether a timer is still armed.
    pub fn is_active(&self, id: TimerId) -> bool {
        self.inner.lock().is_active(id)
    }

    /// Duration until the earliest pending deadline, if any.
    pub fn time_until_next(&self) -> Option<Duration> {
        self.inner.lock().time_until_next()
    }

    /// Drain expired timers. See [`TimerManager::process_expired`].
    pub fn process_expired(&self) -> Vec<TimerId> {
        self.inner.lock().process_expired()
    }

    /// Number of armed timers.
    pub fn active_count(&self) -> usize {
        self.inner.lock().active_count()
    }
}

static_assertions::assert_impl_all!(TimerService: Send, Sync, Clone);

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    #[test]
    fn test_one_shot_fires_once() {
        let mut timers = TimerManager::new();
        let id = timers.start_one_shot(Duration::from_millis(5));
        assert!(timers.is_active(id));

        sleep(Duration::from_millis(10));
        assert_eq!(timers.process_expired(), vec![id]);

        // Gone after firing.
        assert!(!timers.is_active(id));
        assert!(timers.process_expired().is_empty());
    }

    #[test]
    fn test_repeating_rearms() {
        let mut timers = TimerManager::new();
        let id = timers.start_repeating(Duration::from_millis(5));

        sleep(Duration::from_millis(10));
        assert_eq!(timers.process_expired(), vec![id]);
        assert!(timers.is_active(id));

        sleep(Duration::from_millis(10));
        assert_eq!(timers.process_expired(), vec![id]);
    }

    #[test]
    fn test_cancelled_timer_never_fires() {
        let mut timers = TimerManager::new();
        let id = timers.start_repeating(Duration::from_millis(5));
        timers.stop(id).unwrap();

        sleep(Duration::from_millis(10));
        assert!(timers.process_expired().is_empty());
        assert_eq!(timers.active_count(), 0);
    }

    #[test]
    fn test_stop_unknown_id_errors() {
        let mut timers = TimerManager::new();
        let id = timers.start_one_shot(Duration::from_millis(1));
        timers.stop(id).unwrap();
        assert!(timers.stop(id).is_err());
    }

    #[test]
    fn test_not_yet_due_timer_does_not_fire() {
        let mut timers = TimerManager::new();
        let _id = timers.start_one_shot(Duration::from_secs(3600));
        assert!(timers.process_expired().is_empty());
        assert!(timers.time_until_next().unwrap() > Duration::from_secs(3500));
    }

    #[test]
    fn test_service_is_shared() {
        let service = TimerService::new();
        let clone = service.clone();

        let id = service.start_one_shot(Duration::from_millis(5));
        assert!(clone.is_active(id));

        sleep(Duration::from_millis(10));
        assert_eq!(clone.process_expired(), vec![id]);
        assert!(!service.is_active(id));
    }
}
