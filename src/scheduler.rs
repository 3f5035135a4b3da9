//! Single-threaded timer queue driving every deferred callback in a session.
//!
//! The queue holds at most one pending entry per [`TimerToken`]: scheduling a
//! token that is already pending replaces the old entry. Owners keep the
//! returned [`TimerHandle`] and compare it against the handle of an expired
//! entry before acting, so an expiry that outlived its owner is recognisable
//! and can be dropped.

use embassy_time::{Duration, Instant};
use heapless::Vec;
use log::debug;

use crate::alarms::AlarmKind;

/// Upper bound on pending timers; one slot per [`TimerToken`] plus headroom
pub const MAX_PENDING_TIMERS: usize = 8;

/// Identifies who a timer belongs to and what it should do on expiry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerToken {
    /// Periodic fire of one reminder alarm
    Alarm(AlarmKind),
    /// Taxi vibration reminder owned by the current taxi phase
    TaxiReminder,
    /// Return the main display to its default category
    DisplayRevert,
    /// Auto-hide of the reminder surface
    ReminderHide,
}

/// Generation-stamped reference to one scheduled timer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerHandle(u32);

/// A timer whose deadline has passed, handed back to the session for dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Expired {
    pub handle: TimerHandle,
    pub token: TimerToken,
    pub deadline: Instant,
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    handle: TimerHandle,
    token: TimerToken,
    deadline: Instant,
}

/// Deadline-ordered set of pending timers
#[derive(Debug)]
pub struct TimerQueue {
    entries: Vec<Entry, MAX_PENDING_TIMERS>,
    next_generation: u32,
}

impl Default for TimerQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl TimerQueue {
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_generation: 0,
        }
    }

    /// Schedule `token` to expire `after` the given instant.
    ///
    /// Any entry already pending for the same token is replaced.
    pub fn schedule(&mut self, now: Instant, after: Duration, token: TimerToken) -> TimerHandle {
        self.entries.retain(|entry| entry.token != token);

        let handle = TimerHandle(self.next_generation);
        self.next_generation = self.next_generation.wrapping_add(1);

        let deadline = now + after;
        debug!(" Timer {:?} scheduled for {}s", token, deadline.as_secs());
        self.entries
            .push(Entry {
                handle,
                token,
                deadline,
            })
            .ok();
        handle
    }

    /// Cancel a timer. Unknown or already-expired handles are ignored.
    pub fn cancel(&mut self, handle: TimerHandle) {
        self.entries.retain(|entry| entry.handle != handle);
    }

    /// Cancel whatever `slot` holds and clear it.
    pub fn cancel_slot(&mut self, slot: &mut Option<TimerHandle>) {
        if let Some(handle) = slot.take() {
            self.cancel(handle);
        }
    }

    /// Remove and return the earliest entry whose deadline is not after `now`.
    pub fn pop_due(&mut self, now: Instant) -> Option<Expired> {
        let index = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.deadline <= now)
            .min_by_key(|(_, entry)| entry.deadline)
            .map(|(index, _)| index)?;

        let entry = self.entries.remove(index);
        Some(Expired {
            handle: entry.handle,
            token: entry.token,
            deadline: entry.deadline,
        })
    }

    /// Deadline of the pending entry for `token`, if any.
    pub fn deadline_of(&self, token: TimerToken) -> Option<Instant> {
        self.entries
            .iter()
            .find(|entry| entry.token == token)
            .map(|entry| entry.deadline)
    }

    /// Whether `handle` is still pending.
    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.entries.iter().any(|entry| entry.handle == handle)
    }

    /// Number of pending timers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(secs: u64) -> Instant {
        Instant::from_secs(secs)
    }

    #[test]
    fn test_pop_due_in_deadline_order() {
        let mut queue = TimerQueue::new();
        queue.schedule(at(0), Duration::from_secs(10), TimerToken::DisplayRevert);
        queue.schedule(at(0), Duration::from_secs(5), TimerToken::TaxiReminder);

        assert!(queue.pop_due(at(4)).is_none());

        let first = queue.pop_due(at(20)).unwrap();
        assert_eq!(first.token, TimerToken::TaxiReminder);
        let second = queue.pop_due(at(20)).unwrap();
        assert_eq!(second.token, TimerToken::DisplayRevert);
        assert!(queue.pop_due(at(20)).is_none());
    }

    #[test]
    fn test_reschedule_replaces_same_token() {
        let mut queue = TimerQueue::new();
        let first = queue.schedule(at(0), Duration::from_secs(5), TimerToken::ReminderHide);
        let second = queue.schedule(at(1), Duration::from_secs(5), TimerToken::ReminderHide);

        assert_ne!(first, second);
        assert_eq!(queue.len(), 1);
        assert!(!queue.is_pending(first));
        assert_eq!(queue.deadline_of(TimerToken::ReminderHide), Some(at(6)));
    }

    #[test]
    fn test_cancel_is_idempotent() {
        let mut queue = TimerQueue::new();
        let handle = queue.schedule(at(0), Duration::from_secs(5), TimerToken::DisplayRevert);

        queue.cancel(handle);
        queue.cancel(handle);
        assert!(queue.is_empty());

        let mut slot = None;
        queue.cancel_slot(&mut slot);
        assert!(slot.is_none());
    }

    #[test]
    fn test_cancel_after_expiry_is_noop() {
        let mut queue = TimerQueue::new();
        let handle = queue.schedule(at(0), Duration::from_secs(1), TimerToken::TaxiReminder);
        let other = queue.schedule(at(0), Duration::from_secs(9), TimerToken::DisplayRevert);

        assert_eq!(queue.pop_due(at(1)).map(|e| e.handle), Some(handle));
        queue.cancel(handle);
        assert!(queue.is_pending(other));
    }
}
