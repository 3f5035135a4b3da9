//! Input events delivered to a [`Session`](crate::session::Session).
//!
//! Button handlers, menus and the one-second tick source run in different
//! contexts; they post [`SessionEvent`]s on [`SESSION_EVENTS`] and the task
//! owning the session drains it. The receiver supplies the current instant,
//! so events themselves carry no timestamp.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::{Channel, Receiver, Sender};
use embassy_time::Duration;

use crate::alarms::AlarmKind;

/// Channel capacity for session events
pub const SESSION_EVENT_CAPACITY: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// One-second heartbeat
    Tick,
    /// Advance to the next flight phase
    Advance,
    /// Undo the last phase advance
    Retreat,
    /// Show the next info item, or jump back to the default one
    CycleDisplay { to_default: bool },
    /// New endurance budget; zero disables tracking
    EnduranceInput(Duration),
    /// Mute or unmute an alarm from the menu
    InhibitToggle(AlarmKind),
    /// Acknowledge the visible reminder
    DismissReminder,
    /// Restart the elapsed-time chronometer
    Flyback,
}

/// Global channel for session events
pub static SESSION_EVENTS: Channel<CriticalSectionRawMutex, SessionEvent, SESSION_EVENT_CAPACITY> =
    Channel::new();

/// Helper to get a session event sender
pub fn get_event_sender()
-> Sender<'static, CriticalSectionRawMutex, SessionEvent, SESSION_EVENT_CAPACITY> {
    SESSION_EVENTS.sender()
}

/// Helper to get a session event receiver
pub fn get_event_receiver()
-> Receiver<'static, CriticalSectionRawMutex, SessionEvent, SESSION_EVENT_CAPACITY> {
    SESSION_EVENTS.receiver()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_preserves_order_and_capacity() {
        let channel: Channel<CriticalSectionRawMutex, SessionEvent, SESSION_EVENT_CAPACITY> =
            Channel::new();
        let sender = channel.sender();
        let receiver = channel.receiver();

        sender.try_send(SessionEvent::Advance).unwrap();
        sender
            .try_send(SessionEvent::CycleDisplay { to_default: true })
            .unwrap();

        assert_eq!(receiver.try_receive(), Ok(SessionEvent::Advance));
        assert_eq!(
            receiver.try_receive(),
            Ok(SessionEvent::CycleDisplay { to_default: true })
        );
        assert!(receiver.try_receive().is_err());

        for _ in 0..SESSION_EVENT_CAPACITY {
            sender.try_send(SessionEvent::Tick).unwrap();
        }
        assert!(sender.try_send(SessionEvent::Tick).is_err());
    }
}
