//! Flightwatch: flight-phase tracking and reminder alarms for a wrist watch.
//!
//! The crate is hardware-independent and `no_std`. A platform layer owns a
//! [`Session`], feeds it one tick per second and the user's button presses
//! (directly or through [`events::SESSION_EVENTS`]) and renders what the
//! session reports back:
//!
//! - the main info item (flight time, endurance, block times) via
//!   [`Session::display_text`]
//! - taxi and in-flight indicators
//! - the reminder surface for the recurring alarms
//! - the "ET" chronometer, UTC clock and day of month
//!
//! All instants are seconds since the UTC epoch.

#![cfg_attr(not(test), no_std)]

pub mod alarms;
pub mod config;
pub mod display_rotation;
pub mod events;
pub mod haptics;
pub mod info;
pub mod mission;
pub mod scheduler;
pub mod session;
pub mod stopwatch;
pub mod time_format;

pub use alarms::{AlarmKind, AlarmPresentation};
pub use config::{AlarmConfig, ConfigError, SessionConfig};
pub use events::{SESSION_EVENTS, SessionEvent, get_event_receiver, get_event_sender};
pub use haptics::{Haptics, NoHaptics, VibePattern};
pub use info::InfoCategory;
pub use mission::Phase;
pub use session::Session;
