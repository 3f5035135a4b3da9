//! Recurring reminder alarms and the single reminder surface they share.
//!
//! Each [`AlarmKind`] has exactly one [`Alarm`] for the life of a session.
//! `active` means the alarm is armed for the current flight leg and
//! `inhibited` means it is armed but muted. The two flags are independent:
//! an inhibited alarm that is still active picks up its periodic schedule
//! again as soon as it is enabled.
//!
//! Firing an alarm selects a vibration pattern, shows (or refreshes) the
//! reminder surface and reschedules the alarm one period later. Only one
//! surface exists; the most recent fire owns its message and hide deadline.

use embassy_time::{Duration, Instant};
use log::debug;

use crate::config::SessionConfig;
use crate::haptics::VibePattern;
use crate::scheduler::{Expired, TimerHandle, TimerQueue, TimerToken};

/// Number of alarm kinds
pub const ALARM_COUNT: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlarmKind {
    CruiseCheck,
    EnduranceLow,
    FlightPlanClose,
}

impl AlarmKind {
    pub const ALL: [AlarmKind; ALARM_COUNT] =
        [Self::CruiseCheck, Self::EnduranceLow, Self::FlightPlanClose];

    pub const fn index(self) -> usize {
        match self {
            Self::CruiseCheck => 0,
            Self::EnduranceLow => 1,
            Self::FlightPlanClose => 2,
        }
    }

    /// Text shown on the reminder surface
    pub const fn message(self) -> &'static str {
        match self {
            Self::CruiseCheck => "Cruise check reminder",
            Self::EnduranceLow => "Fuel reserve low",
            Self::FlightPlanClose => "Have you closed your flight plan ?",
        }
    }

    /// Menu label
    pub const fn title(self) -> &'static str {
        match self {
            Self::CruiseCheck => "Reminders",
            Self::EnduranceLow => "Endurance",
            Self::FlightPlanClose => "Flight plan",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Alarm {
    pub kind: AlarmKind,
    pub inhibited: bool,
    pub active: bool,
    pub important: bool,
    pub message: &'static str,
    pub period: Duration,
    pub auto_hide: Duration,
    timer: Option<TimerHandle>,
}

impl Alarm {
    fn new(kind: AlarmKind, config: &SessionConfig) -> Self {
        let alarm_config = config.alarm(kind);
        Self {
            kind,
            inhibited: alarm_config.inhibited,
            active: false,
            important: alarm_config.important,
            message: kind.message(),
            period: alarm_config.period(),
            auto_hide: alarm_config.auto_hide(),
            timer: None,
        }
    }

    /// Deadline of the next scheduled fire, if one is pending.
    pub fn pending_fire(&self, timers: &TimerQueue) -> Option<Instant> {
        self.timer
            .filter(|handle| timers.is_pending(*handle))
            .and_then(|_| timers.deadline_of(TimerToken::Alarm(self.kind)))
    }
}

/// What the reminder surface is currently showing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReminderSurface {
    pub kind: AlarmKind,
    pub message: &'static str,
    pub important: bool,
    pub hide_at: Instant,
}

/// Reminder content handed to the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlarmPresentation {
    pub message: &'static str,
    pub important: bool,
}

/// Side effect of a fire that the session still has to carry out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fired {
    pub kind: AlarmKind,
    pub pattern: VibePattern,
}

#[derive(Debug)]
pub struct AlarmEngine {
    alarms: [Alarm; ALARM_COUNT],
    surface: Option<ReminderSurface>,
    hide_timer: Option<TimerHandle>,
}

impl AlarmEngine {
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            alarms: AlarmKind::ALL.map(|kind| Alarm::new(kind, config)),
            surface: None,
            hide_timer: None,
        }
    }

    fn alarm_mut(&mut self, kind: AlarmKind) -> &mut Alarm {
        &mut self.alarms[kind.index()]
    }

    pub fn get(&self, kind: AlarmKind) -> &Alarm {
        &self.alarms[kind.index()]
    }

    pub fn is_inhibited(&self, kind: AlarmKind) -> bool {
        self.get(kind).inhibited
    }

    pub fn is_active(&self, kind: AlarmKind) -> bool {
        self.get(kind).active
    }

    /// Arm an alarm; the first fire comes one period from now.
    pub fn start(&mut self, kind: AlarmKind, now: Instant, timers: &mut TimerQueue) {
        self.start_impl(kind, false, now, timers);
    }

    /// Arm an alarm and fire it straight away unless it is inhibited.
    pub fn display(
        &mut self,
        kind: AlarmKind,
        now: Instant,
        timers: &mut TimerQueue,
    ) -> Option<Fired> {
        self.start_impl(kind, true, now, timers)
    }

    fn start_impl(
        &mut self,
        kind: AlarmKind,
        fire_now: bool,
        now: Instant,
        timers: &mut TimerQueue,
    ) -> Option<Fired> {
        let alarm = self.alarm_mut(kind);
        alarm.active = true;
        timers.cancel_slot(&mut alarm.timer);
        if alarm.inhibited {
            debug!(" Alarm {:?} armed while inhibited", kind);
            return None;
        }

        if fire_now {
            Some(self.fire(kind, now, timers))
        } else {
            let period = alarm.period;
            alarm.timer = Some(timers.schedule(now, period, TimerToken::Alarm(kind)));
            None
        }
    }

    /// Disarm an alarm and drop its pending fire.
    pub fn stop(&mut self, kind: AlarmKind, timers: &mut TimerQueue) {
        let alarm = self.alarm_mut(kind);
        if alarm.active {
            debug!(" Alarm {:?} stopped", kind);
        }
        alarm.active = false;
        timers.cancel_slot(&mut alarm.timer);
    }

    /// Mute an alarm without disarming it.
    pub fn inhibit(&mut self, kind: AlarmKind, timers: &mut TimerQueue) {
        let alarm = self.alarm_mut(kind);
        alarm.inhibited = true;
        timers.cancel_slot(&mut alarm.timer);
    }

    /// Unmute an alarm; an armed alarm resumes one period from now.
    pub fn enable(&mut self, kind: AlarmKind, now: Instant, timers: &mut TimerQueue) {
        let alarm = self.alarm_mut(kind);
        alarm.inhibited = false;
        if alarm.active {
            timers.cancel_slot(&mut alarm.timer);
            let period = alarm.period;
            alarm.timer = Some(timers.schedule(now, period, TimerToken::Alarm(kind)));
        }
    }

    /// Menu toggle between [`inhibit`](Self::inhibit) and [`enable`](Self::enable).
    pub fn toggle_inhibit(&mut self, kind: AlarmKind, now: Instant, timers: &mut TimerQueue) {
        if self.is_inhibited(kind) {
            self.enable(kind, now, timers);
        } else {
            self.inhibit(kind, timers);
        }
    }

    /// Handle an expired [`TimerToken::Alarm`] entry.
    ///
    /// Expiries whose handle no longer matches the alarm's pending timer, or
    /// whose alarm has since been stopped or inhibited, are dropped.
    pub fn on_timer(
        &mut self,
        expired: Expired,
        now: Instant,
        timers: &mut TimerQueue,
    ) -> Option<Fired> {
        let TimerToken::Alarm(kind) = expired.token else {
            return None;
        };

        let alarm = self.alarm_mut(kind);
        if alarm.timer != Some(expired.handle) || !alarm.active || alarm.inhibited {
            debug!(" Dropping stale fire of {:?}", kind);
            return None;
        }
        alarm.timer = None;
        Some(self.fire(kind, now, timers))
    }

    fn fire(&mut self, kind: AlarmKind, now: Instant, timers: &mut TimerQueue) -> Fired {
        let alarm = *self.get(kind);
        debug!(" Alarm {:?} fired: {}", kind, alarm.message);

        self.surface = Some(ReminderSurface {
            kind,
            message: alarm.message,
            important: alarm.important,
            hide_at: now + alarm.auto_hide,
        });
        self.hide_timer = Some(timers.schedule(now, alarm.auto_hide, TimerToken::ReminderHide));

        self.alarm_mut(kind).timer =
            Some(timers.schedule(now, alarm.period, TimerToken::Alarm(kind)));

        Fired {
            kind,
            pattern: if alarm.important {
                VibePattern::LongPulse
            } else {
                VibePattern::DoublePulse
            },
        }
    }

    /// Handle an expired [`TimerToken::ReminderHide`] entry.
    pub fn on_hide_timer(&mut self, expired: Expired) {
        if self.hide_timer != Some(expired.handle) {
            debug!(" Dropping stale reminder hide");
            return;
        }
        self.hide_timer = None;
        self.surface = None;
    }

    /// User acknowledged the reminder.
    pub fn dismiss(&mut self, timers: &mut TimerQueue) {
        timers.cancel_slot(&mut self.hide_timer);
        self.surface = None;
    }

    pub fn surface(&self) -> Option<&ReminderSurface> {
        self.surface.as_ref()
    }

    pub fn presentation(&self) -> Option<AlarmPresentation> {
        self.surface.map(|surface| AlarmPresentation {
            message: surface.message,
            important: surface.important,
        })
    }
}
