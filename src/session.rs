//! One flight session: the phase machine together with every component its
//! phases drive.
//!
//! A [`Session`] is the single owner of the flight state. The platform feeds
//! it a tick once per second plus the user's intents, always together with
//! the current instant; the session never reads a clock itself.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Receiver;
use embassy_time::{Duration, Instant};
use heapless::String;
use log::{debug, info};

use crate::alarms::{AlarmEngine, AlarmKind, AlarmPresentation, Fired};
use crate::config::{ConfigError, SessionConfig};
use crate::display_rotation::DisplayRotation;
use crate::events::{SESSION_EVENT_CAPACITY, SessionEvent};
use crate::haptics::Haptics;
use crate::info::{InfoCategory, InfoRegistry, Label};
use crate::mission::{Phase, PhaseMachine};
use crate::scheduler::{Expired, TimerQueue, TimerToken};
use crate::stopwatch::ElapsedTimer;
use crate::time_format::{self, DisplayText};

/// Components the flight phases act on
#[derive(Debug)]
pub struct Cockpit<H: Haptics> {
    pub(crate) config: SessionConfig,
    pub(crate) info: InfoRegistry,
    pub(crate) alarms: AlarmEngine,
    pub(crate) rotation: DisplayRotation,
    pub(crate) timers: TimerQueue,
    pub(crate) haptics: H,
}

impl<H: Haptics> Cockpit<H> {
    pub(crate) fn new(config: SessionConfig, haptics: H) -> Self {
        Self {
            info: InfoRegistry::new(),
            alarms: AlarmEngine::new(&config),
            rotation: DisplayRotation::new(config.display_revert()),
            timers: TimerQueue::new(),
            haptics,
            config,
        }
    }

    /// Carry out what a fired alarm asks for.
    pub(crate) fn apply_fire(&mut self, fired: Fired) {
        self.haptics.vibrate(fired.pattern);
        if fired.kind == AlarmKind::EnduranceLow && self.info.is_active(InfoCategory::Endurance) {
            self.rotation.force(InfoCategory::Endurance, &self.info, &mut self.timers);
        }
    }

    /// Stop the low endurance alarm and give the main display back to
    /// flight time.
    pub(crate) fn stop_endurance_alarm(&mut self) {
        if !self.alarms.is_active(AlarmKind::EnduranceLow) {
            return;
        }
        self.alarms.stop(AlarmKind::EnduranceLow, &mut self.timers);
        if self.rotation.default_category() == InfoCategory::Endurance {
            self.rotation
                .force(InfoCategory::FlightTime, &self.info, &mut self.timers);
        }
    }
}

pub struct Session<H: Haptics> {
    cockpit: Cockpit<H>,
    mission: PhaseMachine,
    stopwatch: ElapsedTimer,
}

impl<H: Haptics> Session<H> {
    /// Start a session in [`Phase::Preflight`].
    pub fn new(config: SessionConfig, haptics: H, now: Instant) -> Result<Self, ConfigError> {
        config.validate()?;
        info!(" Flight session started");
        Ok(Self {
            cockpit: Cockpit::new(config, haptics),
            mission: PhaseMachine::new(),
            stopwatch: ElapsedTimer::new(now),
        })
    }

    /// Run every timer due by `now`, then the current phase's tick.
    pub fn on_tick(&mut self, now: Instant) {
        while let Some(expired) = self.cockpit.timers.pop_due(now) {
            self.dispatch_timer(expired, now);
        }
        self.mission.tick(now, &mut self.cockpit);
    }

    fn dispatch_timer(&mut self, expired: Expired, now: Instant) {
        let cockpit = &mut self.cockpit;
        match expired.token {
            TimerToken::Alarm(_) => {
                if let Some(fired) = cockpit.alarms.on_timer(expired, now, &mut cockpit.timers) {
                    cockpit.apply_fire(fired);
                }
            }
            TimerToken::TaxiReminder => self.mission.on_taxi_reminder(expired, now, cockpit),
            TimerToken::DisplayRevert => cockpit.rotation.on_revert_timer(expired, &cockpit.info),
            TimerToken::ReminderHide => cockpit.alarms.on_hide_timer(expired),
        }
    }

    pub fn on_advance(&mut self, now: Instant) {
        self.mission.advance(now, &mut self.cockpit);
    }

    pub fn on_retreat(&mut self, now: Instant) {
        self.mission.retreat(now, &mut self.cockpit);
    }

    pub fn on_cycle_display(&mut self, to_default_only: bool, now: Instant) {
        let cockpit = &mut self.cockpit;
        cockpit
            .rotation
            .cycle_next(to_default_only, &cockpit.info, now, &mut cockpit.timers);
    }

    /// Endurance budget counted from take-off; zero disables tracking.
    pub fn on_endurance_input(&mut self, budget: Duration, now: Instant) {
        self.mission.set_endurance(budget, now, &mut self.cockpit);
    }

    pub fn on_inhibit_toggle(&mut self, kind: AlarmKind, now: Instant) {
        let cockpit = &mut self.cockpit;
        cockpit.alarms.toggle_inhibit(kind, now, &mut cockpit.timers);
        info!(
            " {} {}",
            kind.title(),
            if cockpit.alarms.is_inhibited(kind) {
                "inhibited"
            } else {
                "enabled"
            }
        );
    }

    pub fn on_dismiss_reminder(&mut self) {
        self.cockpit.alarms.dismiss(&mut self.cockpit.timers);
    }

    pub fn on_flyback(&mut self, now: Instant) {
        self.stopwatch.flyback(now);
    }

    /// Apply one queued input.
    pub fn handle_event(&mut self, event: SessionEvent, now: Instant) {
        debug!(" Handling {:?}", event);
        match event {
            SessionEvent::Tick => self.on_tick(now),
            SessionEvent::Advance => self.on_advance(now),
            SessionEvent::Retreat => self.on_retreat(now),
            SessionEvent::CycleDisplay { to_default } => self.on_cycle_display(to_default, now),
            SessionEvent::EnduranceInput(budget) => self.on_endurance_input(budget, now),
            SessionEvent::InhibitToggle(kind) => self.on_inhibit_toggle(kind, now),
            SessionEvent::DismissReminder => self.on_dismiss_reminder(),
            SessionEvent::Flyback => self.on_flyback(now),
        }
    }

    /// Apply every event already waiting on `receiver`, returning how many
    /// were handled.
    pub fn drain_events(
        &mut self,
        receiver: &Receiver<'_, CriticalSectionRawMutex, SessionEvent, SESSION_EVENT_CAPACITY>,
        now: Instant,
    ) -> usize {
        let mut handled = 0;
        while let Ok(event) = receiver.try_receive() {
            self.handle_event(event, now);
            handled += 1;
        }
        handled
    }

    /// Session task: wait for events forever, stamping each with `clock()`.
    pub async fn run<C>(
        &mut self,
        receiver: Receiver<'_, CriticalSectionRawMutex, SessionEvent, SESSION_EVENT_CAPACITY>,
        mut clock: C,
    ) where
        C: FnMut() -> Instant,
    {
        info!(" Session task started");
        loop {
            let event = receiver.receive().await;
            self.handle_event(event, clock());
        }
    }

    pub fn phase(&self) -> Phase {
        self.mission.phase()
    }

    /// Label and text of the main display.
    pub fn display_text(&self) -> (&Label, &DisplayText) {
        self.cockpit.rotation.text(&self.cockpit.info)
    }

    pub fn current_category(&self) -> InfoCategory {
        self.cockpit.rotation.current()
    }

    pub fn live_indicator_visible(&self) -> bool {
        self.mission.live_indicator_visible()
    }

    pub fn blink_state(&self) -> bool {
        self.mission.taxi_blink()
    }

    pub fn alarm_presentation(&self) -> Option<AlarmPresentation> {
        self.cockpit.alarms.presentation()
    }

    pub fn is_alarm_inhibited(&self, kind: AlarmKind) -> bool {
        self.cockpit.alarms.is_inhibited(kind)
    }

    pub fn endurance_budget(&self) -> Option<Duration> {
        self.mission.endurance_budget()
    }

    pub fn elapsed_text(&self, now: Instant) -> DisplayText {
        self.stopwatch.text(now)
    }

    pub fn elapsed_start_minute(&self, now: Instant) -> Option<String<2>> {
        self.stopwatch.start_minute(now)
    }

    /// UTC wall clock, "HHMM".
    pub fn clock_text(&self, now: Instant) -> String<4> {
        time_format::clock_hhmm(now)
    }

    /// UTC day of month, "DD".
    pub fn day_text(&self, now: Instant) -> String<2> {
        time_format::day_dd(now)
    }

    pub fn info(&self) -> &InfoRegistry {
        &self.cockpit.info
    }

    pub fn alarms(&self) -> &AlarmEngine {
        &self.cockpit.alarms
    }

    pub fn timers(&self) -> &TimerQueue {
        &self.cockpit.timers
    }

    pub fn config(&self) -> &SessionConfig {
        &self.cockpit.config
    }

    pub fn haptics(&self) -> &H {
        &self.cockpit.haptics
    }
}
