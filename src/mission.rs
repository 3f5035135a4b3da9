//! Flight phase state machine.
//!
//! Phases advance strictly forward one step at a time and can be retreated
//! one step to undo a mistaken button press. Every phase behaviour lives in
//! an exhaustive `match` over [`Phase`]; a phase without behaviour for a hook
//! simply has an empty arm.
//!
//! | Phase          | enter                                 | tick                      | exit / cancel                    |
//! |----------------|---------------------------------------|---------------------------|----------------------------------|
//! | Preflight      | -                                     | -                         | -                                |
//! | TaxiDeparture  | off-block, 30s taxi reminder          | taxi blink                | stop reminder (cancel: un-record)|
//! | Inflight       | take-off, cruise checks               | flight time, endurance    | stop cruise checks               |
//! | TaxiArrival    | landing, final flight time, 60s taxi reminder | taxi blink        | stop reminder (cancel: un-record)|
//! | Postflight     | on-block, block time, flight plan alarm | -                       | cancel: un-record, stop alarm    |

use embassy_time::{Duration, Instant};
use log::{debug, info, warn};

use crate::alarms::AlarmKind;
use crate::haptics::{Haptics, VibePattern};
use crate::info::{InfoCategory, Timestamp};
use crate::scheduler::{Expired, TimerHandle, TimerToken};
use crate::session::Cockpit;
use crate::time_format::PLACEHOLDER_TEXT;

/// Number of flight phases
pub const PHASE_COUNT: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Preflight,
    TaxiDeparture,
    Inflight,
    TaxiArrival,
    Postflight,
}

impl Phase {
    pub const ALL: [Phase; PHASE_COUNT] = [
        Self::Preflight,
        Self::TaxiDeparture,
        Self::Inflight,
        Self::TaxiArrival,
        Self::Postflight,
    ];

    pub const fn index(self) -> usize {
        match self {
            Self::Preflight => 0,
            Self::TaxiDeparture => 1,
            Self::Inflight => 2,
            Self::TaxiArrival => 3,
            Self::Postflight => 4,
        }
    }

    /// Following phase, `None` at the terminal phase
    pub const fn next(self) -> Option<Phase> {
        match self {
            Self::Preflight => Some(Self::TaxiDeparture),
            Self::TaxiDeparture => Some(Self::Inflight),
            Self::Inflight => Some(Self::TaxiArrival),
            Self::TaxiArrival => Some(Self::Postflight),
            Self::Postflight => None,
        }
    }

    /// Preceding phase, `None` for a phase that cannot be cancelled
    pub const fn previous(self) -> Option<Phase> {
        match self {
            Self::Preflight => None,
            Self::TaxiDeparture => Some(Self::Preflight),
            Self::Inflight => Some(Self::TaxiDeparture),
            Self::TaxiArrival => Some(Self::Inflight),
            Self::Postflight => Some(Self::TaxiArrival),
        }
    }

    pub const fn title(self) -> &'static str {
        match self {
            Self::Preflight => "Preflight",
            Self::TaxiDeparture => "Taxi out",
            Self::Inflight => "In flight",
            Self::TaxiArrival => "Taxi in",
            Self::Postflight => "Postflight",
        }
    }
}

/// Owner of the current phase and of the state its hooks keep between ticks
#[derive(Debug)]
pub struct PhaseMachine {
    phase: Phase,
    taxi_blink: bool,
    live_indicator: bool,
    taxi_reminder: Option<TimerHandle>,
    endurance_budget: Option<Duration>,
}

impl Default for PhaseMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl PhaseMachine {
    pub const fn new() -> Self {
        Self {
            phase: Phase::Preflight,
            taxi_blink: false,
            live_indicator: false,
            taxi_reminder: None,
            endurance_budget: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// "Taxiing" indicator state while on the ground between blocks
    pub fn taxi_blink(&self) -> bool {
        self.taxi_blink
    }

    /// "In flight" indicator state
    pub fn live_indicator_visible(&self) -> bool {
        self.live_indicator
    }

    pub fn endurance_budget(&self) -> Option<Duration> {
        self.endurance_budget
    }

    pub fn taxi_reminder_pending(&self) -> bool {
        self.taxi_reminder.is_some()
    }

    /// Move one phase forward and seed the display with a first tick.
    pub fn advance<H: Haptics>(&mut self, now: Instant, cockpit: &mut Cockpit<H>) {
        let Some(next) = self.phase.next() else {
            warn!(" Advance ignored in terminal phase {:?}", self.phase);
            return;
        };

        self.exit(cockpit);
        info!(" Phase {:?} -> {:?}", self.phase, next);
        self.phase = next;
        self.enter(now, cockpit);
        self.tick(now, cockpit);
    }

    /// Undo the last advance.
    pub fn retreat<H: Haptics>(&mut self, now: Instant, cockpit: &mut Cockpit<H>) {
        let Some(previous) = self.phase.previous() else {
            warn!(" Retreat ignored in {:?}", self.phase);
            return;
        };

        self.cancel(cockpit);
        info!(" Phase {:?} <- {:?}", previous, self.phase);
        self.phase = previous;
        cockpit
            .rotation
            .ensure_active(&cockpit.info, &mut cockpit.timers);
        self.tick(now, cockpit);
    }

    /// Per-second update of the current phase.
    pub fn tick<H: Haptics>(&mut self, now: Instant, cockpit: &mut Cockpit<H>) {
        match self.phase {
            Phase::Preflight | Phase::Postflight => {}
            Phase::TaxiDeparture | Phase::TaxiArrival => {
                self.taxi_blink = !self.taxi_blink;
            }
            Phase::Inflight => self.tick_inflight(now, cockpit),
        }
    }

    fn tick_inflight<H: Haptics>(&mut self, now: Instant, cockpit: &mut Cockpit<H>) {
        let Some(take_off) = cockpit.info.instant(InfoCategory::TakeOff) else {
            return;
        };

        let flight_time = now.saturating_duration_since(take_off);
        cockpit
            .info
            .record_duration(InfoCategory::FlightTime, flight_time);
        self.live_indicator = !self.live_indicator;

        let Some(budget) = self.endurance_budget else {
            return;
        };
        let remaining = remaining_endurance(budget, flight_time);
        cockpit
            .info
            .record_duration(InfoCategory::Endurance, remaining);

        let below_threshold = remaining < cockpit.config.endurance_threshold();
        let alarm_active = cockpit.alarms.is_active(AlarmKind::EnduranceLow);
        if below_threshold && !alarm_active {
            info!(" Endurance below threshold: {}s left", remaining.as_secs());
            if let Some(fired) =
                cockpit
                    .alarms
                    .display(AlarmKind::EnduranceLow, now, &mut cockpit.timers)
            {
                cockpit.apply_fire(fired);
            }
        } else if !below_threshold && alarm_active {
            info!(" Endurance back above threshold");
            cockpit.stop_endurance_alarm();
        }
    }

    fn enter<H: Haptics>(&mut self, now: Instant, cockpit: &mut Cockpit<H>) {
        match self.phase {
            Phase::Preflight => {}
            Phase::TaxiDeparture => {
                cockpit.info.record_absolute(InfoCategory::OffBlock, now);
                let interval = cockpit.config.taxi_out_reminder();
                self.start_taxi_reminder(interval, now, cockpit);
            }
            Phase::Inflight => {
                cockpit.info.record_absolute(InfoCategory::TakeOff, now);
                cockpit
                    .alarms
                    .start(AlarmKind::CruiseCheck, now, &mut cockpit.timers);
            }
            Phase::TaxiArrival => {
                cockpit.info.record_absolute(InfoCategory::Landing, now);
                if let Some(take_off) = cockpit.info.instant(InfoCategory::TakeOff) {
                    let flight_time = now.saturating_duration_since(take_off);
                    cockpit
                        .info
                        .record_duration(InfoCategory::FlightTime, flight_time);
                    if let Some(budget) = self.endurance_budget {
                        cockpit.info.record_duration(
                            InfoCategory::Endurance,
                            remaining_endurance(budget, flight_time),
                        );
                    }
                }
                cockpit
                    .rotation
                    .force(InfoCategory::Landing, &cockpit.info, &mut cockpit.timers);
                let interval = cockpit.config.taxi_in_reminder();
                self.start_taxi_reminder(interval, now, cockpit);
            }
            Phase::Postflight => {
                cockpit.info.record_absolute(InfoCategory::OnBlock, now);
                if let Some(off_block) = cockpit.info.instant(InfoCategory::OffBlock) {
                    cockpit.info.record_duration(
                        InfoCategory::BlockTime,
                        now.saturating_duration_since(off_block),
                    );
                }
                cockpit
                    .alarms
                    .start(AlarmKind::FlightPlanClose, now, &mut cockpit.timers);
            }
        }
    }

    fn exit<H: Haptics>(&mut self, cockpit: &mut Cockpit<H>) {
        match self.phase {
            Phase::Preflight | Phase::Postflight => {}
            Phase::TaxiDeparture | Phase::TaxiArrival => {
                self.taxi_blink = false;
                cockpit.timers.cancel_slot(&mut self.taxi_reminder);
            }
            Phase::Inflight => {
                self.live_indicator = false;
                cockpit
                    .alarms
                    .stop(AlarmKind::CruiseCheck, &mut cockpit.timers);
                cockpit.stop_endurance_alarm();
            }
        }
    }

    fn cancel<H: Haptics>(&mut self, cockpit: &mut Cockpit<H>) {
        match self.phase {
            Phase::Preflight => {}
            Phase::TaxiDeparture => {
                cockpit.info.deactivate(InfoCategory::OffBlock);
                self.taxi_blink = false;
                cockpit.timers.cancel_slot(&mut self.taxi_reminder);
            }
            Phase::Inflight => {
                cockpit.info.deactivate(InfoCategory::TakeOff);
                cockpit
                    .info
                    .show_placeholder(InfoCategory::FlightTime, PLACEHOLDER_TEXT);
                if let Some(budget) = self.endurance_budget {
                    cockpit
                        .info
                        .record_duration(InfoCategory::Endurance, budget);
                }
                self.live_indicator = false;
                cockpit
                    .alarms
                    .stop(AlarmKind::CruiseCheck, &mut cockpit.timers);
                cockpit.stop_endurance_alarm();
            }
            Phase::TaxiArrival => {
                cockpit.info.deactivate(InfoCategory::Landing);
                cockpit.rotation.set_default(InfoCategory::FlightTime);
                self.taxi_blink = false;
                cockpit.timers.cancel_slot(&mut self.taxi_reminder);
            }
            Phase::Postflight => {
                cockpit.info.deactivate(InfoCategory::OnBlock);
                cockpit.info.deactivate(InfoCategory::BlockTime);
                cockpit
                    .alarms
                    .stop(AlarmKind::FlightPlanClose, &mut cockpit.timers);
            }
        }
    }

    fn taxi_reminder_interval<H: Haptics>(&self, cockpit: &Cockpit<H>) -> Option<Duration> {
        match self.phase {
            Phase::TaxiDeparture => Some(cockpit.config.taxi_out_reminder()),
            Phase::TaxiArrival => Some(cockpit.config.taxi_in_reminder()),
            _ => None,
        }
    }

    fn start_taxi_reminder<H: Haptics>(
        &mut self,
        interval: Duration,
        now: Instant,
        cockpit: &mut Cockpit<H>,
    ) {
        cockpit.timers.cancel_slot(&mut self.taxi_reminder);
        self.taxi_reminder = Some(
            cockpit
                .timers
                .schedule(now, interval, TimerToken::TaxiReminder),
        );
    }

    /// Handle an expired [`TimerToken::TaxiReminder`] entry.
    pub fn on_taxi_reminder<H: Haptics>(
        &mut self,
        expired: Expired,
        now: Instant,
        cockpit: &mut Cockpit<H>,
    ) {
        let interval = match self.taxi_reminder_interval(cockpit) {
            Some(interval) if self.taxi_reminder == Some(expired.handle) => interval,
            _ => {
                debug!(" Dropping stale taxi reminder in {:?}", self.phase);
                return;
            }
        };

        cockpit.haptics.vibrate(VibePattern::ShortPulse);
        self.taxi_reminder = Some(
            cockpit
                .timers
                .schedule(now, interval, TimerToken::TaxiReminder),
        );
    }

    /// Set or clear (zero) the endurance budget counted from take-off.
    pub fn set_endurance<H: Haptics>(
        &mut self,
        budget: Duration,
        now: Instant,
        cockpit: &mut Cockpit<H>,
    ) {
        if budget.as_secs() == 0 {
            info!(" Endurance tracking disabled");
            self.endurance_budget = None;
            cockpit.info.deactivate(InfoCategory::Endurance);
            cockpit.stop_endurance_alarm();
            cockpit
                .rotation
                .ensure_active(&cockpit.info, &mut cockpit.timers);
            return;
        }

        info!(" Endurance budget set to {}s", budget.as_secs());
        self.endurance_budget = Some(budget);
        let flown = match self.phase {
            Phase::Inflight => cockpit
                .info
                .instant(InfoCategory::TakeOff)
                .map(|take_off| now.saturating_duration_since(take_off)),
            Phase::TaxiArrival | Phase::Postflight => {
                match cockpit.info.get(InfoCategory::FlightTime).timestamp {
                    Timestamp::Span(flight_time) => Some(flight_time),
                    _ => None,
                }
            }
            Phase::Preflight | Phase::TaxiDeparture => None,
        };
        let remaining = match flown {
            Some(flight_time) => remaining_endurance(budget, flight_time),
            None => budget,
        };
        cockpit
            .info
            .record_duration(InfoCategory::Endurance, remaining);
    }
}

fn remaining_endurance(budget: Duration, flight_time: Duration) -> Duration {
    budget
        .checked_sub(flight_time)
        .unwrap_or(Duration::from_secs(0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SessionConfig;
    use crate::session::tests::RecordingHaptics;

    fn at(secs: u64) -> Instant {
        Instant::from_secs(secs)
    }

    fn setup() -> (PhaseMachine, Cockpit<RecordingHaptics>) {
        (
            PhaseMachine::new(),
            Cockpit::new(SessionConfig::default(), RecordingHaptics::default()),
        )
    }

    fn advance_to(
        machine: &mut PhaseMachine,
        cockpit: &mut Cockpit<RecordingHaptics>,
        phase: Phase,
        now: Instant,
    ) {
        while machine.phase() != phase {
            machine.advance(now, cockpit);
        }
    }

    #[test]
    fn test_phase_chain_is_linear() {
        for (index, phase) in Phase::ALL.iter().enumerate() {
            assert_eq!(phase.index(), index);
            if let Some(next) = phase.next() {
                assert_eq!(next.previous(), Some(*phase));
            }
        }
        assert_eq!(Phase::Postflight.next(), None);
        assert_eq!(Phase::Preflight.previous(), None);
    }

    #[test]
    fn test_advance_at_terminal_is_noop() {
        let (mut machine, mut cockpit) = setup();
        advance_to(&mut machine, &mut cockpit, Phase::Postflight, at(0));
        let pending = cockpit.timers.len();

        machine.advance(at(100), &mut cockpit);

        assert_eq!(machine.phase(), Phase::Postflight);
        assert_eq!(cockpit.timers.len(), pending);
    }

    #[test]
    fn test_retreat_at_preflight_is_noop() {
        let (mut machine, mut cockpit) = setup();
        machine.retreat(at(0), &mut cockpit);

        assert_eq!(machine.phase(), Phase::Preflight);
        assert!(cockpit.timers.is_empty());
    }

    #[test]
    fn test_taxi_departure_records_off_block_and_reminds() {
        let (mut machine, mut cockpit) = setup();
        machine.advance(at(100), &mut cockpit);

        assert_eq!(machine.phase(), Phase::TaxiDeparture);
        assert_eq!(cockpit.info.instant(InfoCategory::OffBlock), Some(at(100)));
        assert!(machine.taxi_blink());
        assert_eq!(
            cockpit.timers.deadline_of(TimerToken::TaxiReminder),
            Some(at(130))
        );
    }

    #[test]
    fn test_inflight_cancel_restores_placeholder() {
        let (mut machine, mut cockpit) = setup();
        advance_to(&mut machine, &mut cockpit, Phase::Inflight, at(0));
        machine.tick(at(600), &mut cockpit);
        assert_eq!(cockpit.info.get(InfoCategory::FlightTime).text.as_str(), "0:10");

        machine.retreat(at(601), &mut cockpit);

        assert_eq!(machine.phase(), Phase::TaxiDeparture);
        assert!(!cockpit.info.is_active(InfoCategory::TakeOff));
        assert!(cockpit.info.is_active(InfoCategory::FlightTime));
        assert_eq!(cockpit.info.get(InfoCategory::FlightTime).text.as_str(), "--:--");
        assert!(!cockpit.alarms.is_active(AlarmKind::CruiseCheck));
        assert!(!machine.live_indicator_visible());
    }

    #[test]
    fn test_taxi_arrival_freezes_flight_time_and_shows_landing() {
        let (mut machine, mut cockpit) = setup();
        advance_to(&mut machine, &mut cockpit, Phase::Inflight, at(0));
        machine.advance(at(5_400), &mut cockpit);

        assert_eq!(machine.phase(), Phase::TaxiArrival);
        assert_eq!(cockpit.info.get(InfoCategory::FlightTime).text.as_str(), "1:30");
        assert_eq!(cockpit.rotation.current(), InfoCategory::Landing);
        assert!(!cockpit.alarms.is_active(AlarmKind::CruiseCheck));

        machine.tick(at(9_000), &mut cockpit);
        assert_eq!(cockpit.info.get(InfoCategory::FlightTime).text.as_str(), "1:30");
    }

    #[test]
    fn test_taxi_arrival_cancel_reverts_display() {
        let (mut machine, mut cockpit) = setup();
        advance_to(&mut machine, &mut cockpit, Phase::TaxiArrival, at(0));

        machine.retreat(at(60), &mut cockpit);

        assert_eq!(machine.phase(), Phase::Inflight);
        assert!(!cockpit.info.is_active(InfoCategory::Landing));
        assert_eq!(cockpit.rotation.current(), InfoCategory::FlightTime);
        assert_eq!(cockpit.rotation.default_category(), InfoCategory::FlightTime);
        assert!(!machine.taxi_reminder_pending());
        assert!(!machine.taxi_blink());
    }

    #[test]
    fn test_postflight_block_time_and_cancel() {
        let (mut machine, mut cockpit) = setup();
        machine.advance(at(0), &mut cockpit);
        machine.advance(at(600), &mut cockpit);
        machine.advance(at(4_200), &mut cockpit);
        machine.advance(at(4_800), &mut cockpit);

        assert_eq!(cockpit.info.get(InfoCategory::BlockTime).text.as_str(), "1:20");
        assert!(cockpit.alarms.is_active(AlarmKind::FlightPlanClose));
        assert!(cockpit.alarms.is_inhibited(AlarmKind::FlightPlanClose));

        machine.retreat(at(4_900), &mut cockpit);

        assert!(!cockpit.info.is_active(InfoCategory::OnBlock));
        assert!(!cockpit.info.is_active(InfoCategory::BlockTime));
        assert!(!cockpit.alarms.is_active(AlarmKind::FlightPlanClose));
    }

    #[test]
    fn test_endurance_input_before_take_off() {
        let (mut machine, mut cockpit) = setup();
        machine.set_endurance(Duration::from_secs(3 * 3_600), at(0), &mut cockpit);

        assert_eq!(cockpit.info.get(InfoCategory::Endurance).text.as_str(), "3:00");

        machine.set_endurance(Duration::from_secs(0), at(0), &mut cockpit);
        assert!(!cockpit.info.is_active(InfoCategory::Endurance));
        assert_eq!(machine.endurance_budget(), None);
    }
}
