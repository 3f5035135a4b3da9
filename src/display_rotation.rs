//! Selection of the info item shown on the main display.
//!
//! The rotation always points at an active item. Cycling walks the ordered
//! list of active categories; landing anywhere other than the default arms a
//! revert timer that brings the display back after a short dwell.

use embassy_time::{Duration, Instant};
use log::debug;

use crate::info::{InfoCategory, InfoRegistry, Label};
use crate::scheduler::{Expired, TimerHandle, TimerQueue, TimerToken};
use crate::time_format::DisplayText;

#[derive(Debug)]
pub struct DisplayRotation {
    current: InfoCategory,
    default: InfoCategory,
    revert_timer: Option<TimerHandle>,
    dwell: Duration,
}

impl DisplayRotation {
    pub fn new(dwell: Duration) -> Self {
        Self {
            current: InfoCategory::FlightTime,
            default: InfoCategory::FlightTime,
            revert_timer: None,
            dwell,
        }
    }

    pub fn current(&self) -> InfoCategory {
        self.current
    }

    pub fn default_category(&self) -> InfoCategory {
        self.default
    }

    /// Deadline of the pending revert, if one is armed.
    pub fn revert_deadline(&self, timers: &TimerQueue) -> Option<Instant> {
        self.revert_timer
            .filter(|handle| timers.is_pending(*handle))
            .and_then(|_| timers.deadline_of(TimerToken::DisplayRevert))
    }

    /// Show the next active category, or jump to the default.
    pub fn cycle_next(
        &mut self,
        to_default_only: bool,
        registry: &InfoRegistry,
        now: Instant,
        timers: &mut TimerQueue,
    ) {
        timers.cancel_slot(&mut self.revert_timer);

        self.current = if to_default_only {
            self.displayable_default(registry)
        } else {
            Self::next_active(self.current, registry)
        };
        debug!(" Display showing {:?}", self.current);

        if self.current != self.default {
            self.revert_timer = Some(timers.schedule(now, self.dwell, TimerToken::DisplayRevert));
        }
    }

    fn next_active(from: InfoCategory, registry: &InfoRegistry) -> InfoCategory {
        let active = registry.active_categories();
        active
            .iter()
            .copied()
            .find(|category| category.index() > from.index())
            .or_else(|| active.first().copied())
            .unwrap_or(InfoCategory::FlightTime)
    }

    fn displayable_default(&self, registry: &InfoRegistry) -> InfoCategory {
        if registry.is_active(self.default) {
            self.default
        } else {
            InfoCategory::FlightTime
        }
    }

    /// Return to the default category immediately.
    pub fn revert_now(&mut self, registry: &InfoRegistry, timers: &mut TimerQueue) {
        timers.cancel_slot(&mut self.revert_timer);
        self.current = self.displayable_default(registry);
    }

    /// Handle an expired [`TimerToken::DisplayRevert`] entry.
    pub fn on_revert_timer(&mut self, expired: Expired, registry: &InfoRegistry) {
        if self.revert_timer != Some(expired.handle) {
            debug!(" Dropping stale display revert");
            return;
        }
        self.revert_timer = None;
        self.current = self.displayable_default(registry);
    }

    /// Make `category` both the default and the current display.
    pub fn force(
        &mut self,
        category: InfoCategory,
        registry: &InfoRegistry,
        timers: &mut TimerQueue,
    ) {
        self.default = category;
        self.revert_now(registry, timers);
    }

    /// Change the default without touching what is on screen.
    pub fn set_default(&mut self, category: InfoCategory) {
        self.default = category;
    }

    /// Fall back to the default if the current item has been deactivated.
    pub fn ensure_active(&mut self, registry: &InfoRegistry, timers: &mut TimerQueue) {
        if !registry.is_active(self.current) {
            self.revert_now(registry, timers);
        }
    }

    /// Label and text of the current item.
    pub fn text<'a>(&self, registry: &'a InfoRegistry) -> (&'a Label, &'a DisplayText) {
        let item = registry.get(self.current);
        (&item.label, &item.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(secs: u64) -> Instant {
        Instant::from_secs(secs)
    }

    fn setup() -> (DisplayRotation, InfoRegistry, TimerQueue) {
        (
            DisplayRotation::new(Duration::from_secs(10)),
            InfoRegistry::new(),
            TimerQueue::new(),
        )
    }

    #[test]
    fn test_cycle_skips_inactive_and_wraps() {
        let (mut rotation, mut registry, mut timers) = setup();
        registry.record_absolute(InfoCategory::TakeOff, at(0));

        rotation.cycle_next(false, &registry, at(0), &mut timers);
        assert_eq!(rotation.current(), InfoCategory::TakeOff);

        rotation.cycle_next(false, &registry, at(1), &mut timers);
        assert_eq!(rotation.current(), InfoCategory::FlightTime);
    }

    #[test]
    fn test_cycle_with_single_active_stays_put() {
        let (mut rotation, registry, mut timers) = setup();

        rotation.cycle_next(false, &registry, at(0), &mut timers);

        assert_eq!(rotation.current(), InfoCategory::FlightTime);
        assert!(timers.is_empty());
    }

    #[test]
    fn test_revert_timer_returns_to_default() {
        let (mut rotation, mut registry, mut timers) = setup();
        registry.record_absolute(InfoCategory::OffBlock, at(0));

        rotation.cycle_next(false, &registry, at(0), &mut timers);
        assert_eq!(rotation.revert_deadline(&timers), Some(at(10)));

        let expired = timers.pop_due(at(10)).unwrap();
        rotation.on_revert_timer(expired, &registry);
        assert_eq!(rotation.current(), InfoCategory::FlightTime);
    }

    #[test]
    fn test_cycle_again_restarts_dwell() {
        let (mut rotation, mut registry, mut timers) = setup();
        registry.record_absolute(InfoCategory::OffBlock, at(0));
        registry.record_absolute(InfoCategory::TakeOff, at(0));

        rotation.cycle_next(false, &registry, at(0), &mut timers);
        rotation.cycle_next(false, &registry, at(8), &mut timers);

        assert_eq!(rotation.current(), InfoCategory::TakeOff);
        assert!(timers.pop_due(at(10)).is_none());
        assert_eq!(rotation.revert_deadline(&timers), Some(at(18)));
    }

    #[test]
    fn test_to_default_cancels_revert() {
        let (mut rotation, mut registry, mut timers) = setup();
        registry.record_absolute(InfoCategory::OffBlock, at(0));
        rotation.cycle_next(false, &registry, at(0), &mut timers);

        rotation.cycle_next(true, &registry, at(2), &mut timers);

        assert_eq!(rotation.current(), InfoCategory::FlightTime);
        assert!(timers.is_empty());
    }

    #[test]
    fn test_force_sets_default_and_current() {
        let (mut rotation, mut registry, mut timers) = setup();
        registry.record_absolute(InfoCategory::Landing, at(0));

        rotation.force(InfoCategory::Landing, &registry, &mut timers);

        assert_eq!(rotation.current(), InfoCategory::Landing);
        assert_eq!(rotation.default_category(), InfoCategory::Landing);
        let (label, text) = rotation.text(&registry);
        assert_eq!(label.as_str(), "LD");
        assert_eq!(text.as_str(), "00:00");
    }

    #[test]
    fn test_ensure_active_falls_back() {
        let (mut rotation, mut registry, mut timers) = setup();
        registry.record_absolute(InfoCategory::OffBlock, at(0));
        rotation.cycle_next(false, &registry, at(0), &mut timers);

        registry.deactivate(InfoCategory::OffBlock);
        rotation.ensure_active(&registry, &mut timers);

        assert_eq!(rotation.current(), InfoCategory::FlightTime);
        assert!(rotation.revert_deadline(&timers).is_none());
    }
}
