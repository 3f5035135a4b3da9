//! Session tuning: reminder periods, dwell times and thresholds.

use embassy_time::Duration;
use serde::{Deserialize, Serialize};
use thiserror_no_std::Error;

use crate::alarms::AlarmKind;

/// Per-alarm timing and policy
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlarmConfig {
    /// Interval between fires while armed
    pub period_secs: u32,
    /// How long the reminder surface stays up after a fire
    pub auto_hide_secs: u32,
    /// Important alarms vibrate a long pulse instead of a double pulse
    pub important: bool,
    /// Whether the alarm starts out inhibited
    pub inhibited: bool,
}

impl AlarmConfig {
    pub const fn period(&self) -> Duration {
        Duration::from_secs(self.period_secs as u64)
    }

    pub const fn auto_hide(&self) -> Duration {
        Duration::from_secs(self.auto_hide_secs as u64)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    pub cruise_check: AlarmConfig,
    pub endurance_low: AlarmConfig,
    pub flight_plan: AlarmConfig,
    /// Vibration reminder interval while taxiing out
    pub taxi_out_reminder_secs: u32,
    /// Vibration reminder interval while taxiing in
    pub taxi_in_reminder_secs: u32,
    /// Dwell before the main display reverts to its default category
    pub display_revert_secs: u32,
    /// Remaining endurance below which the low-endurance alarm fires
    pub endurance_threshold_secs: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cruise_check: AlarmConfig {
                period_secs: 15 * 60,
                auto_hide_secs: 2 * 60,
                important: false,
                inhibited: false,
            },
            endurance_low: AlarmConfig {
                period_secs: 15 * 60,
                auto_hide_secs: 15 * 60,
                important: true,
                inhibited: false,
            },
            flight_plan: AlarmConfig {
                period_secs: 5 * 60,
                auto_hide_secs: 10 * 60,
                important: false,
                inhibited: true,
            },
            taxi_out_reminder_secs: 30,
            taxi_in_reminder_secs: 60,
            display_revert_secs: 10,
            endurance_threshold_secs: 45 * 60,
        }
    }
}

impl SessionConfig {
    pub const fn alarm(&self, kind: AlarmKind) -> &AlarmConfig {
        match kind {
            AlarmKind::CruiseCheck => &self.cruise_check,
            AlarmKind::EnduranceLow => &self.endurance_low,
            AlarmKind::FlightPlanClose => &self.flight_plan,
        }
    }

    pub const fn taxi_out_reminder(&self) -> Duration {
        Duration::from_secs(self.taxi_out_reminder_secs as u64)
    }

    pub const fn taxi_in_reminder(&self) -> Duration {
        Duration::from_secs(self.taxi_in_reminder_secs as u64)
    }

    pub const fn display_revert(&self) -> Duration {
        Duration::from_secs(self.display_revert_secs as u64)
    }

    pub const fn endurance_threshold(&self) -> Duration {
        Duration::from_secs(self.endurance_threshold_secs as u64)
    }

    /// Reject values that would make a periodic timer spin.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for kind in AlarmKind::ALL {
            if self.alarm(kind).period_secs == 0 {
                return Err(ConfigError::ZeroPeriod(kind));
            }
        }
        if self.taxi_out_reminder_secs == 0 || self.taxi_in_reminder_secs == 0 {
            return Err(ConfigError::ZeroReminderInterval);
        }
        if self.display_revert_secs == 0 {
            return Err(ConfigError::ZeroRevertDwell);
        }
        Ok(())
    }
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Alarm {0:?} has a zero period")]
    ZeroPeriod(AlarmKind),
    #[error("Taxi reminder interval must be non-zero")]
    ZeroReminderInterval,
    #[error("Display revert dwell must be non-zero")]
    ZeroRevertDwell,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(SessionConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_zero_alarm_period_rejected() {
        let mut config = SessionConfig::default();
        config.flight_plan.period_secs = 0;

        assert_eq!(
            config.validate(),
            Err(ConfigError::ZeroPeriod(AlarmKind::FlightPlanClose))
        );
    }

    #[test]
    fn test_zero_dwell_rejected() {
        let mut config = SessionConfig::default();
        config.display_revert_secs = 0;

        assert_eq!(config.validate(), Err(ConfigError::ZeroRevertDwell));
    }
}
