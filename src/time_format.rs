//! Fixed-width text rendering for instants and durations.
//!
//! Every instant handed to the core counts seconds since the UTC epoch, so the
//! wall-clock helpers here render UTC the same way the watch face always has.

use core::fmt::Write;

use embassy_time::{Duration, Instant};
use heapless::String;

/// Maximum number of characters an info item can show
pub const DISPLAY_TEXT_LEN: usize = 5;

/// Rendered value of an info item ("HH:MM", "H:MM" or a placeholder)
pub type DisplayText = String<DISPLAY_TEXT_LEN>;

/// Text shown for a value that has not been recorded yet
pub const PLACEHOLDER_TEXT: &str = "--:--";

/// Largest hour count a duration can show before it clamps
pub const MAX_DISPLAY_HOURS: u64 = 99;

/// Text shown for durations past [`MAX_DISPLAY_HOURS`]
pub const CLAMPED_DURATION_TEXT: &str = "99:99";

const SECS_PER_MINUTE: u64 = 60;
const SECS_PER_HOUR: u64 = 3_600;
const SECS_PER_DAY: u64 = 86_400;

/// Wrap point of the ET chronometer minutes field
const ELAPSED_MINUTES_WRAP: u64 = 100;

/// Build a [`DisplayText`] from a static string that is known to fit.
pub fn display_text(value: &str) -> DisplayText {
    let mut text = DisplayText::new();
    text.push_str(value).ok();
    text
}

/// Render an absolute instant as 24h UTC "HH:MM".
pub fn time_hhmm(instant: Instant) -> DisplayText {
    let secs_of_day = instant.as_secs() % SECS_PER_DAY;
    let mut text = DisplayText::new();
    write!(
        text,
        "{:02}:{:02}",
        secs_of_day / SECS_PER_HOUR,
        secs_of_day % SECS_PER_HOUR / SECS_PER_MINUTE
    )
    .ok();
    text
}

/// Render a duration as "H:MM", hours unpadded.
///
/// Durations of 100 hours or more do not fit the display and render as
/// [`CLAMPED_DURATION_TEXT`] rather than wrapping.
pub fn duration_hmm(duration: Duration) -> DisplayText {
    let secs = duration.as_secs();
    let hours = secs / SECS_PER_HOUR;
    if hours > MAX_DISPLAY_HOURS {
        return display_text(CLAMPED_DURATION_TEXT);
    }

    let mut text = DisplayText::new();
    write!(text, "{}:{:02}", hours, secs % SECS_PER_HOUR / SECS_PER_MINUTE).ok();
    text
}

/// Render an elapsed time as "M:SS" with the minutes wrapping at 100.
pub fn elapsed_mss(duration: Duration) -> DisplayText {
    let secs = duration.as_secs();
    let mut text = DisplayText::new();
    write!(
        text,
        "{}:{:02}",
        secs / SECS_PER_MINUTE % ELAPSED_MINUTES_WRAP,
        secs % SECS_PER_MINUTE
    )
    .ok();
    text
}

/// UTC wall clock as "HHMM", the big digits at the top of the face.
pub fn clock_hhmm(instant: Instant) -> String<4> {
    let secs_of_day = instant.as_secs() % SECS_PER_DAY;
    let mut text = String::new();
    write!(
        text,
        "{:02}{:02}",
        secs_of_day / SECS_PER_HOUR,
        secs_of_day % SECS_PER_HOUR / SECS_PER_MINUTE
    )
    .ok();
    text
}

/// UTC minute of the hour as "MM".
pub fn minute_mm(instant: Instant) -> String<2> {
    let mut text = String::new();
    write!(
        text,
        "{:02}",
        instant.as_secs() % SECS_PER_HOUR / SECS_PER_MINUTE
    )
    .ok();
    text
}

/// UTC day of the month as "DD".
pub fn day_dd(instant: Instant) -> String<2> {
    let (_, _, day) = civil_from_days(instant.as_secs() / SECS_PER_DAY);
    let mut text = String::new();
    write!(text, "{:02}", day).ok();
    text
}

/// Convert days since 1970-01-01 into a proleptic Gregorian (year, month, day).
fn civil_from_days(days: u64) -> (u64, u64, u64) {
    // Shift the epoch to 0000-03-01 so leap days fall at the end of each era year
    let z = days + 719_468;
    let era = z / 146_097;
    let doe = z - era * 146_097;
    let yoe = (doe - doe / 1_460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = doy - (153 * mp + 2) / 5 + 1;
    let month = if mp < 10 { mp + 3 } else { mp - 9 };
    let year = yoe + era * 400 + u64::from(month <= 2);
    (year, month, day)
}
