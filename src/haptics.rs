//! Vibration motor seam.

/// Vibration patterns the watch can play
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VibePattern {
    /// Taxi reminder
    ShortPulse,
    /// Important alarm
    LongPulse,
    /// Routine alarm
    DoublePulse,
}

/// Something that can play a [`VibePattern`].
///
/// Implemented by the platform's vibration driver; the core only ever asks
/// for a pattern and never waits for it to finish.
pub trait Haptics {
    fn vibrate(&mut self, pattern: VibePattern);
}

/// Haptics sink for hosts without a motor.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoHaptics;

impl Haptics for NoHaptics {
    fn vibrate(&mut self, _pattern: VibePattern) {}
}

impl<H: Haptics + ?Sized> Haptics for &mut H {
    fn vibrate(&mut self, pattern: VibePattern) {
        (**self).vibrate(pattern)
    }
}
