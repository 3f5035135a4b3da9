//! Registry of the flight's recorded times ("info items").
//!
//! Each [`InfoCategory`] owns exactly one [`InfoItem`]. An item is inactive
//! until a phase records it; only active items are eligible for the main
//! display rotation.

use embassy_time::{Duration, Instant};
use heapless::{String, Vec};

use crate::time_format::{self, DisplayText, PLACEHOLDER_TEXT};

/// Maximum label length ("FT", "TO", ...)
pub const LABEL_LEN: usize = 2;

/// Number of tracked categories
pub const CATEGORY_COUNT: usize = 7;

/// Short label shown next to an info item's value
pub type Label = String<LABEL_LEN>;

/// Tracked flight values, in display rotation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InfoCategory {
    FlightTime,
    Endurance,
    BlockTime,
    OffBlock,
    TakeOff,
    Landing,
    OnBlock,
}

impl InfoCategory {
    /// All categories in rotation order
    pub const ALL: [InfoCategory; CATEGORY_COUNT] = [
        Self::FlightTime,
        Self::Endurance,
        Self::BlockTime,
        Self::OffBlock,
        Self::TakeOff,
        Self::Landing,
        Self::OnBlock,
    ];

    /// Position in [`InfoCategory::ALL`]
    pub const fn index(self) -> usize {
        match self {
            Self::FlightTime => 0,
            Self::Endurance => 1,
            Self::BlockTime => 2,
            Self::OffBlock => 3,
            Self::TakeOff => 4,
            Self::Landing => 5,
            Self::OnBlock => 6,
        }
    }

    /// Default two-letter label
    pub const fn label(self) -> &'static str {
        match self {
            Self::FlightTime => "FT",
            Self::Endurance => "EN",
            Self::BlockTime => "BT",
            Self::OffBlock => "OB",
            Self::TakeOff => "TO",
            Self::Landing => "LD",
            Self::OnBlock => "IB",
        }
    }
}

/// Value recorded for an info item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timestamp {
    /// Nothing recorded yet
    None,
    /// Absolute UTC instant (off-block, take-off, ...)
    At(Instant),
    /// Span of time (flight time, block time, endurance)
    Span(Duration),
}

/// One tracked value with its label and cached display text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfoItem {
    pub active: bool,
    pub timestamp: Timestamp,
    pub label: Label,
    pub text: DisplayText,
}

impl InfoItem {
    fn blank() -> Self {
        Self {
            active: false,
            timestamp: Timestamp::None,
            label: Label::new(),
            text: DisplayText::new(),
        }
    }
}

/// Owner of every [`InfoItem`] in a session
#[derive(Debug, Clone)]
pub struct InfoRegistry {
    items: [InfoItem; CATEGORY_COUNT],
}

impl Default for InfoRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl InfoRegistry {
    /// Registry with every item reset and flight time showing its placeholder.
    pub fn new() -> Self {
        let mut registry = Self {
            items: InfoCategory::ALL.map(|_| InfoItem::blank()),
        };
        for category in InfoCategory::ALL {
            registry.reset(category, category.label());
        }
        registry.show_placeholder(InfoCategory::FlightTime, PLACEHOLDER_TEXT);
        registry
    }

    fn item_mut(&mut self, category: InfoCategory) -> &mut InfoItem {
        &mut self.items[category.index()]
    }

    /// Clear an item back to "not recorded" and give it a label.
    pub fn reset(&mut self, category: InfoCategory, label: &str) {
        let item = self.item_mut(category);
        item.active = false;
        item.timestamp = Timestamp::None;
        item.label.clear();
        debug_assert!(label.len() <= LABEL_LEN, "label too long: {label}");
        item.label.push_str(label).ok();
        item.text.clear();
    }

    /// Record an absolute instant, shown as UTC "HH:MM".
    pub fn record_absolute(&mut self, category: InfoCategory, instant: Instant) {
        let item = self.item_mut(category);
        item.active = true;
        item.timestamp = Timestamp::At(instant);
        item.text = time_format::time_hhmm(instant);
    }

    /// Record a duration, shown as "H:MM" and clamped past 99 hours.
    pub fn record_duration(&mut self, category: InfoCategory, duration: Duration) {
        let item = self.item_mut(category);
        item.active = true;
        item.timestamp = Timestamp::Span(duration);
        item.text = time_format::duration_hmm(duration);
    }

    /// Make an item displayable with placeholder text and no recorded value.
    pub fn show_placeholder(&mut self, category: InfoCategory, text: &str) {
        let item = self.item_mut(category);
        item.active = true;
        item.timestamp = Timestamp::None;
        item.text = time_format::display_text(text);
    }

    /// Hide an item from the rotation. Label and text are kept.
    pub fn deactivate(&mut self, category: InfoCategory) {
        self.item_mut(category).active = false;
    }

    pub fn get(&self, category: InfoCategory) -> &InfoItem {
        &self.items[category.index()]
    }

    pub fn is_active(&self, category: InfoCategory) -> bool {
        self.get(category).active
    }

    /// Recorded instant of an active item, if it holds one.
    pub fn instant(&self, category: InfoCategory) -> Option<Instant> {
        match self.get(category) {
            InfoItem {
                active: true,
                timestamp: Timestamp::At(instant),
                ..
            } => Some(*instant),
            _ => None,
        }
    }

    /// Active categories in rotation order.
    pub fn active_categories(&self) -> Vec<InfoCategory, CATEGORY_COUNT> {
        InfoCategory::ALL
            .into_iter()
            .filter(|category| self.is_active(*category))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_registry_only_flight_time_active() {
        let registry = InfoRegistry::new();
        let active = registry.active_categories();

        assert_eq!(active.as_slice(), &[InfoCategory::FlightTime]);
        assert_eq!(registry.get(InfoCategory::FlightTime).text.as_str(), "--:--");
        assert_eq!(registry.get(InfoCategory::OnBlock).label.as_str(), "IB");
    }

    #[test]
    fn test_record_duration_formats_and_clamps() {
        let mut registry = InfoRegistry::new();

        registry.record_duration(InfoCategory::FlightTime, Duration::from_secs(3_661));
        assert_eq!(registry.get(InfoCategory::FlightTime).text.as_str(), "1:01");

        registry.record_duration(InfoCategory::FlightTime, Duration::from_secs(360_000));
        assert_eq!(registry.get(InfoCategory::FlightTime).text.as_str(), "99:99");
    }

    #[test]
    fn test_record_absolute_activates() {
        let mut registry = InfoRegistry::new();
        let take_off = Instant::from_secs(14 * 3_600 + 5 * 60);

        registry.record_absolute(InfoCategory::TakeOff, take_off);

        let item = registry.get(InfoCategory::TakeOff);
        assert!(item.active);
        assert_eq!(item.text.as_str(), "14:05");
        assert_eq!(registry.instant(InfoCategory::TakeOff), Some(take_off));
    }

    #[test]
    fn test_deactivate_keeps_text_but_hides_value() {
        let mut registry = InfoRegistry::new();
        registry.record_absolute(InfoCategory::Landing, Instant::from_secs(600));

        registry.deactivate(InfoCategory::Landing);

        let item = registry.get(InfoCategory::Landing);
        assert!(!item.active);
        assert_eq!(item.text.as_str(), "00:10");
        assert_eq!(registry.instant(InfoCategory::Landing), None);
        assert!(!registry.active_categories().contains(&InfoCategory::Landing));
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut registry = InfoRegistry::new();
        registry.record_duration(InfoCategory::BlockTime, Duration::from_secs(600));

        registry.reset(InfoCategory::BlockTime, "BT");

        let item = registry.get(InfoCategory::BlockTime);
        assert!(!item.active);
        assert_eq!(item.timestamp, Timestamp::None);
        assert!(item.text.is_empty());
    }
}
