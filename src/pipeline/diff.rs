//! Change detection between a persisted listing and its fresh re-scrape.

use serde::{Deserialize, Serialize};

use crate::models::Event;

/// Change counts for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeCounts {
    pub added: usize,
    pub changed: usize,
    pub removed: usize,
    pub archived: usize,
}

impl ChangeCounts {
    /// Check if there are any changes.
    pub fn has_changes(&self) -> bool {
        self.added > 0 || self.changed > 0 || self.removed > 0 || self.archived > 0
    }

    /// Get the total number of changes.
    pub fn change_count(&self) -> usize {
        self.added + self.changed + self.removed + self.archived
    }
}

/// Decides whether a re-observed listing counts as changed.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChangeDetector {
    /// Also compare supporting artists and age restriction
    compare_lineup: bool,
}

impl ChangeDetector {
    /// Compare display fields only.
    pub fn new() -> Self {
        Self {
            compare_lineup: false,
        }
    }

    /// Compare display fields plus lineup and age restriction.
    pub fn with_lineup() -> Self {
        Self {
            compare_lineup: true,
        }
    }

    pub fn from_settings(compare_lineup: bool) -> Self {
        Self { compare_lineup }
    }

    /// Whether `current` differs from `previous` in a field that counts.
    ///
    /// By default only the seven display fields are compared: supporting
    /// artists and age restriction are deliberately left out, so an edit
    /// that touches only those is carried forward without being counted
    /// (and, on its own, does not trigger a rewrite). `compare_lineup`
    /// widens the comparison to include them.
    pub fn is_changed(&self, previous: &Event, current: &Event) -> bool {
        let display_changed = previous.title != current.title
            || previous.date != current.date
            || previous.time != current.time
            || previous.price != current.price
            || previous.image_url != current.image_url
            || previous.event_url != current.event_url
            || previous.ticket_url != current.ticket_url;

        if display_changed || !self.compare_lineup {
            return display_changed;
        }

        previous.supporting_artists != current.supporting_artists
            || previous.age_restriction != current.age_restriction
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_event(title: &str) -> Event {
        Event::new("test", "Venue", title, "2026-02-02")
    }

    #[test]
    fn test_identical_is_unchanged() {
        let event = make_event("Title 1");
        assert!(!ChangeDetector::new().is_changed(&event, &event.clone()));
    }

    #[test]
    fn test_display_fields_count() {
        let detector = ChangeDetector::new();
        let prev = make_event("Show");

        let mut curr = prev.clone();
        curr.price = Some("$10".into());
        assert!(detector.is_changed(&prev, &curr));

        let mut curr = prev.clone();
        curr.ticket_url = Some("https://etix.com/x".into());
        assert!(detector.is_changed(&prev, &curr));

        let mut curr = prev.clone();
        curr.time = Some("20:00".into());
        assert!(detector.is_changed(&prev, &curr));
    }

    #[test]
    fn test_lineup_ignored_by_default() {
        let prev = make_event("Show");
        let mut curr = prev.clone();
        curr.supporting_artists = Some(vec!["Opener".into()]);
        curr.age_restriction = Some("21+".into());

        assert!(!ChangeDetector::new().is_changed(&prev, &curr));
        assert!(ChangeDetector::with_lineup().is_changed(&prev, &curr));
    }

    #[test]
    fn test_first_seen_is_not_compared() {
        let prev = make_event("Show");
        let mut curr = prev.clone();
        curr.added_at = Some("2026-01-01T00:00:00Z".into());
        assert!(!ChangeDetector::with_lineup().is_changed(&prev, &curr));
    }

    #[test]
    fn test_counts() {
        let mut counts = ChangeCounts::default();
        assert!(!counts.has_changes());
        counts.archived = 2;
        assert!(counts.has_changes());
        counts.added = 1;
        assert_eq!(counts.change_count(), 3);
    }
}
