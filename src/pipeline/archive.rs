//! Moving past events from the live set into history.

use std::collections::HashSet;

use crate::models::{Event, HistoricalShow, HistoryKey, ShowHistory};

/// Result of partitioning the live set against today.
#[derive(Debug, Default)]
pub struct ArchiveOutcome {
    /// Upcoming events, sorted by date ascending
    pub active: Vec<Event>,
    /// Past events newly appended to history
    pub archived: usize,
    /// Past events dropped because history already had them
    pub duplicates: usize,
}

/// Partition `events` on `today` (`YYYY-MM-DD`), appending past shows to
/// `history` unless their `(date, title, venue)` is already there.
///
/// History is re-sorted newest first; nothing is ever removed from it.
pub fn archive_past(
    events: impl IntoIterator<Item = Event>,
    history: &mut ShowHistory,
    today: &str,
) -> ArchiveOutcome {
    let mut known: HashSet<HistoryKey> = history.shows.iter().map(HistoricalShow::key).collect();
    let mut outcome = ArchiveOutcome::default();

    for event in events {
        if event.date.as_str() >= today {
            outcome.active.push(event);
            continue;
        }

        let show = HistoricalShow::from(&event);
        if known.insert(show.key()) {
            log::debug!("Archiving {} ({})", event.title, event.date);
            history.shows.push(show);
            outcome.archived += 1;
        } else {
            outcome.duplicates += 1;
        }
    }

    outcome.active.sort_by(|a, b| a.date.cmp(&b.date));
    history.sort();
    outcome
}
