//! Archived shows.

use serde::{Deserialize, Serialize};

use crate::models::Event;

/// One past show kept for reference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HistoricalShow {
    pub date: String,
    pub title: String,
    pub venue: String,
    pub supporting_artists: Option<Vec<String>>,
}

/// Deduplication key of an archived show: `(date, title, venue)`.
pub type HistoryKey = (String, String, String);

impl HistoricalShow {
    pub fn key(&self) -> HistoryKey {
        (self.date.clone(), self.title.clone(), self.venue.clone())
    }
}

impl From<&Event> for HistoricalShow {
    fn from(event: &Event) -> Self {
        Self {
            date: event.date.clone(),
            title: event.title.clone(),
            venue: event.venue.clone(),
            supporting_artists: event.supporting_artists.clone(),
        }
    }
}

/// The persisted archive, newest show first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShowHistory {
    pub shows: Vec<HistoricalShow>,
    pub last_updated: String,
}

impl ShowHistory {
    /// Order shows by date, newest first. Same-day shows keep their order.
    pub fn sort(&mut self) {
        self.shows.sort_by(|a, b| b.date.cmp(&a.date));
    }
}
