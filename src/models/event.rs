//! Normalized event listing.

use serde::{Deserialize, Serialize};

use crate::utils::dates::is_iso_date;
use crate::utils::text::slugify;

/// Identities are cut to this many characters.
pub const MAX_ID_LEN: usize = 80;

/// Build the identity of a listing: `{prefix}-{date}-{slug(title)}`, truncated.
///
/// Two titles that slug identically on the same date from the same source
/// share an identity; whichever is merged last wins.
pub fn event_id(prefix: &str, date: &str, title: &str) -> String {
    format!("{prefix}-{date}-{}", slugify(title))
        .chars()
        .take(MAX_ID_LEN)
        .collect()
}

/// A single show as every adapter reports it.
///
/// Every field deserializes with a default so that older or partial files
/// still load; [`Event::is_well_formed`] filters out what cannot be used.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct Event {
    /// Stable identity, see [`event_id`]
    pub id: String,

    /// Headliner or event name
    pub title: String,

    /// Calendar day, `YYYY-MM-DD`
    pub date: String,

    /// Show time, `HH:MM` (24h)
    pub time: Option<String>,

    /// Venue display name
    pub venue: String,

    /// Detail page on the venue's site
    pub event_url: Option<String>,

    /// Ticket purchase page
    pub ticket_url: Option<String>,

    /// Poster URL or local image path
    pub image_url: Option<String>,

    /// Free-form price text (`"$15 ADV / $18 DOS"`)
    pub price: Option<String>,

    /// Free-form age text (`"21+"`, `"All Ages"`)
    pub age_restriction: Option<String>,

    /// Support acts, in billing order
    pub supporting_artists: Option<Vec<String>>,

    /// Id of the adapter that produced this record
    pub source: String,

    /// When this identity was first observed (RFC 3339)
    pub added_at: Option<String>,
}

impl Event {
    /// Create a listing with its identity derived from source, date and title.
    pub fn new(
        source: impl Into<String>,
        venue: impl Into<String>,
        title: impl Into<String>,
        date: impl Into<String>,
    ) -> Self {
        let source = source.into();
        let title = title.into();
        let date = date.into();
        Self {
            id: event_id(&source, &date, &title),
            title,
            date,
            venue: venue.into(),
            source,
            ..Self::default()
        }
    }

    /// Whether the record can take part in reconciliation.
    pub fn is_well_formed(&self) -> bool {
        !self.id.is_empty() && is_iso_date(&self.date)
    }

    /// Set supporting artists, storing `None` for an empty lineup.
    pub fn with_lineup(mut self, artists: Option<Vec<String>>) -> Self {
        self.supporting_artists = artists.filter(|a| !a.is_empty());
        self
    }
}
