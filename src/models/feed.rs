//! The live feed document.

use serde::{Deserialize, Serialize};

use crate::models::{Event, SourceStatus};

/// Current (non-past) events plus the statuses of the run that wrote them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScraperOutput {
    /// Sorted by date ascending
    pub events: Vec<Event>,
    /// RFC 3339 timestamp of the last write
    pub last_updated: String,
    pub sources: Vec<SourceStatus>,
}

impl ScraperOutput {
    /// Look up the recorded status of one adapter.
    pub fn source(&self, id: &str) -> Option<&SourceStatus> {
        self.sources.iter().find(|s| s.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_loads_with_defaults() {
        let output: ScraperOutput = serde_json::from_str("{}").unwrap();
        assert!(output.events.is_empty());
        assert!(output.sources.is_empty());
        assert_eq!(output.last_updated, "");
    }

    #[test]
    fn test_wire_field_names() {
        let output = ScraperOutput {
            events: vec![Event::new("test", "Test Venue", "Test", "2026-01-01")],
            last_updated: "2026-01-01T00:00:00Z".into(),
            sources: vec![],
        };
        let json = serde_json::to_value(&output).unwrap();
        assert_eq!(json["lastUpdated"], "2026-01-01T00:00:00Z");
        assert_eq!(json["events"][0]["title"], "Test");
    }
}
