//! Run summary.

use std::fmt;

use serde::Serialize;

use crate::models::SourceStatus;
use crate::pipeline::diff::ChangeCounts;

/// Summary of one reconciliation run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    /// RFC 3339 timestamp the run used for new events
    pub started_at: String,
    pub active_events: usize,
    pub added: usize,
    pub changed: usize,
    pub removed: usize,
    pub archived: usize,
    pub history_total: usize,
    /// Whether the live and history documents were rewritten
    pub written: bool,
    /// Outcomes of the adapters run this time, in run order
    pub sources: Vec<SourceStatus>,
    pub success: bool,
}

impl RunReport {
    pub fn new(
        started_at: impl Into<String>,
        counts: ChangeCounts,
        active_events: usize,
        history_total: usize,
        written: bool,
        sources: Vec<SourceStatus>,
    ) -> Self {
        let success = sources.iter().all(SourceStatus::is_ok);
        Self {
            started_at: started_at.into(),
            active_events,
            added: counts.added,
            changed: counts.changed,
            removed: counts.removed,
            archived: counts.archived,
            history_total,
            written,
            sources,
            success,
        }
    }

    pub fn counts(&self) -> ChangeCounts {
        ChangeCounts {
            added: self.added,
            changed: self.changed,
            removed: self.removed,
            archived: self.archived,
        }
    }

    pub fn failed_sources(&self) -> impl Iterator<Item = &SourceStatus> {
        self.sources.iter().filter(|s| !s.is_ok())
    }

    /// Process exit code: 0 when every adapter succeeded, 1 otherwise.
    pub fn exit_code(&self) -> u8 {
        if self.success { 0 } else { 1 }
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Sources:")?;
        for source in &self.sources {
            match &source.error {
                None => writeln!(f, "  ✓ {:<22} {:>4} events", source.name, source.event_count)?,
                Some(err) => writeln!(f, "  ✗ {:<22} {}", source.name, err)?,
            }
        }
        writeln!(f)?;
        writeln!(f, "Active events:  {}", self.active_events)?;
        writeln!(f, "  added:        {}", self.added)?;
        writeln!(f, "  changed:      {}", self.changed)?;
        writeln!(f, "  removed:      {}", self.removed)?;
        writeln!(f, "  archived:     {}", self.archived)?;
        writeln!(f, "History total:  {}", self.history_total)?;
        if self.written {
            write!(f, "Files updated.")?;
        } else {
            write!(f, "No changes detected, files left untouched.")?;
        }
        if !self.success {
            let failed: Vec<_> = self.failed_sources().map(|s| s.id.as_str()).collect();
            write!(f, "\nFailed sources: {}", failed.join(", "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SourceInfo;

    fn info(id: &str) -> SourceInfo {
        SourceInfo {
            id: id.into(),
            name: id.to_uppercase(),
            url: format!("https://{id}.example"),
        }
    }

    #[test]
    fn test_success_requires_every_source() {
        let ok = SourceStatus::ok(&info("a"), "t", 3);
        let bad = SourceStatus::failed(&info("b"), "t", "timed out");

        let report = RunReport::new("t", ChangeCounts::default(), 3, 0, false, vec![ok.clone()]);
        assert!(report.success);
        assert_eq!(report.exit_code(), 0);

        let report = RunReport::new("t", ChangeCounts::default(), 3, 0, false, vec![ok, bad]);
        assert!(!report.success);
        assert_eq!(report.exit_code(), 1);
        assert_eq!(report.failed_sources().count(), 1);
        assert!(report.to_string().contains("Failed sources: b"));
    }

    #[test]
    fn test_no_change_is_distinct_from_failure() {
        let report = RunReport::new(
            "t",
            ChangeCounts::default(),
            0,
            0,
            false,
            vec![SourceStatus::ok(&info("a"), "t", 0)],
        );
        assert!(report.success);
        assert!(!report.counts().has_changes());
        assert!(report.to_string().contains("No changes detected"));
    }

    #[test]
    fn test_json_shape() {
        let counts = ChangeCounts {
            added: 1,
            changed: 2,
            removed: 3,
            archived: 4,
        };
        let report = RunReport::new("t", counts, 10, 20, true, vec![]);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["activeEvents"], 10);
        assert_eq!(json["historyTotal"], 20);
        assert_eq!(json["archived"], 4);
        assert_eq!(json["written"], true);
        assert_eq!(json["success"], true);
    }
}
