// src/pipeline/validate.rs

//! Pre-deploy checks of a persisted live feed.

use std::fmt;
use std::fs;
use std::path::Path;

use crate::error::Result;
use crate::models::{Event, ScraperOutput};
use crate::utils::dates::is_iso_date;

/// One problem found in the feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    /// Title of the offending event, or `(unknown)`
    pub event: String,
    pub message: String,
    pub url: Option<String>,
}

impl Issue {
    fn new(event: &Event, message: impl Into<String>) -> Self {
        let title = if event.title.is_empty() {
            "(unknown)".to_string()
        } else {
            event.title.clone()
        };
        Self {
            event: title,
            message: message.into(),
            url: None,
        }
    }

    fn with_url(mut self, url: &str) -> Self {
        self.url = Some(url.to_string());
        self
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.event, self.message)?;
        if let Some(url) = &self.url {
            write!(f, " ({url})")?;
        }
        Ok(())
    }
}

/// Errors block a deploy; warnings only ask for a look.
#[derive(Debug, Default)]
pub struct FeedValidation {
    pub checked: usize,
    pub errors: Vec<Issue>,
    pub warnings: Vec<Issue>,
}

impl FeedValidation {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Check every event in `feed`.
///
/// `local_image_prefix` is where cached poster images are served from;
/// those files are stored as `.webp`, so a `.png` reference there is broken.
pub fn validate_feed(feed: &ScraperOutput, local_image_prefix: &str) -> FeedValidation {
    let local_prefix = format!("{}/", local_image_prefix.trim_end_matches('/'));
    let mut report = FeedValidation {
        checked: feed.events.len(),
        ..FeedValidation::default()
    };

    for event in &feed.events {
        if let Some(url) = event.image_url.as_deref() {
            if url.starts_with("http") && url.ends_with(".webp") {
                report.warnings.push(
                    Issue::new(event, "external image URL ends with .webp, verify it exists")
                        .with_url(url),
                );
            }
            if url.starts_with(&local_prefix) && url.ends_with(".png") {
                report.errors.push(
                    Issue::new(event, "local image references .png but cached files are .webp")
                        .with_url(url),
                );
            }
        }

        let required = [
            ("id", &event.id),
            ("title", &event.title),
            ("date", &event.date),
            ("venue", &event.venue),
            ("source", &event.source),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                report.errors.push(Issue::new(event, format!("missing {field}")));
            }
        }

        if !event.date.is_empty() && !is_iso_date(&event.date) {
            report
                .errors
                .push(Issue::new(event, format!("malformed date {:?}", event.date)));
        }
    }

    report
}

/// Read the feed document at `path` as written, without load-time filtering.
pub fn validate_file(path: &Path, local_image_prefix: &str) -> Result<FeedValidation> {
    let bytes = fs::read(path)?;
    let feed: ScraperOutput = serde_json::from_slice(&bytes)?;
    Ok(validate_feed(&feed, local_image_prefix))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn feed(events: Vec<Event>) -> ScraperOutput {
        ScraperOutput {
            events,
            ..ScraperOutput::default()
        }
    }

    #[test]
    fn test_clean_feed_passes() {
        let mut event = Event::new("astrotheater", "The Astro", "Show", "2026-03-01");
        event.image_url = Some("/images/astro/0123456789ab.webp".into());

        let report = validate_feed(&feed(vec![event]), "/images/astro");
        assert!(report.is_ok());
        assert!(report.warnings.is_empty());
        assert_eq!(report.checked, 1);
    }

    #[test]
    fn test_image_checks() {
        let mut local_png = Event::new("astrotheater", "The Astro", "Local", "2026-03-01");
        local_png.image_url = Some("/images/astro/0123456789ab.png".into());
        let mut remote_webp = Event::new("admiral", "Admiral", "Remote", "2026-03-01");
        remote_webp.image_url = Some("https://cdn.example/poster.webp".into());

        let report = validate_feed(&feed(vec![local_png, remote_webp]), "/images/astro/");
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].event, "Local");
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].event, "Remote");
    }

    #[test]
    fn test_missing_fields_and_bad_dates() {
        let mut event = Event::new("admiral", "", "", "03/01/2026");
        event.source.clear();

        let report = validate_feed(&feed(vec![event]), "/images/astro");
        let messages: Vec<_> = report.errors.iter().map(|e| e.message.as_str()).collect();
        assert!(messages.contains(&"missing title"));
        assert!(messages.contains(&"missing venue"));
        assert!(messages.contains(&"missing source"));
        assert!(messages.iter().any(|m| m.starts_with("malformed date")));
        assert!(report.errors.iter().all(|e| e.event == "(unknown)"));
    }

    #[test]
    fn test_validate_file_reads_raw_document() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("events.json");
        fs::write(&path, r#"{"events":[{"title":"No Id","date":"2026-01-01"}]}"#).unwrap();

        let report = validate_file(&path, "/images/astro").unwrap();
        assert_eq!(report.checked, 1);
        assert!(!report.is_ok());
        assert!(report.errors.iter().any(|e| e.message == "missing id"));

        assert!(validate_file(&tmp.path().join("absent.json"), "/images/astro").is_err());
    }
}
