//! Per-adapter run outcome.

use serde::{Deserialize, Serialize};

/// Whether an adapter produced a listing this run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceState {
    #[default]
    Ok,
    Error,
}

/// Descriptive identity of one adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceInfo {
    pub id: String,
    pub name: String,
    pub url: String,
}

/// Outcome of running one adapter once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SourceStatus {
    pub name: String,
    pub id: String,
    pub url: String,
    pub status: SourceState,
    /// When the attempt finished (RFC 3339)
    pub last_scraped: String,
    pub event_count: usize,
    pub error: Option<String>,
}

impl SourceStatus {
    /// A successful collection of `event_count` listings.
    pub fn ok(info: &SourceInfo, at: impl Into<String>, event_count: usize) -> Self {
        Self {
            name: info.name.clone(),
            id: info.id.clone(),
            url: info.url.clone(),
            status: SourceState::Ok,
            last_scraped: at.into(),
            event_count,
            error: None,
        }
    }

    /// A failed collection.
    pub fn failed(info: &SourceInfo, at: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            name: info.name.clone(),
            id: info.id.clone(),
            url: info.url.clone(),
            status: SourceState::Error,
            last_scraped: at.into(),
            event_count: 0,
            error: Some(error.into()),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == SourceState::Ok
    }
}
