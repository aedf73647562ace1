//! Local filesystem storage implementation.
//!
//! Documents are written atomically: serialized to a sibling `.tmp` file,
//! flushed, then renamed over the target.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Serialize, de::DeserializeOwned};

use crate::error::{AppError, Result};
use crate::models::{Config, ScraperOutput, ShowHistory};
use crate::storage::FeedStorage;

/// Local filesystem storage backend.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    events_path: PathBuf,
    history_path: PathBuf,
}

impl LocalStorage {
    /// Create a LocalStorage for explicit document paths.
    pub fn new(events_path: impl Into<PathBuf>, history_path: impl Into<PathBuf>) -> Self {
        Self {
            events_path: events_path.into(),
            history_path: history_path.into(),
        }
    }

    /// Create a LocalStorage from the configured output paths.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.events_path(), config.history_path())
    }

    pub fn events_path(&self) -> &Path {
        &self.events_path
    }

    pub fn history_path(&self) -> &Path {
        &self.history_path
    }

    /// Write bytes atomically (write to temp, then rename).
    fn write_bytes(path: &Path, bytes: &[u8]) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let tmp = path.with_extension("tmp");
        let mut file = fs::File::create(&tmp)?;
        file.write_all(bytes)?;
        file.sync_all()?;
        drop(file);

        fs::rename(&tmp, path)?;
        Ok(())
    }

    /// Write JSON data.
    fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(value)?;
        Self::write_bytes(path, &bytes)
    }

    /// Read bytes, returning None if file doesn't exist.
    fn read_bytes(path: &Path) -> Result<Option<Vec<u8>>> {
        match fs::read(path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }

    /// Read a JSON document, treating absent or unparsable files as empty.
    fn read_json_or_default<T: DeserializeOwned + Default>(path: &Path) -> Result<T> {
        let Some(bytes) = Self::read_bytes(path)? else {
            log::info!("No document at {}, starting empty", path.display());
            return Ok(T::default());
        };
        match serde_json::from_slice(&bytes) {
            Ok(value) => Ok(value),
            Err(e) => {
                log::warn!(
                    "Ignoring unreadable document {}: {}. Starting empty.",
                    path.display(),
                    e
                );
                Ok(T::default())
            }
        }
    }
}

impl FeedStorage for LocalStorage {
    fn load_feed(&self) -> Result<ScraperOutput> {
        let mut feed: ScraperOutput = Self::read_json_or_default(&self.events_path)?;

        let before = feed.events.len();
        feed.events.retain(|event| event.is_well_formed());
        let dropped = before - feed.events.len();
        if dropped > 0 {
            log::warn!(
                "Dropped {} malformed events from {}",
                dropped,
                self.events_path.display()
            );
        }
        Ok(feed)
    }

    fn load_history(&self) -> Result<ShowHistory> {
        Self::read_json_or_default(&self.history_path)
    }

    fn save_feed(&self, feed: &ScraperOutput) -> Result<()> {
        Self::write_json(&self.events_path, feed)?;
        log::info!(
            "Wrote {} events to {}",
            feed.events.len(),
            self.events_path.display()
        );
        Ok(())
    }

    fn save_history(&self, history: &ShowHistory) -> Result<()> {
        Self::write_json(&self.history_path, history)?;
        log::info!(
            "Wrote {} shows to {}",
            history.shows.len(),
            self.history_path.display()
        );
        Ok(())
    }
}
