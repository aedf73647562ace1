// src/models/mod.rs

//! Domain models for the aggregator.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod event;
mod feed;
mod history;
mod source;

// Re-export all public types
pub use config::{Config, LoggingConfig, PathsConfig, ReconcileConfig, ScraperConfig};
pub use event::{Event, MAX_ID_LEN, event_id};
pub use feed::ScraperOutput;
pub use history::{HistoricalShow, HistoryKey, ShowHistory};
pub use source::{SourceInfo, SourceState, SourceStatus};
