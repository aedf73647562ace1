//! Storage abstractions for feed persistence.
//!
//! Two whole-document files, each read fully at the start of a run and
//! replaced wholesale at the end of one:
//!
//! ```text
//! output/
//! ├── events.json    # Live: upcoming events + last run's source statuses
//! └── history.json   # Archive: past shows, newest first
//! ```

pub mod local;

use crate::error::Result;
use crate::models::{ScraperOutput, ShowHistory};

// Re-export for convenience
pub use local::LocalStorage;

/// Trait for feed storage backends.
///
/// Loads never fail on absent or unparsable documents; they yield empty
/// defaults instead. Saves fail loudly.
pub trait FeedStorage {
    /// Load the live feed document.
    fn load_feed(&self) -> Result<ScraperOutput>;

    /// Load the history document.
    fn load_history(&self) -> Result<ShowHistory>;

    /// Replace the live feed document.
    fn save_feed(&self, feed: &ScraperOutput) -> Result<()>;

    /// Replace the history document.
    fn save_history(&self, history: &ShowHistory) -> Result<()>;
}
