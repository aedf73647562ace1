//! Reconciliation engine.
//!
//! - `reconcile`: merge each adapter's listing into the live set
//! - `archive`: move past events into history
//! - `diff`: change detection and run counters
//! - `run`: one full run, including the write gate
//! - `report`: the run summary
//! - `validate`: offline checks of a persisted feed

pub mod archive;
pub mod diff;
pub mod reconcile;
pub mod report;
pub mod run;
pub mod validate;

pub use archive::{ArchiveOutcome, archive_past};
pub use diff::{ChangeCounts, ChangeDetector};
pub use reconcile::{MergeStats, Reconciler};
pub use report::RunReport;
pub use run::{RunClock, RunScope, reconcile_sources, run_all, run_single};
pub use validate::{FeedValidation, Issue, validate_feed, validate_file};
