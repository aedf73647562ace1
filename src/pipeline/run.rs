//! One reconciliation run: load, collect, merge, archive, gate, persist.

use chrono::{DateTime, Local, NaiveDate, Utc};

use crate::error::{AppError, Result};
use crate::models::{ReconcileConfig, ScraperOutput, SourceStatus};
use crate::pipeline::archive::archive_past;
use crate::pipeline::diff::ChangeDetector;
use crate::pipeline::reconcile::Reconciler;
use crate::pipeline::report::RunReport;
use crate::services::{ScraperRegistry, VenueScraper};
use crate::storage::FeedStorage;
use crate::utils::dates;

/// The two reference points of a run.
#[derive(Debug, Clone, Copy)]
pub struct RunClock {
    /// Stamps first-seen and last-updated values
    pub now: DateTime<Utc>,
    /// Events dated strictly before this day are archived
    pub today: NaiveDate,
}

impl RunClock {
    pub fn system() -> Self {
        Self {
            now: Utc::now(),
            today: Local::now().date_naive(),
        }
    }

    pub fn fixed(now: DateTime<Utc>, today: NaiveDate) -> Self {
        Self { now, today }
    }

    pub fn timestamp(&self) -> String {
        self.now.to_rfc3339()
    }

    pub fn today_iso(&self) -> String {
        dates::iso(self.today)
    }
}

/// Which adapters a run covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunScope {
    /// Every configured adapter; the recorded statuses are replaced.
    All,
    /// A subset; statuses of adapters not run are carried forward.
    Partial,
}

/// Run every adapter in the registry, in configured order.
pub fn run_all(
    registry: &ScraperRegistry,
    storage: &dyn FeedStorage,
    settings: &ReconcileConfig,
    clock: &RunClock,
) -> Result<RunReport> {
    let scrapers: Vec<&dyn VenueScraper> = registry.iter().collect();
    reconcile_sources(&scrapers, RunScope::All, storage, settings, clock)
}

/// Run one named adapter against the whole persisted live set.
pub fn run_single(
    registry: &ScraperRegistry,
    source_id: &str,
    storage: &dyn FeedStorage,
    settings: &ReconcileConfig,
    clock: &RunClock,
) -> Result<RunReport> {
    let scraper = registry
        .get(source_id)
        .ok_or_else(|| AppError::UnknownSource(source_id.to_string()))?;
    reconcile_sources(&[scraper], RunScope::Partial, storage, settings, clock)
}

/// Core run over an explicit adapter list.
///
/// Adapter failures are recorded in the report and never abort the run.
/// Storage failures are returned.
pub fn reconcile_sources(
    scrapers: &[&dyn VenueScraper],
    scope: RunScope,
    storage: &dyn FeedStorage,
    settings: &ReconcileConfig,
    clock: &RunClock,
) -> Result<RunReport> {
    let now = clock.timestamp();
    let feed = storage.load_feed()?;
    let mut history = storage.load_history()?;
    log::info!(
        "Loaded {} live events and {} archived shows",
        feed.events.len(),
        history.shows.len()
    );

    let detector = ChangeDetector::from_settings(settings.compare_lineup);
    let mut reconciler = Reconciler::new(feed.events, detector, now.clone(), clock.today_iso());
    let mut statuses = Vec::with_capacity(scrapers.len());

    for scraper in scrapers {
        let info = scraper.info();
        log::info!("Scraping {}...", info.name);

        let status = match scraper.collect() {
            Ok(events) => {
                let scraped = events.len();
                let stats = reconciler.merge(&info.id, events);
                if stats.accepted < scraped {
                    log::debug!(
                        "  {}: {} of {} events were malformed or repeated",
                        info.id,
                        scraped - stats.accepted,
                        scraped
                    );
                }
                log::info!(
                    "  {}: {} events (+{} ~{} -{})",
                    info.id,
                    stats.accepted,
                    stats.added,
                    stats.changed,
                    stats.removed
                );
                SourceStatus::ok(&info, Utc::now().to_rfc3339(), stats.accepted)
            }
            Err(e) => {
                log::warn!("  {}: failed: {}", info.id, e);
                SourceStatus::failed(&info, Utc::now().to_rfc3339(), e.to_string())
            }
        };
        statuses.push(status);
    }

    let (events, mut counts) = reconciler.finish();
    let archive = archive_past(events, &mut history, &clock.today_iso());
    counts.archived = archive.archived;
    if archive.duplicates > 0 {
        log::debug!("{} past events were already archived", archive.duplicates);
    }

    let active_events = archive.active.len();
    let history_total = history.shows.len();
    let written = counts.has_changes();

    if written {
        let recorded = match scope {
            RunScope::All => statuses.clone(),
            RunScope::Partial => carry_forward(feed.sources, &statuses),
        };
        let output = ScraperOutput {
            events: archive.active,
            last_updated: now.clone(),
            sources: recorded,
        };
        history.last_updated = now.clone();

        storage.save_feed(&output)?;
        storage.save_history(&history)?;
    } else {
        log::info!("No changes detected, skipping file update");
    }

    Ok(RunReport::new(
        now,
        counts,
        active_events,
        history_total,
        written,
        statuses,
    ))
}

/// Replace the recorded statuses of the adapters that ran; keep the rest.
fn carry_forward(previous: Vec<SourceStatus>, current: &[SourceStatus]) -> Vec<SourceStatus> {
    let mut merged = previous;
    for status in current {
        match merged.iter_mut().find(|s| s.id == status.id) {
            Some(slot) => *slot = status.clone(),
            None => merged.push(status.clone()),
        }
    }
    merged
}
