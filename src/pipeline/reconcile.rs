//! Folding fresh adapter results into the persisted live set.

use std::collections::{BTreeMap, HashSet};

use crate::models::Event;
use crate::pipeline::diff::{ChangeCounts, ChangeDetector};

/// Per-adapter merge statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    pub added: usize,
    pub changed: usize,
    pub removed: usize,
    /// Distinct well-formed identities taken from the scrape
    pub accepted: usize,
}

/// Working map of live events keyed by identity.
///
/// Built from the previously persisted events; each successful adapter is
/// merged in with [`Reconciler::merge`]. Failed adapters are never merged,
/// so their previously known events stay exactly as they were.
#[derive(Debug)]
pub struct Reconciler {
    events: BTreeMap<String, Event>,
    detector: ChangeDetector,
    now: String,
    today: String,
    counts: ChangeCounts,
}

impl Reconciler {
    /// Start from the prior live set. `now` stamps newly observed events;
    /// `today` (`YYYY-MM-DD`) shields past events from the sweep.
    pub fn new(
        previous: impl IntoIterator<Item = Event>,
        detector: ChangeDetector,
        now: impl Into<String>,
        today: impl Into<String>,
    ) -> Self {
        let events = previous
            .into_iter()
            .map(|event| (event.id.clone(), event))
            .collect();
        Self {
            events,
            detector,
            now: now.into(),
            today: today.into(),
            counts: ChangeCounts::default(),
        }
    }

    /// Merge one adapter's successful result, then sweep the identities it
    /// no longer reports.
    ///
    /// Venues drop shows from their pages once they have happened, so a
    /// missing identity dated before today is left for archival instead of
    /// being counted as removed.
    pub fn merge(&mut self, source_id: &str, fresh: Vec<Event>) -> MergeStats {
        let mut stats = MergeStats::default();
        // Record held before this scrape, per identity, in first-seen order.
        let mut baselines: Vec<(String, Option<Event>)> = Vec::with_capacity(fresh.len());
        let mut seen: HashSet<String> = HashSet::with_capacity(fresh.len());

        for mut event in fresh {
            if !event.is_well_formed() {
                log::debug!("[{}] Ignoring malformed event {:?}", source_id, event.id);
                continue;
            }
            event.source = source_id.to_string();

            if seen.insert(event.id.clone()) {
                baselines.push((event.id.clone(), self.events.get(&event.id).cloned()));
            }
            // A repeat within one scrape replaces the earlier copy.
            self.events.insert(event.id.clone(), event);
        }

        for (id, baseline) in &baselines {
            let Some(current) = self.events.get_mut(id) else {
                continue;
            };
            match baseline {
                None => {
                    current.added_at = Some(self.now.clone());
                    stats.added += 1;
                }
                Some(previous) => {
                    current.added_at = previous
                        .added_at
                        .clone()
                        .or_else(|| Some(self.now.clone()));
                    if self.detector.is_changed(previous, current) {
                        stats.changed += 1;
                    }
                }
            }
        }
        stats.accepted = baselines.len();

        let today = self.today.as_str();
        self.events.retain(|id, event| {
            let gone = event.source == source_id
                && !seen.contains(id)
                && event.date.as_str() >= today;
            if gone {
                log::debug!("[{}] Listing disappeared: {}", source_id, id);
                stats.removed += 1;
            }
            !gone
        });

        self.counts.added += stats.added;
        self.counts.changed += stats.changed;
        self.counts.removed += stats.removed;
        stats
    }

    /// Counts accumulated so far.
    pub fn counts(&self) -> ChangeCounts {
        self.counts
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// The working set in identity order, plus the accumulated counts.
    pub fn finish(self) -> (Vec<Event>, ChangeCounts) {
        (self.events.into_values().collect(), self.counts)
    }
}
