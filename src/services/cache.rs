//! Short-lived cache for a listing shared by several adapters.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::error::Result;

/// Holds one fetched listing for `ttl`.
///
/// Owned by whoever builds the adapters that share it (one registry, one
/// run); nothing here is global.
#[derive(Debug)]
pub struct ListingCache<T> {
    ttl: Duration,
    entry: Mutex<Option<(Instant, Arc<Vec<T>>)>>,
}

impl<T> ListingCache<T> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entry: Mutex::new(None),
        }
    }

    /// Return the cached listing while it is fresh, otherwise call `fetch`
    /// and keep its result. Failed fetches are not cached.
    pub fn get_or_fetch(&self, fetch: impl FnOnce() -> Result<Vec<T>>) -> Result<Arc<Vec<T>>> {
        let mut entry = self.entry.lock().unwrap_or_else(|e| e.into_inner());

        if let Some((fetched_at, items)) = entry.as_ref() {
            if fetched_at.elapsed() < self.ttl {
                log::debug!("Listing cache hit ({} items)", items.len());
                return Ok(Arc::clone(items));
            }
        }

        let items = Arc::new(fetch()?);
        *entry = Some((Instant::now(), Arc::clone(&items)));
        Ok(items)
    }

    /// Drop the cached listing.
    pub fn clear(&self) {
        *self.entry.lock().unwrap_or_else(|e| e.into_inner()) = None;
    }
}
