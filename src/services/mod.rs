//! Venue adapters.
//!
//! Every venue is one implementation of [`VenueScraper`]; the
//! [`ScraperRegistry`] builds the configured ones in order and the
//! reconciliation run drives them one at a time. Adding a venue means adding
//! an adapter and a line in [`ScraperRegistry::build`].

mod astro;
mod cache;
mod markup;
mod opa;
mod rhp;
mod slowdown;
mod steelhouse;
mod ticketweb;
mod underground;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, NaiveDate};
use reqwest::blocking::Client;

use crate::error::Result;
use crate::models::{Config, Event, SourceInfo};
use crate::utils::http;

pub use astro::{AstroTheater, ImageCache};
pub use cache::ListingCache;
pub use opa::{OpaCard, OpaListing, OpaVenue};
pub use rhp::RhpVenue;
pub use slowdown::Slowdown;
pub use steelhouse::SteelHouse;
pub use ticketweb::{TicketWebCalendar, TicketWebWidget};
pub use underground::OtherVenues;

/// Every adapter id this build knows, in canonical run order.
pub const BUILTIN_SOURCES: &[&str] = &[
    "theslowdown",
    "waitingroom",
    "reverblounge",
    "bourbontheatre",
    "admiral",
    "astrotheater",
    "steelhouse",
    "other",
    "holland",
    "orpheum",
    "barnato",
];

/// A venue-specific collector.
///
/// `collect` returning `Ok(vec![])` means the venue lists nothing right
/// now; any `Err` means the listing is unknown this run.
pub trait VenueScraper: Send + Sync {
    /// Stable lowercase identifier, also the identity prefix of its events
    fn id(&self) -> &str;
    /// Display name
    fn name(&self) -> &str;
    /// Canonical listing URL
    fn url(&self) -> &str;
    /// Fetch and normalize the venue's current listing.
    fn collect(&self) -> Result<Vec<Event>>;

    fn info(&self) -> SourceInfo {
        SourceInfo {
            id: self.id().to_string(),
            name: self.name().to_string(),
            url: self.url().to_string(),
        }
    }
}

/// Result of reading one listing card.
#[derive(Debug)]
pub enum CardOutcome {
    Parsed(Event),
    /// The card lacked something required; carries the reason
    Skipped(&'static str),
}

/// Keep parsed cards and log skipped ones.
pub fn collect_cards(
    source_id: &str,
    outcomes: impl IntoIterator<Item = CardOutcome>,
) -> Vec<Event> {
    let mut events = Vec::new();
    let mut skipped = 0usize;
    for outcome in outcomes {
        match outcome {
            CardOutcome::Parsed(event) => events.push(event),
            CardOutcome::Skipped(reason) => {
                skipped += 1;
                log::debug!("[{}] Skipped card: {}", source_id, reason);
            }
        }
    }
    if skipped > 0 {
        log::debug!(
            "[{}] {} cards parsed, {} skipped",
            source_id,
            events.len(),
            skipped
        );
    }
    events
}

/// Drop later events whose identity was already produced, keeping order.
pub(crate) fn dedupe_by_id(events: Vec<Event>) -> Vec<Event> {
    let mut seen = std::collections::HashSet::new();
    events
        .into_iter()
        .filter(|event| seen.insert(event.id.clone()))
        .collect()
}

/// Shared per-run inputs for building adapters.
struct BuildContext {
    client: Client,
    today: NaiveDate,
    images: ImageCache,
    listing_ttl: Duration,
}

/// Configured adapters, in run order.
pub struct ScraperRegistry {
    scrapers: Vec<Box<dyn VenueScraper>>,
}

impl ScraperRegistry {
    /// Build every adapter named in `config.sources`, sharing one HTTP client
    /// and, for the ticketomaha venues, one listing cache.
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = http::create_client(&config.scraper)?;
        let context = BuildContext {
            images: ImageCache::new(
                client.clone(),
                PathBuf::from(&config.scraper.image_dir),
                &config.scraper.image_url_prefix,
            ),
            client,
            today: Local::now().date_naive(),
            listing_ttl: Duration::from_secs(config.scraper.listing_cache_ttl_secs),
        };

        let mut opa: Option<Arc<OpaListing>> = None;
        let mut scrapers = Vec::with_capacity(config.sources.len());
        for id in &config.sources {
            match Self::build(id, &context, &mut opa) {
                Some(scraper) => scrapers.push(scraper),
                None => log::warn!("Ignoring unknown source id: {}", id),
            }
        }
        Ok(Self { scrapers })
    }

    /// Wrap an explicit adapter list.
    pub fn with_scrapers(scrapers: Vec<Box<dyn VenueScraper>>) -> Self {
        Self { scrapers }
    }

    fn build(
        id: &str,
        ctx: &BuildContext,
        opa: &mut Option<Arc<OpaListing>>,
    ) -> Option<Box<dyn VenueScraper>> {
        let client = ctx.client.clone();
        let scraper: Box<dyn VenueScraper> = match id {
            "theslowdown" => Box::new(Slowdown::new(client, ctx.today)),
            "waitingroom" => Box::new(RhpVenue::waiting_room(client, ctx.today)),
            "reverblounge" => Box::new(RhpVenue::reverb_lounge(client, ctx.today)),
            "bourbontheatre" => Box::new(TicketWebCalendar::bourbon_theatre(client)),
            "admiral" => Box::new(RhpVenue::admiral(client, ctx.today)),
            "astrotheater" => Box::new(AstroTheater::new(client, ctx.today, ctx.images.clone())),
            "steelhouse" => Box::new(SteelHouse::new(client)),
            "other" => Box::new(OtherVenues::new(client)),
            "holland" | "orpheum" => {
                let listing = opa
                    .get_or_insert_with(|| {
                        Arc::new(OpaListing::new(client, ctx.today, ctx.listing_ttl))
                    })
                    .clone();
                if id == "holland" {
                    Box::new(OpaVenue::holland(listing))
                } else {
                    Box::new(OpaVenue::orpheum(listing))
                }
            }
            "barnato" => Box::new(TicketWebWidget::barnato(client)),
            _ => return None,
        };
        Some(scraper)
    }

    pub fn get(&self, id: &str) -> Option<&dyn VenueScraper> {
        self.scrapers
            .iter()
            .find(|s| s.id() == id)
            .map(|s| s.as_ref())
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn VenueScraper> {
        self.scrapers.iter().map(|s| s.as_ref())
    }

    pub fn infos(&self) -> Vec<SourceInfo> {
        self.iter().map(|s| s.info()).collect()
    }

    pub fn len(&self) -> usize {
        self.scrapers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scrapers.is_empty()
    }
}
