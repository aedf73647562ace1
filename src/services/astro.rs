//! The Astro (theater and amphitheater), plus the local poster cache its
//! images go through.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use reqwest::blocking::Client;
use scraper::{ElementRef, Html, Selector};
use sha2::{Digest, Sha256};
use url::Url;

use super::markup::{first_attr, first_text, parse_selector};
use super::{CardOutcome, VenueScraper, collect_cards, dedupe_by_id};
use crate::error::{AppError, Result};
use crate::models::Event;
use crate::utils::dates::{find_time, parse_month_day};
use crate::utils::http;
use crate::utils::text::parse_support_line;

const ID: &str = "astrotheater";
const NAME: &str = "The Astro";
const URL: &str = "https://theastrotheater.com/#shows";

/// Hex characters of the URL digest kept in a cached file name.
const HASH_PREFIX_LEN: usize = 12;
const DEFAULT_EXTENSION: &str = ".png";

static PRICE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$[\d.]+").expect("valid price regex"));

/// Downloads remote posters once into a local directory, keyed by a hash
/// of the remote URL.
#[derive(Debug, Clone)]
pub struct ImageCache {
    client: Client,
    dir: PathBuf,
    url_prefix: String,
}

impl ImageCache {
    pub fn new(client: Client, dir: PathBuf, url_prefix: &str) -> Self {
        Self {
            client,
            dir,
            url_prefix: url_prefix.trim_end_matches('/').to_string(),
        }
    }

    /// `{first 12 hex chars of sha256(url)}{ext}`, where the extension comes
    /// from the URL path and defaults to `.png`.
    pub fn file_name(url: &str) -> String {
        let digest = hex::encode(Sha256::digest(url.as_bytes()));
        format!("{}{}", &digest[..HASH_PREFIX_LEN], url_extension(url))
    }

    /// Public reference for a cached file.
    pub fn public_ref(&self, file_name: &str) -> String {
        format!("{}/{}", self.url_prefix, file_name)
    }

    /// Make sure `url` is on disk and return its public reference.
    ///
    /// Existing files are not fetched again. Failures are logged and give
    /// `None`; they never fail the adapter.
    pub fn localize(&self, url: &str) -> Option<String> {
        let file_name = Self::file_name(url);
        let path = self.dir.join(&file_name);
        if path.exists() {
            return Some(self.public_ref(&file_name));
        }

        match self.download(url, &path) {
            Ok(()) => {
                log::debug!("Cached image {} as {}", url, path.display());
                Some(self.public_ref(&file_name))
            }
            Err(e) => {
                log::warn!("Failed to cache image {}: {}", url, e);
                None
            }
        }
    }

    fn download(&self, url: &str, path: &Path) -> Result<()> {
        let bytes = http::fetch_bytes(&self.client, url)?;
        fs::create_dir_all(&self.dir)?;
        fs::write(path, bytes)?;
        Ok(())
    }
}

fn url_extension(url: &str) -> String {
    let path = Url::parse(url)
        .map(|u| u.path().to_string())
        .unwrap_or_else(|_| url.to_string());
    Path::new(&path)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty())
        .map(|ext| format!(".{ext}"))
        .unwrap_or_else(|| DEFAULT_EXTENSION.to_string())
}

struct CardSelectors {
    card: Selector,
    headline: Selector,
    tagline: Selector,
    subheader: Selector,
    location: Selector,
    date: Selector,
    cost_age: Selector,
    more_info: Selector,
    buy: Selector,
    image: Selector,
}

impl CardSelectors {
    fn new() -> Result<Self> {
        Ok(Self {
            card: parse_selector(".grid-item")?,
            headline: parse_selector(".grid-item-headline h2")?,
            tagline: parse_selector(".grid-item-tagline")?,
            subheader: parse_selector(".grid-item-subheader")?,
            location: parse_selector(".grid-item-location")?,
            date: parse_selector(".grid-item-date")?,
            cost_age: parse_selector(".grid-item-cost-age")?,
            more_info: parse_selector(".grid-item-more-info a")?,
            buy: parse_selector(".grid-item-buy-tickets-btn a")?,
            image: parse_selector(".grid-featured-image img")?,
        })
    }
}

pub struct AstroTheater {
    client: Client,
    today: NaiveDate,
    images: ImageCache,
}

impl AstroTheater {
    pub fn new(client: Client, today: NaiveDate, images: ImageCache) -> Self {
        Self {
            client,
            today,
            images,
        }
    }
}

impl VenueScraper for AstroTheater {
    fn id(&self) -> &str {
        ID
    }

    fn name(&self) -> &str {
        NAME
    }

    fn url(&self) -> &str {
        URL
    }

    /// The grid is rendered client-side. A page without any grid items is
    /// an error so the known Astro shows are kept rather than swept.
    fn collect(&self) -> Result<Vec<Event>> {
        let html = http::fetch_text(&self.client, URL)?;
        let mut events = parse_listing(&html, self.today)?;
        for event in &mut events {
            event.image_url = event
                .image_url
                .take()
                .and_then(|remote| self.images.localize(&remote));
        }
        Ok(events)
    }
}

/// Parse the grid. Image references are left pointing at the remote poster.
///
/// Fails when the page has no grid items at all, which is what the
/// unrendered page shell looks like.
pub(crate) fn parse_listing(html: &str, today: NaiveDate) -> Result<Vec<Event>> {
    let sel = CardSelectors::new()?;
    let document = Html::parse_document(html);
    let cards: Vec<ElementRef<'_>> = document.select(&sel.card).collect();
    if cards.is_empty() {
        return Err(AppError::collect(
            ID,
            "no .grid-item elements; the show grid was not rendered",
        ));
    }
    let outcomes = cards
        .into_iter()
        .map(|card| parse_card(card, &sel, today));
    Ok(dedupe_by_id(collect_cards(ID, outcomes)))
}

fn parse_card(card: ElementRef<'_>, sel: &CardSelectors, today: NaiveDate) -> CardOutcome {
    let Some(headline) = first_text(&card, &sel.headline) else {
        return CardOutcome::Skipped("missing headline");
    };
    let Some(when) = first_text(&card, &sel.date) else {
        return CardOutcome::Skipped("missing date");
    };
    let Some(date) = parse_month_day(&when, today) else {
        return CardOutcome::Skipped("unparsable date");
    };

    let venue = first_text(&card, &sel.location).unwrap_or_else(|| NAME.to_string());
    let supporting = first_text(&card, &sel.subheader).and_then(|t| parse_support_line(&t));
    let (price, age) = first_text(&card, &sel.cost_age)
        .map(|t| parse_cost_age(&t))
        .unwrap_or_default();

    // identity uses the bare headline; the tagline only decorates the title
    let mut event = Event::new(ID, venue, headline.as_str(), date).with_lineup(supporting);
    if let Some(tagline) = first_text(&card, &sel.tagline) {
        event.title = format!("{headline} - {tagline}");
    }
    event.time = find_time(&when);
    event.price = price;
    event.age_restriction = age;
    event.event_url = first_attr(&card, &sel.more_info, "href");
    event.ticket_url = first_attr(&card, &sel.buy, "href");
    event.image_url = first_attr(&card, &sel.image, "src");
    CardOutcome::Parsed(event)
}

/// `"Starting at $41.10 | All Ages"` into price and age.
fn parse_cost_age(text: &str) -> (Option<String>, Option<String>) {
    let mut parts = text.split('|').map(str::trim);
    let price = parts
        .next()
        .and_then(|p| PRICE.find(p))
        .map(|m| m.as_str().to_string());
    let age = parts.next().and_then(|a| {
        if a.to_lowercase().contains("all ages") {
            Some("All Ages".to_string())
        } else if a.contains("21+") {
            Some("21+".to_string())
        } else if a.contains("18+") {
            Some("18+".to_string())
        } else {
            None
        }
    });
    (price, age)
}
