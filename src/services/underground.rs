//! Shows at every other venue, from the omahaunderground.net listing.
//!
//! The listing only names the venue and links a detail page, so each show
//! costs one more request. Venues that have their own adapter are skipped.

use std::sync::LazyLock;

use regex::Regex;
use reqwest::blocking::Client;
use scraper::{ElementRef, Html, Selector};

use super::markup::{first, first_attr, first_text, inner_text, parse_selector};
use super::{CardOutcome, VenueScraper, collect_cards};
use crate::error::Result;
use crate::models::Event;
use crate::utils::absolutize;
use crate::utils::dates::{find_time, parse_long_date};
use crate::utils::http;

const ID: &str = "other";
const NAME: &str = "Other";
const URL: &str = "https://omahaunderground.net/shows/";
const SITE: &str = "https://omahaunderground.net";

/// Lowercased venue names already covered by a dedicated adapter.
const COVERED_VENUES: &[&str] = &[
    "the slowdown",
    "slowdown",
    "waiting room",
    "waiting room lounge",
    "reverb lounge",
    "reverb",
    "bourbon theatre",
    "bourbon theater",
    "the admiral",
    "admiral",
    "the astro",
    "astro theater",
    "astro theatre",
    "steel house",
    "steelhouse",
    "steelhouse omaha",
];

static DOLLARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\d+").expect("valid dollar regex"));

fn is_covered(venue: &str) -> bool {
    COVERED_VENUES.contains(&venue.to_lowercase().as_str())
}

/// A show on the listing page that still needs its detail page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ShowLink {
    pub venue: String,
    pub detail_url: String,
}

struct ListingSelectors {
    show: Selector,
    venue: Selector,
    detail: Selector,
}

impl ListingSelectors {
    fn new() -> Result<Self> {
        Ok(Self {
            show: parse_selector("div.show")?,
            venue: parse_selector("h3 a[href*='/venues/']")?,
            detail: parse_selector("a[href*='/shows/2']")?,
        })
    }
}

struct DetailSelectors {
    date: Selector,
    title: Selector,
    image: Selector,
    info: Selector,
}

impl DetailSelectors {
    fn new() -> Result<Self> {
        Ok(Self {
            date: parse_selector("h2.name")?,
            title: parse_selector("div.below-name h1")?,
            image: parse_selector("div.below-name img")?,
            info: parse_selector("div.below-name h3")?,
        })
    }
}

pub struct OtherVenues {
    client: Client,
}

impl OtherVenues {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl VenueScraper for OtherVenues {
    fn id(&self) -> &str {
        ID
    }

    fn name(&self) -> &str {
        NAME
    }

    fn url(&self) -> &str {
        URL
    }

    fn collect(&self) -> Result<Vec<Event>> {
        let html = http::fetch_text(&self.client, URL)?;
        let links = parse_listing(&html)?;
        let detail = DetailSelectors::new()?;
        log::debug!("[{}] {} shows at uncovered venues", ID, links.len());

        let outcomes = links.iter().map(|link| {
            match http::fetch_text(&self.client, &link.detail_url) {
                Ok(page) => parse_detail(&page, link, &detail),
                Err(e) => {
                    log::debug!("[{}] Detail fetch failed for {}: {}", ID, link.detail_url, e);
                    CardOutcome::Skipped("detail page unavailable")
                }
            }
        });
        Ok(collect_cards(ID, outcomes))
    }
}

/// Shows at venues without their own adapter, in listing order.
pub(crate) fn parse_listing(html: &str) -> Result<Vec<ShowLink>> {
    let sel = ListingSelectors::new()?;
    let document = Html::parse_document(html);
    Ok(document
        .select(&sel.show)
        .filter_map(|show| show_link(show, &sel))
        .collect())
}

fn show_link(show: ElementRef<'_>, sel: &ListingSelectors) -> Option<ShowLink> {
    let venue = first(&show, &sel.venue).map(inner_text)?;
    if venue.is_empty() || is_covered(&venue) {
        return None;
    }
    let href = first_attr(&show, &sel.detail, "href")?;
    let detail_url = absolutize(SITE, Some(href.as_str()))?;
    Some(ShowLink { venue, detail_url })
}

fn parse_detail(html: &str, link: &ShowLink, sel: &DetailSelectors) -> CardOutcome {
    let document = Html::parse_document(html);
    let root = document.root_element();

    let Some(date) = first_text(&root, &sel.date).and_then(|t| parse_long_date(&t)) else {
        return CardOutcome::Skipped("missing or unparsable date");
    };
    let Some(title) = first_text(&root, &sel.title) else {
        return CardOutcome::Skipped("missing title");
    };

    let info = first_text(&root, &sel.info);
    let mut event = Event::new(ID, link.venue.as_str(), title, date);
    event.event_url = Some(link.detail_url.clone());
    event.image_url = first_attr(&root, &sel.image, "src");
    event.time = info.as_deref().and_then(find_time);
    event.price = info.as_deref().and_then(parse_price);
    CardOutcome::Parsed(event)
}

/// `"$10"`, `"$10 PWYC"`, `"Free"` or `"PWYC"` from a show's info line.
fn parse_price(text: &str) -> Option<String> {
    let lower = text.to_lowercase();
    let pwyc = lower.contains("pwyc");
    if let Some(amount) = DOLLARS.find(text) {
        let amount = amount.as_str();
        return Some(if pwyc {
            format!("{amount} PWYC")
        } else {
            amount.to_string()
        });
    }
    if lower.contains("free") {
        Some("Free".to_string())
    } else if pwyc || lower.contains("donation") {
        Some("PWYC".to_string())
    } else {
        None
    }
}
