//! Omaha Performing Arts venues (Holland Center, Orpheum Theater).
//!
//! Both venues come out of the same paginated ticketomaha.com listing. The
//! listing is fetched once into an [`OpaListing`] that both adapters share,
//! and each adapter keeps only the cards for its own venue.

use std::sync::{Arc, LazyLock};
use std::time::Duration;

use chrono::NaiveDate;
use regex::Regex;
use reqwest::blocking::Client;
use scraper::{ElementRef, Html, Selector};

use super::cache::ListingCache;
use super::markup::{first_attr, first_text, inner_text, parse_selector};
use super::{CardOutcome, VenueScraper, collect_cards};
use crate::error::Result;
use crate::models::Event;
use crate::utils::dates::{find_time, parse_month_day};
use crate::utils::http;

const SITE: &str = "https://ticketomaha.com";
const LISTING_URL: &str = "https://ticketomaha.com/events?themes%5B%5D=6";

/// Upper bound on listing pages followed in one fetch.
const MAX_PAGES: u32 = 30;

/// Venue text on a card and the adapter id it belongs to.
const VENUES: &[(&str, &str)] = &[
    ("Holland Performing Arts Center", "holland"),
    ("Orpheum Theater", "orpheum"),
];

static TITLE_AGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\((\d+\+)\)\s*$").expect("valid age suffix regex"));

fn page_url(page: u32) -> String {
    format!("{SITE}/events?start=&end=&themes%5B%5D=6&page={page}")
}

/// One card of the shared listing, tagged with the adapter it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpaCard {
    pub venue_id: &'static str,
    pub title: String,
    pub date: String,
    pub time: Option<String>,
    pub url: Option<String>,
    pub image_url: Option<String>,
    pub age_restriction: Option<String>,
}

/// Split a trailing `"(18+)"` off a title.
fn split_age(title: &str) -> (String, Option<String>) {
    match TITLE_AGE.captures(title) {
        Some(caps) => {
            let start = caps.get(0).map_or(title.len(), |m| m.start());
            (title[..start].trim().to_string(), Some(caps[1].to_string()))
        }
        None => (title.to_string(), None),
    }
}

struct CardSelectors {
    card: Selector,
    title: Selector,
    start: Selector,
    time: Selector,
    link: Selector,
    image: Selector,
    page_option: Selector,
}

impl CardSelectors {
    fn new() -> Result<Self> {
        Ok(Self {
            card: parse_selector("li.eventCard")?,
            title: parse_selector("h3.title")?,
            start: parse_selector(".start")?,
            time: parse_selector(".time")?,
            link: parse_selector(r#"a[href^="/events/"]"#)?,
            image: parse_selector("img")?,
            page_option: parse_selector("select[name=page] option")?,
        })
    }
}

/// One parsed listing page.
pub(crate) struct ListingPage {
    pub cards: Vec<OpaCard>,
    /// Highest page number offered by the page selector
    pub max_page: u32,
}

/// The ticketomaha.com listing, fetched at most once per cache lifetime.
pub struct OpaListing {
    client: Client,
    today: NaiveDate,
    cache: ListingCache<OpaCard>,
}

impl OpaListing {
    pub fn new(client: Client, today: NaiveDate, ttl: Duration) -> Self {
        Self {
            client,
            today,
            cache: ListingCache::new(ttl),
        }
    }

    /// Every card on every page, served from the cache while it is fresh.
    pub fn cards(&self) -> Result<Arc<Vec<OpaCard>>> {
        self.cache.get_or_fetch(|| self.fetch_all())
    }

    /// Walk the pages. A failure on the first page is an error; later
    /// failures or an empty page end the walk with what was collected.
    fn fetch_all(&self) -> Result<Vec<OpaCard>> {
        let mut cards = Vec::new();
        let mut page = 1;

        loop {
            let html = match http::fetch_text(&self.client, &page_url(page)) {
                Ok(html) => html,
                Err(e) if page > 1 => {
                    log::warn!("ticketomaha listing stopped at page {}: {}", page, e);
                    break;
                }
                Err(e) => return Err(e),
            };

            let parsed = parse_page(&html, self.today)?;
            if parsed.cards.is_empty() {
                break;
            }
            cards.extend(parsed.cards);

            if page >= parsed.max_page.min(MAX_PAGES) {
                break;
            }
            page += 1;
        }

        log::debug!("ticketomaha listing: {} cards", cards.len());
        Ok(cards)
    }
}

pub(crate) fn parse_page(html: &str, today: NaiveDate) -> Result<ListingPage> {
    let sel = CardSelectors::new()?;
    let document = Html::parse_document(html);

    let mut cards = Vec::new();
    let mut skipped = 0usize;
    for card in document.select(&sel.card) {
        match parse_card(card, &sel, today) {
            Ok(parsed) => cards.push(parsed),
            Err(reason) => {
                skipped += 1;
                log::debug!("ticketomaha: skipped card: {}", reason);
            }
        }
    }
    if skipped > 0 {
        log::debug!("ticketomaha: {} cards parsed, {} skipped", cards.len(), skipped);
    }

    let max_page = document
        .select(&sel.page_option)
        .filter_map(|option| inner_text(option).parse::<u32>().ok())
        .max()
        .unwrap_or(1);

    Ok(ListingPage { cards, max_page })
}

fn parse_card(
    card: ElementRef<'_>,
    sel: &CardSelectors,
    today: NaiveDate,
) -> std::result::Result<OpaCard, &'static str> {
    let raw_title = first_text(&card, &sel.title).ok_or("missing title")?;
    let text = inner_text(card);
    let venue_id = VENUES
        .iter()
        .find(|(name, _)| text.contains(name))
        .map(|(_, id)| *id)
        .ok_or("not a Holland or Orpheum show")?;
    let date = first_text(&card, &sel.start)
        .and_then(|t| parse_month_day(&t, today))
        .ok_or("missing or unparsable date")?;

    let time = first_text(&card, &sel.time)
        .filter(|t| !t.contains("Multiple"))
        .and_then(|t| find_time(&t));
    let (title, age_restriction) = split_age(&raw_title);

    Ok(OpaCard {
        venue_id,
        title,
        date,
        time,
        url: first_attr(&card, &sel.link, "href").map(|href| format!("{SITE}{href}")),
        image_url: first_attr(&card, &sel.image, "src"),
        age_restriction,
    })
}

/// One OPA venue, filtered out of the shared listing.
pub struct OpaVenue {
    id: &'static str,
    name: &'static str,
    listing: Arc<OpaListing>,
}

impl OpaVenue {
    pub fn holland(listing: Arc<OpaListing>) -> Self {
        Self {
            id: "holland",
            name: "Holland Center",
            listing,
        }
    }

    pub fn orpheum(listing: Arc<OpaListing>) -> Self {
        Self {
            id: "orpheum",
            name: "Orpheum Theater",
            listing,
        }
    }

    fn to_event(&self, card: &OpaCard) -> CardOutcome {
        let mut event = Event::new(self.id, self.name, card.title.as_str(), card.date.as_str());
        event.time = card.time.clone();
        event.event_url = card.url.clone();
        event.ticket_url = card.url.clone();
        event.image_url = card.image_url.clone();
        event.age_restriction = card.age_restriction.clone();
        CardOutcome::Parsed(event)
    }
}

impl VenueScraper for OpaVenue {
    fn id(&self) -> &str {
        self.id
    }

    fn name(&self) -> &str {
        self.name
    }

    fn url(&self) -> &str {
        LISTING_URL
    }

    fn collect(&self) -> Result<Vec<Event>> {
        let cards = self.listing.cards()?;
        let outcomes = cards
            .iter()
            .filter(|card| card.venue_id == self.id)
            .map(|card| self.to_event(card));
        Ok(collect_cards(self.id, outcomes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
    <ul class="events">
      <li class="eventCard">
        <a href="/events/detail/hamilton"><img src="https://ticketomaha.com/img/hamilton.jpg"></a>
        <h3 class="title">Hamilton</h3>
        <span class="start">Tue Mar 10</span>
        <span class="time">7:30 PM</span>
        <p class="venue">Orpheum Theater</p>
      </li>
      <li class="eventCard">
        <a href="/events/detail/comic"></a>
        <h3 class="title">Late Night Comic (18+)</h3>
        <span class="start">Fri Mar 13</span>
        <span class="time">Multiple Times</span>
        <p class="venue">Holland Performing Arts Center</p>
      </li>
      <li class="eventCard">
        <h3 class="title">Somewhere Else</h3>
        <span class="start">Sat Mar 14</span>
        <p class="venue">Baxter Arena</p>
      </li>
    </ul>
    <select name="page"><option>1</option><option>2</option><option>3</option></select>"#;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, 10).unwrap()
    }

    #[test]
    fn test_parse_page() {
        let page = parse_page(PAGE, today()).unwrap();
        assert_eq!(page.max_page, 3);
        assert_eq!(page.cards.len(), 2);

        let hamilton = &page.cards[0];
        assert_eq!(hamilton.venue_id, "orpheum");
        assert_eq!(hamilton.date, "2026-03-10");
        assert_eq!(hamilton.time.as_deref(), Some("19:30"));
        assert_eq!(
            hamilton.url.as_deref(),
            Some("https://ticketomaha.com/events/detail/hamilton")
        );

        let comic = &page.cards[1];
        assert_eq!(comic.venue_id, "holland");
        assert_eq!(comic.title, "Late Night Comic");
        assert_eq!(comic.age_restriction.as_deref(), Some("18+"));
        assert!(comic.time.is_none());
    }

    #[test]
    fn test_venues_share_one_fetch() {
        let listing = Arc::new(OpaListing::new(
            Client::new(),
            today(),
            Duration::from_secs(60),
        ));
        let cards = parse_page(PAGE, today()).unwrap().cards;
        listing.cache.get_or_fetch(|| Ok(cards)).unwrap();

        let holland = OpaVenue::holland(Arc::clone(&listing));
        let orpheum = OpaVenue::orpheum(listing);

        let held = holland.collect().unwrap();
        assert_eq!(held.len(), 1);
        assert_eq!(held[0].id, "holland-2026-03-13-late-night-comic");
        assert_eq!(held[0].venue, "Holland Center");

        let orph = orpheum.collect().unwrap();
        assert_eq!(orph.len(), 1);
        assert_eq!(orph[0].source, "orpheum");
        assert_eq!(orph[0].ticket_url, orph[0].event_url);
    }

    #[test]
    fn test_split_age() {
        assert_eq!(split_age("Show (21+)"), ("Show".to_string(), Some("21+".to_string())));
        assert_eq!(split_age("Show (Live)"), ("Show (Live)".to_string(), None));
    }
}
