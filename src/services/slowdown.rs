//! The Slowdown (see-tickets list markup).

use chrono::NaiveDate;
use reqwest::blocking::Client;
use scraper::{ElementRef, Html, Selector};

use super::markup::{attr_of, first, first_attr, first_text, parse_selector};
use super::{CardOutcome, VenueScraper, collect_cards};
use crate::error::Result;
use crate::models::Event;
use crate::utils::dates::{find_time, parse_month_day};
use crate::utils::text::split_lineup;

const ID: &str = "theslowdown";
const NAME: &str = "The Slowdown";
const URL: &str = "https://theslowdown.com/events/";

const SUPPORT_PREFIX: &str = "Supporting Talent:";

struct CardSelectors {
    card: Selector,
    title: Selector,
    ticket: Selector,
    date: Selector,
    image: Selector,
    price: Selector,
    ages: Selector,
    showtime: Selector,
    support: Selector,
}

impl CardSelectors {
    fn new() -> Result<Self> {
        Ok(Self {
            card: parse_selector(".seetickets-list-event-container")?,
            title: parse_selector(".title a")?,
            ticket: parse_selector(r#"a.buy-button, a[href*="ticket"], a[href*="etix.com"]"#)?,
            date: parse_selector(".date")?,
            image: parse_selector("img.seetickets-list-view-event-image")?,
            price: parse_selector(".price")?,
            ages: parse_selector(".ages")?,
            showtime: parse_selector(".see-showtime")?,
            support: parse_selector(".supporting-talent")?,
        })
    }
}

pub struct Slowdown {
    client: Client,
    today: NaiveDate,
}

impl Slowdown {
    pub fn new(client: Client, today: NaiveDate) -> Self {
        Self { client, today }
    }
}

impl VenueScraper for Slowdown {
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
        let html = crate::utils::http::fetch_text(&self.client, URL)?;
        parse_listing(&html, self.today)
    }
}

pub(crate) fn parse_listing(html: &str, today: NaiveDate) -> Result<Vec<Event>> {
    let sel = CardSelectors::new()?;
    let document = Html::parse_document(html);
    let outcomes = document
        .select(&sel.card)
        .map(|card| parse_card(card, &sel, today));
    Ok(collect_cards(ID, outcomes))
}

fn parse_card(card: ElementRef<'_>, sel: &CardSelectors, today: NaiveDate) -> CardOutcome {
    let Some(title_el) = first(&card, &sel.title) else {
        return CardOutcome::Skipped("missing title");
    };
    let Some(title) = first_text(&card, &sel.title) else {
        return CardOutcome::Skipped("missing title");
    };
    let Some(date) = first_text(&card, &sel.date).and_then(|t| parse_month_day(&t, today)) else {
        return CardOutcome::Skipped("missing or unparsable date");
    };

    let supporting = first_text(&card, &sel.support).and_then(|text| {
        text.strip_prefix(SUPPORT_PREFIX)
            .map(split_lineup)
            .filter(|names| !names.is_empty())
    });

    let mut event = Event::new(ID, NAME, title, date).with_lineup(supporting);
    event.event_url = attr_of(title_el, "href");
    event.ticket_url = first_attr(&card, &sel.ticket, "href");
    event.image_url = first_attr(&card, &sel.image, "src");
    event.price = first_text(&card, &sel.price);
    event.age_restriction = first_text(&card, &sel.ages);
    event.time = first_text(&card, &sel.showtime).and_then(|t| find_time(&t));
    CardOutcome::Parsed(event)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"
    <div class="seetickets-list-events">
      <div class="seetickets-list-event-container">
        <img class="seetickets-list-view-event-image" src="https://cdn.example/poster.jpg">
        <p class="date">Fri Feb 27</p>
        <p class="title"><a href="https://theslowdown.com/event/psyclon-nine/">Psyclon Nine</a></p>
        <p class="supporting-talent">Supporting Talent: Ghost Note, Static Dress</p>
        <p class="see-showtime">8:00PM</p>
        <p class="price">$25.00</p>
        <p class="ages">All Ages</p>
        <a class="buy-button" href="https://wl.seetickets.us/event/123">Buy Tickets</a>
      </div>
      <div class="seetickets-list-event-container">
        <p class="date">Sat Feb 28</p>
        <p class="title"><a href="/event/no-extras/">No Extras</a></p>
      </div>
      <div class="seetickets-list-event-container">
        <p class="date">TBA</p>
        <p class="title"><a href="/event/undated/">Undated</a></p>
      </div>
      <div class="seetickets-list-event-container">
        <p class="date">Sun Mar 1</p>
      </div>
    </div>"#;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, 10).unwrap()
    }

    #[test]
    fn test_parses_full_card() {
        let events = parse_listing(FIXTURE, today()).unwrap();
        assert_eq!(events.len(), 2);

        let event = &events[0];
        assert_eq!(event.id, "theslowdown-2026-02-27-psyclon-nine");
        assert_eq!(event.venue, "The Slowdown");
        assert_eq!(event.source, "theslowdown");
        assert_eq!(event.time.as_deref(), Some("20:00"));
        assert_eq!(event.price.as_deref(), Some("$25.00"));
        assert_eq!(event.age_restriction.as_deref(), Some("All Ages"));
        assert_eq!(
            event.ticket_url.as_deref(),
            Some("https://wl.seetickets.us/event/123")
        );
        assert_eq!(
            event.supporting_artists,
            Some(vec!["Ghost Note".to_string(), "Static Dress".to_string()])
        );
    }

    #[test]
    fn test_optional_fields_stay_empty() {
        let events = parse_listing(FIXTURE, today()).unwrap();
        let bare = &events[1];
        assert_eq!(bare.date, "2026-02-28");
        assert!(bare.time.is_none());
        assert!(bare.image_url.is_none());
        assert!(bare.supporting_artists.is_none());
    }

    #[test]
    fn test_empty_page_is_empty_listing() {
        assert!(parse_listing("<html><body></body></html>", today()).unwrap().is_empty());
    }
}
