//! Venues on the RHP events plugin: Waiting Room, Reverb Lounge, Admiral.
//!
//! All three render `div.eventWrapper.rhpSingleEvent` cards. Admiral's
//! cards are less regular, so its markup variant uses wider selectors and
//! falls back to the card's plain text for price, age, time and lineup.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use reqwest::blocking::Client;
use scraper::{ElementRef, Html, Selector};

use super::markup::{attr_of, first_attr, first_text, inner_text, parse_selector};
use super::{CardOutcome, VenueScraper, collect_cards};
use crate::error::Result;
use crate::models::Event;
use crate::utils::absolutize;
use crate::utils::dates::{find_labeled_time, find_show_time, parse_month_day};
use crate::utils::http;
use crate::utils::text::{parse_support_line, split_lineup};

static PRICE_IN_TEXT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$[\d.]+(?: ADV)?(?:\s*/\s*\$[\d.]+ DOS)?(?:\s*/\s*\$[\d.]+ [A-Z ]+)?")
        .expect("valid price regex")
});

static LINEUP_IN_TEXT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"with\s+([A-Z][^$\n]+?)(?:\s+ALL AGES|\s+\d+\+|\s+Doors:)")
        .expect("valid lineup regex")
});

/// Selector set for one flavor of RHP markup.
struct Markup {
    title: &'static str,
    date: &'static str,
    detail_link: &'static str,
    ticket: &'static str,
    image: &'static str,
    price: &'static str,
    /// Read missing fields from the card's plain text
    text_fallbacks: bool,
}

static STANDARD: Markup = Markup {
    title: r#"h2[class*="rhp-event__title"]"#,
    date: ".eventMonth.singleEventDate, .singleEventDate",
    detail_link: ".eventMoreInfo a",
    ticket: r#"a[href*="etix.com"]"#,
    image: r#"img.eventListImage, img[class*="rhp-event__image"]"#,
    price: ".rhp-event__cost-text--list",
    text_fallbacks: false,
};

static LENIENT: Markup = Markup {
    title: r#"h2[class*="rhp-event__title"], .eventTitleDiv h2, h2"#,
    date: ".eventMonth, .singleEventDate",
    detail_link: r#"a[href*="/event/"]"#,
    ticket: r#"a[href*="etix.com"], a[href*="ticketmaster"], a[href*="axs.com"]"#,
    image: r#"img.eventListImage, img[class*="rhp-event__image"], .eventListImage img"#,
    price: ".rhp-event__cost-text--list, .eventCost",
    text_fallbacks: true,
};

struct CardSelectors {
    card: Selector,
    title: Selector,
    date: Selector,
    detail_link: Selector,
    ticket: Selector,
    any_link: Selector,
    image: Selector,
    price: Selector,
    age: Selector,
    time: Selector,
    support: Selector,
}

impl CardSelectors {
    fn new(markup: &Markup) -> Result<Self> {
        Ok(Self {
            card: parse_selector("div.eventWrapper.rhpSingleEvent")?,
            title: parse_selector(markup.title)?,
            date: parse_selector(markup.date)?,
            detail_link: parse_selector(markup.detail_link)?,
            ticket: parse_selector(markup.ticket)?,
            any_link: parse_selector("a[href]")?,
            image: parse_selector(markup.image)?,
            price: parse_selector(markup.price)?,
            age: parse_selector(".eventAgeRestriction")?,
            time: parse_selector(".rhp-event__time-text--list")?,
            support: parse_selector("h4")?,
        })
    }
}

/// One venue on the RHP plugin.
pub struct RhpVenue {
    id: &'static str,
    name: &'static str,
    url: &'static str,
    markup: &'static Markup,
    client: Client,
    today: NaiveDate,
}

impl RhpVenue {
    pub fn waiting_room(client: Client, today: NaiveDate) -> Self {
        Self {
            id: "waitingroom",
            name: "Waiting Room Lounge",
            url: "https://waitingroomlounge.com/events/",
            markup: &STANDARD,
            client,
            today,
        }
    }

    pub fn reverb_lounge(client: Client, today: NaiveDate) -> Self {
        Self {
            id: "reverblounge",
            name: "Reverb Lounge",
            url: "https://reverblounge.com/events/",
            markup: &STANDARD,
            client,
            today,
        }
    }

    pub fn admiral(client: Client, today: NaiveDate) -> Self {
        Self {
            id: "admiral",
            name: "Admiral",
            url: "https://admiralomaha.com/events/",
            markup: &LENIENT,
            client,
            today,
        }
    }

    pub(crate) fn parse_listing(&self, html: &str) -> Result<Vec<Event>> {
        let sel = CardSelectors::new(self.markup)?;
        let document = Html::parse_document(html);
        let outcomes = document
            .select(&sel.card)
            .map(|card| self.parse_card(card, &sel));
        Ok(collect_cards(self.id, outcomes))
    }

    fn parse_card(&self, card: ElementRef<'_>, sel: &CardSelectors) -> CardOutcome {
        let Some(title) = first_text(&card, &sel.title) else {
            return CardOutcome::Skipped("missing title");
        };
        let Some(date) = first_text(&card, &sel.date).and_then(|t| parse_month_day(&t, self.today))
        else {
            return CardOutcome::Skipped("missing or unparsable date");
        };

        let supporting = card
            .select(&sel.support)
            .find_map(|h4| parse_support_line(&inner_text(h4)));

        let mut event = Event::new(self.id, self.name, title, date).with_lineup(supporting);
        event.event_url = absolutize(self.url, first_attr(&card, &sel.detail_link, "href").as_deref());
        event.ticket_url = first_attr(&card, &sel.ticket, "href");
        event.image_url = first_attr(&card, &sel.image, "src");
        event.price = first_text(&card, &sel.price);
        event.age_restriction = first_text(&card, &sel.age);
        event.time = first_text(&card, &sel.time).and_then(|t| find_show_time(&t));

        if self.markup.text_fallbacks {
            fill_from_text(&mut event, card, sel);
        }
        CardOutcome::Parsed(event)
    }
}

/// Fill what the selectors missed from the card's plain text.
fn fill_from_text(event: &mut Event, card: ElementRef<'_>, sel: &CardSelectors) {
    let text = inner_text(card);

    if event.ticket_url.is_none() {
        event.ticket_url = card
            .select(&sel.any_link)
            .find(|a| inner_text(*a).to_lowercase().contains("buy tickets"))
            .and_then(|a| attr_of(a, "href"));
    }
    if event.price.is_none() {
        event.price = PRICE_IN_TEXT
            .find(&text)
            .map(|m| m.as_str().trim().to_string());
    }
    if event.age_restriction.is_none() {
        event.age_restriction = age_from_text(&text).map(str::to_string);
    }
    if event.time.is_none() {
        event.time =
            find_labeled_time(&text, "Show:").or_else(|| find_labeled_time(&text, "Doors:"));
    }
    if event.supporting_artists.is_none() {
        let lineup = LINEUP_IN_TEXT
            .captures(&text)
            .map(|caps| split_lineup(&caps[1]))
            .filter(|names| !names.is_empty());
        event.supporting_artists = lineup;
    }
}

fn age_from_text(text: &str) -> Option<&'static str> {
    if text.to_uppercase().contains("ALL AGES") {
        Some("All Ages")
    } else if text.contains("21+") {
        Some("21+")
    } else if text.contains("18+") || text.to_lowercase().contains("18 and up") {
        Some("18+")
    } else {
        None
    }
}

impl VenueScraper for RhpVenue {
    fn id(&self) -> &str {
        self.id
    }

    fn name(&self) -> &str {
        self.name
    }

    fn url(&self) -> &str {
        self.url
    }

    fn collect(&self) -> Result<Vec<Event>> {
        let html = http::fetch_text(&self.client, self.url)?;
        self.parse_listing(&html)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, 10).unwrap()
    }

    const REVERB: &str = r#"
    <div class="rhp-events">
      <div class="eventWrapper rhpSingleEvent">
        <img class="eventListImage" src="https://reverblounge.com/wp-content/uploads/band.jpg">
        <div class="eventMonth singleEventDate">Thu, Feb 26</div>
        <h2 class="font1by25 rhp-event__title--list">Hotel Fiction</h2>
        <h4>with Sunday Gravy, Gone Hollow &amp; Mr. Ex</h4>
        <span class="rhp-event__time-text--list">Doors: 7 pm // Show: 8 pm</span>
        <span class="rhp-event__cost-text--list">$15 ADV / $18 DOS</span>
        <div class="eventAgeRestriction">21+</div>
        <div class="eventMoreInfo"><a href="/event/hotel-fiction/">More Info</a></div>
        <a href="https://www.etix.com/ticket/p/123">Tickets</a>
      </div>
      <div class="eventWrapper rhpSingleEvent">
        <div class="eventMonth singleEventDate">Jan 2</div>
        <h2 class="rhp-event__title--list">Next Year</h2>
      </div>
      <div class="eventWrapper rhpSingleEvent">
        <div class="eventMonth singleEventDate">Sat, Mar 7</div>
      </div>
    </div>"#;

    #[test]
    fn test_standard_markup() {
        let client = Client::new();
        let venue = RhpVenue::reverb_lounge(client, today());
        let events = venue.parse_listing(REVERB).unwrap();
        assert_eq!(events.len(), 2);

        let event = &events[0];
        assert_eq!(event.id, "reverblounge-2026-02-26-hotel-fiction");
        assert_eq!(event.time.as_deref(), Some("20:00"));
        assert_eq!(event.price.as_deref(), Some("$15 ADV / $18 DOS"));
        assert_eq!(event.age_restriction.as_deref(), Some("21+"));
        assert_eq!(
            event.event_url.as_deref(),
            Some("https://reverblounge.com/event/hotel-fiction/")
        );
        assert_eq!(
            event.ticket_url.as_deref(),
            Some("https://www.etix.com/ticket/p/123")
        );
        assert_eq!(
            event.supporting_artists,
            Some(vec![
                "Sunday Gravy".to_string(),
                "Gone Hollow".to_string(),
                "Mr. Ex".to_string()
            ])
        );

        assert_eq!(events[1].date, "2027-01-02");
    }

    #[test]
    fn test_waiting_room_shares_markup() {
        let venue = RhpVenue::waiting_room(Client::new(), today());
        let events = venue.parse_listing(REVERB).unwrap();
        assert_eq!(events[0].id, "waitingroom-2026-02-26-hotel-fiction");
        assert_eq!(events[0].venue, "Waiting Room Lounge");
    }

    const ADMIRAL: &str = r#"
    <div class="eventWrapper rhpSingleEvent">
      <div class="eventTitleDiv"><h2>Drive-By Truckers</h2></div>
      <div class="eventMonth">Fri, Mar 13</div>
      <p>with Lucero, Buffalo Nichols ALL AGES Doors: 6:30 pm Show: 7:30 pm</p>
      <p>$35 ADV / $40 DOS</p>
      <a href="/event/drive-by-truckers/">More Info</a>
      <a href="https://admiralomaha.com/tickets/dbt">Buy Tickets</a>
    </div>"#;

    #[test]
    fn test_admiral_text_fallbacks() {
        let venue = RhpVenue::admiral(Client::new(), today());
        let events = venue.parse_listing(ADMIRAL).unwrap();
        assert_eq!(events.len(), 1);

        let event = &events[0];
        assert_eq!(event.id, "admiral-2026-03-13-drive-by-truckers");
        assert_eq!(event.price.as_deref(), Some("$35 ADV / $40 DOS"));
        assert_eq!(event.age_restriction.as_deref(), Some("All Ages"));
        assert_eq!(event.time.as_deref(), Some("19:30"));
        assert_eq!(
            event.supporting_artists,
            Some(vec!["Lucero".to_string(), "Buffalo Nichols".to_string()])
        );
        assert_eq!(
            event.event_url.as_deref(),
            Some("https://admiralomaha.com/event/drive-by-truckers/")
        );
        assert_eq!(
            event.ticket_url.as_deref(),
            Some("https://admiralomaha.com/tickets/dbt")
        );
    }

    #[test]
    fn test_age_from_text() {
        assert_eq!(age_from_text("18 and up"), Some("18+"));
        assert_eq!(age_from_text("nothing here"), None);
    }
}
