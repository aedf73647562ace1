//! Venues that embed TicketWeb markup: Barnato's paginated widget and
//! Bourbon Theatre's calendar.

use std::sync::LazyLock;

use regex::Regex;
use reqwest::blocking::Client;
use scraper::{ElementRef, Html, Selector};

use super::markup::{attr_of, first, first_attr, first_text, inner_text, parse_selector};
use super::{CardOutcome, VenueScraper, collect_cards, dedupe_by_id};
use crate::error::Result;
use crate::models::Event;
use crate::utils::dates::{find_clock, find_time, parse_long_date};
use crate::utils::http;
use crate::utils::text::slugify;

/// Upper bound on widget pages followed in one collection.
const MAX_PAGES: u32 = 20;

/// Calendar entries are matched to events on this many slug characters.
const MATCH_SLUG_LEN: usize = 30;

static TWPAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"twpage=(\d+)").expect("valid twpage regex"));

fn widget_time(text: &str) -> Option<String> {
    find_clock(text.trim().trim_start_matches('-'))
}

struct WidgetSelectors {
    section: Selector,
    name: Selector,
    date: Selector,
    time: Selector,
    price: Selector,
    buy: Selector,
    image: Selector,
    age: Selector,
    page_link: Selector,
}

impl WidgetSelectors {
    fn new() -> Result<Self> {
        Ok(Self {
            section: parse_selector(".tw-section")?,
            name: parse_selector(".tw-name a")?,
            date: parse_selector(".tw-event-date")?,
            time: parse_selector(".tw-event-time-complete, .tw-event-time")?,
            price: parse_selector(".tw-price")?,
            buy: parse_selector("a.tw-buy-tix-btn")?,
            image: parse_selector("img")?,
            age: parse_selector(".tw-age-restriction")?,
            page_link: parse_selector(r#"a[href*="twpage"]"#)?,
        })
    }
}

/// One page of a widget listing.
pub(crate) struct WidgetPage {
    pub events: Vec<Event>,
    /// Page number the "Next" link points at, if any
    pub next: Option<u32>,
}

/// A venue site with an embedded, paginated TicketWeb widget.
pub struct TicketWebWidget {
    id: &'static str,
    name: &'static str,
    url: &'static str,
    client: Client,
}

impl TicketWebWidget {
    pub fn barnato(client: Client) -> Self {
        Self {
            id: "barnato",
            name: "Barnato",
            url: "https://barnato.bar/events/",
            client,
        }
    }

    fn page_url(&self, page: u32) -> String {
        if page == 0 {
            self.url.to_string()
        } else {
            format!("{}?twpage={}", self.url, page)
        }
    }

    pub(crate) fn parse_page(&self, html: &str) -> Result<WidgetPage> {
        let sel = WidgetSelectors::new()?;
        let document = Html::parse_document(html);
        let outcomes = document
            .select(&sel.section)
            .map(|section| self.parse_section(section, &sel));
        let events = collect_cards(self.id, outcomes);

        let next = document
            .select(&sel.page_link)
            .filter(|a| inner_text(*a).contains("Next"))
            .filter_map(|a| {
                let href = a.value().attr("href")?;
                TWPAGE.captures(href)?[1].parse::<u32>().ok()
            })
            .last();

        Ok(WidgetPage { events, next })
    }

    fn parse_section(&self, section: ElementRef<'_>, sel: &WidgetSelectors) -> CardOutcome {
        let Some(name_link) = first(&section, &sel.name) else {
            return CardOutcome::Skipped("missing name link");
        };
        let title = inner_text(name_link);
        if title.is_empty() {
            return CardOutcome::Skipped("missing title");
        }
        let Some(date) = first_text(&section, &sel.date).and_then(|t| parse_long_date(&t)) else {
            return CardOutcome::Skipped("missing or unparsable date");
        };

        let image = first(&section, &sel.image).and_then(|img| {
            attr_of(img, "data-lazy-src")
                .or_else(|| attr_of(img, "src"))
                .filter(|src| !src.starts_with("data:"))
        });

        let mut event = Event::new(self.id, self.name, title, date);
        event.event_url = attr_of(name_link, "href");
        event.time = first_text(&section, &sel.time).and_then(|t| widget_time(&t));
        event.price = first_text(&section, &sel.price);
        event.ticket_url = first_attr(&section, &sel.buy, "href");
        event.image_url = image;
        event.age_restriction = first_text(&section, &sel.age);
        CardOutcome::Parsed(event)
    }
}

impl VenueScraper for TicketWebWidget {
    fn id(&self) -> &str {
        self.id
    }

    fn name(&self) -> &str {
        self.name
    }

    fn url(&self) -> &str {
        self.url
    }

    /// Follow "Next" links until a page is empty, fails, or stops advancing.
    /// Only a failure on the first page fails the adapter.
    fn collect(&self) -> Result<Vec<Event>> {
        let mut events = Vec::new();
        let mut page = 0;

        for fetched in 0..MAX_PAGES {
            let html = match http::fetch_text(&self.client, &self.page_url(page)) {
                Ok(html) => html,
                Err(e) if fetched > 0 => {
                    log::warn!("[{}] Stopping at page {}: {}", self.id, page, e);
                    break;
                }
                Err(e) => return Err(e),
            };

            let parsed = self.parse_page(&html)?;
            if parsed.events.is_empty() {
                break;
            }
            events.extend(parsed.events);

            match parsed.next {
                Some(next) if next > page => page = next,
                _ => break,
            }
        }

        Ok(dedupe_by_id(events))
    }
}

struct CalendarSelectors {
    event: Selector,
    name: Selector,
    image: Selector,
    date: Selector,
    time: Selector,
    content: Selector,
    content_title: Selector,
    content_time: Selector,
    content_doors: Selector,
}

impl CalendarSelectors {
    fn new() -> Result<Self> {
        Ok(Self {
            event: parse_selector(".tw-cal-event")?,
            name: parse_selector(".tw-name a")?,
            image: parse_selector(".tw-image img")?,
            date: parse_selector(".tw-event-date")?,
            time: parse_selector(".tw-calendar-event-time, .tw-event-time-complete")?,
            content: parse_selector(".tw-calendar-event-content")?,
            content_title: parse_selector(".tw-calendar-event-title")?,
            content_time: parse_selector(".tw-calendar-event-time")?,
            content_doors: parse_selector(".tw-calendar-event-doors")?,
        })
    }
}

/// A venue whose calendar page renders TicketWeb month-view markup.
pub struct TicketWebCalendar {
    id: &'static str,
    name: &'static str,
    url: &'static str,
    client: Client,
}

impl TicketWebCalendar {
    pub fn bourbon_theatre(client: Client) -> Self {
        Self {
            id: "bourbontheatre",
            name: "Bourbon Theatre",
            url: "https://www.bourbontheatre.com/calendar/",
            client,
        }
    }

    pub(crate) fn parse_listing(&self, html: &str) -> Result<Vec<Event>> {
        let sel = CalendarSelectors::new()?;
        let document = Html::parse_document(html);
        let outcomes = document
            .select(&sel.event)
            .map(|el| self.parse_event(el, &sel));
        let mut events = dedupe_by_id(collect_cards(self.id, outcomes));

        for content in document.select(&sel.content) {
            fill_calendar_time(&mut events, content, &sel);
        }
        Ok(events)
    }

    fn parse_event(&self, el: ElementRef<'_>, sel: &CalendarSelectors) -> CardOutcome {
        let Some(name_link) = first(&el, &sel.name) else {
            return CardOutcome::Skipped("missing name link");
        };
        let title = inner_text(name_link);
        if title.is_empty() {
            return CardOutcome::Skipped("missing title");
        }
        let Some(date) = first_text(&el, &sel.date).and_then(|t| parse_long_date(&t)) else {
            return CardOutcome::Skipped("missing or unparsable date");
        };

        let mut event = Event::new(self.id, self.name, title, date);
        event.event_url = attr_of(name_link, "href");
        event.image_url = first_attr(&el, &sel.image, "src");
        event.time = first_text(&el, &sel.time).and_then(|t| find_time(&t));
        CardOutcome::Parsed(event)
    }
}

fn short_slug(title: &str) -> String {
    slugify(title).chars().take(MATCH_SLUG_LEN).collect()
}

/// Give the first event whose title loosely matches a calendar popup the
/// popup's show (or doors) time, unless the event already has one.
fn fill_calendar_time(events: &mut [Event], content: ElementRef<'_>, sel: &CalendarSelectors) {
    let Some(slug) = first_text(&content, &sel.content_title)
        .map(|t| short_slug(&t))
        .filter(|s| !s.is_empty())
    else {
        return;
    };
    let time = first_text(&content, &sel.content_time)
        .and_then(|t| find_time(&t))
        .or_else(|| first_text(&content, &sel.content_doors).and_then(|t| find_time(&t)));

    let matched = events.iter_mut().find(|event| {
        let event_slug = short_slug(&event.title);
        slug.contains(&event_slug) || event_slug.contains(&slug)
    });
    if let (Some(event), Some(time)) = (matched, time) {
        if event.time.is_none() {
            event.time = Some(time);
        }
    }
}

impl VenueScraper for TicketWebCalendar {
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

    const WIDGET_PAGE: &str = r#"
    <div class="tw-plugin-upcoming-event-list">
      <div class="tw-section">
        <div class="tw-image"><img src="data:image/gif;base64,R0lG" data-lazy-src="https://i.ticketweb.com/a.jpg"></div>
        <div class="tw-name"><a href="https://barnato.bar/tm-event/jazz-night/">Jazz Night</a></div>
        <span class="tw-event-date">February 26, 2026</span>
        <span class="tw-event-time-complete">- 8:00 pm</span>
        <span class="tw-price">$10.00</span>
        <span class="tw-age-restriction">21+</span>
        <a class="tw-buy-tix-btn" href="https://www.ticketweb.com/event/1">Buy Tickets</a>
      </div>
      <div class="tw-section">
        <div class="tw-image"><img src="data:image/gif;base64,R0lG"></div>
        <div class="tw-name"><a href="/tm-event/late-set/">Late Set</a></div>
        <span class="tw-event-date">Feb 27, 2026</span>
        <span class="tw-event-time">21:30</span>
      </div>
      <div class="tw-section">
        <div class="tw-name"><a href="/tm-event/tba/">Date TBA</a></div>
        <span class="tw-event-date">Someday</span>
      </div>
      <div class="tw-paging">
        <a href="/events/?twpage=0">Prev</a>
        <a href="/events/?twpage=2">Next Page</a>
      </div>
    </div>"#;

    #[test]
    fn test_widget_page() {
        let widget = TicketWebWidget::barnato(Client::new());
        let page = widget.parse_page(WIDGET_PAGE).unwrap();
        assert_eq!(page.events.len(), 2);
        assert_eq!(page.next, Some(2));

        let first = &page.events[0];
        assert_eq!(first.id, "barnato-2026-02-26-jazz-night");
        assert_eq!(first.time.as_deref(), Some("20:00"));
        assert_eq!(first.price.as_deref(), Some("$10.00"));
        assert_eq!(first.age_restriction.as_deref(), Some("21+"));
        assert_eq!(first.image_url.as_deref(), Some("https://i.ticketweb.com/a.jpg"));
        assert_eq!(
            first.ticket_url.as_deref(),
            Some("https://www.ticketweb.com/event/1")
        );

        let second = &page.events[1];
        assert_eq!(second.date, "2026-02-27");
        assert_eq!(second.time.as_deref(), Some("21:30"));
        assert!(second.image_url.is_none());
    }

    #[test]
    fn test_widget_last_page_has_no_next() {
        let widget = TicketWebWidget::barnato(Client::new());
        let page = widget.parse_page("<div></div>").unwrap();
        assert!(page.events.is_empty());
        assert!(page.next.is_none());
        assert_eq!(widget.page_url(0), "https://barnato.bar/events/");
        assert_eq!(widget.page_url(3), "https://barnato.bar/events/?twpage=3");
    }

    const CALENDAR: &str = r#"
    <div class="tw-calendar">
      <div class="tw-cal-event">
        <div class="tw-image"><img src="https://i.ticketweb.com/b.jpg"></div>
        <div class="tw-name"><a href="https://www.bourbontheatre.com/tm-event/the-record-company/">The Record Company</a></div>
        <span class="tw-event-date">March 5, 2026</span>
      </div>
      <div class="tw-cal-event">
        <div class="tw-name"><a href="/tm-event/x/">The Record Company</a></div>
        <span class="tw-event-date">March 5, 2026</span>
      </div>
      <div class="tw-cal-event">
        <div class="tw-name"><a href="/tm-event/early/">Early Show</a></div>
        <span class="tw-event-date">March 6, 2026</span>
        <span class="tw-event-time-complete">6:00 PM</span>
      </div>
      <div class="tw-calendar-event-content">
        <div class="tw-calendar-event-title">The Record Company - Tour 2026</div>
        <div class="tw-calendar-event-doors">Doors: 7:00 PM</div>
      </div>
      <div class="tw-calendar-event-content">
        <div class="tw-calendar-event-title">Early Show</div>
        <div class="tw-calendar-event-time">Show: 9:00 PM</div>
      </div>
    </div>"#;

    #[test]
    fn test_calendar_dedupes_and_fills_times() {
        let calendar = TicketWebCalendar::bourbon_theatre(Client::new());
        let events = calendar.parse_listing(CALENDAR).unwrap();
        assert_eq!(events.len(), 2);

        let record = &events[0];
        assert_eq!(record.id, "bourbontheatre-2026-03-05-the-record-company");
        assert_eq!(record.time.as_deref(), Some("19:00"));
        assert_eq!(record.image_url.as_deref(), Some("https://i.ticketweb.com/b.jpg"));

        assert_eq!(events[1].time.as_deref(), Some("18:00"));
    }
}
