//! Steel House. Titles are lowercase on the site and get title-cased here.

use reqwest::blocking::Client;
use scraper::{ElementRef, Html, Selector};

use super::markup::{attr_of, first, first_attr, first_text, parse_selector};
use super::{CardOutcome, VenueScraper, collect_cards};
use crate::error::Result;
use crate::models::Event;
use crate::utils::dates::{find_time, parse_long_date};
use crate::utils::http;
use crate::utils::text::title_case;

const ID: &str = "steelhouse";
const NAME: &str = "Steel House";
const URL: &str = "https://steelhouseomaha.com/events/";

struct CardSelectors {
    card: Selector,
    overlay: Selector,
    heading: Selector,
    image: Selector,
    footer: Selector,
    hover_row: Selector,
    hover_label: Selector,
    hover_value: Selector,
    ticket: Selector,
}

impl CardSelectors {
    fn new() -> Result<Self> {
        Ok(Self {
            card: parse_selector("div.bg-gray-800.rounded-lg.overflow-hidden.shadow-lg.relative.group")?,
            overlay: parse_selector("a.absolute.inset-0")?,
            heading: parse_selector("h4.text-white.mb-2.break-words")?,
            image: parse_selector("img.wp-post-image")?,
            footer: parse_selector("p.text-gray-300.mb-3")?,
            hover_row: parse_selector(".hover_card_details_wrapper div.flex.gap-4")?,
            hover_label: parse_selector("span.text-white.w-32")?,
            hover_value: parse_selector("span.text-white.font-semibold")?,
            ticket: parse_selector("a.ticket_link")?,
        })
    }
}

pub struct SteelHouse {
    client: Client,
}

impl SteelHouse {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl VenueScraper for SteelHouse {
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
        parse_listing(&html)
    }
}

pub(crate) fn parse_listing(html: &str) -> Result<Vec<Event>> {
    let sel = CardSelectors::new()?;
    let document = Html::parse_document(html);
    let outcomes = document.select(&sel.card).map(|card| parse_card(card, &sel));
    Ok(collect_cards(ID, outcomes))
}

/// `"Feb 26, 2026 @ 7:00 PM"` into date and time.
fn parse_footer(text: &str) -> (Option<String>, Option<String>) {
    match text.split_once('@') {
        Some((date, time)) => (parse_long_date(date.trim()), find_time(time)),
        None => (parse_long_date(text.trim()), None),
    }
}

/// Date and showtime from the hover overlay's labelled rows.
fn parse_hover(card: ElementRef<'_>, sel: &CardSelectors) -> (Option<String>, Option<String>) {
    let mut date = None;
    let mut time = None;
    for row in card.select(&sel.hover_row) {
        let (Some(label), Some(value)) = (
            first_text(&row, &sel.hover_label),
            first_text(&row, &sel.hover_value),
        ) else {
            continue;
        };
        match label.to_lowercase().as_str() {
            "date" => date = parse_long_date(&value),
            "showtime" => time = find_time(&value),
            _ => {}
        }
    }
    (date, time)
}

fn parse_card(card: ElementRef<'_>, sel: &CardSelectors) -> CardOutcome {
    let overlay = first(&card, &sel.overlay);
    let Some(raw_title) = overlay
        .and_then(|a| attr_of(a, "aria-label"))
        .or_else(|| first_text(&card, &sel.heading))
    else {
        return CardOutcome::Skipped("missing title");
    };

    let (mut date, mut time) = first_text(&card, &sel.footer)
        .map(|t| parse_footer(&t))
        .unwrap_or_default();
    if date.is_none() {
        (date, time) = parse_hover(card, sel);
    }
    let Some(date) = date else {
        return CardOutcome::Skipped("missing or unparsable date");
    };

    // identity slugs the site's own spelling of the title
    let mut event = Event::new(ID, NAME, raw_title.as_str(), date);
    event.title = title_case(&raw_title);
    event.time = time;
    event.event_url = overlay.and_then(|a| attr_of(a, "href"));
    event.image_url = first_attr(&card, &sel.image, "src");
    event.ticket_url = first_attr(&card, &sel.ticket, "href");
    CardOutcome::Parsed(event)
}
