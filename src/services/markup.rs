//! Small helpers over `scraper` element trees.

use scraper::{ElementRef, Selector};

use crate::error::{AppError, Result};
use crate::utils::text::clean_text;

/// Compile a CSS selector.
pub fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}

/// Whitespace-normalized text of an element and its descendants.
pub fn inner_text(element: ElementRef<'_>) -> String {
    clean_text(&element.text().collect::<Vec<_>>().join(" "))
}

/// First descendant matching `selector`.
pub fn first<'a>(element: &ElementRef<'a>, selector: &Selector) -> Option<ElementRef<'a>> {
    element.select(selector).next()
}

/// Text of the first match, `None` when absent or blank.
pub fn first_text(element: &ElementRef<'_>, selector: &Selector) -> Option<String> {
    first(element, selector)
        .map(inner_text)
        .filter(|text| !text.is_empty())
}

/// Attribute of the first match, `None` when absent or blank.
pub fn first_attr(element: &ElementRef<'_>, selector: &Selector, attr: &str) -> Option<String> {
    first(element, selector).and_then(|el| attr_of(el, attr))
}

/// Trimmed, non-blank attribute value.
pub fn attr_of(element: ElementRef<'_>, attr: &str) -> Option<String> {
    element
        .value()
        .attr(attr)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}
