// src/utils/text.rs

//! Text normalization shared by the venue adapters.

use std::sync::LazyLock;

use regex::Regex;

static NON_SLUG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9]+").expect("valid slug regex"));

/// Collapse all whitespace runs into single spaces and trim.
pub fn clean_text(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Lowercase `title` and collapse every run of non `[a-z0-9]` characters into `-`.
pub fn slugify(title: &str) -> String {
    let lowered = title.to_lowercase();
    NON_SLUG
        .replace_all(&lowered, "-")
        .trim_matches('-')
        .to_string()
}

/// Uppercase the first letter of every word, lowercase the rest.
///
/// A word starts after any non-alphabetic character, so `"sum 41"` becomes
/// `"Sum 41"` and `"o'brien"` becomes `"O'Brien"`.
pub fn title_case(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut at_word_start = true;
    for ch in input.chars() {
        if ch.is_alphabetic() {
            if at_word_start {
                out.extend(ch.to_uppercase());
            } else {
                out.extend(ch.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(ch);
            at_word_start = true;
        }
    }
    out
}

/// Split a comma separated lineup into trimmed, non-empty names.
///
/// `" & "` is treated as a separator as well.
pub fn split_lineup(text: &str) -> Vec<String> {
    text.replace(" & ", ", ")
        .split(',')
        .map(clean_text)
        .filter(|name| !name.is_empty())
        .collect()
}

/// Parse a `"with A, B & C"` support line. Returns `None` for anything else
/// or when no names remain.
pub fn parse_support_line(text: &str) -> Option<Vec<String>> {
    let cleaned = clean_text(text);
    let prefix = cleaned.get(..5)?;
    if !prefix.eq_ignore_ascii_case("with ") {
        return None;
    }
    let artists = split_lineup(&cleaned[5..]);
    (!artists.is_empty()).then_some(artists)
}

/// Return `Some(text)` when the cleaned text is non-empty.
pub fn non_empty(text: &str) -> Option<String> {
    let cleaned = clean_text(text);
    (!cleaned.is_empty()).then_some(cleaned)
}
