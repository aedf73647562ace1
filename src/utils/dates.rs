// src/utils/dates.rs

//! Date and time-of-day parsing for scraped listing text.
//!
//! Every date leaves this module as a zero-padded `YYYY-MM-DD` string and
//! every time as a 24-hour `HH:MM` string, so that plain string comparison
//! orders them chronologically.

use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate};
use regex::Regex;

/// Format used for every persisted date.
pub const ISO_DATE: &str = "%Y-%m-%d";

/// Listings without a year that fall further than this many days behind
/// today are assumed to belong to next year.
const YEAR_ROLLOVER_DAYS: i64 = 30;

static MONTH_DAY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([A-Za-z]{3,})\.?\s+(\d{1,2})\b").expect("valid month/day regex")
});

static TWELVE_HOUR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d{1,2})(?::(\d{2}))?\s*([ap])\.?\s?m\b\.?").expect("valid time regex")
});

static TWENTY_FOUR_HOUR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{1,2}):(\d{2})\b").expect("valid clock regex"));

/// Format a calendar date the way it is persisted.
pub fn iso(date: NaiveDate) -> String {
    date.format(ISO_DATE).to_string()
}

/// Check that `value` is a well-formed, zero-padded ISO calendar date.
pub fn is_iso_date(value: &str) -> bool {
    value.len() == 10 && NaiveDate::parse_from_str(value, ISO_DATE).is_ok()
}

/// Month number from an English month name or abbreviation (`"Feb"`,
/// `"february"`, `"Sept"`).
pub fn month_number(name: &str) -> Option<u32> {
    let prefix: String = name.chars().take(3).collect::<String>().to_lowercase();
    let month = match prefix.as_str() {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(month)
}

/// Place a month/day without a year relative to `today`.
///
/// The current year is used unless that puts the date more than 30 days in
/// the past, in which case the listing is taken to be next year's.
pub fn infer_year(month: u32, day: u32, today: NaiveDate) -> Option<String> {
    let date = NaiveDate::from_ymd_opt(today.year(), month, day)?;
    if (today - date).num_days() > YEAR_ROLLOVER_DAYS {
        let next = NaiveDate::from_ymd_opt(today.year() + 1, month, day)?;
        return Some(iso(next));
    }
    Some(iso(date))
}

/// Parse the first `Month Day` pair in `text` (`"Fri Feb 27"`,
/// `"Thu, Feb 26"`, `"Mar 06 @ 8:00 pm"`) and infer its year.
pub fn parse_month_day(text: &str, today: NaiveDate) -> Option<String> {
    MONTH_DAY.captures_iter(text).find_map(|caps| {
        let month = month_number(&caps[1])?;
        let day: u32 = caps[2].parse().ok()?;
        infer_year(month, day, today)
    })
}

/// Parse a date that carries its own year: `"February 26, 2026"`,
/// `"Feb 26, 2026"` or `"Feb. 27, 2026"`.
pub fn parse_long_date(text: &str) -> Option<String> {
    let cleaned = text.replace('.', "");
    let cleaned = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    ["%B %d, %Y", "%b %d, %Y"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(&cleaned, fmt).ok())
        .map(iso)
}

/// Convert a 12-hour clock reading to `HH:MM`.
pub fn to_24h(hour: u32, minute: u32, meridiem: &str) -> Option<String> {
    if !(1..=12).contains(&hour) || minute > 59 {
        return None;
    }
    let pm = meridiem.to_ascii_lowercase().starts_with('p');
    let hour = match (hour, pm) {
        (12, false) => 0,
        (12, true) => 12,
        (h, true) => h + 12,
        (h, false) => h,
    };
    Some(format!("{hour:02}:{minute:02}"))
}

/// Find the first 12-hour time in `text` (`"8:00PM"`, `"7 pm"`, `"6 p.m."`).
pub fn find_time(text: &str) -> Option<String> {
    let caps = TWELVE_HOUR.captures(text)?;
    let hour: u32 = caps[1].parse().ok()?;
    let minute: u32 = caps.get(2).map_or(Some(0), |m| m.as_str().parse().ok())?;
    to_24h(hour, minute, &caps[3])
}

/// Find the time following `label` (e.g. `"Show:"`) in `text`.
pub fn find_labeled_time(text: &str, label: &str) -> Option<String> {
    let lower = text.to_lowercase();
    let label = label.to_lowercase();
    let start = lower.find(&label)? + label.len();
    find_time(&lower[start..])
}

/// Prefer the show time, then the doors time, then any time in `text`.
pub fn find_show_time(text: &str) -> Option<String> {
    find_labeled_time(text, "Show:")
        .or_else(|| find_labeled_time(text, "Doors:"))
        .or_else(|| find_time(text))
}

/// Accept either a 12-hour reading or a bare 24-hour `H:MM` clock.
pub fn find_clock(text: &str) -> Option<String> {
    if let Some(time) = find_time(text) {
        return Some(time);
    }
    let caps = TWENTY_FOUR_HOUR.captures(text)?;
    let hour: u32 = caps[1].parse().ok()?;
    let minute: u32 = caps[2].parse().ok()?;
    (hour < 24 && minute < 60).then(|| format!("{hour:02}:{minute:02}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_is_iso_date() {
        assert!(is_iso_date("2026-02-27"));
        assert!(!is_iso_date("2026-2-27"));
        assert!(!is_iso_date("2026-02-30"));
        assert!(!is_iso_date(""));
    }

    #[test]
    fn test_month_number() {
        assert_eq!(month_number("Feb"), Some(2));
        assert_eq!(month_number("SEPTEMBER"), Some(9));
        assert_eq!(month_number("Fri"), None);
    }

    #[test]
    fn test_infer_year_keeps_current_year() {
        let today = day(2026, 2, 20);
        assert_eq!(infer_year(2, 27, today), Some("2026-02-27".to_string()));
        // Recently passed listings stay in this year.
        assert_eq!(infer_year(2, 1, today), Some("2026-02-01".to_string()));
    }

    #[test]
    fn test_infer_year_rolls_over() {
        let today = day(2026, 12, 15);
        assert_eq!(infer_year(1, 10, today), Some("2027-01-10".to_string()));
    }

    #[test]
    fn test_parse_month_day() {
        let today = day(2026, 2, 20);
        assert_eq!(
            parse_month_day("Fri Feb 27", today),
            Some("2026-02-27".to_string())
        );
        assert_eq!(
            parse_month_day("Thu, Mar 06", today),
            Some("2026-03-06".to_string())
        );
        assert_eq!(
            parse_month_day("Mar 6 @ 8:00 pm", today),
            Some("2026-03-06".to_string())
        );
        assert_eq!(parse_month_day("TBA", today), None);
    }

    #[test]
    fn test_parse_long_date() {
        assert_eq!(
            parse_long_date("February 26, 2026"),
            Some("2026-02-26".to_string())
        );
        assert_eq!(
            parse_long_date("Feb. 27, 2026"),
            Some("2026-02-27".to_string())
        );
        assert_eq!(parse_long_date("someday"), None);
    }

    #[test]
    fn test_find_time() {
        assert_eq!(find_time("8:00PM"), Some("20:00".to_string()));
        assert_eq!(find_time("doors 7 pm"), Some("19:00".to_string()));
        assert_eq!(find_time("6 p.m. $10"), Some("18:00".to_string()));
        assert_eq!(find_time("12:30 am"), Some("00:30".to_string()));
        assert_eq!(find_time("12 PM"), Some("12:00".to_string()));
        assert_eq!(find_time("no time here"), None);
    }

    #[test]
    fn test_find_show_time_prefers_show() {
        assert_eq!(
            find_show_time("Doors: 7 pm // Show: 8 pm"),
            Some("20:00".to_string())
        );
        assert_eq!(find_show_time("Doors: 7 pm"), Some("19:00".to_string()));
        assert_eq!(find_show_time("7:30 pm"), Some("19:30".to_string()));
    }

    #[test]
    fn test_find_clock() {
        assert_eq!(find_clock("- 19:30"), Some("19:30".to_string()));
        assert_eq!(find_clock("7:30 PM"), Some("19:30".to_string()));
        assert_eq!(find_clock("Multiple"), None);
    }
}
