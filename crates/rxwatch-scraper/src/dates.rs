//! Multi-notation date parsing.
//!
//! Sources publish dates as `15-Oct-25`, `15-October-2025`, `August 15,
//! 2026`, `15/08/2026`, `10/2026`, `2026-01-09`, `20260109`, or full
//! RFC 3339 timestamps. Strategies are
//! tried in a fixed order and the first success wins — the order matters
//! because the notations are ambiguous against each other (`10-2020` must be
//! month-year, never day-month).

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate};
use regex::Regex;

/// Two-digit years below this map to the 2000s, the rest to the 1900s.
/// Pinned here so behavior never depends on a parsing library's internal
/// century convention.
const CENTURY_PIVOT: u32 = 70;

static MONTH_YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2})-(\d{4})$").expect("valid month-year regex"));

static DAY_MONTHNAME_YEAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,2})-([A-Za-z]+)-(\d{2}|\d{4})$").expect("valid day-month-year regex")
});

static MONTHNAME_DAY_YEAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z]+)-(\d{1,2})-(\d{2}|\d{4})$").expect("valid month-day-year regex")
});

static DAY_MONTH_YEAR_NUMERIC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,2})-(\d{1,2})-(\d{4})$").expect("valid numeric d-m-y regex")
});

static ORDINAL_DAY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\d{1,2})(?:st|nd|rd|th)\b").expect("valid ordinal regex")
});

/// Parses a raw date string into a [`NaiveDate`].
///
/// Ordered strategy, first match wins:
/// 1. Month-year shorthand (`MM-YYYY`, `MM/YYYY`) → first day of the month.
/// 2. Day-month-year with abbreviated or full month name, two- or four-digit
///    year (`15-Oct-25`, `15 October 2025`, `4th August 2025`).
/// 3. Month-name-first (`August 15, 2026`).
/// 4. All-numeric day-first (`15-08-2026`, `15/08/2026`).
/// 5. ISO `YYYY-MM-DD`, compact `YYYYMMDD`, then RFC 3339 truncated to a
///    date.
///
/// Anything unparseable is `None` — "no date available," never an error.
#[must_use]
pub fn parse_alert_date(raw: &str) -> Option<NaiveDate> {
    // Normalize separators: slashes and internal whitespace become hyphens
    // and commas/ordinal suffixes drop, so "15 October 2025",
    // "August 15, 2026", and "10/2020" all share the hyphenated paths.
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let stripped = ORDINAL_DAY.replace_all(trimmed, "$1").replace(',', "");
    let normalized = stripped
        .split(|c: char| c == '/' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-");

    parse_month_year(&normalized)
        .or_else(|| parse_day_monthname_year(&normalized))
        .or_else(|| parse_monthname_day_year(&normalized))
        .or_else(|| parse_day_month_year_numeric(&normalized))
        .or_else(|| parse_iso(&normalized))
}

/// `MM-YYYY` → first of that month.
fn parse_month_year(s: &str) -> Option<NaiveDate> {
    let caps = MONTH_YEAR.captures(s)?;
    let month: u32 = caps[1].parse().ok()?;
    let year: i32 = caps[2].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, 1)
}

/// `DD-Mon-YY`, `DD-Month-YY`, `DD-Mon-YYYY`, `DD-Month-YYYY`.
///
/// Two-digit years are expanded with the pinned [`CENTURY_PIVOT`] before
/// handing the string to chrono, so the century choice is ours.
fn parse_day_monthname_year(s: &str) -> Option<NaiveDate> {
    let caps = DAY_MONTHNAME_YEAR.captures(s)?;
    let day = &caps[1];
    let month = &caps[2];
    let year = expand_two_digit_year(&caps[3])?;

    let rebuilt = format!("{day}-{month}-{year}");
    NaiveDate::parse_from_str(&rebuilt, "%d-%b-%Y")
        .or_else(|_| NaiveDate::parse_from_str(&rebuilt, "%d-%B-%Y"))
        .ok()
}

/// `Month-DD-YY(YY)` after normalization, e.g. "August 15, 2026".
fn parse_monthname_day_year(s: &str) -> Option<NaiveDate> {
    let caps = MONTHNAME_DAY_YEAR.captures(s)?;
    let month = &caps[1];
    let day = &caps[2];
    let year = expand_two_digit_year(&caps[3])?;

    let rebuilt = format!("{day}-{month}-{year}");
    NaiveDate::parse_from_str(&rebuilt, "%d-%b-%Y")
        .or_else(|_| NaiveDate::parse_from_str(&rebuilt, "%d-%B-%Y"))
        .ok()
}

/// All-numeric `DD-MM-YYYY`, day-first. Runs after the month-year shorthand
/// so two-field strings never reach it, and before ISO so a four-digit year
/// in the last position is read as day-first rather than rejected.
fn parse_day_month_year_numeric(s: &str) -> Option<NaiveDate> {
    let caps = DAY_MONTH_YEAR_NUMERIC.captures(s)?;
    let day: u32 = caps[1].parse().ok()?;
    let month: u32 = caps[2].parse().ok()?;
    let year: i32 = caps[3].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

fn expand_two_digit_year(raw: &str) -> Option<i32> {
    let value: u32 = raw.parse().ok()?;
    if raw.len() == 4 {
        return i32::try_from(value).ok();
    }
    let century = if value < CENTURY_PIVOT { 2000 } else { 1900 };
    i32::try_from(century + value).ok()
}

/// ISO `YYYY-MM-DD`, compact `YYYYMMDD` (openFDA), RFC 3339 date-times.
fn parse_iso(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(s, "%Y%m%d"))
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(s)
                .ok()
                .map(|dt| dt.date_naive())
        })
}
