//! Title decomposer: heading text to brand/generic/country parts.
//!
//! NAFDAC-style headings read like
//! `"Public Alert No. 031/2025 – Alert on ... Darzalex (Daratumumab)
//! 1800mg/15ml vial SC Injection in Nigeria"`. All three extractions are
//! best-effort; a pattern that does not match yields `None`, never an
//! error.

use std::sync::LazyLock;

use regex::Regex;

use crate::html::clean_text;

static AFTER_DASH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[-–—]\s*(.+)$").expect("valid dash regex"));

static BRAND_GENERIC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([A-Z][A-Za-z0-9\-]*)\s*\(([^)]+)\)").expect("valid brand regex")
});

static TRAILING_COUNTRY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bin\s+([A-Z][A-Za-z]*(?:\s+[A-Z][A-Za-z]*)*)\s*\.?\s*$")
        .expect("valid country regex")
});

/// Decomposed parts of an alert heading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleParts {
    /// The working description: text after the first dash-like separator,
    /// or the whole heading when no separator exists.
    pub title: String,
    pub brand_name: Option<String>,
    pub generic_name: Option<String>,
    pub country: Option<String>,
}

/// Extracts (cleaned title, brand, generic, country) from a heading.
///
/// - Brand/generic: first `CapitalizedWord(parenthetical)` occurrence.
/// - Country: trailing `"... in <Capitalized Phrase>"`.
#[must_use]
pub fn decompose_title(raw: &str) -> TitleParts {
    let cleaned = clean_text(raw).unwrap_or_default();
    let title = AFTER_DASH
        .captures(&cleaned)
        .and_then(|caps| caps.get(1))
        .map_or_else(|| cleaned.clone(), |m| m.as_str().trim().to_owned());

    let (brand_name, generic_name) = match BRAND_GENERIC.captures(&title) {
        Some(caps) => (
            Some(caps[1].trim().to_owned()),
            Some(caps[2].trim().to_owned()),
        ),
        None => (None, None),
    };

    let country = TRAILING_COUNTRY
        .captures(&title)
        .map(|caps| caps[1].trim().to_owned());

    TitleParts {
        title,
        brand_name,
        generic_name,
        country,
    }
}
