//! Stable record identity.
//!
//! A record id is a SHA-256 hex digest over a fixed, ordered list of
//! normalized parts joined with `"||"`. Absent parts are omitted (not
//! rendered as an empty segment), dates are rendered as ISO-8601, and
//! strings are trimmed. The part list is chosen per source adapter and must
//! never include scrape-time values, so repeated scrapes of the same
//! real-world alert converge on one row.

use chrono::NaiveDate;
use sha2::{Digest, Sha256};

const PART_SEPARATOR: &str = "||";

/// Accumulates identity parts in a fixed order and hashes them.
///
/// ```
/// use rxwatch_core::RecordIdBuilder;
///
/// let id = RecordIdBuilder::new("NAFDAC_NG")
///     .text(Some("https://nafdac.gov.ng/alert/31"))
///     .text(Some("Public Alert No. 031/2025"))
///     .finish();
/// assert_eq!(id.len(), 64);
/// ```
#[derive(Debug)]
pub struct RecordIdBuilder {
    parts: Vec<String>,
}

impl RecordIdBuilder {
    /// Starts a builder seeded with the source's provenance id.
    #[must_use]
    pub fn new(source_id: &str) -> Self {
        Self {
            parts: vec![source_id.trim().to_owned()],
        }
    }

    /// Appends a text part; `None` and all-whitespace values are omitted.
    #[must_use]
    pub fn text(mut self, part: Option<&str>) -> Self {
        if let Some(p) = part {
            let trimmed = p.trim();
            if !trimmed.is_empty() {
                self.parts.push(trimmed.to_owned());
            }
        }
        self
    }

    /// Appends a date part rendered as ISO-8601; `None` is omitted.
    #[must_use]
    pub fn date(mut self, part: Option<NaiveDate>) -> Self {
        if let Some(d) = part {
            self.parts.push(d.format("%Y-%m-%d").to_string());
        }
        self
    }

    /// Joins the collected parts and returns the SHA-256 hex digest.
    #[must_use]
    pub fn finish(self) -> String {
        let joined = self.parts.join(PART_SEPARATOR);
        let digest = Sha256::digest(joined.as_bytes());
        let mut out = String::with_capacity(64);
        for byte in digest {
            use std::fmt::Write;
            let _ = write!(out, "{byte:02x}");
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn same_parts_same_id() {
        let a = RecordIdBuilder::new("NAFDAC_NG")
            .text(Some("https://nafdac.gov.ng/alert/31"))
            .date(Some(date(2025, 10, 15)))
            .text(Some("Public Alert No. 031/2025"))
            .text(Some("Roche Products Limited"))
            .finish();
        let b = RecordIdBuilder::new("NAFDAC_NG")
            .text(Some("https://nafdac.gov.ng/alert/31"))
            .date(Some(date(2025, 10, 15)))
            .text(Some("Public Alert No. 031/2025"))
            .text(Some("Roche Products Limited"))
            .finish();
        assert_eq!(a, b);
    }

    #[test]
    fn id_is_sha256_hex() {
        let id = RecordIdBuilder::new("FDA_US").finish();
        assert_eq!(id.len(), 64);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn none_parts_are_omitted_not_empty() {
        // "A", None, "B" must hash the same as "A", "B" — a missing middle
        // part cannot shift later parts into different positions.
        let with_none = RecordIdBuilder::new("SRC")
            .text(Some("A"))
            .text(None)
            .text(Some("B"))
            .finish();
        let without = RecordIdBuilder::new("SRC")
            .text(Some("A"))
            .text(Some("B"))
            .finish();
        assert_eq!(with_none, without);
    }

    #[test]
    fn whitespace_is_trimmed_before_hashing() {
        let a = RecordIdBuilder::new("SRC").text(Some("  title  ")).finish();
        let b = RecordIdBuilder::new("SRC").text(Some("title")).finish();
        assert_eq!(a, b);
    }

    #[test]
    fn different_dates_produce_different_ids() {
        let a = RecordIdBuilder::new("SRC")
            .date(Some(date(2025, 10, 15)))
            .finish();
        let b = RecordIdBuilder::new("SRC")
            .date(Some(date(2025, 10, 16)))
            .finish();
        assert_ne!(a, b);
    }
}
