//! Canonical field keys and label normalization.
//!
//! Source pages spell the same concept dozens of ways ("Batch No.", "BATCH
//! NUMBER", "Stated Product Manufacturer"). Normalization cleans the label,
//! tries an exact synonym table, then falls back to ordered substring
//! containment so the long tail of spelling variants still resolves without
//! enumerating every one.

use std::collections::BTreeMap;

/// The closed vocabulary of canonical field keys.
///
/// `Other` carries a snake-cased fallback for labels outside the vocabulary.
/// It exists for diagnostics and key/value tables with site-specific rows
/// (e.g. a registration-number column); it never becomes a persisted column.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FieldKey {
    ProductName,
    BatchNumber,
    ExpiryDate,
    DateOfManufacture,
    StatedManufacturer,
    Other(String),
}

impl FieldKey {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            FieldKey::ProductName => "product_name",
            FieldKey::BatchNumber => "batch_number",
            FieldKey::ExpiryDate => "expiry_date",
            FieldKey::DateOfManufacture => "date_of_manufacture",
            FieldKey::StatedManufacturer => "stated_manufacturer",
            FieldKey::Other(s) => s,
        }
    }

    /// Keys whose values are single codes or dates rather than prose.
    /// Drives the value-boundary rule in the label-pair extractor.
    #[must_use]
    pub fn is_code_valued(&self) -> bool {
        matches!(
            self,
            FieldKey::BatchNumber | FieldKey::ExpiryDate | FieldKey::DateOfManufacture
        )
    }
}

impl std::fmt::Display for FieldKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lowercases, strips a trailing colon, drops punctuation, and collapses
/// internal whitespace. `"Batch No.:"` becomes `"batch no"`.
#[must_use]
pub fn clean_label(raw: &str) -> String {
    let lowered = raw.trim().trim_end_matches(':').to_lowercase();
    let mut cleaned = String::with_capacity(lowered.len());
    for c in lowered.chars() {
        if c.is_alphanumeric() {
            cleaned.push(c);
        } else if c.is_whitespace() || c.is_ascii_punctuation() {
            cleaned.push(' ');
        }
        // Anything else (®, ™, …) is dropped outright.
    }
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Strict normalization: canonical key or `None`.
///
/// Used where unrecognized labels must be ignored, e.g. bold text in
/// paragraphs that is emphasis rather than a field label.
#[must_use]
pub fn normalize_key(raw: &str) -> Option<FieldKey> {
    let cleaned = clean_label(raw);
    if cleaned.is_empty() {
        return None;
    }
    exact_match(&cleaned).or_else(|| contains_match(&cleaned))
}

/// Lenient normalization: canonical key, or a snake-cased fallback for
/// anything unrecognized. Returns `None` only when the cleaned label is
/// empty.
///
/// Used for table headers and key/value rows, where an unknown label still
/// names a real column.
#[must_use]
pub fn normalize_key_or_fallback(raw: &str) -> Option<FieldKey> {
    let cleaned = clean_label(raw);
    if cleaned.is_empty() {
        return None;
    }
    Some(
        exact_match(&cleaned)
            .or_else(|| contains_match(&cleaned))
            .unwrap_or_else(|| FieldKey::Other(cleaned.replace(' ', "_"))),
    )
}

fn exact_match(cleaned: &str) -> Option<FieldKey> {
    let key = match cleaned {
        "product name" | "product" | "name of product" | "product names" => FieldKey::ProductName,
        "batch number" | "batch no" | "batch" | "batch numbers" | "lot number" | "lot no"
        | "lot" => FieldKey::BatchNumber,
        "expiry date" | "expiry" | "expiration date" | "exp date" | "expiry dates" => {
            FieldKey::ExpiryDate
        }
        "date of manufacture" | "manufacturing date" | "mfg date" | "manufacture date" => {
            FieldKey::DateOfManufacture
        }
        "stated manufacturer" | "manufacturer" | "stated product manufacturer" => {
            FieldKey::StatedManufacturer
        }
        _ => return None,
    };
    Some(key)
}

/// Ordered containment probes. Order matters: "date of manufacture" must win
/// over the bare "manufactur" probe, and manufacturer over the bare
/// "product" probe (so "Product Manufacturer Name" resolves to
/// `StatedManufacturer`).
fn contains_match(cleaned: &str) -> Option<FieldKey> {
    const PROBES: &[(&str, fn() -> FieldKey)] = &[
        ("batch", || FieldKey::BatchNumber),
        ("expir", || FieldKey::ExpiryDate),
        ("date of manufacture", || FieldKey::DateOfManufacture),
        ("manufacturing date", || FieldKey::DateOfManufacture),
        ("manufactur", || FieldKey::StatedManufacturer),
        ("product", || FieldKey::ProductName),
    ];
    PROBES
        .iter()
        .find(|(probe, _)| cleaned.contains(probe))
        .map(|(_, make)| make())
}

/// The intermediate field set for one detail page: canonical key → ordered
/// list of non-empty values.
///
/// Produced by the table classifier or the label-pair extractor, consumed by
/// a source adapter while assembling an [`crate::AlertRecord`]. Never
/// persisted.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ParsedFields {
    map: BTreeMap<FieldKey, Vec<String>>,
}

impl ParsedFields {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a value under `key`, ignoring empty/whitespace values.
    pub fn push(&mut self, key: FieldKey, value: &str) {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return;
        }
        self.map.entry(key).or_default().push(trimmed.to_owned());
    }

    #[must_use]
    pub fn values(&self, key: &FieldKey) -> &[String] {
        self.map.get(key).map_or(&[], Vec::as_slice)
    }

    #[must_use]
    pub fn first(&self, key: &FieldKey) -> Option<&str> {
        self.map.get(key).and_then(|v| v.first()).map(String::as_str)
    }

    /// Removes and returns all values stored under `key`.
    pub fn take(&mut self, key: &FieldKey) -> Vec<String> {
        self.map.remove(key).unwrap_or_default()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FieldKey, &Vec<String>)> {
        self.map.iter()
    }
}

#[cfg(test)]
#[path = "keys_test.rs"]
mod tests;
