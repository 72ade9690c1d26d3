//! Label-pair extractor: fallback for pages with no specification table.
//!
//! Some alerts carry their fields as bolded inline labels inside paragraph
//! text (`<p><strong>Batch Number:</strong> C5290S20</p>`). Each bold node
//! whose text normalizes to a canonical key is paired with the text that
//! follows it. Bold text that is mere emphasis normalizes to nothing and is
//! ignored.
//!
//! Capture is bounded explicitly — taking the whole trailing sibling would
//! swallow unrelated sentences that share the line (a batch number followed
//! by a manufacturing-site sentence with no delimiter). The stopping rule:
//! the next label element always ends capture; code-valued keys keep only
//! their first token; free-text values stop at the first sentence boundary
//! and are capped at a fixed length on a word boundary.

use rxwatch_core::{normalize_key, FieldKey, ParsedFields};
use scraper::{ElementRef, Node};

use crate::html::{clean_text, element_text, selector};

/// Longest free-text value the extractor will keep.
const MAX_VALUE_LEN: usize = 160;

const LABEL_TAGS: &[&str] = &["strong", "b", "em"];

/// Scans `root` for bold/emphasis labels and pairs each recognized label
/// with its trailing value. Unrecognized labels and empty values are
/// skipped; the result may be empty but extraction never fails.
#[must_use]
pub fn extract_label_pairs(root: ElementRef<'_>) -> ParsedFields {
    let label_selector = selector("strong, b, em");
    let mut fields = ParsedFields::new();

    for label_el in root.select(&label_selector) {
        let Some(key) = normalize_key(&element_text(label_el)) else {
            continue;
        };
        let raw = trailing_text(label_el);
        if let Some(value) = clip_value(&key, &raw) {
            fields.push(key, &value);
        }
    }
    fields
}

/// Text following a label element within its parent, up to the next label
/// element.
fn trailing_text(label_el: ElementRef<'_>) -> String {
    let mut raw = String::new();
    for sibling in label_el.next_siblings() {
        match sibling.value() {
            Node::Text(text) => raw.push_str(text),
            Node::Element(el) if LABEL_TAGS.contains(&el.name()) => break,
            Node::Element(_) => {
                if let Some(el) = ElementRef::wrap(sibling) {
                    raw.push(' ');
                    raw.push_str(&element_text(el));
                }
            }
            _ => {}
        }
    }
    raw
}

/// Applies the value-boundary rule for `key` to the raw captured text.
fn clip_value(key: &FieldKey, raw: &str) -> Option<String> {
    let cleaned = clean_text(raw)?;
    let cleaned = cleaned.trim_start_matches(':').trim_start();

    if key.is_code_valued() {
        // Batch numbers and dates are single tokens; anything after the
        // first token is prose that leaked onto the same line.
        let token = cleaned
            .split_whitespace()
            .next()?
            .trim_end_matches(['.', ',', ';']);
        return clean_text(token);
    }

    let sentence = match cleaned.find(". ") {
        Some(i) => &cleaned[..i],
        None => cleaned,
    };
    clean_text(cap_at_word_boundary(sentence))
}

fn cap_at_word_boundary(s: &str) -> &str {
    if s.len() <= MAX_VALUE_LEN {
        return s;
    }
    let mut cut = 0;
    for (i, c) in s.char_indices() {
        if i > MAX_VALUE_LEN {
            break;
        }
        if c.is_whitespace() {
            cut = i;
        }
    }
    if cut == 0 {
        // One enormous token: hard-cut at the nearest char boundary.
        let mut end = MAX_VALUE_LEN;
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        &s[..end]
    } else {
        &s[..cut]
    }
}

#[cfg(test)]
#[path = "labels_test.rs"]
mod tests;
