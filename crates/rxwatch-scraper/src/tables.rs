//! Table classifier: rectangular grids to canonical field sets.

use rxwatch_core::{normalize_key_or_fallback, FieldKey, ParsedFields};

/// Interprets a rectangular grid as either a matrix table or a key/value
/// table and extracts a canonical field mapping.
///
/// - **≥3 columns**: row 0 is the header row; each header cell is
///   normalized (with fallback keys for unrecognized labels) and every
///   later row's cells are appended under their column's key. Rows whose
///   length disagrees with the header count are padded/truncated with a
///   soft warning.
/// - **Exactly 2 columns**: every row is a label/value pair; no header row
///   is assumed.
/// - **Any other width**: no extraction — 1-column and irregular tables are
///   not reliably interpretable and must not produce false data.
///
/// Empty cells are skipped throughout; the result may be empty but the
/// function never fails.
#[must_use]
pub fn classify_grid(grid: &[Vec<String>]) -> ParsedFields {
    let width = grid.first().map_or(0, Vec::len);
    match width {
        2 => extract_key_value(grid),
        w if w >= 3 => extract_matrix(grid),
        _ => ParsedFields::new(),
    }
}

fn extract_matrix(grid: &[Vec<String>]) -> ParsedFields {
    let mut fields = ParsedFields::new();
    let Some((header_row, data_rows)) = grid.split_first() else {
        return fields;
    };

    let headers: Vec<Option<FieldKey>> = header_row
        .iter()
        .map(|label| normalize_key_or_fallback(label))
        .collect();
    if headers.iter().all(Option::is_none) {
        return fields;
    }

    for (row_index, row) in data_rows.iter().enumerate() {
        if row.len() != headers.len() {
            tracing::warn!(
                row = row_index + 1,
                cells = row.len(),
                headers = headers.len(),
                "row width disagrees with header count; padding/truncating"
            );
        }
        for (key, value) in headers.iter().zip(row.iter()) {
            if let Some(key) = key {
                fields.push(key.clone(), value);
            }
        }
        // Cells beyond the header count are dropped by `zip`; short rows
        // simply contribute fewer values.
    }
    fields
}

fn extract_key_value(grid: &[Vec<String>]) -> ParsedFields {
    let mut fields = ParsedFields::new();
    for row in grid {
        let (label, value) = (&row[0], &row[1]);
        if value.trim().is_empty() {
            continue;
        }
        if let Some(key) = normalize_key_or_fallback(label) {
            fields.push(key, value);
        }
    }
    fields
}

/// Tries grids in document order and keeps the first that yields a
/// non-empty mapping — an alert detail page is assumed to carry at most one
/// informative specification table.
#[must_use]
pub fn first_informative<'a, I>(grids: I) -> ParsedFields
where
    I: IntoIterator<Item = Vec<Vec<String>>>,
{
    let mut chosen: Option<ParsedFields> = None;
    for grid in grids {
        let fields = classify_grid(&grid);
        if fields.is_empty() {
            continue;
        }
        if chosen.is_none() {
            chosen = Some(fields);
        } else {
            // Later informative tables are dropped by the first-table-wins
            // contract; worth a trace when it actually happens.
            tracing::debug!("additional informative table ignored (first table wins)");
        }
    }
    chosen.unwrap_or_default()
}

#[cfg(test)]
#[path = "tables_test.rs"]
mod tests;
