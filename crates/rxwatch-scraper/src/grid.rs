//! Grid builder: HTML tables to rectangular value grids.
//!
//! Source tables routinely merge cells — one product-name cell with
//! `rowspan=5` applying to five batch/expiry rows beneath it. Reading rows
//! naively misaligns every column after the first merged cell, so the grid
//! builder expands spans first: each spanned cell's text is replicated into
//! every grid position it logically covers, producing a rectangle that the
//! table classifier can interpret column-by-column.

use scraper::ElementRef;

use crate::html::element_text;

/// Upper bound on a single cell's declared span. Values above this are
/// treated as 1; real specification tables never come close, and a
/// malformed `rowspan="65535"` must not blow up the grid.
const MAX_SPAN: usize = 512;

/// One physical cell as authored, before span expansion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpannedCell {
    pub text: String,
    pub rowspan: usize,
    pub colspan: usize,
}

impl SpannedCell {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            rowspan: 1,
            colspan: 1,
        }
    }

    #[must_use]
    pub fn spanning(text: impl Into<String>, rowspan: usize, colspan: usize) -> Self {
        Self {
            text: text.into(),
            rowspan,
            colspan,
        }
    }
}

/// A rowspan carried down into later physical rows.
#[derive(Debug)]
struct Carry {
    text: String,
    remaining: usize,
}

/// Expands physical rows of spanned cells into a rectangular grid of
/// strings.
///
/// Walks rows top-to-bottom keeping a per-column pending-rowspan carry: for
/// each physical row, columns still covered by a prior row's rowspan are
/// filled first, then the row's own cells are placed left-to-right into the
/// next free columns, replicated across their colspan width. Rows that end
/// up entirely empty are dropped. Zero input rows yield an empty grid.
#[must_use]
pub fn expand_grid(rows: &[Vec<SpannedCell>]) -> Vec<Vec<String>> {
    let mut pending: Vec<Option<Carry>> = Vec::new();
    let mut lines: Vec<Vec<String>> = Vec::new();

    for row in rows {
        let mut line: Vec<String> = Vec::new();
        let mut col = 0usize;

        for cell in row {
            let colspan = clamp_span(cell.colspan);
            let rowspan = clamp_span(cell.rowspan);
            for _ in 0..colspan {
                // Columns still covered by an earlier rowspan are filled
                // from their carry, never overwritten; the cell's own text
                // lands in the next free column.
                col = drain_pending(&mut pending, &mut line, col);
                if pending.len() <= col {
                    pending.resize_with(col + 1, || None);
                }
                line.push(cell.text.clone());
                if rowspan > 1 {
                    pending[col] = Some(Carry {
                        text: cell.text.clone(),
                        remaining: rowspan - 1,
                    });
                }
                col += 1;
            }
        }

        // Trailing columns covered only by carries from earlier rows.
        while col < pending.len() {
            col = drain_pending_at(&mut pending, &mut line, col);
        }

        lines.push(line);
    }

    let width = lines.iter().map(Vec::len).max().unwrap_or(0);
    if width == 0 {
        return Vec::new();
    }
    lines
        .into_iter()
        .map(|mut line| {
            line.resize(width, String::new());
            line
        })
        .filter(|line| line.iter().any(|cell| !cell.trim().is_empty()))
        .collect()
}

fn clamp_span(span: usize) -> usize {
    if span == 0 || span > MAX_SPAN {
        1
    } else {
        span
    }
}

/// Fills consecutive carried columns starting at `col`; returns the first
/// free column.
fn drain_pending(pending: &mut [Option<Carry>], line: &mut Vec<String>, mut col: usize) -> usize {
    while col < pending.len() && pending[col].is_some() {
        col = drain_pending_at(pending, line, col);
    }
    col
}

/// Consumes one column position: carried text if present, empty otherwise.
fn drain_pending_at(
    pending: &mut [Option<Carry>],
    line: &mut Vec<String>,
    col: usize,
) -> usize {
    match pending[col].as_mut() {
        Some(carry) => {
            line.push(carry.text.clone());
            carry.remaining -= 1;
            if carry.remaining == 0 {
                pending[col] = None;
            }
        }
        None => line.push(String::new()),
    }
    col + 1
}

/// Collects a `<table>` element's rows into spanned cells and expands them.
///
/// `thead`/`tbody` wrappers and `th` cells are treated uniformly; rows
/// belonging to nested tables are skipped. A table with no rows yields an
/// empty grid.
#[must_use]
pub fn table_to_grid(table: ElementRef<'_>) -> Vec<Vec<String>> {
    let tr_selector = crate::html::selector("tr");
    let mut rows: Vec<Vec<SpannedCell>> = Vec::new();

    for tr in table.select(&tr_selector) {
        if !is_own_row(table, tr) {
            continue;
        }
        let cells: Vec<SpannedCell> = tr
            .children()
            .filter_map(ElementRef::wrap)
            .filter(|el| matches!(el.value().name(), "td" | "th"))
            .map(|el| SpannedCell {
                text: element_text(el),
                rowspan: span_attr(el, "rowspan"),
                colspan: span_attr(el, "colspan"),
            })
            .collect();
        rows.push(cells);
    }

    expand_grid(&rows)
}

fn span_attr(el: ElementRef<'_>, attr: &str) -> usize {
    el.value()
        .attr(attr)
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(1)
}

/// Whether `tr`'s nearest `<table>` ancestor is `table` itself, used to
/// drop rows belonging to nested tables.
fn is_own_row(table: ElementRef<'_>, tr: ElementRef<'_>) -> bool {
    tr.ancestors()
        .find(|node| {
            node.value()
                .as_element()
                .is_some_and(|el| el.name() == "table")
        })
        .is_some_and(|node| node.id() == table.id())
}

#[cfg(test)]
#[path = "grid_test.rs"]
mod tests;
