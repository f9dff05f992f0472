//! Tabular reconstruction: bucket positioned runs into a row/column grid.
//!
//! Sibling of the layout reconstructor, but coarser: baselines are quantized
//! to integer row keys because spreadsheet rows are expected to align
//! exactly, unlike prose baselines which wobble within the 5-unit line
//! tolerance. Cells keep their text verbatim (trimmed); nothing is parsed
//! back into numbers or dates.

use crate::pipeline::layout::PositionedTextRun;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// One spreadsheet row: the quantized baseline it came from plus its cell
/// texts ordered left to right. Never empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRow {
    /// Quantized baseline Y (integer bucket merging near-equal baselines).
    pub row_key: i64,
    pub cells: Vec<String>,
}

/// Rows ordered top of page first, accumulated across pages with no
/// page-break marker.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableGrid {
    pub rows: Vec<TableRow>,
}

impl TableGrid {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Append one page's rows to the running grid.
    pub fn extend_from_page(&mut self, runs: &[PositionedTextRun]) {
        self.rows.extend(rows_from_page(runs));
    }
}

/// Bucket one page's runs into rows, top of page first.
pub fn rows_from_page(runs: &[PositionedTextRun]) -> Vec<TableRow> {
    let mut buckets: BTreeMap<i64, Vec<&PositionedTextRun>> = BTreeMap::new();
    for run in runs {
        // Truncating quantization: every baseline inside one unit interval
        // shares a row key, with no split at the half-unit boundary.
        buckets.entry(run.y.floor() as i64).or_default().push(run);
    }

    let mut rows = Vec::new();
    // BTreeMap iterates ascending Y; the page reads top (large Y) down.
    for (row_key, mut bucket) in buckets.into_iter().rev() {
        bucket.sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal));
        let cells: Vec<String> = bucket
            .iter()
            .map(|r| r.text.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        if !cells.is_empty() {
            rows.push(TableRow { row_key, cells });
        }
    }
    debug!("Bucketed {} run(s) into {} row(s)", runs.len(), rows.len());
    rows
}

/// Build one continuous grid from all pages, in page order.
pub fn grid_from_pages(pages: &[Vec<PositionedTextRun>]) -> TableGrid {
    let mut grid = TableGrid::default();
    for runs in pages {
        grid.extend_from_page(runs);
    }
    grid
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(text: &str, x: f32, y: f32) -> PositionedTextRun {
        PositionedTextRun {
            text: text.to_string(),
            x,
            y,
            width: 10.0,
            page_index: 0,
        }
    }

    #[test]
    fn sub_unit_jitter_shares_one_row_key() {
        // Jitter spanning the half-unit boundary must not split the row.
        let rows = rows_from_page(&[run("a", 10.0, 300.2), run("b", 50.0, 300.8)]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].cells, vec!["a", "b"]);
        assert_eq!(rows[0].row_key, 300);
    }

    #[test]
    fn jitter_within_one_unit_is_one_row() {
        let rows = rows_from_page(&[run("a", 10.0, 300.2), run("b", 50.0, 300.4)]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].cells, vec!["a", "b"]);
    }

    #[test]
    fn distant_baseline_is_a_new_row() {
        let rows = rows_from_page(&[run("a", 10.0, 300.2), run("b", 10.0, 310.0)]);
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn rows_are_ordered_top_of_page_first() {
        let rows = rows_from_page(&[
            run("low", 10.0, 100.0),
            run("high", 10.0, 700.0),
            run("mid", 10.0, 400.0),
        ]);
        let texts: Vec<_> = rows.iter().map(|r| r.cells[0].as_str()).collect();
        assert_eq!(texts, vec!["high", "mid", "low"]);
    }

    #[test]
    fn cells_sort_by_x_and_trim() {
        let rows = rows_from_page(&[
            run("  second  ", 200.0, 500.0),
            run("first", 10.0, 500.0),
        ]);
        assert_eq!(rows[0].cells, vec!["first", "second"]);
    }

    #[test]
    fn whitespace_cells_are_dropped_and_empty_rows_omitted() {
        let rows = rows_from_page(&[run("   ", 10.0, 500.0), run("\t", 90.0, 500.0)]);
        assert!(rows.is_empty());
    }

    #[test]
    fn grid_accumulates_across_pages_without_markers() {
        let pages = vec![
            vec![run("p1", 10.0, 700.0)],
            vec![],
            vec![run("p2", 10.0, 700.0)],
        ];
        let grid = grid_from_pages(&pages);
        assert_eq!(grid.rows.len(), 2);
        assert_eq!(grid.rows[0].cells, vec!["p1"]);
        assert_eq!(grid.rows[1].cells, vec!["p2"]);
    }
}
