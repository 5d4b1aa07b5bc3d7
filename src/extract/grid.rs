//! Grid normalization: resolve row and column spans into a dense grid.

use scraper::ElementRef;

use super::cell::CellComposer;
use super::dom::{row_cells, table_rows};
use crate::model::TableStats;

/// Largest honored `rowspan` (the HTML limit).
pub const MAX_ROWSPAN: usize = 65534;

/// Largest honored `colspan` (the HTML limit).
pub const MAX_COLSPAN: usize = 1000;

/// One source cell with its composed text and spans.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpanCell {
    pub text: String,
    pub rowspan: usize,
    pub colspan: usize,
}

impl SpanCell {
    /// A cell spanning a single slot.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            rowspan: 1,
            colspan: 1,
        }
    }

    /// Set the spans; zero is treated as one.
    pub fn with_spans(mut self, rowspan: usize, colspan: usize) -> Self {
        self.rowspan = rowspan.max(1);
        self.colspan = colspan.max(1);
        self
    }
}

/// Pending row span for one column.
#[derive(Debug, Clone, Default)]
struct SpanTracker {
    remaining: usize,
    value: String,
}

/// A dense, rectangular grid of cell text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Grid {
    rows: Vec<Vec<String>>,
}

impl Grid {
    /// Build a dense grid from rows of spanning cells.
    ///
    /// Every output row has the width of the widest row. Spanned slots repeat
    /// the originating cell's text. Trailing empty slots do not widen the
    /// grid on their own.
    pub fn from_span_rows<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = Vec<SpanCell>>,
    {
        let mut trackers: Vec<SpanTracker> = Vec::new();
        let mut grid: Vec<Vec<String>> = Vec::new();

        for cells in rows {
            // Seed from spans opened in earlier rows
            let mut row = Vec::with_capacity(trackers.len());
            let mut occupied = Vec::with_capacity(trackers.len());
            for tracker in trackers.iter_mut() {
                if tracker.remaining > 0 {
                    tracker.remaining -= 1;
                    row.push(tracker.value.clone());
                    occupied.push(true);
                } else {
                    row.push(String::new());
                    occupied.push(false);
                }
            }

            let mut cursor = 0;
            for cell in cells {
                while cursor < occupied.len() && occupied[cursor] {
                    cursor += 1;
                }

                let end = cursor + cell.colspan;
                if end > row.len() {
                    row.resize(end, String::new());
                    occupied.resize(end, false);
                }
                if end > trackers.len() {
                    trackers.resize_with(end, SpanTracker::default);
                }

                for col in cursor..end {
                    row[col] = cell.text.clone();
                    occupied[col] = true;
                    if cell.rowspan > 1 {
                        trackers[col] = SpanTracker {
                            remaining: cell.rowspan - 1,
                            value: cell.text.clone(),
                        };
                    }
                }
                cursor = end;
            }

            while row.last().is_some_and(|c| c.is_empty()) {
                row.pop();
            }
            grid.push(row);
        }

        let width = grid.iter().map(Vec::len).max().unwrap_or(0);
        for row in &mut grid {
            row.resize(width, String::new());
        }
        Self { rows: grid }
    }

    /// Build a grid from already-dense rows (every cell spanning one slot).
    pub fn from_dense(rows: &[Vec<String>]) -> Self {
        Self::from_span_rows(
            rows.iter()
                .map(|r| r.iter().map(|c| SpanCell::new(c.as_str())).collect()),
        )
    }

    /// Get the grid rows.
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Get the number of rows.
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Get the number of columns.
    pub fn width(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    /// Check if the grid has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Parse a `rowspan`/`colspan` attribute value.
///
/// Missing, non-numeric and non-positive values count as 1; larger values
/// are clamped to `max`.
pub fn parse_span(value: Option<&str>, max: usize) -> usize {
    match value.map(str::trim).and_then(|v| v.parse::<i64>().ok()) {
        Some(n) if n > 0 => (n as u64).min(max as u64) as usize,
        _ => 1,
    }
}

/// Normalize an HTML table into a dense grid, composing every cell.
///
/// Only the table's own rows take part; nested tables are left to the
/// cell composer.
pub fn normalize_table(table: ElementRef<'_>, composer: &CellComposer<'_>) -> (Grid, TableStats) {
    let mut stats = TableStats::default();
    let rows: Vec<Vec<SpanCell>> = table_rows(table)
        .into_iter()
        .map(|row| {
            row_cells(row)
                .map(|cell| {
                    let composed = composer.compose(cell);
                    stats.merge(&composed.stats);
                    SpanCell {
                        text: composed.text,
                        rowspan: parse_span(cell.value().attr("rowspan"), MAX_ROWSPAN),
                        colspan: parse_span(cell.value().attr("colspan"), MAX_COLSPAN),
                    }
                })
                .collect()
        })
        .collect();

    (Grid::from_span_rows(rows), stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::dom::top_level_tables;
    use crate::parser::PartIndex;
    use scraper::Html;

    fn dense(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    fn html_grid(html: &str) -> Grid {
        let document = Html::parse_document(html);
        let parts = Vec::new();
        let index = PartIndex::build(&parts);
        let composer = CellComposer::new(&index);
        let table = top_level_tables(&document)[0];
        normalize_table(table, &composer).0
    }

    #[test]
    fn test_parse_span() {
        assert_eq!(parse_span(None, MAX_ROWSPAN), 1);
        assert_eq!(parse_span(Some("3"), MAX_ROWSPAN), 3);
        assert_eq!(parse_span(Some(" 2 "), MAX_ROWSPAN), 2);
        assert_eq!(parse_span(Some("0"), MAX_ROWSPAN), 1);
        assert_eq!(parse_span(Some("-4"), MAX_ROWSPAN), 1);
        assert_eq!(parse_span(Some("wide"), MAX_COLSPAN), 1);
        assert_eq!(parse_span(Some("5000"), MAX_COLSPAN), 1000);
    }

    #[test]
    fn test_rowspan_repeats_value() {
        let grid = Grid::from_span_rows(vec![
            vec![SpanCell::new("X").with_spans(2, 1), SpanCell::new("a")],
            vec![SpanCell::new("b")],
        ]);
        assert_eq!(grid.rows(), dense(&[&["X", "a"], &["X", "b"]]).as_slice());
    }

    #[test]
    fn test_colspan_fills_columns() {
        let grid = Grid::from_span_rows(vec![
            vec![SpanCell::new("Y").with_spans(1, 3)],
            vec![SpanCell::new("1"), SpanCell::new("2"), SpanCell::new("3")],
        ]);
        assert_eq!(grid.rows()[0], vec!["Y", "Y", "Y"]);
        assert_eq!(grid.width(), 3);
    }

    #[test]
    fn test_block_span() {
        let grid = Grid::from_span_rows(vec![
            vec![SpanCell::new("B").with_spans(2, 2), SpanCell::new("c")],
            vec![SpanCell::new("d")],
            vec![SpanCell::new("e"), SpanCell::new("f"), SpanCell::new("g")],
        ]);
        assert_eq!(
            grid.rows(),
            dense(&[&["B", "B", "c"], &["B", "B", "d"], &["e", "f", "g"]]).as_slice()
        );
    }

    #[test]
    fn test_empty_spanned_value_still_occupies() {
        let grid = Grid::from_span_rows(vec![
            vec![SpanCell::new("").with_spans(2, 1), SpanCell::new("a")],
            vec![SpanCell::new("b")],
        ]);
        assert_eq!(grid.rows(), dense(&[&["", "a"], &["", "b"]]).as_slice());
    }

    #[test]
    fn test_rowspan_past_end_is_dropped() {
        let grid = Grid::from_span_rows(vec![vec![SpanCell::new("Z").with_spans(10, 1)]]);
        assert_eq!(grid.height(), 1);
        assert_eq!(grid.rows()[0], vec!["Z"]);
    }

    #[test]
    fn test_ragged_rows_padded() {
        let grid = Grid::from_dense(&dense(&[&["a", "b", "c"], &["d"], &["e", "", ""]]));
        assert_eq!(
            grid.rows(),
            dense(&[&["a", "b", "c"], &["d", "", ""], &["e", "", ""]]).as_slice()
        );
    }

    #[test]
    fn test_trailing_blank_cells_do_not_widen() {
        let grid = Grid::from_dense(&dense(&[&["a", "b"], &["c", "d", "", ""]]));
        assert_eq!(grid.width(), 2);
    }

    #[test]
    fn test_dense_is_fixed_point() {
        let input = dense(&[&["h1", "h2", "h3"], &["1", "2", "3"], &["4", "5", "6"]]);
        let once = Grid::from_dense(&input);
        assert_eq!(once.rows(), input.as_slice());
        let twice = Grid::from_dense(once.rows());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_empty_input() {
        let grid = Grid::from_span_rows(Vec::<Vec<SpanCell>>::new());
        assert!(grid.is_empty());
        assert_eq!(grid.width(), 0);
    }

    #[test]
    fn test_html_table_with_spans() {
        let grid = html_grid(
            "<table><tr><th>名称</th><th>数量</th></tr>\
             <tr><td rowspan=\"2\">螺丝</td><td>10</td></tr>\
             <tr><td>20</td></tr></table>",
        );
        assert_eq!(
            grid.rows(),
            dense(&[&["名称", "数量"], &["螺丝", "10"], &["螺丝", "20"]]).as_slice()
        );
    }

    #[test]
    fn test_html_table_without_rows() {
        let grid = html_grid("<table></table>");
        assert!(grid.is_empty());
    }

    #[test]
    fn test_html_nested_rows_not_counted() {
        let grid = html_grid(
            "<table><tr><td>a<table><tr><td>x</td></tr><tr><td>y</td></tr></table></td></tr></table>",
        );
        assert_eq!(grid.height(), 1);
    }
}
