//! Table extraction from the root HTML document.
//!
//! Every top-level `<table>` (one with no table ancestor) becomes one
//! [`TableBlock`], in document order. Tables nested in cells are rendered
//! into their parent cell's text instead.

mod anchor;
mod cell;
mod dom;
mod grid;
mod options;

pub use anchor::AnchorInferrer;
pub use cell::{nested_table_markdown, CellComposer, ComposedCell};
pub use dom::{collapse_whitespace, element_text};
pub use grid::{normalize_table, parse_span, Grid, SpanCell, MAX_COLSPAN, MAX_ROWSPAN};
pub use options::{
    ExtractOptions, DEFAULT_ANCHOR_LOOKBACK, DEFAULT_ANCHOR_MAX_LEN, DEFAULT_SUB_TABLE_MARKER,
};

use scraper::Html;

use crate::interpret::ImageInterpreter;
use crate::model::TableBlock;
use crate::parser::PartIndex;

/// Extracts labeled tables from an HTML document.
pub struct TableExtractor<'a> {
    index: &'a PartIndex<'a>,
    interpreter: Option<&'a dyn ImageInterpreter>,
    options: ExtractOptions,
}

impl<'a> TableExtractor<'a> {
    /// Create an extractor resolving images against `index`.
    pub fn new(index: &'a PartIndex<'a>) -> Self {
        Self {
            index,
            interpreter: None,
            options: ExtractOptions::default(),
        }
    }

    /// Use an interpreter for resolved images.
    pub fn with_interpreter(mut self, interpreter: Option<&'a dyn ImageInterpreter>) -> Self {
        self.interpreter = interpreter;
        self
    }

    /// Set extraction options.
    pub fn with_options(mut self, options: ExtractOptions) -> Self {
        self.options = options;
        self
    }

    /// Extract all top-level tables from `html`.
    pub fn extract(&self, html: &str) -> Vec<TableBlock> {
        let document = Html::parse_document(html);
        let composer = CellComposer::new(self.index)
            .with_interpreter(self.interpreter)
            .with_sub_table_marker(&self.options.sub_table_marker);
        let inferrer = AnchorInferrer::new(self.options.anchor_lookback, self.options.anchor_max_len);

        let tables: Vec<TableBlock> = dom::top_level_tables(&document)
            .into_iter()
            .enumerate()
            .map(|(order, table)| {
                let (grid, stats) = normalize_table(table, &composer);
                let block = TableBlock::from_grid(order, grid.rows())
                    .with_stats(stats)
                    .with_meta(inferrer.infer(table));
                log::debug!(
                    "Table {}: {} columns, {} rows, anchor {:?}",
                    order,
                    block.column_count(),
                    block.row_count(),
                    block.anchor()
                );
                block
            })
            .collect();

        log::info!("Extracted {} top-level tables", tables.len());
        tables
    }
}

/// Extract all top-level tables from `html`.
///
/// Convenience wrapper around [`TableExtractor`].
pub fn extract_tables(
    html: &str,
    index: &PartIndex<'_>,
    interpreter: Option<&dyn ImageInterpreter>,
    options: &ExtractOptions,
) -> Vec<TableBlock> {
    TableExtractor::new(index)
        .with_interpreter(interpreter)
        .with_options(options.clone())
        .extract(html)
}
