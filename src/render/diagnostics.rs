//! Summary statistics over an extraction run.

use serde::{Deserialize, Serialize};

use crate::model::{TableBlock, TableStats};

/// Statistics collected over the extracted tables of one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostics {
    /// Number of top-level tables
    pub table_count: usize,

    /// Data row count of each table, in table order
    pub rows_per_table: Vec<usize>,

    /// Occurrences of the `[IMG:` placeholder across all row values
    pub img_placeholders: usize,

    /// Chosen anchor of each table, in table order
    pub anchors: Vec<Option<String>>,

    /// Image and nested table counters summed over all tables
    #[serde(default)]
    pub totals: TableStats,
}

impl Diagnostics {
    /// Compute diagnostics for a list of tables.
    pub fn from_tables(tables: &[TableBlock]) -> Self {
        let mut diagnostics = Self {
            table_count: tables.len(),
            ..Default::default()
        };
        for table in tables {
            diagnostics.rows_per_table.push(table.row_count());
            diagnostics.img_placeholders += table.placeholder_count();
            diagnostics.anchors.push(table.anchor().map(str::to_string));
            diagnostics.totals.merge(&table.stats);
        }
        diagnostics
    }

    /// Get the total number of data rows.
    pub fn total_rows(&self) -> usize {
        self.rows_per_table.iter().sum()
    }

    /// Get the number of tables with an anchor.
    pub fn anchored_tables(&self) -> usize {
        self.anchors.iter().filter(|a| a.is_some()).count()
    }
}
