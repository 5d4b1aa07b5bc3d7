//! Per-row payload records for downstream consumers.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::{Row, TableBlock};

/// One extracted row with enough context to stand on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowPayload {
    /// Anchor of the owning table
    pub anchor: Option<String>,

    /// Table identifier, `T<order>`
    pub table_id: String,

    /// Row identifier, `T<order>-R<index>`
    pub row_id: String,

    /// Zero-based index among the table's data rows
    pub row_index: usize,

    /// Schema of the owning table
    pub schema: Vec<String>,

    /// Row values keyed by schema entry
    pub row: Row,
}

impl RowPayload {
    /// Build the payloads for every row of a table.
    pub fn from_table(table: &TableBlock) -> Vec<RowPayload> {
        let table_id = format!("T{}", table.order);
        let anchor = table.anchor().map(str::to_string);
        table
            .rows
            .iter()
            .enumerate()
            .map(|(row_index, row)| RowPayload {
                anchor: anchor.clone(),
                table_id: table_id.clone(),
                row_id: format!("{}-R{}", table_id, row_index),
                row_index,
                schema: table.schema.clone(),
                row: row.clone(),
            })
            .collect()
    }
}

/// Build the payloads for every row of every table, in order.
pub fn to_row_payloads(tables: &[TableBlock]) -> Vec<RowPayload> {
    tables.iter().flat_map(RowPayload::from_table).collect()
}

/// Render row payloads as JSON Lines, one compact record per line.
pub fn to_row_payloads_jsonl(tables: &[TableBlock]) -> Result<String> {
    let mut output = String::new();
    for payload in to_row_payloads(tables) {
        output.push_str(&serde_json::to_string(&payload)?);
        output.push('\n');
    }
    Ok(output)
}
