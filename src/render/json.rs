//! JSON rendering for extraction output.

use serde::Serialize;

use crate::error::{Error, Result};
use crate::model::TableBlock;

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// Serialize any record to JSON.
pub fn to_json<T: Serialize + ?Sized>(value: &T, format: JsonFormat) -> Result<String> {
    let result = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(value),
        JsonFormat::Compact => serde_json::to_string(value),
    };

    result.map_err(|e| Error::Render(format!("JSON serialization error: {}", e)))
}

/// Convert extracted tables to a JSON array.
pub fn tables_to_json(tables: &[TableBlock], format: JsonFormat) -> Result<String> {
    to_json(tables, format)
}
