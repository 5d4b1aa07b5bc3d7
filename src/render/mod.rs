//! Rendering module for extraction output.

mod diagnostics;
mod json;
mod payload;

pub use diagnostics::Diagnostics;
pub use json::{tables_to_json, to_json, JsonFormat};
pub use payload::{to_row_payloads, to_row_payloads_jsonl, RowPayload};
