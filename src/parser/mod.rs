//! MHT decomposition module.

mod charset;
pub mod location;
mod mht_parser;
mod options;
mod part_index;

pub use charset::decode_html;
pub use mht_parser::{persist_decomposition, MhtParser};
pub use options::{DecomposeOptions, DEFAULT_MAX_FILENAME_LEN};
pub use part_index::PartIndex;
