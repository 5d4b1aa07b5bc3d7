//! Document model types for MHT content representation.
//!
//! Parts describe the MIME leaves of a compound document; tables are the
//! normalized output of the HTML root part.

mod manifest;
mod part;
mod table;

pub use manifest::{Decomposition, Manifest};
pub use part::{extension_for_content_type, hash_bytes, Part};
pub use table::{
    image_placeholder, AnchorSource, Row, TableBlock, TableMeta, TableStats,
    IMG_PLACEHOLDER_PREFIX,
};
