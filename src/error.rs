//! Error types for unmht library.

use std::io;
use thiserror::Error;

/// Result type alias for unmht operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur during MHT processing.
///
/// Only conditions that stop a whole document are represented here.
/// Unresolvable images, degenerate tables and interpreter failures are
/// absorbed where they occur and never surface as an `Error`.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The input is not recognized as a MIME document.
    #[error("Unknown file format: not a MIME compound document")]
    UnknownFormat,

    /// Error parsing the MIME structure.
    #[error("MIME parsing error: {0}")]
    MimeParse(String),

    /// The document has no HTML part to extract tables from.
    #[error("Document has no HTML root part")]
    MissingRootHtml,

    /// Error during rendering (JSON, JSON Lines).
    #[error("Rendering error: {0}")]
    Render(String),
}

impl From<mailparse::MailParseError> for Error {
    fn from(err: mailparse::MailParseError) -> Self {
        Error::MimeParse(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Render(format!("JSON serialization error: {}", err))
    }
}
