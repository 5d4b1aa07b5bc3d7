//! Part types: one leaf resource of a compound document.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::PathBuf;

/// Number of digest hex characters used in persisted payload names.
const DIGEST_PREFIX_LEN: usize = 10;

/// One leaf part of a compound document.
///
/// Parts are created once, in walk order, by the decomposer and are not
/// modified afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Part {
    /// Ordinal index in document-walk order, starting at 0
    pub part_index: usize,

    /// Declared content type, lowercased (e.g., "image/png")
    pub content_type: String,

    /// Declared `Content-Location`
    pub content_location: Option<String>,

    /// Declared `Content-ID`
    pub content_id: Option<String>,

    /// Filename derived from the location (or synthesized)
    pub filename: String,

    /// Decoded payload length in bytes
    pub size_bytes: usize,

    /// SHA-256 of the decoded payload, lowercase hex
    pub sha256: String,

    /// Raw header names mapped to their values
    pub headers: IndexMap<String, String>,

    /// Declared charset parameter of the content type
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub charset: Option<String>,

    /// Where the payload was persisted, if a dump directory was given
    pub payload_path: Option<PathBuf>,

    /// Decoded payload bytes
    #[serde(skip)]
    pub data: Vec<u8>,
}

impl Part {
    /// Create a part from its decoded payload. The digest and size are
    /// computed here so they always match `data`.
    pub fn new(part_index: usize, content_type: impl Into<String>, data: Vec<u8>) -> Self {
        let sha256 = hash_bytes(&data);
        Self {
            part_index,
            content_type: content_type.into(),
            content_location: None,
            content_id: None,
            filename: format!("part_{:03}", part_index),
            size_bytes: data.len(),
            sha256,
            headers: IndexMap::new(),
            charset: None,
            payload_path: None,
            data,
        }
    }

    /// Set the declared location.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.content_location = Some(location.into());
        self
    }

    /// Set the derived filename.
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = filename.into();
        self
    }

    /// Set the raw headers.
    pub fn with_headers(mut self, headers: IndexMap<String, String>) -> Self {
        self.headers = headers;
        self
    }

    /// Check if this part is HTML by declared content type.
    pub fn is_html(&self) -> bool {
        self.content_type == "text/html"
    }

    /// Check if this part is an image by declared content type.
    pub fn is_image(&self) -> bool {
        self.content_type.starts_with("image/")
    }

    /// Check if the derived filename has an HTML extension.
    pub fn has_html_filename(&self) -> bool {
        let lower = self.filename.to_lowercase();
        lower.ends_with(".html") || lower.ends_with(".htm")
    }

    /// Name used when persisting the payload:
    /// `<3-digit-index>_<10-hex-digest>_<filename>`.
    pub fn persisted_name(&self) -> String {
        let prefix_len = DIGEST_PREFIX_LEN.min(self.sha256.len());
        format!(
            "{:03}_{}_{}",
            self.part_index,
            &self.sha256[..prefix_len],
            self.filename
        )
    }

    /// Get the size of the payload in bytes.
    pub fn size(&self) -> usize {
        self.size_bytes
    }
}

/// Compute the SHA-256 of `data` as a lowercase hex string.
pub fn hash_bytes(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Get the file extension (without dot) for a content type.
///
/// Unknown types fall back to `bin`.
pub fn extension_for_content_type(content_type: &str) -> &'static str {
    match content_type {
        "text/html" => "html",
        "text/plain" => "txt",
        "text/css" => "css",
        "text/xml" | "application/xml" => "xml",
        "text/javascript" | "application/javascript" | "application/x-javascript" => "js",
        "application/json" => "json",
        "application/pdf" => "pdf",
        "image/jpeg" | "image/jpg" | "image/pjpeg" => "jpg",
        "image/png" | "image/x-png" => "png",
        "image/gif" => "gif",
        "image/bmp" | "image/x-ms-bmp" => "bmp",
        "image/tiff" => "tiff",
        "image/webp" => "webp",
        "image/svg+xml" => "svg",
        "image/x-icon" | "image/vnd.microsoft.icon" => "ico",
        "image/x-emf" | "image/emf" => "emf",
        "image/x-wmf" | "image/wmf" => "wmf",
        "font/ttf" => "ttf",
        "font/woff" => "woff",
        "font/woff2" => "woff2",
        _ => "bin",
    }
}
