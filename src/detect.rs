//! MHT format detection and validation.

use crate::error::{Error, Result};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// MHT format information read from the top-level header block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MhtFormat {
    /// Root content type, lowercased (e.g., "multipart/related")
    pub root_content_type: String,
    /// Multipart boundary, if the root declares one
    pub boundary: Option<String>,
    /// Whether a `MIME-Version` header is present
    pub mime_version: bool,
}

impl MhtFormat {
    /// Whether the root is a multipart container.
    pub fn is_multipart(&self) -> bool {
        self.root_content_type.starts_with("multipart/")
    }
}

impl std::fmt::Display for MhtFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "MIME {}", self.root_content_type)
    }
}

/// Only the leading bytes are inspected when detecting from a file.
const HEADER_PROBE_LEN: u64 = 16 * 1024;

/// Detect MHT format from a file path.
///
/// # Example
/// ```no_run
/// use unmht::detect::detect_format_from_path;
///
/// let format = detect_format_from_path("page.mht").unwrap();
/// println!("root: {}", format.root_content_type);
/// ```
pub fn detect_format_from_path<P: AsRef<Path>>(path: P) -> Result<MhtFormat> {
    let file = File::open(path)?;
    let mut header = Vec::new();
    file.take(HEADER_PROBE_LEN).read_to_end(&mut header)?;
    detect_format_from_bytes(&header)
}

/// Detect MHT format from bytes.
///
/// The data must start with an RFC 822 style header block containing a
/// `Content-Type` header. Anything else is `Error::UnknownFormat`.
pub fn detect_format_from_bytes(data: &[u8]) -> Result<MhtFormat> {
    let text = String::from_utf8_lossy(data);
    let headers = header_block(&text);
    if headers.is_empty() {
        return Err(Error::UnknownFormat);
    }

    let mut content_type = None;
    let mut mime_version = false;
    for (name, value) in &headers {
        if name.eq_ignore_ascii_case("content-type") && content_type.is_none() {
            content_type = Some(value.clone());
        } else if name.eq_ignore_ascii_case("mime-version") {
            mime_version = true;
        }
    }

    let content_type = content_type.ok_or(Error::UnknownFormat)?;
    let mut params = content_type.split(';');
    let root_content_type = params
        .next()
        .map(|m| m.trim().to_ascii_lowercase())
        .unwrap_or_default();
    if !root_content_type.contains('/') {
        return Err(Error::UnknownFormat);
    }

    let boundary = params.find_map(|p| {
        let (key, value) = p.split_once('=')?;
        if key.trim().eq_ignore_ascii_case("boundary") {
            Some(value.trim().trim_matches('"').to_string())
        } else {
            None
        }
    });

    Ok(MhtFormat {
        root_content_type,
        boundary,
        mime_version,
    })
}

/// Collect `(name, value)` pairs up to the first blank line, unfolding
/// continuation lines. Returns an empty list as soon as a line that is not
/// a header is seen.
fn header_block(text: &str) -> Vec<(String, String)> {
    let mut headers: Vec<(String, String)> = Vec::new();

    for line in text.lines() {
        let line = line.trim_end_matches('\r');
        if line.is_empty() {
            break;
        }

        if line.starts_with(' ') || line.starts_with('\t') {
            match headers.last_mut() {
                Some((_, value)) => {
                    value.push(' ');
                    value.push_str(line.trim());
                    continue;
                }
                None => return Vec::new(),
            }
        }

        let Some((name, value)) = line.split_once(':') else {
            return Vec::new();
        };
        if name.is_empty() || !name.bytes().all(|b| b.is_ascii_graphic()) {
            return Vec::new();
        }
        headers.push((name.to_string(), value.trim().to_string()));
    }

    headers
}

/// Check if a file is a MIME compound document.
pub fn is_mht<P: AsRef<Path>>(path: P) -> bool {
    detect_format_from_path(path).is_ok()
}

/// Check if bytes look like a MIME compound document.
pub fn is_mht_bytes(data: &[u8]) -> bool {
    detect_format_from_bytes(data).is_ok()
}
