//! `Content-Location` and `src` reference handling.
//!
//! Locations in compound documents are usually absolute URIs
//! (`file:///C:/Users/.../image001.png`) while the HTML refers to the same
//! resource by a short relative path (`page_files/image001.png`). Both sides
//! are reduced to a basename so they can meet in the part index.
//!
//! None of these functions fail: a location that does not parse as a URI is
//! treated as a plain path.

/// Characters that are not allowed in persisted file names.
const ILLEGAL_FILENAME_CHARS: [char; 9] = ['\\', '/', ':', '*', '?', '"', '<', '>', '|'];

/// Schemes whose path component is used for filename derivation.
const PATH_SCHEMES: [&str; 3] = ["file", "http", "https"];

/// Split a URI-like string into its lowercased scheme and path component.
///
/// Query and fragment are dropped, as is an authority introduced by `//`.
/// Returns `None` when the string has no scheme. Single-letter schemes are
/// rejected so that Windows drive letters (`C:\...`) stay paths.
pub fn split_uri(location: &str) -> Option<(String, &str)> {
    let (scheme, rest) = location.split_once(':')?;
    let valid = scheme.len() >= 2
        && scheme.starts_with(|c: char| c.is_ascii_alphabetic())
        && scheme
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    if !valid {
        return None;
    }

    let rest = rest.split('#').next().unwrap_or_default();
    let rest = rest.split('?').next().unwrap_or_default();
    let path = match rest.strip_prefix("//") {
        Some(authority_and_path) => authority_and_path
            .find('/')
            .map(|i| &authority_and_path[i..])
            .unwrap_or_default(),
        None => rest,
    };

    Some((scheme.to_ascii_lowercase(), path))
}

/// Last non-empty segment of a path, splitting on both `/` and `\`.
pub fn basename(path: &str) -> Option<&str> {
    path.split(['/', '\\'])
        .filter(|s| !s.is_empty() && *s != ".")
        .last()
}

/// Basename used to index a part by its declared location.
///
/// When the location carries any scheme the basename comes from the path
/// component, otherwise from the raw string.
pub fn location_basename(location: &str) -> Option<String> {
    let location = location.trim();
    if location.is_empty() {
        return None;
    }
    let path = match split_uri(location) {
        Some((_, path)) => path,
        None => location,
    };
    basename(path).map(str::to_string)
}

/// Basename of an HTML-side reference, looked up verbatim.
pub fn reference_basename(reference: &str) -> Option<&str> {
    basename(reference.trim())
}

/// Derive a sanitized filename from a declared location.
///
/// Only `file`, `http` and `https` URIs contribute their path component;
/// any other value is treated as a raw path.
pub fn filename_from_location(location: &str, max_len: usize) -> Option<String> {
    let location = location.trim();
    let base = match split_uri(location) {
        Some((scheme, path)) if PATH_SCHEMES.contains(&scheme.as_str()) => basename(path),
        _ => basename(location),
    }?;

    let name = sanitize_filename(base, max_len);
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

/// Replace path-illegal characters with `_` and bound the length in chars.
pub fn sanitize_filename(name: &str, max_len: usize) -> String {
    name.trim()
        .trim_matches('"')
        .chars()
        .map(|c| {
            if ILLEGAL_FILENAME_CHARS.contains(&c) {
                '_'
            } else {
                c
            }
        })
        .take(max_len)
        .collect()
}

/// Check whether a filename already carries an extension.
pub fn has_extension(filename: &str) -> bool {
    match filename.rfind('.') {
        Some(i) => i > 0 && i + 1 < filename.len(),
        None => false,
    }
}

/// Append an extension inferred from the content type when missing.
pub fn ensure_extension(filename: String, content_type: &str) -> String {
    if has_extension(&filename) {
        return filename;
    }
    format!(
        "{}.{}",
        filename,
        crate::model::extension_for_content_type(content_type)
    )
}
