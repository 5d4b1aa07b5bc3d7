//! Basename index resolving HTML image references to parts.

use std::collections::HashMap;

use crate::model::Part;

use super::location::{location_basename, reference_basename};

/// Lookup from location basename to the first part declaring it.
///
/// The index borrows the parts it was built from. On a basename collision
/// the part with the smaller ordinal index wins; later duplicates are
/// ignored, even when they live in different directories.
#[derive(Debug, Clone, Default)]
pub struct PartIndex<'a> {
    by_basename: HashMap<String, &'a Part>,
}

impl<'a> PartIndex<'a> {
    /// Build an index over a completed part list.
    pub fn build(parts: &'a [Part]) -> Self {
        let mut by_basename = HashMap::new();
        for part in parts {
            let Some(basename) = part.content_location.as_deref().and_then(location_basename)
            else {
                continue;
            };
            by_basename.entry(basename).or_insert(part);
        }
        log::debug!(
            "PartIndex: {} basenames over {} parts",
            by_basename.len(),
            parts.len()
        );
        Self { by_basename }
    }

    /// Resolve an HTML-side reference (usually a relative path) to a part.
    ///
    /// Only the final path segment is used and it is matched case-sensitively.
    pub fn resolve(&self, reference: &str) -> Option<&'a Part> {
        let basename = reference_basename(reference)?;
        self.by_basename.get(basename).copied()
    }

    /// Check whether a basename is indexed.
    pub fn contains(&self, basename: &str) -> bool {
        self.by_basename.contains_key(basename)
    }

    /// Get the number of indexed basenames.
    pub fn len(&self) -> usize {
        self.by_basename.len()
    }

    /// Check if the index is empty.
    pub fn is_empty(&self) -> bool {
        self.by_basename.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn part(index: usize, location: Option<&str>, data: &[u8]) -> Part {
        let part = Part::new(index, "image/png", data.to_vec());
        match location {
            Some(loc) => part.with_location(loc),
            None => part,
        }
    }

    #[test]
    fn test_resolve_relative_reference() {
        let parts = vec![
            part(0, Some("file:///C:/docs/page.htm"), b"html"),
            part(1, Some("file:///C:/docs/page_files/image001.png"), b"png"),
        ];
        let index = PartIndex::build(&parts);

        let resolved = index.resolve("page_files/image001.png").unwrap();
        assert_eq!(resolved.part_index, 1);
        assert!(index.resolve("page_files/image002.png").is_none());
    }

    #[test]
    fn test_first_wins() {
        let parts = vec![
            part(0, Some("file:///a/logo.png"), b"first"),
            part(1, Some("file:///b/logo.png"), b"second"),
        ];
        let index = PartIndex::build(&parts);

        assert_eq!(index.len(), 1);
        assert_eq!(index.resolve("logo.png").unwrap().part_index, 0);
    }

    #[test]
    fn test_case_sensitive() {
        let parts = vec![part(0, Some("Image001.PNG"), b"x")];
        let index = PartIndex::build(&parts);

        assert!(index.contains("Image001.PNG"));
        assert!(index.resolve("image001.png").is_none());
    }

    #[test]
    fn test_parts_without_location_skipped() {
        let parts = vec![part(0, None, b"x"), part(1, Some(""), b"y")];
        let index = PartIndex::build(&parts);
        assert!(index.is_empty());
        assert!(index.resolve("").is_none());
    }
}
