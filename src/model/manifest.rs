//! Decomposition result and its persisted manifest.

use super::Part;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The ordered parts of one compound document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Decomposition {
    /// Source identity (file path or caller-supplied label)
    pub source: String,

    /// Content type of the top-level entity
    pub root_content_type: String,

    /// Whether the top-level entity is a multipart container
    pub is_multipart: bool,

    /// Leaf parts in walk order
    pub parts: Vec<Part>,
}

impl Decomposition {
    /// Get the number of parts.
    pub fn part_count(&self) -> usize {
        self.parts.len()
    }

    /// Find the root HTML part.
    ///
    /// The first part declared as `text/html` wins; otherwise the first
    /// part whose filename has an HTML extension.
    pub fn root_html(&self) -> Option<&Part> {
        self.parts
            .iter()
            .find(|p| p.is_html())
            .or_else(|| self.parts.iter().find(|p| p.has_html_filename()))
    }

    /// Iterate over image parts.
    pub fn images(&self) -> impl Iterator<Item = &Part> {
        self.parts.iter().filter(|p| p.is_image())
    }

    /// Build the manifest record for this decomposition.
    pub fn manifest(&self) -> Manifest<'_> {
        Manifest {
            source_file: &self.source,
            root_content_type: &self.root_content_type,
            is_multipart: self.is_multipart,
            part_count: self.parts.len(),
            generated_at: Utc::now(),
            parts: &self.parts,
        }
    }
}

/// Manifest written next to persisted payloads.
#[derive(Debug, Serialize)]
pub struct Manifest<'a> {
    /// Source identity
    pub source_file: &'a str,

    /// Content type of the top-level entity
    pub root_content_type: &'a str,

    /// Whether the top-level entity is a multipart container
    pub is_multipart: bool,

    /// Number of parts
    pub part_count: usize,

    /// When the manifest was produced
    pub generated_at: DateTime<Utc>,

    /// Every part with all of its attributes
    pub parts: &'a [Part],
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decomposition(parts: Vec<Part>) -> Decomposition {
        Decomposition {
            source: "test.mht".to_string(),
            root_content_type: "multipart/related".to_string(),
            is_multipart: true,
            parts,
        }
    }

    #[test]
    fn test_root_html_by_content_type() {
        let doc = decomposition(vec![
            Part::new(0, "image/png", Vec::new()),
            Part::new(1, "text/html", Vec::new()),
        ]);
        assert_eq!(doc.root_html().map(|p| p.part_index), Some(1));
    }

    #[test]
    fn test_root_html_by_filename() {
        let doc = decomposition(vec![
            Part::new(0, "image/png", Vec::new()),
            Part::new(1, "application/octet-stream", Vec::new()).with_filename("page.htm"),
        ]);
        assert_eq!(doc.root_html().map(|p| p.part_index), Some(1));
    }

    #[test]
    fn test_root_html_missing() {
        let doc = decomposition(vec![Part::new(0, "image/png", Vec::new())]);
        assert!(doc.root_html().is_none());
    }

    #[test]
    fn test_manifest_counts() {
        let doc = decomposition(vec![
            Part::new(0, "text/html", Vec::new()),
            Part::new(1, "image/png", Vec::new()),
        ]);
        let json = serde_json::to_value(doc.manifest()).unwrap();
        assert_eq!(json["part_count"], 2);
        assert_eq!(json["source_file"], "test.mht");
        assert_eq!(json["parts"][1]["content_type"], "image/png");
        assert_eq!(doc.images().count(), 1);
    }
}
