//! Table types.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One row of a table: schema entry mapped to cell text, in schema order.
pub type Row = IndexMap<String, String>;

/// A normalized top-level table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableBlock {
    /// Position among top-level tables in document order
    pub order: usize,

    /// Column names taken from the first grid row
    pub schema: Vec<String>,

    /// Data rows keyed by schema entry
    pub rows: Vec<Row>,

    /// Inferred anchor and its candidates
    pub meta: Option<TableMeta>,

    /// Counters gathered while normalizing the table
    #[serde(default)]
    pub stats: TableStats,
}

impl TableBlock {
    /// Create an empty (degenerate) table.
    pub fn empty(order: usize) -> Self {
        Self {
            order,
            schema: Vec::new(),
            rows: Vec::new(),
            meta: None,
            stats: TableStats::default(),
        }
    }

    /// Build a table from a dense grid.
    ///
    /// The first grid row, trimmed, becomes the schema. Every later row that
    /// is not entirely blank is padded or truncated to the schema width and
    /// zipped against it; duplicate schema names keep the last value.
    pub fn from_grid(order: usize, grid: &[Vec<String>]) -> Self {
        let Some((header, body)) = grid.split_first() else {
            return Self::empty(order);
        };

        let schema: Vec<String> = header.iter().map(|h| h.trim().to_string()).collect();
        let rows = body
            .iter()
            .filter(|r| r.iter().any(|c| !c.trim().is_empty()))
            .map(|r| {
                let mut values = r.iter().map(|c| c.trim().to_string());
                schema
                    .iter()
                    .map(|key| (key.clone(), values.next().unwrap_or_default()))
                    .collect::<Row>()
            })
            .collect();

        Self {
            order,
            schema,
            rows,
            meta: None,
            stats: TableStats::default(),
        }
    }

    /// Attach inferred metadata.
    pub fn with_meta(mut self, meta: TableMeta) -> Self {
        self.meta = Some(meta);
        self
    }

    /// Attach normalization counters.
    pub fn with_stats(mut self, stats: TableStats) -> Self {
        self.stats = stats;
        self
    }

    /// Get the number of data rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Get the number of columns.
    pub fn column_count(&self) -> usize {
        self.schema.len()
    }

    /// Check if the table is degenerate (no schema).
    pub fn is_empty(&self) -> bool {
        self.schema.is_empty()
    }

    /// Get the inferred anchor, if any.
    pub fn anchor(&self) -> Option<&str> {
        self.meta.as_ref().and_then(|m| m.anchor.as_deref())
    }

    /// Count `[IMG:` placeholders across all row values.
    pub fn placeholder_count(&self) -> usize {
        self.rows
            .iter()
            .flat_map(|r| r.values())
            .map(|v| v.matches(IMG_PLACEHOLDER_PREFIX).count())
            .sum()
    }
}

/// Prefix of the placeholder left for images without interpreted text.
pub const IMG_PLACEHOLDER_PREFIX: &str = "[IMG:";

/// Build the placeholder for an unresolved or uninterpreted image.
pub fn image_placeholder(src: &str) -> String {
    format!("{}{}]", IMG_PLACEHOLDER_PREFIX, src)
}

/// Anchor metadata attached to a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableMeta {
    /// Chosen anchor, truncated for display
    pub anchor: Option<String>,

    /// How the anchor was chosen
    pub anchor_source: AnchorSource,

    /// Every candidate in priority order
    pub anchor_candidates: Vec<String>,
}

impl TableMeta {
    /// Metadata for a table without any anchor candidate.
    pub fn none() -> Self {
        Self {
            anchor: None,
            anchor_source: AnchorSource::None,
            anchor_candidates: Vec::new(),
        }
    }
}

/// Source classification of an inferred anchor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnchorSource {
    /// Selected from emphasis or enumeration candidates
    NumberedFallback,
    /// No candidate found
    #[default]
    None,
}

impl std::fmt::Display for AnchorSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnchorSource::NumberedFallback => write!(f, "numbered_fallback"),
            AnchorSource::None => write!(f, "none"),
        }
    }
}

/// Counters gathered while normalizing one table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableStats {
    /// Image elements encountered in cells
    pub images: usize,

    /// Images replaced by interpreted text
    pub interpreted_images: usize,

    /// Nested tables serialized into cells
    pub nested_tables: usize,
}

impl TableStats {
    /// Merge another stats instance into this one.
    pub fn merge(&mut self, other: &TableStats) {
        self.images += other.images;
        self.interpreted_images += other.interpreted_images;
        self.nested_tables += other.nested_tables;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_from_empty_grid() {
        let table = TableBlock::from_grid(4, &[]);
        assert!(table.is_empty());
        assert_eq!(table.order, 4);
        assert_eq!(table.row_count(), 0);
    }

    #[test]
    fn test_from_grid_basic() {
        let table = TableBlock::from_grid(0, &grid(&[&[" Name ", "Age"], &["Alice", "30"]]));
        assert_eq!(table.schema, vec!["Name", "Age"]);
        assert_eq!(table.rows[0]["Name"], "Alice");
        assert_eq!(table.rows[0]["Age"], "30");
    }

    #[test]
    fn test_from_grid_skips_blank_rows() {
        let table = TableBlock::from_grid(0, &grid(&[&["A", "B"], &["", "  "], &["1", "2"]]));
        assert_eq!(table.row_count(), 1);
        assert_eq!(table.rows[0]["A"], "1");
    }

    #[test]
    fn test_from_grid_pads_and_truncates() {
        let table = TableBlock::from_grid(0, &grid(&[&["A", "B", "C"], &["1"], &["x", "y", "z", "w"]]));
        assert_eq!(table.rows[0]["B"], "");
        assert_eq!(table.rows[0]["C"], "");
        assert_eq!(table.rows[1].len(), 3);
        assert_eq!(table.rows[1]["C"], "z");
    }

    #[test]
    fn test_from_grid_duplicate_schema_last_wins() {
        let table = TableBlock::from_grid(0, &grid(&[&["K", "K"], &["first", "second"]]));
        assert_eq!(table.rows[0].len(), 1);
        assert_eq!(table.rows[0]["K"], "second");
    }

    #[test]
    fn test_placeholder_count() {
        let table = TableBlock::from_grid(
            0,
            &grid(&[&["A"], &["[IMG:a.png] and [IMG:b.png]"], &["text"]]),
        );
        assert_eq!(table.placeholder_count(), 2);
        assert_eq!(image_placeholder("x.png"), "[IMG:x.png]");
    }

    #[test]
    fn test_anchor_source_serde() {
        let json = serde_json::to_string(&TableMeta::none()).unwrap();
        assert!(json.contains("\"anchor_source\":\"none\""));
        assert_eq!(AnchorSource::NumberedFallback.to_string(), "numbered_fallback");
    }
}
