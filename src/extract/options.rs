//! Table extraction options.

/// Number of preceding block siblings scanned for an anchor.
pub const DEFAULT_ANCHOR_LOOKBACK: usize = 3;

/// Anchor length, in characters, before shortening kicks in.
pub const DEFAULT_ANCHOR_MAX_LEN: usize = 80;

/// Line placed before each nested table rendered into a cell.
pub const DEFAULT_SUB_TABLE_MARKER: &str = "子表:";

/// Options for table extraction.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Maximum number of non-empty block siblings examined for an anchor
    pub anchor_lookback: usize,

    /// Maximum anchor length in characters
    pub anchor_max_len: usize,

    /// Marker line prefixed to nested table markdown
    pub sub_table_marker: String,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            anchor_lookback: DEFAULT_ANCHOR_LOOKBACK,
            anchor_max_len: DEFAULT_ANCHOR_MAX_LEN,
            sub_table_marker: DEFAULT_SUB_TABLE_MARKER.to_string(),
        }
    }
}

impl ExtractOptions {
    /// Create new options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set how many block siblings are examined for an anchor.
    pub fn with_anchor_lookback(mut self, lookback: usize) -> Self {
        self.anchor_lookback = lookback;
        self
    }

    /// Set the maximum anchor length.
    pub fn with_anchor_max_len(mut self, max_len: usize) -> Self {
        self.anchor_max_len = max_len.max(1);
        self
    }

    /// Set the nested table marker line.
    pub fn with_sub_table_marker(mut self, marker: impl Into<String>) -> Self {
        self.sub_table_marker = marker.into();
        self
    }

    /// Disable anchor inference.
    pub fn without_anchors(mut self) -> Self {
        self.anchor_lookback = 0;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let opts = ExtractOptions::default();
        assert_eq!(opts.anchor_lookback, 3);
        assert_eq!(opts.anchor_max_len, 80);
        assert_eq!(opts.sub_table_marker, "子表:");
    }

    #[test]
    fn test_builder() {
        let opts = ExtractOptions::new()
            .with_anchor_lookback(5)
            .with_anchor_max_len(0)
            .with_sub_table_marker("Sub:");
        assert_eq!(opts.anchor_lookback, 5);
        assert_eq!(opts.anchor_max_len, 1);
        assert_eq!(opts.sub_table_marker, "Sub:");
        assert_eq!(opts.without_anchors().anchor_lookback, 0);
    }
}
