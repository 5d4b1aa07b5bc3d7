//! Anchor inference: label a table from the blocks right before it.

use regex::Regex;
use scraper::ElementRef;

use super::dom::{collapse_whitespace, element_text};
use super::options::{DEFAULT_ANCHOR_LOOKBACK, DEFAULT_ANCHOR_MAX_LEN};
use crate::model::{AnchorSource, TableMeta};

/// Elements that count as lookback blocks.
const BLOCK_TAGS: &[&str] = &["p", "div", "li", "h1", "h2", "h3", "h4", "h5", "h6"];

/// Picks a label for a table from its preceding sibling blocks.
///
/// Two kinds of candidates are collected from the nearest non-empty blocks,
/// nearest first: blocks containing bold or strong text (normalized), then
/// blocks whose text starts with a number followed by `.` or `、` (raw).
/// The first candidate wins.
pub struct AnchorInferrer {
    lookback: usize,
    max_len: usize,
    numbering: Regex,
    enumerated: Regex,
}

impl AnchorInferrer {
    /// Create an inferrer scanning `lookback` blocks and shortening anchors
    /// to `max_len` characters.
    pub fn new(lookback: usize, max_len: usize) -> Self {
        Self {
            lookback,
            max_len: max_len.max(1),
            numbering: Regex::new(r"(\d+)\s*[、.]\s*").unwrap(),
            enumerated: Regex::new(r"^\s*\d+(\.|、)\s*").unwrap(),
        }
    }

    /// Infer the anchor of `table`.
    pub fn infer(&self, table: ElementRef<'_>) -> TableMeta {
        let blocks = self.lookback_blocks(table);

        let mut candidates: Vec<String> = blocks
            .iter()
            .filter(|block| block.emphasized)
            .map(|block| self.normalize(&block.text))
            .filter(|text| !text.is_empty())
            .collect();
        candidates.extend(
            blocks
                .iter()
                .filter(|block| self.enumerated.is_match(&block.text))
                .map(|block| block.text.clone()),
        );

        match candidates.first() {
            Some(first) => {
                let anchor = self.shorten(first);
                log::debug!("Anchor {:?} from {} candidate(s)", anchor, candidates.len());
                TableMeta {
                    anchor: Some(anchor),
                    anchor_source: AnchorSource::NumberedFallback,
                    anchor_candidates: candidates,
                }
            }
            None => TableMeta::none(),
        }
    }

    /// Nearest preceding block siblings with non-empty text, nearest first.
    ///
    /// A table parsed into an unclosed `<p>` counts the inline content
    /// before it in that paragraph as its nearest block, then continues
    /// with the paragraph's own siblings.
    fn lookback_blocks(&self, table: ElementRef<'_>) -> Vec<Block> {
        let mut blocks = Vec::with_capacity(self.lookback);
        if self.lookback == 0 {
            return blocks;
        }

        let mut start = table;
        if let Some(paragraph) = table
            .parent()
            .and_then(ElementRef::wrap)
            .filter(|parent| parent.value().name() == "p")
        {
            let lead = leading_inline(table);
            if !lead.text.is_empty() {
                blocks.push(lead);
            }
            start = paragraph;
        }

        for sibling in start.prev_siblings().filter_map(ElementRef::wrap) {
            if blocks.len() >= self.lookback {
                break;
            }
            if !BLOCK_TAGS.contains(&sibling.value().name()) {
                continue;
            }
            let text = element_text(sibling);
            if text.is_empty() {
                continue;
            }
            blocks.push(Block {
                text,
                emphasized: has_emphasis(sibling),
            });
        }
        blocks
    }

    /// Collapse whitespace and unify numbering punctuation to `N、`.
    pub fn normalize(&self, text: &str) -> String {
        let collapsed = collapse_whitespace(text);
        self.numbering
            .replace_all(&collapsed, "${1}、")
            .trim()
            .to_string()
    }

    /// Truncate to the display length, marking truncation with "...".
    pub fn shorten(&self, text: &str) -> String {
        if text.chars().count() <= self.max_len {
            return text.to_string();
        }
        let head: String = text.chars().take(self.max_len).collect();
        format!("{}...", head.trim())
    }
}

impl Default for AnchorInferrer {
    fn default() -> Self {
        Self::new(DEFAULT_ANCHOR_LOOKBACK, DEFAULT_ANCHOR_MAX_LEN)
    }
}

struct Block {
    text: String,
    emphasized: bool,
}

fn has_emphasis(block: ElementRef<'_>) -> bool {
    block
        .descendants()
        .skip(1)
        .filter_map(ElementRef::wrap)
        .any(is_emphasis)
}

fn is_emphasis(element: ElementRef<'_>) -> bool {
    matches!(element.value().name(), "b" | "strong")
}

/// Inline content preceding `table` within its parent, in document order.
fn leading_inline(table: ElementRef<'_>) -> Block {
    let mut pieces = Vec::new();
    let mut emphasized = false;
    for node in table.prev_siblings() {
        if let Some(text) = node.value().as_text() {
            pieces.push(text.trim().to_string());
        } else if let Some(element) = ElementRef::wrap(node) {
            if element.value().name() == "table" {
                continue;
            }
            emphasized |= is_emphasis(element) || has_emphasis(element);
            pieces.push(element_text(element));
        }
    }
    pieces.reverse();
    pieces.retain(|piece| !piece.is_empty());
    Block {
        text: pieces.join(" "),
        emphasized,
    }
}
