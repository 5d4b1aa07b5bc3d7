//! Cell composition: the text content of one table cell.
//!
//! A cell's text is built from three sources:
//! - its ordinary text nodes, joined by single spaces and collapsed;
//! - every image, replaced by the interpreter's text for the resolved part,
//!   or by an `[IMG:src]` placeholder when no text is available;
//! - every nested table, rendered as a markdown pipe table on its own lines
//!   after the marker line, appended after the ordinary text.
//!
//! Nested tables are not descended into, so their images are never
//! interpreted and their text is not repeated in the cell's own text.

use scraper::{ElementRef, Node};

use super::dom::{collapse_whitespace, element_text, row_cells, table_rows};
use super::options::DEFAULT_SUB_TABLE_MARKER;
use crate::interpret::ImageInterpreter;
use crate::model::{image_placeholder, TableStats};
use crate::parser::PartIndex;

/// Text of one cell plus the counters gathered while building it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComposedCell {
    /// Final trimmed cell text
    pub text: String,

    /// Images and nested tables met in the cell
    pub stats: TableStats,
}

/// Builds cell text with image substitution and nested table rendering.
pub struct CellComposer<'a> {
    index: &'a PartIndex<'a>,
    interpreter: Option<&'a dyn ImageInterpreter>,
    sub_table_marker: &'a str,
}

impl<'a> CellComposer<'a> {
    /// Create a composer resolving images against `index`, without an
    /// interpreter.
    pub fn new(index: &'a PartIndex<'a>) -> Self {
        Self {
            index,
            interpreter: None,
            sub_table_marker: DEFAULT_SUB_TABLE_MARKER,
        }
    }

    /// Use an interpreter for resolved images.
    pub fn with_interpreter(mut self, interpreter: Option<&'a dyn ImageInterpreter>) -> Self {
        self.interpreter = interpreter;
        self
    }

    /// Set the marker line placed before nested tables.
    pub fn with_sub_table_marker(mut self, marker: &'a str) -> Self {
        self.sub_table_marker = marker;
        self
    }

    /// Compose the text of a `<td>`/`<th>` element.
    pub fn compose(&self, cell: ElementRef<'_>) -> ComposedCell {
        let mut fragments = Vec::new();
        let mut nested = Vec::new();
        let mut stats = TableStats::default();
        self.walk(cell, &mut fragments, &mut nested, &mut stats);

        let base = collapse_whitespace(&fragments.join(" "));
        let mut pieces = Vec::with_capacity(nested.len() + 1);
        if !base.is_empty() {
            pieces.push(base);
        }
        pieces.extend(nested);

        ComposedCell {
            text: pieces.join("\n").trim().to_string(),
            stats,
        }
    }

    fn walk(
        &self,
        element: ElementRef<'_>,
        fragments: &mut Vec<String>,
        nested: &mut Vec<String>,
        stats: &mut TableStats,
    ) {
        for child in element.children() {
            match child.value() {
                Node::Text(text) => {
                    let text = text.trim();
                    if !text.is_empty() {
                        fragments.push(text.to_string());
                    }
                }
                Node::Element(_) => {
                    let Some(child) = ElementRef::wrap(child) else {
                        continue;
                    };
                    match child.value().name() {
                        "table" => {
                            stats.nested_tables += 1;
                            let markdown = nested_table_markdown(child);
                            if !markdown.is_empty() {
                                nested.push(format!("{}\n{}", self.sub_table_marker, markdown));
                            }
                        }
                        "img" => {
                            stats.images += 1;
                            let src = child.value().attr("src").unwrap_or("");
                            fragments.push(self.image_text(src, stats));
                        }
                        "script" | "style" => {}
                        _ => self.walk(child, fragments, nested, stats),
                    }
                }
                _ => {}
            }
        }
    }

    fn image_text(&self, src: &str, stats: &mut TableStats) -> String {
        let src = src.trim();
        let part = if src.is_empty() {
            None
        } else {
            self.index.resolve(src)
        };

        let text = match (self.interpreter, part) {
            (Some(interpreter), Some(part)) => match part.payload_path.as_deref() {
                Some(path) => {
                    let result = interpreter.interpret_rich(path);
                    let text = result.text.trim().to_string();
                    match (&result.error, text.is_empty()) {
                        (Some(error), _) => log::warn!(
                            "{} failed on part {} ({}): {}",
                            result.method,
                            part.part_index,
                            src,
                            error
                        ),
                        (None, true) => log::debug!(
                            "{} returned no text for part {} ({})",
                            result.method,
                            part.part_index,
                            src
                        ),
                        (None, false) => log::debug!(
                            "{} interpreted part {} ({}): {} chars",
                            result.method,
                            part.part_index,
                            src,
                            text.chars().count()
                        ),
                    }
                    text
                }
                None => {
                    log::debug!("Image {} resolved to part {} without payload", src, part.part_index);
                    String::new()
                }
            },
            (_, None) => {
                log::debug!("Image {:?} does not resolve to any part", src);
                String::new()
            }
            (None, Some(_)) => String::new(),
        };

        if text.is_empty() {
            image_placeholder(src)
        } else {
            stats.interpreted_images += 1;
            text
        }
    }
}

/// Render a nested table as a markdown pipe table.
///
/// The first non-blank row is the header; rows are padded to the widest
/// row. Blank rows are dropped and an all-blank table renders as "".
pub fn nested_table_markdown(table: ElementRef<'_>) -> String {
    let mut rows: Vec<Vec<String>> = table_rows(table)
        .into_iter()
        .map(|row| {
            row_cells(row)
                .map(|cell| element_text(cell).replace('|', "\\|"))
                .collect::<Vec<_>>()
        })
        .filter(|row| row.iter().any(|c| !c.is_empty()))
        .collect();

    let width = rows.iter().map(Vec::len).max().unwrap_or(0);
    if width == 0 {
        return String::new();
    }
    for row in &mut rows {
        row.resize(width, String::new());
    }

    let line = |cells: &[String]| format!("| {} |", cells.join(" | "));
    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(line(&rows[0]));
    lines.push(line(&vec!["---".to_string(); width]));
    lines.extend(rows[1..].iter().map(|r| line(r)));
    lines.join("\n")
}
