//! # unmht
//!
//! Table extraction from MHT (MIME HTML) compound documents.
//!
//! An MHT file bundles an HTML page with its images as MIME parts. This
//! library splits the document into its parts, resolves the images the HTML
//! references, and turns every top-level HTML table into a schema plus a list
//! of row mappings, labeled with the heading text found right before it.
//!
//! ## Quick Start
//!
//! ```no_run
//! use unmht::{extract_tables_from_file, render};
//!
//! fn main() -> unmht::Result<()> {
//!     let tables = extract_tables_from_file("manual.mht")?;
//!
//!     for table in &tables {
//!         println!("{:?}: {} rows", table.anchor(), table.row_count());
//!     }
//!     println!("{}", render::tables_to_json(&tables, render::JsonFormat::Pretty)?);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Part decomposition**: every MIME leaf with digest, headers and an
//!   optional persisted payload plus manifest
//! - **Span normalization**: `rowspan`/`colspan` resolved into dense rows
//! - **Image substitution**: pluggable interpreters (OCR via `tesseract`)
//! - **Nested tables**: rendered as markdown inside their parent cell
//! - **Anchors**: bold or numbered headings before each table
//! - **Parallel processing**: Uses Rayon for hashing and persisting parts

pub mod detect;
pub mod error;
pub mod extract;
pub mod interpret;
pub mod model;
pub mod parser;
pub mod render;

// Re-export commonly used types
pub use detect::{detect_format_from_bytes, detect_format_from_path, is_mht, MhtFormat};
pub use error::{Error, Result};
pub use extract::{extract_tables, ExtractOptions, TableExtractor};
pub use interpret::{
    FnInterpreter, ImageInterpreter, Interpretation, NoopInterpreter, TesseractInterpreter,
};
pub use model::{
    AnchorSource, Decomposition, Manifest, Part, Row, TableBlock, TableMeta, TableStats,
};
pub use parser::{DecomposeOptions, MhtParser, PartIndex};
pub use render::{Diagnostics, JsonFormat, RowPayload};

use std::fs;
use std::path::Path;

/// Decompose an MHT file into its parts.
///
/// # Example
///
/// ```no_run
/// use unmht::decompose_file;
///
/// let decomposition = decompose_file("manual.mht").unwrap();
/// println!("Parts: {}", decomposition.part_count());
/// ```
pub fn decompose_file<P: AsRef<Path>>(path: P) -> Result<Decomposition> {
    let parser = MhtParser::open(path)?;
    parser.parse()
}

/// Decompose an MHT file with custom options.
///
/// # Example
///
/// ```no_run
/// use unmht::{decompose_file_with_options, DecomposeOptions};
///
/// let options = DecomposeOptions::new().with_dump_dir("./dump");
/// let decomposition = decompose_file_with_options("manual.mht", options).unwrap();
/// ```
pub fn decompose_file_with_options<P: AsRef<Path>>(
    path: P,
    options: DecomposeOptions,
) -> Result<Decomposition> {
    let parser = MhtParser::open_with_options(path, options)?;
    parser.parse()
}

/// Decompose an MHT document held in memory.
pub fn decompose_bytes(data: &[u8]) -> Result<Decomposition> {
    let parser = MhtParser::from_bytes(data)?;
    parser.parse()
}

/// Decompose an MHT document held in memory with custom options.
pub fn decompose_bytes_with_options(
    data: &[u8],
    options: DecomposeOptions,
) -> Result<Decomposition> {
    let parser = MhtParser::from_bytes_with_options(data, options)?;
    parser.parse()
}

/// Decode the root HTML part of a decomposition.
///
/// Fails with [`Error::MissingRootHtml`] when no part is HTML.
pub fn root_html(decomposition: &Decomposition) -> Result<String> {
    let part = decomposition.root_html().ok_or(Error::MissingRootHtml)?;
    log::debug!(
        "Root HTML is part {} ({}, {} bytes)",
        part.part_index,
        part.filename,
        part.size_bytes
    );
    Ok(parser::decode_html(&part.data, part.charset.as_deref()))
}

/// Extract the top-level tables of an already decomposed document.
///
/// Images are only interpreted when their parts were persisted, since the
/// interpreter reads the payload file.
pub fn extract_tables_from_decomposition(
    decomposition: &Decomposition,
    interpreter: Option<&dyn ImageInterpreter>,
    options: &ExtractOptions,
) -> Result<Vec<TableBlock>> {
    let html = root_html(decomposition)?;
    let index = PartIndex::build(&decomposition.parts);
    Ok(extract_tables(&html, &index, interpreter, options))
}

/// Extract the top-level tables of an MHT file.
///
/// # Example
///
/// ```no_run
/// use unmht::extract_tables_from_file;
///
/// let tables = extract_tables_from_file("manual.mht").unwrap();
/// println!("Tables: {}", tables.len());
/// ```
pub fn extract_tables_from_file<P: AsRef<Path>>(path: P) -> Result<Vec<TableBlock>> {
    let decomposition = decompose_file(path)?;
    extract_tables_from_decomposition(&decomposition, None, &ExtractOptions::default())
}

/// Extract the top-level tables of an MHT file as JSON.
///
/// # Example
///
/// ```no_run
/// use unmht::{to_json, JsonFormat};
///
/// let json = to_json("manual.mht", JsonFormat::Pretty).unwrap();
/// std::fs::write("tables.json", json).unwrap();
/// ```
pub fn to_json<P: AsRef<Path>>(path: P, format: JsonFormat) -> Result<String> {
    let tables = extract_tables_from_file(path)?;
    render::tables_to_json(&tables, format)
}

/// Builder for decomposing MHT documents and extracting their tables.
///
/// # Example
///
/// ```no_run
/// use unmht::Unmht;
///
/// let result = Unmht::new()
///     .with_dump_dir("./job/structure")
///     .with_ocr("chi_sim+eng")
///     .process("manual.mht")?;
/// println!("{}", result.to_json(unmht::JsonFormat::Pretty)?);
/// # Ok::<(), unmht::Error>(())
/// ```
pub struct Unmht {
    decompose_options: DecomposeOptions,
    extract_options: ExtractOptions,
    interpreter: Option<Box<dyn ImageInterpreter>>,
}

impl Unmht {
    /// Create a new Unmht builder.
    pub fn new() -> Self {
        Self {
            decompose_options: DecomposeOptions::default(),
            extract_options: ExtractOptions::default(),
            interpreter: None,
        }
    }

    /// Persist payloads and the manifest under `dir`.
    pub fn with_dump_dir(mut self, dir: impl Into<std::path::PathBuf>) -> Self {
        self.decompose_options = self.decompose_options.with_dump_dir(dir);
        self
    }

    /// Disable parallel processing.
    pub fn sequential(mut self) -> Self {
        self.decompose_options = self.decompose_options.sequential();
        self
    }

    /// Set decomposition options.
    pub fn with_decompose_options(mut self, options: DecomposeOptions) -> Self {
        self.decompose_options = options;
        self
    }

    /// Set extraction options.
    pub fn with_extract_options(mut self, options: ExtractOptions) -> Self {
        self.extract_options = options;
        self
    }

    /// Set how many block siblings are examined for an anchor.
    pub fn with_anchor_lookback(mut self, lookback: usize) -> Self {
        self.extract_options = self.extract_options.with_anchor_lookback(lookback);
        self
    }

    /// Interpret resolved images with `interpreter`.
    pub fn with_interpreter(mut self, interpreter: impl ImageInterpreter + 'static) -> Self {
        self.interpreter = Some(Box::new(interpreter));
        self
    }

    /// Interpret resolved images with `tesseract` using the given languages.
    pub fn with_ocr(self, lang: impl Into<String>) -> Self {
        self.with_interpreter(TesseractInterpreter::new().with_lang(lang))
    }

    /// Decompose an MHT file and extract its tables.
    pub fn process<P: AsRef<Path>>(&self, path: P) -> Result<ExtractionResult> {
        let parser = MhtParser::open_with_options(path, self.decompose_options.clone())?;
        self.run(parser)
    }

    /// Decompose an MHT document held in memory and extract its tables.
    pub fn process_bytes(&self, data: &[u8]) -> Result<ExtractionResult> {
        let parser = MhtParser::from_bytes_with_options(data, self.decompose_options.clone())?;
        self.run(parser)
    }

    /// Process an MHT file into a job directory.
    ///
    /// Parts and the manifest land in `<dir>/structure`, tables, diagnostics
    /// and row payloads in `<dir>/semantics`.
    pub fn run_job<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        path: P,
        dir: Q,
    ) -> Result<ExtractionResult> {
        let dir = dir.as_ref();
        let options = self
            .decompose_options
            .clone()
            .with_dump_dir(dir.join(STRUCTURE_DIR));
        let parser = MhtParser::open_with_options(path, options)?;
        let mut result = self.run(parser)?;
        result.write_job(dir)?;
        Ok(result)
    }

    fn run(&self, parser: MhtParser) -> Result<ExtractionResult> {
        let decomposition = parser.parse()?;
        if self.interpreter.is_some() && parser.options().dump_dir.is_none() {
            log::warn!("Image interpreter set without a dump directory, images will not be interpreted");
        }

        let tables = extract_tables_from_decomposition(
            &decomposition,
            self.interpreter.as_deref(),
            &self.extract_options,
        )?;
        let diagnostics = Diagnostics::from_tables(&tables);
        log::info!(
            "{}: {} parts, {} tables, {} rows",
            decomposition.source,
            decomposition.part_count(),
            diagnostics.table_count,
            diagnostics.total_rows()
        );

        Ok(ExtractionResult {
            decomposition,
            tables,
            diagnostics,
        })
    }
}

impl Default for Unmht {
    fn default() -> Self {
        Self::new()
    }
}

/// Directory of a job holding parts and the manifest.
const STRUCTURE_DIR: &str = "structure";

/// Directory of a job holding extracted tables.
const SEMANTICS_DIR: &str = "semantics";

/// Result of processing one MHT document.
#[derive(Debug, Clone)]
pub struct ExtractionResult {
    /// The decomposed parts
    pub decomposition: Decomposition,

    /// Extracted top-level tables in document order
    pub tables: Vec<TableBlock>,

    /// Summary statistics over the tables
    pub diagnostics: Diagnostics,
}

impl ExtractionResult {
    /// Convert the tables to JSON.
    pub fn to_json(&self, format: JsonFormat) -> Result<String> {
        render::tables_to_json(&self.tables, format)
    }

    /// Render one JSON Lines record per extracted row.
    pub fn to_row_payloads_jsonl(&self) -> Result<String> {
        render::to_row_payloads_jsonl(&self.tables)
    }

    /// Write the job directory layout under `dir`.
    ///
    /// Parts not yet persisted are written to `<dir>/structure/parts` along
    /// with `<dir>/structure/manifest.json`; `<dir>/semantics` receives
    /// `tables.json`, `diagnostics.json` and `row_payloads.jsonl`.
    pub fn write_job<P: AsRef<Path>>(&mut self, dir: P) -> Result<()> {
        let dir = dir.as_ref();
        parser::persist_decomposition(&mut self.decomposition, &dir.join(STRUCTURE_DIR))?;

        let semantics = dir.join(SEMANTICS_DIR);
        fs::create_dir_all(&semantics)?;
        fs::write(
            semantics.join("tables.json"),
            self.to_json(JsonFormat::Pretty)?,
        )?;
        fs::write(
            semantics.join("diagnostics.json"),
            render::to_json(&self.diagnostics, JsonFormat::Pretty)?,
        )?;
        fs::write(
            semantics.join("row_payloads.jsonl"),
            self.to_row_payloads_jsonl()?,
        )?;
        log::debug!("Job written to {}", dir.display());
        Ok(())
    }

    /// Get the number of extracted tables.
    pub fn table_count(&self) -> usize {
        self.tables.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = "MIME-Version: 1.0\r\n\
Content-Type: multipart/related; boundary=\"B\"\r\n\
\r\n\
--B\r\n\
Content-Type: text/html; charset=\"utf-8\"\r\n\
Content-Location: file:///C:/doc.htm\r\n\
\r\n\
<html><body><p><b>1. Parts</b></p>\
<table><tr><th>Name</th><th>Qty</th></tr><tr><td>Bolt</td><td>4</td></tr></table>\
</body></html>\r\n\
--B--\r\n";

    // ==================== Builder Pattern Tests ====================

    #[test]
    fn test_unmht_builder_default() {
        let builder = Unmht::default();
        assert!(builder.decompose_options.parallel);
        assert!(builder.decompose_options.dump_dir.is_none());
        assert!(builder.interpreter.is_none());
    }

    #[test]
    fn test_unmht_builder_chained() {
        let builder = Unmht::new()
            .sequential()
            .with_dump_dir("./dump")
            .with_anchor_lookback(5)
            .with_ocr("eng");

        assert!(!builder.decompose_options.parallel);
        assert_eq!(
            builder.decompose_options.dump_dir,
            Some(std::path::PathBuf::from("./dump"))
        );
        assert_eq!(builder.extract_options.anchor_lookback, 5);
        assert_eq!(builder.interpreter.as_ref().unwrap().name(), "tesseract");
    }

    // ==================== Edge Case Tests ====================

    #[test]
    fn test_decompose_bytes_empty_data() {
        let result = decompose_bytes(&[]);
        assert!(matches!(result, Err(Error::UnknownFormat)));
    }

    #[test]
    fn test_decompose_bytes_bare_html() {
        let result = decompose_bytes(b"<!DOCTYPE html><html></html>");
        assert!(matches!(result, Err(Error::UnknownFormat)));
    }

    #[test]
    fn test_missing_root_html() {
        let data = b"Content-Type: image/png\r\n\r\nnot really a png";
        let decomposition = decompose_bytes(data).unwrap();
        let result = extract_tables_from_decomposition(
            &decomposition,
            None,
            &ExtractOptions::default(),
        );
        assert!(matches!(result, Err(Error::MissingRootHtml)));
    }

    // ==================== Pipeline Tests ====================

    #[test]
    fn test_process_bytes() {
        let result = Unmht::new().process_bytes(PAGE.as_bytes()).unwrap();
        assert_eq!(result.table_count(), 1);
        let table = &result.tables[0];
        assert_eq!(table.schema, vec!["Name", "Qty"]);
        assert_eq!(table.rows[0]["Qty"], "4");
        assert_eq!(table.anchor(), Some("1、Parts"));
        assert_eq!(result.diagnostics.rows_per_table, vec![1]);
    }

    #[test]
    fn test_result_to_json() {
        let result = Unmht::new().process_bytes(PAGE.as_bytes()).unwrap();
        let json = result.to_json(JsonFormat::Compact).unwrap();
        assert!(json.contains(r#""schema":["Name","Qty"]"#));
        let jsonl = result.to_row_payloads_jsonl().unwrap();
        assert!(jsonl.contains(r#""row_id":"T0-R0""#));
    }
}
