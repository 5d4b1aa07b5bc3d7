//! MHT document decomposer using mailparse.

use std::fs;
use std::io::Read;
use std::path::Path;

use indexmap::IndexMap;
use mailparse::{MailHeaderMap, ParsedMail};
use rayon::prelude::*;

use crate::detect::{detect_format_from_bytes, detect_format_from_path};
use crate::error::Result;
use crate::model::{Decomposition, Part};

use super::location::{ensure_extension, filename_from_location};
use super::options::DecomposeOptions;

/// Source label used when the document did not come from a file.
const BYTES_SOURCE: &str = "<bytes>";

/// MHT document decomposer.
///
/// Walks the MIME tree depth-first. Multipart containers are traversed but
/// never emitted; every other entity becomes exactly one [`Part`].
pub struct MhtParser {
    data: Vec<u8>,
    source: String,
    options: DecomposeOptions,
}

/// A leaf entity copied out of the borrowed MIME tree.
struct LeafEntity {
    content_type: String,
    charset: Option<String>,
    location: Option<String>,
    content_id: Option<String>,
    headers: IndexMap<String, String>,
    data: Vec<u8>,
}

impl MhtParser {
    /// Open an MHT file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_options(path, DecomposeOptions::default())
    }

    /// Open an MHT file with custom options.
    pub fn open_with_options<P: AsRef<Path>>(path: P, options: DecomposeOptions) -> Result<Self> {
        let path = path.as_ref();

        // Verify it's a MIME document
        detect_format_from_path(path)?;

        let data = fs::read(path)?;
        Ok(Self {
            data,
            source: path.display().to_string(),
            options,
        })
    }

    /// Decompose an MHT document from bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::from_bytes_with_options(data, DecomposeOptions::default())
    }

    /// Decompose an MHT document from bytes with custom options.
    pub fn from_bytes_with_options(data: &[u8], options: DecomposeOptions) -> Result<Self> {
        detect_format_from_bytes(data)?;
        Ok(Self {
            data: data.to_vec(),
            source: BYTES_SOURCE.to_string(),
            options,
        })
    }

    /// Decompose an MHT document from a reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Self::from_reader_with_options(reader, DecomposeOptions::default())
    }

    /// Decompose an MHT document from a reader with custom options.
    pub fn from_reader_with_options<R: Read>(
        mut reader: R,
        options: DecomposeOptions,
    ) -> Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::from_bytes_with_options(&data, options)
    }

    /// Override the source identity recorded in the manifest.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    /// Get the options this parser runs with.
    pub fn options(&self) -> &DecomposeOptions {
        &self.options
    }

    /// Decompose the document into parts.
    ///
    /// When a dump directory is configured every payload is written exactly
    /// once and the manifest is written after all parts are processed.
    pub fn parse(&self) -> Result<Decomposition> {
        let mail = mailparse::parse_mail(&self.data)?;

        let mut leaves = Vec::new();
        collect_leaves(&mail, &mut leaves);
        log::debug!("MhtParser: {} leaf parts in {}", leaves.len(), self.source);

        let parts_dir = self.options.parts_dir();
        if let Some(ref dir) = parts_dir {
            fs::create_dir_all(dir)?;
        }
        let parts_dir = parts_dir.as_deref();

        let parts = if self.options.parallel {
            leaves
                .into_par_iter()
                .enumerate()
                .map(|(index, leaf)| self.build_part(index, leaf, parts_dir))
                .collect::<Result<Vec<_>>>()?
        } else {
            leaves
                .into_iter()
                .enumerate()
                .map(|(index, leaf)| self.build_part(index, leaf, parts_dir))
                .collect::<Result<Vec<_>>>()?
        };

        let decomposition = Decomposition {
            source: self.source.clone(),
            root_content_type: mail.ctype.mimetype.to_ascii_lowercase(),
            is_multipart: mail.ctype.mimetype.to_ascii_lowercase().starts_with("multipart/"),
            parts,
        };

        if let Some(manifest_path) = self.options.manifest_path() {
            write_manifest(&decomposition, &manifest_path)?;
        }

        Ok(decomposition)
    }

    fn build_part(&self, index: usize, leaf: LeafEntity, parts_dir: Option<&Path>) -> Result<Part> {
        let filename = leaf
            .location
            .as_deref()
            .and_then(|loc| filename_from_location(loc, self.options.max_filename_len))
            .unwrap_or_else(|| format!("part_{:03}", index));
        let filename = ensure_extension(filename, &leaf.content_type);

        let mut part = Part::new(index, leaf.content_type, leaf.data)
            .with_filename(filename)
            .with_headers(leaf.headers);
        part.content_location = leaf.location;
        part.content_id = leaf.content_id;
        part.charset = leaf.charset;

        if let Some(dir) = parts_dir {
            write_payload(&mut part, dir)?;
        }

        Ok(part)
    }
}

/// Persist an already decomposed document under `dump_dir`.
///
/// Payloads go to `<dump_dir>/parts` and the manifest to
/// `<dump_dir>/manifest.json`. Parts that already carry a payload path keep
/// it and are not written again. An existing manifest is left untouched
/// when every payload already lives under `<dump_dir>/parts`.
pub fn persist_decomposition(decomposition: &mut Decomposition, dump_dir: &Path) -> Result<()> {
    let options = DecomposeOptions::new().with_dump_dir(dump_dir);
    let (Some(parts_dir), Some(manifest_path)) = (options.parts_dir(), options.manifest_path())
    else {
        return Ok(());
    };

    let already_persisted = decomposition.parts.iter().all(|p| {
        p.payload_path
            .as_deref()
            .is_some_and(|path| path.starts_with(&parts_dir))
    });
    if already_persisted && manifest_path.exists() {
        log::debug!(
            "MhtParser: {} already persisted, keeping manifest",
            dump_dir.display()
        );
        return Ok(());
    }

    fs::create_dir_all(&parts_dir)?;
    for part in decomposition
        .parts
        .iter_mut()
        .filter(|p| p.payload_path.is_none())
    {
        write_payload(part, &parts_dir)?;
    }
    write_manifest(decomposition, &manifest_path)
}

fn write_payload(part: &mut Part, parts_dir: &Path) -> Result<()> {
    let path = parts_dir.join(part.persisted_name());
    fs::write(&path, &part.data)?;
    log::debug!(
        "MhtParser: part {} ({}, {} bytes) -> {}",
        part.part_index,
        part.content_type,
        part.size_bytes,
        path.display()
    );
    part.payload_path = Some(path);
    Ok(())
}

fn write_manifest(decomposition: &Decomposition, manifest_path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(&decomposition.manifest())?;
    fs::write(manifest_path, json)?;
    log::debug!("MhtParser: manifest written to {}", manifest_path.display());
    Ok(())
}

/// Depth-first walk collecting non-container entities in visit order.
fn collect_leaves(mail: &ParsedMail<'_>, out: &mut Vec<LeafEntity>) {
    if mail.ctype.mimetype.to_ascii_lowercase().starts_with("multipart/") {
        for sub in &mail.subparts {
            collect_leaves(sub, out);
        }
        return;
    }

    let data = match mail.get_body_raw() {
        Ok(data) => data,
        Err(e) => {
            log::warn!("Failed to decode part body, keeping it empty: {}", e);
            Vec::new()
        }
    };

    let mut headers = IndexMap::new();
    for header in &mail.headers {
        headers.insert(header.get_key(), header.get_value());
    }

    out.push(LeafEntity {
        content_type: mail.ctype.mimetype.to_ascii_lowercase(),
        charset: mail.ctype.params.get("charset").cloned(),
        location: non_empty_header(mail, "Content-Location"),
        content_id: non_empty_header(mail, "Content-ID"),
        headers,
        data,
    });
}

fn non_empty_header(mail: &ParsedMail<'_>, name: &str) -> Option<String> {
    mail.headers
        .get_first_value(name)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "MIME-Version: 1.0\r\n\
Content-Type: multipart/related; boundary=\"BOUNDARY\"\r\n\
\r\n\
--BOUNDARY\r\n\
Content-Type: text/html; charset=\"utf-8\"\r\n\
Content-Location: file:///C:/docs/page.htm\r\n\
\r\n\
<html><body><img src=\"page_files/image001.png\"></body></html>\r\n\
--BOUNDARY\r\n\
Content-Type: image/png\r\n\
Content-Transfer-Encoding: base64\r\n\
Content-Location: file:///C:/docs/page_files/image001.png\r\n\
Content-ID: <image001.png@01DA>\r\n\
\r\n\
aGVsbG8=\r\n\
--BOUNDARY\r\n\
Content-Type: application/octet-stream\r\n\
\r\n\
raw\r\n\
--BOUNDARY--\r\n";

    #[test]
    fn test_parse_sample() {
        let options = DecomposeOptions::new().sequential();
        let parser = MhtParser::from_bytes_with_options(SAMPLE.as_bytes(), options).unwrap();
        let doc = parser.parse().unwrap();

        assert_eq!(doc.root_content_type, "multipart/related");
        assert!(doc.is_multipart);
        assert_eq!(doc.part_count(), 3);

        let html = &doc.parts[0];
        assert_eq!(html.part_index, 0);
        assert_eq!(html.content_type, "text/html");
        assert_eq!(html.filename, "page.htm");
        assert_eq!(html.charset.as_deref(), Some("utf-8"));

        let image = &doc.parts[1];
        assert_eq!(image.filename, "image001.png");
        assert_eq!(image.data, b"hello");
        assert_eq!(image.sha256, crate::model::hash_bytes(b"hello"));
        assert_eq!(image.content_id.as_deref(), Some("<image001.png@01DA>"));
        assert_eq!(
            image.headers.get("Content-Transfer-Encoding").map(String::as_str),
            Some("base64")
        );

        let raw = &doc.parts[2];
        assert_eq!(raw.filename, "part_002.bin");
        assert!(raw.payload_path.is_none());
    }

    #[test]
    fn test_parallel_preserves_order() {
        let doc = MhtParser::from_bytes(SAMPLE.as_bytes())
            .unwrap()
            .parse()
            .unwrap();
        let indices: Vec<usize> = doc.parts.iter().map(|p| p.part_index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn test_single_part_document() {
        let data = b"Content-Type: text/html\r\n\r\n<table></table>";
        let doc = MhtParser::from_bytes(data).unwrap().parse().unwrap();
        assert!(!doc.is_multipart);
        assert_eq!(doc.part_count(), 1);
        assert_eq!(doc.parts[0].filename, "part_000.html");
    }

    #[test]
    fn test_rejects_non_mime() {
        assert!(MhtParser::from_bytes(b"<html></html>").is_err());
    }

    #[test]
    fn test_persist_decomposition_after_parse() {
        let dir = tempfile::tempdir().unwrap();
        let mut doc = MhtParser::from_bytes(SAMPLE.as_bytes())
            .unwrap()
            .parse()
            .unwrap();
        persist_decomposition(&mut doc, dir.path()).unwrap();

        let path = doc.parts[1].payload_path.clone().unwrap();
        assert_eq!(path.parent().unwrap(), dir.path().join("parts"));
        assert_eq!(fs::read(&path).unwrap(), b"hello");

        let manifest: serde_json::Value =
            serde_json::from_slice(&fs::read(dir.path().join("manifest.json")).unwrap()).unwrap();
        assert_eq!(manifest["part_count"], 3);
        assert_eq!(manifest["parts"][1]["filename"], "image001.png");
    }

    #[test]
    fn test_persist_keeps_current_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let options = DecomposeOptions::new().with_dump_dir(dir.path());
        let mut doc = MhtParser::from_bytes_with_options(SAMPLE.as_bytes(), options)
            .unwrap()
            .parse()
            .unwrap();

        let manifest_path = dir.path().join("manifest.json");
        fs::write(&manifest_path, "{}").unwrap();
        persist_decomposition(&mut doc, dir.path()).unwrap();
        assert_eq!(fs::read_to_string(&manifest_path).unwrap(), "{}");

        let other = tempfile::tempdir().unwrap();
        persist_decomposition(&mut doc, other.path()).unwrap();
        assert!(other.path().join("manifest.json").exists());
        assert!(doc.parts[0].payload_path.as_ref().unwrap().starts_with(dir.path()));
    }

    #[test]
    fn test_with_source() {
        let doc = MhtParser::from_bytes(SAMPLE.as_bytes())
            .unwrap()
            .with_source("sample.mht")
            .parse()
            .unwrap();
        assert_eq!(doc.source, "sample.mht");
    }
}
