//! OCR through the `tesseract` command-line engine.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Command;

use super::{ImageInterpreter, Interpretation};

const METHOD: &str = "tesseract";

/// Interpreter that runs `tesseract <image> stdout -l <lang> --psm <psm>`.
#[derive(Debug, Clone)]
pub struct TesseractInterpreter {
    /// Binary to execute
    pub binary: PathBuf,

    /// Language pack(s), e.g. "chi_sim+eng"
    pub lang: String,

    /// Page segmentation mode
    pub psm: u8,
}

impl TesseractInterpreter {
    /// Create an interpreter using `tesseract` from `PATH`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the language pack(s).
    pub fn with_lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = lang.into();
        self
    }

    /// Set the binary path.
    pub fn with_binary(mut self, binary: impl Into<PathBuf>) -> Self {
        self.binary = binary.into();
        self
    }

    /// Set the page segmentation mode.
    pub fn with_psm(mut self, psm: u8) -> Self {
        self.psm = psm;
        self
    }
}

impl Default for TesseractInterpreter {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("tesseract"),
            lang: "chi_sim+eng".to_string(),
            psm: 6,
        }
    }
}

impl ImageInterpreter for TesseractInterpreter {
    fn name(&self) -> &str {
        METHOD
    }

    fn interpret_rich(&self, path: &Path) -> Interpretation {
        let output = Command::new(&self.binary)
            .arg(path)
            .arg("stdout")
            .arg("-l")
            .arg(&self.lang)
            .arg("--psm")
            .arg(self.psm.to_string())
            .output();

        match output {
            Err(e) if e.kind() == ErrorKind::NotFound => Interpretation::failed(
                METHOD,
                format!("{} not found in PATH", self.binary.display()),
            ),
            Err(e) => Interpretation::failed(METHOD, e.to_string()),
            Ok(out) if !out.status.success() => {
                let stderr = String::from_utf8_lossy(&out.stderr);
                Interpretation::failed(
                    METHOD,
                    format!("exited with {}: {}", out.status, stderr.trim()),
                )
            }
            Ok(out) => Interpretation::ok(String::from_utf8_lossy(&out.stdout), METHOD),
        }
    }
}
