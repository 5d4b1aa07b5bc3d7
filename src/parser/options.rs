//! Decomposition options and configuration.

use std::path::PathBuf;

/// Default bound on derived filename length, in characters.
pub const DEFAULT_MAX_FILENAME_LEN: usize = 180;

/// Options for decomposing compound documents.
#[derive(Debug, Clone)]
pub struct DecomposeOptions {
    /// Directory to persist payloads and the manifest into
    pub dump_dir: Option<PathBuf>,

    /// Maximum length of derived filenames
    pub max_filename_len: usize,

    /// Whether to hash and persist parts in parallel
    pub parallel: bool,
}

impl DecomposeOptions {
    /// Create new decompose options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Persist payloads under `<dir>/parts` and write `<dir>/manifest.json`.
    pub fn with_dump_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dump_dir = Some(dir.into());
        self
    }

    /// Set the maximum derived filename length.
    pub fn with_max_filename_len(mut self, len: usize) -> Self {
        self.max_filename_len = len.max(1);
        self
    }

    /// Enable or disable parallel processing.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Disable parallel processing.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Directory that receives payload files.
    pub fn parts_dir(&self) -> Option<PathBuf> {
        self.dump_dir.as_ref().map(|d| d.join("parts"))
    }

    /// Path of the manifest file.
    pub fn manifest_path(&self) -> Option<PathBuf> {
        self.dump_dir.as_ref().map(|d| d.join("manifest.json"))
    }
}

impl Default for DecomposeOptions {
    fn default() -> Self {
        Self {
            dump_dir: None,
            max_filename_len: DEFAULT_MAX_FILENAME_LEN,
            parallel: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decompose_options_builder() {
        let options = DecomposeOptions::new()
            .with_dump_dir("out")
            .with_max_filename_len(0)
            .sequential();

        assert_eq!(options.dump_dir, Some(PathBuf::from("out")));
        assert_eq!(options.max_filename_len, 1);
        assert!(!options.parallel);
        assert_eq!(options.parts_dir(), Some(PathBuf::from("out").join("parts")));
    }

    #[test]
    fn test_default_options() {
        let options = DecomposeOptions::default();
        assert!(options.dump_dir.is_none());
        assert!(options.parallel);
        assert_eq!(options.max_filename_len, DEFAULT_MAX_FILENAME_LEN);
        assert!(options.manifest_path().is_none());
    }
}
