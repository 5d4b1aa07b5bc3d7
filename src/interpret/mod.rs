//! Image interpretation capability.
//!
//! Cell composition replaces every resolved image with the text an
//! [`ImageInterpreter`] returns for its persisted payload. The interpreter is
//! chosen at construction time; the extraction code never inspects which
//! implementation it was given.
//!
//! Interpreters never fail with an error value: a missing engine, a crashed
//! process or an unreadable image all produce an [`Interpretation`] with
//! empty text and a message in `error`.

mod tesseract;

pub use tesseract::TesseractInterpreter;

use std::path::Path;

/// Minimum length, in characters, for interpreted text to count as useful.
const MIN_USEFUL_CHARS: usize = 10;

/// Minimum share of CJK or alphanumeric characters in useful text.
const MIN_USEFUL_RATIO: f32 = 0.3;

/// Outcome of interpreting one image.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Interpretation {
    /// Extracted text, trimmed; empty when nothing was recognized
    pub text: String,

    /// Name of the engine that produced the text
    pub method: String,

    /// Failure message, if the engine could not run
    pub error: Option<String>,
}

impl Interpretation {
    /// A successful interpretation.
    pub fn ok(text: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            text: text.into().trim().to_string(),
            method: method.into(),
            error: None,
        }
    }

    /// A failed interpretation, carrying no text.
    pub fn failed(method: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            text: String::new(),
            method: method.into(),
            error: Some(error.into()),
        }
    }

    /// Check if the interpretation carries no text.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Turns an image file into text.
///
/// Calls are synchronous and may be slow. Callers that need retries or
/// timeouts wrap the interpreter.
pub trait ImageInterpreter: Send + Sync {
    /// Get the name of this interpreter.
    fn name(&self) -> &str;

    /// Interpret the image at `path`, reporting failures in the result.
    fn interpret_rich(&self, path: &Path) -> Interpretation;

    /// Interpret the image at `path`, returning only the text.
    fn interpret(&self, path: &Path) -> String {
        self.interpret_rich(path).text
    }
}

/// Interpreter that never recognizes anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopInterpreter;

impl ImageInterpreter for NoopInterpreter {
    fn name(&self) -> &str {
        "noop"
    }

    fn interpret_rich(&self, _path: &Path) -> Interpretation {
        Interpretation::ok("", "noop")
    }
}

/// Interpreter backed by a closure.
///
/// Useful for adapters to engines that live outside this crate, such as a
/// vision model client.
pub struct FnInterpreter<F> {
    name: String,
    f: F,
}

impl<F> FnInterpreter<F>
where
    F: Fn(&Path) -> String + Send + Sync,
{
    /// Wrap a closure under the given engine name.
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }
}

impl<F> ImageInterpreter for FnInterpreter<F>
where
    F: Fn(&Path) -> String + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn interpret_rich(&self, path: &Path) -> Interpretation {
        Interpretation::ok((self.f)(path), self.name.as_str())
    }
}

/// Usefulness heuristic for interpreted text.
///
/// Text is useful when, after whitespace collapse, it has at least ten
/// characters and at least 30% of them are CJK ideographs or alphanumerics.
pub fn is_useful_text(text: &str) -> bool {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    let total = collapsed.chars().count();
    if total < MIN_USEFUL_CHARS {
        return false;
    }

    let useful = collapsed
        .chars()
        .filter(|c| ('\u{4e00}'..='\u{9fff}').contains(c) || c.is_alphanumeric())
        .count();
    useful as f32 / total as f32 >= MIN_USEFUL_RATIO
}
