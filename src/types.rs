//! Shared types passed between pipeline stages.
//!
//! Paths stored here are `/`-separated strings relative to the markdown root
//! (sources) or the build root (outputs), never host paths.

use crate::paths;

/// A source document: read once per build, never mutated.
#[derive(Debug, Clone)]
pub struct Document {
    /// Path relative to the markdown root, e.g. `posts/hello.md`
    pub source_path: String,
    /// Raw file bytes
    pub content: Vec<u8>,
}

impl Document {
    pub fn new(source_path: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            source_path: source_path.into(),
            content: content.into(),
        }
    }

    /// Content as text, replacing invalid UTF-8 sequences.
    pub fn text(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.content)
    }
}

/// Everything the substituters need to fill in one page.
#[derive(Debug, Clone)]
pub struct PageContext {
    /// Raw markdown source
    pub source: String,
    /// Path relative to the markdown root
    pub source_path: String,
    /// Path relative to the build root
    pub output_path: String,
    /// Converted (styled, not yet rewritten) HTML
    pub html: String,
}

impl PageContext {
    /// Directory of the output page relative to the build root.
    pub fn output_dir(&self) -> &str {
        paths::parent_dir(&self.output_path)
    }
}
