//! Output path resolution and slash-path algebra.
//!
//! Every markdown document is identified by its path relative to the markdown
//! root (`posts/hello.md`). The [`PathResolver`] maps that path to the page's
//! location inside the build tree. The mapping is pure and total: no I/O, no
//! error path, one output path per source path.
//!
//! ## Resolution Rules
//!
//! Evaluated in order, first match wins:
//!
//! ```text
//! home.md              → index.html            (configured home document)
//! posts/index.md       → posts/index.html      (section index)
//! posts/hello.md       → posts/hello.html      (section_naming = "verbatim")
//!                      → post/hello.html       (section_naming = "singular")
//! docs/api/ref.md      → docs/api/ref.html     (default: swap extension)
//! ```
//!
//! ## Section Naming
//!
//! Two conventions exist for documents nested one level inside a section:
//! keep the section directory name as-is, or singularize a plural name
//! (`posts` → `post`). The choice is a [`SectionNaming`] value from the site
//! config. The rewriter, navigation builder and style contexts all go through
//! the same resolver, so the convention is applied uniformly.
//!
//! ## Path Algebra
//!
//! Paths here are always `/`-separated strings, independent of the host
//! platform. The helpers ([`normalize`], [`join`], [`relative_to`],
//! [`parent_dir`], [`depth`]) work lexically and never touch the filesystem.

use serde::{Deserialize, Serialize};

/// Source document extension.
pub const SOURCE_EXT: &str = "md";
/// Generated page extension.
pub const OUTPUT_EXT: &str = "html";
/// File name every directory index resolves to.
pub const INDEX_FILE: &str = "index.html";

/// Naming convention for the output directory of documents nested one level
/// inside a section.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionNaming {
    /// `posts/hello.md` → `posts/hello.html`
    #[default]
    Verbatim,
    /// `posts/hello.md` → `post/hello.html`
    Singular,
}

impl SectionNaming {
    /// Apply the convention to a section directory name.
    ///
    /// `Singular` drops one trailing `s` from names longer than one character.
    pub fn apply(self, section: &str) -> String {
        match self {
            SectionNaming::Verbatim => section.to_string(),
            SectionNaming::Singular => match section.strip_suffix('s') {
                Some(stem) if !stem.is_empty() => stem.to_string(),
                _ => section.to_string(),
            },
        }
    }
}

/// Maps source-relative document paths to output-relative page paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathResolver {
    home_document: String,
    naming: SectionNaming,
}

impl Default for PathResolver {
    fn default() -> Self {
        Self::new("home.md", SectionNaming::Verbatim)
    }
}

impl PathResolver {
    pub fn new(home_document: impl Into<String>, naming: SectionNaming) -> Self {
        Self {
            home_document: home_document.into(),
            naming,
        }
    }

    /// Resolve a source-relative `.md` path to its output-relative path.
    pub fn resolve(&self, source: &str) -> String {
        if source == self.home_document {
            return INDEX_FILE.to_string();
        }

        let segments: Vec<&str> = source.split('/').collect();
        if let [section, file] = segments.as_slice() {
            if *file == format!("index.{SOURCE_EXT}") {
                return format!("{section}/{INDEX_FILE}");
            }
            return format!("{}/{}", self.naming.apply(section), swap_extension(file));
        }

        swap_extension(source)
    }

    /// Directory part of the resolved output path (`""` for the build root).
    pub fn output_dir(&self, source: &str) -> String {
        parent_dir(&self.resolve(source)).to_string()
    }

    /// Style context name of a document: its section under the naming
    /// convention, or empty for root documents.
    pub fn context_for(&self, source: &str) -> String {
        let section = section_of(source);
        if section.is_empty() {
            String::new()
        } else {
            self.naming.apply(section)
        }
    }
}

/// Section of a source-relative path: its first segment, or `""` when the
/// document sits at the root.
pub fn section_of(source: &str) -> &str {
    match source.split_once('/') {
        Some((section, _)) => section,
        None => "",
    }
}

/// Replace a trailing `.md` with `.html`. Paths without the source extension
/// get `.html` appended.
fn swap_extension(path: &str) -> String {
    let stem = path
        .strip_suffix(SOURCE_EXT)
        .and_then(|p| p.strip_suffix('.'))
        .unwrap_or(path);
    format!("{stem}.{OUTPUT_EXT}")
}

// ============================================================================
// Content layout
// ============================================================================

/// Where the markdown tree sits inside the project, and which prefix the
/// project uses for content that the build tree publishes without it.
///
/// Asset references in markdown point at physical files relative to the
/// document (`../../assets/logo.png` from `content/markdown/posts/`). The
/// build tree publishes `content/assets/` as `assets/`, so relocating a
/// reference means resolving it to a project path and dropping the content
/// root prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentLayout {
    markdown_dir: String,
    content_root: String,
}

impl ContentLayout {
    pub fn new(markdown_dir: impl Into<String>, content_root: impl Into<String>) -> Self {
        let markdown_dir = markdown_dir.into();
        let content_root = content_root.into();
        Self {
            markdown_dir: normalize(&markdown_dir).unwrap_or(markdown_dir),
            content_root: normalize(&content_root).unwrap_or(content_root),
        }
    }

    /// Project-relative directory of a source document.
    pub fn source_dir(&self, source: &str) -> String {
        let dir = parent_dir(source);
        match (self.markdown_dir.is_empty(), dir.is_empty()) {
            (true, _) => dir.to_string(),
            (false, true) => self.markdown_dir.clone(),
            (false, false) => format!("{}/{}", self.markdown_dir, dir),
        }
    }

    /// Map a project-relative path to its location in the build tree.
    ///
    /// Files inside the markdown tree keep their tree-relative location;
    /// other content loses the content root prefix. Returns `None` for paths
    /// outside both.
    pub fn output_relative(&self, project_path: &str) -> Option<String> {
        let path = normalize(project_path)?;
        for root in [&self.markdown_dir, &self.content_root] {
            if root.is_empty() {
                return Some(path);
            }
            if let Some(rest) = path
                .strip_prefix(root.as_str())
                .and_then(|rest| rest.strip_prefix('/'))
            {
                return Some(rest.to_string());
            }
        }
        None
    }
}

impl Default for ContentLayout {
    fn default() -> Self {
        Self::new("content/markdown", "content")
    }
}

// ============================================================================
// Slash-path algebra
// ============================================================================

/// Parent directory of a slash path. Root-level paths return `""`.
pub fn parent_dir(path: &str) -> &str {
    match path.rfind('/') {
        Some(idx) => &path[..idx],
        None => "",
    }
}

/// Number of segments in a directory path (`""` → 0, `a/b` → 2).
pub fn depth(dir: &str) -> usize {
    dir.split('/').filter(|s| !s.is_empty()).count()
}

/// Lexically normalize a relative path: drop `.` and empty segments, fold
/// `..` into the preceding segment.
///
/// Returns `None` when the path climbs above its root.
pub fn normalize(path: &str) -> Option<String> {
    let mut stack: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                stack.pop()?;
            }
            s => stack.push(s),
        }
    }
    Some(stack.join("/"))
}

/// Join a relative reference onto a base directory and normalize.
pub fn join(base_dir: &str, reference: &str) -> Option<String> {
    if base_dir.is_empty() {
        normalize(reference)
    } else {
        normalize(&format!("{base_dir}/{reference}"))
    }
}

/// Relative path from directory `from_dir` to `to_path`. Both are
/// normalized paths under the same root.
///
/// ```text
/// relative_to("posts", "index.html")        → "../index.html"
/// relative_to("",      "posts/index.html")  → "posts/index.html"
/// relative_to("post",  "posts/index.html")  → "../posts/index.html"
/// ```
pub fn relative_to(from_dir: &str, to_path: &str) -> String {
    let from: Vec<&str> = from_dir.split('/').filter(|s| !s.is_empty()).collect();
    let to: Vec<&str> = to_path.split('/').filter(|s| !s.is_empty()).collect();

    let common = from
        .iter()
        .zip(to.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts: Vec<&str> = vec![".."; from.len() - common];
    parts.extend_from_slice(&to[common..]);

    if parts.is_empty() {
        ".".to_string()
    } else {
        parts.join("/")
    }
}
