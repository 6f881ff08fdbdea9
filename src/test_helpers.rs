//! Shared test utilities for the mdsite test suite.
//!
//! Provides an isolated copy of the fixture project plus lookup helpers for
//! generation results and build output.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = setup_fixtures();
//! let site = Site::load(tmp.path(), config).unwrap();
//! let summary = site.generate().unwrap();
//!
//! let hello = find_generated(&summary, "posts/hello.md");
//! assert_eq!(hello.output, "posts/hello.html");
//! let html = read_build(tmp.path(), &hello.output);
//! ```

use std::path::Path;
use tempfile::TempDir;

use crate::site::{GenerateSummary, GeneratedPage};

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/site/` to a temp directory and return it.
///
/// Tests get an isolated copy they can mutate without affecting other tests
/// or the source fixtures.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/site");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    tmp
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            std::fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

// =========================================================================
// Lookups: panic with a clear message on miss
// =========================================================================

/// Find a generated page by source path. Panics if not found.
pub fn find_generated<'a>(summary: &'a GenerateSummary, source: &str) -> &'a GeneratedPage {
    summary
        .pages
        .iter()
        .find(|p| p.source == source)
        .unwrap_or_else(|| {
            let sources: Vec<&str> = summary.pages.iter().map(|p| p.source.as_str()).collect();
            panic!("page '{source}' not generated. Available: {sources:?}")
        })
}

/// Read a file of the build tree. Panics if missing.
pub fn read_build(project: &Path, output: &str) -> String {
    let path = project.join("build").join(output);
    std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("cannot read {}: {e}", path.display()))
}

// =========================================================================
// Bulk extractors
// =========================================================================

/// `(source, output)` pairs in generation order.
pub fn page_outputs(summary: &GenerateSummary) -> Vec<(&str, &str)> {
    summary
        .pages
        .iter()
        .map(|p| (p.source.as_str(), p.output.as_str()))
        .collect()
}
