//! CLI output formatting for the build commands.
//!
//! # Output Format
//!
//! Paths are shown relative to the project root. Every generated page gets a
//! positional index in generation order (sorted source tree walk), so the
//! listing doubles as an inventory of the site.
//!
//! ## Generate
//!
//! ```text
//! Copied
//!     content/assets → build/assets (1 file)
//!     scripts → build/scripts (1 file)
//!
//! Pages
//! 001 about/index.md → about/index.html
//! 002 home.md → index.html
//! 003 posts/hello.md → posts/hello.html
//!
//! Static
//!     posts/chart.svg
//!
//! Generated 3 pages, 1 static file
//! ```
//!
//! ## Validate
//!
//! ```text
//! Validated 3 pages
//! ```
//!
//! or, when something is broken:
//!
//! ```text
//! Validation errors:
//!     build/posts/hello.html: local link not found: missing.html
//! validation failed with 1 error(s)
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::site::GenerateSummary;
use crate::validate::ValidationReport;
use std::path::Path;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// `n` followed by `noun`, pluralized with a trailing `s`.
fn count(n: usize, noun: &str) -> String {
    if n == 1 {
        format!("{n} {noun}")
    } else {
        format!("{n} {noun}s")
    }
}

/// Path shown relative to the project root when it lies inside it.
fn display_path(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}

// ============================================================================
// Generate output
// ============================================================================

pub fn format_generate_output(summary: &GenerateSummary, root: &Path) -> Vec<String> {
    let mut lines = Vec::new();

    if !summary.copied.is_empty() {
        lines.push("Copied".to_string());
        for tree in &summary.copied {
            lines.push(format!(
                "{}{} \u{2192} {} ({})",
                indent(1),
                display_path(&tree.from, root),
                display_path(&tree.to, root),
                count(tree.files, "file")
            ));
        }
        lines.push(String::new());
    }

    lines.push("Pages".to_string());
    for (i, page) in summary.pages.iter().enumerate() {
        lines.push(format!(
            "{} {} \u{2192} {}",
            format_index(i + 1),
            page.source,
            page.output
        ));
    }

    if !summary.static_files.is_empty() {
        lines.push(String::new());
        lines.push("Static".to_string());
        for file in &summary.static_files {
            lines.push(format!("{}{}", indent(1), file));
        }
    }

    lines.push(String::new());
    lines.push(format!(
        "Generated {}, {}",
        count(summary.pages.len(), "page"),
        count(summary.static_files.len(), "static file")
    ));
    lines
}

/// Print generate output to stdout.
pub fn print_generate_output(summary: &GenerateSummary, root: &Path) {
    for line in format_generate_output(summary, root) {
        println!("{}", line);
    }
}

// ============================================================================
// Validation output
// ============================================================================

pub fn format_validation_report(report: &ValidationReport, root: &Path) -> Vec<String> {
    if report.is_ok() {
        return vec![format!("Validated {}", count(report.pages, "page"))];
    }

    let mut lines = vec!["Validation errors:".to_string()];
    for error in &report.errors {
        lines.push(format!(
            "{}{}: {}",
            indent(1),
            display_path(&error.file, root),
            error.message
        ));
    }
    lines.push(format!(
        "validation failed with {} error(s)",
        report.errors.len()
    ));
    lines
}

/// Print a validation report to stdout.
pub fn print_validation_report(report: &ValidationReport, root: &Path) {
    for line in format_validation_report(report, root) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::site::{CopiedTree, GeneratedPage};
    use crate::validate::ValidationError;
    use std::path::PathBuf;

    fn page(source: &str, output: &str) -> GeneratedPage {
        GeneratedPage {
            source: source.to_string(),
            output: output.to_string(),
        }
    }

    #[test]
    fn format_index_single_digit() {
        assert_eq!(format_index(1), "001");
    }

    #[test]
    fn format_index_triple_digit() {
        assert_eq!(format_index(123), "123");
    }

    #[test]
    fn indent_levels() {
        assert_eq!(indent(0), "");
        assert_eq!(indent(2), "        ");
    }

    #[test]
    fn count_pluralizes() {
        assert_eq!(count(0, "page"), "0 pages");
        assert_eq!(count(1, "page"), "1 page");
        assert_eq!(count(2, "static file"), "2 static files");
    }

    #[test]
    fn display_path_strips_root() {
        let root = Path::new("/site");
        assert_eq!(display_path(Path::new("/site/build/a.html"), root), "build/a.html");
        assert_eq!(display_path(Path::new("/elsewhere/a.html"), root), "/elsewhere/a.html");
    }

    #[test]
    fn generate_output_lists_pages_in_order() {
        let summary = GenerateSummary {
            pages: vec![page("home.md", "index.html"), page("posts/a.md", "post/a.html")],
            copied: vec![],
            static_files: vec![],
        };
        let lines = format_generate_output(&summary, Path::new("/site"));
        assert_eq!(
            lines,
            [
                "Pages",
                "001 home.md \u{2192} index.html",
                "002 posts/a.md \u{2192} post/a.html",
                "",
                "Generated 2 pages, 0 static files",
            ]
        );
    }

    #[test]
    fn generate_output_shows_copies_and_static_files() {
        let summary = GenerateSummary {
            pages: vec![page("home.md", "index.html")],
            copied: vec![CopiedTree {
                from: PathBuf::from("/site/content/assets"),
                to: PathBuf::from("/site/build/assets"),
                files: 3,
            }],
            static_files: vec!["posts/chart.svg".to_string()],
        };
        let lines = format_generate_output(&summary, Path::new("/site"));
        assert_eq!(lines[0], "Copied");
        assert_eq!(lines[1], "    content/assets \u{2192} build/assets (3 files)");
        assert!(lines.contains(&"Static".to_string()));
        assert!(lines.contains(&"    posts/chart.svg".to_string()));
        assert_eq!(lines.last().unwrap(), "Generated 1 page, 1 static file");
    }

    #[test]
    fn clean_report_is_one_line() {
        let report = ValidationReport {
            errors: vec![],
            pages: 4,
        };
        assert_eq!(
            format_validation_report(&report, Path::new("/site")),
            ["Validated 4 pages"]
        );
    }

    #[test]
    fn failing_report_lists_every_error_then_count() {
        let report = ValidationReport {
            errors: vec![
                ValidationError::new("/site/build/index.html", "local image not found: a.png"),
                ValidationError::new("/site/build/posts/x.html", "missing <nav> element"),
            ],
            pages: 2,
        };
        assert_eq!(
            format_validation_report(&report, Path::new("/site")),
            [
                "Validation errors:",
                "    build/index.html: local image not found: a.png",
                "    build/posts/x.html: missing <nav> element",
                "validation failed with 2 error(s)",
            ]
        );
    }
}
