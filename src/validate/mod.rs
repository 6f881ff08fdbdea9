//! Post-build validation of generated pages.
//!
//! After every page is written, each one is read back and run through an
//! ordered list of [`Validator`]s. Validators are independent: each scans the
//! page markup for the references it cares about and reports every failure it
//! finds. Nothing is deduplicated and nothing stops early, so a single run
//! shows every broken link, image, script and navigation block in the site.
//!
//! ## Validators
//!
//! | Validator    | Checks                                                     |
//! |--------------|------------------------------------------------------------|
//! | `link`       | `<a href>` targets exist locally or answer a HEAD request  |
//! | `image`      | `<img src>` targets, same policy as links                  |
//! | `script`     | `<script src>` files exist and parse as JavaScript         |
//! | `navigation` | The page carries a complete `<nav>` block                  |
//!
//! ## Reference Classification
//!
//! | Reference                         | Treatment                         |
//! |-----------------------------------|-----------------------------------|
//! | `""`, `#frag`, `?q`               | skipped (same page)               |
//! | `http://…`, `https://…`, `//…`    | external: HEAD via [`UrlChecker`] |
//! | `mailto:`, `tel:`, `javascript:`… | skipped (other schemes)           |
//! | `/path`                           | local, from the build root        |
//! | anything else                     | local, from the page's directory  |
//!
//! External checks go through the [`UrlChecker`] seam so they can be turned
//! off (`skip_external`) or faked in tests.

pub mod http;
pub mod image;
pub mod link;
pub mod navigation;
pub mod script;

pub use http::{HttpChecker, UrlChecker};

use percent_encoding::percent_decode_str;
use regex::Regex;
use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::rc::Rc;

/// One failed check on one output file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub file: PathBuf,
    pub message: String,
}

impl ValidationError {
    pub fn new(file: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.file.display(), self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Every validation failure of a build, in page then validator order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub errors: Vec<ValidationError>,
    /// Number of pages checked
    pub pages: usize,
}

impl ValidationReport {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lines: Vec<String> = self.errors.iter().map(ToString::to_string).collect();
        write!(f, "{}", lines.join("\n"))
    }
}

impl std::error::Error for ValidationReport {}

/// A single independent check over one generated page.
pub trait Validator {
    fn name(&self) -> &'static str;

    /// Check `content`, the markup of the page at `page` inside `build_root`.
    fn validate(&self, page: &Path, build_root: &Path, content: &str) -> Vec<ValidationError>;
}

/// Ordered validators run against every page.
#[derive(Default)]
pub struct ValidatorRegistry {
    validators: Vec<Box<dyn Validator>>,
}

impl ValidatorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Link, image, script and navigation validators.
    ///
    /// `checker` is `None` when external references are not checked.
    pub fn with_defaults(
        sections: Vec<String>,
        home_label: &str,
        checker: Option<Rc<dyn UrlChecker>>,
    ) -> Self {
        let mut registry = Self::new();
        registry.register(link::LinkValidator::new(checker.clone()));
        registry.register(image::ImageValidator::new(checker));
        registry.register(script::ScriptValidator);
        registry.register(navigation::NavigationValidator::new(sections, home_label));
        registry
    }

    pub fn register(&mut self, validator: impl Validator + 'static) {
        self.validators.push(Box::new(validator));
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.validators.iter().map(|v| v.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.validators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }

    /// Run every validator over one page.
    pub fn validate(&self, page: &Path, build_root: &Path, content: &str) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        for validator in &self.validators {
            let found = validator.validate(page, build_root, content);
            if !found.is_empty() {
                tracing::debug!(
                    validator = validator.name(),
                    page = %page.display(),
                    count = found.len(),
                    "Validation failures"
                );
            }
            errors.extend(found);
        }
        errors
    }
}

// ============================================================================
// Shared reference handling
// ============================================================================

/// How a validator should treat one reference.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Target<'a> {
    Skip,
    External(String),
    Local(&'a str),
}

pub(crate) fn classify(reference: &str) -> Target<'_> {
    let path = strip_suffixes(reference);
    if has_scheme(reference, "http") || has_scheme(reference, "https") {
        Target::External(reference.to_string())
    } else if reference.starts_with("//") {
        Target::External(format!("https:{reference}"))
    } else if crate::rewrite::is_external(reference) || path.is_empty() {
        Target::Skip
    } else {
        Target::Local(path)
    }
}

/// Whether `reference` starts with `<scheme>://`, ignoring ASCII case.
fn has_scheme(reference: &str, scheme: &str) -> bool {
    reference
        .get(..scheme.len() + 3)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(&format!("{scheme}://")))
}

/// Drop `#fragment` and `?query` from a local reference.
fn strip_suffixes(reference: &str) -> &str {
    let end = reference.find(['#', '?']).unwrap_or(reference.len());
    &reference[..end]
}

/// Filesystem location of a local reference: from the build root when it
/// starts with `/`, else from the page's directory. Percent-escapes are
/// decoded first. Resolved lexically so `..` through missing directories
/// still lands where a browser would.
pub(crate) fn resolve_local(page: &Path, build_root: &Path, path: &str) -> PathBuf {
    let decoded = percent_decode_str(path).decode_utf8_lossy();
    let (mut resolved, relative) = match decoded.strip_prefix('/') {
        Some(rest) => (build_root.to_path_buf(), rest),
        None => (page.parent().map(Path::to_path_buf).unwrap_or_default(), &*decoded),
    };

    for component in Path::new(relative).components() {
        match component {
            Component::ParentDir => {
                resolved.pop();
            }
            Component::Normal(segment) => resolved.push(segment),
            _ => {}
        }
    }
    resolved
}

/// Values of one attribute across all matches of `pattern`, entity-decoded.
pub(crate) fn attribute_values(pattern: &Regex, content: &str) -> Vec<String> {
    pattern
        .captures_iter(content)
        .map(|caps| html_escape::decode_html_entities(&caps[1]).into_owned())
        .collect()
}

/// Check an external URL, or report why it is unreachable.
pub(crate) fn check_external(
    checker: &Option<Rc<dyn UrlChecker>>,
    url: &str,
) -> Option<String> {
    let Some(checker) = checker else {
        tracing::debug!(url, "Skipping external check");
        return None;
    };
    checker.check(url).err()
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::UrlChecker;
    use std::cell::RefCell;
    use std::collections::HashMap;

    /// Offline checker with canned answers. Unlisted URLs succeed.
    #[derive(Default)]
    pub struct FakeChecker {
        failures: HashMap<String, String>,
        pub checked: RefCell<Vec<String>>,
    }

    impl FakeChecker {
        pub fn failing(url: &str, reason: &str) -> Self {
            let mut checker = Self::default();
            checker.failures.insert(url.to_string(), reason.to_string());
            checker
        }
    }

    impl UrlChecker for FakeChecker {
        fn check(&self, url: &str) -> Result<(), String> {
            self.checked.borrow_mut().push(url.to_string());
            match self.failures.get(url) {
                Some(reason) => Err(reason.clone()),
                None => Ok(()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Always(&'static str);

    impl Validator for Always {
        fn name(&self) -> &'static str {
            self.0
        }

        fn validate(&self, page: &Path, _build_root: &Path, _content: &str) -> Vec<ValidationError> {
            vec![ValidationError::new(page, self.0)]
        }
    }

    #[test]
    fn error_display_is_file_colon_message() {
        let err = ValidationError::new("build/page.html", "missing image logo.png");
        assert_eq!(err.to_string(), "build/page.html: missing image logo.png");
    }

    #[test]
    fn report_joins_one_line_per_error() {
        let report = ValidationReport {
            errors: vec![
                ValidationError::new("a.html", "one"),
                ValidationError::new("b.html", "two"),
            ],
            pages: 2,
        };
        assert_eq!(report.to_string(), "a.html: one\nb.html: two");
        assert!(!report.is_ok());
    }

    #[test]
    fn registry_runs_validators_in_order_and_keeps_all_errors() {
        let mut registry = ValidatorRegistry::new();
        registry.register(Always("first"));
        registry.register(Always("second"));
        let errors = registry.validate(Path::new("p.html"), Path::new("."), "");
        let messages: Vec<&str> = errors.iter().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, ["first", "second"]);
    }

    #[test]
    fn defaults_register_four_validators() {
        let registry = ValidatorRegistry::with_defaults(vec![], "Home", None);
        assert_eq!(registry.names(), ["link", "image", "script", "navigation"]);
    }

    #[test]
    fn classification() {
        assert_eq!(classify("#top"), Target::Skip);
        assert_eq!(classify(""), Target::Skip);
        assert_eq!(classify("?page=2"), Target::Skip);
        assert_eq!(classify("mailto:a@b.c"), Target::Skip);
        assert_eq!(classify("tel:+123"), Target::Skip);
        assert_eq!(classify("javascript:void(0)"), Target::Skip);
        assert_eq!(classify("data:image/png;base64,AAA"), Target::Skip);
        assert_eq!(
            classify("https://example.com/x"),
            Target::External("https://example.com/x".into())
        );
        assert_eq!(
            classify("//cdn.example.com/a.js"),
            Target::External("https://cdn.example.com/a.js".into())
        );
        assert_eq!(
            classify("HTTPS://Example.com/x"),
            Target::External("HTTPS://Example.com/x".into())
        );
        assert_eq!(
            classify("Http://example.com/"),
            Target::External("Http://example.com/".into())
        );
        assert_eq!(classify("https:relative"), Target::Skip);
        assert_eq!(classify("../index.html#intro"), Target::Local("../index.html"));
        assert_eq!(classify("/assets/a.png?v=2"), Target::Local("/assets/a.png"));
    }

    #[test]
    fn attribute_values_are_entity_decoded() {
        let pattern = Regex::new(r#"<a\s[^>]*href="([^"]*)""#).unwrap();
        let values = attribute_values(&pattern, r#"<a href="a.html?x=1&amp;y=2">x</a>"#);
        assert_eq!(values, ["a.html?x=1&y=2"]);
    }

    #[test]
    fn local_resolution() {
        let root = Path::new("/site/build");
        let page = root.join("posts/hello.html");
        assert_eq!(
            resolve_local(&page, root, "../index.html"),
            PathBuf::from("/site/build/index.html")
        );
        assert_eq!(
            resolve_local(&page, root, "/assets/logo.png"),
            PathBuf::from("/site/build/assets/logo.png")
        );
        assert_eq!(
            resolve_local(&page, root, "missing/../other.html"),
            PathBuf::from("/site/build/posts/other.html")
        );
        assert_eq!(
            resolve_local(&page, root, "caf%C3%A9.html"),
            PathBuf::from("/site/build/posts/café.html")
        );
        assert_eq!(
            resolve_local(&page, root, "/my%20notes/index.html"),
            PathBuf::from("/site/build/my notes/index.html")
        );
    }
}
