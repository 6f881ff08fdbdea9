//! Anchor target validation.

use super::{
    Target, UrlChecker, ValidationError, Validator, attribute_values, check_external, classify,
    resolve_local,
};
use crate::paths::INDEX_FILE;
use regex::Regex;
use std::path::Path;
use std::rc::Rc;
use std::sync::LazyLock;

static A_HREF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<a\s(?:[^>]*?\s)?href="([^"]*)""#).unwrap());

/// Every `<a href>` must reach a file, a directory index, or (when checked)
/// a live external URL.
pub struct LinkValidator {
    checker: Option<Rc<dyn UrlChecker>>,
}

impl LinkValidator {
    pub fn new(checker: Option<Rc<dyn UrlChecker>>) -> Self {
        Self { checker }
    }
}

impl Validator for LinkValidator {
    fn name(&self) -> &'static str {
        "link"
    }

    fn validate(&self, page: &Path, build_root: &Path, content: &str) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        for href in attribute_values(&A_HREF, content) {
            match classify(&href) {
                Target::Skip => {}
                Target::External(url) => {
                    if let Some(reason) = check_external(&self.checker, &url) {
                        errors.push(ValidationError::new(
                            page,
                            format!("external link not accessible: {href} ({reason})"),
                        ));
                    }
                }
                Target::Local(path) => {
                    if !link_target_exists(&resolve_local(page, build_root, path)) {
                        errors.push(ValidationError::new(
                            page,
                            format!("local link not found: {href}"),
                        ));
                    }
                }
            }
        }
        errors
    }
}

/// A file, or a directory (named with or without a trailing slash) holding
/// an index page.
fn link_target_exists(target: &Path) -> bool {
    target.is_file() || target.join(INDEX_FILE).is_file()
}
