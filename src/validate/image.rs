//! Image source validation.

use super::{
    Target, UrlChecker, ValidationError, Validator, attribute_values, check_external, classify,
    resolve_local,
};
use regex::Regex;
use std::path::Path;
use std::rc::Rc;
use std::sync::LazyLock;

static IMG_SRC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<img\s(?:[^>]*?\s)?src="([^"]*)""#).unwrap());

/// Every `<img src>` must be a file in the build tree or (when checked) a
/// live external URL.
pub struct ImageValidator {
    checker: Option<Rc<dyn UrlChecker>>,
}

impl ImageValidator {
    pub fn new(checker: Option<Rc<dyn UrlChecker>>) -> Self {
        Self { checker }
    }
}

impl Validator for ImageValidator {
    fn name(&self) -> &'static str {
        "image"
    }

    fn validate(&self, page: &Path, build_root: &Path, content: &str) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        for src in attribute_values(&IMG_SRC, content) {
            match classify(&src) {
                Target::Skip => {}
                Target::External(url) => {
                    if let Some(reason) = check_external(&self.checker, &url) {
                        errors.push(ValidationError::new(
                            page,
                            format!("external image not accessible: {src} ({reason})"),
                        ));
                    }
                }
                Target::Local(path) => {
                    if !resolve_local(page, build_root, path).is_file() {
                        errors.push(ValidationError::new(
                            page,
                            format!("local image not found: {src}"),
                        ));
                    }
                }
            }
        }
        errors
    }
}
