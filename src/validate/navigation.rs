//! Navigation block completeness.

use super::{ValidationError, Validator};
use crate::navigation::section_label;
use crate::paths::INDEX_FILE;
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

static NAV_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<nav\b[^>]*>(.*?)</nav>").unwrap());

static HOME_HREF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"href="(\.\./)*index\.html""#).unwrap());

/// The page must carry a `<nav>` with the home entry and one entry per
/// section.
pub struct NavigationValidator {
    sections: Vec<String>,
    home_label: String,
}

impl NavigationValidator {
    pub fn new(sections: Vec<String>, home_label: &str) -> Self {
        Self {
            sections,
            home_label: home_label.to_string(),
        }
    }
}

impl Validator for NavigationValidator {
    fn name(&self) -> &'static str {
        "navigation"
    }

    fn validate(&self, page: &Path, _build_root: &Path, content: &str) -> Vec<ValidationError> {
        let Some(caps) = NAV_BLOCK.captures(content) else {
            return vec![ValidationError::new(page, "missing <nav> element")];
        };
        let nav = &caps[1];
        let mut errors = Vec::new();

        let home_label = html_escape::encode_text(&self.home_label);
        if !nav.contains(&*home_label) {
            errors.push(ValidationError::new(
                page,
                format!("navigation missing home link ({})", self.home_label),
            ));
        }
        if !HOME_HREF.is_match(nav) {
            errors.push(ValidationError::new(
                page,
                format!("navigation missing home href to {INDEX_FILE}"),
            ));
        }

        for section in &self.sections {
            let expected_href = format!("{section}/{INDEX_FILE}");
            if !nav.contains(&expected_href) {
                errors.push(ValidationError::new(
                    page,
                    format!(
                        "navigation missing link to section {section:?} (expected href containing {expected_href:?})"
                    ),
                ));
            }
            let label = section_label(section);
            if !nav.contains(&*html_escape::encode_text(&label)) {
                errors.push(ValidationError::new(
                    page,
                    format!("navigation missing display name {label:?} for section {section:?}"),
                ));
            }
        }
        errors
    }
}
