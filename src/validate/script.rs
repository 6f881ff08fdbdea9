//! Script reference and syntax validation.
//!
//! Local `<script src>` files must exist and must parse. Parsing uses oxc
//! with the source type derived from the file extension (`.js` and `.mjs`
//! parse as modules, `.cjs` as a classic script).

use super::{Target, ValidationError, Validator, attribute_values, classify, resolve_local};
use oxc_allocator::Allocator;
use oxc_parser::Parser;
use oxc_span::SourceType;
use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

static SCRIPT_SRC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<script\s(?:[^>]*?\s)?src="([^"]*)""#).unwrap());

pub struct ScriptValidator;

impl Validator for ScriptValidator {
    fn name(&self) -> &'static str {
        "script"
    }

    fn validate(&self, page: &Path, build_root: &Path, content: &str) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        for src in attribute_values(&SCRIPT_SRC, content) {
            let Target::Local(path) = classify(&src) else {
                continue;
            };
            let script = resolve_local(page, build_root, path);
            if !script.is_file() {
                errors.push(ValidationError::new(
                    page,
                    format!("local script not found: {src}"),
                ));
                continue;
            }
            if let Err(message) = check_syntax(&script) {
                errors.push(ValidationError::new(script, message));
            }
        }
        errors
    }
}

/// Parse a script file, returning every syntax error joined.
pub fn check_syntax(script: &Path) -> Result<(), String> {
    let source = fs::read_to_string(script).map_err(|e| format!("failed to read script: {e}"))?;
    parse_errors(&source, SourceType::from_path(script).unwrap_or_else(|_| SourceType::mjs()))
}

fn parse_errors(source: &str, source_type: SourceType) -> Result<(), String> {
    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, source, source_type).parse();
    if ret.errors.is_empty() {
        return Ok(());
    }
    Err(format!(
        "JavaScript syntax error: {}",
        ret.errors
            .iter()
            .map(std::string::ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn build_tree() -> TempDir {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("scripts")).unwrap();
        fs::write(
            tmp.path().join("scripts/app.js"),
            "document.addEventListener('DOMContentLoaded', () => { console.log('ok'); });\n",
        )
        .unwrap();
        fs::write(tmp.path().join("scripts/broken.js"), "function ( {\n").unwrap();
        tmp
    }

    #[test]
    fn valid_local_script_passes() {
        let tmp = build_tree();
        let page = tmp.path().join("posts/hello.html");
        let content = r#"<script src="../scripts/app.js"></script><script src="/scripts/app.js" defer></script>"#;
        assert!(ScriptValidator.validate(&page, tmp.path(), content).is_empty());
    }

    #[test]
    fn missing_script_is_not_found_error() {
        let tmp = build_tree();
        let page = tmp.path().join("index.html");
        let content = r#"<script src="scripts/nope.js"></script>"#;
        let errors = ScriptValidator.validate(&page, tmp.path(), content);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].file, page);
        assert_eq!(errors[0].message, "local script not found: scripts/nope.js");
    }

    #[test]
    fn broken_script_is_syntax_error_on_script_file() {
        let tmp = build_tree();
        let page = tmp.path().join("index.html");
        let content = r#"<script src="scripts/broken.js"></script>"#;
        let errors = ScriptValidator.validate(&page, tmp.path(), content);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].file, tmp.path().join("scripts/broken.js"));
        assert!(errors[0].message.starts_with("JavaScript syntax error"), "{}", errors[0]);
    }

    #[test]
    fn external_and_inline_scripts_skipped() {
        let tmp = build_tree();
        let page = tmp.path().join("index.html");
        let content = r#"<script src="https://cdn.example/x.js"></script><script>let a = ;</script>"#;
        assert!(ScriptValidator.validate(&page, tmp.path(), content).is_empty());
    }

    #[test]
    fn parse_errors_reports_failure() {
        assert!(parse_errors("const x = 1;", SourceType::mjs()).is_ok());
        assert!(parse_errors("const = 1;", SourceType::mjs()).is_err());
    }
}
