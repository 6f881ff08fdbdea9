//! Site configuration module.
//!
//! Handles loading, validating, and merging the project's `config.toml`.
//! Stock defaults are serialized to a TOML table, the user's file is merged
//! over them key by key, and the merged table is deserialized and validated.
//!
//! ## Config File Location
//!
//! `config.toml` lives in the project root, next to the content tree:
//!
//! ```text
//! project/
//! ├── config.toml              # Site config (optional)
//! ├── content/
//! │   ├── markdown/            # Source documents
//! │   │   ├── home.md
//! │   │   └── posts/
//! │   │       ├── index.md
//! │   │       └── hello.md
//! │   └── assets/              # Copied to build/assets/
//! ├── scripts/                 # *.js copied to build/scripts/
//! └── styles/
//!     └── styles.toml          # Element → CSS class mapping (optional)
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! content_root = "content"            # Prefix stripped from asset paths in the output
//! markdown_dir = "content/markdown"   # Source document tree
//! assets_dir = "content/assets"       # Static assets (byte-copied)
//! scripts_dir = "scripts"             # JavaScript files (byte-copied)
//! build_dir = "build"                 # Output tree
//! styles = "styles/styles.toml"       # Style config (TOML, or JSON by extension)
//! home_document = "home.md"           # Document that becomes build/index.html
//! section_naming = "verbatim"         # or "singular": posts/x.md → post/x.html
//! # template = "templates/page.html"  # Custom page template
//!
//! [navigation]
//! home_label = "Home"
//!
//! [validation]
//! skip_external = false               # Skip HEAD checks of http(s) links/images
//! timeout_secs = 10                   # Per-request timeout for external checks
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::paths::{ContentLayout, PathResolver, SOURCE_EXT, SectionNaming};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `config.toml`.
///
/// All directory values are relative to the project root and use `/` as the
/// separator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Name of the content root. Asset paths lose this prefix in the output
    /// tree (`content/assets/logo.png` → `assets/logo.png`).
    pub content_root: String,
    /// Markdown source tree.
    pub markdown_dir: String,
    /// Static assets, byte-copied into the build tree.
    pub assets_dir: String,
    /// JavaScript sources; `.js` files are copied to `<build>/scripts/`.
    pub scripts_dir: String,
    /// Output tree.
    pub build_dir: String,
    /// Style configuration file. Missing file means no styling.
    pub styles: String,
    /// Custom page template. The built-in template is used when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    /// Source document mapped to the root `index.html`.
    pub home_document: String,
    /// Output directory convention for documents nested inside a section.
    pub section_naming: SectionNaming,
    pub navigation: NavigationConfig,
    pub validation: ValidationConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            content_root: "content".to_string(),
            markdown_dir: "content/markdown".to_string(),
            assets_dir: "content/assets".to_string(),
            scripts_dir: "scripts".to_string(),
            build_dir: "build".to_string(),
            styles: "styles/styles.toml".to_string(),
            template: None,
            home_document: "home.md".to_string(),
            section_naming: SectionNaming::default(),
            navigation: NavigationConfig::default(),
            validation: ValidationConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Validate config values are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.markdown_dir.trim().is_empty() {
            return Err(ConfigError::Validation(
                "markdown_dir must not be empty".into(),
            ));
        }
        if self.build_dir.trim().is_empty() {
            return Err(ConfigError::Validation("build_dir must not be empty".into()));
        }
        if !self.home_document.ends_with(&format!(".{SOURCE_EXT}")) {
            return Err(ConfigError::Validation(format!(
                "home_document must be a .{SOURCE_EXT} file, got {:?}",
                self.home_document
            )));
        }
        if self.validation.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "validation.timeout_secs must be at least 1".into(),
            ));
        }
        if self.navigation.home_label.trim().is_empty() {
            return Err(ConfigError::Validation(
                "navigation.home_label must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// Path resolver for this site's naming convention and home document.
    pub fn resolver(&self) -> PathResolver {
        PathResolver::new(self.home_document.clone(), self.section_naming)
    }

    /// Source/output layout used to relocate asset references.
    pub fn layout(&self) -> ContentLayout {
        ContentLayout::new(self.markdown_dir.clone(), self.content_root.clone())
    }
}

/// Navigation bar settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NavigationConfig {
    /// Label of the entry pointing at the root index.
    pub home_label: String,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            home_label: "Home".to_string(),
        }
    }
}

/// Post-build validation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ValidationConfig {
    /// Skip HEAD requests for external links and images.
    pub skip_external: bool,
    /// Timeout applied to each external request.
    pub timeout_secs: u64,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            skip_external: false,
            timeout_secs: 10,
        }
    }
}

impl ValidationConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the base layer user overrides are merged onto.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(SiteConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `config.toml` from the project root as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(root: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = root.join("config.toml");
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `config.toml` in the project root.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(root: &Path) -> Result<SiteConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(root)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Site Configuration
# ==================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Paths are relative to this file.
# Unknown keys will cause an error.

# Content root name. Asset paths lose this prefix in the build tree:
# content/assets/logo.png is published as assets/logo.png.
content_root = "content"

# Markdown source tree. Every *.md file below it becomes a page.
markdown_dir = "content/markdown"

# Static assets, copied byte-for-byte into the build tree.
assets_dir = "content/assets"

# JavaScript sources. Only *.js files are copied, into <build_dir>/scripts/.
scripts_dir = "scripts"

# Output tree.
build_dir = "build"

# Element -> CSS class mapping. TOML, or JSON when the file ends in .json.
# A missing file means no styling.
styles = "styles/styles.toml"

# Custom page template with {{title}}, {{navigation}} and {{content}}
# placeholders. The built-in template is used when unset.
# template = "templates/page.html"

# Document published as the site root (build/index.html).
home_document = "home.md"

# Output directory for documents nested one level inside a section:
#   "verbatim"  posts/hello.md -> posts/hello.html
#   "singular"  posts/hello.md -> post/hello.html
# Section indexes (posts/index.md) always keep the section name.
section_naming = "verbatim"

# ---------------------------------------------------------------------------
# Navigation bar
# ---------------------------------------------------------------------------
[navigation]
# Label of the entry linking to the site root.
home_label = "Home"

# ---------------------------------------------------------------------------
# Post-build validation
# ---------------------------------------------------------------------------
[validation]
# Skip HEAD requests for external (http/https) links and images.
skip_external = false

# Timeout in seconds for each external request.
timeout_secs = 10
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_has_directories() {
        let config = SiteConfig::default();
        assert_eq!(config.content_root, "content");
        assert_eq!(config.markdown_dir, "content/markdown");
        assert_eq!(config.assets_dir, "content/assets");
        assert_eq!(config.scripts_dir, "scripts");
        assert_eq!(config.build_dir, "build");
    }

    #[test]
    fn default_config_is_verbatim_with_home_md() {
        let config = SiteConfig::default();
        assert_eq!(config.section_naming, SectionNaming::Verbatim);
        assert_eq!(config.home_document, "home.md");
        assert!(config.template.is_none());
    }

    #[test]
    fn parse_partial_config() {
        let toml = r#"
section_naming = "singular"

[validation]
skip_external = true
"#;
        let config: SiteConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.section_naming, SectionNaming::Singular);
        assert!(config.validation.skip_external);
        // Defaults preserved
        assert_eq!(config.validation.timeout_secs, 10);
        assert_eq!(config.navigation.home_label, "Home");
    }

    #[test]
    fn resolver_uses_config_convention() {
        let config = SiteConfig {
            section_naming: SectionNaming::Singular,
            ..SiteConfig::default()
        };
        assert_eq!(config.resolver().resolve("posts/a.md"), "post/a.html");
    }

    #[test]
    fn timeout_converts_to_duration() {
        let config = ValidationConfig {
            skip_external: false,
            timeout_secs: 3,
        };
        assert_eq!(config.timeout(), Duration::from_secs(3));
    }

    // =========================================================================
    // load_config tests
    // =========================================================================

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.build_dir, "build");
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("config.toml"),
            r#"
build_dir = "public"

[navigation]
home_label = "Accueil"
"#,
        )
        .unwrap();

        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.build_dir, "public");
        assert_eq!(config.navigation.home_label, "Accueil");
        assert_eq!(config.markdown_dir, "content/markdown");
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("config.toml"), "this is not valid toml [[[").unwrap();

        let result = load_config(tmp.path());
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn unknown_key_rejected() {
        let result: Result<SiteConfig, _> = toml::from_str("buld_dir = \"out\"");
        let err = result.unwrap_err().to_string();
        assert!(err.contains("unknown field"));
    }

    #[test]
    fn unknown_nested_key_rejected() {
        let toml_str = r#"
[validation]
timeout = 5
"#;
        let result: Result<SiteConfig, _> = toml::from_str(toml_str);
        assert!(result.is_err());
    }

    #[test]
    fn unknown_section_naming_rejected() {
        let result: Result<SiteConfig, _> = toml::from_str("section_naming = \"plural\"");
        assert!(result.is_err());
    }

    #[test]
    fn unknown_key_rejected_via_load_config() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("config.toml"), "stlyes = \"x.toml\"\n").unwrap();
        assert!(load_config(tmp.path()).is_err());
    }

    // =========================================================================
    // Validation tests
    // =========================================================================

    #[test]
    fn validate_default_config_passes() {
        assert!(SiteConfig::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_zero_timeout() {
        let mut config = SiteConfig::default();
        config.validation.timeout_secs = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("timeout_secs"));
    }

    #[test]
    fn validate_rejects_non_markdown_home() {
        let config = SiteConfig {
            home_document: "home.txt".to_string(),
            ..SiteConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn validate_rejects_empty_directories() {
        let config = SiteConfig {
            markdown_dir: " ".to_string(),
            ..SiteConfig::default()
        };
        assert!(config.validate().is_err());

        let config = SiteConfig {
            build_dir: String::new(),
            ..SiteConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn load_config_validates_values() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("config.toml"),
            r#"
[validation]
timeout_secs = 0
"#,
        )
        .unwrap();

        let result = load_config(tmp.path());
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    // =========================================================================
    // merge / resolve tests
    // =========================================================================

    #[test]
    fn merge_toml_scalar_override() {
        let base: toml::Value = toml::from_str("a = 1").unwrap();
        let overlay: toml::Value = toml::from_str("a = 2").unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged.get("a").unwrap().as_integer(), Some(2));
    }

    #[test]
    fn merge_toml_preserves_base_keys_in_tables() {
        let base: toml::Value = toml::from_str(
            r#"
[validation]
skip_external = false
timeout_secs = 10
"#,
        )
        .unwrap();
        let overlay: toml::Value = toml::from_str(
            r#"
[validation]
skip_external = true
"#,
        )
        .unwrap();
        let merged = merge_toml(base, overlay);
        let validation = merged.get("validation").unwrap();
        assert_eq!(validation.get("skip_external").unwrap().as_bool(), Some(true));
        assert_eq!(validation.get("timeout_secs").unwrap().as_integer(), Some(10));
    }

    #[test]
    fn load_raw_config_returns_none_when_no_file() {
        let tmp = TempDir::new().unwrap();
        assert!(load_raw_config(tmp.path()).unwrap().is_none());
    }

    #[test]
    fn resolve_config_with_overlay() {
        let base = stock_defaults_value();
        let overlay: toml::Value = toml::from_str("template = \"layout.html\"").unwrap();
        let config = resolve_config(base, Some(overlay)).unwrap();
        assert_eq!(config.template.as_deref(), Some("layout.html"));
        assert_eq!(config.styles, "styles/styles.toml");
    }

    // =========================================================================
    // stock config tests
    // =========================================================================

    #[test]
    fn stock_config_toml_roundtrips_to_defaults() {
        let config: SiteConfig = toml::from_str(stock_config_toml()).unwrap();
        let defaults = SiteConfig::default();
        assert_eq!(config.content_root, defaults.content_root);
        assert_eq!(config.markdown_dir, defaults.markdown_dir);
        assert_eq!(config.build_dir, defaults.build_dir);
        assert_eq!(config.section_naming, defaults.section_naming);
        assert_eq!(config.navigation.home_label, defaults.navigation.home_label);
        assert_eq!(config.validation.timeout_secs, defaults.validation.timeout_secs);
    }

    #[test]
    fn stock_config_toml_contains_all_sections() {
        let content = stock_config_toml();
        assert!(content.contains("[navigation]"));
        assert!(content.contains("[validation]"));
    }

    #[test]
    fn stock_defaults_value_has_all_sections() {
        let val = stock_defaults_value();
        assert!(val.is_table());
        assert!(val.get("navigation").is_some());
        assert!(val.get("validation").is_some());
        assert!(val.get("template").is_none());
    }
}
