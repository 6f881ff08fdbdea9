//! Element styling: CSS classes attached to converted markdown elements.
//!
//! A style config maps element types to class strings, globally and per
//! context. The context of a page is its section name (under the site's
//! section naming convention), so `posts` pages can style headings
//! differently from the rest of the site.
//!
//! ```toml
//! [elements]
//! heading1 = "text-4xl font-bold"
//! paragraph = "my-4"
//!
//! [contexts.posts]
//! heading1 = "text-3xl"
//! ```
//!
//! ## Precedence
//!
//! Highest first:
//!
//! 1. An inline class written in the document (`# Title {.hero}`). The
//!    converter never consults the config for such elements.
//! 2. The context entry for the page's context.
//! 3. The global entry.
//! 4. No class.
//!
//! ## Validation
//!
//! Keys are checked at load time against the closed [`ElementType`] set. A
//! typo like `h1` is a hard error listing every offending key and every valid
//! one, so a misconfigured build never silently drops styling.

use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StyleError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error(
        "invalid style config keys: {}. Valid keys are: {}",
        .invalid.join(", "),
        ElementType::keys().join(", ")
    )]
    InvalidKeys { invalid: Vec<String> },
}

/// Structural element categories that can receive classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementType {
    Heading1,
    Heading2,
    Heading3,
    Heading4,
    Heading5,
    Heading6,
    Paragraph,
    Link,
    Image,
    CodeBlock,
    Code,
    Blockquote,
    List,
    ListItem,
}

impl ElementType {
    pub const ALL: [ElementType; 14] = [
        ElementType::Heading1,
        ElementType::Heading2,
        ElementType::Heading3,
        ElementType::Heading4,
        ElementType::Heading5,
        ElementType::Heading6,
        ElementType::Paragraph,
        ElementType::Link,
        ElementType::Image,
        ElementType::CodeBlock,
        ElementType::Code,
        ElementType::Blockquote,
        ElementType::List,
        ElementType::ListItem,
    ];

    /// Config key for this element type.
    pub fn key(self) -> &'static str {
        match self {
            ElementType::Heading1 => "heading1",
            ElementType::Heading2 => "heading2",
            ElementType::Heading3 => "heading3",
            ElementType::Heading4 => "heading4",
            ElementType::Heading5 => "heading5",
            ElementType::Heading6 => "heading6",
            ElementType::Paragraph => "paragraph",
            ElementType::Link => "link",
            ElementType::Image => "image",
            ElementType::CodeBlock => "codeblock",
            ElementType::Code => "code",
            ElementType::Blockquote => "blockquote",
            ElementType::List => "list",
            ElementType::ListItem => "listitem",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.key() == key)
    }

    /// Heading element for a level in `1..=6`. Out-of-range levels clamp.
    pub fn heading(level: u8) -> Self {
        match level {
            0 | 1 => ElementType::Heading1,
            2 => ElementType::Heading2,
            3 => ElementType::Heading3,
            4 => ElementType::Heading4,
            5 => ElementType::Heading5,
            _ => ElementType::Heading6,
        }
    }

    /// All valid keys, in canonical order.
    pub fn keys() -> Vec<&'static str> {
        Self::ALL.iter().map(|t| t.key()).collect()
    }
}

/// Style config file as written on disk. Unknown top-level keys are rejected.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct StyleConfigFile {
    elements: BTreeMap<String, String>,
    contexts: BTreeMap<String, BTreeMap<String, String>>,
}

/// Validated style configuration. Immutable once loaded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleConfig {
    elements: HashMap<ElementType, String>,
    contexts: HashMap<String, HashMap<ElementType, String>>,
}

impl StyleConfig {
    /// Load a style config file.
    ///
    /// A missing file yields an empty config. `.json` files are parsed as
    /// JSON, everything else as TOML.
    pub fn load(path: &Path) -> Result<Self, StyleError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No style config, styling disabled");
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path).map_err(|source| StyleError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let is_json = path
            .extension()
            .map(|e| e.eq_ignore_ascii_case("json"))
            .unwrap_or(false);
        let config = if is_json {
            Self::parse_json(&content)?
        } else {
            Self::parse_toml(&content)?
        };
        tracing::info!(path = %path.display(), "Loaded style config");
        Ok(config)
    }

    pub fn parse_toml(content: &str) -> Result<Self, StyleError> {
        let file: StyleConfigFile = toml::from_str(content)?;
        Self::from_file(file)
    }

    pub fn parse_json(content: &str) -> Result<Self, StyleError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let file: StyleConfigFile = serde_json::from_str(content)?;
        Self::from_file(file)
    }

    fn from_file(file: StyleConfigFile) -> Result<Self, StyleError> {
        let mut invalid = Vec::new();

        let elements = typed_map(&file.elements, "elements", &mut invalid);
        let contexts = file
            .contexts
            .iter()
            .map(|(name, map)| {
                let location = format!("contexts.{name}");
                (name.clone(), typed_map(map, &location, &mut invalid))
            })
            .collect();

        if !invalid.is_empty() {
            return Err(StyleError::InvalidKeys { invalid });
        }
        Ok(Self { elements, contexts })
    }

    /// Classes for an element in a context, or `""` for none.
    ///
    /// Callers skip this lookup entirely when the element already carries
    /// an inline class.
    pub fn classes_for(&self, element: ElementType, context: &str) -> &str {
        if !context.is_empty() {
            if let Some(classes) = self.contexts.get(context).and_then(|m| m.get(&element)) {
                return classes;
            }
        }
        self.elements.get(&element).map(String::as_str).unwrap_or("")
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty() && self.contexts.is_empty()
    }
}

/// Convert a string-keyed map, recording every unknown key as
/// `<location>.<key>`.
fn typed_map(
    raw: &BTreeMap<String, String>,
    location: &str,
    invalid: &mut Vec<String>,
) -> HashMap<ElementType, String> {
    let mut typed = HashMap::new();
    for (key, classes) in raw {
        match ElementType::from_key(key) {
            Some(element) => {
                typed.insert(element, classes.clone());
            }
            None => invalid.push(format!("{location}.{key}")),
        }
    }
    typed
}
