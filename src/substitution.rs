//! Placeholder substitution into the page template.
//!
//! A page template is plain HTML with fixed tokens:
//!
//! | Token            | Replaced with                                  |
//! |------------------|------------------------------------------------|
//! | `{{title}}`      | First level-1 heading of the source, escaped   |
//! | `{{navigation}}` | Navigation block for the page's depth          |
//! | `{{content}}`    | Converted markup with references rewritten     |
//!
//! Each [`Substituter`] owns one token. The [`Registry`] resolves every
//! substituter once per page, in registration order, then replaces every
//! token occurrence in a single pass over the template. A resolve failure
//! aborts the page. Tokens that appear in the template but have no
//! substituter stay as written, and substituters whose token is absent are
//! still resolved (so a page without a title fails even under a template
//! that never shows it).

use crate::markdown;
use crate::navigation::NavigationBuilder;
use crate::rewrite::ReferenceRewriter;
use crate::types::PageContext;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SubstitutionError {
    #[error("Could not find a page title in {path}: no level-1 heading")]
    MissingTitle { path: String },
    #[error("{placeholder}: {message}")]
    Resolve {
        placeholder: String,
        message: String,
    },
}

/// One named template token and how to fill it for a page.
pub trait Substituter {
    /// Token as it appears in the template, braces included.
    fn placeholder(&self) -> &str;

    fn resolve(&self, ctx: &PageContext) -> Result<String, SubstitutionError>;
}

/// Ordered set of substituters applied to every page.
#[derive(Default)]
pub struct Registry {
    substituters: Vec<Box<dyn Substituter>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the title, navigation and content substituters.
    pub fn with_defaults(navigation: NavigationBuilder, rewriter: ReferenceRewriter) -> Self {
        let mut registry = Self::new();
        registry.register(TitleSubstituter);
        registry.register(NavigationSubstituter::new(navigation));
        registry.register(ContentSubstituter::new(rewriter));
        registry
    }

    pub fn register(&mut self, substituter: impl Substituter + 'static) {
        self.substituters.push(Box::new(substituter));
    }

    pub fn len(&self) -> usize {
        self.substituters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.substituters.is_empty()
    }

    /// Fill `template` for one page.
    ///
    /// The template is scanned once. Inserted values are never scanned again,
    /// so a title or document containing `{{content}}` keeps it as text.
    pub fn apply(&self, template: &str, ctx: &PageContext) -> Result<String, SubstitutionError> {
        let mut values = Vec::with_capacity(self.substituters.len());
        for substituter in &self.substituters {
            let value = substituter.resolve(ctx)?;
            if !substituter.placeholder().is_empty() {
                values.push((substituter.placeholder(), value));
            }
        }

        let mut page = String::with_capacity(template.len());
        let mut rest = template;
        // Earliest token wins; on a tie the first registered one does.
        while let Some((at, token, value)) = values
            .iter()
            .filter_map(|(token, value)| rest.find(token).map(|at| (at, *token, value)))
            .min_by_key(|(at, _, _)| *at)
        {
            page.push_str(&rest[..at]);
            page.push_str(value);
            rest = &rest[at + token.len()..];
        }
        page.push_str(rest);
        Ok(page)
    }
}

// ============================================================================
// Built-in substituters
// ============================================================================

/// `{{title}}`: first level-1 heading, HTML-escaped.
pub struct TitleSubstituter;

impl Substituter for TitleSubstituter {
    fn placeholder(&self) -> &str {
        "{{title}}"
    }

    fn resolve(&self, ctx: &PageContext) -> Result<String, SubstitutionError> {
        markdown::extract_title(&ctx.source)
            .map(|title| html_escape::encode_text(&title).into_owned())
            .ok_or_else(|| SubstitutionError::MissingTitle {
                path: ctx.source_path.clone(),
            })
    }
}

/// `{{navigation}}`: navigation block relative to the page's directory.
pub struct NavigationSubstituter {
    builder: NavigationBuilder,
}

impl NavigationSubstituter {
    pub fn new(builder: NavigationBuilder) -> Self {
        Self { builder }
    }
}

impl Substituter for NavigationSubstituter {
    fn placeholder(&self) -> &str {
        "{{navigation}}"
    }

    fn resolve(&self, ctx: &PageContext) -> Result<String, SubstitutionError> {
        Ok(self.builder.build(ctx.output_dir()).into_string())
    }
}

/// `{{content}}`: the converted page with document links and assets
/// relocated for its output path.
pub struct ContentSubstituter {
    rewriter: ReferenceRewriter,
}

impl ContentSubstituter {
    pub fn new(rewriter: ReferenceRewriter) -> Self {
        Self { rewriter }
    }
}

impl Substituter for ContentSubstituter {
    fn placeholder(&self) -> &str {
        "{{content}}"
    }

    fn resolve(&self, ctx: &PageContext) -> Result<String, SubstitutionError> {
        Ok(self.rewriter.rewrite(&ctx.html, &ctx.source_path))
    }
}
