//! Reference rewriting for converted pages.
//!
//! Markdown authors link documents by their source paths (`[x](../home.md)`)
//! and reference assets by their physical location relative to the document
//! (`![](../../assets/logo.png)`). Once a page lands at its output path those
//! references would point at the wrong place, so the rewriter relocates them:
//!
//! ```text
//! posts/hello.md (singular naming, output post/hello.html)
//!
//!   href="../home.md"              → href="../index.html"
//!   href="index.md#top"            → href="../posts/index.html#top"
//!   src="../../assets/logo.png"    → src="../assets/logo.png"
//!   src="chart.svg"                → src="../posts/chart.svg"
//! ```
//!
//! Links are resolved in source space, mapped through the [`PathResolver`],
//! then made relative to the referencing page's output directory. Asset
//! sources are resolved in project space and mapped through the
//! [`ContentLayout`].
//!
//! Rewriting is best-effort: external URLs, absolute paths and fragment-only
//! references are left alone, and a reference that cannot be resolved (one
//! that climbs above its root) is left unchanged for the validators to flag.

use crate::paths::{self, ContentLayout, PathResolver, SOURCE_EXT};
use regex::{Captures, Regex};
use std::sync::LazyLock;

static LINK_HREF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(<a\s(?:[^>]*?\s)?href=")([^"]*)""#).unwrap());

static IMG_SRC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(<img\s(?:[^>]*?\s)?src=")([^"]*)""#).unwrap());

/// Whether a reference points off-site: a scheme URL (`https:`, `mailto:`)
/// or a protocol-relative `//host` reference.
pub fn is_external(reference: &str) -> bool {
    if reference.starts_with("//") {
        return true;
    }
    match reference.split_once(':') {
        Some((scheme, _)) => {
            let mut chars = scheme.chars();
            chars.next().is_some_and(|c| c.is_ascii_alphabetic())
                && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        None => false,
    }
}

/// Rewrites link targets and asset sources of one site's pages.
#[derive(Debug, Clone, Default)]
pub struct ReferenceRewriter {
    resolver: PathResolver,
    layout: ContentLayout,
}

impl ReferenceRewriter {
    pub fn new(resolver: PathResolver, layout: ContentLayout) -> Self {
        Self { resolver, layout }
    }

    /// Rewrite every document link and relative asset source in `html`,
    /// which was converted from the document at `source`.
    pub fn rewrite(&self, html: &str, source: &str) -> String {
        let linked = LINK_HREF.replace_all(html, |caps: &Captures| {
            let href = &caps[2];
            match self.rewrite_link(href, source) {
                Some(rewritten) => format!("{}{}\"", &caps[1], rewritten),
                None => caps[0].to_string(),
            }
        });
        IMG_SRC
            .replace_all(&linked, |caps: &Captures| {
                let src = &caps[2];
                match self.rewrite_asset(src, source) {
                    Some(rewritten) => format!("{}{}\"", &caps[1], rewritten),
                    None => caps[0].to_string(),
                }
            })
            .into_owned()
    }

    /// Output-relative link for a `.md` target, keeping any fragment.
    pub fn rewrite_link(&self, href: &str, source: &str) -> Option<String> {
        if href.is_empty() || href.starts_with('#') || href.starts_with('/') || is_external(href) {
            return None;
        }
        let (path, fragment) = match href.find('#') {
            Some(idx) => href.split_at(idx),
            None => (href, ""),
        };
        if !path.ends_with(&format!(".{SOURCE_EXT}")) {
            return None;
        }

        let Some(target) = paths::join(paths::parent_dir(source), path) else {
            tracing::warn!(source, href, "Link climbs above the markdown root, left unchanged");
            return None;
        };
        let output = self.resolver.resolve(&target);
        let from = self.resolver.output_dir(source);
        let rewritten = format!("{}{}", paths::relative_to(&from, &output), fragment);
        tracing::debug!(source, href, rewritten = %rewritten, "Rewrote link");
        Some(rewritten)
    }

    /// Output-relative source for a relative asset reference.
    ///
    /// `../` references are always relocated. Other relative references
    /// point next to the document and only move when the page's output
    /// directory differs from its source directory.
    pub fn rewrite_asset(&self, src: &str, source: &str) -> Option<String> {
        if src.is_empty() || src.starts_with(['/', '#', '?']) || is_external(src) {
            return None;
        }
        if !src.starts_with("../") && paths::parent_dir(source) == self.resolver.output_dir(source) {
            return None;
        }
        let physical = paths::join(&self.layout.source_dir(source), src);
        let Some(asset) = physical.and_then(|p| self.layout.output_relative(&p)) else {
            tracing::warn!(source, src, "Asset outside the content tree, left unchanged");
            return None;
        };
        let rewritten = paths::relative_to(&self.resolver.output_dir(source), &asset);
        tracing::debug!(source, src, rewritten = %rewritten, "Rewrote asset");
        Some(rewritten)
    }
}
