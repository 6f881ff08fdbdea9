//! # mdsite
//!
//! A small static site generator: a tree of markdown documents becomes a tree
//! of HTML pages that share one template, one navigation bar, and one style
//! configuration. Every page is checked after the build so broken links,
//! missing images, bad scripts and incomplete navigation fail loudly.
//!
//! # Pipeline
//!
//! ```text
//! 1. Load      config.toml, styles.toml, template, sections   (fatal on error)
//! 2. Generate  content/markdown/**.md  →  build/**.html       (per-page errors collected)
//! 3. Validate  build/**.html                                  (every failure reported)
//! ```
//!
//! Each page goes through the same steps:
//!
//! ```text
//! markdown ──convert+style──▶ fragment ──┐
//!                                        ├──substitute──▶ page ──write──▶ build/
//! template ──────────────────────────────┘
//!             {{title}}       first level-1 heading
//!             {{navigation}}  depth-aware <nav> block
//!             {{content}}     fragment with .md links and ../ assets rewritten
//! ```
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`paths`] | Source → output path mapping, section naming, relative paths |
//! | [`rewrite`] | `.md` link and `../` asset reference rewriting in fragments |
//! | [`style`] | Element → CSS class configuration, global and per context |
//! | [`markdown`] | Markdown → HTML conversion with class injection, title extraction |
//! | [`navigation`] | Navigation bar markup for a page at a given depth |
//! | [`substitution`] | Placeholder substituters and their registry |
//! | [`validate`] | Post-build validators and their registry |
//! | [`site`] | Build orchestration: load, copy, generate, validate |
//! | [`config`] | `config.toml` loading, merging, and validation |
//! | [`types`] | Documents and per-page context shared between stages |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Pure Path Mapping
//!
//! Every path decision (where a document lands, what a link becomes, how
//! deep a page sits) is a pure function of `/`-separated strings in
//! [`paths`]. Only [`site`] touches the filesystem, so the mapping rules are
//! testable without a temp directory.
//!
//! ## Registries Over Hardcoded Steps
//!
//! Placeholders and validators are trait objects in ordered registries. The
//! defaults cover `{{title}}`, `{{navigation}}`, `{{content}}` and the four
//! validators; new ones are added by registering another implementation.
//!
//! ## Maud For Generated Markup
//!
//! The navigation bar is built with [Maud](https://maud.lambda.xyz/), so
//! section names and labels are escaped at compile-checked interpolation
//! points rather than by hand.

pub mod config;
pub mod markdown;
pub mod navigation;
pub mod output;
pub mod paths;
pub mod rewrite;
pub mod site;
pub mod style;
pub mod substitution;
pub mod types;
pub mod validate;

#[cfg(test)]
pub(crate) mod test_helpers;
