//! Cross-section navigation.
//!
//! Every page carries the same navigation block: a home entry followed by
//! one entry per top-level section, in section order. Pages live at different
//! depths of the build tree, so each href is prefixed with one `../` per
//! directory level of the current page:
//!
//! ```html
//! <!-- page at posts/hello.html -->
//! <nav class="site-nav">
//!   <a href="../index.html">Home</a>
//!   <a href="../about/index.html">About</a>
//!   <a href="../posts/index.html">Posts</a>
//! </nav>
//! ```
//!
//! Section entries always point at the section's index page, which keeps the
//! section directory name under every naming convention.

use crate::paths::{self, INDEX_FILE};
use maud::{Markup, html};

/// Builds the navigation block for a fixed list of sections.
#[derive(Debug, Clone)]
pub struct NavigationBuilder {
    sections: Vec<String>,
    home_label: String,
}

impl NavigationBuilder {
    pub fn new(sections: Vec<String>, home_label: impl Into<String>) -> Self {
        Self {
            sections,
            home_label: home_label.into(),
        }
    }

    /// Navigation markup for a page whose output directory is `current_dir`
    /// (`""` for the build root).
    pub fn build(&self, current_dir: &str) -> Markup {
        let prefix = "../".repeat(paths::depth(current_dir));
        html! {
            nav.site-nav {
                a href={ (prefix) (INDEX_FILE) } { (self.home_label) }
                @for section in &self.sections {
                    a href={ (prefix) (section) "/" (INDEX_FILE) } { (section_label(section)) }
                }
            }
        }
    }
}

/// Display label of a section: its name with the first character uppercased.
pub fn section_label(section: &str) -> String {
    let mut chars = section.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
