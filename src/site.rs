//! Site build orchestration.
//!
//! A [`Site`] is a project directory plus its resolved [`SiteConfig`]. Loading
//! it reads everything that is shared by all pages (style config, page
//! template, section list) and fails fast if any of it is broken. Nothing is
//! written until loading succeeds.
//!
//! ## Build Stages
//!
//! ```text
//! load        styles.toml, template, sections         fatal on error
//! copy        assets/ → build/assets, scripts/*.js → build/scripts
//! generate    every .md in the markdown tree          errors collected per page
//! validate    every generated page                    errors collected per check
//! ```
//!
//! Generation keeps going after a page fails and reports all failures at the
//! end. Validation only runs once every page is written, since link checks
//! need their targets in place.
//!
//! ## Output Structure
//!
//! ```text
//! build/
//! ├── index.html                 # home.md
//! ├── assets/                    # content/assets, byte-copied
//! ├── scripts/                   # scripts/*.js
//! ├── about/
//! │   └── index.html             # about/index.md
//! └── posts/
//!     ├── index.html             # posts/index.md
//!     ├── hello.html             # posts/hello.md (post/ with singular naming)
//!     └── chart.svg              # non-markdown files copied in place
//! ```

use crate::config::{ConfigError, SiteConfig};
use crate::markdown;
use crate::navigation::NavigationBuilder;
use crate::paths::{OUTPUT_EXT, PathResolver, SOURCE_EXT};
use crate::rewrite::ReferenceRewriter;
use crate::style::{StyleConfig, StyleError};
use crate::substitution::{Registry, SubstitutionError};
use crate::types::{Document, PageContext};
use crate::validate::{HttpChecker, UrlChecker, ValidationError, ValidationReport, ValidatorRegistry};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use thiserror::Error;
use walkdir::WalkDir;

const DEFAULT_TEMPLATE: &str = include_str!("../templates/page.html");

/// Build-tree directory that receives the scripts.
pub const SCRIPTS_OUT_DIR: &str = "scripts";

// ============================================================================
// Errors
// ============================================================================

/// Failure to produce one page.
#[derive(Error, Debug)]
pub enum PageError {
    #[error("reading {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("{path}: {source}")]
    Substitution {
        path: String,
        source: SubstitutionError,
    },
    #[error("writing {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("copying {from} to {to}: {source}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        source: std::io::Error,
    },
}

/// Every page failure of one generation run.
#[derive(Debug, Default)]
pub struct GenerationErrors(pub Vec<PageError>);

impl GenerationErrors {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for GenerationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lines: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        write!(f, "{}", lines.join("\n"))
    }
}

impl std::error::Error for GenerationErrors {}

#[derive(Error, Debug)]
pub enum SiteError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error("Style config error: {0}")]
    Style(#[from] StyleError),
    #[error("reading template {path}: {source}")]
    Template {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("reading markdown tree {path}: {source}")]
    Content {
        path: PathBuf,
        source: walkdir::Error,
    },
    #[error("markdown directory not found: {0}")]
    MissingContent(PathBuf),
    #[error("copying {from} to {to}: {source}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        source: std::io::Error,
    },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("generation failed with {} error(s):\n{}", .0.len(), .0)]
    Generation(GenerationErrors),
    #[error("validation failed with {} error(s):\n{}", .0.len(), .0)]
    Validation(ValidationReport),
}

// ============================================================================
// Summaries
// ============================================================================

/// One written page, both paths slash-separated and tree-relative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedPage {
    pub source: String,
    pub output: String,
}

/// A directory copied into the build tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopiedTree {
    pub from: PathBuf,
    pub to: PathBuf,
    pub files: usize,
}

#[derive(Debug, Clone, Default)]
pub struct GenerateSummary {
    pub pages: Vec<GeneratedPage>,
    pub copied: Vec<CopiedTree>,
    /// Non-markdown files copied from the markdown tree
    pub static_files: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct BuildSummary {
    pub generate: GenerateSummary,
    pub validation: ValidationReport,
}

// ============================================================================
// Site
// ============================================================================

pub struct Site {
    root: PathBuf,
    config: SiteConfig,
    resolver: PathResolver,
    styles: StyleConfig,
    template: String,
    sections: Vec<String>,
    substitutions: Registry,
    validators: ValidatorRegistry,
}

impl Site {
    /// Load the shared inputs of the project at `root` and wire the default
    /// substituters and validators.
    pub fn load(root: &Path, config: SiteConfig) -> Result<Self, SiteError> {
        config.validate()?;

        let styles = StyleConfig::load(&root.join(&config.styles))?;
        let template = load_template(root, config.template.as_deref())?;
        let markdown_dir = root.join(&config.markdown_dir);
        let sections = list_sections(&markdown_dir)?;
        tracing::info!(sections = ?sections, "Discovered sections");

        let resolver = config.resolver();
        let navigation = NavigationBuilder::new(sections.clone(), &config.navigation.home_label);
        let rewriter = ReferenceRewriter::new(resolver.clone(), config.layout());
        let substitutions = Registry::with_defaults(navigation, rewriter);

        let checker: Option<Rc<dyn UrlChecker>> = if config.validation.skip_external {
            None
        } else {
            Some(Rc::new(HttpChecker::new(config.validation.timeout())))
        };
        let validators = ValidatorRegistry::with_defaults(
            sections.clone(),
            &config.navigation.home_label,
            checker,
        );

        Ok(Self {
            root: root.to_path_buf(),
            config,
            resolver,
            styles,
            template,
            sections,
            substitutions,
            validators,
        })
    }

    /// Replace the validator list.
    pub fn with_validators(mut self, validators: ValidatorRegistry) -> Self {
        self.validators = validators;
        self
    }

    /// Replace the substituter list.
    pub fn with_substitutions(mut self, substitutions: Registry) -> Self {
        self.substitutions = substitutions;
        self
    }

    pub fn sections(&self) -> &[String] {
        &self.sections
    }

    pub fn markdown_dir(&self) -> PathBuf {
        self.root.join(&self.config.markdown_dir)
    }

    pub fn build_dir(&self) -> PathBuf {
        self.root.join(&self.config.build_dir)
    }

    /// Generate and validate. Fails on any generation or validation error.
    pub fn build(&self) -> Result<BuildSummary, SiteError> {
        let generate = self.generate()?;
        let validation = self.validate(&generate.pages);
        if !validation.is_ok() {
            return Err(SiteError::Validation(validation));
        }
        Ok(BuildSummary {
            generate,
            validation,
        })
    }

    /// Write every page and copy static files, without validating.
    pub fn generate(&self) -> Result<GenerateSummary, SiteError> {
        let markdown_dir = self.markdown_dir();
        let build_dir = self.build_dir();
        fs::create_dir_all(&build_dir)?;

        let mut summary = GenerateSummary::default();
        summary.copied.extend(self.copy_static_dirs(&build_dir)?);

        let mut errors = GenerationErrors::default();
        for entry in WalkDir::new(&markdown_dir).sort_by_file_name() {
            let entry = entry.map_err(|source| SiteError::Content {
                path: markdown_dir.clone(),
                source,
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let Some(rel) = tree_relative(entry.path(), &markdown_dir) else {
                continue;
            };

            if has_extension(entry.path(), SOURCE_EXT) {
                match self.generate_page(entry.path(), &rel, &build_dir) {
                    Ok(page) => summary.pages.push(page),
                    Err(e) => {
                        tracing::warn!(source = %rel, error = %e, "Page failed");
                        errors.0.push(e);
                    }
                }
            } else {
                let dest = build_dir.join(&rel);
                match copy_file(entry.path(), &dest) {
                    Ok(()) => {
                        tracing::debug!(file = %rel, "Copied static file");
                        summary.static_files.push(rel);
                    }
                    Err(source) => {
                        tracing::warn!(file = %rel, error = %source, "Static file failed");
                        errors.0.push(PageError::Copy {
                            from: entry.path().to_path_buf(),
                            to: dest,
                            source,
                        });
                    }
                }
            }
        }

        if !errors.is_empty() {
            return Err(SiteError::Generation(errors));
        }
        tracing::info!(pages = summary.pages.len(), "Site generated");
        Ok(summary)
    }

    /// Convert, fill and write one document.
    fn generate_page(
        &self,
        path: &Path,
        source_path: &str,
        build_dir: &Path,
    ) -> Result<GeneratedPage, PageError> {
        let content = fs::read(path).map_err(|source| PageError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let document = Document::new(source_path, content);
        let source = document.text().into_owned();

        let context = self.resolver.context_for(source_path);
        let html = markdown::render(&source, &self.styles, &context);
        let output_path = self.resolver.resolve(source_path);

        let ctx = PageContext {
            source,
            source_path: source_path.to_string(),
            output_path: output_path.clone(),
            html,
        };
        let page = self
            .substitutions
            .apply(&self.template, &ctx)
            .map_err(|source| PageError::Substitution {
                path: source_path.to_string(),
                source,
            })?;

        let dest = build_dir.join(&output_path);
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).map_err(|source| PageError::Write {
                path: dest.clone(),
                source,
            })?;
        }
        fs::write(&dest, page).map_err(|source| PageError::Write {
            path: dest.clone(),
            source,
        })?;

        tracing::info!(source = source_path, output = %output_path, "Generated page");
        Ok(GeneratedPage {
            source: source_path.to_string(),
            output: output_path,
        })
    }

    /// Copy the assets tree and the scripts' `.js` files. Missing source
    /// directories are skipped.
    fn copy_static_dirs(&self, build_dir: &Path) -> Result<Vec<CopiedTree>, SiteError> {
        let mut copied = Vec::new();

        let assets = self.root.join(&self.config.assets_dir);
        if assets.is_dir() {
            let to = build_dir.join(self.assets_out_dir());
            let files = copy_tree(&assets, &to, |_| true)?;
            tracing::info!(from = %assets.display(), files, "Copied assets");
            copied.push(CopiedTree {
                from: assets,
                to,
                files,
            });
        }

        let scripts = self.root.join(&self.config.scripts_dir);
        if scripts.is_dir() {
            let to = build_dir.join(SCRIPTS_OUT_DIR);
            let files = copy_tree(&scripts, &to, |p| has_extension(p, "js"))?;
            tracing::info!(from = %scripts.display(), files, "Copied scripts");
            copied.push(CopiedTree {
                from: scripts,
                to,
                files,
            });
        }

        Ok(copied)
    }

    /// Build-relative directory of the assets: the assets path without the
    /// content root, or its last segment when it sits elsewhere.
    pub fn assets_out_dir(&self) -> String {
        let assets = &self.config.assets_dir;
        self.config.layout().output_relative(assets).unwrap_or_else(|| {
            Path::new(assets)
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "assets".to_string())
        })
    }

    // ========================================================================
    // Validation
    // ========================================================================

    /// Validate the given generated pages.
    pub fn validate(&self, pages: &[GeneratedPage]) -> ValidationReport {
        let build_dir = self.build_dir();
        let paths: Vec<PathBuf> = pages.iter().map(|p| build_dir.join(&p.output)).collect();
        self.validate_files(&build_dir, &paths)
    }

    /// Validate every page already present in the build tree.
    pub fn validate_build_dir(&self) -> Result<ValidationReport, SiteError> {
        let build_dir = self.build_dir();
        if !build_dir.is_dir() {
            return Err(SiteError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("build directory not found: {}", build_dir.display()),
            )));
        }
        let mut pages = Vec::new();
        for entry in WalkDir::new(&build_dir).sort_by_file_name() {
            let entry = entry.map_err(|source| SiteError::Content {
                path: build_dir.clone(),
                source,
            })?;
            if entry.file_type().is_file() && has_extension(entry.path(), OUTPUT_EXT) {
                pages.push(entry.into_path());
            }
        }
        Ok(self.validate_files(&build_dir, &pages))
    }

    fn validate_files(&self, build_dir: &Path, pages: &[PathBuf]) -> ValidationReport {
        let mut report = ValidationReport::default();
        for page in pages {
            report.pages += 1;
            match fs::read_to_string(page) {
                Ok(content) => report
                    .errors
                    .extend(self.validators.validate(page, build_dir, &content)),
                Err(e) => report
                    .errors
                    .push(ValidationError::new(page, format!("cannot read page: {e}"))),
            }
        }
        tracing::info!(
            pages = report.pages,
            errors = report.errors.len(),
            "Validation finished"
        );
        report
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn load_template(root: &Path, template: Option<&str>) -> Result<String, SiteError> {
    match template {
        None => Ok(DEFAULT_TEMPLATE.to_string()),
        Some(rel) => {
            let path = root.join(rel);
            fs::read_to_string(&path).map_err(|source| SiteError::Template { path, source })
        }
    }
}

/// Sorted names of the top-level directories of the markdown tree.
pub fn list_sections(markdown_dir: &Path) -> Result<Vec<String>, SiteError> {
    if !markdown_dir.is_dir() {
        return Err(SiteError::MissingContent(markdown_dir.to_path_buf()));
    }
    let mut sections = Vec::new();
    for entry in WalkDir::new(markdown_dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|source| SiteError::Content {
            path: markdown_dir.to_path_buf(),
            source,
        })?;
        if entry.file_type().is_dir() {
            sections.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    Ok(sections)
}

/// `/`-separated path of `path` below `base`.
fn tree_relative(path: &Path, base: &Path) -> Option<String> {
    let rel = path.strip_prefix(base).ok()?;
    let parts: Vec<String> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Some(parts.join("/"))
}

fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension()
        .map(|e| e.eq_ignore_ascii_case(ext))
        .unwrap_or(false)
}

fn copy_file(from: &Path, to: &Path) -> std::io::Result<()> {
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::copy(from, to)?;
    Ok(())
}

/// Copy every file under `src` accepted by `filter` to the same relative
/// location under `dst`. Returns the number of files copied.
fn copy_tree(src: &Path, dst: &Path, filter: impl Fn(&Path) -> bool) -> Result<usize, SiteError> {
    let mut files = 0;
    for entry in WalkDir::new(src).sort_by_file_name() {
        let entry = entry.map_err(|source| SiteError::Content {
            path: src.to_path_buf(),
            source,
        })?;
        if !entry.file_type().is_file() || !filter(entry.path()) {
            continue;
        }
        let Ok(rel) = entry.path().strip_prefix(src) else {
            continue;
        };
        let to = dst.join(rel);
        copy_file(entry.path(), &to).map_err(|source| SiteError::Copy {
            from: entry.path().to_path_buf(),
            to,
            source,
        })?;
        files += 1;
    }
    Ok(files)
}
