use clap::{Parser, Subcommand};
use mdsite::site::Site;
use mdsite::{config, output};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "mdsite")]
#[command(about = "Static site generator for markdown document trees")]
#[command(long_about = "\
Static site generator for markdown document trees

Every markdown document becomes an HTML page built from one template, with a
navigation bar listing the site's sections and CSS classes taken from a style
config. After generation every page is validated: local links, images and
scripts must exist, scripts must parse, external URLs must answer.

Project structure:

  project/
  ├── config.toml                  # Site config (optional)
  ├── content/
  │   ├── markdown/
  │   │   ├── home.md              # → build/index.html
  │   │   └── posts/               # Section (top-level directory)
  │   │       ├── index.md         # → build/posts/index.html
  │   │       └── hello.md         # → build/posts/hello.html
  │   └── assets/                  # → build/assets/
  ├── scripts/                     # *.js → build/scripts/
  └── styles/
      └── styles.toml              # Element → CSS class mapping (optional)

Run 'mdsite gen-config' to generate a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Project directory holding config.toml and the content tree
    #[arg(long, default_value = ".", global = true)]
    project: PathBuf,

    /// Output directory (overrides build_dir from config.toml)
    #[arg(long, global = true)]
    build_dir: Option<String>,

    /// Do not check external links and images
    #[arg(long, global = true)]
    skip_external: bool,

    /// Log progress for every page
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate the site and validate every page
    Build,
    /// Generate the site without validating
    Generate,
    /// Validate an existing build tree
    Validate,
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Command::GenConfig = cli.command {
        print!("{}", config::stock_config_toml());
        return Ok(());
    }

    let mut site_config = config::load_config(&cli.project)?;
    if let Some(build_dir) = &cli.build_dir {
        site_config.build_dir = build_dir.clone();
    }
    if cli.skip_external {
        site_config.validation.skip_external = true;
    }
    let site = Site::load(&cli.project, site_config)?;

    match cli.command {
        Command::Build => {
            println!("==> Generating {}", site.build_dir().display());
            let summary = site.generate()?;
            output::print_generate_output(&summary, &cli.project);

            println!("==> Validating");
            let report = site.validate(&summary.pages);
            output::print_validation_report(&report, &cli.project);
            if !report.is_ok() {
                return Err(validation_failed(report.len()));
            }
            println!("==> Build complete: {}", site.build_dir().display());
        }
        Command::Generate => {
            let summary = site.generate()?;
            output::print_generate_output(&summary, &cli.project);
        }
        Command::Validate => {
            println!("==> Validating {}", site.build_dir().display());
            let report = site.validate_build_dir()?;
            output::print_validation_report(&report, &cli.project);
            if !report.is_ok() {
                return Err(validation_failed(report.len()));
            }
        }
        Command::GenConfig => unreachable!("handled before loading the site"),
    }

    Ok(())
}

/// The report is already printed, so the returned error only carries the count.
fn validation_failed(count: usize) -> Box<dyn std::error::Error> {
    format!("validation failed with {count} error(s)").into()
}

/// `--verbose` logs at info level; otherwise `RUST_LOG` decides, defaulting
/// to warnings only.
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
