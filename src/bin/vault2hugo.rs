//! CLI binary for vault2hugo.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ConverterConfig` and prints results.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use vault2hugo::{
    convert_vault_with_progress, markdown_to_pdf, BatchProgress, ConverterConfig,
};

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress: one bar anchored at the bottom, a log line per file.
struct CliProgress {
    bar: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let bar = ProgressBar::new(0); // length set in on_batch_start
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  [{bar:42.green/238}] {pos:>3}/{len} files  ⏱ {elapsed_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(style);
        bar.set_prefix("Converting");
        bar.enable_steady_tick(Duration::from_millis(80));
        Self { bar }
    }
}

impl BatchProgress for CliProgress {
    fn on_batch_start(&self, total_files: usize) {
        self.bar.set_length(total_files as u64);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Converting {total_files} files…"))
        ));
    }

    fn on_file_converted(&self, source: &Path, _index: usize, _total: usize) {
        self.bar
            .println(format!("  {} {}", green("✓"), dim(&source.display().to_string())));
        self.bar.inc(1);
    }

    fn on_file_failed(&self, source: &Path, _index: usize, _total: usize, error: &str) {
        // Truncate very long error messages to keep output tidy.
        let msg: String = if error.chars().count() > 80 {
            format!("{}…", error.chars().take(79).collect::<String>())
        } else {
            error.to_string()
        };
        self.bar
            .println(format!("  {} {}  {}", red("✗"), source.display(), red(&msg)));
        self.bar.inc(1);
    }

    fn on_batch_complete(&self, total_files: usize, converted: usize) {
        self.bar.finish_and_clear();
        let failed = total_files.saturating_sub(converted);
        if failed == 0 {
            eprintln!(
                "{} {} files converted successfully",
                green("✔"),
                bold(&converted.to_string())
            );
        } else {
            eprintln!(
                "{} {}/{} files converted  ({} failed)",
                if converted == 0 { red("✘") } else { cyan("⚠") },
                bold(&converted.to_string()),
                total_files,
                red(&failed.to_string()),
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Convert a vault using the defaults (./obsidian-vault -> ./content/posts)
  vault2hugo convert

  # Explicit directories
  vault2hugo convert --source ~/notes/vault --output ./content/posts

  # With a config file
  vault2hugo convert --config scripts/config.yaml

  # Machine-readable run summary
  vault2hugo convert --json > stats.json

  # Render one document to PDF (requires weasyprint on PATH)
  vault2hugo pdf content/posts/guide.md -o guide.pdf

CONFIG FILE (YAML, every key optional):
  vault_dir: ./obsidian-vault          content_dir: ./content/posts
  static_dir: ./static/images          attachments_folder: attachments
  auto_copy_images: true               optimize_images: true
  image_max_width: 1200                image_quality: 85
  create_missing_frontmatter: true     default_draft: false
  default_categories: ["General"]      public_image_base: /images
"#;

/// Convert Obsidian-flavoured Markdown vaults to Hugo content.
#[derive(Parser, Debug)]
#[command(
    name = "vault2hugo",
    version,
    about = "Convert Obsidian-flavoured Markdown vaults to Hugo content",
    long_about = "Convert an Obsidian vault to Hugo-compatible markdown: wikilinks become \
standard links, callouts become styled containers, code fences gain copy-button markers, \
referenced images are copied (and optionally optimized) into the static directory, and \
missing front matter is generated from filenames, timestamps, and content.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "VAULT2HUGO_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true, env = "VAULT2HUGO_QUIET")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Convert every markdown file in the vault.
    Convert(ConvertArgs),
    /// Render a single markdown file to PDF via weasyprint.
    Pdf(PdfArgs),
}

#[derive(clap::Args, Debug)]
struct ConvertArgs {
    /// Source Obsidian vault directory (overrides the config file).
    #[arg(long, env = "VAULT2HUGO_SOURCE")]
    source: Option<PathBuf>,

    /// Output Hugo content directory (overrides the config file).
    #[arg(long, env = "VAULT2HUGO_OUTPUT")]
    output: Option<PathBuf>,

    /// Configuration file path.
    #[arg(long, env = "VAULT2HUGO_CONFIG", default_value = "scripts/config.yaml")]
    config: PathBuf,

    /// Watch for changes and convert automatically (not implemented yet).
    #[arg(long)]
    watch: bool,

    /// Output the run summary as JSON instead of a human-readable line.
    #[arg(long, env = "VAULT2HUGO_JSON")]
    json: bool,

    /// Disable the progress bar.
    #[arg(long, env = "VAULT2HUGO_NO_PROGRESS")]
    no_progress: bool,
}

#[derive(clap::Args, Debug)]
struct PdfArgs {
    /// Markdown file to render.
    input: PathBuf,

    /// Write the PDF here instead of next to the input.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs when the progress bar is active;
    // the bar provides all the feedback that matters to the user.
    let show_progress = match &cli.command {
        Commands::Convert(args) => !cli.quiet && !args.no_progress && !args.json,
        Commands::Pdf(_) => false,
    };
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    match cli.command {
        Commands::Convert(args) => run_convert(args, cli.quiet, show_progress),
        Commands::Pdf(args) => run_pdf(args, cli.quiet),
    }
}

fn run_convert(args: ConvertArgs, quiet: bool, show_progress: bool) -> Result<()> {
    let mut config = ConverterConfig::load_or_default(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    if let Some(source) = args.source {
        config.vault_dir = source;
    }
    if let Some(output) = args.output {
        config.content_dir = output;
    }

    if args.watch {
        eprintln!("Watch mode is not implemented yet.");
        return Ok(());
    }

    let progress = if show_progress {
        Some(CliProgress::new())
    } else {
        None
    };
    let stats = convert_vault_with_progress(
        &config,
        progress.as_ref().map(|p| p as &dyn BatchProgress),
    )
    .context("Conversion failed")?;

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&stats).context("Failed to serialise stats")?
        );
    } else if !quiet && !show_progress {
        eprintln!(
            "Converted {}/{} files ({} images) in {}ms",
            stats.converted, stats.files_found, stats.images_processed, stats.duration_ms
        );
        if stats.failed > 0 {
            eprintln!("  {} files failed", stats.failed);
        }
    }

    if stats.files_found > 0 && stats.converted == 0 {
        anyhow::bail!("all {} files failed to convert", stats.files_found);
    }
    Ok(())
}

fn run_pdf(args: PdfArgs, quiet: bool) -> Result<()> {
    let output = args
        .output
        .unwrap_or_else(|| args.input.with_extension("pdf"));

    markdown_to_pdf(&args.input, &output).context("PDF conversion failed")?;

    if !quiet {
        eprintln!(
            "{} PDF saved as {}",
            green("✔"),
            bold(&output.display().to_string())
        );
    }
    Ok(())
}
