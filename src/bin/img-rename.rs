//! CLI binary for img-rename.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `RenameConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use img_rename::{
    rename_directory, ProgressCallback, RenameConfig, RenameProgressCallback, RenameReport,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

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

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: a bar anchored at the bottom of the terminal
/// plus one log line per file.
struct CliProgressCallback {
    bar: ProgressBar,
    dry_run: bool,
}

impl CliProgressCallback {
    /// The bar starts as a spinner; `on_scan_complete` sets its length.
    fn new(dry_run: bool) -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS);

        bar.set_style(spinner_style);
        bar.set_prefix("Scanning");
        bar.set_message("Listing directory…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self { bar, dry_run })
    }

    fn activate_bar(&self, total: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} images  \
             ⏱ {elapsed_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);

        self.bar.set_length(total as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix(if self.dry_run { "Dry run" } else { "Renaming" });
    }
}

impl RenameProgressCallback for CliProgressCallback {
    fn on_scan_complete(&self, total_files: usize) {
        self.activate_bar(total_files);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Found {total_files} images"))
        ));
    }

    fn on_file_start(&self, _index: usize, _total: usize, file: &str) {
        self.bar.set_message(file.to_string());
    }

    fn on_file_renamed(&self, _index: usize, _total: usize, from: &str, to: &str) {
        let label = if self.dry_run { "Would rename" } else { "Renamed" };
        self.bar.println(format!(
            "  {} {}: {} {} {}",
            green("✓"),
            label,
            from,
            dim("->"),
            bold(to),
        ));
        self.bar.inc(1);
    }

    fn on_file_error(&self, _index: usize, _total: usize, file: &str, error: String) {
        // Truncate very long error messages to keep output tidy.
        let msg = if error.chars().count() > 100 {
            let cut: String = error.chars().take(99).collect();
            format!("{cut}\u{2026}")
        } else {
            error
        };
        self.bar.println(format!(
            "  {} Error processing {}: {}",
            red("✗"),
            file,
            red(&msg)
        ));
        self.bar.inc(1);
    }

    fn on_run_complete(&self, total_files: usize, renamed_count: usize) {
        let failed = total_files.saturating_sub(renamed_count);
        self.bar.finish_and_clear();

        if failed == 0 {
            eprintln!(
                "{} {} images renamed",
                green("✔"),
                bold(&renamed_count.to_string())
            );
        } else {
            eprintln!(
                "{} {}/{} images renamed  ({} failed)",
                if failed == total_files {
                    red("✘")
                } else {
                    cyan("⚠")
                },
                bold(&renamed_count.to_string()),
                total_files,
                red(&failed.to_string()),
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Rename every image in a folder
  img-rename ~/Pictures/unsorted

  # Preview the new names without touching any file
  img-rename --dry-run ~/Pictures/unsorted

  # Use a different model and a custom system prompt
  img-rename --model gemini-2.5-flash --system-prompt prompt.txt photos/

  # Machine-readable report
  img-rename --json photos/ > report.json

SUPPORTED FORMATS:
  .png  .jpg  .jpeg  .webp   (extension match is case-insensitive)

ENVIRONMENT VARIABLES:
  GEMINI_API_KEY       Google Gemini API key (required)
  GEMINI_MODEL         Override model ID (default: gemini-2.0-flash)
  IMG_RENAME_DIR       Directory to process
  RUST_LOG             tracing filter, e.g. img_rename=debug
"#;

/// Rename images using names suggested by a Vision LLM.
#[derive(Parser, Debug)]
#[command(
    name = "img-rename",
    version,
    about = "Rename images using names suggested by a Vision LLM",
    long_about = "Upload each image in a directory to Google Gemini, ask for a short \
descriptive filename, and rename the file in place. Files are processed one at a time; \
a failure on one image is reported and the run continues.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Directory containing the images to rename.
    #[arg(env = "IMG_RENAME_DIR")]
    directory: PathBuf,

    /// Gemini API key.
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Gemini model ID.
    #[arg(long, env = "GEMINI_MODEL", default_value = img_rename::config::DEFAULT_MODEL)]
    model: String,

    /// API base URL (proxies, testing).
    #[arg(long, env = "IMG_RENAME_BASE_URL", default_value = img_rename::config::DEFAULT_BASE_URL)]
    base_url: String,

    /// LLM temperature (0.0–2.0).
    #[arg(long, env = "IMG_RENAME_TEMPERATURE", default_value_t = 0.7)]
    temperature: f32,

    /// Nucleus sampling mass (0.0–1.0).
    #[arg(long, env = "IMG_RENAME_TOP_P", default_value_t = 0.95)]
    top_p: f32,

    /// Top-k sampling.
    #[arg(long, env = "IMG_RENAME_TOP_K", default_value_t = 40)]
    top_k: u32,

    /// Max output tokens per image.
    #[arg(long, env = "IMG_RENAME_MAX_TOKENS", default_value_t = 8192)]
    max_tokens: u32,

    /// Path to a text file containing a custom system prompt.
    #[arg(long, env = "IMG_RENAME_SYSTEM_PROMPT")]
    system_prompt: Option<PathBuf>,

    /// Ask the model but do not rename anything.
    #[arg(short = 'n', long, env = "IMG_RENAME_DRY_RUN")]
    dry_run: bool,

    /// Print the run report as JSON on stdout.
    #[arg(long, env = "IMG_RENAME_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "IMG_RENAME_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "IMG_RENAME_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "IMG_RENAME_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar prints one line per file, so library INFO logs would
    // only duplicate it.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
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

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new(cli.dry_run) as Arc<dyn RenameProgressCallback>)
    } else {
        None
    };

    let config = build_config(&cli, progress_cb).await?;

    // ── Run ──────────────────────────────────────────────────────────────
    let report = rename_directory(&config).await.context("Rename failed")?;

    if cli.json {
        let json = serde_json::to_string_pretty(&report).context("Failed to serialise report")?;
        println!("{json}");
    } else if !cli.quiet && !show_progress {
        print_summary(&report);
    }

    Ok(())
}

/// Map CLI args to `RenameConfig`.
async fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<RenameConfig> {
    let mut builder = RenameConfig::builder()
        .directory(&cli.directory)
        .model(&cli.model)
        .base_url(&cli.base_url)
        .temperature(cli.temperature)
        .top_p(cli.top_p)
        .top_k(cli.top_k)
        .max_output_tokens(cli.max_tokens)
        .dry_run(cli.dry_run);

    if let Some(ref key) = cli.api_key {
        builder = builder.api_key(key);
    }

    if let Some(ref path) = cli.system_prompt {
        let prompt = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read system prompt from {:?}", path))?;
        builder = builder.system_instruction(prompt.trim());
    }

    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

/// Plain summary used when the progress bar is off.
fn print_summary(report: &RenameReport) {
    let s = &report.stats;
    eprintln!(
        "{} {}/{} images in {}ms",
        if report.dry_run { "Would rename" } else { "Renamed" },
        s.renamed_files,
        s.total_files,
        s.total_duration_ms
    );
    if s.failed_files > 0 {
        eprintln!("  {} images failed", s.failed_files);
    }
}
