//! CLI binary for pdfmd.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ExtractConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use pdfmd::{
    extract, extract_to_file, inspect, ExtractConfig, ExtractProgressCallback, ProgressCallback,
};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
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
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: renders a live progress bar and per-page log
/// lines using [indicatif]. Pages always complete in order (the extraction
/// loop is sequential) so the bar position tracks the current page directly.
struct CliProgressCallback {
    /// The single progress bar anchored at the bottom of the terminal.
    bar: ProgressBar,
}

impl CliProgressCallback {
    /// Create a callback whose progress-bar length is set dynamically
    /// by `on_extract_start` (called before any pages are processed).
    fn new_dynamic() -> Arc<Self> {
        let bar = ProgressBar::new(0); // length set in on_extract_start

        // Initial style: spinner only (no counter until we know the total).
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Opening PDF…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self { bar })
    }

    /// Switch to the full progress-bar style once we know `total`.
    fn activate_bar(&self, total: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} pages  \
             ⏱ {elapsed_precise}  ETA {eta_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        self.bar.set_length(total as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Extracting");
        self.bar.reset_eta();
    }
}

impl ExtractProgressCallback for CliProgressCallback {
    fn on_extract_start(&self, total_pages: usize) {
        // Switch from spinner-only style to full progress bar now that we
        // know the actual page count.
        self.activate_bar(total_pages);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Starting extraction of {total_pages} pages…"))
        ));
    }

    fn on_page_start(&self, page_num: usize, _total: usize) {
        self.bar.set_message(format!("page {page_num}"));
    }

    fn on_page_ocr(&self, page_num: usize, _total: usize) {
        self.bar.set_message(format!("page {page_num} (OCR)"));
    }

    fn on_page_complete(
        &self,
        page_num: usize,
        total: usize,
        text_len: usize,
        ocr_applied: bool,
        images: usize,
    ) {
        let tag = if ocr_applied {
            yellow("OCR ")
        } else {
            dim("text")
        };
        let image_note = if images > 0 {
            dim(&format!("  {images} img"))
        } else {
            String::new()
        };
        self.bar.println(format!(
            "  {} Page {:>3}/{:<3}  {}  {}{}",
            green("✓"),
            page_num,
            total,
            tag,
            dim(&format!("{text_len:>5} chars")),
            image_note,
        ));
        self.bar.inc(1);
    }

    fn on_extract_complete(&self, total_pages: usize, ocr_pages: usize, images: usize) {
        self.bar.finish_and_clear();
        eprintln!(
            "{} {} pages extracted  ({} via OCR, {} images)",
            green("✔"),
            bold(&total_pages.to_string()),
            ocr_pages,
            images,
        );
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Basic extraction (stdout)
  pdfmd document.pdf

  # Extract to file
  pdfmd document.pdf -o output.md

  # Images into a custom directory, links relative to a web root
  pdfmd report.pdf -o report.md --images-dir assets/img --image-url-prefix /static/img

  # Force OCR on every page (scanned document)
  pdfmd scan.pdf --force-ocr -o scan.md

  # Force OCR only on specific pages (1-indexed)
  pdfmd mixed.pdf --ocr-pages 2,7,9 -o mixed.md

  # German OCR at higher resolution
  pdfmd brief.pdf --lang deu --ocr-dpi 400

  # Inspect PDF metadata (no tesseract needed)
  pdfmd --inspect-only document.pdf

  # JSON output with per-page results and stats
  pdfmd --json document.pdf > output.json

ENVIRONMENT VARIABLES:
  PDFIUM_LIB_PATH   Directory containing the pdfium shared library
  PDFMD_TESSERACT   Path to the tesseract binary (default: tesseract on PATH)

SETUP:
  1. Install tesseract:  apt install tesseract-ocr  (or brew install tesseract)
  2. Provide pdfium:     PDFIUM_LIB_PATH=/path/to/libdir pdfmd ...
                         (or install libpdfium on the system loader path)
  3. Extract:            pdfmd document.pdf -o output.md

  Tesseract is only invoked for pages that actually need OCR; a fully
  digital PDF extracts without it.
"#;

/// Extract PDF files to Markdown with OCR fallback and embedded images.
#[derive(Parser, Debug)]
#[command(
    name = "pdfmd",
    version,
    about = "Extract PDF files to Markdown with OCR fallback and embedded images",
    long_about = "Extract PDF documents to Markdown. Pages with a usable text layer are \
extracted directly; scanned or extraction-hostile pages fall back to OCR via tesseract. \
Embedded images are saved to disk and linked inline.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local PDF file path.
    input: String,

    /// Write Markdown to this file instead of stdout.
    #[arg(short, long, env = "PDFMD_OUTPUT")]
    output: Option<PathBuf>,

    /// Directory for extracted embedded images.
    #[arg(long, env = "PDFMD_IMAGES_DIR", default_value = "pdfmd_images")]
    images_dir: PathBuf,

    /// URL prefix used in Markdown image links.
    #[arg(long, env = "PDFMD_IMAGE_URL_PREFIX", default_value = "images")]
    image_url_prefix: String,

    /// Force OCR on every page regardless of the text layer.
    #[arg(long, env = "PDFMD_FORCE_OCR")]
    force_ocr: bool,

    /// Force OCR on specific pages: 5 or 1,3,7 (1-indexed).
    #[arg(long, env = "PDFMD_OCR_PAGES")]
    ocr_pages: Option<String>,

    /// OCR rasterisation DPI (72–600).
    #[arg(long, env = "PDFMD_OCR_DPI", default_value_t = 300,
          value_parser = clap::value_parser!(u32).range(72..=600))]
    ocr_dpi: u32,

    /// Tesseract language code (eng, deu, fra, ...).
    #[arg(long, env = "PDFMD_LANG", default_value = "eng")]
    lang: String,

    /// Path to the tesseract binary.
    #[arg(long, env = "PDFMD_TESSERACT", default_value = "tesseract")]
    tesseract_cmd: PathBuf,

    /// PDF user password for encrypted documents.
    #[arg(long, env = "PDFMD_PASSWORD")]
    password: Option<String>,

    /// Output structured JSON (ExtractOutput) instead of Markdown.
    #[arg(long, env = "PDFMD_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "PDFMD_NO_PROGRESS")]
    no_progress: bool,

    /// Print PDF metadata only, no extraction.
    #[arg(long)]
    inspect_only: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDFMD_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PDFMD_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs when the progress bar is active;
    // the bar provides all the feedback that matters to the user.
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

    // ── Inspect-only mode ────────────────────────────────────────────────
    if cli.inspect_only {
        let meta = inspect(&cli.input).await.context("Failed to inspect PDF")?;

        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&meta).context("Failed to serialise metadata")?
            );
        } else {
            println!("File:         {}", cli.input);
            if let Some(ref t) = meta.title {
                println!("Title:        {}", t);
            }
            if let Some(ref a) = meta.author {
                println!("Author:       {}", a);
            }
            if let Some(ref s) = meta.subject {
                println!("Subject:      {}", s);
            }
            println!("Pages:        {}", meta.page_count);
            println!("PDF Version:  {}", meta.pdf_version);
            if let Some(ref p) = meta.producer {
                println!("Producer:     {}", p);
            }
            if let Some(ref c) = meta.creator {
                println!("Creator:      {}", c);
            }
            if let Some(ref d) = meta.creation_date {
                println!("Created:      {}", d);
            }
        }
        return Ok(());
    }

    // ── Build config ─────────────────────────────────────────────────────
    // The progress bar is initialised with a spinner (no page count yet);
    // `on_extract_start` resizes it to the correct total once the PDF has
    // been opened.

    let progress_cb: Option<ProgressCallback> = if show_progress {
        let cb = CliProgressCallback::new_dynamic();
        Some(cb as Arc<dyn ExtractProgressCallback>)
    } else {
        None
    };

    let config = build_config(&cli, progress_cb)?;

    // ── Run extraction ───────────────────────────────────────────────────
    if let Some(ref output_path) = cli.output {
        let stats = extract_to_file(&cli.input, output_path, &config)
            .await
            .context("Extraction failed")?;

        // Summary line (callback already printed the per-page log).
        if !cli.quiet {
            eprintln!(
                "{}  {} pages  {}ms  →  {}",
                if stats.notes == 0 {
                    green("✔")
                } else {
                    cyan("⚠")
                },
                stats.total_pages,
                stats.total_duration_ms,
                bold(&output_path.display().to_string()),
            );
            if stats.notes > 0 {
                eprintln!(
                    "   {} (inline notes mark degraded pages)",
                    yellow(&format!("{} extraction notes", stats.notes))
                );
            }
        }
    } else {
        let output = extract(&cli.input, &config)
            .await
            .context("Extraction failed")?;

        if cli.json {
            let json =
                serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
            println!("{json}");
        } else {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            handle
                .write_all(output.markdown.as_bytes())
                .context("Failed to write to stdout")?;
            // Ensure a trailing newline on stdout.
            if !output.markdown.ends_with('\n') {
                handle.write_all(b"\n").ok();
            }
        }

        // Summary (the callback already printed the final green tick).
        if !cli.quiet && !show_progress && !cli.json {
            eprintln!(
                "Extracted {} pages in {}ms ({} via OCR, {} images, {} notes)",
                output.stats.total_pages,
                output.stats.total_duration_ms,
                output.stats.ocr_pages,
                output.stats.images_extracted,
                output.stats.notes,
            );
        }
    }

    Ok(())
}

/// Map CLI args to `ExtractConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ExtractConfig> {
    let mut builder = ExtractConfig::builder()
        .image_dir(&cli.images_dir)
        .image_url_prefix(&cli.image_url_prefix)
        .force_ocr_all(cli.force_ocr)
        .ocr_dpi(cli.ocr_dpi)
        .ocr_language(&cli.lang)
        .tesseract_cmd(&cli.tesseract_cmd);

    if let Some(ref pages) = cli.ocr_pages {
        builder = builder.force_ocr_pages(parse_ocr_pages(pages)?);
    }
    if let Some(ref password) = cli.password {
        builder = builder.password(password);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

/// Parse `--ocr-pages` (1-indexed, comma-separated) into 0-indexed indices.
fn parse_ocr_pages(s: &str) -> Result<Vec<usize>> {
    let mut pages = Vec::new();
    for part in s.split(',') {
        let page: usize = part
            .trim()
            .parse()
            .with_context(|| format!("Invalid page number: '{}'", part.trim()))?;
        if page < 1 {
            anyhow::bail!("Pages are 1-indexed, minimum is 1 (got {})", page);
        }
        pages.push(page - 1);
    }
    Ok(pages)
}
