//! CLI binary for memegen.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `MemeConfig`, runs one generation and prints the result path.

use anyhow::{Context, Result};
use clap::Parser;
use memegen::{
    generate_from_url, generate_meme, IngestConfig, IngestorRegistry, MemeConfig, MemeRequest,
    Quote,
};
use serde::Serialize;
use std::io;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Random dog photo, random quote
  meme

  # Your own caption on a random photo
  meme --body "Stay pawsitive" --author "Rex"

  # Specific image, 800 px wide
  meme --path photos/fido.jpg --width 800 --body "Fetch" --author "Fido"

  # Caption an image from the web
  meme --url https://example.com/cat.png --body "Nope" --author "Cat"

  # List every quote the ingestors find, as JSON
  meme --list-quotes --json --quotes-dir _data/DogQuotes

SUPPORTED QUOTE FILES:
  Extension  Layout
  ─────────  ───────────────────────────────────────────────
  .txt       one "body - author" per line
  .csv       header row with body and author columns
  .docx      paragraphs like "body" - author
  .pdf       text like "body" - author (needs pdftotext)

ENVIRONMENT VARIABLES:
  MEME_QUOTES_DIR    Directory scanned for quote files
  MEME_IMAGES_DIR    Directory searched for .jpg images
  MEME_OUTPUT_DIR    Directory receiving generated memes
  MEME_FONT          TrueType/OpenType caption font
  MEME_PDFTOTEXT     pdftotext executable
  RUST_LOG           Overrides -v / -q log filtering

SETUP:
  PDF quotes need poppler-utils:  apt install poppler-utils  |  brew install poppler
"#;

/// Caption images with quotes ingested from text, CSV, Word and PDF files.
#[derive(Parser, Debug)]
#[command(
    name = "meme",
    version,
    about = "Caption images with quotes from text, CSV, Word and PDF files",
    long_about = "Generate a meme by writing a quote onto an image. Missing parts are picked \
at random: the image from --images-dir, the quote from every supported file under --quotes-dir.",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Image to caption. Default: a random image from --images-dir.
    #[arg(long, env = "MEME_PATH", conflicts_with = "url")]
    path: Option<PathBuf>,

    /// Quote body. Requires --author.
    #[arg(long, env = "MEME_BODY")]
    body: Option<String>,

    /// Quote author.
    #[arg(long, env = "MEME_AUTHOR")]
    author: Option<String>,

    /// HTTP/HTTPS image URL to caption instead of a local file.
    #[arg(long, env = "MEME_URL", requires_all = ["body", "author"])]
    url: Option<String>,

    /// Output width in pixels (aspect ratio is kept).
    #[arg(long, env = "MEME_WIDTH",
          value_parser = clap::value_parser!(u32).range(1..=10_000))]
    width: Option<u32>,

    /// Directory scanned recursively for quote files.
    #[arg(long, env = "MEME_QUOTES_DIR", default_value = "_data/DogQuotes")]
    quotes_dir: PathBuf,

    /// Directory searched recursively for images.
    #[arg(long, env = "MEME_IMAGES_DIR", default_value = "_data/photos/dog")]
    images_dir: PathBuf,

    /// Caption font (.ttf / .otf).
    #[arg(long, env = "MEME_FONT", default_value = "_data/fonts/FreeSans.ttf")]
    font: PathBuf,

    /// Caption size in pixels.
    #[arg(long, env = "MEME_FONT_SIZE", default_value_t = 20.0)]
    font_size: f32,

    /// Directory receiving generated memes. Default: <tmp>/memegen.
    #[arg(long, env = "MEME_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// pdftotext executable used for PDF quote files.
    #[arg(long, env = "MEME_PDFTOTEXT", default_value = "pdftotext")]
    pdftotext: PathBuf,

    /// PDF extraction timeout in seconds.
    #[arg(long, env = "MEME_PDF_TIMEOUT", default_value_t = 30)]
    pdf_timeout: u64,

    /// HTTP download timeout in seconds.
    #[arg(long, env = "MEME_DOWNLOAD_TIMEOUT", default_value_t = 30)]
    download_timeout: u64,

    /// Print every quote found under --quotes-dir and exit.
    #[arg(long, conflicts_with_all = ["path", "url", "body", "author"])]
    list_quotes: bool,

    /// Print results as JSON.
    #[arg(long, env = "MEME_JSON")]
    json: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "MEME_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "MEME_QUIET", conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Serialize)]
struct MemeOutput {
    path: PathBuf,
}

#[derive(Serialize)]
struct QuoteList<'a> {
    dir: &'a std::path::Path,
    count: usize,
    quotes: &'a [Quote],
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let config = build_config(&cli)?;
    let registry = IngestorRegistry::with_defaults(&config.ingest).freeze();

    // ── List mode ────────────────────────────────────────────────────────
    if cli.list_quotes {
        let dir = config.quotes_dir.clone();
        let scan_registry = registry.clone();
        let quotes = tokio::task::spawn_blocking(move || scan_registry.scan(&dir))
            .await
            .context("Quote scan task panicked")?
            .with_context(|| format!("Failed to scan {}", config.quotes_dir.display()))?;

        if cli.json {
            let list = QuoteList {
                dir: &config.quotes_dir,
                count: quotes.len(),
                quotes: &quotes,
            };
            println!(
                "{}",
                serde_json::to_string_pretty(&list).context("Failed to serialise quotes")?
            );
        } else {
            for quote in &quotes {
                println!("{quote}");
            }
            if !cli.quiet {
                eprintln!("{} {} quotes", green("✔"), bold(&quotes.len().to_string()));
            }
        }
        return Ok(());
    }

    // ── Generate ─────────────────────────────────────────────────────────
    let path = if let Some(ref url) = cli.url {
        let body = cli.body.as_deref().unwrap_or_default();
        let author = cli.author.as_deref().unwrap_or_default();
        generate_from_url(url, body, author, &config)
            .await
            .with_context(|| format!("Failed to caption {url}"))?
    } else {
        let request = MemeRequest {
            image: cli.path.clone(),
            body: cli.body.clone(),
            author: cli.author.clone(),
            width: cli.width,
        };
        tokio::task::spawn_blocking(move || generate_meme(&request, &registry, &config))
            .await
            .context("Meme generation task panicked")?
            .context("Meme generation failed")?
    };

    if cli.json {
        let json = serde_json::to_string_pretty(&MemeOutput { path })
            .context("Failed to serialise output")?;
        println!("{json}");
    } else {
        println!("{}", path.display());
    }
    Ok(())
}

/// Map CLI args to `MemeConfig`.
fn build_config(cli: &Cli) -> Result<MemeConfig> {
    let ingest = IngestConfig::builder()
        .pdftotext(&cli.pdftotext)
        .pdf_timeout_secs(cli.pdf_timeout)
        .build()
        .context("Invalid PDF settings")?;

    let mut builder = MemeConfig::builder()
        .quotes_dir(&cli.quotes_dir)
        .images_dir(&cli.images_dir)
        .font_path(&cli.font)
        .font_size(cli.font_size)
        .download_timeout_secs(cli.download_timeout)
        .ingest(ingest);

    if let Some(width) = cli.width {
        builder = builder.width(width);
    }
    if let Some(ref dir) = cli.output_dir {
        builder = builder.output_dir(dir);
    }

    builder.build().context("Invalid configuration")
}
