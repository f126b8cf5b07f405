//! # memegen
//!
//! Ingest quotes from text, CSV, Word and PDF files, and stamp them onto
//! images as captioned memes.
//!
//! ## Pipeline Overview
//!
//! ```text
//! quotes dir ─┐
//!             ├─ 1. Scan     walk the directory, sorted by file name
//!             ├─ 2. Ingest   pick an ingestor by extension (.txt .csv .docx .pdf)
//!             └─ 3. Quotes   Vec<Quote> (body, author)
//!
//! image ──────┬─ 4. Fetch    optional: download a URL into a temp dir
//!             ├─ 5. Resize   to the requested width, aspect preserved
//!             ├─ 6. Caption  "body" - author in white at a random spot
//!             └─ 7. Output   meme-*.jpg in the output directory
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use memegen::{generate_meme, IngestorRegistry, MemeConfig, MemeRequest};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = MemeConfig::builder()
//!         .quotes_dir("_data/DogQuotes")
//!         .images_dir("_data/photos/dog")
//!         .build()?;
//!     let registry = IngestorRegistry::with_defaults(&config.ingest).freeze();
//!
//!     // Random image, random quote.
//!     let path = generate_meme(&MemeRequest::default(), &registry, &config)?;
//!     println!("{}", path.display());
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `meme` binary (clap + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! memegen = { version = "0.3", default-features = false }
//! ```
//!
//! ## External Tools
//!
//! PDF ingestion shells out to `pdftotext` from poppler-utils. Without it,
//! parsing a `.pdf` fails with [`IngestError::NotFound`] naming the tool;
//! the other formats are pure Rust.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod fetch;
pub mod generate;
pub mod ingest;
pub mod meme;
pub mod quote;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{IngestConfig, IngestConfigBuilder, MemeConfig, MemeConfigBuilder};
pub use error::{IngestError, MemeError};
pub use fetch::{fetch_image, FetchedImage};
pub use generate::{generate_from_url, generate_meme, MemeRequest};
pub use ingest::{
    CsvIngestor, DocxIngestor, Ingestor, IngestorRegistry, PdfIngestor, TextIngestor,
};
pub use meme::{find_images, MemeEngine};
pub use quote::Quote;
