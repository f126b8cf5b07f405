//! Error types for the memegen library.
//!
//! Two error types follow the two halves of the crate:
//!
//! * [`IngestError`] — raised while turning a file (or a directory of files)
//!   into [`crate::Quote`]s. Every variant carries the offending path so a
//!   failure deep inside a recursive scan can still be traced to one file.
//!
//! * [`MemeError`] — raised by the compositor, the generate flow and the
//!   image fetcher. Ingestion failures bubble up through
//!   [`MemeError::Ingest`] unchanged.
//!
//! Nothing in the library swallows or retries an error; callers decide how to
//! render them.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// All errors returned by the ingestion subsystem.
#[derive(Debug, Error)]
pub enum IngestError {
    /// The file, directory or external tool does not exist.
    #[error("Not found: '{path}'")]
    NotFound { path: PathBuf },

    /// The file exists but could not be read.
    #[error("Failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The content does not have the structure its format requires.
    #[error("Malformed content in '{path}': {detail}")]
    Format { path: PathBuf, detail: String },

    /// No ingestor accepts this file, or the file is not a valid instance
    /// of the format its extension claims.
    #[error("Cannot ingest '{path}': {reason}")]
    InvalidFormat { path: PathBuf, reason: String },

    /// An external extraction tool failed.
    #[error("Failed to process '{path}': {detail}")]
    Processing { path: PathBuf, detail: String },
}

impl IngestError {
    /// Map an I/O error for `path`, promoting `NotFound` to its own variant.
    pub fn from_io(path: &Path, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            IngestError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            IngestError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    }

    pub(crate) fn format(path: &Path, detail: impl Into<String>) -> Self {
        IngestError::Format {
            path: path.to_path_buf(),
            detail: detail.into(),
        }
    }

    pub(crate) fn invalid(path: &Path, reason: impl Into<String>) -> Self {
        IngestError::InvalidFormat {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }

    /// The path the error refers to.
    pub fn path(&self) -> &Path {
        match self {
            IngestError::NotFound { path }
            | IngestError::Io { path, .. }
            | IngestError::Format { path, .. }
            | IngestError::InvalidFormat { path, .. }
            | IngestError::Processing { path, .. } => path,
        }
    }
}

/// Errors returned by the compositor, the generate flow and the fetcher.
#[derive(Debug, Error)]
pub enum MemeError {
    // ── Image errors ──────────────────────────────────────────────────────
    /// The source image does not exist.
    #[error("The image file '{path}' does not exist.")]
    ImageNotFound { path: PathBuf },

    /// The source image exists but could not be decoded.
    #[error("'{path}' is not a valid image: {detail}")]
    InvalidImage { path: PathBuf, detail: String },

    /// The configured font could not be read or parsed.
    #[error("Failed to load font '{path}': {detail}\nSet --font or MEME_FONT to a .ttf/.otf file.")]
    FontLoad { path: PathBuf, detail: String },

    /// The generated meme could not be written.
    #[error("Failed to write meme '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Request errors ────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A quote body was supplied without an author.
    #[error("Author required if body is specified")]
    MissingAuthor,

    /// The quote directory yielded no quotes to choose from.
    #[error("No quotes found under '{dir}'")]
    NoQuotes { dir: PathBuf },

    /// The image directory yielded no images to choose from.
    #[error("No '{extension}' images found under '{dir}'")]
    NoImages { dir: PathBuf, extension: String },

    // ── Fetch errors ──────────────────────────────────────────────────────
    /// The input string is not an HTTP/HTTPS URL.
    #[error("Invalid input '{input}': not a valid HTTP/HTTPS URL")]
    InvalidInput { input: String },

    /// Download failed (network error or non-success status).
    #[error("Failed to download '{url}': {reason}")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'")]
    DownloadTimeout { url: String, secs: u64 },

    /// The server did not answer with an image content type.
    #[error("Unsupported content type {content_type:?} for '{url}': please use an image URL")]
    UnsupportedContentType { url: String, content_type: String },

    // ── Wrapped ───────────────────────────────────────────────────────────
    /// Quote ingestion failed.
    #[error(transparent)]
    Ingest(#[from] IngestError),

    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_is_promoted() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let e = IngestError::from_io(Path::new("quotes.txt"), io);
        assert!(matches!(e, IngestError::NotFound { .. }));
        assert_eq!(e.path(), Path::new("quotes.txt"));
    }

    #[test]
    fn other_io_errors_keep_source() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "nope");
        let e = IngestError::from_io(Path::new("quotes.csv"), io);
        assert!(matches!(e, IngestError::Io { .. }));
        assert!(std::error::Error::source(&e).is_some());
        assert!(e.to_string().contains("quotes.csv"));
    }

    #[test]
    fn invalid_format_display_names_path() {
        let e = IngestError::invalid(Path::new("notes.rtf"), "unsupported extension '.rtf'");
        let msg = e.to_string();
        assert!(msg.contains("notes.rtf"), "got: {msg}");
        assert!(msg.contains(".rtf'"), "got: {msg}");
    }

    #[test]
    fn ingest_error_is_transparent_inside_meme_error() {
        let inner = IngestError::format(Path::new("q.csv"), "empty data");
        let expected = inner.to_string();
        let e: MemeError = inner.into();
        assert_eq!(e.to_string(), expected);
    }
}
