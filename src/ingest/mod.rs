//! Quote ingestion: one [`Ingestor`] per file format, dispatched by extension.
//!
//! ## Data Flow
//!
//! ```text
//! directory ──▶ scan ──▶ registry lookup ──▶ ingestor ──▶ Vec<Quote>
//!              (walkdir)  (by extension)     (.txt .csv .docx .pdf)
//! ```
//!
//! 1. [`scan`]     — recursive file discovery filtered by a predicate
//! 2. [`registry`] — extension → ingestor map; dispatch and directory scans
//! 3. [`text`], [`csv`], [`docx`], [`pdf`] — the built-in formats
//!
//! Every ingestor implements the same two-step contract: the provided
//! [`Ingestor::parse`] rejects paths with the wrong extension, then hands the
//! path to the format-specific [`Ingestor::parse_format`].

pub mod csv;
pub mod docx;
pub mod pdf;
pub mod registry;
pub mod scan;
pub mod text;

pub use self::csv::CsvIngestor;
pub use self::docx::DocxIngestor;
pub use self::pdf::PdfIngestor;
pub use self::registry::IngestorRegistry;
pub use self::text::TextIngestor;

use crate::error::IngestError;
use crate::quote::Quote;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

/// Capability shared by every quote file parser.
pub trait Ingestor: Send + Sync {
    /// Extension handled by this ingestor, including the dot (e.g. `.csv`).
    fn extension(&self) -> &str;

    /// Parse a file already known to carry the right extension.
    fn parse_format(&self, path: &Path) -> Result<Vec<Quote>, IngestError>;

    /// True iff `path` ends in [`Ingestor::extension`], ignoring case.
    fn can_ingest(&self, path: &Path) -> bool {
        path_extension(path).is_some_and(|ext| ext.eq_ignore_ascii_case(self.extension()))
    }

    /// Parse `path`, refusing files this ingestor does not handle.
    fn parse(&self, path: &Path) -> Result<Vec<Quote>, IngestError> {
        if !self.can_ingest(path) {
            return Err(unsupported(path));
        }
        self.parse_format(path)
    }
}

/// The dotted extension of `path` (`notes.TXT` → `.TXT`), if any.
pub fn path_extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{e}"))
}

/// `InvalidFormat` for a path whose extension nobody handles.
pub(crate) fn unsupported(path: &Path) -> IngestError {
    let reason = match path_extension(path) {
        Some(ext) => format!("unsupported extension '{ext}'"),
        None => "file has no extension".to_string(),
    };
    IngestError::invalid(path, reason)
}

// ── Quote-line micro-format ──────────────────────────────────────────────────

/// `"<body>" - <author>`; typographic quotes are accepted as delimiters.
static RE_QUOTE_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"["“]([^"“”]+)["”] - (.+)"#).unwrap());

/// Every non-overlapping quote-line match in `text`, in order.
///
/// Matches whose body or author are blank after trimming are dropped.
pub fn extract_quotes(text: &str) -> Vec<Quote> {
    RE_QUOTE_LINE
        .captures_iter(text)
        .filter_map(|caps| {
            let body = caps[1].trim();
            let author = caps[2].trim();
            (!body.is_empty() && !author.is_empty()).then(|| Quote::new(body, author))
        })
        .collect()
}

/// Read a whole file, mapping failures to `NotFound` / `Io`.
pub(crate) fn read_bytes(path: &Path) -> Result<Vec<u8>, IngestError> {
    std::fs::read(path).map_err(|e| IngestError::from_io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed;

    impl Ingestor for Fixed {
        fn extension(&self) -> &str {
            ".quote"
        }

        fn parse_format(&self, _path: &Path) -> Result<Vec<Quote>, IngestError> {
            Ok(vec![Quote::new("fixed", "test")])
        }
    }

    #[test]
    fn test_extract_single_quote() {
        let quotes = extract_quotes("\"Be yourself.\" - Oscar Wilde");
        assert_eq!(quotes, vec![Quote::new("Be yourself.", "Oscar Wilde")]);
    }

    #[test]
    fn test_extract_multiple_lines_ignores_noise() {
        let text = "Title page\n\"To bork or not to bork\" - Bork\nsome footer\n\"Chase the mailman\" - Skittle\r\n";
        let quotes = extract_quotes(text);
        assert_eq!(quotes.len(), 2);
        assert_eq!(quotes[0].author(), "Bork");
        assert_eq!(quotes[1].body(), "Chase the mailman");
        assert_eq!(quotes[1].author(), "Skittle");
    }

    #[test]
    fn test_extract_typographic_quotes() {
        let quotes = extract_quotes("“Stay hungry” - Steve");
        assert_eq!(quotes, vec![Quote::new("Stay hungry", "Steve")]);
    }

    #[test]
    fn test_extract_requires_separator() {
        assert!(extract_quotes("\"No author here\"").is_empty());
        assert!(extract_quotes("plain - text").is_empty());
    }

    #[test]
    fn test_path_extension() {
        assert_eq!(path_extension(Path::new("a/b.csv")).as_deref(), Some(".csv"));
        assert_eq!(path_extension(Path::new("x.tar.GZ")).as_deref(), Some(".GZ"));
        assert_eq!(path_extension(Path::new("Makefile")), None);
        assert_eq!(path_extension(Path::new(".bashrc")), None);
    }

    #[test]
    fn test_can_ingest_is_case_insensitive() {
        assert!(Fixed.can_ingest(Path::new("a.quote")));
        assert!(Fixed.can_ingest(Path::new("dir/A.QUOTE")));
        assert!(!Fixed.can_ingest(Path::new("a.quotes")));
        assert!(!Fixed.can_ingest(Path::new("quote")));
    }

    #[test]
    fn test_parse_rejects_foreign_extension() {
        let err = Fixed.parse(Path::new("notes.rtf")).unwrap_err();
        match err {
            IngestError::InvalidFormat { path, reason } => {
                assert_eq!(path, Path::new("notes.rtf"));
                assert!(reason.contains(".rtf"));
            }
            other => panic!("expected InvalidFormat, got {other:?}"),
        }
        assert_eq!(Fixed.parse(Path::new("ok.quote")).unwrap().len(), 1);
    }
}
