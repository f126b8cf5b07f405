//! Tabular quotes: a header row with `body` and `author` columns.

use super::{read_bytes, Ingestor};
use crate::error::IngestError;
use crate::quote::Quote;
use ::csv::{ReaderBuilder, StringRecord, Trim};
use std::path::Path;
use tracing::debug;

const REQUIRED_COLUMNS: [&str; 2] = ["body", "author"];

/// Parses `.csv` files; one quote per data row, in row order.
#[derive(Debug, Default, Clone, Copy)]
pub struct CsvIngestor;

impl Ingestor for CsvIngestor {
    fn extension(&self) -> &str {
        ".csv"
    }

    fn parse_format(&self, path: &Path) -> Result<Vec<Quote>, IngestError> {
        let bytes = read_bytes(path)?;
        let data = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(&bytes);

        let mut reader = ReaderBuilder::new().trim(Trim::All).from_reader(data);
        let headers = reader
            .headers()
            .map_err(|e| IngestError::format(path, format!("unreadable header row: {e}")))?
            .clone();
        if headers.is_empty() {
            return Err(IngestError::format(path, "empty data"));
        }
        let (body_idx, author_idx) = column_indices(&headers)
            .map_err(|missing| {
                IngestError::format(
                    path,
                    format!("missing required column(s): {}", missing.join(", ")),
                )
            })?;

        let mut quotes = Vec::new();
        for result in reader.records() {
            let record = result.map_err(|e| {
                let line = e.position().map(|p| p.line()).unwrap_or(0);
                IngestError::format(path, format!("line {line}: {e}"))
            })?;
            let line = record.position().map(|p| p.line()).unwrap_or(0);
            let body = record.get(body_idx).unwrap_or_default();
            let author = record.get(author_idx).unwrap_or_default();
            if body.is_empty() || author.is_empty() {
                return Err(IngestError::format(
                    path,
                    format!("line {line}: both 'body' and 'author' must be non-empty"),
                ));
            }
            quotes.push(Quote::new(body, author));
        }

        debug!("Parsed {} quotes from {}", quotes.len(), path.display());
        Ok(quotes)
    }
}

/// Locate `body` and `author`, or name every column that is missing.
fn column_indices(headers: &StringRecord) -> Result<(usize, usize), Vec<&'static str>> {
    let find = |name: &str| headers.iter().position(|h| h.eq_ignore_ascii_case(name));
    let found: Vec<Option<usize>> = REQUIRED_COLUMNS.iter().map(|c| find(*c)).collect();
    match (found[0], found[1]) {
        (Some(b), Some(a)) => Ok((b, a)),
        _ => Err(REQUIRED_COLUMNS
            .iter()
            .zip(&found)
            .filter(|(_, idx)| idx.is_none())
            .map(|(name, _)| *name)
            .collect()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn parse(content: &str) -> Result<Vec<Quote>, IngestError> {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("quotes.csv");
        fs::write(&path, content).unwrap();
        CsvIngestor.parse(&path)
    }

    #[test]
    fn test_single_row() {
        let quotes = parse("body,author\nHi,A\n").unwrap();
        assert_eq!(quotes, vec![Quote::new("Hi", "A")]);
    }

    #[test]
    fn test_preserves_row_order_and_ignores_extra_columns() {
        let quotes = parse(
            "id,author,body\n1,Rex,\"Woof, woof\"\n2,Fido,Fetch\n3,Bella,\"Nap \"\"now\"\"\"\n",
        )
        .unwrap();
        let bodies: Vec<&str> = quotes.iter().map(|q| q.body()).collect();
        assert_eq!(bodies, vec!["Woof, woof", "Fetch", "Nap \"now\""]);
        assert_eq!(quotes[2].author(), "Bella");
    }

    #[test]
    fn test_missing_author_column_is_named() {
        let err = parse("body,speaker\nHi,A\n").unwrap_err();
        match err {
            IngestError::Format { detail, .. } => {
                assert!(detail.contains("author"), "got: {detail}");
                assert!(!detail.contains("body"), "got: {detail}");
            }
            other => panic!("expected Format, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_both_columns_lists_both() {
        let err = parse("a,b\n1,2\n").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("body, author"), "got: {msg}");
    }

    #[test]
    fn test_empty_file() {
        let err = parse("").unwrap_err();
        match err {
            IngestError::Format { detail, .. } => assert_eq!(detail, "empty data"),
            other => panic!("expected Format, got {other:?}"),
        }
    }

    #[test]
    fn test_header_only_is_empty_result() {
        assert!(parse("body,author\n").unwrap().is_empty());
    }

    #[test]
    fn test_ragged_row_reports_line() {
        let err = parse("body,author\nHi,A\nonly-one-field\n").unwrap_err();
        match err {
            IngestError::Format { detail, .. } => assert!(detail.contains("line 3"), "got: {detail}"),
            other => panic!("expected Format, got {other:?}"),
        }
    }

    #[test]
    fn test_blank_author_cell_rejected() {
        let err = parse("body,author\nHi,   \n").unwrap_err();
        assert!(matches!(err, IngestError::Format { .. }));
    }

    #[test]
    fn test_bom_before_header() {
        let quotes = parse("\u{FEFF}body,author\nHi,A\n").unwrap();
        assert_eq!(quotes.len(), 1);
    }
}
