//! Plain-text quotes: one `body - author` pair per line.

use super::{read_bytes, Ingestor};
use crate::error::IngestError;
use crate::quote::Quote;
use std::path::Path;
use tracing::debug;

const SEPARATOR: &str = " - ";

/// Parses `.txt` files line by line.
///
/// Lines without ` - ` are skipped. A line that contains the separator but
/// does not split into a non-empty body and author is an error.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextIngestor;

impl Ingestor for TextIngestor {
    fn extension(&self) -> &str {
        ".txt"
    }

    fn parse_format(&self, path: &Path) -> Result<Vec<Quote>, IngestError> {
        let bytes = read_bytes(path)?;
        let content = String::from_utf8(bytes)
            .map_err(|e| IngestError::format(path, format!("not valid UTF-8 text: {e}")))?;
        let content = content.strip_prefix('\u{FEFF}').unwrap_or(&content);

        let quotes = parse_lines(content).map_err(|(line_no, line)| {
            IngestError::format(
                path,
                format!("line {line_no}: expected 'body - author', got {line:?}"),
            )
        })?;

        debug!("Parsed {} quotes from {}", quotes.len(), path.display());
        Ok(quotes)
    }
}

/// Split each separator-bearing line; on failure return `(line_no, line)`.
fn parse_lines(content: &str) -> Result<Vec<Quote>, (usize, String)> {
    let mut quotes = Vec::new();
    for (i, line) in content.lines().enumerate() {
        if !line.contains(SEPARATOR) {
            continue;
        }
        let trimmed = line.trim();
        match trimmed.split_once(SEPARATOR) {
            Some((body, author)) if !body.trim().is_empty() && !author.trim().is_empty() => {
                quotes.push(Quote::new(body.trim(), author.trim()));
            }
            _ => return Err((i + 1, trimmed.to_string())),
        }
    }
    Ok(quotes)
}
