//! Word documents: quote lines found inside `word/document.xml` paragraphs.
//!
//! A `.docx` file is a ZIP container. Only the main document part is read;
//! headers, footers and comments are ignored. Paragraph text is rebuilt from
//! `<w:t>` runs, with `<w:tab/>` as `\t` and `<w:br/>`/`<w:cr/>` as `\n`, and
//! then scanned with the shared quote-line pattern.

use super::{extract_quotes, Ingestor};
use crate::error::IngestError;
use crate::quote::Quote;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;

const DOCUMENT_PART: &str = "word/document.xml";

/// Parses `.docx` files. A document without any quote is an error.
#[derive(Debug, Default, Clone, Copy)]
pub struct DocxIngestor;

impl Ingestor for DocxIngestor {
    fn extension(&self) -> &str {
        ".docx"
    }

    fn parse_format(&self, path: &Path) -> Result<Vec<Quote>, IngestError> {
        let corrupt = || {
            IngestError::invalid(
                path,
                "could not be opened; it may be corrupt or not a .docx file",
            )
        };

        let file = File::open(path).map_err(|e| IngestError::from_io(path, e))?;
        let mut archive = zip::ZipArchive::new(file).map_err(|_| corrupt())?;
        let mut xml = String::new();
        archive
            .by_name(DOCUMENT_PART)
            .map_err(|_| corrupt())?
            .read_to_string(&mut xml)
            .map_err(|_| corrupt())?;

        let paragraphs = paragraphs(&xml).map_err(|e| {
            IngestError::invalid(path, format!("malformed {DOCUMENT_PART}: {e}"))
        })?;
        let quotes: Vec<Quote> = paragraphs.iter().flat_map(|p| extract_quotes(p)).collect();

        if quotes.is_empty() {
            return Err(IngestError::invalid(
                path,
                "no quotes found; expected paragraphs like \"body\" - author",
            ));
        }

        debug!(
            "Parsed {} quotes from {} paragraphs in {}",
            quotes.len(),
            paragraphs.len(),
            path.display()
        );
        Ok(quotes)
    }
}

/// Text of every `<w:p>` paragraph, in document order.
fn paragraphs(xml: &str) -> Result<Vec<String>, quick_xml::Error> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);

    let mut out = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut in_text = false;
    // Tab stops inside <w:pPr> are layout, not text.
    let mut in_props = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"p" => {
                    if depth == 0 {
                        current.clear();
                    }
                    depth += 1;
                }
                b"t" => in_text = true,
                b"pPr" => in_props = true,
                _ => {}
            },
            Event::Empty(e) => match e.local_name().as_ref() {
                b"tab" if depth > 0 && !in_props => current.push('\t'),
                b"br" | b"cr" if depth > 0 => current.push('\n'),
                b"p" if depth == 0 => out.push(String::new()),
                _ => {}
            },
            Event::Text(e) if in_text => current.push_str(&e.unescape()?),
            Event::CData(e) if in_text => current.push_str(&String::from_utf8_lossy(&e)),
            Event::End(e) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"pPr" => in_props = false,
                b"p" => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        out.push(std::mem::take(&mut current));
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;
    use zip::write::SimpleFileOptions;

    fn document_xml(body: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{body}</w:body></w:document>"#
        )
    }

    fn write_docx(dir: &TempDir, name: &str, xml: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let file = File::create(&path).unwrap();
        let mut zip = zip::ZipWriter::new(file);
        zip.start_file(DOCUMENT_PART, SimpleFileOptions::default())
            .unwrap();
        zip.write_all(xml.as_bytes()).unwrap();
        zip.finish().unwrap();
        path
    }

    #[test]
    fn test_paragraph_text_joins_runs() {
        let xml = document_xml(
            r#"<w:p><w:r><w:t>"Be </w:t></w:r><w:r><w:t xml:space="preserve">yourself." - </w:t></w:r><w:r><w:t>Oscar Wilde</w:t></w:r></w:p><w:p/>"#,
        );
        let paras = paragraphs(&xml).unwrap();
        assert_eq!(paras, vec!["\"Be yourself.\" - Oscar Wilde".to_string(), String::new()]);
    }

    #[test]
    fn test_breaks_and_tabs() {
        let xml = document_xml(r#"<w:p><w:pPr><w:tabs><w:tab w:val="left" w:pos="720"/></w:tabs></w:pPr><w:r><w:t>a</w:t><w:tab/><w:t>b</w:t><w:br/><w:t>c</w:t></w:r></w:p>"#);
        assert_eq!(paragraphs(&xml).unwrap(), vec!["a\tb\nc".to_string()]);
    }

    #[test]
    fn test_escaped_quotes_are_decoded() {
        let xml = document_xml(r#"<w:p><w:r><w:t>&quot;Sit &amp; stay&quot; - Trainer</w:t></w:r></w:p>"#);
        let dir = TempDir::new().unwrap();
        let path = write_docx(&dir, "esc.docx", &xml);
        let quotes = DocxIngestor.parse(&path).unwrap();
        assert_eq!(quotes, vec![Quote::new("Sit & stay", "Trainer")]);
    }

    #[test]
    fn test_multiple_quotes_in_one_paragraph() {
        let xml = document_xml(
            r#"<w:p><w:r><w:t>"One" - A</w:t><w:br/><w:t>"Two" - B</w:t></w:r></w:p><w:p><w:r><w:t>"Three" - C</w:t></w:r></w:p>"#,
        );
        let dir = TempDir::new().unwrap();
        let path = write_docx(&dir, "multi.docx", &xml);
        let quotes = DocxIngestor.parse(&path).unwrap();
        let authors: Vec<&str> = quotes.iter().map(|q| q.author()).collect();
        assert_eq!(authors, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_no_quotes_is_invalid_format() {
        let xml = document_xml(r#"<w:p><w:r><w:t>Just prose.</w:t></w:r></w:p>"#);
        let dir = TempDir::new().unwrap();
        let path = write_docx(&dir, "prose.docx", &xml);
        match DocxIngestor.parse(&path).unwrap_err() {
            IngestError::InvalidFormat { reason, .. } => assert!(reason.contains("no quotes")),
            other => panic!("expected InvalidFormat, got {other:?}"),
        }
    }

    #[test]
    fn test_corrupt_container_is_invalid_format() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.docx");
        std::fs::write(&path, b"definitely not a zip").unwrap();
        let err = DocxIngestor.parse(&path).unwrap_err();
        assert!(matches!(err, IngestError::InvalidFormat { .. }));
        assert!(err.to_string().contains("broken.docx"));
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let dir = TempDir::new().unwrap();
        let err = DocxIngestor.parse(&dir.path().join("gone.docx")).unwrap_err();
        assert!(matches!(err, IngestError::NotFound { .. }));
    }
}
