//! PDF quotes via an external text extractor (`pdftotext` from poppler).
//!
//! ## Why a scratch file?
//!
//! `pdftotext <in> <out>` writes its result to a path. The output path is a
//! [`tempfile::NamedTempFile`] owned by [`PdfIngestor::parse_format`], so the
//! file is deleted when the guard drops: after success, after a failed or
//! timed-out extraction, and during unwinding.

use super::{extract_quotes, Ingestor};
use crate::config::IngestConfig;
use crate::error::IngestError;
use crate::quote::Quote;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

/// Interval between exit checks while the extractor runs.
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Parses `.pdf` files by shelling out to a text extractor.
#[derive(Debug, Clone)]
pub struct PdfIngestor {
    program: PathBuf,
    timeout: Duration,
    scratch_dir: Option<PathBuf>,
}

impl PdfIngestor {
    pub fn new(config: &IngestConfig) -> Self {
        Self {
            program: config.pdftotext.clone(),
            timeout: config.pdf_timeout,
            scratch_dir: config.scratch_dir.clone(),
        }
    }

    /// Locate the extractor on `PATH` (or validate an explicit path).
    fn resolve_program(&self) -> Result<PathBuf, IngestError> {
        which::which(&self.program).map_err(|e| {
            debug!("{} not usable: {}", self.program.display(), e);
            IngestError::NotFound {
                path: self.program.clone(),
            }
        })
    }

    fn scratch_file(&self) -> std::io::Result<NamedTempFile> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("quotes-").suffix(".txt");
        match &self.scratch_dir {
            Some(dir) => builder.tempfile_in(dir),
            None => builder.tempfile(),
        }
    }

    /// Run the extractor to completion or until the timeout expires.
    fn extract(&self, program: &Path, input: &Path, output: &Path) -> Result<(), IngestError> {
        let child = Command::new(program)
            .arg(input)
            .arg(output)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| IngestError::from_io(program, e))?;

        let status = wait_with_deadline(child, self.timeout).map_err(|e| match e {
            WaitError::TimedOut => IngestError::Processing {
                path: input.to_path_buf(),
                detail: format!(
                    "{} did not finish within {}s",
                    program.display(),
                    self.timeout.as_secs_f32()
                ),
            },
            WaitError::Io(source) => IngestError::Io {
                path: input.to_path_buf(),
                source,
            },
        })?;

        if !status.success() {
            return Err(IngestError::Processing {
                path: input.to_path_buf(),
                detail: format!("failed to convert PDF file ({status})"),
            });
        }
        Ok(())
    }
}

impl Default for PdfIngestor {
    fn default() -> Self {
        Self::new(&IngestConfig::default())
    }
}

impl Ingestor for PdfIngestor {
    fn extension(&self) -> &str {
        ".pdf"
    }

    fn parse_format(&self, path: &Path) -> Result<Vec<Quote>, IngestError> {
        std::fs::metadata(path).map_err(|e| IngestError::from_io(path, e))?;
        let program = self.resolve_program()?;
        let scratch = self
            .scratch_file()
            .map_err(|e| IngestError::from_io(self.scratch_dir.as_deref().unwrap_or(path), e))?;

        self.extract(&program, path, scratch.path())?;

        let bytes = std::fs::read(scratch.path()).map_err(|e| IngestError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let text = String::from_utf8_lossy(&bytes);
        let quotes = extract_quotes(&text);

        debug!(
            "Extracted {} bytes of text and {} quotes from {}",
            bytes.len(),
            quotes.len(),
            path.display()
        );
        Ok(quotes)
    }
}

enum WaitError {
    TimedOut,
    Io(std::io::Error),
}

/// Poll `child` until it exits; kill and reap it once `timeout` has passed.
///
/// A timeout too large to represent as an `Instant` means no deadline.
fn wait_with_deadline(mut child: Child, timeout: Duration) -> Result<ExitStatus, WaitError> {
    let deadline = Instant::now().checked_add(timeout);
    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Ok(status),
            Ok(None) if deadline.is_some_and(|d| Instant::now() >= d) => {
                warn!("Extractor pid {} timed out; killing it", child.id());
                let _ = child.kill();
                let _ = child.wait();
                return Err(WaitError::TimedOut);
            }
            Ok(None) => std::thread::sleep(POLL_INTERVAL),
            Err(e) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(WaitError::Io(e));
            }
        }
    }
}
