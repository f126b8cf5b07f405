//! Extension-keyed ingestor registry: dispatch single files and scan directories.

use super::scan::find_files;
use super::{
    path_extension, unsupported, CsvIngestor, DocxIngestor, Ingestor, PdfIngestor, TextIngestor,
};
use crate::config::IngestConfig;
use crate::error::IngestError;
use crate::quote::Quote;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Dispatch table from file extension to ingestor.
///
/// Lifecycle: construct, populate (`register*`), [`freeze`](Self::freeze),
/// then share. Mutation needs `&mut self`, so a frozen registry behind an
/// `Arc` cannot change while scans are running.
#[derive(Default)]
pub struct IngestorRegistry {
    /// Lowercase extension (with dot) -> ingestor
    map: HashMap<String, Box<dyn Ingestor>>,
}

impl IngestorRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the four built-in ingestors.
    pub fn with_defaults(config: &IngestConfig) -> Self {
        let mut registry = Self::new();
        registry.register_defaults(config);
        registry
    }

    /// Register `ingestor` for its extension.
    ///
    /// An ingestor already registered for the same extension is replaced.
    pub fn register(&mut self, ingestor: impl Ingestor + 'static) {
        let key = ingestor.extension().to_ascii_lowercase();
        debug!("Registering ingestor for {}", key);
        self.map.insert(key, Box::new(ingestor));
    }

    /// Remove the ingestor handling `extension` (`.pdf` or `pdf`, any case).
    ///
    /// Returns the removed ingestor, or `None` if nothing was registered.
    pub fn deregister(&mut self, extension: &str) -> Option<Box<dyn Ingestor>> {
        let key = normalise_extension(extension);
        self.map.remove(&key)
    }

    /// Register `.csv`, `.docx`, `.pdf` and `.txt`. Safe to call repeatedly.
    pub fn register_defaults(&mut self, config: &IngestConfig) {
        self.register(CsvIngestor);
        self.register(DocxIngestor);
        self.register(PdfIngestor::new(config));
        self.register(TextIngestor);
    }

    /// End the mutation phase and share the registry read-only.
    pub fn freeze(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// Number of registered ingestors.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Registered extensions, sorted.
    pub fn extensions(&self) -> Vec<&str> {
        let mut exts: Vec<&str> = self.map.keys().map(|s| s.as_str()).collect();
        exts.sort_unstable();
        exts
    }

    /// The ingestor responsible for `path`, if any.
    pub fn select(&self, path: &Path) -> Option<&dyn Ingestor> {
        let ext = path_extension(path)?.to_ascii_lowercase();
        self.map.get(&ext).map(|i| &**i)
    }

    /// True iff some registered ingestor accepts `path`.
    pub fn can_ingest(&self, path: &Path) -> bool {
        self.select(path).is_some_and(|i| i.can_ingest(path))
    }

    /// Parse `path` with the ingestor registered for its extension.
    pub fn parse(&self, path: &Path) -> Result<Vec<Quote>, IngestError> {
        match self.select(path) {
            Some(ingestor) => ingestor.parse(path),
            None => Err(unsupported(path)),
        }
    }

    /// Parse every ingestible file under `dir`, concatenating in visit order.
    ///
    /// The first file that fails to parse aborts the scan.
    pub fn scan(&self, dir: &Path) -> Result<Vec<Quote>, IngestError> {
        let files = find_files(dir, |p| self.can_ingest(p))?;
        let mut quotes = Vec::new();
        for file in &files {
            quotes.extend(self.parse(file)?);
        }
        info!(
            "Scanned {}: {} quotes from {} files",
            dir.display(),
            quotes.len(),
            files.len()
        );
        Ok(quotes)
    }
}

impl std::fmt::Debug for IngestorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IngestorRegistry")
            .field("extensions", &self.extensions())
            .finish()
    }
}

fn normalise_extension(ext: &str) -> String {
    let lower = ext.to_ascii_lowercase();
    if lower.starts_with('.') {
        lower
    } else {
        format!(".{lower}")
    }
}
