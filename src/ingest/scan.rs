//! Recursive file discovery shared by quote scanning and image lookup.

use crate::error::IngestError;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// All regular files under `root` accepted by `keep`, in visitation order.
///
/// Entries are visited depth-first with siblings sorted by file name, so the
/// order is stable across runs and platforms. A missing `root` is
/// `NotFound`; a `root` that is a plain file yields nothing.
pub fn find_files<F>(root: &Path, mut keep: F) -> Result<Vec<PathBuf>, IngestError>
where
    F: FnMut(&Path) -> bool,
{
    if !root.exists() {
        return Err(IngestError::NotFound {
            path: root.to_path_buf(),
        });
    }
    if !root.is_dir() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root).follow_links(true).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(root).to_path_buf();
            match e.into_io_error() {
                Some(source) => IngestError::from_io(&path, source),
                None => IngestError::Io {
                    path,
                    source: std::io::Error::other("filesystem loop detected"),
                },
            }
        })?;
        if entry.file_type().is_file() && keep(entry.path()) {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}
