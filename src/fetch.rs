//! Remote images: download a URL into a temporary directory.
//!
//! ## Why a TempDir?
//!
//! The compositor opens images by path. Downloading into a `TempDir` gives it
//! a real file and guarantees cleanup when [`FetchedImage`] is dropped, even
//! if compositing fails or panics.
//!
//! ## Why trust Content-Type over the URL?
//!
//! Image URLs often have no extension (`/photo?id=42`) or a misleading one.
//! The server's declared type decides the file extension, which is what
//! `image` uses as a format hint when decoding.

use crate::error::MemeError;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;
use tracing::{debug, info};

/// A downloaded image. The file is deleted when this value is dropped.
#[derive(Debug)]
pub struct FetchedImage {
    path: PathBuf,
    _temp_dir: TempDir,
}

impl FetchedImage {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Check if the input string looks like a URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Download `url` and keep it on disk for the lifetime of the result.
///
/// # Errors
/// - [`MemeError::InvalidInput`] for anything but `http://` / `https://`
/// - [`MemeError::DownloadTimeout`] when `timeout_secs` elapses
/// - [`MemeError::DownloadFailed`] for network errors and non-2xx statuses
/// - [`MemeError::UnsupportedContentType`] when the response is not an image
pub async fn fetch_image(url: &str, timeout_secs: u64) -> Result<FetchedImage, MemeError> {
    if !is_url(url) || reqwest::Url::parse(url).is_err() {
        return Err(MemeError::InvalidInput {
            input: url.to_string(),
        });
    }
    info!("Downloading image from: {}", url);

    let failed = |reason: String| MemeError::DownloadFailed {
        url: url.to_string(),
        reason,
    };
    let classify = |e: reqwest::Error| {
        if e.is_timeout() {
            MemeError::DownloadTimeout {
                url: url.to_string(),
                secs: timeout_secs,
            }
        } else {
            failed(e.to_string())
        }
    };

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| failed(e.to_string()))?;

    let response = client.get(url).send().await.map_err(classify)?;
    if !response.status().is_success() {
        return Err(failed(format!("HTTP {}", response.status())));
    }

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let extension = extension_for_content_type(&content_type).ok_or_else(|| {
        MemeError::UnsupportedContentType {
            url: url.to_string(),
            content_type: content_type.clone(),
        }
    })?;

    let bytes = response.bytes().await.map_err(classify)?;
    debug!("Received {} bytes of {}", bytes.len(), content_type);

    let temp_dir = TempDir::new().map_err(|e| MemeError::Internal(e.to_string()))?;
    let path = temp_dir.path().join(format!("download.{extension}"));
    tokio::fs::write(&path, &bytes)
        .await
        .map_err(|e| MemeError::Internal(format!("Failed to write temp file: {}", e)))?;

    info!("Downloaded to: {}", path.display());
    Ok(FetchedImage {
        path,
        _temp_dir: temp_dir,
    })
}

/// File extension for an `image/*` content type, ignoring parameters.
///
/// JPEG is reported as `jpg`. Returns `None` for non-image or unknown types.
pub fn extension_for_content_type(content_type: &str) -> Option<String> {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    if !essence.starts_with("image/") {
        return None;
    }
    let exts = mime_guess::get_mime_extensions_str(&essence)?;
    if exts.contains(&"jpg") {
        return Some("jpg".to_string());
    }
    exts.first().map(|e| e.to_string())
}
