//! End-to-end meme generation: fill in whatever the caller left out.
//!
//! ```text
//! MemeRequest ──▶ pick image ──▶ pick quote ──▶ MemeEngine::make_meme ──▶ path
//!                (images_dir)   (registry.scan)
//! ```
//!
//! A missing image is chosen at random from `images_dir`; a missing quote at
//! random from everything the registry can ingest under `quotes_dir`.

use crate::config::MemeConfig;
use crate::error::MemeError;
use crate::fetch::fetch_image;
use crate::ingest::IngestorRegistry;
use crate::meme::{find_images, MemeEngine};
use crate::quote::Quote;
use rand::seq::SliceRandom;
use std::path::PathBuf;
use tracing::{debug, info};

/// What to put on the meme. Every field is optional.
#[derive(Debug, Clone, Default)]
pub struct MemeRequest {
    pub image: Option<PathBuf>,
    pub body: Option<String>,
    pub author: Option<String>,
    pub width: Option<u32>,
}

/// Generate one meme from `request`, defaulting missing parts from `config`.
///
/// # Errors
/// - [`MemeError::MissingAuthor`] when `body` is set without `author`
/// - [`MemeError::NoImages`] / [`MemeError::NoQuotes`] when a random pick
///   has nothing to choose from
/// - any compositor or ingestion error
pub fn generate_meme(
    request: &MemeRequest,
    registry: &IngestorRegistry,
    config: &MemeConfig,
) -> Result<PathBuf, MemeError> {
    // Validate before touching the filesystem.
    let explicit = explicit_quote(request.body.as_deref(), request.author.as_deref())?;

    let image = match &request.image {
        Some(path) => path.clone(),
        None => random_image(config)?,
    };
    let quote = match explicit {
        Some(q) => q,
        None => random_quote(registry, config)?,
    };

    MemeEngine::new(config.clone()).make_meme(&image, quote.body(), quote.author(), request.width)
}

/// Download `url` and caption it.
///
/// The downloaded file lives until compositing has finished.
pub async fn generate_from_url(
    url: &str,
    body: &str,
    author: &str,
    config: &MemeConfig,
) -> Result<PathBuf, MemeError> {
    let quote = explicit_quote(Some(body), Some(author))?
        .ok_or_else(|| MemeError::InvalidConfig("A quote body is required with a URL".into()))?;
    let fetched = fetch_image(url, config.download_timeout_secs).await?;

    let engine = MemeEngine::new(config.clone());
    let image = fetched.path().to_path_buf();
    let result =
        tokio::task::spawn_blocking(move || engine.make_meme(&image, quote.body(), quote.author(), None))
            .await
            .map_err(|e| MemeError::Internal(format!("Compositor task panicked: {}", e)))?;

    drop(fetched);
    result
}

/// Quote supplied on the request, if any. Body without author is an error.
fn explicit_quote(body: Option<&str>, author: Option<&str>) -> Result<Option<Quote>, MemeError> {
    let body = body.map(str::trim).filter(|b| !b.is_empty());
    let author = author.map(str::trim).filter(|a| !a.is_empty());
    match (body, author) {
        (Some(b), Some(a)) => Ok(Some(Quote::new(b, a))),
        (Some(_), None) => Err(MemeError::MissingAuthor),
        (None, _) => Ok(None),
    }
}

fn random_image(config: &MemeConfig) -> Result<PathBuf, MemeError> {
    let images = find_images(&config.images_dir, &config.image_extension)?;
    let pick = images
        .choose(&mut rand::thread_rng())
        .cloned()
        .ok_or_else(|| MemeError::NoImages {
            dir: config.images_dir.clone(),
            extension: config.image_extension.clone(),
        })?;
    debug!("Picked image {} of {}", pick.display(), images.len());
    Ok(pick)
}

fn random_quote(registry: &IngestorRegistry, config: &MemeConfig) -> Result<Quote, MemeError> {
    let quotes = registry.scan(&config.quotes_dir)?;
    let pick = quotes
        .choose(&mut rand::thread_rng())
        .cloned()
        .ok_or_else(|| MemeError::NoQuotes {
            dir: config.quotes_dir.clone(),
        })?;
    info!("Picked quote {} of {}", pick, quotes.len());
    Ok(pick)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn config(root: &std::path::Path) -> MemeConfig {
        MemeConfig::builder()
            .quotes_dir(root.join("quotes"))
            .images_dir(root.join("photos"))
            .output_dir(root.join("out"))
            .build()
            .unwrap()
    }

    #[test]
    fn test_body_without_author_is_rejected() {
        let dir = TempDir::new().unwrap();
        let request = MemeRequest {
            body: Some("Woof".into()),
            ..Default::default()
        };
        let registry = IngestorRegistry::new();
        let err = generate_meme(&request, &registry, &config(dir.path())).unwrap_err();
        assert!(matches!(err, MemeError::MissingAuthor));
    }

    #[test]
    fn test_blank_author_counts_as_missing() {
        assert!(matches!(
            explicit_quote(Some("Woof"), Some("   ")),
            Err(MemeError::MissingAuthor)
        ));
        assert_eq!(explicit_quote(None, Some("Rex")).unwrap(), None);
        assert_eq!(
            explicit_quote(Some(" Woof "), Some("Rex")).unwrap(),
            Some(Quote::new("Woof", "Rex"))
        );
    }

    #[test]
    fn test_empty_images_dir_is_no_images() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("photos")).unwrap();
        fs::write(dir.path().join("photos/readme.txt"), "").unwrap();
        let request = MemeRequest {
            body: Some("Woof".into()),
            author: Some("Rex".into()),
            ..Default::default()
        };
        let err = generate_meme(&request, &IngestorRegistry::new(), &config(dir.path())).unwrap_err();
        assert!(matches!(err, MemeError::NoImages { .. }), "got {err:?}");
    }

    #[test]
    fn test_empty_quotes_dir_is_no_quotes() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("quotes")).unwrap();
        let request = MemeRequest {
            image: Some(dir.path().join("dog.jpg")),
            ..Default::default()
        };
        let registry = IngestorRegistry::with_defaults(&Default::default());
        let err = generate_meme(&request, &registry, &config(dir.path())).unwrap_err();
        assert!(matches!(err, MemeError::NoQuotes { .. }), "got {err:?}");
    }

    #[test]
    fn test_oversized_request_width_is_rejected() {
        let dir = TempDir::new().unwrap();
        let request = MemeRequest {
            image: Some(dir.path().join("dog.jpg")),
            body: Some("Woof".into()),
            author: Some("Rex".into()),
            width: Some(1_000_000),
        };
        let err = generate_meme(&request, &IngestorRegistry::new(), &config(dir.path())).unwrap_err();
        assert!(matches!(err, MemeError::InvalidConfig(_)), "got {err:?}");
    }

    #[test]
    fn test_random_quote_comes_from_scan() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("quotes")).unwrap();
        fs::write(dir.path().join("quotes/q.txt"), "Sit - Trainer\n").unwrap();
        let registry = IngestorRegistry::with_defaults(&Default::default());
        let quote = random_quote(&registry, &config(dir.path())).unwrap();
        assert_eq!(quote, Quote::new("Sit", "Trainer"));
    }

    #[test]
    fn test_broken_quote_file_propagates() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("quotes")).unwrap();
        fs::write(dir.path().join("quotes/bad.csv"), "").unwrap();
        let request = MemeRequest {
            image: Some(dir.path().join("dog.jpg")),
            ..Default::default()
        };
        let registry = IngestorRegistry::with_defaults(&Default::default());
        let err = generate_meme(&request, &registry, &config(dir.path())).unwrap_err();
        assert!(matches!(err, MemeError::Ingest(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn test_from_url_requires_caption() {
        let dir = TempDir::new().unwrap();
        let err = generate_from_url("https://example.com/a.jpg", "Hi", "", &config(dir.path()))
            .await
            .unwrap_err();
        assert!(matches!(err, MemeError::MissingAuthor));

        let err = generate_from_url("https://example.com/a.jpg", " ", "A", &config(dir.path()))
            .await
            .unwrap_err();
        assert!(matches!(err, MemeError::InvalidConfig(_)));
    }

    #[tokio::test]
    async fn test_from_url_rejects_bad_url() {
        let dir = TempDir::new().unwrap();
        let err = generate_from_url("not a url", "Hi", "A", &config(dir.path()))
            .await
            .unwrap_err();
        assert!(matches!(err, MemeError::InvalidInput { .. }));
    }
}
