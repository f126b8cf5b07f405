//! Configuration types for ingestion and meme generation.
//!
//! [`IngestConfig`] holds the knobs of the built-in ingestors (today only the
//! PDF extractor has any). [`MemeConfig`] covers everything the compositor
//! and the generate flow need, and embeds an `IngestConfig` so one value can
//! drive a whole run. Both are built through validating builders.

use crate::error::MemeError;
use std::path::PathBuf;
use std::time::Duration;

/// Largest accepted output width in pixels.
pub const MAX_WIDTH: u32 = 10_000;

/// Settings for the built-in ingestors.
#[derive(Debug, Clone)]
pub struct IngestConfig {
    /// Text-extraction command used by the PDF ingestor, looked up on `PATH`
    /// unless it is a path. Default: `pdftotext`.
    pub pdftotext: PathBuf,

    /// Upper bound for one extraction run. Default: 30 s.
    ///
    /// The child process is killed when the deadline passes.
    pub pdf_timeout: Duration,

    /// Directory for scratch files. `None` uses the system temp directory.
    pub scratch_dir: Option<PathBuf>,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            pdftotext: PathBuf::from("pdftotext"),
            pdf_timeout: Duration::from_secs(30),
            scratch_dir: None,
        }
    }
}

impl IngestConfig {
    pub fn builder() -> IngestConfigBuilder {
        IngestConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`IngestConfig`].
#[derive(Debug)]
pub struct IngestConfigBuilder {
    config: IngestConfig,
}

impl IngestConfigBuilder {
    pub fn pdftotext(mut self, program: impl Into<PathBuf>) -> Self {
        self.config.pdftotext = program.into();
        self
    }

    pub fn pdf_timeout(mut self, timeout: Duration) -> Self {
        self.config.pdf_timeout = timeout;
        self
    }

    pub fn pdf_timeout_secs(self, secs: u64) -> Self {
        self.pdf_timeout(Duration::from_secs(secs))
    }

    pub fn scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.scratch_dir = Some(dir.into());
        self
    }

    pub fn build(self) -> Result<IngestConfig, MemeError> {
        let c = &self.config;
        if c.pdftotext.as_os_str().is_empty() {
            return Err(MemeError::InvalidConfig(
                "pdftotext program must not be empty".into(),
            ));
        }
        if c.pdf_timeout.is_zero() {
            return Err(MemeError::InvalidConfig(
                "PDF extraction timeout must be > 0".into(),
            ));
        }
        Ok(self.config)
    }
}

/// Configuration for the compositor and the generate flow.
///
/// # Example
/// ```rust
/// use memegen::MemeConfig;
///
/// let config = MemeConfig::builder()
///     .width(640)
///     .font_size(24.0)
///     .output_dir("/tmp/memes")
///     .build()
///     .unwrap();
/// assert_eq!(config.width, 640);
/// ```
#[derive(Debug, Clone)]
pub struct MemeConfig {
    /// Directory that receives generated memes. Created on demand.
    pub output_dir: PathBuf,

    /// Directory scanned for quote files when no body is given.
    pub quotes_dir: PathBuf,

    /// Directory searched for images when no image is given.
    pub images_dir: PathBuf,

    /// Extension of candidate images in `images_dir`. Default: `.jpg`.
    pub image_extension: String,

    /// TrueType/OpenType font used for the caption.
    pub font_path: PathBuf,

    /// Caption size in pixels. Default: 20.
    pub font_size: f32,

    /// Output width in pixels; height keeps the source aspect ratio. Default: 500.
    pub width: u32,

    /// Minimum gap between the caption and the image border. Default: 10.
    pub text_margin: u32,

    /// Timeout for image downloads in seconds. Default: 30.
    pub download_timeout_secs: u64,

    /// Settings passed to the built-in ingestors.
    pub ingest: IngestConfig,
}

impl Default for MemeConfig {
    fn default() -> Self {
        Self {
            output_dir: std::env::temp_dir().join("memegen"),
            quotes_dir: PathBuf::from("_data/DogQuotes"),
            images_dir: PathBuf::from("_data/photos/dog"),
            image_extension: ".jpg".to_string(),
            font_path: PathBuf::from("_data/fonts/FreeSans.ttf"),
            font_size: 20.0,
            width: 500,
            text_margin: 10,
            download_timeout_secs: 30,
            ingest: IngestConfig::default(),
        }
    }
}

impl MemeConfig {
    pub fn builder() -> MemeConfigBuilder {
        MemeConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`MemeConfig`].
#[derive(Debug)]
pub struct MemeConfigBuilder {
    config: MemeConfig,
}

impl MemeConfigBuilder {
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = dir.into();
        self
    }

    pub fn quotes_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.quotes_dir = dir.into();
        self
    }

    pub fn images_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.images_dir = dir.into();
        self
    }

    pub fn image_extension(mut self, ext: impl Into<String>) -> Self {
        self.config.image_extension = ext.into();
        self
    }

    pub fn font_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.font_path = path.into();
        self
    }

    pub fn font_size(mut self, px: f32) -> Self {
        self.config.font_size = px;
        self
    }

    pub fn width(mut self, px: u32) -> Self {
        self.config.width = px;
        self
    }

    pub fn text_margin(mut self, px: u32) -> Self {
        self.config.text_margin = px;
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn ingest(mut self, ingest: IngestConfig) -> Self {
        self.config.ingest = ingest;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<MemeConfig, MemeError> {
        let c = &self.config;
        check_width(c.width)?;
        if !c.font_size.is_finite() || c.font_size <= 0.0 {
            return Err(MemeError::InvalidConfig(format!(
                "Font size must be a positive number, got {}",
                c.font_size
            )));
        }
        if !c.image_extension.starts_with('.') || c.image_extension.len() < 2 {
            return Err(MemeError::InvalidConfig(format!(
                "Image extension must look like '.jpg', got {:?}",
                c.image_extension
            )));
        }
        if c.download_timeout_secs == 0 {
            return Err(MemeError::InvalidConfig(
                "Download timeout must be ≥ 1 s".into(),
            ));
        }
        Ok(self.config)
    }
}

/// Reject output widths outside `1..=MAX_WIDTH`.
pub(crate) fn check_width(width: u32) -> Result<(), MemeError> {
    if width == 0 || width > MAX_WIDTH {
        return Err(MemeError::InvalidConfig(format!(
            "Width must be 1–{MAX_WIDTH} px, got {width}"
        )));
    }
    Ok(())
}
