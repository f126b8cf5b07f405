//! Meme compositor: resize an image and stamp a quote caption onto it.
//!
//! ## Why draw glyphs by hand?
//!
//! `image` has no text support. `ab_glyph` turns each character into an
//! outline with per-pixel coverage, which is blended onto the canvas here.
//! The caption is a single line; a caption wider than the image is clipped.
//!
//! ## Why JPEG?
//!
//! Memes are photographs; JPEG keeps them small. JPEG has no alpha channel,
//! so the RGBA working canvas is flattened to RGB just before encoding.

use crate::config::{check_width, MemeConfig};
use crate::error::MemeError;
use crate::ingest::scan::find_files;
use ab_glyph::{point, Font, FontVec, PxScale, ScaleFont};
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, ImageReader, RgbaImage};
use rand::Rng;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Caption colour (opaque white).
const TEXT_RGB: [u8; 3] = [255, 255, 255];

/// Renders captioned images into [`MemeConfig::output_dir`].
#[derive(Debug, Clone)]
pub struct MemeEngine {
    config: MemeConfig,
}

impl MemeEngine {
    pub fn new(config: MemeConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MemeConfig {
        &self.config
    }

    /// Composite `"<body>" - <author>` onto `image_path` and save the result.
    ///
    /// The image is resized to `width` (or the configured default) keeping
    /// its aspect ratio. Returns the path of the new `meme-*.jpg`.
    pub fn make_meme(
        &self,
        image_path: &Path,
        body: &str,
        author: &str,
        width: Option<u32>,
    ) -> Result<PathBuf, MemeError> {
        let width = width.unwrap_or(self.config.width);
        check_width(width)?;

        let source = open_image(image_path)?;
        let mut canvas = resize_to_width(&source, width).to_rgba8();
        let font = load_font(&self.config.font_path)?;

        let caption = format!("\"{body}\" - {author}");
        let scale = PxScale::from(self.config.font_size);
        let margin = self.config.text_margin;
        let block = (
            measure(&font, scale, &caption).ceil() as u32,
            font.as_scaled(scale).height().ceil() as u32,
        );
        let origin = text_origin(
            (canvas.width(), canvas.height()),
            block,
            margin,
            &mut rand::thread_rng(),
        );
        debug!(
            "Caption: {}x{} px at ({}, {})",
            block.0,
            block.1,
            origin.0,
            origin.1
        );
        draw_caption(&mut canvas, &font, scale, &caption, origin);

        let out = self.write_jpeg(canvas)?;
        info!("Meme written: {}", out.display());
        Ok(out)
    }

    fn write_jpeg(&self, canvas: RgbaImage) -> Result<PathBuf, MemeError> {
        let dir = &self.config.output_dir;
        let write_err = |source: std::io::Error| MemeError::OutputWriteFailed {
            path: dir.clone(),
            source,
        };

        std::fs::create_dir_all(dir).map_err(write_err)?;
        let mut file = tempfile::Builder::new()
            .prefix("meme-")
            .suffix(".jpg")
            .tempfile_in(dir)
            .map_err(write_err)?;

        let rgb = DynamicImage::ImageRgba8(canvas).to_rgb8();
        {
            let mut writer = BufWriter::new(file.as_file_mut());
            rgb.write_to(&mut writer, ImageFormat::Jpeg)
                .map_err(|e| write_err(std::io::Error::other(e)))?;
            writer.flush().map_err(write_err)?;
        }

        let (_, path) = file.keep().map_err(|e| write_err(e.error))?;
        Ok(path)
    }
}

/// All files under `root` whose name ends with `extension`, ignoring case.
pub fn find_images(root: &Path, extension: &str) -> Result<Vec<PathBuf>, MemeError> {
    let suffix = extension.to_lowercase();
    let files = find_files(root, |p| {
        p.file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.to_lowercase().ends_with(&suffix))
    })?;
    debug!("Found {} '{}' images under {}", files.len(), extension, root.display());
    Ok(files)
}

// ── Loading ──────────────────────────────────────────────────────────────────

fn open_image(path: &Path) -> Result<DynamicImage, MemeError> {
    let invalid = |detail: String| MemeError::InvalidImage {
        path: path.to_path_buf(),
        detail,
    };

    let reader = ImageReader::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => MemeError::ImageNotFound {
            path: path.to_path_buf(),
        },
        _ => invalid(e.to_string()),
    })?;
    reader
        .with_guessed_format()
        .map_err(|e| invalid(e.to_string()))?
        .decode()
        .map_err(|e| invalid(e.to_string()))
}

fn load_font(path: &Path) -> Result<FontVec, MemeError> {
    let font_err = |detail: String| MemeError::FontLoad {
        path: path.to_path_buf(),
        detail,
    };
    let bytes = std::fs::read(path).map_err(|e| font_err(e.to_string()))?;
    FontVec::try_from_vec(bytes).map_err(|e| font_err(e.to_string()))
}

/// Scale to `width` px wide; height follows the source aspect ratio.
fn resize_to_width(img: &DynamicImage, width: u32) -> DynamicImage {
    let height = scaled_height(img.width(), img.height(), width);
    if (img.width(), img.height()) == (width, height) {
        return img.clone();
    }
    img.resize_exact(width, height, FilterType::Lanczos3)
}

fn scaled_height(src_w: u32, src_h: u32, width: u32) -> u32 {
    if src_w == 0 {
        return src_h.max(1);
    }
    let h = (src_h as f64 * width as f64 / src_w as f64).round();
    (h as u32).max(1)
}

// ── Layout ───────────────────────────────────────────────────────────────────

/// Horizontal advance of `text` on one line, including kerning.
fn measure(font: &FontVec, scale: PxScale, text: &str) -> f32 {
    let scaled = font.as_scaled(scale);
    let mut width = 0.0;
    let mut prev = None;
    for c in text.chars() {
        let id = scaled.glyph_id(c);
        if let Some(p) = prev {
            width += scaled.kern(p, id);
        }
        width += scaled.h_advance(id);
        prev = Some(id);
    }
    width
}

/// Random top-left corner keeping a `block` inside `canvas` with `margin`.
///
/// On an axis where the block does not fit, the origin is pinned to the
/// margin and the caption is clipped on the far side.
fn text_origin<R: Rng>(
    canvas: (u32, u32),
    block: (u32, u32),
    margin: u32,
    rng: &mut R,
) -> (u32, u32) {
    let mut axis = |extent: u32, size: u32| {
        let hi = extent.saturating_sub(size).saturating_sub(margin);
        if hi <= margin {
            margin
        } else {
            rng.gen_range(margin..=hi)
        }
    };
    let x = axis(canvas.0, block.0);
    let y = axis(canvas.1, block.1);
    (x, y)
}

// ── Drawing ──────────────────────────────────────────────────────────────────

fn draw_caption(
    canvas: &mut RgbaImage,
    font: &FontVec,
    scale: PxScale,
    caption: &str,
    origin: (u32, u32),
) {
    let scaled = font.as_scaled(scale);
    let baseline = origin.1 as f32 + scaled.ascent();
    let mut caret = origin.0 as f32;
    let mut prev = None;
    for c in caption.chars() {
        let id = scaled.glyph_id(c);
        if let Some(p) = prev {
            caret += scaled.kern(p, id);
        }
        let glyph = id.with_scale_and_position(scale, point(caret, baseline));
        caret += scaled.h_advance(id);
        prev = Some(id);

        let Some(outlined) = font.outline_glyph(glyph) else {
            continue;
        };
        let bounds = outlined.px_bounds();
        outlined.draw(|gx, gy, coverage| {
            let px = bounds.min.x as i64 + gx as i64;
            let py = bounds.min.y as i64 + gy as i64;
            if px < 0 || py < 0 || px >= canvas.width() as i64 || py >= canvas.height() as i64 {
                return;
            }
            let pixel = canvas.get_pixel_mut(px as u32, py as u32);
            blend(&mut pixel.0, coverage);
        });
    }
}

fn blend(rgba: &mut [u8; 4], coverage: f32) {
    let a = coverage.clamp(0.0, 1.0);
    for (channel, text) in rgba.iter_mut().zip(TEXT_RGB) {
        *channel = (*channel as f32 * (1.0 - a) + text as f32 * a).round() as u8;
    }
    rgba[3] = rgba[3].max((a * 255.0).round() as u8);
}
