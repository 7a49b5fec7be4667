//! Decode → fit → lossy WebP encode → write.
//!
//! Everything here is synchronous and CPU bound; callers run it on a
//! blocking thread.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use image::imageops::FilterType;
use image::DynamicImage;
use tracing::{debug, warn};

use crate::error::TranscodeError;
use crate::models::CompressionOptions;

pub const OUTPUT_SUFFIX: &str = "_compressed";
pub const OUTPUT_EXTENSION: &str = "webp";

#[derive(Debug, Clone)]
pub struct TranscodedImage {
    pub filename: String,
    pub path: PathBuf,
    pub size: u64,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone)]
pub struct Transcoder {
    output_dir: PathBuf,
}

impl Transcoder {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Transcoder {
            output_dir: output_dir.into(),
        }
    }

    pub fn transcode(
        &self,
        source: &[u8],
        source_name: &str,
        options: &CompressionOptions,
    ) -> Result<TranscodedImage, TranscodeError> {
        let img = image::load_from_memory(source)?;
        debug!(width = img.width(), height = img.height(), "image decoded");

        let (width, height) =
            fit_dimensions(img.width(), img.height(), options.width, options.height);
        let img = if (width, height) != (img.width(), img.height()) {
            debug!(width, height, "resizing image");
            img.resize_exact(width, height, FilterType::Lanczos3)
        } else {
            img
        };

        let filename = output_filename(source_name);
        fs::create_dir_all(&self.output_dir).map_err(TranscodeError::Write)?;

        let encoded = encode_webp(&img, options.quality)?;
        debug!(bytes = encoded.len(), quality = options.quality, "webp encoded");

        let path = self.output_dir.join(&filename);
        persist(&path, &encoded, |p: &Path| File::create(p))?;

        Ok(TranscodedImage {
            filename,
            path,
            size: encoded.len() as u64,
            width,
            height,
        })
    }
}

/// Largest size that fits `src` inside the optional bounds while keeping its
/// aspect ratio. An unset bound is unbounded; images are never enlarged.
pub fn fit_dimensions(
    src_width: u32,
    src_height: u32,
    max_width: Option<u32>,
    max_height: Option<u32>,
) -> (u32, u32) {
    if src_width == 0 || src_height == 0 {
        return (src_width, src_height);
    }

    let scale_w = max_width.map_or(1.0, |w| w as f64 / src_width as f64);
    let scale_h = max_height.map_or(1.0, |h| h as f64 / src_height as f64);
    let scale = scale_w.min(scale_h);
    if scale >= 1.0 {
        return (src_width, src_height);
    }

    let width = ((src_width as f64 * scale).round() as u32)
        .clamp(1, max_width.unwrap_or(u32::MAX));
    let height = ((src_height as f64 * scale).round() as u32)
        .clamp(1, max_height.unwrap_or(u32::MAX));
    (width, height)
}

/// `<stem>-<ulid>_compressed.webp`, with the stem reduced to `[A-Za-z0-9_-]`.
pub fn output_filename(source_name: &str) -> String {
    let stem: String = Path::new(source_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let stem = if stem.trim_matches('_').is_empty() {
        "image"
    } else {
        stem.as_str()
    };

    format!(
        "{}-{}{}.{}",
        stem,
        ulid::Ulid::new().to_string().to_lowercase(),
        OUTPUT_SUFFIX,
        OUTPUT_EXTENSION
    )
}

fn encode_webp(img: &DynamicImage, quality: u8) -> Result<Vec<u8>, TranscodeError> {
    let quality = quality.min(100) as f32;

    // lossy only; alpha is kept when the source has it
    let encoded = if img.color().has_alpha() {
        let rgba = img.to_rgba8();
        webp::Encoder::from_rgba(rgba.as_raw(), rgba.width(), rgba.height())
            .encode_simple(false, quality)
            .map(|mem| mem.to_vec())
    } else {
        let rgb = img.to_rgb8();
        webp::Encoder::from_rgb(rgb.as_raw(), rgb.width(), rgb.height())
            .encode_simple(false, quality)
            .map(|mem| mem.to_vec())
    };

    encoded.map_err(|e| TranscodeError::Encode(format!("{:?}", e)))
}

/// Writes `data` through whatever `open` returns for `path`. A failed write
/// removes the file so no partial output is left in the directory.
fn persist<W, F>(path: &Path, data: &[u8], open: F) -> Result<(), TranscodeError>
where
    W: Write,
    F: FnOnce(&Path) -> io::Result<W>,
{
    let written = open(path).and_then(|file| {
        let mut writer = BufWriter::new(file);
        writer.write_all(data)?;
        writer.flush()
    });

    if let Err(e) = written {
        match fs::remove_file(path) {
            Err(cleanup) if cleanup.kind() != io::ErrorKind::NotFound => {
                warn!(path = %path.display(), error = %cleanup, "failed to remove partial output");
            }
            _ => {}
        }
        return Err(TranscodeError::Write(e));
    }
    Ok(())
}
