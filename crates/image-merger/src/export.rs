//! Encoding the composed surface for download.

use std::fmt;
use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::codecs::webp::WebPEncoder;
use image::{ImageResult, Rgb, RgbImage, RgbaImage};
use tracing::debug;

use crate::compose::CompositeResult;
use crate::{MergeError, Result};

/// JPEG quality used when the caller does not pick one.
pub const DEFAULT_QUALITY: u8 = 92;

/// Output encodings offered for download.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Png,
    Jpeg,
    WebP,
}

impl ExportFormat {
    /// Parse a setting value or MIME type.
    pub fn from_str_setting(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "png" | "image/png" => Some(Self::Png),
            "jpeg" | "jpg" | "image/jpeg" => Some(Self::Jpeg),
            "webp" | "image/webp" => Some(Self::WebP),
            _ => None,
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::WebP => "image/webp",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::WebP => "webp",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Png => "PNG",
            Self::Jpeg => "JPEG",
            Self::WebP => "WebP",
        };
        f.write_str(name)
    }
}

/// An encoded image ready to be offered as a download.
#[derive(Debug, Clone)]
pub struct ExportedImage {
    pub bytes: Vec<u8>,
    pub format: ExportFormat,
    pub filename: String,
}

impl ExportedImage {
    pub fn mime(&self) -> &'static str {
        self.format.mime()
    }
}

/// Encode a composite.
///
/// `quality` (1-100) applies to JPEG and WebP; PNG ignores it. JPEG falls
/// back to [`DEFAULT_QUALITY`]. WebP without a quality is written losslessly,
/// with one it is lossy. Both WebP modes keep the alpha channel.
pub fn export(
    result: &CompositeResult,
    format: ExportFormat,
    quality: Option<u8>,
) -> Result<Vec<u8>> {
    let image = result.image();
    let quality = quality.map(|q| q.clamp(1, 100));

    let bytes = match format {
        ExportFormat::Png => encode_with(|out| image.write_with_encoder(PngEncoder::new(out))),
        ExportFormat::Jpeg => {
            let quality = quality.unwrap_or(DEFAULT_QUALITY);
            encode_with(|out| encode_jpeg(image, quality, out))
        }
        ExportFormat::WebP => match quality {
            Some(quality) => encode_lossy_webp(image, quality),
            None => encode_with(|out| image.write_with_encoder(WebPEncoder::new_lossless(out))),
        },
    }
    .map_err(|reason| MergeError::Encode { format, reason })?;

    if bytes.is_empty() {
        return Err(MergeError::Encode {
            format,
            reason: "encoder produced no data".into(),
        });
    }

    debug!(
        %format,
        ?quality,
        width = image.width(),
        height = image.height(),
        bytes = bytes.len(),
        "Exported composite"
    );
    Ok(bytes)
}

/// Encode a composite and attach a download filename `{stem}.{ext}`.
pub fn export_named(
    result: &CompositeResult,
    format: ExportFormat,
    quality: Option<u8>,
    stem: &str,
) -> Result<ExportedImage> {
    let bytes = export(result, format, quality)?;
    Ok(ExportedImage {
        bytes,
        format,
        filename: format!("{stem}.{}", format.extension()),
    })
}

fn encode_with(
    write: impl FnOnce(&mut Cursor<Vec<u8>>) -> ImageResult<()>,
) -> std::result::Result<Vec<u8>, String> {
    let mut cursor = Cursor::new(Vec::new());
    write(&mut cursor).map_err(|e| e.to_string())?;
    Ok(cursor.into_inner())
}

fn encode_lossy_webp(image: &RgbaImage, quality: u8) -> std::result::Result<Vec<u8>, String> {
    let encoder = webp::Encoder::from_rgba(image.as_raw(), image.width(), image.height());
    let memory = encoder
        .encode_simple(false, f32::from(quality))
        .map_err(|e| format!("{e:?}"))?;
    Ok(memory.to_vec())
}

fn encode_jpeg(image: &RgbaImage, quality: u8, out: &mut Cursor<Vec<u8>>) -> ImageResult<()> {
    let flattened = flatten_onto_white(image);
    flattened.write_with_encoder(JpegEncoder::new_with_quality(out, quality))
}

/// Composite an RGBA image over opaque white, dropping the alpha channel.
pub fn flatten_onto_white(image: &RgbaImage) -> RgbImage {
    RgbImage::from_fn(image.width(), image.height(), |x, y| {
        let px = image.get_pixel(x, y);
        let alpha = f32::from(px[3]) / 255.0;
        let channel = |c: u8| (f32::from(c) * alpha + 255.0 * (1.0 - alpha)).round() as u8;
        Rgb([channel(px[0]), channel(px[1]), channel(px[2])])
    })
}
