//! Decoding uploaded files into layers.
//!
//! Only raster formats a browser can show in an `<img>` tag are accepted:
//! PNG, JPEG, GIF (first frame) and WebP.

use std::fmt;
use std::sync::Arc;

use image::{ImageFormat, RgbaImage};
use tracing::{debug, trace};
use uuid::Uuid;

use crate::{MergeError, Result};

/// Default upload size limit (20 MiB).
pub const DEFAULT_MAX_FILE_BYTES: usize = 20 * 1024 * 1024;

/// Opaque layer identifier, stable across reordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LayerId(Uuid);

impl LayerId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A file handed over by the upload widget.
#[derive(Debug, Clone)]
pub struct ImageFile {
    pub name: String,
    /// MIME type reported by the browser, if any.
    pub mime: Option<String>,
    pub bytes: Vec<u8>,
}

impl ImageFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime: None,
            bytes,
        }
    }

    /// Builder: set the reported MIME type.
    pub fn with_mime(mut self, mime: impl Into<String>) -> Self {
        self.mime = Some(mime.into());
        self
    }
}

/// Decoded raster owned by one or more layer handles.
///
/// Released when the last handle goes away.
struct Pixels {
    id: LayerId,
    image: RgbaImage,
}

impl Drop for Pixels {
    fn drop(&mut self) {
        trace!(id = %self.id, "Releasing decoded layer pixels");
    }
}

/// One decoded input image.
#[derive(Clone)]
pub struct Layer {
    id: LayerId,
    name: String,
    pixels: Arc<Pixels>,
}

impl Layer {
    /// Wrap an already-decoded RGBA buffer.
    ///
    /// Fails with [`MergeError::Decode`] if either dimension is zero.
    pub fn from_rgba(name: impl Into<String>, image: RgbaImage) -> Result<Self> {
        let name = name.into();
        if image.width() == 0 || image.height() == 0 {
            return Err(MergeError::Decode {
                name,
                reason: "image has zero width or height".into(),
            });
        }
        let id = LayerId::new();
        Ok(Self {
            id,
            name,
            pixels: Arc::new(Pixels { id, image }),
        })
    }

    pub fn id(&self) -> LayerId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels.image
    }

    pub fn original_width(&self) -> u32 {
        self.pixels.image.width()
    }

    pub fn original_height(&self) -> u32 {
        self.pixels.image.height()
    }
}

impl fmt::Debug for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Layer")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("width", &self.original_width())
            .field("height", &self.original_height())
            .finish()
    }
}

/// Decode a file using the default size limit.
pub fn load(file: &ImageFile) -> Result<Layer> {
    load_with_limit(file, DEFAULT_MAX_FILE_BYTES)
}

/// Decode a file into a layer, rejecting files larger than `max_bytes`.
pub fn load_with_limit(file: &ImageFile, max_bytes: usize) -> Result<Layer> {
    if let Some(mime) = &file.mime {
        if !mime.starts_with("image/") {
            return Err(MergeError::UnsupportedFormat {
                name: file.name.clone(),
                format: mime.clone(),
            });
        }
    }

    if file.bytes.len() > max_bytes {
        return Err(MergeError::FileTooLarge {
            name: file.name.clone(),
            size: file.bytes.len(),
            limit: max_bytes,
        });
    }

    let format = sniff_format(file)?;
    let decoded = image::load_from_memory_with_format(&file.bytes, format).map_err(|e| {
        MergeError::Decode {
            name: file.name.clone(),
            reason: e.to_string(),
        }
    })?;

    let layer = Layer::from_rgba(file.name.clone(), decoded.to_rgba8())?;
    debug!(
        id = %layer.id(),
        name = %layer.name(),
        width = layer.original_width(),
        height = layer.original_height(),
        ?format,
        "Decoded layer"
    );
    Ok(layer)
}

fn sniff_format(file: &ImageFile) -> Result<ImageFormat> {
    let format = image::guess_format(&file.bytes).map_err(|_| MergeError::Decode {
        name: file.name.clone(),
        reason: "unrecognized image data".into(),
    })?;

    match format {
        ImageFormat::Png | ImageFormat::Jpeg | ImageFormat::Gif | ImageFormat::WebP => Ok(format),
        other => Err(MergeError::UnsupportedFormat {
            name: file.name.clone(),
            format: format!("{other:?}"),
        }),
    }
}
