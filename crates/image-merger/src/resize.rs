//! Resampling layers to their resolved draw size.

use std::borrow::Cow;

use image::RgbaImage;
use image::imageops::{self, FilterType};
use tracing::debug;

/// Round a fractional draw size to whole pixels, never below 1.
pub fn pixel_size(value: f64) -> u32 {
    (value.round() as u32).max(1)
}

/// Resize `img` to exactly `width` x `height`.
///
/// Uses Lanczos3 filtering. Returns the original buffer untouched when it
/// already has the requested size.
pub fn resize_to(img: &RgbaImage, width: u32, height: u32) -> Cow<'_, RgbaImage> {
    let (orig_w, orig_h) = img.dimensions();

    if (orig_w, orig_h) == (width, height) {
        return Cow::Borrowed(img);
    }

    debug!(
        orig_w,
        orig_h,
        new_width = width,
        new_height = height,
        "Resizing layer to draw size"
    );

    Cow::Owned(imageops::resize(img, width, height, FilterType::Lanczos3))
}
