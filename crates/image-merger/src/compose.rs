//! Image composition — strip layout, separator bands and alpha blending.

use image::{Rgb, Rgba, RgbaImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;
use tracing::debug;

use crate::loader::Layer;
use crate::resize::{pixel_size, resize_to};
use crate::scaling::{Axis, ResolvedLayer, ScalingPolicy, resolve};
use crate::{MergeError, Result};

/// Solid band drawn between consecutive layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Separator {
    /// Band thickness in pixels; 0 disables bands.
    pub thickness: u32,
    pub color: Rgb<u8>,
}

impl Default for Separator {
    fn default() -> Self {
        Self {
            thickness: 0,
            color: Rgb([0, 0, 0]),
        }
    }
}

/// Snapshot of everything that determines the composed output.
#[derive(Debug, Clone, Default)]
pub struct Composition {
    pub layers: Vec<Layer>,
    pub axis: Axis,
    pub scaling_policy: ScalingPolicy,
    pub maintain_aspect_ratio: bool,
    pub separator: Separator,
}

/// The composed surface.
#[derive(Debug, Clone)]
pub struct CompositeResult {
    image: RgbaImage,
}

impl CompositeResult {
    pub fn pixel_width(&self) -> u32 {
        self.image.width()
    }

    pub fn pixel_height(&self) -> u32 {
        self.image.height()
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }
}

/// Largest width or height the compositor will allocate.
pub const MAX_CANVAS_DIMENSION: u32 = 32_767;

/// Largest pixel count the compositor will allocate (16384 x 16384).
pub const MAX_CANVAS_AREA: u64 = 268_435_456;

/// Resolve and compose a full composition.
///
/// Returns `Ok(None)` for a composition without layers.
pub fn compose_composition(composition: &Composition) -> Result<Option<CompositeResult>> {
    let resolved = resolve(
        &composition.layers,
        composition.axis,
        composition.scaling_policy,
        composition.maintain_aspect_ratio,
    );
    compose(
        &resolved,
        composition.axis,
        composition.separator.thickness,
        composition.separator.color,
    )
}

/// Lay resolved layers out along `axis` on a transparent canvas.
///
/// Layers are centered on the cross axis. A band of `separator_thickness`
/// pixels spanning the whole cross extent goes between each pair of
/// neighbours. Fractional sizes are rounded only when pixels are placed:
/// every layer spans from its rounded start to its rounded end, so
/// neighbours always abut.
///
/// Fails with [`MergeError::CanvasTooLarge`] before allocating anything
/// past [`MAX_CANVAS_DIMENSION`] or [`MAX_CANVAS_AREA`].
pub fn compose(
    resolved: &[ResolvedLayer<'_>],
    axis: Axis,
    separator_thickness: u32,
    separator_color: Rgb<u8>,
) -> Result<Option<CompositeResult>> {
    if resolved.is_empty() {
        return Ok(None);
    }

    let thickness = f64::from(separator_thickness);
    let gaps = (resolved.len() - 1) as f64;
    let mut along_total = thickness * gaps;
    let mut cross_max = 0.0f64;
    for r in resolved {
        let (along, cross) = axis.split(r.draw_width, r.draw_height);
        along_total += along;
        cross_max = cross_max.max(cross);
    }

    let canvas_along = pixel_size(along_total);
    let canvas_cross = pixel_size(cross_max);
    let (width, height) = axis.join(canvas_along, canvas_cross);
    check_canvas_size(width, height)?;
    debug!(
        ?axis,
        layers = resolved.len(),
        width,
        height,
        separator_thickness,
        "Composing layers"
    );

    // Zero-initialised, so fully transparent.
    let mut canvas = RgbaImage::new(width, height);
    let band_color = Rgba([separator_color[0], separator_color[1], separator_color[2], 255]);

    let mut cursor = 0.0f64;
    for (index, r) in resolved.iter().enumerate() {
        let (along, cross) = axis.split(r.draw_width, r.draw_height);
        let start = cursor.round();
        let end = (cursor + along).round();
        let extent = ((end - start) as u32).max(1);
        let (draw_w, draw_h) = axis.join(extent, pixel_size(cross));
        let scaled = resize_to(r.layer.pixels(), draw_w, draw_h);

        let cross_offset = ((f64::from(canvas_cross) - cross) / 2.0).max(0.0).round() as u32;
        let (x, y) = axis.join(start as u32, cross_offset);
        draw_over(&mut canvas, &scaled, x, y);
        cursor += along;

        if index + 1 < resolved.len() && separator_thickness > 0 {
            let (bx, by) = axis.join(end as i32, 0);
            let (bw, bh) = axis.join(separator_thickness, canvas_cross);
            draw_filled_rect_mut(&mut canvas, Rect::at(bx, by).of_size(bw, bh), band_color);
        }
        cursor += thickness;
    }

    Ok(Some(CompositeResult { image: canvas }))
}

fn check_canvas_size(width: u32, height: u32) -> Result<()> {
    let area = u64::from(width) * u64::from(height);
    if width > MAX_CANVAS_DIMENSION || height > MAX_CANVAS_DIMENSION || area > MAX_CANVAS_AREA {
        return Err(MergeError::CanvasTooLarge { width, height });
    }
    Ok(())
}

/// Draw `top` onto `base` at the given position using source-over blending.
///
/// Pixels falling outside `base` are clipped.
pub fn draw_over(base: &mut RgbaImage, top: &RgbaImage, x: u32, y: u32) {
    for (dx, dy, pixel) in top.enumerate_pixels() {
        let target_x = x + dx;
        let target_y = y + dy;
        if target_x >= base.width() || target_y >= base.height() {
            continue;
        }
        match pixel[3] {
            0 => {}
            255 => base.put_pixel(target_x, target_y, *pixel),
            _ => {
                let bg = base.get_pixel(target_x, target_y);
                let blended = blend_pixel(bg, pixel);
                base.put_pixel(target_x, target_y, blended);
            }
        }
    }
}

fn blend_pixel(bg: &Rgba<u8>, fg: &Rgba<u8>) -> Rgba<u8> {
    let fg_a = f32::from(fg[3]) / 255.0;
    let bg_a = f32::from(bg[3]) / 255.0;
    let out_a = fg_a + bg_a * (1.0 - fg_a);
    let channel = |i: usize| {
        let c = f32::from(fg[i]) * fg_a + f32::from(bg[i]) * bg_a * (1.0 - fg_a);
        (c / out_a).round().clamp(0.0, 255.0) as u8
    };
    Rgba([
        channel(0),
        channel(1),
        channel(2),
        (out_a * 255.0).round() as u8,
    ])
}
