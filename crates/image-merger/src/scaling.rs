//! Per-layer draw size resolution.
//!
//! Every policy except [`ScalingPolicy::Preserve`] forces all layers to share a
//! reference size on the cross axis (height for a horizontal strip, width for a
//! vertical one). Sizes stay fractional here; the compositor rounds them.

use tracing::debug;

use crate::loader::Layer;

/// Direction in which layers are laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Axis {
    /// Left to right.
    #[default]
    Horizontal,
    /// Top to bottom.
    Vertical,
}

impl Axis {
    pub fn from_str_setting(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "horizontal" => Some(Self::Horizontal),
            "vertical" => Some(Self::Vertical),
            _ => None,
        }
    }

    /// Split `(width, height)` into `(along, cross)` for this axis.
    pub fn split<T>(self, width: T, height: T) -> (T, T) {
        match self {
            Self::Horizontal => (width, height),
            Self::Vertical => (height, width),
        }
    }

    /// Inverse of [`Axis::split`].
    pub fn join<T>(self, along: T, cross: T) -> (T, T) {
        match self {
            Self::Horizontal => (along, cross),
            Self::Vertical => (cross, along),
        }
    }
}

/// How layers are scaled relative to each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScalingPolicy {
    /// Shrink everything to the smallest cross dimension.
    #[default]
    Reduce,
    /// Grow everything to the largest cross dimension.
    Magnify,
    /// Fit to the smallest cross dimension. Behaves like `Reduce`; nothing is
    /// actually cropped.
    Crop,
    /// Keep every layer at its original size.
    Preserve,
}

impl ScalingPolicy {
    pub fn from_str_setting(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "reduce" => Some(Self::Reduce),
            "magnify" => Some(Self::Magnify),
            "crop" | "fit" => Some(Self::Crop),
            "preserve" => Some(Self::Preserve),
            _ => None,
        }
    }
}

/// A layer paired with the size it will be drawn at.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedLayer<'a> {
    pub layer: &'a Layer,
    pub draw_width: f64,
    pub draw_height: f64,
}

/// Compute draw sizes for `layers` in order.
pub fn resolve<'a>(
    layers: &'a [Layer],
    axis: Axis,
    policy: ScalingPolicy,
    maintain_aspect_ratio: bool,
) -> Vec<ResolvedLayer<'a>> {
    let originals = layers.iter().map(|layer| {
        (
            layer,
            f64::from(layer.original_width()),
            f64::from(layer.original_height()),
        )
    });

    let Some(reference) = reference_dimension(layers, axis, policy) else {
        return originals
            .map(|(layer, w, h)| ResolvedLayer {
                layer,
                draw_width: w,
                draw_height: h,
            })
            .collect();
    };

    debug!(?axis, ?policy, reference, maintain_aspect_ratio, "Resolving layer sizes");

    originals
        .map(|(layer, w, h)| {
            let (along, cross) = axis.split(w, h);
            let along = if maintain_aspect_ratio {
                along * (reference / cross)
            } else {
                along
            };
            let (draw_width, draw_height) = axis.join(along, reference);
            ResolvedLayer {
                layer,
                draw_width,
                draw_height,
            }
        })
        .collect()
}

/// Shared cross-axis size, or `None` when layers keep their own sizes.
fn reference_dimension(layers: &[Layer], axis: Axis, policy: ScalingPolicy) -> Option<f64> {
    let cross = layers.iter().map(|layer| {
        let (_, cross) = axis.split(layer.original_width(), layer.original_height());
        cross
    });

    let reference = match policy {
        ScalingPolicy::Preserve => return None,
        ScalingPolicy::Reduce | ScalingPolicy::Crop => cross.min(),
        ScalingPolicy::Magnify => cross.max(),
    };
    reference.map(f64::from)
}
