//! Image compositing engine for the image merger tool.
//!
//! Decodes uploaded images into layers, keeps them in a user-defined order,
//! resolves per-layer draw sizes for a scaling policy, composites them into a
//! single strip with optional separator bands, and exports the result as
//! PNG, JPEG or WebP.

pub mod compose;
pub mod export;
pub mod layers;
pub mod loader;
pub mod resize;
pub mod scaling;

// Re-exports for convenience
pub use compose::{
    CompositeResult, Composition, MAX_CANVAS_AREA, MAX_CANVAS_DIMENSION, Separator, compose,
    compose_composition,
};
pub use export::{DEFAULT_QUALITY, ExportFormat, ExportedImage, export, export_named};
pub use layers::LayerStore;
pub use loader::{DEFAULT_MAX_FILE_BYTES, ImageFile, Layer, LayerId, load, load_with_limit};
pub use scaling::{Axis, ResolvedLayer, ScalingPolicy, resolve};

/// Maximum number of layers a composition may hold.
pub const MAX_LAYERS: usize = 5;

/// Errors that can occur while loading, arranging or exporting images.
#[derive(Debug, thiserror::Error)]
pub enum MergeError {
    #[error("Failed to decode {name}: {reason}")]
    Decode { name: String, reason: String },

    #[error("Unsupported format for {name}: {format}")]
    UnsupportedFormat { name: String, format: String },

    #[error("{name} is too large: {size} bytes (limit {limit})")]
    FileTooLarge {
        name: String,
        size: usize,
        limit: usize,
    },

    #[error("Layer limit reached ({max} layers)")]
    Capacity { max: usize },

    #[error("Operation needs at least {required} layers, got {actual}")]
    InsufficientLayers { required: usize, actual: usize },

    #[error("Merged canvas would be {width}x{height} pixels, which is too large")]
    CanvasTooLarge { width: u32, height: u32 },

    #[error("Layer not found: {0}")]
    LayerNotFound(LayerId),

    #[error("Failed to encode {format}: {reason}")]
    Encode {
        format: ExportFormat,
        reason: String,
    },
}

/// Result type alias for image merger operations.
pub type Result<T> = std::result::Result<T, MergeError>;
