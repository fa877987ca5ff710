//! User-facing notices for merge errors.

use image_merger::MergeError;
use serde::{Deserialize, Serialize};

/// How prominently a notice is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Warning,
    Error,
}

/// A message the UI shows as a toast.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub message: String,
}

impl Notice {
    fn new(level: NoticeLevel, title: &str, message: String) -> Self {
        Self {
            level,
            title: title.to_string(),
            message,
        }
    }

    /// Map an error to an actionable message. Each error kind gets its own title.
    pub fn from_error(err: &MergeError) -> Self {
        match err {
            MergeError::Decode { name, .. } => Self::new(
                NoticeLevel::Error,
                "Could not read image",
                format!("{name} appears to be corrupt or is not an image. Try another file."),
            ),
            MergeError::UnsupportedFormat { name, format } => Self::new(
                NoticeLevel::Error,
                "Unsupported format",
                format!("{name} is {format}. Use PNG, JPEG, GIF or WebP."),
            ),
            MergeError::FileTooLarge { name, limit, .. } => Self::new(
                NoticeLevel::Error,
                "File too large",
                format!(
                    "{name} is larger than {} MB. Resize it before uploading.",
                    limit / (1024 * 1024)
                ),
            ),
            MergeError::Capacity { max } => Self::new(
                NoticeLevel::Warning,
                "Too many images",
                format!("You can merge at most {max} images. Remove one to add another."),
            ),
            MergeError::InsufficientLayers { required, .. } => Self::new(
                NoticeLevel::Warning,
                "Not enough images",
                if *required >= 2 {
                    format!("Add at least {required} images to reverse their order.")
                } else {
                    "Add an image before exporting.".to_string()
                },
            ),
            MergeError::CanvasTooLarge { width, height } => Self::new(
                NoticeLevel::Error,
                "Merged image too large",
                format!(
                    "The merged image would be {width}x{height} pixels. Switch to Reduce scaling or remove an image."
                ),
            ),
            MergeError::LayerNotFound(_) => Self::new(
                NoticeLevel::Warning,
                "Image no longer present",
                "That image was already removed. Refresh the list and try again.".to_string(),
            ),
            MergeError::Encode { format, .. } => Self::new(
                NoticeLevel::Error,
                "Export failed",
                format!("The merged image could not be saved as {format}. Try another format."),
            ),
        }
    }
}
