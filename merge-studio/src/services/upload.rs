//! Multi-file upload.
//!
//! Files are decoded concurrently on the blocking pool; each outcome is
//! reported on its own so one bad file never blocks the rest.

use futures::future::join_all;
use image_merger::{ImageFile, Layer, LayerId, MergeError};
use tracing::{info, warn};

use super::session::MergeSession;

/// Per-file outcome of a batch upload.
#[derive(Debug, Default)]
pub struct UploadReport {
    /// Layers appended to the session, in input order.
    pub added: Vec<LayerId>,
    /// Files that failed, with the reason.
    pub failures: Vec<(String, MergeError)>,
}

impl UploadReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Decode `files` concurrently. Results keep the input order.
pub async fn decode_all(
    files: Vec<ImageFile>,
    max_bytes: usize,
) -> Vec<(String, Result<Layer, MergeError>)> {
    let tasks = files.into_iter().map(move |file| async move {
        let name = file.name.clone();
        let decoded =
            tokio::task::spawn_blocking(move || image_merger::load_with_limit(&file, max_bytes))
                .await
                .unwrap_or_else(|e| {
                    Err(MergeError::Decode {
                        name: name.clone(),
                        reason: format!("decoder task failed: {e}"),
                    })
                });
        (name, decoded)
    });
    join_all(tasks).await
}

impl MergeSession {
    /// Decode a batch of files and append every success.
    ///
    /// Files that fail to decode, or that arrive after the layer limit is
    /// reached, are listed in the report's failures.
    pub async fn upload(&mut self, files: Vec<ImageFile>) -> UploadReport {
        let total = files.len();
        let mut report = UploadReport::default();

        for (name, decoded) in decode_all(files, self.max_file_bytes()).await {
            match decoded.and_then(|layer| self.add_layer(layer)) {
                Ok(id) => report.added.push(id),
                Err(e) => {
                    warn!(file = %name, error = %e, "Upload rejected");
                    report.failures.push((name, e));
                }
            }
        }

        info!(
            total,
            added = report.added.len(),
            failed = report.failures.len(),
            "Upload batch processed"
        );
        report
    }
}
