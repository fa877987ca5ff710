//! Merge session: owns the layer order and composition settings.
//!
//! Every change that affects the output bumps a generation counter and
//! publishes a fresh [`Snapshot`] on a watch channel. The
//! channel only keeps the newest value, so a burst of edits collapses into the
//! last one for anyone rendering from it.

use image::Rgb;
use image_merger::{
    Axis, CompositeResult, Composition, ExportFormat, ExportedImage, ImageFile, Layer, LayerId,
    LayerStore, MergeError, ScalingPolicy, Separator,
};
use tokio::sync::watch;
use tracing::{debug, info};

use crate::config::AppConfig;
use crate::config::validation::MAX_SEPARATOR_THICKNESS;

/// Composition state at a given generation.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub generation: u64,
    pub composition: Composition,
}

/// Layer order plus settings for one merge job.
pub struct MergeSession {
    store: LayerStore,
    axis: Axis,
    scaling_policy: ScalingPolicy,
    maintain_aspect_ratio: bool,
    separator: Separator,
    export_format: ExportFormat,
    export_quality: u8,
    max_file_bytes: usize,
    generation: u64,
    snapshot_tx: watch::Sender<Snapshot>,
}

impl MergeSession {
    pub fn new(config: &AppConfig) -> Self {
        let (snapshot_tx, _) = watch::channel(Snapshot::default());
        let mut separator = config.separator;
        separator.thickness = separator.thickness.min(MAX_SEPARATOR_THICKNESS);
        Self {
            store: LayerStore::new(),
            axis: config.axis,
            scaling_policy: config.scaling_policy,
            maintain_aspect_ratio: config.maintain_aspect_ratio,
            separator,
            export_format: config.export_format,
            export_quality: config.export_quality,
            max_file_bytes: config.max_file_bytes,
            generation: 0,
            snapshot_tx,
        }
    }

    /// Receive every published snapshot (coalesced to the latest).
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.snapshot_tx.subscribe()
    }

    pub fn layers(&self) -> &LayerStore {
        &self.store
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn max_file_bytes(&self) -> usize {
        self.max_file_bytes
    }

    /// The current composition state.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            generation: self.generation,
            composition: Composition {
                layers: self.store.layers().to_vec(),
                axis: self.axis,
                scaling_policy: self.scaling_policy,
                maintain_aspect_ratio: self.maintain_aspect_ratio,
                separator: self.separator,
            },
        }
    }

    /// Decode a file and append it.
    pub fn load_file(&mut self, file: &ImageFile) -> Result<LayerId, MergeError> {
        let layer = image_merger::load_with_limit(file, self.max_file_bytes)?;
        self.add_layer(layer)
    }

    pub fn add_layer(&mut self, layer: Layer) -> Result<LayerId, MergeError> {
        let id = layer.id();
        self.store.append(layer)?;
        self.touch("layer added");
        Ok(id)
    }

    pub fn remove_layer(&mut self, id: LayerId) -> Result<(), MergeError> {
        self.store.remove(id)?;
        self.touch("layer removed");
        Ok(())
    }

    pub fn reorder_layer(&mut self, id: LayerId, before: Option<LayerId>) -> Result<(), MergeError> {
        let previous = self.store.ids();
        self.store.reorder(id, before)?;
        if self.store.ids() != previous {
            self.touch("layer reordered");
        }
        Ok(())
    }

    pub fn reverse_layers(&mut self) -> Result<(), MergeError> {
        self.store.reverse()?;
        self.touch("layers reversed");
        Ok(())
    }

    pub fn clear(&mut self) {
        if !self.store.is_empty() {
            self.store.clear();
            self.touch("layers cleared");
        }
    }

    pub fn set_axis(&mut self, axis: Axis) {
        if self.axis != axis {
            self.axis = axis;
            self.touch("axis changed");
        }
    }

    pub fn set_scaling_policy(&mut self, policy: ScalingPolicy) {
        if self.scaling_policy != policy {
            self.scaling_policy = policy;
            self.touch("scaling policy changed");
        }
    }

    pub fn set_maintain_aspect_ratio(&mut self, value: bool) {
        if self.maintain_aspect_ratio != value {
            self.maintain_aspect_ratio = value;
            self.touch("aspect ratio flag changed");
        }
    }

    /// Set the separator thickness, clamped to the supported range.
    pub fn set_separator_thickness(&mut self, thickness: u32) {
        let thickness = thickness.min(MAX_SEPARATOR_THICKNESS);
        if self.separator.thickness != thickness {
            self.separator.thickness = thickness;
            self.touch("separator thickness changed");
        }
    }

    pub fn set_separator_color(&mut self, color: Rgb<u8>) {
        if self.separator.color != color {
            self.separator.color = color;
            self.touch("separator color changed");
        }
    }

    pub fn set_export_format(&mut self, format: ExportFormat) {
        self.export_format = format;
    }

    pub fn set_export_quality(&mut self, quality: u8) {
        self.export_quality = quality.clamp(1, 100);
    }

    /// Compose the current state synchronously. `Ok(None)` when there are no layers.
    pub fn compose_now(&self) -> Result<Option<CompositeResult>, MergeError> {
        image_merger::compose_composition(&self.snapshot().composition)
    }

    /// Compose and encode the current state with the session's export settings.
    pub fn export(&self) -> Result<ExportedImage, MergeError> {
        self.export_as(self.export_format, Some(self.export_quality))
    }

    /// Compose and encode the current state.
    ///
    /// An empty session has nothing to export and fails with
    /// [`MergeError::InsufficientLayers`].
    pub fn export_as(
        &self,
        format: ExportFormat,
        quality: Option<u8>,
    ) -> Result<ExportedImage, MergeError> {
        let result = self.compose_now()?.ok_or(MergeError::InsufficientLayers {
            required: 1,
            actual: 0,
        })?;
        let exported =
            image_merger::export_named(&result, format, quality, &default_export_stem())?;
        info!(
            filename = %exported.filename,
            bytes = exported.bytes.len(),
            "Exported merged image"
        );
        Ok(exported)
    }

    fn touch(&mut self, reason: &str) {
        self.generation += 1;
        debug!(generation = self.generation, reason, "Composition changed");
        self.snapshot_tx.send_replace(self.snapshot());
    }
}

/// Download filename stem, e.g. `merged-20240131-154500`.
pub fn default_export_stem() -> String {
    format!("merged-{}", chrono::Local::now().format("%Y%m%d-%H%M%S"))
}
