//! Background recomposition worker.
//!
//! Waits for session snapshots, lets rapid edits settle for the debounce
//! window, then composes only the newest snapshot. A result is published only
//! if it is newer than the last one published.

use std::sync::Arc;
use std::time::Duration;

use image_merger::{CompositeResult, MergeError, compose_composition};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::notice::Notice;
use super::session::Snapshot;

/// Output of one recomposition.
#[derive(Debug)]
pub struct Rendered {
    pub generation: u64,
    /// `Ok(None)` when the snapshot had no layers.
    pub result: Result<Option<CompositeResult>, MergeError>,
}

impl Rendered {
    pub fn composite(&self) -> Option<&CompositeResult> {
        self.result.as_ref().ok().and_then(Option::as_ref)
    }

    /// Notice to show when this render failed.
    pub fn notice(&self) -> Option<Notice> {
        self.result.as_ref().err().map(Notice::from_error)
    }
}

/// Handle to the running worker. Dropping it stops the worker.
pub struct Recomposer {
    output_rx: watch::Receiver<Option<Arc<Rendered>>>,
    handle: JoinHandle<()>,
}

impl Recomposer {
    /// Start the worker on the current tokio runtime.
    pub fn spawn(snapshots: watch::Receiver<Snapshot>, debounce: Duration) -> Self {
        let (output_tx, output_rx) = watch::channel(None);
        let handle = tokio::spawn(worker_loop(snapshots, output_tx, debounce));
        info!(?debounce, "Recompose worker started");
        Self { output_rx, handle }
    }

    /// Receive every published render.
    pub fn subscribe(&self) -> watch::Receiver<Option<Arc<Rendered>>> {
        self.output_rx.clone()
    }

    /// Most recently published render, if any.
    pub fn latest(&self) -> Option<Arc<Rendered>> {
        self.output_rx.borrow().clone()
    }

    /// Wait until a render at or after `generation` is published.
    ///
    /// Returns `None` if the worker stopped first.
    pub async fn wait_for(&self, generation: u64) -> Option<Arc<Rendered>> {
        let mut rx = self.output_rx.clone();
        let rendered = rx
            .wait_for(|r| r.as_ref().is_some_and(|r| r.generation >= generation))
            .await
            .ok()?;
        (*rendered).clone()
    }
}

impl Drop for Recomposer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn worker_loop(
    mut snapshots: watch::Receiver<Snapshot>,
    output_tx: watch::Sender<Option<Arc<Rendered>>>,
    debounce: Duration,
) {
    let mut published: Option<u64> = None;

    while snapshots.changed().await.is_ok() {
        if !debounce.is_zero() {
            tokio::time::sleep(debounce).await;
        }

        let snapshot = snapshots.borrow_and_update().clone();
        if published.is_some_and(|g| snapshot.generation <= g) {
            debug!(generation = snapshot.generation, "Skipping stale snapshot");
            continue;
        }

        let result = compose_composition(&snapshot.composition);
        match &result {
            Ok(composite) => debug!(
                generation = snapshot.generation,
                width = composite.as_ref().map(CompositeResult::pixel_width),
                height = composite.as_ref().map(CompositeResult::pixel_height),
                "Recomposed"
            ),
            Err(e) => warn!(generation = snapshot.generation, error = %e, "Recompose failed"),
        }

        published = Some(snapshot.generation);
        output_tx.send_replace(Some(Arc::new(Rendered {
            generation: snapshot.generation,
            result,
        })));
    }

    info!("Recompose worker stopped");
}
