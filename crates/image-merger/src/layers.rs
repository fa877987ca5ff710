//! Ordered layer storage.
//!
//! The store is the only place layer order changes. Every operation either
//! succeeds completely or leaves the order untouched.

use tracing::debug;

use crate::loader::{Layer, LayerId};
use crate::{MAX_LAYERS, MergeError, Result};

/// Ordered list of loaded layers, capped at [`MAX_LAYERS`].
#[derive(Debug, Clone, Default)]
pub struct LayerStore {
    layers: Vec<Layer>,
}

impl LayerStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Layers in composition order.
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn iter(&self) -> impl Iterator<Item = &Layer> {
        self.layers.iter()
    }

    pub fn ids(&self) -> Vec<LayerId> {
        self.layers.iter().map(Layer::id).collect()
    }

    pub fn get(&self, id: LayerId) -> Option<&Layer> {
        self.layers.iter().find(|l| l.id() == id)
    }

    /// Append a layer at the end of the order.
    pub fn append(&mut self, layer: Layer) -> Result<()> {
        if self.layers.len() >= MAX_LAYERS {
            return Err(MergeError::Capacity { max: MAX_LAYERS });
        }
        debug!(id = %layer.id(), name = %layer.name(), "Appending layer");
        self.layers.push(layer);
        Ok(())
    }

    /// Remove a layer and hand it back to the caller.
    pub fn remove(&mut self, id: LayerId) -> Result<Layer> {
        let index = self.position(id)?;
        let layer = self.layers.remove(index);
        debug!(%id, remaining = self.layers.len(), "Removed layer");
        Ok(layer)
    }

    /// Move `id` so that it sits immediately before `before`.
    ///
    /// `None` moves the layer to the end.
    pub fn reorder(&mut self, id: LayerId, before: Option<LayerId>) -> Result<()> {
        let from = self.position(id)?;
        if let Some(before) = before {
            self.position(before)?;
            if before == id {
                return Ok(());
            }
        }

        let layer = self.layers.remove(from);
        let to = match before {
            // Position is looked up again since the removal may have shifted it.
            Some(before) => self
                .layers
                .iter()
                .position(|l| l.id() == before)
                .unwrap_or(self.layers.len()),
            None => self.layers.len(),
        };
        self.layers.insert(to, layer);
        debug!(%id, from, to, "Reordered layer");
        Ok(())
    }

    /// Reverse the full order. Needs at least two layers.
    pub fn reverse(&mut self) -> Result<()> {
        if self.layers.len() < 2 {
            return Err(MergeError::InsufficientLayers {
                required: 2,
                actual: self.layers.len(),
            });
        }
        self.layers.reverse();
        debug!(count = self.layers.len(), "Reversed layer order");
        Ok(())
    }

    pub fn clear(&mut self) {
        self.layers.clear();
    }

    fn position(&self, id: LayerId) -> Result<usize> {
        self.layers
            .iter()
            .position(|l| l.id() == id)
            .ok_or(MergeError::LayerNotFound(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::tests::solid_layer;

    fn store_with(count: usize) -> LayerStore {
        let mut store = LayerStore::new();
        for i in 0..count {
            store
                .append(solid_layer(i as u32 + 1, 1, [0, 0, 0, 255]))
                .unwrap();
        }
        store
    }

    #[test]
    fn append_stops_at_capacity() {
        let mut store = store_with(MAX_LAYERS);
        let before = store.ids();

        let err = store.append(solid_layer(9, 9, [0, 0, 0, 255])).unwrap_err();

        assert!(matches!(err, MergeError::Capacity { max: MAX_LAYERS }));
        assert_eq!(store.len(), MAX_LAYERS);
        assert_eq!(store.ids(), before);
    }

    #[test]
    fn remove_returns_layer() {
        let mut store = store_with(3);
        let ids = store.ids();

        let removed = store.remove(ids[1]).unwrap();

        assert_eq!(removed.id(), ids[1]);
        assert_eq!(store.ids(), vec![ids[0], ids[2]]);
    }

    #[test]
    fn remove_unknown_id_leaves_store_unchanged() {
        let mut store = store_with(2);
        let stranger = solid_layer(1, 1, [0, 0, 0, 255]).id();
        let before = store.ids();

        assert!(matches!(
            store.remove(stranger),
            Err(MergeError::LayerNotFound(id)) if id == stranger
        ));
        assert_eq!(store.ids(), before);
    }

    #[test]
    fn reorder_moves_before_target() {
        let mut store = store_with(4);
        let ids = store.ids();
        let (a, b, c, d) = (ids[0], ids[1], ids[2], ids[3]);

        store.reorder(d, Some(b)).unwrap();
        assert_eq!(store.ids(), vec![a, d, b, c]);

        store.reorder(a, Some(c)).unwrap();
        assert_eq!(store.ids(), vec![d, b, a, c]);
    }

    #[test]
    fn reorder_to_end() {
        let mut store = store_with(3);
        let ids = store.ids();
        let (a, b, c) = (ids[0], ids[1], ids[2]);

        store.reorder(a, None).unwrap();
        assert_eq!(store.ids(), vec![b, c, a]);
    }

    #[test]
    fn reorder_onto_itself_is_noop() {
        let mut store = store_with(3);
        let before = store.ids();
        store.reorder(before[1], Some(before[1])).unwrap();
        assert_eq!(store.ids(), before);
    }

    #[test]
    fn reorder_with_unknown_target_fails_atomically() {
        let mut store = store_with(3);
        let before = store.ids();
        let stranger = solid_layer(1, 1, [0, 0, 0, 255]).id();

        assert!(store.reorder(before[0], Some(stranger)).is_err());
        assert_eq!(store.ids(), before);
    }

    #[test]
    fn reorder_unknown_layer_fails_atomically() {
        let mut store = store_with(3);
        let before = store.ids();
        let stranger = solid_layer(1, 1, [0, 0, 0, 255]).id();

        assert!(matches!(
            store.reorder(stranger, Some(before[0])),
            Err(MergeError::LayerNotFound(id)) if id == stranger
        ));
        assert!(matches!(
            store.reorder(stranger, None),
            Err(MergeError::LayerNotFound(_))
        ));
        assert_eq!(store.ids(), before);
    }

    #[test]
    fn reverse_twice_restores_order() {
        let mut store = store_with(5);
        let before = store.ids();

        store.reverse().unwrap();
        let mut expected = before.clone();
        expected.reverse();
        assert_eq!(store.ids(), expected);

        store.reverse().unwrap();
        assert_eq!(store.ids(), before);
    }

    #[test]
    fn reverse_needs_two_layers() {
        let mut store = store_with(1);
        assert!(matches!(
            store.reverse(),
            Err(MergeError::InsufficientLayers {
                required: 2,
                actual: 1
            })
        ));
        assert!(store_with(0).reverse().is_err());
    }
}
