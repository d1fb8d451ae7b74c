use indexmap::IndexMap;
use smol_str::SmolStr;
use tracing::debug;

use crate::{MarkerDescriptor, MarkerError, MarkerKind};

/// The markers of a dynamic marker layer, keyed by their name.
///
/// Keeps insertion order, which is the order they are laid out (and drawn) in.
#[derive(Debug, Default, Clone)]
pub struct DynamicMarkerSet {
    markers: IndexMap<SmolStr, MarkerDescriptor>,
}

impl DynamicMarkerSet {
    pub fn new() -> Self {
        Self::default()
    }
    /// adds the marker. If there's already a marker with the same name, it is replaced (keeping its position)
    /// and returned.
    pub fn add_marker(
        &mut self,
        marker: MarkerDescriptor,
    ) -> Result<Option<MarkerDescriptor>, MarkerError> {
        if marker.kind != MarkerKind::Dynamic {
            return Err(MarkerError::NotDynamic(marker.kind));
        }
        debug!(name = %marker.name, "adding dynamic marker");
        Ok(self.markers.insert(marker.name.clone(), marker))
    }
    /// runs `f` on the marker with `name`. returns false if there's no such marker.
    ///
    /// `f` must not rename the marker or change its kind. If it does, the change is reverted.
    pub fn update_marker(&mut self, name: &str, f: impl FnOnce(&mut MarkerDescriptor)) -> bool {
        let Some((_, key, marker)) = self.markers.get_full_mut(name) else {
            return false;
        };
        f(marker);
        if marker.name != *key || marker.kind != MarkerKind::Dynamic {
            tracing::warn!(%key, "dynamic marker update changed the name or kind. reverting it");
            marker.name = key.clone();
            marker.kind = MarkerKind::Dynamic;
        }
        true
    }
    pub fn remove_marker(&mut self, name: &str) -> Option<MarkerDescriptor> {
        self.markers.shift_remove(name)
    }
    pub fn get(&self, name: &str) -> Option<&MarkerDescriptor> {
        self.markers.get(name)
    }
    pub fn contains(&self, name: &str) -> bool {
        self.markers.contains_key(name)
    }
    pub fn len(&self) -> usize {
        self.markers.len()
    }
    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }
    pub fn clear(&mut self) {
        self.markers.clear();
    }
    pub fn iter(&self) -> impl Iterator<Item = &MarkerDescriptor> {
        self.markers.values()
    }
}
