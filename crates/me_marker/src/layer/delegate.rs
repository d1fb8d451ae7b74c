use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use super::LayoutContext;
use crate::{GeoCoordinate, MarkerDescriptor};

/// Application side customization of engine managed markers.
///
/// During a layout pass, the engine creates a [MarkerDescriptor] for every record of its store and calls
/// [MarkerDelegate::update_marker] with it, synchronously, once per marker.
/// This is where the application sets the image (or cached image name), anchor point, rotation, visibility etc..
pub trait MarkerDelegate {
    fn update_marker(&mut self, marker: &mut MarkerDescriptor, context: &LayoutContext);
}

impl<F> MarkerDelegate for F
where
    F: FnMut(&mut MarkerDescriptor, &LayoutContext),
{
    fn update_marker(&mut self, marker: &mut MarkerDescriptor, context: &LayoutContext) {
        self(marker, context)
    }
}

/// A row of the marker store. This is all the engine knows about a marker before asking the delegate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerRecord {
    /// row id in the store
    pub uid: u32,
    #[serde(default)]
    pub meta_data: SmolStr,
    #[serde(default)]
    pub weight: f64,
    pub location: GeoCoordinate,
}

impl MarkerRecord {
    pub fn to_descriptor(&self) -> MarkerDescriptor {
        MarkerDescriptor::engine_managed(
            self.uid,
            self.meta_data.clone(),
            self.weight,
            self.location,
        )
    }
}

/// The marker store of the engine.
pub trait MarkerSource {
    /// records that may need to be displayed at zoom `level`.
    /// A source is free to return more records than needed. The minimum level gate is applied after the delegate runs.
    fn records(&self, level: u32) -> Vec<MarkerRecord>;
}

impl MarkerSource for [MarkerRecord] {
    fn records(&self, _level: u32) -> Vec<MarkerRecord> {
        self.to_vec()
    }
}

impl MarkerSource for Vec<MarkerRecord> {
    fn records(&self, level: u32) -> Vec<MarkerRecord> {
        self.as_slice().records(level)
    }
}
