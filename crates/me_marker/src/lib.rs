//! Marker descriptors for map layers
//!
//! An application (or the engine itself) describes every point annotation with a [MarkerDescriptor].
//! The descriptor is tagged with a [MarkerKind] which decides which of its attributes are read:
//! 1. [MarkerKind::Dynamic] markers are added by name into a [DynamicMarkerSet].
//! 2. [MarkerKind::LegacyFast] markers are the deprecated static list of the "fast" marker layer.
//! 3. [MarkerKind::EngineManaged] markers are built by the engine from a store record and handed to a
//!     [MarkerDelegate] for customization, once per marker, during a layout pass.
//!
//! The layout pass resolves each descriptor into a [ResolvedMarker] which is everything the renderer needs:
//! the image, texture format / sampling, screen angle and hit box.

pub mod io;
pub mod layer;
pub mod marker;

pub use layer::*;
pub use marker::*;

pub fn is_default<T: PartialEq + Default>(t: &T) -> bool {
    t == &T::default()
}
