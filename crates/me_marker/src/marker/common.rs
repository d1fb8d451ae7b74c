use std::str::FromStr;

use enumflags2::{bitflags, BitFlags};
use serde::{Deserialize, Serialize};

/// Specifies how the engine renders the rotation of a marker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RotationType {
    /// rotation is relative to the edges of the screen. the marker keeps its angle while the map rotates.
    #[default]
    ScreenEdgeAligned,
    /// rotation is relative to true north. the marker turns with the map.
    TrueNorthAligned,
}

impl RotationType {
    /// The angle (in degrees, within `[0, 360)`) at which a marker with `rotation` must be drawn on screen,
    /// when the map itself is rotated by `map_heading` degrees.
    pub fn screen_angle(self, rotation: f64, map_heading: f64) -> f64 {
        let angle = match self {
            RotationType::ScreenEdgeAligned => rotation,
            RotationType::TrueNorthAligned => rotation - map_heading,
        };
        angle.rem_euclid(360.0)
    }
}

impl FromStr for RotationType {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "screen_edge_aligned" => Self::ScreenEdgeAligned,
            "true_north_aligned" => Self::TrueNorthAligned,
            _ => return Err("invalid rotation type"),
        })
    }
}
impl AsRef<str> for RotationType {
    fn as_ref(&self) -> &str {
        match self {
            Self::ScreenEdgeAligned => "screen_edge_aligned",
            Self::TrueNorthAligned => "true_north_aligned",
        }
    }
}

/// Geographic location in degrees (WGS84).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GeoCoordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoCoordinate {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
    /// latitude within [-90, 90] and longitude within [-180, 180]
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// Which map layer a marker belongs to. This decides which attributes of the descriptor are read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MarkerKind {
    /// added by the application to a dynamic marker layer. identified by its name.
    Dynamic,
    /// static markers of the old "fast" marker layer.
    /// Deprecated. use [MarkerKind::Dynamic] instead.
    LegacyFast,
    /// created by the engine for a record of the marker store and customized by the marker delegate.
    EngineManaged {
        /// row id of the marker in the store
        uid: u32,
    },
}

impl MarkerKind {
    /// The optional attributes that this kind of marker reads.
    /// Attributes not listed in [MarkerAttribute] are read by every kind.
    pub fn attributes(self) -> BitFlags<MarkerAttribute> {
        use MarkerAttribute::*;
        match self {
            MarkerKind::Dynamic => Image | Offset | CompressTexture,
            MarkerKind::LegacyFast => MinimumLevel.into(),
            MarkerKind::EngineManaged { .. } => Image | Offset | MinimumLevel | Visibility,
        }
    }
    pub fn supports(self, attribute: MarkerAttribute) -> bool {
        self.attributes().contains(attribute)
    }
    pub fn uid(self) -> Option<u32> {
        match self {
            MarkerKind::EngineManaged { uid } => Some(uid),
            _ => None,
        }
    }
}

/// attributes which only some kinds of markers read
#[bitflags]
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkerAttribute {
    /// an explicit image instead of a cached image name
    Image,
    /// screen offset from the projected location
    Offset,
    /// convert the explicit image into a 2-byte per pixel format
    CompressTexture,
    /// zoom level gate
    MinimumLevel,
    /// the delegate may hide the marker
    Visibility,
}

impl AsRef<str> for MarkerAttribute {
    fn as_ref(&self) -> &str {
        match self {
            Self::Image => "image",
            Self::Offset => "offset",
            Self::CompressTexture => "compress_texture",
            Self::MinimumLevel => "minimum_level",
            Self::Visibility => "visibility",
        }
    }
}

#[bitflags]
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkerFlags {
    Visible,
    NearestNeighborSampling,
    CompressTexture,
}
