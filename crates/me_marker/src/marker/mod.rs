mod color_bar;
mod common;
mod error;
mod hit_test;
mod texture;

use enumflags2::BitFlags;
use glam::Vec2;
use smol_str::SmolStr;

pub use color_bar::*;
pub use common::*;
pub use error::*;
pub use hit_test::*;
pub use texture::*;

#[cfg(test)]
pub(crate) use texture::test as test_support;

/// generates a getter and a setter for each boolean flag of the marker
macro_rules! marker_flag_accessors {
    ($($(#[$doc:meta])* $getter:ident, $setter:ident => $flag:ident);+ $(;)?) => {
        $(
            $(#[$doc])*
            pub fn $getter(&self) -> bool {
                self.flags.contains(MarkerFlags::$flag)
            }
            $(#[$doc])*
            pub fn $setter(&mut self, value: bool) {
                self.flags.set(MarkerFlags::$flag, value);
            }
        )+
    };
}

/// Attributes of a single marker to be displayed on a map.
///
/// The same struct describes all kinds of markers. [MarkerKind::attributes] lists which of the optional
/// attributes are read for a kind, the rest are ignored by the engine (and reported by [MarkerDescriptor::validate]).
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerDescriptor {
    pub kind: MarkerKind,
    /// For dynamic markers, this is the name which identifies the marker within its layer.
    /// For other kinds, this is the meta data provided when the marker was generated.
    pub name: SmolStr,
    /// Weight of the marker. With a color bar on a dynamic marker layer, this is the parameter for the tint.
    pub weight: f64,
    /// in degrees
    pub rotation: f64,
    pub rotation_type: RotationType,
    pub location: GeoCoordinate,
    /// The name of a previously cached image. Only checked if there's no explicit image.
    pub cached_image_name: Option<SmolStr>,
    /// image which represents the marker. Set this if there is no cached image name.
    pub image: Option<MarkerImage>,
    /// The image point (in points) which acts as the center of rotation and is placed on the location.
    pub anchor_point: Vec2,
    /// Amount (in points) to offset the marker from its projected location on screen
    pub offset: Vec2,
    /// Size (in points) of the hit test box around the anchor point.
    /// (0, 0) means that the hit test box is derived from the image size and anchor point.
    /// Only set this when the image is too small to be tapped comfortably.
    pub hit_test_size: Vec2,
    /// the marker only appears at this zoom level or higher.
    pub minimum_level: u32,
    flags: BitFlags<MarkerFlags>,
}

impl MarkerDescriptor {
    pub fn new(kind: MarkerKind, name: impl Into<SmolStr>, location: GeoCoordinate) -> Self {
        Self {
            kind,
            name: name.into(),
            weight: 0.0,
            rotation: 0.0,
            rotation_type: RotationType::default(),
            location,
            cached_image_name: None,
            image: None,
            anchor_point: Vec2::ZERO,
            offset: Vec2::ZERO,
            hit_test_size: Vec2::ZERO,
            minimum_level: 0,
            flags: MarkerFlags::Visible.into(),
        }
    }
    /// a marker to be added to a dynamic marker layer
    pub fn dynamic(name: impl Into<SmolStr>, location: GeoCoordinate) -> Self {
        Self::new(MarkerKind::Dynamic, name, location)
    }
    /// a marker for the deprecated fast marker layer
    pub fn legacy_fast(meta_data: impl Into<SmolStr>, location: GeoCoordinate) -> Self {
        Self::new(MarkerKind::LegacyFast, meta_data, location)
    }
    /// the marker which the engine creates for a record of its marker store
    pub fn engine_managed(
        uid: u32,
        meta_data: impl Into<SmolStr>,
        weight: f64,
        location: GeoCoordinate,
    ) -> Self {
        let mut marker = Self::new(MarkerKind::EngineManaged { uid }, meta_data, location);
        marker.weight = weight;
        marker
    }

    marker_flag_accessors!(
        /// Defaults to true. The delegate may hide an engine managed marker by setting this to false.
        is_visible, set_visible => Visible;
        /// Forces nearest neighbor sampling of the texture instead of bilinear.
        nearest_neighbor_sampling, set_nearest_neighbor_sampling => NearestNeighborSampling;
        /// Convert the explicit image to a 2-byte per pixel format. only read for dynamic markers.
        compress_texture, set_compress_texture => CompressTexture;
    );

    pub fn flags(&self) -> BitFlags<MarkerFlags> {
        self.flags
    }
    pub fn uid(&self) -> Option<u32> {
        self.kind.uid()
    }
    /// The hit test size, if it overrides the default hit testing.
    /// Any non-zero dimension counts as an override.
    pub fn hit_test_override(&self) -> Option<Vec2> {
        (self.hit_test_size != Vec2::ZERO).then_some(self.hit_test_size)
    }
    /// Visibility and minimum level gates, for the kinds which read them.
    pub fn is_displayed_at_level(&self, level: u32) -> bool {
        let visible = !self.kind.supports(MarkerAttribute::Visibility) || self.is_visible();
        let level_ok =
            !self.kind.supports(MarkerAttribute::MinimumLevel) || level >= self.minimum_level;
        visible && level_ok
    }
    /// An explicit image takes precedence over the cached image name.
    /// For kinds without the image attribute, only the cached image name is considered.
    pub fn image_source(&self) -> Option<ImageSource<'_>> {
        if self.kind.supports(MarkerAttribute::Image) {
            if let Some(image) = self.image.as_ref() {
                return Some(ImageSource::Explicit(image));
            }
        }
        self.cached_image_name
            .as_deref()
            .map(ImageSource::Cached)
    }
    pub fn resolve_image(&self, cache: &dyn ImageCache) -> Result<MarkerImage, MarkerWarning> {
        match self.image_source() {
            Some(ImageSource::Explicit(image)) => Ok(image.clone()),
            Some(ImageSource::Cached(name)) => cache
                .cached_image(name)
                .ok_or_else(|| MarkerWarning::CachedImageNotFound(name.into())),
            None => Err(MarkerWarning::MissingImageSource),
        }
    }
    pub fn texture_sampling(&self) -> TextureSampling {
        if self.nearest_neighbor_sampling() {
            TextureSampling::NearestNeighbor
        } else {
            TextureSampling::Bilinear
        }
    }
    /// compression only applies to explicit images of the kinds which support it.
    /// cached images were already uploaded in whatever format they were cached with.
    pub fn texture_format(&self, image: &MarkerImage) -> TextureFormat {
        let compress = self.kind.supports(MarkerAttribute::CompressTexture)
            && self.compress_texture()
            && matches!(self.image_source(), Some(ImageSource::Explicit(_)));
        TextureFormat::select(image, compress)
    }

    /// checks the marker for values that the engine will ignore or can't make sense of.
    pub fn validate(&self) -> Vec<MarkerWarning> {
        let mut warnings = vec![];
        let ignored = [
            (MarkerAttribute::Image, self.image.is_some()),
            (MarkerAttribute::Offset, self.offset != Vec2::ZERO),
            (MarkerAttribute::CompressTexture, self.compress_texture()),
            (MarkerAttribute::MinimumLevel, self.minimum_level != 0),
            (MarkerAttribute::Visibility, !self.is_visible()),
        ];
        for (attribute, is_set) in ignored {
            if is_set && !self.kind.supports(attribute) {
                warnings.push(MarkerWarning::AttributeIgnored {
                    kind: self.kind,
                    attribute,
                });
            }
        }
        if self.image_source().is_none() {
            warnings.push(MarkerWarning::MissingImageSource);
        }
        if !self.location.is_valid() {
            warnings.push(MarkerWarning::LocationOutOfRange(self.location));
        }
        for (field, value) in [("weight", self.weight), ("rotation", self.rotation)] {
            if !value.is_finite() {
                warnings.push(MarkerWarning::NonFiniteValue { field });
            }
        }
        if self.hit_test_size.min_element() < 0.0 {
            warnings.push(MarkerWarning::NegativeHitTestSize(self.hit_test_size));
        }
        warnings
    }
}
