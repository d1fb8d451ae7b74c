//! Layout of markers for the renderer.
//!
//! A layout pass turns marker descriptors into [ResolvedMarker]s:
//! 1. engine managed markers are created from the [MarkerSource] records and customized by the [MarkerDelegate]
//! 2. visibility and minimum level gates are applied
//! 3. the image source is resolved (explicit image first, then the cached image name)
//! 4. texture format / sampling, screen angle, hit box and color bar tint are computed
//!
//! Markers which can't be displayed are reported as [SkippedMarker]s, they never fail the whole pass.

mod delegate;
mod dynamic;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use tracing::{debug, info_span};

pub use delegate::*;
pub use dynamic::*;

use crate::{
    ColorBar, GeoCoordinate, HitBox, ImageCache, MarkerAttribute, MarkerDescriptor, MarkerImage,
    MarkerKind, MarkerWarning, TextureFormat, TextureSampling,
};

/// configuration of a marker layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerLayerConfig {
    /// physical pixels per point. hit test sizes, anchor points and offsets are scaled by this.
    pub screen_scale: f32,
    /// tints dynamic markers by their weight
    pub color_bar: Option<ColorBar>,
}

impl Default for MarkerLayerConfig {
    fn default() -> Self {
        Self {
            screen_scale: 1.0,
            color_bar: None,
        }
    }
}

/// The state of the map during a layout pass. handed to the delegate too.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutContext {
    /// current zoom level
    pub level: u32,
    pub screen_scale: f32,
    /// rotation of the map in degrees
    pub map_heading: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MarkerId {
    Name(SmolStr),
    Uid(u32),
}

impl MarkerId {
    pub fn of(marker: &MarkerDescriptor) -> Self {
        match marker.kind {
            MarkerKind::EngineManaged { uid } => Self::Uid(uid),
            _ => Self::Name(marker.name.clone()),
        }
    }
}

/// Everything the renderer needs to draw a marker
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedMarker {
    pub id: MarkerId,
    pub kind: MarkerKind,
    pub location: GeoCoordinate,
    pub weight: f64,
    /// degrees within [0, 360)
    pub screen_angle: f64,
    /// in physical pixels
    pub anchor_point: Vec2,
    /// in physical pixels. zero for kinds without offset
    pub offset: Vec2,
    pub image: MarkerImage,
    pub texture_format: TextureFormat,
    pub sampling: TextureSampling,
    /// relative to the projected screen point of the location
    pub hit_box: HitBox,
    /// color bar tint. sRGBA8
    pub tint: Option<[u8; 4]>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    /// the delegate hid the marker
    Hidden,
    BelowMinimumLevel { minimum_level: u32 },
    NoImage(MarkerWarning),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedMarker {
    pub id: MarkerId,
    pub reason: SkipReason,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct LayoutOutput {
    pub markers: Vec<ResolvedMarker>,
    pub skipped: Vec<SkippedMarker>,
}

impl LayoutOutput {
    fn push(&mut self, id: MarkerId, result: Result<ResolvedMarker, SkipReason>) {
        match result {
            Ok(marker) => self.markers.push(marker),
            Err(reason) => {
                debug!(?id, ?reason, "skipping marker");
                self.skipped.push(SkippedMarker { id, reason });
            }
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct MarkerLayer {
    config: MarkerLayerConfig,
}

impl MarkerLayer {
    pub fn new(config: MarkerLayerConfig) -> Self {
        Self { config }
    }
    pub fn config(&self) -> &MarkerLayerConfig {
        &self.config
    }
    pub fn config_mut(&mut self) -> &mut MarkerLayerConfig {
        &mut self.config
    }
    pub fn context(&self, level: u32, map_heading: f64) -> LayoutContext {
        LayoutContext {
            level,
            screen_scale: self.config.screen_scale,
            map_heading,
        }
    }

    /// creates a marker for every record of `source`, lets the `delegate` customize it and resolves it.
    /// The delegate is called exactly once per record, in the order of the records.
    pub fn layout_engine_managed<S, D>(
        &self,
        source: &S,
        delegate: &mut D,
        cache: &dyn ImageCache,
        context: &LayoutContext,
    ) -> LayoutOutput
    where
        S: MarkerSource + ?Sized,
        D: MarkerDelegate + ?Sized,
    {
        let _span = info_span!("engine managed layout", level = context.level).entered();
        let mut output = LayoutOutput::default();
        for record in source.records(context.level) {
            let mut marker = record.to_descriptor();
            delegate.update_marker(&mut marker, context);
            let id = MarkerId::of(&marker);
            output.push(id, self.resolve(&marker, cache, context));
        }
        debug!(
            resolved = output.markers.len(),
            skipped = output.skipped.len(),
            "engine managed layout done"
        );
        output
    }

    /// resolves markers created by the application (dynamic or legacy fast markers).
    pub fn layout_descriptors<'a>(
        &self,
        markers: impl IntoIterator<Item = &'a MarkerDescriptor>,
        cache: &dyn ImageCache,
        context: &LayoutContext,
    ) -> LayoutOutput {
        let _span = info_span!("descriptor layout", level = context.level).entered();
        let mut output = LayoutOutput::default();
        for marker in markers {
            output.push(MarkerId::of(marker), self.resolve(marker, cache, context));
        }
        debug!(
            resolved = output.markers.len(),
            skipped = output.skipped.len(),
            "descriptor layout done"
        );
        output
    }

    pub fn resolve(
        &self,
        marker: &MarkerDescriptor,
        cache: &dyn ImageCache,
        context: &LayoutContext,
    ) -> Result<ResolvedMarker, SkipReason> {
        if marker.kind.supports(MarkerAttribute::Visibility) && !marker.is_visible() {
            return Err(SkipReason::Hidden);
        }
        if !marker.is_displayed_at_level(context.level) {
            return Err(SkipReason::BelowMinimumLevel {
                minimum_level: marker.minimum_level,
            });
        }
        let image = marker.resolve_image(cache).map_err(SkipReason::NoImage)?;
        let scale = context.screen_scale;
        let offset = if marker.kind.supports(MarkerAttribute::Offset) {
            marker.offset * scale
        } else {
            Vec2::ZERO
        };
        let hit_box = HitBox::for_marker(marker, Some(image.size()), scale).unwrap_or_default();
        let tint = match (&self.config.color_bar, marker.kind) {
            (Some(color_bar), MarkerKind::Dynamic) => color_bar.color_for(marker.weight),
            _ => None,
        };
        Ok(ResolvedMarker {
            id: MarkerId::of(marker),
            kind: marker.kind,
            location: marker.location,
            weight: marker.weight,
            screen_angle: marker
                .rotation_type
                .screen_angle(marker.rotation, context.map_heading),
            anchor_point: marker.anchor_point * scale,
            offset,
            texture_format: marker.texture_format(&image),
            sampling: marker.texture_sampling(),
            image,
            hit_box,
            tint,
        })
    }
}
