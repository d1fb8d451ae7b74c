use glam::Vec2;
use miette::Diagnostic;
use smol_str::SmolStr;
use thiserror::Error;

use super::{GeoCoordinate, MarkerAttribute, MarkerKind};

/// Marker errors when dealing with marker files, textures and marker sets
#[derive(Diagnostic, Debug, Error)]
pub enum MarkerError {
    #[error("io error. path: {path}")]
    #[diagnostic(code(marker_error::io))]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to (de)serialize marker json: {0}")]
    #[diagnostic(code(marker_error::json))]
    Json(#[from] serde_json::Error),
    #[error("texture decode error")]
    #[diagnostic(code(marker_error::png_error))]
    ImgError(#[from] image::ImageError),
    #[error("rgba buffer of {len} bytes doesn't fit an image of {width}x{height}")]
    #[diagnostic(code(marker_error::invalid_rgba))]
    InvalidRgbaBuffer { width: u32, height: u32, len: usize },
    #[error("only dynamic markers can be added to a dynamic marker set. kind: {0:?}")]
    #[diagnostic(code(marker_error::not_dynamic))]
    NotDynamic(MarkerKind),
    #[error("marker {marker} has a non finite {field}. json can't represent it")]
    #[diagnostic(
        code(marker_error::non_finite_value),
        help("json writes NaN and infinity as null, which can't be read back")
    )]
    NonFiniteValue { marker: String, field: &'static str },
}

impl MarkerError {
    pub(crate) fn io(path: impl Into<String>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| Self::Io { path, source }
    }
}

/// Problems with a single marker. The marker is still usable, but probably not the way its creator intended.
#[derive(Debug, Clone, PartialEq, Diagnostic, Error)]
pub enum MarkerWarning {
    #[error("{} is set, but {kind:?} markers ignore it", .attribute.as_ref())]
    #[diagnostic(code(marker_warning::attribute_ignored))]
    AttributeIgnored {
        kind: MarkerKind,
        attribute: MarkerAttribute,
    },
    #[error("marker has neither an image nor a cached image name")]
    #[diagnostic(code(marker_warning::missing_image_source))]
    MissingImageSource,
    #[error("cached image not found: {0}")]
    #[diagnostic(code(marker_warning::cached_image_not_found))]
    CachedImageNotFound(SmolStr),
    #[error("location out of range: {0:?}")]
    #[diagnostic(code(marker_warning::location_out_of_range))]
    LocationOutOfRange(GeoCoordinate),
    #[error("{field} is not a finite number")]
    #[diagnostic(code(marker_warning::non_finite))]
    NonFiniteValue { field: &'static str },
    #[error("hit test size has negative dimensions: {0}")]
    #[diagnostic(code(marker_warning::negative_hit_test_size))]
    NegativeHitTestSize(Vec2),
}
