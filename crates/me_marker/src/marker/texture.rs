use std::collections::BTreeMap;
use std::sync::Arc;

use cap_std::fs_utf8::{camino::Utf8Path, Dir};
use glam::{uvec2, UVec2};
use image::{ImageFormat, RgbaImage};
use smol_str::SmolStr;
use tracing::{debug, info, warn};

use super::MarkerError;

/// A decoded RGBA8 image. Cheap to clone, the pixels are shared.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerImage(Arc<RgbaImage>);

impl MarkerImage {
    pub fn from_rgba(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, MarkerError> {
        let len = pixels.len();
        RgbaImage::from_raw(width, height, pixels)
            .map(Self::from)
            .ok_or(MarkerError::InvalidRgbaBuffer { width, height, len })
    }
    pub fn from_png_bytes(bytes: &[u8]) -> Result<Self, MarkerError> {
        let image = image::load_from_memory_with_format(bytes, ImageFormat::Png)?;
        Ok(image.into_rgba8().into())
    }
    pub fn width(&self) -> u32 {
        self.0.width()
    }
    pub fn height(&self) -> u32 {
        self.0.height()
    }
    pub fn size(&self) -> UVec2 {
        uvec2(self.0.width(), self.0.height())
    }
    /// true if every pixel has full alpha
    pub fn is_opaque(&self) -> bool {
        self.0.pixels().all(|pixel| pixel.0[3] == u8::MAX)
    }
}

impl From<RgbaImage> for MarkerImage {
    fn from(value: RgbaImage) -> Self {
        Self(Arc::new(value))
    }
}

/// The single image source chosen for a marker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ImageSource<'a> {
    /// an image was set directly on the marker. always wins over a cached image name.
    Explicit(&'a MarkerImage),
    /// the name of a previously cached image
    Cached(&'a str),
}

/// Lookup of previously cached images by name.
pub trait ImageCache {
    fn cached_image(&self, name: &str) -> Option<MarkerImage>;
}

/// In-memory image cache.
/// The key is the name that markers refer to with their cached image name.
#[derive(Debug, Default, Clone)]
pub struct TextureCache {
    textures: BTreeMap<SmolStr, MarkerImage>,
}

impl TextureCache {
    pub fn new() -> Self {
        Self::default()
    }
    /// returns the previous image cached under the same name
    pub fn insert(&mut self, name: impl Into<SmolStr>, image: MarkerImage) -> Option<MarkerImage> {
        self.textures.insert(name.into(), image)
    }
    pub fn insert_png(
        &mut self,
        name: impl Into<SmolStr>,
        bytes: &[u8],
    ) -> Result<Option<MarkerImage>, MarkerError> {
        let image = MarkerImage::from_png_bytes(bytes)?;
        Ok(self.insert(name, image))
    }
    pub fn remove(&mut self, name: &str) -> Option<MarkerImage> {
        self.textures.remove(name)
    }
    pub fn get(&self, name: &str) -> Option<&MarkerImage> {
        self.textures.get(name)
    }
    pub fn len(&self) -> usize {
        self.textures.len()
    }
    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.textures.keys().map(|name| name.as_str())
    }
    /// caches every png file (not recursive) of `dir`, with the file stem as its name.
    ///
    /// A png which fails to load doesn't stop the others. The failures are returned along with the file name.
    pub fn load_dir(&mut self, dir: &Dir) -> Result<Vec<(String, MarkerError)>, MarkerError> {
        let mut failures = vec![];
        for entry in dir.entries().map_err(MarkerError::io("."))? {
            let entry = entry.map_err(MarkerError::io("."))?;
            let file_name = match entry.file_name() {
                Ok(file_name) => file_name,
                Err(e) => {
                    warn!(?e, "skipping directory entry with invalid name");
                    continue;
                }
            };
            let path = Utf8Path::new(&file_name);
            let is_png = path
                .extension()
                .map_or(false, |ext| ext.eq_ignore_ascii_case("png"));
            let stem = match path.file_stem() {
                Some(stem) if is_png && !stem.is_empty() => SmolStr::new(stem),
                _ => {
                    debug!(%file_name, "skipping non png file");
                    continue;
                }
            };
            match entry.file_type() {
                Ok(ft) if ft.is_file() => {}
                _ => continue,
            }
            let result = dir
                .read(&file_name)
                .map_err(MarkerError::io(file_name.as_str()))
                .and_then(|bytes| self.insert_png(stem.clone(), &bytes));
            match result {
                Ok(previous) => {
                    if previous.is_some() {
                        warn!(%stem, "replaced a cached image with the same name");
                    }
                }
                Err(e) => {
                    warn!(?e, %file_name, "failed to load png");
                    failures.push((file_name, e));
                }
            }
        }
        info!(
            loaded = self.textures.len(),
            failed = failures.len(),
            "loaded textures from directory"
        );
        Ok(failures)
    }
}

impl ImageCache for TextureCache {
    fn cached_image(&self, name: &str) -> Option<MarkerImage> {
        self.get(name).cloned()
    }
}

/// texture filtering used when drawing a marker
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TextureSampling {
    #[default]
    Bilinear,
    /// crisp text, but the image may snap to pixel alignment while the map is panned
    NearestNeighbor,
}

/// GPU pixel format a marker texture is uploaded with
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TextureFormat {
    #[default]
    Rgba8888,
    /// 2 bytes per pixel, for opaque images
    Rgb565,
    /// 2 bytes per pixel, for images with transparency
    Rgba4444,
}

impl TextureFormat {
    pub fn select(image: &MarkerImage, compress: bool) -> Self {
        match (compress, image.is_opaque()) {
            (false, _) => Self::Rgba8888,
            (true, true) => Self::Rgb565,
            (true, false) => Self::Rgba4444,
        }
    }
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            Self::Rgba8888 => 4,
            Self::Rgb565 | Self::Rgba4444 => 2,
        }
    }
    /// size of the uploaded texture in bytes
    pub fn texture_bytes(self, image: &MarkerImage) -> usize {
        image.width() as usize * image.height() as usize * self.bytes_per_pixel()
    }
}
