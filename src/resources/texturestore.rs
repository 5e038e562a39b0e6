//! Shared texture cache.
//!
//! Textures are decoded once per source path and handed out as cheap clones
//! that share the decoded pixels. Sprite-sheet frames are *views* over the
//! cached sheet: a [`Texture`] carries its own frame rectangle, so slicing a
//! sheet never touches the cached original.
//!
//! The store is meant to be wrapped in an [`Arc`] and shared by every effect
//! and character animation of the process. Decoding goes through an
//! [`ImageSource`], so the same cache works for files on disk
//! ([`FsImageSource`]) and for embedded/pre-decoded images
//! ([`MemoryImageSource`]).
//!
//! Failures never reach the render loop: the `load*` helpers log the error and
//! fall back to [`Texture::empty`], the shared transparent placeholder.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use image::{Rgba, RgbaImage};
use log::{debug, error, warn};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::resources::framesource::SheetGeometry;

const EMPTY_SOURCE: &str = "<empty>";

/// Errors raised while decoding images or slicing sprite sheets.
#[derive(Debug, Error)]
pub enum AssetError {
    /// The image could not be opened or decoded.
    #[error("Could not decode image {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: image::ImageError,
    },
    /// An in-memory source has nothing registered under the path.
    #[error("No image registered for {0}")]
    NotFound(String),
    /// A frame source resolved to zero frames.
    #[error("Frame sequence is empty")]
    EmptySequence,
    /// Sprite sheet geometry cannot produce valid frames.
    #[error("Invalid sprite sheet geometry: {0}")]
    InvalidGeometry(String),
    /// A frame rectangle does not fit inside the decoded image.
    #[error("Rect {rect:?} is outside of {path} ({width}x{height})")]
    FrameOutOfBounds {
        path: String,
        rect: Rect,
        width: u32,
        height: u32,
    },
}

/// Pixel rectangle inside a decoded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    fn fits(&self, width: u32, height: u32) -> bool {
        self.width > 0
            && self.height > 0
            && self.x.checked_add(self.width).is_some_and(|r| r <= width)
            && self.y.checked_add(self.height).is_some_and(|b| b <= height)
    }
}

/// Immutable handle to decoded pixels plus the frame rectangle to sample.
///
/// Cloning is cheap; all clones and all views of the same sheet share one
/// pixel buffer.
#[derive(Debug, Clone)]
pub struct Texture {
    source: Arc<str>,
    image: Arc<RgbaImage>,
    frame: Rect,
    placeholder: bool,
}

impl Texture {
    /// Wrap a decoded image; the frame covers the whole image.
    pub fn from_image(source: impl Into<Arc<str>>, image: RgbaImage) -> Self {
        let frame = Rect::new(0, 0, image.width(), image.height());
        Self {
            source: source.into(),
            image: Arc::new(image),
            frame,
            placeholder: false,
        }
    }

    /// The shared 1x1 transparent placeholder.
    pub fn empty() -> Self {
        static EMPTY: OnceLock<Texture> = OnceLock::new();
        EMPTY
            .get_or_init(|| {
                let mut texture =
                    Texture::from_image(EMPTY_SOURCE, RgbaImage::from_pixel(1, 1, Rgba([0; 4])));
                texture.placeholder = true;
                texture
            })
            .clone()
    }

    /// Create a sub-rectangle view sharing this texture's pixels.
    pub fn view(&self, frame: Rect) -> Result<Texture, AssetError> {
        if !frame.fits(self.image.width(), self.image.height()) {
            return Err(AssetError::FrameOutOfBounds {
                path: self.source.to_string(),
                rect: frame,
                width: self.image.width(),
                height: self.image.height(),
            });
        }
        Ok(Texture {
            source: Arc::clone(&self.source),
            image: Arc::clone(&self.image),
            frame,
            placeholder: self.placeholder,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn frame(&self) -> Rect {
        self.frame
    }

    pub fn width(&self) -> u32 {
        self.frame.width
    }

    pub fn height(&self) -> u32 {
        self.frame.height
    }

    pub fn is_placeholder(&self) -> bool {
        self.placeholder
    }

    /// Sample a pixel in frame-local coordinates.
    pub fn pixel(&self, u: u32, v: u32) -> Option<Rgba<u8>> {
        if u >= self.frame.width || v >= self.frame.height {
            return None;
        }
        self.image
            .get_pixel_checked(self.frame.x + u, self.frame.y + v)
            .copied()
    }

    /// True when both handles point at the same decoded buffer.
    pub fn shares_pixels_with(&self, other: &Texture) -> bool {
        Arc::ptr_eq(&self.image, &other.image)
    }
}

impl PartialEq for Texture {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
            && self.frame == other.frame
            && self.placeholder == other.placeholder
    }
}

/// Something that can turn an asset path into RGBA pixels.
pub trait ImageSource: Send + Sync {
    fn decode(&self, path: &str) -> Result<RgbaImage, AssetError>;
}

/// Decodes image files below an asset root directory.
///
/// Asset paths are web-style (`/game/fire/fire1.png`); the leading slash is
/// stripped and the remainder joined onto `root`.
#[derive(Debug, Clone)]
pub struct FsImageSource {
    root: PathBuf,
}

impl FsImageSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn resolve(&self, path: &str) -> PathBuf {
        self.root.join(Path::new(path.trim_start_matches('/')))
    }
}

impl ImageSource for FsImageSource {
    fn decode(&self, path: &str) -> Result<RgbaImage, AssetError> {
        let full = self.resolve(path);
        image::open(&full)
            .map(|img| img.to_rgba8())
            .map_err(|source| AssetError::Decode {
                path: full.display().to_string(),
                source,
            })
    }
}

/// Pre-decoded images keyed by asset path.
#[derive(Debug, Default)]
pub struct MemoryImageSource {
    images: FxHashMap<String, RgbaImage>,
    decodes: AtomicUsize,
}

impl MemoryImageSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_image(mut self, path: impl Into<String>, image: RgbaImage) -> Self {
        self.insert(path, image);
        self
    }

    pub fn insert(&mut self, path: impl Into<String>, image: RgbaImage) {
        self.images.insert(path.into(), image);
    }

    /// Number of successful decodes served so far.
    pub fn decode_count(&self) -> usize {
        self.decodes.load(Ordering::Relaxed)
    }
}

impl ImageSource for MemoryImageSource {
    fn decode(&self, path: &str) -> Result<RgbaImage, AssetError> {
        let image = self
            .images
            .get(path)
            .cloned()
            .ok_or_else(|| AssetError::NotFound(path.to_string()))?;
        self.decodes.fetch_add(1, Ordering::Relaxed);
        Ok(image)
    }
}

impl<S: ImageSource + ?Sized> ImageSource for Arc<S> {
    fn decode(&self, path: &str) -> Result<RgbaImage, AssetError> {
        (**self).decode(path)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct TextureKey {
    path: String,
    frame: Option<Rect>,
}

/// Process-wide texture cache keyed by source path (and frame rectangle).
pub struct TextureStore {
    source: Box<dyn ImageSource>,
    map: RwLock<FxHashMap<TextureKey, Texture>>,
}

impl TextureStore {
    pub fn new(source: impl ImageSource + 'static) -> Self {
        Self {
            source: Box::new(source),
            map: RwLock::new(FxHashMap::default()),
        }
    }

    /// Convenience constructor returning the store already wrapped for sharing.
    pub fn shared(source: impl ImageSource + 'static) -> Arc<Self> {
        Arc::new(Self::new(source))
    }

    fn read_map(&self) -> RwLockReadGuard<'_, FxHashMap<TextureKey, Texture>> {
        self.map.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_map(&self) -> RwLockWriteGuard<'_, FxHashMap<TextureKey, Texture>> {
        self.map.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn lookup(&self, path: &str, frame: Option<Rect>) -> Option<Texture> {
        self.read_map()
            .get(&TextureKey {
                path: path.to_string(),
                frame,
            })
            .cloned()
    }

    fn insert(&self, path: &str, frame: Option<Rect>, texture: Texture) -> Texture {
        self.write_map()
            .entry(TextureKey {
                path: path.to_string(),
                frame,
            })
            .or_insert(texture)
            .clone()
    }

    /// Load a whole image, decoding it only on the first request.
    pub fn try_load(&self, path: &str) -> Result<Texture, AssetError> {
        if let Some(texture) = self.lookup(path, None) {
            return Ok(texture);
        }
        let image = self.source.decode(path)?;
        debug!("Decoded texture {} ({}x{})", path, image.width(), image.height());
        Ok(self.insert(path, None, Texture::from_image(path, image)))
    }

    /// Like [`TextureStore::try_load`], but logs failures and returns the placeholder.
    pub fn load(&self, path: &str) -> Texture {
        self.try_load(path).unwrap_or_else(|e| {
            warn!("Texture load failed, using placeholder: {}", e);
            Texture::empty()
        })
    }

    /// Load a sub-rectangle of an image as its own texture view.
    pub fn try_load_frame(&self, path: &str, frame: Rect) -> Result<Texture, AssetError> {
        if let Some(texture) = self.lookup(path, Some(frame)) {
            return Ok(texture);
        }
        let view = self.try_load(path)?.view(frame)?;
        Ok(self.insert(path, Some(frame), view))
    }

    /// Load a list of standalone images, one texture per path.
    pub fn load_sequence<S: AsRef<str>>(&self, paths: &[S]) -> Vec<Texture> {
        paths.iter().map(|p| self.load(p.as_ref())).collect()
    }

    /// Slice a sprite sheet into `frame_count` textures.
    ///
    /// Only invalid geometry is an error. A sheet that fails to decode yields
    /// `frame_count` placeholders; individual frames that fall outside the
    /// sheet are replaced by the placeholder.
    pub fn load_sheet(
        &self,
        path: &str,
        geometry: &SheetGeometry,
    ) -> Result<Vec<Texture>, AssetError> {
        geometry.validate()?;
        let count = geometry.frame_count as usize;
        if let Err(e) = self.try_load(path) {
            error!("Sprite sheet unavailable, using placeholders: {}", e);
            return Ok(vec![Texture::empty(); count]);
        }
        let frames = (0..geometry.frame_count)
            .map(|index| {
                let rect = geometry.frame_rect(index);
                self.try_load_frame(path, rect).unwrap_or_else(|e| {
                    warn!("Frame {} of {} skipped: {}", index, path, e);
                    Texture::empty()
                })
            })
            .collect();
        Ok(frames)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.lookup(path, None).is_some()
    }

    /// Number of cached entries (whole images and frame views).
    pub fn len(&self) -> usize {
        self.read_map().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read_map().is_empty()
    }

    /// Drop every cached texture. Handles already given out stay valid.
    pub fn clear(&self) {
        let mut map = self.write_map();
        debug!("Clearing {} cached textures", map.len());
        map.clear();
    }
}
