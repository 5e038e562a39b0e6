//! Drawing surfaces and the hosts that hand them out.
//!
//! A [`SurfaceHost`] stands for the layout box an effect is mounted into. It
//! attaches a [`Surface`] of the requested size; the scene draws into it each
//! tick and detaches it exactly once when torn down.
//!
//! [`HeadlessHost`] produces [`RecordingSurface`]s that keep counters and the
//! draw list of the last presented frame. It is what tests and the CLI's dry
//! runs use. [`CanvasHost`](crate::resources::canvas::CanvasHost) rasterizes
//! into an image instead.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use glam::Vec2;
use log::{debug, warn};
use thiserror::Error;

use crate::resources::texturestore::Texture;

#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error("Surface size {width}x{height} is invalid")]
    InvalidSize { width: u32, height: u32 },
    #[error("Host refused to attach a surface: {0}")]
    AttachRefused(String),
    #[error("Could not write frame {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: image::ImageError,
    },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// One sprite to draw, already resolved to its current frame.
#[derive(Debug, Clone)]
pub struct DrawCommand {
    pub texture: Texture,
    /// Anchor position in surface pixels.
    pub position: Vec2,
    pub scale: Vec2,
    /// Normalized pivot over the texture.
    pub anchor: Vec2,
    pub z: i32,
}

impl DrawCommand {
    /// Drawn size in pixels (always positive).
    pub fn size(&self) -> Vec2 {
        Vec2::new(
            self.texture.width() as f32 * self.scale.x.abs(),
            self.texture.height() as f32 * self.scale.y.abs(),
        )
    }

    /// Top-left corner of the drawn box. Mirroring flips the box around the anchor.
    pub fn top_left(&self) -> Vec2 {
        let size = self.size();
        let ax = if self.flip_x() {
            1.0 - self.anchor.x
        } else {
            self.anchor.x
        };
        let ay = if self.flip_y() {
            1.0 - self.anchor.y
        } else {
            self.anchor.y
        };
        self.position - Vec2::new(ax * size.x, ay * size.y)
    }

    pub fn flip_x(&self) -> bool {
        self.scale.x < 0.0
    }

    pub fn flip_y(&self) -> bool {
        self.scale.y < 0.0
    }
}

/// Where a scene draws.
pub trait Surface: Send {
    fn size(&self) -> (u32, u32);
    /// Start a frame, filling with black at `background_alpha` (0 = transparent).
    fn clear(&mut self, background_alpha: f32);
    fn draw(&mut self, command: &DrawCommand);
    /// Finish the frame.
    fn present(&mut self) -> Result<(), SurfaceError>;
    /// Release the surface from its host. Must be safe to call twice.
    fn detach(&mut self);
}

/// The host layout box that surfaces are attached to.
pub trait SurfaceHost: Send {
    fn attach(&mut self, width: u32, height: u32) -> Result<Box<dyn Surface>, SurfaceError>;
}

pub(crate) fn check_size(width: u32, height: u32) -> Result<(), SurfaceError> {
    if width == 0 || height == 0 {
        return Err(SurfaceError::InvalidSize { width, height });
    }
    Ok(())
}

/// Counters shared between a [`HeadlessHost`] and its surfaces.
#[derive(Debug, Default, Clone)]
pub struct SurfaceStats {
    pub attached: u32,
    pub detached: u32,
    pub frames_presented: u64,
    pub last_frame: Vec<DrawCommand>,
    refuse_attaches: u32,
}

impl SurfaceStats {
    /// Surfaces attached and not yet detached.
    pub fn live(&self) -> u32 {
        self.attached - self.detached
    }
}

/// In-memory host. Clones share the same counters.
#[derive(Debug, Default, Clone)]
pub struct HeadlessHost {
    stats: Arc<Mutex<SurfaceStats>>,
}

impl HeadlessHost {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, SurfaceStats> {
        self.stats.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make the next `count` attach calls fail.
    pub fn refuse_next_attaches(&self, count: u32) {
        self.lock().refuse_attaches = count;
    }

    pub fn stats(&self) -> SurfaceStats {
        self.lock().clone()
    }

    pub fn attach_count(&self) -> u32 {
        self.lock().attached
    }

    pub fn detach_count(&self) -> u32 {
        self.lock().detached
    }

    pub fn live_surfaces(&self) -> u32 {
        self.lock().live()
    }

    pub fn frames_presented(&self) -> u64 {
        self.lock().frames_presented
    }

    pub fn last_frame(&self) -> Vec<DrawCommand> {
        self.lock().last_frame.clone()
    }
}

impl SurfaceHost for HeadlessHost {
    fn attach(&mut self, width: u32, height: u32) -> Result<Box<dyn Surface>, SurfaceError> {
        check_size(width, height)?;
        let mut stats = self.lock();
        if stats.refuse_attaches > 0 {
            stats.refuse_attaches -= 1;
            return Err(SurfaceError::AttachRefused("headless host is refusing".into()));
        }
        stats.attached += 1;
        debug!("Headless surface {}x{} attached", width, height);
        Ok(Box::new(RecordingSurface {
            width,
            height,
            pending: Vec::new(),
            detached: false,
            stats: Arc::clone(&self.stats),
        }))
    }
}

/// Surface that records draw commands instead of rasterizing.
#[derive(Debug)]
pub struct RecordingSurface {
    width: u32,
    height: u32,
    pending: Vec<DrawCommand>,
    detached: bool,
    stats: Arc<Mutex<SurfaceStats>>,
}

impl Surface for RecordingSurface {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn clear(&mut self, _background_alpha: f32) {
        self.pending.clear();
    }

    fn draw(&mut self, command: &DrawCommand) {
        self.pending.push(command.clone());
    }

    fn present(&mut self) -> Result<(), SurfaceError> {
        if self.detached {
            warn!("Present on a detached surface ignored");
            return Ok(());
        }
        let mut stats = self.stats.lock().unwrap_or_else(PoisonError::into_inner);
        stats.frames_presented += 1;
        stats.last_frame = std::mem::take(&mut self.pending);
        Ok(())
    }

    fn detach(&mut self) {
        if self.detached {
            return;
        }
        self.detached = true;
        self.pending.clear();
        self.stats
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .detached += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbaImage;

    fn command(scale: Vec2) -> DrawCommand {
        DrawCommand {
            texture: Texture::from_image("/t.png", RgbaImage::new(10, 20)),
            position: Vec2::new(100.0, 100.0),
            scale,
            anchor: Vec2::new(0.25, 0.5),
            z: 0,
        }
    }

    #[test]
    fn test_mirrored_box_flips_around_anchor() {
        let normal = command(Vec2::new(2.0, 1.0));
        assert_eq!(normal.size(), Vec2::new(20.0, 20.0));
        assert_eq!(normal.top_left(), Vec2::new(95.0, 90.0));

        let mirrored = command(Vec2::new(-2.0, 1.0));
        assert_eq!(mirrored.top_left(), Vec2::new(85.0, 90.0));
    }

    #[test]
    fn test_headless_detach_counts_once() {
        let mut host = HeadlessHost::new();
        let mut surface = host.attach(8, 8).unwrap();
        surface.detach();
        surface.detach();
        assert_eq!(host.attach_count(), 1);
        assert_eq!(host.detach_count(), 1);
        assert_eq!(host.live_surfaces(), 0);
    }

    #[test]
    fn test_refused_attach_then_recovers() {
        let mut host = HeadlessHost::new();
        host.refuse_next_attaches(1);
        assert!(matches!(
            host.attach(8, 8),
            Err(SurfaceError::AttachRefused(_))
        ));
        assert!(host.attach(8, 8).is_ok());
    }

    #[test]
    fn test_zero_size_is_rejected() {
        let mut host = HeadlessHost::new();
        assert!(matches!(
            host.attach(0, 8),
            Err(SurfaceError::InvalidSize { .. })
        ));
    }

    #[test]
    fn test_present_publishes_frame() {
        let mut host = HeadlessHost::new();
        let mut surface = host.attach(8, 8).unwrap();
        surface.clear(0.0);
        surface.draw(&command(Vec2::ONE));
        surface.present().unwrap();
        assert_eq!(host.frames_presented(), 1);
        assert_eq!(host.last_frame().len(), 1);
    }
}
