//! Software compositor.
//!
//! [`CanvasSurface`] rasterizes draw commands into an RGBA image with
//! nearest-neighbour sampling, honouring anchor, mirroring and source-over
//! alpha blending. Each presented frame is published to the owning
//! [`CanvasHost`] and can optionally be written out as a numbered PNG.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use image::{Rgba, RgbaImage};
use log::{debug, info};

use crate::resources::rendertarget::{DrawCommand, Surface, SurfaceError, SurfaceHost, check_size};

#[derive(Debug, Default, Clone)]
pub struct CanvasHost {
    output_dir: Option<PathBuf>,
    snapshot: Arc<Mutex<Option<RgbaImage>>>,
}

impl CanvasHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write every presented frame as `frame_NNNNN.png` into `dir`.
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    /// The most recently presented frame, if any.
    pub fn last_frame(&self) -> Option<RgbaImage> {
        self.snapshot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl SurfaceHost for CanvasHost {
    fn attach(&mut self, width: u32, height: u32) -> Result<Box<dyn Surface>, SurfaceError> {
        check_size(width, height)?;
        if let Some(dir) = &self.output_dir {
            std::fs::create_dir_all(dir)?;
            info!("Writing frames to {}", dir.display());
        }
        Ok(Box::new(CanvasSurface {
            image: RgbaImage::new(width, height),
            output_dir: self.output_dir.clone(),
            frame_index: 0,
            detached: false,
            snapshot: Arc::clone(&self.snapshot),
        }))
    }
}

pub struct CanvasSurface {
    image: RgbaImage,
    output_dir: Option<PathBuf>,
    frame_index: u64,
    detached: bool,
    snapshot: Arc<Mutex<Option<RgbaImage>>>,
}

impl CanvasSurface {
    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    fn write_frame(&self, dir: &Path) -> Result<(), SurfaceError> {
        let path = dir.join(format!("frame_{:05}.png", self.frame_index));
        self.image
            .save(&path)
            .map_err(|source| SurfaceError::Write {
                path: path.display().to_string(),
                source,
            })
    }
}

/// Source-over blend of `src` onto `dst`.
fn blend(dst: &mut Rgba<u8>, src: Rgba<u8>) {
    let sa = src[3] as f32 / 255.0;
    if sa <= 0.0 {
        return;
    }
    let da = dst[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);
    for c in 0..3 {
        let s = src[c] as f32 / 255.0;
        let d = dst[c] as f32 / 255.0;
        let v = (s * sa + d * da * (1.0 - sa)) / out_a;
        dst[c] = (v * 255.0).round() as u8;
    }
    dst[3] = (out_a * 255.0).round() as u8;
}

impl Surface for CanvasSurface {
    fn size(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    fn clear(&mut self, background_alpha: f32) {
        let alpha = (background_alpha.clamp(0.0, 1.0) * 255.0).round() as u8;
        for pixel in self.image.pixels_mut() {
            *pixel = Rgba([0, 0, 0, alpha]);
        }
    }

    fn draw(&mut self, command: &DrawCommand) {
        let size = command.size();
        if size.x <= 0.0 || size.y <= 0.0 {
            return;
        }
        let (tw, th) = (command.texture.width(), command.texture.height());
        let min = command.top_left();
        let (cw, ch) = self.image.dimensions();

        let x0 = min.x.floor().max(0.0) as u32;
        let y0 = min.y.floor().max(0.0) as u32;
        let x1 = ((min.x + size.x).ceil().max(0.0) as u32).min(cw);
        let y1 = ((min.y + size.y).ceil().max(0.0) as u32).min(ch);

        for py in y0..y1 {
            let fy = (py as f32 + 0.5 - min.y) / size.y;
            if !(0.0..1.0).contains(&fy) {
                continue;
            }
            let mut v = ((fy * th as f32) as u32).min(th - 1);
            if command.flip_y() {
                v = th - 1 - v;
            }
            for px in x0..x1 {
                let fx = (px as f32 + 0.5 - min.x) / size.x;
                if !(0.0..1.0).contains(&fx) {
                    continue;
                }
                let mut u = ((fx * tw as f32) as u32).min(tw - 1);
                if command.flip_x() {
                    u = tw - 1 - u;
                }
                if let Some(src) = command.texture.pixel(u, v) {
                    blend(self.image.get_pixel_mut(px, py), src);
                }
            }
        }
    }

    fn present(&mut self) -> Result<(), SurfaceError> {
        if self.detached {
            return Ok(());
        }
        if let Some(dir) = &self.output_dir {
            self.write_frame(dir)?;
        }
        self.frame_index += 1;
        *self.snapshot.lock().unwrap_or_else(PoisonError::into_inner) = Some(self.image.clone());
        Ok(())
    }

    fn detach(&mut self) {
        if !self.detached {
            self.detached = true;
            debug!("Canvas surface detached after {} frames", self.frame_index);
        }
    }
}
