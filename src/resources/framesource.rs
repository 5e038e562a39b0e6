//! Frame sources: how an effect's ordered frame sequence is described.
//!
//! A [`FrameSource`] is resolved once, at load time, into a uniform
//! `Vec<Texture>` through the shared [`TextureStore`]. After that point the
//! animation code never cares whether the frames came from separate files or
//! from a sliced sprite sheet.

use serde::{Deserialize, Serialize};

use crate::resources::texturestore::{AssetError, Rect, Texture, TextureStore};

fn default_horizontal() -> bool {
    true
}

fn default_rows() -> u32 {
    1
}

/// Layout of equally sized frames inside a sprite sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetGeometry {
    pub frame_width: u32,
    pub frame_height: u32,
    pub frame_count: u32,
    /// Frames run along rows first (true) or down columns first (false).
    #[serde(default = "default_horizontal")]
    pub horizontal: bool,
    #[serde(default = "default_rows")]
    pub rows: u32,
    /// Zero means derived from `frame_count` and `rows`.
    #[serde(default)]
    pub columns: u32,
    /// Inset applied on every side of a frame to avoid bleeding.
    #[serde(default)]
    pub padding: u32,
}

impl SheetGeometry {
    pub fn new(frame_width: u32, frame_height: u32, frame_count: u32) -> Self {
        Self {
            frame_width,
            frame_height,
            frame_count,
            horizontal: true,
            rows: 1,
            columns: 0,
            padding: 0,
        }
    }

    pub fn with_columns(mut self, columns: u32) -> Self {
        self.columns = columns;
        self
    }

    pub fn with_rows(mut self, rows: u32) -> Self {
        self.rows = rows;
        self
    }

    pub fn with_padding(mut self, padding: u32) -> Self {
        self.padding = padding;
        self
    }

    pub fn vertical(mut self) -> Self {
        self.horizontal = false;
        self
    }

    pub fn columns(&self) -> u32 {
        if self.columns > 0 {
            self.columns
        } else {
            self.frame_count.div_ceil(self.rows.max(1)).max(1)
        }
    }

    /// `(column, row)` of the frame at `index`.
    pub fn cell(&self, index: u32) -> (u32, u32) {
        if self.horizontal {
            let cols = self.columns();
            (index % cols, index / cols)
        } else {
            let rows = self.rows.max(1);
            (index / rows, index % rows)
        }
    }

    /// Pixel rectangle of the frame at `index`, padding applied.
    pub fn frame_rect(&self, index: u32) -> Rect {
        let (col, row) = self.cell(index);
        let pad = self.padding;
        Rect::new(
            col.saturating_mul(self.frame_width).saturating_add(pad),
            row.saturating_mul(self.frame_height).saturating_add(pad),
            self.frame_width.saturating_sub(pad.saturating_mul(2)),
            self.frame_height.saturating_sub(pad.saturating_mul(2)),
        )
    }

    /// Highest `(column, row)` used by any frame.
    fn last_cell(&self) -> (u32, u32) {
        let last = self.frame_count.saturating_sub(1);
        if self.horizontal {
            let cols = self.columns();
            (last.min(cols - 1), last / cols)
        } else {
            let rows = self.rows.max(1);
            (last / rows, last.min(rows - 1))
        }
    }

    pub fn validate(&self) -> Result<(), AssetError> {
        if self.frame_count == 0 {
            return Err(AssetError::EmptySequence);
        }
        if self.frame_width == 0 || self.frame_height == 0 {
            return Err(AssetError::InvalidGeometry(format!(
                "frame size {}x{} is empty",
                self.frame_width, self.frame_height
            )));
        }
        let inset = self.padding.checked_mul(2);
        if inset.is_none_or(|inset| inset >= self.frame_width.min(self.frame_height)) {
            return Err(AssetError::InvalidGeometry(format!(
                "padding {} leaves nothing of a {}x{} frame",
                self.padding, self.frame_width, self.frame_height
            )));
        }
        let (col, row) = self.last_cell();
        let right = (col + 1).checked_mul(self.frame_width);
        let bottom = (row + 1).checked_mul(self.frame_height);
        if right.is_none() || bottom.is_none() {
            return Err(AssetError::InvalidGeometry(format!(
                "{} frames of {}x{} do not fit in a sheet",
                self.frame_count, self.frame_width, self.frame_height
            )));
        }
        Ok(())
    }
}

/// Where the frames of an animation come from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FrameSource {
    /// One image per frame.
    Discrete { paths: Vec<String> },
    /// One image sliced into frames.
    SpriteSheet {
        path: String,
        geometry: SheetGeometry,
    },
    /// A named motion under `/game/<name>/<name><i>.png`.
    Motion { name: String, frame_count: u32 },
}

impl FrameSource {
    pub fn motion(name: impl Into<String>, frame_count: u32) -> Self {
        FrameSource::Motion {
            name: name.into(),
            frame_count,
        }
    }

    pub fn sheet(path: impl Into<String>, geometry: SheetGeometry) -> Self {
        FrameSource::SpriteSheet {
            path: path.into(),
            geometry,
        }
    }

    pub fn discrete<S: Into<String>>(paths: impl IntoIterator<Item = S>) -> Self {
        FrameSource::Discrete {
            paths: paths.into_iter().map(Into::into).collect(),
        }
    }

    /// Frame paths of a named motion, numbered from 1.
    pub fn motion_paths(name: &str, frame_count: u32) -> Vec<String> {
        (1..=frame_count)
            .map(|i| format!("/game/{name}/{name}{i}.png"))
            .collect()
    }

    /// Number of frames this source resolves to.
    pub fn frame_count(&self) -> usize {
        match self {
            FrameSource::Discrete { paths } => paths.len(),
            FrameSource::SpriteSheet { geometry, .. } => geometry.frame_count as usize,
            FrameSource::Motion { frame_count, .. } => *frame_count as usize,
        }
    }

    /// Image to show when the animation cannot be rendered.
    pub fn preview_path(&self) -> Option<String> {
        match self {
            FrameSource::Discrete { paths } => paths.first().cloned(),
            FrameSource::SpriteSheet { path, .. } => Some(path.clone()),
            FrameSource::Motion { name, frame_count } => {
                Self::motion_paths(name, (*frame_count).min(1)).pop()
            }
        }
    }

    /// Resolve into textures. Individual failed images become placeholders;
    /// only empty sequences and bad geometry are errors.
    pub fn resolve(&self, store: &TextureStore) -> Result<Vec<Texture>, AssetError> {
        match self {
            FrameSource::Discrete { paths } => {
                if paths.is_empty() {
                    return Err(AssetError::EmptySequence);
                }
                Ok(store.load_sequence(paths))
            }
            FrameSource::SpriteSheet { path, geometry } => store.load_sheet(path, geometry),
            FrameSource::Motion { name, frame_count } => {
                if *frame_count == 0 {
                    return Err(AssetError::EmptySequence);
                }
                Ok(store.load_sequence(&Self::motion_paths(name, *frame_count)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::texturestore::MemoryImageSource;
    use image::{Rgba, RgbaImage};

    #[test]
    fn test_frame_rect_with_explicit_columns() {
        let geometry = SheetGeometry::new(64, 64, 8).with_columns(4);
        assert_eq!(geometry.frame_rect(5), Rect::new(64, 64, 64, 64));
        assert_eq!(geometry.frame_rect(3), Rect::new(192, 0, 64, 64));
    }

    #[test]
    fn test_derived_columns_round_up() {
        let geometry = SheetGeometry::new(32, 32, 7).with_rows(2);
        assert_eq!(geometry.columns(), 4);
        assert_eq!(geometry.cell(6), (2, 1));
    }

    #[test]
    fn test_vertical_layout_fills_columns_first() {
        let geometry = SheetGeometry::new(16, 16, 6).with_rows(3).vertical();
        assert_eq!(geometry.cell(0), (0, 0));
        assert_eq!(geometry.cell(2), (0, 2));
        assert_eq!(geometry.cell(4), (1, 1));
    }

    #[test]
    fn test_padding_insets_every_side() {
        let geometry = SheetGeometry::new(32, 32, 2).with_padding(1);
        assert_eq!(geometry.frame_rect(1), Rect::new(33, 1, 30, 30));
    }

    #[test]
    fn test_validate_rejects_bad_geometry() {
        assert!(matches!(
            SheetGeometry::new(0, 32, 2).validate(),
            Err(AssetError::InvalidGeometry(_))
        ));
        assert!(matches!(
            SheetGeometry::new(4, 4, 2).with_padding(2).validate(),
            Err(AssetError::InvalidGeometry(_))
        ));
        assert!(matches!(
            SheetGeometry::new(4, 4, 0).validate(),
            Err(AssetError::EmptySequence)
        ));
    }

    #[test]
    fn test_validate_rejects_overflowing_geometry() {
        assert!(matches!(
            SheetGeometry::new(64, 64, 2).with_padding(2_147_483_648).validate(),
            Err(AssetError::InvalidGeometry(_))
        ));
        assert!(matches!(
            SheetGeometry::new(3_000_000_000, 1, 3).validate(),
            Err(AssetError::InvalidGeometry(_))
        ));
        assert!(matches!(
            SheetGeometry::new(1, 3_000_000_000, 3).with_rows(3).vertical().validate(),
            Err(AssetError::InvalidGeometry(_))
        ));
        // two columns of a huge frame still fit
        assert!(SheetGeometry::new(2_000_000_000, 1, 2).validate().is_ok());
    }

    #[test]
    fn test_overflowing_sheet_resolves_to_error() {
        let store = TextureStore::new(
            MemoryImageSource::new().with_image("/s.png", RgbaImage::new(4, 4)),
        );
        let source = FrameSource::sheet("/s.png", SheetGeometry::new(3_000_000_000, 1, 3));
        assert!(matches!(
            source.resolve(&store),
            Err(AssetError::InvalidGeometry(_))
        ));
    }

    #[test]
    fn test_frame_rect_saturates_instead_of_wrapping() {
        let geometry = SheetGeometry::new(3_000_000_000, 1, 3);
        assert_eq!(geometry.frame_rect(2).x, u32::MAX);
    }

    #[test]
    fn test_motion_paths_are_one_based() {
        assert_eq!(
            FrameSource::motion_paths("fire", 2),
            vec!["/game/fire/fire1.png", "/game/fire/fire2.png"]
        );
    }

    #[test]
    fn test_discrete_resolve_keeps_length_with_failures() {
        let pixel = RgbaImage::from_pixel(2, 2, Rgba([255, 0, 0, 255]));
        let store = TextureStore::new(
            MemoryImageSource::new()
                .with_image("/a.png", pixel.clone())
                .with_image("/c.png", pixel),
        );
        let frames = FrameSource::discrete(["/a.png", "/b.png", "/c.png"])
            .resolve(&store)
            .unwrap();
        assert_eq!(frames.len(), 3);
        assert!(frames[1].is_placeholder());
        assert!(!frames[0].is_placeholder());
    }

    #[test]
    fn test_empty_sources_are_errors() {
        let store = TextureStore::new(MemoryImageSource::new());
        assert!(matches!(
            FrameSource::Discrete { paths: vec![] }.resolve(&store),
            Err(AssetError::EmptySequence)
        ));
        assert!(matches!(
            FrameSource::motion("fire", 0).resolve(&store),
            Err(AssetError::EmptySequence)
        ));
    }

    #[test]
    fn test_source_deserializes_from_tagged_json() {
        let json = r#"{"type":"sprite_sheet","path":"/s.png","geometry":{"frame_width":32,"frame_height":32,"frame_count":9}}"#;
        let source: FrameSource = serde_json::from_str(json).unwrap();
        let FrameSource::SpriteSheet { geometry, .. } = &source else {
            panic!("expected a sprite sheet");
        };
        assert!(geometry.horizontal);
        assert_eq!(geometry.rows, 1);
        assert_eq!(source.preview_path().as_deref(), Some("/s.png"));
    }
}
