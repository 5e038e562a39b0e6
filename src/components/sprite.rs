use bevy_ecs::prelude::Component;
use glam::Vec2;

use crate::resources::texturestore::Texture;

/// Display object: the texture drawn this frame, its pivot and visibility.
/// The anchor is normalized (0..1) over the texture; (0.5, 0.5) is the center.
#[derive(Component, Clone, Debug)]
pub struct Sprite {
    pub texture: Texture,
    pub anchor: Vec2,
    pub visible: bool,
}

impl Sprite {
    pub fn new(texture: Texture) -> Self {
        Self {
            texture,
            anchor: Vec2::splat(0.5),
            visible: true,
        }
    }

    pub fn with_anchor(mut self, x: f32, y: f32) -> Self {
        self.anchor = Vec2::new(x, y);
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }
}
