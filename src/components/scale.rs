use bevy_ecs::prelude::Component;
use glam::Vec2;

/// Per-axis scale. A negative x mirrors the sprite horizontally around its anchor.
#[derive(Component, Clone, Debug, Copy, PartialEq)]
pub struct Scale {
    pub scale: Vec2,
}

impl Scale {
    pub fn new(sx: f32, sy: f32) -> Self {
        Self {
            scale: Vec2::new(sx, sy),
        }
    }

    pub fn uniform(s: f32) -> Self {
        Self::new(s, s)
    }

    /// Same magnitude, facing the other way.
    pub fn mirrored_x(self) -> Self {
        Self::new(-self.scale.x, self.scale.y)
    }

    pub fn is_mirrored_x(&self) -> bool {
        self.scale.x < 0.0
    }
}

impl Default for Scale {
    fn default() -> Self {
        Self::new(1.0, 1.0)
    }
}
