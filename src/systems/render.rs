use bevy_ecs::prelude::*;
use glam::Vec2;

use crate::components::mapposition::MapPosition;
use crate::components::scale::Scale;
use crate::components::sprite::Sprite;
use crate::components::zindex::ZIndex;
use crate::resources::rendertarget::{DrawCommand, Surface, SurfaceError};

/// Draw every visible sprite into `surface`, lowest [`ZIndex`] first.
/// Entities with equal z keep their query order.
pub fn render_pass(
    world: &mut World,
    surface: &mut dyn Surface,
    background_alpha: f32,
) -> Result<(), SurfaceError> {
    let mut to_draw: Vec<DrawCommand> = {
        let mut q = world.query::<(&Sprite, &MapPosition, Option<&Scale>, Option<&ZIndex>)>();
        q.iter(world)
            .filter(|(sprite, ..)| sprite.visible)
            .map(|(sprite, pos, scale, z)| DrawCommand {
                texture: sprite.texture.clone(),
                position: pos.pos,
                scale: scale.map_or(Vec2::ONE, |s| s.scale),
                anchor: sprite.anchor,
                z: z.copied().unwrap_or_default().0,
            })
            .collect()
    };

    to_draw.sort_by_key(|cmd| cmd.z);

    surface.clear(background_alpha);
    for cmd in &to_draw {
        surface.draw(cmd);
    }
    surface.present()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::rendertarget::{HeadlessHost, SurfaceHost};
    use crate::resources::texturestore::Texture;
    use image::RgbaImage;

    #[test]
    fn test_hidden_sprites_skipped_and_z_sorted() {
        let mut world = World::new();
        let tex = |name: &str| Texture::from_image(name.to_string(), RgbaImage::new(1, 1));
        world.spawn((Sprite::new(tex("/top.png")), MapPosition::new(0.0, 0.0), ZIndex(5)));
        world.spawn((Sprite::new(tex("/low.png")), MapPosition::new(0.0, 0.0), ZIndex(-1)));
        world.spawn((Sprite::new(tex("/gone.png")).hidden(), MapPosition::new(0.0, 0.0)));

        let mut host = HeadlessHost::new();
        let mut surface = host.attach(10, 10).unwrap();
        render_pass(&mut world, surface.as_mut(), 0.0).unwrap();

        let frame = host.last_frame();
        let names: Vec<&str> = frame.iter().map(|c| c.texture.source()).collect();
        assert_eq!(names, vec!["/low.png", "/top.png"]);
    }
}
