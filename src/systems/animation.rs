//! Animation system.
//!
//! [`animation`] advances every [`AnimatedSprite`] by the tick delta and
//! copies the resulting frame into the entity's [`Sprite`], which is what the
//! render pass draws.
//!
//! # Related
//!
//! - [`crate::components::animation::AnimatedSprite`] – playback state
//! - [`crate::events::animation::FramesEndedEvent`] – completion notification
//! - [`crate::systems::motion::motion`] – runs right after this system

use bevy_ecs::prelude::*;

use crate::components::animation::AnimatedSprite;
use crate::components::sprite::Sprite;
use crate::events::animation::FramesEndedEvent;
use crate::resources::ticktime::TickTime;

/// Advance playback and update the displayed frame.
///
/// Contract
/// - Reads [`TickTime::delta`] (ticks, already scaled).
/// - Stopped sprites keep their frame.
/// - Triggers [`FramesEndedEvent`] with `forced = false` on the tick a
///   non-looping sprite completes.
pub fn animation(
    mut query: Query<(Entity, &mut AnimatedSprite, &mut Sprite)>,
    time: Res<TickTime>,
    mut commands: Commands,
) {
    for (entity, mut anim, mut sprite) in query.iter_mut() {
        if anim.advance(time.delta) {
            commands.trigger(FramesEndedEvent {
                entity,
                forced: false,
            });
        }
        if sprite.texture != *anim.texture() {
            sprite.texture = anim.texture().clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::texturestore::Texture;
    use image::RgbaImage;

    fn frames(n: usize) -> Vec<Texture> {
        (0..n)
            .map(|i| Texture::from_image(format!("/f{i}.png"), RgbaImage::new(1, 1)))
            .collect()
    }

    fn setup(delta: f32) -> (World, Schedule) {
        let mut world = World::new();
        world.insert_resource(TickTime {
            delta,
            ..Default::default()
        });
        let mut schedule = Schedule::default();
        schedule.add_systems(animation);
        (world, schedule)
    }

    #[test]
    fn test_sprite_texture_follows_current_frame() {
        let (mut world, mut schedule) = setup(1.0);
        let frames = frames(3);
        let mut anim = AnimatedSprite::new(frames.clone());
        anim.play(0);
        let entity = world.spawn((anim, Sprite::new(frames[0].clone()))).id();

        schedule.run(&mut world);

        let sprite = world.get::<Sprite>(entity).unwrap();
        assert_eq!(sprite.texture.source(), "/f1.png");
    }

    #[test]
    fn test_stopped_sprite_does_not_advance() {
        let (mut world, mut schedule) = setup(1.0);
        let frames = frames(3);
        let entity = world
            .spawn((AnimatedSprite::new(frames.clone()), Sprite::new(frames[0].clone())))
            .id();

        schedule.run(&mut world);

        let anim = world.get::<AnimatedSprite>(entity).unwrap();
        assert_eq!(anim.current_frame(), 0);
        assert!(!anim.is_completed());
    }
}
