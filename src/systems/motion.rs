//! Motion system: fixed-step travel and boundary detection.

use bevy_ecs::prelude::*;

use crate::components::animation::AnimatedSprite;
use crate::components::mapposition::MapPosition;
use crate::components::motion::Motion;
use crate::events::animation::FramesEndedEvent;
use crate::events::collision::BoundaryHitEvent;

/// Move active entities by one step and report boundary crossings.
///
/// The step is per tick and does not scale with [`TickTime`](crate::resources::ticktime::TickTime).
/// On the first crossing of a cycle the motion halts, a [`BoundaryHitEvent`]
/// is triggered and the sprite is force-completed; if its frames had not
/// already ended, a forced [`FramesEndedEvent`] follows.
pub fn motion(
    mut query: Query<(
        Entity,
        &mut Motion,
        &mut MapPosition,
        Option<&mut AnimatedSprite>,
    )>,
    mut commands: Commands,
) {
    for (entity, mut motion, mut position, sprite) in query.iter_mut() {
        if !motion.active {
            continue;
        }
        position.pos.x += motion.velocity();

        let Some(side) = motion.check_crossing(position.pos.x) else {
            continue;
        };
        motion.halt();
        commands.trigger(BoundaryHitEvent { entity, side });
        let forced = sprite.is_some_and(|mut sprite| sprite.force_complete());
        if forced {
            commands.trigger(FramesEndedEvent {
                entity,
                forced: true,
            });
        }
    }
}
