//! Boundary collision events.
//!
//! The motion system emits [`BoundaryHitEvent`] the first time a moving sprite
//! crosses the boundary in front of it. The event carries the side that was
//! reached, which the effect maps to its hit-left / hit-right callback.
use bevy_ecs::observer::On;
use bevy_ecs::prelude::*;
use log::debug;

use crate::components::motion::Side;
use crate::resources::deferred::{SignalQueue, SpriteSignal};

/// Fired when `entity` reaches `side`.
#[derive(Event, Debug, Clone, Copy)]
pub struct BoundaryHitEvent {
    pub entity: Entity,
    pub side: Side,
}

/// Scene observer: record the hit for the owning effect.
pub fn queue_boundary_hit(trigger: On<BoundaryHitEvent>, mut queue: ResMut<SignalQueue>) {
    let event = trigger.event();
    debug!("{:?} hit the {:?} boundary", event.entity, event.side);
    queue.push(SpriteSignal::BoundaryHit {
        entity: event.entity,
        side: event.side,
    });
}
