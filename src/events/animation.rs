//! Frame-sequence completion.
//!
//! The [`animation`](crate::systems::animation::animation) system triggers
//! [`FramesEndedEvent`] when a non-looping sprite reaches its last frame. The
//! motion system triggers it with `forced = true` when a boundary crossing
//! cuts a sequence short. Either way it fires once per play cycle.
use bevy_ecs::observer::On;
use bevy_ecs::prelude::*;
use log::debug;

use crate::resources::deferred::{SignalQueue, SpriteSignal};

#[derive(Event, Debug, Clone, Copy)]
pub struct FramesEndedEvent {
    pub entity: Entity,
    pub forced: bool,
}

/// Scene observer: record the completion for the owning effect.
pub fn queue_frames_ended(trigger: On<FramesEndedEvent>, mut queue: ResMut<SignalQueue>) {
    let event = trigger.event();
    debug!(
        "Frames ended on {:?} (forced: {})",
        event.entity, event.forced
    );
    queue.push(SpriteSignal::FramesEnded {
        entity: event.entity,
        forced: event.forced,
    });
}
