//! Tick clock update.
//!
//! Updates the shared [`TickTime`](crate::resources::ticktime::TickTime)
//! resource once per ticker invocation, applying `time_scale` to the delta.
use bevy_ecs::prelude::*;

use crate::resources::ticktime::TickTime;

/// Advance the clock by `delta_ticks` (unscaled) and count the tick.
pub fn update_tick_time(world: &mut World, delta_ticks: f32) {
    let mut time = world.resource_mut::<TickTime>();
    let scaled = delta_ticks.max(0.0) * time.time_scale;
    time.elapsed += scaled;
    time.delta = scaled;
    time.tick_count += 1;
}
