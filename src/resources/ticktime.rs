use bevy_ecs::prelude::Resource;

/// Ticker clock. One tick is one display frame (60 per second at the
/// default rate); `delta` is the scaled number of ticks since the last run.
#[derive(Resource, Clone, Copy, Debug)]
pub struct TickTime {
    pub elapsed: f32,
    pub delta: f32,
    pub time_scale: f32,
    pub tick_count: u64,
}

impl Default for TickTime {
    fn default() -> Self {
        TickTime {
            elapsed: 0.0,
            delta: 0.0,
            time_scale: 1.0,
            tick_count: 0,
        }
    }
}

impl TickTime {
    /// Convert a wall-clock duration to ticks at `fps`.
    pub fn ticks_for_millis(millis: u64, fps: u32) -> u64 {
        millis.saturating_mul(u64::from(fps.max(1))).div_ceil(1000)
    }
}
