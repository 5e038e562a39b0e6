//! Scene: display list, ticker and drawing surface for one effect mount.
//!
//! The display list is a [`World`] holding one entity per sprite. The ticker
//! is a single-threaded [`Schedule`] running [`animation`] then [`motion`];
//! each [`Scene::tick`] updates the clock, runs the ticker, renders into the
//! attached [`Surface`] and hands back the signals raised during the tick.
//!
//! [`Scene::teardown`] stops the ticker, clears the display list and detaches
//! the surface. It is idempotent and also runs on drop, so a scene can never
//! leak its surface.

use bevy_ecs::prelude::*;
use bevy_ecs::schedule::ExecutorKind;
use log::{debug, error};

use crate::events::animation::queue_frames_ended;
use crate::events::collision::queue_boundary_hit;
use crate::resources::deferred::{SignalQueue, SpriteSignal};
use crate::resources::rendertarget::{Surface, SurfaceError, SurfaceHost};
use crate::resources::ticktime::TickTime;
use crate::systems::animation::animation;
use crate::systems::motion::motion;
use crate::systems::render::render_pass;
use crate::systems::time::update_tick_time;

/// What one ticker invocation produced.
#[derive(Debug, Default)]
pub struct TickOutcome {
    pub signals: Vec<SpriteSignal>,
    /// A frame reached the surface.
    pub presented: bool,
}

pub struct Scene {
    world: World,
    schedule: Schedule,
    surface: Option<Box<dyn Surface>>,
    background_alpha: f32,
    running: bool,
    render_failures: u32,
}

impl Scene {
    /// Build a running scene around an already attached surface.
    pub fn new(surface: Box<dyn Surface>, background_alpha: f32) -> Self {
        let mut world = World::new();
        world.insert_resource(TickTime::default());
        world.insert_resource(SignalQueue::default());
        world.add_observer(queue_frames_ended);
        world.add_observer(queue_boundary_hit);
        world.flush();

        let mut schedule = Schedule::default();
        schedule.set_executor_kind(ExecutorKind::SingleThreaded);
        schedule.add_systems((animation, motion).chain());

        Self {
            world,
            schedule,
            surface: Some(surface),
            background_alpha,
            running: true,
            render_failures: 0,
        }
    }

    /// Attach a `width` x `height` surface from `host` and build a scene on it.
    pub fn acquire(
        host: &mut dyn SurfaceHost,
        width: u32,
        height: u32,
        background_alpha: f32,
    ) -> Result<Self, SurfaceError> {
        let surface = host.attach(width, height)?;
        debug!("Scene acquired a {}x{} surface", width, height);
        Ok(Self::new(surface, background_alpha))
    }

    pub fn spawn(&mut self, bundle: impl Bundle) -> Entity {
        self.world.spawn(bundle).id()
    }

    pub fn get<T: Component>(&self, entity: Entity) -> Option<&T> {
        self.world.get::<T>(entity)
    }

    pub fn get_mut<T: Component<Mutability = bevy_ecs::component::Mutable>>(
        &mut self,
        entity: Entity,
    ) -> Option<Mut<'_, T>> {
        self.world.get_mut::<T>(entity)
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Run one ticker invocation. Stopped or torn-down scenes do nothing.
    ///
    /// Render failures are logged and counted, never propagated; the signals
    /// of the tick are returned either way.
    pub fn tick(&mut self, delta_ticks: f32) -> TickOutcome {
        if !self.running {
            return TickOutcome::default();
        }
        update_tick_time(&mut self.world, delta_ticks);
        self.schedule.run(&mut self.world);

        let mut presented = false;
        if let Some(surface) = self.surface.as_deref_mut() {
            match render_pass(&mut self.world, surface, self.background_alpha) {
                Ok(()) => presented = true,
                Err(e) => {
                    self.render_failures += 1;
                    error!("Render failed: {}", e);
                }
            }
        }

        TickOutcome {
            signals: self.world.resource_mut::<SignalQueue>().drain(),
            presented,
        }
    }

    /// Resume the ticker. Has no effect after teardown.
    pub fn start(&mut self) {
        if self.surface.is_some() {
            self.running = true;
        }
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_torn_down(&self) -> bool {
        self.surface.is_none()
    }

    pub fn size(&self) -> Option<(u32, u32)> {
        self.surface.as_ref().map(|s| s.size())
    }

    pub fn tick_count(&self) -> u64 {
        self.world.resource::<TickTime>().tick_count
    }

    pub fn render_failures(&self) -> u32 {
        self.render_failures
    }

    /// Stop the ticker, clear the display list and detach the surface.
    pub fn teardown(&mut self) {
        let Some(mut surface) = self.surface.take() else {
            return;
        };
        self.running = false;
        self.world.clear_entities();
        surface.detach();
        debug!(
            "Scene torn down after {} ticks",
            self.world.resource::<TickTime>().tick_count
        );
    }
}

impl Drop for Scene {
    fn drop(&mut self) {
        self.teardown();
    }
}
