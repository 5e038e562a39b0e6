//! Battle effect animation: the composition root.
//!
//! An [`EffectAnimation`] owns the lifecycle of one effect instance: the
//! [`Scene`] it draws into, the single animated sprite entity inside it and
//! the sprite's [`Motion`]. The host drives it with four calls:
//!
//! - [`EffectAnimation::mount`] / [`EffectAnimation::unmount`] bracket its
//!   life in the host's layout. Unmount (and drop) always tears the scene
//!   down, and anything still queued for the host is discarded.
//! - [`EffectAnimation::set_playing`] is the play flag. Only transitions
//!   matter: false→true starts a new play cycle from frame 0 with fired flags
//!   reset; true→false stops and hides the sprite.
//! - [`EffectAnimation::tick`] runs one ticker invocation.
//! - [`EffectAnimation::run_deferred`] is the host's next turn: notices raised
//!   during ticks are dispatched to the [`EffectCallbacks`] and returned.
//!
//! # Completion
//!
//! A stationary effect completes when its frames end. A moving effect
//! completes when it reaches the boundary ahead of it: the hit notice is
//! queued first, then completion, both from the same tick. Completion is
//! reported at most once per play cycle.
//!
//! # Failure
//!
//! Nothing here panics or returns errors to the host's render path. If the
//! frames or the surface cannot be acquired the effect becomes
//! [`Readiness::Degraded`], logs why, and exposes a static fallback image.

use std::sync::Arc;

use bevy_ecs::prelude::Entity;
use glam::Vec2;
use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::components::animation::AnimatedSprite;
use crate::components::mapposition::MapPosition;
use crate::components::motion::{Direction, Motion, Side};
use crate::components::scale::Scale;
use crate::components::sprite::Sprite;
use crate::components::zindex::ZIndex;
use crate::resources::deferred::{SpriteSignal, TaskQueue};
use crate::resources::framesource::FrameSource;
use crate::resources::fxconfig::FxConfig;
use crate::resources::rendertarget::{SurfaceError, SurfaceHost};
use crate::resources::texturestore::{AssetError, Texture, TextureStore};
use crate::scene::Scene;

pub const DEFAULT_ANIMATION_SPEED: f32 = 0.2;

#[derive(Debug, Error)]
pub enum EffectError {
    #[error("Invalid effect configuration: {0}")]
    InvalidConfig(String),
    #[error(transparent)]
    Asset(#[from] AssetError),
    #[error(transparent)]
    Surface(#[from] SurfaceError),
}

/// Travel tuning for moving effects. Boundaries are fractions of the width.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionTuning {
    pub step: f32,
    pub left_boundary: f32,
    pub right_boundary: f32,
}

impl Default for MotionTuning {
    fn default() -> Self {
        Self {
            step: 5.0,
            left_boundary: 0.35,
            right_boundary: 0.65,
        }
    }
}

fn default_speed() -> f32 {
    DEFAULT_ANIMATION_SPEED
}

fn default_width() -> u32 {
    800
}

fn default_height() -> u32 {
    600
}

fn default_ready_timeout() -> u64 {
    180
}

fn default_sprite_scale() -> f32 {
    1.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectConfig {
    pub source: FrameSource,
    /// Frames per tick.
    #[serde(default = "default_speed")]
    pub animation_speed: f32,
    #[serde(default)]
    pub direction: Direction,
    #[serde(default, rename = "loop")]
    pub looped: bool,
    /// Travel toward the opposing boundary. A moving effect completes on its
    /// boundary hit, not when its frames run out.
    #[serde(default)]
    pub moving: bool,
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    /// Release the surface whenever playback stops.
    #[serde(default)]
    pub one_shot: bool,
    #[serde(default)]
    pub motion: MotionTuning,
    #[serde(default)]
    pub background_alpha: f32,
    #[serde(default)]
    pub fallback_image: Option<String>,
    #[serde(default = "default_ready_timeout")]
    pub ready_timeout_ticks: u64,
    /// Uniform sprite scale; right-to-left effects are also mirrored.
    #[serde(default = "default_sprite_scale")]
    pub sprite_scale: f32,
}

impl EffectConfig {
    pub fn new(source: FrameSource) -> Self {
        Self {
            source,
            animation_speed: DEFAULT_ANIMATION_SPEED,
            direction: Direction::LeftToRight,
            looped: false,
            moving: false,
            width: default_width(),
            height: default_height(),
            one_shot: false,
            motion: MotionTuning::default(),
            background_alpha: 0.0,
            fallback_image: None,
            ready_timeout_ticks: default_ready_timeout(),
            sprite_scale: default_sprite_scale(),
        }
    }

    /// Start from the engine-wide settings instead of the built-in defaults.
    pub fn from_settings(source: FrameSource, settings: &FxConfig) -> Self {
        let mut config = Self::new(source);
        config.apply_settings(settings);
        config
    }

    /// Take surface size, background, motion tuning and the loading timeout
    /// from the engine-wide settings.
    pub fn apply_settings(&mut self, settings: &FxConfig) {
        self.width = settings.surface_width;
        self.height = settings.surface_height;
        self.background_alpha = settings.background_alpha;
        self.ready_timeout_ticks = settings.ready_timeout_ticks();
        self.motion = MotionTuning {
            step: settings.step,
            left_boundary: settings.left_boundary,
            right_boundary: settings.right_boundary,
        };
    }

    pub fn with_speed(mut self, speed: f32) -> Self {
        self.animation_speed = speed;
        self
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_motion(mut self, motion: MotionTuning) -> Self {
        self.motion = motion;
        self
    }

    pub fn moving(mut self, moving: bool) -> Self {
        self.moving = moving;
        self
    }

    pub fn looped(mut self, looped: bool) -> Self {
        self.looped = looped;
        self
    }

    pub fn one_shot(mut self, one_shot: bool) -> Self {
        self.one_shot = one_shot;
        self
    }

    pub fn with_sprite_scale(mut self, scale: f32) -> Self {
        self.sprite_scale = scale;
        self
    }

    pub fn with_fallback(mut self, path: impl Into<String>) -> Self {
        self.fallback_image = Some(path.into());
        self
    }

    /// Where each play cycle starts: a quarter in from the side the effect
    /// leaves, or the center when it does not move.
    pub fn start_position(&self) -> Vec2 {
        let w = self.width as f32;
        let x = if !self.moving {
            w / 2.0
        } else {
            match self.direction {
                Direction::LeftToRight => w / 4.0,
                Direction::RightToLeft => w * 3.0 / 4.0,
            }
        };
        Vec2::new(x, self.height as f32 / 2.0)
    }

    /// Left and right boundaries in pixels.
    pub fn boundaries(&self) -> (f32, f32) {
        let w = self.width as f32;
        (self.motion.left_boundary * w, self.motion.right_boundary * w)
    }

    pub fn validate(&self) -> Result<(), EffectError> {
        if self.width == 0 || self.height == 0 {
            return Err(EffectError::InvalidConfig(format!(
                "size {}x{} is empty",
                self.width, self.height
            )));
        }
        if !self.animation_speed.is_finite() || self.animation_speed < 0.0 {
            return Err(EffectError::InvalidConfig(format!(
                "animation speed {} is not a non-negative number",
                self.animation_speed
            )));
        }
        if self.moving && !(self.motion.step.is_finite() && self.motion.step > 0.0) {
            return Err(EffectError::InvalidConfig(format!(
                "step {} must be positive for moving effects",
                self.motion.step
            )));
        }
        Ok(())
    }
}

/// Notification delivered to the host on its next turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectNotice {
    Completed,
    HitLeft,
    HitRight,
}

impl From<Side> for EffectNotice {
    fn from(side: Side) -> Self {
        match side {
            Side::Left => EffectNotice::HitLeft,
            Side::Right => EffectNotice::HitRight,
        }
    }
}

type Callback = Box<dyn FnMut() + Send>;

/// Optional host callbacks, run from [`EffectAnimation::run_deferred`].
#[derive(Default)]
pub struct EffectCallbacks {
    on_complete: Option<Callback>,
    on_hit_left: Option<Callback>,
    on_hit_right: Option<Callback>,
}

impl EffectCallbacks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_complete(mut self, f: impl FnMut() + Send + 'static) -> Self {
        self.on_complete = Some(Box::new(f));
        self
    }

    pub fn on_hit_left(mut self, f: impl FnMut() + Send + 'static) -> Self {
        self.on_hit_left = Some(Box::new(f));
        self
    }

    pub fn on_hit_right(mut self, f: impl FnMut() + Send + 'static) -> Self {
        self.on_hit_right = Some(Box::new(f));
        self
    }

    fn dispatch(&mut self, notice: EffectNotice) {
        let callback = match notice {
            EffectNotice::Completed => self.on_complete.as_mut(),
            EffectNotice::HitLeft => self.on_hit_left.as_mut(),
            EffectNotice::HitRight => self.on_hit_right.as_mut(),
        };
        if let Some(callback) = callback {
            callback();
        }
    }
}

/// Play-cycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectState {
    /// Invisible and not advancing.
    Idle,
    Playing,
    /// The cycle ended on its own; the last frame stays on screen.
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    /// Not mounted yet, or mounted and waiting for the first presented frame.
    Loading,
    Ready,
    /// Acquisition failed; only the fallback image is available.
    Degraded,
}

pub struct EffectAnimation {
    config: EffectConfig,
    store: Arc<TextureStore>,
    host: Box<dyn SurfaceHost>,
    scene: Option<Scene>,
    sprite: Option<Entity>,
    callbacks: EffectCallbacks,
    pending: TaskQueue<EffectNotice>,
    state: EffectState,
    readiness: Readiness,
    fallback: Option<Texture>,
    playing_flag: bool,
    mounted: bool,
    complete_fired: bool,
    ticks_since_mount: u64,
}

impl EffectAnimation {
    pub fn new(
        config: EffectConfig,
        store: Arc<TextureStore>,
        host: impl SurfaceHost + 'static,
    ) -> Self {
        Self {
            config,
            store,
            host: Box::new(host),
            scene: None,
            sprite: None,
            callbacks: EffectCallbacks::default(),
            pending: TaskQueue::new(),
            state: EffectState::Idle,
            readiness: Readiness::Loading,
            fallback: None,
            playing_flag: false,
            mounted: false,
            complete_fired: false,
            ticks_since_mount: 0,
        }
    }

    pub fn with_callbacks(mut self, callbacks: EffectCallbacks) -> Self {
        self.callbacks = callbacks;
        self
    }

    pub fn set_callbacks(&mut self, callbacks: EffectCallbacks) {
        self.callbacks = callbacks;
    }

    /// Attach to the host and load frames. A play flag raised before mounting
    /// starts playback now.
    pub fn mount(&mut self) -> Readiness {
        if self.mounted {
            return self.readiness;
        }
        self.mounted = true;
        self.ticks_since_mount = 0;
        self.readiness = Readiness::Loading;
        self.acquire_or_degrade();
        if self.playing_flag {
            self.start_cycle();
        }
        self.readiness
    }

    /// Tear everything down. Queued notices are discarded and no callback
    /// runs afterwards. Safe to call repeatedly.
    pub fn unmount(&mut self) {
        if !self.mounted {
            return;
        }
        self.mounted = false;
        let dropped = self.pending.clear();
        if dropped > 0 {
            debug!("Discarded {} pending effect notices on unmount", dropped);
        }
        self.teardown_scene();
        self.state = EffectState::Idle;
        self.readiness = Readiness::Loading;
        info!("Effect unmounted");
    }

    /// Replace the configuration, rebuilding the scene when mounted. Notices
    /// raised under the old configuration are discarded.
    pub fn reconfigure(&mut self, config: EffectConfig) {
        let dropped = self.pending.clear();
        if dropped > 0 {
            debug!("Discarded {} pending effect notices on reconfigure", dropped);
        }
        self.complete_fired = false;
        self.teardown_scene();
        self.config = config;
        self.state = EffectState::Idle;
        self.fallback = None;
        if self.mounted {
            self.readiness = Readiness::Loading;
            self.acquire_or_degrade();
            if self.playing_flag {
                self.start_cycle();
            }
        }
    }

    /// The play flag. Repeating the current value does nothing.
    pub fn set_playing(&mut self, playing: bool) {
        if playing == self.playing_flag {
            return;
        }
        self.playing_flag = playing;
        if !self.mounted {
            return;
        }
        if playing {
            self.start_cycle();
        } else {
            self.stop_cycle();
        }
    }

    /// One ticker invocation. Notices it raises wait for [`Self::run_deferred`].
    pub fn tick(&mut self, delta_ticks: f32) {
        if !self.mounted {
            return;
        }
        self.ticks_since_mount += 1;
        let Some(scene) = self.scene.as_mut() else {
            return;
        };
        let outcome = scene.tick(delta_ticks);
        if outcome.presented && self.readiness == Readiness::Loading {
            self.readiness = Readiness::Ready;
            debug!("Effect ready after {} ticks", self.ticks_since_mount);
        }
        for signal in outcome.signals {
            self.handle_signal(signal);
        }
    }

    /// Dispatch queued notices to the callbacks and return them in order.
    /// Returns nothing once unmounted.
    pub fn run_deferred(&mut self) -> Vec<EffectNotice> {
        if !self.mounted {
            self.pending.clear();
            return Vec::new();
        }
        let batch = self.pending.take_batch();
        for notice in &batch {
            self.callbacks.dispatch(*notice);
        }
        batch
    }

    fn acquire_or_degrade(&mut self) {
        match self.acquire() {
            Ok(()) => {
                info!(
                    "Effect mounted: {} frames, {}x{}",
                    self.config.source.frame_count(),
                    self.config.width,
                    self.config.height
                );
            }
            Err(e) => {
                error!("Effect degraded to a static image: {}", e);
                self.teardown_scene();
                self.readiness = Readiness::Degraded;
                self.fallback = self.load_fallback();
            }
        }
    }

    fn acquire(&mut self) -> Result<(), EffectError> {
        self.config.validate()?;
        let frames = self.config.source.resolve(&self.store)?;
        let mut scene = Scene::acquire(
            self.host.as_mut(),
            self.config.width,
            self.config.height,
            self.config.background_alpha,
        )?;

        let first = frames.first().cloned().unwrap_or_else(Texture::empty);
        let start = self.config.start_position();
        let scale = match self.config.direction {
            Direction::LeftToRight => Scale::uniform(self.config.sprite_scale),
            Direction::RightToLeft => Scale::uniform(self.config.sprite_scale).mirrored_x(),
        };
        let entity = scene.spawn((
            AnimatedSprite::new(frames)
                .with_speed(self.config.animation_speed)
                .with_loop(self.config.looped),
            Sprite::new(first).hidden(),
            MapPosition::new(start.x, start.y),
            scale,
            ZIndex::EFFECT,
        ));
        if self.config.moving {
            let (left, right) = self.config.boundaries();
            scene.world_mut().entity_mut(entity).insert(Motion::new(
                self.config.direction,
                self.config.motion.step,
                left,
                right,
            ));
        }

        self.scene = Some(scene);
        self.sprite = Some(entity);
        Ok(())
    }

    fn load_fallback(&self) -> Option<Texture> {
        let path = self
            .config
            .fallback_image
            .clone()
            .or_else(|| self.config.source.preview_path())?;
        match self.store.try_load(&path) {
            Ok(texture) => Some(texture),
            Err(e) => {
                warn!("Fallback image unavailable: {}", e);
                None
            }
        }
    }

    fn teardown_scene(&mut self) {
        self.sprite = None;
        if let Some(mut scene) = self.scene.take() {
            scene.teardown();
        }
    }

    fn start_cycle(&mut self) {
        if self.scene.is_none() && self.readiness != Readiness::Degraded {
            // one-shot effects release their surface between cycles
            self.acquire_or_degrade();
        }
        let (Some(scene), Some(entity)) = (self.scene.as_mut(), self.sprite) else {
            debug!("Play requested without a scene, nothing to show");
            return;
        };
        let start = self.config.start_position();

        scene.start();
        if let Some(mut position) = scene.get_mut::<MapPosition>(entity) {
            position.pos = start;
        }
        if let Some(mut motion) = scene.get_mut::<Motion>(entity) {
            motion.start();
        }
        if let Some(mut anim) = scene.get_mut::<AnimatedSprite>(entity) {
            anim.play(0);
        }
        let first = scene
            .get::<AnimatedSprite>(entity)
            .map(|anim| anim.texture().clone());
        if let Some(mut sprite) = scene.get_mut::<Sprite>(entity) {
            if let Some(first) = first {
                sprite.texture = first;
            }
            sprite.visible = true;
        }

        self.complete_fired = false;
        self.state = EffectState::Playing;
        debug!("Effect cycle started at {:?}", start);
    }

    fn stop_cycle(&mut self) {
        if let (Some(scene), Some(entity)) = (self.scene.as_mut(), self.sprite) {
            if let Some(mut anim) = scene.get_mut::<AnimatedSprite>(entity) {
                anim.stop();
            }
            if let Some(mut motion) = scene.get_mut::<Motion>(entity) {
                motion.halt();
            }
            if let Some(mut sprite) = scene.get_mut::<Sprite>(entity) {
                sprite.visible = false;
            }
        }
        self.state = EffectState::Idle;
        if self.config.one_shot {
            debug!("One-shot effect released its surface");
            self.teardown_scene();
        }
    }

    fn handle_signal(&mut self, signal: SpriteSignal) {
        if Some(signal.entity()) != self.sprite || self.state != EffectState::Playing {
            return;
        }
        match signal {
            SpriteSignal::FramesEnded { .. } if !self.config.moving => self.complete(),
            SpriteSignal::FramesEnded { .. } => {}
            SpriteSignal::BoundaryHit { side, .. } => {
                self.pending.push(side.into());
                self.complete();
            }
        }
    }

    fn complete(&mut self) {
        if self.complete_fired {
            return;
        }
        self.complete_fired = true;
        self.state = EffectState::Completed;
        self.pending.push(EffectNotice::Completed);
    }

    pub fn config(&self) -> &EffectConfig {
        &self.config
    }

    pub fn state(&self) -> EffectState {
        self.state
    }

    pub fn readiness(&self) -> Readiness {
        self.readiness
    }

    /// Ready, degraded, or still loading past the timeout.
    pub fn is_ready(&self) -> bool {
        match self.readiness {
            Readiness::Ready | Readiness::Degraded => true,
            Readiness::Loading => {
                self.mounted && self.ticks_since_mount >= self.config.ready_timeout_ticks
            }
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn is_playing(&self) -> bool {
        self.playing_flag
    }

    pub fn fallback_image(&self) -> Option<&Texture> {
        self.fallback.as_ref()
    }

    pub fn scene(&self) -> Option<&Scene> {
        self.scene.as_ref()
    }

    pub fn pending_notices(&self) -> usize {
        self.pending.len()
    }

    pub fn sprite_position(&self) -> Option<Vec2> {
        let scene = self.scene.as_ref()?;
        scene.get::<MapPosition>(self.sprite?).map(|p| p.pos)
    }

    pub fn current_frame(&self) -> Option<usize> {
        let scene = self.scene.as_ref()?;
        scene
            .get::<AnimatedSprite>(self.sprite?)
            .map(AnimatedSprite::current_frame)
    }

    pub fn is_visible(&self) -> bool {
        match (self.scene.as_ref(), self.sprite) {
            (Some(scene), Some(entity)) => scene.get::<Sprite>(entity).is_some_and(|s| s.visible),
            _ => false,
        }
    }
}

impl Drop for EffectAnimation {
    fn drop(&mut self) {
        self.unmount();
        self.teardown_scene();
    }
}
