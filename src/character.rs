//! Character animations.
//!
//! A character is a stationary [`EffectAnimation`] whose frames come from one
//! sprite sheet per [`CharacterState`]. Changing state rebuilds the scene with
//! the new sheet. Attack and hurt play once and hand back to idle, or to the
//! death animation once health is gone.

use std::sync::Arc;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::components::motion::Direction;
use crate::effect::{EffectAnimation, EffectConfig, EffectNotice, Readiness};
use crate::resources::framesource::{FrameSource, SheetGeometry};
use crate::resources::rendertarget::SurfaceHost;
use crate::resources::texturestore::TextureStore;

pub const DEFAULT_HEALTH: i32 = 5;
pub const DEFAULT_CHARACTER_SCALE: f32 = 3.0;
const DEFAULT_CHARACTER_SPEED: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CharacterState {
    Idle,
    Die,
    Attack,
    Hurt,
    Victory,
}

impl CharacterState {
    pub const ALL: [CharacterState; 5] = [
        CharacterState::Idle,
        CharacterState::Die,
        CharacterState::Attack,
        CharacterState::Hurt,
        CharacterState::Victory,
    ];

    /// States that hand control back once their frames end.
    pub fn is_transient(self) -> bool {
        matches!(self, CharacterState::Attack | CharacterState::Hurt)
    }
}

fn default_character_speed() -> f32 {
    DEFAULT_CHARACTER_SPEED
}

fn default_character_scale() -> f32 {
    DEFAULT_CHARACTER_SCALE
}

/// One state's sprite sheet. Frames run left to right on a single row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateSheet {
    pub sheet: String,
    pub frame_width: u32,
    pub frame_height: u32,
    pub frame_count: u32,
    #[serde(default = "default_character_speed")]
    pub animation_speed: f32,
    #[serde(default, rename = "loop")]
    pub looped: bool,
}

impl StateSheet {
    fn new(sheet: &str, frame_count: u32, looped: bool) -> Self {
        Self {
            sheet: sheet.to_string(),
            frame_width: 32,
            frame_height: 32,
            frame_count,
            animation_speed: DEFAULT_CHARACTER_SPEED,
            looped,
        }
    }

    pub fn source(&self, padding: u32) -> FrameSource {
        FrameSource::sheet(
            self.sheet.clone(),
            SheetGeometry::new(self.frame_width, self.frame_height, self.frame_count)
                .with_padding(padding),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterProfile {
    pub idle: StateSheet,
    pub die: StateSheet,
    pub attack: StateSheet,
    pub hurt: StateSheet,
    pub victory: StateSheet,
    #[serde(default = "default_character_scale")]
    pub scale: f32,
}

impl CharacterProfile {
    /// The stock cat fighter.
    pub fn classic_cat() -> Self {
        Self {
            idle: StateSheet::new("/game/classicCat/IdleCatt.png", 7, true),
            die: StateSheet::new("/game/classicCat/DieCatt.png", 14, false),
            attack: StateSheet::new("/game/classicCat/AttackCatt.png", 9, false),
            hurt: StateSheet::new("/game/classicCat/HurtCatt.png", 7, false),
            victory: StateSheet::new("/game/classicCat/VictoryCatt.png", 18, false),
            scale: DEFAULT_CHARACTER_SCALE,
        }
    }

    pub fn sheet(&self, state: CharacterState) -> &StateSheet {
        match state {
            CharacterState::Idle => &self.idle,
            CharacterState::Die => &self.die,
            CharacterState::Attack => &self.attack,
            CharacterState::Hurt => &self.hurt,
            CharacterState::Victory => &self.victory,
        }
    }

    /// Effect configuration for one state: surface sized to a scaled frame,
    /// sprite centered, mirrored when facing left.
    pub fn effect_config(
        &self,
        state: CharacterState,
        direction: Direction,
        padding: u32,
    ) -> EffectConfig {
        let sheet = self.sheet(state);
        let width = (sheet.frame_width as f32 * self.scale).round().max(1.0) as u32;
        let height = (sheet.frame_height as f32 * self.scale).round().max(1.0) as u32;
        EffectConfig::new(sheet.source(padding))
            .with_speed(sheet.animation_speed)
            .looped(sheet.looped)
            .with_direction(direction)
            .with_size(width, height)
            .with_sprite_scale(self.scale)
    }
}

pub struct CharacterAnimation {
    profile: CharacterProfile,
    effect: EffectAnimation,
    state: CharacterState,
    health: i32,
    direction: Direction,
    padding: u32,
}

impl CharacterAnimation {
    /// A character in the idle state, not yet mounted.
    pub fn new(
        profile: CharacterProfile,
        store: Arc<TextureStore>,
        host: impl SurfaceHost + 'static,
        direction: Direction,
        padding: u32,
    ) -> Self {
        let config = profile.effect_config(CharacterState::Idle, direction, padding);
        let mut effect = EffectAnimation::new(config, store, host);
        effect.set_playing(true);
        Self {
            profile,
            effect,
            state: CharacterState::Idle,
            health: DEFAULT_HEALTH,
            direction,
            padding,
        }
    }

    pub fn with_health(mut self, health: i32) -> Self {
        self.set_health(health);
        self
    }

    pub fn set_health(&mut self, health: i32) {
        self.health = health;
    }

    pub fn mount(&mut self) -> Readiness {
        self.effect.mount()
    }

    pub fn unmount(&mut self) {
        self.effect.unmount();
    }

    /// Switch to `state` and play it from the first frame.
    pub fn set_state(&mut self, state: CharacterState) {
        debug!("Character {:?} -> {:?}", self.state, state);
        self.state = state;
        let config = self
            .profile
            .effect_config(state, self.direction, self.padding);
        self.effect.reconfigure(config);
    }

    pub fn attack(&mut self) {
        self.set_state(CharacterState::Attack);
    }

    /// Apply damage and play the hurt animation. Returns the remaining health.
    pub fn take_damage(&mut self, amount: i32) -> i32 {
        self.health -= amount;
        info!("Character took {} damage, {} left", amount, self.health);
        self.set_state(CharacterState::Hurt);
        self.health
    }

    pub fn celebrate(&mut self) {
        self.set_state(CharacterState::Victory);
    }

    pub fn tick(&mut self, delta_ticks: f32) {
        self.effect.tick(delta_ticks);
    }

    /// Run the host turn. Returns the states whose animation finished, in
    /// order; transient states have already been followed up.
    pub fn run_deferred(&mut self) -> Vec<CharacterState> {
        let mut finished = Vec::new();
        for notice in self.effect.run_deferred() {
            if notice != EffectNotice::Completed {
                continue;
            }
            let ended = self.state;
            finished.push(ended);
            if ended.is_transient() {
                let next = if self.health <= 0 {
                    CharacterState::Die
                } else {
                    CharacterState::Idle
                };
                self.set_state(next);
            }
        }
        finished
    }

    pub fn state(&self) -> CharacterState {
        self.state
    }

    pub fn health(&self) -> i32 {
        self.health
    }

    pub fn is_knocked_out(&self) -> bool {
        self.health <= 0
    }

    pub fn effect(&self) -> &EffectAnimation {
        &self.effect
    }
}
