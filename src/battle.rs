//! Battle stage: two fighters and one travelling effect.
//!
//! The player stands on the left facing right, the opponent on the right
//! facing left. An attack plays the attacker's attack animation and launches
//! the stage effect toward the defender. When the effect hits, the defender
//! takes the attack's damage. A defender whose death animation finishes ends
//! the battle: the attacker celebrates and the session is left.

use std::sync::Arc;

use log::{info, warn};
use thiserror::Error;

use crate::character::{CharacterAnimation, CharacterProfile, CharacterState};
use crate::components::motion::Direction;
use crate::effect::{EffectAnimation, EffectConfig, EffectNotice, Readiness};
use crate::resources::gamestate::{BattleSession, GameMode};
use crate::resources::rendertarget::SurfaceHost;
use crate::resources::texturestore::TextureStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Fighter {
    Player,
    Opponent,
}

impl Fighter {
    pub fn opponent(self) -> Fighter {
        match self {
            Fighter::Player => Fighter::Opponent,
            Fighter::Opponent => Fighter::Player,
        }
    }

    /// Direction of effects this fighter launches.
    pub fn facing(self) -> Direction {
        match self {
            Fighter::Player => Direction::LeftToRight,
            Fighter::Opponent => Direction::RightToLeft,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BattleError {
    #[error("Not in a battle")]
    NotInGame,
    #[error("An attack is already in flight")]
    AttackInFlight,
    #[error("The battle is over")]
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BattleEvent {
    Launched { attacker: Fighter },
    Hit { defender: Fighter, health: i32 },
    EffectFinished,
    KnockOut { winner: Fighter },
}

#[derive(Debug, Clone, Copy)]
struct Attack {
    attacker: Fighter,
    damage: i32,
    landed: bool,
}

pub struct BattleStage {
    session: BattleSession,
    player: CharacterAnimation,
    opponent: CharacterAnimation,
    effect: EffectAnimation,
    effect_template: EffectConfig,
    in_flight: Option<Attack>,
    winner: Option<Fighter>,
}

/// Surface hosts for the three stage slots.
pub struct StageHosts<P, O, E> {
    pub player: P,
    pub opponent: O,
    pub effect: E,
}

impl BattleStage {
    /// Enter `room_id` and build the stage. Nothing is mounted yet.
    pub fn new<P, O, E>(
        room_id: impl Into<String>,
        profile: CharacterProfile,
        effect: EffectConfig,
        store: Arc<TextureStore>,
        hosts: StageHosts<P, O, E>,
        padding: u32,
    ) -> Self
    where
        P: SurfaceHost + 'static,
        O: SurfaceHost + 'static,
        E: SurfaceHost + 'static,
    {
        let mut session = BattleSession::new();
        session.enter(room_id, GameMode::OneVsOne);
        let effect_template = effect.moving(true);
        Self {
            session,
            player: CharacterAnimation::new(
                profile.clone(),
                Arc::clone(&store),
                hosts.player,
                Fighter::Player.facing(),
                padding,
            ),
            opponent: CharacterAnimation::new(
                profile,
                Arc::clone(&store),
                hosts.opponent,
                Fighter::Opponent.facing(),
                padding,
            ),
            effect: EffectAnimation::new(effect_template.clone(), store, hosts.effect),
            effect_template,
            in_flight: None,
            winner: None,
        }
    }

    pub fn with_health(mut self, health: i32) -> Self {
        self.player.set_health(health);
        self.opponent.set_health(health);
        self
    }

    pub fn mount(&mut self) {
        self.player.mount();
        self.opponent.mount();
        self.effect.mount();
    }

    /// Leave the battle and release every surface.
    pub fn leave(&mut self) {
        self.session.leave();
        self.in_flight = None;
        self.effect.unmount();
        self.player.unmount();
        self.opponent.unmount();
    }

    /// Start an attack from `attacker` dealing `damage` on impact.
    pub fn attack(&mut self, attacker: Fighter, damage: i32) -> Result<Vec<BattleEvent>, BattleError> {
        if self.winner.is_some() {
            return Err(BattleError::Finished);
        }
        if !self.session.is_in_game() {
            return Err(BattleError::NotInGame);
        }
        if self.in_flight.is_some() {
            return Err(BattleError::AttackInFlight);
        }

        info!("{:?} attacks for {}", attacker, damage);
        self.fighter_mut(attacker).attack();
        self.in_flight = Some(Attack {
            attacker,
            damage,
            landed: false,
        });

        self.effect.set_playing(false);
        self.effect.reconfigure(
            self.effect_template
                .clone()
                .with_direction(attacker.facing()),
        );
        self.effect.set_playing(true);

        let mut events = vec![BattleEvent::Launched { attacker }];
        if self.effect.readiness() == Readiness::Degraded {
            warn!("Effect unavailable, resolving the attack immediately");
            events.extend(self.land_hit());
            events.extend(self.finish_effect());
        }
        Ok(events)
    }

    pub fn tick(&mut self, delta_ticks: f32) {
        self.player.tick(delta_ticks);
        self.opponent.tick(delta_ticks);
        self.effect.tick(delta_ticks);
    }

    /// Run the host turn for all three slots and apply the battle rules.
    pub fn run_deferred(&mut self) -> Vec<BattleEvent> {
        let mut events = Vec::new();

        for notice in self.effect.run_deferred() {
            match notice {
                EffectNotice::HitLeft | EffectNotice::HitRight => events.extend(self.land_hit()),
                EffectNotice::Completed => events.extend(self.finish_effect()),
            }
        }

        for fighter in [Fighter::Player, Fighter::Opponent] {
            let finished = self.fighter_mut(fighter).run_deferred();
            if finished.contains(&CharacterState::Die) && self.winner.is_none() {
                events.push(self.knock_out(fighter.opponent()));
            }
        }
        events
    }

    fn land_hit(&mut self) -> Option<BattleEvent> {
        let attack = self.in_flight.as_mut()?;
        if attack.landed {
            return None;
        }
        attack.landed = true;
        let defender = attack.attacker.opponent();
        let damage = attack.damage;
        let health = self.fighter_mut(defender).take_damage(damage);
        Some(BattleEvent::Hit { defender, health })
    }

    fn finish_effect(&mut self) -> Option<BattleEvent> {
        self.effect.set_playing(false);
        self.in_flight.take().map(|_| BattleEvent::EffectFinished)
    }

    fn knock_out(&mut self, winner: Fighter) -> BattleEvent {
        info!("{:?} wins", winner);
        self.winner = Some(winner);
        self.fighter_mut(winner).celebrate();
        self.session.leave();
        BattleEvent::KnockOut { winner }
    }

    fn fighter_mut(&mut self, fighter: Fighter) -> &mut CharacterAnimation {
        match fighter {
            Fighter::Player => &mut self.player,
            Fighter::Opponent => &mut self.opponent,
        }
    }

    pub fn fighter(&self, fighter: Fighter) -> &CharacterAnimation {
        match fighter {
            Fighter::Player => &self.player,
            Fighter::Opponent => &self.opponent,
        }
    }

    pub fn effect(&self) -> &EffectAnimation {
        &self.effect
    }

    pub fn session(&self) -> &BattleSession {
        &self.session
    }

    pub fn winner(&self) -> Option<Fighter> {
        self.winner
    }

    pub fn is_over(&self) -> bool {
        self.winner.is_some()
    }

    pub fn attack_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }
}

impl Drop for BattleStage {
    fn drop(&mut self) {
        self.leave();
    }
}
