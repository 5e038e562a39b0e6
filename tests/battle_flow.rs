//! Battle stage flow: attacks, hits, knock-outs and session handling.

use std::sync::Arc;

use image::RgbaImage;

use battlefx::battle::{BattleError, BattleEvent, BattleStage, Fighter, StageHosts};
use battlefx::character::{CharacterProfile, CharacterState};
use battlefx::effect::EffectConfig;
use battlefx::resources::framesource::FrameSource;
use battlefx::resources::rendertarget::HeadlessHost;
use battlefx::resources::texturestore::{MemoryImageSource, TextureStore};

fn store() -> Arc<TextureStore> {
    let profile = CharacterProfile::classic_cat();
    let mut source = MemoryImageSource::new();
    for state in CharacterState::ALL {
        let sheet = profile.sheet(state);
        source.insert(
            sheet.sheet.clone(),
            RgbaImage::new(sheet.frame_width * sheet.frame_count, sheet.frame_height),
        );
    }
    for path in FrameSource::motion_paths("fire", 5) {
        source.insert(path, RgbaImage::new(16, 16));
    }
    TextureStore::shared(source)
}

struct Hosts {
    player: HeadlessHost,
    opponent: HeadlessHost,
    effect: HeadlessHost,
}

impl Hosts {
    fn new() -> Self {
        Self {
            player: HeadlessHost::new(),
            opponent: HeadlessHost::new(),
            effect: HeadlessHost::new(),
        }
    }

    fn stage(&self) -> BattleStage {
        BattleStage::new(
            "room-1",
            CharacterProfile::classic_cat(),
            EffectConfig::new(FrameSource::motion("fire", 5)),
            store(),
            StageHosts {
                player: self.player.clone(),
                opponent: self.opponent.clone(),
                effect: self.effect.clone(),
            },
            0,
        )
    }

    fn live(&self) -> u32 {
        self.player.live_surfaces() + self.opponent.live_surfaces() + self.effect.live_surfaces()
    }
}

/// Tick until `done` holds for the collected events, or `max_ticks` pass.
fn run_until(
    stage: &mut BattleStage,
    max_ticks: u32,
    done: impl Fn(&[BattleEvent]) -> bool,
) -> Vec<BattleEvent> {
    let mut events = Vec::new();
    for _ in 0..max_ticks {
        stage.tick(1.0);
        events.extend(stage.run_deferred());
        if done(&events) {
            break;
        }
    }
    events
}

#[test]
fn effect_hit_damages_the_defender() {
    let hosts = Hosts::new();
    let mut stage = hosts.stage().with_health(3);
    stage.mount();

    let launched = stage.attack(Fighter::Player, 1).unwrap();
    assert_eq!(launched, vec![BattleEvent::Launched { attacker: Fighter::Player }]);
    assert!(stage.attack_in_flight());
    assert_eq!(stage.fighter(Fighter::Player).state(), CharacterState::Attack);

    let events = run_until(&mut stage, 500, |e| e.contains(&BattleEvent::EffectFinished));
    assert_eq!(
        events,
        vec![
            BattleEvent::Hit {
                defender: Fighter::Opponent,
                health: 2
            },
            BattleEvent::EffectFinished,
        ]
    );
    assert!(!stage.attack_in_flight());
    assert_eq!(stage.fighter(Fighter::Opponent).state(), CharacterState::Hurt);

    run_until(&mut stage, 500, |_| false);
    assert_eq!(stage.fighter(Fighter::Opponent).state(), CharacterState::Idle);
    assert_eq!(stage.fighter(Fighter::Player).state(), CharacterState::Idle);
    assert!(!stage.is_over());
}

#[test]
fn second_attack_is_rejected_while_one_is_in_flight() {
    let hosts = Hosts::new();
    let mut stage = hosts.stage();
    stage.mount();

    stage.attack(Fighter::Opponent, 1).unwrap();

    assert_eq!(
        stage.attack(Fighter::Player, 1),
        Err(BattleError::AttackInFlight)
    );
}

#[test]
fn knock_out_ends_the_battle_and_leaves_the_session() {
    let hosts = Hosts::new();
    let mut stage = hosts.stage().with_health(1);
    stage.mount();
    assert_eq!(stage.session().room_id(), Some("room-1"));

    stage.attack(Fighter::Opponent, 1).unwrap();
    let events = run_until(&mut stage, 2000, |e| {
        e.iter().any(|ev| matches!(ev, BattleEvent::KnockOut { .. }))
    });

    assert_eq!(
        events.last(),
        Some(&BattleEvent::KnockOut {
            winner: Fighter::Opponent
        })
    );
    assert!(events.contains(&BattleEvent::Hit {
        defender: Fighter::Player,
        health: 0
    }));
    assert_eq!(stage.winner(), Some(Fighter::Opponent));
    assert_eq!(stage.fighter(Fighter::Player).state(), CharacterState::Die);
    assert_eq!(
        stage.fighter(Fighter::Opponent).state(),
        CharacterState::Victory
    );
    assert!(!stage.session().is_in_game());
    assert_eq!(stage.attack(Fighter::Player, 1), Err(BattleError::Finished));
}

#[test]
fn unavailable_effect_resolves_attacks_immediately() {
    let hosts = Hosts::new();
    hosts.effect.refuse_next_attaches(10);
    let mut stage = hosts.stage().with_health(2);
    stage.mount();

    let events = stage.attack(Fighter::Player, 1).unwrap();

    assert_eq!(
        events,
        vec![
            BattleEvent::Launched {
                attacker: Fighter::Player
            },
            BattleEvent::Hit {
                defender: Fighter::Opponent,
                health: 1
            },
            BattleEvent::EffectFinished,
        ]
    );
    assert!(!stage.attack_in_flight());
}

#[test]
fn leaving_releases_every_surface() {
    let hosts = Hosts::new();
    {
        let mut stage = hosts.stage();
        stage.mount();
        stage.attack(Fighter::Player, 1).unwrap();
        stage.tick(1.0);
        assert_eq!(hosts.live(), 3);
    }
    assert_eq!(hosts.live(), 0);
    assert_eq!(
        hosts.player.attach_count() + hosts.opponent.attach_count() + hosts.effect.attach_count(),
        hosts.player.detach_count() + hosts.opponent.detach_count() + hosts.effect.detach_count()
    );
}

#[test]
fn attacking_after_leaving_is_rejected() {
    let hosts = Hosts::new();
    let mut stage = hosts.stage();
    stage.mount();
    stage.leave();

    assert_eq!(stage.attack(Fighter::Player, 1), Err(BattleError::NotInGame));
    assert_eq!(hosts.live(), 0);
}
