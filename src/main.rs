//! battlefx command line.
//!
//! Drives the effect engine headlessly: list the catalog, play one effect
//! tick by tick (optionally writing every frame as PNG), or run a scripted
//! battle between two fighters.
//!
//! # Running
//!
//! ```sh
//! cargo run --release -- --assets ./public play fire --dump-frames ./frames
//! cargo run --release -- battle --seed 42
//! ```

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use battlefx::battle::{BattleStage, Fighter, StageHosts};
use battlefx::effect::{EffectAnimation, EffectConfig, EffectNotice, Readiness};
use battlefx::resources::animationstore::AnimationStore;
use battlefx::resources::canvas::CanvasHost;
use battlefx::resources::fxconfig::FxConfig;
use battlefx::resources::rendertarget::{HeadlessHost, SurfaceHost};
use battlefx::resources::texturestore::{FsImageSource, TextureStore};
use clap::{Parser, Subcommand};
use log::{error, info, warn};

/// Battle sprite effects
#[derive(Parser)]
#[command(version, about = "Preview battle effects and run scripted battles headlessly.")]
struct Cli {
    /// INI settings file (default: ./battlefx.ini when present).
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Asset root that `/game/...` paths resolve against.
    #[arg(long, global = true, value_name = "DIR")]
    assets: Option<PathBuf>,

    /// JSON catalog merged over the built-in one.
    #[arg(long, global = true, value_name = "PATH")]
    catalog: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the effects and characters in the catalog.
    List,
    /// Play one effect until it completes.
    Play {
        effect: String,
        /// Travel right to left.
        #[arg(long)]
        reverse: bool,
        #[arg(long, default_value_t = 600)]
        max_ticks: u64,
        /// Write every presented frame as PNG into this directory.
        #[arg(long, value_name = "DIR")]
        dump_frames: Option<PathBuf>,
    },
    /// Run a battle with randomly chosen attackers.
    Battle {
        #[arg(long, default_value_t = 7)]
        seed: u64,
        #[arg(long, default_value_t = 20_000)]
        max_ticks: u64,
        #[arg(long, default_value_t = 1)]
        damage: i32,
        #[arg(long, default_value = "classicCat")]
        character: String,
        #[arg(long, default_value = "fire")]
        effect: String,
    },
}

fn load_settings(cli: &Cli) -> Result<FxConfig, String> {
    let mut settings = match &cli.config {
        Some(path) => {
            let mut settings = FxConfig::with_path(path);
            settings.load_from_file()?;
            settings
        }
        None => {
            let mut settings = FxConfig::new();
            if settings.config_path.exists() {
                settings.load_from_file()?;
            } else {
                info!("No config file, using defaults");
            }
            settings
        }
    };
    if let Some(assets) = &cli.assets {
        settings.asset_root = assets.clone();
    }
    Ok(settings)
}

fn load_catalog(cli: &Cli) -> Result<AnimationStore, String> {
    let mut catalog = AnimationStore::builtin();
    if let Some(path) = &cli.catalog {
        catalog.merge(AnimationStore::load_from_file(path)?);
    }
    Ok(catalog)
}

fn list(catalog: &AnimationStore) {
    println!("Effects:");
    for name in catalog.effect_names() {
        if let Some(effect) = catalog.effect(name) {
            println!(
                "  {:<12} {} frames, speed {}, {}",
                name,
                effect.source.frame_count(),
                effect.animation_speed,
                if effect.moving { "moving" } else { "stationary" }
            );
        }
    }
    println!("Characters:");
    for name in catalog.character_names() {
        println!("  {}", name);
    }
}

fn play<H: SurfaceHost + 'static>(
    config: EffectConfig,
    store: Arc<TextureStore>,
    host: H,
    max_ticks: u64,
) -> ExitCode {
    let mut effect = EffectAnimation::new(config, store, host);
    if effect.mount() == Readiness::Degraded {
        warn!("Effect is degraded, nothing will be drawn");
    }
    effect.set_playing(true);

    for tick in 1..=max_ticks {
        effect.tick(1.0);
        for notice in effect.run_deferred() {
            println!("tick {:>5}: {:?}", tick, notice);
            if notice == EffectNotice::Completed {
                effect.set_playing(false);
                return ExitCode::SUCCESS;
            }
        }
    }
    error!("Effect did not complete within {} ticks", max_ticks);
    ExitCode::FAILURE
}

struct BattleArgs<'a> {
    seed: u64,
    max_ticks: u64,
    damage: i32,
    character: &'a str,
    effect: &'a str,
}

fn battle(
    catalog: &AnimationStore,
    settings: &FxConfig,
    store: Arc<TextureStore>,
    args: BattleArgs<'_>,
) -> ExitCode {
    let BattleArgs {
        seed,
        max_ticks,
        damage,
        character,
        effect: effect_name,
    } = args;
    let Some(profile) = catalog.character(character) else {
        error!("Unknown character {}", character);
        return ExitCode::FAILURE;
    };
    let Some(mut effect) = catalog.effect(effect_name) else {
        error!("Unknown effect {}", effect_name);
        return ExitCode::FAILURE;
    };
    effect.apply_settings(settings);

    let hosts = StageHosts {
        player: HeadlessHost::new(),
        opponent: HeadlessHost::new(),
        effect: HeadlessHost::new(),
    };
    let mut stage = BattleStage::new(
        format!("local-{seed}"),
        profile,
        effect,
        store,
        hosts,
        settings.sheet_padding,
    );
    stage.mount();

    let mut rng = fastrand::Rng::with_seed(seed);
    for tick in 1..=max_ticks {
        if !stage.is_over() && !stage.attack_in_flight() {
            let attacker = if rng.bool() {
                Fighter::Player
            } else {
                Fighter::Opponent
            };
            match stage.attack(attacker, damage) {
                Ok(events) => events
                    .iter()
                    .for_each(|e| println!("tick {:>5}: {:?}", tick, e)),
                Err(e) => warn!("Attack rejected: {}", e),
            }
        }
        stage.tick(1.0);
        for event in stage.run_deferred() {
            println!("tick {:>5}: {:?}", tick, event);
        }
        if let Some(winner) = stage.winner() {
            println!("{:?} wins after {} ticks", winner, tick);
            return ExitCode::SUCCESS;
        }
    }
    error!("No winner within {} ticks", max_ticks);
    ExitCode::FAILURE
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let settings = match load_settings(&cli) {
        Ok(settings) => settings,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    let catalog = match load_catalog(&cli) {
        Ok(catalog) => catalog,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    let store = TextureStore::shared(FsImageSource::new(settings.asset_root.clone()));

    match &cli.command {
        Command::List => {
            list(&catalog);
            ExitCode::SUCCESS
        }
        Command::Play {
            effect,
            reverse,
            max_ticks,
            dump_frames,
        } => {
            let Some(mut config) = catalog.effect(effect) else {
                error!("Unknown effect {}", effect);
                return ExitCode::FAILURE;
            };
            config.apply_settings(&settings);
            if *reverse {
                config.direction = config.direction.reversed();
            }
            match dump_frames {
                Some(dir) => play(
                    config,
                    store,
                    CanvasHost::new().with_output_dir(dir),
                    *max_ticks,
                ),
                None => play(config, store, HeadlessHost::new(), *max_ticks),
            }
        }
        Command::Battle {
            seed,
            max_ticks,
            damage,
            character,
            effect,
        } => battle(
            &catalog,
            &settings,
            store,
            BattleArgs {
                seed: *seed,
                max_ticks: *max_ticks,
                damage: *damage,
                character,
                effect,
            },
        ),
    }
}
