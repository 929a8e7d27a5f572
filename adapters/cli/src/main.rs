#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a headless Coop Defence session.

mod tower_spec;

use std::{fs, path::PathBuf};

use anyhow::{bail, Context, Result as AnyResult};
use clap::Parser;
use coop_defence_core::{Command, Event};
use coop_defence_rendering::{DrawableKind, RenderSink, Scene};
use coop_defence_simulation::{Simulation, SimulationConfig};
use coop_defence_world::{query, World};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use crate::tower_spec::TowerPlacement;

/// Runs waves on the built-in map and reports how the defence held up.
#[derive(Debug, Parser)]
#[command(name = "coop-defence", version, about)]
struct Args {
    /// TOML file with session settings. Defaults apply when omitted.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Number of waves to run, overriding the config.
    #[arg(long)]
    waves: Option<usize>,
    /// Seed for wave spawn jitter, overriding the config.
    #[arg(long)]
    seed: Option<u64>,
    /// Tick length in milliseconds, overriding the config.
    #[arg(long = "tick-ms")]
    tick_ms: Option<u64>,
    /// Tower to buy before the first wave. Repeat for more towers.
    #[arg(long = "tower", value_name = "COLUMN,ROW[:KIND]")]
    towers: Vec<TowerPlacement>,
    /// Gives up after this many ticks.
    #[arg(long, default_value_t = 200_000)]
    max_ticks: u64,
    /// Ticks between frames handed to the render sink.
    #[arg(long, default_value_t = 60)]
    frame_interval: u64,
}

/// Entry point for the Coop Defence command-line interface.
fn main() -> AnyResult<()> {
    init_tracing();
    let args = Args::parse();
    let config = resolve_config(&args)?;
    run(&config, &args)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

fn resolve_config(args: &Args) -> AnyResult<SimulationConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("failed to read config file {}", path.display()))?;
            SimulationConfig::from_toml_str(&contents)
                .with_context(|| format!("invalid config file {}", path.display()))?
        }
        None => SimulationConfig::default(),
    };

    if let Some(waves) = args.waves {
        config.waves = waves;
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(tick_ms) = args.tick_ms {
        if tick_ms == 0 {
            bail!("--tick-ms must be greater than zero");
        }
        config.tick_millis = tick_ms;
    }
    if args.frame_interval == 0 {
        bail!("--frame-interval must be greater than zero");
    }

    Ok(config)
}

fn run(config: &SimulationConfig, args: &Args) -> AnyResult<()> {
    let mut simulation = Simulation::new(config);
    info!("{}", query::welcome_banner(simulation.world()));

    for placement in &args.towers {
        let events = simulation.submit(Command::PurchaseTower {
            kind: placement.kind,
            cell: placement.cell,
        });
        if !events
            .iter()
            .any(|event| matches!(event, Event::TowerPurchased { .. }))
        {
            warn!(
                column = placement.cell.column(),
                row = placement.cell.row(),
                "skipping tower that could not be bought"
            );
        }
    }

    let mut sink = LogSink::default();
    let mut summary = Summary::default();
    let dt = config.tick_duration();
    let mut ticks = 0_u64;

    'waves: for _ in 0..config.waves {
        let wave = simulation
            .start_next_wave()
            .context("failed to start the next wave")?;
        info!(wave, "wave started");

        loop {
            summary.record(simulation.tick(dt));
            ticks += 1;

            if ticks % args.frame_interval == 0 {
                sink.present(&scene(simulation.world()))
                    .context("render sink rejected a frame")?;
            }
            if query::is_game_over(simulation.world()) {
                warn!(wave, "base overrun");
                break 'waves;
            }
            if !simulation.waves().is_wave_active() {
                summary.waves_cleared += 1;
                break;
            }
            if ticks >= args.max_ticks {
                warn!(ticks, "tick limit reached");
                break 'waves;
            }
        }
    }

    info!(
        waves_cleared = summary.waves_cleared,
        spawned = summary.spawned,
        killed = summary.killed,
        leaked = summary.leaked,
        gold = query::gold(simulation.world()),
        lives = query::lives(simulation.world()),
        ticks,
        frames = sink.frames,
        "session finished"
    );
    Ok(())
}

fn scene(world: &World) -> Scene {
    Scene::from_views(
        query::grid(world),
        query::base_position(world),
        &query::enemy_view(world),
        &query::tower_view(world),
        &query::projectile_view(world),
    )
}

/// Running totals over a session.
#[derive(Debug, Default)]
struct Summary {
    waves_cleared: usize,
    spawned: usize,
    killed: usize,
    leaked: usize,
}

impl Summary {
    fn record(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::EnemySpawned { .. } => self.spawned += 1,
                Event::EnemyKilled { .. } => self.killed += 1,
                Event::EnemyReachedBase { .. } => self.leaked += 1,
                _ => {}
            }
        }
    }
}

/// Render sink that logs frame contents instead of drawing them.
#[derive(Debug, Default)]
struct LogSink {
    frames: u64,
}

impl RenderSink for LogSink {
    fn present(&mut self, scene: &Scene) -> AnyResult<()> {
        self.frames += 1;
        debug!(
            frame = self.frames,
            enemies = scene.count(|kind| matches!(kind, DrawableKind::Enemy(_))),
            towers = scene.count(|kind| matches!(kind, DrawableKind::Tower(_))),
            projectiles = scene.count(|kind| kind == DrawableKind::Projectile),
            "frame"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coop_defence_core::{CellCoord, TowerKind};

    fn parse(args: &[&str]) -> Result<Args, clap::Error> {
        Args::try_parse_from(std::iter::once("coop-defence").chain(args.iter().copied()))
    }

    #[test]
    fn repeated_tower_flags_keep_their_order() {
        let args = parse(&["--tower", "2,2", "--tower", "4,3:beagle"]).expect("args");

        assert_eq!(
            args.towers,
            vec![
                TowerPlacement {
                    cell: CellCoord::new(2, 2),
                    kind: TowerKind::Chicken,
                },
                TowerPlacement {
                    cell: CellCoord::new(4, 3),
                    kind: TowerKind::Beagle,
                },
            ],
        );
        assert_eq!(args.max_ticks, 200_000);
        assert_eq!(args.frame_interval, 60);
    }

    #[test]
    fn malformed_tower_is_a_usage_error() {
        let error = parse(&["--tower", "2;2"]).expect_err("bad cell");
        assert_eq!(error.kind(), clap::error::ErrorKind::ValueValidation);

        let error = parse(&["--tower", "2,2:dragon"]).expect_err("bad kind");
        assert_eq!(error.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn flags_override_the_default_config() {
        let args = parse(&["--waves", "3", "--seed", "7", "--tick-ms", "20"]).expect("args");

        let config = resolve_config(&args).expect("config");

        assert_eq!(
            config,
            SimulationConfig {
                waves: 3,
                seed: 7,
                tick_millis: 20,
                ..SimulationConfig::default()
            },
        );
    }

    #[test]
    fn zero_tick_and_zero_frame_interval_are_rejected() {
        let args = parse(&["--tick-ms", "0"]).expect("args");
        assert!(resolve_config(&args).is_err());

        let args = parse(&["--frame-interval", "0"]).expect("args");
        assert!(resolve_config(&args).is_err());
    }

    #[test]
    fn missing_config_file_names_the_path() {
        let args = parse(&["--config", "/nonexistent/coop-defence.toml"]).expect("args");

        let error = resolve_config(&args).expect_err("missing file");

        assert!(error.to_string().contains("/nonexistent/coop-defence.toml"));
    }
}
