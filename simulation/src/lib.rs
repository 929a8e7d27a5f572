#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Simulation context that owns the world and every system and runs ticks in order.
//!
//! One tick runs, strictly in sequence: the world clock and tower drop-in
//! physics, enemy locomotion, tower targeting and combat, projectile motion and
//! collision, and wave bookkeeping. Each stage reads fresh views of the world,
//! so commands applied by an earlier stage are visible to the later ones.

mod config;

use std::time::Duration;

use coop_defence_core::{Command, Event, GridLayout, TowerTarget};
use coop_defence_system_locomotion::Locomotion;
use coop_defence_system_projectiles::Projectiles;
use coop_defence_system_tower_combat::TowerCombat;
use coop_defence_system_tower_targeting::TowerTargeting;
use coop_defence_system_wave_scheduling::{Config as WaveConfig, WaveError, WaveScheduler};
use coop_defence_world::{self as world, query, World};
use tracing::{debug, info};

pub use config::{ConfigError, SimulationConfig};

/// Single simulation context owning all mutable game state.
#[derive(Debug)]
pub struct Simulation {
    world: World,
    locomotion: Locomotion,
    targeting: TowerTargeting,
    combat: TowerCombat,
    projectiles: Projectiles,
    waves: WaveScheduler,
    targets: Vec<TowerTarget>,
    commands: Vec<Command>,
    events: Vec<Event>,
}

impl Simulation {
    /// Creates a session on the built-in map.
    #[must_use]
    pub fn new(config: &SimulationConfig) -> Self {
        let mut simulation = Self {
            world: World::new(),
            locomotion: Locomotion::new(),
            targeting: TowerTargeting::new(),
            combat: TowerCombat::new(),
            projectiles: Projectiles::new(),
            waves: WaveScheduler::new(WaveConfig::new(config.seed, config.waves)),
            targets: Vec::new(),
            commands: Vec::new(),
            events: Vec::new(),
        };
        let _ = simulation.submit(Command::ConfigureEconomy {
            gold: config.starting_gold,
            lives: config.starting_lives,
        });
        info!(
            gold = config.starting_gold,
            lives = config.starting_lives,
            waves = config.waves,
            "simulation ready"
        );
        simulation
    }

    /// Creates a session on a custom map.
    #[must_use]
    pub fn with_layout(config: &SimulationConfig, layout: GridLayout) -> Self {
        let mut simulation = Self::new(config);
        let _ = simulation.submit(Command::LoadMap { layout });
        simulation
    }

    /// Read-only access to the world, for use with [`query`].
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Read-only access to the wave scheduler.
    #[must_use]
    pub fn waves(&self) -> &WaveScheduler {
        &self.waves
    }

    /// Applies a single external command, such as a tower purchase, between ticks.
    ///
    /// Returns the events the world reported for it.
    pub fn submit(&mut self, command: Command) -> &[Event] {
        self.events.clear();
        world::apply(&mut self.world, command, &mut self.events);
        &self.events
    }

    /// Starts the next wave unless one is already running.
    pub fn start_next_wave(&mut self) -> Result<usize, WaveError> {
        self.waves.start_next_wave()
    }

    /// Runs one tick of the given length and returns every event it produced.
    pub fn tick(&mut self, dt: Duration) -> &[Event] {
        self.events.clear();
        world::apply(&mut self.world, Command::Tick { dt }, &mut self.events);

        let enemies = query::enemy_view(&self.world);
        self.locomotion.handle(
            &self.events,
            &enemies,
            query::waypoints(&self.world),
            &mut self.commands,
        );
        self.flush();

        let enemies = query::enemy_view(&self.world);
        let towers = query::tower_view(&self.world);
        self.targeting.handle(&towers, &enemies, &mut self.targets);
        self.combat.handle(&towers, &self.targets, &mut self.commands);
        self.flush();

        let enemies = query::enemy_view(&self.world);
        let projectiles = query::projectile_view(&self.world);
        self.projectiles
            .handle(&self.events, &projectiles, &enemies, &mut self.commands);
        self.flush();

        self.waves.handle(
            &self.events,
            query::enemy_count(&self.world),
            &mut self.commands,
        );
        self.flush();

        debug!(
            tick = query::tick_index(&self.world),
            events = self.events.len(),
            "tick complete"
        );
        &self.events
    }

    fn flush(&mut self) {
        for command in self.commands.drain(..) {
            world::apply(&mut self.world, command, &mut self.events);
        }
    }
}
