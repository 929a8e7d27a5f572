#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Wave catalog generation and timed spawn command emission.
//!
//! Waves are numbered from zero. Each wave lasts longer and carries more
//! enemies than the last, with tougher kinds mixed in at fixed ratios. Spawn
//! times are spread evenly over the wave's duration and nudged by seeded
//! jitter, so a given seed always replays the same waves.

use std::time::Duration;

use coop_defence_core::{Command, EnemyKind, Event};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use thiserror::Error;
use tracing::info;

/// Number of waves generated up front by default.
pub const DEFAULT_WAVE_COUNT: usize = 20;

/// Upper bound on the number of enemies in a single wave.
pub const MAX_WAVE_SIZE: usize = 30;

/// Highest wave number the scheduler will generate.
pub const LAST_WAVE: usize = 999;

const BASE_DURATION_SECS: f32 = 30.0;
const DURATION_STEP_SECS: f32 = 5.0;
const BASE_WAVE_SIZE: usize = 5;
const WAVE_SIZE_STEP: usize = 2;
const SPAWN_JITTER_SECS: f32 = 1.0;

/// Configuration parameters required to construct the wave scheduler.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    seed: u64,
    initial_waves: usize,
}

impl Config {
    /// Creates a new configuration using the provided jitter seed and catalog size.
    #[must_use]
    pub const fn new(seed: u64, initial_waves: usize) -> Self {
        Self {
            seed,
            initial_waves,
        }
    }
}

/// Single scheduled spawn within a wave.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WaveSpawn {
    /// Kind of enemy to spawn.
    pub kind: EnemyKind,
    /// Seconds after the wave starts at which the enemy spawns.
    pub at: f32,
}

/// Spawn schedule of one wave.
#[derive(Clone, Debug, PartialEq)]
pub struct Wave {
    number: usize,
    duration: f32,
    spawns: Vec<WaveSpawn>,
}

impl Wave {
    /// Creates a wave from an explicit schedule. Spawns must be ordered by time.
    #[must_use]
    pub fn new(number: usize, duration: f32, spawns: Vec<WaveSpawn>) -> Self {
        Self {
            number,
            duration,
            spawns,
        }
    }

    /// Zero-based wave number.
    #[must_use]
    pub const fn number(&self) -> usize {
        self.number
    }

    /// Nominal length of the wave in seconds.
    #[must_use]
    pub const fn duration(&self) -> f32 {
        self.duration
    }

    /// Scheduled spawns in time order.
    #[must_use]
    pub fn spawns(&self) -> &[WaveSpawn] {
        &self.spawns
    }
}

/// Kind of enemy occupying `slot` in wave `wave`.
#[must_use]
pub fn composition(wave: usize, slot: usize) -> EnemyKind {
    match wave {
        0 => EnemyKind::Rat,
        1..=2 => match slot % 3 {
            0 => EnemyKind::Fox,
            _ => EnemyKind::Rat,
        },
        3..=5 => match slot % 4 {
            0 => EnemyKind::Wolf,
            1 => EnemyKind::Fox,
            _ => EnemyKind::Rat,
        },
        6..=8 => match slot % 5 {
            0 => EnemyKind::Hawk,
            1 => EnemyKind::Wolf,
            2 => EnemyKind::Fox,
            _ => EnemyKind::Rat,
        },
        _ => match slot % 6 {
            0 | 1 => EnemyKind::Wolf,
            2 => EnemyKind::Hawk,
            3 => EnemyKind::Fox,
            _ => EnemyKind::Rat,
        },
    }
}

/// Generates wave `number`, drawing spawn jitter from `rng`.
///
/// The wave lasts `30 + 5n` seconds and carries `min(5 + 2n, 30)` enemies.
/// Slot `i` spawns at `i * duration / count` plus jitter in `[-1, 1)`,
/// never before the wave starts.
pub fn generate_wave<R: Rng>(number: usize, rng: &mut R) -> Wave {
    let duration = BASE_DURATION_SECS + DURATION_STEP_SECS * number as f32;
    let count = BASE_WAVE_SIZE
        .saturating_add(WAVE_SIZE_STEP.saturating_mul(number))
        .min(MAX_WAVE_SIZE);
    let spacing = duration / count as f32;

    let spawns = (0..count)
        .map(|slot| {
            let jitter = rng.gen_range(-SPAWN_JITTER_SECS..SPAWN_JITTER_SECS);
            WaveSpawn {
                kind: composition(number, slot),
                at: (slot as f32 * spacing + jitter).max(0.0),
            }
        })
        .collect();

    Wave::new(number, duration, spawns)
}

/// Reasons a wave cannot be started.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum WaveError {
    /// The previous wave is still running.
    #[error("wave {wave} is still in progress")]
    AlreadyActive {
        /// Number of the running wave.
        wave: usize,
    },
    /// The requested wave is past `LAST_WAVE`.
    #[error("wave {wave} is beyond the last wave {LAST_WAVE}")]
    OutOfRange {
        /// Number of the requested wave.
        wave: usize,
    },
}

/// Wave scheduler that emits spawn commands as the active wave's clock advances.
#[derive(Debug)]
pub struct WaveScheduler {
    catalog: Vec<Wave>,
    rng: ChaCha8Rng,
    current: Option<usize>,
    elapsed: f32,
    cursor: usize,
    active: bool,
}

impl WaveScheduler {
    /// Creates a scheduler and generates the configured number of waves.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let mut scheduler = Self::with_catalog(config, Vec::new());
        scheduler.backfill(config.initial_waves);
        scheduler
    }

    /// Creates a scheduler over a prepared catalog.
    ///
    /// Waves requested beyond the catalog are generated from the configured seed.
    #[must_use]
    pub fn with_catalog(config: Config, catalog: Vec<Wave>) -> Self {
        Self {
            catalog,
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            current: None,
            elapsed: 0.0,
            cursor: 0,
            active: false,
        }
    }

    /// Waves generated so far.
    #[must_use]
    pub fn catalog(&self) -> &[Wave] {
        &self.catalog
    }

    /// Starts wave `number`, generating any missing waves up to it.
    ///
    /// Restarting replaces the running wave; its unspawned enemies are dropped.
    /// Numbers past `LAST_WAVE` are rejected and leave the scheduler untouched.
    pub fn start_wave(&mut self, number: usize) -> Result<(), WaveError> {
        if number > LAST_WAVE {
            return Err(WaveError::OutOfRange { wave: number });
        }
        self.backfill(number + 1);
        let enemies = self
            .catalog
            .get(number)
            .map_or(0, |wave| wave.spawns().len());

        self.current = Some(number);
        self.elapsed = 0.0;
        self.cursor = 0;
        self.active = true;
        info!(wave = number, enemies, "wave started");
        Ok(())
    }

    /// Starts the wave after the current one, or the first wave.
    pub fn start_next_wave(&mut self) -> Result<usize, WaveError> {
        if let (true, Some(wave)) = (self.active, self.current) {
            return Err(WaveError::AlreadyActive { wave });
        }

        let next = self.current.map_or(0, |wave| wave.saturating_add(1));
        self.start_wave(next)?;
        Ok(next)
    }

    /// Advances the active wave clock and emits due `Command::SpawnEnemy` entries.
    ///
    /// `enemy_count` is the size of the enemy set before this call's commands
    /// are applied. The wave completes once every slot has spawned and the
    /// enemy set is empty.
    pub fn handle(&mut self, events: &[Event], enemy_count: usize, out: &mut Vec<Command>) {
        if !self.active {
            return;
        }
        let Some(wave) = self.current.and_then(|number| self.catalog.get(number)) else {
            return;
        };

        let dt = events
            .iter()
            .filter_map(|event| match event {
                Event::TimeAdvanced { dt } => Some(*dt),
                _ => None,
            })
            .fold(Duration::ZERO, Duration::saturating_add);
        self.elapsed += dt.as_secs_f32();

        let mut spawned = 0;
        while let Some(spawn) = wave.spawns().get(self.cursor) {
            if spawn.at > self.elapsed {
                break;
            }
            out.push(Command::SpawnEnemy { kind: spawn.kind });
            self.cursor += 1;
            spawned += 1;
        }

        if spawned == 0 && self.cursor >= wave.spawns().len() && enemy_count == 0 {
            self.active = false;
            info!(wave = wave.number(), "wave complete");
        }
    }

    /// Reports whether a wave is running: still spawning or with enemies on the map.
    #[must_use]
    pub fn is_wave_active(&self) -> bool {
        self.active
    }

    /// Reports whether the started wave has spawned everything and been cleared.
    #[must_use]
    pub fn is_wave_complete(&self) -> bool {
        !self.active
            && self
                .current
                .and_then(|number| self.catalog.get(number))
                .is_some_and(|wave| self.cursor >= wave.spawns().len())
    }

    /// Number of the most recently started wave, if any.
    #[must_use]
    pub fn current_wave(&self) -> Option<usize> {
        self.current
    }

    /// Slots of the current wave spawned so far.
    #[must_use]
    pub fn spawned(&self) -> usize {
        self.cursor
    }

    fn backfill(&mut self, count: usize) {
        while self.catalog.len() < count {
            let wave = generate_wave(self.catalog.len(), &mut self.rng);
            self.catalog.push(wave);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tick(millis: u64) -> Vec<Event> {
        vec![Event::TimeAdvanced {
            dt: Duration::from_millis(millis),
        }]
    }

    fn three_rats() -> Wave {
        Wave::new(
            0,
            3.0,
            (0..3)
                .map(|slot| WaveSpawn {
                    kind: EnemyKind::Rat,
                    at: slot as f32,
                })
                .collect(),
        )
    }

    #[test]
    fn wave_size_and_duration_grow_until_capped() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let first = generate_wave(0, &mut rng);
        assert_eq!(first.spawns().len(), 5);
        assert_eq!(first.duration(), 30.0);

        let fifth = generate_wave(4, &mut rng);
        assert_eq!(fifth.spawns().len(), 13);
        assert_eq!(fifth.duration(), 50.0);

        let late = generate_wave(19, &mut rng);
        assert_eq!(late.spawns().len(), MAX_WAVE_SIZE);
    }

    #[test]
    fn spawn_times_stay_near_even_spacing() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        for number in 0..DEFAULT_WAVE_COUNT {
            let wave = generate_wave(number, &mut rng);
            let spacing = wave.duration() / wave.spawns().len() as f32;
            for (slot, spawn) in wave.spawns().iter().enumerate() {
                let nominal = slot as f32 * spacing;
                assert!(spawn.at >= 0.0);
                assert!((spawn.at - nominal).abs() <= 1.0 + 1e-4);
            }
            assert!(wave
                .spawns()
                .windows(2)
                .all(|pair| pair[0].at <= pair[1].at));
        }
    }

    #[test]
    fn composition_follows_tiers() {
        assert!((0..10).all(|slot| composition(0, slot) == EnemyKind::Rat));
        assert_eq!(composition(2, 3), EnemyKind::Fox);
        assert_eq!(composition(2, 4), EnemyKind::Rat);
        assert_eq!(composition(5, 4), EnemyKind::Wolf);
        assert_eq!(composition(5, 5), EnemyKind::Fox);
        assert_eq!(composition(8, 5), EnemyKind::Hawk);
        assert_eq!(composition(9, 7), EnemyKind::Wolf);
        assert_eq!(composition(9, 8), EnemyKind::Hawk);
        assert_eq!(composition(9, 9), EnemyKind::Fox);
        assert_eq!(composition(9, 10), EnemyKind::Rat);
    }

    #[test]
    fn same_seed_generates_same_catalog() {
        let first = WaveScheduler::new(Config::new(99, DEFAULT_WAVE_COUNT));
        let second = WaveScheduler::new(Config::new(99, DEFAULT_WAVE_COUNT));
        assert_eq!(first.catalog(), second.catalog());

        let mut lazy = WaveScheduler::new(Config::new(99, 0));
        assert_eq!(lazy.start_wave(DEFAULT_WAVE_COUNT - 1), Ok(()));
        assert_eq!(lazy.catalog(), first.catalog());
    }

    #[test]
    fn spawns_are_emitted_when_due() {
        let mut scheduler = WaveScheduler::with_catalog(Config::new(1, 0), vec![three_rats()]);
        assert_eq!(scheduler.start_wave(0), Ok(()));
        let mut out = Vec::new();

        scheduler.handle(&tick(0), 0, &mut out);
        assert_eq!(out, vec![Command::SpawnEnemy { kind: EnemyKind::Rat }]);

        scheduler.handle(&tick(2500), 1, &mut out);
        assert_eq!(out.len(), 3);
        assert_eq!(scheduler.spawned(), 3);
    }

    #[test]
    fn wave_stays_active_while_enemies_remain() {
        let mut scheduler = WaveScheduler::with_catalog(Config::new(1, 0), vec![three_rats()]);
        assert_eq!(scheduler.start_wave(0), Ok(()));
        let mut out = Vec::new();

        scheduler.handle(&tick(5000), 0, &mut out);
        assert_eq!(out.len(), 3);
        assert!(scheduler.is_wave_active());

        scheduler.handle(&tick(1000), 3, &mut out);
        assert!(scheduler.is_wave_active());
        assert!(!scheduler.is_wave_complete());

        scheduler.handle(&tick(1000), 0, &mut out);
        assert!(!scheduler.is_wave_active());
        assert!(scheduler.is_wave_complete());
    }

    #[test]
    fn next_wave_is_refused_while_active() {
        let mut scheduler = WaveScheduler::new(Config::new(3, 2));
        assert_eq!(scheduler.current_wave(), None);
        assert!(!scheduler.is_wave_complete());

        assert_eq!(scheduler.start_next_wave(), Ok(0));
        assert_eq!(
            scheduler.start_next_wave(),
            Err(WaveError::AlreadyActive { wave: 0 })
        );

        let mut out = Vec::new();
        scheduler.handle(&tick(60_000), 0, &mut out);
        scheduler.handle(&tick(16), 0, &mut out);
        assert!(scheduler.is_wave_complete());

        assert_eq!(scheduler.start_next_wave(), Ok(1));
        assert_eq!(scheduler.current_wave(), Some(1));
        assert_eq!(scheduler.spawned(), 0);
    }

    #[test]
    fn waves_past_the_last_are_refused() {
        let mut scheduler = WaveScheduler::new(Config::new(5, 1));

        assert_eq!(
            scheduler.start_wave(usize::MAX),
            Err(WaveError::OutOfRange { wave: usize::MAX })
        );
        assert_eq!(
            scheduler.start_wave(LAST_WAVE + 1),
            Err(WaveError::OutOfRange {
                wave: LAST_WAVE + 1
            })
        );
        assert_eq!(scheduler.catalog().len(), 1);
        assert_eq!(scheduler.current_wave(), None);
        assert!(!scheduler.is_wave_active());

        assert_eq!(scheduler.start_wave(LAST_WAVE), Ok(()));
        assert_eq!(scheduler.catalog().len(), LAST_WAVE + 1);
        assert_eq!(scheduler.current_wave(), Some(LAST_WAVE));
        assert_eq!(
            scheduler.start_next_wave(),
            Err(WaveError::AlreadyActive { wave: LAST_WAVE })
        );
    }

    #[test]
    fn inactive_scheduler_is_silent() {
        let mut scheduler = WaveScheduler::new(Config::new(3, 1));
        let mut out = Vec::new();
        scheduler.handle(&tick(60_000), 0, &mut out);
        assert!(out.is_empty());
    }
}
