#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Coop Defence.
//!
//! The world owns the grid map, the waypoint path, the enemy, tower and
//! projectile sets and the economy ledger. Every mutation arrives as a
//! [`Command`] through [`apply`]; rejected commands are reported as events and
//! never abort the simulation.

mod economy;
mod grid;
mod path;
mod towers;

use std::time::Duration;

use coop_defence_core::{
    CellCoord, CellKind, Command, EconomyLedger, EnemyId, EnemyKind, EnemyMotion, EnemySnapshot,
    EnemyState, Event, FireError, GridLayout, MapError, PlacementError, ProjectileId, PurchaseError,
    SpawnError, TowerId, TowerKind, WaypointPath, WELCOME_BANNER,
};
use glam::Vec3;
use tracing::{debug, info, warn};

pub use economy::{STARTING_GOLD, STARTING_LIVES};
pub use grid::{DEFAULT_GRID_SIZE, DEFAULT_LAYOUT};
pub use path::{extract_path, PathExtraction};

use economy::Ledger;
use towers::{TowerRegistry, TowerState};

/// Maximum number of towers the world holds at once.
pub const MAX_TOWERS: usize = 20;

/// Maximum number of enemies the world holds at once.
pub const MAX_ENEMIES: usize = 50;

/// Maximum number of projectiles the world holds at once.
pub const MAX_PROJECTILES: usize = 100;

/// Travel speed of a freshly fired projectile.
pub const PROJECTILE_SPEED: f32 = 10.0;

const PROJECTILE_SPAWN_HEIGHT: f32 = 0.5;

/// Represents the authoritative Coop Defence world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    layout: GridLayout,
    waypoints: WaypointPath,
    path_error: Option<MapError>,
    base_position: Option<Vec3>,
    enemies: Vec<Enemy>,
    next_enemy_id: EnemyId,
    towers: TowerRegistry,
    projectiles: Vec<Projectile>,
    next_projectile_id: ProjectileId,
    ledger: Ledger,
    tick_index: u64,
    elapsed: Duration,
}

impl World {
    /// Creates a new world on the built-in map with the default economy.
    #[must_use]
    pub fn new() -> Self {
        let mut world = Self {
            banner: WELCOME_BANNER,
            layout: GridLayout::default(),
            waypoints: WaypointPath::default(),
            path_error: None,
            base_position: None,
            enemies: Vec::new(),
            next_enemy_id: EnemyId::new(0),
            towers: TowerRegistry::new(),
            projectiles: Vec::new(),
            next_projectile_id: ProjectileId::new(0),
            ledger: Ledger::default(),
            tick_index: 0,
            elapsed: Duration::ZERO,
        };
        let _ = world.load_layout(grid::default_layout());
        world
    }

    fn load_layout(&mut self, layout: GridLayout) -> PathExtraction {
        let extraction = extract_path(&layout.view());
        self.base_position = layout
            .view()
            .find(CellKind::Base)
            .map(|cell| layout.view().cell_to_world(cell));
        self.layout = layout;
        self.waypoints = if extraction.is_complete() {
            extraction.path.clone()
        } else {
            WaypointPath::default()
        };
        self.path_error = extraction.error;
        self.enemies.clear();
        self.projectiles.clear();
        self.towers = TowerRegistry::new();
        extraction
    }

    fn place_tower(&mut self, kind: TowerKind, cell: CellCoord) -> Result<TowerId, PlacementError> {
        let grid = self.layout.view();
        match grid.cell(cell) {
            None => return Err(PlacementError::OutOfBounds),
            Some(CellKind::Empty) => {}
            Some(_) => return Err(PlacementError::NotBuildable),
        }

        if self.towers.len() >= MAX_TOWERS {
            return Err(PlacementError::CapacityReached);
        }

        if self.towers.occupant(cell).is_some() {
            return Err(PlacementError::Occupied);
        }

        let id = self.towers.allocate();
        self.towers.insert(TowerState::spawn(id, kind, cell, &grid));
        Ok(id)
    }

    fn spawn_enemy(&mut self, kind: EnemyKind) -> Result<EnemyId, SpawnError> {
        let Some((start, next)) = self.waypoints.segment(0) else {
            return Err(SpawnError::NoPath);
        };

        if self.enemies.len() >= MAX_ENEMIES {
            return Err(SpawnError::CapacityReached);
        }

        let id = self.next_enemy_id;
        self.next_enemy_id = EnemyId::new(id.get().wrapping_add(1));
        let attributes = kind.attributes();
        self.enemies.push(Enemy {
            id,
            kind,
            position: start,
            direction: (next - start).normalize_or_zero(),
            segment: 0,
            progress: 0.0,
            health: attributes.max_health,
            state: EnemyState::Moving,
        });
        Ok(id)
    }

    fn fire(&mut self, tower: TowerId) -> Result<ProjectileId, FireError> {
        let Some(state) = self.towers.get(tower) else {
            return Err(FireError::UnknownTower);
        };

        if state.cooldown > 0.0 {
            return Err(FireError::CoolingDown);
        }

        if self.projectiles.len() >= MAX_PROJECTILES {
            return Err(FireError::CapacityReached);
        }

        let id = self.next_projectile_id;
        self.next_projectile_id = ProjectileId::new(id.get().wrapping_add(1));
        self.projectiles.push(Projectile {
            id,
            position: state.position + Vec3::Y * PROJECTILE_SPAWN_HEIGHT,
            direction: state.facing,
            speed: PROJECTILE_SPEED,
            damage: state.kind.attributes().attack_damage,
        });

        if let Some(state) = self.towers.get_mut(tower) {
            state.reload();
        }
        Ok(id)
    }

    fn resolve_hit(
        &mut self,
        projectile: ProjectileId,
        enemy: EnemyId,
        out_events: &mut Vec<Event>,
    ) {
        let Some(index) = self
            .projectiles
            .iter()
            .position(|candidate| candidate.id == projectile)
        else {
            return;
        };

        let damage = self.projectiles[index].damage;
        let Some(target) = self
            .enemies
            .iter_mut()
            .find(|candidate| candidate.id == enemy)
        else {
            return;
        };
        if target.state != EnemyState::Moving || target.health <= 0.0 {
            return;
        }

        target.health -= damage;
        let killed = if target.health <= 0.0 {
            target.state = EnemyState::Dead;
            Some(target.kind)
        } else {
            None
        };

        let _ = self.projectiles.remove(index);
        out_events.push(Event::ProjectileHit {
            projectile,
            enemy,
            damage,
        });

        if let Some(kind) = killed {
            let reward = kind.attributes().gold_reward;
            self.ledger.credit(reward);
            debug!(enemy = enemy.get(), ?kind, reward, "enemy killed");
            out_events.push(Event::EnemyKilled {
                enemy,
                kind,
                reward,
            });
        }
    }

    fn move_enemy(&mut self, enemy: EnemyId, motion: EnemyMotion, out_events: &mut Vec<Event>) {
        let last_index = self.waypoints.len().saturating_sub(1);
        let Some(target) = self
            .enemies
            .iter_mut()
            .find(|candidate| candidate.id == enemy)
        else {
            return;
        };
        if target.state.is_terminal() {
            return;
        }

        match motion {
            EnemyMotion::Advance {
                segment,
                progress,
                position,
                direction,
            } => {
                target.segment = segment;
                target.progress = progress;
                target.position = position;
                target.direction = direction;
            }
            EnemyMotion::ReachedBase { position } => {
                target.segment = last_index;
                target.progress = 0.0;
                target.position = position;
                target.state = EnemyState::ReachedBase;
                let kind = target.kind;
                let damage = kind.attributes().damage_to_base;
                let lives_remaining = self.ledger.lose_lives(damage);
                debug!(enemy = enemy.get(), ?kind, lives_remaining, "enemy reached the base");
                if lives_remaining == 0 {
                    warn!("base has fallen");
                }
                out_events.push(Event::EnemyReachedBase {
                    enemy,
                    kind,
                    damage,
                    lives_remaining,
                });
            }
            EnemyMotion::Halt => {
                target.state = EnemyState::ReachedBase;
                debug!(enemy = enemy.get(), "enemy halted at the end of the path");
                out_events.push(Event::EnemyHalted { enemy });
            }
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::LoadMap { layout } => {
            let (columns, rows) = (layout.columns(), layout.rows());
            let extraction = world.load_layout(layout);
            match extraction.error {
                None => {
                    info!(
                        columns,
                        rows,
                        waypoints = extraction.path.len(),
                        "map loaded"
                    );
                    out_events.push(Event::MapLoaded {
                        columns,
                        rows,
                        waypoints: extraction.path.len(),
                    });
                }
                Some(reason) => {
                    warn!(%reason, partial = extraction.path.len(), "path extraction failed");
                    out_events.push(Event::PathUnavailable { reason });
                }
            }
        }
        Command::ConfigureEconomy { gold, lives } => {
            world.ledger = Ledger::new(gold, lives);
            out_events.push(Event::EconomyConfigured { gold, lives });
        }
        Command::Tick { dt } => {
            world.tick_index = world.tick_index.saturating_add(1);
            world.elapsed = world.elapsed.saturating_add(dt);
            out_events.push(Event::TimeAdvanced { dt });

            let seconds = dt.as_secs_f32();
            for tower in world.towers.iter_mut() {
                if tower.advance(seconds) {
                    out_events.push(Event::TowerSettled { tower: tower.id });
                }
            }
        }
        Command::SpawnEnemy { kind } => match world.spawn_enemy(kind) {
            Ok(enemy) => out_events.push(Event::EnemySpawned { enemy, kind }),
            Err(reason) => {
                warn!(?kind, %reason, "enemy spawn rejected");
                out_events.push(Event::EnemySpawnRejected { kind, reason });
            }
        },
        Command::MoveEnemy { enemy, motion } => world.move_enemy(enemy, motion, out_events),
        Command::RemoveEnemy { enemy } => {
            let before = world.enemies.len();
            world
                .enemies
                .retain(|candidate| candidate.id != enemy || !candidate.is_removable());
            if world.enemies.len() < before {
                out_events.push(Event::EnemyRemoved { enemy });
            }
        }
        Command::PlaceTower { kind, cell } => match world.place_tower(kind, cell) {
            Ok(tower) => {
                info!(
                    tower = tower.get(),
                    ?kind,
                    column = cell.column(),
                    row = cell.row(),
                    "tower placed"
                );
                out_events.push(Event::TowerPlaced { tower, kind, cell });
            }
            Err(reason) => {
                warn!(
                    ?kind,
                    column = cell.column(),
                    row = cell.row(),
                    %reason,
                    "tower placement rejected"
                );
                out_events.push(Event::TowerPlacementRejected { kind, cell, reason });
            }
        },
        Command::PurchaseTower { kind, cell } => {
            let cost = kind.attributes().build_cost;
            let outcome = if !world.layout.view().can_place_tower(cell) {
                let reason = if world.layout.view().cell(cell).is_none() {
                    PlacementError::OutOfBounds
                } else {
                    PlacementError::NotBuildable
                };
                Err(PurchaseError::Placement(reason))
            } else if !world.ledger.try_debit(cost) {
                Err(PurchaseError::InsufficientFunds {
                    cost,
                    balance: world.ledger.balance(),
                })
            } else {
                world.place_tower(kind, cell).map_err(|reason| {
                    world.ledger.credit(cost);
                    PurchaseError::Placement(reason)
                })
            };

            match outcome {
                Ok(tower) => {
                    info!(
                        tower = tower.get(),
                        ?kind,
                        cost,
                        balance = world.ledger.balance(),
                        "tower purchased"
                    );
                    out_events.push(Event::TowerPurchased {
                        tower,
                        kind,
                        cell,
                        cost,
                    });
                }
                Err(reason) => {
                    warn!(
                        ?kind,
                        column = cell.column(),
                        row = cell.row(),
                        %reason,
                        "tower purchase rejected"
                    );
                    out_events.push(Event::TowerPurchaseRejected { kind, cell, reason });
                }
            }
        }
        Command::AimTower { tower, direction } => {
            if let Some(state) = world.towers.get_mut(tower) {
                if let Some(facing) = direction.try_normalize() {
                    state.facing = facing;
                }
            }
        }
        Command::FireProjectile { tower } => match world.fire(tower) {
            Ok(projectile) => out_events.push(Event::ProjectileFired { projectile, tower }),
            Err(reason) => {
                if reason == FireError::CapacityReached {
                    warn!(tower = tower.get(), %reason, "shot rejected");
                }
                out_events.push(Event::ProjectileRejected { tower, reason });
            }
        },
        Command::MoveProjectile {
            projectile,
            position,
        } => {
            if let Some(state) = world
                .projectiles
                .iter_mut()
                .find(|candidate| candidate.id == projectile)
            {
                state.position = position;
            }
        }
        Command::ExpireProjectile { projectile } => {
            let before = world.projectiles.len();
            world.projectiles.retain(|candidate| candidate.id != projectile);
            if world.projectiles.len() < before {
                out_events.push(Event::ProjectileExpired { projectile });
            }
        }
        Command::ResolveHit { projectile, enemy } => {
            world.resolve_hit(projectile, enemy, out_events);
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use super::World;
    use coop_defence_core::{
        CellCoord, EconomyLedger, EnemyView, GridMapView, MapError, ProjectileSnapshot,
        ProjectileView, TowerSnapshot, TowerView, WaypointPath,
    };
    use glam::Vec3;

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Provides read-only access to the grid map.
    #[must_use]
    pub fn grid(world: &World) -> GridMapView<'_> {
        world.layout.view()
    }

    /// Waypoints enemies walk. Empty when the map has no complete path.
    #[must_use]
    pub fn waypoints(world: &World) -> &WaypointPath {
        &world.waypoints
    }

    /// Reason the current map yields no path, if any.
    #[must_use]
    pub fn path_error(world: &World) -> Option<MapError> {
        world.path_error
    }

    /// World position of the base cell, if the map has one.
    #[must_use]
    pub fn base_position(world: &World) -> Option<Vec3> {
        world.base_position
    }

    /// Captures a read-only view of the enemy set, in spawn order.
    #[must_use]
    pub fn enemy_view(world: &World) -> EnemyView {
        EnemyView::from_snapshots(world.enemies.iter().map(super::Enemy::snapshot).collect())
    }

    /// Number of enemies in the enemy set, including those awaiting removal.
    #[must_use]
    pub fn enemy_count(world: &World) -> usize {
        world.enemies.len()
    }

    /// Captures a read-only view of the tower set.
    #[must_use]
    pub fn tower_view(world: &World) -> TowerView {
        TowerView::from_snapshots(world.towers.iter().map(|tower| tower.snapshot()).collect())
    }

    /// Describes the tower standing on the provided cell.
    #[must_use]
    pub fn tower_at(world: &World, cell: CellCoord) -> Option<TowerSnapshot> {
        let id = world.towers.occupant(cell)?;
        world.towers.get(id).map(|tower| tower.snapshot())
    }

    /// Captures a read-only view of the live projectiles.
    #[must_use]
    pub fn projectile_view(world: &World) -> ProjectileView {
        ProjectileView::from_snapshots(
            world
                .projectiles
                .iter()
                .map(|projectile| ProjectileSnapshot {
                    id: projectile.id,
                    position: projectile.position,
                    direction: projectile.direction,
                    speed: projectile.speed,
                    damage: projectile.damage,
                })
                .collect(),
        )
    }

    /// Reports whether the terrain at the cell accepts a tower.
    ///
    /// Occupancy by another tower is checked when the tower is placed.
    #[must_use]
    pub fn can_place_tower(world: &World, cell: CellCoord) -> bool {
        world.layout.view().can_place_tower(cell)
    }

    /// Current gold balance.
    #[must_use]
    pub fn gold(world: &World) -> u32 {
        world.ledger.balance()
    }

    /// Lives remaining.
    #[must_use]
    pub fn lives(world: &World) -> u32 {
        world.ledger.lives()
    }

    /// Reports whether the base has run out of lives.
    #[must_use]
    pub fn is_game_over(world: &World) -> bool {
        world.ledger.lives() == 0
    }

    /// Number of ticks applied since the world was created.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Simulated time accumulated across all ticks.
    #[must_use]
    pub fn elapsed(world: &World) -> Duration {
        world.elapsed
    }
}

#[derive(Clone, Debug)]
struct Enemy {
    id: EnemyId,
    kind: EnemyKind,
    position: Vec3,
    direction: Vec3,
    segment: usize,
    progress: f32,
    health: f32,
    state: EnemyState,
}

impl Enemy {
    fn snapshot(&self) -> EnemySnapshot {
        let attributes = self.kind.attributes();
        EnemySnapshot {
            id: self.id,
            kind: self.kind,
            position: self.position,
            direction: self.direction,
            segment: self.segment,
            progress: self.progress,
            health: self.health,
            max_health: attributes.max_health,
            move_speed: attributes.move_speed,
            state: self.state,
        }
    }

    fn is_removable(&self) -> bool {
        self.state.is_terminal() || self.health <= 0.0
    }
}

#[derive(Clone, Debug)]
struct Projectile {
    id: ProjectileId,
    position: Vec3,
    direction: Vec3,
    speed: f32,
    damage: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(world: &mut World, commands: Vec<Command>) -> Vec<Event> {
        let mut events = Vec::new();
        for command in commands {
            apply(world, command, &mut events);
        }
        events
    }

    fn only_enemy(world: &World) -> EnemySnapshot {
        let enemies = query::enemy_view(world).into_vec();
        assert_eq!(enemies.len(), 1);
        enemies[0]
    }

    #[test]
    fn new_world_loads_default_map() {
        let world = World::new();
        assert_eq!(query::welcome_banner(&world), WELCOME_BANNER);
        assert_eq!(query::waypoints(&world).len(), 8);
        assert_eq!(query::path_error(&world), None);
        assert_eq!(query::base_position(&world), Some(Vec3::new(6.0, 0.0, 6.0)));
        assert_eq!(query::gold(&world), STARTING_GOLD);
        assert_eq!(query::lives(&world), STARTING_LIVES);
    }

    #[test]
    fn map_without_start_leaves_no_path() {
        let mut world = World::new();
        let layout = GridLayout::from_codes(&[[0, 1, 1, 3]]).expect("layout");
        let events = drain(
            &mut world,
            vec![Command::LoadMap { layout }, Command::SpawnEnemy { kind: EnemyKind::Rat }],
        );

        assert_eq!(
            events,
            vec![
                Event::PathUnavailable {
                    reason: MapError::MissingStart
                },
                Event::EnemySpawnRejected {
                    kind: EnemyKind::Rat,
                    reason: SpawnError::NoPath
                },
            ]
        );
        assert!(query::waypoints(&world).is_empty());
    }

    #[test]
    fn spawned_enemy_starts_at_first_waypoint() {
        let mut world = World::new();
        let events = drain(&mut world, vec![Command::SpawnEnemy { kind: EnemyKind::Wolf }]);
        assert_eq!(
            events,
            vec![Event::EnemySpawned {
                enemy: EnemyId::new(0),
                kind: EnemyKind::Wolf
            }]
        );

        let enemy = only_enemy(&world);
        assert_eq!(enemy.position, Vec3::new(-6.0, 0.0, -6.0));
        assert_eq!(enemy.direction, Vec3::X);
        assert_eq!(enemy.segment, 0);
        assert_eq!(enemy.health, 150.0);
        assert_eq!(enemy.state, EnemyState::Moving);
    }

    #[test]
    fn enemy_capacity_is_enforced() {
        let mut world = World::new();
        let commands = vec![Command::SpawnEnemy { kind: EnemyKind::Rat }; MAX_ENEMIES + 1];
        let events = drain(&mut world, commands);

        assert_eq!(query::enemy_count(&world), MAX_ENEMIES);
        assert_eq!(
            events.last(),
            Some(&Event::EnemySpawnRejected {
                kind: EnemyKind::Rat,
                reason: SpawnError::CapacityReached
            })
        );
    }

    #[test]
    fn reaching_base_costs_lives_once() {
        let mut world = World::new();
        let _ = drain(&mut world, vec![Command::SpawnEnemy { kind: EnemyKind::Wolf }]);
        let enemy = EnemyId::new(0);
        let motion = EnemyMotion::ReachedBase {
            position: Vec3::new(6.0, 0.0, 6.0),
        };

        let events = drain(
            &mut world,
            vec![
                Command::MoveEnemy { enemy, motion },
                Command::MoveEnemy { enemy, motion },
            ],
        );

        assert_eq!(
            events,
            vec![Event::EnemyReachedBase {
                enemy,
                kind: EnemyKind::Wolf,
                damage: 3,
                lives_remaining: STARTING_LIVES - 3
            }]
        );
        assert_eq!(only_enemy(&world).state, EnemyState::ReachedBase);

        let events = drain(&mut world, vec![Command::RemoveEnemy { enemy }]);
        assert_eq!(events, vec![Event::EnemyRemoved { enemy }]);
        assert_eq!(query::enemy_count(&world), 0);
    }

    #[test]
    fn moving_enemies_are_not_removed() {
        let mut world = World::new();
        let _ = drain(&mut world, vec![Command::SpawnEnemy { kind: EnemyKind::Rat }]);
        let events = drain(&mut world, vec![Command::RemoveEnemy { enemy: EnemyId::new(0) }]);
        assert!(events.is_empty());
        assert_eq!(query::enemy_count(&world), 1);
    }

    #[test]
    fn purchase_debits_cost_and_places_tower() {
        let mut world = World::new();
        let cell = CellCoord::new(3, 3);
        let events = drain(
            &mut world,
            vec![Command::PurchaseTower {
                kind: TowerKind::Chicken,
                cell,
            }],
        );

        assert_eq!(
            events,
            vec![Event::TowerPurchased {
                tower: TowerId::new(0),
                kind: TowerKind::Chicken,
                cell,
                cost: 100
            }]
        );
        assert_eq!(query::gold(&world), STARTING_GOLD - 100);

        let tower = query::tower_at(&world, cell).expect("tower placed");
        assert_eq!(tower.kind, TowerKind::Chicken);
        assert!(!tower.settled);
        assert!((tower.position.y - 3.0).abs() < f32::EPSILON);
    }

    #[test]
    fn purchase_on_occupied_cell_refunds_cost() {
        let mut world = World::new();
        let cell = CellCoord::new(3, 3);
        let events = drain(
            &mut world,
            vec![
                Command::PlaceTower {
                    kind: TowerKind::Chicken,
                    cell,
                },
                Command::PurchaseTower {
                    kind: TowerKind::Chicken,
                    cell,
                },
            ],
        );

        assert_eq!(
            events[1],
            Event::TowerPurchaseRejected {
                kind: TowerKind::Chicken,
                cell,
                reason: PurchaseError::Placement(PlacementError::Occupied)
            }
        );
        assert_eq!(query::gold(&world), STARTING_GOLD);
    }

    #[test]
    fn purchase_without_funds_leaves_balance() {
        let mut world = World::new();
        let cell = CellCoord::new(3, 3);
        let events = drain(
            &mut world,
            vec![
                Command::ConfigureEconomy {
                    gold: 100,
                    lives: 20,
                },
                Command::PurchaseTower {
                    kind: TowerKind::Beagle,
                    cell,
                },
            ],
        );

        assert_eq!(
            events[1],
            Event::TowerPurchaseRejected {
                kind: TowerKind::Beagle,
                cell,
                reason: PurchaseError::InsufficientFunds {
                    cost: 150,
                    balance: 100
                }
            }
        );
        assert_eq!(query::gold(&world), 100);
        assert!(query::tower_at(&world, cell).is_none());
    }

    #[test]
    fn towers_are_rejected_on_path_and_outside_map() {
        let mut world = World::new();
        let events = drain(
            &mut world,
            vec![
                Command::PlaceTower {
                    kind: TowerKind::Chicken,
                    cell: CellCoord::new(2, 1),
                },
                Command::PlaceTower {
                    kind: TowerKind::Chicken,
                    cell: CellCoord::new(15, 1),
                },
            ],
        );

        assert_eq!(
            events,
            vec![
                Event::TowerPlacementRejected {
                    kind: TowerKind::Chicken,
                    cell: CellCoord::new(2, 1),
                    reason: PlacementError::NotBuildable
                },
                Event::TowerPlacementRejected {
                    kind: TowerKind::Chicken,
                    cell: CellCoord::new(15, 1),
                    reason: PlacementError::OutOfBounds
                },
            ]
        );
    }

    #[test]
    fn tower_capacity_is_enforced() {
        let mut world = World::new();
        let commands = (0..=MAX_TOWERS as u32)
            .map(|index| Command::PlaceTower {
                kind: TowerKind::Chicken,
                cell: CellCoord::new(6 + index % 7, 2 + index / 7),
            })
            .collect();
        let events = drain(&mut world, commands);

        assert_eq!(query::tower_view(&world).into_vec().len(), MAX_TOWERS);
        assert!(matches!(
            events.last(),
            Some(Event::TowerPlacementRejected {
                reason: PlacementError::CapacityReached,
                ..
            })
        ));
    }

    #[test]
    fn ticks_settle_dropped_towers() {
        let mut world = World::new();
        let _ = drain(
            &mut world,
            vec![Command::PlaceTower {
                kind: TowerKind::Beagle,
                cell: CellCoord::new(3, 3),
            }],
        );

        let mut settled = Vec::new();
        for _ in 0..600 {
            let events = drain(
                &mut world,
                vec![Command::Tick {
                    dt: Duration::from_millis(16),
                }],
            );
            settled.extend(
                events
                    .into_iter()
                    .filter(|event| matches!(event, Event::TowerSettled { .. })),
            );
        }

        assert_eq!(
            settled,
            vec![Event::TowerSettled {
                tower: TowerId::new(0)
            }]
        );
        let tower = query::tower_at(&world, CellCoord::new(3, 3)).expect("tower");
        assert!(tower.settled);
        assert!((tower.position.y - 0.3).abs() < 1e-5);
        assert_eq!(query::tick_index(&world), 600);
    }

    #[test]
    fn firing_spawns_projectile_and_starts_cooldown() {
        let mut world = World::new();
        let tower = TowerId::new(0);
        let events = drain(
            &mut world,
            vec![
                Command::PlaceTower {
                    kind: TowerKind::Chicken,
                    cell: CellCoord::new(3, 3),
                },
                Command::AimTower {
                    tower,
                    direction: Vec3::new(0.0, 0.0, 2.0),
                },
                Command::FireProjectile { tower },
                Command::FireProjectile { tower },
            ],
        );

        assert_eq!(
            &events[1..],
            &[
                Event::ProjectileFired {
                    projectile: ProjectileId::new(0),
                    tower
                },
                Event::ProjectileRejected {
                    tower,
                    reason: FireError::CoolingDown
                },
            ]
        );

        let projectiles = query::projectile_view(&world).into_vec();
        assert_eq!(projectiles.len(), 1);
        assert_eq!(projectiles[0].direction, Vec3::Z);
        assert_eq!(projectiles[0].speed, PROJECTILE_SPEED);
        assert!((projectiles[0].position.y - 3.5).abs() < f32::EPSILON);
        let cooldown = query::tower_view(&world).into_vec()[0].cooldown;
        assert!((cooldown - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn zero_length_aim_keeps_facing() {
        let mut world = World::new();
        let tower = TowerId::new(0);
        let _ = drain(
            &mut world,
            vec![Command::PlaceTower {
                kind: TowerKind::Chicken,
                cell: CellCoord::new(3, 3),
            }],
        );
        let before = query::tower_view(&world).into_vec()[0].facing;
        let _ = drain(
            &mut world,
            vec![Command::AimTower {
                tower,
                direction: Vec3::ZERO,
            }],
        );
        assert_eq!(query::tower_view(&world).into_vec()[0].facing, before);
    }

    #[test]
    fn lethal_hit_credits_reward_once() {
        let mut world = World::new();
        let tower = TowerId::new(0);
        let enemy = EnemyId::new(0);
        let _ = drain(
            &mut world,
            vec![
                Command::ConfigureEconomy {
                    gold: 100,
                    lives: 20,
                },
                Command::PlaceTower {
                    kind: TowerKind::Chicken,
                    cell: CellCoord::new(3, 3),
                },
                Command::SpawnEnemy { kind: EnemyKind::Fox },
            ],
        );

        let mut events = Vec::new();
        for _ in 0..3 {
            apply(&mut world, Command::FireProjectile { tower }, &mut events);
            let projectile = query::projectile_view(&world).into_vec()[0].id;
            apply(&mut world, Command::ResolveHit { projectile, enemy }, &mut events);
            apply(
                &mut world,
                Command::Tick {
                    dt: Duration::from_secs(1),
                },
                &mut events,
            );
        }
        apply(&mut world, Command::FireProjectile { tower }, &mut events);
        let projectile = query::projectile_view(&world).into_vec()[0].id;
        apply(&mut world, Command::ResolveHit { projectile, enemy }, &mut events);

        let kills: Vec<&Event> = events
            .iter()
            .filter(|event| matches!(event, Event::EnemyKilled { .. }))
            .collect();
        assert_eq!(
            kills,
            vec![&Event::EnemyKilled {
                enemy,
                kind: EnemyKind::Fox,
                reward: 15
            }]
        );
        assert_eq!(query::gold(&world), 115);
        assert_eq!(only_enemy(&world).state, EnemyState::Dead);
        assert_eq!(query::projectile_view(&world).into_vec().len(), 1);
    }

    #[test]
    fn expired_projectiles_are_removed() {
        let mut world = World::new();
        let tower = TowerId::new(0);
        let projectile = ProjectileId::new(0);
        let events = drain(
            &mut world,
            vec![
                Command::PlaceTower {
                    kind: TowerKind::Chicken,
                    cell: CellCoord::new(3, 3),
                },
                Command::FireProjectile { tower },
                Command::MoveProjectile {
                    projectile,
                    position: Vec3::new(60.0, 0.0, 0.0),
                },
                Command::ExpireProjectile { projectile },
                Command::ExpireProjectile { projectile },
            ],
        );

        assert_eq!(events.last(), Some(&Event::ProjectileExpired { projectile }));
        assert!(query::projectile_view(&world).into_vec().is_empty());
    }
}
