#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Coop Defence simulation.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters and systems submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! describing what actually happened. Systems read immutable views such as
//! [`EnemyView`] and [`TowerView`] and respond exclusively with new command
//! batches, so every mutation of the Enemy, Tower and Projectile sets funnels
//! through a single place.

use std::time::Duration;

use glam::Vec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Coop Defence.";

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Replaces the grid map and recomputes the waypoint path from it.
    LoadMap {
        /// Cell layout that becomes the new grid map.
        layout: GridLayout,
    },
    /// Resets the economy ledger to the provided balances.
    ConfigureEconomy {
        /// Currency balance available for purchases.
        gold: u32,
        /// Lives remaining before the base falls.
        lives: u32,
    },
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests that a new enemy enters the path at its first waypoint.
    SpawnEnemy {
        /// Kind of enemy to spawn.
        kind: EnemyKind,
    },
    /// Applies the outcome of a locomotion step to a single enemy.
    MoveEnemy {
        /// Identifier of the enemy that moved.
        enemy: EnemyId,
        /// Resolved motion for the enemy during this tick.
        motion: EnemyMotion,
    },
    /// Removes an enemy that reached a terminal state from the enemy set.
    RemoveEnemy {
        /// Identifier of the enemy to remove.
        enemy: EnemyId,
    },
    /// Places a tower without consulting the economy ledger.
    PlaceTower {
        /// Type of tower to construct.
        kind: TowerKind,
        /// Cell that the tower occupies.
        cell: CellCoord,
    },
    /// Buys a tower, debiting its cost and refunding it if placement fails.
    PurchaseTower {
        /// Type of tower to construct.
        kind: TowerKind,
        /// Cell that the tower occupies.
        cell: CellCoord,
    },
    /// Turns a tower toward the provided direction.
    AimTower {
        /// Identifier of the tower being aimed.
        tower: TowerId,
        /// Direction the tower should face. Need not be normalised.
        direction: Vec3,
    },
    /// Requests that a tower launches a projectile along its facing.
    FireProjectile {
        /// Identifier of the firing tower.
        tower: TowerId,
    },
    /// Moves a projectile to a new position.
    MoveProjectile {
        /// Identifier of the projectile that moved.
        projectile: ProjectileId,
        /// Position reached after this tick's motion.
        position: Vec3,
    },
    /// Destroys a projectile that left the playable bounds.
    ExpireProjectile {
        /// Identifier of the projectile to destroy.
        projectile: ProjectileId,
    },
    /// Applies a projectile's damage to the enemy it collided with.
    ResolveHit {
        /// Identifier of the projectile that hit.
        projectile: ProjectileId,
        /// Identifier of the enemy that was struck.
        enemy: EnemyId,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Reports that a new grid map was loaded and a path extracted from it.
    MapLoaded {
        /// Number of columns in the loaded grid.
        columns: u32,
        /// Number of rows in the loaded grid.
        rows: u32,
        /// Number of waypoints in the extracted path.
        waypoints: usize,
    },
    /// Reports that the loaded map does not yield a usable path.
    PathUnavailable {
        /// Reason the path could not be extracted.
        reason: MapError,
    },
    /// Confirms that the economy ledger was reset.
    EconomyConfigured {
        /// Currency balance after the reset.
        gold: u32,
        /// Lives remaining after the reset.
        lives: u32,
    },
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Reports that a dropped tower came to rest on the ground.
    TowerSettled {
        /// Identifier of the tower that settled.
        tower: TowerId,
    },
    /// Confirms that an enemy entered the path.
    EnemySpawned {
        /// Identifier assigned to the new enemy.
        enemy: EnemyId,
        /// Kind of the new enemy.
        kind: EnemyKind,
    },
    /// Reports that a spawn request was refused.
    EnemySpawnRejected {
        /// Kind of enemy that was requested.
        kind: EnemyKind,
        /// Reason the spawn failed.
        reason: SpawnError,
    },
    /// Reports that an enemy stopped at the end of the path without reaching the base.
    EnemyHalted {
        /// Identifier of the halted enemy.
        enemy: EnemyId,
    },
    /// Reports that an enemy reached the base and cost the player lives.
    EnemyReachedBase {
        /// Identifier of the enemy.
        enemy: EnemyId,
        /// Kind of the enemy.
        kind: EnemyKind,
        /// Lives deducted by the leak.
        damage: u32,
        /// Lives remaining after the deduction.
        lives_remaining: u32,
    },
    /// Reports that an enemy was killed and its reward credited.
    EnemyKilled {
        /// Identifier of the enemy.
        enemy: EnemyId,
        /// Kind of the enemy.
        kind: EnemyKind,
        /// Gold credited to the ledger.
        reward: u32,
    },
    /// Confirms that a terminal enemy left the enemy set.
    EnemyRemoved {
        /// Identifier of the removed enemy.
        enemy: EnemyId,
    },
    /// Confirms that a tower was placed into the world.
    TowerPlaced {
        /// Identifier assigned to the tower by the world.
        tower: TowerId,
        /// Type of tower that was placed.
        kind: TowerKind,
        /// Cell occupied by the tower.
        cell: CellCoord,
    },
    /// Reports that a tower placement request was rejected.
    TowerPlacementRejected {
        /// Type of tower requested for placement.
        kind: TowerKind,
        /// Cell provided in the placement request.
        cell: CellCoord,
        /// Specific reason the placement failed.
        reason: PlacementError,
    },
    /// Confirms that a tower was bought and placed.
    TowerPurchased {
        /// Identifier assigned to the tower by the world.
        tower: TowerId,
        /// Type of tower that was bought.
        kind: TowerKind,
        /// Cell occupied by the tower.
        cell: CellCoord,
        /// Gold debited for the purchase.
        cost: u32,
    },
    /// Reports that a purchase was refused. No gold was spent.
    TowerPurchaseRejected {
        /// Type of tower requested.
        kind: TowerKind,
        /// Cell provided in the request.
        cell: CellCoord,
        /// Specific reason the purchase failed.
        reason: PurchaseError,
    },
    /// Confirms that a tower launched a projectile.
    ProjectileFired {
        /// Identifier assigned to the projectile.
        projectile: ProjectileId,
        /// Tower that fired.
        tower: TowerId,
    },
    /// Reports that a fire request was refused.
    ProjectileRejected {
        /// Tower that attempted to fire.
        tower: TowerId,
        /// Reason the shot was refused.
        reason: FireError,
    },
    /// Confirms that a projectile left the playable bounds and was destroyed.
    ProjectileExpired {
        /// Identifier of the destroyed projectile.
        projectile: ProjectileId,
    },
    /// Confirms that a projectile struck an enemy and was destroyed.
    ProjectileHit {
        /// Identifier of the destroyed projectile.
        projectile: ProjectileId,
        /// Enemy that absorbed the damage.
        enemy: EnemyId,
        /// Damage applied to the enemy.
        damage: f32,
    },
}

/// Locomotion outcome for a single enemy during one tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EnemyMotion {
    /// The enemy advanced along the path and is still moving.
    Advance {
        /// Index of the segment the enemy now traverses.
        segment: usize,
        /// Fraction of the segment already covered, in `[0, 1)`.
        progress: f32,
        /// Interpolated world position.
        position: Vec3,
        /// Unit facing direction.
        direction: Vec3,
    },
    /// The enemy completed the final segment and entered the base.
    ReachedBase {
        /// Final waypoint the enemy snapped to.
        position: Vec3,
    },
    /// The enemy already sits on the last waypoint and stops without reaching the base.
    Halt,
}

/// Lifecycle state of an enemy. Both non-moving states are terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyState {
    /// Alive and walking the path.
    Moving,
    /// Left the path at its end.
    ReachedBase,
    /// Killed by tower fire.
    Dead,
}

impl EnemyState {
    /// Reports whether the state admits no further transitions.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Moving)
    }
}

/// Unique identifier assigned to an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a tower.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TowerId(u32);

impl TowerId {
    /// Creates a new tower identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the tower identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a projectile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProjectileId(u32);

impl ProjectileId {
    /// Creates a new projectile identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the projectile identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
///
/// Columns run along the world X axis and rows along the world Z axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Computes the Chebyshev distance between two cell coordinates.
    #[must_use]
    pub fn chebyshev_distance(self, other: CellCoord) -> u32 {
        self.column()
            .abs_diff(other.column())
            .max(self.row().abs_diff(other.row()))
    }
}

/// Terrain type stored in a single grid cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellKind {
    /// Open ground where towers may be built.
    Empty,
    /// Corridor walked by enemies.
    Path,
    /// Impassable, unbuildable terrain.
    Blocked,
    /// Goal cell enemies try to reach.
    Base,
    /// Cell where enemies enter the map.
    Start,
}

impl CellKind {
    /// Decodes the numeric layout code used by map literals.
    ///
    /// `0` Empty, `1` Path, `2` Blocked, `3` Base, `4` Start.
    #[must_use]
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Empty),
            1 => Some(Self::Path),
            2 => Some(Self::Blocked),
            3 => Some(Self::Base),
            4 => Some(Self::Start),
            _ => None,
        }
    }

    /// Height of the terrain surface for this cell type.
    #[must_use]
    pub const fn ground_height(self) -> f32 {
        match self {
            Self::Empty | Self::Start => 0.0,
            Self::Path => -0.1,
            Self::Blocked => 0.5,
            Self::Base => 0.2,
        }
    }
}

/// Owned cell matrix describing a map.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GridLayout {
    columns: u32,
    rows: u32,
    cells: Vec<CellKind>,
}

impl GridLayout {
    /// Creates a layout from row-major cells.
    pub fn new(columns: u32, rows: u32, cells: Vec<CellKind>) -> Result<Self, MapError> {
        let expected = usize::try_from(u64::from(columns) * u64::from(rows)).unwrap_or(usize::MAX);
        if cells.len() != expected {
            return Err(MapError::DimensionMismatch {
                expected,
                actual: cells.len(),
            });
        }

        Ok(Self {
            columns,
            rows,
            cells,
        })
    }

    /// Creates a layout from rows of numeric cell codes.
    ///
    /// See [`CellKind::from_code`] for the accepted codes.
    pub fn from_codes<const W: usize>(rows: &[[u8; W]]) -> Result<Self, MapError> {
        let mut cells = Vec::with_capacity(rows.len() * W);
        for row in rows {
            for &code in row {
                cells.push(CellKind::from_code(code).ok_or(MapError::UnknownCellCode(code))?);
            }
        }

        let columns = u32::try_from(W).map_err(|_| MapError::DimensionMismatch {
            expected: u32::MAX as usize,
            actual: W,
        })?;
        let row_count = u32::try_from(rows.len()).map_err(|_| MapError::DimensionMismatch {
            expected: u32::MAX as usize,
            actual: rows.len(),
        })?;
        Self::new(columns, row_count, cells)
    }

    /// Number of columns in the layout.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows in the layout.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Consumes the layout, yielding its row-major cells.
    #[must_use]
    pub fn into_cells(self) -> Vec<CellKind> {
        self.cells
    }

    /// Borrows the layout as a read-only grid view.
    #[must_use]
    pub fn view(&self) -> GridMapView<'_> {
        GridMapView::new(&self.cells, self.columns, self.rows)
    }
}

/// Read-only view into the static grid map.
#[derive(Clone, Copy, Debug)]
pub struct GridMapView<'a> {
    cells: &'a [CellKind],
    columns: u32,
    rows: u32,
}

impl<'a> GridMapView<'a> {
    /// Captures a new grid view backed by the provided row-major cells.
    #[must_use]
    pub fn new(cells: &'a [CellKind], columns: u32, rows: u32) -> Self {
        Self {
            cells,
            columns,
            rows,
        }
    }

    /// Provides the dimensions of the grid as `(columns, rows)`.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }

    /// Returns the terrain stored in the provided cell, if it lies within bounds.
    #[must_use]
    pub fn cell(&self, cell: CellCoord) -> Option<CellKind> {
        self.index(cell)
            .and_then(|index| self.cells.get(index).copied())
    }

    /// Returns the terrain at signed coordinates, treating negatives as out of bounds.
    #[must_use]
    pub fn cell_at(&self, column: i64, row: i64) -> Option<CellKind> {
        let column = u32::try_from(column).ok()?;
        let row = u32::try_from(row).ok()?;
        self.cell(CellCoord::new(column, row))
    }

    /// Locates the first cell of the provided kind in row-major order.
    #[must_use]
    pub fn find(&self, kind: CellKind) -> Option<CellCoord> {
        let width = usize::try_from(self.columns).ok()?;
        if width == 0 {
            return None;
        }
        let index = self.cells.iter().position(|cell| *cell == kind)?;
        let column = u32::try_from(index % width).ok()?;
        let row = u32::try_from(index / width).ok()?;
        Some(CellCoord::new(column, row))
    }

    /// Reports whether a tower may be built on the cell: in bounds and empty.
    #[must_use]
    pub fn can_place_tower(&self, cell: CellCoord) -> bool {
        self.cell(cell) == Some(CellKind::Empty)
    }

    /// World-space centre of the cell on the `y = 0` plane.
    ///
    /// The grid is centred on the origin, one world unit per cell.
    #[must_use]
    pub fn cell_to_world(&self, cell: CellCoord) -> Vec3 {
        let x = cell.column() as f32 - self.columns as f32 / 2.0 + 0.5;
        let z = cell.row() as f32 - self.rows as f32 / 2.0 + 0.5;
        Vec3::new(x, 0.0, z)
    }

    /// Grid cell containing the provided world position, if within bounds.
    #[must_use]
    pub fn world_to_cell(&self, position: Vec3) -> Option<CellCoord> {
        let column = (position.x + self.columns as f32 / 2.0).floor();
        let row = (position.z + self.rows as f32 / 2.0).floor();
        if column < 0.0 || row < 0.0 {
            return None;
        }

        let cell = CellCoord::new(column as u32, row as u32);
        self.index(cell).map(|_| cell)
    }

    /// Terrain height of the cell, or zero outside the grid.
    #[must_use]
    pub fn ground_height(&self, cell: CellCoord) -> f32 {
        self.cell(cell).map_or(0.0, CellKind::ground_height)
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if cell.column() < self.columns && cell.row() < self.rows {
            let row = usize::try_from(cell.row()).ok()?;
            let column = usize::try_from(cell.column()).ok()?;
            let width = usize::try_from(self.columns).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}

/// Ordered world-space waypoints from the start cell to the base cell.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WaypointPath {
    points: Vec<Vec3>,
}

impl WaypointPath {
    /// Wraps the provided waypoints.
    #[must_use]
    pub fn new(points: Vec<Vec3>) -> Self {
        Self { points }
    }

    /// Waypoints in walking order.
    #[must_use]
    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    /// Number of waypoints.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Reports whether the path holds no waypoints.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Reports whether enemies can walk the path. Fewer than two waypoints means "no path".
    #[must_use]
    pub fn is_traversable(&self) -> bool {
        self.points.len() >= 2
    }

    /// Waypoint at the provided index.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<Vec3> {
        self.points.get(index).copied()
    }

    /// First waypoint, where enemies spawn.
    #[must_use]
    pub fn first(&self) -> Option<Vec3> {
        self.points.first().copied()
    }

    /// Final waypoint, the base.
    #[must_use]
    pub fn last(&self) -> Option<Vec3> {
        self.points.last().copied()
    }

    /// Endpoints of the segment starting at `index`.
    #[must_use]
    pub fn segment(&self, index: usize) -> Option<(Vec3, Vec3)> {
        let start = self.get(index)?;
        let end = self.get(index.checked_add(1)?)?;
        Some((start, end))
    }
}

/// Kinds of enemies that walk the path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EnemyKind {
    /// Weak, common enemy.
    Rat,
    /// Fast, fragile enemy.
    Fox,
    /// Slow, heavily armoured enemy.
    Wolf,
    /// Flying enemy rendered well above the path.
    Hawk,
}

impl EnemyKind {
    /// Every enemy kind in table order.
    pub const ALL: [EnemyKind; 4] = [Self::Rat, Self::Fox, Self::Wolf, Self::Hawk];

    const fn index(self) -> usize {
        match self {
            Self::Rat => 0,
            Self::Fox => 1,
            Self::Wolf => 2,
            Self::Hawk => 3,
        }
    }

    /// Gameplay attributes of the kind.
    #[must_use]
    pub const fn attributes(self) -> &'static EnemyAttributes {
        &ENEMY_ATTRIBUTES[self.index()]
    }

    /// Presentation data of the kind, also used to find its body centre.
    #[must_use]
    pub const fn render_info(self) -> &'static EnemyRenderInfo {
        &ENEMY_RENDER_INFO[self.index()]
    }
}

/// Gameplay attributes shared by every enemy of a kind.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemyAttributes {
    /// Health an enemy spawns with.
    pub max_health: f32,
    /// Walking speed in world units per second.
    pub move_speed: f32,
    /// Gold credited when the enemy is killed.
    pub gold_reward: u32,
    /// Lives deducted when the enemy reaches the base.
    pub damage_to_base: u32,
}

/// Presentation attributes shared by every enemy of a kind.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemyRenderInfo {
    /// Vertical offset from the path to the body centre.
    pub y_offset: f32,
    /// Radius of the collision sphere around the body centre.
    pub collision_radius: f32,
    /// Uniform model scale.
    pub scale: f32,
}

const ENEMY_ATTRIBUTES: [EnemyAttributes; 4] = [
    EnemyAttributes {
        max_health: 30.0,
        move_speed: 2.5,
        gold_reward: 5,
        damage_to_base: 1,
    },
    EnemyAttributes {
        max_health: 30.0,
        move_speed: 4.0,
        gold_reward: 15,
        damage_to_base: 1,
    },
    EnemyAttributes {
        max_health: 150.0,
        move_speed: 1.5,
        gold_reward: 30,
        damage_to_base: 3,
    },
    EnemyAttributes {
        max_health: 40.0,
        move_speed: 3.0,
        gold_reward: 20,
        damage_to_base: 2,
    },
];

const ENEMY_RENDER_INFO: [EnemyRenderInfo; 4] = [
    EnemyRenderInfo {
        y_offset: 0.15,
        collision_radius: 0.25,
        scale: 0.4,
    },
    EnemyRenderInfo {
        y_offset: 0.3,
        collision_radius: 0.35,
        scale: 0.6,
    },
    EnemyRenderInfo {
        y_offset: 0.45,
        collision_radius: 0.45,
        scale: 0.8,
    },
    EnemyRenderInfo {
        y_offset: 1.2,
        collision_radius: 0.35,
        scale: 0.5,
    },
];

/// Types of towers that can be constructed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TowerKind {
    /// Cheap egg-throwing tower.
    Chicken,
    /// Pricier tower with the same armament.
    Beagle,
}

impl TowerKind {
    /// Combat and economy attributes of the kind.
    #[must_use]
    pub const fn attributes(self) -> &'static TowerAttributes {
        match self {
            Self::Chicken => &CHICKEN_TOWER,
            Self::Beagle => &BEAGLE_TOWER,
        }
    }
}

/// Combat and economy attributes shared by every tower of a kind.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerAttributes {
    /// Euclidean targeting radius in world units.
    pub attack_range: f32,
    /// Damage carried by each projectile.
    pub attack_damage: f32,
    /// Shots per second.
    pub attack_speed: f32,
    /// Gold debited by a purchase.
    pub build_cost: u32,
}

const CHICKEN_TOWER: TowerAttributes = TowerAttributes {
    attack_range: 3.0,
    attack_damage: 10.0,
    attack_speed: 1.0,
    build_cost: 100,
};

const BEAGLE_TOWER: TowerAttributes = TowerAttributes {
    attack_range: 3.0,
    attack_damage: 10.0,
    attack_speed: 1.0,
    build_cost: 150,
};

/// Immutable representation of a single enemy's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemySnapshot {
    /// Unique identifier assigned to the enemy.
    pub id: EnemyId,
    /// Kind of the enemy.
    pub kind: EnemyKind,
    /// Position on the path, feet on the ground.
    pub position: Vec3,
    /// Unit facing direction.
    pub direction: Vec3,
    /// Index of the segment currently walked.
    pub segment: usize,
    /// Fraction of the current segment covered.
    pub progress: f32,
    /// Remaining health.
    pub health: f32,
    /// Health at spawn.
    pub max_health: f32,
    /// Walking speed in world units per second.
    pub move_speed: f32,
    /// Lifecycle state.
    pub state: EnemyState,
}

impl EnemySnapshot {
    /// Reports whether towers and projectiles may engage the enemy.
    ///
    /// Terminal enemies and enemies at zero health linger for one tick before
    /// removal and must be ignored.
    #[must_use]
    pub fn is_targetable(&self) -> bool {
        self.state == EnemyState::Moving && self.health > 0.0
    }

    /// Distance walked measured in segments: segment index plus fractional progress.
    #[must_use]
    pub fn total_progress(&self) -> f32 {
        self.segment as f32 + self.progress
    }

    /// Body centre used for aiming and collision.
    #[must_use]
    pub fn render_position(&self) -> Vec3 {
        self.position + Vec3::Y * self.kind.render_info().y_offset
    }
}

/// Read-only snapshot describing all enemies in the enemy set.
#[derive(Clone, Debug, Default)]
pub struct EnemyView {
    snapshots: Vec<EnemySnapshot>,
}

impl EnemyView {
    /// Creates a new enemy view from the provided snapshots.
    ///
    /// Snapshots are ordered by identifier, which matches spawn order.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<EnemySnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured enemy snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &EnemySnapshot> {
        self.snapshots.iter()
    }

    /// Number of enemies captured by the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view holds no enemies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<EnemySnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a single tower's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerSnapshot {
    /// Identifier allocated to the tower by the world.
    pub id: TowerId,
    /// Kind of tower that was constructed.
    pub kind: TowerKind,
    /// Cell occupied by the tower.
    pub cell: CellCoord,
    /// Current body position, including any drop-in height.
    pub position: Vec3,
    /// Unit facing direction.
    pub facing: Vec3,
    /// Euclidean targeting radius.
    pub attack_range: f32,
    /// Damage per projectile.
    pub attack_damage: f32,
    /// Shots per second.
    pub attack_speed: f32,
    /// Seconds remaining until the tower may fire. Zero or below means ready.
    pub cooldown: f32,
    /// Reports whether the drop-in animation finished.
    pub settled: bool,
}

impl TowerSnapshot {
    /// Reports whether the tower's cooldown has elapsed.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.cooldown <= 0.0
    }
}

/// Read-only snapshot describing all towers.
#[derive(Clone, Debug, Default)]
pub struct TowerView {
    snapshots: Vec<TowerSnapshot>,
}

impl TowerView {
    /// Creates a new tower view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<TowerSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured tower snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &TowerSnapshot> {
        self.snapshots.iter()
    }

    /// Looks up a tower by identifier.
    #[must_use]
    pub fn get(&self, tower: TowerId) -> Option<&TowerSnapshot> {
        self.snapshots
            .binary_search_by_key(&tower, |snapshot| snapshot.id)
            .ok()
            .map(|index| &self.snapshots[index])
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<TowerSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a single projectile's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectileSnapshot {
    /// Identifier allocated to the projectile.
    pub id: ProjectileId,
    /// Current position.
    pub position: Vec3,
    /// Unit travel direction.
    pub direction: Vec3,
    /// Travel speed in world units per second.
    pub speed: f32,
    /// Damage applied on impact.
    pub damage: f32,
}

/// Read-only snapshot describing all live projectiles.
#[derive(Clone, Debug, Default)]
pub struct ProjectileView {
    snapshots: Vec<ProjectileSnapshot>,
}

impl ProjectileView {
    /// Creates a new projectile view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<ProjectileSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured projectile snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &ProjectileSnapshot> {
        self.snapshots.iter()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<ProjectileSnapshot> {
        self.snapshots
    }
}

/// Target assignment produced by the targeting system for a single tower.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerTarget {
    /// Tower engaging the enemy.
    pub tower: TowerId,
    /// Enemy selected as the target.
    pub enemy: EnemyId,
    /// Tower body position at selection time.
    pub tower_position: Vec3,
    /// Enemy body centre the tower aims at.
    pub aim_point: Vec3,
}

/// Currency and lives bookkeeping consulted by the simulation.
pub trait EconomyLedger {
    /// Adds gold to the balance.
    fn credit(&mut self, amount: u32);

    /// Removes gold if the balance covers it. Leaves the balance untouched otherwise.
    fn try_debit(&mut self, amount: u32) -> bool;

    /// Current gold balance.
    fn balance(&self) -> u32;

    /// Deducts lives, flooring at zero, and returns the lives remaining.
    fn lose_lives(&mut self, amount: u32) -> u32;

    /// Lives remaining.
    fn lives(&self) -> u32;
}

/// Reasons a map cannot produce a walkable path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error, Serialize, Deserialize)]
pub enum MapError {
    /// The cell count does not match the declared dimensions.
    #[error("layout holds {actual} cells but its dimensions require {expected}")]
    DimensionMismatch {
        /// Cell count implied by the dimensions.
        expected: usize,
        /// Cell count supplied.
        actual: usize,
    },
    /// A layout literal used an unknown cell code.
    #[error("unknown cell code {0}")]
    UnknownCellCode(u8),
    /// The grid holds no start cell.
    #[error("grid has no start cell")]
    MissingStart,
    /// The walk from the start dead-ended before entering the base.
    #[error("path is blocked at column {column}, row {row}")]
    Unreachable {
        /// Column where the walk stopped.
        column: u32,
        /// Row where the walk stopped.
        row: u32,
    },
}

/// Reasons a tower placement request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error, Serialize, Deserialize)]
pub enum PlacementError {
    /// The requested cell lies beyond the grid bounds.
    #[error("cell lies outside the map")]
    OutOfBounds,
    /// The requested cell is not empty ground.
    #[error("terrain does not allow building")]
    NotBuildable,
    /// Another tower already occupies the cell.
    #[error("cell already holds a tower")]
    Occupied,
    /// The tower set is full.
    #[error("tower limit reached")]
    CapacityReached,
}

/// Reasons a tower purchase may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error, Serialize, Deserialize)]
pub enum PurchaseError {
    /// The ledger balance does not cover the cost.
    #[error("insufficient funds: cost {cost}, balance {balance}")]
    InsufficientFunds {
        /// Cost of the requested tower.
        cost: u32,
        /// Balance at the time of the request.
        balance: u32,
    },
    /// The tower could not be placed; the cost was refunded.
    #[error("placement failed: {0}")]
    Placement(#[from] PlacementError),
}

/// Reasons an enemy spawn may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error, Serialize, Deserialize)]
pub enum SpawnError {
    /// The map has no walkable path.
    #[error("no walkable path")]
    NoPath,
    /// The enemy set is full.
    #[error("enemy limit reached")]
    CapacityReached,
}

/// Reasons a fire request may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error, Serialize, Deserialize)]
pub enum FireError {
    /// No tower with the provided identifier exists.
    #[error("unknown tower")]
    UnknownTower,
    /// The tower's cooldown has not elapsed.
    #[error("tower is cooling down")]
    CoolingDown,
    /// The projectile set is full.
    #[error("projectile limit reached")]
    CapacityReached,
}
