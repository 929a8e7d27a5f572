//! Authoritative tower state management utilities.

use std::collections::BTreeMap;

use coop_defence_core::{
    CellCoord, CellKind, GridMapView, TowerId, TowerKind, TowerSnapshot,
};
use glam::Vec3;

const GRAVITY: f32 = -9.8;
const BOUNCE_DAMPING: f32 = 0.5;
const SETTLE_SPEED: f32 = 0.1;
const DROP_HEIGHT: f32 = 3.0;
const BODY_RADIUS: f32 = 0.3;

/// Drop-in animation state of a tower body.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum TowerBody {
    /// Falling or bouncing with the given vertical velocity.
    Falling { velocity: f32 },
    /// Resting on the ground. Never leaves this state.
    Settled,
}

impl TowerBody {
    /// Integrates one step of motion and reports whether the body settled during it.
    ///
    /// `height` is updated in place and clamped to `rest_height` on contact.
    pub(crate) fn step(&mut self, height: &mut f32, rest_height: f32, dt: f32) -> bool {
        let Self::Falling { velocity } = self else {
            return false;
        };

        *velocity += GRAVITY * dt;
        *height += *velocity * dt;

        if *height > rest_height {
            return false;
        }

        *height = rest_height;
        *velocity = -*velocity * BOUNCE_DAMPING;
        if velocity.abs() < SETTLE_SPEED {
            *self = Self::Settled;
            return true;
        }
        false
    }

    pub(crate) fn is_settled(self) -> bool {
        matches!(self, Self::Settled)
    }
}

/// Snapshot of a tower stored inside the world.
#[derive(Clone, Debug)]
pub(crate) struct TowerState {
    /// Identifier allocated by the world for the tower.
    pub(crate) id: TowerId,
    /// Kind of tower that was constructed.
    pub(crate) kind: TowerKind,
    /// Cell occupied by the tower.
    pub(crate) cell: CellCoord,
    pub(crate) position: Vec3,
    pub(crate) facing: Vec3,
    pub(crate) cooldown: f32,
    pub(crate) body: TowerBody,
    rest_height: f32,
}

impl TowerState {
    /// Creates a tower hovering above its cell, facing the nearest path cell.
    pub(crate) fn spawn(
        id: TowerId,
        kind: TowerKind,
        cell: CellCoord,
        grid: &GridMapView<'_>,
    ) -> Self {
        let ground = grid.ground_height(cell);
        let position = grid.cell_to_world(cell) + Vec3::Y * (ground + DROP_HEIGHT);
        Self {
            id,
            kind,
            cell,
            position,
            facing: idle_facing(grid, cell, kind.attributes().attack_range),
            cooldown: 0.0,
            body: TowerBody::Falling { velocity: 0.0 },
            rest_height: ground + BODY_RADIUS,
        }
    }

    /// Advances the drop-in animation and the cooldown timer.
    ///
    /// Returns `true` when the tower settled during this step.
    pub(crate) fn advance(&mut self, dt: f32) -> bool {
        if self.cooldown > 0.0 {
            self.cooldown -= dt;
        }
        self.body.step(&mut self.position.y, self.rest_height, dt)
    }

    /// Resets the cooldown after a shot.
    pub(crate) fn reload(&mut self) {
        let speed = self.kind.attributes().attack_speed;
        self.cooldown = if speed > 0.0 { 1.0 / speed } else { 1.0 };
    }

    pub(crate) fn snapshot(&self) -> TowerSnapshot {
        let attributes = self.kind.attributes();
        TowerSnapshot {
            id: self.id,
            kind: self.kind,
            cell: self.cell,
            position: self.position,
            facing: self.facing,
            attack_range: attributes.attack_range,
            attack_damage: attributes.attack_damage,
            attack_speed: attributes.attack_speed,
            cooldown: self.cooldown,
            settled: self.body.is_settled(),
        }
    }
}

/// Registry that stores towers and manages identifier allocation.
#[derive(Debug)]
pub(crate) struct TowerRegistry {
    entries: BTreeMap<TowerId, TowerState>,
    next_tower_id: TowerId,
}

impl TowerRegistry {
    /// Creates an empty tower registry with a reset identifier counter.
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_tower_id: TowerId::new(0),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Reserves the next identifier.
    pub(crate) fn allocate(&mut self) -> TowerId {
        let id = self.next_tower_id;
        self.next_tower_id = TowerId::new(id.get().wrapping_add(1));
        id
    }

    pub(crate) fn insert(&mut self, state: TowerState) {
        let _ = self.entries.insert(state.id, state);
    }

    pub(crate) fn get(&self, tower: TowerId) -> Option<&TowerState> {
        self.entries.get(&tower)
    }

    pub(crate) fn get_mut(&mut self, tower: TowerId) -> Option<&mut TowerState> {
        self.entries.get_mut(&tower)
    }

    /// Identifier of the tower standing on the cell, if any.
    pub(crate) fn occupant(&self, cell: CellCoord) -> Option<TowerId> {
        self.entries
            .values()
            .find(|state| state.cell == cell)
            .map(|state| state.id)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &TowerState> {
        self.entries.values()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut TowerState> {
        self.entries.values_mut()
    }
}

/// Direction from the tower toward the nearest path cell.
///
/// Searches Chebyshev rings of radius `1..=ceil(range)` around the cell, columns
/// in the outer loop and rows in the inner loop, and faces the first path cell
/// found. Defaults to `+Z` when no path lies within reach.
pub(crate) fn idle_facing(grid: &GridMapView<'_>, cell: CellCoord, range: f32) -> Vec3 {
    let reach = range.max(0.0).ceil() as i64;
    let column = i64::from(cell.column());
    let row = i64::from(cell.row());

    for radius in 1..=reach {
        for dx in -radius..=radius {
            for dz in -radius..=radius {
                if dx.abs() != radius && dz.abs() != radius {
                    continue;
                }

                if grid.cell_at(column + dx, row + dz) == Some(CellKind::Path) {
                    return Vec3::new(dx as f32, 0.0, dz as f32).normalize();
                }
            }
        }
    }

    Vec3::Z
}

#[cfg(test)]
mod tests {
    use super::*;
    use coop_defence_core::GridLayout;

    #[test]
    fn registry_starts_empty_with_zero_identifier() {
        let mut registry = TowerRegistry::new();
        assert_eq!(registry.len(), 0);
        assert_eq!(registry.allocate(), TowerId::new(0));
        assert_eq!(registry.allocate(), TowerId::new(1));
    }

    #[test]
    fn falling_body_settles_and_stays_settled() {
        let mut body = TowerBody::Falling { velocity: 0.0 };
        let mut height = 3.3;
        let mut settled_steps = 0;

        for _ in 0..600 {
            if body.step(&mut height, 0.3, 1.0 / 60.0) {
                settled_steps += 1;
            }
            assert!(height >= 0.3 - f32::EPSILON);
        }

        assert_eq!(settled_steps, 1);
        assert!(body.is_settled());
        assert!((height - 0.3).abs() < f32::EPSILON);
        assert!(!body.step(&mut height, 0.3, 1.0));
        assert!((height - 0.3).abs() < f32::EPSILON);
    }

    #[test]
    fn slow_impact_settles_immediately() {
        let mut body = TowerBody::Falling { velocity: -0.1 };
        let mut height = 0.3;
        assert!(body.step(&mut height, 0.3, 0.001));
        assert_eq!(body, TowerBody::Settled);
    }

    #[test]
    fn idle_facing_points_at_nearest_path_cell() {
        let layout = GridLayout::from_codes(&[[0, 0, 0], [0, 0, 1], [0, 0, 0]]).expect("layout");
        let facing = idle_facing(&layout.view(), CellCoord::new(1, 1), 3.0);
        assert_eq!(facing, Vec3::X);
    }

    #[test]
    fn idle_facing_prefers_inner_rings() {
        let layout = GridLayout::from_codes(&[
            [1, 0, 0, 0, 0],
            [0, 0, 0, 0, 0],
            [0, 0, 0, 0, 0],
            [0, 0, 0, 1, 0],
            [0, 0, 0, 0, 0],
        ])
        .expect("layout");
        let facing = idle_facing(&layout.view(), CellCoord::new(2, 2), 3.0);
        assert_eq!(facing, Vec3::new(1.0, 0.0, 1.0).normalize());
    }

    #[test]
    fn idle_facing_defaults_forward_without_path() {
        let layout = GridLayout::from_codes(&[[0, 0, 0], [0, 0, 0], [0, 0, 0]]).expect("layout");
        assert_eq!(idle_facing(&layout.view(), CellCoord::new(1, 1), 3.0), Vec3::Z);
    }

    #[test]
    fn cooldown_only_counts_down_while_positive() {
        let layout = GridLayout::from_codes(&[[0, 1]]).expect("layout");
        let mut tower = TowerState::spawn(
            TowerId::new(0),
            TowerKind::Chicken,
            CellCoord::new(0, 0),
            &layout.view(),
        );
        assert_eq!(tower.facing, Vec3::X);

        let _ = tower.advance(0.5);
        assert_eq!(tower.cooldown, 0.0);

        tower.reload();
        assert!((tower.cooldown - 1.0).abs() < f32::EPSILON);
        let _ = tower.advance(0.75);
        let _ = tower.advance(0.75);
        assert!(tower.cooldown < 0.0);
        let _ = tower.advance(0.75);
        assert!((tower.cooldown + 0.5).abs() < 1e-6);
    }
}
