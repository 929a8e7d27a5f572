#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that moves projectiles and resolves their collisions with enemies.

use std::time::Duration;

use coop_defence_core::{Command, EnemyId, EnemyView, Event, ProjectileView};
use glam::Vec3;

/// Radius of the collision sphere around a projectile.
pub const PROJECTILE_RADIUS: f32 = 0.2;

/// Projectiles whose `x` or `z` coordinate exceeds this magnitude are destroyed.
pub const WORLD_BOUND: f32 = 50.0;

/// Projectile system that reuses scratch buffers between ticks.
#[derive(Debug, Default)]
pub struct Projectiles {
    enemy_workspace: Vec<EnemyBody>,
}

impl Projectiles {
    /// Creates a new projectile system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves every projectile along its direction, expires those that left the
    /// bounds, and reports the first enemy each remaining projectile overlaps.
    ///
    /// Enemies are scanned in spawn order. Damage from earlier hits in the same
    /// call is tracked so that later projectiles pass through enemies already
    /// brought to zero health.
    pub fn handle(
        &mut self,
        events: &[Event],
        projectiles: &ProjectileView,
        enemies: &EnemyView,
        out: &mut Vec<Command>,
    ) {
        let dt = events
            .iter()
            .filter_map(|event| match event {
                Event::TimeAdvanced { dt } => Some(*dt),
                _ => None,
            })
            .fold(Duration::ZERO, Duration::saturating_add)
            .as_secs_f32();

        self.prepare_enemy_workspace(enemies);

        for projectile in projectiles.iter() {
            let mut position = projectile.position;
            if dt > 0.0 {
                position += projectile.direction * projectile.speed * dt;
                out.push(Command::MoveProjectile {
                    projectile: projectile.id,
                    position,
                });
            }

            if is_out_of_bounds(position) {
                out.push(Command::ExpireProjectile {
                    projectile: projectile.id,
                });
                continue;
            }

            let hit = self
                .enemy_workspace
                .iter_mut()
                .filter(|body| body.health > 0.0)
                .find(|body| {
                    spheres_overlap(position, PROJECTILE_RADIUS, body.centre, body.radius)
                });

            if let Some(body) = hit {
                body.health -= projectile.damage;
                out.push(Command::ResolveHit {
                    projectile: projectile.id,
                    enemy: body.id,
                });
            }
        }
    }

    fn prepare_enemy_workspace(&mut self, enemies: &EnemyView) {
        self.enemy_workspace.clear();
        self.enemy_workspace.reserve(enemies.len());

        for snapshot in enemies.iter() {
            if !snapshot.is_targetable() {
                continue;
            }

            self.enemy_workspace.push(EnemyBody {
                id: snapshot.id,
                centre: snapshot.render_position(),
                radius: snapshot.kind.render_info().collision_radius,
                health: snapshot.health,
            });
        }
    }
}

/// Boundary-inclusive sphere overlap test on squared distances.
#[must_use]
pub fn spheres_overlap(first: Vec3, first_radius: f32, second: Vec3, second_radius: f32) -> bool {
    let reach = first_radius + second_radius;
    first.distance_squared(second) <= reach * reach
}

fn is_out_of_bounds(position: Vec3) -> bool {
    position.x.abs() > WORLD_BOUND || position.z.abs() > WORLD_BOUND
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct EnemyBody {
    id: EnemyId,
    centre: Vec3,
    radius: f32,
    health: f32,
}
