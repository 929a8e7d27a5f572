#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that computes deterministic tower targets from world snapshots.

use coop_defence_core::{EnemyId, EnemyView, TowerId, TowerTarget, TowerView};
use glam::Vec3;

/// Tower targeting system that reuses scratch buffers to avoid repeated allocations.
#[derive(Debug, Default)]
pub struct TowerTargeting {
    tower_workspace: Vec<TowerWorkspace>,
    enemy_workspace: Vec<EnemyCandidate>,
}

impl TowerTargeting {
    /// Creates a new tower targeting system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects, for every tower, the furthest-advanced targetable enemy in range.
    ///
    /// Towers still dropping in take part as well. Range is measured from the
    /// tower body to the enemy's path position. The
    /// output buffer is cleared before populating it with the latest
    /// assignments, ordered by tower identifier.
    pub fn handle(&mut self, towers: &TowerView, enemies: &EnemyView, out: &mut Vec<TowerTarget>) {
        out.clear();

        if towers.iter().next().is_none() || enemies.is_empty() {
            return;
        }

        self.prepare_tower_workspace(towers);
        if self.tower_workspace.is_empty() {
            return;
        }

        self.prepare_enemy_workspace(enemies);
        if self.enemy_workspace.is_empty() {
            return;
        }

        for tower in &self.tower_workspace {
            let max_distance_sq = tower.range * tower.range;
            let mut best: Option<BestCandidate> = None;

            for candidate in &self.enemy_workspace {
                if candidate.position.distance_squared(tower.position) > max_distance_sq {
                    continue;
                }

                let current = BestCandidate {
                    progress: candidate.progress,
                    enemy: candidate.id,
                    aim_point: candidate.aim_point,
                };

                match &mut best {
                    Some(existing) => {
                        if current.precedes(existing) {
                            *existing = current;
                        }
                    }
                    None => best = Some(current),
                }
            }

            if let Some(best_candidate) = best {
                out.push(TowerTarget {
                    tower: tower.id,
                    enemy: best_candidate.enemy,
                    tower_position: tower.position,
                    aim_point: best_candidate.aim_point,
                });
            }
        }
    }

    fn prepare_tower_workspace(&mut self, towers: &TowerView) {
        self.tower_workspace.clear();
        let (lower, _) = towers.iter().size_hint();
        self.tower_workspace.reserve(lower);

        for snapshot in towers.iter() {
            if snapshot.attack_range <= 0.0 {
                continue;
            }

            self.tower_workspace.push(TowerWorkspace {
                id: snapshot.id,
                position: snapshot.position,
                range: snapshot.attack_range,
            });
        }
    }

    fn prepare_enemy_workspace(&mut self, enemies: &EnemyView) {
        self.enemy_workspace.clear();
        self.enemy_workspace.reserve(enemies.len());

        for snapshot in enemies.iter() {
            if !snapshot.is_targetable() {
                continue;
            }

            self.enemy_workspace.push(EnemyCandidate {
                id: snapshot.id,
                position: snapshot.position,
                aim_point: snapshot.render_position(),
                progress: snapshot.total_progress(),
            });
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct TowerWorkspace {
    id: TowerId,
    position: Vec3,
    range: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct EnemyCandidate {
    id: EnemyId,
    position: Vec3,
    aim_point: Vec3,
    progress: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct BestCandidate {
    progress: f32,
    enemy: EnemyId,
    aim_point: Vec3,
}

impl BestCandidate {
    /// Strictly further along the path. Equal progress keeps the earlier candidate.
    fn precedes(&self, other: &Self) -> bool {
        self.progress > other.progress
    }
}
