#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that turns targeting data into aim and firing commands.

use coop_defence_core::{Command, TowerTarget, TowerView};

/// Aim vectors no longer than this leave the tower's facing untouched.
pub const AIM_EPSILON: f32 = 0.01;

/// Tower combat system that queues aim and fire commands for engaged towers.
#[derive(Debug, Default)]
pub struct TowerCombat {
    scratch: Vec<Command>,
}

impl TowerCombat {
    /// Creates a new tower combat system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits `Command::AimTower` for every engaged tower and
    /// `Command::FireProjectile` for those whose cooldown elapsed.
    ///
    /// Towers without a target emit nothing and keep their last facing.
    pub fn handle(
        &mut self,
        towers: &TowerView,
        tower_targets: &[TowerTarget],
        out: &mut Vec<Command>,
    ) {
        if tower_targets.is_empty() {
            return;
        }

        self.scratch.clear();

        for target in tower_targets {
            let Some(snapshot) = towers.get(target.tower) else {
                continue;
            };

            let aim = target.aim_point - target.tower_position;
            let length = aim.length();
            if length > AIM_EPSILON {
                self.scratch.push(Command::AimTower {
                    tower: target.tower,
                    direction: aim / length,
                });
            }

            if snapshot.is_ready() {
                self.scratch.push(Command::FireProjectile {
                    tower: target.tower,
                });
            }
        }

        if self.scratch.is_empty() {
            return;
        }

        out.reserve(self.scratch.len());
        out.append(&mut self.scratch);
    }
}
