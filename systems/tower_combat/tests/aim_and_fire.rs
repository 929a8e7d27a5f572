use std::time::Duration;

use coop_defence_core::{CellCoord, Command, EnemyKind, Event, TowerKind};
use coop_defence_system_tower_combat::TowerCombat;
use coop_defence_system_tower_targeting::TowerTargeting;
use coop_defence_world::{self as world, query, World};
use glam::Vec3;

const STEP: Duration = Duration::from_millis(16);

struct Range {
    world: World,
    targeting: TowerTargeting,
    combat: TowerCombat,
    events: Vec<Event>,
}

impl Range {
    fn with_dropped_tower(cell: CellCoord) -> Self {
        let mut range = Self {
            world: World::new(),
            targeting: TowerTargeting::new(),
            combat: TowerCombat::new(),
            events: Vec::new(),
        };
        range.apply(Command::PlaceTower {
            kind: TowerKind::Chicken,
            cell,
        });
        range
    }

    fn with_settled_tower(cell: CellCoord) -> Self {
        let mut range = Self::with_dropped_tower(cell);
        while !range
            .events
            .iter()
            .any(|event| matches!(event, Event::TowerSettled { .. }))
        {
            range.apply(Command::Tick { dt: STEP });
        }
        range.events.clear();
        range
    }

    fn apply(&mut self, command: Command) {
        world::apply(&mut self.world, command, &mut self.events);
    }

    fn engage(&mut self) -> Vec<Command> {
        let towers = query::tower_view(&self.world);
        let mut targets = Vec::new();
        self.targeting
            .handle(&towers, &query::enemy_view(&self.world), &mut targets);

        let mut commands = Vec::new();
        self.combat.handle(&towers, &targets, &mut commands);
        for command in commands.clone() {
            self.apply(command);
        }
        commands
    }

    fn shots(&self) -> usize {
        self.events
            .iter()
            .filter(|event| matches!(event, Event::ProjectileFired { .. }))
            .count()
    }
}

#[test]
fn tower_turns_toward_enemy_and_fires_once_per_reload() {
    let mut range = Range::with_settled_tower(CellCoord::new(2, 2));
    range.apply(Command::SpawnEnemy {
        kind: EnemyKind::Rat,
    });

    let commands = range.engage();
    assert_eq!(commands.len(), 2);
    assert_eq!(range.shots(), 1);

    let tower = query::tower_at(&range.world, CellCoord::new(2, 2)).expect("tower");
    let enemy = query::enemy_view(&range.world).into_vec()[0];
    let expected = (enemy.render_position() - tower.position).normalize();
    assert!((tower.facing - expected).length() < 1e-5);
    assert!(tower.facing.x < 0.0 && tower.facing.z < 0.0);

    let projectile = query::projectile_view(&range.world).into_vec()[0];
    assert_eq!(projectile.direction, tower.facing);
    assert_eq!(projectile.position, tower.position + Vec3::Y * 0.5);

    let _ = range.engage();
    assert_eq!(range.shots(), 1);

    for _ in 0..63 {
        range.apply(Command::Tick { dt: STEP });
    }
    let _ = range.engage();
    assert_eq!(range.shots(), 2);
}

#[test]
fn tower_out_of_reach_holds_fire() {
    let mut range = Range::with_settled_tower(CellCoord::new(12, 2));
    range.apply(Command::SpawnEnemy {
        kind: EnemyKind::Rat,
    });

    let commands = range.engage();

    assert!(commands.is_empty());
    assert_eq!(range.shots(), 0);
    assert!(query::projectile_view(&range.world).into_vec().is_empty());
}

#[test]
fn falling_tower_fires_once_the_enemy_is_within_reach() {
    let mut range = Range::with_dropped_tower(CellCoord::new(2, 2));
    range.apply(Command::SpawnEnemy {
        kind: EnemyKind::Rat,
    });
    for _ in 0..30 {
        range.apply(Command::Tick { dt: STEP });
    }

    let tower = query::tower_at(&range.world, CellCoord::new(2, 2)).expect("tower");
    assert!(!tower.settled);

    let commands = range.engage();

    assert_eq!(commands.len(), 2);
    assert_eq!(range.shots(), 1);
    let projectile = query::projectile_view(&range.world).into_vec()[0];
    assert_eq!(projectile.position, tower.position + Vec3::Y * 0.5);
    assert!(projectile.direction.y < 0.0);
}
