#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Enemy locomotion along the waypoint path.
//!
//! Enemies walk one segment at a time. Within a segment the position follows a
//! cubic Bezier curve whose control points lean into the neighbouring
//! segments, which rounds off the corners of the grid corridor. The system
//! also sweeps terminal enemies out of the enemy set, one tick after they
//! became terminal.

use std::time::Duration;

use coop_defence_core::{
    Command, EnemyMotion, EnemySnapshot, EnemyView, Event, WaypointPath,
};
use glam::Vec3;

/// Fraction of a segment's length used to offset its Bezier control points.
pub const BEZIER_SMOOTHNESS: f32 = 0.25;

/// Segments and per-tick displacements shorter than this are treated as degenerate.
pub const MIN_SEGMENT_LENGTH: f32 = 0.001;

/// Pure system that reacts to elapsed time and emits enemy motion commands.
#[derive(Debug, Default)]
pub struct Locomotion {
    pending: Vec<Command>,
}

impl Locomotion {
    /// Creates a new locomotion system.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits `Command::RemoveEnemy` for every terminal enemy and
    /// `Command::MoveEnemy` for every walking enemy, in spawn order.
    ///
    /// Time is taken from the `TimeAdvanced` events in `events`. Without a
    /// walkable path no enemy moves.
    pub fn handle(
        &mut self,
        events: &[Event],
        enemies: &EnemyView,
        path: &WaypointPath,
        out: &mut Vec<Command>,
    ) {
        let dt = events
            .iter()
            .filter_map(|event| match event {
                Event::TimeAdvanced { dt } => Some(*dt),
                _ => None,
            })
            .fold(Duration::ZERO, Duration::saturating_add);

        self.pending.clear();
        for enemy in enemies.iter() {
            if !enemy.is_targetable() {
                self.pending.push(Command::RemoveEnemy { enemy: enemy.id });
                continue;
            }

            if dt.is_zero() || !path.is_traversable() {
                continue;
            }

            if let Some(motion) = advance(enemy, path, dt.as_secs_f32()) {
                self.pending.push(Command::MoveEnemy {
                    enemy: enemy.id,
                    motion,
                });
            }
        }

        out.reserve(self.pending.len());
        out.append(&mut self.pending);
    }
}

/// Computes one tick of motion for a walking enemy.
///
/// Returns `None` when the enemy's current segment is degenerate, in which
/// case the enemy stays put for the tick. At most one segment boundary is
/// crossed per call; progress restarts at zero on the new segment.
#[must_use]
pub fn advance(enemy: &EnemySnapshot, path: &WaypointPath, dt: f32) -> Option<EnemyMotion> {
    let last_index = path.len().checked_sub(1)?;
    if enemy.segment >= last_index {
        return Some(EnemyMotion::Halt);
    }

    let (start, end) = path.segment(enemy.segment)?;
    let length = start.distance(end);
    if length < MIN_SEGMENT_LENGTH {
        return None;
    }

    let progress = enemy.progress + enemy.move_speed * dt / length;
    let (segment, progress, position) = if progress >= 1.0 {
        let segment = enemy.segment + 1;
        if segment >= last_index {
            return Some(EnemyMotion::ReachedBase { position: end });
        }
        // Overshoot is dropped: the enemy rests on the shared waypoint for this tick.
        (segment, 0.0, end)
    } else {
        (enemy.segment, progress, bezier_point(path, enemy.segment, progress)?)
    };

    let displacement = position - enemy.position;
    let direction = if displacement.length() > MIN_SEGMENT_LENGTH {
        displacement.normalize()
    } else {
        enemy.direction
    };

    Some(EnemyMotion::Advance {
        segment,
        progress,
        position,
        direction,
    })
}

/// Position at parameter `t` along the smoothed segment starting at waypoint `segment`.
#[must_use]
pub fn bezier_point(path: &WaypointPath, segment: usize, t: f32) -> Option<Vec3> {
    let (p0, p1, p2, p3) = control_points(path, segment)?;
    Some(cubic_bezier(p0, p1, p2, p3, t))
}

/// Control polygon `(p0, p1, p2, p3)` of the segment starting at waypoint `segment`.
///
/// The inner control points sit `length * BEZIER_SMOOTHNESS` away from the
/// endpoints, along the average of the adjacent unit tangents. At the ends of
/// the path, or where the adjacent tangents cancel out, the raw segment
/// direction is used instead.
#[must_use]
pub fn control_points(path: &WaypointPath, segment: usize) -> Option<(Vec3, Vec3, Vec3, Vec3)> {
    let (start, end) = path.segment(segment)?;
    let forward = (end - start).normalize_or_zero();
    let offset = start.distance(end) * BEZIER_SMOOTHNESS;

    let start_tangent = segment
        .checked_sub(1)
        .and_then(|previous| path.get(previous))
        .map_or(forward, |previous| {
            blend(forward, (start - previous).normalize_or_zero(), forward)
        });
    let end_tangent = path.get(segment + 2).map_or(forward, |following| {
        blend((following - end).normalize_or_zero(), forward, forward)
    });

    Some((
        start,
        start + start_tangent * offset,
        end - end_tangent * offset,
        end,
    ))
}

fn blend(first: Vec3, second: Vec3, fallback: Vec3) -> Vec3 {
    (first + second).try_normalize().unwrap_or(fallback)
}

fn cubic_bezier(p0: Vec3, p1: Vec3, p2: Vec3, p3: Vec3, t: f32) -> Vec3 {
    let u = 1.0 - t;
    p0 * (u * u * u) + p1 * (3.0 * u * u * t) + p2 * (3.0 * u * t * t) + p3 * (t * t * t)
}
