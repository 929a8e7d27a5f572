//! Waypoint extraction from the grid corridor.

use coop_defence_core::{CellCoord, CellKind, GridMapView, MapError, WaypointPath};

/// Neighbour scan order: +X, +Z, -X, -Z.
const DIRECTIONS: [(i64, i64); 4] = [(1, 0), (0, 1), (-1, 0), (0, -1)];

/// Outcome of walking the corridor from the start cell.
///
/// A failed walk still carries the waypoints collected before it stopped, so
/// callers can inspect how far the corridor reaches. Such partial paths are
/// never walked by enemies.
#[derive(Clone, Debug, PartialEq)]
pub struct PathExtraction {
    /// Waypoints collected by the walk.
    pub path: WaypointPath,
    /// Reason the walk failed to reach the base, if it did.
    pub error: Option<MapError>,
}

impl PathExtraction {
    /// Reports whether the walk entered the base.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }
}

/// Walks the corridor from the start cell to the base cell, emitting a
/// waypoint at the start, at every corner, and at the base.
///
/// The walk never steps back the way it came and takes the first Path or Base
/// neighbour in [`DIRECTIONS`] order, so a branching corridor resolves to the
/// first branch found. It gives up after `columns * rows` steps.
#[must_use]
pub fn extract_path(grid: &GridMapView<'_>) -> PathExtraction {
    let Some(start) = grid.find(CellKind::Start) else {
        return PathExtraction {
            path: WaypointPath::default(),
            error: Some(MapError::MissingStart),
        };
    };

    let (columns, rows) = grid.dimensions();
    let step_limit = u64::from(columns) * u64::from(rows);

    let mut points = vec![grid.cell_to_world(start)];
    let mut current = (i64::from(start.column()), i64::from(start.row()));
    let mut heading: Option<(i64, i64)> = None;

    for _ in 0..step_limit {
        let Some(direction) = next_direction(grid, current, heading) else {
            break;
        };

        if heading.is_some_and(|previous| previous != direction) {
            if let Some(corner) = to_cell(current) {
                points.push(grid.cell_to_world(corner));
            }
        }

        current = (current.0 + direction.0, current.1 + direction.1);
        heading = Some(direction);

        if grid.cell_at(current.0, current.1) == Some(CellKind::Base) {
            if let Some(base) = to_cell(current) {
                points.push(grid.cell_to_world(base));
            }
            return PathExtraction {
                path: WaypointPath::new(points),
                error: None,
            };
        }
    }

    let stopped = to_cell(current).unwrap_or(start);
    PathExtraction {
        path: WaypointPath::new(points),
        error: Some(MapError::Unreachable {
            column: stopped.column(),
            row: stopped.row(),
        }),
    }
}

fn next_direction(
    grid: &GridMapView<'_>,
    current: (i64, i64),
    heading: Option<(i64, i64)>,
) -> Option<(i64, i64)> {
    DIRECTIONS.into_iter().find(|&(dx, dz)| {
        if heading == Some((-dx, -dz)) {
            return false;
        }

        matches!(
            grid.cell_at(current.0 + dx, current.1 + dz),
            Some(CellKind::Path | CellKind::Base)
        )
    })
}

fn to_cell((column, row): (i64, i64)) -> Option<CellCoord> {
    Some(CellCoord::new(
        u32::try_from(column).ok()?,
        u32::try_from(row).ok()?,
    ))
}
