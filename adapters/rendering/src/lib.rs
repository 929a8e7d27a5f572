#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Coop Defence adapters.
//!
//! The simulation knows nothing about draw calls. Once per frame, between
//! ticks, an adapter collects the world views into a [`Scene`] of drawables,
//! each carrying a type identifier and a transform, and hands it to a
//! [`RenderSink`].

use anyhow::Result as AnyResult;
use coop_defence_core::{
    CellCoord, CellKind, EnemyKind, EnemyView, GridMapView, ProjectileView, TowerKind, TowerView,
};
use glam::{Mat4, Quat, Vec3};

/// Uniform scale applied to projectile models.
pub const PROJECTILE_SCALE: f32 = 0.2;

/// Uniform scale applied to tower models.
pub const TOWER_SCALE: f32 = 1.0;

/// Uniform scale applied to the base marker.
pub const BASE_SCALE: f32 = 1.0;

/// RGBA color used to tint drawables.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }
}

/// Type identifier of a drawable, selecting the model a backend draws.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DrawableKind {
    /// One ground tile of the given terrain.
    Tile(CellKind),
    /// An enemy body.
    Enemy(EnemyKind),
    /// A tower body.
    Tower(TowerKind),
    /// A projectile in flight.
    Projectile,
    /// The base the enemies walk toward.
    Base,
}

impl DrawableKind {
    /// Default tint for the drawable.
    #[must_use]
    pub const fn color(self) -> Color {
        match self {
            Self::Tile(CellKind::Empty) => Color::from_rgb_u8(96, 160, 72),
            Self::Tile(CellKind::Path) => Color::from_rgb_u8(168, 136, 96),
            Self::Tile(CellKind::Blocked) => Color::from_rgb_u8(88, 88, 96),
            Self::Tile(CellKind::Base) => Color::from_rgb_u8(200, 72, 64),
            Self::Tile(CellKind::Start) => Color::from_rgb_u8(72, 112, 200),
            Self::Enemy(EnemyKind::Rat) => Color::from_rgb_u8(120, 120, 120),
            Self::Enemy(EnemyKind::Fox) => Color::from_rgb_u8(220, 120, 40),
            Self::Enemy(EnemyKind::Wolf) => Color::from_rgb_u8(64, 64, 80),
            Self::Enemy(EnemyKind::Hawk) => Color::from_rgb_u8(150, 100, 60),
            Self::Tower(TowerKind::Chicken) => Color::from_rgb_u8(240, 236, 220),
            Self::Tower(TowerKind::Beagle) => Color::from_rgb_u8(190, 140, 90),
            Self::Projectile => Color::from_rgb_u8(250, 220, 80),
            Self::Base => Color::from_rgb_u8(180, 60, 40),
        }
    }
}

/// Placement of a drawable in world space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    /// World position of the model origin.
    pub translation: Vec3,
    /// Rotation about the vertical axis, in radians, measured from `+Z`.
    pub yaw: f32,
    /// Uniform model scale.
    pub scale: f32,
}

impl Transform {
    /// Creates a transform facing `+Z`.
    #[must_use]
    pub const fn new(translation: Vec3, scale: f32) -> Self {
        Self {
            translation,
            yaw: 0.0,
            scale,
        }
    }

    /// Creates a transform whose forward axis follows the horizontal part of `direction`.
    ///
    /// A vertical or zero direction keeps the default `+Z` orientation.
    #[must_use]
    pub fn facing(translation: Vec3, direction: Vec3, scale: f32) -> Self {
        let flat = Vec3::new(direction.x, 0.0, direction.z);
        let yaw = if flat.length_squared() > f32::EPSILON {
            flat.x.atan2(flat.z)
        } else {
            0.0
        };
        Self {
            translation,
            yaw,
            scale,
        }
    }

    /// Model matrix applying scale, then yaw, then translation.
    #[must_use]
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            Vec3::splat(self.scale),
            Quat::from_rotation_y(self.yaw),
            self.translation,
        )
    }
}

/// Single entity handed to a render sink.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Drawable {
    /// Model selector.
    pub kind: DrawableKind,
    /// World placement.
    pub transform: Transform,
    /// Tint applied to the model.
    pub color: Color,
}

impl Drawable {
    /// Creates a drawable tinted with the kind's default color.
    #[must_use]
    pub const fn new(kind: DrawableKind, transform: Transform) -> Self {
        Self {
            kind,
            transform,
            color: kind.color(),
        }
    }
}

/// Frame description collected from the world between ticks.
///
/// Drawables are ordered tiles first (row-major), then the base, enemies,
/// towers and projectiles, each group in identifier order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Scene {
    /// Everything to draw this frame.
    pub drawables: Vec<Drawable>,
}

impl Scene {
    /// Builds a scene from world views.
    ///
    /// Enemies are placed at their feet and turned along their walking
    /// direction; the model's own offset lifts the body. Enemies that already
    /// reached the base or died are left out.
    #[must_use]
    pub fn from_views(
        grid: GridMapView<'_>,
        base: Option<Vec3>,
        enemies: &EnemyView,
        towers: &TowerView,
        projectiles: &ProjectileView,
    ) -> Self {
        let mut drawables = Vec::new();

        let (columns, rows) = grid.dimensions();
        for row in 0..rows {
            for column in 0..columns {
                let cell = CellCoord::new(column, row);
                if let Some(kind) = grid.cell(cell) {
                    let translation = grid.cell_to_world(cell) + Vec3::Y * kind.ground_height();
                    drawables.push(Drawable::new(
                        DrawableKind::Tile(kind),
                        Transform::new(translation, 1.0),
                    ));
                }
            }
        }

        if let Some(position) = base {
            drawables.push(Drawable::new(
                DrawableKind::Base,
                Transform::new(position, BASE_SCALE),
            ));
        }

        drawables.extend(enemies.iter().filter(|enemy| enemy.is_targetable()).map(|enemy| {
            Drawable::new(
                DrawableKind::Enemy(enemy.kind),
                Transform::facing(
                    enemy.position,
                    enemy.direction,
                    enemy.kind.render_info().scale,
                ),
            )
        }));

        drawables.extend(towers.iter().map(|tower| {
            Drawable::new(
                DrawableKind::Tower(tower.kind),
                Transform::facing(tower.position, tower.facing, TOWER_SCALE),
            )
        }));

        drawables.extend(projectiles.iter().map(|projectile| {
            Drawable::new(
                DrawableKind::Projectile,
                Transform::facing(projectile.position, projectile.direction, PROJECTILE_SCALE),
            )
        }));

        Self { drawables }
    }

    /// Number of drawables matching the predicate.
    #[must_use]
    pub fn count(&self, predicate: impl Fn(DrawableKind) -> bool) -> usize {
        self.drawables
            .iter()
            .filter(|drawable| predicate(drawable.kind))
            .count()
    }
}

/// Consumer of frames produced by the simulation.
pub trait RenderSink {
    /// Presents one frame.
    fn present(&mut self, scene: &Scene) -> AnyResult<()>;
}
