//! World plugin: arena walls, floor and weapon pickups.

use avian2d::prelude::*;
use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;

use crate::common::layers::Layer;
use crate::common::state::GameState;
use crate::plugins::combat::weapon::WeaponConfig;

const TILE: i32 = 64;
/// Square arena half side; the enemy spawner stays inside this.
pub const ARENA_HALF_EXTENT: f32 = (TILE * 9) as f32;

/// A weapon lying on the floor. The equip state consumes it.
#[derive(Component, Debug, Clone)]
pub struct PickupItem {
    pub config: WeaponConfig,
}

pub fn plugin(app: &mut App) {
    app.add_systems(
        OnEnter(GameState::InGame),
        (spawn_arena, spawn_floor, spawn_pickups),
    );
}

fn spawn_arena(mut commands: Commands) {
    let wall_color = Color::srgb(0.25, 0.27, 0.33);
    let thickness = 30.0;
    let half = ARENA_HALF_EXTENT;

    let wall_layers = CollisionLayers::new(
        Layer::World,
        [
            Layer::Player,
            Layer::Enemy,
            Layer::PlayerBullet,
            Layer::EnemyBullet,
        ],
    );

    let mut spawn_wall = |name: String, pos: Vec3, size: Vec2| {
        commands.spawn((
            Name::new(name),
            Sprite {
                color: wall_color,
                custom_size: Some(size),
                ..default()
            },
            Transform::from_translation(pos),
            RigidBody::Static,
            Collider::rectangle(size.x, size.y),
            wall_layers,
            DespawnOnExit(GameState::InGame),
        ));
    };

    spawn_wall(
        "WallTop".into(),
        Vec3::new(0.0, half + thickness * 0.5, 0.0),
        Vec2::new(half * 2.0 + thickness * 2.0, thickness),
    );
    spawn_wall(
        "WallBottom".into(),
        Vec3::new(0.0, -half - thickness * 0.5, 0.0),
        Vec2::new(half * 2.0 + thickness * 2.0, thickness),
    );
    spawn_wall(
        "WallLeft".into(),
        Vec3::new(-half - thickness * 0.5, 0.0, 0.0),
        Vec2::new(thickness, half * 2.0),
    );
    spawn_wall(
        "WallRight".into(),
        Vec3::new(half + thickness * 0.5, 0.0, 0.0),
        Vec2::new(thickness, half * 2.0),
    );
}

/// Solid-color floor tiles; no assets.
///
/// One flat sensor spans the whole arena so the dodge ground probe has
/// something to stand on.
fn spawn_floor(mut commands: Commands) {
    commands.spawn((
        Name::new("Ground"),
        Collider::rectangle(ARENA_HALF_EXTENT * 2.0, ARENA_HALF_EXTENT * 2.0),
        Sensor,
        CollisionLayers::new(Layer::Ground, [] as [Layer; 0]),
        Transform::default(),
        DespawnOnExit(GameState::InGame),
    ));

    let half_tiles = ARENA_HALF_EXTENT as i32 / TILE;

    (-half_tiles..=half_tiles)
        .flat_map(|y| (-half_tiles..=half_tiles).map(move |x| (x, y)))
        .for_each(|(x, y)| {
            let world_pos = Vec3::new(x as f32 * TILE as f32, y as f32 * TILE as f32, 0.0);
            let color = if (x + y) % 2 == 0 {
                Color::srgb(0.14, 0.14, 0.16)
            } else {
                Color::srgb(0.12, 0.12, 0.14)
            };

            commands.spawn((
                Sprite::from_color(color, Vec2::splat(TILE as f32)),
                Transform::from_translation(world_pos),
                DespawnOnExit(GameState::InGame),
            ));
        });
}

/// A couple of weapons on the floor so both hands can be re-equipped.
fn spawn_pickups(mut commands: Commands) {
    let pickups = [
        (WeaponConfig::rifle(), Vec2::new(-220.0, 180.0)),
        (WeaponConfig::scatter(), Vec2::new(260.0, -140.0)),
    ];

    for (config, pos) in pickups {
        commands.spawn((
            Name::new(format!("Pickup({})", config.name)),
            PickupItem { config },
            Sprite {
                color: Color::srgb(0.85, 0.8, 0.3),
                custom_size: Some(Vec2::splat(18.0)),
                ..default()
            },
            Transform::from_translation(pos.extend(0.5)),
            Collider::circle(12.0),
            Sensor,
            CollisionLayers::new(Layer::Pickup, [] as [Layer; 0]),
            DespawnOnExit(GameState::InGame),
        ));
    }
}
