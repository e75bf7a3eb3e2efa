//! Collision layer and color presets for pooled instances.

use avian2d::prelude::*;
use bevy::prelude::*;

use crate::common::layers::Layer;

/// Special-weapon projectiles belong to the player.
#[inline]
pub fn active_projectile_layers() -> CollisionLayers {
    CollisionLayers::new(Layer::PlayerBullet, [Layer::World, Layer::Enemy])
}

/// "Disabled" without structural changes: empty filters collide with nothing.
#[inline]
pub fn inactive_projectile_layers() -> CollisionLayers {
    CollisionLayers::new(Layer::PlayerBullet, [] as [Layer; 0])
}

#[inline]
pub fn trail_color() -> Color {
    Color::srgb(1.0, 0.85, 0.3)
}

#[inline]
pub fn projectile_color() -> Color {
    Color::srgb(0.95, 0.5, 0.2)
}

#[inline]
pub fn popup_color() -> Color {
    Color::srgb(1.0, 1.0, 0.9)
}
