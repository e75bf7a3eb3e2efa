//! Buffered requests between the combat producers and the pool consumers.
//!
//! Producers create *intent*; the allocator systems apply it (pool pop +
//! component writes). Keeping pool mutation behind a queue means each pool
//! has exactly one writer.

use bevy::prelude::*;

use crate::plugins::combat::curve::DamageCurve;

/// Everything impact resolution needs, captured when the shot resolved.
///
/// Carried by the trail (or projectile) until its travel completes, then
/// emitted exactly once as a [`BulletImpact`].
#[derive(Debug, Clone)]
pub struct ImpactRecord {
    pub target: Entity,
    /// Travelled distance; the damage curve is evaluated at this value.
    pub distance: f32,
    pub position: Vec2,
    /// The shooter, rewarded with ability points if it has a meter.
    pub owner: Entity,
    pub curve: DamageCurve,
    pub bonus_damage: i32,
}

#[derive(Message, Debug, Clone)]
pub struct SpawnTrailRequest {
    pub start: Vec2,
    pub end: Vec2,
    /// Travel speed in units per second.
    pub speed: f32,
    /// How long the trail stays visible after arriving.
    pub hold: f32,
    /// `None` for a whiff shot: visual only, no damage.
    pub impact: Option<ImpactRecord>,
}

#[derive(Message, Debug, Clone)]
pub struct SpawnProjectileRequest {
    pub origin: Vec2,
    /// Initial velocity.
    pub impulse: Vec2,
    /// Seconds until the projectile self-expires as a miss.
    pub lifetime: f32,
    pub owner: Entity,
    pub curve: DamageCurve,
    pub bonus_damage: i32,
}

/// A shot's travel completed on something damageable-looking.
#[derive(Message, Debug, Clone)]
pub struct BulletImpact(pub ImpactRecord);

/// Floating damage readout, consumed by the popup allocator.
#[derive(Message, Debug, Clone, Copy)]
pub struct DamagePopupRequest {
    pub amount: i32,
    pub position: Vec2,
}
