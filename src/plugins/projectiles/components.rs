//! Pooled instance components.

use bevy::prelude::*;

use super::messages::ImpactRecord;

/// Marker: this entity belongs to the trail pool for its whole lifetime.
#[derive(Component)]
pub struct PooledTrail;

/// Marker: this entity belongs to the projectile pool.
#[derive(Component)]
pub struct PooledProjectile;

/// Marker: this entity belongs to the damage-popup pool.
#[derive(Component)]
pub struct PooledPopup;

/// Trail playback state.
///
/// `Inactive` instances are hidden and owned by the free list; everything
/// else is checked out. The two sets are disjoint by construction: the
/// allocator is the only `Inactive -> Flying` writer and the commit system
/// the only `PendingReturn -> Inactive` writer.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrailState {
    #[default]
    Inactive,
    Flying,
    Holding,
    PendingReturn,
}

/// Generic checked-out/returned state for the simpler pooled kinds
/// (projectiles, popups).
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PoolState {
    #[default]
    Inactive,
    Active,
    PendingReturn,
}

/// Per-instance travel progress for one traced shot.
#[derive(Component, Debug)]
pub struct Trail {
    pub start: Vec2,
    pub end: Vec2,
    pub total: f32,
    pub remaining: f32,
    pub speed: f32,
    pub hold: Timer,
    /// Taken exactly once when travel completes.
    pub impact: Option<ImpactRecord>,
}

impl Trail {
    /// Inert value for pooled-but-unused instances.
    pub fn idle() -> Self {
        Self {
            start: Vec2::ZERO,
            end: Vec2::ZERO,
            total: 0.0,
            remaining: 0.0,
            speed: 0.0,
            hold: Timer::from_seconds(0.0, TimerMode::Once),
            impact: None,
        }
    }

    /// Re-arm for a new shot.
    pub fn configure(
        &mut self,
        start: Vec2,
        end: Vec2,
        speed: f32,
        hold: f32,
        impact: Option<ImpactRecord>,
    ) {
        let total = start.distance(end);
        self.start = start;
        self.end = end;
        self.total = total;
        self.remaining = total;
        self.speed = speed;
        self.hold = Timer::from_seconds(hold, TimerMode::Once);
        self.impact = impact;
    }

    /// Interpolated position for the current progress, clamped to `[0, 1]`.
    pub fn position(&self) -> Vec2 {
        if self.total <= f32::EPSILON {
            return self.end;
        }
        let t = (1.0 - self.remaining / self.total).clamp(0.0, 1.0);
        self.start.lerp(self.end, t)
    }
}

/// Per-instance state for one thrown special-weapon projectile.
#[derive(Component, Debug)]
pub struct Projectile {
    pub origin: Vec2,
    pub lifetime: Timer,
    /// `None` while pooled; present exactly while in flight.
    pub payload: Option<ProjectilePayload>,
}

#[derive(Debug, Clone)]
pub struct ProjectilePayload {
    pub owner: Entity,
    pub curve: crate::plugins::combat::curve::DamageCurve,
    pub bonus_damage: i32,
}

impl Projectile {
    pub fn idle() -> Self {
        Self {
            origin: Vec2::ZERO,
            lifetime: Timer::from_seconds(0.0, TimerMode::Once),
            payload: None,
        }
    }
}

/// Floating damage readout payload. Presentation is derived from this by
/// whatever UI layer is attached; the core only animates the rise and the
/// pooled lifetime.
#[derive(Component, Debug)]
pub struct DamagePopup {
    pub amount: i32,
    pub timer: Timer,
}

impl DamagePopup {
    pub fn idle() -> Self {
        Self {
            amount: 0,
            timer: Timer::from_seconds(0.0, TimerMode::Once),
        }
    }
}
