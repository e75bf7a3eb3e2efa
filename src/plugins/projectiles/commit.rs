//! Return commits: recycle instances back into their pools.
//!
//! These systems are the owners of the *inactive invariants*.
//!
//! Invariant per kind: inactive instances must be hidden, carry no pending
//! impact/payload, have zero velocity and empty collision filters (where
//! physical). Every field written here is written nowhere else while the
//! instance is inactive, so a reused instance never replays stale motion.

use avian2d::prelude::*;
use bevy::prelude::*;

use super::components::{
    DamagePopup, PoolState, PooledPopup, PooledProjectile, PooledTrail, Projectile, Trail,
    TrailState,
};
use super::layers::inactive_projectile_layers;
use super::pool::{PopupPool, ProjectilePool, TrailPool};

pub fn commit_trail_returns(
    mut pool: ResMut<TrailPool>,
    mut q: Query<(Entity, &mut TrailState, &mut Trail, &mut Visibility), With<PooledTrail>>,
) {
    for (e, mut state, mut trail, mut vis) in &mut q {
        if *state != TrailState::PendingReturn {
            continue;
        }

        *state = TrailState::Inactive;
        *trail = Trail::idle();
        *vis = Visibility::Hidden;

        pool.push_free(e);
    }
}

pub fn commit_projectile_returns(
    mut pool: ResMut<ProjectilePool>,
    mut q: Query<
        (
            Entity,
            &mut PoolState,
            &mut Projectile,
            &mut LinearVelocity,
            &mut CollisionLayers,
            &mut Visibility,
        ),
        With<PooledProjectile>,
    >,
) {
    for (e, mut state, mut projectile, mut vel, mut layers, mut vis) in &mut q {
        if *state != PoolState::PendingReturn {
            continue;
        }

        *state = PoolState::Inactive;
        *projectile = Projectile::idle();
        vel.0 = Vec2::ZERO;
        *layers = inactive_projectile_layers();
        *vis = Visibility::Hidden;

        pool.push_free(e);
    }
}

pub fn commit_popup_returns(
    mut pool: ResMut<PopupPool>,
    mut q: Query<(Entity, &mut PoolState, &mut DamagePopup, &mut Visibility), With<PooledPopup>>,
) {
    for (e, mut state, mut popup, mut vis) in &mut q {
        if *state != PoolState::PendingReturn {
            continue;
        }

        *state = PoolState::Inactive;
        *popup = DamagePopup::idle();
        *vis = Visibility::Hidden;

        pool.push_free(e);
    }
}
