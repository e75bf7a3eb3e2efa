//! Spawn consumers: activate pooled instances from requests.
//!
//! # Fail-fast invariants
//! - A free list contains only valid pooled entities of its kind.
//! - Therefore, a popped entity must match the kind's query.
//!
//! If this is violated, we `expect()` and crash loudly. This removes
//! branches from the hot loop and makes invariant violations obvious.
//!
//! When a free list is empty the consumer falls through to the kind's
//! factory and spawns a fresh, already-configured instance: a request is
//! never dropped for capacity reasons.

use avian2d::prelude::*;
use bevy::prelude::*;

use super::components::{
    DamagePopup, PoolState, PooledPopup, PooledProjectile, PooledTrail, Projectile,
    ProjectilePayload, Trail, TrailState,
};
use super::layers::active_projectile_layers;
use super::messages::{DamagePopupRequest, SpawnProjectileRequest, SpawnTrailRequest};
use super::pool::{
    spawn_popup_instance, spawn_projectile_instance, spawn_trail_instance, PopupPool,
    ProjectilePool, TrailPool,
};

pub fn allocate_trails_from_pool(
    mut commands: Commands,
    mut pool: ResMut<TrailPool>,
    mut reader: MessageReader<SpawnTrailRequest>,
    mut q: Query<(&mut TrailState, &mut Trail, &mut Transform, &mut Visibility), With<PooledTrail>>,
) {
    for req in reader.read() {
        let Some(e) = pool.pop_free() else {
            // Lazy growth: build a new instance and configure it in place.
            let e = spawn_trail_instance(&mut commands);
            let mut trail = Trail::idle();
            trail.configure(req.start, req.end, req.speed, req.hold, req.impact.clone());
            commands.entity(e).insert((
                TrailState::Flying,
                trail,
                Transform::from_translation(req.start.extend(3.0)),
                Visibility::Visible,
            ));
            continue;
        };

        let (mut state, mut trail, mut tf, mut vis) = q
            .get_mut(e)
            .expect("TrailPool contained an entity missing pooled trail components");

        *state = TrailState::Flying;
        trail.configure(req.start, req.end, req.speed, req.hold, req.impact.clone());
        tf.translation = req.start.extend(3.0);
        *vis = Visibility::Visible;
    }
}

pub fn allocate_projectiles_from_pool(
    mut commands: Commands,
    mut pool: ResMut<ProjectilePool>,
    mut reader: MessageReader<SpawnProjectileRequest>,
    mut q: Query<
        (
            &mut PoolState,
            &mut Projectile,
            &mut Transform,
            &mut LinearVelocity,
            &mut Visibility,
            &mut CollisionLayers,
        ),
        With<PooledProjectile>,
    >,
) {
    for req in reader.read() {
        let payload = ProjectilePayload {
            owner: req.owner,
            curve: req.curve.clone(),
            bonus_damage: req.bonus_damage,
        };

        let Some(e) = pool.pop_free() else {
            let e = spawn_projectile_instance(&mut commands);
            commands.entity(e).insert((
                PoolState::Active,
                Projectile {
                    origin: req.origin,
                    lifetime: Timer::from_seconds(req.lifetime, TimerMode::Once),
                    payload: Some(payload),
                },
                Transform::from_translation(req.origin.extend(3.0)),
                LinearVelocity(req.impulse),
                Visibility::Visible,
                active_projectile_layers(),
            ));
            continue;
        };

        let (mut state, mut projectile, mut tf, mut vel, mut vis, mut layers) = q
            .get_mut(e)
            .expect("ProjectilePool contained an entity missing pooled projectile components");

        *state = PoolState::Active;
        projectile.origin = req.origin;
        projectile.lifetime = Timer::from_seconds(req.lifetime, TimerMode::Once);
        projectile.payload = Some(payload);
        tf.translation = req.origin.extend(3.0);
        vel.0 = req.impulse;
        *vis = Visibility::Visible;
        *layers = active_projectile_layers();
    }
}

pub fn allocate_popups_from_pool(
    mut commands: Commands,
    mut pool: ResMut<PopupPool>,
    mut reader: MessageReader<DamagePopupRequest>,
    mut q: Query<
        (&mut PoolState, &mut DamagePopup, &mut Transform, &mut Visibility),
        With<PooledPopup>,
    >,
) {
    for req in reader.read() {
        let Some(e) = pool.pop_free() else {
            let e = spawn_popup_instance(&mut commands);
            commands.entity(e).insert((
                PoolState::Active,
                DamagePopup {
                    amount: req.amount,
                    timer: Timer::from_seconds(super::popup::POPUP_DURATION, TimerMode::Once),
                },
                Transform::from_translation(req.position.extend(5.0)),
                Visibility::Visible,
            ));
            continue;
        };

        let (mut state, mut popup, mut tf, mut vis) = q
            .get_mut(e)
            .expect("PopupPool contained an entity missing pooled popup components");

        *state = PoolState::Active;
        popup.amount = req.amount;
        popup.timer = Timer::from_seconds(super::popup::POPUP_DURATION, TimerMode::Once);
        tf.translation = req.position.extend(5.0);
        *vis = Visibility::Visible;
    }
}
