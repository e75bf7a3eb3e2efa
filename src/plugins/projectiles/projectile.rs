//! Physical special-weapon projectiles.
//!
//! Unlike trails, these are real dynamic bodies: force-propelled, resolved
//! by collision events, and time-boxed so a shot that never lands still
//! returns to its pool.

use avian2d::prelude::*;
use bevy::platform::collections::HashSet;
use bevy::prelude::*;

use crate::common::rng::GameRng;
use crate::plugins::combat::curve::DamageCurve;

use super::components::{PoolState, PooledProjectile, Projectile};
use super::messages::{BulletImpact, ImpactRecord, SpawnProjectileRequest};

/// An auto-firing special weapon: volleys from `firepoints[0..level]` on a
/// fire-rate cooldown, independent of the hand-held hit-scan weapons.
#[derive(Component, Debug, Clone)]
pub struct SpecialWeapon {
    pub firerate: f32,
    pub launch_speed: f32,
    pub spread: Vec2,
    pub lifetime: f32,
    pub curve: DamageCurve,
    pub bonus_damage: i32,
    /// Local offsets relative to the actor; one projectile per point up to
    /// the current level.
    pub firepoints: Vec<Vec2>,
    pub level: usize,
    last_shoot_time: f32,
}

impl SpecialWeapon {
    pub fn new(firepoints: Vec<Vec2>) -> Self {
        assert!(
            !firepoints.is_empty(),
            "special weapon needs at least one firepoint"
        );
        Self {
            firerate: 1.5,
            launch_speed: 500.0,
            spread: Vec2::splat(0.2),
            lifetime: 2.5,
            curve: DamageCurve::new(&[(0.0, 15.0, 25.0)]),
            bonus_damage: 0,
            firepoints,
            level: 1,
            last_shoot_time: f32::NEG_INFINITY,
        }
    }

    pub fn level_up(&mut self) {
        self.level = (self.level + 1).min(self.firepoints.len());
    }

    /// Default mounting points for the player's back launcher.
    pub fn shoulder_mounts() -> Vec<Vec2> {
        vec![
            Vec2::new(-14.0, 10.0),
            Vec2::new(14.0, 10.0),
            Vec2::new(0.0, 18.0),
        ]
    }
}

/// Auto-fire special weapons on cooldown.
pub fn fire_special_weapons(
    time: Res<Time>,
    mut rng: ResMut<GameRng>,
    mut writer: MessageWriter<SpawnProjectileRequest>,
    mut q: Query<(
        Entity,
        &Transform,
        &crate::plugins::combat::weapon::AimDirection,
        &mut SpecialWeapon,
    )>,
) {
    let now = time.elapsed_secs();

    for (owner, tf, aim, mut weapon) in &mut q {
        if now <= weapon.last_shoot_time + weapon.firerate {
            continue;
        }
        weapon.last_shoot_time = now;

        let level = weapon.level.min(weapon.firepoints.len());
        for point in weapon.firepoints[..level].to_vec() {
            let spread = Vec2::new(rng.symmetric(weapon.spread.x), rng.symmetric(weapon.spread.y));
            let dir = (aim.0 + spread).normalize_or(aim.0);

            writer.write(SpawnProjectileRequest {
                origin: tf.translation.truncate() + point,
                impulse: dir * weapon.launch_speed,
                lifetime: weapon.lifetime,
                owner,
                curve: weapon.curve.clone(),
                bonus_damage: weapon.bonus_damage,
            });
        }
    }
}

/// Expire projectiles that outlived their flight window.
///
/// A timeout resolves as a miss: same deactivation path, no impact record.
pub fn projectile_lifetime(
    time: Res<Time<Fixed>>,
    mut q: Query<(&mut PoolState, &mut Projectile), With<PooledProjectile>>,
) {
    for (mut state, mut projectile) in &mut q {
        if *state != PoolState::Active {
            continue;
        }
        projectile.lifetime.tick(time.delta());
        if projectile.lifetime.is_finished() {
            *state = PoolState::PendingReturn;
        }
    }
}

/// Resolve projectile contacts into impacts.
pub fn process_projectile_collisions(
    mut started: MessageReader<CollisionStart>,
    mut impacts: MessageWriter<BulletImpact>,
    q_is_projectile: Query<(), With<PooledProjectile>>,
    mut q_projectiles: Query<(&mut PoolState, &mut Projectile, &Transform), With<PooledProjectile>>,
    // Per-frame dedupe: a body can report several contacts at once.
    mut seen: Local<HashSet<Entity>>,
) {
    seen.clear();

    for ev in started.read() {
        let p1 = q_is_projectile.contains(ev.collider1);
        let p2 = q_is_projectile.contains(ev.collider2);
        if !(p1 ^ p2) {
            continue; // must be exactly one projectile
        }
        let (projectile_collider, other) = if p1 {
            (ev.collider1, (ev.collider2, ev.body2))
        } else {
            (ev.collider2, (ev.collider1, ev.body1))
        };

        if !seen.insert(projectile_collider) {
            continue;
        }

        let Ok((mut state, mut projectile, tf)) = q_projectiles.get_mut(projectile_collider) else {
            continue;
        };
        if *state != PoolState::Active {
            continue;
        }

        let position = tf.translation.truncate();
        if let Some(payload) = projectile.payload.take() {
            impacts.write(BulletImpact(ImpactRecord {
                // Damage lands on the rigid body that owns the collider.
                target: other.1.unwrap_or(other.0),
                distance: projectile.origin.distance(position),
                position,
                owner: payload.owner,
                curve: payload.curve,
                bonus_damage: payload.bonus_damage,
            }));
        }

        *state = PoolState::PendingReturn;
    }
}
