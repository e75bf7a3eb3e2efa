//! Impact resolution: the damage instant of a shot.
//!
//! Every damage source that travels (trail or projectile) funnels through
//! here. Damage is computed at arrival time, with the curve sampled at the
//! travelled distance, so falloff is configuration rather than code.

use bevy::prelude::*;

use crate::common::rng::GameRng;
use crate::common::tunables::Tunables;
use crate::plugins::combat::health::{deal_damage, DamageTaken, EntityDied, Health};
use crate::plugins::combat::upgrades::{AbilityPoints, UpgradeUnlocked};

use super::messages::{BulletImpact, DamagePopupRequest};

pub fn resolve_impacts(
    tunables: Res<Tunables>,
    mut rng: ResMut<GameRng>,
    mut impacts: MessageReader<BulletImpact>,
    mut popups: MessageWriter<DamagePopupRequest>,
    mut damage_writer: MessageWriter<DamageTaken>,
    mut death_writer: MessageWriter<EntityDied>,
    mut unlocked: MessageWriter<UpgradeUnlocked>,
    mut q_health: Query<&mut Health>,
    mut q_points: Query<&mut AbilityPoints>,
) {
    for BulletImpact(record) in impacts.read() {
        // Hitting a wall is a normal outcome, not an error.
        let Ok(mut health) = q_health.get_mut(record.target) else {
            continue;
        };

        let rolled = record.curve.evaluate(record.distance, rng.unit());
        let damage = (rolled.ceil() as i32 + record.bonus_damage).max(0);

        popups.write(DamagePopupRequest {
            amount: damage,
            position: record.position,
        });

        deal_damage(
            record.target,
            record.position,
            damage,
            &mut health,
            &mut damage_writer,
            &mut death_writer,
        );

        // Landing a hit on anything damageable feeds the owner's meter.
        if let Ok(mut points) = q_points.get_mut(record.owner) {
            let gained = points.grant(tunables.hit_reward);
            for _ in 0..gained {
                unlocked.write(UpgradeUnlocked {
                    actor: record.owner,
                    level: points.level,
                });
            }
        }
    }
}
