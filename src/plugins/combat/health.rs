//! The damageable contract.
//!
//! Anything that can be shot implements it by carrying `Health`. Weapons,
//! hurtboxes and the upgrade system only ever go through `take_damage` /
//! `heal` / `upgrade_max`; notifications leave as messages so UI, saving and
//! pooling stay external.

use bevy::prelude::*;

/// Current/max health plus the invulnerability gate used by the dodge state.
///
/// Invariant: `0 <= current <= max`.
#[derive(Component, Debug, Clone)]
pub struct Health {
    current: i32,
    max: i32,
    /// While false, all incoming damage is zeroed (dodge i-frames).
    pub can_damage: bool,
}

/// What a single `take_damage` call actually did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DamageOutcome {
    /// Clamped amount subtracted; zero means no notification should fire.
    pub taken: i32,
    /// True exactly when this application brought health to zero.
    pub died: bool,
}

impl Health {
    pub fn new(max: i32) -> Self {
        let max = max.max(0);
        Self {
            current: max,
            max,
            can_damage: true,
        }
    }

    #[inline]
    pub fn current(&self) -> i32 {
        self.current
    }

    #[inline]
    pub fn max(&self) -> i32 {
        self.max
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.current > 0
    }

    /// Apply damage, clamped to `[0, current]`.
    ///
    /// Dead targets and non-positive amounts are no-ops (`taken == 0`), so a
    /// death can be reported at most once per life.
    pub fn take_damage(&mut self, amount: i32) -> DamageOutcome {
        let mut taken = amount.clamp(0, self.current);
        if !self.can_damage {
            taken = 0;
        }

        self.current -= taken;

        DamageOutcome {
            taken,
            died: taken != 0 && self.current == 0,
        }
    }

    /// Restore health, clamped to max.
    pub fn heal(&mut self, amount: i32) {
        self.current = (self.current + amount.max(0)).min(self.max);
    }

    /// Raise the maximum and grant the difference as current health.
    pub fn upgrade_max(&mut self, amount: i32) {
        let amount = amount.max(0);
        self.max += amount;
        self.current = (self.current + amount).min(self.max);
    }

    /// Reset to full; used when a pooled actor re-enters the world.
    pub fn reset(&mut self) {
        self.current = self.max;
        self.can_damage = true;
    }
}

/// Fired after every non-zero damage application.
#[derive(Message, Debug, Clone, Copy)]
pub struct DamageTaken {
    pub entity: Entity,
    pub amount: i32,
    pub position: Vec2,
}

/// Fired exactly once per life, when health reaches zero.
#[derive(Message, Debug, Clone, Copy)]
pub struct EntityDied {
    pub entity: Entity,
    pub position: Vec2,
}

/// Apply damage to `target` and publish the matching notifications.
///
/// This is the one funnel every damage source goes through (trail impacts,
/// projectile impacts, hurtboxes), so the at-most-once death contract holds
/// globally.
pub fn deal_damage(
    target: Entity,
    position: Vec2,
    amount: i32,
    health: &mut Health,
    damage_writer: &mut MessageWriter<DamageTaken>,
    death_writer: &mut MessageWriter<EntityDied>,
) -> DamageOutcome {
    let outcome = health.take_damage(amount);

    if outcome.taken != 0 {
        damage_writer.write(DamageTaken {
            entity: target,
            amount: outcome.taken,
            position,
        });
    }
    if outcome.died {
        death_writer.write(EntityDied {
            entity: target,
            position,
        });
    }

    outcome
}
