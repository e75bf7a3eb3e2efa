//! Ability meter and upgrade application.
//!
//! Impact resolution grants ability points; crossing the threshold levels
//! the actor up and notifies the (external) upgrade menu. The menu answers
//! with `ApplyUpgrade` messages; this module is their single consumer and
//! therefore the only writer of upgrade deltas.

use bevy::prelude::*;

use crate::common::tunables::Tunables;
use crate::plugins::projectiles::projectile::SpecialWeapon;

use super::health::Health;
use super::weapon::{Equipment, Hand};

/// Progress toward the next upgrade point.
#[derive(Component, Debug, Clone)]
pub struct AbilityPoints {
    pub current: u32,
    pub threshold: u32,
    pub level: u32,
    /// Threshold growth per level, in percent.
    growth_pct: u32,
}

impl AbilityPoints {
    pub fn new(threshold: u32, growth_pct: u32) -> Self {
        Self {
            current: 0,
            threshold: threshold.max(1),
            level: 0,
            growth_pct,
        }
    }

    /// Add points, resolving any level-ups. Returns how many levels were
    /// gained so the caller can emit one notification per level.
    pub fn grant(&mut self, amount: u32) -> u32 {
        self.current += amount;

        let mut gained = 0;
        while self.current >= self.threshold {
            self.current -= self.threshold;
            self.level += 1;
            self.threshold += self.threshold * self.growth_pct / 100;
            gained += 1;
        }
        gained
    }
}

/// Additive locomotion speed bonus, written only by `apply_upgrades`.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct SpeedUpgrade(pub f32);

#[derive(Debug, Clone, Copy)]
pub enum UpgradeKind {
    /// Percentage of the base move speed, added on top.
    Speed(u32),
    MaxHealth(i32),
    Heal(i32),
    Weapon(Hand),
    /// Grant the auto-firing special weapon, or add a firepoint to it.
    Special,
}

/// External upgrade menu -> core.
#[derive(Message, Debug, Clone, Copy)]
pub struct ApplyUpgrade {
    pub target: Entity,
    pub kind: UpgradeKind,
}

/// Core -> external UI: an upgrade point became available.
#[derive(Message, Debug, Clone, Copy)]
pub struct UpgradeUnlocked {
    pub actor: Entity,
    pub level: u32,
}

pub fn apply_upgrades(
    tunables: Res<Tunables>,
    mut commands: Commands,
    mut reader: MessageReader<ApplyUpgrade>,
    mut q_health: Query<&mut Health>,
    mut q_equipment: Query<&mut Equipment>,
    mut q_speed: Query<&mut SpeedUpgrade>,
    mut q_special: Query<&mut SpecialWeapon>,
) {
    for upgrade in reader.read() {
        match upgrade.kind {
            UpgradeKind::Speed(pct) => {
                if let Ok(mut speed) = q_speed.get_mut(upgrade.target) {
                    speed.0 += tunables.player_speed * pct as f32 / 100.0;
                }
            }
            UpgradeKind::MaxHealth(amount) => {
                if let Ok(mut health) = q_health.get_mut(upgrade.target) {
                    health.upgrade_max(amount);
                }
            }
            UpgradeKind::Heal(amount) => {
                if let Ok(mut health) = q_health.get_mut(upgrade.target) {
                    health.heal(amount);
                }
            }
            UpgradeKind::Weapon(hand) => {
                if let Ok(mut equipment) = q_equipment.get_mut(upgrade.target) {
                    match equipment.slot_mut(hand) {
                        Some(slot) => slot.upgrades.advance(),
                        None => {
                            debug!("weapon upgrade for an empty {hand:?} hand, ignored");
                        }
                    }
                }
            }
            UpgradeKind::Special => {
                if let Ok(mut weapon) = q_special.get_mut(upgrade.target) {
                    weapon.level_up();
                } else if let Ok(mut entity) = commands.get_entity(upgrade.target) {
                    entity.insert(SpecialWeapon::new(SpecialWeapon::shoulder_mounts()));
                }
            }
        }
    }
}
