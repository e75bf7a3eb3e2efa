//! Combat plugin: health contract, weapon firing, upgrades.
//!
//! # Data flow
//! ```text
//! Update
//!   state machine (player plugin) / turret aim (enemies plugin)
//!       -> FireIntent + AimDirection on the actor
//!   fire_weapons:
//!       - gates each hand on its fire-rate cooldown
//!       - per bullet: spread sample -> raycast -> SpawnTrailRequest
//!         (hit point + impact record, or miss point and no record)
//! FixedUpdate / FixedPostUpdate (projectiles plugin)
//!   trail travel -> BulletImpact -> resolve_impacts -> Health::take_damage
//! ```
//!
//! The weapon never touches `Health` directly: damage application is deferred
//! to impact resolution so the travel-time visuals and the damage instant
//! stay on the same timeline.

pub mod curve;
pub mod health;
pub mod upgrades;
pub mod weapon;

use bevy::prelude::*;

use crate::common::state::GameState;

pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<health::DamageTaken>()
            .add_message::<health::EntityDied>()
            .add_message::<upgrades::ApplyUpgrade>()
            .add_message::<upgrades::UpgradeUnlocked>();

        // Producers first: a one-frame FireIntent must be consumed the same
        // frame it is written.
        app.add_systems(
            Update,
            weapon::fire_weapons
                .after(weapon::FireIntentSystems)
                .run_if(in_state(GameState::InGame)),
        );

        app.add_systems(
            Update,
            upgrades::apply_upgrades.run_if(in_state(GameState::InGame)),
        );
    }
}

#[cfg(test)]
mod tests;
