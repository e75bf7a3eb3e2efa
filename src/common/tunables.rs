//! Tunable gameplay constants.
//!
//! Everything an actor or spawner reads as configuration lives here; weapon
//! definitions carry their own numbers (see `plugins::combat::weapon`).

use bevy::prelude::*;

#[derive(Resource, Debug, Clone)]
pub struct Tunables {
    pub pixels_per_meter: f32,

    // Locomotion
    pub player_speed: f32,
    pub rotation_speed: f32,

    // Dodge
    pub dodge_speed: f32,
    pub dodge_cooldown: f32,

    // Environment probes
    pub ground_check_radius: f32,
    pub pickup_radius: f32,

    // Ability meter
    pub initial_ability_threshold: u32,
    /// Percentage growth of the threshold per level-up.
    pub ability_threshold_growth_pct: u32,
    /// Points granted per landed hit.
    pub hit_reward: u32,

    // Enemy waves
    pub spawn_interval: f32,
    /// Cyborgs per wave, indexed by wave number (last entry repeats).
    pub cyborg_spawn_count: Vec<u32>,
    /// Turrets per wave, indexed by wave number (last entry repeats).
    pub turret_spawn_count: Vec<u32>,
}

impl Default for Tunables {
    fn default() -> Self {
        Self {
            pixels_per_meter: 20.0,
            player_speed: 420.0,
            rotation_speed: 12.0,
            dodge_speed: 900.0,
            dodge_cooldown: 1.5,
            ground_check_radius: 20.0,
            pickup_radius: 48.0,
            initial_ability_threshold: 100,
            ability_threshold_growth_pct: 25,
            hit_reward: 5,
            spawn_interval: 12.0,
            cyborg_spawn_count: vec![5, 6, 8, 10, 12],
            turret_spawn_count: vec![2, 2, 3, 4, 5],
        }
    }
}

impl Tunables {
    /// Spawn count for `wave`, repeating the last configured entry.
    pub fn wave_count(counts: &[u32], wave: usize) -> u32 {
        counts
            .get(wave)
            .or_else(|| counts.last())
            .copied()
            .unwrap_or(0)
    }
}
