//! Hit-scan weapons.
//!
//! A weapon resolves its shot instantly (raycast) but defers the visual and
//! the damage application to the trail pipeline: the fire system only emits
//! `SpawnTrailRequest` messages. Producers never touch the trail pool; the
//! allocator in the projectiles plugin is its single writer.

use avian2d::prelude::*;
use bevy::prelude::*;

use crate::common::layers::Layer;
use crate::common::rng::GameRng;
use crate::plugins::projectiles::messages::{ImpactRecord, SpawnTrailRequest};

use super::curve::DamageCurve;

/// Distance from the actor's center to the firing origin.
pub const MUZZLE_OFFSET: f32 = 18.0;

/// Raycast length cap; "infinite" for arena purposes.
const MAX_TRACE_DISTANCE: f32 = 10_000.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Hand {
    Right,
    Left,
}

/// Read-only weapon definition.
///
/// In the shipped game these come from an asset/config collaborator; the
/// named constructors below stand in for the loaded records.
#[derive(Debug, Clone)]
pub struct WeaponConfig {
    pub name: &'static str,
    /// Seconds between volleys.
    pub firerate: f32,
    pub bullets_per_shot: u32,
    /// Per-axis spread bounds; each shot deviates uniformly in `[-b, b]`.
    pub spread: Vec2,
    /// What the trace can hit.
    pub hit_mask: LayerMask,
    /// Trail endpoint distance for shots that hit nothing.
    pub miss_distance: f32,
    /// How long a finished trail stays visible.
    pub trail_duration: f32,
    /// Trail travel speed in units per second.
    pub simulation_speed: f32,
    pub damage_curve: DamageCurve,
}

impl WeaponConfig {
    pub fn pistol() -> Self {
        Self {
            name: "pistol",
            firerate: 0.25,
            bullets_per_shot: 1,
            spread: Vec2::splat(0.1),
            hit_mask: [Layer::Enemy, Layer::World].into(),
            miss_distance: 600.0,
            trail_duration: 0.5,
            simulation_speed: 1200.0,
            damage_curve: DamageCurve::new(&[(0.0, 12.0, 18.0), (500.0, 5.0, 9.0)]),
        }
    }

    pub fn rifle() -> Self {
        Self {
            name: "rifle",
            firerate: 0.12,
            bullets_per_shot: 1,
            spread: Vec2::splat(0.06),
            hit_mask: [Layer::Enemy, Layer::World].into(),
            miss_distance: 900.0,
            trail_duration: 0.4,
            simulation_speed: 1600.0,
            damage_curve: DamageCurve::new(&[(0.0, 8.0, 12.0), (800.0, 4.0, 6.0)]),
        }
    }

    pub fn scatter() -> Self {
        Self {
            name: "scatter",
            firerate: 0.6,
            bullets_per_shot: 5,
            spread: Vec2::splat(0.35),
            hit_mask: [Layer::Enemy, Layer::World].into(),
            miss_distance: 350.0,
            trail_duration: 0.3,
            simulation_speed: 1100.0,
            damage_curve: DamageCurve::new(&[(0.0, 6.0, 10.0), (300.0, 1.0, 3.0)]),
        }
    }

    pub fn turret_gun() -> Self {
        Self {
            name: "turret_gun",
            firerate: 1.2,
            bullets_per_shot: 1,
            spread: Vec2::splat(0.15),
            hit_mask: [Layer::Player, Layer::World].into(),
            miss_distance: 700.0,
            trail_duration: 0.4,
            simulation_speed: 900.0,
            damage_curve: DamageCurve::new(&[(0.0, 8.0, 14.0), (600.0, 4.0, 8.0)]),
        }
    }
}

/// Mutable upgrade deltas layered on top of a `WeaponConfig`.
///
/// Written only by the upgrade system; read by the fire path.
#[derive(Debug, Clone, Default)]
pub struct WeaponUpgrades {
    pub level: u32,
    pub extra_bullets: u32,
    /// Added to the base firerate; negative values shoot faster.
    pub firerate_delta: f32,
    pub extra_damage: i32,
    pub extra_miss_distance: f32,
}

impl WeaponUpgrades {
    pub const MAX_LEVEL: u32 = 10;

    /// Advance one level, applying that level's bonus. Past the cap this is
    /// a no-op.
    pub fn advance(&mut self) {
        if self.level >= Self::MAX_LEVEL {
            return;
        }
        self.level += 1;

        match self.level {
            1 | 2 | 6 => self.firerate_delta -= 0.05,
            3 | 4 => self.extra_miss_distance = 20.0,
            5 => {
                self.extra_damage += 10;
                self.extra_bullets += 1;
            }
            7..=9 => self.extra_damage += 10,
            10 => self.extra_bullets += 1,
            _ => unreachable!("level is clamped to MAX_LEVEL"),
        }
    }
}

/// One equipped weapon: definition + upgrades + cooldown cursor.
#[derive(Debug, Clone)]
pub struct WeaponSlot {
    pub config: WeaponConfig,
    pub upgrades: WeaponUpgrades,
    last_shoot_time: f32,
}

impl WeaponSlot {
    pub fn new(config: WeaponConfig) -> Self {
        Self {
            config,
            upgrades: WeaponUpgrades::default(),
            // A fresh weapon may fire immediately.
            last_shoot_time: f32::NEG_INFINITY,
        }
    }

    /// Base firerate plus the upgrade delta, never negative.
    #[inline]
    pub fn effective_interval(&self) -> f32 {
        (self.config.firerate + self.upgrades.firerate_delta).max(0.0)
    }

    #[inline]
    pub fn can_fire(&self, now: f32) -> bool {
        now > self.last_shoot_time + self.effective_interval()
    }

    #[inline]
    pub fn mark_fired(&mut self, now: f32) {
        self.last_shoot_time = now;
    }

    #[inline]
    pub fn bullets_per_volley(&self) -> u32 {
        self.config.bullets_per_shot + self.upgrades.extra_bullets
    }

    #[inline]
    pub fn miss_distance(&self) -> f32 {
        self.config.miss_distance + self.upgrades.extra_miss_distance
    }
}

/// The actor's hands. Visibility and IK weight are shared across both hands
/// because the ability states suspend the whole weapon-hold posture at once.
#[derive(Component, Debug, Clone)]
pub struct Equipment {
    pub right: Option<WeaponSlot>,
    pub left: Option<WeaponSlot>,
    /// Held-weapon models shown/hidden by ability states.
    pub models_visible: bool,
    /// Weapon-hold posture blend weight, `0.0` or `1.0`.
    pub ik_weight: f32,
}

impl Equipment {
    pub fn new(right: Option<WeaponConfig>, left: Option<WeaponConfig>) -> Self {
        Self {
            right: right.map(WeaponSlot::new),
            left: left.map(WeaponSlot::new),
            models_visible: true,
            ik_weight: 1.0,
        }
    }

    pub fn slot_mut(&mut self, hand: Hand) -> Option<&mut WeaponSlot> {
        match hand {
            Hand::Right => self.right.as_mut(),
            Hand::Left => self.left.as_mut(),
        }
    }

    /// Replace the weapon in `hand` with a fresh slot for `config`.
    /// Upgrades do not carry over between weapons.
    pub fn load(&mut self, hand: Hand, config: WeaponConfig) {
        let slot = Some(WeaponSlot::new(config));
        match hand {
            Hand::Right => self.right = slot,
            Hand::Left => self.left = slot,
        }
    }
}

/// Unit aim direction, kept separate from `Transform` so tests and AI can
/// set it without touching physics state.
#[derive(Component, Debug, Clone, Copy)]
pub struct AimDirection(pub Vec2);

impl Default for AimDirection {
    fn default() -> Self {
        Self(Vec2::Y)
    }
}

/// Per-frame fire request, produced by the state machine (player) or the
/// turret aim system (enemies) and consumed once by `fire_weapons`.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct FireIntent {
    pub right: bool,
    pub left: bool,
}

/// Every system that writes `FireIntent` belongs in this set; `fire_weapons`
/// is ordered after it. Without the constraint a one-frame intent could be
/// reset by its producer before the consumer ever reads it.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FireIntentSystems;

/// Resolve fire intents into trail requests.
///
/// Every intent volley is cooldown-gated per hand; each bullet samples its
/// own spread and traces its own ray. Misses still produce a trail (to the
/// fallback distance) carrying no impact record.
pub fn fire_weapons(
    time: Res<Time>,
    mut rng: ResMut<GameRng>,
    spatial: SpatialQuery,
    mut writer: MessageWriter<SpawnTrailRequest>,
    mut q: Query<(Entity, &Transform, &AimDirection, &mut Equipment, &mut FireIntent)>,
) {
    let now = time.elapsed_secs();

    for (shooter, tf, aim, mut equipment, mut intent) in &mut q {
        let wants = [(Hand::Right, intent.right), (Hand::Left, intent.left)];
        *intent = FireIntent::default();

        for (hand, wanted) in wants {
            if !wanted {
                continue;
            }
            let Some(slot) = equipment.slot_mut(hand) else {
                // Intent for an empty hand: configuration error on the actor.
                warn!("{shooter:?} has a fire intent for an unequipped {hand:?} hand");
                continue;
            };
            if !slot.can_fire(now) {
                continue;
            }
            slot.mark_fired(now);

            let origin = tf.translation.truncate() + aim.0 * MUZZLE_OFFSET;
            let filter = SpatialQueryFilter::from_mask(slot.config.hit_mask)
                .with_excluded_entities([shooter]);

            for _ in 0..slot.bullets_per_volley() {
                let spread = Vec2::new(
                    rng.symmetric(slot.config.spread.x),
                    rng.symmetric(slot.config.spread.y),
                );
                let dir = (aim.0 + spread).normalize_or(aim.0);
                let Ok(dir2) = Dir2::new(dir) else {
                    continue;
                };

                let request = match spatial.cast_ray(origin, dir2, MAX_TRACE_DISTANCE, true, &filter)
                {
                    Some(hit) => {
                        let end = origin + dir * hit.distance;
                        SpawnTrailRequest {
                            start: origin,
                            end,
                            speed: slot.config.simulation_speed,
                            hold: slot.config.trail_duration,
                            impact: Some(ImpactRecord {
                                target: hit.entity,
                                distance: hit.distance,
                                position: end,
                                owner: shooter,
                                curve: slot.config.damage_curve.clone(),
                                bonus_damage: slot.upgrades.extra_damage,
                            }),
                        }
                    }
                    // Whiff: still visually simulated, no damage.
                    None => SpawnTrailRequest {
                        start: origin,
                        end: origin + dir * slot.miss_distance(),
                        speed: slot.config.simulation_speed,
                        hold: slot.config.trail_duration,
                        impact: None,
                    },
                };

                writer.write(request);
            }
        }
    }
}
