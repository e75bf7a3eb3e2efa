//! Combat unit tests: health contract, damage curves, weapon cooldowns,
//! the upgrade table and the ability meter.
//!
//! The full fire -> trail -> impact chain needs the physics pipeline and
//! lives in the integration tests; everything here is pure data.

use bevy::ecs::message::Messages;
use bevy::prelude::*;

use crate::common::test_utils::run_system_once;
use crate::common::tunables::Tunables;
use crate::plugins::projectiles::projectile::SpecialWeapon;

use super::curve::DamageCurve;
use super::health::{deal_damage, DamageTaken, EntityDied, Health};
use super::upgrades::{self, AbilityPoints, ApplyUpgrade, SpeedUpgrade, UpgradeKind};
use super::weapon::{Equipment, Hand, WeaponConfig, WeaponSlot, WeaponUpgrades};

// --------------------------------------------------------------------------------------
// Health
// --------------------------------------------------------------------------------------

#[test]
fn take_damage_reduces_and_reports_taken() {
    let mut health = Health::new(100);

    let outcome = health.take_damage(30);

    assert_eq!(outcome.taken, 30);
    assert!(!outcome.died);
    assert_eq!(health.current(), 70);
}

#[test]
fn overkill_clamps_to_remaining_and_dies_once() {
    let mut health = Health::new(100);

    let outcome = health.take_damage(150);
    assert_eq!(outcome.taken, 100);
    assert!(outcome.died);
    assert_eq!(health.current(), 0);

    // A corpse absorbs nothing and cannot die again.
    let outcome = health.take_damage(10);
    assert_eq!(outcome.taken, 0);
    assert!(!outcome.died);
}

#[test]
fn exact_lethal_damage_dies() {
    let mut health = Health::new(40);

    let outcome = health.take_damage(40);
    assert_eq!(outcome.taken, 40);
    assert!(outcome.died);
}

#[test]
fn non_positive_damage_is_a_no_op() {
    let mut health = Health::new(100);

    assert_eq!(health.take_damage(0).taken, 0);
    assert_eq!(health.take_damage(-5).taken, 0);
    assert_eq!(health.current(), 100);
}

#[test]
fn invulnerability_zeroes_incoming_damage() {
    let mut health = Health::new(100);
    health.can_damage = false;

    let outcome = health.take_damage(50);
    assert_eq!(outcome.taken, 0);
    assert!(!outcome.died);
    assert_eq!(health.current(), 100);
}

#[test]
fn heal_and_upgrade_max_clamp_correctly() {
    let mut health = Health::new(100);
    health.take_damage(60);

    health.heal(1000);
    assert_eq!(health.current(), 100);

    health.take_damage(10);
    health.upgrade_max(20);
    assert_eq!(health.max(), 120);
    // The raise is also granted as current health.
    assert_eq!(health.current(), 110);
}

#[test]
fn deal_damage_publishes_damage_then_death() {
    let mut world = World::new();
    world.init_resource::<Messages<DamageTaken>>();
    world.init_resource::<Messages<EntityDied>>();
    let target = world.spawn(Health::new(20)).id();

    let hit = move |mut q: Query<&mut Health>,
                    mut dmg: MessageWriter<DamageTaken>,
                    mut died: MessageWriter<EntityDied>| {
        let mut health = q.get_mut(target).unwrap();
        deal_damage(target, Vec2::ZERO, 50, &mut health, &mut dmg, &mut died);
    };
    run_system_once(&mut world, hit);

    let taken: Vec<_> = world.resource_mut::<Messages<DamageTaken>>().drain().collect();
    assert_eq!(taken.len(), 1);
    assert_eq!(taken[0].amount, 20);
    assert_eq!(world.resource::<Messages<EntityDied>>().len(), 1);

    // A second lethal hit is silent on both channels.
    run_system_once(&mut world, hit);
    assert_eq!(world.resource::<Messages<DamageTaken>>().len(), 0);
    assert_eq!(world.resource::<Messages<EntityDied>>().len(), 1);
}

// --------------------------------------------------------------------------------------
// Damage curves
// --------------------------------------------------------------------------------------

#[test]
fn curve_samples_between_bands() {
    let curve = DamageCurve::new(&[(0.0, 10.0, 20.0)]);

    assert_eq!(curve.evaluate(0.0, 0.0), 10.0);
    assert_eq!(curve.evaluate(0.0, 1.0), 20.0);
    assert_eq!(curve.evaluate(0.0, 0.5), 15.0);
}

#[test]
fn curve_lerps_between_keys() {
    let curve = DamageCurve::new(&[(0.0, 10.0, 20.0), (100.0, 0.0, 10.0)]);

    // Halfway along the domain, both bands are halfway too.
    assert_eq!(curve.evaluate(50.0, 0.0), 5.0);
    assert_eq!(curve.evaluate(50.0, 1.0), 15.0);
}

#[test]
fn curve_extends_flat_outside_domain() {
    let curve = DamageCurve::new(&[(10.0, 10.0, 20.0), (100.0, 2.0, 4.0)]);

    assert_eq!(curve.evaluate(0.0, 0.0), 10.0);
    assert_eq!(curve.evaluate(5000.0, 1.0), 4.0);
}

#[test]
fn curve_normalizes_swapped_bands() {
    let curve = DamageCurve::new(&[(0.0, 20.0, 10.0)]);

    assert_eq!(curve.evaluate(0.0, 0.0), 10.0);
    assert_eq!(curve.evaluate(0.0, 1.0), 20.0);
}

#[test]
fn constant_curve_ignores_distance_and_sample() {
    let curve = DamageCurve::constant(15.0);

    assert_eq!(curve.evaluate(0.0, 0.3), 15.0);
    assert_eq!(curve.evaluate(750.0, 0.9), 15.0);
}

// --------------------------------------------------------------------------------------
// Weapon slots and the fire-rate gate
// --------------------------------------------------------------------------------------

#[test]
fn fresh_slot_fires_immediately() {
    let slot = WeaponSlot::new(WeaponConfig::pistol());
    assert!(slot.can_fire(0.0));
}

#[test]
fn slot_respects_firerate_interval() {
    let mut slot = WeaponSlot::new(WeaponConfig::pistol()); // 0.25s interval
    slot.mark_fired(1.0);

    assert!(!slot.can_fire(1.1));
    assert!(!slot.can_fire(1.25));
    assert!(slot.can_fire(1.26));
}

#[test]
fn effective_interval_never_goes_negative() {
    let mut slot = WeaponSlot::new(WeaponConfig::pistol());
    slot.upgrades.firerate_delta = -5.0;

    assert_eq!(slot.effective_interval(), 0.0);
    // Strictly-greater comparison still forbids two volleys at the same instant.
    slot.mark_fired(2.0);
    assert!(!slot.can_fire(2.0));
    assert!(slot.can_fire(2.0001));
}

#[test]
fn volley_size_and_miss_distance_include_upgrades() {
    let mut slot = WeaponSlot::new(WeaponConfig::scatter());
    slot.upgrades.extra_bullets = 1;
    slot.upgrades.extra_miss_distance = 20.0;

    assert_eq!(slot.bullets_per_volley(), 6);
    assert_eq!(slot.miss_distance(), 370.0);
}

// --------------------------------------------------------------------------------------
// Upgrade table
// --------------------------------------------------------------------------------------

#[test]
fn upgrade_levels_one_and_two_speed_up_firerate() {
    let mut up = WeaponUpgrades::default();
    up.advance();
    up.advance();

    assert_eq!(up.level, 2);
    assert!((up.firerate_delta + 0.10).abs() < 1e-6);
    assert_eq!(up.extra_bullets, 0);
    assert_eq!(up.extra_damage, 0);
}

#[test]
fn full_upgrade_table_totals() {
    let mut up = WeaponUpgrades::default();
    for _ in 0..WeaponUpgrades::MAX_LEVEL {
        up.advance();
    }

    assert_eq!(up.level, WeaponUpgrades::MAX_LEVEL);
    // Levels 1, 2 and 6 each shave 0.05s off the interval.
    assert!((up.firerate_delta + 0.15).abs() < 1e-6);
    // Level 5 and level 10 each add a bullet.
    assert_eq!(up.extra_bullets, 2);
    // Levels 5, 7, 8, 9 each add 10 damage.
    assert_eq!(up.extra_damage, 40);
    assert_eq!(up.extra_miss_distance, 20.0);
}

#[test]
fn upgrades_stop_at_max_level() {
    let mut up = WeaponUpgrades::default();
    for _ in 0..WeaponUpgrades::MAX_LEVEL + 5 {
        up.advance();
    }

    assert_eq!(up.level, WeaponUpgrades::MAX_LEVEL);
    assert_eq!(up.extra_bullets, 2);
}

#[test]
fn loading_a_weapon_resets_its_upgrades() {
    let mut equipment = Equipment::new(Some(WeaponConfig::pistol()), None);
    equipment
        .slot_mut(Hand::Right)
        .unwrap()
        .upgrades
        .advance();

    equipment.load(Hand::Right, WeaponConfig::rifle());

    let slot = equipment.slot_mut(Hand::Right).unwrap();
    assert_eq!(slot.config.name, "rifle");
    assert_eq!(slot.upgrades.level, 0);
}

// --------------------------------------------------------------------------------------
// Ability meter
// --------------------------------------------------------------------------------------

#[test]
fn meter_below_threshold_gains_no_level() {
    let mut points = AbilityPoints::new(100, 25);

    assert_eq!(points.grant(99), 0);
    assert_eq!(points.current, 99);
    assert_eq!(points.level, 0);
}

#[test]
fn crossing_threshold_carries_remainder_and_grows() {
    let mut points = AbilityPoints::new(100, 25);

    assert_eq!(points.grant(110), 1);
    assert_eq!(points.level, 1);
    assert_eq!(points.current, 10);
    assert_eq!(points.threshold, 125);
}

#[test]
fn one_grant_can_cross_multiple_thresholds() {
    let mut points = AbilityPoints::new(10, 0);

    assert_eq!(points.grant(35), 3);
    assert_eq!(points.level, 3);
    assert_eq!(points.current, 5);
}

// --------------------------------------------------------------------------------------
// Upgrade application
// --------------------------------------------------------------------------------------

fn upgrade_world() -> World {
    let mut world = World::new();
    world.insert_resource(Tunables::default());
    world.init_resource::<Messages<ApplyUpgrade>>();
    world
}

#[test]
fn speed_upgrade_adds_percentage_of_base_speed() {
    let mut world = upgrade_world();
    let actor = world.spawn(SpeedUpgrade::default()).id();

    world.write_message(ApplyUpgrade {
        target: actor,
        kind: UpgradeKind::Speed(10),
    });
    world.resource_mut::<Messages<ApplyUpgrade>>().update();

    run_system_once(&mut world, upgrades::apply_upgrades);

    let bonus = world.get::<SpeedUpgrade>(actor).unwrap().0;
    assert_eq!(bonus, Tunables::default().player_speed * 0.1);
}

#[test]
fn weapon_upgrade_advances_the_targeted_hand() {
    let mut world = upgrade_world();
    let actor = world
        .spawn(Equipment::new(
            Some(WeaponConfig::pistol()),
            Some(WeaponConfig::rifle()),
        ))
        .id();

    world.write_message(ApplyUpgrade {
        target: actor,
        kind: UpgradeKind::Weapon(Hand::Left),
    });
    world.resource_mut::<Messages<ApplyUpgrade>>().update();

    run_system_once(&mut world, upgrades::apply_upgrades);

    let mut equipment = world.get_mut::<Equipment>(actor).unwrap();
    assert_eq!(equipment.slot_mut(Hand::Left).unwrap().upgrades.level, 1);
    assert_eq!(equipment.slot_mut(Hand::Right).unwrap().upgrades.level, 0);
}

#[test]
fn heal_and_max_health_upgrades_go_through_health() {
    let mut world = upgrade_world();
    let actor = world.spawn(Health::new(100)).id();
    world.get_mut::<Health>(actor).unwrap().take_damage(50);

    world.write_message(ApplyUpgrade {
        target: actor,
        kind: UpgradeKind::Heal(20),
    });
    world.write_message(ApplyUpgrade {
        target: actor,
        kind: UpgradeKind::MaxHealth(30),
    });
    world.resource_mut::<Messages<ApplyUpgrade>>().update();

    run_system_once(&mut world, upgrades::apply_upgrades);

    let health = world.get::<Health>(actor).unwrap();
    assert_eq!(health.max(), 130);
    assert_eq!(health.current(), 100);
}

#[test]
fn special_upgrade_grants_then_extends_the_launcher() {
    let mut world = upgrade_world();
    let actor = world.spawn_empty().id();

    world.write_message(ApplyUpgrade {
        target: actor,
        kind: UpgradeKind::Special,
    });
    world.resource_mut::<Messages<ApplyUpgrade>>().update();
    run_system_once(&mut world, upgrades::apply_upgrades);

    assert_eq!(world.get::<SpecialWeapon>(actor).unwrap().level, 1);

    world.write_message(ApplyUpgrade {
        target: actor,
        kind: UpgradeKind::Special,
    });
    world.resource_mut::<Messages<ApplyUpgrade>>().update();
    run_system_once(&mut world, upgrades::apply_upgrades);

    assert_eq!(world.get::<SpecialWeapon>(actor).unwrap().level, 2);
}
