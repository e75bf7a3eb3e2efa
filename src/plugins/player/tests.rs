//! State machine tests: the machine is pure data, so transitions are tested
//! without a `World`; the movement system gets the usual minimal-world run.

use avian2d::prelude::*;
use bevy::prelude::*;

use crate::common::test_utils::run_system_once;
use crate::common::tunables::Tunables;
use crate::plugins::combat::upgrades::SpeedUpgrade;
use crate::plugins::combat::weapon::{AimDirection, Hand};

use super::fsm::{ActorState, StateEffect, StateInput, StateMachine};

fn idle_input(now: f32) -> StateInput {
    StateInput {
        now,
        move_axis: Vec2::ZERO,
        aim: Vec2::Y,
        dodge_pressed: false,
        equip_right_pressed: false,
        equip_left_pressed: false,
        pickup: None,
        fire_right: false,
        fire_left: false,
    }
}

fn machine() -> (StateMachine, Vec<StateEffect>) {
    let mut effects = Vec::new();
    let sm = StateMachine::new(0.0, &mut effects);
    effects.clear();
    (sm, effects)
}

/// The machine never dereferences pickup entities, so any id will do.
fn scratch_entity() -> Entity {
    World::new().spawn_empty().id()
}

#[test]
fn new_machine_starts_in_locomotion() {
    let mut effects = Vec::new();
    let sm = StateMachine::new(0.0, &mut effects);

    assert_eq!(sm.current(), ActorState::Locomotion);
    assert!(effects.contains(&StateEffect::Anim(super::fsm::ANIM_LOCOMOTION, true)));
}

#[test]
fn dodge_enters_with_iframes_and_anim_swap() {
    let (mut sm, mut effects) = machine();

    let input = StateInput {
        dodge_pressed: true,
        ..idle_input(1.0)
    };
    sm.logic_update(&input, 1.5, &mut effects);

    assert_eq!(sm.current(), ActorState::Dodge);
    assert!(effects.contains(&StateEffect::Anim(super::fsm::ANIM_LOCOMOTION, false)));
    assert!(effects.contains(&StateEffect::Anim(super::fsm::ANIM_DODGE, true)));
    assert!(effects.contains(&StateEffect::Invulnerable(true)));
}

#[test]
fn dodge_is_rejected_while_on_cooldown() {
    let (mut sm, mut effects) = machine();

    // First dodge at t=1, complete it, return to locomotion.
    let input = StateInput {
        dodge_pressed: true,
        ..idle_input(1.0)
    };
    sm.logic_update(&input, 1.5, &mut effects);
    sm.animation_finish_trigger(&mut effects);
    sm.logic_update(&idle_input(1.4), 1.5, &mut effects);
    assert_eq!(sm.current(), ActorState::Locomotion);

    // t=2.0 is inside the 1.5s cooldown window started at t=1.
    effects.clear();
    let retry = StateInput {
        dodge_pressed: true,
        ..idle_input(2.0)
    };
    sm.logic_update(&retry, 1.5, &mut effects);
    assert_eq!(sm.current(), ActorState::Locomotion);

    // Past the window the dodge goes through.
    let retry = StateInput {
        dodge_pressed: true,
        ..idle_input(2.6)
    };
    sm.logic_update(&retry, 1.5, &mut effects);
    assert_eq!(sm.current(), ActorState::Dodge);
}

#[test]
fn equip_wins_over_simultaneous_dodge() {
    let (mut sm, mut effects) = machine();
    let pickup = scratch_entity();

    let input = StateInput {
        dodge_pressed: true,
        equip_right_pressed: true,
        pickup: Some(pickup),
        ..idle_input(1.0)
    };
    sm.logic_update(&input, 1.5, &mut effects);

    assert_eq!(
        sm.current(),
        ActorState::WeaponEquip {
            hand: Hand::Right,
            pickup
        }
    );
    // The equip posture is suspended on entry.
    assert!(effects.contains(&StateEffect::WeaponModels(false)));
    assert!(effects.contains(&StateEffect::IkWeight(0.0)));
}

#[test]
fn right_hand_equip_wins_over_left() {
    let (mut sm, mut effects) = machine();
    let pickup = scratch_entity();

    let input = StateInput {
        equip_right_pressed: true,
        equip_left_pressed: true,
        pickup: Some(pickup),
        ..idle_input(1.0)
    };
    sm.logic_update(&input, 1.5, &mut effects);

    assert!(matches!(
        sm.current(),
        ActorState::WeaponEquip {
            hand: Hand::Right,
            ..
        }
    ));
}

#[test]
fn equip_without_a_pickup_in_reach_is_ignored() {
    let (mut sm, mut effects) = machine();

    let input = StateInput {
        equip_right_pressed: true,
        ..idle_input(1.0)
    };
    sm.logic_update(&input, 1.5, &mut effects);

    assert_eq!(sm.current(), ActorState::Locomotion);
}

#[test]
fn dodge_returns_to_locomotion_after_finish_beat() {
    let (mut sm, mut effects) = machine();

    let input = StateInput {
        dodge_pressed: true,
        ..idle_input(1.0)
    };
    sm.logic_update(&input, 1.5, &mut effects);

    // Still dodging until the animation layer reports done.
    effects.clear();
    sm.logic_update(&idle_input(1.1), 1.5, &mut effects);
    assert_eq!(sm.current(), ActorState::Dodge);

    sm.animation_finish_trigger(&mut effects);
    sm.logic_update(&idle_input(1.35), 1.5, &mut effects);
    assert_eq!(sm.current(), ActorState::Locomotion);
    // I-frames end when the dodge exits.
    assert!(effects.contains(&StateEffect::Invulnerable(false)));
}

#[test]
fn equip_finish_loads_the_weapon_then_restores_posture() {
    let (mut sm, mut effects) = machine();
    let pickup = scratch_entity();

    let input = StateInput {
        equip_left_pressed: true,
        pickup: Some(pickup),
        ..idle_input(1.0)
    };
    sm.logic_update(&input, 1.5, &mut effects);

    effects.clear();
    sm.animation_finish_trigger(&mut effects);
    assert!(effects.contains(&StateEffect::LoadWeapon {
        hand: Hand::Left,
        pickup
    }));

    sm.logic_update(&idle_input(1.6), 1.5, &mut effects);
    assert_eq!(sm.current(), ActorState::Locomotion);
    assert!(effects.contains(&StateEffect::WeaponModels(true)));
    assert!(effects.contains(&StateEffect::IkWeight(1.0)));
}

#[test]
fn fire_effect_is_emitted_only_in_locomotion() {
    let (mut sm, mut effects) = machine();

    let firing = StateInput {
        fire_right: true,
        ..idle_input(1.0)
    };
    sm.logic_update(&firing, 1.5, &mut effects);
    assert!(effects.contains(&StateEffect::Fire {
        right: true,
        left: false
    }));

    // Dodging suppresses fire.
    effects.clear();
    let input = StateInput {
        dodge_pressed: true,
        ..idle_input(1.1)
    };
    sm.logic_update(&input, 1.5, &mut effects);
    let firing = StateInput {
        fire_right: true,
        ..idle_input(1.2)
    };
    sm.logic_update(&firing, 1.5, &mut effects);
    assert!(!effects
        .iter()
        .any(|e| matches!(e, StateEffect::Fire { .. })));
}

// --------------------------------------------------------------------------------------
// Physics output
// --------------------------------------------------------------------------------------

#[test]
fn locomotion_moves_along_the_input_axis() {
    let (sm, _) = machine();

    let input = StateInput {
        move_axis: Vec2::X,
        ..idle_input(0.0)
    };
    assert_eq!(sm.physics_update(&input, 100.0, 900.0), Vec2::new(100.0, 0.0));
}

#[test]
fn dodge_rolls_along_movement_or_aim() {
    let (mut sm, mut effects) = machine();
    let input = StateInput {
        dodge_pressed: true,
        move_axis: Vec2::X,
        ..idle_input(1.0)
    };
    sm.logic_update(&input, 1.5, &mut effects);

    assert_eq!(sm.physics_update(&input, 100.0, 900.0), Vec2::new(900.0, 0.0));

    // Standing still: roll along the aim.
    let standing = StateInput {
        aim: Vec2::NEG_Y,
        ..idle_input(1.1)
    };
    assert_eq!(
        sm.physics_update(&standing, 100.0, 900.0),
        Vec2::new(0.0, -900.0)
    );

    // After the brake beat the roll adds no velocity.
    sm.animation_trigger();
    assert_eq!(sm.physics_update(&input, 100.0, 900.0), Vec2::ZERO);
}

#[test]
fn equip_stops_movement() {
    let (mut sm, mut effects) = machine();
    let input = StateInput {
        equip_right_pressed: true,
        pickup: Some(scratch_entity()),
        move_axis: Vec2::X,
        ..idle_input(1.0)
    };
    sm.logic_update(&input, 1.5, &mut effects);

    assert_eq!(sm.physics_update(&input, 100.0, 900.0), Vec2::ZERO);
}

// --------------------------------------------------------------------------------------
// Systems
// --------------------------------------------------------------------------------------

#[test]
fn apply_movement_includes_speed_upgrades() {
    let mut world = World::new();
    world.insert_resource(Time::<()>::default());
    world.insert_resource(Tunables {
        player_speed: 100.0,
        ..Tunables::default()
    });
    world.insert_resource(super::PlayerInput {
        move_axis: Vec2::X,
        ..default()
    });

    let mut effects = Vec::new();
    world.spawn((
        super::Player,
        StateMachine::new(0.0, &mut effects),
        AimDirection::default(),
        SpeedUpgrade(50.0),
        LinearVelocity::ZERO,
    ));

    run_system_once(&mut world, super::apply_movement);

    let v = world.query::<&LinearVelocity>().iter(&world).next().unwrap();
    assert_eq!(v.0, Vec2::new(150.0, 0.0));
}
