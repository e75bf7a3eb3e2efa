mod common;

use bevy::prelude::*;

use topdown_shooter::plugins::combat::health::Health;
use topdown_shooter::plugins::combat::weapon::Equipment;
use topdown_shooter::plugins::player::fsm::{ActorState, StateMachine};
use topdown_shooter::plugins::player::Player;
use topdown_shooter::plugins::world::PickupItem;

fn press(app: &mut App, key: KeyCode) {
    app.world_mut()
        .resource_mut::<ButtonInput<KeyCode>>()
        .press(key);
}

fn clear(app: &mut App, key: KeyCode) {
    let mut keys = app.world_mut().resource_mut::<ButtonInput<KeyCode>>();
    keys.release(key);
    keys.clear_just_pressed(key);
}

#[test]
fn equipping_a_pickup_swaps_the_weapon_and_consumes_it() {
    let mut app = common::app_headless();
    common::disable_waves(&mut app);
    app.update();

    // Park the player next to the rifle pickup.
    let mut q_tf = app
        .world_mut()
        .query_filtered::<&mut Transform, With<Player>>();
    q_tf.single_mut(app.world_mut()).unwrap().translation = Vec3::new(-220.0, 150.0, 1.0);
    common::tick(&mut app, 3);

    press(&mut app, KeyCode::KeyE);
    app.update();
    clear(&mut app, KeyCode::KeyE);

    // Mid-equip the held models are tucked away and the hold posture drops.
    {
        let mut q = app
            .world_mut()
            .query_filtered::<(&StateMachine, &Equipment), With<Player>>();
        let (machine, equipment) = q.single(app.world()).unwrap();
        assert!(matches!(
            machine.current(),
            ActorState::WeaponEquip { .. }
        ));
        assert!(!equipment.models_visible);
        assert_eq!(equipment.ik_weight, 0.0);
    }

    // Equip clip runs 0.5s; give it room to finish.
    common::tick(&mut app, 40);

    let mut q = app
        .world_mut()
        .query_filtered::<(&StateMachine, &Equipment), With<Player>>();
    let (machine, equipment) = q.single(app.world()).unwrap();
    assert!(matches!(machine.current(), ActorState::Locomotion));
    assert_eq!(equipment.right.as_ref().unwrap().config.name, "rifle");
    assert!(equipment.models_visible);
    assert_eq!(equipment.ik_weight, 1.0);

    // The rifle pickup is gone, the scatter one remains.
    let remaining: Vec<_> = app
        .world_mut()
        .query::<&PickupItem>()
        .iter(app.world())
        .map(|p| p.config.name)
        .collect();
    assert_eq!(remaining, vec!["scatter"]);
}

#[test]
fn dodging_grants_iframes_until_the_roll_ends() {
    let mut app = common::app_headless();
    common::disable_waves(&mut app);
    app.update();

    press(&mut app, KeyCode::Space);
    app.update();
    clear(&mut app, KeyCode::Space);

    {
        let mut q = app
            .world_mut()
            .query_filtered::<(&StateMachine, &Health), With<Player>>();
        let (machine, health) = q.single(app.world()).unwrap();
        assert!(matches!(machine.current(), ActorState::Dodge));
        assert!(!health.can_damage, "rolling player cannot be damaged");
    }

    // Roll clip runs 0.35s.
    common::tick(&mut app, 30);

    let mut q = app
        .world_mut()
        .query_filtered::<(&StateMachine, &Health), With<Player>>();
    let (machine, health) = q.single(app.world()).unwrap();
    assert!(matches!(machine.current(), ActorState::Locomotion));
    assert!(health.can_damage);
}
