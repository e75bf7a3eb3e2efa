//! Player plugin.
//!
//! Pipeline:
//! - Update: sample input, aim at the cursor, probe for pickups, run the
//!   state machine and apply its effects
//! - FixedUpdate: state-dependent velocity on the kinematic rigid body
//!
//! The state machine itself is pure data (see [`fsm`]); this module owns the
//! translation between the ECS and the machine: inputs in, effects out.

pub mod fsm;

use avian2d::prelude::*;
use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;

use crate::common::{layers::Layer, state::GameState, tunables::Tunables};
use crate::plugins::camera::MainCamera;
use crate::plugins::combat::health::{EntityDied, Health};
use crate::plugins::combat::upgrades::{AbilityPoints, SpeedUpgrade};
use crate::plugins::combat::weapon::{
    AimDirection, Equipment, FireIntent, FireIntentSystems, WeaponConfig,
};
use crate::plugins::world::PickupItem;

use fsm::{StateEffect, StateInput, StateMachine};

#[derive(Component)]
pub struct Player;

#[derive(Resource, Default, Debug)]
pub struct PlayerInput {
    pub move_axis: Vec2,
    pub dodge_pressed: bool,
    pub equip_right_pressed: bool,
    pub equip_left_pressed: bool,
    pub fire_right: bool,
    pub fire_left: bool,
}

/// Mid-animation beat from the animation layer (dodge brake point).
#[derive(Message, Debug, Clone, Copy)]
pub struct AnimationTrigger {
    pub entity: Entity,
}

/// End-of-animation beat from the animation layer.
#[derive(Message, Debug, Clone, Copy)]
pub struct AnimationFinishTrigger {
    pub entity: Entity,
}

pub fn plugin(app: &mut App) {
    app.insert_resource(PlayerInput::default())
        .add_message::<AnimationTrigger>()
        .add_message::<AnimationFinishTrigger>()
        .add_systems(OnEnter(GameState::InGame), spawn)
        .add_systems(
            Update,
            (
                gather_input,
                update_aim,
                rotate_toward_aim.after(update_aim),
                emit_animation_beats,
                drive_state_machine
                    .in_set(FireIntentSystems)
                    .after(gather_input)
                    .after(update_aim)
                    .after(emit_animation_beats),
                log_player_death,
            )
                .run_if(in_state(GameState::InGame)),
        )
        .add_systems(FixedUpdate, apply_movement);
}

fn spawn(mut commands: Commands, tunables: Res<Tunables>) {
    let layers = CollisionLayers::new(
        Layer::Player,
        [Layer::World, Layer::Enemy, Layer::EnemyBullet],
    );

    let mut effects = Vec::new();
    let machine = StateMachine::new(0.0, &mut effects);

    commands.spawn((
        Name::new("Player"),
        Player,
        machine,
        Health::new(100),
        Equipment::new(Some(WeaponConfig::pistol()), None),
        AbilityPoints::new(
            tunables.initial_ability_threshold,
            tunables.ability_threshold_growth_pct,
        ),
        SpeedUpgrade::default(),
        AimDirection::default(),
        FireIntent::default(),
        Sprite {
            color: Color::srgb(0.2, 0.75, 0.9),
            custom_size: Some(Vec2::splat(26.0)),
            ..default()
        },
        Transform::from_xyz(0.0, 0.0, 1.0),
        (
            RigidBody::Kinematic,
            Collider::circle(13.0),
            layers,
            LinearVelocity::ZERO,
        ),
        DespawnOnExit(GameState::InGame),
    ));
}

fn gather_input(
    keys: Res<ButtonInput<KeyCode>>,
    buttons: Res<ButtonInput<MouseButton>>,
    mut input: ResMut<PlayerInput>,
) {
    let mut axis = Vec2::ZERO;

    if keys.pressed(KeyCode::KeyW) {
        axis.y += 1.0;
    }
    if keys.pressed(KeyCode::KeyS) {
        axis.y -= 1.0;
    }
    if keys.pressed(KeyCode::KeyA) {
        axis.x -= 1.0;
    }
    if keys.pressed(KeyCode::KeyD) {
        axis.x += 1.0;
    }

    input.move_axis = if axis.length_squared() > 0.0 {
        axis.normalize()
    } else {
        Vec2::ZERO
    };

    input.dodge_pressed = keys.just_pressed(KeyCode::Space);
    input.equip_right_pressed = keys.just_pressed(KeyCode::KeyE);
    input.equip_left_pressed = keys.just_pressed(KeyCode::KeyQ);
    input.fire_right = buttons.pressed(MouseButton::Left);
    input.fire_left = buttons.pressed(MouseButton::Right);
}

/// Aim the player at the cursor. Headless runs keep the last aim.
fn update_aim(
    windows: Query<&Window>,
    q_camera: Query<(&Camera, &GlobalTransform), With<MainCamera>>,
    mut q_player: Query<(&Transform, &mut AimDirection), With<Player>>,
) {
    let Ok(window) = windows.single() else {
        return;
    };
    let Some(cursor) = window.cursor_position() else {
        return;
    };
    let Ok((camera, cam_tf)) = q_camera.single() else {
        return;
    };
    let Ok(world_cursor) = camera.viewport_to_world_2d(cam_tf, cursor) else {
        return;
    };

    for (tf, mut aim) in &mut q_player {
        let dir = world_cursor - tf.translation.truncate();
        if dir.length_squared() > f32::EPSILON {
            aim.0 = dir.normalize();
        }
    }
}

/// Turn the body toward the aim at a bounded rate.
fn rotate_toward_aim(
    time: Res<Time>,
    tunables: Res<Tunables>,
    mut q: Query<(&mut Transform, &AimDirection), With<Player>>,
) {
    for (mut tf, aim) in &mut q {
        let target = Quat::from_rotation_z(aim.0.to_angle() - std::f32::consts::FRAC_PI_2);
        let step = (tunables.rotation_speed * time.delta_secs()).min(1.0);
        tf.rotation = tf.rotation.slerp(target, step);
    }
}

/// Nearest-by-list pickup probe.
///
/// The filter mask already restricts the intersection list to pickups, so
/// every returned entity is a valid candidate; the whole list is scanned and
/// the closest one wins (a single arbitrary overlap is not trusted).
pub fn pickup_in_radius(
    spatial: &SpatialQuery,
    origin: Vec2,
    radius: f32,
    q_pickups: &Query<&Transform, With<PickupItem>>,
) -> Option<Entity> {
    let filter = SpatialQueryFilter::from_mask(Layer::Pickup);
    let hits = spatial.shape_intersections(&Collider::circle(radius), origin, 0.0, &filter);

    hits.into_iter()
        .filter_map(|e| {
            let tf = q_pickups.get(e).ok()?;
            Some((e, tf.translation.truncate().distance_squared(origin)))
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(e, _)| e)
}

/// True when any overlap in `radius` matches `mask`. Scans the full
/// intersection list instead of testing only the first overlap.
pub fn any_in_radius(spatial: &SpatialQuery, origin: Vec2, radius: f32, mask: LayerMask) -> bool {
    let filter = SpatialQueryFilter::from_mask(mask);
    !spatial
        .shape_intersections(&Collider::circle(radius), origin, 0.0, &filter)
        .is_empty()
}

// Stand-in beat times for the animation layer; the render build replaces
// these with real animation events.
const DODGE_BRAKE_TIME: f32 = 0.2;
const DODGE_FINISH_TIME: f32 = 0.35;
const EQUIP_FINISH_TIME: f32 = 0.5;

/// Emit animation beats when a state's clip crosses its trigger times.
fn emit_animation_beats(
    time: Res<Time>,
    mut triggers: MessageWriter<AnimationTrigger>,
    mut finishes: MessageWriter<AnimationFinishTrigger>,
    q: Query<(Entity, &StateMachine)>,
) {
    let now = time.elapsed_secs();
    let dt = time.delta_secs();

    for (entity, machine) in &q {
        let t = now - machine.start_time;
        let t_prev = t - dt;
        let crossed = |beat: f32| t_prev < beat && t >= beat;

        match machine.current() {
            fsm::ActorState::Dodge => {
                if crossed(DODGE_BRAKE_TIME) {
                    triggers.write(AnimationTrigger { entity });
                }
                if crossed(DODGE_FINISH_TIME) {
                    finishes.write(AnimationFinishTrigger { entity });
                }
            }
            fsm::ActorState::WeaponEquip { .. } => {
                if crossed(EQUIP_FINISH_TIME) {
                    finishes.write(AnimationFinishTrigger { entity });
                }
            }
            fsm::ActorState::Locomotion => {}
        }
    }
}

/// Feed the state machine one frame of input and apply its effects.
#[allow(clippy::too_many_arguments)]
fn drive_state_machine(
    time: Res<Time>,
    tunables: Res<Tunables>,
    spatial: SpatialQuery,
    input: Res<PlayerInput>,
    mut commands: Commands,
    mut triggers: MessageReader<AnimationTrigger>,
    mut finishes: MessageReader<AnimationFinishTrigger>,
    mut q: Query<
        (
            Entity,
            &Transform,
            &AimDirection,
            &mut StateMachine,
            &mut Health,
            &mut Equipment,
            &mut FireIntent,
        ),
        With<Player>,
    >,
    q_pickup_items: Query<&PickupItem>,
    q_pickup_transforms: Query<&Transform, With<PickupItem>>,
    mut effects: Local<Vec<StateEffect>>,
) {
    let triggered: Vec<Entity> = triggers.read().map(|t| t.entity).collect();
    let finished: Vec<Entity> = finishes.read().map(|t| t.entity).collect();

    for (entity, tf, aim, mut machine, mut health, mut equipment, mut intent) in &mut q {
        effects.clear();

        if triggered.contains(&entity) {
            machine.animation_trigger();
        }
        if finished.contains(&entity) {
            machine.animation_finish_trigger(&mut effects);
        }

        let origin = tf.translation.truncate();
        // Dodging needs ground under the actor.
        let grounded = any_in_radius(
            &spatial,
            origin,
            tunables.ground_check_radius,
            Layer::Ground.into(),
        );

        let state_input = StateInput {
            now: time.elapsed_secs(),
            move_axis: input.move_axis,
            aim: aim.0,
            dodge_pressed: input.dodge_pressed && grounded,
            equip_right_pressed: input.equip_right_pressed,
            equip_left_pressed: input.equip_left_pressed,
            pickup: pickup_in_radius(&spatial, origin, tunables.pickup_radius, &q_pickup_transforms),
            fire_right: input.fire_right,
            fire_left: input.fire_left,
        };

        machine.logic_update(&state_input, tunables.dodge_cooldown, &mut effects);

        *intent = FireIntent::default();
        for effect in effects.drain(..) {
            match effect {
                StateEffect::Anim(name, on) => {
                    debug!("animator[{name}] = {on}");
                }
                StateEffect::Invulnerable(on) => health.can_damage = !on,
                StateEffect::WeaponModels(visible) => equipment.models_visible = visible,
                StateEffect::IkWeight(weight) => equipment.ik_weight = weight,
                StateEffect::LoadWeapon { hand, pickup } => {
                    match q_pickup_items.get(pickup) {
                        Ok(item) => {
                            equipment.load(hand, item.config.clone());
                            commands.entity(pickup).despawn();
                        }
                        Err(_) => {
                            // Another consumer got there first this frame.
                            warn!("pickup {pickup:?} vanished before the equip finished");
                        }
                    }
                }
                StateEffect::Fire { right, left } => {
                    intent.right = right && equipment.right.is_some();
                    intent.left = left && equipment.left.is_some();
                }
            }
        }
    }
}

fn apply_movement(
    time: Res<Time>,
    tunables: Res<Tunables>,
    input: Res<PlayerInput>,
    mut q: Query<
        (
            &StateMachine,
            &AimDirection,
            &SpeedUpgrade,
            &mut LinearVelocity,
        ),
        With<Player>,
    >,
) {
    let Ok((machine, aim, speed_upgrade, mut vel)) = q.single_mut() else {
        return;
    };

    let state_input = StateInput {
        now: time.elapsed_secs(),
        move_axis: input.move_axis,
        aim: aim.0,
        dodge_pressed: false,
        equip_right_pressed: false,
        equip_left_pressed: false,
        pickup: None,
        fire_right: false,
        fire_left: false,
    };

    vel.0 = machine.physics_update(
        &state_input,
        tunables.player_speed + speed_upgrade.0,
        tunables.dodge_speed,
    );
}

/// Death is published for the outer layers (run summary, restart screen);
/// the core only records it.
fn log_player_death(mut deaths: MessageReader<EntityDied>, q_player: Query<(), With<Player>>) {
    for death in deaths.read() {
        if q_player.contains(death.entity) {
            info!("player died at {:?}", death.position);
        }
    }
}

#[cfg(test)]
mod tests;
