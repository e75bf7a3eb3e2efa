//! Enemies plugin: pooled archetypes, wave deployment, contact damage and
//! turret fire parity.
//!
//! Same pooling shape as the travelling-shot pools: a wave scheduler only
//! enqueues [`SpawnEnemyRequest`] intent, the allocator is the single writer
//! of the per-kind free lists, and a commit system owns the inactive
//! invariants (hidden, full health, empty collision filters).
//!
//! Damage parity:
//! - Turrets carry `Equipment` + `FireIntent` and shoot through the exact
//!   weapon pipeline the player uses.
//! - Cyborg/boss contact damage funnels through `BulletImpact` so impact
//!   resolution stays the one place where damage is computed and applied.
//!
//! Lifecycle: `Inactive -> Alive -> Dying { timer } -> PendingReturn -> pool`.
//! Collision filters are cleared the moment the death starts; the dying body
//! is scenery.

use avian2d::prelude::*;
use bevy::prelude::*;
use bevy::time::Fixed;
use bevy_firefly::prelude::Occluder2d;

use crate::common::layers::Layer;
use crate::common::rng::GameRng;
use crate::common::state::GameState;
use crate::common::tunables::Tunables;
use crate::plugins::combat::curve::DamageCurve;
use crate::plugins::combat::health::{EntityDied, Health};
use crate::plugins::combat::weapon::{
    AimDirection, Equipment, FireIntent, FireIntentSystems, WeaponConfig,
};
use crate::plugins::player::Player;
use crate::plugins::projectiles::impact::resolve_impacts;
use crate::plugins::projectiles::messages::{BulletImpact, ImpactRecord};
use crate::plugins::world::ARENA_HALF_EXTENT;

const DYING_DURATION: f32 = 0.35;
const TURRET_RANGE: f32 = 620.0;
/// Waves with a boss, counted from 1.
const BOSS_WAVE_PERIOD: usize = 5;
/// Keep spawn points off the walls.
const SPAWN_MARGIN: f32 = 60.0;

#[derive(Component)]
pub struct Enemy;

#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnemyKind {
    Cyborg,
    Turret,
    Boss,
}

impl EnemyKind {
    fn index(self) -> usize {
        match self {
            EnemyKind::Cyborg => 0,
            EnemyKind::Turret => 1,
            EnemyKind::Boss => 2,
        }
    }

    fn max_health(self) -> i32 {
        match self {
            EnemyKind::Cyborg => 30,
            EnemyKind::Turret => 50,
            EnemyKind::Boss => 200,
        }
    }

    fn radius(self) -> f32 {
        match self {
            EnemyKind::Cyborg => 16.0,
            EnemyKind::Turret => 18.0,
            EnemyKind::Boss => 30.0,
        }
    }

    fn chase_speed(self) -> f32 {
        match self {
            EnemyKind::Cyborg => 140.0,
            EnemyKind::Boss => 90.0,
            EnemyKind::Turret => 0.0,
        }
    }

    fn color(self) -> Color {
        match self {
            EnemyKind::Cyborg => Color::srgb(0.9, 0.25, 0.25),
            EnemyKind::Turret => Color::srgb(0.75, 0.55, 0.2),
            EnemyKind::Boss => Color::srgb(0.6, 0.1, 0.45),
        }
    }
}

/// Enemy lifecycle. `Inactive` entities are owned by [`EnemyPools`].
#[derive(Component, Debug, Clone, Default)]
pub enum EnemyLifeState {
    #[default]
    Inactive,
    Alive,
    Dying {
        timer: Timer,
    },
    PendingReturn,
}

/// Contact damage dealt to anything damageable the hurtbox touches.
#[derive(Component, Debug, Clone)]
pub struct HurtBox {
    pub curve: DamageCurve,
}

/// Per-kind free lists.
#[derive(Resource, Default)]
pub struct EnemyPools {
    free: [Vec<Entity>; 3],
}

impl EnemyPools {
    pub fn pop_free(&mut self, kind: EnemyKind) -> Option<Entity> {
        self.free[kind.index()].pop()
    }

    pub fn push_free(&mut self, kind: EnemyKind, entity: Entity) {
        let list = &mut self.free[kind.index()];
        debug_assert!(
            !list.contains(&entity),
            "{entity:?} released twice to the {kind:?} pool"
        );
        if list.contains(&entity) {
            return;
        }
        list.push(entity);
    }

    pub fn free_count(&self, kind: EnemyKind) -> usize {
        self.free[kind.index()].len()
    }
}

#[derive(Message, Debug, Clone, Copy)]
pub struct SpawnEnemyRequest {
    pub kind: EnemyKind,
    pub position: Vec2,
}

/// Wave cursor; the timer period is `Tunables::spawn_interval`.
#[derive(Resource, Debug)]
pub struct WaveState {
    timer: Timer,
    pub wave: usize,
}

impl WaveState {
    fn new(interval: f32) -> Self {
        Self {
            timer: Timer::from_seconds(interval, TimerMode::Repeating),
            wave: 0,
        }
    }
}

pub fn plugin(app: &mut App) {
    app.init_resource::<EnemyPools>()
        .add_message::<SpawnEnemyRequest>()
        .add_systems(OnEnter(GameState::InGame), start_waves)
        .add_systems(
            Update,
            (
                schedule_waves,
                allocate_enemies_from_pool.after(schedule_waves),
                aim_turrets.in_set(FireIntentSystems),
            )
                .run_if(in_state(GameState::InGame)),
        )
        .add_systems(
            FixedUpdate,
            chase_player.run_if(in_state(GameState::InGame)),
        )
        .add_systems(
            FixedPostUpdate,
            (
                hurtbox_contacts
                    .after(avian2d::collision::narrow_phase::CollisionEventSystems)
                    .before(resolve_impacts),
                enemy_death_trigger.after(resolve_impacts),
                enemy_death_progress.after(enemy_death_trigger),
                commit_enemy_returns.after(enemy_death_progress),
            )
                .run_if(in_state(GameState::InGame)),
        );
}

// -----------------------------------------------------------------------------
// Waves
// -----------------------------------------------------------------------------

fn random_arena_point(rng: &mut GameRng) -> Vec2 {
    let extent = ARENA_HALF_EXTENT - SPAWN_MARGIN;
    Vec2::new(rng.range(-extent, extent), rng.range(-extent, extent))
}

fn request_wave(
    wave: usize,
    tunables: &Tunables,
    rng: &mut GameRng,
    writer: &mut MessageWriter<SpawnEnemyRequest>,
) {
    let cyborgs = Tunables::wave_count(&tunables.cyborg_spawn_count, wave);
    let turrets = Tunables::wave_count(&tunables.turret_spawn_count, wave);

    for _ in 0..cyborgs {
        writer.write(SpawnEnemyRequest {
            kind: EnemyKind::Cyborg,
            position: random_arena_point(rng),
        });
    }
    for _ in 0..turrets {
        writer.write(SpawnEnemyRequest {
            kind: EnemyKind::Turret,
            position: random_arena_point(rng),
        });
    }
    if (wave + 1) % BOSS_WAVE_PERIOD == 0 {
        writer.write(SpawnEnemyRequest {
            kind: EnemyKind::Boss,
            position: random_arena_point(rng),
        });
    }

    info!("wave {wave}: {cyborgs} cyborgs, {turrets} turrets");
}

/// Deploy wave zero immediately; later waves come from the repeating timer.
fn start_waves(
    mut commands: Commands,
    tunables: Res<Tunables>,
    mut rng: ResMut<GameRng>,
    mut writer: MessageWriter<SpawnEnemyRequest>,
) {
    request_wave(0, &tunables, &mut rng, &mut writer);

    let mut state = WaveState::new(tunables.spawn_interval);
    state.wave = 1;
    commands.insert_resource(state);
}

fn schedule_waves(
    time: Res<Time>,
    tunables: Res<Tunables>,
    mut rng: ResMut<GameRng>,
    mut state: ResMut<WaveState>,
    mut writer: MessageWriter<SpawnEnemyRequest>,
) {
    state.timer.tick(time.delta());
    if !state.timer.just_finished() {
        return;
    }

    let wave = state.wave;
    request_wave(wave, &tunables, &mut rng, &mut writer);
    state.wave += 1;
}

// -----------------------------------------------------------------------------
// Pool allocator + factory
// -----------------------------------------------------------------------------

fn active_enemy_layers() -> CollisionLayers {
    CollisionLayers::new(
        Layer::Enemy,
        [Layer::World, Layer::Player, Layer::PlayerBullet],
    )
}

/// Membership stays; filters are cleared so nothing interacts.
fn inactive_enemy_layers() -> CollisionLayers {
    CollisionLayers::new(Layer::Enemy, [] as [Layer; 0])
}

/// Factory for a freshly spawned, already-active enemy.
pub fn spawn_enemy_instance(commands: &mut Commands, kind: EnemyKind, position: Vec2) -> Entity {
    let mut e = commands.spawn((
        Name::new(format!("{kind:?}(Pooled)")),
        Enemy,
        kind,
        EnemyLifeState::Alive,
        Health::new(kind.max_health()),
        Sprite {
            color: kind.color(),
            custom_size: Some(Vec2::splat(kind.radius() * 2.0)),
            ..default()
        },
        Transform::from_translation(position.extend(1.0)),
        Collider::circle(kind.radius()),
        active_enemy_layers(),
        CollisionEventsEnabled,
        Occluder2d::circle(kind.radius()),
        Visibility::Visible,
    ));

    match kind {
        EnemyKind::Cyborg | EnemyKind::Boss => {
            e.insert((
                RigidBody::Kinematic,
                LinearVelocity::ZERO,
                HurtBox {
                    curve: DamageCurve::new(&[(0.0, 8.0, 14.0)]),
                },
            ));
        }
        EnemyKind::Turret => {
            e.insert((
                RigidBody::Static,
                Equipment::new(Some(WeaponConfig::turret_gun()), None),
                AimDirection::default(),
                FireIntent::default(),
            ));
        }
    }

    e.id()
}

/// Consume spawn requests: reuse a pooled body of the kind, or grow.
#[allow(clippy::type_complexity)]
pub fn allocate_enemies_from_pool(
    mut commands: Commands,
    mut pools: ResMut<EnemyPools>,
    mut reader: MessageReader<SpawnEnemyRequest>,
    mut q: Query<
        (
            &mut EnemyLifeState,
            &mut Health,
            &mut Transform,
            &mut CollisionLayers,
            &mut Visibility,
        ),
        With<Enemy>,
    >,
) {
    for req in reader.read() {
        let Some(e) = pools.pop_free(req.kind) else {
            spawn_enemy_instance(&mut commands, req.kind, req.position);
            continue;
        };

        let (mut life, mut health, mut tf, mut layers, mut vis) = q
            .get_mut(e)
            .expect("enemy pool contained an entity missing enemy components");

        *life = EnemyLifeState::Alive;
        health.reset();
        tf.translation = req.position.extend(1.0);
        tf.scale = Vec3::ONE;
        *layers = active_enemy_layers();
        *vis = Visibility::Visible;
    }
}

// -----------------------------------------------------------------------------
// Behaviour
// -----------------------------------------------------------------------------

/// Cyborgs and bosses walk straight at the player.
#[allow(clippy::type_complexity)]
fn chase_player(
    q_player: Query<&Transform, (With<Player>, Without<Enemy>)>,
    mut q: Query<
        (&EnemyKind, &EnemyLifeState, &Transform, &mut LinearVelocity),
        (With<Enemy>, Without<Player>),
    >,
) {
    let Ok(player_tf) = q_player.single() else {
        return;
    };
    let target = player_tf.translation.truncate();

    for (kind, life, tf, mut vel) in &mut q {
        if !matches!(life, EnemyLifeState::Alive) {
            vel.0 = Vec2::ZERO;
            continue;
        }

        let to_player = target - tf.translation.truncate();
        vel.0 = to_player.normalize_or_zero() * kind.chase_speed();
    }
}

/// Turrets track the player and raise a fire intent while in range. The
/// intent goes through the same `fire_weapons` system as the player's.
#[allow(clippy::type_complexity)]
fn aim_turrets(
    q_player: Query<&Transform, (With<Player>, Without<Enemy>)>,
    mut q: Query<
        (
            &EnemyKind,
            &EnemyLifeState,
            &Transform,
            &mut AimDirection,
            &mut FireIntent,
        ),
        (With<Enemy>, Without<Player>),
    >,
) {
    let Ok(player_tf) = q_player.single() else {
        return;
    };
    let target = player_tf.translation.truncate();

    for (kind, life, tf, mut aim, mut intent) in &mut q {
        if *kind != EnemyKind::Turret {
            continue;
        }
        if !matches!(life, EnemyLifeState::Alive) {
            *intent = FireIntent::default();
            continue;
        }

        let to_player = target - tf.translation.truncate();
        let in_range = to_player.length_squared() <= TURRET_RANGE * TURRET_RANGE;
        if to_player.length_squared() > f32::EPSILON {
            aim.0 = to_player.normalize();
        }
        intent.right = in_range;
    }
}

/// Resolve hurtbox touches into impact records.
///
/// Contact damage is a zero-distance impact: the shared resolver rolls the
/// curve, spawns the popup and applies the at-most-once death contract.
pub fn hurtbox_contacts(
    mut started: MessageReader<CollisionStart>,
    mut impacts: MessageWriter<BulletImpact>,
    q_hurtboxes: Query<(&HurtBox, &EnemyLifeState)>,
    q_damageable: Query<&Transform, With<Health>>,
) {
    for ev in started.read() {
        // The hurtbox may be on either side of the pair.
        let sides = [
            (ev.collider1, ev.collider2, ev.body2),
            (ev.collider2, ev.collider1, ev.body1),
        ];

        for (hurt_collider, other_collider, other_body) in sides {
            let Ok((hurtbox, life)) = q_hurtboxes.get(hurt_collider) else {
                continue;
            };
            if !matches!(life, EnemyLifeState::Alive) {
                continue;
            }

            let target = other_body.unwrap_or(other_collider);
            let Ok(target_tf) = q_damageable.get(target) else {
                continue;
            };

            impacts.write(BulletImpact(ImpactRecord {
                target,
                distance: 0.0,
                position: target_tf.translation.truncate(),
                owner: hurt_collider,
                curve: hurtbox.curve.clone(),
                bonus_damage: 0,
            }));
        }
    }
}

// -----------------------------------------------------------------------------
// Death lifecycle
// -----------------------------------------------------------------------------

/// `Alive -> Dying` on the death notification. Collision interaction stops
/// immediately; the shrinking body is scenery.
#[allow(clippy::type_complexity)]
pub fn enemy_death_trigger(
    mut deaths: MessageReader<EntityDied>,
    mut q: Query<
        (
            &mut EnemyLifeState,
            &mut CollisionLayers,
            Option<&mut LinearVelocity>,
            Option<&mut FireIntent>,
        ),
        With<Enemy>,
    >,
) {
    for death in deaths.read() {
        let Ok((mut life, mut layers, vel, intent)) = q.get_mut(death.entity) else {
            continue;
        };
        if !matches!(*life, EnemyLifeState::Alive) {
            continue;
        }

        *life = EnemyLifeState::Dying {
            timer: Timer::from_seconds(DYING_DURATION, TimerMode::Once),
        };
        *layers = inactive_enemy_layers();
        if let Some(mut vel) = vel {
            vel.0 = Vec2::ZERO;
        }
        if let Some(mut intent) = intent {
            *intent = FireIntent::default();
        }
    }
}

/// Animate the death shrink and mark the body for return.
pub fn enemy_death_progress(
    time: Res<Time<Fixed>>,
    mut q: Query<(&mut EnemyLifeState, &mut Sprite, &mut Transform), With<Enemy>>,
) {
    for (mut life, mut sprite, mut tf) in &mut q {
        let EnemyLifeState::Dying { timer } = &mut *life else {
            continue;
        };

        timer.tick(time.delta());

        let dur = timer.duration().as_secs_f32().max(0.0001);
        let t = (timer.elapsed_secs() / dur).clamp(0.0, 1.0);

        tf.scale = Vec3::splat(1.0 - t);
        let mut c = sprite.color.to_srgba();
        c.alpha = 1.0 - t;
        sprite.color = c.into();

        if timer.is_finished() {
            *life = EnemyLifeState::PendingReturn;
        }
    }
}

/// Recycle dead bodies: full health, hidden, non-interacting, back on the
/// kind's free list.
#[allow(clippy::type_complexity)]
pub fn commit_enemy_returns(
    mut pools: ResMut<EnemyPools>,
    mut q: Query<
        (
            Entity,
            &EnemyKind,
            &mut EnemyLifeState,
            &mut Health,
            &mut Sprite,
            &mut Transform,
            &mut Visibility,
        ),
        With<Enemy>,
    >,
) {
    for (e, kind, mut life, mut health, mut sprite, mut tf, mut vis) in &mut q {
        if !matches!(*life, EnemyLifeState::PendingReturn) {
            continue;
        }

        *life = EnemyLifeState::Inactive;
        health.reset();
        tf.scale = Vec3::ONE;
        let mut c = sprite.color.to_srgba();
        c.alpha = 1.0;
        sprite.color = c.into();
        *vis = Visibility::Hidden;

        pools.push_free(*kind, e);
    }
}
