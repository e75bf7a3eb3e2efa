//! Kind-keyed entity pools.
//!
//! One free list per pooled kind. An entity is either on its free list
//! (inactive) or checked out (active), never both. Pools grow lazily: when
//! a free list is empty the allocator builds a fresh instance with the
//! kind's factory instead of dropping the request, so exhaustion cannot
//! occur. A small warm capacity is still pre-spawned at startup.

use std::marker::PhantomData;

use avian2d::prelude::*;
use bevy::prelude::*;

use super::components::{
    DamagePopup, PoolState, PooledPopup, PooledProjectile, PooledTrail, Trail, TrailState,
};
use super::layers::{inactive_projectile_layers, popup_color, projectile_color, trail_color};

pub const WARM_TRAILS: usize = 64;
pub const WARM_PROJECTILES: usize = 16;
pub const WARM_POPUPS: usize = 32;

pub struct TrailKind;
pub struct ProjectileKind;
pub struct PopupKind;

pub struct EntityPool<K> {
    pub free: Vec<Entity>,
    _kind: PhantomData<K>,
}

// Marker trait; the phantom kind is always thread-safe.
impl<K: Send + Sync + 'static> Resource for EntityPool<K> {}

impl<K> Default for EntityPool<K> {
    fn default() -> Self {
        Self {
            free: Vec::new(),
            _kind: PhantomData,
        }
    }
}

impl<K> EntityPool<K> {
    pub fn pop_free(&mut self) -> Option<Entity> {
        self.free.pop()
    }

    /// Return an instance to the free list.
    ///
    /// Releasing an entity that is already free is a caller contract
    /// violation; it is rejected here so it cannot corrupt the
    /// active/inactive partition.
    pub fn push_free(&mut self, entity: Entity) {
        debug_assert!(
            !self.free.contains(&entity),
            "{entity:?} released twice to the same pool"
        );
        if self.free.contains(&entity) {
            return;
        }
        self.free.push(entity);
    }
}

pub type TrailPool = EntityPool<TrailKind>;
pub type ProjectilePool = EntityPool<ProjectileKind>;
pub type PopupPool = EntityPool<PopupKind>;

/// Factory for one inactive trail instance.
///
/// Trails are visual-only: the hit already resolved at trace time, so they
/// carry no physics components at all.
pub fn spawn_trail_instance(commands: &mut Commands) -> Entity {
    commands
        .spawn((
            Name::new("Trail(Pooled)"),
            PooledTrail,
            TrailState::Inactive,
            Trail::idle(),
            Sprite {
                color: trail_color(),
                custom_size: Some(Vec2::new(10.0, 3.0)),
                ..default()
            },
            Transform::from_xyz(0.0, 0.0, 3.0),
            Visibility::Hidden,
        ))
        .id()
}

/// Factory for one inactive physical projectile.
///
/// Physics components stay attached for the whole pooled lifetime; being
/// "disabled" just means empty collision filters, zero velocity and hidden
/// visibility (no structural toggles, no archetype moves).
pub fn spawn_projectile_instance(commands: &mut Commands) -> Entity {
    commands
        .spawn((
            Name::new("Projectile(Pooled)"),
            PooledProjectile,
            PoolState::Inactive,
            super::components::Projectile::idle(),
            Sprite {
                color: projectile_color(),
                custom_size: Some(Vec2::splat(10.0)),
                ..default()
            },
            Transform::from_xyz(0.0, 0.0, 3.0),
            Visibility::Hidden,
            RigidBody::Dynamic,
            Collider::circle(5.0),
            inactive_projectile_layers(),
            LinearVelocity(Vec2::ZERO),
            // Always present; inactive instances never collide because their
            // filters are empty.
            CollisionEventsEnabled,
        ))
        .id()
}

/// Factory for one inactive damage popup.
pub fn spawn_popup_instance(commands: &mut Commands) -> Entity {
    commands
        .spawn((
            Name::new("DamagePopup(Pooled)"),
            PooledPopup,
            PoolState::Inactive,
            DamagePopup::idle(),
            Sprite {
                color: popup_color(),
                custom_size: Some(Vec2::splat(6.0)),
                ..default()
            },
            Transform::from_xyz(0.0, 0.0, 5.0),
            Visibility::Hidden,
        ))
        .id()
}

/// Pre-spawn the warm capacity for every pool.
pub fn init_pools(
    mut commands: Commands,
    mut trails: ResMut<TrailPool>,
    mut projectiles: ResMut<ProjectilePool>,
    mut popups: ResMut<PopupPool>,
) {
    trails.free.clear();
    for _ in 0..WARM_TRAILS {
        let e = spawn_trail_instance(&mut commands);
        trails.free.push(e);
    }

    projectiles.free.clear();
    for _ in 0..WARM_PROJECTILES {
        let e = spawn_projectile_instance(&mut commands);
        projectiles.free.push(e);
    }

    popups.free.clear();
    for _ in 0..WARM_POPUPS {
        let e = spawn_popup_instance(&mut commands);
        popups.free.push(e);
    }
}
