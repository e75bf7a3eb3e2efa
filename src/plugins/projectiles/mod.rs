//! Travelling-shot plugin: **message-based producer → consumer** spawning +
//! data-driven pooling, for all three pooled kinds (trails, projectiles,
//! damage popups).
//!
//! # Philosophy: invariants first
//! This module tree pushes correctness checks to boundaries and keeps hot
//! paths (allocation, travel, impact resolve, return commit) straight-line.
//!
//! In an ECS, "this entity exists and has these components" cannot be a
//! compile-time fact. But you *can*:
//! - encode **meaning** with types (state enums, kind markers),
//! - validate invariants once (instance factory / state transition),
//! - and then treat violations as bugs (fail-fast `expect()`),
//! which removes a lot of runtime branching from hot loops.
//!
//! # Data flow (big picture)
//! ```text
//!   Update schedule (variable dt)
//!┌────────────────────────────────────────────────────────────────────────┐
//!│  (A) Producers: combat::weapon::fire_weapons (hit-scan volleys),       │
//!│      projectile::fire_special_weapons (auto-fire launchers)            │
//!│      - read: input intent, transforms, weapon slots, GameRng           │
//!│      - write: SpawnTrailRequest / SpawnProjectileRequest messages      │
//!│                                                                        │
//!│  (B) Consumers: allocator::allocate_*_from_pool                        │
//!│      - read: spawn request messages                                    │
//!│      - mutate: pool free list + instance components (Active state)     │
//!│      - on empty free list: grow lazily, never drop a request           │
//!└────────────────────────────────────────────────────────────────────────┘
//!                │
//!                v
//!   FixedUpdate (fixed dt)
//!┌────────────────────────────────────────────────────────────────────────┐
//!│  (C) trail::advance_trails      Flying → Holding, emits BulletImpact   │
//!│  (D) projectile::projectile_lifetime   timeout → PendingReturn         │
//!│  (E) popup::animate_popups      rise, expire → PendingReturn           │
//!└────────────────────────────────────────────────────────────────────────┘
//!                │
//!                v
//!   FixedPostUpdate (fixed dt)
//!┌────────────────────────────────────────────────────────────────────────┐
//!│  (F) Physics emits CollisionStart messages (Avian)                     │
//!│                                                                        │
//!│  (G) projectile::process_projectile_collisions                         │
//!│      - contact → BulletImpact, state → PendingReturn                   │
//!│                                                                        │
//!│  (H) impact::resolve_impacts                                           │
//!│      - BulletImpact → curve damage roll → Health + popups + meter      │
//!│                                                                        │
//!│  (I) commit::commit_*_returns                                          │
//!│      - PendingReturn instances regain the Inactive invariants          │
//!│      - push back into their pool's free list                           │
//!└────────────────────────────────────────────────────────────────────────┘
//!
//! Feedback loop:
//!   commit pushes the entity back into the free list,
//!   the allocator pops it for the next request.
//! ```
//!
//! # Why messages instead of direct pool access?
//! Producers do **not** borrow the pools. They only enqueue intent.
//! Each allocator is the **single writer** that mutates its pool, which
//! keeps pool mutation localized and producers decoupled.
//!
//! # Where do we still branch?
//! - Impact targets: a trail can end on a wall with no `Health`. Normal.
//! - Capacity: a free list can be empty. The allocator grows the pool.
//! Everything else is treated as an invariant violation.

pub mod components;
pub mod layers;
pub mod pool;

pub mod allocator;
pub mod commit;
pub mod impact;
pub mod messages;
pub mod popup;
pub mod projectile;
pub mod trail;

use avian2d::collision::narrow_phase::CollisionEventSystems;
use bevy::prelude::*;

use crate::common::state::GameState;
use crate::plugins::combat::weapon::fire_weapons;

pub struct ProjectilesPlugin;

impl Plugin for ProjectilesPlugin {
    fn build(&self, app: &mut App) {
        // Pools + warm pre-spawn
        app.init_resource::<pool::TrailPool>()
            .init_resource::<pool::ProjectilePool>()
            .init_resource::<pool::PopupPool>()
            .add_systems(Startup, pool::init_pools);

        app.add_message::<messages::SpawnTrailRequest>()
            .add_message::<messages::SpawnProjectileRequest>()
            .add_message::<messages::BulletImpact>()
            .add_message::<messages::DamagePopupRequest>();

        // Update-phase pipeline: produce -> allocate
        app.add_systems(
            Update,
            (
                projectile::fire_special_weapons,
                allocator::allocate_trails_from_pool.after(fire_weapons),
                allocator::allocate_projectiles_from_pool
                    .after(projectile::fire_special_weapons),
                allocator::allocate_popups_from_pool,
            )
                .run_if(in_state(GameState::InGame)),
        );

        // Fixed travel pipeline
        app.add_systems(
            FixedUpdate,
            (
                trail::advance_trails,
                projectile::projectile_lifetime,
                popup::animate_popups,
            )
                .run_if(in_state(GameState::InGame)),
        );

        // Fixed resolve pipeline: contacts -> impacts -> commits
        app.add_systems(
            FixedPostUpdate,
            (
                projectile::process_projectile_collisions.after(CollisionEventSystems),
                impact::resolve_impacts.after(projectile::process_projectile_collisions),
                (
                    commit::commit_trail_returns,
                    commit::commit_projectile_returns,
                    commit::commit_popup_returns,
                )
                    .after(impact::resolve_impacts),
            )
                .run_if(in_state(GameState::InGame)),
        );
    }
}
