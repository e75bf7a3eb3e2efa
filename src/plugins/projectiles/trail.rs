//! Trail travel: the frame-resumable part of a shot.
//!
//! The original expressed this as a coroutine per shot; here it is explicit
//! per-instance progress advanced by one "tick all active trails" pass.
//! Cancellation is just a state flip: an instance flipped away from
//! `Flying` never advances again.

use bevy::prelude::*;

use super::components::{PooledTrail, Trail, TrailState};
use super::messages::BulletImpact;

/// Advance all flying trails by one fixed tick; hold finished trails
/// visible until their hold timer runs out.
pub fn advance_trails(
    time: Res<Time<Fixed>>,
    mut impacts: MessageWriter<BulletImpact>,
    mut q: Query<(&mut TrailState, &mut Trail, &mut Transform), With<PooledTrail>>,
) {
    let dt = time.delta_secs();

    for (mut state, mut trail, mut tf) in &mut q {
        match *state {
            TrailState::Flying => {
                trail.remaining -= trail.speed * dt;

                if trail.remaining <= 0.0 {
                    // Arrived: snap to the endpoint and resolve the carried
                    // impact exactly once (the record is taken, so a second
                    // pass cannot re-emit it).
                    trail.remaining = 0.0;
                    tf.translation = trail.end.extend(tf.translation.z);

                    if let Some(record) = trail.impact.take() {
                        impacts.write(BulletImpact(record));
                    }

                    trail.hold.reset();
                    *state = TrailState::Holding;
                } else {
                    tf.translation = trail.position().extend(tf.translation.z);
                }
            }
            TrailState::Holding => {
                trail.hold.tick(time.delta());
                if trail.hold.is_finished() {
                    *state = TrailState::PendingReturn;
                }
            }
            TrailState::Inactive | TrailState::PendingReturn => {}
        }
    }
}
