//! Floating damage readout lifecycle.

use bevy::prelude::*;

use super::components::{DamagePopup, PoolState, PooledPopup};

pub const POPUP_DURATION: f32 = 1.0;
const RISE_SPEED: f32 = 40.0;

/// Rise, then mark for return once the display window ends.
pub fn animate_popups(
    time: Res<Time<Fixed>>,
    mut q: Query<(&mut PoolState, &mut DamagePopup, &mut Transform), With<PooledPopup>>,
) {
    for (mut state, mut popup, mut tf) in &mut q {
        if *state != PoolState::Active {
            continue;
        }

        tf.translation.y += RISE_SPEED * time.delta_secs();

        popup.timer.tick(time.delta());
        if popup.timer.is_finished() {
            *state = PoolState::PendingReturn;
        }
    }
}
