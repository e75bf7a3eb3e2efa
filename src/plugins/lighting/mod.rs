//! Lighting plugin (render-only).
//!
//! Firefly gives the arena its look: one warm lamp carried by the player,
//! with enemy bodies casting shadows (they spawn with `Occluder2d`).

use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;
use bevy_firefly::prelude::*;

use crate::common::state::GameState;
use crate::plugins::player::Player;
use crate::plugins::world::ARENA_HALF_EXTENT;

/// The lamp trails the player a touch instead of snapping, so a dodge reads
/// as movement through the light.
#[derive(Component)]
pub struct PlayerLight {
    pub trailing: f32,
}

pub fn plugin(app: &mut App) {
    if !app.is_plugin_added::<FireflyPlugin>() {
        app.add_plugins(FireflyPlugin);
    }

    app.add_systems(OnEnter(GameState::InGame), setup).add_systems(
        Update,
        follow_player_light.run_if(in_state(GameState::InGame)),
    );
}

fn setup(mut commands: Commands) {
    commands.spawn((
        Name::new("PlayerLight"),
        PlayerLight { trailing: 8.0 },
        PointLight2d {
            color: Color::srgb(0.95, 0.82, 0.6),
            radius: ARENA_HALF_EXTENT * 0.6,
            ..default()
        },
        Transform::from_xyz(0.0, 0.0, 10.0),
        DespawnOnExit(GameState::InGame),
    ));
}

fn follow_player_light(
    time: Res<Time>,
    q_player: Query<&Transform, (With<Player>, Without<PlayerLight>)>,
    mut q_light: Query<(&mut Transform, &PlayerLight), Without<Player>>,
) {
    let Ok(tf_player) = q_player.single() else {
        return;
    };
    let Ok((mut tf_light, light)) = q_light.single_mut() else {
        return;
    };

    let alpha = (light.trailing * time.delta_secs()).min(1.0);
    let next = tf_light
        .translation
        .truncate()
        .lerp(tf_player.translation.truncate(), alpha);
    tf_light.translation.x = next.x;
    tf_light.translation.y = next.y;
}
