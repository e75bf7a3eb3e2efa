//! Integration test harness.
//!
//! Keeps integration tests headless and deterministic:
//! - `MinimalPlugins` provides the core ECS runtime, no window or renderer.
//! - time is stepped manually at 60 Hz so every `app.update()` advances
//!   exactly one fixed tick.
//! - `ButtonInput` resources are inserted without the clearing systems, so a
//!   test owns `just_pressed` until it clears it.

#![allow(dead_code)]

use std::time::Duration;

use bevy::asset::AssetPlugin;
use bevy::prelude::*;
use bevy::scene::ScenePlugin;
use bevy::state::app::StatesPlugin;
use bevy::time::TimeUpdateStrategy;

use topdown_shooter::common::tunables::Tunables;

pub fn app_headless() -> App {
    let mut app = App::new();

    app.add_plugins((
        MinimalPlugins,
        StatesPlugin,
        AssetPlugin::default(),
        ScenePlugin,
    ));

    app.init_resource::<ButtonInput<KeyCode>>();
    app.init_resource::<ButtonInput<MouseButton>>();

    topdown_shooter::game::configure_headless(&mut app);

    app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_micros(
        16_667,
    )));
    app.insert_resource(Time::<Fixed>::from_hz(60.0));

    // `app.update()` alone never runs `Plugin::finish`; avian registers its
    // diagnostics resources there, so finish the app before tests tick it.
    app.finish();
    app.cleanup();

    app
}

/// Clear the wave tables so no enemies spawn; flow tests place their own
/// actors.
pub fn disable_waves(app: &mut App) {
    let mut tunables = app.world_mut().resource_mut::<Tunables>();
    tunables.cyborg_spawn_count = Vec::new();
    tunables.turret_spawn_count = Vec::new();
}

pub fn tick(app: &mut App, frames: usize) {
    for _ in 0..frames {
        app.update();
    }
}
