use bevy::prelude::*;

use crate::common::rng::GameRng;
use crate::common::tunables::Tunables;
use crate::plugins::core;

#[test]
fn inserts_resources() {
    let mut app = App::new();
    core::plugin(&mut app);
    assert!(app.world().get_resource::<Tunables>().is_some());
    assert!(app.world().get_resource::<GameRng>().is_some());
    assert!(app.world().get_resource::<ClearColor>().is_some());
}

#[test]
fn seeded_rng_is_reproducible() {
    let mut a = GameRng::new(7);
    let mut b = GameRng::new(7);

    for _ in 0..32 {
        assert_eq!(a.unit(), b.unit());
        assert_eq!(a.symmetric(0.5), b.symmetric(0.5));
    }
}

#[test]
fn wave_counts_repeat_the_last_entry() {
    let counts = [2, 4, 6];

    assert_eq!(Tunables::wave_count(&counts, 0), 2);
    assert_eq!(Tunables::wave_count(&counts, 2), 6);
    assert_eq!(Tunables::wave_count(&counts, 9), 6);
    assert_eq!(Tunables::wave_count(&[], 0), 0);
}
