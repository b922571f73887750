//! Helpers для unit-тестов с полным App.

use bevy::prelude::*;

use crate::{create_headless_app, SimulationPlugin};

/// Все события типа `E`, записанные за время теста.
#[derive(Resource)]
pub struct Recorded<E: Event + Clone>(pub Vec<E>);

impl<E: Event + Clone> Default for Recorded<E> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

fn record<E: Event + Clone>(mut reader: EventReader<E>, mut recorded: ResMut<Recorded<E>>) {
    recorded.0.extend(reader.read().cloned());
}

/// Подписать recorder на `E` (в FixedPostUpdate, после всех фаз тика).
pub fn record_events<E: Event + Clone>(app: &mut App) {
    app.init_resource::<Recorded<E>>()
        .add_systems(FixedPostUpdate, record::<E>);
}

pub fn recorded<E: Event + Clone>(app: &App) -> Vec<E> {
    app.world()
        .get_resource::<Recorded<E>>()
        .map(|r| r.0.clone())
        .unwrap_or_default()
}

/// Полная симуляция без rapier; первый (нулевой) update уже выполнен.
pub fn sim_app(seed: u64) -> App {
    let mut app = create_headless_app(seed);
    app.add_plugins(SimulationPlugin);
    app.update();
    app
}

pub fn run_ticks(app: &mut App, ticks: usize) {
    for _ in 0..ticks {
        app.update();
    }
}
