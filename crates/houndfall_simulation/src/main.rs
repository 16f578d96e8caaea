//! Headless демо HOUNDFALL
//!
//! Запускает Bevy App без рендера: hunter замечает жертву, гонится,
//! встаёт на stop distance. Время двигаем вручную фиксированными шагами.

use std::time::Duration;

use bevy::prelude::*;
use houndfall_simulation::*;

fn main() {
    println!("Starting HOUNDFALL headless simulation");

    let mut app = create_headless_app();
    app.add_plugins(SimulationPlugin);
    app.update(); // инициализация schedules

    let hunter = app
        .world_mut()
        .spawn((
            Transform::from_translation(Vec3::new(0.0, 0.0, 0.0)),
            Actor { faction_id: 1 },
            MapMembership::on(MapId(1)),
            Chaser::new(100.0),
            FieldOfView { radius: 600.0 },
            VisibleEntities::default(),
            MovementCommand::Idle,
            MovementSpeed { speed: 50.0 },
        ))
        .id();

    app.world_mut().spawn((
        Transform::from_translation(Vec3::new(500.0, 0.0, 0.0)),
        Actor { faction_id: 2 },
        MapMembership::on(MapId(1)),
    ));

    // 600 тиков по 50ms == 30 секунд симуляции
    for tick in 0..600 {
        app.world_mut()
            .resource_mut::<Time<Fixed>>()
            .advance_by(Duration::from_millis(50));
        app.world_mut().run_schedule(FixedUpdate);

        if tick % 100 == 0 {
            let state = app
                .world()
                .get::<Chaser>(hunter)
                .map(|chaser| chaser.machine.state);
            let position = app
                .world()
                .get::<Transform>(hunter)
                .map(|transform| transform.translation);
            println!("Tick {}: hunter {:?} at {:?}", tick, state, position);
        }
    }

    println!("Simulation complete!");
}
