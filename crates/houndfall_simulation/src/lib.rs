//! HOUNDFALL Simulation Core
//!
//! Headless ECS-симуляция погони на Bevy 0.16 (strategic layer).
//! Ядро — pursuit controller: реактивная машина состояний, сводящая
//! perception (FOV), proximity (stop range), таймер re-evaluation и
//! lifecycle (смерть, уход с карты) в один консистентный pursuit state.
//!
//! Рендер, звук, экипировка и снаряды — внешние слои; сюда они входят
//! только событиями/компонентами.

use bevy::prelude::*;

// Публичные модули
pub mod components;
pub mod lifecycle;
pub mod logger;
pub mod movement;
pub mod perception;
pub mod proximity;
pub mod pursuit;

// Re-export базовых типов для удобства
pub use components::*;
pub use lifecycle::{Dead, EntityDied, MapLeft};
pub use movement::Moved;
pub use perception::{FieldOfView, FovEvent, VisibleEntities};
pub use proximity::{ProximityWatches, RangeEvent};
pub use pursuit::{
    ChaseCommand, ChaseContinued, ChaseMachine, ChaseStarted, Chaser, PursuitState,
    DEFAULT_CHASE_INTERVAL, DEFAULT_STOP_DISTANCE,
};

/// Главный plugin симуляции
///
/// Все системы в FixedUpdate одной явной цепочкой — порядок доставки
/// событий за тик и есть гарантия консистентности машины:
/// 1. lifecycle::detect_deaths — Health → EntityDied + Dead
/// 2. lifecycle::track_map_transitions — MapMembership → MapLeft
/// 3. perception::detect_fov_transitions — FOV диффы → FovEvent
/// 4. proximity::watch_proximity — watch registry → RangeEvent
/// 5. pursuit::drive_pursuit — машина состояний + исполнение действий
/// 6. movement::apply_movement — intents → Transform + Moved
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app
            // Fixed timestep 60Hz для simulation tick
            .insert_resource(Time::<Fixed>::from_hz(60.0))
            .init_resource::<ProximityWatches>()
            .add_event::<EntityDied>()
            .add_event::<MapLeft>()
            .add_event::<FovEvent>()
            .add_event::<RangeEvent>()
            .add_event::<Moved>()
            .add_event::<ChaseCommand>()
            .add_event::<ChaseStarted>()
            .add_event::<ChaseContinued>()
            .add_systems(
                FixedUpdate,
                (
                    lifecycle::detect_deaths,
                    lifecycle::track_map_transitions,
                    perception::detect_fov_transitions,
                    proximity::watch_proximity,
                    pursuit::drive_pursuit,
                    movement::apply_movement,
                )
                    .chain(), // Последовательное выполнение: порядок = контракт
            );
    }
}

/// Создаёт minimal Bevy App для headless симуляции
pub fn create_headless_app() -> App {
    let mut app = App::new();
    logger::init_logger();
    app.add_plugins(MinimalPlugins)
        .insert_resource(Time::<Fixed>::from_hz(60.0)); // 60Hz FixedUpdate

    app
}
