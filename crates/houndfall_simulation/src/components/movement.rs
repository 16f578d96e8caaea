//! Movement компоненты: команды перемещения, скорость

use bevy::prelude::*;

/// Команда движения для актора (выполняется movement::apply_movement)
///
/// Архитектура:
/// - Pursuit controller пишет MovementCommand (high-level intent)
/// - movement система читает и кинематически двигает Transform
/// - За каждый выполненный шаг генерируется Moved event
#[derive(Component, Debug, Clone, PartialEq)]
pub enum MovementCommand {
    /// Стоять на месте (нет активного intent)
    Idle,
    /// Двигаться к позиции (world coordinates, XY plane)
    MoveToPosition { target: Vec3 },
    /// Остановиться немедленно (stop-on-demand, сбрасывается в Idle)
    Stop,
}

impl Default for MovementCommand {
    fn default() -> Self {
        Self::Idle
    }
}

/// Скорость движения актора (units/сек)
#[derive(Component, Clone, Copy, Debug, Reflect)]
#[reflect(Component)]
pub struct MovementSpeed {
    pub speed: f32,
}

impl Default for MovementSpeed {
    fn default() -> Self {
        Self { speed: 2.0 } // базовая скорость ходьбы
    }
}
