//! Pursuit controller компонент

use bevy::prelude::*;
use std::time::Duration;

use crate::pursuit::machine::ChaseMachine;

/// Интервал re-evaluation по умолчанию; вынесен в параметр,
/// магический литерал в контроллере ничем не мотивирован
pub const DEFAULT_CHASE_INTERVAL: Duration = Duration::from_millis(2000);

/// Дистанция остановки по умолчанию
pub const DEFAULT_STOP_DISTANCE: f32 = 100.0;

/// Pursuit controller: вешается на controlled entity вместе с Actor,
/// FieldOfView, VisibleEntities, MovementCommand и MovementSpeed.
/// Привязка 1:1 на всё время жизни entity; despawn уносит controller
/// вместе с его FOV/movement состоянием.
#[derive(Component, Debug, Clone)]
pub struct Chaser {
    /// Машина состояний погони
    pub machine: ChaseMachine,
    /// Период re-evaluation тика
    pub chase_interval: Duration,
    /// Таймер тика; запускается/останавливается действиями машины
    pub timer: Timer,
    stop_distance: f32,
}

impl Default for Chaser {
    fn default() -> Self {
        Self::new(DEFAULT_STOP_DISTANCE)
    }
}

impl Chaser {
    pub fn new(stop_distance: f32) -> Self {
        let mut timer = Timer::new(DEFAULT_CHASE_INTERVAL, TimerMode::Repeating);
        timer.pause(); // до первой привязки цели тик не нужен
        Self {
            machine: ChaseMachine::default(),
            chase_interval: DEFAULT_CHASE_INTERVAL,
            timer,
            stop_distance,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.chase_interval = interval;
        self
    }

    pub fn stop_distance(&self) -> f32 {
        self.stop_distance
    }

    /// Меняет stop distance для БУДУЩИХ привязок. Уже зарегистрированный
    /// watch сохраняет старый порог до перезапуска погони — текущее
    /// поведение, а не оплошность.
    pub fn set_stop_distance(&mut self, distance: f32) {
        self.stop_distance = distance;
    }
}
