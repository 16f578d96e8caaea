//! Pursuit события: команды внутрь, chase-progress наружу

use bevy::prelude::*;

/// Команды controller'у
///
/// Идут через общую событийную очередь и обрабатываются первыми в тике,
/// так что Stop гарантированно отрабатывает раньше любых событий того же
/// тика для снятой привязки.
#[derive(Event, Debug, Clone)]
pub enum ChaseCommand {
    /// Реагировать на врагов, входящих в FOV
    Start { chaser: Entity },
    /// Прекратить погоню немедленно и игнорировать будущие FOV-входы
    Stop { chaser: Entity },
    /// Новый stop distance (применится со следующей привязки цели)
    SetStopDistance { chaser: Entity, distance: f32 },
}

/// Событие: погоня началась (для UI/telemetry)
#[derive(Event, Debug, Clone)]
pub struct ChaseStarted {
    pub chaser: Entity,
    pub target: Entity,
    pub distance: f32,
}

/// Событие: очередной шаг погони, с живой дистанцией до цели
#[derive(Event, Debug, Clone)]
pub struct ChaseContinued {
    pub chaser: Entity,
    pub target: Entity,
    pub distance: f32,
}
