//! ECS Components для игровых entity
//!
//! Организация по доменам:
//! - actor: базовые характеристики (faction, health)
//! - movement: команды перемещения (MovementCommand, MovementSpeed)
//! - world: позиционирование в мире (MapId, MapMembership)

pub mod actor;
pub mod movement;
pub mod world;

// Re-exports для удобного импорта
pub use actor::*;
pub use movement::*;
pub use world::*;
