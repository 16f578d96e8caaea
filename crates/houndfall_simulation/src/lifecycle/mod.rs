//! Lifecycle события: смерть и смена карты
//!
//! Оба события broadcast — pursuit controller фильтрует их по identity
//! (controlled entity или текущий target).

use bevy::prelude::*;
use std::collections::HashMap;

use crate::components::{Health, MapId, MapMembership};

/// Событие: entity умер (health == 0)
#[derive(Event, Debug, Clone)]
pub struct EntityDied {
    pub entity: Entity,
}

/// Событие: entity покинул карту
///
/// `new_map == None` означает уход "в никуда" (detach) — для погони это
/// терминальное состояние; переход на другую карту им не является.
#[derive(Event, Debug, Clone)]
pub struct MapLeft {
    pub entity: Entity,
    pub new_map: Option<MapId>,
}

/// Компонент-маркер: entity мертв (Health == 0)
///
/// Деспавн не автоматический — трупы остаются на месте, но AI и движение
/// для них отключены.
#[derive(Component, Debug)]
pub struct Dead;

/// Система: обнаружение смерти → Dead marker + EntityDied event
pub fn detect_deaths(
    mut commands: Commands,
    query: Query<(Entity, &Health), (Changed<Health>, Without<Dead>)>,
    mut deaths: EventWriter<EntityDied>,
) {
    for (entity, health) in query.iter() {
        if !health.is_alive() {
            commands.entity(entity).insert(Dead);
            deaths.write(EntityDied { entity });
            crate::logger::log(&format!("💀 {:?} died", entity));
        }
    }
}

/// Система: отслеживание смены карты → MapLeft event
///
/// MapMembership мутируется извне (teleport, zone transition), поэтому
/// сравниваем с снапшотом прошлого тика вместо Changed-фильтра: событию
/// нужно старое значение, а не факт изменения.
pub fn track_map_transitions(
    query: Query<(Entity, &MapMembership)>,
    mut previous: Local<HashMap<Entity, Option<MapId>>>,
    mut exits: EventWriter<MapLeft>,
) {
    let mut current: HashMap<Entity, Option<MapId>> = HashMap::with_capacity(previous.len());

    for (entity, membership) in query.iter() {
        if let Some(&prev) = previous.get(&entity) {
            if prev.is_some() && prev != membership.map {
                exits.write(MapLeft {
                    entity,
                    new_map: membership.map,
                });
                crate::logger::log(&format!(
                    "🗺️ {:?} left map {:?} → {:?}",
                    entity, prev, membership.map
                ));
            }
        }
        current.insert(entity, membership.map);
    }

    *previous = current;
}
