//! Field-of-View detector
//!
//! Каждый observer с FieldOfView хранит снапшот видимых entity
//! (VisibleEntities) и на каждом тике диффит его с текущим occupant set:
//! пересечение границы радиуса → FovEvent::Entered / FovEvent::Left.
//! Hostility здесь НЕ проверяется — это забота pursuit controller.

use bevy::prelude::*;

use crate::components::{planar_distance, Actor, Health, MapMembership};

/// Радиус восприятия observer'а
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct FieldOfView {
    pub radius: f32,
}

impl Default for FieldOfView {
    fn default() -> Self {
        Self { radius: 300.0 }
    }
}

/// Снапшот entity, видимых observer'ом на текущем тике
///
/// Порядок — порядок обнаружения; retarget scan в pursuit идёт по нему.
#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
pub struct VisibleEntities {
    pub entities: Vec<Entity>,
}

/// Событие: entity пересёк границу FOV observer'а
#[derive(Event, Debug, Clone)]
pub enum FovEvent {
    Entered { observer: Entity, entity: Entity },
    Left { observer: Entity, entity: Entity },
}

/// Система: диффим occupant set против VisibleEntities снапшота
///
/// Кандидат видим если: не сам observer, жив, на той же карте, в радиусе.
/// Мёртвый или detached observer не видит никого — его снапшот пустеет
/// и для каждого бывшего occupant'а уходит FovEvent::Left.
pub fn detect_fov_transitions(
    mut observers: Query<(
        Entity,
        &FieldOfView,
        &mut VisibleEntities,
        &Transform,
        &MapMembership,
        &Health,
    )>,
    candidates: Query<(Entity, &Transform, &MapMembership, &Health), With<Actor>>,
    mut events: EventWriter<FovEvent>,
) {
    for (observer, fov, mut visible, transform, membership, health) in observers.iter_mut() {
        let mut now_visible: Vec<Entity> = Vec::new();

        if health.is_alive() && membership.is_on_map() {
            for (candidate, candidate_transform, candidate_membership, candidate_health) in
                candidates.iter()
            {
                if candidate == observer {
                    continue;
                }
                if !candidate_health.is_alive() {
                    continue;
                }
                if candidate_membership.map != membership.map {
                    continue;
                }
                if planar_distance(transform.translation, candidate_transform.translation)
                    > fov.radius
                {
                    continue;
                }
                now_visible.push(candidate);
            }
        }

        // Left раньше Entered: retarget по уходу цели должен видеть
        // новоприбывших в снапшоте этого же тика
        for &entity in visible.entities.iter() {
            if !now_visible.contains(&entity) {
                events.write(FovEvent::Left { observer, entity });
            }
        }
        for &entity in now_visible.iter() {
            if !visible.entities.contains(&entity) {
                events.write(FovEvent::Entered { observer, entity });
                crate::logger::log(&format!("👁️ {:?} spotted {:?}", observer, entity));
            }
        }

        visible.entities = now_visible;
    }
}
