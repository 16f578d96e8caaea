//! Shared Proximity Watcher
//!
//! Реестр пар (watched, watching, threshold), общий для всех controllers
//! на карте. На каждом тике проверяет пересечение порога в обе стороны и
//! генерирует RangeEvent. Регистрация/снятие идемпотентны.

use bevy::prelude::*;

use crate::components::planar_distance;

#[derive(Debug, Clone, Copy)]
struct ProximityWatch {
    watched: Entity,
    watching: Entity,
    threshold: f32,
    /// edge state: внутри ли пара порога на последней проверке
    inside: bool,
}

/// Реестр proximity watches (Resource, shared)
#[derive(Resource, Debug, Default)]
pub struct ProximityWatches {
    entries: Vec<ProximityWatch>,
}

impl ProximityWatches {
    /// Регистрирует watch для пары. Повторная регистрация заменяет
    /// существующую запись и сбрасывает edge state (свежая погоня должна
    /// получить Entered даже если пара уже внутри порога).
    pub fn watch(&mut self, watched: Entity, watching: Entity, threshold: f32) {
        self.entries
            .retain(|w| !(w.watched == watched && w.watching == watching));
        self.entries.push(ProximityWatch {
            watched,
            watching,
            threshold,
            inside: false,
        });
    }

    /// Снимает watch пары; отсутствующая пара — no-op.
    pub fn unwatch(&mut self, watched: Entity, watching: Entity) {
        self.entries
            .retain(|w| !(w.watched == watched && w.watching == watching));
    }

    pub fn is_watched(&self, watched: Entity, watching: Entity) -> bool {
        self.entries
            .iter()
            .any(|w| w.watched == watched && w.watching == watching)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Событие: пара пересекла threshold distance
#[derive(Event, Debug, Clone)]
pub enum RangeEvent {
    Entered {
        watched: Entity,
        watching: Entity,
        distance: f32,
    },
    Left {
        watched: Entity,
        watching: Entity,
        distance: f32,
    },
}

/// Система: проверка всех watches, генерация RangeEvent на пересечениях
pub fn watch_proximity(
    mut watches: ResMut<ProximityWatches>,
    transforms: Query<&Transform>,
    mut events: EventWriter<RangeEvent>,
) {
    // Despawned участники — запись больше не имеет смысла
    watches
        .entries
        .retain(|w| transforms.contains(w.watched) && transforms.contains(w.watching));

    for watch in watches.entries.iter_mut() {
        let (Ok(watched_transform), Ok(watching_transform)) =
            (transforms.get(watch.watched), transforms.get(watch.watching))
        else {
            continue;
        };

        let distance = planar_distance(
            watched_transform.translation,
            watching_transform.translation,
        );

        if !watch.inside && distance <= watch.threshold {
            watch.inside = true;
            events.write(RangeEvent::Entered {
                watched: watch.watched,
                watching: watch.watching,
                distance,
            });
        } else if watch.inside && distance > watch.threshold {
            watch.inside = false;
            events.write(RangeEvent::Left {
                watched: watch.watched,
                watching: watch.watching,
                distance,
            });
        }
    }
}
