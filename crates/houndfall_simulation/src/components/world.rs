//! World positioning компоненты: MapId, MapMembership

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Идентификатор карты (stable, для saves/sync)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect, Serialize, Deserialize)]
pub struct MapId(pub u32);

/// Принадлежность актора карте
///
/// `map == None` означает "вне всех карт" (detached) — актор в этом
/// состоянии невидим для perception и невалиден как цель погони.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub struct MapMembership {
    pub map: Option<MapId>,
}

impl MapMembership {
    pub fn on(map: MapId) -> Self {
        Self { map: Some(map) }
    }

    pub fn detached() -> Self {
        Self { map: None }
    }

    pub fn is_on_map(&self) -> bool {
        self.map.is_some()
    }
}

/// Дистанция в игровой плоскости (XY) — мир двумерный, Z игнорируем
pub fn planar_distance(a: Vec3, b: Vec3) -> f32 {
    a.truncate().distance(b.truncate())
}
