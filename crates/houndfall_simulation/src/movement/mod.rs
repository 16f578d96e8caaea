//! Movement Intent Service
//!
//! Кинематическое исполнение MovementCommand в плоскости XY: двигаем
//! Transform к target с MovementSpeed, за каждый выполненный шаг —
//! Moved event (per-step completion для chase-progress notifications).
//! Obstacle avoidance вне скоупа: прямая линия к цели.

use bevy::prelude::*;

use crate::components::{MovementCommand, MovementSpeed};
use crate::lifecycle::Dead;

/// Событие: актор сделал шаг к своей target позиции
#[derive(Event, Debug, Clone)]
pub struct Moved {
    pub entity: Entity,
}

/// Система: исполнение движения (FixedUpdate)
///
/// Stop сбрасывает команду немедленно, без шага. Достижение цели
/// переводит команду в Idle; pursuit controller переиздаёт intent на
/// следующем chase-тике. Мёртвые не двигаются.
pub fn apply_movement(
    time: Res<Time<Fixed>>,
    mut movers: Query<
        (Entity, &mut Transform, &mut MovementCommand, &MovementSpeed),
        Without<Dead>,
    >,
    mut moved: EventWriter<Moved>,
) {
    let delta = time.delta_secs();

    for (entity, mut transform, mut command, speed) in movers.iter_mut() {
        match *command {
            MovementCommand::Idle => {}

            MovementCommand::Stop => {
                *command = MovementCommand::Idle;
            }

            MovementCommand::MoveToPosition { target } => {
                let to_target = (target - transform.translation).truncate();
                let distance = to_target.length();
                if distance <= f32::EPSILON {
                    *command = MovementCommand::Idle;
                    continue;
                }

                let step = speed.speed * delta;
                if distance <= step {
                    // Дошли — снап на цель
                    transform.translation.x = target.x;
                    transform.translation.y = target.y;
                    *command = MovementCommand::Idle;
                } else {
                    let direction = to_target / distance;
                    transform.translation.x += direction.x * step;
                    transform.translation.y += direction.y * step;
                }

                moved.write(Moved { entity });
            }
        }
    }
}
