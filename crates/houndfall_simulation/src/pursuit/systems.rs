//! Pursuit controller system
//!
//! Единственное место, где мутируется ChaseMachine: все входные события
//! собираются в упорядоченную очередь PursuitEvent и скармливаются машине
//! по одному, действия исполняются сразу. Порядок внутри тика:
//! команды → смерти → уходы с карт → FOV → range → шаги движения → таймер.

use bevy::prelude::*;

use crate::components::{planar_distance, Actor, Health, MapMembership, MovementCommand};
use crate::lifecycle::{EntityDied, MapLeft};
use crate::movement::Moved;
use crate::perception::{FovEvent, VisibleEntities};
use crate::proximity::{ProximityWatches, RangeEvent};
use crate::pursuit::components::Chaser;
use crate::pursuit::events::{ChaseCommand, ChaseContinued, ChaseStarted};
use crate::pursuit::machine::{FovCandidate, MachineContext, PursuitAction, PursuitEvent};

/// Система: pursuit controller (FixedUpdate, после perception/proximity)
pub fn drive_pursuit(
    time: Res<Time<Fixed>>,
    mut watches: ResMut<ProximityWatches>,
    mut chasers: Query<(
        Entity,
        &mut Chaser,
        &Actor,
        &Health,
        &MapMembership,
        &VisibleEntities,
        &mut MovementCommand,
    )>,
    actors: Query<(&Actor, &Health, &MapMembership)>,
    transforms: Query<&Transform>,
    mut chase_commands: EventReader<ChaseCommand>,
    mut deaths: EventReader<EntityDied>,
    mut map_exits: EventReader<MapLeft>,
    mut fov_events: EventReader<FovEvent>,
    mut range_events: EventReader<RangeEvent>,
    mut steps: EventReader<Moved>,
    mut started: EventWriter<ChaseStarted>,
    mut continued: EventWriter<ChaseContinued>,
) {
    // Каждый controller видит весь поток, поэтому снимаем события в Vec
    let chase_commands: Vec<ChaseCommand> = chase_commands.read().cloned().collect();
    let deaths: Vec<EntityDied> = deaths.read().cloned().collect();
    let map_exits: Vec<MapLeft> = map_exits.read().cloned().collect();
    let fov_events: Vec<FovEvent> = fov_events.read().cloned().collect();
    let range_events: Vec<RangeEvent> = range_events.read().cloned().collect();
    let steps: Vec<Moved> = steps.read().cloned().collect();

    for (chaser_entity, mut chaser, actor, health, membership, visible, mut movement) in
        chasers.iter_mut()
    {
        // FOV снапшот с фракциями: retarget scan работает по нему
        let candidates: Vec<FovCandidate> = visible
            .entities
            .iter()
            .filter_map(|&entity| {
                actors
                    .get(entity)
                    .ok()
                    .map(|(candidate_actor, _, _)| FovCandidate {
                        entity,
                        faction_id: candidate_actor.faction_id,
                    })
            })
            .collect();

        let mut queue: Vec<PursuitEvent> = Vec::new();

        for command in &chase_commands {
            match *command {
                ChaseCommand::Start { chaser: recipient } if recipient == chaser_entity => {
                    queue.push(PursuitEvent::StartRequested);
                }
                ChaseCommand::Stop { chaser: recipient } if recipient == chaser_entity => {
                    queue.push(PursuitEvent::StopRequested);
                }
                ChaseCommand::SetStopDistance {
                    chaser: recipient,
                    distance,
                } if recipient == chaser_entity => {
                    // Чистая установка значения, машину не трогаем
                    chaser.set_stop_distance(distance);
                }
                _ => {}
            }
        }

        for death in &deaths {
            queue.push(PursuitEvent::Died {
                entity: death.entity,
            });
        }

        for exit in &map_exits {
            queue.push(PursuitEvent::LeftMap {
                entity: exit.entity,
                new_map: exit.new_map,
            });
        }

        for event in &fov_events {
            match *event {
                FovEvent::Entered { observer, entity } if observer == chaser_entity => {
                    // Без Actor у кандидата враждебность не определить
                    if let Ok((candidate_actor, _, _)) = actors.get(entity) {
                        queue.push(PursuitEvent::EnteredFov {
                            entity,
                            faction_id: candidate_actor.faction_id,
                        });
                    }
                }
                FovEvent::Left { observer, entity } if observer == chaser_entity => {
                    queue.push(PursuitEvent::LeftFov {
                        entity,
                        faction_id: actors
                            .get(entity)
                            .ok()
                            .map(|(departed_actor, _, _)| departed_actor.faction_id),
                    });
                }
                _ => {}
            }
        }

        for event in &range_events {
            match *event {
                RangeEvent::Entered {
                    watched, watching, ..
                } if watching == chaser_entity => {
                    queue.push(PursuitEvent::EnteredStopRange { watched, watching });
                }
                RangeEvent::Left {
                    watched, watching, ..
                } if watching == chaser_entity => {
                    queue.push(PursuitEvent::LeftStopRange { watched, watching });
                }
                _ => {}
            }
        }

        for step in &steps {
            if step.entity == chaser_entity {
                queue.push(PursuitEvent::Stepped);
            }
        }

        chaser.timer.tick(time.delta());
        for _ in 0..chaser.timer.times_finished_this_tick() {
            queue.push(PursuitEvent::ChaseTick);
        }

        for event in queue {
            // Контекст пересобираем на каждое событие: привязка могла
            // смениться предыдущим событием этого же тика
            let target_valid = chaser
                .machine
                .state
                .target()
                .map(|target| {
                    actors
                        .get(target)
                        .map(|(_, target_health, target_membership)| {
                            target_health.is_alive() && target_membership.is_on_map()
                        })
                        .unwrap_or(false)
                })
                .unwrap_or(false);

            let ctx = MachineContext {
                controlled: chaser_entity,
                faction_id: actor.faction_id,
                self_valid: health.is_alive() && membership.is_on_map(),
                target_valid,
                visible: &candidates,
            };

            let actions = chaser.machine.handle(&event, &ctx);

            for action in actions {
                match action {
                    PursuitAction::MoveTowardTarget { target } => {
                        // Intent всегда к ТЕКУЩЕЙ позиции цели
                        if let Ok(target_transform) = transforms.get(target) {
                            *movement = MovementCommand::MoveToPosition {
                                target: target_transform.translation,
                            };
                        }
                    }

                    PursuitAction::HaltMovement => {
                        *movement = MovementCommand::Stop;
                    }

                    PursuitAction::WatchStopRange { target } => {
                        watches.watch(target, chaser_entity, chaser.stop_distance());
                    }

                    PursuitAction::UnwatchStopRange { target } => {
                        watches.unwatch(target, chaser_entity);
                    }

                    PursuitAction::StartChaseTimer => {
                        let interval = chaser.chase_interval;
                        chaser.timer.set_duration(interval);
                        chaser.timer.reset();
                        chaser.timer.unpause();
                    }

                    PursuitAction::StopChaseTimer => {
                        chaser.timer.pause();
                    }

                    PursuitAction::NotifyChaseStarted { target } => {
                        if let (Ok(own_transform), Ok(target_transform)) =
                            (transforms.get(chaser_entity), transforms.get(target))
                        {
                            let distance = planar_distance(
                                own_transform.translation,
                                target_transform.translation,
                            );
                            crate::logger::log(&format!(
                                "🏃 {:?} chase started → {:?} (distance {:.1})",
                                chaser_entity, target, distance
                            ));
                            started.write(ChaseStarted {
                                chaser: chaser_entity,
                                target,
                                distance,
                            });
                        }
                    }

                    PursuitAction::NotifyChaseContinued { target } => {
                        if let (Ok(own_transform), Ok(target_transform)) =
                            (transforms.get(chaser_entity), transforms.get(target))
                        {
                            continued.write(ChaseContinued {
                                chaser: chaser_entity,
                                target,
                                distance: planar_distance(
                                    own_transform.translation,
                                    target_transform.translation,
                                ),
                            });
                        }
                    }
                }
            }
        }
    }
}
