//! Pursuit state machine
//!
//! Все источники (perception, proximity, timer, lifecycle, команды)
//! сведены в один tagged event enum — PursuitEvent. ChaseMachine чисто
//! вычисляет переход и возвращает список PursuitAction; side effects
//! (movement intents, watch registry, таймер, notifications) исполняет
//! systems::drive_pursuit. Это делает transition table тестируемой без App.

use bevy::prelude::*;

use crate::components::MapId;

/// Режим погони
///
/// Target живёт внутри варианта: "Idle ⟺ цель не привязана" и
/// "максимум одна цель" выполняются по построению.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PursuitState {
    /// Нет цели, ждём входа врага в FOV
    #[default]
    Idle,
    /// Активно движемся к цели
    Chasing { target: Entity },
    /// Цель в пределах stop distance: стоим, но цель держим
    Paused { target: Entity },
}

impl PursuitState {
    pub fn target(&self) -> Option<Entity> {
        match self {
            PursuitState::Idle => None,
            PursuitState::Chasing { target } | PursuitState::Paused { target } => Some(*target),
        }
    }
}

/// Входное событие машины (в порядке доставки за тик)
#[derive(Debug, Clone, PartialEq)]
pub enum PursuitEvent {
    /// Команда: включить погоню (реагировать на будущие FOV-входы)
    StartRequested,
    /// Команда: выключить погоню и немедленно освободить цель
    StopRequested,
    /// Entity умер (controlled или любой другой — фильтруем по identity)
    Died { entity: Entity },
    /// Entity сменил карту; None == ушёл в никуда
    LeftMap { entity: Entity, new_map: Option<MapId> },
    /// Entity вошёл в FOV controlled entity
    EnteredFov { entity: Entity, faction_id: u64 },
    /// Entity покинул FOV; faction нужна для retarget scan
    LeftFov { entity: Entity, faction_id: Option<u64> },
    /// Пара watch-реестра сошлась ближе порога
    EnteredStopRange { watched: Entity, watching: Entity },
    /// Пара watch-реестра разошлась дальше порога
    LeftStopRange { watched: Entity, watching: Entity },
    /// Периодический re-evaluation тик
    ChaseTick,
    /// Movement service отчитался о выполненном шаге
    Stepped,
}

/// Side effect, запрошенный переходом
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PursuitAction {
    MoveTowardTarget { target: Entity },
    HaltMovement,
    WatchStopRange { target: Entity },
    UnwatchStopRange { target: Entity },
    StartChaseTimer,
    StopChaseTimer,
    NotifyChaseStarted { target: Entity },
    NotifyChaseContinued { target: Entity },
}

/// Occupant текущего FOV снапшота (для retarget scan)
#[derive(Debug, Clone, Copy)]
pub struct FovCandidate {
    pub entity: Entity,
    pub faction_id: u64,
}

/// Контекст одного события: то, что машина не хранит сама
pub struct MachineContext<'a> {
    /// Controlled entity (сам chaser)
    pub controlled: Entity,
    /// Фракция controlled entity
    pub faction_id: u64,
    /// Controlled entity жив и на карте
    pub self_valid: bool,
    /// Текущая цель жива и на карте (false если цели нет)
    pub target_valid: bool,
    /// FOV снапшот на момент события
    pub visible: &'a [FovCandidate],
}

/// Машина погони одного controlled entity
#[derive(Debug, Clone, PartialEq)]
pub struct ChaseMachine {
    pub state: PursuitState,
    /// Реагировать ли на входы в FOV; выключается только StopRequested
    pub should_chase: bool,
}

impl Default for ChaseMachine {
    fn default() -> Self {
        Self {
            state: PursuitState::Idle,
            should_chase: true,
        }
    }
}

impl ChaseMachine {
    /// Обрабатывает одно событие, возвращает side effects для исполнения
    pub fn handle(&mut self, event: &PursuitEvent, ctx: &MachineContext) -> Vec<PursuitAction> {
        match event {
            PursuitEvent::StartRequested => {
                self.should_chase = true;
                Vec::new()
            }

            PursuitEvent::StopRequested => {
                self.should_chase = false;
                self.release_target()
            }

            PursuitEvent::Died { entity } => {
                if *entity == ctx.controlled || self.state.target() == Some(*entity) {
                    self.release_target()
                } else {
                    Vec::new()
                }
            }

            PursuitEvent::LeftMap { entity, new_map } => {
                // Переход на другую карту не терминален — цель догонит
                // FovEvent::Left; терминален только уход в никуда
                if new_map.is_none()
                    && (*entity == ctx.controlled || self.state.target() == Some(*entity))
                {
                    self.release_target()
                } else {
                    Vec::new()
                }
            }

            PursuitEvent::EnteredFov { entity, faction_id } => {
                self.try_acquire(*entity, *faction_id, ctx)
            }

            PursuitEvent::LeftFov { entity, faction_id } => {
                if self.state.target() != Some(*entity) {
                    return Vec::new();
                }

                let mut actions = self.release_target();

                // Retarget: враждебность кандидата оценивается от фракции
                // только что ушедшей цели, и scan обрывается на первом
                // совпадении — даже если acquisition guard его отверг.
                // TODO: решить с геймдизайном, должен ли scan идти от
                // собственной фракции chaser'а; поведение намеренно
                // сохранено как есть.
                if let Some(departed_faction) = faction_id {
                    for candidate in ctx.visible {
                        if candidate.entity == *entity {
                            continue;
                        }
                        if candidate.faction_id != *departed_faction {
                            actions.extend(self.try_acquire(
                                candidate.entity,
                                candidate.faction_id,
                                ctx,
                            ));
                            break;
                        }
                    }
                }

                actions
            }

            PursuitEvent::EnteredStopRange { watched, watching } => {
                // Stale события чужих/снятых watches отфильтровываются
                // identity-сравнением с текущей целью
                if *watching == ctx.controlled && self.state == (PursuitState::Chasing { target: *watched }) {
                    self.state = PursuitState::Paused { target: *watched };
                    vec![PursuitAction::HaltMovement]
                } else {
                    Vec::new()
                }
            }

            PursuitEvent::LeftStopRange { watched, watching } => {
                if *watching == ctx.controlled && self.state == (PursuitState::Paused { target: *watched }) {
                    self.state = PursuitState::Chasing { target: *watched };
                    // Движение возобновится на следующем chase-тике
                }
                Vec::new()
            }

            PursuitEvent::ChaseTick => match self.state {
                PursuitState::Idle => Vec::new(), // stale тик после teardown

                PursuitState::Chasing { target } => {
                    if !ctx.self_valid || !ctx.target_valid {
                        // Defensive release вместо разыменования stale цели
                        self.release_target()
                    } else {
                        debug_assert!(self.should_chase);
                        vec![PursuitAction::MoveTowardTarget { target }]
                    }
                }

                PursuitState::Paused { .. } => {
                    if !ctx.self_valid || !ctx.target_valid {
                        self.release_target()
                    } else {
                        // Таймер жив, движение пропускаем
                        Vec::new()
                    }
                }
            },

            PursuitEvent::Stepped => match self.state.target() {
                Some(target) => vec![PursuitAction::NotifyChaseContinued { target }],
                None => Vec::new(), // цель не привязана — notification подавляем
            },
        }
    }

    /// Попытка привязать цель; guards из FOV-entry перехода
    fn try_acquire(
        &mut self,
        entity: Entity,
        faction_id: u64,
        ctx: &MachineContext,
    ) -> Vec<PursuitAction> {
        if !self.should_chase {
            return Vec::new();
        }
        if self.state.target().is_some() {
            return Vec::new();
        }
        if entity == ctx.controlled {
            return Vec::new();
        }
        if faction_id == ctx.faction_id {
            // Не враг — игнорируем
            return Vec::new();
        }

        self.state = PursuitState::Chasing { target: entity };
        vec![
            PursuitAction::WatchStopRange { target: entity },
            PursuitAction::MoveTowardTarget { target: entity },
            PursuitAction::StartChaseTimer,
            PursuitAction::NotifyChaseStarted { target: entity },
        ]
    }

    /// Teardown привязки: unwatch + стоп таймера; should_chase не трогаем
    fn release_target(&mut self) -> Vec<PursuitAction> {
        match self.state {
            PursuitState::Idle => Vec::new(),
            PursuitState::Chasing { target } | PursuitState::Paused { target } => {
                self.state = PursuitState::Idle;
                vec![
                    PursuitAction::UnwatchStopRange { target },
                    PursuitAction::StopChaseTimer,
                ]
            }
        }
    }
}
