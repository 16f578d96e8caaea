//! Pursuit integration tests
//!
//! Headless App с полным SimulationPlugin; время двигаем вручную
//! фиксированными шагами (никакого wall clock), так что сценарии
//! детерминированы.

use std::time::Duration;

use bevy::prelude::*;
use houndfall_simulation::*;

const STEP: Duration = Duration::from_millis(50);
const MAP: MapId = MapId(1);

/// Helper: создать полный App с симуляцией
fn create_pursuit_app() -> App {
    let mut app = create_headless_app();
    app.add_plugins(SimulationPlugin);
    app.update(); // инициализация schedules
    app
}

/// Helper: один simulation тик фиксированной длины
fn step(app: &mut App) {
    app.world_mut()
        .resource_mut::<Time<Fixed>>()
        .advance_by(STEP);
    app.world_mut().run_schedule(FixedUpdate);
}

fn step_n(app: &mut App, ticks: usize) {
    for _ in 0..ticks {
        step(app);
    }
}

/// Helper: spawn hunter с pursuit controller
///
/// chase interval 200ms чтобы сценарии были короткими
fn spawn_hunter(app: &mut App, position: Vec3, faction_id: u64, stop_distance: f32) -> Entity {
    app.world_mut()
        .spawn((
            Transform::from_translation(position),
            Actor { faction_id },
            MapMembership::on(MAP),
            Chaser::new(stop_distance).with_interval(Duration::from_millis(200)),
            FieldOfView { radius: 600.0 },
            VisibleEntities::default(),
            MovementCommand::Idle,
            MovementSpeed { speed: 50.0 },
        ))
        .id()
}

/// Helper: spawn неподвижную жертву (Health/MapMembership через require)
fn spawn_prey(app: &mut App, position: Vec3, faction_id: u64) -> Entity {
    app.world_mut()
        .spawn((
            Transform::from_translation(position),
            Actor { faction_id },
            MapMembership::on(MAP),
        ))
        .id()
}

fn pursuit_state(app: &App, hunter: Entity) -> PursuitState {
    app.world().get::<Chaser>(hunter).unwrap().machine.state
}

fn collect_chase_started(app: &App) -> Vec<ChaseStarted> {
    let events = app.world().resource::<Events<ChaseStarted>>();
    events.get_cursor().read(events).cloned().collect()
}

fn collect_chase_continued(app: &App) -> Vec<ChaseContinued> {
    let events = app.world().resource::<Events<ChaseContinued>>();
    events.get_cursor().read(events).cloned().collect()
}

#[test]
fn test_chase_starts_on_hostile_fov_entry() {
    let mut app = create_pursuit_app();
    let hunter = spawn_hunter(&mut app, Vec3::ZERO, 1, 50.0);
    let prey = spawn_prey(&mut app, Vec3::new(200.0, 0.0, 0.0), 2);

    step(&mut app);

    assert_eq!(pursuit_state(&app, hunter), PursuitState::Chasing { target: prey });

    // Немедленный movement intent + watch + chase-started notification
    let started = collect_chase_started(&app);
    assert_eq!(started.len(), 1);
    assert_eq!(started[0].target, prey);
    assert!((started[0].distance - 200.0).abs() < 1.0);
    assert!(app.world().resource::<ProximityWatches>().is_watched(prey, hunter));

    // Таймер работает: за 200ms набегает следующий re-evaluation тик,
    // hunter продолжает сближение
    let before = app.world().get::<Transform>(hunter).unwrap().translation.x;
    step_n(&mut app, 5);
    let after = app.world().get::<Transform>(hunter).unwrap().translation.x;
    assert!(after > before, "hunter must keep closing in: {} → {}", before, after);
}

#[test]
fn test_non_hostile_traffic_never_starts_chase() {
    let mut app = create_pursuit_app();
    let hunter = spawn_hunter(&mut app, Vec3::ZERO, 1, 50.0);
    let friend = spawn_prey(&mut app, Vec3::new(100.0, 0.0, 0.0), 1); // та же фракция

    // Вход, выход, снова вход — контроллер не покидает Idle
    step_n(&mut app, 3);
    app.world_mut()
        .get_mut::<Transform>(friend)
        .unwrap()
        .translation
        .x = 10_000.0;
    step_n(&mut app, 3);
    app.world_mut()
        .get_mut::<Transform>(friend)
        .unwrap()
        .translation
        .x = 100.0;
    step_n(&mut app, 3);

    assert_eq!(pursuit_state(&app, hunter), PursuitState::Idle);
    assert!(collect_chase_started(&app).is_empty());
    assert!(app.world().resource::<ProximityWatches>().is_empty());
}

/// Сценарий: stop distance 100, цель в 500 юнитах, равномерное сближение.
/// Ожидаем строго убывающие chase-continued дистанции до 100, затем Paused
/// и никаких дальнейших движений.
#[test]
fn test_closes_in_then_pauses_at_stop_distance() {
    let mut app = create_pursuit_app();
    let hunter = spawn_hunter(&mut app, Vec3::ZERO, 1, 100.0);
    let prey = spawn_prey(&mut app, Vec3::new(500.0, 0.0, 0.0), 2);

    // 50 u/s × 50ms == 2.5 u/тик; 400 юнитов ≈ 160 тиков + запас
    let mut paused_at = None;
    for tick in 0..200 {
        step(&mut app);
        if pursuit_state(&app, hunter) == (PursuitState::Paused { target: prey }) {
            paused_at = Some(tick);
            break;
        }
    }
    assert!(paused_at.is_some(), "hunter never reached stop distance");

    let distances: Vec<f32> = collect_chase_continued(&app)
        .iter()
        .map(|event| event.distance)
        .collect();
    assert!(distances.len() > 10);
    for pair in distances.windows(2) {
        assert!(pair[1] < pair[0], "distances must strictly decrease: {:?}", pair);
    }
    assert!(*distances.last().unwrap() <= 100.0);

    // Paused: позиция заморожена, новых notifications нет
    step_n(&mut app, 2); // хвост событий прошлого тика
    let frozen = app.world().get::<Transform>(hunter).unwrap().translation;
    let continued_count = collect_chase_continued(&app).len();
    step_n(&mut app, 10);
    assert_eq!(app.world().get::<Transform>(hunter).unwrap().translation, frozen);
    assert_eq!(collect_chase_continued(&app).len(), continued_count);
    assert_eq!(pursuit_state(&app, hunter), PursuitState::Paused { target: prey });
}

#[test]
fn test_resumes_when_target_leaves_stop_range() {
    let mut app = create_pursuit_app();
    let hunter = spawn_hunter(&mut app, Vec3::new(0.0, 0.0, 0.0), 1, 100.0);
    let prey = spawn_prey(&mut app, Vec3::new(150.0, 0.0, 0.0), 2);

    // Сближение до паузы
    step_n(&mut app, 30);
    assert_eq!(pursuit_state(&app, hunter), PursuitState::Paused { target: prey });

    // Цель отходит за порог → leave-range → Chasing, движение на следующем тике
    app.world_mut()
        .get_mut::<Transform>(prey)
        .unwrap()
        .translation
        .x += 300.0;
    step(&mut app);
    assert_eq!(pursuit_state(&app, hunter), PursuitState::Chasing { target: prey });

    let before = app.world().get::<Transform>(hunter).unwrap().translation.x;
    step_n(&mut app, 6); // >= одного chase interval (200ms)
    let after = app.world().get::<Transform>(hunter).unwrap().translation.x;
    assert!(after > before, "movement must resume after leave-range");
}

#[test]
fn test_target_death_releases_pursuit() {
    let mut app = create_pursuit_app();
    let hunter = spawn_hunter(&mut app, Vec3::ZERO, 1, 50.0);
    let prey = spawn_prey(&mut app, Vec3::new(300.0, 0.0, 0.0), 2);

    step_n(&mut app, 3);
    assert_eq!(pursuit_state(&app, hunter), PursuitState::Chasing { target: prey });

    // Цель умирает
    let max = app.world().get::<Health>(prey).unwrap().max;
    app.world_mut()
        .get_mut::<Health>(prey)
        .unwrap()
        .take_damage(max);
    step(&mut app);

    assert_eq!(pursuit_state(&app, hunter), PursuitState::Idle);
    assert!(app.world().resource::<ProximityWatches>().is_empty());
    // should_chase не сброшен — новый враг в FOV перезапускает погоню
    let fresh = spawn_prey(&mut app, Vec3::new(200.0, 0.0, 0.0), 2);
    step(&mut app);
    assert_eq!(pursuit_state(&app, hunter), PursuitState::Chasing { target: fresh });
}

#[test]
fn test_target_detaching_from_map_releases_pursuit() {
    let mut app = create_pursuit_app();
    let hunter = spawn_hunter(&mut app, Vec3::ZERO, 1, 50.0);
    let prey = spawn_prey(&mut app, Vec3::new(300.0, 0.0, 0.0), 2);

    step_n(&mut app, 3);
    assert_eq!(pursuit_state(&app, hunter), PursuitState::Chasing { target: prey });

    *app.world_mut().get_mut::<MapMembership>(prey).unwrap() = MapMembership::detached();
    step(&mut app);

    assert_eq!(pursuit_state(&app, hunter), PursuitState::Idle);
    assert!(app.world().resource::<ProximityWatches>().is_empty());
}

#[test]
fn test_retargets_when_target_leaves_fov() {
    let mut app = create_pursuit_app();
    let hunter = spawn_hunter(&mut app, Vec3::ZERO, 1, 50.0);
    let first = spawn_prey(&mut app, Vec3::new(150.0, 0.0, 0.0), 2);
    // Вторая фракция отличается от фракции первой цели — retarget scan
    // (идущий от фракции ушедшей цели) её подхватит
    let second = spawn_prey(&mut app, Vec3::new(250.0, 0.0, 0.0), 3);

    step(&mut app);
    assert_eq!(pursuit_state(&app, hunter), PursuitState::Chasing { target: first });

    // Первая цель телепортируется за пределы FOV (но остаётся на карте)
    app.world_mut()
        .get_mut::<Transform>(first)
        .unwrap()
        .translation
        .x = 10_000.0;
    step(&mut app);

    assert_eq!(pursuit_state(&app, hunter), PursuitState::Chasing { target: second });
    let started = collect_chase_started(&app);
    assert_eq!(started.len(), 2);
    assert_eq!(started[1].target, second);
    assert!(app.world().resource::<ProximityWatches>().is_watched(second, hunter));
    assert!(!app.world().resource::<ProximityWatches>().is_watched(first, hunter));
}

#[test]
fn test_stop_chasing_while_paused_tears_down_watch() {
    let mut app = create_pursuit_app();
    let hunter = spawn_hunter(&mut app, Vec3::ZERO, 1, 100.0);
    let prey = spawn_prey(&mut app, Vec3::new(150.0, 0.0, 0.0), 2);

    step_n(&mut app, 30);
    assert_eq!(pursuit_state(&app, hunter), PursuitState::Paused { target: prey });

    app.world_mut().send_event(ChaseCommand::Stop { chaser: hunter });
    step(&mut app);

    assert_eq!(pursuit_state(&app, hunter), PursuitState::Idle);
    assert!(app.world().resource::<ProximityWatches>().is_empty());

    // Watch снят: цель мечется через бывший порог — enter/leave range
    // callbacks больше не приходят, контроллер остаётся Idle
    let range_count = {
        let events = app.world().resource::<Events<RangeEvent>>();
        events.get_cursor().read(events).count()
    };
    for offset in [500.0, -450.0, 500.0] {
        app.world_mut()
            .get_mut::<Transform>(prey)
            .unwrap()
            .translation
            .x += offset;
        step(&mut app);
    }
    let events = app.world().resource::<Events<RangeEvent>>();
    assert_eq!(events.get_cursor().read(events).count(), range_count);
    assert_eq!(pursuit_state(&app, hunter), PursuitState::Idle);
}

#[test]
fn test_set_stop_distance_applies_to_next_binding_only() {
    let mut app = create_pursuit_app();
    let hunter = spawn_hunter(&mut app, Vec3::ZERO, 1, 100.0);
    let prey = spawn_prey(&mut app, Vec3::new(400.0, 0.0, 0.0), 2);

    step(&mut app);
    assert_eq!(pursuit_state(&app, hunter), PursuitState::Chasing { target: prey });

    // Порог активного watch остаётся 100 — пауза наступит не раньше
    app.world_mut().send_event(ChaseCommand::SetStopDistance {
        chaser: hunter,
        distance: 300.0,
    });
    step_n(&mut app, 30); // сближение до ~325
    assert_eq!(
        app.world().get::<Chaser>(hunter).unwrap().stop_distance(),
        300.0
    );
    assert_eq!(pursuit_state(&app, hunter), PursuitState::Chasing { target: prey });

    step_n(&mut app, 100); // до старого порога 100
    assert_eq!(pursuit_state(&app, hunter), PursuitState::Paused { target: prey });
}

#[test]
fn test_scenario_is_deterministic() {
    fn run_scenario() -> String {
        let mut app = create_pursuit_app();
        let hunter = spawn_hunter(&mut app, Vec3::ZERO, 1, 100.0);
        let prey = spawn_prey(&mut app, Vec3::new(500.0, 0.0, 0.0), 2);

        step_n(&mut app, 120);
        app.world_mut()
            .get_mut::<Transform>(prey)
            .unwrap()
            .translation
            .y += 400.0;
        step_n(&mut app, 120);

        format!(
            "{:?}|{:?}|{:?}",
            pursuit_state(&app, hunter),
            app.world().get::<Transform>(hunter).unwrap().translation,
            collect_chase_continued(&app).len()
        )
    }

    assert_eq!(run_scenario(), run_scenario());
}
