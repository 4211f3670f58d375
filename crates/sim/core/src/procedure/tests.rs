use std::sync::Arc;
use std::time::Duration;

use glam::Vec2;

use super::*;
use crate::env::{
    CellRect, GameResources, IndexElement, LevelData, LevelWall, ProcedureCommand,
};

fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

struct Fixture {
    env: Env,
    config: SimConfig,
    engine: ProcedureEngine,
    objects: MapObjects,
    fields: Fields,
    events: UpdateEvents,
}

impl Fixture {
    fn new(procedures: Vec<Procedure>) -> Self {
        let mut level = LevelData::empty();
        level
            .dynamic_walls
            .push(LevelWall::new(Vec2::new(3.0, 3.0), Vec2::new(4.0, 3.0), 0));
        level.set_element(3, 3, IndexElement::DynamicWall(0));
        level.procedures = procedures;

        let env = Env::new(Arc::new(level), Arc::new(GameResources::default()));
        let config = SimConfig::default().with_procedures_speed_scale(1.0);
        let engine = ProcedureEngine::new(&env.level().procedures);
        let objects = MapObjects::new(&env, &config, Duration::ZERO);
        Self {
            env,
            config,
            engine,
            objects,
            fields: Fields::new(),
            events: UpdateEvents::default(),
        }
    }

    fn advance(&mut self, now: Duration) {
        self.engine.advance(
            &self.env,
            &self.config,
            now,
            &mut self.objects,
            &mut self.fields,
            &mut self.events,
        );
        transform::move_map_objects(&self.env, self.engine.states(), &mut self.objects);
    }

    fn state(&self) -> &ProcedureState {
        &self.engine.states()[0]
    }
}

fn door() -> Procedure {
    Procedure {
        speed: 1.0,
        back_wait: Duration::from_secs(2),
        commands: vec![ProcedureCommand::Move {
            cell: [3, 3],
            offset: Vec2::new(0.0, 256.0),
            sound: 0,
        }],
        ..Default::default()
    }
}

#[test]
fn runs_full_cycle_with_stage_in_bounds() {
    let mut fx = Fixture::new(vec![door()]);
    fx.engine.activate(0, ms(0));
    assert_eq!(fx.state().movement_state, MovementState::StartWait);

    let mut visited = vec![fx.state().movement_state];
    for step in 0..=50 {
        fx.advance(ms(step * 100));
        let state = fx.state();
        assert!((0.0..=1.0).contains(&state.movement_stage));
        if visited.last() != Some(&state.movement_state) {
            visited.push(state.movement_state);
        }
    }

    assert_eq!(
        visited,
        vec![
            MovementState::StartWait,
            MovementState::Movement,
            MovementState::BackWait,
            MovementState::ReverseMovement,
            MovementState::None,
        ]
    );
}

#[test]
fn geometry_follows_absolute_stage() {
    let mut fx = Fixture::new(vec![door()]);
    fx.engine.activate(0, ms(0));
    fx.advance(ms(0));
    fx.advance(ms(500));

    let wall = &fx.objects.dynamic_walls[0];
    assert!((wall.vert_pos[0].y - 3.5).abs() < 1e-5);
    assert!((wall.vert_pos[1].x - 4.0).abs() < 1e-5);

    fx.advance(ms(1000));
    assert_eq!(fx.state().movement_state, MovementState::BackWait);
    assert!((fx.objects.dynamic_walls[0].vert_pos[0].y - 4.0).abs() < 1e-5);
}

#[test]
fn return_in_back_wait_reverses_from_zero() {
    let mut fx = Fixture::new(vec![door()]);
    fx.engine.activate(0, ms(0));
    fx.advance(ms(0));
    fx.advance(ms(1000));
    assert_eq!(fx.state().movement_state, MovementState::BackWait);

    fx.engine
        .return_procedure(&fx.env, &fx.config, 0, ms(1200));
    assert_eq!(fx.state().movement_state, MovementState::ReverseMovement);
    assert_eq!(fx.state().movement_stage, 0.0);
    assert_eq!(fx.state().last_state_change, ms(1200));
}

#[test]
fn return_during_movement_keeps_geometry_continuous() {
    let mut fx = Fixture::new(vec![door()]);
    fx.engine.activate(0, ms(10_000));
    fx.advance(ms(10_000));
    fx.advance(ms(10_300));
    let before = fx.state().absolute_stage();

    fx.engine
        .return_procedure(&fx.env, &fx.config, 0, ms(10_300));
    assert_eq!(fx.state().movement_state, MovementState::ReverseMovement);
    assert!((fx.state().absolute_stage() - before).abs() < 1e-5);

    fx.advance(ms(10_400));
    let after = fx.state().absolute_stage();
    assert!(after < before);
    assert!((after - 0.2).abs() < 1e-3);
}

#[test]
fn return_is_ignored_when_locked_or_idle() {
    let mut fx = Fixture::new(vec![door()]);
    fx.engine
        .return_procedure(&fx.env, &fx.config, 0, ms(0));
    assert_eq!(fx.state().movement_state, MovementState::None);

    fx.engine.activate(0, ms(0));
    fx.engine.states[0].locked = true;
    fx.engine
        .return_procedure(&fx.env, &fx.config, 0, ms(0));
    assert_eq!(fx.state().movement_state, MovementState::StartWait);
}

#[test]
fn shoot_only_starts_idle_unlocked_procedures() {
    let mut fx = Fixture::new(vec![Procedure {
        locked: true,
        ..door()
    }]);
    fx.engine.process_shoot(0, ms(0));
    assert_eq!(fx.state().movement_state, MovementState::None);

    fx.engine.process_destroy(0, ms(0));
    assert!(!fx.state().locked);
    assert_eq!(fx.state().movement_state, MovementState::StartWait);
}

#[test]
fn zero_speed_completes_in_one_step() {
    let mut fx = Fixture::new(vec![Procedure {
        speed: 0.0,
        ..door()
    }]);
    fx.engine.activate(0, ms(0));
    fx.advance(ms(0));
    assert_eq!(fx.state().movement_state, MovementState::Movement);
    fx.advance(ms(50));
    assert_eq!(fx.state().movement_state, MovementState::BackWait);
}

#[test]
fn return_of_a_near_frozen_procedure_does_not_overflow() {
    let mut fx = Fixture::new(vec![Procedure {
        speed: 1e-30,
        ..door()
    }]);
    fx.engine.activate(0, ms(0));
    fx.advance(ms(0));
    fx.advance(ms(20));
    assert_eq!(fx.state().movement_state, MovementState::Movement);

    fx.engine
        .return_procedure(&fx.env, &fx.config, 0, ms(30));
    assert_eq!(fx.state().movement_state, MovementState::ReverseMovement);
    assert_eq!(fx.state().last_state_change, Duration::ZERO);

    fx.advance(ms(50));
    let stage = fx.state().absolute_stage();
    assert!((0.0..=1.0).contains(&stage));
}

#[test]
fn wind_stops_after_movement_unless_nonstop() {
    let area = CellRect::new([10, 10], [11, 11]);
    let wind = ProcedureCommand::Wind {
        area,
        direction: [1, 0],
    };
    let mut fx = Fixture::new(vec![
        Procedure {
            speed: 1.0,
            commands: vec![wind],
            ..Default::default()
        },
        Procedure {
            speed: 1.0,
            commands: vec![
                ProcedureCommand::Wind {
                    area: CellRect::new([20, 20], [20, 20]),
                    direction: [0, 1],
                },
                ProcedureCommand::Nonstop,
            ],
            ..Default::default()
        },
    ]);
    fx.engine.activate(0, ms(0));
    fx.engine.activate(1, ms(0));
    fx.advance(ms(0));
    assert_eq!(fx.fields.wind_cell(10, 10), Vec2::X);
    assert_eq!(fx.fields.wind_cell(20, 20), Vec2::Y);

    fx.advance(ms(1000));
    assert_eq!(fx.fields.wind_cell(10, 10), Vec2::ZERO);
    assert_eq!(fx.fields.wind_cell(20, 20), Vec2::Y);
}

#[test]
fn immediate_lock_commands_apply_on_movement_start() {
    let mut fx = Fixture::new(vec![
        Procedure {
            speed: 1.0,
            start_delay: ms(500),
            commands: vec![ProcedureCommand::Unlock { procedure: 1 }],
            ..Default::default()
        },
        Procedure {
            locked: true,
            ..Default::default()
        },
    ]);
    fx.engine.activate(0, ms(0));
    fx.advance(ms(100));
    assert!(fx.engine.states()[1].locked);
    fx.advance(ms(500));
    assert!(!fx.engine.states()[1].locked);
}

#[test]
fn map_end_is_reported_once_per_activation() {
    let mut fx = Fixture::new(vec![Procedure {
        end_delay: ms(200),
        ..door()
    }]);
    fx.engine.activate(0, ms(0));
    fx.advance(ms(0));
    fx.advance(ms(100));
    assert!(!fx.engine.take_map_end());
    fx.advance(ms(200));
    assert!(fx.engine.take_map_end());
    fx.advance(ms(300));
    assert!(!fx.engine.take_map_end());
}
