//! Teleports, wind, death zones and immediate procedure commands as seen
//! through `Map::tick`.
mod common;

use glam::{Vec2, Vec3};
use sim_core::env::{CellRect, LevelModel, LevelWall, ModelDescription, Teleport};
use sim_core::{
    AnimationState, Entity, IndexElement, LevelData, Map, ParticleEffect, Procedure,
    ProcedureCommand, SimConfig,
};

use common::*;

const TICK_MS: u64 = 50;

/// The monster whose planar position is closest to `pos`.
fn monster_near(map: &Map, pos: Vec2) -> &Entity {
    map.entities()
        .filter(|(_, entity)| !entity.is_player())
        .map(|(_, entity)| entity)
        .min_by(|a, b| {
            let da = a.position().truncate().distance_squared(pos);
            let db = b.position().truncate().distance_squared(pos);
            da.total_cmp(&db)
        })
        .expect("level has monsters")
}

/// Runs fixed ticks after `from_ms` up to and including `until_ms`.
fn run_ticks(map: &mut Map, from_ms: u64, until_ms: u64) {
    let mut now = from_ms;
    while now < until_ms {
        now += TICK_MS;
        map.tick(ms(now), ms(TICK_MS));
    }
}

fn low_block(pos: Vec2) -> LevelModel {
    LevelModel {
        pos,
        angle: 0.0,
        model_id: 0,
        is_dynamic: false,
    }
}

#[test]
fn monster_on_teleport_cell_lands_on_target_floor() {
    let mut level = LevelData::empty();
    level.monsters.push(monster_spawn(Vec2::new(5.5, 5.5)));
    level.teleports.push(Teleport {
        from: [5, 5],
        to: [20 * 256 + 128, 30 * 256 + 128],
        angle: 1.0,
    });
    level.static_models.push(low_block(Vec2::new(20.5, 30.5)));
    let models = vec![ModelDescription {
        radius: 0.5,
        z_max: 0.2,
        ..Default::default()
    }];
    let mut map = build_map(level, resources(models));

    map.tick(ms(TICK_MS), ms(TICK_MS));

    let pos = monster_near(&map, Vec2::new(20.5, 30.5)).position();
    assert!((pos - Vec3::new(20.5, 30.5, 0.2)).length() < 1e-4);
}

#[test]
fn wind_from_procedure_pushes_monsters() {
    let mut level = LevelData::empty();
    level.monsters.push(monster_spawn(Vec2::new(10.5, 10.5)));
    level.monsters.push(monster_spawn(Vec2::new(30.5, 30.5)));
    level.procedures.push(Procedure {
        speed: 1.0,
        commands: vec![ProcedureCommand::Wind {
            area: CellRect::new([9, 9], [12, 12]),
            direction: [2, 0],
        }],
        ..Default::default()
    });
    let mut map = build_map(level, resources(Vec::new()));
    map.activate_procedure(0).expect("procedure 0 exists");

    map.tick(ms(TICK_MS), ms(TICK_MS));

    let drift = 2.0 * 0.05 * SimConfig::DEFAULT_WIND_SPEED_FACTOR;
    let pushed = monster_near(&map, Vec2::new(10.5, 10.5)).position();
    assert!((pushed.x - (10.5 + drift)).abs() < 1e-5);
    assert!((pushed.y - 10.5).abs() < 1e-5);

    let calm = monster_near(&map, Vec2::new(30.5, 30.5)).position();
    assert_eq!(calm.truncate(), Vec2::new(30.5, 30.5));

    map.tick(ms(2 * TICK_MS), ms(TICK_MS));
    let pushed = monster_near(&map, Vec2::new(10.5, 10.5)).position();
    assert!((pushed.x - (10.5 + 2.0 * drift)).abs() < 1e-5);
}

#[test]
fn death_zone_hits_once_per_damage_tick_inside_its_band() {
    let mut level = LevelData::empty();
    level.monsters.push(monster_spawn(Vec2::new(10.5, 10.5)));
    level.monsters.push(monster_spawn(Vec2::new(30.5, 30.5)));
    level.procedures.push(Procedure {
        speed: 1.0,
        commands: vec![
            ProcedureCommand::Death {
                area: CellRect::new([10, 10], [10, 10]),
                z_bottom: 0,
                z_top: 64,
                damage: 4,
            },
            // Starts above the head of a monster standing on the floor.
            ProcedureCommand::Death {
                area: CellRect::new([30, 30], [30, 30]),
                z_bottom: 64,
                z_top: 128,
                damage: 4,
            },
        ],
        ..Default::default()
    });
    let mut map = build_map(level, resources(Vec::new()));
    map.activate_procedure(0).expect("procedure 0 exists");

    // Three damage ticks per second: the first boundary is crossed at 350 ms.
    run_ticks(&mut map, 0, 300);
    assert_eq!(monster_near(&map, Vec2::new(10.5, 10.5)).health(), 50);
    run_ticks(&mut map, 300, 350);
    assert_eq!(monster_near(&map, Vec2::new(10.5, 10.5)).health(), 46);

    run_ticks(&mut map, 350, 1000);
    assert_eq!(monster_near(&map, Vec2::new(10.5, 10.5)).health(), 38);
    assert_eq!(monster_near(&map, Vec2::new(30.5, 30.5)).health(), 50);
}

#[test]
fn change_and_explode_commands_apply_when_movement_starts() {
    let mut level = LevelData::empty();
    level.static_models.push(low_block(Vec2::new(12.5, 10.5)));
    level.set_element(12, 10, IndexElement::StaticModel(0));
    level.static_models.push(low_block(Vec2::new(14.5, 10.5)));
    level.set_element(14, 10, IndexElement::StaticModel(1));
    level
        .dynamic_walls
        .push(LevelWall::new(Vec2::new(16.0, 10.0), Vec2::new(17.0, 10.0), 3));
    level.set_element(16, 10, IndexElement::DynamicWall(0));
    level.procedures.push(Procedure {
        speed: 1.0,
        commands: vec![
            ProcedureCommand::Explode { cell: [12, 10] },
            ProcedureCommand::Change {
                cell: [14, 10],
                new_id: 163 + 2,
            },
            ProcedureCommand::Change {
                cell: [16, 10],
                new_id: 7,
            },
        ],
        ..Default::default()
    });
    let block = ModelDescription {
        radius: 0.5,
        z_max: 0.5,
        frame_count: 1,
        ..Default::default()
    };
    let models = vec![
        ModelDescription {
            break_limit: 10,
            blow_effect: 5,
            break_sfx: 30,
            ..block
        },
        block,
        block,
    ];
    let mut map = build_map(level, resources(models));
    map.activate_procedure(0).expect("procedure 0 exists");

    map.tick(ms(TICK_MS), ms(TICK_MS));

    let objects = map.objects();
    assert_eq!(objects.static_models[0].model_id, 1);
    assert_eq!(objects.static_models[1].model_id, 2);
    assert_eq!(objects.static_models[1].animation_state, AnimationState::Animation);
    assert_eq!(objects.dynamic_walls[0].texture_id, 7);

    let events = map.update_events();
    let blow = ParticleEffect::blow_effect(5);
    assert_eq!(
        events
            .particle_effects
            .iter()
            .filter(|particle| particle.effect_id == blow.0)
            .count(),
        1
    );
    assert!(events.map_event_sounds.iter().any(|sound| sound.sound_id == 30));

    // Immediate commands run once per activation.
    map.tick(ms(2 * TICK_MS), ms(TICK_MS));
    assert_eq!(map.objects().static_models[0].model_id, 1);
}
