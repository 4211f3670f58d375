//! End-to-end behaviour of a level driven through the public `Map` API.
mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use glam::{Vec2, Vec3};
use sim_core::env::{LevelModel, ModelDescription};
use sim_core::messages::{Message, TextMessage};
use sim_core::{
    ActionCode, IndexElement, KeySet, LevelData, Link, LinkKind, MapError, MessageLog,
    MovementState, ParticleEffect, Procedure, SoundId,
};

use common::*;

fn particle_count(map: &sim_core::Map, effect: ParticleEffect) -> usize {
    map.update_events()
        .particle_effects
        .iter()
        .filter(|particle| particle.effect_id == effect.0)
        .count()
}

fn text_messages(log: &MessageLog) -> Vec<u16> {
    log.unreliable
        .iter()
        .filter_map(|message| match message {
            Message::TextMessage(TextMessage {
                text_message_number,
            }) => Some(*text_message_number),
            _ => None,
        })
        .collect()
}

#[test]
fn standing_on_floor_link_starts_procedure_immediately() {
    let mut level = LevelData::empty();
    level.procedures.push(Procedure {
        speed: 1.0,
        ..Default::default()
    });
    level.set_link(5, 5, Link::new(LinkKind::Floor, 0));
    let mut map = build_map(level, resources(Vec::new()));

    let player = join_player(&mut map, Vec3::new(5.5, 5.5, 0.0));
    let mut log = MessageLog::new();
    map.process_player_position(player, &mut log)
        .expect("player exists");

    assert_eq!(
        map.procedure_state(0).expect("procedure 0").movement_state,
        MovementState::StartWait
    );
}

#[test]
fn hitscan_resolves_in_one_tick_without_birth_or_death() {
    let mut level = LevelData::empty();
    level.static_walls.push(wall_at_column(12, 8.0, 12.0));
    let mut map = build_map(level, resources(Vec::new()));
    let player = join_player(&mut map, Vec3::new(10.5, 10.5, 0.0));

    map.shoot(player, 0, Vec3::new(10.5, 10.5, 0.5), Vec3::X)
        .expect("rocket type 0 exists");
    map.tick(ms(50), ms(50));

    let events = map.update_events();
    assert!(map.rockets().is_empty());
    assert!(events.rocket_births.is_empty());
    assert!(events.rocket_deaths.is_empty());
    assert_eq!(particle_count(&map, ParticleEffect::BULLET), 1);
    assert_eq!(events.particle_effects.len(), 1);
    assert!(
        events
            .map_event_sounds
            .iter()
            .any(|sound| sound.sound_id == SoundId::FIRST_ROCKET_HIT.0)
    );
}

#[test]
fn travelling_rocket_is_born_and_dies_once() {
    let mut level = LevelData::empty();
    level.static_walls.push(wall_at_column(12, 8.0, 12.0));
    let mut map = build_map(level, resources(Vec::new()));
    let player = join_player(&mut map, Vec3::new(10.5, 10.5, 0.0));

    map.shoot(player, 1, Vec3::new(10.5, 10.5, 0.5), Vec3::X)
        .expect("rocket type 1 exists");
    assert_eq!(map.update_events().rocket_births.len(), 1);

    // 20 units per second reaches the wall within the first 100 ms.
    map.tick(ms(50), ms(50));
    assert_eq!(map.rockets().len(), 1);
    map.tick(ms(100), ms(50));

    assert!(map.rockets().is_empty());
    assert_eq!(map.update_events().rocket_deaths.len(), 1);
    assert_eq!(particle_count(&map, ParticleEffect::EXPLOSION), 1);
}

#[test]
fn breakable_model_is_destroyed_exactly_once() {
    let mut level = LevelData::empty();
    level.static_models.push(LevelModel {
        pos: Vec2::new(12.5, 10.5),
        angle: 0.0,
        model_id: 0,
        is_dynamic: false,
    });
    level.set_element(12, 10, IndexElement::StaticModel(0));
    level.set_link(12, 10, Link::new(LinkKind::Destroy, 0));
    level.procedures.push(Procedure::default());
    let models = vec![
        ModelDescription {
            radius: 0.5,
            break_limit: 10,
            blow_effect: 5,
            z_max: 1.0,
            frame_count: 1,
            ..Default::default()
        },
        ModelDescription {
            radius: 0.5,
            z_max: 0.5,
            frame_count: 1,
            ..Default::default()
        },
    ];
    let mut map = build_map(level, resources(models));
    let player = join_player(&mut map, Vec3::new(10.5, 10.5, 0.0));
    let from = Vec3::new(10.5, 10.5, 0.5);

    map.shoot(player, 0, from, Vec3::X).expect("rocket type 0 exists");
    map.tick(ms(50), ms(50));
    assert_eq!(map.objects().static_models[0].health, 4);
    assert!(map.is_procedure_idle(0).expect("procedure 0"));

    map.shoot(player, 0, from, Vec3::X).expect("rocket type 0 exists");
    map.tick(ms(100), ms(50));

    let model = &map.objects().static_models[0];
    assert_eq!(model.model_id, 1);
    assert_eq!(particle_count(&map, ParticleEffect::blow_effect(5)), 1);
    assert_eq!(
        map.procedure_state(0).expect("procedure 0").movement_state,
        MovementState::StartWait
    );
}

#[test]
fn key_gated_procedure_waits_for_the_key() {
    let mut level = LevelData::empty();
    level.procedures.push(Procedure {
        required_keys: KeySet::RED,
        lock_message: 7,
        ..Default::default()
    });
    level.set_link(5, 5, Link::new(LinkKind::Floor, 0));
    level.static_models.push(LevelModel {
        pos: Vec2::new(5.5, 5.5),
        angle: 0.0,
        model_id: 0,
        is_dynamic: false,
    });
    let models = vec![ModelDescription {
        action_code: ActionCode::RED_KEY,
        z_max: 0.5,
        ..Default::default()
    }];
    let mut map = build_map(level, resources(models));
    let player = join_player(&mut map, Vec3::new(5.5, 5.5, 0.0));

    // Floor links run before pickups, so the first pass is still locked out.
    let mut log = MessageLog::new();
    map.process_player_position(player, &mut log)
        .expect("player exists");
    assert!(map.is_procedure_idle(0).expect("procedure 0"));
    assert_eq!(text_messages(&log), vec![7]);
    assert!(map.objects().static_models[0].picked);
    assert!(
        map.update_events()
            .monster_linked_sounds
            .iter()
            .any(|sound| sound.monster_id == player && sound.sound_id == SoundId::GET_KEY.0)
    );

    map.process_player_position(player, &mut log)
        .expect("player exists");
    assert_eq!(
        map.procedure_state(0).expect("procedure 0").movement_state,
        MovementState::StartWait
    );
    assert_eq!(text_messages(&log), vec![7]);
}

#[test]
fn mines_detonate_near_bodies_and_expire_otherwise() {
    let mut level = LevelData::empty();
    level.monsters.push(monster_spawn(Vec2::new(20.5, 20.5)));
    let mut map = build_map(level, resources(Vec::new()));

    let near = map.plant_mine(Vec3::new(20.5, 20.5, 0.0));
    let far = map.plant_mine(Vec3::new(40.5, 40.5, 0.0));
    assert_eq!(map.update_events().dynamic_item_births.len(), 2);
    map.clear_update_events();

    map.tick(ms(500), ms(500));
    assert_eq!(map.mines().len(), 2);

    map.tick(ms(1500), ms(1000));
    let events = map.update_events();
    assert_eq!(map.mines().len(), 1);
    assert_eq!(events.dynamic_item_deaths.len(), 1);
    assert_eq!(events.dynamic_item_deaths[0].item_id, near);
    assert_eq!(particle_count(&map, ParticleEffect::EXPLOSION), 1);
    assert!(
        events
            .map_event_sounds
            .iter()
            .any(|sound| sound.sound_id == SoundId::MINE_EXPLOSION.0)
    );
    map.clear_update_events();

    map.tick(ms(31_000), ms(29_500));
    let events = map.update_events();
    assert!(map.mines().is_empty());
    assert_eq!(events.dynamic_item_deaths.len(), 1);
    assert_eq!(events.dynamic_item_deaths[0].item_id, far);
    assert_eq!(particle_count(&map, ParticleEffect::EXPLOSION), 0);
}

#[test]
fn map_end_hook_fires_once() {
    let mut level = LevelData::empty();
    level.procedures.push(Procedure {
        speed: 1.0,
        end_delay: ms(200),
        ..Default::default()
    });
    let mut map = build_map(level, resources(Vec::new()));
    let fired = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&fired);
    map.set_map_end_hook(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    map.activate_procedure(0).expect("procedure 0");
    for now in [0, 100, 200, 300, 400] {
        map.tick(ms(now), ms(100));
    }

    assert_eq!(fired.load(Ordering::SeqCst), 1);
}

#[test]
fn procedure_calls_reject_unknown_numbers() {
    let mut map = build_map(LevelData::empty(), resources(Vec::new()));
    assert!(matches!(
        map.activate_procedure(3),
        Err(MapError::UnknownProcedure { number: 3, count: 0 })
    ));
    assert!(map.return_procedure(0).is_err());
}

#[test]
fn unknown_rocket_type_is_rejected() {
    let mut map = build_map(LevelData::empty(), resources(Vec::new()));
    let player = join_player(&mut map, Vec3::new(5.5, 5.5, 0.0));
    assert_eq!(
        map.shoot(player, 9, Vec3::ZERO, Vec3::X),
        Err(MapError::UnknownRocketType(9))
    );
}

#[test]
fn shot_without_direction_is_rejected() {
    let mut map = build_map(LevelData::empty(), resources(Vec::new()));
    let player = join_player(&mut map, Vec3::new(5.5, 5.5, 0.0));
    assert_eq!(
        map.shoot(player, 1, Vec3::new(5.5, 5.5, 0.5), Vec3::ZERO),
        Err(MapError::InvalidDirection)
    );
    assert_eq!(
        map.shoot(player, 1, Vec3::new(5.5, 5.5, 0.5), Vec3::new(f32::NAN, 0.0, 0.0)),
        Err(MapError::InvalidDirection)
    );
    assert!(map.rockets().is_empty());
    assert!(map.update_events().rocket_births.is_empty());
}

#[test]
fn process_player_position_requires_a_player() {
    let mut level = LevelData::empty();
    level.monsters.push(monster_spawn(Vec2::new(20.5, 20.5)));
    let mut map = build_map(level, resources(Vec::new()));
    let (monster, _) = map.entities().next().expect("one monster spawned");

    let mut log = MessageLog::new();
    assert_eq!(
        map.process_player_position(monster, &mut log),
        Err(MapError::NotAPlayer(monster))
    );
}
