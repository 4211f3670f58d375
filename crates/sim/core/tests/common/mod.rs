//! Shared fixtures for sim-core integration tests.
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use glam::{Vec2, Vec3};
use sim_core::env::{LevelWall, ModelDescription, MonsterDescription, MonsterSpawn, RocketDescription};
use sim_core::geometry::ray_intersect_cylinder;
use sim_core::{
    Actor, DifficultyFlags, Env, EntityId, GameResources, KeySet, LevelData, Map, MapRequest,
    MonsterFactory, PLAYER_MONSTER_TYPE, PlayerBehavior, SimConfig, WorldView,
};

pub const BODY_RADIUS: f32 = 0.25;
pub const BODY_HEIGHT: f32 = 0.9;

pub fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

/// Scripted player with no movement of its own.
#[derive(Debug, Default)]
pub struct TestPlayer {
    pub pos: Vec3,
    pub angle: f32,
    pub health: i32,
    pub keys: KeySet,
    pub picked_items: Vec<u8>,
}

impl TestPlayer {
    pub fn new() -> Self {
        Self {
            health: 100,
            ..Default::default()
        }
    }
}

impl Actor for TestPlayer {
    fn position(&self) -> Vec3 {
        self.pos
    }

    fn set_position(&mut self, pos: Vec3) {
        self.pos = pos;
    }

    fn angle(&self) -> f32 {
        self.angle
    }

    fn health(&self) -> i32 {
        self.health
    }

    fn monster_type(&self) -> u8 {
        PLAYER_MONSTER_TYPE
    }

    fn z_min_max(&self) -> Vec2 {
        Vec2::new(0.0, BODY_HEIGHT)
    }

    fn teleport(&mut self, pos: Vec3, angle: f32) {
        self.pos = pos;
        self.angle = angle;
    }

    fn clamp_speed(&mut self, _surface_normal: Vec3) {}

    fn set_on_floor(&mut self, _on_floor: bool) {}

    fn hit(
        &mut self,
        damage: i32,
        _self_id: EntityId,
        _world: &WorldView<'_>,
        _requests: &mut Vec<MapRequest>,
        _now: Duration,
    ) {
        self.health -= damage;
    }

    fn try_shot(&self, from: Vec3, dir: Vec3) -> Option<Vec3> {
        ray_intersect_cylinder(
            self.pos.truncate(),
            BODY_RADIUS,
            self.pos.z,
            self.pos.z + BODY_HEIGHT,
            from,
            dir,
        )
    }

    fn tick(
        &mut self,
        _self_id: EntityId,
        _world: &WorldView<'_>,
        _requests: &mut Vec<MapRequest>,
        _now: Duration,
        _dt: Duration,
    ) {
    }
}

impl PlayerBehavior for TestPlayer {
    fn try_activate_procedure(&mut self, _procedure: u16, _now: Duration) -> bool {
        true
    }

    fn reset_activated_procedure(&mut self) {}

    fn keys(&self) -> KeySet {
        self.keys
    }

    fn give_key(&mut self, key: KeySet) {
        self.keys |= key;
    }

    fn try_pickup_item(&mut self, item_id: u8) -> bool {
        self.picked_items.push(item_id);
        true
    }
}

/// Monster that stands still and soaks damage.
#[derive(Debug)]
pub struct TestMonster {
    pub pos: Vec3,
    pub monster_type: u8,
    pub health: i32,
}

impl Actor for TestMonster {
    fn position(&self) -> Vec3 {
        self.pos
    }

    fn set_position(&mut self, pos: Vec3) {
        self.pos = pos;
    }

    fn angle(&self) -> f32 {
        0.0
    }

    fn health(&self) -> i32 {
        self.health
    }

    fn monster_type(&self) -> u8 {
        self.monster_type
    }

    fn z_min_max(&self) -> Vec2 {
        Vec2::new(0.0, BODY_HEIGHT)
    }

    fn teleport(&mut self, pos: Vec3, _angle: f32) {
        self.pos = pos;
    }

    fn clamp_speed(&mut self, _surface_normal: Vec3) {}

    fn set_on_floor(&mut self, _on_floor: bool) {}

    fn hit(
        &mut self,
        damage: i32,
        _self_id: EntityId,
        _world: &WorldView<'_>,
        _requests: &mut Vec<MapRequest>,
        _now: Duration,
    ) {
        self.health -= damage;
    }

    fn try_shot(&self, from: Vec3, dir: Vec3) -> Option<Vec3> {
        ray_intersect_cylinder(
            self.pos.truncate(),
            BODY_RADIUS,
            self.pos.z,
            self.pos.z + BODY_HEIGHT,
            from,
            dir,
        )
    }

    fn tick(
        &mut self,
        _self_id: EntityId,
        _world: &WorldView<'_>,
        _requests: &mut Vec<MapRequest>,
        _now: Duration,
        _dt: Duration,
    ) {
    }
}

pub struct TestMonsterFactory;

impl MonsterFactory for TestMonsterFactory {
    fn create(&self, spawn: &MonsterSpawn, floor_z: f32, _now: Duration) -> Box<dyn Actor> {
        Box::new(TestMonster {
            pos: spawn.pos.extend(floor_z),
            monster_type: spawn.monster_id,
            health: 50,
        })
    }
}

/// Monster type 1 with a regular body radius.
pub fn monster_spawn(pos: Vec2) -> MonsterSpawn {
    MonsterSpawn {
        monster_id: 1,
        pos,
        angle: 0.0,
        difficulty: DifficultyFlags::all(),
    }
}

/// Rocket type 0: hitscan bullet; type 1: slow explosive.
pub fn resources(models: Vec<ModelDescription>) -> GameResources {
    GameResources {
        models,
        items: Vec::new(),
        monsters: vec![
            MonsterDescription::default(),
            MonsterDescription {
                radius: BODY_RADIUS,
            },
        ],
        rockets: vec![
            RocketDescription {
                hitscan: true,
                blow_effect: 1,
                power: 6,
                ..Default::default()
            },
            RocketDescription {
                blow_effect: 2,
                power: 20,
                ..Default::default()
            },
        ],
    }
}

/// Vertical wall crossing the middle of column `x`.
pub fn wall_at_column(x: usize, y_from: f32, y_to: f32) -> LevelWall {
    let x = x as f32 + 0.5;
    LevelWall::new(Vec2::new(x, y_from), Vec2::new(x, y_to), 0)
}

pub fn build_map(level: LevelData, resources: GameResources) -> Map {
    let env = Env::new(Arc::new(level), Arc::new(resources));
    Map::new(
        env,
        SimConfig::default(),
        DifficultyFlags::NORMAL,
        Duration::ZERO,
        &TestMonsterFactory,
    )
    .expect("test level should validate")
}

/// Joins a player and moves it to `pos`.
pub fn join_player(map: &mut Map, pos: Vec3) -> EntityId {
    let id = map.spawn_player(Box::new(TestPlayer::new()));
    map.entity_mut(id)
        .expect("player was just spawned")
        .set_position(pos);
    id
}
