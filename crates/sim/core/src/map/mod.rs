//! The authoritative simulation of one level.
//!
//! [`Map`] owns every piece of mutable world state and advances it in
//! [`Map::tick`]. Observers read it between ticks through
//! [`Map::send_update_messages`] and [`Map::send_messages_for_new_player`].
mod monsters;
mod outbound;
mod player;
mod rockets;
#[cfg(feature = "serde")]
mod snapshot;

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use glam::Vec3;
use tracing::{info, trace, warn};

use crate::ballistics::{MINE_FLOOR_RADIUS, Mine, Rocket};
use crate::config::SimConfig;
use crate::entity::{
    Entity, EntityId, MapRequest, MonsterFactory, PLAYER_MONSTER_TYPE, PlayerBehavior, PlayerSnapshot,
};
use crate::env::{DifficultyFlags, Env, IndexElement, LevelDataError, Link, LinkKind, MAP_SIZE, SoundId};
use crate::error::MapError;
use crate::events::UpdateEvents;
use crate::messages::{MonsterPartBirth, angle_to_message, position_to_message};
use crate::procedure::{MovementState, ProcedureEngine, ProcedureState, transform};
use crate::spatial::CollisionIndex;
use crate::world::{Fields, MapObjects, floor_level};

#[cfg(feature = "serde")]
pub use snapshot::{MapSnapshot, StateRoot};

/// Called once after a tick in which a procedure ended the level.
pub type MapEndHook = Box<dyn FnMut() + Send>;

/// Players with no spawn point appear here.
const DEFAULT_PLAYER_POSITION: Vec3 = Vec3::new(0.0, 0.0, 4.0);

/// Builds a [`crate::entity::WorldView`] from disjoint map fields.
macro_rules! world_view {
    ($map:ident, $players:expr) => {
        crate::entity::WorldView {
            env: &$map.env,
            config: &$map.config,
            index: &$map.index,
            objects: &$map.objects,
            players: $players,
            now: $map.current_time,
        }
    };
}
pub(crate) use world_view;

pub struct Map {
    env: Env,
    config: SimConfig,
    difficulty: DifficultyFlags,
    index: CollisionIndex,
    /// Links of every map element, keyed by the element they sit on.
    element_links: BTreeMap<IndexElement, Vec<Link>>,
    objects: MapObjects,
    fields: Fields,
    procedures: ProcedureEngine,
    entities: BTreeMap<EntityId, Entity>,
    rockets: Vec<Rocket>,
    mines: Vec<Mine>,
    next_entity_id: u32,
    next_rocket_id: u32,
    events: UpdateEvents,
    current_time: Duration,
    map_end_hook: Option<MapEndHook>,
}

impl Map {
    /// Validates the level and spawns the monsters of the given difficulty.
    pub fn new(
        env: Env,
        config: SimConfig,
        difficulty: DifficultyFlags,
        start_time: Duration,
        factory: &dyn MonsterFactory,
    ) -> Result<Self, LevelDataError> {
        env.level().validate()?;
        warn_inert_references(&env);

        let index = CollisionIndex::new(env.level(), env.resources());
        let element_links = collect_element_links(&env);
        let objects = MapObjects::new(&env, &config, start_time);
        let procedures = ProcedureEngine::new(&env.level().procedures);

        let mut map = Self {
            env,
            config,
            difficulty,
            index,
            element_links,
            objects,
            fields: Fields::new(),
            procedures,
            entities: BTreeMap::new(),
            rockets: Vec::new(),
            mines: Vec::new(),
            next_entity_id: 0,
            next_rocket_id: 0,
            events: UpdateEvents::default(),
            current_time: start_time,
            map_end_hook: None,
        };

        let env = map.env.clone();
        for spawn in &env.level().monsters {
            if spawn.monster_id == PLAYER_MONSTER_TYPE || !spawn.difficulty.intersects(difficulty) {
                continue;
            }
            let floor_z = floor_level(&env, spawn.pos, map.config.player_radius);
            let monster = factory.create(spawn, floor_z, start_time);
            let id = map.next_entity_id();
            map.entities.insert(id, Entity::Monster(monster));
        }

        info!(
            target: "sim::map",
            monsters = map.entities.len(),
            procedures = map.procedures.len(),
            dynamic_walls = map.objects.dynamic_walls.len(),
            static_models = map.objects.static_models.len(),
            items = map.objects.items.len(),
            difficulty = ?difficulty,
            "map created"
        );
        Ok(map)
    }

    pub fn env(&self) -> &Env {
        &self.env
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn difficulty(&self) -> DifficultyFlags {
        self.difficulty
    }

    pub fn current_time(&self) -> Duration {
        self.current_time
    }

    pub fn objects(&self) -> &MapObjects {
        &self.objects
    }

    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    pub fn procedure_states(&self) -> &[ProcedureState] {
        self.procedures.states()
    }

    pub fn procedure_state(&self, number: u16) -> Result<&ProcedureState, MapError> {
        self.procedures
            .state(number)
            .ok_or(MapError::UnknownProcedure {
                number,
                count: self.procedures.len(),
            })
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    pub fn entities(&self) -> impl Iterator<Item = (EntityId, &Entity)> {
        self.entities.iter().map(|(&id, entity)| (id, entity))
    }

    pub fn rockets(&self) -> &[Rocket] {
        &self.rockets
    }

    pub fn mines(&self) -> &[Mine] {
        &self.mines
    }

    pub fn update_events(&self) -> &UpdateEvents {
        &self.events
    }

    pub fn set_map_end_hook(&mut self, hook: impl FnMut() + Send + 'static) {
        self.map_end_hook = Some(Box::new(hook));
    }

    fn next_entity_id(&mut self) -> EntityId {
        self.next_entity_id += 1;
        EntityId(self.next_entity_id)
    }

    fn next_rocket_id(&mut self) -> EntityId {
        self.next_rocket_id += 1;
        EntityId(self.next_rocket_id)
    }

    /// Places a joining player on the lowest-numbered spawn point.
    pub fn spawn_player(&mut self, mut player: Box<dyn PlayerBehavior>) -> EntityId {
        let spawn = self
            .env
            .level()
            .player_spawns
            .iter()
            .min_by_key(|spawn| spawn.number)
            .copied();
        match spawn {
            Some(spawn) => {
                let z = floor_level(&self.env, spawn.pos, self.config.player_radius);
                player.teleport(spawn.pos.extend(z), spawn.angle);
            }
            None => player.set_position(DEFAULT_PLAYER_POSITION),
        }
        player.reset_activated_procedure();

        let id = self.next_entity_id();
        info!(target: "sim::map", player = %id, position = ?player.position(), "player spawned");
        self.entities.insert(id, Entity::Player(player));
        id
    }

    /// Removes a player or monster.
    pub fn despawn(&mut self, id: EntityId) -> Result<Entity, MapError> {
        self.entities.remove(&id).ok_or(MapError::UnknownEntity(id))
    }

    /// Fires a rocket. Hitscan types resolve during the next tick.
    pub fn shoot(&mut self, owner: EntityId, rocket_type: u8, from: Vec3, dir: Vec3) -> Result<EntityId, MapError> {
        let description = *self
            .env
            .resources()
            .rocket(rocket_type)
            .ok_or(MapError::UnknownRocketType(rocket_type))?;
        let dir = dir.try_normalize().ok_or(MapError::InvalidDirection)?;

        let id = self.next_rocket_id();
        let rocket = Rocket::new(
            id,
            owner,
            rocket_type,
            &description,
            &self.config,
            from,
            dir,
            self.current_time,
        );
        if !description.hitscan {
            self.events.rocket_births.push(rocket.birth_message());
        }
        trace!(target: "sim::ballistics", rocket = %id, owner = %owner, rocket_type, "rocket fired");
        self.rockets.push(rocket);
        Ok(id)
    }

    /// Plants a mine on the floor under `pos`.
    pub fn plant_mine(&mut self, pos: Vec3) -> EntityId {
        let id = self.next_rocket_id();
        let floor_z = floor_level(&self.env, pos.truncate(), MINE_FLOOR_RADIUS);
        let mine = Mine {
            id,
            pos: pos.truncate().extend(floor_z),
            planting_time: self.current_time,
        };
        self.events.dynamic_item_births.push(mine.birth_message());
        self.events.play_map_event_sound(mine.pos, SoundId::MINE_ON);
        trace!(target: "sim::ballistics", mine = %id, "mine planted");
        self.mines.push(mine);
        id
    }

    /// Advances the level to `now`; `dt` is the time since the previous tick.
    pub fn tick(&mut self, now: Duration, dt: Duration) {
        self.current_time = now;

        self.procedures.advance(
            &self.env,
            &self.config,
            now,
            &mut self.objects,
            &mut self.fields,
            &mut self.events,
        );
        transform::move_map_objects(&self.env, self.procedures.states(), &mut self.objects);
        self.objects
            .update_animations(&self.env, now, self.config.animations_fps);

        let players = self.player_snapshots();
        self.update_rockets(&players, now, dt);
        self.update_mines(now);
        self.update_monsters(&players, now, dt);
        self.collide_entities();

        if self.procedures.take_map_end() {
            info!(target: "sim::map", time = ?now, "map end reached");
            if let Some(hook) = self.map_end_hook.as_mut() {
                hook();
            }
        }
    }

    fn player_snapshots(&self) -> Vec<PlayerSnapshot> {
        self.entities
            .iter()
            .filter(|(_, entity)| entity.is_player())
            .map(|(&id, entity)| PlayerSnapshot {
                id,
                position: entity.position(),
                z_min_max: entity.z_min_max(),
            })
            .collect()
    }

    /// Performs side effects entities asked for during a callback.
    fn apply_requests(&mut self, requests: &mut Vec<MapRequest>) {
        for request in requests.drain(..) {
            match request {
                MapRequest::Shoot {
                    owner,
                    rocket_type,
                    from,
                    dir,
                } => {
                    if let Err(error) = self.shoot(owner, rocket_type, from, dir) {
                        warn!(target: "sim::map", owner = %owner, %error, "shot request dropped");
                    }
                }
                MapRequest::PlantMine { pos } => {
                    self.plant_mine(pos);
                }
                MapRequest::SpawnBodyPart {
                    monster_type,
                    part,
                    pos,
                    angle,
                } => self.events.monster_part_births.push(MonsterPartBirth {
                    monster_type,
                    part_id: part,
                    xyz: position_to_message(pos),
                    angle: angle_to_message(angle),
                }),
                MapRequest::PlayLinkedSound { monster, sound } => {
                    self.events.play_monster_linked_sound(monster, sound)
                }
                MapRequest::PlayMonsterSound { monster, sound } => self.events.play_monster_sound(monster, sound),
                MapRequest::PlayMapEventSound { pos, sound } => self.events.play_map_event_sound(pos, sound),
            }
        }
    }

    /// Starts a procedure without any gate.
    pub fn activate_procedure(&mut self, number: u16) -> Result<(), MapError> {
        self.procedure_state(number)?;
        self.procedures.activate(number, self.current_time);
        Ok(())
    }

    /// Reverses a running procedure early.
    pub fn return_procedure(&mut self, number: u16) -> Result<(), MapError> {
        self.procedure_state(number)?;
        self.procedures
            .return_procedure(&self.env, &self.config, number, self.current_time);
        Ok(())
    }

    /// Whether a procedure is idle.
    pub fn is_procedure_idle(&self, number: u16) -> Result<bool, MapError> {
        Ok(self.procedure_state(number)?.movement_state == MovementState::None)
    }
}

impl fmt::Debug for Map {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Map")
            .field("current_time", &self.current_time)
            .field("difficulty", &self.difficulty)
            .field("entities", &self.entities.len())
            .field("rockets", &self.rockets.len())
            .field("mines", &self.mines.len())
            .finish_non_exhaustive()
    }
}

/// Collision radius of a body; players share one radius.
fn body_radius(env: &Env, config: &SimConfig, entity: &Entity) -> f32 {
    if entity.is_player() {
        config.player_radius
    } else {
        env.resources()
            .monster(entity.monster_type())
            .map_or(0.0, |description| description.radius)
    }
}

fn collect_element_links(env: &Env) -> BTreeMap<IndexElement, Vec<Link>> {
    let level = env.level();
    let mut links: BTreeMap<IndexElement, Vec<Link>> = BTreeMap::new();
    for y in 0..MAP_SIZE {
        for x in 0..MAP_SIZE {
            let link = level.link_at(x, y);
            let element = level.element_at(x, y);
            if link.kind == LinkKind::None || element == IndexElement::None {
                continue;
            }
            links.entry(element).or_default().push(link);
        }
    }
    links
}

fn warn_inert_references(env: &Env) {
    let level = env.level();
    let resources = env.resources();
    let unknown_models = level
        .static_models
        .iter()
        .filter(|model| resources.model(model.model_id).is_none())
        .count();
    let unknown_items = level
        .items
        .iter()
        .filter(|item| resources.item(item.item_id).is_none())
        .count();
    let unknown_monsters = level
        .monsters
        .iter()
        .filter(|spawn| spawn.monster_id != PLAYER_MONSTER_TYPE)
        .filter(|spawn| resources.monster(spawn.monster_id).is_none())
        .count();
    if unknown_models + unknown_items + unknown_monsters > 0 {
        warn!(
            target: "sim::map",
            unknown_models,
            unknown_items,
            unknown_monsters,
            "level references undescribed resources; they will be inert"
        );
    }
}
