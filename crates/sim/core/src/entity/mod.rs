//! Players and monsters as seen by the simulation.
//!
//! Decision making lives outside this crate. The map drives each entity
//! through [`Actor::tick`] and reacts to the position and health it reports;
//! entities ask the map for side effects by pushing [`MapRequest`]s.
mod request;
mod view;

use std::fmt;
use std::time::Duration;

use glam::{Vec2, Vec3};

use crate::env::{KeySet, MonsterSpawn};

pub use request::MapRequest;
pub use view::{PlayerSnapshot, WorldView};

/// Identity shared by players, monsters, rockets and mines.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EntityId(pub u32);

impl EntityId {
    /// Reserved for "no owner".
    pub const NONE: Self = Self(0);

    #[inline]
    pub const fn is_none(self) -> bool {
        self.0 == Self::NONE.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Monster type reserved for players.
pub const PLAYER_MONSTER_TYPE: u8 = 0;

/// Capabilities every simulated body exposes to the map.
pub trait Actor: Send {
    fn position(&self) -> Vec3;
    fn set_position(&mut self, pos: Vec3);
    fn angle(&self) -> f32;
    fn health(&self) -> i32;
    /// Monster type; [`PLAYER_MONSTER_TYPE`] for players.
    fn monster_type(&self) -> u8;
    /// Vertical extent relative to [`Actor::position`].
    fn z_min_max(&self) -> Vec2;

    fn teleport(&mut self, pos: Vec3, angle: f32);
    /// Removes the velocity component along `surface_normal`.
    fn clamp_speed(&mut self, surface_normal: Vec3);
    fn set_on_floor(&mut self, on_floor: bool);

    /// Applies damage. Side effects go through `requests`.
    fn hit(
        &mut self,
        damage: i32,
        self_id: EntityId,
        world: &WorldView<'_>,
        requests: &mut Vec<MapRequest>,
        now: Duration,
    );

    /// Intersection of a shot ray with this body, if any.
    fn try_shot(&self, from: Vec3, dir: Vec3) -> Option<Vec3>;

    fn tick(
        &mut self,
        self_id: EntityId,
        world: &WorldView<'_>,
        requests: &mut Vec<MapRequest>,
        now: Duration,
        dt: Duration,
    );

    fn body_parts_mask(&self) -> u8 {
        0
    }

    fn animation(&self) -> u16 {
        0
    }

    fn animation_frame(&self) -> u16 {
        0
    }
}

/// Player-only capabilities.
pub trait PlayerBehavior: Actor {
    /// Debounce gate; returning `false` ignores the activation entirely.
    fn try_activate_procedure(&mut self, procedure: u16, now: Duration) -> bool;
    fn reset_activated_procedure(&mut self);
    fn keys(&self) -> KeySet;
    fn give_key(&mut self, key: KeySet);
    /// Returns whether the item was taken.
    fn try_pickup_item(&mut self, item_id: u8) -> bool;
    fn is_noclip(&self) -> bool {
        false
    }
}

/// Builds monster controllers for level spawn points.
pub trait MonsterFactory {
    fn create(&self, spawn: &MonsterSpawn, floor_z: f32, now: Duration) -> Box<dyn Actor>;
}

/// Closed set of entity kinds stored by the map.
pub enum Entity {
    Player(Box<dyn PlayerBehavior>),
    Monster(Box<dyn Actor>),
}

macro_rules! delegate {
    ($self:ident, $entity:ident => $body:expr) => {
        match $self {
            Entity::Player($entity) => $body,
            Entity::Monster($entity) => $body,
        }
    };
}

impl Entity {
    pub fn is_player(&self) -> bool {
        matches!(self, Entity::Player(_))
    }

    pub fn as_player(&self) -> Option<&dyn PlayerBehavior> {
        match self {
            Entity::Player(player) => Some(&**player),
            Entity::Monster(_) => None,
        }
    }

    pub fn as_player_mut(&mut self) -> Option<&mut dyn PlayerBehavior> {
        match self {
            Entity::Player(player) => Some(&mut **player),
            Entity::Monster(_) => None,
        }
    }

    pub fn position(&self) -> Vec3 {
        delegate!(self, e => e.position())
    }

    pub fn set_position(&mut self, pos: Vec3) {
        delegate!(self, e => e.set_position(pos))
    }

    pub fn angle(&self) -> f32 {
        delegate!(self, e => e.angle())
    }

    pub fn health(&self) -> i32 {
        delegate!(self, e => e.health())
    }

    pub fn monster_type(&self) -> u8 {
        delegate!(self, e => e.monster_type())
    }

    pub fn z_min_max(&self) -> Vec2 {
        delegate!(self, e => e.z_min_max())
    }

    pub fn teleport(&mut self, pos: Vec3, angle: f32) {
        delegate!(self, e => e.teleport(pos, angle))
    }

    pub fn clamp_speed(&mut self, surface_normal: Vec3) {
        delegate!(self, e => e.clamp_speed(surface_normal))
    }

    pub fn set_on_floor(&mut self, on_floor: bool) {
        delegate!(self, e => e.set_on_floor(on_floor))
    }

    pub fn hit(
        &mut self,
        damage: i32,
        self_id: EntityId,
        world: &WorldView<'_>,
        requests: &mut Vec<MapRequest>,
        now: Duration,
    ) {
        delegate!(self, e => e.hit(damage, self_id, world, requests, now))
    }

    pub fn try_shot(&self, from: Vec3, dir: Vec3) -> Option<Vec3> {
        delegate!(self, e => e.try_shot(from, dir))
    }

    pub fn tick(
        &mut self,
        self_id: EntityId,
        world: &WorldView<'_>,
        requests: &mut Vec<MapRequest>,
        now: Duration,
        dt: Duration,
    ) {
        delegate!(self, e => e.tick(self_id, world, requests, now, dt))
    }

    pub fn body_parts_mask(&self) -> u8 {
        delegate!(self, e => e.body_parts_mask())
    }

    pub fn animation(&self) -> u16 {
        delegate!(self, e => e.animation())
    }

    pub fn animation_frame(&self) -> u16 {
        delegate!(self, e => e.animation_frame())
    }

    /// Whether map collision skips this entity.
    pub fn is_noclip(&self) -> bool {
        self.as_player().is_some_and(|player| player.is_noclip())
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.is_player() { "Player" } else { "Monster" };
        f.debug_struct(kind)
            .field("monster_type", &self.monster_type())
            .field("position", &self.position())
            .field("health", &self.health())
            .finish()
    }
}
