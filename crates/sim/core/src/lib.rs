//! Authoritative server-side simulation of one level.
//!
//! `sim-core` advances a [`Map`] in discrete ticks: scripted procedures move
//! walls and models, rockets and mines resolve against the level geometry,
//! monsters and players are collided and exposed to environmental fields.
//! Everything observers need is emitted as [`messages::Message`]s through a
//! [`messages::MessageSink`]. The crate performs no I/O; hosts such as
//! `sim-runtime` own the clock and the transport.
pub mod ballistics;
pub mod collision;
pub mod config;
pub mod entity;
pub mod env;
pub mod error;
pub mod events;
pub mod geometry;
pub mod map;
pub mod messages;
pub mod procedure;
pub mod spatial;
pub mod world;

pub use ballistics::{Hit, HitTarget, Mine, MineFate, Rocket};
pub use config::SimConfig;
pub use entity::{
    Actor, Entity, EntityId, MapRequest, MonsterFactory, PLAYER_MONSTER_TYPE, PlayerBehavior,
    PlayerSnapshot, WorldView,
};
pub use env::{
    ActionCode, DifficultyFlags, Env, GameResources, IndexElement, KeySet, LevelData,
    LevelDataError, Link, LinkKind, MAP_SIZE, ParticleEffect, Procedure, ProcedureCommand, SoundId,
};
pub use error::{ErrorSeverity, MapError, SimError};
pub use events::UpdateEvents;
pub use map::{Map, MapEndHook};
#[cfg(feature = "serde")]
pub use map::{MapSnapshot, StateRoot};
pub use messages::{Message, MessageLog, MessageSink};
pub use procedure::{ActivationOutcome, MovementState, ProcedureState};
pub use world::{AnimationState, MapObjects};
