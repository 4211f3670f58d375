//! Read-only inputs of a level simulation.
//!
//! The level loader produces a [`LevelData`] and the game data loader a
//! [`GameResources`]. Both are shared by reference count between the map and
//! anything else that needs them; the simulation never mutates either.
mod codes;
mod error;
mod level;
mod procedure;
mod resources;

use std::sync::Arc;

pub use codes::{ActionCode, FloorTexture, ParticleEffect, SoundId};
pub use error::LevelDataError;
pub use level::{
    DifficultyFlags, IndexElement, LevelData, LevelItem, LevelModel, LevelWall, Link, LinkKind,
    MAP_SIZE, MonsterSpawn, PlayerSpawn, Teleport, WallFlags, WallTexture, cell_index,
};
pub use procedure::{CellRect, KeySet, Procedure, ProcedureCommand};
pub use resources::{
    GameResources, ItemDescription, ModelDescription, MonsterDescription, RocketDescription,
};

/// Shared bundle of immutable level inputs.
#[derive(Clone, Debug)]
pub struct Env {
    level: Arc<LevelData>,
    resources: Arc<GameResources>,
}

impl Env {
    pub fn new(level: Arc<LevelData>, resources: Arc<GameResources>) -> Self {
        Self { level, resources }
    }

    #[inline]
    pub fn level(&self) -> &LevelData {
        &self.level
    }

    #[inline]
    pub fn resources(&self) -> &GameResources {
        &self.resources
    }

    pub fn level_arc(&self) -> Arc<LevelData> {
        Arc::clone(&self.level)
    }

    pub fn resources_arc(&self) -> Arc<GameResources> {
        Arc::clone(&self.resources)
    }
}
