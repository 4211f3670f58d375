//! Canonical serialized form of the mutable map state.
use std::fmt;

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::ballistics::{Mine, Rocket};
use crate::entity::EntityId;
use crate::procedure::ProcedureState;
use crate::world::AnimationState;

use super::Map;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EntitySnapshot {
    pub id: EntityId,
    pub position: Vec3,
    pub health: i32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WallSnapshot {
    pub vert_pos: [Vec2; 2],
    pub z: f32,
    pub texture_id: u8,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModelSnapshot {
    pub model_id: u8,
    pub health: i32,
    pub pos: Vec3,
    pub angle: f32,
    pub animation_state: AnimationState,
    pub current_frame: u32,
    pub picked: bool,
}

/// Everything that evolves while a level runs, in a stable order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MapSnapshot {
    pub procedures: Vec<ProcedureState>,
    pub entities: Vec<EntitySnapshot>,
    pub walls: Vec<WallSnapshot>,
    pub models: Vec<ModelSnapshot>,
    pub items_picked: Vec<bool>,
    pub rockets: Vec<Rocket>,
    pub mines: Vec<Mine>,
}

/// SHA-256 digest of a [`MapSnapshot`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StateRoot(pub [u8; 32]);

impl fmt::Display for StateRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl Map {
    pub fn snapshot(&self) -> MapSnapshot {
        MapSnapshot {
            procedures: self.procedures.states().to_vec(),
            entities: self
                .entities
                .iter()
                .map(|(&id, entity)| EntitySnapshot {
                    id,
                    position: entity.position(),
                    health: entity.health(),
                })
                .collect(),
            walls: self
                .objects
                .dynamic_walls
                .iter()
                .map(|wall| WallSnapshot {
                    vert_pos: wall.vert_pos,
                    z: wall.z,
                    texture_id: wall.texture_id,
                })
                .collect(),
            models: self
                .objects
                .static_models
                .iter()
                .map(|model| ModelSnapshot {
                    model_id: model.model_id,
                    health: model.health,
                    pos: model.pos,
                    angle: model.angle,
                    animation_state: model.animation_state,
                    current_frame: model.current_frame,
                    picked: model.picked,
                })
                .collect(),
            items_picked: self.objects.items.iter().map(|item| item.picked).collect(),
            rockets: self.rockets.clone(),
            mines: self.mines.clone(),
        }
    }

    /// Deterministic digest of [`Map::snapshot`]; equal states hash equal.
    pub fn state_root(&self) -> StateRoot {
        let mut hasher = Sha256::new();
        // Snapshot fields are plain data; encoding cannot fail.
        if let Ok(bytes) = bincode::serialize(&self.snapshot()) {
            hasher.update(&bytes);
        }
        StateRoot(hasher.finalize().into())
    }
}
