use glam::Vec3;

use super::EntityId;
use crate::env::SoundId;

/// Side effect an entity asks the map to perform after its callback returns.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MapRequest {
    Shoot {
        owner: EntityId,
        rocket_type: u8,
        from: Vec3,
        /// Normalized.
        dir: Vec3,
    },
    PlantMine {
        pos: Vec3,
    },
    SpawnBodyPart {
        monster_type: u8,
        part: u8,
        pos: Vec3,
        angle: f32,
    },
    PlayLinkedSound {
        monster: EntityId,
        sound: SoundId,
    },
    PlayMonsterSound {
        monster: EntityId,
        sound: u8,
    },
    PlayMapEventSound {
        pos: Vec3,
        sound: SoundId,
    },
}
