//! Mutable per-map world state that mirrors level-data slots.
mod fields;
mod objects;

use glam::Vec2;

use crate::env::{ActionCode, Env};

pub use fields::{DeathCell, Fields};
pub use objects::{AnimationState, DynamicWall, Item, MapObjects, StaticModel, Transform};

/// Model tops at or above this height are never stood on.
pub const MAX_FLOOR_LEVEL: f32 = 1.2;

/// Height of the highest low obstacle under a disc.
///
/// Only level-placed, non-moving, non-interactive models with a physical
/// radius count. Returns `0.0` over bare floor.
pub fn floor_level(env: &Env, pos: Vec2, radius: f32) -> f32 {
    let resources = env.resources();
    env.level()
        .static_models
        .iter()
        .filter(|model| !model.is_dynamic)
        .filter_map(|model| {
            let description = resources.model(model.model_id)?;
            if description.action_code != ActionCode::NONE || description.radius <= 0.0 {
                return None;
            }
            let reach = description.radius + radius;
            if pos.distance_squared(model.pos) > reach * reach {
                return None;
            }
            (description.z_max < MAX_FLOOR_LEVEL).then_some(description.z_max)
        })
        .fold(0.0, f32::max)
}
