use std::time::Duration;

use glam::{Vec2, Vec3};

use crate::config::SimConfig;
use crate::entity::EntityId;
use crate::messages::{DynamicItemBirth, position_to_message};

/// Item type clients render for a planted mine.
pub const MINE_ITEM_TYPE: u8 = 30;
/// Probe radius used to find the floor under a new mine.
pub const MINE_FLOOR_RADIUS: f32 = 0.2;
/// Bodies farther than this are never checked precisely.
const ACTIVATION_CUTOFF: f32 = 8.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum MineFate {
    Armed,
    Expired,
    Detonated,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Mine {
    pub id: EntityId,
    pub pos: Vec3,
    pub planting_time: Duration,
}

impl Mine {
    /// Decides what happens to the mine at `now`.
    ///
    /// `bodies` yields the planar position and radius of every live body.
    pub fn check(
        &self,
        config: &SimConfig,
        now: Duration,
        bodies: impl IntoIterator<Item = (Vec2, f32)>,
    ) -> MineFate {
        let age = now.saturating_sub(self.planting_time);
        if age > config.max_mine_lifetime {
            return MineFate::Expired;
        }
        if age < config.mines_preparation_time {
            return MineFate::Armed;
        }

        let center = self.pos.truncate();
        let triggered = bodies.into_iter().any(|(pos, radius)| {
            let distance_squared = pos.distance_squared(center);
            if distance_squared > ACTIVATION_CUTOFF * ACTIVATION_CUTOFF {
                return false;
            }
            let activation = config.mines_activation_radius + radius;
            distance_squared < activation * activation
        });
        if triggered {
            MineFate::Detonated
        } else {
            MineFate::Armed
        }
    }

    pub fn birth_message(&self) -> DynamicItemBirth {
        DynamicItemBirth {
            item_id: self.id,
            item_type_id: MINE_ITEM_TYPE,
            xyz: position_to_message(self.pos),
        }
    }
}
