use std::ops::ControlFlow;
use std::time::Duration;

use glam::{Vec2, Vec3};

use super::EntityId;
use crate::config::SimConfig;
use crate::env::{Env, IndexElement, WallFlags};
use crate::geometry::{ray_intersect_cylinder, ray_intersect_wall};
use crate::spatial::CollisionIndex;
use crate::world::{MapObjects, floor_level};

/// Position of a connected player at the start of the current step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayerSnapshot {
    pub id: EntityId,
    pub position: Vec3,
    pub z_min_max: Vec2,
}

/// Read-only window onto the map handed to entity callbacks.
#[derive(Clone, Copy)]
pub struct WorldView<'a> {
    pub(crate) env: &'a Env,
    pub(crate) config: &'a SimConfig,
    pub(crate) index: &'a CollisionIndex,
    pub(crate) objects: &'a MapObjects,
    pub(crate) players: &'a [PlayerSnapshot],
    pub(crate) now: Duration,
}

impl<'a> WorldView<'a> {
    pub fn env(&self) -> &'a Env {
        self.env
    }

    pub fn config(&self) -> &'a SimConfig {
        self.config
    }

    pub fn current_time(&self) -> Duration {
        self.now
    }

    pub fn players(&self) -> &'a [PlayerSnapshot] {
        self.players
    }

    pub fn floor_level(&self, pos: Vec2, radius: f32) -> f32 {
        floor_level(self.env, pos, radius)
    }

    /// Closest player to `pos`, aimed at the middle of its body.
    pub fn nearest_player(&self, pos: Vec3) -> Option<(EntityId, Vec3)> {
        self.players
            .iter()
            .map(|player| {
                let mid = (player.z_min_max.x + player.z_min_max.y) * 0.5;
                (player.id, player.position + Vec3::Z * mid)
            })
            .min_by(|(_, a), (_, b)| {
                a.distance_squared(pos)
                    .total_cmp(&b.distance_squared(pos))
            })
    }

    /// Whether nothing opaque lies between two points.
    pub fn can_see(&self, from: Vec3, to: Vec3) -> bool {
        if from == to {
            return true;
        }
        let max_distance = from.distance(to);
        let dir = (to - from) / max_distance;
        let occludes = |point: Vec3| point.distance_squared(from) <= max_distance * max_distance;

        let level = self.env.level();
        let resources = self.env.resources();
        let mut visible = true;
        self.index.ray_cast(from, dir, max_distance, |element| {
            let hit = match element {
                IndexElement::StaticWall(i) => {
                    let Some(wall) = level.static_walls.get(i as usize) else {
                        return ControlFlow::Continue(());
                    };
                    if level.wall_flags(wall.texture_id).contains(WallFlags::SEE_THROUGH) {
                        return ControlFlow::Continue(());
                    }
                    ray_intersect_wall(
                        wall.vert_pos[0],
                        wall.vert_pos[1],
                        0.0,
                        self.config.walls_height,
                        from,
                        dir,
                    )
                }
                IndexElement::StaticModel(i) => {
                    let Some(model) = self.objects.static_models.get(i as usize) else {
                        return ControlFlow::Continue(());
                    };
                    let Some(description) = resources.model(model.model_id) else {
                        return ControlFlow::Continue(());
                    };
                    if description.radius <= 0.0 {
                        return ControlFlow::Continue(());
                    }
                    ray_intersect_cylinder(
                        model.pos.truncate(),
                        description.radius,
                        description.z_min + model.pos.z,
                        description.z_max + model.pos.z,
                        from,
                        dir,
                    )
                }
                _ => None,
            };
            if hit.is_some_and(occludes) {
                visible = false;
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });
        if !visible {
            return false;
        }

        !self.objects.dynamic_walls.iter().any(|wall| {
            !level.wall_flags(wall.texture_id).contains(WallFlags::SEE_THROUGH)
                && ray_intersect_wall(
                    wall.vert_pos[0],
                    wall.vert_pos[1],
                    wall.z,
                    wall.z + self.config.walls_height,
                    from,
                    dir,
                )
                .is_some_and(occludes)
        })
    }
}
