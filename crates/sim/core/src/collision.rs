//! Body-vs-geometry and body-vs-body resolution.
use glam::{Vec2, Vec3};

use crate::config::SimConfig;
use crate::env::{Env, IndexElement, WallFlags};
use crate::geometry::collide_circle_with_segment;
use crate::spatial::CollisionIndex;
use crate::world::MapObjects;

/// Pairs farther apart than this are never tested precisely.
const PAIR_CUTOFF: f32 = 8.0;

/// Where a body ends up after map collision.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MapContact {
    pub pos: Vec3,
    pub on_floor: bool,
}

impl MapContact {
    /// Surface normals to clamp velocity against, given the original position.
    pub fn clamp_normals(&self, from: Vec3) -> impl Iterator<Item = Vec3> {
        let delta = self.pos - from;
        let vertical = (delta.z != 0.0).then(|| Vec3::Z * delta.z.signum());
        let planar = delta.truncate();
        let planar_len = planar.length();
        let horizontal = (planar_len != 0.0).then(|| (planar / planar_len).extend(0.0));
        vertical.into_iter().chain(horizontal)
    }
}

#[derive(Clone, Copy)]
pub struct CollisionScene<'a> {
    pub env: &'a Env,
    pub config: &'a SimConfig,
    pub index: &'a CollisionIndex,
    pub objects: &'a MapObjects,
}

impl CollisionScene<'_> {
    /// Pushes a vertical cylinder out of walls and models, then clamps it
    /// between floor and ceiling.
    pub fn collide_with_map(&self, from: Vec3, height: f32, radius: f32) -> MapContact {
        let level = self.env.level();
        let resources = self.env.resources();
        let walls_height = self.config.walls_height;
        let z_pull = self.config.z_pull_distance;

        let z_bottom = from.z;
        let z_top = z_bottom + height;
        let mut pos = from.truncate();
        let mut new_z = from.z;
        let mut on_floor = false;

        self.index.query_radius(pos, radius, |element| match element {
            IndexElement::StaticWall(i) => {
                let Some(wall) = level.static_walls.get(i as usize) else {
                    return;
                };
                if level.wall_flags(wall.texture_id).contains(WallFlags::PASSABLE) {
                    return;
                }
                if let Some(pushed) = collide_circle_with_segment(wall.vert_pos[0], wall.vert_pos[1], pos, radius) {
                    pos = pushed;
                }
            }
            IndexElement::StaticModel(i) => {
                let Some(model) = self.objects.static_models.get(i as usize) else {
                    return;
                };
                let Some(description) = resources.model(model.model_id) else {
                    return;
                };
                if description.radius <= 0.0 {
                    return;
                }
                let model_z_min = description.z_min + model.pos.z;
                let model_z_max = description.z_max + model.pos.z;
                if z_top < model_z_min || z_bottom > model_z_max {
                    return;
                }

                let min_distance = radius + description.radius;
                let to_body = pos - model.pos.truncate();
                let distance_squared = to_body.length_squared();
                if distance_squared > min_distance * min_distance {
                    return;
                }

                if model_z_max - z_bottom <= z_pull {
                    new_z = new_z.max(model_z_max);
                    on_floor = true;
                } else if z_top - model_z_min <= z_pull {
                    new_z = new_z.min(model_z_min - height);
                } else if distance_squared > 0.0 {
                    pos = model.pos.truncate() + to_body * (min_distance / distance_squared.sqrt());
                }
            }
            _ => {}
        });

        for wall in &self.objects.dynamic_walls {
            if wall.is_degenerate() || level.wall_flags(wall.texture_id).contains(WallFlags::PASSABLE) {
                continue;
            }
            if z_top < wall.z || z_bottom > wall.z + walls_height {
                continue;
            }
            if let Some(pushed) = collide_circle_with_segment(wall.vert_pos[0], wall.vert_pos[1], pos, radius) {
                pos = pushed;
            }
        }

        if new_z <= 0.0 {
            on_floor = true;
            new_z = 0.0;
        } else if new_z + height > walls_height {
            new_z = walls_height - height;
        }

        MapContact {
            pos: pos.extend(new_z),
            on_floor,
        }
    }
}

/// A live body taking part in pair resolution.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Body {
    pub pos: Vec3,
    pub radius: f32,
    /// Vertical extent relative to `pos`.
    pub z_min_max: Vec2,
    pub is_player: bool,
}

impl Body {
    fn z_range(&self) -> Vec2 {
        self.z_min_max + Vec2::splat(self.pos.z)
    }
}

/// Separates interpenetrating bodies pair by pair, in order.
///
/// A player is never moved by a monster; the monster takes the whole
/// correction. Two monsters or two players split it evenly.
pub fn resolve_pairs(bodies: &mut [Body]) {
    for i in 0..bodies.len() {
        for j in (i + 1)..bodies.len() {
            let (first, second) = (bodies[i], bodies[j]);

            let delta = second.pos.truncate() - first.pos.truncate();
            let distance_squared = delta.length_squared();
            if distance_squared > PAIR_CUTOFF * PAIR_CUTOFF {
                continue;
            }
            let min_distance = first.radius + second.radius;
            if distance_squared > min_distance * min_distance {
                continue;
            }
            let (first_z, second_z) = (first.z_range(), second.z_range());
            if first_z.y < second_z.x || second_z.y < first_z.x {
                continue;
            }

            let Some(axis) = delta.try_normalize() else {
                continue;
            };
            let push = min_distance - distance_squared.sqrt();
            let first_share = match (first.is_player, second.is_player) {
                (true, false) => 0.0,
                (false, true) => 1.0,
                _ => 0.5,
            };

            bodies[i].pos -= (axis * push * first_share).extend(0.0);
            bodies[j].pos += (axis * push * (1.0 - first_share)).extend(0.0);
        }
    }
}
