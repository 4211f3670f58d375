use std::collections::BTreeMap;
use std::ops::ControlFlow;

use glam::Vec3;

use crate::config::SimConfig;
use crate::entity::{Entity, EntityId};
use crate::env::{Env, FloorTexture, IndexElement, MAP_SIZE, WallFlags, cell_index};
use crate::geometry::{ray_intersect_cylinder, ray_intersect_wall, ray_intersect_xy_plane};
use crate::spatial::CollisionIndex;
use crate::world::MapObjects;

/// Obstacle struck by a shot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum HitTarget {
    StaticWall(u16),
    DynamicWall(u16),
    /// Index into the static model list.
    Model(u16),
    Monster(EntityId),
    Floor,
    Ceiling,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hit {
    pub target: HitTarget,
    pub pos: Vec3,
}

/// Everything a shot can strike, borrowed for one query.
#[derive(Clone, Copy)]
pub struct ShotScene<'a> {
    pub env: &'a Env,
    pub config: &'a SimConfig,
    pub index: &'a CollisionIndex,
    pub objects: &'a MapObjects,
    pub entities: &'a BTreeMap<EntityId, Entity>,
}

struct Nearest {
    origin: Vec3,
    best_distance_squared: f32,
    hit: Option<Hit>,
}

impl Nearest {
    fn offer(&mut self, pos: Vec3, target: HitTarget) {
        let distance_squared = pos.distance_squared(self.origin);
        if distance_squared < self.best_distance_squared {
            self.best_distance_squared = distance_squared;
            self.hit = Some(Hit { target, pos });
        }
    }
}

impl ShotScene<'_> {
    /// Nearest obstacle along a ray within `max_distance`, ignoring `skip`.
    ///
    /// `dir` must be normalized. Pass `f32::INFINITY` for an unbounded shot.
    pub fn process_shot(&self, from: Vec3, dir: Vec3, max_distance: f32, skip: EntityId) -> Option<Hit> {
        let level = self.env.level();
        let resources = self.env.resources();
        let walls_height = self.config.walls_height;
        let mut nearest = Nearest {
            origin: from,
            best_distance_squared: max_distance * max_distance,
            hit: None,
        };

        self.index.ray_cast(from, dir, max_distance, |element| {
            match element {
                IndexElement::StaticWall(i) => {
                    let Some(wall) = level.static_walls.get(i as usize) else {
                        return ControlFlow::Continue(());
                    };
                    if level.wall_flags(wall.texture_id).contains(WallFlags::SEE_THROUGH) {
                        return ControlFlow::Continue(());
                    }
                    if let Some(pos) =
                        ray_intersect_wall(wall.vert_pos[0], wall.vert_pos[1], 0.0, walls_height, from, dir)
                    {
                        nearest.offer(pos, HitTarget::StaticWall(i));
                    }
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
                    if let Some(pos) = ray_intersect_cylinder(
                        model.pos.truncate(),
                        description.radius,
                        description.z_min + model.pos.z,
                        description.z_max + model.pos.z,
                        from,
                        dir,
                    ) {
                        nearest.offer(pos, HitTarget::Model(i));
                    }
                }
                _ => {}
            }
            ControlFlow::Continue(())
        });

        for (i, wall) in self.objects.dynamic_walls.iter().enumerate() {
            if level.wall_flags(wall.texture_id).contains(WallFlags::SEE_THROUGH) {
                continue;
            }
            if let Some(pos) = ray_intersect_wall(
                wall.vert_pos[0],
                wall.vert_pos[1],
                wall.z,
                wall.z + walls_height,
                from,
                dir,
            ) {
                nearest.offer(pos, HitTarget::DynamicWall(i as u16));
            }
        }

        for (&id, entity) in self.entities {
            if id == skip {
                continue;
            }
            if let Some(pos) = entity.try_shot(from, dir) {
                nearest.offer(pos, HitTarget::Monster(id));
            }
        }

        for (z, textures, target) in [
            (0.0, &level.floor_textures, HitTarget::Floor),
            (walls_height, &level.ceiling_textures, HitTarget::Ceiling),
        ] {
            let Some(pos) = ray_intersect_xy_plane(z, from, dir) else {
                continue;
            };
            let (x, y) = (pos.x.floor(), pos.y.floor());
            if x < 0.0 || y < 0.0 || x >= MAP_SIZE as f32 || y >= MAP_SIZE as f32 {
                continue;
            }
            let texture = textures[cell_index(x as usize, y as usize)];
            if FloorTexture::is_solid(texture) {
                nearest.offer(pos, target);
            }
        }

        nearest.hit
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use glam::Vec2;

    use super::*;
    use crate::env::{GameResources, LevelData, LevelWall, WallTexture};

    fn scene_parts(level: LevelData) -> (Env, SimConfig, CollisionIndex, MapObjects) {
        let env = Env::new(Arc::new(level), Arc::new(GameResources::default()));
        let config = SimConfig::default();
        let index = CollisionIndex::new(env.level(), env.resources());
        let objects = MapObjects::new(&env, &config, std::time::Duration::ZERO);
        (env, config, index, objects)
    }

    fn open_level() -> LevelData {
        let mut level = LevelData::empty();
        level.floor_textures.fill(FloorTexture::SKY);
        level.ceiling_textures.fill(FloorTexture::SKY);
        level
    }

    #[test]
    fn no_obstacles_means_no_hit() {
        let (env, config, index, objects) = scene_parts(open_level());
        let entities = BTreeMap::new();
        let scene = ShotScene {
            env: &env,
            config: &config,
            index: &index,
            objects: &objects,
            entities: &entities,
        };
        let hit = scene.process_shot(Vec3::new(10.0, 10.0, 1.0), Vec3::X, f32::INFINITY, EntityId::NONE);
        assert_eq!(hit, None);
    }

    #[test]
    fn wall_at_distance_d_is_reported_at_d() {
        let mut level = open_level();
        level
            .static_walls
            .push(LevelWall::new(Vec2::new(15.0, 8.0), Vec2::new(15.0, 12.0), 0));
        let (env, config, index, objects) = scene_parts(level);
        let entities = BTreeMap::new();
        let scene = ShotScene {
            env: &env,
            config: &config,
            index: &index,
            objects: &objects,
            entities: &entities,
        };

        let from = Vec3::new(10.0, 10.0, 1.0);
        let hit = scene
            .process_shot(from, Vec3::X, f32::INFINITY, EntityId::NONE)
            .expect("wall in front");
        assert_eq!(hit.target, HitTarget::StaticWall(0));
        assert!((hit.pos.distance(from) - 5.0).abs() < 1e-4);

        let short = scene.process_shot(from, Vec3::X, 4.0, EntityId::NONE);
        assert_eq!(short, None);
    }

    #[test]
    fn see_through_walls_are_skipped() {
        let mut level = open_level();
        level.wall_textures = vec![
            WallTexture::default(),
            WallTexture {
                flags: WallFlags::SEE_THROUGH,
            },
        ];
        level
            .static_walls
            .push(LevelWall::new(Vec2::new(12.0, 8.0), Vec2::new(12.0, 12.0), 1));
        level
            .static_walls
            .push(LevelWall::new(Vec2::new(15.0, 8.0), Vec2::new(15.0, 12.0), 0));
        let (env, config, index, objects) = scene_parts(level);
        let entities = BTreeMap::new();
        let scene = ShotScene {
            env: &env,
            config: &config,
            index: &index,
            objects: &objects,
            entities: &entities,
        };

        let hit = scene.process_shot(Vec3::new(10.0, 10.0, 1.0), Vec3::X, f32::INFINITY, EntityId::NONE);
        assert_eq!(hit.map(|h| h.target), Some(HitTarget::StaticWall(1)));
    }

    #[test]
    fn floor_hit_needs_solid_texture() {
        let mut level = open_level();
        level.floor_textures[cell_index(10, 10)] = 3;
        let (env, config, index, objects) = scene_parts(level);
        let entities = BTreeMap::new();
        let scene = ShotScene {
            env: &env,
            config: &config,
            index: &index,
            objects: &objects,
            entities: &entities,
        };

        let down = Vec3::new(0.0, 0.0, -1.0);
        let hit = scene.process_shot(Vec3::new(10.5, 10.5, 1.0), down, f32::INFINITY, EntityId::NONE);
        assert_eq!(hit.map(|h| h.target), Some(HitTarget::Floor));

        let miss = scene.process_shot(Vec3::new(20.5, 10.5, 1.0), down, f32::INFINITY, EntityId::NONE);
        assert_eq!(miss, None);
    }
}
