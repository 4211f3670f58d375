use std::time::Duration;

use glam::{Vec2, Vec3};
use tracing::trace;

use super::{Map, body_radius, world_view};
use crate::collision::{Body, CollisionScene, resolve_pairs};
use crate::config::SimConfig;
use crate::entity::{EntityId, PlayerSnapshot};
use crate::env::Env;
use crate::world::floor_level;

/// Bodies closer than this to a teleport cell centre are teleported.
const TELEPORT_RADIUS: f32 = 0.4;

impl Map {
    /// Lets every controller act, then applies teleports, wind and death zones.
    pub(super) fn update_monsters(&mut self, players: &[PlayerSnapshot], now: Duration, dt: Duration) {
        let death_ticks = death_ticks(self.config.death_ticks_per_second, now, dt);
        let wind_scale = dt.as_secs_f32() * self.config.wind_speed_factor;
        let player_height = self.config.player_height;

        let ids: Vec<EntityId> = self.entities.keys().copied().collect();
        let mut requests = Vec::new();
        for id in ids {
            let view = world_view!(self, players);
            let Some(entity) = self.entities.get_mut(&id) else {
                continue;
            };
            entity.tick(id, &view, &mut requests, now, dt);

            if let Some((pos, angle)) = teleport_target(&self.env, &self.config, entity.position()) {
                trace!(target: "sim::map", entity = %id, "teleported");
                entity.teleport(pos, angle);
            }

            let pos = entity.position();
            let wind = self.fields.wind_at(pos);
            if wind.length_squared() > 0.0 {
                entity.set_position(pos + (wind * wind_scale).extend(0.0));
            }

            if death_ticks > 0 {
                let pos = entity.position();
                if let Some(cell) = self.fields.death_at(pos) {
                    if cell.damage > 0 && cell.overlaps(pos.z, player_height) {
                        let damage = i32::from(cell.damage) * death_ticks as i32;
                        entity.hit(damage, id, &view, &mut requests, now);
                    }
                }
            }

            self.apply_requests(&mut requests);
        }
    }

    /// Resolves bodies against the map, then against each other.
    pub(super) fn collide_entities(&mut self) {
        let scene = CollisionScene {
            env: &self.env,
            config: &self.config,
            index: &self.index,
            objects: &self.objects,
        };
        let height = self.config.player_height;
        for entity in self.entities.values_mut() {
            if entity.is_noclip() {
                continue;
            }
            let radius = body_radius(&self.env, &self.config, entity);
            let from = entity.position();
            let contact = scene.collide_with_map(from, height, radius);
            for normal in contact.clamp_normals(from) {
                entity.clamp_speed(normal);
            }
            entity.set_position(contact.pos);
            entity.set_on_floor(contact.on_floor);
        }

        let (ids, mut bodies): (Vec<EntityId>, Vec<Body>) = self
            .entities
            .iter()
            .filter(|(_, entity)| entity.health() > 0)
            .map(|(&id, entity)| {
                let body = Body {
                    pos: entity.position(),
                    radius: body_radius(&self.env, &self.config, entity),
                    z_min_max: entity.z_min_max(),
                    is_player: entity.is_player(),
                };
                (id, body)
            })
            .unzip();
        resolve_pairs(&mut bodies);
        for (id, body) in ids.into_iter().zip(bodies) {
            if let Some(entity) = self.entities.get_mut(&id) {
                if entity.position() != body.pos {
                    entity.set_position(body.pos);
                }
            }
        }
    }
}

/// Whole damage ticks elapsed between the previous tick and `now`.
fn death_ticks(ticks_per_second: f32, now: Duration, dt: Duration) -> u32 {
    let previous = now.saturating_sub(dt);
    let count = |time: Duration| (ticks_per_second * time.as_secs_f32()).floor() as u32;
    count(now).saturating_sub(count(previous))
}

/// Destination of the first teleport whose cell centre is near `pos`.
fn teleport_target(env: &Env, config: &SimConfig, pos: Vec3) -> Option<(Vec3, f32)> {
    let planar = pos.truncate();
    env.level()
        .teleports
        .iter()
        .find(|teleport| {
            let centre = Vec2::new(teleport.from[0] as f32 + 0.5, teleport.from[1] as f32 + 0.5);
            centre.distance_squared(planar) < TELEPORT_RADIUS * TELEPORT_RADIUS
        })
        .map(|teleport| {
            let target = teleport.target();
            let z = floor_level(env, target, config.player_radius);
            (target.extend(z), teleport.angle)
        })
}
