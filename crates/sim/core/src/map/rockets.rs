use std::time::Duration;

use glam::Vec3;
use tracing::{debug, trace};

use super::{Map, body_radius, world_view};
use crate::ballistics::{
    HIT_EFFECT_OFFSET, Hit, HitTarget, MineFate, SEGMENT_EPSILON, ShotScene, emit_monster_hit_effect,
    emit_rocket_hit_effect,
};
use crate::entity::PlayerSnapshot;
use crate::env::{IndexElement, LinkKind, ParticleEffect, RocketDescription, SoundId};
use crate::geometry::wall_normal;
use crate::messages::{DynamicItemDeath, RocketDeath};

impl Map {
    pub(super) fn update_rockets(&mut self, players: &[PlayerSnapshot], now: Duration, dt: Duration) {
        let env = self.env.clone();
        let mut r = 0;
        while r < self.rockets.len() {
            let rocket_type = self.rockets[r].rocket_type;
            let Some(description) = env.resources().rocket(rocket_type).copied() else {
                debug_assert!(false, "rocket type {rocket_type} was checked when fired");
                self.rockets.swap_remove(r);
                continue;
            };
            let target = if description.homing {
                world_view!(self, players)
                    .nearest_player(self.rockets[r].previous_position)
                    .map(|(_, pos)| pos)
            } else {
                None
            };

            let scene = ShotScene {
                env: &self.env,
                config: &self.config,
                index: &self.index,
                objects: &self.objects,
                entities: &self.entities,
            };
            let rocket = &mut self.rockets[r];
            let age = rocket.age(now);
            let hit = if description.hitscan {
                scene.process_shot(rocket.start_point, rocket.direction, f32::INFINITY, rocket.owner)
            } else {
                let new_pos = rocket.fly(&description, &self.config, now, dt, target);
                let segment = new_pos - rocket.previous_position;
                let mut hit = match segment.try_normalize() {
                    Some(dir) => scene.process_shot(
                        rocket.previous_position,
                        dir,
                        segment.length() + SEGMENT_EPSILON,
                        rocket.owner,
                    ),
                    None => None,
                };
                if description.reflect && hit.is_some_and(|hit| hit.target == HitTarget::Floor) {
                    hit = None;
                }
                if let Some(effect) = description.smoke_trail_effect {
                    rocket.emit_smoke_trail(new_pos, effect, &mut self.events);
                }
                rocket.previous_position = new_pos;
                hit
            };
            let rocket_id = rocket.id;

            if let Some(hit) = hit {
                trace!(target: "sim::ballistics", rocket = %rocket_id, target = %hit.target, "rocket hit");
                self.apply_rocket_hit(hit, rocket_type, &description, players, now);
            }

            if hit.is_some() || description.hitscan || age > self.config.max_rocket_lifetime {
                if !description.hitscan {
                    self.events.rocket_deaths.push(RocketDeath { rocket_id });
                }
                self.rockets.swap_remove(r);
            } else {
                r += 1;
            }
        }
    }

    fn apply_rocket_hit(
        &mut self,
        hit: Hit,
        rocket_type: u8,
        description: &RocketDescription,
        players: &[PlayerSnapshot],
        now: Duration,
    ) {
        let level = self.env.level();
        match hit.target {
            HitTarget::StaticWall(i) => {
                if let Some(wall) = level.static_walls.get(i as usize) {
                    let pos = hit.pos + wall_normal(wall.vert_pos[0], wall.vert_pos[1]) * HIT_EFFECT_OFFSET;
                    emit_rocket_hit_effect(&mut self.events, pos, rocket_type, description);
                }
                self.shoot_links(IndexElement::StaticWall(i), now);
            }
            HitTarget::DynamicWall(i) => {
                if let Some(wall) = self.objects.dynamic_walls.get(i as usize) {
                    let pos = hit.pos + wall_normal(wall.vert_pos[0], wall.vert_pos[1]) * HIT_EFFECT_OFFSET;
                    emit_rocket_hit_effect(&mut self.events, pos, rocket_type, description);
                }
                self.shoot_links(IndexElement::DynamicWall(i), now);
            }
            HitTarget::Floor => {
                let pos = hit.pos + Vec3::Z * HIT_EFFECT_OFFSET;
                emit_rocket_hit_effect(&mut self.events, pos, rocket_type, description);
            }
            HitTarget::Ceiling => {
                let pos = hit.pos - Vec3::Z * HIT_EFFECT_OFFSET;
                emit_rocket_hit_effect(&mut self.events, pos, rocket_type, description);
            }
            HitTarget::Model(i) => {
                emit_rocket_hit_effect(&mut self.events, hit.pos, rocket_type, description);
                self.damage_model(i as usize, description.power, now);
            }
            HitTarget::Monster(id) => {
                emit_monster_hit_effect(&mut self.events, hit.pos, rocket_type, description);
                let mut requests = Vec::new();
                let view = world_view!(self, players);
                match self.entities.get_mut(&id) {
                    Some(entity) => entity.hit(description.power, id, &view, &mut requests, now),
                    None => debug_assert!(false, "hit entity {id} vanished"),
                }
                self.apply_requests(&mut requests);
            }
        }
    }

    /// Shoot links of a model always fire; breakable models also lose health.
    fn damage_model(&mut self, index: usize, power: i32, now: Duration) {
        let Some(model) = self.objects.static_models.get(index) else {
            return;
        };
        let Some(blow_effect) = self
            .env
            .resources()
            .model(model.model_id)
            .map(|description| description.blow_effect)
        else {
            return;
        };
        let element = IndexElement::StaticModel(index as u16);
        self.shoot_links(element, now);

        if blow_effect == 0 {
            return;
        }
        let Some(model) = self.objects.static_models.get_mut(index) else {
            return;
        };
        model.health -= power;
        if model.health > 0 {
            return;
        }

        self.objects.destroy_model(&self.env, index, &mut self.events);
        if let Some(links) = self.element_links.get(&element) {
            for link in links.iter().filter(|link| link.kind == LinkKind::Destroy) {
                self.procedures.process_destroy(link.procedure, now);
            }
        }
    }

    fn shoot_links(&mut self, element: IndexElement, now: Duration) {
        if let Some(links) = self.element_links.get(&element) {
            for link in links.iter().filter(|link| link.kind == LinkKind::Shoot) {
                self.procedures.process_shoot(link.procedure, now);
            }
        }
    }

    pub(super) fn update_mines(&mut self, now: Duration) {
        let bodies: Vec<_> = self
            .entities
            .values()
            .map(|entity| {
                (
                    entity.position().truncate(),
                    body_radius(&self.env, &self.config, entity),
                )
            })
            .collect();

        let mut m = 0;
        while m < self.mines.len() {
            let mine = &self.mines[m];
            let fate = mine.check(&self.config, now, bodies.iter().copied());
            if fate == MineFate::Armed {
                m += 1;
                continue;
            }
            if fate == MineFate::Detonated {
                self.events.add_particle_effect(mine.pos, ParticleEffect::EXPLOSION);
                self.events.play_map_event_sound(mine.pos, SoundId::MINE_EXPLOSION);
            }
            debug!(target: "sim::ballistics", mine = %mine.id, %fate, "mine removed");
            self.events
                .dynamic_item_deaths
                .push(DynamicItemDeath { item_id: mine.id });
            self.mines.swap_remove(m);
        }
    }
}
