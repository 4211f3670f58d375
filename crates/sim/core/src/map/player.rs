use std::collections::BTreeMap;
use std::time::Duration;

use glam::Vec2;
use tracing::debug;

use super::Map;
use crate::config::SimConfig;
use crate::entity::{EntityId, PlayerBehavior};
use crate::env::{ActionCode, Env, IndexElement, KeySet, Link, LinkKind, MAP_SIZE, SoundId, WallFlags};
use crate::error::MapError;
use crate::geometry::{circle_intersects_cell, collide_circle_with_segment};
use crate::messages::MessageSink;
use crate::procedure::{ActivationOutcome, ProcedureEngine};

/// Floor links are probed this many cells around the player.
const FLOOR_PROBE_CELLS: i64 = 2;

/// Procedure triggers reachable while processing one player.
struct Triggers<'a> {
    env: &'a Env,
    config: &'a SimConfig,
    element_links: &'a BTreeMap<IndexElement, Vec<Link>>,
    procedures: &'a mut ProcedureEngine,
    now: Duration,
}

impl Triggers<'_> {
    fn activate(&mut self, procedure: u16, player: &mut dyn PlayerBehavior, sink: &mut dyn MessageSink) {
        let outcome = self
            .procedures
            .try_activate(self.env, procedure, self.now, player, sink);
        if outcome != ActivationOutcome::Debounced {
            debug!(target: "sim::map", procedure, %outcome, "player touched procedure trigger");
        }
    }

    fn return_procedure(&mut self, procedure: u16) {
        self.procedures
            .return_procedure(self.env, self.config, procedure, self.now);
    }

    /// Runs the touch links of an element; `Return` links only when allowed.
    fn touch(
        &mut self,
        element: IndexElement,
        with_return: bool,
        player: &mut dyn PlayerBehavior,
        sink: &mut dyn MessageSink,
    ) {
        let element_links = self.element_links;
        let Some(links) = element_links.get(&element) else {
            return;
        };
        for link in links {
            match link.kind {
                LinkKind::Link => self.activate(link.procedure, player, sink),
                LinkKind::Return if with_return => self.return_procedure(link.procedure),
                _ => {}
            }
        }
    }
}

fn key_for(code: ActionCode) -> Option<KeySet> {
    match code {
        ActionCode::RED_KEY => Some(KeySet::RED),
        ActionCode::GREEN_KEY => Some(KeySet::GREEN),
        ActionCode::BLUE_KEY => Some(KeySet::BLUE),
        _ => None,
    }
}

fn pickup_sound(code: ActionCode) -> SoundId {
    if let Some(weapon) = code.weapon_index() {
        SoundId::FIRST_WEAPON_PICKUP.offset(weapon as u16)
    } else if code.is_life() {
        SoundId::HEALTH
    } else if code.is_ammo() {
        SoundId::FIRST_WEAPON_PICKUP.offset(1)
    } else {
        SoundId::ITEM_UP
    }
}

impl Map {
    /// Player-gated activation of a procedure by number.
    pub fn try_activate_procedure(
        &mut self,
        player_id: EntityId,
        number: u16,
        sink: &mut dyn MessageSink,
    ) -> Result<ActivationOutcome, MapError> {
        self.procedure_state(number)?;
        let player = self
            .entities
            .get_mut(&player_id)
            .ok_or(MapError::UnknownEntity(player_id))?
            .as_player_mut()
            .ok_or(MapError::NotAPlayer(player_id))?;
        Ok(self
            .procedures
            .try_activate(&self.env, number, self.current_time, player, sink))
    }

    /// Fires everything the player's current position touches: floor,
    /// wall and model links, key pickups and item pickups.
    ///
    /// Text notifications produced by activation attempts go to `sink`.
    pub fn process_player_position(
        &mut self,
        player_id: EntityId,
        sink: &mut dyn MessageSink,
    ) -> Result<(), MapError> {
        let player = self
            .entities
            .get_mut(&player_id)
            .ok_or(MapError::UnknownEntity(player_id))?
            .as_player_mut()
            .ok_or(MapError::NotAPlayer(player_id))?;

        let position = player.position();
        let (cell_x, cell_y) = (position.x.floor() as i64, position.y.floor() as i64);
        if cell_x < 0 || cell_y < 0 || cell_x >= MAP_SIZE as i64 || cell_y >= MAP_SIZE as i64 {
            return Ok(());
        }

        let env = &self.env;
        let config = &self.config;
        let level = env.level();
        let resources = env.resources();
        let mut triggers = Triggers {
            env,
            config,
            element_links: &self.element_links,
            procedures: &mut self.procedures,
            now: self.current_time,
        };

        let pos = position.truncate();
        let z_bottom = position.z;
        let z_top = z_bottom + config.player_height;
        let interact = config.player_interact_radius;

        // Floor cells under the player.
        let cells = |center: i64| (center - FLOOR_PROBE_CELLS).max(0)..(center + FLOOR_PROBE_CELLS).min(MAP_SIZE as i64);
        for x in cells(cell_x) {
            for y in cells(cell_y) {
                let (x, y) = (x as usize, y as usize);
                if !circle_intersects_cell(pos, config.player_radius, x, y) {
                    continue;
                }
                let link = level.link_at(x, y);
                match link.kind {
                    LinkKind::Floor => triggers.activate(link.procedure, player, sink),
                    LinkKind::ReturnFloor => triggers.return_procedure(link.procedure),
                    _ => {}
                }
            }
        }

        // Static walls within reach.
        let mut touched_walls = Vec::new();
        self.index.query_radius(pos, interact, |element| {
            let IndexElement::StaticWall(i) = element else {
                return;
            };
            let Some(wall) = level.static_walls.get(i as usize) else {
                return;
            };
            if wall.vert_pos[0] == wall.vert_pos[1]
                || level.wall_flags(wall.texture_id).contains(WallFlags::PASSABLE)
            {
                return;
            }
            if collide_circle_with_segment(wall.vert_pos[0], wall.vert_pos[1], pos, interact).is_some() {
                touched_walls.push(element);
            }
        });
        for element in touched_walls {
            triggers.touch(element, true, player, sink);
        }

        for (i, wall) in self.objects.dynamic_walls.iter().enumerate() {
            if wall.is_degenerate() || level.wall_flags(wall.texture_id).contains(WallFlags::PASSABLE) {
                continue;
            }
            if z_top < wall.z || z_bottom > wall.z + config.walls_height {
                continue;
            }
            if collide_circle_with_segment(wall.vert_pos[0], wall.vert_pos[1], pos, interact).is_some() {
                triggers.touch(IndexElement::DynamicWall(i as u16), true, player, sink);
            }
        }

        // Models within reach; links work for zero radius models too.
        for (i, model) in self.objects.static_models.iter().enumerate() {
            let Some(description) = resources.model(model.model_id) else {
                continue;
            };
            if z_top < description.z_min + model.pos.z || z_bottom > description.z_max + model.pos.z {
                continue;
            }
            let reach = interact + description.radius;
            if pos.distance_squared(model.pos.truncate()) <= reach * reach {
                triggers.touch(IndexElement::StaticModel(i as u16), true, player, sink);
            }
        }

        // Keys.
        for (i, (model, level_model)) in self
            .objects
            .static_models
            .iter_mut()
            .zip(&level.static_models)
            .enumerate()
        {
            if model.picked {
                continue;
            }
            let Some(description) = resources.model(level_model.model_id) else {
                continue;
            };
            let Some(key) = key_for(description.action_code) else {
                continue;
            };
            let reach = config.player_radius + description.radius;
            if pos.distance_squared(model.pos.truncate()) > reach * reach {
                continue;
            }
            model.picked = true;
            player.give_key(key);
            self.events.play_monster_linked_sound(player_id, SoundId::GET_KEY);
            debug!(target: "sim::map", player = %player_id, key = ?key, "key picked up");
            triggers.touch(IndexElement::StaticModel(i as u16), false, player, sink);
        }

        // Items.
        for (i, item) in self.objects.items.iter_mut().enumerate() {
            if item.picked || !within_reach(item.pos.truncate(), pos, interact) {
                continue;
            }
            item.picked = player.try_pickup_item(item.item_id);
            if !item.picked {
                continue;
            }
            let code = resources
                .item(item.item_id)
                .map_or(ActionCode::NONE, |description| description.action_code);
            self.events
                .play_monster_linked_sound(player_id, pickup_sound(code));
            triggers.touch(IndexElement::Item(i as u16), false, player, sink);
        }

        Ok(())
    }
}

fn within_reach(a: Vec2, b: Vec2, radius: f32) -> bool {
    a.distance_squared(b) <= radius * radius
}
