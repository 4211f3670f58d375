use crate::entity::{Entity, EntityId};
use crate::messages::{
    ItemState, MessageSink, MonsterBirth, MonsterState, StaticModelState, WallPosition,
    angle_to_message, coord_to_message, position_to_message,
};
use crate::world::AnimationState;

use super::Map;

impl Map {
    /// Flushes the current state and this tick's events to one observer.
    ///
    /// Everything goes out unreliably; state is re-sent every tick. Events
    /// stay queued until [`Map::clear_update_events`].
    pub fn send_update_messages(&self, sink: &mut dyn MessageSink) {
        for (i, wall) in self.objects.dynamic_walls.iter().enumerate() {
            sink.send_unreliable(
                WallPosition {
                    wall_index: i as u16,
                    vertices_xy: wall
                        .vert_pos
                        .map(|v| [coord_to_message(v.x), coord_to_message(v.y)]),
                    z: coord_to_message(wall.z),
                    texture_id: wall.texture_id,
                }
                .into(),
            );
        }

        for (i, model) in self.objects.static_models.iter().enumerate() {
            sink.send_unreliable(
                StaticModelState {
                    static_model_index: i as u16,
                    xyz: position_to_message(model.pos),
                    angle: angle_to_message(model.angle),
                    model_id: model.model_id,
                    animation_frame: model.current_frame as u16,
                    animation_playing: model.animation_state == AnimationState::Animation,
                    visible: !model.picked,
                }
                .into(),
            );
        }

        for (i, item) in self.objects.items.iter().enumerate() {
            sink.send_unreliable(
                ItemState {
                    item_index: i as u16,
                    z: coord_to_message(item.pos.z),
                    picked: item.picked,
                }
                .into(),
            );
        }

        let events = &self.events;
        for &effect in &events.sprite_effects {
            sink.send_unreliable(effect.into());
        }
        for (&id, entity) in &self.entities {
            sink.send_unreliable(monster_state(id, entity).into());
        }
        for &birth in &events.rocket_births {
            sink.send_unreliable(birth.into());
        }
        for &death in &events.rocket_deaths {
            sink.send_unreliable(death.into());
        }
        for &birth in &events.dynamic_item_births {
            sink.send_unreliable(birth.into());
        }
        for &death in &events.dynamic_item_deaths {
            sink.send_unreliable(death.into());
        }
        for &particle in &events.particle_effects {
            sink.send_unreliable(particle.into());
        }
        for &part in &events.monster_part_births {
            sink.send_unreliable(part.into());
        }
        for &sound in &events.map_event_sounds {
            sink.send_unreliable(sound.into());
        }
        for &sound in &events.monster_linked_sounds {
            sink.send_unreliable(sound.into());
        }
        for &sound in &events.monster_sounds {
            sink.send_unreliable(sound.into());
        }

        for rocket in &self.rockets {
            sink.send_unreliable(rocket.state_message().into());
        }
    }

    /// Introduces every current player and monster to a new observer.
    pub fn send_messages_for_new_player(&self, sink: &mut dyn MessageSink) {
        for (&id, entity) in &self.entities {
            sink.send_reliable(
                MonsterBirth {
                    monster_id: id,
                    initial_state: monster_state(id, entity),
                }
                .into(),
            );
        }
    }

    /// Drops this tick's events once every observer has been flushed.
    pub fn clear_update_events(&mut self) {
        self.events.clear();
    }
}

fn monster_state(id: EntityId, entity: &Entity) -> MonsterState {
    MonsterState {
        monster_id: id,
        xyz: position_to_message(entity.position()),
        angle: angle_to_message(entity.angle()),
        monster_type: entity.monster_type(),
        body_parts_mask: entity.body_parts_mask(),
        animation: entity.animation(),
        animation_frame: entity.animation_frame(),
    }
}
