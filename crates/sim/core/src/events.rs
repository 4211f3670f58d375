//! Per-tick queues of one-shot notifications.
//!
//! Filled while a tick runs, flushed by [`crate::Map::send_update_messages`]
//! and emptied by [`crate::Map::clear_update_events`].

use glam::Vec3;

use crate::entity::EntityId;
use crate::env::{ParticleEffect, SoundId};
use crate::messages::{
    DynamicItemBirth, DynamicItemDeath, MapEventSound, MonsterLinkedSound, MonsterPartBirth,
    MonsterSound, ParticleEffectBirth, RocketBirth, RocketDeath, SpriteEffectBirth,
    position_to_message,
};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UpdateEvents {
    pub sprite_effects: Vec<SpriteEffectBirth>,
    pub rocket_births: Vec<RocketBirth>,
    pub rocket_deaths: Vec<RocketDeath>,
    pub dynamic_item_births: Vec<DynamicItemBirth>,
    pub dynamic_item_deaths: Vec<DynamicItemDeath>,
    pub particle_effects: Vec<ParticleEffectBirth>,
    pub monster_part_births: Vec<MonsterPartBirth>,
    pub map_event_sounds: Vec<MapEventSound>,
    pub monster_linked_sounds: Vec<MonsterLinkedSound>,
    pub monster_sounds: Vec<MonsterSound>,
}

impl UpdateEvents {
    pub fn add_particle_effect(&mut self, pos: Vec3, effect: ParticleEffect) {
        self.particle_effects.push(ParticleEffectBirth {
            effect_id: effect.0,
            xyz: position_to_message(pos),
        });
    }

    pub fn add_sprite_effect(&mut self, pos: Vec3, effect_id: u8) {
        self.sprite_effects.push(SpriteEffectBirth {
            effect_id,
            xyz: position_to_message(pos),
        });
    }

    pub fn play_map_event_sound(&mut self, pos: Vec3, sound: SoundId) {
        self.map_event_sounds.push(MapEventSound {
            xyz: position_to_message(pos),
            sound_id: sound.0,
        });
    }

    pub fn play_monster_linked_sound(&mut self, monster_id: EntityId, sound: SoundId) {
        self.monster_linked_sounds.push(MonsterLinkedSound {
            monster_id,
            sound_id: sound.0,
        });
    }

    pub fn play_monster_sound(&mut self, monster_id: EntityId, monster_sound_id: u8) {
        self.monster_sounds.push(MonsterSound {
            monster_id,
            monster_sound_id,
        });
    }

    pub fn clear(&mut self) {
        self.sprite_effects.clear();
        self.rocket_births.clear();
        self.rocket_deaths.clear();
        self.dynamic_item_births.clear();
        self.dynamic_item_deaths.clear();
        self.particle_effects.clear();
        self.monster_part_births.clear();
        self.map_event_sounds.clear();
        self.monster_linked_sounds.clear();
        self.monster_sounds.clear();
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}
