//! Rockets, bullets and mines.
//!
//! Flight integration and hit resolution live here; applying a hit to the
//! world (links, damage, destruction) is done by the map, which owns the
//! entities and procedures involved.
mod mine;
mod rocket;
mod shot;

use glam::Vec3;

use crate::env::{ParticleEffect, RocketDescription, SoundId};
use crate::events::UpdateEvents;

pub use mine::{MINE_FLOOR_RADIUS, MINE_ITEM_TYPE, Mine, MineFate};
pub use rocket::Rocket;
pub use shot::{Hit, HitTarget, ShotScene};

/// Hit effects are pushed this far off a wall or plane toward the shooter.
pub const HIT_EFFECT_OFFSET: f32 = 1.0 / 32.0;
/// Extra length added to each flight segment so grazing hits are not missed.
pub const SEGMENT_EPSILON: f32 = 1.0 / 64.0;

const BLOW_EFFECT_BULLET: u8 = 1;
const BLOW_EFFECT_EXPLOSION: u8 = 2;

/// Particle and sound of a rocket striking a surface.
pub fn emit_rocket_hit_effect(
    events: &mut UpdateEvents,
    pos: Vec3,
    rocket_type: u8,
    description: &RocketDescription,
) {
    let effect = match (description.hitscan, description.blow_effect) {
        (true, BLOW_EFFECT_BULLET) => Some(ParticleEffect::BULLET),
        (true, _) => None,
        (false, BLOW_EFFECT_EXPLOSION) => Some(ParticleEffect::EXPLOSION),
        (false, 1 | 3 | 4) => Some(ParticleEffect::SPARKLES),
        (false, _) => None,
    };
    if let Some(effect) = effect {
        events.add_particle_effect(pos, effect);
    }
    events.play_map_event_sound(pos, SoundId::FIRST_ROCKET_HIT.offset(rocket_type as u16));
}

/// Blood, plus the blast of explosive projectiles.
pub fn emit_monster_hit_effect(
    events: &mut UpdateEvents,
    pos: Vec3,
    rocket_type: u8,
    description: &RocketDescription,
) {
    events.add_particle_effect(pos, ParticleEffect::BLOOD);
    if description.blow_effect == BLOW_EFFECT_EXPLOSION && !description.hitscan {
        emit_rocket_hit_effect(events, pos, rocket_type, description);
    }
}
