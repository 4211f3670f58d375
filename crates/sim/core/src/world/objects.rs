use std::time::Duration;

use glam::{Mat3, Vec2, Vec3};
use tracing::debug;

use crate::config::SimConfig;
use crate::env::{Env, IndexElement, LevelData, ParticleEffect, SoundId};
use crate::events::UpdateEvents;

use super::floor_level;

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr, strum::EnumString,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum AnimationState {
    /// Holds `animation_start_frame`.
    #[default]
    SingleFrame,
    /// Loops over all frames.
    Animation,
    /// Plays forward once, then holds the last frame.
    SingleAnimation,
    /// Plays backward once from `animation_start_frame`, then holds frame zero.
    SingleReverseAnimation,
}

/// Accumulated procedure transform of one object for the current tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub mat: Mat3,
    pub d_z: f32,
}

impl Transform {
    pub const IDENTITY: Self = Self {
        mat: Mat3::IDENTITY,
        d_z: 0.0,
    };

    /// Applies `next` after everything accumulated so far.
    #[inline]
    pub fn then(&mut self, next: Mat3) {
        self.mat = next * self.mat;
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct DynamicWall {
    pub vert_pos: [Vec2; 2],
    /// Bottom height; the wall spans `z..z + walls_height`.
    pub z: f32,
    pub texture_id: u8,
    pub transform: Transform,
}

impl DynamicWall {
    pub fn is_degenerate(&self) -> bool {
        self.vert_pos[0] == self.vert_pos[1]
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct StaticModel {
    pub model_id: u8,
    pub health: i32,
    pub pos: Vec3,
    /// Floor height under the model at construction.
    pub base_z: f32,
    pub angle: f32,
    pub animation_state: AnimationState,
    pub animation_start_time: Duration,
    pub animation_start_frame: u32,
    pub current_frame: u32,
    /// Keys disappear once taken.
    pub picked: bool,
    pub transform: Transform,
    pub angle_delta: f32,
}

impl StaticModel {
    /// Plays the switch animation forward or backward, if it is at rest.
    pub fn trigger_switch(&mut self, reverse: bool, frame_count: Option<u32>, now: Duration) {
        if self.animation_state != AnimationState::SingleFrame {
            return;
        }
        self.animation_start_time = now;
        if reverse {
            self.animation_state = AnimationState::SingleReverseAnimation;
            self.animation_start_frame = frame_count.map_or(0, |count| count.saturating_sub(1));
        } else {
            self.animation_state = AnimationState::SingleAnimation;
            self.animation_start_frame = 0;
        }
    }

    fn advance_animation(&mut self, now: Duration, fps: f32, frame_count: Option<u32>) {
        let elapsed = now.saturating_sub(self.animation_start_time).as_secs_f32();
        let frame = (elapsed * fps).round() as u32;

        let Some(frame_count) = frame_count.filter(|&count| count > 0) else {
            if self.animation_state == AnimationState::SingleFrame {
                self.current_frame = self.animation_start_frame;
            } else {
                self.current_frame = 0;
            }
            return;
        };

        match self.animation_state {
            AnimationState::Animation => self.current_frame = frame % frame_count,
            AnimationState::SingleAnimation => {
                if frame >= frame_count - 1 {
                    self.animation_state = AnimationState::SingleFrame;
                    self.animation_start_frame = frame_count - 1;
                } else {
                    self.current_frame = frame;
                }
            }
            AnimationState::SingleReverseAnimation => {
                let remaining = self.animation_start_frame as i64 - frame as i64;
                if remaining <= 0 {
                    self.animation_state = AnimationState::SingleFrame;
                    self.animation_start_frame = 0;
                } else {
                    self.current_frame = remaining as u32;
                }
            }
            AnimationState::SingleFrame => self.current_frame = self.animation_start_frame,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Item {
    pub item_id: u8,
    pub pos: Vec3,
    pub picked: bool,
}

/// Current state of every dynamic wall, static model and item of a level.
#[derive(Clone, Debug)]
pub struct MapObjects {
    pub dynamic_walls: Vec<DynamicWall>,
    pub static_models: Vec<StaticModel>,
    pub items: Vec<Item>,
}

impl MapObjects {
    pub fn new(env: &Env, config: &SimConfig, start_time: Duration) -> Self {
        let level = env.level();
        let resources = env.resources();

        let dynamic_walls = level
            .dynamic_walls
            .iter()
            .map(|wall| DynamicWall {
                vert_pos: wall.vert_pos,
                z: 0.0,
                texture_id: wall.texture_id,
                transform: Transform::IDENTITY,
            })
            .collect();

        let static_models = level
            .static_models
            .iter()
            .map(|model| {
                let description = resources.model(model.model_id);
                let is_switch = description.is_some_and(|d| d.action_code.is_switch());
                // Interactive models sit on whatever is below them; keys use a wider probe.
                let base_z = match description {
                    Some(d) if d.action_code.0 != 0 => floor_level(
                        env,
                        model.pos,
                        d.radius.max(config.player_interact_radius),
                    ),
                    _ => 0.0,
                };
                StaticModel {
                    model_id: model.model_id,
                    health: description.map_or(0, |d| d.break_limit),
                    pos: model.pos.extend(base_z),
                    base_z,
                    angle: model.angle,
                    animation_state: if is_switch {
                        AnimationState::SingleFrame
                    } else {
                        AnimationState::Animation
                    },
                    animation_start_time: start_time,
                    animation_start_frame: 0,
                    current_frame: 0,
                    picked: false,
                    transform: Transform::IDENTITY,
                    angle_delta: 0.0,
                }
            })
            .collect();

        let items = level
            .items
            .iter()
            .map(|item| Item {
                item_id: item.item_id,
                pos: item
                    .pos
                    .extend(floor_level(env, item.pos, config.player_interact_radius)),
                picked: false,
            })
            .collect();

        Self {
            dynamic_walls,
            static_models,
            items,
        }
    }

    pub fn update_animations(&mut self, env: &Env, now: Duration, fps: f32) {
        let resources = env.resources();
        for model in &mut self.static_models {
            let frame_count = resources.model(model.model_id).map(|d| d.frame_count);
            model.advance_animation(now, fps, frame_count);
        }
    }

    /// Static model referenced by a grid cell, if that cell holds one.
    pub fn model_at_cell_mut(
        &mut self,
        level: &LevelData,
        x: usize,
        y: usize,
    ) -> Option<(usize, &mut StaticModel)> {
        match level.element_at(x, y) {
            IndexElement::StaticModel(index) => {
                let index = index as usize;
                self.static_models.get_mut(index).map(|model| (index, model))
            }
            _ => None,
        }
    }

    /// Breaks a model: emits its destruction effects and advances it to the
    /// next model id, whose break limit becomes the new health.
    pub fn destroy_model(&mut self, env: &Env, index: usize, events: &mut UpdateEvents) {
        let resources = env.resources();
        let Some(model) = self.static_models.get_mut(index) else {
            debug_assert!(false, "static model {index} out of range");
            return;
        };

        if let Some(description) = resources.model(model.model_id) {
            let mut pos = model.pos;
            pos.z += (description.z_min + description.z_max) * 0.5 + description.bmpz as f32 / 128.0;
            events.add_particle_effect(pos, ParticleEffect::blow_effect(description.blow_effect));
            if description.break_sfx != 0 {
                events.play_map_event_sound(pos, SoundId(description.break_sfx));
            }
        }

        model.model_id = model.model_id.wrapping_add(1);
        model.health = resources.model(model.model_id).map_or(0, |d| d.break_limit);
        debug!(
            target: "sim::world",
            model = index,
            new_model_id = model.model_id,
            "static model destroyed"
        );
    }
}
