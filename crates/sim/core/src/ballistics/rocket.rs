use std::f32::consts::FRAC_PI_2;
use std::time::Duration;

use glam::{Quat, Vec3};

use crate::config::SimConfig;
use crate::entity::EntityId;
use crate::env::RocketDescription;
use crate::events::UpdateEvents;
use crate::geometry::direction_to_angles;
use crate::messages::{RocketBirth, RocketState, angle_to_message, position_to_message};

/// Homing rockets turn at this rate, in radians per second.
const HOMING_TURN_RATE: f32 = FRAC_PI_2;
const SMOKE_PARTICLES_PER_UNIT: f32 = 2.0;
/// Below this squared cross length the turn axis falls back to vertical.
const COLINEAR_EPSILON_SQUARED: f32 = 1.0e-6;

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rocket {
    pub id: EntityId,
    pub owner: EntityId,
    pub rocket_type: u8,
    pub start_time: Duration,
    pub start_point: Vec3,
    /// Heading; normalized.
    pub direction: Vec3,
    /// Velocity of reflecting rockets.
    pub speed: Vec3,
    pub previous_position: Vec3,
    /// Distance flown, in smoke particles.
    pub track_length: f32,
}

impl Rocket {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: EntityId,
        owner: EntityId,
        rocket_type: u8,
        description: &RocketDescription,
        config: &SimConfig,
        from: Vec3,
        direction: Vec3,
        now: Duration,
    ) -> Self {
        let speed = if description.reflect {
            direction * config.rocket_speed(description.fast)
        } else {
            Vec3::ZERO
        };
        Self {
            id,
            owner,
            rocket_type,
            start_time: now,
            start_point: from,
            direction,
            speed,
            previous_position: from,
            track_length: 0.0,
        }
    }

    pub fn age(&self, now: Duration) -> Duration {
        now.saturating_sub(self.start_time)
    }

    /// Integrates the flight up to `now` and returns the new position.
    ///
    /// `target` is the aim point for homing rockets.
    pub fn fly(
        &mut self,
        description: &RocketDescription,
        config: &SimConfig,
        now: Duration,
        dt: Duration,
        target: Option<Vec3>,
    ) -> Vec3 {
        let gravity = config.rockets_gravity_scale * description.gravity_force;
        let speed = config.rocket_speed(description.fast);
        let dt = dt.as_secs_f32();

        if description.reflect {
            self.speed.z -= gravity * dt;
            let mut pos = self.previous_position + self.speed * dt;
            if pos.z < 0.0 {
                pos.z = 0.0;
                self.speed.z = self.speed.z.abs();
            }
            self.direction = self.speed.normalize_or_zero();
            pos
        } else if description.homing {
            if let Some(target) = target {
                let to_target = (target - self.previous_position).normalize_or_zero();
                let mut axis = self.direction.cross(to_target);
                if axis.length_squared() < COLINEAR_EPSILON_SQUARED {
                    axis = Vec3::Z;
                }
                let turn = Quat::from_axis_angle(axis.normalize(), dt * HOMING_TURN_RATE);
                self.direction = (turn * self.direction).try_normalize().unwrap_or(to_target);
            }
            self.previous_position + self.direction * speed * dt
        } else {
            let t = self.age(now).as_secs_f32();
            self.start_point + self.direction * (t * speed) - Vec3::Z * (gravity * t * t * 0.5)
        }
    }

    /// Emits trail sprites at fixed spacing along `previous_position..new_pos`.
    pub fn emit_smoke_trail(&mut self, new_pos: Vec3, effect_id: u8, events: &mut UpdateEvents) {
        let length_delta = (new_pos - self.previous_position).length() * SMOKE_PARTICLES_PER_UNIT;
        if length_delta <= 0.0 {
            return;
        }
        let new_track_length = self.track_length + length_delta;
        for i in (self.track_length as u32 + 1)..=(new_track_length as u32) {
            let part = (i as f32 - self.track_length) / length_delta;
            events.add_sprite_effect(self.previous_position.lerp(new_pos, part), effect_id);
        }
        self.track_length = new_track_length;
    }

    fn message_angles(&self) -> [u16; 2] {
        direction_to_angles(self.direction).map(angle_to_message)
    }

    pub fn birth_message(&self) -> RocketBirth {
        RocketBirth {
            rocket_id: self.id,
            rocket_type: self.rocket_type,
            xyz: position_to_message(self.start_point),
            angle: self.message_angles(),
        }
    }

    pub fn state_message(&self) -> RocketState {
        RocketState {
            rocket_id: self.id,
            xyz: position_to_message(self.previous_position),
            angle: self.message_angles(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rocket(description: &RocketDescription, dir: Vec3) -> Rocket {
        Rocket::new(
            EntityId(1),
            EntityId(2),
            0,
            description,
            &SimConfig::default(),
            Vec3::new(10.0, 10.0, 1.0),
            dir,
            Duration::ZERO,
        )
    }

    #[test]
    fn plain_rocket_follows_closed_form() {
        let description = RocketDescription {
            gravity_force: 10.0,
            ..Default::default()
        };
        let config = SimConfig::default();
        let mut r = rocket(&description, Vec3::X);
        let pos = r.fly(&description, &config, Duration::from_secs(1), Duration::from_secs(1), None);
        // 20 units forward, 0.1 * 10 / 2 down
        assert!((pos - Vec3::new(30.0, 10.0, 0.5)).length() < 1e-4);
    }

    #[test]
    fn reflecting_rocket_bounces_off_the_floor() {
        let description = RocketDescription {
            reflect: true,
            gravity_force: 10.0,
            ..Default::default()
        };
        let config = SimConfig::default();
        let mut r = rocket(&description, Vec3::new(0.0, 0.6, -0.8));
        let dt = Duration::from_millis(100);
        let pos = r.fly(&description, &config, dt, dt, None);
        assert_eq!(pos.z, 0.0);
        assert!(r.speed.z > 0.0);
        assert!(r.direction.z > 0.0);
        assert!((r.direction.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn homing_rocket_turns_toward_target() {
        let description = RocketDescription {
            homing: true,
            ..Default::default()
        };
        let config = SimConfig::default();
        let mut r = rocket(&description, Vec3::X);
        let target = Vec3::new(10.0, 30.0, 1.0);
        let dt = Duration::from_millis(100);
        r.fly(&description, &config, dt, dt, Some(target));
        assert!(r.direction.y > 0.0);
        let turned = r.direction.angle_between(Vec3::X);
        assert!((turned - 0.1 * FRAC_PI_2).abs() < 1e-4);
    }

    #[test]
    fn homing_rocket_without_heading_locks_onto_target() {
        let description = RocketDescription {
            homing: true,
            ..Default::default()
        };
        let config = SimConfig::default();
        let mut r = rocket(&description, Vec3::ZERO);
        let dt = Duration::from_millis(100);
        let pos = r.fly(&description, &config, dt, dt, Some(Vec3::new(10.0, 30.0, 1.0)));
        assert!((r.direction - Vec3::Y).length() < 1e-5);
        assert!(pos.is_finite());
    }

    #[test]
    fn smoke_trail_spacing() {
        let description = RocketDescription::default();
        let mut r = rocket(&description, Vec3::X);
        let mut events = UpdateEvents::default();
        r.emit_smoke_trail(Vec3::new(12.0, 10.0, 1.0), 7, &mut events);
        assert_eq!(events.sprite_effects.len(), 4);
        assert!((r.track_length - 4.0).abs() < 1e-5);
        assert!(events.sprite_effects.iter().all(|e| e.effect_id == 7));
    }
}
