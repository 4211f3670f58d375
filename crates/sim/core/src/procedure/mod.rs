//! Timed scripted behaviours: doors, lifts, switches and their side effects.
//!
//! Each procedure runs the cycle
//! `None -> StartWait -> Movement -> BackWait -> ReverseMovement -> None`.
//! Geometry is never moved incrementally: [`transform::move_map_objects`]
//! recomputes every moving object from the current stages each tick.
mod commands;
pub mod transform;

use std::time::Duration;

use tracing::{debug, info};

use crate::config::SimConfig;
use crate::entity::PlayerBehavior;
use crate::env::{Env, Procedure};
use crate::events::UpdateEvents;
use crate::messages::{Message, MessageSink, TextMessage};
use crate::world::{Fields, MapObjects};

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr, strum::EnumString,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum MovementState {
    #[default]
    None,
    StartWait,
    Movement,
    BackWait,
    ReverseMovement,
}

#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProcedureState {
    pub locked: bool,
    pub movement_state: MovementState,
    /// Progress through the current state, in `[0, 1]`.
    pub movement_stage: f32,
    pub last_state_change: Duration,
    pub first_message_printed: bool,
    /// The level end was already signalled during this activation cycle.
    pub map_end_reported: bool,
}

impl ProcedureState {
    /// Progress of the whole cycle that drives geometry.
    pub fn absolute_stage(&self) -> f32 {
        match self.movement_state {
            MovementState::Movement => self.movement_stage,
            MovementState::BackWait => 1.0,
            MovementState::ReverseMovement => 1.0 - self.movement_stage,
            MovementState::None | MovementState::StartWait => 0.0,
        }
    }

    fn enter(&mut self, state: MovementState, now: Duration) {
        self.movement_state = state;
        self.movement_stage = 0.0;
        self.last_state_change = now;
    }
}

/// Result of a player's attempt to start a procedure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum ActivationOutcome {
    /// The player's own cooldown rejected the attempt.
    Debounced,
    Started,
    /// Locked, missing keys or already running.
    Denied,
}

/// Runtime state of every procedure of a level.
#[derive(Clone, Debug, Default)]
pub struct ProcedureEngine {
    states: Vec<ProcedureState>,
    map_end_triggered: bool,
}

impl ProcedureEngine {
    pub fn new(procedures: &[Procedure]) -> Self {
        let states = procedures
            .iter()
            .map(|procedure| ProcedureState {
                locked: procedure.locked,
                ..Default::default()
            })
            .collect();
        Self {
            states,
            map_end_triggered: false,
        }
    }

    pub fn states(&self) -> &[ProcedureState] {
        &self.states
    }

    pub fn state(&self, number: u16) -> Option<&ProcedureState> {
        self.states.get(number as usize)
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Starts the cycle unconditionally.
    pub fn activate(&mut self, number: u16, now: Duration) {
        let Some(state) = self.states.get_mut(number as usize) else {
            debug_assert!(false, "procedure {number} out of range");
            return;
        };
        state.enter(MovementState::StartWait, now);
        state.map_end_reported = false;
        debug!(target: "sim::procedure", procedure = number, "procedure activated");
    }

    /// Player-initiated activation, gated by the player, keys and lock.
    ///
    /// Text notifications go to `sink` whether or not the procedure starts.
    pub fn try_activate(
        &mut self,
        env: &Env,
        number: u16,
        now: Duration,
        player: &mut dyn PlayerBehavior,
        sink: &mut dyn MessageSink,
    ) -> ActivationOutcome {
        if !player.try_activate_procedure(number, now) {
            return ActivationOutcome::Debounced;
        }
        let Some(procedure) = env.level().procedures.get(number as usize) else {
            debug_assert!(false, "procedure {number} out of range");
            return ActivationOutcome::Denied;
        };

        let has_keys = player.keys().contains(procedure.required_keys);
        let state = &self.states[number as usize];
        let can_start = has_keys && !state.locked && state.movement_state == MovementState::None;
        if can_start {
            self.activate(number, now);
        }

        let state = &mut self.states[number as usize];
        let mut send_text = |text_message_number: u16| {
            sink.send_unreliable(Message::from(TextMessage {
                text_message_number,
            }));
        };
        if procedure.first_message != 0 && !state.first_message_printed {
            state.first_message_printed = true;
            send_text(procedure.first_message);
        }
        if procedure.lock_message != 0 && (state.locked || !has_keys) {
            send_text(procedure.lock_message);
        }
        if procedure.on_message != 0 {
            send_text(procedure.on_message);
        }

        if can_start {
            ActivationOutcome::Started
        } else {
            ActivationOutcome::Denied
        }
    }

    /// Reverses a running procedure early.
    pub fn return_procedure(&mut self, env: &Env, config: &SimConfig, number: u16, now: Duration) {
        let (Some(procedure), Some(state)) = (
            env.level().procedures.get(number as usize),
            self.states.get_mut(number as usize),
        ) else {
            debug_assert!(false, "procedure {number} out of range");
            return;
        };
        if state.locked {
            return;
        }

        match state.movement_state {
            MovementState::None | MovementState::ReverseMovement => {}
            MovementState::StartWait => state.enter(MovementState::None, now),
            MovementState::Movement => {
                // Pretend the reverse pass already covered what is left of the forward one.
                let already_elapsed = if procedure.speed > 0.0 {
                    let full = 1.0 / (procedure.speed * config.procedures_speed_scale);
                    let elapsed = now.saturating_sub(state.last_state_change).as_secs_f32();
                    (full - elapsed).max(0.0)
                } else {
                    0.0
                };
                let stage = state.movement_stage;
                state.movement_state = MovementState::ReverseMovement;
                state.movement_stage = 1.0 - stage;
                let already_elapsed = Duration::try_from_secs_f32(already_elapsed).unwrap_or(Duration::MAX);
                state.last_state_change = now.saturating_sub(already_elapsed);
            }
            MovementState::BackWait => state.enter(MovementState::ReverseMovement, now),
        }
        debug!(
            target: "sim::procedure",
            procedure = number,
            state = %state.movement_state,
            "procedure returned"
        );
    }

    /// Rocket hit on a shoot link: starts only an idle, unlocked procedure.
    pub fn process_shoot(&mut self, number: u16, now: Duration) {
        let Some(state) = self.states.get(number as usize) else {
            debug_assert!(false, "procedure {number} out of range");
            return;
        };
        if state.movement_state == MovementState::None && !state.locked {
            self.activate(number, now);
        }
    }

    /// Destruction of a linked model: unlocks and restarts the procedure.
    pub fn process_destroy(&mut self, number: u16, now: Duration) {
        let Some(state) = self.states.get_mut(number as usize) else {
            debug_assert!(false, "procedure {number} out of range");
            return;
        };
        state.locked = false;
        self.activate(number, now);
    }

    /// Advances every procedure's state machine to `now`.
    pub fn advance(
        &mut self,
        env: &Env,
        config: &SimConfig,
        now: Duration,
        objects: &mut MapObjects,
        fields: &mut Fields,
        events: &mut UpdateEvents,
    ) {
        let procedures = &env.level().procedures;
        for (number, procedure) in procedures.iter().enumerate() {
            let state = &mut self.states[number];
            let elapsed = now.saturating_sub(state.last_state_change);
            let new_stage = if procedure.speed > 0.0 {
                (elapsed.as_secs_f32() * procedure.speed * config.procedures_speed_scale).min(1.0)
            } else {
                1.0
            };

            if state.movement_state != MovementState::None
                && !procedure.end_delay.is_zero()
                && elapsed >= procedure.end_delay
                && !state.map_end_reported
            {
                state.map_end_reported = true;
                self.map_end_triggered = true;
                info!(target: "sim::procedure", procedure = number, "level end triggered");
            }

            let previous = state.movement_state;
            match state.movement_state {
                MovementState::None => {}
                MovementState::StartWait => {
                    if elapsed >= procedure.start_delay {
                        state.enter(MovementState::Movement, now);
                        commands::activate_switches(env, procedure, false, now, objects);
                        commands::run_immediate(env, procedure, &mut self.states, objects, fields, events);
                    }
                }
                MovementState::Movement => {
                    if new_stage >= 1.0 {
                        state.enter(MovementState::BackWait, now);
                        commands::run_deactivation(procedure, fields);
                    } else {
                        state.movement_stage = new_stage;
                    }
                }
                MovementState::BackWait => {
                    if !procedure.back_wait.is_zero() && elapsed >= procedure.back_wait {
                        state.enter(MovementState::ReverseMovement, now);
                        commands::activate_switches(env, procedure, true, now, objects);
                    }
                }
                MovementState::ReverseMovement => {
                    if new_stage >= 1.0 {
                        state.enter(MovementState::None, now);
                    } else {
                        state.movement_stage = new_stage;
                    }
                }
            }

            let current = self.states[number].movement_state;
            if current != previous {
                debug!(
                    target: "sim::procedure",
                    procedure = number,
                    from = %previous,
                    to = %current,
                    "procedure state changed"
                );
            }
        }
    }

    /// Returns and clears the pending level end signal.
    pub fn take_map_end(&mut self) -> bool {
        std::mem::take(&mut self.map_end_triggered)
    }
}

#[cfg(test)]
mod tests;
