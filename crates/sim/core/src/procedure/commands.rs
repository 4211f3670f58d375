//! Side effects fired on procedure state edges.
use std::time::Duration;

use crate::env::{ActionCode, Env, IndexElement, Procedure, ProcedureCommand};
use crate::events::UpdateEvents;
use crate::world::{AnimationState, Fields, MapObjects};

use super::ProcedureState;

/// Model ids in `Change` commands are offset by this amount in level files.
const CHANGE_MODEL_ID_OFFSET: u16 = 163;

/// Starts the animation of every switch linked to the procedure.
pub(super) fn activate_switches(
    env: &Env,
    procedure: &Procedure,
    reverse: bool,
    now: Duration,
    objects: &mut MapObjects,
) {
    let level = env.level();
    let resources = env.resources();
    for &[x, y] in &procedure.linked_switches {
        let Some((_, model)) = objects.model_at_cell_mut(level, x as usize, y as usize) else {
            continue;
        };
        let frame_count = resources.model(model.model_id).map(|d| d.frame_count);
        model.trigger_switch(reverse, frame_count, now);
    }
}

/// Commands that act once, when the procedure starts moving.
pub(super) fn run_immediate(
    env: &Env,
    procedure: &Procedure,
    states: &mut [ProcedureState],
    objects: &mut MapObjects,
    fields: &mut Fields,
    events: &mut UpdateEvents,
) {
    let level = env.level();
    let resources = env.resources();
    for command in &procedure.commands {
        match *command {
            ProcedureCommand::Lock { procedure } => set_locked(states, procedure, true),
            ProcedureCommand::Unlock { procedure } => set_locked(states, procedure, false),
            ProcedureCommand::Change { cell: [x, y], new_id } => {
                match level.element_at(x as usize, y as usize) {
                    IndexElement::StaticModel(index) => {
                        let Some(model) = objects.static_models.get_mut(index as usize) else {
                            continue;
                        };
                        match resources.model(model.model_id) {
                            Some(description) if description.action_code == ActionCode::SWITCH => {
                                model.animation_state = AnimationState::SingleFrame;
                                model.animation_start_frame = 0;
                            }
                            Some(_) => {}
                            None => {
                                model.animation_state = AnimationState::Animation;
                                model.animation_start_frame = 0;
                            }
                        }
                        model.model_id = new_id.wrapping_sub(CHANGE_MODEL_ID_OFFSET) as u8;
                    }
                    IndexElement::DynamicWall(index) => {
                        if let Some(wall) = objects.dynamic_walls.get_mut(index as usize) {
                            wall.texture_id = new_id as u8;
                        }
                    }
                    _ => {}
                }
            }
            ProcedureCommand::Wind { area, direction } => fields.set_wind(area, direction),
            ProcedureCommand::Death {
                area,
                z_bottom,
                z_top,
                damage,
            } => fields.set_death(area, damage, z_bottom, z_top),
            ProcedureCommand::Explode { cell: [x, y] } => {
                if let IndexElement::StaticModel(index) = level.element_at(x as usize, y as usize) {
                    objects.destroy_model(env, index as usize, events);
                }
            }
            _ => {}
        }
    }
}

/// Commands undone once the movement completes, unless the procedure is nonstop.
pub(super) fn run_deactivation(procedure: &Procedure, fields: &mut Fields) {
    if procedure.has_nonstop() {
        return;
    }
    for command in &procedure.commands {
        match *command {
            ProcedureCommand::Wind { area, .. } => fields.clear_wind(area),
            ProcedureCommand::Death { area, .. } => fields.clear_death(area),
            _ => {}
        }
    }
}

fn set_locked(states: &mut [ProcedureState], procedure: u16, locked: bool) {
    match states.get_mut(procedure as usize) {
        Some(state) => state.locked = locked,
        None => debug_assert!(false, "procedure {procedure} out of range"),
    }
}
