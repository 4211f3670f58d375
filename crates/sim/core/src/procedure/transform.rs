//! Rebuilds moving geometry from procedure stages.
use glam::{Mat3, Vec2};

use crate::env::{Env, IndexElement, ProcedureCommand};
use crate::world::{MapObjects, Transform};

use super::ProcedureState;

/// Level command coordinates are stored in 1/256 cell.
const COMMAND_COORDS_SCALE: f32 = 1.0 / 256.0;
/// `Up` heights are stored in 1/64 cell.
const COMMAND_HEIGHT_SCALE: f32 = 1.0 / 64.0;
/// Share of the stage spent on the first axis of `XMove`/`YMove`.
const FIRST_AXIS_FRACTION: f32 = 0.5;

enum Contribution {
    Planar { mat: Mat3, angle_delta: f32 },
    Lift(f32),
}

/// Resets every transform, accumulates the contribution of each procedure
/// in declaration order, then recomputes final positions from level data.
pub fn move_map_objects(env: &Env, states: &[ProcedureState], objects: &mut MapObjects) {
    for wall in &mut objects.dynamic_walls {
        wall.transform = Transform::IDENTITY;
    }
    for model in &mut objects.static_models {
        model.transform = Transform::IDENTITY;
        model.angle_delta = 0.0;
    }

    let level = env.level();
    for (procedure, state) in level.procedures.iter().zip(states) {
        let stage = state.absolute_stage();
        for command in &procedure.commands {
            let Some((cell, contribution)) = contribution(command, stage) else {
                continue;
            };
            let [x, y] = cell;
            match level.element_at(x as usize, y as usize) {
                IndexElement::DynamicWall(index) => {
                    let Some(wall) = objects.dynamic_walls.get_mut(index as usize) else {
                        continue;
                    };
                    match contribution {
                        Contribution::Planar { mat, .. } => wall.transform.then(mat),
                        Contribution::Lift(d_z) => wall.transform.d_z += d_z,
                    }
                }
                IndexElement::StaticModel(index) => {
                    let Some(model) = objects.static_models.get_mut(index as usize) else {
                        continue;
                    };
                    match contribution {
                        Contribution::Planar { mat, angle_delta } => {
                            model.transform.then(mat);
                            model.angle_delta += angle_delta;
                        }
                        Contribution::Lift(d_z) => model.transform.d_z += d_z,
                    }
                }
                _ => {}
            }
        }
    }

    for (wall, level_wall) in objects.dynamic_walls.iter_mut().zip(&level.dynamic_walls) {
        let mat = wall.transform.mat;
        wall.vert_pos = level_wall.vert_pos.map(|v| mat.transform_point2(v));
        wall.z = wall.transform.d_z;
    }
    for (model, level_model) in objects.static_models.iter_mut().zip(&level.static_models) {
        let xy = model.transform.mat.transform_point2(level_model.pos);
        model.pos.x = xy.x;
        model.pos.y = xy.y;
        model.pos.z = model.base_z + model.transform.d_z;
        model.angle = level_model.angle + model.angle_delta;
    }
}

fn contribution(command: &ProcedureCommand, stage: f32) -> Option<([u8; 2], Contribution)> {
    let translation = |d: Vec2| Contribution::Planar {
        mat: Mat3::from_translation(d),
        angle_delta: 0.0,
    };
    match *command {
        ProcedureCommand::Move { cell, offset, .. } => {
            Some((cell, translation(offset * COMMAND_COORDS_SCALE * stage)))
        }
        ProcedureCommand::XMove { cell, offset, .. } => {
            let offset = offset * COMMAND_COORDS_SCALE;
            let d = if stage <= FIRST_AXIS_FRACTION {
                Vec2::new(offset.x * stage / FIRST_AXIS_FRACTION, 0.0)
            } else {
                let rest = (stage - FIRST_AXIS_FRACTION) / (1.0 - FIRST_AXIS_FRACTION);
                Vec2::new(offset.x, offset.y * rest)
            };
            Some((cell, translation(d)))
        }
        ProcedureCommand::YMove { cell, offset, .. } => {
            let offset = offset * COMMAND_COORDS_SCALE;
            let d = if stage <= FIRST_AXIS_FRACTION {
                Vec2::new(0.0, offset.y * stage / FIRST_AXIS_FRACTION)
            } else {
                let rest = (stage - FIRST_AXIS_FRACTION) / (1.0 - FIRST_AXIS_FRACTION);
                Vec2::new(offset.x * rest, offset.y)
            };
            Some((cell, translation(d)))
        }
        ProcedureCommand::Rotate {
            cell,
            center,
            angle_degrees,
            ..
        } => {
            let center = center * COMMAND_COORDS_SCALE;
            let angle_delta = angle_degrees.to_radians() * stage;
            let mat = Mat3::from_translation(center)
                * Mat3::from_angle(angle_delta)
                * Mat3::from_translation(-center);
            Some((cell, Contribution::Planar { mat, angle_delta }))
        }
        ProcedureCommand::Up { cell, height, .. } => {
            Some((cell, Contribution::Lift(height * COMMAND_HEIGHT_SCALE * stage)))
        }
        _ => None,
    }
}
