use std::time::Duration;

use glam::Vec2;

bitflags::bitflags! {
    /// Set of colored keys.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct KeySet: u8 {
        const RED = 0b0000_0001;
        const GREEN = 0b0000_0010;
        const BLUE = 0b0000_0100;
    }
}

/// Inclusive rectangle of grid cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellRect {
    pub min: [u8; 2],
    pub max: [u8; 2],
}

impl CellRect {
    pub const fn new(min: [u8; 2], max: [u8; 2]) -> Self {
        Self { min, max }
    }
}

/// One scripted command of a procedure.
///
/// Arguments keep level units: offsets and centers are in 1/256 cell,
/// lift heights in 1/64 cell, angles in degrees.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ProcedureCommand {
    Lock {
        procedure: u16,
    },
    Unlock {
        procedure: u16,
    },
    PlayAnimation,
    StopAnimation,
    /// Swaps the model or wall texture in a cell; models use `new_id - 163`.
    Change {
        cell: [u8; 2],
        new_id: u16,
    },
    Wind {
        area: CellRect,
        direction: [i8; 2],
    },
    Death {
        area: CellRect,
        z_bottom: i32,
        z_top: i32,
        damage: u8,
    },
    Explode {
        cell: [u8; 2],
    },
    /// Keeps wind and death zones active after the movement completes.
    Nonstop,
    Move {
        cell: [u8; 2],
        offset: Vec2,
        sound: u8,
    },
    /// Moves along x during the first half of the stage, then along y.
    XMove {
        cell: [u8; 2],
        offset: Vec2,
        sound: u8,
    },
    /// Moves along y during the first half of the stage, then along x.
    YMove {
        cell: [u8; 2],
        offset: Vec2,
        sound: u8,
    },
    Rotate {
        cell: [u8; 2],
        center: Vec2,
        angle_degrees: f32,
        sound: u8,
    },
    Up {
        cell: [u8; 2],
        height: f32,
        sound: u8,
    },
    Sound {
        sound: u8,
    },
}

impl ProcedureCommand {
    pub fn is_nonstop(&self) -> bool {
        matches!(self, ProcedureCommand::Nonstop)
    }
}

/// Level description of a scripted behaviour (door, lift, switch).
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Procedure {
    pub locked: bool,
    /// Raw speed; `0` completes every movement within one tick.
    pub speed: f32,
    pub start_delay: Duration,
    /// Hold time before reversing; zero keeps the procedure in its end position.
    pub back_wait: Duration,
    /// Active time after which the level ends; zero disables.
    pub end_delay: Duration,
    pub required_keys: KeySet,
    pub first_message: u16,
    pub lock_message: u16,
    pub on_message: u16,
    pub linked_switches: Vec<[u8; 2]>,
    pub commands: Vec<ProcedureCommand>,
}

impl Procedure {
    pub fn has_nonstop(&self) -> bool {
        self.commands.iter().any(ProcedureCommand::is_nonstop)
    }
}
