use glam::Vec2;

use super::error::LevelDataError;
use super::procedure::{Procedure, ProcedureCommand};

/// Width and height of every level grid, in cells.
pub const MAP_SIZE: usize = 64;

/// Index of cell `(x, y)` in the dense per-cell arrays of a level.
#[inline]
pub const fn cell_index(x: usize, y: usize) -> usize {
    x + y * MAP_SIZE
}

/// What a grid cell refers to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum IndexElement {
    #[default]
    None,
    StaticWall(u16),
    StaticModel(u16),
    DynamicWall(u16),
    Item(u16),
}

bitflags::bitflags! {
    /// Per-texture wall behaviour.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct WallFlags: u8 {
        /// Movement collision and touch links ignore the wall.
        const PASSABLE = 0b0000_0001;
        /// Shots and line-of-sight rays ignore the wall.
        const SEE_THROUGH = 0b0000_0010;
    }
}

bitflags::bitflags! {
    /// Difficulty levels a monster spawn participates in.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct DifficultyFlags: u8 {
        const EASY = 0b0000_0001;
        const NORMAL = 0b0000_0010;
        const HARD = 0b0000_0100;
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WallTexture {
    pub flags: WallFlags,
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LevelWall {
    pub vert_pos: [Vec2; 2],
    pub texture_id: u8,
}

impl LevelWall {
    pub fn new(v0: Vec2, v1: Vec2, texture_id: u8) -> Self {
        Self {
            vert_pos: [v0, v1],
            texture_id,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LevelModel {
    pub pos: Vec2,
    pub angle: f32,
    pub model_id: u8,
    /// Moved by procedures; excluded from floor level queries.
    pub is_dynamic: bool,
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LevelItem {
    pub item_id: u8,
    pub pos: Vec2,
    pub angle: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MonsterSpawn {
    /// Monster type; `0` is reserved for players and never spawned.
    pub monster_id: u8,
    pub pos: Vec2,
    pub angle: f32,
    pub difficulty: DifficultyFlags,
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlayerSpawn {
    pub number: u8,
    pub pos: Vec2,
    pub angle: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Teleport {
    pub from: [u8; 2],
    /// Per axis: a cell coordinate, or a position in 1/256 cell units when
    /// not below [`MAP_SIZE`].
    pub to: [u32; 2],
    pub angle: f32,
}

impl Teleport {
    /// Target position on the map plane.
    pub fn target(&self) -> Vec2 {
        let axis = |value: u32| {
            if value >= MAP_SIZE as u32 {
                value as f32 / 256.0
            } else {
                value as f32
            }
        };
        Vec2::new(axis(self.to[0]), axis(self.to[1]))
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum LinkKind {
    #[default]
    None,
    /// Touching activates the procedure.
    Link,
    /// Touching returns the procedure.
    Return,
    /// Hitting with a rocket activates the procedure.
    Shoot,
    /// Destroying the model activates the procedure.
    Destroy,
    /// Standing on the cell activates the procedure.
    Floor,
    /// Standing on the cell returns the procedure.
    ReturnFloor,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Link {
    pub kind: LinkKind,
    pub procedure: u16,
}

impl Link {
    pub const fn new(kind: LinkKind, procedure: u16) -> Self {
        Self { kind, procedure }
    }
}

/// Immutable description of one level.
///
/// All per-cell arrays hold `MAP_SIZE * MAP_SIZE` entries addressed through
/// [`cell_index`]. Procedures are referenced by their index in
/// [`LevelData::procedures`].
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LevelData {
    pub map_index: Vec<IndexElement>,
    pub links: Vec<Link>,
    pub floor_textures: Vec<u8>,
    pub ceiling_textures: Vec<u8>,
    pub static_walls: Vec<LevelWall>,
    pub dynamic_walls: Vec<LevelWall>,
    pub wall_textures: Vec<WallTexture>,
    pub static_models: Vec<LevelModel>,
    pub items: Vec<LevelItem>,
    pub monsters: Vec<MonsterSpawn>,
    pub player_spawns: Vec<PlayerSpawn>,
    pub teleports: Vec<Teleport>,
    pub procedures: Vec<Procedure>,
}

impl LevelData {
    /// Level with no geometry, solid floor and ceiling, and no links.
    pub fn empty() -> Self {
        let cells = MAP_SIZE * MAP_SIZE;
        Self {
            map_index: vec![IndexElement::None; cells],
            links: vec![Link::default(); cells],
            floor_textures: vec![0; cells],
            ceiling_textures: vec![0; cells],
            static_walls: Vec::new(),
            dynamic_walls: Vec::new(),
            wall_textures: Vec::new(),
            static_models: Vec::new(),
            items: Vec::new(),
            monsters: Vec::new(),
            player_spawns: Vec::new(),
            teleports: Vec::new(),
            procedures: Vec::new(),
        }
    }

    /// Element at cell `(x, y)`, or `None` outside the grid.
    pub fn element_at(&self, x: usize, y: usize) -> IndexElement {
        if x >= MAP_SIZE || y >= MAP_SIZE {
            return IndexElement::None;
        }
        self.map_index[cell_index(x, y)]
    }

    pub fn link_at(&self, x: usize, y: usize) -> Link {
        if x >= MAP_SIZE || y >= MAP_SIZE {
            return Link::default();
        }
        self.links[cell_index(x, y)]
    }

    /// Flags of a wall texture; unknown textures have none.
    pub fn wall_flags(&self, texture_id: u8) -> WallFlags {
        self.wall_textures
            .get(texture_id as usize)
            .map(|texture| texture.flags)
            .unwrap_or_default()
    }

    pub fn set_element(&mut self, x: usize, y: usize, element: IndexElement) {
        self.map_index[cell_index(x, y)] = element;
    }

    pub fn set_link(&mut self, x: usize, y: usize, link: Link) {
        self.links[cell_index(x, y)] = link;
    }

    /// Checks array sizes and cross references.
    ///
    /// Model descriptor ids are not checked here: unknown models are inert
    /// at simulation time.
    pub fn validate(&self) -> Result<(), LevelDataError> {
        let cells = MAP_SIZE * MAP_SIZE;
        for (name, len) in [
            ("map_index", self.map_index.len()),
            ("links", self.links.len()),
            ("floor_textures", self.floor_textures.len()),
            ("ceiling_textures", self.ceiling_textures.len()),
        ] {
            if len != cells {
                return Err(LevelDataError::GridSizeMismatch {
                    array: name,
                    expected: cells,
                    actual: len,
                });
            }
        }

        for (cell, element) in self.map_index.iter().enumerate() {
            let (kind, index, len) = match *element {
                IndexElement::None => continue,
                IndexElement::StaticWall(i) => ("static wall", i, self.static_walls.len()),
                IndexElement::DynamicWall(i) => ("dynamic wall", i, self.dynamic_walls.len()),
                IndexElement::StaticModel(i) => ("static model", i, self.static_models.len()),
                IndexElement::Item(i) => ("item", i, self.items.len()),
            };
            if index as usize >= len {
                return Err(LevelDataError::DanglingIndexElement { cell, kind, index });
            }
        }

        let procedures = self.procedures.len();
        for (cell, link) in self.links.iter().enumerate() {
            if link.kind != LinkKind::None && link.procedure as usize >= procedures {
                return Err(LevelDataError::LinkToMissingProcedure {
                    cell,
                    procedure: link.procedure,
                });
            }
        }

        for (owner, procedure) in self.procedures.iter().enumerate() {
            for command in &procedure.commands {
                let target = match *command {
                    ProcedureCommand::Lock { procedure } | ProcedureCommand::Unlock { procedure } => {
                        procedure
                    }
                    _ => continue,
                };
                if target as usize >= procedures {
                    return Err(LevelDataError::CommandToMissingProcedure {
                        owner,
                        procedure: target,
                    });
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_level_is_valid() {
        assert_eq!(LevelData::empty().validate(), Ok(()));
    }

    #[test]
    fn dangling_index_element_is_rejected() {
        let mut level = LevelData::empty();
        level.set_element(3, 4, IndexElement::StaticWall(0));
        assert_eq!(
            level.validate(),
            Err(LevelDataError::DanglingIndexElement {
                cell: cell_index(3, 4),
                kind: "static wall",
                index: 0,
            })
        );
    }

    #[test]
    fn link_to_missing_procedure_is_rejected() {
        let mut level = LevelData::empty();
        level.set_link(1, 1, Link::new(LinkKind::Floor, 2));
        assert!(matches!(
            level.validate(),
            Err(LevelDataError::LinkToMissingProcedure { procedure: 2, .. })
        ));
    }

    #[test]
    fn teleport_target_decodes_fixed_point_positions() {
        let cell = Teleport {
            from: [0, 0],
            to: [5, 6],
            angle: 0.0,
        };
        assert_eq!(cell.target(), Vec2::new(5.0, 6.0));

        let fixed = Teleport {
            from: [0, 0],
            to: [512, 7],
            angle: 0.0,
        };
        assert_eq!(fixed.target(), Vec2::new(2.0, 7.0));
    }
}
