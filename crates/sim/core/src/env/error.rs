//! Level data validation errors.

use crate::error::{ErrorSeverity, SimError};

/// Structural problems found in a [`super::LevelData`] before a map is built.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum LevelDataError {
    #[error("{array} holds {actual} cells, expected {expected}")]
    GridSizeMismatch {
        array: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("cell {cell} refers to missing {kind} {index}")]
    DanglingIndexElement {
        cell: usize,
        kind: &'static str,
        index: u16,
    },

    #[error("link in cell {cell} refers to missing procedure {procedure}")]
    LinkToMissingProcedure { cell: usize, procedure: u16 },

    #[error("procedure {owner} commands missing procedure {procedure}")]
    CommandToMissingProcedure { owner: usize, procedure: u16 },
}

impl SimError for LevelDataError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Fatal
    }

    fn error_code(&self) -> &'static str {
        use LevelDataError::*;
        match self {
            GridSizeMismatch { .. } => "LEVEL_GRID_SIZE_MISMATCH",
            DanglingIndexElement { .. } => "LEVEL_DANGLING_INDEX_ELEMENT",
            LinkToMissingProcedure { .. } => "LEVEL_LINK_TO_MISSING_PROCEDURE",
            CommandToMissingProcedure { .. } => "LEVEL_COMMAND_TO_MISSING_PROCEDURE",
        }
    }
}
