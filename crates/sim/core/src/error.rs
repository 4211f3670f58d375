//! Common error infrastructure for sim-core.
//!
//! Only construction and caller misuse surface as errors. Malformed references
//! inside level data that passed validation are treated as inert by the
//! simulation and never fail a tick.

use crate::entity::EntityId;

/// Severity level of an error, used for categorization and recovery strategies.
///
/// - **Recoverable**: the call may succeed later or with other arguments
/// - **Validation**: invalid input that should be rejected without retry
/// - **Internal**: state inconsistency inside the simulation
/// - **Fatal**: the simulation cannot continue
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    Recoverable,
    Validation,
    Internal,
    Fatal,
}

impl ErrorSeverity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }

    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }

    /// Returns true if this error indicates a bug in the simulation itself.
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal | Self::Fatal)
    }
}

/// Common trait for all sim-core errors.
///
/// - Use `#[derive(thiserror::Error)]` for Display/Error impl
/// - Classify severity based on recoverability, not impact
pub trait SimError: core::fmt::Display + core::fmt::Debug {
    fn severity(&self) -> ErrorSeverity;

    /// Returns a static string identifier for this error variant.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}

/// Errors returned by [`crate::Map`] operations called with bad arguments.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum MapError {
    #[error("entity {0} does not exist")]
    UnknownEntity(EntityId),

    #[error("entity {0} is not a player")]
    NotAPlayer(EntityId),

    #[error("procedure {number} does not exist (level has {count})")]
    UnknownProcedure { number: u16, count: usize },

    #[error("rocket type {0} is not described by the game resources")]
    UnknownRocketType(u8),

    #[error("shot direction must be a non-zero finite vector")]
    InvalidDirection,
}

impl SimError for MapError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            MapError::UnknownEntity(_) => "MAP_UNKNOWN_ENTITY",
            MapError::NotAPlayer(_) => "MAP_NOT_A_PLAYER",
            MapError::UnknownProcedure { .. } => "MAP_UNKNOWN_PROCEDURE",
            MapError::UnknownRocketType(_) => "MAP_UNKNOWN_ROCKET_TYPE",
            MapError::InvalidDirection => "MAP_INVALID_DIRECTION",
        }
    }
}
