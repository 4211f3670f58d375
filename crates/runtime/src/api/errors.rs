//! Unified error types surfaced by the runtime API.
//!
//! Wraps construction failures, map misuse and worker coordination failures
//! so clients can bubble them up with consistent context.
use thiserror::Error;
use tokio::sync::oneshot;

use sim_core::{ErrorSeverity, LevelDataError, MapError, SimError};

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("runtime requires level data to be configured before building")]
    MissingLevel,

    #[error("runtime requires game resources to be configured before building")]
    MissingResources,

    #[error("runtime requires a monster factory to be configured before building")]
    MissingMonsterFactory,

    #[error("runtime was already started")]
    AlreadyStarted,

    #[error("invalid level data")]
    Level(#[from] LevelDataError),

    #[error(transparent)]
    Map(#[from] MapError),

    #[error("simulation worker command channel closed")]
    CommandChannelClosed,

    #[error("simulation worker reply channel closed")]
    ReplyChannelClosed(#[source] oneshot::error::RecvError),

    #[error("simulation worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),
}

impl SimError for RuntimeError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::MissingLevel
            | Self::MissingResources
            | Self::MissingMonsterFactory
            | Self::AlreadyStarted => ErrorSeverity::Validation,
            Self::Level(error) => error.severity(),
            Self::Map(error) => error.severity(),
            Self::CommandChannelClosed | Self::ReplyChannelClosed(_) => ErrorSeverity::Fatal,
            Self::WorkerJoin(_) => ErrorSeverity::Internal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::MissingLevel => "RUNTIME_MISSING_LEVEL",
            Self::MissingResources => "RUNTIME_MISSING_RESOURCES",
            Self::MissingMonsterFactory => "RUNTIME_MISSING_MONSTER_FACTORY",
            Self::AlreadyStarted => "RUNTIME_ALREADY_STARTED",
            Self::Level(error) => error.error_code(),
            Self::Map(error) => error.error_code(),
            Self::CommandChannelClosed => "RUNTIME_COMMAND_CHANNEL_CLOSED",
            Self::ReplyChannelClosed(_) => "RUNTIME_REPLY_CHANNEL_CLOSED",
            Self::WorkerJoin(_) => "RUNTIME_WORKER_JOIN",
        }
    }
}
