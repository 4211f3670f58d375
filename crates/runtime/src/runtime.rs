//! High-level runtime orchestrator.
//!
//! The runtime builds the map, wires up command/event channels, and owns the
//! background worker that drives the level.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::info;

use sim_core::{DifficultyFlags, Env, GameResources, LevelData, Map, MonsterFactory, SimConfig};

use crate::api::{Result, RuntimeError, RuntimeHandle};
use crate::events::OutboundEvent;
use crate::workers::SimulationWorker;

/// Runtime configuration shared across the orchestrator and workers.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub sim: SimConfig,
    pub difficulty: DifficultyFlags,
    /// Simulated time per tick; also the wall-clock tick period.
    pub tick_interval: Duration,
    pub event_buffer_size: usize,
    pub command_buffer_size: usize,
}

impl RuntimeConfig {
    pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(20);
    pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 1024;
    pub const DEFAULT_COMMAND_BUFFER_SIZE: usize = 32;

    pub fn with_sim(mut self, sim: SimConfig) -> Self {
        self.sim = sim;
        self
    }

    pub fn with_difficulty(mut self, difficulty: DifficultyFlags) -> Self {
        self.difficulty = difficulty;
        self
    }

    pub fn with_tick_interval(mut self, tick_interval: Duration) -> Self {
        self.tick_interval = tick_interval;
        self
    }

    pub fn with_event_buffer_size(mut self, size: usize) -> Self {
        self.event_buffer_size = size;
        self
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            sim: SimConfig::default(),
            difficulty: DifficultyFlags::NORMAL,
            tick_interval: Self::DEFAULT_TICK_INTERVAL,
            event_buffer_size: Self::DEFAULT_EVENT_BUFFER_SIZE,
            command_buffer_size: Self::DEFAULT_COMMAND_BUFFER_SIZE,
        }
    }
}

/// Main runtime that hosts one level
///
/// [`RuntimeHandle`] provides a cloneable façade for clients.
pub struct Runtime {
    handle: RuntimeHandle,
    worker: Option<SimulationWorker>,
    worker_handle: Option<JoinHandle<()>>,
}

impl Runtime {
    /// Create a new runtime builder
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Get a cloneable handle to this runtime
    pub fn handle(&self) -> RuntimeHandle {
        self.handle.clone()
    }

    /// Spawn the simulation worker on the current tokio runtime.
    pub fn start(&mut self) -> Result<RuntimeHandle> {
        let worker = self.worker.take().ok_or(RuntimeError::AlreadyStarted)?;
        self.worker_handle = Some(tokio::spawn(worker.run()));
        Ok(self.handle())
    }

    /// Stop the worker and wait for it to finish.
    pub async fn shutdown(self) -> Result<()> {
        let Some(worker_handle) = self.worker_handle else {
            return Ok(());
        };
        match self.handle.shutdown().await {
            // Another handle already stopped the worker.
            Ok(()) | Err(RuntimeError::CommandChannelClosed) | Err(RuntimeError::ReplyChannelClosed(_)) => {}
            Err(error) => return Err(error),
        }
        worker_handle.await.map_err(RuntimeError::WorkerJoin)
    }
}

/// Builder for [`Runtime`] with flexible configuration.
pub struct RuntimeBuilder {
    config: RuntimeConfig,
    level: Option<Arc<LevelData>>,
    resources: Option<Arc<GameResources>>,
    monster_factory: Option<Box<dyn MonsterFactory>>,
    start_time: Duration,
}

impl RuntimeBuilder {
    fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            level: None,
            resources: None,
            monster_factory: None,
            start_time: Duration::ZERO,
        }
    }

    /// Override runtime configuration
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    pub fn level(mut self, level: impl Into<Arc<LevelData>>) -> Self {
        self.level = Some(level.into());
        self
    }

    pub fn resources(mut self, resources: impl Into<Arc<GameResources>>) -> Self {
        self.resources = Some(resources.into());
        self
    }

    /// Controllers for the level's monster spawns
    pub fn monster_factory(mut self, factory: impl MonsterFactory + 'static) -> Self {
        self.monster_factory = Some(Box::new(factory));
        self
    }

    /// Simulation time the level starts at
    pub fn start_time(mut self, start_time: Duration) -> Self {
        self.start_time = start_time;
        self
    }

    /// Validate the level and build the map; the worker starts with
    /// [`Runtime::start`].
    pub fn build(self) -> Result<Runtime> {
        let level = self.level.ok_or(RuntimeError::MissingLevel)?;
        let resources = self.resources.ok_or(RuntimeError::MissingResources)?;
        let factory = self
            .monster_factory
            .ok_or(RuntimeError::MissingMonsterFactory)?;
        let config = self.config;
        let tick_interval = if config.tick_interval.is_zero() {
            RuntimeConfig::DEFAULT_TICK_INTERVAL
        } else {
            config.tick_interval
        };

        let map = Map::new(
            Env::new(level, resources),
            config.sim,
            config.difficulty,
            self.start_time,
            factory.as_ref(),
        )?;

        let (command_tx, command_rx) = mpsc::channel(config.command_buffer_size.max(1));
        let (events_tx, _) = broadcast::channel(config.event_buffer_size.max(1));
        let worker = SimulationWorker::new(map, tick_interval, command_rx, events_tx.clone());

        info!(
            target: "runtime",
            tick_interval = ?tick_interval,
            difficulty = ?config.difficulty,
            "runtime built"
        );

        Ok(Runtime {
            handle: RuntimeHandle::new(command_tx, events_tx),
            worker: Some(worker),
            worker_handle: None,
        })
    }
}
