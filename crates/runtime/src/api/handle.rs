//! Cloneable façade for issuing commands to the runtime.
//!
//! [`RuntimeHandle`] hides channel plumbing and offers async helpers for
//! joining players, reporting their movement and streaming outbound events.
use std::time::Duration;

use glam::Vec3;
use tokio::sync::{broadcast, mpsc, oneshot};

use sim_core::{EntityId, PlayerBehavior, StateRoot};

use super::errors::{Result, RuntimeError};
use crate::events::OutboundEvent;
use crate::workers::Command;

/// Client-facing handle to interact with the runtime
#[derive(Clone)]
pub struct RuntimeHandle {
    command_tx: mpsc::Sender<Command>,
    events: broadcast::Sender<OutboundEvent>,
}

impl RuntimeHandle {
    pub(crate) fn new(command_tx: mpsc::Sender<Command>, events: broadcast::Sender<OutboundEvent>) -> Self {
        Self { command_tx, events }
    }

    async fn request<T>(&self, command: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(command(reply_tx))
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }

    /// Join a player; it receives a birth notification for every entity.
    pub async fn spawn_player(&self, player: impl PlayerBehavior + 'static) -> Result<EntityId> {
        let player: Box<dyn PlayerBehavior> = Box::new(player);
        self.request(|reply| Command::SpawnPlayer { player, reply })
            .await
    }

    pub async fn despawn_player(&self, player: EntityId) -> Result<()> {
        self.request(|reply| Command::DespawnPlayer { player, reply })
            .await?
    }

    /// Apply a client-reported position and fire the triggers it touches.
    pub async fn report_player_position(&self, player: EntityId, position: Vec3) -> Result<()> {
        self.request(|reply| Command::ReportPlayerPosition {
            player,
            position,
            reply,
        })
        .await?
    }

    /// Fire a rocket; returns the rocket id.
    pub async fn shoot(&self, owner: EntityId, rocket_type: u8, from: Vec3, dir: Vec3) -> Result<EntityId> {
        self.request(|reply| Command::Shoot {
            owner,
            rocket_type,
            from,
            dir,
            reply,
        })
        .await?
    }

    pub async fn activate_procedure(&self, number: u16) -> Result<()> {
        self.request(|reply| Command::ActivateProcedure { number, reply })
            .await?
    }

    /// Simulation time of the last completed tick.
    pub async fn current_time(&self) -> Result<Duration> {
        self.request(|reply| Command::CurrentTime { reply }).await
    }

    pub async fn state_root(&self) -> Result<StateRoot> {
        self.request(|reply| Command::StateRoot { reply }).await
    }

    /// Subscribe to every outbound event published from now on.
    ///
    /// Use [`OutboundEvent::is_for`] to keep only what one player should see.
    pub fn subscribe(&self) -> broadcast::Receiver<OutboundEvent> {
        self.events.subscribe()
    }

    /// Stop the worker after its current tick.
    pub async fn shutdown(&self) -> Result<()> {
        self.request(|reply| Command::Shutdown { reply }).await
    }
}
