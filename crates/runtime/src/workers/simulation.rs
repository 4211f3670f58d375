//! Simulation worker that owns the authoritative [`sim_core::Map`].
//!
//! Advances the level on a fixed interval, applies commands from
//! [`crate::RuntimeHandle`] between ticks, and publishes every outbound
//! notification on the runtime's broadcast channel.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use glam::Vec3;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info, warn};

use sim_core::{EntityId, Map, MapError, PlayerBehavior, StateRoot};

use crate::api::Result;
use crate::events::{ChannelSink, OutboundEvent, Recipient};

/// Commands that can be sent to the simulation worker
pub enum Command {
    /// Join a player and introduce the level to it.
    SpawnPlayer {
        player: Box<dyn PlayerBehavior>,
        reply: oneshot::Sender<EntityId>,
    },
    DespawnPlayer {
        player: EntityId,
        reply: oneshot::Sender<Result<()>>,
    },
    /// Move a player to its client-reported position and fire what it touches.
    ReportPlayerPosition {
        player: EntityId,
        position: Vec3,
        reply: oneshot::Sender<Result<()>>,
    },
    Shoot {
        owner: EntityId,
        rocket_type: u8,
        from: Vec3,
        dir: Vec3,
        reply: oneshot::Sender<Result<EntityId>>,
    },
    ActivateProcedure {
        number: u16,
        reply: oneshot::Sender<Result<()>>,
    },
    CurrentTime {
        reply: oneshot::Sender<Duration>,
    },
    StateRoot {
        reply: oneshot::Sender<StateRoot>,
    },
    Shutdown {
        reply: oneshot::Sender<()>,
    },
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Command::SpawnPlayer { .. } => "spawn_player",
            Command::DespawnPlayer { .. } => "despawn_player",
            Command::ReportPlayerPosition { .. } => "report_player_position",
            Command::Shoot { .. } => "shoot",
            Command::ActivateProcedure { .. } => "activate_procedure",
            Command::CurrentTime { .. } => "current_time",
            Command::StateRoot { .. } => "state_root",
            Command::Shutdown { .. } => "shutdown",
        }
    }
}

/// Background task that owns the map and its clock.
pub struct SimulationWorker {
    map: Map,
    time: Duration,
    tick_interval: Duration,
    command_rx: mpsc::Receiver<Command>,
    events: broadcast::Sender<OutboundEvent>,
    map_ended: Arc<AtomicBool>,
}

impl SimulationWorker {
    pub fn new(
        mut map: Map,
        tick_interval: Duration,
        command_rx: mpsc::Receiver<Command>,
        events: broadcast::Sender<OutboundEvent>,
    ) -> Self {
        let map_ended = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&map_ended);
        map.set_map_end_hook(move || flag.store(true, Ordering::Release));

        info!(
            target: "runtime::worker",
            tick_interval = ?tick_interval,
            start_time = ?map.current_time(),
            "simulation worker initialized"
        );

        Self {
            time: map.current_time(),
            map,
            tick_interval,
            command_rx,
            events,
            map_ended,
        }
    }

    /// Main worker loop.
    pub async fn run(mut self) {
        let mut interval = time::interval(self.tick_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick of an interval completes immediately.
        interval.tick().await;

        loop {
            tokio::select! {
                _ = interval.tick() => self.tick(),
                command = self.command_rx.recv() => match command {
                    Some(Command::Shutdown { reply }) => {
                        if reply.send(()).is_err() {
                            debug!(target: "runtime::worker", "Shutdown reply channel closed (caller dropped)");
                        }
                        break;
                    }
                    Some(command) => self.handle_command(command),
                    None => break,
                },
            }
        }

        info!(target: "runtime::worker", time = ?self.time, "simulation worker stopped");
    }

    fn tick(&mut self) {
        self.time += self.tick_interval;
        self.map.tick(self.time, self.tick_interval);

        let mut sink = ChannelSink::new(&self.events, Recipient::All);
        self.map.send_update_messages(&mut sink);
        self.map.clear_update_events();

        if self.map_ended.swap(false, Ordering::AcqRel) {
            info!(target: "runtime::worker", time = ?self.time, "map ended");
            self.publish(OutboundEvent::MapEnded);
        }
        self.publish(OutboundEvent::TickCompleted { time: self.time });
    }

    fn publish(&self, event: OutboundEvent) {
        // No subscribers is fine; the level keeps running unobserved.
        let _ = self.events.send(event);
    }

    fn handle_command(&mut self, command: Command) {
        let name = command.name();
        let delivered = match command {
            Command::SpawnPlayer { player, reply } => {
                let id = self.spawn_player(player);
                reply.send(id).is_ok()
            }
            Command::DespawnPlayer { player, reply } => {
                let result = self.despawn_player(player);
                reply.send(result).is_ok()
            }
            Command::ReportPlayerPosition {
                player,
                position,
                reply,
            } => {
                let result = self.report_player_position(player, position);
                reply.send(result).is_ok()
            }
            Command::Shoot {
                owner,
                rocket_type,
                from,
                dir,
                reply,
            } => {
                let result = self
                    .map
                    .shoot(owner, rocket_type, from, dir)
                    .map_err(Into::into);
                reply.send(result).is_ok()
            }
            Command::ActivateProcedure { number, reply } => {
                let result = self.map.activate_procedure(number).map_err(Into::into);
                reply.send(result).is_ok()
            }
            Command::CurrentTime { reply } => reply.send(self.time).is_ok(),
            Command::StateRoot { reply } => reply.send(self.map.state_root()).is_ok(),
            Command::Shutdown { reply } => reply.send(()).is_ok(),
        };
        if !delivered {
            debug!(target: "runtime::worker", command = name, "reply channel closed (caller dropped)");
        }
    }

    fn spawn_player(&mut self, player: Box<dyn PlayerBehavior>) -> EntityId {
        let id = self.map.spawn_player(player);
        let mut sink = ChannelSink::new(&self.events, Recipient::Player(id));
        self.map.send_messages_for_new_player(&mut sink);
        id
    }

    fn despawn_player(&mut self, player: EntityId) -> Result<()> {
        let entity = self
            .map
            .entity(player)
            .ok_or(MapError::UnknownEntity(player))?;
        if !entity.is_player() {
            return Err(MapError::NotAPlayer(player).into());
        }
        self.map.despawn(player)?;
        info!(target: "runtime::worker", player = %player, "player left");
        Ok(())
    }

    fn report_player_position(&mut self, player: EntityId, position: Vec3) -> Result<()> {
        let entity = self
            .map
            .entity_mut(player)
            .ok_or(MapError::UnknownEntity(player))?;
        if !entity.is_player() {
            warn!(target: "runtime::worker", entity = %player, "position report for a non-player");
            return Err(MapError::NotAPlayer(player).into());
        }
        entity.set_position(position);

        let mut sink = ChannelSink::new(&self.events, Recipient::Player(player));
        self.map.process_player_position(player, &mut sink)?;
        Ok(())
    }
}
