//! What subscribers of a running level receive.
mod sink;

use std::time::Duration;

use sim_core::EntityId;
use sim_core::messages::Message;

pub(crate) use sink::ChannelSink;

/// Who a notification is meant for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Recipient {
    /// Every connected observer.
    All,
    /// One player only, e.g. join-time births or text prompts.
    Player(EntityId),
}

#[derive(Debug, Clone, PartialEq)]
pub enum OutboundEvent {
    /// A simulation notification with its delivery class.
    Message {
        recipient: Recipient,
        reliable: bool,
        message: Message,
    },
    /// The level advanced to `time`; all of the tick's messages precede this.
    TickCompleted { time: Duration },
    /// A procedure ended the level.
    MapEnded,
}

impl OutboundEvent {
    /// Whether `player` should see this event.
    pub fn is_for(&self, player: EntityId) -> bool {
        match self {
            OutboundEvent::Message { recipient, .. } => match recipient {
                Recipient::All => true,
                Recipient::Player(id) => *id == player,
            },
            OutboundEvent::TickCompleted { .. } | OutboundEvent::MapEnded => true,
        }
    }
}
