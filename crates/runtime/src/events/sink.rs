use tokio::sync::broadcast;
use tracing::trace;

use sim_core::messages::{Message, MessageSink};

use super::{OutboundEvent, Recipient};

/// Publishes map notifications onto the runtime's broadcast channel.
///
/// Sending with no subscribers is not an error; the level keeps running
/// whether or not anyone watches.
pub(crate) struct ChannelSink<'a> {
    events: &'a broadcast::Sender<OutboundEvent>,
    recipient: Recipient,
}

impl<'a> ChannelSink<'a> {
    pub(crate) fn new(events: &'a broadcast::Sender<OutboundEvent>, recipient: Recipient) -> Self {
        Self { events, recipient }
    }

    fn publish(&self, reliable: bool, message: Message) {
        if self
            .events
            .send(OutboundEvent::Message {
                recipient: self.recipient,
                reliable,
                message,
            })
            .is_err()
        {
            trace!(
                target: "runtime::events",
                recipient = ?self.recipient,
                reliable,
                "no subscribers for outbound message"
            );
        }
    }
}

impl MessageSink for ChannelSink<'_> {
    fn send_reliable(&mut self, message: Message) {
        self.publish(true, message);
    }

    fn send_unreliable(&mut self, message: Message) {
        self.publish(false, message);
    }
}
