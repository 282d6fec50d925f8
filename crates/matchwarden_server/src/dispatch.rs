//! The outbound send seam.
//!
//! The core never talks to a transport. It hands addressed notifications to
//! an [`Outbox`], and whoever owns the connections delivers them.

use crate::error::DispatchError;
use crate::message::Notification;
use std::sync::{Mutex, PoisonError};
use tokio::sync::mpsc;
use tracing::{instrument, trace};

/// Accepts notifications for delivery to clients.
///
/// Implementations must not block or call back into the registry: the core
/// calls this on the caller's worker while the affected session is still
/// locked.
pub trait Outbox: Send + Sync {
    /// Queues one notification for delivery.
    fn deliver(&self, notification: Notification) -> Result<(), DispatchError>;
}

/// Forwards notifications into an unbounded tokio channel.
#[derive(Debug, Clone)]
pub struct ChannelOutbox {
    sender: mpsc::UnboundedSender<Notification>,
}

impl ChannelOutbox {
    /// Creates the outbox and the receiving end for the delivery task.
    #[instrument]
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl Outbox for ChannelOutbox {
    fn deliver(&self, notification: Notification) -> Result<(), DispatchError> {
        trace!(recipient = %notification.recipient, "Queueing notification");
        self.sender
            .send(notification)
            .map_err(|e| DispatchError::new(format!("delivery channel closed, dropped message for {}", e.0.recipient)))
    }
}

/// Collects notifications in memory.
///
/// Used by `replay` and by tests that inspect exactly what was sent.
#[derive(Debug, Default)]
pub struct MemoryOutbox {
    delivered: Mutex<Vec<Notification>>,
}

impl MemoryOutbox {
    /// Creates an empty outbox.
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes everything delivered so far.
    pub fn drain(&self) -> Vec<Notification> {
        std::mem::take(&mut *self.delivered.lock().unwrap_or_else(PoisonError::into_inner))
    }

    /// Copy of everything delivered so far.
    pub fn snapshot(&self) -> Vec<Notification> {
        self.delivered
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Outbox for MemoryOutbox {
    fn deliver(&self, notification: Notification) -> Result<(), DispatchError> {
        self.delivered
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notification);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{ClientId, MatchId};
    use crate::message::ServerMessage;

    fn note() -> Notification {
        Notification::new(
            ClientId::from(1),
            ServerMessage::Draw {
                match_id: MatchId::from("m"),
            },
        )
    }

    #[test]
    fn test_channel_outbox_forwards() {
        let (outbox, mut receiver) = ChannelOutbox::new();
        outbox.deliver(note()).unwrap();
        assert_eq!(receiver.try_recv().unwrap(), note());
    }

    #[test]
    fn test_channel_outbox_errors_when_receiver_gone() {
        let (outbox, receiver) = ChannelOutbox::new();
        drop(receiver);
        assert!(outbox.deliver(note()).is_err());
    }

    #[test]
    fn test_memory_outbox_drain_empties() {
        let outbox = MemoryOutbox::new();
        outbox.deliver(note()).unwrap();
        assert_eq!(outbox.snapshot().len(), 1);
        assert_eq!(outbox.drain(), vec![note()]);
        assert!(outbox.snapshot().is_empty());
    }
}
