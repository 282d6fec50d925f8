//! Owner of the registry and the outbound seam.

use crate::coordinator::{MoveOutcome, Resolution, TurnCoordinator};
use crate::dispatch::Outbox;
use crate::error::DispatchError;
use crate::event::InboundEvent;
use crate::ids::MatchId;
use crate::message::Notification;
use crate::registry::{MatchRegistry, Registration};
use crate::router::NotificationRouter;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

/// Turns inbound events into state changes and addressed notifications.
///
/// Created once at startup by whoever runs the event loop and shared by
/// reference (or `Arc`) with every worker. Notifications for a session are
/// emitted while that session is still locked, so every client observes a
/// session's events in the order they were applied.
#[derive(Debug)]
pub struct Arbiter<O> {
    registry: MatchRegistry,
    outbox: O,
}

impl<O> Arbiter<O> {
    /// Creates an arbiter over an explicitly constructed registry.
    pub fn new(registry: MatchRegistry, outbox: O) -> Self {
        Self { registry, outbox }
    }

    /// The session table.
    pub fn registry(&self) -> &MatchRegistry {
        &self.registry
    }

    /// The outbound seam.
    pub fn outbox(&self) -> &O {
        &self.outbox
    }

    /// Applies `event` and returns the notifications it produces, without
    /// sending them.
    pub fn plan(&self, event: InboundEvent) -> Vec<Notification> {
        self.apply(event, |notifications| notifications)
    }

    /// Reclaims sessions idle past the registry's expiry policy.
    pub fn sweep(&self, now: Instant) -> Vec<MatchId> {
        self.registry.expire(now)
    }

    /// Applies `event` and calls `emit` exactly once with its notifications.
    ///
    /// When the event touches a session, `emit` runs inside that session's
    /// critical section.
    #[instrument(skip(self, emit))]
    fn apply<R>(&self, event: InboundEvent, mut emit: impl FnMut(Vec<Notification>) -> R) -> R {
        match event {
            InboundEvent::Join { client_id, rating } => self
                .registry
                .enroll_then(client_id, rating, |registration| emit(Self::announce(registration))),
            InboundEvent::JoinMatch { match_id, client_id } => {
                let joined = self
                    .registry
                    .join_match_then(match_id, client_id, |registration| emit(Self::announce(registration)));
                match joined {
                    Ok(emitted) => emitted,
                    Err(e) => {
                        warn!(%client_id, error = %e, "Join refused");
                        emit(Vec::new())
                    }
                }
            }
            InboundEvent::Move {
                match_id,
                client_id,
                cell,
            } => TurnCoordinator::new(&self.registry)
                .submit_then(&match_id, client_id, cell, |resolution| emit(Self::route(resolution))),
            InboundEvent::Reset { match_id } => {
                let reset = self.registry.reset_match_then(&match_id, |pairing| match pairing {
                    Some(pairing) => emit(NotificationRouter::match_started(&match_id, pairing)),
                    None => {
                        debug!(%match_id, "Reset without a full pairing, nothing to announce");
                        emit(Vec::new())
                    }
                });
                reset.unwrap_or_else(|| emit(Vec::new()))
            }
            InboundEvent::Leave { client_id } => {
                let released = self.registry.release_client(client_id);
                debug!(%client_id, released = released.len(), "Client left");
                emit(Vec::new())
            }
        }
    }

    fn announce(registration: &Registration) -> Vec<Notification> {
        match registration.pairing {
            Some(pairing) => {
                info!(match_id = %registration.match_id, "Match ready, announcing start");
                NotificationRouter::match_started(&registration.match_id, pairing)
            }
            None => Vec::new(),
        }
    }

    fn route(resolution: &Resolution) -> Vec<Notification> {
        match (&resolution.outcome, resolution.pairing) {
            (MoveOutcome::Rejected(_), _) | (_, None) => Vec::new(),
            (outcome, Some(pairing)) => {
                NotificationRouter::move_resolved(&resolution.match_id, pairing, resolution.cell, outcome)
            }
        }
    }
}

impl<O: Outbox> Arbiter<O> {
    /// Applies `event` and delivers its notifications through the outbox.
    ///
    /// Delivery happens before the affected session is unlocked. Returns how
    /// many notifications were delivered. Stops at the first delivery
    /// failure; the state change itself has already happened.
    pub fn handle(&self, event: InboundEvent) -> Result<usize, DispatchError> {
        self.apply(event, |notifications| -> Result<usize, DispatchError> {
            let count = notifications.len();
            for notification in notifications {
                self.outbox.deliver(notification)?;
            }
            Ok(count)
        })
    }
}
