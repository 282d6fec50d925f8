//! Matchwarden - server-authoritative tic-tac-toe match coordination.
//!
//! Pairs waiting clients into two-player sessions by skill tier, keeps the
//! canonical board for each session, validates and applies moves, and
//! addresses the resulting notifications to the right players.
//!
//! # Architecture
//!
//! - **MatchRegistry**: owns every session; pairing, lookup, reset, expiry
//! - **TurnCoordinator**: validates moves and advances turns
//! - **NotificationRouter**: pure mapping from outcomes to addressed messages
//! - **Outbox**: the transport-agnostic send seam
//! - **Arbiter**: owns the registry and outbox, handles inbound events
//! - **pump_events**: newline-delimited JSON intake for the `serve` loop
//!
//! Apart from the intake loop, the core performs no I/O and never suspends.
//!
//! # Example
//!
//! ```
//! use matchwarden_server::{Arbiter, ClientId, InboundEvent, MatchRegistry, MemoryOutbox};
//!
//! let arbiter = Arbiter::new(MatchRegistry::new(), MemoryOutbox::new());
//! arbiter.handle(InboundEvent::Join { client_id: ClientId::from(1), rating: 20 }).unwrap();
//! arbiter.handle(InboundEvent::Join { client_id: ClientId::from(2), rating: 25 }).unwrap();
//!
//! // MatchStart and TurnChanged for both players.
//! assert_eq!(arbiter.outbox().drain().len(), 4);
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod arbiter;
mod config;
mod coordinator;
mod dispatch;
mod error;
mod event;
mod ids;
mod intake;
mod message;
mod registry;
mod router;
mod session;
mod tier;

// Crate-level exports - Event loop
pub use arbiter::Arbiter;
pub use event::InboundEvent;
pub use intake::{IntakeSummary, pump_events};

// Crate-level exports - Configuration
pub use config::ServerConfig;

// Crate-level exports - Errors
pub use error::{ConfigError, DispatchError, JoinError, Rejection};

// Crate-level exports - Identity and pairing
pub use ids::{ClientId, MatchId};
pub use tier::{LOW_TIER_MAX, MID_TIER_MAX, Tier};

// Crate-level exports - Sessions
pub use registry::{ExpiryPolicy, MatchRegistry, Registration};
pub use session::{Conclusion, Pairing, Phase, Seat, Session};

// Crate-level exports - Moves and notifications
pub use coordinator::{MoveOutcome, Resolution, TurnCoordinator};
pub use dispatch::{ChannelOutbox, MemoryOutbox, Outbox};
pub use message::{Notification, ServerMessage};
pub use router::NotificationRouter;

// Crate-level exports - Game types
pub use matchwarden_tictactoe::{Board, Cell, InvalidMove, Mark};
