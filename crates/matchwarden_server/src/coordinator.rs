//! Move validation and turn advancement.

use crate::error::Rejection;
use crate::ids::{ClientId, MatchId};
use crate::registry::MatchRegistry;
use crate::session::{Conclusion, Pairing, Phase, Session};
use matchwarden_tictactoe::Mark;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

/// Result of a move request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Dropped; nothing changed.
    Rejected(Rejection),
    /// Placed, game continues with `next_turn` to move.
    Accepted {
        /// Mark placed.
        mark: Mark,
        /// Client now holding the turn.
        next_turn: ClientId,
    },
    /// Placed and completed a line.
    AcceptedWin {
        /// Mark placed.
        mark: Mark,
        /// The mover.
        winner: ClientId,
        /// The mover's opponent.
        loser: ClientId,
    },
    /// Placed and filled the board with no line.
    AcceptedDraw {
        /// Mark placed.
        mark: Mark,
    },
}

impl MoveOutcome {
    /// Whether the move changed the board.
    pub fn is_accepted(&self) -> bool {
        !matches!(self, MoveOutcome::Rejected(_))
    }

    /// The mark placed, if the move was accepted.
    pub fn mark(&self) -> Option<Mark> {
        match self {
            MoveOutcome::Rejected(_) => None,
            MoveOutcome::Accepted { mark, .. }
            | MoveOutcome::AcceptedWin { mark, .. }
            | MoveOutcome::AcceptedDraw { mark } => Some(*mark),
        }
    }
}

/// A resolved move together with the players it concerns.
///
/// The pairing is read inside the same critical section that applied the
/// move, so routing never races a concurrent reset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Session the move targeted.
    pub match_id: MatchId,
    /// Requested cell.
    pub cell: usize,
    /// What happened.
    pub outcome: MoveOutcome,
    /// Both players, when the session is full.
    pub pairing: Option<Pairing>,
}

/// Validates and applies moves through the registry.
///
/// All mutation happens inside [`MatchRegistry`]'s per-session critical
/// section, so requests against one session are applied strictly in the
/// order they are admitted.
#[derive(Debug, Clone, Copy)]
pub struct TurnCoordinator<'a> {
    registry: &'a MatchRegistry,
}

impl<'a> TurnCoordinator<'a> {
    /// Creates a coordinator over `registry`.
    pub fn new(registry: &'a MatchRegistry) -> Self {
        Self { registry }
    }

    /// Validates and applies a move.
    pub fn request_move(&self, match_id: &MatchId, client: ClientId, cell: usize) -> MoveOutcome {
        self.submit(match_id, client, cell).outcome
    }

    /// Like [`request_move`](Self::request_move), also returning the pairing
    /// needed to address notifications.
    pub fn submit(&self, match_id: &MatchId, client: ClientId, cell: usize) -> Resolution {
        self.submit_then(match_id, client, cell, Resolution::clone)
    }

    /// Resolves a move and hands the result to `then` before the session is
    /// unlocked, so whatever `then` emits is ordered exactly like the moves.
    #[instrument(skip(self, then))]
    pub fn submit_then<R>(
        &self,
        match_id: &MatchId,
        client: ClientId,
        cell: usize,
        then: impl FnOnce(&Resolution) -> R,
    ) -> R {
        let now = Instant::now();
        self.registry.with_session_or(match_id, |session| {
            let (outcome, pairing) = match session {
                Some(session) => (resolve(session, client, cell, now), session.pairing()),
                None => (MoveOutcome::Rejected(Rejection::UnknownMatch), None),
            };

            match outcome {
                MoveOutcome::Rejected(reason) => {
                    warn!(%match_id, %client, cell, %reason, "Move rejected");
                }
                _ => debug!(%match_id, %client, cell, ?outcome, "Move accepted"),
            }

            then(&Resolution {
                match_id: match_id.clone(),
                cell,
                outcome,
                pairing,
            })
        })
    }
}

/// Checks run in order; the first failure wins and nothing is mutated.
fn resolve(session: &mut Session, client: ClientId, cell: usize, now: Instant) -> MoveOutcome {
    let pairing = match (session.phase(), session.pairing()) {
        (Phase::Finished(_), _) => return MoveOutcome::Rejected(Rejection::MatchOver),
        (Phase::AwaitingPlayers, _) | (_, None) => {
            return MoveOutcome::Rejected(Rejection::NotStarted);
        }
        (Phase::InProgress, Some(pairing)) => pairing,
    };

    let seat = *session.current_turn();
    if pairing.in_seat(seat) != client {
        return MoveOutcome::Rejected(Rejection::OutOfTurn);
    }

    if session.place(seat, cell).is_err() {
        return MoveOutcome::Rejected(Rejection::CellOccupiedOrInvalidIndex);
    }
    session.touch(now);

    let mark = seat.mark();
    if session.board().check_win(mark) {
        session.finish(Conclusion::Won(seat));
        return MoveOutcome::AcceptedWin {
            mark,
            winner: client,
            loser: pairing.in_seat(seat.other()),
        };
    }
    if session.board().check_draw() {
        session.finish(Conclusion::Draw);
        return MoveOutcome::AcceptedDraw { mark };
    }

    let next = session.pass_turn();
    info!(match_id = %session.id(), ?next, "Turn passed");
    MoveOutcome::Accepted {
        mark,
        next_turn: pairing.in_seat(next),
    }
}
