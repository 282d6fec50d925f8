//! Per-match session state.

use crate::ids::{ClientId, MatchId};
use crate::tier::Tier;
use derive_getters::Getters;
use matchwarden_tictactoe::{Board, InvalidMove, Mark};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{info, instrument};

/// One of the two seats in a session. Seat `A` always moves first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Seat {
    /// First player, plays [`Mark::A`].
    A,
    /// Second player, plays [`Mark::B`].
    B,
}

impl Seat {
    /// The mark played from this seat.
    pub fn mark(self) -> Mark {
        match self {
            Seat::A => Mark::A,
            Seat::B => Mark::B,
        }
    }

    /// The opposite seat.
    pub fn other(self) -> Self {
        match self {
            Seat::A => Seat::B,
            Seat::B => Seat::A,
        }
    }
}

/// How a finished session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Conclusion {
    /// The player in this seat completed a line.
    Won(Seat),
    /// The board filled with no line.
    Draw,
}

/// Session lifecycle stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// One seat bound, waiting for an opponent.
    AwaitingPlayers,
    /// Both seats bound, moves accepted.
    InProgress,
    /// Terminal; further moves are rejected.
    Finished(Conclusion),
}

impl Phase {
    /// Whether the session reached a terminal state.
    pub fn is_finished(self) -> bool {
        matches!(self, Phase::Finished(_))
    }
}

/// The two clients bound to a full session, in seat order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_new::new)]
pub struct Pairing {
    /// Client in seat A.
    pub first: ClientId,
    /// Client in seat B.
    pub second: ClientId,
}

impl Pairing {
    /// Both clients, seat A first.
    pub fn both(&self) -> [ClientId; 2] {
        [self.first, self.second]
    }

    /// The client seated opposite `client`, if `client` is in this pairing.
    pub fn opponent_of(&self, client: ClientId) -> Option<ClientId> {
        if client == self.first {
            Some(self.second)
        } else if client == self.second {
            Some(self.first)
        } else {
            None
        }
    }

    /// Client bound to `seat`.
    pub fn in_seat(&self, seat: Seat) -> ClientId {
        match seat {
            Seat::A => self.first,
            Seat::B => self.second,
        }
    }
}

/// A two-player match.
///
/// Sessions are owned by the [`MatchRegistry`](crate::MatchRegistry); callers
/// only ever see cloned snapshots.
#[derive(Debug, Clone, Getters)]
pub struct Session {
    /// Registry key.
    id: MatchId,
    /// Canonical board.
    board: Board,
    /// Client in seat A.
    player_a: Option<ClientId>,
    /// Client in seat B.
    player_b: Option<ClientId>,
    /// Bucket used for pairing; `None` for sessions joined by explicit id.
    tier: Option<Tier>,
    /// Seat allowed to move next.
    current_turn: Seat,
    /// Lifecycle stage.
    phase: Phase,
    /// Last time the session was created or mutated.
    touched: Instant,
}

impl Session {
    /// Opens a session with `first` in seat A.
    #[instrument(skip(now))]
    pub(crate) fn open(id: MatchId, first: ClientId, tier: Option<Tier>, now: Instant) -> Self {
        info!(match_id = %id, client_id = %first, ?tier, "Opening session");
        Self {
            id,
            board: Board::new(),
            player_a: Some(first),
            player_b: None,
            tier,
            current_turn: Seat::A,
            phase: Phase::AwaitingPlayers,
            touched: now,
        }
    }

    /// Client bound to `seat`.
    pub fn player(&self, seat: Seat) -> Option<ClientId> {
        match seat {
            Seat::A => self.player_a,
            Seat::B => self.player_b,
        }
    }

    /// Seat occupied by `client`.
    pub fn seat_of(&self, client: ClientId) -> Option<Seat> {
        if self.player_a == Some(client) {
            Some(Seat::A)
        } else if self.player_b == Some(client) {
            Some(Seat::B)
        } else {
            None
        }
    }

    /// Whether `client` holds either seat.
    pub fn has_player(&self, client: ClientId) -> bool {
        self.seat_of(client).is_some()
    }

    /// Both players, once the second seat is bound.
    pub fn pairing(&self) -> Option<Pairing> {
        Some(Pairing::new(self.player_a?, self.player_b?))
    }

    /// The client allowed to move next, if that seat is bound.
    pub fn turn_holder(&self) -> Option<ClientId> {
        self.player(self.current_turn)
    }

    /// Waiting with exactly one seat bound.
    pub fn is_open(&self) -> bool {
        self.phase == Phase::AwaitingPlayers
            && self.player_a.is_some() != self.player_b.is_some()
    }

    /// Binds `client` to the free seat and starts the match.
    ///
    /// Only called on open sessions; the caller guarantees `client` is not
    /// already seated.
    #[instrument(skip(self, now), fields(match_id = %self.id))]
    pub(crate) fn seat_second(&mut self, client: ClientId, now: Instant) -> Option<Pairing> {
        if !self.is_open() {
            return None;
        }
        if self.player_a.is_none() {
            self.player_a = Some(client);
        } else {
            self.player_b = Some(client);
        }
        self.phase = Phase::InProgress;
        self.touched = now;
        info!(client_id = %client, "Session paired, match in progress");
        self.pairing()
    }

    /// Places the mark of `seat` on the board.
    pub(crate) fn place(&mut self, seat: Seat, cell: usize) -> Result<(), InvalidMove> {
        self.board.apply_move(cell, seat.mark())
    }

    /// Hands the turn to the other seat and returns it.
    pub(crate) fn pass_turn(&mut self) -> Seat {
        self.current_turn = self.current_turn.other();
        self.current_turn
    }

    /// Moves the session into its terminal phase.
    pub(crate) fn finish(&mut self, conclusion: Conclusion) {
        info!(match_id = %self.id, ?conclusion, "Match finished");
        self.phase = Phase::Finished(conclusion);
    }

    pub(crate) fn touch(&mut self, now: Instant) {
        self.touched = now;
    }

    /// Fresh board and turn; seat bindings survive.
    #[instrument(skip(self, now), fields(match_id = %self.id))]
    pub(crate) fn reset(&mut self, now: Instant) {
        self.board.reset();
        self.current_turn = Seat::A;
        self.phase = if self.pairing().is_some() {
            Phase::InProgress
        } else {
            Phase::AwaitingPlayers
        };
        self.touched = now;
        info!(phase = ?self.phase, "Session reset");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open(first: u64) -> Session {
        Session::open(MatchId::from("m"), ClientId::from(first), Some(Tier::Low), Instant::now())
    }

    #[test]
    fn test_open_session_waits_for_second_player() {
        let session = open(1);
        assert!(session.is_open());
        assert_eq!(session.phase(), &Phase::AwaitingPlayers);
        assert_eq!(session.current_turn(), &Seat::A);
        assert_eq!(session.pairing(), None);
        assert_eq!(session.turn_holder(), Some(ClientId::from(1)));
    }

    #[test]
    fn test_seat_second_starts_match() {
        let mut session = open(1);
        let pairing = session.seat_second(ClientId::from(2), Instant::now());
        assert_eq!(pairing, Some(Pairing::new(ClientId::from(1), ClientId::from(2))));
        assert_eq!(session.phase(), &Phase::InProgress);
        assert!(!session.is_open());
        assert_eq!(session.seat_of(ClientId::from(2)), Some(Seat::B));
    }

    #[test]
    fn test_full_session_refuses_third_player() {
        let mut session = open(1);
        session.seat_second(ClientId::from(2), Instant::now());
        assert_eq!(session.seat_second(ClientId::from(3), Instant::now()), None);
        assert!(!session.has_player(ClientId::from(3)));
    }

    #[test]
    fn test_reset_keeps_players() {
        let mut session = open(1);
        session.seat_second(ClientId::from(2), Instant::now());
        session.place(Seat::A, 4).unwrap();
        session.pass_turn();
        session.finish(Conclusion::Draw);

        session.reset(Instant::now());

        assert_eq!(session.board().occupied(), 0);
        assert_eq!(session.current_turn(), &Seat::A);
        assert_eq!(session.phase(), &Phase::InProgress);
        assert_eq!(session.player_a(), &Some(ClientId::from(1)));
        assert_eq!(session.player_b(), &Some(ClientId::from(2)));
    }

    #[test]
    fn test_pairing_opponent_lookup() {
        let pairing = Pairing::new(ClientId::from(7), ClientId::from(9));
        assert_eq!(pairing.opponent_of(ClientId::from(7)), Some(ClientId::from(9)));
        assert_eq!(pairing.opponent_of(ClientId::from(9)), Some(ClientId::from(7)));
        assert_eq!(pairing.opponent_of(ClientId::from(1)), None);
        assert_eq!(pairing.in_seat(Seat::B), ClientId::from(9));
    }
}
