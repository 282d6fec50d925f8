//! Inbound events delivered by the transport layer.

use crate::ids::{ClientId, MatchId};
use serde::{Deserialize, Serialize};

/// Something a client asked the server to do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum InboundEvent {
    /// Join by skill rating; paired with the first same-tier waiting player.
    Join {
        /// Joining client.
        client_id: ClientId,
        /// Skill rating 0-100.
        rating: u8,
    },
    /// Join a session named by the lobby.
    JoinMatch {
        /// Lobby-supplied match id.
        match_id: MatchId,
        /// Joining client.
        client_id: ClientId,
    },
    /// Place a mark.
    Move {
        /// Target session.
        match_id: MatchId,
        /// Moving client.
        client_id: ClientId,
        /// Board index 0-8.
        cell: usize,
    },
    /// Start the match over with the same players.
    Reset {
        /// Session to reset.
        match_id: MatchId,
    },
    /// The client disconnected.
    Leave {
        /// Departing client.
        client_id: ClientId,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_move_line() {
        let event: InboundEvent =
            serde_json::from_str(r#"{"event":"move","match_id":"abc","client_id":7,"cell":4}"#).unwrap();
        assert_eq!(
            event,
            InboundEvent::Move {
                match_id: MatchId::from("abc"),
                client_id: ClientId::from(7),
                cell: 4,
            }
        );
    }

    #[test]
    fn test_parse_join_line() {
        let event: InboundEvent = serde_json::from_str(r#"{"event":"join","client_id":1,"rating":42}"#).unwrap();
        assert_eq!(
            event,
            InboundEvent::Join {
                client_id: ClientId::from(1),
                rating: 42,
            }
        );
    }

    #[test]
    fn test_negative_cell_fails_to_parse() {
        let parsed = serde_json::from_str::<InboundEvent>(r#"{"event":"move","match_id":"a","client_id":1,"cell":-1}"#);
        assert!(parsed.is_err());
    }
}
