//! Outbound message shapes.
//!
//! These are a contract with the delivery collaborator, not a wire format;
//! the binary happens to carry them as JSON lines.

use crate::ids::{ClientId, MatchId};
use matchwarden_tictactoe::Mark;
use serde::{Deserialize, Serialize};

/// A message the server sends to one client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Both seats are bound; the match begins.
    MatchStart {
        /// Match that started.
        match_id: MatchId,
    },
    /// Whose turn it is, from the recipient's point of view.
    TurnChanged {
        /// Match concerned.
        match_id: MatchId,
        /// True iff the recipient holds the turn.
        is_your_turn: bool,
    },
    /// A mark was placed.
    MoveApplied {
        /// Match concerned.
        match_id: MatchId,
        /// Board index 0-8.
        cell: usize,
        /// Mark placed.
        mark: Mark,
    },
    /// The recipient won.
    YouWin {
        /// Match concerned.
        match_id: MatchId,
    },
    /// The recipient lost.
    YouLose {
        /// Match concerned.
        match_id: MatchId,
    },
    /// The match ended in a draw.
    Draw {
        /// Match concerned.
        match_id: MatchId,
    },
}

/// A message addressed to a single client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_new::new)]
pub struct Notification {
    /// Client that should receive the message.
    pub recipient: ClientId,
    /// The message.
    pub message: ServerMessage,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_notification_json_shape() {
        let notification = Notification::new(
            ClientId::from(5),
            ServerMessage::MoveApplied {
                match_id: MatchId::from("m1"),
                cell: 4,
                mark: Mark::B,
            },
        );
        assert_eq!(
            serde_json::to_value(&notification).unwrap(),
            json!({
                "recipient": 5,
                "message": { "type": "move_applied", "match_id": "m1", "cell": 4, "mark": "B" }
            })
        );
    }
}
