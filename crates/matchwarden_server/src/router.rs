//! Addressing of outbound notifications.

use crate::coordinator::MoveOutcome;
use crate::ids::{ClientId, MatchId};
use crate::message::{Notification, ServerMessage};
use crate::session::Pairing;
use tracing::instrument;

/// Maps resolved events to addressed notifications.
///
/// Pure: no transport, no registry access. Ordering within each result
/// follows the order clients expect to apply them.
#[derive(Debug, Clone, Copy, Default)]
pub struct NotificationRouter;

impl NotificationRouter {
    /// `MatchStart` to both players, then the initial `TurnChanged` with
    /// seat A holding the turn.
    #[instrument]
    pub fn match_started(match_id: &MatchId, pairing: Pairing) -> Vec<Notification> {
        let mut out: Vec<Notification> = pairing
            .both()
            .into_iter()
            .map(|recipient| {
                Notification::new(
                    recipient,
                    ServerMessage::MatchStart {
                        match_id: match_id.clone(),
                    },
                )
            })
            .collect();
        out.extend(Self::turn_changed(match_id, pairing, pairing.first));
        out
    }

    /// Notifications for a resolved move. Rejections produce none.
    #[instrument]
    pub fn move_resolved(
        match_id: &MatchId,
        pairing: Pairing,
        cell: usize,
        outcome: &MoveOutcome,
    ) -> Vec<Notification> {
        let mut out = Vec::new();
        let mark = match *outcome {
            MoveOutcome::Rejected(_) => return out,
            MoveOutcome::Accepted { mark, next_turn } => {
                out.extend(Self::turn_changed(match_id, pairing, next_turn));
                mark
            }
            MoveOutcome::AcceptedWin { mark, winner, loser } => {
                out.push(Notification::new(
                    winner,
                    ServerMessage::YouWin {
                        match_id: match_id.clone(),
                    },
                ));
                out.push(Notification::new(
                    loser,
                    ServerMessage::YouLose {
                        match_id: match_id.clone(),
                    },
                ));
                mark
            }
            MoveOutcome::AcceptedDraw { mark } => {
                out.extend(Self::broadcast(pairing, || ServerMessage::Draw {
                    match_id: match_id.clone(),
                }));
                mark
            }
        };
        out.extend(Self::broadcast(pairing, || ServerMessage::MoveApplied {
            match_id: match_id.clone(),
            cell,
            mark,
        }));
        out
    }

    fn turn_changed(
        match_id: &MatchId,
        pairing: Pairing,
        holder: ClientId,
    ) -> impl Iterator<Item = Notification> + '_ {
        pairing.both().into_iter().map(move |recipient| {
            Notification::new(
                recipient,
                ServerMessage::TurnChanged {
                    match_id: match_id.clone(),
                    is_your_turn: recipient == holder,
                },
            )
        })
    }

    fn broadcast(
        pairing: Pairing,
        message: impl Fn() -> ServerMessage,
    ) -> impl Iterator<Item = Notification> {
        pairing
            .both()
            .into_iter()
            .map(move |recipient| Notification::new(recipient, message()))
    }
}
