//! Live session table and pairing policy.
//!
//! The registry is the only writer of session state. Lock order is always
//! table, then session: joins, expiry and release hold the table lock while
//! inspecting sessions, whereas moves and resets clone a session handle under
//! a brief read lock and then lock only that session. Moves against different
//! matches therefore never wait on each other.

use crate::error::JoinError;
use crate::ids::{ClientId, MatchId};
use crate::session::{Pairing, Phase, Session};
use crate::tier::Tier;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

type SessionHandle = Arc<Mutex<Session>>;

/// When idle sessions may be reclaimed. Both limits are off by default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExpiryPolicy {
    /// Idle limit for sessions still waiting for a second player.
    pub awaiting_ttl: Option<Duration>,
    /// Idle limit for finished sessions.
    pub finished_ttl: Option<Duration>,
}

impl ExpiryPolicy {
    /// Whether `session` has been idle past its phase's limit at `now`.
    ///
    /// In-progress sessions never expire.
    pub fn is_expired(&self, session: &Session, now: Instant) -> bool {
        let ttl = match session.phase() {
            Phase::AwaitingPlayers => self.awaiting_ttl,
            Phase::InProgress => None,
            Phase::Finished(_) => self.finished_ttl,
        };
        ttl.is_some_and(|ttl| now.saturating_duration_since(*session.touched()) > ttl)
    }
}

/// Result of a successful join.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    /// Session the client is seated in.
    pub match_id: MatchId,
    /// Present exactly when this join filled the session.
    pub pairing: Option<Pairing>,
}

#[derive(Debug, Default)]
struct Table {
    /// Match ids in insertion order; pairing scans in this order.
    order: Vec<MatchId>,
    sessions: HashMap<MatchId, SessionHandle>,
}

impl Table {
    fn handles(&self) -> impl Iterator<Item = (&MatchId, &SessionHandle)> {
        self.order
            .iter()
            .filter_map(|id| self.sessions.get(id).map(|handle| (id, handle)))
    }

    fn insert(&mut self, session: Session) {
        let id = session.id().clone();
        self.order.push(id.clone());
        self.sessions.insert(id, Arc::new(Mutex::new(session)));
    }

    fn remove_all(&mut self, ids: &[MatchId]) {
        if ids.is_empty() {
            return;
        }
        self.order.retain(|id| !ids.contains(id));
        for id in ids {
            self.sessions.remove(id);
        }
    }
}

fn lock(handle: &SessionHandle) -> MutexGuard<'_, Session> {
    handle.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Owns every live session, keyed by match id.
///
/// Constructed once by whatever runs the event loop and shared by
/// reference; there is no global instance.
#[derive(Debug, Default)]
pub struct MatchRegistry {
    table: RwLock<Table>,
    policy: ExpiryPolicy,
}

impl MatchRegistry {
    /// Creates an empty registry that never expires sessions.
    #[instrument]
    pub fn new() -> Self {
        info!("Creating match registry");
        Self::default()
    }

    /// Creates an empty registry with the given expiry policy.
    #[instrument]
    pub fn with_policy(policy: ExpiryPolicy) -> Self {
        info!("Creating match registry with expiry policy");
        Self {
            table: RwLock::default(),
            policy,
        }
    }

    /// The active expiry policy.
    pub fn policy(&self) -> &ExpiryPolicy {
        &self.policy
    }

    fn read(&self) -> RwLockReadGuard<'_, Table> {
        self.table.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Table> {
        self.table.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Seats `client` by tier and returns the match id.
    ///
    /// See [`enroll`](Self::enroll) for the pairing policy.
    pub fn register_player(&self, client: ClientId, rating: u8) -> MatchId {
        self.enroll(client, rating).match_id
    }

    /// Seats `client` in the first open session of the same tier, or opens a
    /// new one.
    ///
    /// Open sessions are scanned in insertion order and the first compatible
    /// one wins. A client already waiting alone is handed back its own
    /// session rather than being paired with itself.
    pub fn enroll(&self, client: ClientId, rating: u8) -> Registration {
        self.enroll_then(client, rating, Registration::clone)
    }

    /// Like [`enroll`](Self::enroll), running `then` before the table and the
    /// filled session are unlocked.
    #[instrument(skip(self, then))]
    pub(crate) fn enroll_then<R>(&self, client: ClientId, rating: u8, then: impl FnOnce(&Registration) -> R) -> R {
        let tier = Tier::of(rating);
        let now = Instant::now();
        let mut table = self.write();

        let mut candidate = None;
        for (id, handle) in table.handles() {
            let session = lock(handle);
            if !session.is_open() {
                continue;
            }
            if session.has_player(client) {
                debug!(match_id = %id, "Client already waiting in this session");
                return then(&Registration {
                    match_id: id.clone(),
                    pairing: None,
                });
            }
            if candidate.is_none() && session.tier() == &Some(tier) {
                candidate = Some((id.clone(), Arc::clone(handle)));
            }
        }

        if let Some((id, handle)) = candidate {
            let mut session = lock(&handle);
            if let Some(pairing) = session.seat_second(client, now) {
                info!(match_id = %id, %tier, "Paired into existing session");
                return then(&Registration {
                    match_id: id,
                    pairing: Some(pairing),
                });
            }
        }

        let id = MatchId::generate();
        table.insert(Session::open(id.clone(), client, Some(tier), now));
        info!(match_id = %id, %tier, "Created new session");
        then(&Registration {
            match_id: id,
            pairing: None,
        })
    }

    /// Seats `client` in the session named `match_id`, creating it if needed.
    ///
    /// Sessions created this way carry no tier and are never offered to
    /// tier-based joins. In the other direction, a tier-paired session
    /// cannot be entered by id: its open seat belongs to the next compatible
    /// [`enroll`](Self::enroll).
    pub fn join_match(&self, match_id: MatchId, client: ClientId) -> Result<Registration, JoinError> {
        self.join_match_then(match_id, client, Registration::clone)
    }

    /// Like [`join_match`](Self::join_match), running `then` before the table
    /// and the session are unlocked.
    #[instrument(skip(self, then))]
    pub(crate) fn join_match_then<R>(
        &self,
        match_id: MatchId,
        client: ClientId,
        then: impl FnOnce(&Registration) -> R,
    ) -> Result<R, JoinError> {
        let now = Instant::now();
        let mut table = self.write();

        let Some(handle) = table.sessions.get(&match_id).cloned() else {
            table.insert(Session::open(match_id.clone(), client, None, now));
            info!(%match_id, "Created named session");
            return Ok(then(&Registration {
                match_id,
                pairing: None,
            }));
        };

        let mut session = lock(&handle);
        if session.has_player(client) {
            debug!(%match_id, "Client already seated");
            return Ok(then(&Registration {
                match_id,
                pairing: None,
            }));
        }
        if let Some(tier) = session.tier() {
            warn!(%match_id, %tier, "Join refused, session is tier-paired");
            return Err(JoinError::TierPaired(match_id));
        }
        match session.seat_second(client, now) {
            Some(pairing) => Ok(then(&Registration {
                match_id,
                pairing: Some(pairing),
            })),
            None => {
                warn!(%match_id, "Join refused, match is full");
                Err(JoinError::MatchFull(match_id))
            }
        }
    }

    /// Snapshot of the session under `match_id`, or `None` if unknown.
    #[instrument(skip(self))]
    pub fn get_match(&self, match_id: &MatchId) -> Option<Session> {
        let handle = self.read().sessions.get(match_id).cloned();
        match handle {
            Some(handle) => Some(lock(&handle).clone()),
            None => {
                debug!("Match not found");
                None
            }
        }
    }

    /// Restores an empty board and turn A, keeping both seat bindings.
    ///
    /// Returns the pairing when both seats are bound. Unknown ids are a
    /// no-op.
    pub fn reset_match(&self, match_id: &MatchId) -> Option<Pairing> {
        self.reset_match_then(match_id, |pairing| pairing).flatten()
    }

    /// Like [`reset_match`](Self::reset_match), handing the pairing to `then`
    /// before the session is unlocked. `None` when the id is unknown.
    #[instrument(skip(self, then))]
    pub(crate) fn reset_match_then<R>(&self, match_id: &MatchId, then: impl FnOnce(Option<Pairing>) -> R) -> Option<R> {
        let now = Instant::now();
        self.with_session(match_id, |session| {
            session.reset(now);
            then(session.pairing())
        })
    }

    /// Runs `f` inside the session's critical section.
    ///
    /// Returns `None` without calling `f` when the id is unknown.
    pub(crate) fn with_session<R>(&self, match_id: &MatchId, f: impl FnOnce(&mut Session) -> R) -> Option<R> {
        self.with_session_or(match_id, |session| session.map(f))
    }

    /// Runs `f` inside the session's critical section, or with `None` when
    /// the id is unknown.
    pub(crate) fn with_session_or<R>(&self, match_id: &MatchId, f: impl FnOnce(Option<&mut Session>) -> R) -> R {
        let handle = self.read().sessions.get(match_id).cloned();
        match handle {
            Some(handle) => f(Some(&mut *lock(&handle))),
            None => f(None),
        }
    }

    /// Match ids in insertion order.
    pub fn match_ids(&self) -> Vec<MatchId> {
        self.read().order.clone()
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        self.read().order.len()
    }

    /// Whether the registry holds no sessions.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes sessions idle past the expiry policy and returns their ids.
    #[instrument(skip(self, now))]
    pub fn expire(&self, now: Instant) -> Vec<MatchId> {
        let mut table = self.write();
        let expired: Vec<MatchId> = table
            .handles()
            .filter(|(_, handle)| self.policy.is_expired(&lock(handle), now))
            .map(|(id, _)| id.clone())
            .collect();
        table.remove_all(&expired);
        if !expired.is_empty() {
            info!(count = expired.len(), "Expired idle sessions");
        }
        expired
    }

    /// Drops open sessions whose only player is `client`.
    ///
    /// In-progress and finished sessions are kept; the departed player
    /// simply stops moving.
    #[instrument(skip(self))]
    pub fn release_client(&self, client: ClientId) -> Vec<MatchId> {
        let mut table = self.write();
        let mut released = Vec::new();
        for (id, handle) in table.handles() {
            let session = lock(handle);
            if !session.has_player(client) {
                continue;
            }
            if session.is_open() {
                released.push(id.clone());
            } else {
                info!(match_id = %id, phase = ?session.phase(), "Seated client left, keeping session");
            }
        }
        table.remove_all(&released);
        if !released.is_empty() {
            info!(count = released.len(), "Released waiting sessions");
        }
        released
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(id: u64) -> ClientId {
        ClientId::from(id)
    }

    #[test]
    fn test_first_join_opens_session() {
        let registry = MatchRegistry::new();
        let registration = registry.enroll(client(1), 20);
        assert_eq!(registration.pairing, None);

        let session = registry.get_match(&registration.match_id).unwrap();
        assert_eq!(session.phase(), &Phase::AwaitingPlayers);
        assert_eq!(session.player_a(), &Some(client(1)));
        assert_eq!(session.tier(), &Some(Tier::Low));
    }

    #[test]
    fn test_same_tier_pairs() {
        let registry = MatchRegistry::new();
        let first = registry.register_player(client(1), 20);
        let registration = registry.enroll(client(2), 25);

        assert_eq!(registration.match_id, first);
        assert_eq!(registration.pairing, Some(Pairing::new(client(1), client(2))));
        assert_eq!(registry.get_match(&first).unwrap().phase(), &Phase::InProgress);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_different_tiers_do_not_pair() {
        let registry = MatchRegistry::new();
        let low = registry.register_player(client(1), 30);
        let mid = registry.register_player(client(2), 31);
        assert_ne!(low, mid);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_pairing_picks_matching_bucket() {
        let registry = MatchRegistry::new();
        let low = registry.register_player(client(1), 25);
        let mid = registry.register_player(client(2), 45);
        let high = registry.register_player(client(3), 70);

        let joined = registry.enroll(client(4), 50);
        assert_eq!(joined.match_id, mid);
        assert!(registry.get_match(&low).unwrap().is_open());
        assert!(registry.get_match(&high).unwrap().is_open());
    }

    #[test]
    fn test_full_sessions_are_skipped() {
        let registry = MatchRegistry::new();
        let full = registry.register_player(client(1), 70);
        registry.register_player(client(2), 80);
        let open = registry.register_player(client(3), 90);
        assert_ne!(open, full);

        let joined = registry.enroll(client(4), 65);
        assert_eq!(joined.match_id, open);
        assert_eq!(joined.pairing, Some(Pairing::new(client(3), client(4))));
    }

    #[test]
    fn test_waiting_client_is_not_paired_with_itself() {
        let registry = MatchRegistry::new();
        let first = registry.register_player(client(1), 50);
        let again = registry.enroll(client(1), 50);
        assert_eq!(again.match_id, first);
        assert_eq!(again.pairing, None);
        assert!(registry.get_match(&first).unwrap().is_open());
    }

    #[test]
    fn test_join_named_match() {
        let registry = MatchRegistry::new();
        let id = MatchId::from("lobby-1");

        let created = registry.join_match(id.clone(), client(1)).unwrap();
        assert_eq!(created.pairing, None);
        let joined = registry.join_match(id.clone(), client(2)).unwrap();
        assert_eq!(joined.pairing, Some(Pairing::new(client(1), client(2))));

        let full = registry.join_match(id.clone(), client(3));
        assert_eq!(full, Err(JoinError::MatchFull(id.clone())));

        let rejoin = registry.join_match(id.clone(), client(2)).unwrap();
        assert_eq!(rejoin.pairing, None);
    }

    #[test]
    fn test_named_sessions_skip_tier_pairing() {
        let registry = MatchRegistry::new();
        let named = MatchId::from("private");
        registry.join_match(named.clone(), client(1)).unwrap();

        let tiered = registry.register_player(client(2), 10);
        assert_ne!(tiered, named);
    }

    #[test]
    fn test_tiered_session_refuses_join_by_id() {
        let registry = MatchRegistry::new();
        let tiered = registry.register_player(client(1), 10);

        let refused = registry.join_match(tiered.clone(), client(2));
        assert_eq!(refused, Err(JoinError::TierPaired(tiered.clone())));
        assert!(registry.get_match(&tiered).unwrap().is_open());

        // The seat is still there for a compatible tier join.
        let paired = registry.enroll(client(3), 25);
        assert_eq!(paired.match_id, tiered);
        assert_eq!(paired.pairing, Some(Pairing::new(client(1), client(3))));

        // The creator asking again by id is answered, not refused.
        let rejoin = registry.join_match(tiered.clone(), client(1)).unwrap();
        assert_eq!(rejoin.pairing, None);
    }

    #[test]
    fn test_unknown_match_lookups() {
        let registry = MatchRegistry::new();
        let missing = MatchId::from("missing");
        assert!(registry.get_match(&missing).is_none());
        assert_eq!(registry.reset_match(&missing), None);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_expire_respects_phase_limits() {
        let registry = MatchRegistry::with_policy(ExpiryPolicy {
            awaiting_ttl: Some(Duration::from_secs(10)),
            finished_ttl: None,
        });
        let waiting = registry.register_player(client(1), 10);
        let playing = registry.register_player(client(2), 90);
        registry.register_player(client(3), 90);

        assert!(registry.expire(Instant::now()).is_empty());

        let later = Instant::now() + Duration::from_secs(11);
        assert_eq!(registry.expire(later), vec![waiting.clone()]);
        assert!(registry.get_match(&waiting).is_none());
        assert!(registry.get_match(&playing).is_some());
    }

    #[test]
    fn test_default_policy_never_expires() {
        let registry = MatchRegistry::new();
        registry.register_player(client(1), 10);
        let much_later = Instant::now() + Duration::from_secs(86_400);
        assert!(registry.expire(much_later).is_empty());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_release_client_drops_only_open_sessions() {
        let registry = MatchRegistry::new();
        let waiting = registry.register_player(client(1), 10);
        let playing = registry.register_player(client(2), 50);
        registry.register_player(client(3), 50);

        assert_eq!(registry.release_client(client(1)), vec![waiting.clone()]);
        assert!(registry.release_client(client(2)).is_empty());
        assert!(registry.get_match(&waiting).is_none());
        assert!(registry.get_match(&playing).is_some());

        // The slot is gone, so the next low player opens a fresh session.
        let fresh = registry.register_player(client(4), 10);
        assert_ne!(fresh, waiting);
    }

    #[test]
    fn test_match_ids_in_insertion_order() {
        let registry = MatchRegistry::new();
        let a = registry.register_player(client(1), 10);
        let b = registry.register_player(client(2), 50);
        let c = registry.register_player(client(3), 90);
        assert_eq!(registry.match_ids(), vec![a, b, c]);
    }
}
