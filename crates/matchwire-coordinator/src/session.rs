//! Session types: one forming or running game and its state machine.

use std::collections::HashMap;
use std::fmt;
use std::time::Instant;

use matchwire_expiry::ExpiryHandle;
use matchwire_protocol::{BoardConfig, MoveRecord, PlayerId, SessionId};
use serde_json::Value;

use crate::CoordinatorError;

// ---------------------------------------------------------------------------
// SessionState
// ---------------------------------------------------------------------------

/// The lifecycle state of a session.
///
/// Transitions are strictly ordered — no skipping states:
///
/// ```text
/// Forming → Ready → Playing → Ended
/// ```
///
/// - **Forming**: invitations are out; invitees are accepting or
///   declining. A decline (or revoke, or timeout) deletes the session
///   outright — there is no partial continuation.
/// - **Ready**: every invitee accepted. Waiting for the creator's
///   `start`.
/// - **Playing**: moves are being relayed and logged. The participant
///   roster is frozen.
/// - **Ended**: outcome announced. The session lingers briefly for
///   late recovery requests, then the reaper removes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Forming,
    Ready,
    Playing,
    Ended,
}

impl SessionState {
    /// Returns `true` while invitation responses are still meaningful.
    pub fn is_forming(&self) -> bool {
        matches!(self, Self::Forming)
    }

    /// Returns `true` while moves are accepted into the log.
    pub fn is_playing(&self) -> bool {
        matches!(self, Self::Playing)
    }

    /// The next state in the strict ordering, if any.
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Forming => Some(Self::Ready),
            Self::Ready => Some(Self::Playing),
            Self::Playing => Some(Self::Ended),
            Self::Ended => None,
        }
    }

    /// Returns `true` if transitioning to `target` is valid.
    pub fn can_transition_to(self, target: Self) -> bool {
        self.next() == Some(target)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Forming => write!(f, "Forming"),
            Self::Ready => write!(f, "Ready"),
            Self::Playing => write!(f, "Playing"),
            Self::Ended => write!(f, "Ended"),
        }
    }
}

// ---------------------------------------------------------------------------
// Invitations
// ---------------------------------------------------------------------------

/// One invitee's response so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InviteStatus {
    Pending,
    Accepted,
    Declined,
}

/// What an accept did to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcceptOutcome {
    /// This accept completed the set: the session just became `Ready`.
    /// The caller announces readiness exactly once, on this value.
    NowReady,
    /// Recorded; other invitees are still pending.
    Accepted,
    /// The invitee had already accepted. Harmless (duplicate delivery,
    /// or a reconnecting client re-joining the room).
    AlreadyAccepted,
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// One multiplayer game tracked in memory, from invitation to eviction.
///
/// All mutation goes through the methods here, which enforce the state
/// machine; the coordinator never pokes fields directly.
pub struct Session {
    id: SessionId,
    state: SessionState,
    creator: PlayerId,
    /// Full ordered roster, creator included. Fixed at creation,
    /// frozen for good once the session is `Playing`.
    participants: Vec<PlayerId>,
    /// Invitee responses. Only meaningful while `Forming`; the creator
    /// is implicitly accepted and has no entry.
    invitations: HashMap<PlayerId, InviteStatus>,
    /// Append-only. `seq` values are the indices — contiguous from 0.
    move_log: Vec<MoveRecord>,
    config: BoardConfig,
    created_at: Instant,
    started_at: Option<Instant>,
    /// Bumped on every state transition; a pending expiry whose epoch
    /// no longer matches is stale and must be ignored.
    epoch: u64,
    expiry: Option<ExpiryHandle>,
}

impl Session {
    /// Creates a session in `Forming` with every invitee `Pending`.
    ///
    /// Assumes the roster was already validated (creator listed, no
    /// duplicates, invitees ⊂ participants).
    pub fn new(
        id: SessionId,
        creator: PlayerId,
        participants: Vec<PlayerId>,
        invitees: Vec<PlayerId>,
        config: BoardConfig,
    ) -> Self {
        let invitations = invitees
            .into_iter()
            .map(|invitee| (invitee, InviteStatus::Pending))
            .collect();
        Self {
            id,
            state: SessionState::Forming,
            creator,
            participants,
            invitations,
            move_log: Vec::new(),
            config,
            created_at: Instant::now(),
            started_at: None,
            epoch: 0,
            expiry: None,
        }
    }

    // -- Accessors --------------------------------------------------------

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn creator(&self) -> &PlayerId {
        &self.creator
    }

    pub fn participants(&self) -> &[PlayerId] {
        &self.participants
    }

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    pub fn created_at(&self) -> Instant {
        self.created_at
    }

    pub fn started_at(&self) -> Option<Instant> {
        self.started_at
    }

    /// Number of logged moves (also the next sequence number).
    pub fn move_count(&self) -> u64 {
        self.move_log.len() as u64
    }

    /// This invitee's response so far, or `None` for non-invitees.
    pub fn invite_status(&self, player: &PlayerId) -> Option<InviteStatus> {
        self.invitations.get(player).copied()
    }

    /// Returns `true` once every invitee has accepted.
    pub fn all_accepted(&self) -> bool {
        self.invitations
            .values()
            .all(|status| *status == InviteStatus::Accepted)
    }

    // -- Invitation protocol ----------------------------------------------

    /// Records an invitee's acceptance.
    ///
    /// The `Forming → Ready` transition is edge-triggered: it happens on
    /// the accept that completes the set, and only that call observes
    /// [`AcceptOutcome::NowReady`]. Re-delivered accepts (including ones
    /// arriving after the session is already `Ready`) are reported as
    /// [`AcceptOutcome::AlreadyAccepted`] so no caller re-announces.
    pub fn accept(
        &mut self,
        player: &PlayerId,
    ) -> Result<AcceptOutcome, CoordinatorError> {
        match self.state {
            SessionState::Forming => {}
            SessionState::Ready => {
                return match self.invitations.get(player) {
                    Some(InviteStatus::Accepted) => {
                        Ok(AcceptOutcome::AlreadyAccepted)
                    }
                    _ => Err(self.illegal("accept")),
                };
            }
            _ => return Err(self.illegal("accept")),
        }

        let status = self.invitations.get_mut(player).ok_or_else(|| {
            CoordinatorError::InvalidInvitation(format!(
                "{player} was not invited to session {}",
                self.id
            ))
        })?;

        if *status == InviteStatus::Accepted {
            return Ok(AcceptOutcome::AlreadyAccepted);
        }
        *status = InviteStatus::Accepted;

        if self.all_accepted() {
            self.state = SessionState::Ready;
            Ok(AcceptOutcome::NowReady)
        } else {
            Ok(AcceptOutcome::Accepted)
        }
    }

    /// Records an invitee's decline. The caller cancels the whole
    /// session afterwards — declined sessions do not partially continue.
    pub fn decline(
        &mut self,
        player: &PlayerId,
    ) -> Result<(), CoordinatorError> {
        if self.state != SessionState::Forming {
            return Err(self.illegal("decline"));
        }
        let status = self.invitations.get_mut(player).ok_or_else(|| {
            CoordinatorError::InvalidInvitation(format!(
                "{player} was not invited to session {}",
                self.id
            ))
        })?;
        *status = InviteStatus::Declined;
        Ok(())
    }

    /// Validates that `by` may withdraw the invitation. The caller
    /// cancels the session afterwards.
    pub fn revoke(&self, by: &PlayerId) -> Result<(), CoordinatorError> {
        if self.state != SessionState::Forming {
            return Err(self.illegal("revoke"));
        }
        if by != &self.creator {
            return Err(self.illegal("revoke (only the creator may)"));
        }
        Ok(())
    }

    /// Starts the game: `Ready → Playing`, roster frozen, clock noted.
    pub fn start(&mut self, by: &PlayerId) -> Result<(), CoordinatorError> {
        if self.state != SessionState::Ready {
            return Err(self.illegal("start"));
        }
        if by != &self.creator {
            return Err(self.illegal("start (only the creator may)"));
        }
        self.state = SessionState::Playing;
        self.started_at = Some(Instant::now());
        Ok(())
    }

    // -- Move log ---------------------------------------------------------

    /// Appends a move and returns its assigned sequence number.
    ///
    /// Assignment and append are one synchronous step — there is no
    /// suspension point between reading the length and pushing, which
    /// is what keeps sequence numbers contiguous with no duplicates.
    pub fn append_move(
        &mut self,
        by: PlayerId,
        payload: Value,
    ) -> Result<u64, CoordinatorError> {
        if self.state != SessionState::Playing {
            return Err(self.illegal("move"));
        }
        let seq = self.move_log.len() as u64;
        self.move_log.push(MoveRecord { seq, payload, by });
        Ok(seq)
    }

    /// The in-order tail of the move log with `seq > since`.
    ///
    /// `since = -1` returns everything; a caller that is already caught
    /// up gets an empty slice, not an error.
    pub fn moves_after(&self, since: i64) -> &[MoveRecord] {
        let from = since.saturating_add(1).max(0) as usize;
        &self.move_log[from.min(self.move_log.len())..]
    }

    /// Ends the game: `Playing → Ended`.
    pub fn end(&mut self) -> Result<(), CoordinatorError> {
        if self.state != SessionState::Playing {
            return Err(self.illegal("end"));
        }
        self.state = SessionState::Ended;
        Ok(())
    }

    // -- Expiry -----------------------------------------------------------

    /// The current expiry epoch. A deadline fire carrying an older
    /// epoch is stale.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Advances the epoch, invalidating any in-flight deadline fire.
    /// Called when (re)arming the session's expiry.
    pub fn bump_epoch(&mut self) -> u64 {
        self.epoch += 1;
        self.epoch
    }

    /// Installs the session's pending deadline, cancelling the previous
    /// one (the replaced handle aborts its timer on drop).
    pub fn arm(&mut self, handle: ExpiryHandle) {
        self.expiry = Some(handle);
    }

    /// Whether a deadline is currently armed.
    pub fn has_pending_expiry(&self) -> bool {
        self.expiry.is_some()
    }

    fn illegal(&self, op: &str) -> CoordinatorError {
        CoordinatorError::IllegalState {
            session: self.id.clone(),
            state: self.state,
            op: op.to_string(),
        }
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use matchwire_protocol::Density;
    use serde_json::json;

    use super::*;

    fn pid(id: &str) -> PlayerId {
        PlayerId::new(id)
    }

    fn config() -> BoardConfig {
        BoardConfig {
            num_players: 3,
            size: 6,
            density: Density::Medium,
        }
    }

    /// A session created by alice with bob and carol invited.
    fn session() -> Session {
        Session::new(
            SessionId::new("s-1"),
            pid("alice"),
            vec![pid("alice"), pid("bob"), pid("carol")],
            vec![pid("bob"), pid("carol")],
            config(),
        )
    }

    /// Drives a fresh session to `Playing`.
    fn playing_session() -> Session {
        let mut s = session();
        s.accept(&pid("bob")).unwrap();
        s.accept(&pid("carol")).unwrap();
        s.start(&pid("alice")).unwrap();
        s
    }

    // =====================================================================
    // State machine
    // =====================================================================

    #[test]
    fn test_state_next_follows_strict_order() {
        assert_eq!(SessionState::Forming.next(), Some(SessionState::Ready));
        assert_eq!(SessionState::Ready.next(), Some(SessionState::Playing));
        assert_eq!(SessionState::Playing.next(), Some(SessionState::Ended));
        assert_eq!(SessionState::Ended.next(), None);
    }

    #[test]
    fn test_state_can_transition_to() {
        assert!(
            SessionState::Forming.can_transition_to(SessionState::Ready)
        );
        assert!(
            !SessionState::Forming.can_transition_to(SessionState::Playing)
        );
        assert!(
            !SessionState::Ended.can_transition_to(SessionState::Forming)
        );
    }

    #[test]
    fn test_new_session_starts_forming_with_pending_invitees() {
        let s = session();
        assert_eq!(s.state(), SessionState::Forming);
        assert_eq!(s.invite_status(&pid("bob")), Some(InviteStatus::Pending));
        assert_eq!(
            s.invite_status(&pid("carol")),
            Some(InviteStatus::Pending)
        );
        // The creator is implicitly accepted — no entry.
        assert_eq!(s.invite_status(&pid("alice")), None);
        assert!(!s.all_accepted());
        assert!(!s.has_pending_expiry(), "coordinator arms the deadline");
    }

    // =====================================================================
    // accept()
    // =====================================================================

    #[test]
    fn test_accept_partial_stays_forming() {
        let mut s = session();
        let outcome = s.accept(&pid("bob")).unwrap();
        assert_eq!(outcome, AcceptOutcome::Accepted);
        assert_eq!(s.state(), SessionState::Forming);
    }

    #[test]
    fn test_last_accept_transitions_to_ready() {
        let mut s = session();
        s.accept(&pid("bob")).unwrap();
        let outcome = s.accept(&pid("carol")).unwrap();
        assert_eq!(outcome, AcceptOutcome::NowReady);
        assert_eq!(s.state(), SessionState::Ready);
    }

    #[test]
    fn test_duplicate_accept_is_edge_triggered() {
        // The last invitee's accept delivered twice: only the first
        // observes NowReady, so readiness is announced exactly once.
        let mut s = session();
        s.accept(&pid("bob")).unwrap();
        assert_eq!(
            s.accept(&pid("carol")).unwrap(),
            AcceptOutcome::NowReady
        );
        assert_eq!(
            s.accept(&pid("carol")).unwrap(),
            AcceptOutcome::AlreadyAccepted
        );
        assert_eq!(s.state(), SessionState::Ready);
    }

    #[test]
    fn test_duplicate_accept_before_ready() {
        let mut s = session();
        s.accept(&pid("bob")).unwrap();
        assert_eq!(
            s.accept(&pid("bob")).unwrap(),
            AcceptOutcome::AlreadyAccepted
        );
        assert_eq!(s.state(), SessionState::Forming);
    }

    #[test]
    fn test_accept_from_non_invitee_fails() {
        let mut s = session();
        let result = s.accept(&pid("mallory"));
        assert!(matches!(
            result,
            Err(CoordinatorError::InvalidInvitation(_))
        ));
    }

    #[test]
    fn test_accept_while_playing_fails() {
        let mut s = playing_session();
        let result = s.accept(&pid("bob"));
        assert!(matches!(
            result,
            Err(CoordinatorError::IllegalState { .. })
        ));
    }

    // =====================================================================
    // decline() / revoke()
    // =====================================================================

    #[test]
    fn test_decline_marks_invitee() {
        let mut s = session();
        s.decline(&pid("bob")).unwrap();
        assert_eq!(
            s.invite_status(&pid("bob")),
            Some(InviteStatus::Declined)
        );
    }

    #[test]
    fn test_decline_from_non_invitee_fails() {
        let mut s = session();
        assert!(matches!(
            s.decline(&pid("mallory")),
            Err(CoordinatorError::InvalidInvitation(_))
        ));
    }

    #[test]
    fn test_decline_after_ready_fails() {
        let mut s = session();
        s.accept(&pid("bob")).unwrap();
        s.accept(&pid("carol")).unwrap();
        assert!(matches!(
            s.decline(&pid("bob")),
            Err(CoordinatorError::IllegalState { .. })
        ));
    }

    #[test]
    fn test_revoke_by_creator_while_forming() {
        let s = session();
        assert!(s.revoke(&pid("alice")).is_ok());
    }

    #[test]
    fn test_revoke_by_non_creator_fails() {
        let s = session();
        assert!(matches!(
            s.revoke(&pid("bob")),
            Err(CoordinatorError::IllegalState { .. })
        ));
    }

    // =====================================================================
    // start()
    // =====================================================================

    #[test]
    fn test_start_from_ready_transitions_to_playing() {
        let mut s = session();
        s.accept(&pid("bob")).unwrap();
        s.accept(&pid("carol")).unwrap();

        s.start(&pid("alice")).unwrap();

        assert_eq!(s.state(), SessionState::Playing);
        assert!(s.started_at().is_some());
    }

    #[test]
    fn test_start_while_forming_fails() {
        let mut s = session();
        s.accept(&pid("bob")).unwrap();
        // carol still pending
        let result = s.start(&pid("alice"));
        assert!(matches!(
            result,
            Err(CoordinatorError::IllegalState { .. })
        ));
    }

    #[test]
    fn test_start_by_non_creator_fails() {
        let mut s = session();
        s.accept(&pid("bob")).unwrap();
        s.accept(&pid("carol")).unwrap();
        assert!(matches!(
            s.start(&pid("bob")),
            Err(CoordinatorError::IllegalState { .. })
        ));
    }

    // =====================================================================
    // Move log
    // =====================================================================

    #[test]
    fn test_append_move_assigns_contiguous_seq() {
        let mut s = playing_session();
        for expected in 0..5u64 {
            let seq = s
                .append_move(pid("alice"), json!({ "n": expected }))
                .unwrap();
            assert_eq!(seq, expected);
        }
        assert_eq!(s.move_count(), 5);
    }

    #[test]
    fn test_append_move_outside_playing_fails_and_logs_nothing() {
        let mut s = session();
        let result = s.append_move(pid("alice"), json!(1));
        assert!(matches!(
            result,
            Err(CoordinatorError::IllegalState { .. })
        ));
        assert_eq!(s.move_count(), 0);

        s.accept(&pid("bob")).unwrap();
        s.accept(&pid("carol")).unwrap();
        s.start(&pid("alice")).unwrap();
        s.end().unwrap();
        assert!(s.append_move(pid("alice"), json!(1)).is_err());
        assert_eq!(s.move_count(), 0);
    }

    #[test]
    fn test_moves_after_returns_exact_tail() {
        let mut s = playing_session();
        for n in 0..4 {
            s.append_move(pid("alice"), json!(n)).unwrap();
        }

        // since = -1 → everything.
        let all = s.moves_after(-1);
        assert_eq!(all.len(), 4);
        assert_eq!(all[0].seq, 0);

        // since = 1 → seq 2 and 3, in order.
        let tail = s.moves_after(1);
        assert_eq!(
            tail.iter().map(|m| m.seq).collect::<Vec<_>>(),
            vec![2, 3]
        );

        // Caught up (or beyond) → empty, not an error.
        assert!(s.moves_after(3).is_empty());
        assert!(s.moves_after(99).is_empty());
        assert!(s.moves_after(i64::MAX).is_empty());
    }

    #[test]
    fn test_moves_after_on_empty_log() {
        let s = playing_session();
        assert!(s.moves_after(-1).is_empty());
    }

    // =====================================================================
    // end()
    // =====================================================================

    #[test]
    fn test_end_from_playing() {
        let mut s = playing_session();
        s.end().unwrap();
        assert_eq!(s.state(), SessionState::Ended);
    }

    #[test]
    fn test_end_outside_playing_fails() {
        let mut s = session();
        assert!(matches!(
            s.end(),
            Err(CoordinatorError::IllegalState { .. })
        ));
    }

    #[test]
    fn test_moves_survive_end_for_recovery() {
        let mut s = playing_session();
        s.append_move(pid("alice"), json!(0)).unwrap();
        s.append_move(pid("bob"), json!(1)).unwrap();
        s.end().unwrap();

        assert_eq!(s.moves_after(0).len(), 1);
    }

    // =====================================================================
    // Epoch
    // =====================================================================

    #[test]
    fn test_bump_epoch_is_monotonic() {
        let mut s = session();
        assert_eq!(s.epoch(), 0);
        assert_eq!(s.bump_epoch(), 1);
        assert_eq!(s.bump_epoch(), 2);
        assert_eq!(s.epoch(), 2);
    }
}
