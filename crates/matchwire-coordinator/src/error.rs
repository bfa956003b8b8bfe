//! Error types for the coordinator layer.

use matchwire_protocol::SessionId;

use crate::SessionState;

/// Errors that can occur during session coordination.
///
/// These are surfaced to the originating connection only, as `error`
/// events; they never tear down the coordinator or touch other
/// sessions. `SessionNotFound` in particular is routine: it is what a
/// stray accept or move looks like after an invitation was revoked,
/// the game ended, or the session timed out.
#[derive(Debug, thiserror::Error)]
pub enum CoordinatorError {
    /// A session with this id already exists.
    #[error("session {0} already exists")]
    DuplicateSession(SessionId),

    /// No active session with this id (revoked, ended, or expired).
    #[error("session {0} not found")]
    SessionNotFound(SessionId),

    /// The operation is not valid for the session's current state,
    /// e.g. a move before the game started.
    #[error("cannot {op} session {session} in state {state}")]
    IllegalState {
        session: SessionId,
        state: SessionState,
        op: String,
    },

    /// The create-game request was malformed.
    #[error("invalid invitation: {0}")]
    InvalidInvitation(String),

    /// The coordinator task is gone (process shutting down).
    #[error("coordinator is not running")]
    Unavailable,
}
