//! The coordinator actor: one task that owns every session.
//!
//! Connection handlers (and expiry timers) talk to it through an mpsc
//! channel; it processes each command to completion before taking the
//! next, so handlers for the same session can never interleave. That
//! single-owner discipline is what makes the move log's sequence
//! numbers airtight without a lock in sight.
//!
//! The [`CoordinatorHandle`] is the cheap, clonable sender half.

use std::collections::HashSet;
use std::sync::Arc;

use matchwire_expiry::ExpiryHandle;
use matchwire_protocol::{
    BoardConfig, MoveRecord, Outcome, PlayerId, ServerEvent, SessionId,
};
use matchwire_registry::{ConnectionRegistry, EventSender};
use matchwire_transport::ConnectionId;
use rand::Rng;
use serde_json::Value;
use tokio::sync::{mpsc, oneshot};

use crate::{
    AcceptOutcome, CoordinatorConfig, CoordinatorError, GameRecord,
    RecordStatus, RecordStore, RecordUpdate, Session, SessionState,
    SessionStore,
};

/// Reply channel carried by request-style commands.
type Reply<T> = oneshot::Sender<Result<T, CoordinatorError>>;

/// Commands sent to the coordinator through its channel.
pub(crate) enum Command {
    /// Bind a connection to a verified identity.
    Bind {
        conn: ConnectionId,
        player: PlayerId,
        sender: EventSender,
    },

    /// Drop a connection's binding (disconnect). Session state is
    /// untouched — recovery handles the rest.
    Unbind { conn: ConnectionId },

    /// Create a session and send invitations.
    CreateGame {
        conn: ConnectionId,
        creator: PlayerId,
        participants: Vec<PlayerId>,
        config: BoardConfig,
        invitees: Vec<PlayerId>,
        reply: Reply<SessionId>,
    },

    /// An invitee accepts.
    Accept {
        conn: ConnectionId,
        player: PlayerId,
        session_id: SessionId,
        reply: Reply<()>,
    },

    /// An invitee declines; the session is cancelled.
    Decline {
        player: PlayerId,
        session_id: SessionId,
        reply: Reply<()>,
    },

    /// The creator withdraws the invitation.
    Revoke {
        player: PlayerId,
        session_id: SessionId,
        reply: Reply<()>,
    },

    /// The creator starts a ready session.
    Start {
        conn: ConnectionId,
        player: PlayerId,
        session_id: SessionId,
        setup: Value,
        reply: Reply<()>,
    },

    /// Log and relay a move.
    SubmitMove {
        conn: ConnectionId,
        player: PlayerId,
        session_id: SessionId,
        payload: Value,
        reply: Reply<u64>,
    },

    /// Re-subscribe a (re)connected client to a session's room.
    JoinRoom {
        conn: ConnectionId,
        session_id: SessionId,
        reply: Reply<()>,
    },

    /// Fetch the move-log tail for recovery. The reply goes only to
    /// the requesting handler — never broadcast.
    MissingMoves {
        session_id: SessionId,
        since: i64,
        reply: Reply<Vec<MoveRecord>>,
    },

    /// End a game with an outcome.
    End {
        conn: ConnectionId,
        player: PlayerId,
        session_id: SessionId,
        outcome: Outcome,
        reply: Reply<()>,
    },

    /// A session deadline elapsed. Ignored unless `epoch` still
    /// matches the session's current epoch.
    ExpiryFired { session_id: SessionId, epoch: u64 },
}

// ---------------------------------------------------------------------------
// Handle
// ---------------------------------------------------------------------------

/// Handle to the running coordinator. Cheap to clone — one per
/// connection handler.
#[derive(Clone)]
pub struct CoordinatorHandle {
    tx: mpsc::UnboundedSender<Command>,
}

impl CoordinatorHandle {
    /// Binds a connection to its verified identity. Queued in order
    /// with the operations that follow it, so a client may fire
    /// requests immediately after registering.
    pub fn bind(
        &self,
        conn: ConnectionId,
        player: PlayerId,
        sender: EventSender,
    ) -> Result<(), CoordinatorError> {
        self.tx
            .send(Command::Bind {
                conn,
                player,
                sender,
            })
            .map_err(|_| CoordinatorError::Unavailable)
    }

    /// Removes a connection's binding on disconnect.
    pub fn unbind(&self, conn: ConnectionId) -> Result<(), CoordinatorError> {
        self.tx
            .send(Command::Unbind { conn })
            .map_err(|_| CoordinatorError::Unavailable)
    }

    /// Creates a game, invites players, returns the new session id.
    pub async fn create_game(
        &self,
        conn: ConnectionId,
        creator: PlayerId,
        participants: Vec<PlayerId>,
        config: BoardConfig,
        invitees: Vec<PlayerId>,
    ) -> Result<SessionId, CoordinatorError> {
        self.request(|reply| Command::CreateGame {
            conn,
            creator,
            participants,
            config,
            invitees,
            reply,
        })
        .await
    }

    /// Accepts an invitation and joins the session's room.
    pub async fn accept(
        &self,
        conn: ConnectionId,
        player: PlayerId,
        session_id: SessionId,
    ) -> Result<(), CoordinatorError> {
        self.request(|reply| Command::Accept {
            conn,
            player,
            session_id,
            reply,
        })
        .await
    }

    /// Declines an invitation, cancelling the session.
    pub async fn decline(
        &self,
        player: PlayerId,
        session_id: SessionId,
    ) -> Result<(), CoordinatorError> {
        self.request(|reply| Command::Decline {
            player,
            session_id,
            reply,
        })
        .await
    }

    /// Withdraws an invitation (creator only).
    pub async fn revoke(
        &self,
        player: PlayerId,
        session_id: SessionId,
    ) -> Result<(), CoordinatorError> {
        self.request(|reply| Command::Revoke {
            player,
            session_id,
            reply,
        })
        .await
    }

    /// Starts a ready session and broadcasts the setup.
    pub async fn start(
        &self,
        conn: ConnectionId,
        player: PlayerId,
        session_id: SessionId,
        setup: Value,
    ) -> Result<(), CoordinatorError> {
        self.request(|reply| Command::Start {
            conn,
            player,
            session_id,
            setup,
            reply,
        })
        .await
    }

    /// Submits a move; returns its assigned sequence number.
    pub async fn submit_move(
        &self,
        conn: ConnectionId,
        player: PlayerId,
        session_id: SessionId,
        payload: Value,
    ) -> Result<u64, CoordinatorError> {
        self.request(|reply| Command::SubmitMove {
            conn,
            player,
            session_id,
            payload,
            reply,
        })
        .await
    }

    /// Re-joins a session's room (reconnection).
    pub async fn join_room(
        &self,
        conn: ConnectionId,
        session_id: SessionId,
    ) -> Result<(), CoordinatorError> {
        self.request(|reply| Command::JoinRoom {
            conn,
            session_id,
            reply,
        })
        .await
    }

    /// Returns the move-log tail with `seq > since`.
    pub async fn missing_moves(
        &self,
        session_id: SessionId,
        since: i64,
    ) -> Result<Vec<MoveRecord>, CoordinatorError> {
        self.request(|reply| Command::MissingMoves {
            session_id,
            since,
            reply,
        })
        .await
    }

    /// Ends a game with the given outcome.
    pub async fn end(
        &self,
        conn: ConnectionId,
        player: PlayerId,
        session_id: SessionId,
        outcome: Outcome,
    ) -> Result<(), CoordinatorError> {
        self.request(|reply| Command::End {
            conn,
            player,
            session_id,
            outcome,
            reply,
        })
        .await
    }

    async fn request<T>(
        &self,
        make: impl FnOnce(Reply<T>) -> Command,
    ) -> Result<T, CoordinatorError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(make(reply_tx))
            .map_err(|_| CoordinatorError::Unavailable)?;
        reply_rx.await.map_err(|_| CoordinatorError::Unavailable)?
    }
}

// ---------------------------------------------------------------------------
// Coordinator
// ---------------------------------------------------------------------------

/// The coordinator actor. Owns the session store and connection
/// registry; runs until every handle (and pending timer) is gone.
pub struct Coordinator<R: RecordStore> {
    store: SessionStore,
    registry: ConnectionRegistry,
    records: Arc<R>,
    config: CoordinatorConfig,
    /// Kept for expiry timers to send their fires back in.
    tx: mpsc::UnboundedSender<Command>,
    rx: mpsc::UnboundedReceiver<Command>,
}

impl<R: RecordStore> Coordinator<R> {
    /// Spawns the coordinator task and returns a handle to it.
    pub fn spawn(records: R, config: CoordinatorConfig) -> CoordinatorHandle {
        let (tx, rx) = mpsc::unbounded_channel();
        let coordinator = Self {
            store: SessionStore::new(),
            registry: ConnectionRegistry::new(),
            records: Arc::new(records),
            config,
            tx: tx.clone(),
            rx,
        };
        tokio::spawn(coordinator.run());
        CoordinatorHandle { tx }
    }

    async fn run(mut self) {
        tracing::info!("coordinator started");
        while let Some(cmd) = self.rx.recv().await {
            self.handle(cmd);
        }
        tracing::info!("coordinator stopped");
    }

    /// Dispatches one command. Synchronous on purpose: a command runs
    /// to completion before the next is taken, and in particular move
    /// sequence assignment never straddles a suspension point.
    fn handle(&mut self, cmd: Command) {
        match cmd {
            Command::Bind {
                conn,
                player,
                sender,
            } => self.registry.bind(conn, player, sender),
            Command::Unbind { conn } => {
                self.registry.unbind(conn);
            }
            Command::CreateGame {
                conn,
                creator,
                participants,
                config,
                invitees,
                reply,
            } => {
                let _ = reply.send(self.handle_create(
                    conn,
                    creator,
                    participants,
                    config,
                    invitees,
                ));
            }
            Command::Accept {
                conn,
                player,
                session_id,
                reply,
            } => {
                let _ =
                    reply.send(self.handle_accept(conn, player, session_id));
            }
            Command::Decline {
                player,
                session_id,
                reply,
            } => {
                let _ = reply.send(self.handle_decline(player, session_id));
            }
            Command::Revoke {
                player,
                session_id,
                reply,
            } => {
                let _ = reply.send(self.handle_revoke(player, session_id));
            }
            Command::Start {
                conn,
                player,
                session_id,
                setup,
                reply,
            } => {
                let _ = reply.send(
                    self.handle_start(conn, player, session_id, setup),
                );
            }
            Command::SubmitMove {
                conn,
                player,
                session_id,
                payload,
                reply,
            } => {
                let _ = reply.send(
                    self.handle_move(conn, player, session_id, payload),
                );
            }
            Command::JoinRoom {
                conn,
                session_id,
                reply,
            } => {
                let _ = reply.send(self.handle_join_room(conn, session_id));
            }
            Command::MissingMoves {
                session_id,
                since,
                reply,
            } => {
                let _ =
                    reply.send(self.handle_missing_moves(session_id, since));
            }
            Command::End {
                conn,
                player,
                session_id,
                outcome,
                reply,
            } => {
                let _ = reply.send(
                    self.handle_end(conn, player, session_id, outcome),
                );
            }
            Command::ExpiryFired { session_id, epoch } => {
                self.handle_expiry(session_id, epoch);
            }
        }
    }

    // -- Invitation protocol ----------------------------------------------

    fn handle_create(
        &mut self,
        conn: ConnectionId,
        creator: PlayerId,
        participants: Vec<PlayerId>,
        config: BoardConfig,
        invitees: Vec<PlayerId>,
    ) -> Result<SessionId, CoordinatorError> {
        validate_invitation(&creator, &participants, &config, &invitees)
            .map_err(CoordinatorError::InvalidInvitation)?;

        let session_id = mint_session_id();
        let session = Session::new(
            session_id.clone(),
            creator.clone(),
            participants.clone(),
            invitees.clone(),
            config.clone(),
        );
        self.store.create(session)?;

        // The creator is a room member from the start; invitees join as
        // they accept.
        self.registry.join_room(conn, &session_id);

        // Invitees are not room members yet, so each is notified
        // individually by identity.
        let invitation = ServerEvent::Invitation {
            session_id: session_id.clone(),
            from: creator.clone(),
            config: config.clone(),
            participants: participants.clone(),
        };
        for invitee in &invitees {
            let delivered =
                self.registry.send_to_player(invitee, &invitation);
            if delivered == 0 {
                tracing::debug!(
                    %invitee, %session_id,
                    "invitee offline, invitation not delivered live"
                );
            }
        }

        self.arm_expiry(&session_id);
        self.spawn_create_record(GameRecord {
            session_id: session_id.clone(),
            creator: creator.clone(),
            participants,
            config,
            status: RecordStatus::Forming,
            winner: None,
        });

        tracing::info!(
            %session_id, %creator, invitees = invitees.len(),
            "session created"
        );
        Ok(session_id)
    }

    fn handle_accept(
        &mut self,
        conn: ConnectionId,
        player: PlayerId,
        session_id: SessionId,
    ) -> Result<(), CoordinatorError> {
        let outcome = self.store.get_mut(&session_id)?.accept(&player)?;

        // Joining the room is deliberately idempotent: a duplicate
        // accept from a reconnected client re-subscribes its new
        // connection.
        self.registry.join_room(conn, &session_id);

        if outcome == AcceptOutcome::NowReady {
            self.arm_expiry(&session_id);
            self.registry.broadcast_to_room(
                &session_id,
                &ServerEvent::Ready {
                    session_id: session_id.clone(),
                },
                None,
            );
            tracing::info!(%session_id, "all invitations accepted, session ready");
        } else {
            tracing::debug!(%session_id, %player, ?outcome, "invitation accepted");
        }
        Ok(())
    }

    fn handle_decline(
        &mut self,
        player: PlayerId,
        session_id: SessionId,
    ) -> Result<(), CoordinatorError> {
        self.store.get_mut(&session_id)?.decline(&player)?;
        tracing::info!(%session_id, %player, "invitation declined, cancelling session");
        self.cancel_session(
            &session_id,
            ServerEvent::GameDeclined {
                session_id: session_id.clone(),
                by: player,
            },
        );
        Ok(())
    }

    fn handle_revoke(
        &mut self,
        player: PlayerId,
        session_id: SessionId,
    ) -> Result<(), CoordinatorError> {
        self.store.get(&session_id)?.revoke(&player)?;
        tracing::info!(%session_id, "invitation revoked by creator");
        self.cancel_session(
            &session_id,
            ServerEvent::InvitationRevoked {
                session_id: session_id.clone(),
                by: player,
            },
        );
        Ok(())
    }

    fn handle_start(
        &mut self,
        conn: ConnectionId,
        player: PlayerId,
        session_id: SessionId,
        setup: Value,
    ) -> Result<(), CoordinatorError> {
        self.store.get_mut(&session_id)?.start(&player)?;
        self.arm_expiry(&session_id);

        // The initiator already has the setup locally.
        self.registry.broadcast_to_room(
            &session_id,
            &ServerEvent::SetGame {
                session_id: session_id.clone(),
                setup,
            },
            Some(conn),
        );
        self.spawn_update_record(
            session_id.clone(),
            RecordUpdate {
                status: RecordStatus::Playing,
                winner: None,
            },
        );
        tracing::info!(%session_id, "game started");
        Ok(())
    }

    // -- Move relay & recovery --------------------------------------------

    fn handle_move(
        &mut self,
        conn: ConnectionId,
        player: PlayerId,
        session_id: SessionId,
        payload: Value,
    ) -> Result<u64, CoordinatorError> {
        let seq = self
            .store
            .get_mut(&session_id)?
            .append_move(player, payload.clone())?;

        // The submitter's own connection is excluded — its client
        // already holds the authoritative local state for this move.
        self.registry.broadcast_to_room(
            &session_id,
            &ServerEvent::Move {
                session_id: session_id.clone(),
                seq,
                payload,
            },
            Some(conn),
        );
        Ok(seq)
    }

    fn handle_join_room(
        &mut self,
        conn: ConnectionId,
        session_id: SessionId,
    ) -> Result<(), CoordinatorError> {
        self.store.get(&session_id)?;
        self.registry.join_room(conn, &session_id);
        Ok(())
    }

    fn handle_missing_moves(
        &self,
        session_id: SessionId,
        since: i64,
    ) -> Result<Vec<MoveRecord>, CoordinatorError> {
        Ok(self.store.get(&session_id)?.moves_after(since).to_vec())
    }

    fn handle_end(
        &mut self,
        conn: ConnectionId,
        player: PlayerId,
        session_id: SessionId,
        outcome: Outcome,
    ) -> Result<(), CoordinatorError> {
        self.store.get_mut(&session_id)?.end()?;

        // Re-arm as the short ended-linger; the reaper deletes after.
        self.arm_expiry(&session_id);

        self.registry.broadcast_to_room(
            &session_id,
            &ServerEvent::GameEnded {
                session_id: session_id.clone(),
                outcome: outcome.clone(),
            },
            Some(conn),
        );
        self.spawn_update_record(
            session_id.clone(),
            RecordUpdate {
                status: RecordStatus::Finished,
                winner: outcome.winner().cloned(),
            },
        );
        tracing::info!(%session_id, %player, "game ended");
        Ok(())
    }

    // -- Reaper -----------------------------------------------------------

    /// Arms the session's single pending deadline for the state it is
    /// currently in, invalidating whatever was armed before.
    fn arm_expiry(&mut self, session_id: &SessionId) {
        let Ok(session) = self.store.get_mut(session_id) else {
            return;
        };
        let after = match session.state() {
            SessionState::Forming | SessionState::Ready => {
                self.config.forming_timeout
            }
            SessionState::Playing => self.config.playing_timeout,
            SessionState::Ended => self.config.ended_linger,
        };
        let epoch = session.bump_epoch();
        let tx = self.tx.clone();
        let id = session_id.clone();
        session.arm(ExpiryHandle::schedule(epoch, after, move || {
            let _ = tx.send(Command::ExpiryFired {
                session_id: id,
                epoch,
            });
        }));
    }

    fn handle_expiry(&mut self, session_id: SessionId, epoch: u64) {
        let (state, creator) = match self.store.get(&session_id) {
            Ok(session) if session.epoch() == epoch => {
                (session.state(), session.creator().clone())
            }
            // Stale fire: a transition already re-armed (and thereby
            // superseded) this deadline, or the session is gone.
            _ => return,
        };

        match state {
            SessionState::Forming | SessionState::Ready => {
                tracing::info!(
                    %session_id, %state,
                    "invitation abandoned, reaping session"
                );
                self.cancel_session(
                    &session_id,
                    ServerEvent::InvitationRevoked {
                        session_id: session_id.clone(),
                        by: creator,
                    },
                );
            }
            SessionState::Playing => {
                tracing::info!(%session_id, "game abandoned, reaping session");
                self.registry.broadcast_to_room(
                    &session_id,
                    &ServerEvent::GameEnded {
                        session_id: session_id.clone(),
                        outcome: Outcome::Abandoned,
                    },
                    None,
                );
                self.store.delete(&session_id);
                self.registry.drop_room(&session_id);
                self.spawn_update_record(
                    session_id,
                    RecordUpdate {
                        status: RecordStatus::Finished,
                        winner: None,
                    },
                );
            }
            SessionState::Ended => {
                tracing::debug!(%session_id, "ended session linger elapsed");
                self.store.delete(&session_id);
                self.registry.drop_room(&session_id);
            }
        }
    }

    /// Shared teardown for decline, revoke, and forming-timeout:
    /// announce to whoever is in the room, then remove every trace.
    fn cancel_session(&mut self, session_id: &SessionId, announce: ServerEvent) {
        self.registry.broadcast_to_room(session_id, &announce, None);
        // Deleting drops the session's expiry handle, aborting any
        // pending deadline.
        self.store.delete(session_id);
        self.registry.drop_room(session_id);
        self.spawn_delete_record(session_id.clone());
    }

    // -- Record store (fire-and-forget) -----------------------------------

    fn spawn_create_record(&self, record: GameRecord) {
        let records = Arc::clone(&self.records);
        tokio::spawn(async move {
            if let Err(e) = records.create_record(record).await {
                tracing::warn!(error = %e, "record create failed");
            }
        });
    }

    fn spawn_update_record(&self, session_id: SessionId, update: RecordUpdate) {
        let records = Arc::clone(&self.records);
        tokio::spawn(async move {
            if let Err(e) =
                records.update_record(&session_id, update).await
            {
                tracing::warn!(%session_id, error = %e, "record update failed");
            }
        });
    }

    fn spawn_delete_record(&self, session_id: SessionId) {
        let records = Arc::clone(&self.records);
        tokio::spawn(async move {
            if let Err(e) = records.delete_record(&session_id).await {
                tracing::warn!(%session_id, error = %e, "record delete failed");
            }
        });
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Validates a create-game request.
///
/// The roster rules: the creator is a listed participant, nobody is
/// listed twice, every invitee is a participant other than the creator,
/// and the declared player count matches the roster exactly.
fn validate_invitation(
    creator: &PlayerId,
    participants: &[PlayerId],
    config: &BoardConfig,
    invitees: &[PlayerId],
) -> Result<(), String> {
    config.validate()?;
    if config.num_players != participants.len() {
        return Err(format!(
            "config declares {} players but {} were listed",
            config.num_players,
            participants.len()
        ));
    }
    if !participants.contains(creator) {
        return Err("participants must include the creator".into());
    }
    let mut seen = HashSet::new();
    for participant in participants {
        if !seen.insert(participant) {
            return Err(format!("duplicate participant {participant}"));
        }
    }
    if invitees.is_empty() {
        return Err("at least one invitee is required".into());
    }
    if invitees.contains(creator) {
        return Err("the creator cannot invite themselves".into());
    }
    let mut seen = HashSet::new();
    for invitee in invitees {
        if !seen.insert(invitee) {
            return Err(format!("duplicate invitee {invitee}"));
        }
        if !participants.contains(invitee) {
            return Err(format!(
                "invitee {invitee} is not a listed participant"
            ));
        }
    }
    Ok(())
}

/// Mints a random session id: 32 hex chars, 128 bits.
fn mint_session_id() -> SessionId {
    let mut rng = rand::rng();
    let bytes: [u8; 16] = rng.random();
    SessionId::new(
        bytes
            .iter()
            .map(|b| format!("{b:02x}"))
            .collect::<String>(),
    )
}

#[cfg(test)]
mod tests {
    use matchwire_protocol::Density;

    use super::*;

    fn pid(id: &str) -> PlayerId {
        PlayerId::new(id)
    }

    fn config(num_players: usize) -> BoardConfig {
        BoardConfig {
            num_players,
            size: 6,
            density: Density::Medium,
        }
    }

    fn roster(names: &[&str]) -> Vec<PlayerId> {
        names.iter().map(|n| pid(n)).collect()
    }

    #[test]
    fn test_validate_accepts_well_formed_request() {
        let result = validate_invitation(
            &pid("alice"),
            &roster(&["alice", "bob", "carol"]),
            &config(3),
            &roster(&["bob", "carol"]),
        );
        assert!(result.is_ok());
    }

    #[test]
    fn test_validate_rejects_player_count_mismatch() {
        let err = validate_invitation(
            &pid("alice"),
            &roster(&["alice", "bob"]),
            &config(3),
            &roster(&["bob"]),
        )
        .unwrap_err();
        assert!(err.contains("declares 3 players"));
    }

    #[test]
    fn test_validate_rejects_creator_missing_from_roster() {
        let err = validate_invitation(
            &pid("alice"),
            &roster(&["bob", "carol"]),
            &config(2),
            &roster(&["bob"]),
        )
        .unwrap_err();
        assert!(err.contains("include the creator"));
    }

    #[test]
    fn test_validate_rejects_duplicate_participant() {
        let err = validate_invitation(
            &pid("alice"),
            &roster(&["alice", "bob", "bob"]),
            &config(3),
            &roster(&["bob"]),
        )
        .unwrap_err();
        assert!(err.contains("duplicate participant"));
    }

    #[test]
    fn test_validate_rejects_duplicate_invitee() {
        let err = validate_invitation(
            &pid("alice"),
            &roster(&["alice", "bob", "carol"]),
            &config(3),
            &roster(&["bob", "bob"]),
        )
        .unwrap_err();
        assert!(err.contains("duplicate invitee"));
    }

    #[test]
    fn test_validate_rejects_self_invitation() {
        let err = validate_invitation(
            &pid("alice"),
            &roster(&["alice", "bob"]),
            &config(2),
            &roster(&["alice"]),
        )
        .unwrap_err();
        assert!(err.contains("cannot invite themselves"));
    }

    #[test]
    fn test_validate_rejects_unlisted_invitee() {
        let err = validate_invitation(
            &pid("alice"),
            &roster(&["alice", "bob"]),
            &config(2),
            &roster(&["mallory"]),
        )
        .unwrap_err();
        assert!(err.contains("not a listed participant"));
    }

    #[test]
    fn test_validate_rejects_empty_invitees() {
        let err = validate_invitation(
            &pid("alice"),
            &roster(&["alice", "bob"]),
            &config(2),
            &[],
        )
        .unwrap_err();
        assert!(err.contains("at least one invitee"));
    }

    #[test]
    fn test_validate_rejects_bad_board_config() {
        let err = validate_invitation(
            &pid("alice"),
            &roster(&["alice", "bob"]),
            &BoardConfig {
                num_players: 2,
                size: 99,
                density: Density::Dense,
            },
            &roster(&["bob"]),
        )
        .unwrap_err();
        assert!(err.contains("size"));
    }

    #[test]
    fn test_mint_session_id_shape_and_uniqueness() {
        let a = mint_session_id();
        let b = mint_session_id();
        assert_eq!(a.as_str().len(), 32);
        assert!(a.as_str().chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }
}
