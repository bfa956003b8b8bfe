//! Per-connection handler: registration gate and event dispatch.
//!
//! Each accepted connection gets its own task running this handler,
//! plus a writer task pumping the connection's outbound event channel
//! into the socket. The flow is:
//!
//! 1. Receive `register` → verify claim → bind connection
//! 2. Loop: decode events → forward to the coordinator
//! 3. Failures come back as `error` events on this connection only
//! 4. On close: unbind (game state untouched — recovery covers the gap)

use std::sync::Arc;

use matchwire_coordinator::CoordinatorError;
use matchwire_protocol::{ClientEvent, Codec, PlayerId, ServerEvent};
use matchwire_registry::{EventSender, IdentityVerifier, RegisterClaim};
use matchwire_transport::{Connection, WebSocketConnection};
use tokio::sync::mpsc;

use crate::MatchwireError;
use crate::server::ServerState;

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<V, C>(
    conn: WebSocketConnection,
    state: Arc<ServerState<V, C>>,
) -> Result<(), MatchwireError>
where
    V: IdentityVerifier,
    C: Codec + Clone,
{
    let conn = Arc::new(conn);
    let conn_id = conn.id();
    tracing::debug!(%conn_id, "handling new connection");

    // Outbound path: everything addressed to this connection — by the
    // coordinator or by this handler — goes through one channel, and
    // the writer task serializes it onto the socket.
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerEvent>();
    let writer = {
        let conn = Arc::clone(&conn);
        let codec = state.codec.clone();
        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                let bytes = match codec.encode(&event) {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        tracing::warn!(error = %e, "failed to encode event");
                        continue;
                    }
                };
                if conn.send(&bytes).await.is_err() {
                    break;
                }
            }
        })
    };

    let mut identity: Option<PlayerId> = None;

    loop {
        let data = match conn.recv().await {
            Ok(Some(data)) => data,
            Ok(None) => {
                tracing::info!(%conn_id, "connection closed cleanly");
                break;
            }
            Err(e) => {
                tracing::debug!(%conn_id, error = %e, "recv error");
                break;
            }
        };

        let event: ClientEvent = match state.codec.decode(&data) {
            Ok(event) => event,
            Err(e) => {
                send(&tx, error_event(400, &format!("malformed event: {e}")));
                continue;
            }
        };

        match event {
            ClientEvent::Register { player_id, token } => {
                let claim = RegisterClaim { player_id, token };
                match state.verifier.verify(&claim).await {
                    Ok(player) => {
                        state
                            .coordinator
                            .bind(conn_id, player.clone(), tx.clone())?;
                        tracing::info!(%conn_id, %player, "player registered");
                        identity = Some(player.clone());
                        send(
                            &tx,
                            ServerEvent::Registered { player_id: player },
                        );
                    }
                    Err(e) => {
                        tracing::debug!(
                            %conn_id, error = %e,
                            "registration rejected"
                        );
                        send(&tx, error_event(401, &e.to_string()));
                    }
                }
            }
            event => {
                // Everything but `register` requires a bound identity.
                let Some(player) = identity.clone() else {
                    send(&tx, error_event(401, "register first"));
                    continue;
                };
                dispatch(&state, &tx, conn_id, player, event).await;
            }
        }
    }

    // Unbind drops this connection's addressability; session state is
    // untouched. If the coordinator is already gone we're shutting
    // down anyway.
    let _ = state.coordinator.unbind(conn_id);
    writer.abort();
    Ok(())
}

/// Forwards one event to the coordinator and surfaces the result to
/// this connection only.
async fn dispatch<V, C>(
    state: &Arc<ServerState<V, C>>,
    tx: &EventSender,
    conn_id: matchwire_transport::ConnectionId,
    player: PlayerId,
    event: ClientEvent,
) where
    V: IdentityVerifier,
    C: Codec + Clone,
{
    let coordinator = &state.coordinator;

    let result: Result<Option<ServerEvent>, CoordinatorError> = match event
    {
        ClientEvent::CreateGame {
            participants,
            config,
            invitees,
        } => coordinator
            .create_game(conn_id, player, participants, config, invitees)
            .await
            .map(|session_id| {
                Some(ServerEvent::GameCreated { session_id })
            }),

        ClientEvent::Accept { session_id } => coordinator
            .accept(conn_id, player, session_id)
            .await
            .map(|()| None),

        ClientEvent::Decline { session_id } => {
            coordinator.decline(player, session_id).await.map(|()| None)
        }

        ClientEvent::Revoke { session_id } => {
            coordinator.revoke(player, session_id).await.map(|()| None)
        }

        ClientEvent::Start { session_id, setup } => coordinator
            .start(conn_id, player, session_id, setup)
            .await
            .map(|()| None),

        ClientEvent::Move {
            session_id,
            payload,
        } => coordinator
            .submit_move(conn_id, player, session_id, payload)
            .await
            .map(|_seq| None),

        ClientEvent::JoinRoom { session_id } => coordinator
            .join_room(conn_id, session_id)
            .await
            .map(|()| None),

        ClientEvent::RequestMissingMoves { session_id, since } => {
            coordinator
                .missing_moves(session_id.clone(), since)
                .await
                .map(|moves| {
                    Some(ServerEvent::MissingMoves { session_id, moves })
                })
        }

        ClientEvent::End {
            session_id,
            outcome,
        } => coordinator
            .end(conn_id, player, session_id, outcome)
            .await
            .map(|()| None),

        ClientEvent::Register { .. } => {
            // Handled by the caller; re-registration lands there too.
            return;
        }
    };

    match result {
        Ok(Some(event)) => send(tx, event),
        Ok(None) => {}
        Err(e) => send(tx, error_event(error_code(&e), &e.to_string())),
    }
}

/// Pushes an event onto this connection's outbound channel. A closed
/// channel means the writer is gone and the connection is tearing down;
/// nothing left to do.
fn send(tx: &EventSender, event: ServerEvent) {
    let _ = tx.send(event);
}

fn error_event(code: u16, message: &str) -> ServerEvent {
    ServerEvent::Error {
        code,
        message: message.to_string(),
    }
}

/// HTTP-flavored codes for the structured failure event.
fn error_code(e: &CoordinatorError) -> u16 {
    match e {
        CoordinatorError::InvalidInvitation(_) => 400,
        CoordinatorError::SessionNotFound(_) => 404,
        CoordinatorError::DuplicateSession(_)
        | CoordinatorError::IllegalState { .. } => 409,
        CoordinatorError::Unavailable => 503,
    }
}
