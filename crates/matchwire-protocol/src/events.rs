//! The event surface: every message a client or the server can send.
//!
//! Events are adjacently tagged JSON with kebab-case names:
//!
//! ```json
//! { "event": "create-game", "data": { "participants": [...], ... } }
//! ```
//!
//! Inbound ([`ClientEvent`]) and outbound ([`ServerEvent`]) mirror each
//! other: `create-game` produces `invitation`s, the final `accept`
//! produces `ready`, `move` fans out as `move`, and so on.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{BoardConfig, MoveRecord, Outcome, PlayerId, SessionId};

// ---------------------------------------------------------------------------
// Client → Server
// ---------------------------------------------------------------------------

/// Events a client sends to the lobby server.
///
/// `register` must be the first event on every connection — everything
/// else is rejected until the connection is bound to an identity. Note
/// that events after `register` carry no sender identity: the server
/// uses the connection's verified binding, so a client cannot act as
/// another player by naming them in a payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ClientEvent {
    /// Bind this connection to a durable player identity.
    /// The claim is passed to the identity collaborator for
    /// verification before the binding is made.
    Register {
        player_id: PlayerId,
        #[serde(default)]
        token: Option<String>,
    },

    /// Create a game and invite players.
    /// `participants` is the full roster including the creator;
    /// `invitees` is the roster minus the creator.
    CreateGame {
        participants: Vec<PlayerId>,
        config: BoardConfig,
        invitees: Vec<PlayerId>,
    },

    /// Accept an invitation (also joins this connection to the room).
    Accept { session_id: SessionId },

    /// Decline an invitation. Cancels the whole session.
    Decline { session_id: SessionId },

    /// Creator withdraws the invitation. Cancels the whole session.
    Revoke { session_id: SessionId },

    /// Creator starts a session in which every invitee has accepted.
    /// `setup` (board layout, player colors) is opaque and relayed
    /// verbatim to the room.
    Start { session_id: SessionId, setup: Value },

    /// Submit a move. Opaque payload; the server assigns the sequence
    /// number and relays.
    Move { session_id: SessionId, payload: Value },

    /// Re-join a session's room after reconnecting with a fresh
    /// connection. Usually followed by `request-missing-moves`.
    JoinRoom { session_id: SessionId },

    /// Ask for the tail of the move log with `seq > since`.
    /// `since = -1` requests everything.
    RequestMissingMoves { session_id: SessionId, since: i64 },

    /// End the game with the given outcome.
    End {
        session_id: SessionId,
        outcome: Outcome,
    },
}

// ---------------------------------------------------------------------------
// Server → Client
// ---------------------------------------------------------------------------

/// Events the lobby server sends to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ServerEvent {
    /// Acknowledges `register`; the connection is now addressable.
    Registered { player_id: PlayerId },

    /// Acknowledges `create-game` with the minted session id. Sent only
    /// to the creator; the invitees get `invitation`.
    GameCreated { session_id: SessionId },

    /// You have been invited to a game. Delivered to each invitee
    /// individually (invitees are not room members yet).
    Invitation {
        session_id: SessionId,
        from: PlayerId,
        config: BoardConfig,
        participants: Vec<PlayerId>,
    },

    /// Every invitee has accepted; the creator may now `start`.
    /// Emitted to the room exactly once per session.
    Ready { session_id: SessionId },

    /// An invitee declined; the session is gone.
    GameDeclined { session_id: SessionId, by: PlayerId },

    /// The creator withdrew the invitation (or it timed out); the
    /// session is gone.
    InvitationRevoked { session_id: SessionId, by: PlayerId },

    /// Initial game setup, broadcast when the game starts.
    SetGame { session_id: SessionId, setup: Value },

    /// A move was relayed. Sent to every room member except the
    /// submitter's own connection.
    Move {
        session_id: SessionId,
        seq: u64,
        payload: Value,
    },

    /// Answer to `request-missing-moves`: the in-order tail of the
    /// move log. Empty when the requester is already caught up.
    MissingMoves {
        session_id: SessionId,
        moves: Vec<MoveRecord>,
    },

    /// The game is over.
    GameEnded {
        session_id: SessionId,
        outcome: Outcome,
    },

    /// A request failed. Sent only to the originating connection;
    /// `code` follows HTTP conventions (400 bad request, 401
    /// unregistered, 404 unknown session, 409 wrong state).
    Error { code: u16, message: String },
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! The wire format is consumed by browser clients, so these tests
    //! pin the exact JSON shapes: kebab-case event names under "event",
    //! payload under "data".

    use serde_json::json;

    use super::*;
    use crate::Density;

    fn sid() -> SessionId {
        SessionId::new("s-1")
    }

    // =====================================================================
    // ClientEvent
    // =====================================================================

    #[test]
    fn test_register_json_format() {
        let event = ClientEvent::Register {
            player_id: PlayerId::new("alice"),
            token: Some("tok".into()),
        };
        let json: serde_json::Value = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "register");
        assert_eq!(json["data"]["player_id"], "alice");
        assert_eq!(json["data"]["token"], "tok");
    }

    #[test]
    fn test_register_token_defaults_to_none() {
        // Clients that have no token may omit the field entirely.
        let raw = json!({
            "event": "register",
            "data": { "player_id": "alice" }
        });
        let event: ClientEvent = serde_json::from_value(raw).unwrap();
        assert_eq!(
            event,
            ClientEvent::Register {
                player_id: PlayerId::new("alice"),
                token: None,
            }
        );
    }

    #[test]
    fn test_create_game_event_name_is_kebab_case() {
        let event = ClientEvent::CreateGame {
            participants: vec![PlayerId::new("a"), PlayerId::new("b")],
            config: BoardConfig {
                num_players: 2,
                size: 6,
                density: Density::Medium,
            },
            invitees: vec![PlayerId::new("b")],
        };
        let json: serde_json::Value = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "create-game");
        assert_eq!(json["data"]["config"]["density"], "medium");
    }

    #[test]
    fn test_request_missing_moves_round_trip() {
        let event = ClientEvent::RequestMissingMoves {
            session_id: sid(),
            since: -1,
        };
        let json: serde_json::Value = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "request-missing-moves");
        assert_eq!(json["data"]["since"], -1);

        let back: ClientEvent = serde_json::from_value(json).unwrap();
        assert_eq!(event, back);
    }

    #[test]
    fn test_client_move_payload_is_opaque() {
        // Whatever JSON the client puts in `payload` survives verbatim.
        let payload = json!({ "from": [0, 1], "to": [2, 3], "n": 4 });
        let event = ClientEvent::Move {
            session_id: sid(),
            payload: payload.clone(),
        };
        let bytes = serde_json::to_vec(&event).unwrap();
        let back: ClientEvent = serde_json::from_slice(&bytes).unwrap();
        match back {
            ClientEvent::Move { payload: p, .. } => assert_eq!(p, payload),
            other => panic!("expected Move, got {other:?}"),
        }
    }

    #[test]
    fn test_client_event_round_trips() {
        let events = vec![
            ClientEvent::Accept { session_id: sid() },
            ClientEvent::Decline { session_id: sid() },
            ClientEvent::Revoke { session_id: sid() },
            ClientEvent::JoinRoom { session_id: sid() },
            ClientEvent::Start {
                session_id: sid(),
                setup: json!({ "colors": { "alice": "red" } }),
            },
            ClientEvent::End {
                session_id: sid(),
                outcome: Outcome::Draw,
            },
        ];
        for event in events {
            let bytes = serde_json::to_vec(&event).unwrap();
            let back: ClientEvent = serde_json::from_slice(&bytes).unwrap();
            assert_eq!(event, back);
        }
    }

    // =====================================================================
    // ServerEvent
    // =====================================================================

    #[test]
    fn test_invitation_json_format() {
        let event = ServerEvent::Invitation {
            session_id: sid(),
            from: PlayerId::new("alice"),
            config: BoardConfig {
                num_players: 3,
                size: 8,
                density: Density::Dense,
            },
            participants: vec![
                PlayerId::new("alice"),
                PlayerId::new("bob"),
                PlayerId::new("carol"),
            ],
        };
        let json: serde_json::Value = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "invitation");
        assert_eq!(json["data"]["from"], "alice");
        assert_eq!(json["data"]["participants"][2], "carol");
    }

    #[test]
    fn test_outbound_event_names_are_kebab_case() {
        let cases: Vec<(ServerEvent, &str)> = vec![
            (ServerEvent::Ready { session_id: sid() }, "ready"),
            (
                ServerEvent::GameCreated { session_id: sid() },
                "game-created",
            ),
            (
                ServerEvent::GameDeclined {
                    session_id: sid(),
                    by: PlayerId::new("bob"),
                },
                "game-declined",
            ),
            (
                ServerEvent::InvitationRevoked {
                    session_id: sid(),
                    by: PlayerId::new("alice"),
                },
                "invitation-revoked",
            ),
            (
                ServerEvent::SetGame {
                    session_id: sid(),
                    setup: json!({}),
                },
                "set-game",
            ),
            (
                ServerEvent::MissingMoves {
                    session_id: sid(),
                    moves: vec![],
                },
                "missing-moves",
            ),
            (
                ServerEvent::GameEnded {
                    session_id: sid(),
                    outcome: Outcome::Abandoned,
                },
                "game-ended",
            ),
        ];
        for (event, name) in cases {
            let json: serde_json::Value =
                serde_json::to_value(&event).unwrap();
            assert_eq!(json["event"], name, "wrong tag for {event:?}");
        }
    }

    #[test]
    fn test_server_move_json_format() {
        let event = ServerEvent::Move {
            session_id: sid(),
            seq: 0,
            payload: json!(17),
        };
        let json: serde_json::Value = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "move");
        assert_eq!(json["data"]["seq"], 0);
        assert_eq!(json["data"]["payload"], 17);
    }

    #[test]
    fn test_error_event_json_format() {
        let event = ServerEvent::Error {
            code: 404,
            message: "unknown session".into(),
        };
        let json: serde_json::Value = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "error");
        assert_eq!(json["data"]["code"], 404);
    }

    // =====================================================================
    // Malformed input
    // =====================================================================

    #[test]
    fn test_decode_garbage_returns_error() {
        let garbage = b"not json at all";
        let result: Result<ClientEvent, _> =
            serde_json::from_slice(garbage);
        assert!(result.is_err());
    }

    #[test]
    fn test_decode_unknown_event_name_returns_error() {
        let unknown = r#"{"event": "teleport", "data": {}}"#;
        let result: Result<ClientEvent, _> = serde_json::from_str(unknown);
        assert!(result.is_err());
    }

    #[test]
    fn test_decode_missing_data_returns_error() {
        let missing = r#"{"event": "accept"}"#;
        let result: Result<ClientEvent, _> = serde_json::from_str(missing);
        assert!(result.is_err());
    }
}
