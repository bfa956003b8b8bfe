//! Core protocol types: identifiers, board configuration, moves, outcomes.
//!
//! Everything here travels on the wire inside an event, so all types
//! derive `Serialize`/`Deserialize` and the JSON shapes are pinned down
//! by the tests at the bottom of this file.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// Durable identity of a player, as resolved by the external identity
/// collaborator.
///
/// The coordinator treats this as opaque — it is whatever id the auth
/// system hands out (a database id, a UUID, a username). A player keeps
/// the same `PlayerId` across connections, which is what makes
/// reconnection addressing work.
///
/// `#[serde(transparent)]` makes this serialize as a plain JSON string,
/// not as `{"0": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub String);

impl PlayerId {
    /// Creates a player id from anything string-like.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Identity of one game session, stable for the session's lifetime.
///
/// Minted by the coordinator when a game is created (32 hex chars,
/// 128 bits). Same transparent-string representation as [`PlayerId`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub String);

impl SessionId {
    /// Creates a session id from anything string-like.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

// ---------------------------------------------------------------------------
// Board configuration
// ---------------------------------------------------------------------------

/// How densely populated the board is at the start of a game.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum Density {
    Sparse,
    #[default]
    Medium,
    Dense,
}

/// Board configuration submitted with a `create-game` request.
///
/// The coordinator never interprets the board itself (moves are opaque),
/// but it does validate the configuration envelope so that malformed
/// invitations are rejected before a session is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardConfig {
    /// Number of participating players, 2–6.
    pub num_players: usize,
    /// Board size (rows and columns), 4–10.
    pub size: u8,
    /// Starting density of the board.
    pub density: Density,
}

impl BoardConfig {
    /// Minimum number of players in a game.
    pub const MIN_PLAYERS: usize = 2;
    /// Maximum number of players in a game.
    pub const MAX_PLAYERS: usize = 6;
    /// Smallest supported board.
    pub const MIN_SIZE: u8 = 4;
    /// Largest supported board.
    pub const MAX_SIZE: u8 = 10;

    /// Checks that every field is inside its supported range.
    pub fn validate(&self) -> Result<(), String> {
        if self.num_players < Self::MIN_PLAYERS
            || self.num_players > Self::MAX_PLAYERS
        {
            return Err(format!(
                "num_players must be {}-{}, got {}",
                Self::MIN_PLAYERS,
                Self::MAX_PLAYERS,
                self.num_players
            ));
        }
        if self.size < Self::MIN_SIZE || self.size > Self::MAX_SIZE {
            return Err(format!(
                "size must be {}-{}, got {}",
                Self::MIN_SIZE,
                Self::MAX_SIZE,
                self.size
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Moves
// ---------------------------------------------------------------------------

/// One logged move within a session. Immutable once logged.
///
/// The payload is opaque JSON — the server assigns ordering and relays,
/// it does not interpret game rules. `seq` values within one session are
/// contiguous starting at 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveRecord {
    /// Position in the session's move log, starting at 0.
    pub seq: u64,
    /// Opaque move data, relayed verbatim.
    pub payload: serde_json::Value,
    /// Who submitted the move.
    pub by: PlayerId,
}

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// How a game ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "lowercase")]
pub enum Outcome {
    /// A player won.
    Won { winner: PlayerId },
    /// The game ended without a winner.
    Draw,
    /// The session timed out while playing (all players gone, no
    /// explicit end).
    Abandoned,
}

impl Outcome {
    /// The winning player, if any.
    pub fn winner(&self) -> Option<&PlayerId> {
        match self {
            Self::Won { winner } => Some(winner),
            Self::Draw | Self::Abandoned => None,
        }
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // =====================================================================
    // Identity types
    // =====================================================================

    #[test]
    fn test_player_id_serializes_as_plain_string() {
        let json = serde_json::to_string(&PlayerId::new("p-42")).unwrap();
        assert_eq!(json, "\"p-42\"");
    }

    #[test]
    fn test_player_id_deserializes_from_plain_string() {
        let pid: PlayerId = serde_json::from_str("\"p-42\"").unwrap();
        assert_eq!(pid, PlayerId::new("p-42"));
    }

    #[test]
    fn test_session_id_round_trip() {
        let sid = SessionId::new("abc123");
        let json = serde_json::to_string(&sid).unwrap();
        let back: SessionId = serde_json::from_str(&json).unwrap();
        assert_eq!(sid, back);
    }

    #[test]
    fn test_ids_display_as_inner_string() {
        assert_eq!(PlayerId::new("alice").to_string(), "alice");
        assert_eq!(SessionId::new("s1").to_string(), "s1");
    }

    // =====================================================================
    // BoardConfig
    // =====================================================================

    fn config(num_players: usize, size: u8) -> BoardConfig {
        BoardConfig {
            num_players,
            size,
            density: Density::Medium,
        }
    }

    #[test]
    fn test_board_config_accepts_range_bounds() {
        assert!(config(2, 4).validate().is_ok());
        assert!(config(6, 10).validate().is_ok());
    }

    #[test]
    fn test_board_config_rejects_too_few_players() {
        let err = config(1, 6).validate().unwrap_err();
        assert!(err.contains("num_players"));
    }

    #[test]
    fn test_board_config_rejects_too_many_players() {
        assert!(config(7, 6).validate().is_err());
    }

    #[test]
    fn test_board_config_rejects_board_size_out_of_range() {
        assert!(config(2, 3).validate().is_err());
        assert!(config(2, 11).validate().is_err());
    }

    #[test]
    fn test_density_serializes_lowercase() {
        let json = serde_json::to_string(&Density::Sparse).unwrap();
        assert_eq!(json, "\"sparse\"");
    }

    // =====================================================================
    // Outcome
    // =====================================================================

    #[test]
    fn test_outcome_won_json_format() {
        let outcome = Outcome::Won {
            winner: PlayerId::new("alice"),
        };
        let json: serde_json::Value =
            serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["result"], "won");
        assert_eq!(json["winner"], "alice");
    }

    #[test]
    fn test_outcome_winner_accessor() {
        let won = Outcome::Won {
            winner: PlayerId::new("alice"),
        };
        assert_eq!(won.winner(), Some(&PlayerId::new("alice")));
        assert_eq!(Outcome::Draw.winner(), None);
        assert_eq!(Outcome::Abandoned.winner(), None);
    }

    #[test]
    fn test_move_record_round_trip() {
        let record = MoveRecord {
            seq: 3,
            payload: serde_json::json!({ "field": 17 }),
            by: PlayerId::new("bob"),
        };
        let bytes = serde_json::to_vec(&record).unwrap();
        let back: MoveRecord = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(record, back);
    }
}
