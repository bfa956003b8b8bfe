//! # Matchwire
//!
//! Lobby and move-relay backend for turn-based web board games.
//!
//! Players register over a WebSocket, create game invitations, and
//! accept or decline them; once everyone has accepted, the creator
//! starts the game and the server relays opaque moves to the room,
//! with sequence-numbered recovery for dropped connections and
//! timeout-driven eviction of abandoned sessions.
//!
//! The server is deliberately rule-agnostic: move payloads are relayed
//! verbatim, and game legality is the clients' business. What the
//! server does own is ordering (the move log), membership (rooms and
//! identity bindings), and lifecycle (the invitation state machine and
//! the reaper).
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use matchwire::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), MatchwireError> {
//!     let server = LobbyServerBuilder::new()
//!         .bind("0.0.0.0:8080")
//!         .build(DevVerifier, MemoryRecordStore::new())
//!         .await?;
//!     server.run().await
//! }
//! ```

mod error;
mod handler;
mod server;

pub use error::MatchwireError;
pub use server::{LobbyServer, LobbyServerBuilder};

/// The commonly needed imports in one place.
pub mod prelude {
    pub use matchwire_coordinator::{
        CoordinatorConfig, CoordinatorError, CoordinatorHandle, GameRecord,
        MemoryRecordStore, RecordError, RecordStatus, RecordStore,
        RecordUpdate,
    };
    pub use matchwire_protocol::{
        BoardConfig, ClientEvent, Codec, Density, JsonCodec, MoveRecord,
        Outcome, PlayerId, ServerEvent, SessionId,
    };
    pub use matchwire_registry::{
        DevVerifier, IdentityVerifier, RegisterClaim, RegistryError,
    };
    pub use matchwire_transport::ConnectionId;

    pub use crate::{LobbyServer, LobbyServerBuilder, MatchwireError};
}
