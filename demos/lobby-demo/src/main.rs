//! A runnable lobby: dev identity verifier, in-memory record store.
//!
//! ```sh
//! cargo run -p lobby-demo
//! MATCHWIRE_ADDR=0.0.0.0:9000 cargo run -p lobby-demo
//! ```
//!
//! Then talk to it with any WebSocket client, e.g.:
//!
//! ```json
//! { "event": "register", "data": { "player_id": "alice" } }
//! { "event": "create-game", "data": {
//!     "participants": ["alice", "bob"],
//!     "config": { "num_players": 2, "size": 6, "density": "medium" },
//!     "invitees": ["bob"] } }
//! ```

use matchwire::prelude::*;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let addr = std::env::var("MATCHWIRE_ADDR")
        .unwrap_or_else(|_| "127.0.0.1:8080".to_string());

    let server = LobbyServerBuilder::new()
        .bind(&addr)
        .build(DevVerifier, MemoryRecordStore::new())
        .await?;

    tracing::info!(%addr, "lobby-demo listening");
    server.run().await?;
    Ok(())
}
