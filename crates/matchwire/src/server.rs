//! `LobbyServer` builder and accept loop.
//!
//! This is the entry point for running a Matchwire lobby. It ties the
//! layers together: transport → protocol → registry → coordinator.

use std::sync::Arc;

use matchwire_coordinator::{
    Coordinator, CoordinatorConfig, CoordinatorHandle, RecordStore,
};
use matchwire_protocol::{Codec, JsonCodec};
use matchwire_registry::IdentityVerifier;
use matchwire_transport::{Transport, WebSocketTransport};

use crate::MatchwireError;
use crate::handler::handle_connection;

/// Shared server state handed to each connection handler task.
pub(crate) struct ServerState<V: IdentityVerifier, C: Codec> {
    pub(crate) verifier: V,
    pub(crate) codec: C,
    pub(crate) coordinator: CoordinatorHandle,
}

/// Builder for configuring and starting a lobby server.
///
/// # Example
///
/// ```rust,no_run
/// use matchwire::prelude::*;
///
/// # async fn run() -> Result<(), MatchwireError> {
/// let server = LobbyServerBuilder::new()
///     .bind("0.0.0.0:8080")
///     .build(DevVerifier, MemoryRecordStore::new())
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct LobbyServerBuilder {
    bind_addr: String,
    coordinator_config: CoordinatorConfig,
}

impl LobbyServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            coordinator_config: CoordinatorConfig::default(),
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets the coordinator (reaper) configuration.
    pub fn coordinator_config(mut self, config: CoordinatorConfig) -> Self {
        self.coordinator_config = config;
        self
    }

    /// Builds and starts the server with the given collaborators:
    /// an identity verifier and a record store.
    ///
    /// Uses `JsonCodec` and `WebSocketTransport`.
    pub async fn build<V: IdentityVerifier, R: RecordStore>(
        self,
        verifier: V,
        records: R,
    ) -> Result<LobbyServer<V, JsonCodec>, MatchwireError> {
        let transport = WebSocketTransport::bind(&self.bind_addr).await?;
        let coordinator =
            Coordinator::spawn(records, self.coordinator_config);

        let state = Arc::new(ServerState {
            verifier,
            codec: JsonCodec,
            coordinator,
        });

        Ok(LobbyServer { transport, state })
    }
}

impl Default for LobbyServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A running Matchwire lobby server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct LobbyServer<V: IdentityVerifier, C: Codec> {
    transport: WebSocketTransport,
    state: Arc<ServerState<V, C>>,
}

impl<V, C> LobbyServer<V, C>
where
    V: IdentityVerifier,
    C: Codec + Clone,
{
    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// Runs the server accept loop.
    ///
    /// Accepts incoming connections and spawns a handler task for
    /// each. Runs until the process is terminated.
    pub async fn run(mut self) -> Result<(), MatchwireError> {
        tracing::info!("Matchwire lobby server running");

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) =
                            handle_connection(conn, state).await
                        {
                            tracing::debug!(
                                error = %e,
                                "connection ended with error"
                            );
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
