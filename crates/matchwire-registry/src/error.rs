//! Error types for the registry layer.

use matchwire_transport::ConnectionId;

/// Errors that can occur while binding connections or delivering events.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// The identity collaborator rejected a registration claim.
    #[error("identity verification failed: {0}")]
    Unauthorized(String),

    /// The connection has no identity binding.
    #[error("{0} is not registered")]
    NotRegistered(ConnectionId),

    /// An event could not be delivered to one connection (its outbound
    /// channel is gone). Broadcasts log and skip this; the stale
    /// binding is pruned.
    #[error("delivery to {0} failed")]
    DeliveryFailed(ConnectionId),
}
