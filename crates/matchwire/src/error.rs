//! Unified error type for the Matchwire server.

use matchwire_coordinator::CoordinatorError;
use matchwire_protocol::ProtocolError;
use matchwire_registry::RegistryError;
use matchwire_transport::TransportError;

/// Top-level error that wraps all layer-specific errors.
///
/// When using the `matchwire` meta-crate, you deal with this single
/// error type instead of importing errors from each sub-crate. The
/// `#[from]` attribute on each variant means the `?` operator converts
/// sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum MatchwireError {
    /// A transport-level error (accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode, invalid event).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A registry-level error (verification, delivery).
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// A coordinator-level error (sessions, invitations, moves).
    #[error(transparent)]
    Coordinator(#[from] CoordinatorError),
}
