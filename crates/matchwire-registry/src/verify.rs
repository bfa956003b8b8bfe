//! Identity verification hook.
//!
//! Matchwire doesn't implement authentication itself — accounts,
//! passwords, and token issuance live in an external service. This
//! module defines the [`IdentityVerifier`] trait: one async method that
//! takes the registration claim from a `register` event and returns a
//! trusted [`PlayerId`] or rejects it. The server calls it before
//! binding a connection, and everything downstream trusts the binding.

use matchwire_protocol::PlayerId;

use crate::RegistryError;

/// The registration claim carried by a `register` event.
#[derive(Debug, Clone)]
pub struct RegisterClaim {
    /// The identity the client says it is.
    pub player_id: PlayerId,
    /// Proof of that identity (a bearer token, a signed ticket — up to
    /// the verifier).
    pub token: Option<String>,
}

/// Validates a registration claim and returns the trusted identity.
///
/// # Example
///
/// ```rust
/// use matchwire_registry::{IdentityVerifier, RegisterClaim, RegistryError};
/// use matchwire_protocol::PlayerId;
///
/// /// Accepts a claim only when the token equals the player id
/// /// reversed. A stand-in for real token validation.
/// struct MirrorVerifier;
///
/// impl IdentityVerifier for MirrorVerifier {
///     async fn verify(
///         &self,
///         claim: &RegisterClaim,
///     ) -> Result<PlayerId, RegistryError> {
///         let expected: String =
///             claim.player_id.as_str().chars().rev().collect();
///         match claim.token.as_deref() {
///             Some(token) if token == expected => {
///                 Ok(claim.player_id.clone())
///             }
///             _ => Err(RegistryError::Unauthorized("bad token".into())),
///         }
///     }
/// }
/// ```
pub trait IdentityVerifier: Send + Sync + 'static {
    /// Validates the claim and returns the identity to bind.
    ///
    /// # Errors
    /// [`RegistryError::Unauthorized`] if the claim is rejected.
    fn verify(
        &self,
        claim: &RegisterClaim,
    ) -> impl std::future::Future<Output = Result<PlayerId, RegistryError>> + Send;
}

/// Accepts any non-empty claimed identity. Development and tests only.
#[derive(Debug, Clone, Copy, Default)]
pub struct DevVerifier;

impl IdentityVerifier for DevVerifier {
    async fn verify(
        &self,
        claim: &RegisterClaim,
    ) -> Result<PlayerId, RegistryError> {
        if claim.player_id.as_str().is_empty() {
            return Err(RegistryError::Unauthorized(
                "empty player id".into(),
            ));
        }
        Ok(claim.player_id.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_dev_verifier_accepts_claimed_id() {
        let claim = RegisterClaim {
            player_id: PlayerId::new("alice"),
            token: None,
        };
        let verified = DevVerifier.verify(&claim).await.unwrap();
        assert_eq!(verified, PlayerId::new("alice"));
    }

    #[tokio::test]
    async fn test_dev_verifier_rejects_empty_id() {
        let claim = RegisterClaim {
            player_id: PlayerId::new(""),
            token: None,
        };
        let result = DevVerifier.verify(&claim).await;
        assert!(matches!(result, Err(RegistryError::Unauthorized(_))));
    }
}
