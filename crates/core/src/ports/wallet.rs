//! Port trait for the wallet/identity session.

use async_trait::async_trait;

use crate::error::SessionResult;
use crate::models::Identity;

/// Port trait for obtaining a signing identity.
///
/// `connect` may suspend indefinitely: injected providers mediate the
/// connection through a user approval step, so implementations must not
/// be assumed to complete promptly. Fails with
/// [`SessionError::ProviderUnavailable`](crate::error::SessionError::ProviderUnavailable)
/// when no signing capability is configured in the environment.
#[async_trait]
pub trait WalletSession: Send + Sync {
    /// Establish a session and return the authenticated identity.
    async fn connect(&self) -> SessionResult<Identity>;
}
