//! Local wallet session implementing the WalletSession port.

use async_trait::async_trait;
use ethers::signers::{LocalWallet, Signer};
use tracing::debug;

use remit_core::error::{SessionError, SessionResult};
use remit_core::models::{Address, Identity};
use remit_core::ports::WalletSession;

/// Configuration for the local wallet session.
///
/// The key is optional: without one the session cannot connect and
/// every `connect` fails with `ProviderUnavailable`, which lets a
/// read-only deployment share the same wiring as a signing one.
#[derive(Debug, Clone, Default)]
pub struct WalletConfig {
    /// Hex-encoded signing key (with or without 0x prefix).
    pub private_key: Option<String>,
    /// Chain id the signer is bound to.
    pub chain_id: u64,
}

/// Wallet session backed by a locally held signing key.
///
/// The in-process analog of an injected browser provider: `connect`
/// yields the identity, the key itself never crosses the port.
pub struct LocalWalletSession {
    config: WalletConfig,
}

impl LocalWalletSession {
    pub fn new(config: WalletConfig) -> Self {
        Self { config }
    }

    /// Build the signer for adapter wiring.
    ///
    /// Only the infrastructure layer calls this; the domain works with
    /// the [`Identity`] returned by `connect`.
    pub fn signer(&self) -> SessionResult<LocalWallet> {
        let key = self
            .config
            .private_key
            .as_deref()
            .ok_or(SessionError::ProviderUnavailable)?;

        let wallet: LocalWallet = key
            .trim()
            .trim_start_matches("0x")
            .parse()
            .map_err(|e| SessionError::InvalidKey(format!("{e}")))?;

        Ok(wallet.with_chain_id(self.config.chain_id))
    }
}

#[async_trait]
impl WalletSession for LocalWalletSession {
    async fn connect(&self) -> SessionResult<Identity> {
        let wallet = self.signer()?;
        let address = Address(wallet.address().0);
        debug!(%address, "Wallet session connected");
        Ok(Identity::new(address))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // Well-known development key (hardhat account 0)
    const DEV_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const DEV_ADDRESS: &str = "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266";

    #[tokio::test]
    async fn connect_without_key_is_provider_unavailable() {
        let session = LocalWalletSession::new(WalletConfig::default());
        let err = session.connect().await.unwrap_err();
        assert!(matches!(err, SessionError::ProviderUnavailable));
    }

    #[tokio::test]
    async fn connect_derives_address_from_key() {
        let session = LocalWalletSession::new(WalletConfig {
            private_key: Some(DEV_KEY.to_string()),
            chain_id: 31337,
        });
        let identity = session.connect().await.unwrap();
        assert_eq!(identity.address().to_hex(), DEV_ADDRESS);
    }

    #[tokio::test]
    async fn garbage_key_is_rejected() {
        let session = LocalWalletSession::new(WalletConfig {
            private_key: Some("not-a-key".to_string()),
            chain_id: 31337,
        });
        let err = session.connect().await.unwrap_err();
        assert!(matches!(err, SessionError::InvalidKey(_)));
    }
}
