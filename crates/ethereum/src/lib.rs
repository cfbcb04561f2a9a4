//! Ethereum JSON-RPC adapter for the Remit ledger client.
//!
//! This crate implements the [`TransferLedger`] and [`WalletSession`]
//! ports from `remit-core`, providing connectivity to the deployed
//! ledger contract over HTTP JSON-RPC.
//!
//! # Features
//!
//! - Typed contract bindings generated with `abigen!` from the deployed
//!   contract's interface
//! - Raw log fetching with per-record validation: malformed entries are
//!   dropped and counted, never fatal
//! - Exact integer wei scaling at the boundary (no floating point)
//! - Optional signing session: a read-only client serves analytics,
//!   submissions require a signer
//!
//! # Usage
//!
//! ```ignore
//! use remit_ethereum::{EthereumLedger, EthereumLedgerConfig, LocalWalletSession, WalletConfig};
//!
//! let session = LocalWalletSession::new(WalletConfig {
//!     private_key: std::env::var("PRIVATE_KEY").ok(),
//!     chain_id: 11155111,
//! });
//! let identity = session.connect().await?;
//!
//! let config = EthereumLedgerConfig::default();
//! let ledger = EthereumLedger::connect_with_signer(config, session.signer()?)?;
//! let events = ledger.fetch_transfer_log().await?;
//! ```
//!
//! # Architecture
//!
//! The adapter keeps one shared read provider for log queries and
//! confirmation polling, plus an optional `SignerMiddleware`-wrapped
//! contract handle for submissions. All conversion between wire types
//! (`H160`, `U256`) and domain types (`Address`, `Decimal`) happens
//! here; the domain layer never sees an RPC type.
//!
//! [`TransferLedger`]: remit_core::ports::TransferLedger
//! [`WalletSession`]: remit_core::ports::WalletSession

mod client;
mod wallet;

pub use client::{EthereumLedger, EthereumLedgerConfig};
pub use wallet::{LocalWalletSession, WalletConfig};
