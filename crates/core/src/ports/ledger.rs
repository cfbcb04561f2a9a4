//! Port trait for the ledger contract.
//!
//! This trait defines the interface for submitting funded transfers and
//! reading the historical transfer log. Implementations live in the
//! infrastructure layer (e.g., `remit-ethereum`).

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::error::ChainResult;
use crate::models::{Address, Confirmation, PendingTransfer, TransferEvent};

/// Port trait for the deployed ledger contract.
///
/// The wire interface behind an implementation is fixed: one payable
/// write operation taking `(recipient, message)` with an attached
/// value, emitting one `(sender, recipient, amount, message, timestamp)`
/// event per successful call, and one read capability enumerating those
/// events over `[deploy_block, latest]`.
#[async_trait]
pub trait TransferLedger: Send + Sync {
    /// Dispatch a value-bearing transfer carrying `message`.
    ///
    /// `recipient` is already syntactically valid by construction
    /// ([`Address`] parsing rejects malformed identifiers before
    /// anything reaches this port) and `amount` non-negativity is
    /// checked by the submission tracker. Returns a handle that can be
    /// passed to [`await_confirmation`](Self::await_confirmation).
    ///
    /// Failures are never retried by this layer.
    async fn submit_transfer(
        &self,
        recipient: &Address,
        message: &str,
        amount: Decimal,
    ) -> ChainResult<PendingTransfer>;

    /// Await inclusion of a previously dispatched transfer.
    ///
    /// May suspend for an unbounded, externally determined duration
    /// (block confirmation latency). In-flight transfers are not
    /// revocable; abandoning the future does not cancel the transfer.
    async fn await_confirmation(&self, pending: &PendingTransfer) -> ChainResult<Confirmation>;

    /// Fetch the historical transfer log over `[deploy_block, latest]`.
    ///
    /// Events are returned in log-delivery order, which must not be
    /// assumed chronological. Entries that fail per-record validation
    /// are dropped, not surfaced: a partial result is preferable to
    /// total failure.
    async fn fetch_transfer_log(&self) -> ChainResult<Vec<TransferEvent>>;
}
