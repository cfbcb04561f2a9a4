//! Shared test doubles for the service layer.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tokio::sync::watch;

use crate::error::{ChainError, ChainResult};
use crate::models::{
    Address, Confirmation, PendingTransfer, SubmissionStatus, TransferEvent, TxHash,
};
use crate::ports::TransferLedger;

/// Build a well-formed transfer event whose sender is tagged by its
/// first address byte.
pub fn event(sender_tag: u8, amount: Decimal) -> TransferEvent {
    event_at(sender_tag, amount, 1_700_000_000, 7_850_000)
}

/// Like [`event`] but with explicit timestamp (seconds) and block number.
pub fn event_at(sender_tag: u8, amount: Decimal, timestamp: i64, block_number: u64) -> TransferEvent {
    let mut sender = [0u8; 20];
    sender[0] = sender_tag;
    TransferEvent {
        sender: Address(sender),
        recipient: Address([0xFF; 20]),
        amount,
        message: "gm".to_string(),
        timestamp: DateTime::<Utc>::from_timestamp(timestamp, 0).unwrap(),
        block_number,
    }
}

/// Configurable in-memory [`TransferLedger`].
///
/// `status_probe` lets tracker tests observe what the submission status
/// was at the moment the ledger was invoked.
pub struct MockLedger {
    pub events: Vec<TransferEvent>,
    pub fail_fetch: bool,
    pub fail_submit: AtomicBool,
    pub fail_confirm: AtomicBool,
    pub status_probe: Mutex<Option<watch::Receiver<SubmissionStatus>>>,
    pub observed_at_submit: Mutex<Option<SubmissionStatus>>,
}

impl MockLedger {
    pub fn with_events(events: Vec<TransferEvent>) -> Self {
        Self {
            events,
            fail_fetch: false,
            fail_submit: AtomicBool::new(false),
            fail_confirm: AtomicBool::new(false),
            status_probe: Mutex::new(None),
            observed_at_submit: Mutex::new(None),
        }
    }

    pub fn failing_fetch() -> Self {
        Self {
            fail_fetch: true,
            ..Self::with_events(Vec::new())
        }
    }

    pub fn set_probe(&self, rx: watch::Receiver<SubmissionStatus>) {
        *self.status_probe.lock().unwrap() = Some(rx);
    }

    pub fn observed_at_submit(&self) -> Option<SubmissionStatus> {
        self.observed_at_submit.lock().unwrap().clone()
    }
}

#[async_trait]
impl TransferLedger for MockLedger {
    async fn submit_transfer(
        &self,
        _recipient: &Address,
        _message: &str,
        _amount: Decimal,
    ) -> ChainResult<PendingTransfer> {
        if let Some(rx) = self.status_probe.lock().unwrap().as_ref() {
            *self.observed_at_submit.lock().unwrap() = Some(rx.borrow().clone());
        }
        if self.fail_submit.load(Ordering::SeqCst) {
            return Err(ChainError::RejectedByUser("user denied the request".into()));
        }
        Ok(PendingTransfer {
            tx_hash: TxHash([7u8; 32]),
        })
    }

    async fn await_confirmation(&self, pending: &PendingTransfer) -> ChainResult<Confirmation> {
        if self.fail_confirm.load(Ordering::SeqCst) {
            return Err(ChainError::NetworkError(
                "connection reset while waiting for receipt".into(),
            ));
        }
        Ok(Confirmation {
            tx_hash: pending.tx_hash.clone(),
            block_number: Some(7_900_001),
        })
    }

    async fn fetch_transfer_log(&self) -> ChainResult<Vec<TransferEvent>> {
        if self.fail_fetch {
            return Err(ChainError::FetchFailed("eth_getLogs: connection refused".into()));
        }
        Ok(self.events.clone())
    }
}
