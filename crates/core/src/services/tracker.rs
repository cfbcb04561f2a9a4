//! Submission tracker - one submit-and-confirm lifecycle.
//!
//! Orchestrates a single funded-transfer submission against the ledger
//! port and exposes the status lifecycle through a watch channel, so
//! consumers observe `Idle -> Submitting -> Confirmed | Failed` without
//! polling.

use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use crate::error::DomainError;
use crate::metrics::record_submission;
use crate::models::{Address, SubmissionStatus};
use crate::ports::TransferLedger;

/// Default settling delay before signaling an analytics refresh.
///
/// Gives the ledger's log a chance to include the just-confirmed event.
/// Heuristic only: consumers must tolerate the refreshed log still
/// lacking the new event.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_secs(10);

/// Tracks exactly one in-flight submission.
///
/// # Concurrency
///
/// The tracker holds status for a single submission at a time; a second
/// concurrent `submit` is rejected structurally because `submit` takes
/// `&mut self`. Starting a new submission discards the previous status
/// and aborts any refresh still pending from the previous one.
pub struct SubmissionTracker<L: TransferLedger> {
    ledger: Arc<L>,
    status_tx: watch::Sender<SubmissionStatus>,
    refresh_tx: watch::Sender<u64>,
    settle_delay: Duration,
    pending_refresh: Option<JoinHandle<()>>,
}

impl<L: TransferLedger> SubmissionTracker<L> {
    pub fn new(ledger: Arc<L>) -> Self {
        Self::with_settle_delay(ledger, DEFAULT_SETTLE_DELAY)
    }

    pub fn with_settle_delay(ledger: Arc<L>, settle_delay: Duration) -> Self {
        let (status_tx, _) = watch::channel(SubmissionStatus::Idle);
        let (refresh_tx, _) = watch::channel(0u64);
        Self {
            ledger,
            status_tx,
            refresh_tx,
            settle_delay,
            pending_refresh: None,
        }
    }

    /// Subscribe to status transitions.
    pub fn status(&self) -> watch::Receiver<SubmissionStatus> {
        self.status_tx.subscribe()
    }

    /// Subscribe to the refresh signal.
    ///
    /// The epoch is bumped once per confirmed submission, after the
    /// settling delay has elapsed.
    pub fn refresh_signal(&self) -> watch::Receiver<u64> {
        self.refresh_tx.subscribe()
    }

    /// Submit a funded transfer and track it to a terminal status.
    ///
    /// `Submitting` is published synchronously, before any I/O is
    /// awaited. Any failure while dispatching or awaiting confirmation
    /// lands in `Failed` with a human-readable cause; nothing is
    /// retried here. Returns the terminal status it reached.
    #[instrument(skip(self, message), fields(recipient = %recipient))]
    pub async fn submit(
        &mut self,
        recipient: &Address,
        message: &str,
        amount: Decimal,
    ) -> SubmissionStatus {
        // A fresh lifecycle invalidates the previous submission's
        // deferred refresh.
        if let Some(handle) = self.pending_refresh.take() {
            handle.abort();
        }

        self.status_tx.send_replace(SubmissionStatus::Submitting);

        // Fail fast instead of letting the ledger reject the call.
        if amount.is_sign_negative() {
            let cause = DomainError::InvalidAmount(format!("{amount} is negative")).to_string();
            return self.fail(cause);
        }

        let pending = match self.ledger.submit_transfer(recipient, message, amount).await {
            Ok(pending) => pending,
            Err(e) => return self.fail(e.to_string()),
        };
        debug!(tx = %pending.tx_hash, "Transfer dispatched, awaiting confirmation");

        let confirmation = match self.ledger.await_confirmation(&pending).await {
            Ok(confirmation) => confirmation,
            Err(e) => return self.fail(e.to_string()),
        };

        info!(
            tx = %confirmation.tx_hash,
            block = ?confirmation.block_number,
            "✅ Transfer confirmed"
        );
        record_submission("confirmed");

        let status = SubmissionStatus::Confirmed {
            tx_hash: confirmation.tx_hash,
        };
        self.status_tx.send_replace(status.clone());
        self.schedule_refresh();
        status
    }

    /// Cancel a not-yet-fired refresh from the last confirmation.
    pub fn cancel_pending_refresh(&mut self) {
        if let Some(handle) = self.pending_refresh.take() {
            handle.abort();
        }
    }

    fn fail(&mut self, cause: String) -> SubmissionStatus {
        warn!(%cause, "❌ Submission failed");
        record_submission("failed");
        let status = SubmissionStatus::Failed { cause };
        self.status_tx.send_replace(status.clone());
        status
    }

    /// Schedule the one-shot deferred refresh signal.
    fn schedule_refresh(&mut self) {
        let refresh_tx = self.refresh_tx.clone();
        let delay = self.settle_delay;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            refresh_tx.send_modify(|epoch| *epoch += 1);
        });
        self.pending_refresh = Some(handle);
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::MockLedger;
    use rust_decimal_macros::dec;
    use std::sync::atomic::Ordering;

    fn recipient() -> Address {
        Address([0x11; 20])
    }

    #[tokio::test]
    async fn submitting_is_observable_before_ledger_io() {
        let ledger = Arc::new(MockLedger::with_events(Vec::new()));
        let mut tracker = SubmissionTracker::new(Arc::clone(&ledger));
        ledger.set_probe(tracker.status());

        assert_eq!(*tracker.status().borrow(), SubmissionStatus::Idle);
        tracker.submit(&recipient(), "hello", dec!(1)).await;

        // The ledger saw Submitting when its submit call started
        assert_eq!(
            ledger.observed_at_submit(),
            Some(SubmissionStatus::Submitting)
        );
    }

    #[tokio::test]
    async fn successful_submission_confirms_with_hash() {
        let ledger = Arc::new(MockLedger::with_events(Vec::new()));
        let mut tracker = SubmissionTracker::new(Arc::clone(&ledger));
        let status_rx = tracker.status();

        let terminal = tracker.submit(&recipient(), "rent", dec!(0.5)).await;
        match &terminal {
            SubmissionStatus::Confirmed { tx_hash } => {
                assert_eq!(tx_hash.0, [7u8; 32]);
            }
            other => panic!("expected Confirmed, got {other:?}"),
        }
        assert_eq!(*status_rx.borrow(), terminal);
    }

    #[tokio::test]
    async fn dispatch_failure_lands_in_failed_never_confirmed() {
        let ledger = Arc::new(MockLedger::with_events(Vec::new()));
        ledger.fail_submit.store(true, Ordering::SeqCst);
        let mut tracker = SubmissionTracker::new(Arc::clone(&ledger));

        let terminal = tracker.submit(&recipient(), "hello", dec!(1)).await;
        match terminal {
            SubmissionStatus::Failed { cause } => {
                assert!(!cause.is_empty());
                assert!(cause.contains("denied"));
            }
            other => panic!("expected Failed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn confirmation_failure_lands_in_failed() {
        let ledger = Arc::new(MockLedger::with_events(Vec::new()));
        ledger.fail_confirm.store(true, Ordering::SeqCst);
        let mut tracker = SubmissionTracker::new(Arc::clone(&ledger));

        let terminal = tracker.submit(&recipient(), "hello", dec!(1)).await;
        assert!(matches!(terminal, SubmissionStatus::Failed { .. }));
    }

    #[tokio::test]
    async fn negative_amount_fails_before_dispatch() {
        let ledger = Arc::new(MockLedger::with_events(Vec::new()));
        let mut tracker = SubmissionTracker::new(Arc::clone(&ledger));
        ledger.set_probe(tracker.status());

        let terminal = tracker.submit(&recipient(), "oops", dec!(-1)).await;
        assert!(matches!(terminal, SubmissionStatus::Failed { .. }));
        // The ledger was never invoked
        assert_eq!(ledger.observed_at_submit(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn refresh_fires_after_settling_delay() {
        let ledger = Arc::new(MockLedger::with_events(Vec::new()));
        let mut tracker =
            SubmissionTracker::with_settle_delay(Arc::clone(&ledger), Duration::from_secs(10));
        let refresh_rx = tracker.refresh_signal();

        tracker.submit(&recipient(), "hello", dec!(1)).await;
        assert_eq!(*refresh_rx.borrow(), 0);

        // Le signal ne part qu'après le délai de stabilisation
        tokio::time::sleep(Duration::from_secs(11)).await;
        assert_eq!(*refresh_rx.borrow(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn new_submission_cancels_pending_refresh() {
        let ledger = Arc::new(MockLedger::with_events(Vec::new()));
        let mut tracker =
            SubmissionTracker::with_settle_delay(Arc::clone(&ledger), Duration::from_secs(10));
        let refresh_rx = tracker.refresh_signal();

        tracker.submit(&recipient(), "first", dec!(1)).await;

        // Second submission starts before the first refresh fires, and
        // fails - so no refresh should ever be delivered.
        ledger.fail_submit.store(true, Ordering::SeqCst);
        tracker.submit(&recipient(), "second", dec!(1)).await;

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(*refresh_rx.borrow(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn explicit_cancel_suppresses_refresh() {
        let ledger = Arc::new(MockLedger::with_events(Vec::new()));
        let mut tracker =
            SubmissionTracker::with_settle_delay(Arc::clone(&ledger), Duration::from_secs(10));
        let refresh_rx = tracker.refresh_signal();

        tracker.submit(&recipient(), "hello", dec!(1)).await;
        tracker.cancel_pending_refresh();

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(*refresh_rx.borrow(), 0);
    }
}
