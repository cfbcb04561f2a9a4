//! Aggregation engine - derives analytics from the transfer log.
//!
//! The aggregation itself ([`aggregate`]) is a pure function of the
//! events it receives; [`AnalyticsService`] wraps it with the log fetch
//! and the documented degraded mode for fetch failures.

use std::collections::HashMap;
use std::sync::Arc;

use rust_decimal::{Decimal, RoundingStrategy};
use tracing::{debug, instrument, warn};

use crate::metrics::{record_fetch_failure, FetchTimer};
use crate::models::{
    ActivitySlice, Address, AnalyticsSnapshot, SenderActivity, TransferEvent, VolumePoint,
};
use crate::ports::TransferLedger;

/// Maximum number of entries in the most-active list.
pub const MOST_ACTIVE_LIMIT: usize = 5;

// =============================================================================
// Pure aggregation
// =============================================================================

/// Derive an [`AnalyticsSnapshot`] from one window of the transfer log.
///
/// # Derivation rules
///
/// - `total_transactions` is the event count.
/// - `total_value_transferred` is the exact decimal sum of all amounts,
///   rounded half-up at the 5th decimal and formatted to 4 places.
/// - `most_active` is sorted by count descending, ties broken by first
///   appearance in the input, truncated to [`MOST_ACTIVE_LIMIT`].
/// - The volume series preserves input order; the activity distribution
///   mirrors `most_active` with abbreviated display labels.
///
/// Empty input yields the all-zero snapshot with `"0.0000"`.
pub fn aggregate(events: &[TransferEvent]) -> AnalyticsSnapshot {
    let mut total_value = Decimal::ZERO;
    // Insertion order of `activity` is first-seen order, which the
    // stable sort below relies on for tie-breaking.
    let mut activity: Vec<SenderActivity> = Vec::new();
    let mut positions: HashMap<Address, usize> = HashMap::new();
    let mut volume_series = Vec::with_capacity(events.len());

    for (index, event) in events.iter().enumerate() {
        total_value += event.amount;

        match positions.get(&event.sender) {
            Some(&pos) => activity[pos].count += 1,
            None => {
                positions.insert(event.sender.clone(), activity.len());
                activity.push(SenderActivity {
                    account: event.sender.clone(),
                    count: 1,
                });
            }
        }

        volume_series.push(VolumePoint {
            index,
            amount: event.amount,
        });
    }

    // Stable sort keeps first-seen order within equal counts.
    activity.sort_by(|a, b| b.count.cmp(&a.count));
    activity.truncate(MOST_ACTIVE_LIMIT);

    let activity_distribution = activity
        .iter()
        .map(|entry| ActivitySlice {
            label: entry.account.abbreviated(),
            account: entry.account.clone(),
            count: entry.count,
        })
        .collect();

    AnalyticsSnapshot {
        total_transactions: events.len() as u64,
        total_value_transferred: format_value(total_value),
        most_active: activity,
        volume_series,
        activity_distribution,
    }
}

/// Format a value total to exactly 4 decimal places, rounding (not
/// truncating) at the 5th decimal, half away from zero.
fn format_value(value: Decimal) -> String {
    let rounded = value.round_dp_with_strategy(4, RoundingStrategy::MidpointAwayFromZero);
    format!("{:.4}", rounded)
}

/// Sort events chronologically.
///
/// Log-delivery order is typically ascending by block but is not
/// guaranteed to be; chronological display must sort explicitly rather
/// than trusting delivery order.
pub fn sort_chronological(events: &mut [TransferEvent]) {
    events.sort_by_key(|e| (e.timestamp, e.block_number));
}

// =============================================================================
// AnalyticsService
// =============================================================================

/// The events and analytics delivered to consumers by one refresh.
#[derive(Debug, Clone, Default)]
pub struct LedgerView {
    /// Events in log-delivery order.
    pub events: Vec<TransferEvent>,
    pub analytics: AnalyticsSnapshot,
}

/// Fetches the transfer log and derives analytics from it.
///
/// # Degraded mode
///
/// A whole-log fetch failure does not propagate: `refresh` returns the
/// empty [`LedgerView`], observably identical to a genuinely empty log.
/// Downstream rendering therefore needs no separate error branch, at
/// the cost of transient outages showing up as "no activity". The
/// failure is logged and counted so it is not completely invisible.
pub struct AnalyticsService<L: TransferLedger> {
    ledger: Arc<L>,
}

impl<L: TransferLedger> AnalyticsService<L> {
    pub fn new(ledger: Arc<L>) -> Self {
        Self { ledger }
    }

    /// Fetch the current log window and recompute analytics.
    #[instrument(skip_all)]
    pub async fn refresh(&self) -> LedgerView {
        let _timer = FetchTimer::new();

        match self.ledger.fetch_transfer_log().await {
            Ok(events) => {
                debug!(count = events.len(), "Transfer log fetched");
                let analytics = aggregate(&events);
                LedgerView { events, analytics }
            }
            Err(e) => {
                warn!(error = %e, "⚠️  Transfer log fetch failed, degrading to empty analytics");
                record_fetch_failure();
                LedgerView::default()
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
