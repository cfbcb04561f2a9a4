//! Metrics definitions for the ledger client.
//!
//! This module defines all metrics used throughout the client.
//! Metrics are collected using the `metrics` crate; without an
//! installed recorder every call is a no-op, so library users pay
//! nothing unless they opt in.

use metrics::{counter, describe_counter, describe_histogram, histogram};
use std::time::Instant;

/// Initialize all metric descriptions.
/// Call this once at startup before any metrics are recorded.
pub fn init_metrics() {
    describe_counter!(
        "transfer_events_dropped_total",
        "Total number of raw log entries dropped as malformed"
    );
    describe_counter!(
        "transfers_submitted_total",
        "Total number of transfer submissions, labeled by outcome"
    );
    describe_counter!(
        "log_fetch_failures_total",
        "Total number of whole-log fetches that failed and degraded to empty"
    );
    describe_histogram!(
        "log_fetch_duration_seconds",
        "Time taken to fetch and parse the transfer log in seconds"
    );
}

/// Record a raw log entry dropped during parsing.
///
/// # Arguments
/// * `reason` - Why the record was dropped ("decode", "timestamp", "amount")
pub fn record_event_dropped(reason: &str) {
    counter!("transfer_events_dropped_total", "reason" => reason.to_string()).increment(1);
}

/// Record a finished submission.
///
/// # Arguments
/// * `outcome` - "confirmed" or "failed"
pub fn record_submission(outcome: &str) {
    counter!("transfers_submitted_total", "outcome" => outcome.to_string()).increment(1);
}

/// Record a whole-log fetch failure.
pub fn record_fetch_failure() {
    counter!("log_fetch_failures_total").increment(1);
}

/// Record log fetch duration.
pub fn record_fetch_duration(duration_secs: f64) {
    histogram!("log_fetch_duration_seconds").record(duration_secs);
}

/// A timer that automatically records fetch duration when dropped.
pub struct FetchTimer {
    start: Instant,
}

impl FetchTimer {
    /// Start a new fetch timer.
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for FetchTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for FetchTimer {
    fn drop(&mut self) {
        let duration = self.start.elapsed().as_secs_f64();
        record_fetch_duration(duration);
    }
}
