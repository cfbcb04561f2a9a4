//! Core domain layer for the Remit ledger client.
//!
//! This crate contains the domain models, port traits (interfaces), and
//! business logic services for a funded-transfer client with ledger
//! analytics. It follows hexagonal architecture principles - this is
//! the innermost layer with no dependencies on infrastructure.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                remit (binary)               │
//! ├─────────────────────────────────────────────┤
//! │               remit-ethereum                │
//! │          (JSON-RPC ledger adapter)          │
//! ├─────────────────────────────────────────────┤
//! │          remit-core  ← YOU ARE HERE         │
//! │          (models, ports, services)          │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`models`] - Domain models (TransferEvent, AnalyticsSnapshot, etc.)
//! - [`ports`] - Interface traits for adapters to implement
//! - [`services`] - Core business logic (aggregation, submission tracking)
//! - [`error`] - Domain error types
//! - [`metrics`] - Metrics definitions
//!
//! # Key Concepts
//!
//! ## Ports
//!
//! Ports define interfaces that external adapters must implement:
//!
//! - [`ports::TransferLedger`] - Submit transfers and read the event log
//!   of the deployed ledger contract
//! - [`ports::WalletSession`] - Obtain a signing identity
//!
//! ## Aggregation
//!
//! [`services::aggregate`] is a pure function of the event log it
//! receives: each invocation recomputes the full snapshot, no state is
//! carried across calls.
//!
//! ## Submission lifecycle
//!
//! [`services::SubmissionTracker`] drives one submit-and-confirm cycle
//! and publishes `Idle -> Submitting -> Confirmed | Failed` through a
//! watch channel, then signals a deferred analytics refresh after a
//! settling delay.

pub mod error;
pub mod metrics;
pub mod models;
pub mod ports;
pub mod services;
