//! Error types for the ledger client domain layer.
//!
//! This module defines a hierarchy of error types:
//!
//! - [`DomainError`] - Business logic errors
//! - [`SessionError`] - Wallet/identity session errors
//! - [`ChainError`] - Ledger RPC errors
//! - [`ClientError`] - Top-level orchestration errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use thiserror::Error;

// =============================================================================
// Domain Errors
// =============================================================================

/// Business logic and domain rule violations.
///
/// These errors represent problems caught before anything is dispatched
/// to the ledger, such as input validation failures.
#[derive(Debug, Error)]
pub enum DomainError {
    /// Account identifier failed syntactic validation.
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Amount is negative or not representable as an exact decimal.
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// A raw log entry could not be turned into a transfer event.
    ///
    /// Per-record and non-fatal: the record is dropped, the rest of the
    /// log is still processed.
    #[error("Malformed event: {0}")]
    MalformedEvent(String),
}

// =============================================================================
// Session Errors
// =============================================================================

/// Wallet/identity session errors.
#[derive(Debug, Error)]
pub enum SessionError {
    /// No signing capability is available in the environment.
    #[error("Provider unavailable: no signing capability configured")]
    ProviderUnavailable,

    /// The signing key could not be loaded or parsed.
    #[error("Invalid signing key: {0}")]
    InvalidKey(String),

    /// Connecting the session failed.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
}

// =============================================================================
// Chain Errors
// =============================================================================

/// Ledger RPC and connectivity errors.
///
/// These errors occur when communicating with the ledger contract
/// through the RPC endpoint. None of them are retried by this layer;
/// the caller decides whether to retry.
#[derive(Debug, Error)]
pub enum ChainError {
    /// No signing session is attached to the client (read-only client).
    #[error("Provider unavailable: client has no signing session")]
    ProviderUnavailable,

    /// The user (or signer) rejected the submission.
    #[error("Rejected by user: {0}")]
    RejectedByUser(String),

    /// The sending account cannot cover value plus fees.
    #[error("Insufficient funds: {0}")]
    InsufficientFunds(String),

    /// Transport or RPC failure during submission or confirmation.
    #[error("Network error: {0}")]
    NetworkError(String),

    /// The whole log fetch failed.
    ///
    /// Callers of the analytics service never see this directly: the
    /// service degrades to an empty snapshot instead (see
    /// [`crate::services::AnalyticsService::refresh`]).
    #[error("Log fetch failed: {0}")]
    FetchFailed(String),
}

// =============================================================================
// Client Errors
// =============================================================================

/// Top-level client orchestration errors.
///
/// This is the main error type returned by the services in
/// [`crate::services`]. It wraps all lower-level errors.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Domain validation error.
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    /// Wallet session error.
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// Ledger connectivity error.
    #[error("Chain error: {0}")]
    Chain(#[from] ChainError),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

/// Result type for chain operations.
pub type ChainResult<T> = Result<T, ChainError>;
