//! Domain models for the Remit ledger client.
//!
//! These models are transport-agnostic and represent the canonical
//! form of ledger data within the domain layer.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// =============================================================================
// Fixed-length Identifier Types
// =============================================================================

/// Macro to generate fixed-length byte newtypes with common functionality.
///
/// Generates:
/// - `from_hex()` - Parse from hex string (with or without 0x prefix)
/// - `to_hex()` - Convert to 0x-prefixed hex string
/// - `Display` trait implementation
/// - `From<[u8; N]>` implementation
macro_rules! fixed_bytes_newtype {
    ($(#[$meta:meta])* $name:ident, $len:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub [u8; $len]);

        impl $name {
            /// Parse from hex string (with or without 0x prefix).
            pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
                let s = s.strip_prefix("0x").unwrap_or(s);
                let bytes = hex::decode(s)?;
                let arr: [u8; $len] = bytes
                    .try_into()
                    .map_err(|_| hex::FromHexError::InvalidStringLength)?;
                Ok(Self(arr))
            }

            /// Convert to 0x-prefixed hex string.
            pub fn to_hex(&self) -> String {
                format!("0x{}", hex::encode(self.0))
            }

            /// Get the inner bytes.
            pub fn as_bytes(&self) -> &[u8; $len] {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.to_hex())
            }
        }

        impl From<[u8; $len]> for $name {
            fn from(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }
        }

        impl AsRef<[u8]> for $name {
            fn as_ref(&self) -> &[u8] {
                &self.0
            }
        }
    };
}

fixed_bytes_newtype!(
    /// 20-byte ledger account identifier.
    Address,
    20
);

fixed_bytes_newtype!(
    /// 32-byte transaction hash.
    TxHash,
    32
);

impl Address {
    /// Abbreviated display form: first 6 characters of the hex form
    /// followed by an ellipsis. Cosmetic only - comparison and grouping
    /// always use the full identifier.
    pub fn abbreviated(&self) -> String {
        format!("{}...", &self.to_hex()[..6])
    }
}

// =============================================================================
// Identity
// =============================================================================

/// An authenticated signing identity for one connected session.
///
/// Opaque to the core: the signing key itself stays inside the wallet
/// adapter; the domain only ever sees the account address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    address: Address,
}

impl Identity {
    pub fn new(address: Address) -> Self {
        Self { address }
    }

    /// The account address of this identity.
    pub fn address(&self) -> &Address {
        &self.address
    }
}

// =============================================================================
// Transfer Events
// =============================================================================

/// One historical transfer recorded by the ledger contract.
///
/// Events arrive in log-delivery order, which is typically but not
/// guaranteedly chronological. Anything that needs chronological order
/// must sort explicitly (see [`crate::services::sort_chronological`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferEvent {
    /// Sender account.
    pub sender: Address,
    /// Recipient account.
    pub recipient: Address,
    /// Amount transferred, in the ledger's base unit (exact decimal).
    pub amount: Decimal,
    /// Free-text annotation attached to the transfer.
    pub message: String,
    /// Ledger-supplied timestamp (seconds since epoch at the source).
    pub timestamp: DateTime<Utc>,
    /// Block number containing this transfer.
    pub block_number: u64,
}

// =============================================================================
// Submission Lifecycle
// =============================================================================

/// Handle for a dispatched but not yet confirmed transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTransfer {
    pub tx_hash: TxHash,
}

/// Result of awaiting a pending transfer's confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Confirmation {
    pub tx_hash: TxHash,
    /// Block the transaction was included in, when the ledger reports it.
    pub block_number: Option<u64>,
}

/// Transient status of one in-flight submission.
///
/// Lifecycle: `Idle -> Submitting -> Confirmed | Failed`. The terminal
/// states persist until a new submission resets to `Submitting`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SubmissionStatus {
    /// No submission has been started.
    Idle,
    /// A submission has been dispatched and is awaiting confirmation.
    Submitting,
    /// The transfer was confirmed by the ledger.
    Confirmed { tx_hash: TxHash },
    /// The submission failed; `cause` is human-readable and non-empty.
    Failed { cause: String },
}

impl SubmissionStatus {
    /// Whether this status ends a submission lifecycle.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Confirmed { .. } | Self::Failed { .. })
    }
}

// =============================================================================
// Analytics
// =============================================================================

/// Per-sender activity count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SenderActivity {
    pub account: Address,
    pub count: u64,
}

/// One point of the per-transfer volume series, in input order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumePoint {
    /// Zero-based position in the event log window.
    pub index: usize,
    pub amount: Decimal,
}

/// One slice of the activity distribution, derived from `most_active`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivitySlice {
    /// Abbreviated account label for display.
    pub label: String,
    /// Full account identifier backing the label.
    pub account: Address,
    pub count: u64,
}

/// Aggregate view over one window of the transfer log.
///
/// Immutable and recomputed on each fetch; see
/// [`crate::services::aggregate`] for the derivation rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsSnapshot {
    /// Number of events in the window.
    pub total_transactions: u64,
    /// Sum of all amounts, formatted to exactly 4 decimal places.
    pub total_value_transferred: String,
    /// Top senders by event count, descending, at most 5 entries.
    /// Ties are broken by first appearance in the input log.
    pub most_active: Vec<SenderActivity>,
    /// Per-transfer amounts in input order, for chart rendering.
    pub volume_series: Vec<VolumePoint>,
    /// Activity distribution over `most_active`, with display labels.
    pub activity_distribution: Vec<ActivitySlice>,
}

impl Default for AnalyticsSnapshot {
    fn default() -> Self {
        Self {
            total_transactions: 0,
            total_value_transferred: "0.0000".to_string(),
            most_active: Vec::new(),
            volume_series: Vec::new(),
            activity_distribution: Vec::new(),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_hex_roundtrip() {
        let hex = "0x542ca7373628ee54d4f672e5500a41fd3f086dc3";
        let addr = Address::from_hex(hex).unwrap();
        assert_eq!(addr.to_hex(), hex);
    }

    #[test]
    fn address_without_prefix() {
        let hex = "542ca7373628ee54d4f672e5500a41fd3f086dc3";
        let addr = Address::from_hex(hex).unwrap();
        assert_eq!(addr.to_hex(), format!("0x{}", hex));
    }

    #[test]
    fn tx_hash_hex_roundtrip() {
        let hex = "0x1234567890abcdef1234567890abcdef1234567890abcdef1234567890abcdef";
        let hash = TxHash::from_hex(hex).unwrap();
        assert_eq!(hash.to_hex(), hex);
    }

    #[test]
    fn address_invalid_length() {
        // 32 bytes is a hash, not an address
        let hex = "0x1234567890abcdef1234567890abcdef1234567890abcdef1234567890abcdef";
        assert!(Address::from_hex(hex).is_err());
        assert!(Address::from_hex("0x1234").is_err());
    }

    #[test]
    fn abbreviation_keeps_full_identifier_intact() {
        let addr = Address::from_hex("0xabcdef0102030405060708090a0b0c0d0e0f1011").unwrap();
        assert_eq!(addr.abbreviated(), "0xabcd...");
        // L'abréviation est purement cosmétique
        assert_eq!(addr.to_hex(), "0xabcdef0102030405060708090a0b0c0d0e0f1011");
    }

    #[test]
    fn empty_snapshot_formats_zero_total() {
        let snapshot = AnalyticsSnapshot::default();
        assert_eq!(snapshot.total_transactions, 0);
        assert_eq!(snapshot.total_value_transferred, "0.0000");
        assert!(snapshot.most_active.is_empty());
    }

    #[test]
    fn terminal_states() {
        assert!(!SubmissionStatus::Idle.is_terminal());
        assert!(!SubmissionStatus::Submitting.is_terminal());
        assert!(SubmissionStatus::Confirmed {
            tx_hash: TxHash([0u8; 32])
        }
        .is_terminal());
        assert!(SubmissionStatus::Failed {
            cause: "boom".into()
        }
        .is_terminal());
    }
}
