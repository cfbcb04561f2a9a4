//! Ethereum ledger client implementing the TransferLedger port.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ethers::contract::{abigen, EthEvent};
use ethers::core::abi::RawLog;
use ethers::core::types::{BlockNumber, Filter, Log, H160, U256};
use ethers::middleware::SignerMiddleware;
use ethers::providers::{Http, Middleware, PendingTransaction, Provider};
use ethers::signers::{LocalWallet, Signer};
use ethers::utils::{format_units, parse_ether};
use rust_decimal::Decimal;
use tracing::{debug, instrument, trace};

use remit_core::error::{ChainError, ChainResult};
use remit_core::metrics::record_event_dropped;
use remit_core::models::{Address, Confirmation, PendingTransfer, TransferEvent, TxHash};
use remit_core::ports::TransferLedger;

// The deployed contract's interface. Wire compatibility is load-bearing:
// operation names and argument/return shapes must match the deployed
// ledger exactly.
abigen!(
    MessageLedger,
    r#"[
        function sendFunds(address _to, string _message) payable
        event Transfer(address indexed from, address indexed to, uint256 amount, string message, uint256 timestamp)
    ]"#
);

type SignerClient = SignerMiddleware<Provider<Http>, LocalWallet>;

/// Address of the deployed ledger contract.
const DEPLOYED_CONTRACT: [u8; 20] = [
    0x54, 0x2c, 0xa7, 0x37, 0x36, 0x28, 0xee, 0x54, 0xd4, 0xf6, 0x72, 0xe5, 0x50, 0x0a, 0x41,
    0xfd, 0x3f, 0x08, 0x6d, 0xc3,
];

/// Block the contract was deployed at. Lower bound for log queries:
/// no relevant events exist below it, and scanning from genesis is
/// pointlessly expensive.
const DEPLOY_BLOCK: u64 = 7_840_000;

/// Configuration for the Ethereum ledger client.
#[derive(Debug, Clone)]
pub struct EthereumLedgerConfig {
    /// HTTP JSON-RPC URL (e.g., "http://localhost:8545").
    pub rpc_url: String,
    /// Address of the deployed ledger contract.
    pub contract_address: Address,
    /// First block to scan for transfer events.
    pub deploy_block: u64,
    /// Chain id used for transaction signing.
    pub chain_id: u64,
}

impl Default for EthereumLedgerConfig {
    fn default() -> Self {
        Self {
            rpc_url: "http://127.0.0.1:8545".to_string(),
            contract_address: Address(DEPLOYED_CONTRACT),
            deploy_block: DEPLOY_BLOCK,
            chain_id: 11_155_111, // Sepolia
        }
    }
}

/// Ethereum adapter implementing the TransferLedger port.
///
/// Holds a read provider for log queries and confirmation polling, and
/// an optional signer-bound contract handle for submissions. Without a
/// signer the client is read-only and `submit_transfer` fails with
/// `ProviderUnavailable`.
pub struct EthereumLedger {
    config: EthereumLedgerConfig,
    provider: Arc<Provider<Http>>,
    write_contract: Option<MessageLedger<SignerClient>>,
}

impl EthereumLedger {
    /// Create a read-only client (analytics only).
    #[instrument(skip_all, fields(url = %config.rpc_url))]
    pub fn connect(config: EthereumLedgerConfig) -> ChainResult<Self> {
        let provider = Self::build_provider(&config)?;
        debug!("Connected (read-only)");

        Ok(Self {
            config,
            provider: Arc::new(provider),
            write_contract: None,
        })
    }

    /// Create a client with an attached signing session.
    #[instrument(skip_all, fields(url = %config.rpc_url))]
    pub fn connect_with_signer(
        config: EthereumLedgerConfig,
        wallet: LocalWallet,
    ) -> ChainResult<Self> {
        let provider = Self::build_provider(&config)?;
        let wallet = wallet.with_chain_id(config.chain_id);
        let signer = SignerMiddleware::new(provider.clone(), wallet);
        let write_contract = MessageLedger::new(
            H160(config.contract_address.0),
            Arc::new(signer),
        );
        debug!("Connected with signer");

        Ok(Self {
            config,
            provider: Arc::new(provider),
            write_contract: Some(write_contract),
        })
    }

    fn build_provider(config: &EthereumLedgerConfig) -> ChainResult<Provider<Http>> {
        Provider::<Http>::try_from(config.rpc_url.as_str())
            .map_err(|e| ChainError::NetworkError(format!("invalid RPC url: {e}")))
    }
}

#[async_trait]
impl TransferLedger for EthereumLedger {
    async fn submit_transfer(
        &self,
        recipient: &Address,
        message: &str,
        amount: Decimal,
    ) -> ChainResult<PendingTransfer> {
        let contract = self
            .write_contract
            .as_ref()
            .ok_or(ChainError::ProviderUnavailable)?;

        let value = amount_to_wei(amount)?;
        let call = contract
            .send_funds(H160(recipient.0), message.to_string())
            .value(value);

        let pending = call
            .send()
            .await
            .map_err(|e| classify_submit_failure(e.to_string()))?;
        let tx_hash = TxHash(pending.tx_hash().0);
        debug!(tx = %tx_hash, "Transfer dispatched");

        Ok(PendingTransfer { tx_hash })
    }

    async fn await_confirmation(&self, pending: &PendingTransfer) -> ChainResult<Confirmation> {
        let hash = ethers::core::types::H256(pending.tx_hash.0);
        let receipt = PendingTransaction::new(hash, self.provider.as_ref())
            .await
            .map_err(|e| ChainError::NetworkError(e.to_string()))?
            .ok_or_else(|| {
                ChainError::NetworkError(format!(
                    "transaction {} dropped from the mempool",
                    pending.tx_hash
                ))
            })?;

        Ok(Confirmation {
            tx_hash: TxHash(receipt.transaction_hash.0),
            block_number: receipt.block_number.map(|n| n.as_u64()),
        })
    }

    async fn fetch_transfer_log(&self) -> ChainResult<Vec<TransferEvent>> {
        let filter = Filter::new()
            .address(H160(self.config.contract_address.0))
            .topic0(TransferFilter::signature())
            .from_block(self.config.deploy_block)
            .to_block(BlockNumber::Latest);

        let logs = self
            .provider
            .get_logs(&filter)
            .await
            .map_err(|e| ChainError::FetchFailed(e.to_string()))?;

        let events = parse_transfer_logs(&logs);
        debug!(fetched = logs.len(), parsed = events.len(), "Transfer log fetched");
        Ok(events)
    }
}

// =============================================================================
// Log decoding helpers
// =============================================================================

/// Decode a batch of raw log entries, dropping malformed ones.
///
/// Per-record validation: a malformed entry is dropped (and counted),
/// never allowed to fail the whole batch. Delivery order is preserved
/// as-is.
fn parse_transfer_logs(logs: &[Log]) -> Vec<TransferEvent> {
    let mut events = Vec::with_capacity(logs.len());
    for log in logs {
        if let Some(event) = parse_transfer_log(log) {
            events.push(event);
        }
    }
    events
}

/// Decode one raw log entry into a domain transfer event.
///
/// Returns `None` (with a dropped-event metric) for entries that fail
/// ABI decoding or carry out-of-range values.
fn parse_transfer_log(log: &Log) -> Option<TransferEvent> {
    let raw = RawLog {
        topics: log.topics.clone(),
        data: log.data.to_vec(),
    };

    let decoded = match TransferFilter::decode_log(&raw) {
        Ok(decoded) => decoded,
        Err(e) => {
            trace!(error = %e, "Failed to decode Transfer log");
            record_event_dropped("decode");
            return None;
        }
    };

    let block_number = match log.block_number {
        Some(number) => number.as_u64(),
        None => {
            trace!("Transfer log has no block number");
            record_event_dropped("block");
            return None;
        }
    };

    transfer_from_parts(
        decoded.from,
        decoded.to,
        decoded.amount,
        decoded.message,
        decoded.timestamp,
        block_number,
    )
}

/// Assemble a transfer event from decoded log fields, validating ranges.
fn transfer_from_parts(
    from: H160,
    to: H160,
    amount: U256,
    message: String,
    timestamp: U256,
    block_number: u64,
) -> Option<TransferEvent> {
    let amount = match wei_to_decimal(amount) {
        Some(amount) => amount,
        None => {
            trace!("Transfer amount not representable as exact decimal");
            record_event_dropped("amount");
            return None;
        }
    };

    let timestamp = match checked_timestamp(timestamp) {
        Some(ts) => ts,
        None => {
            trace!("Transfer timestamp out of range");
            record_event_dropped("timestamp");
            return None;
        }
    };

    Some(TransferEvent {
        sender: Address(from.0),
        recipient: Address(to.0),
        amount,
        message,
        timestamp,
        block_number,
    })
}

/// Convert a wei amount to an exact base-unit decimal.
///
/// `format_units` performs exact integer scaling; the decimal parse
/// fails rather than rounds when 28 significant digits are exceeded.
fn wei_to_decimal(wei: U256) -> Option<Decimal> {
    let text = format_units(wei, "ether").ok()?;
    Decimal::from_str_exact(text.trim()).ok()
}

/// Convert a base-unit decimal amount to wei via exact integer scaling.
fn amount_to_wei(amount: Decimal) -> ChainResult<U256> {
    parse_ether(amount.to_string())
        .map_err(|e| ChainError::NetworkError(format!("amount not representable in wei: {e}")))
}

fn checked_timestamp(timestamp: U256) -> Option<DateTime<Utc>> {
    if timestamp > U256::from(i64::MAX as u64) {
        return None;
    }
    DateTime::<Utc>::from_timestamp(timestamp.as_u64() as i64, 0)
}

/// Map a submission failure to the domain taxonomy by message text.
///
/// The RPC stack surfaces provider-specific error strings; this is the
/// same shape of mapping the rest of the adapter does with
/// `e.to_string()`, just with coarse classification on top.
fn classify_submit_failure(text: String) -> ChainError {
    let lower = text.to_lowercase();
    if lower.contains("insufficient funds") {
        ChainError::InsufficientFunds(text)
    } else if lower.contains("rejected") || lower.contains("denied") {
        ChainError::RejectedByUser(text)
    } else {
        ChainError::NetworkError(text)
    }
}

// =============================================================================
// Tests
// =============================================================================
