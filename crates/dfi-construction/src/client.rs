//! Collaborator interfaces: the node client and the indexer.
//!
//! The pipeline is generic over both traits so tests can substitute
//! in-memory implementations. Every call is bounded by the configured
//! upstream timeout in [`call_upstream`].

use std::future::Future;
use std::time::Duration;

use dfi_script::ScriptPubKey;
use tracing::warn;

use crate::error::ConstructionError;
use crate::types::Coin;

/// Failure reported by a node or indexer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UpstreamError {
    /// The collaborator could not be reached.
    #[error("transport error: {0}")]
    Transport(String),

    /// The node answered with an error object.
    #[error("node error {code}: {message}")]
    Node { code: i64, message: String },

    /// A coin is unknown to the indexer (spent or never existed).
    #[error("coin {0} not found")]
    CoinNotFound(String),

    /// The response could not be interpreted.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Node capabilities the construction and mempool services consume.
pub trait NodeClient: Send + Sync {
    /// Estimated fee rate, in base units per byte, to confirm within
    /// `confirmation_target` blocks.
    fn suggested_fee_rate(
        &self,
        confirmation_target: u32,
    ) -> impl Future<Output = Result<f64, UpstreamError>> + Send;

    /// Broadcast a raw transaction, returning the identifier the node
    /// assigned it.
    fn send_raw_transaction(
        &self,
        raw_transaction_hex: &str,
    ) -> impl Future<Output = Result<String, UpstreamError>> + Send;

    /// Identifiers of all transactions in the node's mempool.
    fn raw_mempool(&self) -> impl Future<Output = Result<Vec<String>, UpstreamError>> + Send;

    /// Raw bytes of a transaction known to the node.
    fn raw_transaction(
        &self,
        txid: &str,
    ) -> impl Future<Output = Result<Vec<u8>, UpstreamError>> + Send;
}

/// Historical output lookups.
pub trait Indexer: Send + Sync {
    /// The locking script of every coin, one per coin and in the same order.
    fn script_pub_keys(
        &self,
        coins: &[Coin],
    ) -> impl Future<Output = Result<Vec<ScriptPubKey>, UpstreamError>> + Send;
}

/// Await an upstream call under `timeout`, mapping failures onto the
/// construction error taxonomy.
pub async fn call_upstream<T>(
    operation: &'static str,
    timeout: Duration,
    call: impl Future<Output = Result<T, UpstreamError>>,
) -> Result<T, ConstructionError> {
    match tokio::time::timeout(timeout, call).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(source)) => {
            warn!(operation, error = %source, "upstream call failed");
            Err(ConstructionError::Upstream { operation, source })
        }
        Err(_) => {
            warn!(operation, ?timeout, "upstream call timed out");
            Err(ConstructionError::UpstreamTimeout { operation, timeout })
        }
    }
}
