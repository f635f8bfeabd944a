//! Mempool queries answered straight from the node.

use dfi_transaction::Transaction;
use tracing::debug;

use crate::client::{call_upstream, NodeClient, UpstreamError};
use crate::config::Configuration;
use crate::error::ConstructionError;
use crate::operations::{signer_address, InputContext, OperationMapper};
use crate::types::{
    MempoolResponse, MempoolTransactionResponse, Transaction as ApiTransaction,
    TransactionIdentifier,
};

/// Mempool API service. Every query needs the node, so nothing here runs
/// offline.
#[derive(Debug, Clone)]
pub struct MempoolService<C> {
    config: Configuration,
    client: C,
}

impl<C: NodeClient> MempoolService<C> {
    pub fn new(config: Configuration, client: C) -> Self {
        MempoolService { config, client }
    }

    /// Identifiers of every transaction in the node's mempool.
    pub async fn mempool(&self) -> Result<MempoolResponse, ConstructionError> {
        self.config.ensure_online()?;
        let hashes = call_upstream(
            "mempool listing",
            self.config.upstream_timeout,
            self.client.raw_mempool(),
        )
        .await?;
        debug!(count = hashes.len(), "mempool");
        Ok(MempoolResponse {
            transaction_identifiers: hashes
                .into_iter()
                .map(|hash| TransactionIdentifier { hash })
                .collect(),
        })
    }

    /// One mempool transaction rendered as operations.
    ///
    /// Spent amounts are not known without an index, so input operations
    /// carry only the account recovered from the witness or scriptSig.
    pub async fn mempool_transaction(
        &self,
        hash: &str,
    ) -> Result<MempoolTransactionResponse, ConstructionError> {
        self.config.ensure_online()?;
        debug!(hash, "mempool transaction");
        let raw = call_upstream(
            "transaction lookup",
            self.config.upstream_timeout,
            self.client.raw_transaction(hash),
        )
        .await?;
        let tx = Transaction::from_bytes(&raw).map_err(|e| ConstructionError::Upstream {
            operation: "transaction lookup",
            source: UpstreamError::InvalidResponse(e.to_string()),
        })?;

        let contexts = tx
            .inputs
            .iter()
            .map(|input| InputContext {
                account: signer_address(input).and_then(|a| a.encode(self.config.params).ok()),
                amount: None,
            })
            .collect::<Vec<_>>();
        let mapper = OperationMapper::new(self.config.params, &self.config.currency);
        let operations = mapper.to_operations(&tx, &contexts)?;

        Ok(MempoolTransactionResponse {
            transaction: ApiTransaction {
                transaction_identifier: TransactionIdentifier {
                    hash: tx.txid().to_string(),
                },
                operations,
            },
        })
    }
}
