//! Node client over HTTP JSON-RPC.

use dfi_construction::fee::MIN_FEE_RATE;
use dfi_construction::types::Coin;
use dfi_construction::{Indexer, NodeClient, UpstreamError};
use dfi_script::ScriptPubKey;
use dfi_transaction::OutPoint;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::debug;

use crate::error::RpcError;
use crate::types::{RpcConfig, RpcRequest, RpcResponse, SmartFeeEstimate, TxOut};

/// Base units per coin.
const COIN: f64 = 100_000_000.0;

const REQUEST_ID: &str = "rosetta-defichain";

/// JSON-RPC client for a DeFiChain node.
#[derive(Debug, Clone)]
pub struct RpcClient {
    /// Client configuration.
    config: RpcConfig,
    /// Underlying HTTP client.
    client: reqwest::Client,
}

impl RpcClient {
    /// Create a client; the configured timeout bounds every request.
    pub fn new(config: RpcConfig) -> Result<Self, RpcError> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, client })
    }

    /// Issue one JSON-RPC call and decode its result.
    pub async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<T, RpcError> {
        debug!(method, "rpc call");
        let request = RpcRequest {
            jsonrpc: "1.0",
            id: REQUEST_ID,
            method,
            params,
        };
        let resp = self
            .client
            .post(&self.config.url)
            .basic_auth(&self.config.username, Some(&self.config.password))
            .json(&request)
            .send()
            .await?;

        // The node reports RPC errors with a 500 status and a JSON body,
        // so the body is parsed before the status is considered.
        let status = resp.status();
        let body = resp.bytes().await?;
        let response: RpcResponse = match serde_json::from_slice(&body) {
            Ok(response) => response,
            Err(_) if !status.is_success() => {
                return Err(RpcError::Status {
                    status: status.as_u16(),
                    body: String::from_utf8_lossy(&body).into_owned(),
                })
            }
            Err(e) => return Err(e.into()),
        };

        if let Some(err) = response.error {
            return Err(RpcError::Node {
                code: err.code,
                message: err.message,
            });
        }
        Ok(serde_json::from_value(response.result)?)
    }

    /// Fee rate in base units per byte for `confirmation_target` blocks.
    ///
    /// Falls back to [`MIN_FEE_RATE`] when the node has no estimate yet.
    pub async fn estimate_smart_fee(&self, confirmation_target: u32) -> Result<f64, RpcError> {
        let estimate: SmartFeeEstimate = self
            .call("estimatesmartfee", json!([confirmation_target]))
            .await?;
        match estimate.feerate {
            Some(per_kb) => Ok(per_kb * COIN / 1000.0),
            None => {
                debug!(errors = ?estimate.errors, "no fee estimate, using minimum rate");
                Ok(MIN_FEE_RATE)
            }
        }
    }

    /// Broadcast a raw transaction, returning its txid.
    pub async fn send_raw_transaction(&self, raw_hex: &str) -> Result<String, RpcError> {
        self.call("sendrawtransaction", json!([raw_hex])).await
    }

    /// Txids currently in the mempool.
    pub async fn raw_mempool(&self) -> Result<Vec<String>, RpcError> {
        self.call("getrawmempool", json!([])).await
    }

    /// Raw bytes of a transaction.
    pub async fn raw_transaction(&self, txid: &str) -> Result<Vec<u8>, RpcError> {
        let raw: String = self.call("getrawtransaction", json!([txid, false])).await?;
        Ok(hex::decode(raw)?)
    }

    /// Locking script of an unspent output, mempool included.
    pub async fn tx_out_script(&self, coin: &str) -> Result<ScriptPubKey, RpcError> {
        let outpoint: OutPoint = coin
            .parse()
            .map_err(|_| RpcError::CoinNotFound(coin.to_string()))?;
        let out: Option<TxOut> = self
            .call(
                "gettxout",
                json!([outpoint.hash.to_string(), outpoint.index, true]),
            )
            .await?;
        out.map(|o| o.script_pub_key)
            .ok_or_else(|| RpcError::CoinNotFound(coin.to_string()))
    }
}

impl NodeClient for RpcClient {
    async fn suggested_fee_rate(&self, confirmation_target: u32) -> Result<f64, UpstreamError> {
        Ok(self.estimate_smart_fee(confirmation_target).await?)
    }

    async fn send_raw_transaction(&self, raw_transaction_hex: &str) -> Result<String, UpstreamError> {
        Ok(RpcClient::send_raw_transaction(self, raw_transaction_hex).await?)
    }

    async fn raw_mempool(&self) -> Result<Vec<String>, UpstreamError> {
        Ok(RpcClient::raw_mempool(self).await?)
    }

    async fn raw_transaction(&self, txid: &str) -> Result<Vec<u8>, UpstreamError> {
        Ok(RpcClient::raw_transaction(self, txid).await?)
    }
}

impl Indexer for RpcClient {
    async fn script_pub_keys(&self, coins: &[Coin]) -> Result<Vec<ScriptPubKey>, UpstreamError> {
        let mut scripts = Vec::with_capacity(coins.len());
        for coin in coins {
            scripts.push(self.tx_out_script(&coin.coin_identifier.identifier).await?);
        }
        Ok(scripts)
    }
}
