//! RPC configuration and JSON-RPC 1.0 envelopes.

use std::time::Duration;

use dfi_script::ScriptPubKey;
use serde::{Deserialize, Serialize};

/// Default per-request timeout.
pub const DEFAULT_RPC_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for an [`RpcClient`](crate::RpcClient).
#[derive(Debug, Clone)]
pub struct RpcConfig {
    /// Node RPC endpoint (e.g. `http://127.0.0.1:8554`).
    pub url: String,
    /// Basic auth user.
    pub username: String,
    /// Basic auth password.
    pub password: String,
    /// Timeout applied to every request.
    pub timeout: Duration,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:8554".to_string(),
            username: String::new(),
            password: String::new(),
            timeout: DEFAULT_RPC_TIMEOUT,
        }
    }
}

/// JSON-RPC request body.
#[derive(Debug, Serialize)]
pub(crate) struct RpcRequest<'a> {
    pub jsonrpc: &'static str,
    pub id: &'static str,
    pub method: &'a str,
    pub params: serde_json::Value,
}

/// JSON-RPC response body. `result` stays raw so `null` results can be
/// told apart from errors.
#[derive(Debug, Deserialize)]
pub(crate) struct RpcResponse {
    #[serde(default)]
    pub result: serde_json::Value,
    #[serde(default)]
    pub error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RpcErrorObject {
    pub code: i64,
    pub message: String,
}

/// `estimatesmartfee` result. `feerate` is absent when the node lacks
/// data for an estimate.
#[derive(Debug, Deserialize)]
pub(crate) struct SmartFeeEstimate {
    #[serde(default)]
    pub feerate: Option<f64>,
    #[serde(default)]
    pub errors: Vec<String>,
}

/// The subset of a `gettxout` result the indexer needs.
#[derive(Debug, Deserialize)]
pub(crate) struct TxOut {
    #[serde(rename = "scriptPubKey")]
    pub script_pub_key: ScriptPubKey,
}
