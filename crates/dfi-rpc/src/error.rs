//! Error types for node RPC calls.

use dfi_construction::UpstreamError;

/// Errors that can occur when talking to the node.
#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    /// HTTP request failed or timed out.
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// The response body was not the expected JSON.
    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Non-JSON response with an unsuccessful HTTP status.
    #[error("HTTP status {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, lossily decoded.
        body: String,
    },

    /// The node answered with an error object.
    #[error("node error {code}: {message}")]
    Node {
        /// JSON-RPC error code.
        code: i64,
        /// Error message reported by the node.
        message: String,
    },

    /// The coin is spent or unknown to the node.
    #[error("coin {0} not found")]
    CoinNotFound(String),

    /// A hex field in the response did not decode.
    #[error("invalid hex in response: {0}")]
    InvalidHex(#[from] hex::FromHexError),
}

impl From<RpcError> for UpstreamError {
    fn from(err: RpcError) -> Self {
        match err {
            RpcError::HttpError(e) => UpstreamError::Transport(e.to_string()),
            RpcError::Status { status, body } => {
                UpstreamError::Transport(format!("HTTP status {status}: {body}"))
            }
            RpcError::Node { code, message } => UpstreamError::Node { code, message },
            RpcError::CoinNotFound(coin) => UpstreamError::CoinNotFound(coin),
            RpcError::SerializationError(e) => UpstreamError::InvalidResponse(e.to_string()),
            RpcError::InvalidHex(e) => UpstreamError::InvalidResponse(e.to_string()),
        }
    }
}
