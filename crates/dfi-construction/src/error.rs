//! Error types for the construction pipeline.
//!
//! Every failure maps onto one of four kinds that tell a caller how to
//! react, and projects onto a serializable [`ApiError`] with a stable code.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::client::UpstreamError;

/// How a caller should treat a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The request itself is wrong; do not retry it unchanged.
    InvalidRequest,
    /// The stage needs network access and the service runs offline.
    Unavailable,
    /// A node or indexer call failed or timed out.
    UpstreamFailure,
    /// Transaction bytes failed to decode.
    MalformedTransaction,
}

/// Errors produced by the construction and mempool services.
#[derive(Debug, thiserror::Error)]
pub enum ConstructionError {
    #[error("endpoint unavailable offline")]
    UnavailableOffline,

    #[error("unsupported curve type {0}")]
    UnsupportedCurveType(String),

    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("unable to decode address: {0}")]
    UnableToDecodeAddress(#[source] dfi_script::ScriptError),

    #[error("operations: {0}")]
    InvalidOperations(String),

    #[error("operation {index} has index {found}; indices must be contiguous from 0")]
    NonContiguousOperations { index: usize, found: i64 },

    #[error("invalid operation type '{0}'")]
    InvalidOperationType(String),

    #[error("operation {index}: amount sign does not match its type")]
    AmountSignMismatch { index: usize },

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("currency {found} does not match the network currency {expected}")]
    CurrencyMismatch { expected: String, found: String },

    #[error("invalid coin identifier '{0}'")]
    InvalidCoinIdentifier(String),

    #[error("coin {0} is spent more than once")]
    DuplicateCoinReference(String),

    #[error("outputs ({outputs}) exceed inputs ({inputs})")]
    InsufficientFunds { inputs: u64, outputs: u64 },

    #[error("invalid fee multiplier {0}")]
    InvalidFeeMultiplier(f64),

    #[error("metadata has {scripts} scripts for {inputs} inputs")]
    ScriptCountMismatch { scripts: usize, inputs: usize },

    #[error("cannot sign input {index} with script type {script_type}")]
    UnsupportedScriptType { index: usize, script_type: String },

    #[error("expected {expected} signatures, got {got}")]
    SignatureCountMismatch { expected: usize, got: usize },

    #[error("unsupported signature type {0:?}")]
    UnsupportedSignatureType(crate::types::SignatureType),

    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    #[error("signature {0} does not answer any unsigned input payload")]
    UnmatchedSignature(usize),

    #[error("public key of signature for input {index} does not match the spent script")]
    PublicKeyMismatch { index: usize },

    #[error("cannot determine the signer of input {0}")]
    UnknownSigner(usize),

    #[error("invalid transaction envelope: {0}")]
    InvalidEnvelope(String),

    #[error("script for input {index} does not decode: {source}")]
    InvalidScript {
        index: usize,
        source: dfi_script::ScriptError,
    },

    #[error("malformed transaction: {0}")]
    MalformedTransaction(#[from] dfi_transaction::TransactionError),

    #[error("{operation} failed: {source}")]
    Upstream {
        operation: &'static str,
        source: UpstreamError,
    },

    #[error("{operation} timed out after {timeout:?}")]
    UpstreamTimeout {
        operation: &'static str,
        timeout: Duration,
    },
}

impl ConstructionError {
    pub fn kind(&self) -> ErrorKind {
        use ConstructionError::*;
        match self {
            UnavailableOffline => ErrorKind::Unavailable,
            Upstream { .. } | UpstreamTimeout { .. } => ErrorKind::UpstreamFailure,
            MalformedTransaction(_) => ErrorKind::MalformedTransaction,
            _ => ErrorKind::InvalidRequest,
        }
    }

    /// Stable numeric code of this error.
    pub fn code(&self) -> i32 {
        use ConstructionError::*;
        match self {
            UnavailableOffline => 1,
            Upstream { .. } => 2,
            UpstreamTimeout { .. } => 3,
            UnsupportedCurveType(_) => 4,
            InvalidPublicKey(_) => 5,
            UnableToDecodeAddress(_) => 6,
            InvalidOperations(_) => 7,
            NonContiguousOperations { .. } => 8,
            InvalidOperationType(_) => 9,
            AmountSignMismatch { .. } => 10,
            InvalidAmount(_) => 11,
            CurrencyMismatch { .. } => 12,
            InvalidCoinIdentifier(_) => 13,
            DuplicateCoinReference(_) => 14,
            InsufficientFunds { .. } => 15,
            InvalidFeeMultiplier(_) => 16,
            ScriptCountMismatch { .. } => 17,
            UnsupportedScriptType { .. } => 18,
            SignatureCountMismatch { .. } => 19,
            UnsupportedSignatureType(_) => 20,
            InvalidSignature(_) => 21,
            UnmatchedSignature(_) => 22,
            PublicKeyMismatch { .. } => 23,
            UnknownSigner(_) => 24,
            InvalidEnvelope(_) => 25,
            MalformedTransaction(_) => 26,
            InvalidScript { .. } => 27,
        }
    }

    /// Whether retrying the same request may succeed.
    pub fn is_retriable(&self) -> bool {
        matches!(self, ConstructionError::UpstreamTimeout { .. })
            || matches!(
                self,
                ConstructionError::Upstream {
                    source: UpstreamError::Transport(_),
                    ..
                }
            )
    }
}

/// Serializable projection of a [`ConstructionError`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    pub code: i32,
    pub message: String,
    pub retriable: bool,
    pub kind: ErrorKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl From<&ConstructionError> for ApiError {
    fn from(err: &ConstructionError) -> Self {
        let message = match err.kind() {
            ErrorKind::Unavailable => "Endpoint unavailable offline",
            ErrorKind::UpstreamFailure => "Upstream call failed",
            ErrorKind::MalformedTransaction => "Malformed transaction",
            ErrorKind::InvalidRequest => "Invalid request",
        };
        ApiError {
            code: err.code(),
            message: message.to_string(),
            retriable: err.is_retriable(),
            kind: err.kind(),
            details: Some(err.to_string()),
        }
    }
}

impl From<ConstructionError> for ApiError {
    fn from(err: ConstructionError) -> Self {
        ApiError::from(&err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        assert_eq!(ConstructionError::UnavailableOffline.kind(), ErrorKind::Unavailable);
        assert_eq!(
            ConstructionError::DuplicateCoinReference("a:0".into()).kind(),
            ErrorKind::InvalidRequest
        );
        let timeout = ConstructionError::UpstreamTimeout {
            operation: "broadcast",
            timeout: Duration::from_secs(1),
        };
        assert_eq!(timeout.kind(), ErrorKind::UpstreamFailure);
        assert!(timeout.is_retriable());

        let rejected = ConstructionError::Upstream {
            operation: "broadcast",
            source: UpstreamError::Node {
                code: -26,
                message: "bad-txns".into(),
            },
        };
        assert_eq!(rejected.kind(), ErrorKind::UpstreamFailure);
        assert!(!rejected.is_retriable());
        assert!(rejected.to_string().contains("bad-txns"));
    }

    #[test]
    fn test_api_error_projection() {
        let api = ApiError::from(ConstructionError::UnavailableOffline);
        assert_eq!(api.code, 1);
        assert_eq!(api.message, "Endpoint unavailable offline");
        assert!(!api.retriable);
        let json = serde_json::to_value(&api).unwrap();
        assert_eq!(json["kind"], "unavailable");
    }
}
