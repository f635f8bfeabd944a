/// Error types for transaction operations.
#[derive(Debug, thiserror::Error)]
pub enum TransactionError {
    /// The transaction structure is invalid (e.g. an input index out of range).
    #[error("invalid transaction: {0}")]
    InvalidTransaction(String),
    /// Binary or hex decoding failed.
    #[error("serialization error: {0}")]
    SerializationError(String),
    /// A coin identifier was not of the form `<hash>:<index>`.
    #[error("invalid outpoint '{0}'")]
    InvalidOutPoint(String),
    /// An underlying script error (forwarded from `dfi-script`).
    #[error("script error: {0}")]
    Script(#[from] dfi_script::ScriptError),
    /// An underlying primitives error (forwarded from `dfi-primitives`).
    #[error("primitives error: {0}")]
    Primitives(#[from] dfi_primitives::PrimitivesError),
}

impl TransactionError {
    pub(crate) fn decoding(context: &str, err: impl std::fmt::Display) -> Self {
        TransactionError::SerializationError(format!("{context}: {err}"))
    }
}
