/// Unified error type for all primitives operations.
///
/// Covers decoding failures of hashes, wire data and secp256k1 material.
#[derive(Debug, thiserror::Error)]
pub enum PrimitivesError {
    #[error("invalid hex: {0}")]
    InvalidHex(String),

    #[error("invalid hash: {0}")]
    InvalidHash(String),

    #[error("unexpected end of data: needed {needed} bytes, {remaining} remaining")]
    UnexpectedEof { needed: usize, remaining: usize },

    #[error("non-canonical varint encoding of {0}")]
    NonCanonicalVarInt(u64),

    #[error("declared length {declared} exceeds the {remaining} bytes remaining")]
    LengthOverflow { declared: u64, remaining: usize },

    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("invalid signature: {0}")]
    InvalidSignature(String),
}

impl From<hex::FromHexError> for PrimitivesError {
    fn from(e: hex::FromHexError) -> Self {
        PrimitivesError::InvalidHex(e.to_string())
    }
}
