/// Error types for script and address operations.
#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    /// A push opcode declared more data than the script contains.
    #[error("push at offset {offset} runs past the end of the script")]
    TruncatedPush { offset: usize },

    /// Invalid hex string.
    #[error("invalid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    /// The address string could not be decoded for the network.
    #[error("invalid address '{address}': {reason}")]
    InvalidAddress { address: String, reason: String },

    /// The address decoded but belongs to another network.
    #[error("address '{address}' is not valid on {network}")]
    WrongNetwork { address: String, network: String },

    /// A network name other than mainnet, testnet or regtest.
    #[error("unknown network '{0}'")]
    UnknownNetwork(String),

    /// The network's bech32 human-readable part is malformed.
    #[error("invalid bech32 prefix '{0}'")]
    InvalidHrp(String),

    /// Bech32 encoding failed.
    #[error("bech32 encoding failed: {0}")]
    Bech32Encode(String),

    /// Error from primitives crate.
    #[error("primitives error: {0}")]
    Primitives(#[from] dfi_primitives::PrimitivesError),
}
