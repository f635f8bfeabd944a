/// DeFiChain transaction codec - segwit serialization and signature hashing.
///
/// Provides the Transaction type with inputs, outputs and witnesses,
/// strict binary/hex decoding, txid/wtxid and size measures, and the
/// BIP143 signature hash used to sign segwit v0 inputs.

pub mod transaction;
pub mod input;
pub mod output;
pub mod sighash;

mod error;
pub use error::TransactionError;
pub use transaction::Transaction;
pub use input::{OutPoint, TransactionInput, Witness, DEFAULT_SEQUENCE_NUMBER};
pub use output::TransactionOutput;
