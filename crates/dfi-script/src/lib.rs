//! DeFiChain script layer - scripts, classification and addresses.
//!
//! Provides the `Script` type with standard-template builders and
//! classification, node-compatible disassembly, per-network address
//! encoding (base58check and bech32 segwit v0), and the `ScriptPubKey`
//! description the node and indexer report for outputs.

pub mod opcodes;
pub mod chunk;
pub mod script;
pub mod address;
pub mod script_pub_key;

mod error;
pub use error::ScriptError;
pub use script::{Script, ScriptClass};
pub use address::{derive_address, Address, Network, NetworkParams};
pub use script_pub_key::{classify_script, Classification, ScriptPubKey};
