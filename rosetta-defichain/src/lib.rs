#![deny(missing_docs)]

//! Rosetta-style Construction API for DeFiChain.
//!
//! Re-exports every layer for single-crate usage.

pub use dfi_construction as construction;
pub use dfi_primitives as primitives;
pub use dfi_rpc as rpc;
pub use dfi_script as script;
pub use dfi_transaction as transaction;
