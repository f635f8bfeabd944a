//! DeFiChain primitives - hashing, chain hashes, wire encoding and keys.
//!
//! This crate provides the foundational building blocks shared by the
//! script, transaction and construction layers:
//! - Hash functions (SHA-256, SHA-256d, RIPEMD-160, Hash160)
//! - Chain hash type for transaction identification
//! - Consensus wire encoding (VarInt, little-endian reader/writer)
//! - secp256k1 public key validation and signature normalization

pub mod hash;
pub mod chainhash;
pub mod wire;
pub mod ec;

mod error;
pub use error::PrimitivesError;
