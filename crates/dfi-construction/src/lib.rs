//! Rosetta-style Construction and Mempool API services for DeFiChain.
//!
//! The construction pipeline turns a list of balance-changing operations
//! into a signed, broadcastable transaction without ever holding a
//! private key:
//!
//! 1. [`ConstructionService::derive`] maps a public key to its address.
//! 2. [`ConstructionService::preprocess`] validates operations and picks
//!    the coins to spend.
//! 3. [`ConstructionService::metadata`] looks up the spent scripts and a
//!    fee (online only).
//! 4. [`ConstructionService::payloads`] builds the unsigned transaction
//!    and one BIP143 digest per input.
//! 5. [`ConstructionService::combine`] attaches caller-made signatures.
//! 6. [`ConstructionService::parse`], [`ConstructionService::hash`] and
//!    [`ConstructionService::submit`] inspect, identify and broadcast.
//!
//! Node access goes through the [`NodeClient`] and [`Indexer`] traits.

pub mod client;
pub mod coins;
pub mod config;
pub mod envelope;
pub mod error;
pub mod fee;
pub mod mempool;
pub mod operations;
pub mod service;
pub mod types;

pub use client::{Indexer, NodeClient, UpstreamError};
pub use config::{Configuration, ConfigurationError, Mode};
pub use envelope::{Envelope, SignedTransaction, UnsignedTransaction};
pub use error::{ApiError, ConstructionError, ErrorKind};
pub use mempool::MempoolService;
pub use service::ConstructionService;
