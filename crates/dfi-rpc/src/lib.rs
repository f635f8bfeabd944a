#![deny(missing_docs)]

//! # dfi-rpc
//!
//! JSON-RPC client for a DeFiChain node. [`RpcClient`] implements both
//! [`NodeClient`](dfi_construction::NodeClient) and
//! [`Indexer`](dfi_construction::Indexer), so one node can back the whole
//! construction pipeline.
//!
//! # Example
//!
//! ```no_run
//! use dfi_rpc::{RpcClient, RpcConfig};
//!
//! let client = RpcClient::new(RpcConfig {
//!     url: "http://127.0.0.1:18554".to_string(),
//!     username: "rpcuser".to_string(),
//!     password: "rpcpassword".to_string(),
//!     ..Default::default()
//! })
//! .unwrap();
//! ```

pub mod client;
pub mod error;
pub mod types;


pub use client::RpcClient;
pub use error::RpcError;
pub use types::RpcConfig;
