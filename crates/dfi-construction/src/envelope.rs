//! Opaque transaction blobs handed to callers between stages.
//!
//! An envelope is JSON carrying the raw transaction plus the context the
//! next stage needs, hex-encoded so it survives any transport unchanged.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use dfi_script::ScriptPubKey;
use dfi_transaction::Transaction;

use crate::error::ConstructionError;
use crate::operations::parse_value;

/// Hex-of-JSON encoding shared by both envelopes.
pub trait Envelope: Serialize + DeserializeOwned {
    fn encode(&self) -> Result<String, ConstructionError> {
        serde_json::to_vec(self)
            .map(hex::encode)
            .map_err(|e| ConstructionError::InvalidEnvelope(e.to_string()))
    }

    fn decode(encoded: &str) -> Result<Self, ConstructionError> {
        let bytes = hex::decode(encoded)
            .map_err(|e| ConstructionError::InvalidEnvelope(format!("invalid hex: {e}")))?;
        serde_json::from_slice(&bytes).map_err(|e| ConstructionError::InvalidEnvelope(e.to_string()))
    }
}

/// Output of Payloads, input of Parse and Combine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnsignedTransaction {
    pub transaction: String,
    #[serde(rename = "scriptPubKeys")]
    pub script_pub_keys: Vec<ScriptPubKey>,
    pub input_amounts: Vec<String>,
    pub input_addresses: Vec<String>,
}

impl Envelope for UnsignedTransaction {}

impl UnsignedTransaction {
    /// Decode the carried transaction, checking the per-input context
    /// lines up with its inputs.
    pub fn decode_transaction(&self) -> Result<Transaction, ConstructionError> {
        let tx = Transaction::from_hex(&self.transaction)?;
        let inputs = tx.inputs.len();
        if self.script_pub_keys.len() != inputs
            || self.input_amounts.len() != inputs
            || self.input_addresses.len() != inputs
        {
            return Err(ConstructionError::InvalidEnvelope(format!(
                "context for {} scripts, {} amounts and {} addresses does not match {} inputs",
                self.script_pub_keys.len(),
                self.input_amounts.len(),
                self.input_addresses.len(),
                inputs
            )));
        }
        Ok(tx)
    }

    pub fn amounts(&self) -> Result<Vec<i64>, ConstructionError> {
        self.input_amounts.iter().map(|a| parse_value(a)).collect()
    }
}

/// Output of Combine, input of Parse, Hash and Submit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedTransaction {
    pub transaction: String,
    pub input_amounts: Vec<String>,
}

impl Envelope for SignedTransaction {}

impl SignedTransaction {
    pub fn decode_transaction(&self) -> Result<Transaction, ConstructionError> {
        let tx = Transaction::from_hex(&self.transaction)?;
        if self.input_amounts.len() != tx.inputs.len() {
            return Err(ConstructionError::InvalidEnvelope(format!(
                "{} amounts for {} inputs",
                self.input_amounts.len(),
                tx.inputs.len()
            )));
        }
        Ok(tx)
    }

    pub fn amounts(&self) -> Result<Vec<i64>, ConstructionError> {
        self.input_amounts.iter().map(|a| parse_value(a)).collect()
    }
}
