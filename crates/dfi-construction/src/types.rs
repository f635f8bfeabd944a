//! API data types: operations, coins, payloads, signatures and the
//! request/response shapes of each construction stage.
//!
//! Field names follow the Rosetta JSON conventions so the types can be
//! serialized straight onto the wire by an HTTP layer.

use serde::{Deserialize, Serialize};

use dfi_script::ScriptPubKey;

/// Serde adapter for byte fields carried as lowercase hex.
pub(crate) mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        hex::decode(s).map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Identifiers and amounts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Currency {
    pub symbol: String,
    pub decimals: u32,
}

/// A signed amount in base units, carried as a decimal string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Amount {
    pub value: String,
    pub currency: Currency,
}

impl Amount {
    pub fn new(value: i64, currency: &Currency) -> Self {
        Amount {
            value: value.to_string(),
            currency: currency.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountIdentifier {
    pub address: String,
}

impl AccountIdentifier {
    pub fn new(address: impl Into<String>) -> Self {
        AccountIdentifier {
            address: address.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionIdentifier {
    pub hash: String,
}

/// `<transaction hash>:<output index>`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CoinIdentifier {
    pub identifier: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoinAction {
    CoinCreated,
    CoinSpent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinChange {
    pub coin_identifier: CoinIdentifier,
    pub coin_action: CoinAction,
}

/// A spendable output: its identifier and amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coin {
    pub coin_identifier: CoinIdentifier,
    pub amount: Amount,
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationIdentifier {
    pub index: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_index: Option<i64>,
}

/// One typed effect of a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation {
    pub operation_identifier: OperationIdentifier,
    #[serde(rename = "type")]
    pub operation_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account: Option<AccountIdentifier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Amount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coin_change: Option<CoinChange>,
}

// ---------------------------------------------------------------------------
// Keys, payloads and signatures
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CurveType {
    Secp256k1,
    Secp256r1,
    Edwards25519,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignatureType {
    Ecdsa,
    EcdsaRecovery,
    Ed25519,
    Schnorr1,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicKey {
    #[serde(with = "hex_bytes")]
    pub hex_bytes: Vec<u8>,
    pub curve_type: CurveType,
}

/// The digest one account must sign for one input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SigningPayload {
    pub account_identifier: AccountIdentifier,
    #[serde(with = "hex_bytes")]
    pub hex_bytes: Vec<u8>,
    pub signature_type: SignatureType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    pub signing_payload: SigningPayload,
    pub public_key: PublicKey,
    pub signature_type: SignatureType,
    #[serde(with = "hex_bytes")]
    pub hex_bytes: Vec<u8>,
}

// ---------------------------------------------------------------------------
// Opaque state threaded between stages
// ---------------------------------------------------------------------------

/// Output of Preprocess, input of Metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreprocessOptions {
    pub coins: Vec<Coin>,
    pub estimated_size: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fee_multiplier: Option<f64>,
}

/// Output of Metadata, input of Payloads: one script per coin, in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstructionMetadata {
    #[serde(rename = "scriptPubKeys")]
    pub script_pub_keys: Vec<ScriptPubKey>,
}

// ---------------------------------------------------------------------------
// Stage requests and responses
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeriveResponse {
    pub account_identifier: AccountIdentifier,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreprocessRequest {
    pub operations: Vec<Operation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_fee_multiplier: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreprocessResponse {
    pub options: PreprocessOptions,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataResponse {
    pub metadata: ConstructionMetadata,
    pub suggested_fee: Vec<Amount>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayloadsRequest {
    pub operations: Vec<Operation>,
    pub metadata: ConstructionMetadata,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayloadsResponse {
    pub unsigned_transaction: String,
    pub payloads: Vec<SigningPayload>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseRequest {
    pub signed: bool,
    pub transaction: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseResponse {
    pub operations: Vec<Operation>,
    pub account_identifier_signers: Vec<AccountIdentifier>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombineRequest {
    pub unsigned_transaction: String,
    pub signatures: Vec<Signature>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombineResponse {
    pub signed_transaction: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionIdentifierResponse {
    pub transaction_identifier: TransactionIdentifier,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MempoolResponse {
    pub transaction_identifiers: Vec<TransactionIdentifier>,
}

/// A transaction rendered as operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub transaction_identifier: TransactionIdentifier,
    pub operations: Vec<Operation>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MempoolTransactionResponse {
    pub transaction: Transaction,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_json_shape() {
        let op = Operation {
            operation_identifier: OperationIdentifier {
                index: 0,
                network_index: None,
            },
            operation_type: "INPUT".to_string(),
            account: Some(AccountIdentifier::new("tf1q4mfg3kqm4c7f8j7tyy028fa4uaw7zdzyerq5qx")),
            amount: None,
            coin_change: Some(CoinChange {
                coin_identifier: CoinIdentifier {
                    identifier: "ab:0".to_string(),
                },
                coin_action: CoinAction::CoinSpent,
            }),
        };
        let json = serde_json::to_value(&op).unwrap();
        assert_eq!(json["type"], "INPUT");
        assert_eq!(json["coin_change"]["coin_action"], "coin_spent");
        assert!(json["operation_identifier"].get("network_index").is_none());
        assert!(json.get("amount").is_none());
        assert_eq!(serde_json::from_value::<Operation>(json).unwrap(), op);
    }

    #[test]
    fn test_preprocess_options_shape() {
        let options = PreprocessOptions {
            coins: vec![],
            estimated_size: 142,
            fee_multiplier: Some(0.75),
        };
        let json = serde_json::to_string(&options).unwrap();
        assert_eq!(json, r#"{"coins":[],"estimated_size":142,"fee_multiplier":0.75}"#);

        let bare: PreprocessOptions =
            serde_json::from_str(r#"{"coins":[],"estimated_size":10}"#).unwrap();
        assert_eq!(bare.fee_multiplier, None);
    }

    #[test]
    fn test_hex_bytes_fields() {
        let key = PublicKey {
            hex_bytes: vec![0x03, 0xd3],
            curve_type: CurveType::Secp256k1,
        };
        let json = serde_json::to_value(&key).unwrap();
        assert_eq!(json["hex_bytes"], "03d3");
        assert_eq!(json["curve_type"], "secp256k1");

        let bad = serde_json::json!({"hex_bytes": "0g", "curve_type": "secp256k1"});
        assert!(serde_json::from_value::<PublicKey>(bad).is_err());
    }
}
