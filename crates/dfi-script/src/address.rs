//! Per-network address encoding.
//!
//! Legacy addresses use base58check with a one-byte version prefix;
//! segwit v0 addresses use bech32 with the network's human-readable part.

use std::fmt;
use std::str::FromStr;

use bech32::{segwit, Fe32, Hrp};
use dfi_primitives::ec::PublicKey;
use dfi_primitives::hash::sha256d;

use crate::script::Script;
use crate::ScriptError;

/// Address prefixes and identifiers of a chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NetworkParams {
    pub name: &'static str,
    pub bech32_hrp: &'static str,
    pub pubkey_hash_addr_id: u8,
    pub script_hash_addr_id: u8,
}

pub const MAINNET_PARAMS: NetworkParams = NetworkParams {
    name: "mainnet",
    bech32_hrp: "df",
    pubkey_hash_addr_id: 0x12,
    script_hash_addr_id: 0x5a,
};

pub const TESTNET_PARAMS: NetworkParams = NetworkParams {
    name: "testnet",
    bech32_hrp: "tf",
    pubkey_hash_addr_id: 0x0f,
    script_hash_addr_id: 0x80,
};

pub const REGTEST_PARAMS: NetworkParams = NetworkParams {
    name: "regtest",
    bech32_hrp: "bcrt",
    pubkey_hash_addr_id: 0x6f,
    script_hash_addr_id: 0xc4,
};

/// The chains the service can be configured for.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Mainnet,
    #[default]
    Testnet,
    Regtest,
}

impl Network {
    pub fn params(&self) -> &'static NetworkParams {
        match self {
            Network::Mainnet => &MAINNET_PARAMS,
            Network::Testnet => &TESTNET_PARAMS,
            Network::Regtest => &REGTEST_PARAMS,
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.params().name)
    }
}

impl FromStr for Network {
    type Err = ScriptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mainnet" | "main" => Ok(Network::Mainnet),
            "testnet" | "test" => Ok(Network::Testnet),
            "regtest" => Ok(Network::Regtest),
            _ => Err(ScriptError::UnknownNetwork(s.to_string())),
        }
    }
}

/// A decoded address.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Address {
    PubKeyHash([u8; 20]),
    ScriptHash([u8; 20]),
    WitnessPubKeyHash([u8; 20]),
    WitnessScriptHash([u8; 32]),
}

impl Address {
    /// Native segwit v0 key-hash address of a public key.
    pub fn from_public_key(key: &PublicKey) -> Self {
        Address::WitnessPubKeyHash(key.hash160())
    }

    /// Decode an address string, accepting only the given network's
    /// prefixes.
    pub fn decode(s: &str, params: &NetworkParams) -> Result<Self, ScriptError> {
        if let Ok((hrp, version, program)) = segwit::decode(s) {
            if !hrp.to_string().eq_ignore_ascii_case(params.bech32_hrp) {
                return Err(ScriptError::WrongNetwork {
                    address: s.to_string(),
                    network: params.name.to_string(),
                });
            }
            return Self::from_witness_program(s, version.to_u8(), &program);
        }
        Self::decode_base58(s, params)
    }

    fn from_witness_program(s: &str, version: u8, program: &[u8]) -> Result<Self, ScriptError> {
        let invalid = |reason: &str| ScriptError::InvalidAddress {
            address: s.to_string(),
            reason: reason.to_string(),
        };
        if version != 0 {
            return Err(invalid("unsupported witness version"));
        }
        match program.len() {
            20 => Ok(Address::WitnessPubKeyHash(to_array(program))),
            32 => Ok(Address::WitnessScriptHash(to_array(program))),
            _ => Err(invalid("bad witness program length")),
        }
    }

    fn decode_base58(s: &str, params: &NetworkParams) -> Result<Self, ScriptError> {
        let invalid = |reason: &str| ScriptError::InvalidAddress {
            address: s.to_string(),
            reason: reason.to_string(),
        };
        let decoded = bs58::decode(s)
            .into_vec()
            .map_err(|_| invalid("not bech32 or base58"))?;
        if decoded.len() != 25 {
            return Err(invalid("bad payload length"));
        }
        let (payload, checksum) = decoded.split_at(21);
        if sha256d(payload)[..4] != *checksum {
            return Err(invalid("checksum mismatch"));
        }
        let hash = to_array(&payload[1..]);
        match payload[0] {
            v if v == params.pubkey_hash_addr_id => Ok(Address::PubKeyHash(hash)),
            v if v == params.script_hash_addr_id => Ok(Address::ScriptHash(hash)),
            _ => Err(ScriptError::WrongNetwork {
                address: s.to_string(),
                network: params.name.to_string(),
            }),
        }
    }

    /// Render the address with the given network's prefixes.
    pub fn encode(&self, params: &NetworkParams) -> Result<String, ScriptError> {
        match self {
            Address::PubKeyHash(h) => Ok(encode_base58check(params.pubkey_hash_addr_id, h)),
            Address::ScriptHash(h) => Ok(encode_base58check(params.script_hash_addr_id, h)),
            Address::WitnessPubKeyHash(h) => encode_segwit_v0(params, h),
            Address::WitnessScriptHash(h) => encode_segwit_v0(params, h),
        }
    }

    /// The output script paying to this address.
    pub fn script_pubkey(&self) -> Script {
        match self {
            Address::PubKeyHash(h) => Script::new_p2pkh(h),
            Address::ScriptHash(h) => Script::new_p2sh(h),
            Address::WitnessPubKeyHash(h) => Script::new_p2wpkh(h),
            Address::WitnessScriptHash(h) => Script::new_p2wsh(h),
        }
    }

    /// Recover the address an output script pays to, for the templates that
    /// have one.
    pub fn from_script(script: &Script) -> Option<Self> {
        if let Some(h) = script.p2pkh_hash() {
            return Some(Address::PubKeyHash(h));
        }
        if let Some(h) = script.p2sh_hash() {
            return Some(Address::ScriptHash(h));
        }
        match script.witness_program()? {
            (0, p) if p.len() == 20 => Some(Address::WitnessPubKeyHash(to_array(p))),
            (0, p) if p.len() == 32 => Some(Address::WitnessScriptHash(to_array(p))),
            _ => None,
        }
    }

    pub fn is_witness(&self) -> bool {
        matches!(self, Address::WitnessPubKeyHash(_) | Address::WitnessScriptHash(_))
    }
}

/// Derive the native segwit address for a serialized secp256k1 public key.
///
/// Uncompressed keys are accepted and compressed before hashing.
pub fn derive_address(public_key: &[u8], params: &NetworkParams) -> Result<String, ScriptError> {
    let key = PublicKey::from_bytes(public_key)?;
    Address::from_public_key(&key).encode(params)
}

fn encode_base58check(version: u8, hash: &[u8; 20]) -> String {
    let mut payload = Vec::with_capacity(25);
    payload.push(version);
    payload.extend_from_slice(hash);
    let checksum = sha256d(&payload);
    payload.extend_from_slice(&checksum[..4]);
    bs58::encode(payload).into_string()
}

fn encode_segwit_v0(params: &NetworkParams, program: &[u8]) -> Result<String, ScriptError> {
    let hrp = Hrp::parse(params.bech32_hrp)
        .map_err(|_| ScriptError::InvalidHrp(params.bech32_hrp.to_string()))?;
    let version: Fe32 = segwit::VERSION_0;
    segwit::encode(hrp, version, program).map_err(|e| ScriptError::Bech32Encode(e.to_string()))
}

fn to_array<const N: usize>(bytes: &[u8]) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(bytes);
    out
}
