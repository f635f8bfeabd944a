//! Script type - a sequence of opcodes and data pushes.
//!
//! Provides builders for the standard output templates, classification
//! into the node's script types, and node-compatible disassembly.

use std::fmt;

use crate::chunk::{decode_script, encode_push, read_chunk, ScriptChunk};
use crate::opcodes::*;
use crate::ScriptError;

/// Standard script templates, named the way the node reports them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScriptClass {
    PubKeyHash,
    ScriptHash,
    WitnessV0KeyHash,
    WitnessV0ScriptHash,
    PubKey,
    MultiSig,
    NullData,
    WitnessUnknown,
    NonStandard,
}

impl ScriptClass {
    /// The node's type tag for this class.
    pub fn as_str(&self) -> &'static str {
        match self {
            ScriptClass::PubKeyHash => "pubkeyhash",
            ScriptClass::ScriptHash => "scripthash",
            ScriptClass::WitnessV0KeyHash => "witness_v0_keyhash",
            ScriptClass::WitnessV0ScriptHash => "witness_v0_scripthash",
            ScriptClass::PubKey => "pubkey",
            ScriptClass::MultiSig => "multisig",
            ScriptClass::NullData => "nulldata",
            ScriptClass::WitnessUnknown => "witness_unknown",
            ScriptClass::NonStandard => "nonstandard",
        }
    }

    /// Parse a node type tag; unknown tags map to `NonStandard`.
    pub fn from_type_tag(tag: &str) -> Self {
        match tag {
            "pubkeyhash" => ScriptClass::PubKeyHash,
            "scripthash" => ScriptClass::ScriptHash,
            "witness_v0_keyhash" => ScriptClass::WitnessV0KeyHash,
            "witness_v0_scripthash" => ScriptClass::WitnessV0ScriptHash,
            "pubkey" => ScriptClass::PubKey,
            "multisig" => ScriptClass::MultiSig,
            "nulldata" => ScriptClass::NullData,
            "witness_unknown" => ScriptClass::WitnessUnknown,
            _ => ScriptClass::NonStandard,
        }
    }
}

impl fmt::Display for ScriptClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A script, represented as a byte vector newtype.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct Script(Vec<u8>);

impl Script {
    // -----------------------------------------------------------------------
    // Constructors
    // -----------------------------------------------------------------------

    pub fn new() -> Self {
        Script(Vec::new())
    }

    pub fn from_bytes(bytes: &[u8]) -> Self {
        Script(bytes.to_vec())
    }

    pub fn from_hex(hex_str: &str) -> Result<Self, ScriptError> {
        Ok(Script(hex::decode(hex_str)?))
    }

    /// `OP_DUP OP_HASH160 <hash> OP_EQUALVERIFY OP_CHECKSIG`
    pub fn new_p2pkh(hash: &[u8; 20]) -> Self {
        let mut b = Vec::with_capacity(25);
        b.extend_from_slice(&[OP_DUP, OP_HASH160, OP_DATA_20]);
        b.extend_from_slice(hash);
        b.extend_from_slice(&[OP_EQUALVERIFY, OP_CHECKSIG]);
        Script(b)
    }

    /// `OP_HASH160 <hash> OP_EQUAL`
    pub fn new_p2sh(hash: &[u8; 20]) -> Self {
        let mut b = Vec::with_capacity(23);
        b.extend_from_slice(&[OP_HASH160, OP_DATA_20]);
        b.extend_from_slice(hash);
        b.push(OP_EQUAL);
        Script(b)
    }

    /// `OP_0 <20-byte key hash>`
    pub fn new_p2wpkh(hash: &[u8; 20]) -> Self {
        Self::new_witness_program(0, hash)
    }

    /// `OP_0 <32-byte script hash>`
    pub fn new_p2wsh(hash: &[u8; 32]) -> Self {
        Self::new_witness_program(0, hash)
    }

    /// `OP_n <program>` for witness version `n` (0-16).
    pub fn new_witness_program(version: u8, program: &[u8]) -> Self {
        let version_op = if version == 0 { OP_0 } else { OP_1 + version - 1 };
        let mut b = Vec::with_capacity(program.len() + 2);
        b.push(version_op);
        b.extend_from_slice(&encode_push(program));
        Script(b)
    }

    /// Build a script from a sequence of pushes.
    pub fn from_pushes<'a>(pushes: impl IntoIterator<Item = &'a [u8]>) -> Self {
        let mut b = Vec::new();
        for data in pushes {
            b.extend_from_slice(&encode_push(data));
        }
        Script(b)
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn chunks(&self) -> Result<Vec<ScriptChunk>, ScriptError> {
        decode_script(&self.0)
    }

    /// Disassemble the script the way the node's `asm` field renders it.
    ///
    /// Pushes of up to four bytes print as script numbers, longer pushes as
    /// hex, other opcodes by name. A truncated push ends the output with
    /// `[error]`.
    pub fn to_asm(&self) -> String {
        let mut parts = Vec::new();
        let mut pos = 0;
        while pos < self.0.len() {
            match read_chunk(&self.0, &mut pos) {
                Ok(chunk) => parts.push(match chunk.data {
                    Some(data) if data.len() <= 4 => script_num(&data).to_string(),
                    Some(data) => hex::encode(data),
                    None => opcode_name(chunk.op),
                }),
                Err(_) => {
                    parts.push("[error]".to_string());
                    break;
                }
            }
        }
        parts.join(" ")
    }

    // -----------------------------------------------------------------------
    // Classification
    // -----------------------------------------------------------------------

    /// Match the P2PKH template, returning the key hash.
    pub fn p2pkh_hash(&self) -> Option<[u8; 20]> {
        let b = &self.0;
        let matches = b.len() == 25
            && b[0] == OP_DUP
            && b[1] == OP_HASH160
            && b[2] == OP_DATA_20
            && b[23] == OP_EQUALVERIFY
            && b[24] == OP_CHECKSIG;
        matches.then(|| to_array(&b[3..23]))
    }

    /// Match the P2SH template, returning the script hash.
    pub fn p2sh_hash(&self) -> Option<[u8; 20]> {
        let b = &self.0;
        let matches = b.len() == 23 && b[0] == OP_HASH160 && b[1] == OP_DATA_20 && b[22] == OP_EQUAL;
        matches.then(|| to_array(&b[2..22]))
    }

    /// Split a witness program into `(version, program)`.
    ///
    /// A witness program is a version opcode followed by a single direct
    /// push of 2 to 40 bytes, and nothing else.
    pub fn witness_program(&self) -> Option<(u8, &[u8])> {
        let b = &self.0;
        if b.len() < 4 || b.len() > 42 {
            return None;
        }
        let version = small_int_value(b[0])?;
        if b[1] as usize + 2 != b.len() {
            return None;
        }
        Some((version, &b[2..]))
    }

    /// Match the P2PK template, returning the public key bytes.
    pub fn p2pk_key(&self) -> Option<&[u8]> {
        let b = &self.0;
        let key = match b.len() {
            35 if b[0] == OP_DATA_33 => &b[1..34],
            67 if b[0] == OP_DATA_65 => &b[1..66],
            _ => return None,
        };
        (b[b.len() - 1] == OP_CHECKSIG && is_public_key_shape(key)).then_some(key)
    }

    /// Match bare `m-of-n` multisig, returning `m` and the keys.
    pub fn multisig(&self) -> Option<(u8, Vec<Vec<u8>>)> {
        let chunks = self.chunks().ok()?;
        if chunks.len() < 4 || chunks.last()?.op != OP_CHECKMULTISIG {
            return None;
        }
        let required = small_int_value(chunks[0].op).filter(|&m| m >= 1)?;
        let total = small_int_value(chunks[chunks.len() - 2].op)?;
        let keys: Vec<Vec<u8>> = chunks[1..chunks.len() - 2]
            .iter()
            .map(|c| match (&c.data, c.op) {
                (Some(d), op) if op != OP_0 && is_public_key_shape(d) => Some(d.clone()),
                _ => None,
            })
            .collect::<Option<_>>()?;
        (keys.len() == total as usize && required <= total).then_some((required, keys))
    }

    /// True if every chunk is a push (OP_0..OP_16, OP_1NEGATE included).
    pub fn is_push_only(&self) -> bool {
        match self.chunks() {
            Ok(chunks) => chunks
                .iter()
                .all(|c| c.op <= OP_16 && c.op != OP_RESERVED),
            Err(_) => false,
        }
    }

    /// True for `OP_RETURN` followed only by pushes.
    pub fn is_null_data(&self) -> bool {
        self.0.first() == Some(&OP_RETURN) && Script::from_bytes(&self.0[1..]).is_push_only()
    }

    /// Classify the script into one of the standard templates.
    pub fn classify(&self) -> ScriptClass {
        if self.p2sh_hash().is_some() {
            return ScriptClass::ScriptHash;
        }
        if let Some((version, program)) = self.witness_program() {
            return match (version, program.len()) {
                (0, 20) => ScriptClass::WitnessV0KeyHash,
                (0, 32) => ScriptClass::WitnessV0ScriptHash,
                (0, _) => ScriptClass::NonStandard,
                _ => ScriptClass::WitnessUnknown,
            };
        }
        if self.is_null_data() {
            return ScriptClass::NullData;
        }
        if self.p2pk_key().is_some() {
            return ScriptClass::PubKey;
        }
        if self.p2pkh_hash().is_some() {
            return ScriptClass::PubKeyHash;
        }
        if self.multisig().is_some() {
            return ScriptClass::MultiSig;
        }
        ScriptClass::NonStandard
    }
}

/// Decode a minimally-sized script number of up to four bytes.
fn script_num(data: &[u8]) -> i64 {
    let Some((&last, _)) = data.split_last() else {
        return 0;
    };
    let mut value = data
        .iter()
        .enumerate()
        .fold(0i64, |acc, (i, &b)| acc | (b as i64) << (8 * i));
    if last & 0x80 != 0 {
        value &= !(0x80i64 << (8 * (data.len() - 1)));
        value = -value;
    }
    value
}

fn is_public_key_shape(key: &[u8]) -> bool {
    match key.len() {
        33 => key[0] == 0x02 || key[0] == 0x03,
        65 => key[0] == 0x04,
        _ => false,
    }
}

fn to_array<const N: usize>(bytes: &[u8]) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(bytes);
    out
}

impl fmt::Display for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Script({})", self.to_hex())
    }
}

impl serde::Serialize for Script {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> serde::Deserialize<'de> for Script {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Script::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY_HASH: &str = "aed288d81bae3c93cbcb211ea3a7b5e75de13444";
    const PUBKEY: &str = "03d3d13e8180b10dfed0db4db9fb9013a5dcbdab64dff45d16310313c2929e71ac";

    fn key_hash() -> [u8; 20] {
        to_array(&hex::decode(KEY_HASH).unwrap())
    }

    #[test]
    fn test_builders() {
        let hash = key_hash();
        assert_eq!(Script::new_p2wpkh(&hash).to_hex(), format!("0014{KEY_HASH}"));
        assert_eq!(Script::new_p2pkh(&hash).to_hex(), format!("76a914{KEY_HASH}88ac"));
        assert_eq!(Script::new_p2sh(&hash).to_hex(), format!("a914{KEY_HASH}87"));
        assert_eq!(Script::new_p2wsh(&[0u8; 32]).len(), 34);
        assert_eq!(Script::new_witness_program(1, &[1u8; 32]).as_bytes()[0], OP_1);
    }

    #[test]
    fn test_classification() {
        let hash = key_hash();
        assert_eq!(Script::new_p2wpkh(&hash).classify(), ScriptClass::WitnessV0KeyHash);
        assert_eq!(Script::new_p2wsh(&[9u8; 32]).classify(), ScriptClass::WitnessV0ScriptHash);
        assert_eq!(Script::new_p2pkh(&hash).classify(), ScriptClass::PubKeyHash);
        assert_eq!(Script::new_p2sh(&hash).classify(), ScriptClass::ScriptHash);
        assert_eq!(
            Script::new_witness_program(1, &[1u8; 32]).classify(),
            ScriptClass::WitnessUnknown
        );
        assert_eq!(
            Script::new_witness_program(0, &[1u8; 25]).classify(),
            ScriptClass::NonStandard
        );

        let pubkey = hex::decode(PUBKEY).unwrap();
        let mut p2pk = encode_push(&pubkey);
        p2pk.push(OP_CHECKSIG);
        assert_eq!(Script::from_bytes(&p2pk).classify(), ScriptClass::PubKey);

        let null_data = Script::from_bytes(&[OP_RETURN, 0x02, 0xde, 0xad]);
        assert_eq!(null_data.classify(), ScriptClass::NullData);

        assert_eq!(Script::from_bytes(&[OP_DUP, OP_DUP]).classify(), ScriptClass::NonStandard);
        assert_eq!(Script::new().classify(), ScriptClass::NonStandard);
    }

    #[test]
    fn test_multisig_classification() {
        let pubkey = hex::decode(PUBKEY).unwrap();
        let mut b = vec![OP_1];
        b.extend_from_slice(&encode_push(&pubkey));
        b.extend_from_slice(&encode_push(&pubkey));
        b.extend_from_slice(&[OP_1 + 1, OP_CHECKMULTISIG]);
        let script = Script::from_bytes(&b);
        assert_eq!(script.classify(), ScriptClass::MultiSig);
        let (m, keys) = script.multisig().unwrap();
        assert_eq!(m, 1);
        assert_eq!(keys.len(), 2);

        // Declared key count disagrees with the keys present.
        let last = b.len() - 2;
        b[last] = OP_1 + 2;
        assert_eq!(Script::from_bytes(&b).classify(), ScriptClass::NonStandard);
    }

    #[test]
    fn test_asm_matches_node_format() {
        let script = Script::new_p2wpkh(&key_hash());
        assert_eq!(script.to_asm(), format!("0 {KEY_HASH}"));

        let script = Script::new_p2pkh(&key_hash());
        assert_eq!(
            script.to_asm(),
            format!("OP_DUP OP_HASH160 {KEY_HASH} OP_EQUALVERIFY OP_CHECKSIG")
        );

        // Short pushes render as script numbers, including negatives.
        let script = Script::from_bytes(&[0x02, 0xe8, 0x03, 0x01, 0x81, OP_1NEGATE, 0x53]);
        assert_eq!(script.to_asm(), "1000 -1 -1 3");

        let truncated = Script::from_bytes(&[OP_DUP, 0x05, 0x01]);
        assert_eq!(truncated.to_asm(), "OP_DUP [error]");
    }

    #[test]
    fn test_type_tags_roundtrip() {
        for class in [
            ScriptClass::PubKeyHash,
            ScriptClass::ScriptHash,
            ScriptClass::WitnessV0KeyHash,
            ScriptClass::WitnessV0ScriptHash,
            ScriptClass::PubKey,
            ScriptClass::MultiSig,
            ScriptClass::NullData,
            ScriptClass::WitnessUnknown,
            ScriptClass::NonStandard,
        ] {
            assert_eq!(ScriptClass::from_type_tag(class.as_str()), class);
        }
        assert_eq!(ScriptClass::from_type_tag("bogus"), ScriptClass::NonStandard);
    }
}
