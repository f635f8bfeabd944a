//! Chain hash type for transaction identification.
//!
//! Provides a `Hash` type: a 32-byte array stored in internal byte order
//! and displayed as byte-reversed hex, matching the node's convention for
//! transaction IDs and block hashes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::hash::sha256d;
use crate::PrimitivesError;

/// Size of a Hash in bytes.
pub const HASH_SIZE: usize = 32;

/// A 32-byte double-SHA256 digest used as a transaction identifier.
///
/// When displayed as a string, the bytes are reversed (little-endian
/// internal, big-endian display).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Hash([u8; HASH_SIZE]);

impl Hash {
    /// Create a Hash from 32 bytes in internal byte order.
    pub fn new(bytes: [u8; HASH_SIZE]) -> Self {
        Hash(bytes)
    }

    /// Compute the double-SHA256 of `data` as a `Hash`.
    pub fn double_sha256(data: &[u8]) -> Self {
        Hash(sha256d(data))
    }

    /// Create a Hash from a byte slice in internal byte order.
    ///
    /// # Returns
    /// `Ok(Hash)` if the slice is exactly 32 bytes, or an error otherwise.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        let arr: [u8; HASH_SIZE] = bytes.try_into().map_err(|_| {
            PrimitivesError::InvalidHash(format!(
                "invalid hash length of {}, want {}",
                bytes.len(),
                HASH_SIZE
            ))
        })?;
        Ok(Hash(arr))
    }

    /// Parse a display-order (byte-reversed) hex string.
    ///
    /// Unlike the node's lenient parser, the string must be exactly 64 hex
    /// characters; shorter strings are not zero-padded.
    pub fn from_hex(hex_str: &str) -> Result<Self, PrimitivesError> {
        if hex_str.len() != HASH_SIZE * 2 {
            return Err(PrimitivesError::InvalidHash(format!(
                "hash string must be {} characters, got {}",
                HASH_SIZE * 2,
                hex_str.len()
            )));
        }
        let mut bytes = [0u8; HASH_SIZE];
        hex::decode_to_slice(hex_str, &mut bytes)?;
        bytes.reverse();
        Ok(Hash(bytes))
    }

    /// Borrow the internal-order bytes.
    pub fn as_bytes(&self) -> &[u8; HASH_SIZE] {
        &self.0
    }

    /// Return the display-order hex string.
    pub fn to_hex(&self) -> String {
        let mut reversed = self.0;
        reversed.reverse();
        hex::encode(reversed)
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash({})", self.to_hex())
    }
}

impl FromStr for Hash {
    type Err = PrimitivesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Hash::from_hex(s)
    }
}

impl Serialize for Hash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Hash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Hash::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TXID: &str = "d435e59999faffb36890651bd0cfd9795bb06bfe96d5ce62f1acd9cc1ce12a37";

    #[test]
    fn test_display_is_reversed() {
        let hash = Hash::from_hex(TXID).unwrap();
        assert_eq!(hash.as_bytes()[0], 0x37);
        assert_eq!(hash.as_bytes()[31], 0xd4);
        assert_eq!(hash.to_string(), TXID);
    }

    #[test]
    fn test_from_hex_rejects_short_strings() {
        assert!(Hash::from_hex("d435").is_err());
        assert!(Hash::from_hex("").is_err());
    }

    #[test]
    fn test_from_hex_rejects_non_hex() {
        let bad = "z".repeat(64);
        assert!(matches!(
            Hash::from_hex(&bad),
            Err(PrimitivesError::InvalidHex(_))
        ));
    }

    #[test]
    fn test_from_slice_length() {
        assert!(Hash::from_slice(&[0u8; 31]).is_err());
        assert_eq!(Hash::from_slice(&[7u8; 32]).unwrap(), Hash::new([7u8; 32]));
    }

    #[test]
    fn test_serde_uses_display_hex() {
        let hash: Hash = TXID.parse().unwrap();
        let json = serde_json::to_string(&hash).unwrap();
        assert_eq!(json, format!("\"{TXID}\""));
        let back: Hash = serde_json::from_str(&json).unwrap();
        assert_eq!(back, hash);
    }
}
