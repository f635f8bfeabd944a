//! secp256k1 key and signature helpers.
//!
//! Keys are never generated or held here: callers sign externally, so
//! this module only validates public keys and turns a detached compact
//! signature into the DER form a witness carries.

use k256::ecdsa;
use k256::elliptic_curve::sec1::ToEncodedPoint;

use crate::hash::hash160;
use crate::PrimitivesError;

/// Length of a compressed SEC1 public key.
pub const COMPRESSED_PUBLIC_KEY_LEN: usize = 33;

/// Length of a compact `r || s` signature.
pub const COMPACT_SIGNATURE_LEN: usize = 64;

/// A validated secp256k1 public key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublicKey {
    inner: k256::PublicKey,
}

impl PublicKey {
    /// Parse SEC1 bytes (compressed or uncompressed).
    ///
    /// # Returns
    /// `Ok(PublicKey)` if the bytes decode to a point on the curve.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        if bytes.is_empty() {
            return Err(PrimitivesError::InvalidPublicKey("empty key".to_string()));
        }
        let inner = k256::PublicKey::from_sec1_bytes(bytes).map_err(|_| {
            PrimitivesError::InvalidPublicKey(format!(
                "{} bytes do not encode a curve point",
                bytes.len()
            ))
        })?;
        Ok(PublicKey { inner })
    }

    /// Serialize in compressed SEC1 form.
    pub fn to_compressed(&self) -> [u8; COMPRESSED_PUBLIC_KEY_LEN] {
        let point = self.inner.to_encoded_point(true);
        let mut out = [0u8; COMPRESSED_PUBLIC_KEY_LEN];
        out.copy_from_slice(point.as_bytes());
        out
    }

    /// Hash160 of the compressed key, the witness program of a P2WPKH output.
    pub fn hash160(&self) -> [u8; 20] {
        hash160(&self.to_compressed())
    }
}

/// Convert a 64-byte compact signature into strict DER with a low S value.
///
/// # Arguments
/// * `compact` - Big-endian `r || s`, 32 bytes each.
///
/// # Returns
/// The DER encoding, or an error if either scalar is zero or out of range.
pub fn compact_to_der(compact: &[u8]) -> Result<Vec<u8>, PrimitivesError> {
    if compact.len() != COMPACT_SIGNATURE_LEN {
        return Err(PrimitivesError::InvalidSignature(format!(
            "expected {} bytes, got {}",
            COMPACT_SIGNATURE_LEN,
            compact.len()
        )));
    }
    let sig = ecdsa::Signature::from_slice(compact)
        .map_err(|e| PrimitivesError::InvalidSignature(e.to_string()))?;
    let sig = sig.normalize_s().unwrap_or(sig);
    let (r, s) = sig.split_bytes();

    let r = der_integer(&r);
    let s = der_integer(&s);
    let mut out = Vec::with_capacity(6 + r.len() + s.len());
    out.push(0x30);
    out.push((4 + r.len() + s.len()) as u8);
    out.push(0x02);
    out.push(r.len() as u8);
    out.extend_from_slice(&r);
    out.push(0x02);
    out.push(s.len() as u8);
    out.extend_from_slice(&s);
    Ok(out)
}

/// Minimal big-endian integer body: leading zeros stripped, one zero
/// re-added when the high bit would otherwise mark it negative.
fn der_integer(scalar: &[u8]) -> Vec<u8> {
    let start = scalar.iter().position(|&b| b != 0).unwrap_or(scalar.len() - 1);
    let trimmed = &scalar[start..];
    let mut out = Vec::with_capacity(trimmed.len() + 1);
    if trimmed[0] & 0x80 != 0 {
        out.push(0x00);
    }
    out.extend_from_slice(trimmed);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const PUBKEY: &str = "03d3d13e8180b10dfed0db4db9fb9013a5dcbdab64dff45d16310313c2929e71ac";

    #[test]
    fn test_public_key_roundtrip() {
        let bytes = hex::decode(PUBKEY).unwrap();
        let key = PublicKey::from_bytes(&bytes).unwrap();
        assert_eq!(key.to_compressed().to_vec(), bytes);
        assert_eq!(
            hex::encode(key.hash160()),
            "aed288d81bae3c93cbcb211ea3a7b5e75de13444"
        );
    }

    #[test]
    fn test_public_key_rejects_garbage() {
        assert!(PublicKey::from_bytes(&[]).is_err());
        assert!(PublicKey::from_bytes(&[0x02; 33]).is_err());
        let mut bytes = hex::decode(PUBKEY).unwrap();
        bytes[0] = 0x05;
        assert!(PublicKey::from_bytes(&bytes).is_err());
    }

    #[test]
    fn test_compact_to_der_known_vector() {
        let compact = hex::decode(
            "25876ec8b9f51d343a5a56ac549c0c828005ef45ebe9da166db645c09157223f\
             4cd08b7278a8889a81135915bce10d1ef3bb92b217f81a0de7e79ffb3dfd6ac5",
        )
        .unwrap();
        let der = compact_to_der(&compact).unwrap();
        assert_eq!(
            hex::encode(der),
            "3044022025876ec8b9f51d343a5a56ac549c0c828005ef45ebe9da166db645c09157223f\
             02204cd08b7278a8889a81135915bce10d1ef3bb92b217f81a0de7e79ffb3dfd6ac5"
        );
    }

    #[test]
    fn test_compact_to_der_pads_high_r_and_lowers_s() {
        let mut compact = [0u8; 64];
        compact[0] = 0x80;
        compact[31] = 0x01;
        // s = n - 1, which must be flipped to 1.
        compact[32..].copy_from_slice(
            &hex::decode("fffffffffffffffffffffffffffffffebaaedce6af48a03bbfd25e8cd0364140")
                .unwrap(),
        );
        let der = compact_to_der(&compact).unwrap();
        assert_eq!(der[3], 33, "high-bit R gets a zero pad");
        assert_eq!(der[4], 0x00);
        assert_eq!(&der[der.len() - 3..], &[0x02, 0x01, 0x01]);
    }

    #[test]
    fn test_compact_to_der_rejects_zero_and_length() {
        assert!(compact_to_der(&[0u8; 64]).is_err());
        assert!(compact_to_der(&[1u8; 63]).is_err());
    }
}
