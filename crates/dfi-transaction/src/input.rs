//! Transaction input referencing a previous output.
//!
//! An input names the output it spends by outpoint, carries a scriptSig
//! and sequence number, and, for segwit spends, a witness stack that is
//! serialized separately from the base transaction.

use std::fmt;
use std::str::FromStr;

use dfi_primitives::chainhash::Hash;
use dfi_primitives::wire::{VarInt, WireReader, WireWriter};
use dfi_script::Script;

use crate::TransactionError;

/// Default sequence number indicating a finalized input (no relative lock-time).
pub const DEFAULT_SEQUENCE_NUMBER: u32 = 0xFFFF_FFFF;

/// Reference to a previous transaction output.
///
/// The string form `<txid>:<index>` doubles as the coin identifier used by
/// the construction API.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct OutPoint {
    /// Transaction ID of the output being spent.
    pub hash: Hash,
    /// Output index within that transaction.
    pub index: u32,
}

impl OutPoint {
    pub fn new(hash: Hash, index: u32) -> Self {
        OutPoint { hash, index }
    }

    pub(crate) fn read_from(reader: &mut WireReader) -> Result<Self, TransactionError> {
        let hash = reader
            .read_array::<32>()
            .map_err(|e| TransactionError::decoding("reading outpoint hash", e))?;
        let index = reader
            .read_u32_le()
            .map_err(|e| TransactionError::decoding("reading outpoint index", e))?;
        Ok(OutPoint {
            hash: Hash::new(hash),
            index,
        })
    }

    pub(crate) fn write_to(&self, writer: &mut WireWriter) {
        writer.write_bytes(self.hash.as_bytes());
        writer.write_u32_le(self.index);
    }
}

impl fmt::Display for OutPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.hash, self.index)
    }
}

impl FromStr for OutPoint {
    type Err = TransactionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || TransactionError::InvalidOutPoint(s.to_string());
        let (hash, index) = s.split_once(':').ok_or_else(invalid)?;
        let hash = Hash::from_hex(hash).map_err(|_| invalid())?;
        if index.is_empty() || !index.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let index = index.parse::<u32>().map_err(|_| invalid())?;
        Ok(OutPoint { hash, index })
    }
}

/// The witness stack of one input.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Witness(pub Vec<Vec<u8>>);

impl Witness {
    pub fn new() -> Self {
        Witness(Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn items(&self) -> &[Vec<u8>] {
        &self.0
    }

    pub fn last(&self) -> Option<&[u8]> {
        self.0.last().map(Vec::as_slice)
    }

    pub fn push(&mut self, item: impl Into<Vec<u8>>) {
        self.0.push(item.into());
    }

    pub(crate) fn read_from(reader: &mut WireReader) -> Result<Self, TransactionError> {
        let count = reader
            .read_count(1)
            .map_err(|e| TransactionError::decoding("reading witness item count", e))?;
        let mut items = Vec::with_capacity(count);
        for _ in 0..count {
            let item = reader
                .read_var_bytes()
                .map_err(|e| TransactionError::decoding("reading witness item", e))?;
            items.push(item.to_vec());
        }
        Ok(Witness(items))
    }

    pub(crate) fn write_to(&self, writer: &mut WireWriter) {
        writer.write_varint(VarInt::from(self.0.len()));
        for item in &self.0 {
            writer.write_var_bytes(item);
        }
    }
}

/// A single input in a transaction.
///
/// # Wire format (base)
///
/// | Field           | Size           |
/// |-----------------|----------------|
/// | previous hash   | 32 bytes (LE)  |
/// | previous index  | 4 bytes (LE)   |
/// | script length   | VarInt         |
/// | script_sig      | variable       |
/// | sequence        | 4 bytes (LE)   |
///
/// The witness is not part of the base encoding; the transaction writes
/// all witnesses after the outputs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionInput {
    pub previous_outpoint: OutPoint,
    /// The unlocking script. Empty for native segwit spends.
    pub script_sig: Script,
    /// Sequence number. Defaults to `0xFFFFFFFF` (finalized).
    pub sequence: u32,
    pub witness: Witness,
}

impl TransactionInput {
    /// Create an unsigned input spending `previous_outpoint`.
    pub fn new(previous_outpoint: OutPoint) -> Self {
        TransactionInput {
            previous_outpoint,
            script_sig: Script::new(),
            sequence: DEFAULT_SEQUENCE_NUMBER,
            witness: Witness::new(),
        }
    }

    /// Deserialize the base fields of an input. The witness is left empty.
    pub fn read_from(reader: &mut WireReader) -> Result<Self, TransactionError> {
        let previous_outpoint = OutPoint::read_from(reader)?;
        let script_sig = reader
            .read_var_bytes()
            .map_err(|e| TransactionError::decoding("reading script_sig", e))?;
        let sequence = reader
            .read_u32_le()
            .map_err(|e| TransactionError::decoding("reading sequence", e))?;
        Ok(TransactionInput {
            previous_outpoint,
            script_sig: Script::from_bytes(script_sig),
            sequence,
            witness: Witness::new(),
        })
    }

    /// Serialize the base fields of this input.
    pub fn write_to(&self, writer: &mut WireWriter) {
        self.previous_outpoint.write_to(writer);
        writer.write_var_bytes(self.script_sig.as_bytes());
        writer.write_u32_le(self.sequence);
    }
}
