//! Core transaction type.
//!
//! Represents a transaction with version, inputs, outputs, per-input
//! witnesses and lock time. Supports the legacy and segwit wire forms,
//! strict decoding, transaction ID computation and size measures.

use dfi_primitives::chainhash::Hash;
use dfi_primitives::wire::{VarInt, WireReader, WireWriter};

use crate::input::{TransactionInput, Witness};
use crate::output::TransactionOutput;
use crate::TransactionError;

const SEGWIT_MARKER: u8 = 0x00;
const SEGWIT_FLAG: u8 = 0x01;

/// Smallest possible encoded input: outpoint, empty script, sequence.
const MIN_INPUT_SIZE: usize = 32 + 4 + 1 + 4;
/// Smallest possible encoded output: value and empty script.
const MIN_OUTPUT_SIZE: usize = 8 + 1;

/// A transaction consisting of a version, inputs, outputs and a lock time.
///
/// # Wire format
///
/// | Field          | Size                          |
/// |----------------|-------------------------------|
/// | version        | 4 bytes (LE)                  |
/// | marker, flag   | `00 01`, segwit form only     |
/// | input count    | VarInt                        |
/// | inputs         | variable (per input)          |
/// | output count   | VarInt                        |
/// | outputs        | variable (per output)         |
/// | witnesses      | one stack per input, segwit form only |
/// | lock_time      | 4 bytes (LE)                  |
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transaction {
    pub version: u32,
    pub inputs: Vec<TransactionInput>,
    pub outputs: Vec<TransactionOutput>,
    pub lock_time: u32,
}

impl Default for Transaction {
    fn default() -> Self {
        Self::new()
    }
}

impl Transaction {
    /// Create an empty version 1 transaction with lock time 0.
    pub fn new() -> Self {
        Transaction {
            version: 1,
            inputs: Vec::new(),
            outputs: Vec::new(),
            lock_time: 0,
        }
    }

    pub fn add_input(&mut self, input: TransactionInput) {
        self.inputs.push(input);
    }

    pub fn add_output(&mut self, output: TransactionOutput) {
        self.outputs.push(output);
    }

    // -----------------------------------------------------------------
    // Deserialization
    // -----------------------------------------------------------------

    /// Parse a transaction from a hex-encoded string.
    pub fn from_hex(hex_str: &str) -> Result<Self, TransactionError> {
        let bytes = hex::decode(hex_str)
            .map_err(|e| TransactionError::SerializationError(format!("invalid hex: {e}")))?;
        Self::from_bytes(&bytes)
    }

    /// Parse a transaction from raw bytes in either wire form.
    ///
    /// The slice must contain exactly one complete transaction with no
    /// trailing data.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TransactionError> {
        let mut reader = WireReader::new(bytes);
        let tx = Self::read_from(&mut reader)?;
        if reader.remaining() != 0 {
            return Err(TransactionError::SerializationError(format!(
                "trailing {} bytes after transaction",
                reader.remaining()
            )));
        }
        Ok(tx)
    }

    /// Deserialize a transaction from a `WireReader`.
    pub fn read_from(reader: &mut WireReader) -> Result<Self, TransactionError> {
        let version = reader
            .read_u32_le()
            .map_err(|e| TransactionError::decoding("reading version", e))?;

        let segwit = reader.peek_u8() == Some(SEGWIT_MARKER);
        if segwit {
            let marker_and_flag = reader
                .read_array::<2>()
                .map_err(|e| TransactionError::decoding("reading segwit flag", e))?;
            if marker_and_flag[1] != SEGWIT_FLAG {
                return Err(TransactionError::SerializationError(format!(
                    "unsupported segwit flag {:#04x}",
                    marker_and_flag[1]
                )));
            }
        }

        let input_count = reader
            .read_count(MIN_INPUT_SIZE)
            .map_err(|e| TransactionError::decoding("reading input count", e))?;
        let mut inputs = Vec::with_capacity(input_count);
        for _ in 0..input_count {
            inputs.push(TransactionInput::read_from(reader)?);
        }

        let output_count = reader
            .read_count(MIN_OUTPUT_SIZE)
            .map_err(|e| TransactionError::decoding("reading output count", e))?;
        let mut outputs = Vec::with_capacity(output_count);
        for _ in 0..output_count {
            outputs.push(TransactionOutput::read_from(reader)?);
        }

        if segwit {
            for input in inputs.iter_mut() {
                input.witness = Witness::read_from(reader)?;
            }
            if inputs.iter().all(|i| i.witness.is_empty()) {
                return Err(TransactionError::SerializationError(
                    "segwit transaction carries no witness data".to_string(),
                ));
            }
        }

        let lock_time = reader
            .read_u32_le()
            .map_err(|e| TransactionError::decoding("reading lock time", e))?;

        Ok(Transaction {
            version,
            inputs,
            outputs,
            lock_time,
        })
    }

    // -----------------------------------------------------------------
    // Serialization
    // -----------------------------------------------------------------

    /// True if any input carries witness data.
    pub fn has_witness(&self) -> bool {
        self.inputs.iter().any(|i| !i.witness.is_empty())
    }

    /// Serialize the transaction. The segwit form is used only when
    /// `include_witness` is set and some input has a witness.
    pub fn serialize(&self, include_witness: bool) -> Vec<u8> {
        let segwit = include_witness && self.has_witness();
        let mut writer = WireWriter::with_capacity(256);
        writer.write_u32_le(self.version);
        if segwit {
            writer.write_u8(SEGWIT_MARKER);
            writer.write_u8(SEGWIT_FLAG);
        }

        writer.write_varint(VarInt::from(self.inputs.len()));
        for input in &self.inputs {
            input.write_to(&mut writer);
        }

        writer.write_varint(VarInt::from(self.outputs.len()));
        for output in &self.outputs {
            output.write_to(&mut writer);
        }

        if segwit {
            for input in &self.inputs {
                input.witness.write_to(&mut writer);
            }
        }

        writer.write_u32_le(self.lock_time);
        writer.into_bytes()
    }

    /// Serialize with witness data when present.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.serialize(true)
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    // -----------------------------------------------------------------
    // Identifiers and measures
    // -----------------------------------------------------------------

    /// Transaction ID: double SHA-256 of the witness-stripped encoding.
    pub fn txid(&self) -> Hash {
        Hash::double_sha256(&self.serialize(false))
    }

    /// Witness transaction ID: double SHA-256 of the full encoding.
    pub fn wtxid(&self) -> Hash {
        Hash::double_sha256(&self.serialize(true))
    }

    /// Encoded size including witness data.
    pub fn size(&self) -> usize {
        self.serialize(true).len()
    }

    /// Encoded size without witness data.
    pub fn base_size(&self) -> usize {
        self.serialize(false).len()
    }

    pub fn weight(&self) -> usize {
        self.base_size() * 3 + self.size()
    }

    /// Virtual size: weight divided by four, rounded up.
    pub fn vsize(&self) -> usize {
        self.weight().div_ceil(4)
    }

    pub fn input_count(&self) -> usize {
        self.inputs.len()
    }

    pub fn output_count(&self) -> usize {
        self.outputs.len()
    }
}
