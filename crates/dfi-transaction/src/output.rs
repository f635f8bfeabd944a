//! Transaction output with value and locking script.

use dfi_primitives::wire::{WireReader, WireWriter};
use dfi_script::Script;

use crate::TransactionError;

/// A single output in a transaction.
///
/// # Wire format
///
/// | Field          | Size          |
/// |----------------|---------------|
/// | value          | 8 bytes (LE)  |
/// | script length  | VarInt        |
/// | script_pubkey  | variable      |
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionOutput {
    /// Amount in base units (1e-8 of a coin).
    pub value: u64,
    pub script_pubkey: Script,
}

impl TransactionOutput {
    pub fn new(value: u64, script_pubkey: Script) -> Self {
        TransactionOutput { value, script_pubkey }
    }

    pub fn read_from(reader: &mut WireReader) -> Result<Self, TransactionError> {
        let value = reader
            .read_u64_le()
            .map_err(|e| TransactionError::decoding("reading output value", e))?;
        let script = reader
            .read_var_bytes()
            .map_err(|e| TransactionError::decoding("reading script_pubkey", e))?;
        Ok(TransactionOutput {
            value,
            script_pubkey: Script::from_bytes(script),
        })
    }

    pub fn write_to(&self, writer: &mut WireWriter) {
        writer.write_u64_le(self.value);
        writer.write_var_bytes(self.script_pubkey.as_bytes());
    }

    /// The serialized output, as committed to by the signature hash.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut writer = WireWriter::with_capacity(9 + self.script_pubkey.len());
        self.write_to(&mut writer);
        writer.into_bytes()
    }
}
