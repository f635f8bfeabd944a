//! Signature hash computation for segwit v0 inputs.
//!
//! Implements the BIP143 digest: a double SHA-256 over the transaction
//! version, commitments to all prevouts, sequences and outputs, the
//! outpoint being signed, its script code and amount, and the sighash type.
//!
//! See <https://github.com/bitcoin/bips/blob/master/bip-0143.mediawiki>

use dfi_primitives::hash::sha256d;
use dfi_primitives::wire::WireWriter;
use dfi_script::Script;

use crate::transaction::Transaction;
use crate::TransactionError;

// -----------------------------------------------------------------------
// Sighash flag constants
// -----------------------------------------------------------------------

/// Sign all inputs and all outputs (the default).
pub const SIGHASH_ALL: u32 = 0x01;

/// Sign all inputs but no outputs.
pub const SIGHASH_NONE: u32 = 0x02;

/// Sign all inputs and only the output with the same index as the signed input.
pub const SIGHASH_SINGLE: u32 = 0x03;

/// Only sign the current input, allowing other inputs to be added later.
pub const SIGHASH_ANYONECANPAY: u32 = 0x80;

/// Mask applied to extract the base sighash type (ALL, NONE, SINGLE).
pub const SIGHASH_MASK: u32 = 0x1f;

// -----------------------------------------------------------------------
// Midstate
// -----------------------------------------------------------------------

/// The per-transaction sub-hashes shared by every input's digest.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SigHashMidstate {
    pub hash_prevouts: [u8; 32],
    pub hash_sequence: [u8; 32],
    pub hash_outputs: [u8; 32],
}

impl SigHashMidstate {
    /// Hash the prevouts, sequences and outputs of `tx` once.
    pub fn new(tx: &Transaction) -> Self {
        let mut prevouts = WireWriter::with_capacity(tx.inputs.len() * 36);
        let mut sequences = WireWriter::with_capacity(tx.inputs.len() * 4);
        for input in &tx.inputs {
            prevouts.write_bytes(input.previous_outpoint.hash.as_bytes());
            prevouts.write_u32_le(input.previous_outpoint.index);
            sequences.write_u32_le(input.sequence);
        }
        let mut outputs = WireWriter::new();
        for output in &tx.outputs {
            output.write_to(&mut outputs);
        }
        SigHashMidstate {
            hash_prevouts: sha256d(prevouts.as_bytes()),
            hash_sequence: sha256d(sequences.as_bytes()),
            hash_outputs: sha256d(outputs.as_bytes()),
        }
    }

    /// Digest for one input, reusing the precomputed sub-hashes.
    pub fn signature_hash(
        &self,
        tx: &Transaction,
        input_index: usize,
        script_code: &[u8],
        amount: u64,
        sighash_type: u32,
    ) -> Result<[u8; 32], TransactionError> {
        let preimage = self.preimage(tx, input_index, script_code, amount, sighash_type)?;
        Ok(sha256d(&preimage))
    }

    /// The BIP143 preimage for one input, before double hashing.
    ///
    /// 1. nVersion (4 bytes LE)
    /// 2. hashPrevouts (32 bytes), zero under ANYONECANPAY
    /// 3. hashSequence (32 bytes), zero under ANYONECANPAY, SINGLE or NONE
    /// 4. outpoint (32+4 bytes)
    /// 5. scriptCode (varint + script)
    /// 6. amount (8 bytes LE)
    /// 7. nSequence (4 bytes LE)
    /// 8. hashOutputs (32 bytes), all outputs, the paired output, or zero
    /// 9. nLocktime (4 bytes LE)
    /// 10. sighash type (4 bytes LE)
    pub fn preimage(
        &self,
        tx: &Transaction,
        input_index: usize,
        script_code: &[u8],
        amount: u64,
        sighash_type: u32,
    ) -> Result<Vec<u8>, TransactionError> {
        let input = tx.inputs.get(input_index).ok_or_else(|| {
            TransactionError::InvalidTransaction(format!(
                "input index {} out of range (tx has {} inputs)",
                input_index,
                tx.inputs.len()
            ))
        })?;

        let anyone_can_pay = sighash_type & SIGHASH_ANYONECANPAY != 0;
        let base_type = sighash_type & SIGHASH_MASK;

        let hash_prevouts = if anyone_can_pay {
            [0u8; 32]
        } else {
            self.hash_prevouts
        };

        let hash_sequence =
            if anyone_can_pay || base_type == SIGHASH_SINGLE || base_type == SIGHASH_NONE {
                [0u8; 32]
            } else {
                self.hash_sequence
            };

        let hash_outputs = if base_type != SIGHASH_SINGLE && base_type != SIGHASH_NONE {
            self.hash_outputs
        } else if base_type == SIGHASH_SINGLE && input_index < tx.outputs.len() {
            sha256d(&tx.outputs[input_index].to_bytes())
        } else {
            [0u8; 32]
        };

        let mut writer = WireWriter::with_capacity(156 + script_code.len());
        writer.write_u32_le(tx.version);
        writer.write_bytes(&hash_prevouts);
        writer.write_bytes(&hash_sequence);
        writer.write_bytes(input.previous_outpoint.hash.as_bytes());
        writer.write_u32_le(input.previous_outpoint.index);
        writer.write_var_bytes(script_code);
        writer.write_u64_le(amount);
        writer.write_u32_le(input.sequence);
        writer.write_bytes(&hash_outputs);
        writer.write_u32_le(tx.lock_time);
        writer.write_u32_le(sighash_type);
        Ok(writer.into_bytes())
    }
}

/// Compute the segwit v0 signature hash of one input.
///
/// Use `SigHashMidstate` directly when hashing several inputs of the same
/// transaction.
pub fn witness_v0_signature_hash(
    tx: &Transaction,
    input_index: usize,
    script_code: &[u8],
    amount: u64,
    sighash_type: u32,
) -> Result<[u8; 32], TransactionError> {
    SigHashMidstate::new(tx).signature_hash(tx, input_index, script_code, amount, sighash_type)
}

/// Compute the BIP143 preimage of one input.
pub fn calc_preimage(
    tx: &Transaction,
    input_index: usize,
    script_code: &[u8],
    amount: u64,
    sighash_type: u32,
) -> Result<Vec<u8>, TransactionError> {
    SigHashMidstate::new(tx).preimage(tx, input_index, script_code, amount, sighash_type)
}

/// The script code committed to when spending `prev_script`.
///
/// P2WPKH prevouts are signed against the equivalent P2PKH script; any
/// other script is used verbatim.
pub fn script_code_for(prev_script: &Script) -> Script {
    match prev_script.witness_program() {
        Some((0, program)) if program.len() == 20 => {
            let mut hash = [0u8; 20];
            hash.copy_from_slice(program);
            Script::new_p2pkh(&hash)
        }
        _ => prev_script.clone(),
    }
}
