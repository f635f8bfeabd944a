//! Size estimation and fee suggestion.

use dfi_script::Script;

use crate::error::ConstructionError;

/// Lowest fee rate ever suggested, in base units per byte.
pub const MIN_FEE_RATE: f64 = 1.0;

/// Version, counts and lock time.
pub const TRANSACTION_OVERHEAD: u64 = 12;
/// Virtual size of a P2WPKH input including its witness.
pub const SEGWIT_INPUT_SIZE: u64 = 68;
/// Size of a P2PKH input with an uncompressed key.
pub const LEGACY_INPUT_SIZE: u64 = 148;
/// Value and script length prefix of an output.
pub const OUTPUT_OVERHEAD: u64 = 9;

/// Upper-bound size of a signed transaction spending `input_scripts` and
/// paying `output_scripts`.
pub fn estimate_size<'a>(
    input_scripts: impl IntoIterator<Item = &'a Script>,
    output_scripts: impl IntoIterator<Item = &'a Script>,
) -> u64 {
    let inputs: u64 = input_scripts
        .into_iter()
        .map(|script| match script.witness_program() {
            Some(_) => SEGWIT_INPUT_SIZE,
            None => LEGACY_INPUT_SIZE,
        })
        .sum();
    let outputs: u64 = output_scripts
        .into_iter()
        .map(|script| OUTPUT_OVERHEAD + script.len() as u64)
        .sum();
    TRANSACTION_OVERHEAD + inputs + outputs
}

/// Fee for `estimated_size` bytes at `fee_rate`, scaled by `multiplier`.
///
/// The multiplier scales the rate before the `MIN_FEE_RATE` floor is
/// applied, so the floor itself is never scaled down.
pub fn suggested_fee(fee_rate: f64, estimated_size: u64, multiplier: Option<f64>) -> u64 {
    let rate = (fee_rate * multiplier.unwrap_or(1.0)).max(MIN_FEE_RATE);
    (rate * estimated_size as f64).ceil() as u64
}

/// A multiplier must be a positive finite number.
pub fn validate_multiplier(multiplier: Option<f64>) -> Result<(), ConstructionError> {
    match multiplier {
        Some(m) if !m.is_finite() || m <= 0.0 => Err(ConstructionError::InvalidFeeMultiplier(m)),
        _ => Ok(()),
    }
}
