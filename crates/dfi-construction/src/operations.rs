//! Translation between API operations and transaction inputs/outputs.
//!
//! Operations are ordered inputs-then-outputs with contiguous indices;
//! inputs carry negative amounts and the coin they spend, outputs carry
//! non-negative amounts and the address they pay.

use dfi_primitives::hash::{hash160, sha256};
use dfi_script::{classify_script, Address, NetworkParams, Script};
use dfi_transaction::{OutPoint, Transaction, TransactionInput, TransactionOutput};

use crate::error::ConstructionError;
use crate::types::{
    AccountIdentifier, Amount, CoinAction, CoinChange, CoinIdentifier, Currency, Operation,
    OperationIdentifier,
};

pub const INPUT_OP_TYPE: &str = "INPUT";
pub const OUTPUT_OP_TYPE: &str = "OUTPUT";

/// Largest amount, in base units, any single operation may move.
pub const MAX_MONEY: u64 = 1_200_000_000 * 100_000_000;

/// A coin the new transaction spends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntentInput {
    pub outpoint: OutPoint,
    pub address: String,
    /// Locking script implied by `address`.
    pub script_pubkey: Script,
    /// Signed amount as given in the operation (negative).
    pub amount: i64,
}

/// A payment the new transaction makes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntentOutput {
    pub address: String,
    pub script_pubkey: Script,
    pub value: u64,
}

/// Validated inputs and outputs of a transaction to construct.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionIntent {
    pub inputs: Vec<IntentInput>,
    pub outputs: Vec<IntentOutput>,
}

impl TransactionIntent {
    pub fn total_input(&self) -> Result<u64, ConstructionError> {
        checked_total("inputs", self.inputs.iter().map(|i| i.amount.unsigned_abs()))
    }

    pub fn total_output(&self) -> Result<u64, ConstructionError> {
        checked_total("outputs", self.outputs.iter().map(|o| o.value))
    }

    /// Version 1 transaction with empty scriptSigs, final sequences and
    /// lock time 0.
    pub fn to_unsigned_transaction(&self) -> Transaction {
        let mut tx = Transaction::new();
        for input in &self.inputs {
            tx.add_input(TransactionInput::new(input.outpoint));
        }
        for output in &self.outputs {
            tx.add_output(TransactionOutput::new(output.value, output.script_pubkey.clone()));
        }
        tx
    }
}

/// What is known about an input beyond its wire encoding.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputContext {
    pub account: Option<String>,
    /// Signed amount (negative) of the spent coin.
    pub amount: Option<i64>,
}

/// Maps operations to transactions and back for one network.
#[derive(Debug, Clone, Copy)]
pub struct OperationMapper<'a> {
    params: &'a NetworkParams,
    currency: &'a Currency,
}

impl<'a> OperationMapper<'a> {
    pub fn new(params: &'a NetworkParams, currency: &'a Currency) -> Self {
        OperationMapper { params, currency }
    }

    /// Validate operations and resolve them into inputs and outputs.
    pub fn from_operations(
        &self,
        operations: &[Operation],
    ) -> Result<TransactionIntent, ConstructionError> {
        let mut intent = TransactionIntent::default();

        for (index, op) in operations.iter().enumerate() {
            if op.operation_identifier.index != index as i64 {
                return Err(ConstructionError::NonContiguousOperations {
                    index,
                    found: op.operation_identifier.index,
                });
            }
            let address = &op
                .account
                .as_ref()
                .ok_or_else(|| {
                    ConstructionError::InvalidOperations(format!("operation {index} has no account"))
                })?
                .address;
            let amount = self.parse_amount(op.amount.as_ref(), index)?;
            if amount.unsigned_abs() > MAX_MONEY {
                return Err(ConstructionError::InvalidAmount(format!(
                    "operation {index} moves {amount}, more than the money supply"
                )));
            }
            let script_pubkey = Address::decode(address, self.params)
                .map_err(ConstructionError::UnableToDecodeAddress)?
                .script_pubkey();

            match op.operation_type.as_str() {
                INPUT_OP_TYPE => {
                    if !intent.outputs.is_empty() {
                        return Err(ConstructionError::InvalidOperations(format!(
                            "input operation {index} follows an output"
                        )));
                    }
                    if amount >= 0 {
                        return Err(ConstructionError::AmountSignMismatch { index });
                    }
                    let outpoint = spent_outpoint(op, index)?;
                    intent.inputs.push(IntentInput {
                        outpoint,
                        address: address.clone(),
                        script_pubkey,
                        amount,
                    });
                }
                OUTPUT_OP_TYPE => {
                    if amount < 0 {
                        return Err(ConstructionError::AmountSignMismatch { index });
                    }
                    intent.outputs.push(IntentOutput {
                        address: address.clone(),
                        script_pubkey,
                        value: amount.unsigned_abs(),
                    });
                }
                other => return Err(ConstructionError::InvalidOperationType(other.to_string())),
            }
        }

        if intent.inputs.is_empty() || intent.outputs.is_empty() {
            return Err(ConstructionError::InvalidOperations(
                "at least one input and one output are required".to_string(),
            ));
        }
        Ok(intent)
    }

    /// Render a transaction as operations: one INPUT per input, then one
    /// OUTPUT per output, each carrying its position as network index.
    ///
    /// Input accounts and amounts come from `contexts`; missing entries
    /// leave the fields out.
    pub fn to_operations(
        &self,
        tx: &Transaction,
        contexts: &[InputContext],
    ) -> Result<Vec<Operation>, ConstructionError> {
        let mut operations = Vec::with_capacity(tx.inputs.len() + tx.outputs.len());

        for (i, input) in tx.inputs.iter().enumerate() {
            let context = contexts.get(i).cloned().unwrap_or_default();
            operations.push(Operation {
                operation_identifier: OperationIdentifier {
                    index: operations.len() as i64,
                    network_index: Some(i as i64),
                },
                operation_type: INPUT_OP_TYPE.to_string(),
                account: context.account.map(AccountIdentifier::new),
                amount: context.amount.map(|a| Amount::new(a, self.currency)),
                coin_change: Some(CoinChange {
                    coin_identifier: CoinIdentifier {
                        identifier: input.previous_outpoint.to_string(),
                    },
                    coin_action: CoinAction::CoinSpent,
                }),
            });
        }

        for (i, output) in tx.outputs.iter().enumerate() {
            let value = i64::try_from(output.value).map_err(|_| {
                ConstructionError::InvalidAmount(format!("output {i} value {} overflows", output.value))
            })?;
            let account = classify_script(&output.script_pubkey, self.params)
                .ok()
                .and_then(|c| c.addresses.into_iter().next())
                .map(AccountIdentifier::new);
            operations.push(Operation {
                operation_identifier: OperationIdentifier {
                    index: operations.len() as i64,
                    network_index: Some(i as i64),
                },
                operation_type: OUTPUT_OP_TYPE.to_string(),
                account,
                amount: Some(Amount::new(value, self.currency)),
                coin_change: None,
            });
        }

        Ok(operations)
    }

    /// Parse an operation amount, checking its currency.
    pub fn parse_amount(&self, amount: Option<&Amount>, index: usize) -> Result<i64, ConstructionError> {
        let amount = amount.ok_or_else(|| {
            ConstructionError::InvalidOperations(format!("operation {index} has no amount"))
        })?;
        if amount.currency != *self.currency {
            return Err(ConstructionError::CurrencyMismatch {
                expected: self.currency.symbol.clone(),
                found: amount.currency.symbol.clone(),
            });
        }
        parse_value(&amount.value)
    }
}

fn checked_total(
    side: &str,
    mut values: impl Iterator<Item = u64>,
) -> Result<u64, ConstructionError> {
    values.try_fold(0u64, |total, value| {
        total
            .checked_add(value)
            .ok_or_else(|| ConstructionError::InvalidAmount(format!("total of {side} overflows")))
    })
}

/// Parse a decimal base-unit amount.
pub fn parse_value(value: &str) -> Result<i64, ConstructionError> {
    value
        .parse::<i64>()
        .map_err(|_| ConstructionError::InvalidAmount(value.to_string()))
}

fn spent_outpoint(op: &Operation, index: usize) -> Result<OutPoint, ConstructionError> {
    let change = op.coin_change.as_ref().ok_or_else(|| {
        ConstructionError::InvalidOperations(format!("input operation {index} has no coin change"))
    })?;
    if change.coin_action != CoinAction::CoinSpent {
        return Err(ConstructionError::InvalidOperations(format!(
            "input operation {index} must spend its coin"
        )));
    }
    let identifier = &change.coin_identifier.identifier;
    identifier
        .parse()
        .map_err(|_| ConstructionError::InvalidCoinIdentifier(identifier.clone()))
}

/// Recover the address that authorized an input from its witness or
/// scriptSig.
///
/// A two-item witness ending in a compressed key is P2WPKH; any other
/// witness is P2WSH over its last item. A push-only scriptSig of a
/// signature and a public key is P2PKH; any other push-only scriptSig is
/// P2SH over its last push. Returns `None` when neither applies.
pub fn signer_address(input: &TransactionInput) -> Option<Address> {
    let witness = &input.witness;
    if let Some(last) = witness.last() {
        return Some(if witness.len() == 2 && last.len() == 33 {
            Address::WitnessPubKeyHash(hash160(last))
        } else {
            Address::WitnessScriptHash(sha256(last))
        });
    }

    if input.script_sig.is_empty() || !input.script_sig.is_push_only() {
        return None;
    }
    let chunks = input.script_sig.chunks().ok()?;
    let last = chunks.last()?.data.as_deref()?;
    if chunks.len() == 2 && (last.len() == 33 || last.len() == 65) {
        Some(Address::PubKeyHash(hash160(last)))
    } else {
        Some(Address::ScriptHash(hash160(last)))
    }
}
