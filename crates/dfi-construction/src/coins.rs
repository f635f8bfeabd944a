//! Coin selection: packaging the coins named by input operations.
//!
//! Callers choose their own coins; selection only checks that every input
//! names one and that no coin is spent twice.

use std::collections::HashSet;

use dfi_transaction::OutPoint;

use crate::error::ConstructionError;
use crate::operations::INPUT_OP_TYPE;
use crate::types::{Coin, Operation};

/// Collect the coins spent by `operations`, in input order.
pub fn select_coins(operations: &[Operation]) -> Result<Vec<Coin>, ConstructionError> {
    let mut seen: HashSet<OutPoint> = HashSet::new();
    let mut coins = Vec::new();

    for (index, op) in operations.iter().enumerate() {
        if op.operation_type != INPUT_OP_TYPE {
            continue;
        }
        let change = op.coin_change.as_ref().ok_or_else(|| {
            ConstructionError::InvalidOperations(format!("input operation {index} has no coin change"))
        })?;
        let amount = op.amount.clone().ok_or_else(|| {
            ConstructionError::InvalidOperations(format!("operation {index} has no amount"))
        })?;
        let identifier = &change.coin_identifier.identifier;
        let outpoint: OutPoint = identifier
            .parse()
            .map_err(|_| ConstructionError::InvalidCoinIdentifier(identifier.clone()))?;
        if !seen.insert(outpoint) {
            return Err(ConstructionError::DuplicateCoinReference(identifier.clone()));
        }
        coins.push(Coin {
            coin_identifier: change.coin_identifier.clone(),
            amount,
        });
    }

    Ok(coins)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operations::OUTPUT_OP_TYPE;
    use crate::types::{
        AccountIdentifier, Amount, CoinAction, CoinChange, CoinIdentifier, Currency,
        OperationIdentifier,
    };

    const COIN_A: &str = "d435e59999faffb36890651bd0cfd9795bb06bfe96d5ce62f1acd9cc1ce12a37:0";
    const COIN_B: &str = "d435e59999faffb36890651bd0cfd9795bb06bfe96d5ce62f1acd9cc1ce12a37:1";

    fn input(index: i64, coin: &str, value: i64) -> Operation {
        Operation {
            operation_identifier: OperationIdentifier {
                index,
                network_index: None,
            },
            operation_type: INPUT_OP_TYPE.to_string(),
            account: Some(AccountIdentifier::new("tf1q4mfg3kqm4c7f8j7tyy028fa4uaw7zdzyerq5qx")),
            amount: Some(Amount::new(
                value,
                &Currency {
                    symbol: "tDFI".to_string(),
                    decimals: 8,
                },
            )),
            coin_change: Some(CoinChange {
                coin_identifier: CoinIdentifier {
                    identifier: coin.to_string(),
                },
                coin_action: CoinAction::CoinSpent,
            }),
        }
    }

    #[test]
    fn test_select_in_input_order() {
        let mut output = input(2, COIN_A, 10);
        output.operation_type = OUTPUT_OP_TYPE.to_string();
        output.coin_change = None;
        let ops = vec![input(0, COIN_B, -5), input(1, COIN_A, -7), output];

        let coins = select_coins(&ops).unwrap();
        assert_eq!(coins.len(), 2);
        assert_eq!(coins[0].coin_identifier.identifier, COIN_B);
        assert_eq!(coins[0].amount.value, "-5");
        assert_eq!(coins[1].coin_identifier.identifier, COIN_A);
    }

    #[test]
    fn test_rejects_duplicate_coin() {
        let ops = vec![input(0, COIN_A, -5), input(1, COIN_A, -5)];
        assert!(matches!(
            select_coins(&ops),
            Err(ConstructionError::DuplicateCoinReference(_))
        ));

        // The same outpoint spelled with different hex case is still a duplicate.
        let upper = COIN_A.to_uppercase();
        let ops = vec![input(0, COIN_A, -5), input(1, &upper, -5)];
        assert!(matches!(
            select_coins(&ops),
            Err(ConstructionError::DuplicateCoinReference(_))
        ));
    }

    #[test]
    fn test_rejects_missing_coin() {
        let mut op = input(0, COIN_A, -5);
        op.coin_change = None;
        assert!(select_coins(&[op]).is_err());
    }
}
