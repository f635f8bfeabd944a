use proptest::prelude::*;

use dfi_primitives::chainhash::Hash;
use dfi_script::Script;
use dfi_transaction::{OutPoint, Transaction, TransactionInput, TransactionOutput, Witness};

/// Strategy to generate a random transaction, with or without witnesses.
fn arb_transaction() -> impl Strategy<Value = Transaction> {
    let arb_input = (
        prop::array::uniform32(any::<u8>()),
        any::<u32>(),
        prop::collection::vec(any::<u8>(), 0..64),
        any::<u32>(),
        prop::collection::vec(prop::collection::vec(any::<u8>(), 0..80), 0..3),
    )
        .prop_map(|(hash, index, script, sequence, witness)| {
            let mut input = TransactionInput::new(OutPoint::new(Hash::new(hash), index));
            input.script_sig = Script::from_bytes(&script);
            input.sequence = sequence;
            input.witness = Witness(witness);
            input
        });

    let arb_output = (any::<u64>(), prop::collection::vec(any::<u8>(), 0..64))
        .prop_map(|(value, script)| TransactionOutput::new(value, Script::from_bytes(&script)));

    (
        any::<u32>(),
        prop::collection::vec(arb_input, 1..4),
        prop::collection::vec(arb_output, 0..4),
        any::<u32>(),
    )
        .prop_map(|(version, inputs, outputs, lock_time)| Transaction {
            version,
            inputs,
            outputs,
            lock_time,
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn transaction_serialize_deserialize_roundtrip(tx in arb_transaction()) {
        let bytes = tx.to_bytes();
        let decoded = Transaction::from_bytes(&bytes).unwrap();
        prop_assert_eq!(&decoded, &tx);
        prop_assert_eq!(decoded.txid(), tx.txid());
    }

    #[test]
    fn witness_stripped_form_drops_witnesses(tx in arb_transaction()) {
        let stripped = Transaction::from_bytes(&tx.serialize(false)).unwrap();
        prop_assert!(!stripped.has_witness());
        prop_assert_eq!(stripped.txid(), tx.txid());
        prop_assert_eq!(stripped.outputs, tx.outputs.clone());
        prop_assert!(tx.weight() >= tx.base_size() * 4);
    }

    #[test]
    fn decoding_arbitrary_bytes_never_panics(bytes in prop::collection::vec(any::<u8>(), 0..300)) {
        let _ = Transaction::from_bytes(&bytes);
    }
}
