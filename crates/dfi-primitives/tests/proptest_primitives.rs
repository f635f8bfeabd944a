use proptest::prelude::*;

use dfi_primitives::chainhash::Hash;
use dfi_primitives::wire::{VarInt, WireReader, WireWriter};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn varint_reads_back_what_was_written(value in any::<u64>()) {
        let mut writer = WireWriter::new();
        writer.write_varint(VarInt(value));
        let bytes = writer.into_bytes();
        prop_assert_eq!(bytes.len(), VarInt(value).encoded_len());

        let mut reader = WireReader::new(&bytes);
        prop_assert_eq!(reader.read_varint().unwrap(), VarInt(value));
        prop_assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn hash_display_parses_back(bytes in prop::array::uniform32(any::<u8>())) {
        let hash = Hash::new(bytes);
        let parsed: Hash = hash.to_string().parse().unwrap();
        prop_assert_eq!(parsed, hash);
    }

    #[test]
    fn truncated_var_bytes_never_panic(data in prop::collection::vec(any::<u8>(), 0..16)) {
        let mut reader = WireReader::new(&data);
        let _ = reader.read_var_bytes();
    }
}
