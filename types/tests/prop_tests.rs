use proptest::prelude::*;

use strata_types::{AccountId, ClassId};

proptest! {
    /// ClassId index roundtrip for every representable id.
    #[test]
    fn class_id_index_roundtrip(id in 0u16..=u16::MAX) {
        let class = ClassId::new(id);
        prop_assert_eq!(ClassId::from_index(class.index()), Some(class));
    }

    /// Indices past the u16 range never produce a class id.
    #[test]
    fn class_id_rejects_wide_index(index in (u16::MAX as usize + 1)..usize::MAX) {
        prop_assert!(ClassId::from_index(index).is_none());
    }

    /// ClassId ordering follows the numeric id.
    #[test]
    fn class_id_ordering(a in 0u16..=u16::MAX, b in 0u16..=u16::MAX) {
        prop_assert_eq!(ClassId::new(a) <= ClassId::new(b), a <= b);
    }

    /// ClassId bincode serialization roundtrip.
    #[test]
    fn class_id_bincode_roundtrip(id in 0u16..=u16::MAX) {
        let class = ClassId::new(id);
        let encoded = bincode::serialize(&class).unwrap();
        let decoded: ClassId = bincode::deserialize(&encoded).unwrap();
        prop_assert_eq!(decoded, class);
    }

    /// AccountId equality and ordering follow the underlying string.
    #[test]
    fn account_id_ordering(a in "[a-z0-9_]{1,16}", b in "[a-z0-9_]{1,16}") {
        let ia = AccountId::new(a.clone());
        let ib = AccountId::new(b.clone());
        prop_assert_eq!(ia == ib, a == b);
        prop_assert_eq!(ia < ib, a < b);
    }

    /// Identities drawn from a whitespace-free alphabet are always valid.
    #[test]
    fn account_id_valid_alphabet(raw in "[A-Za-z0-9_:.-]{1,64}") {
        prop_assert!(AccountId::new(raw).is_valid());
    }
}
