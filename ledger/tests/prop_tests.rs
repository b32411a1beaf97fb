use proptest::prelude::*;

use strata_ledger::{AccountId, ClassId, Ledger, LedgerOp};

const ACCOUNTS: [&str; 4] = ["a", "b", "c", "d"];

fn account(i: usize) -> AccountId {
    AccountId::new(ACCOUNTS[i % ACCOUNTS.len()])
}

fn owner() -> AccountId {
    AccountId::new("owner")
}

/// Arbitrary operations over four accounts and up to four classes. Class
/// ids may fall out of range on purpose.
fn op_strategy() -> impl Strategy<Value = LedgerOp> {
    let acct = 0usize..4;
    let class = (0u16..5).prop_map(ClassId::new);
    let amount = 0u128..2_000;
    prop_oneof![
        (acct.clone(), amount.clone(), class.clone()).prop_map(|(a, amount, class)| {
            LedgerOp::Issue {
                caller: owner(),
                account: account(a),
                amount,
                class,
            }
        }),
        (acct.clone(), acct.clone(), amount.clone(), class.clone()).prop_map(
            |(a, b, amount, class)| LedgerOp::Transfer {
                caller: account(a),
                to: account(b),
                amount,
                class,
            }
        ),
        (acct.clone(), acct.clone(), amount.clone(), class.clone()).prop_map(
            |(a, b, amount, class)| LedgerOp::Approve {
                caller: account(a),
                spender: account(b),
                amount,
                class,
            }
        ),
        (acct.clone(), acct.clone(), acct.clone(), amount.clone(), class.clone()).prop_map(
            |(s, a, b, amount, class)| LedgerOp::TransferFrom {
                caller: account(s),
                from: account(a),
                to: account(b),
                amount,
                class,
            }
        ),
        (acct, class.clone(), class, amount).prop_map(|(a, from_class, to_class, amount)| {
            LedgerOp::Convert {
                caller: account(a),
                from_class,
                to_class,
                amount,
            }
        }),
    ]
}

fn multipliers_strategy() -> impl Strategy<Value = Vec<u128>> {
    prop::collection::vec(1u128..20, 1..=4)
}

fn class_supplies(ledger: &Ledger) -> Vec<u128> {
    ledger
        .classes()
        .classes()
        .map(|c| {
            ACCOUNTS
                .iter()
                .map(|a| ledger.balance_of_class(&AccountId::new(*a), c))
                .sum::<u128>()
        })
        .collect()
}

proptest! {
    /// Per-class conservation: supply moves only by issuance and by the
    /// debited / credited sides of conversions.
    #[test]
    fn conservation_holds_for_any_sequence(
        multipliers in multipliers_strategy(),
        ops in prop::collection::vec(op_strategy(), 1..60),
    ) {
        let mut ledger = Ledger::new(multipliers.clone(), owner()).unwrap();
        let mut expected = vec![0u128; multipliers.len()];

        for op in &ops {
            let before = ledger.snapshot();
            match ledger.apply(op) {
                Ok(_) => match op {
                    LedgerOp::Issue { amount, class, .. } => expected[class.index()] += amount,
                    LedgerOp::Convert { from_class, to_class, amount, .. } => {
                        let m = &multipliers;
                        expected[from_class.index()] -= amount;
                        expected[to_class.index()] +=
                            amount * m[from_class.index()] / m[to_class.index()];
                    }
                    _ => {}
                },
                Err(_) => prop_assert_eq!(ledger.snapshot(), before, "failed op mutated state"),
            }
            prop_assert_eq!(class_supplies(&ledger), expected.clone());
            for class in ledger.classes().classes() {
                prop_assert_eq!(ledger.class_supply(class), expected[class.index()]);
            }
        }
        prop_assert!(ledger.audit().is_ok());
    }

    /// The running total supply equals the sum of per-account diluted balances.
    #[test]
    fn total_supply_matches_sum_of_accounts(
        multipliers in multipliers_strategy(),
        ops in prop::collection::vec(op_strategy(), 1..60),
    ) {
        let mut ledger = Ledger::new(multipliers, owner()).unwrap();
        for op in &ops {
            let _ = ledger.apply(op);
            let sum: u128 = ACCOUNTS
                .iter()
                .map(|a| ledger.fully_diluted_balance_of(&AccountId::new(*a)))
                .sum();
            prop_assert_eq!(ledger.fully_diluted_total_supply(), sum);
        }
    }

    /// Neither transfers nor conversions ever increase the total supply.
    #[test]
    fn only_issuance_increases_total_supply(
        multipliers in multipliers_strategy(),
        ops in prop::collection::vec(op_strategy(), 1..60),
    ) {
        let mut ledger = Ledger::new(multipliers, owner()).unwrap();
        for op in &ops {
            let before = ledger.fully_diluted_total_supply();
            let _ = ledger.apply(op);
            let after = ledger.fully_diluted_total_supply();
            if !matches!(op, LedgerOp::Issue { .. }) {
                prop_assert!(after <= before);
            }
            if matches!(
                op,
                LedgerOp::Transfer { .. }
                    | LedgerOp::TransferFrom { .. }
                    | LedgerOp::Approve { .. }
            ) {
                prop_assert_eq!(after, before);
            }
        }
    }

    /// A conversion round trip never increases the diluted balance, and
    /// loses value exactly when a rounding remainder is dropped.
    #[test]
    fn round_trip_never_creates_value(
        m_a in 1u128..50,
        m_b in 1u128..50,
        balance in 1u128..10_000,
        amount_pct in 1u128..=100,
    ) {
        let holder = AccountId::new("holder");
        let mut ledger = Ledger::new(vec![m_a, m_b], owner()).unwrap();
        ledger.issue(&owner(), &holder, balance, ClassId::new(0)).unwrap();
        let before = ledger.fully_diluted_balance_of(&holder);

        let amount = balance * amount_pct / 100;
        let there = ledger
            .convert(&holder, ClassId::new(0), ClassId::new(1), amount)
            .unwrap();
        let back = ledger
            .convert(&holder, ClassId::new(1), ClassId::new(0), there.credited)
            .unwrap();
        let after = ledger.fully_diluted_balance_of(&holder);

        prop_assert!(after <= before);
        prop_assert_eq!(before - after, there.destroyed + back.destroyed);
        if amount > 0 && (amount * m_a) % m_b != 0 {
            prop_assert!(after < before);
        }
    }

    /// Floor semantics: credited is the largest amount whose diluted value
    /// does not exceed the debited value.
    #[test]
    fn conversion_credit_is_floor(
        m_from in 1u128..1_000,
        m_to in 1u128..1_000,
        amount in 0u128..1_000_000,
    ) {
        let ledger = Ledger::new(vec![m_from, m_to], owner()).unwrap();
        let q = ledger.quote_conversion(ClassId::new(0), ClassId::new(1), amount).unwrap();
        prop_assert!(q.credited * m_to <= amount * m_from);
        prop_assert!((q.credited + 1) * m_to > amount * m_from);
        prop_assert_eq!(q.credited * m_to + q.destroyed, amount * m_from);
    }

    /// Snapshots restore to an identical ledger.
    #[test]
    fn snapshot_restore_is_lossless(
        multipliers in multipliers_strategy(),
        ops in prop::collection::vec(op_strategy(), 1..40),
    ) {
        let mut ledger = Ledger::new(multipliers, owner()).unwrap();
        for op in &ops {
            let _ = ledger.apply(op);
        }
        let snap = ledger.snapshot();
        let restored = Ledger::from_snapshot(&snap).unwrap();
        prop_assert_eq!(restored.snapshot(), snap);
        prop_assert_eq!(restored.fully_diluted_total_supply(), ledger.fully_diluted_total_supply());
    }
}
