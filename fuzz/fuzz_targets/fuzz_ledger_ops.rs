#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use strata_ledger::Ledger;
use strata_types::{AccountId, ClassId};

const ACCOUNTS: [&str; 4] = ["issuer", "a", "b", "c"];

#[derive(Debug, Arbitrary)]
enum FuzzOp {
    Issue { to: u8, amount: u128, class: u8 },
    Transfer { from: u8, to: u8, amount: u128, class: u8 },
    Approve { owner: u8, spender: u8, amount: u128, class: u8 },
    TransferFrom { spender: u8, from: u8, to: u8, amount: u128, class: u8 },
    Convert { who: u8, from: u8, to: u8, amount: u128 },
}

#[derive(Debug, Arbitrary)]
struct Input {
    multipliers: Vec<u64>,
    ops: Vec<FuzzOp>,
}

fn account(i: u8) -> AccountId {
    AccountId::new(ACCOUNTS[i as usize % ACCOUNTS.len()])
}

// Class ids may fall one past the table to exercise InvalidClass.
fn class(i: u8, count: usize) -> ClassId {
    ClassId::new((i as usize % (count + 1)) as u16)
}

// Arbitrary class tables and operation sequences must never panic, and the
// cached aggregates must match a full recomputation after every step.
// Supply may only grow through issuance.
fuzz_target!(|input: Input| {
    let multipliers: Vec<u128> = input
        .multipliers
        .iter()
        .take(8)
        .map(|&m| u128::from(m))
        .collect();
    let Ok(mut ledger) = Ledger::new(multipliers, AccountId::new("issuer")) else {
        return;
    };
    let count = ledger.class_count();

    for op in input.ops.iter().take(64) {
        let before = ledger.fully_diluted_total_supply();
        let issued = matches!(op, FuzzOp::Issue { .. });
        let _ = match *op {
            FuzzOp::Issue { to, amount, class: c } => {
                ledger.issue(&AccountId::new("issuer"), &account(to), amount, class(c, count))
            }
            FuzzOp::Transfer { from, to, amount, class: c } => {
                ledger.transfer(&account(from), &account(to), amount, class(c, count))
            }
            FuzzOp::Approve { owner, spender, amount, class: c } => {
                ledger.approve(&account(owner), &account(spender), amount, class(c, count))
            }
            FuzzOp::TransferFrom { spender, from, to, amount, class: c } => ledger.transfer_from(
                &account(spender),
                &account(from),
                &account(to),
                amount,
                class(c, count),
            ),
            FuzzOp::Convert { who, from, to, amount } => ledger
                .convert(&account(who), class(from, count), class(to, count), amount)
                .map(|_| ()),
        };

        assert!(ledger.audit().is_ok(), "aggregates drifted after {op:?}");
        if !issued {
            assert!(ledger.fully_diluted_total_supply() <= before);
        }
    }
});
