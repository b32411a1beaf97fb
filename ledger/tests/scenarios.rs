//! End-to-end scenarios over a three-class ledger with multipliers `[1, 4, 6]`.
//!
//! Every test starts from the same fixture: `a1`, `a2`, `a3` hold 600, 150
//! and 100 units of classes 0, 1 and 2, which is 600 base units each.

use strata_ledger::{AccountId, ClassId, Ledger, LedgerError};

struct Fixture {
    ledger: Ledger,
    owner: AccountId,
    a1: AccountId,
    a2: AccountId,
    a3: AccountId,
}

fn setup() -> Fixture {
    let owner = AccountId::new("a0");
    let a1 = AccountId::new("a1");
    let a2 = AccountId::new("a2");
    let a3 = AccountId::new("a3");
    let mut ledger = Ledger::new(vec![1, 4, 6], owner.clone()).unwrap();
    ledger.issue(&owner, &a1, 600, ClassId::new(0)).unwrap();
    ledger.issue(&owner, &a2, 150, ClassId::new(1)).unwrap();
    ledger.issue(&owner, &a3, 100, ClassId::new(2)).unwrap();
    Fixture {
        ledger,
        owner,
        a1,
        a2,
        a3,
    }
}

fn diluted(f: &Fixture) -> [u128; 3] {
    [
        f.ledger.fully_diluted_balance_of(&f.a1),
        f.ledger.fully_diluted_balance_of(&f.a2),
        f.ledger.fully_diluted_balance_of(&f.a3),
    ]
}

fn gap(ledger: &Ledger, a: &AccountId, b: &AccountId, class: ClassId) -> i128 {
    ledger.balance_of_class(b, class) as i128 - ledger.balance_of_class(a, class) as i128
}

#[test]
fn fully_diluted_balances_are_equal() {
    let f = setup();
    assert_eq!(diluted(&f), [600, 600, 600]);
}

#[test]
fn fully_diluted_total_supply_is_1800() {
    let f = setup();
    assert_eq!(f.ledger.fully_diluted_total_supply(), 1800);
}

#[test]
fn can_be_transferred() {
    let mut f = setup();
    f.ledger.transfer(&f.a1, &f.a2, 100, ClassId::BASE).unwrap();
    let diff = f.ledger.balance_of(&f.a2) as i128 - f.ledger.balance_of(&f.a1) as i128;
    assert_eq!(diff, -400);
    assert_eq!(f.ledger.class_supply(ClassId::BASE), 600);
}

#[test]
fn transfer_shifts_gap_by_twice_the_amount() {
    let mut f = setup();
    let before = gap(&f.ledger, &f.a1, &f.a2, ClassId::BASE);
    f.ledger.transfer(&f.a1, &f.a2, 100, ClassId::BASE).unwrap();
    let after = gap(&f.ledger, &f.a1, &f.a2, ClassId::BASE);
    assert_eq!(after - before, 200);
}

#[test]
fn can_be_transferred_by_others_with_approval() {
    let mut f = setup();
    f.ledger.approve(&f.a1, &f.owner, 100, ClassId::BASE).unwrap();
    f.ledger
        .transfer_from(&f.owner, &f.a1, &f.a2, 100, ClassId::BASE)
        .unwrap();
    let diff = f.ledger.balance_of(&f.a2) as i128 - f.ledger.balance_of(&f.a1) as i128;
    assert_eq!(diff, -400);
    assert_eq!(f.ledger.allowance(&f.a1, &f.owner, ClassId::BASE), 0);
}

#[test]
fn can_be_transferred_in_another_class() {
    let mut f = setup();
    f.ledger.transfer(&f.a2, &f.a1, 100, ClassId::new(1)).unwrap();
    assert_eq!(f.ledger.balance_of_class(&f.a1, ClassId::new(1)), 100);
    assert_eq!(f.ledger.balance_of_class(&f.a2, ClassId::new(1)), 50);
}

#[test]
fn can_be_transferred_by_others_in_another_class() {
    let mut f = setup();
    f.ledger
        .approve(&f.a2, &f.owner, 100, ClassId::new(1))
        .unwrap();
    f.ledger
        .transfer_from(&f.owner, &f.a2, &f.a1, 100, ClassId::new(1))
        .unwrap();
    assert_eq!(f.ledger.balance_of_class(&f.a1, ClassId::new(1)), 100);
    assert_eq!(f.ledger.balance_of_class(&f.a2, ClassId::new(1)), 50);
}

#[test]
fn approval_in_one_class_grants_nothing_in_another() {
    let mut f = setup();
    f.ledger.approve(&f.a2, &f.owner, 100, ClassId::BASE).unwrap();
    let err = f
        .ledger
        .transfer_from(&f.owner, &f.a2, &f.a1, 100, ClassId::new(1))
        .unwrap_err();
    assert_eq!(
        err,
        LedgerError::InsufficientAllowance {
            needed: 100,
            available: 0
        }
    );
}

#[test]
fn second_transfer_from_beyond_allowance_fails() {
    let mut f = setup();
    f.ledger.approve(&f.a1, &f.owner, 150, ClassId::BASE).unwrap();
    f.ledger
        .transfer_from(&f.owner, &f.a1, &f.a3, 100, ClassId::BASE)
        .unwrap();
    assert_eq!(f.ledger.allowance(&f.a1, &f.owner, ClassId::BASE), 50);
    assert!(f
        .ledger
        .transfer_from(&f.owner, &f.a1, &f.a3, 100, ClassId::BASE)
        .is_err());
    assert_eq!(f.ledger.balance_of(&f.a1), 500);
    assert_eq!(f.ledger.balance_of(&f.a3), 100);
}

#[test]
fn can_be_converted() {
    let mut f = setup();
    assert_eq!(diluted(&f), [600, 600, 600]);

    f.ledger
        .convert(&f.a2, ClassId::new(1), ClassId::new(0), 100)
        .unwrap();
    assert_eq!(diluted(&f), [600, 600, 600]);
    assert_eq!(f.ledger.balance_of_class(&f.a2, ClassId::new(0)), 400);
    assert_eq!(f.ledger.balance_of_class(&f.a2, ClassId::new(1)), 50);

    f.ledger
        .convert(&f.a3, ClassId::new(2), ClassId::new(1), 50)
        .unwrap();
    assert_eq!(diluted(&f), [600, 600, 600]);
    assert_eq!(f.ledger.balance_of_class(&f.a3, ClassId::new(1)), 75);
    assert_eq!(f.ledger.balance_of_class(&f.a3, ClassId::new(2)), 50);

    f.ledger
        .convert(&f.a3, ClassId::new(2), ClassId::new(0), 50)
        .unwrap();
    assert_eq!(diluted(&f), [600, 600, 600]);
    assert_eq!(f.ledger.balance_of_class(&f.a3, ClassId::new(0)), 300);
    assert_eq!(f.ledger.balance_of_class(&f.a3, ClassId::new(2)), 0);

    assert_eq!(f.ledger.fully_diluted_total_supply(), 1800);
    f.ledger.audit().unwrap();
}

#[test]
fn only_the_issuer_can_issue() {
    let mut f = setup();
    let err = f
        .ledger
        .issue(&f.a1, &f.a1, 1_000, ClassId::BASE)
        .unwrap_err();
    assert_eq!(err, LedgerError::Unauthorized { caller: f.a1.clone() });
    assert_eq!(f.ledger.fully_diluted_total_supply(), 1800);
}

#[test]
fn round_trip_conversion_loses_value_when_multipliers_do_not_divide() {
    let mut f = setup();
    // 1 unit of class 1 (4) → class 2: floor(4 / 6) = 0, all 4 base units lost.
    let c = f
        .ledger
        .convert(&f.a2, ClassId::new(1), ClassId::new(2), 1)
        .unwrap();
    assert_eq!(c.credited, 0);
    assert_eq!(c.destroyed, 4);
    assert_eq!(f.ledger.fully_diluted_balance_of(&f.a2), 596);
    assert_eq!(f.ledger.fully_diluted_total_supply(), 1796);
    f.ledger.audit().unwrap();
}
