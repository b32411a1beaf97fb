#![no_main]

use libfuzzer_sys::fuzz_target;

use strata_ledger::{Ledger, LedgerOp};
use strata_types::AccountId;

// Any JSON the parser accepts must apply without panicking.
fuzz_target!(|data: &[u8]| {
    let Ok(op) = serde_json::from_slice::<LedgerOp>(data) else {
        return;
    };
    let Ok(mut ledger) = Ledger::new(vec![1, 3, 7], AccountId::new("issuer")) else {
        return;
    };
    let _ = ledger.apply(&op);
    assert!(ledger.audit().is_ok());
});
