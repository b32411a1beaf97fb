#![no_main]

use libfuzzer_sys::fuzz_target;

use strata_ledger::{Ledger, LedgerSnapshot};

// Decoding and restoring arbitrary snapshot bytes must fail cleanly, and any
// snapshot that restores must pass its own audit.
fuzz_target!(|data: &[u8]| {
    if let Ok(snapshot) = LedgerSnapshot::from_bytes(data) {
        if let Ok(ledger) = Ledger::from_snapshot(&snapshot) {
            assert!(ledger.audit().is_ok());
        }
    }
});
