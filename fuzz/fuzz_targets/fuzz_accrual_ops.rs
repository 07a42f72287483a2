#![no_main]

use libfuzzer_sys::fuzz_target;

use coffer_ledger::AccrualLedger;
use coffer_types::{Amount, HolderAddress, Rate, Timestamp};

// Fuzz the accrual ledger with arbitrary operation sequences, amounts, rates,
// and timestamps. Ensures no operation ever panics and the incrementally
// maintained principal total always matches the stored accounts.
fuzz_target!(|data: &[u8]| {
    if data.len() < 8 {
        return;
    }

    let initial_rate = u64::from_le_bytes([
        data[0], data[1], data[2], data[3],
        data[4], data[5], data[6], data[7],
    ]);

    let mut ledger = AccrualLedger::new(Rate::new(initial_rate));
    let alice = HolderAddress::new("cfr_fuzz_a");
    let bob = HolderAddress::new("cfr_fuzz_b");

    let remaining = &data[8..];
    let mut offset = 0;
    let mut clock = 0u64;
    while offset + 17 <= remaining.len() {
        let op = remaining[offset];
        let value = u64::from_le_bytes([
            remaining[offset + 1], remaining[offset + 2],
            remaining[offset + 3], remaining[offset + 4],
            remaining[offset + 5], remaining[offset + 6],
            remaining[offset + 7], remaining[offset + 8],
        ]);
        let time_offset = u64::from_le_bytes([
            remaining[offset + 9], remaining[offset + 10],
            remaining[offset + 11], remaining[offset + 12],
            remaining[offset + 13], remaining[offset + 14],
            remaining[offset + 15], remaining[offset + 16],
        ]);

        clock = clock.saturating_add(time_offset);
        let now = Timestamp::new(clock);
        let amount = if value == u64::MAX {
            Amount::MAX
        } else {
            Amount::new(value as u128)
        };

        // Errors are expected; panics are not.
        match op % 6 {
            0 => {
                let _ = ledger.mint(&alice, amount, now);
            }
            1 => {
                let _ = ledger.burn(&alice, amount, now);
            }
            2 => {
                let _ = ledger.transfer(&alice, &bob, amount, now);
            }
            3 => {
                let _ = ledger.transfer(&bob, &alice, amount, now);
            }
            4 => {
                let _ = ledger.set_rate(Rate::new(value));
            }
            _ => {
                let _ = ledger.balance_of(&alice, now);
                let _ = ledger.balance_of_checked(&bob, now);
            }
        }

        offset += 17;
    }

    let sum = ledger
        .accounts()
        .fold(Amount::ZERO, |acc, (_, a)| acc + a.principal);
    assert_eq!(ledger.total_principal(), sum);
});
