#![no_main]

use libfuzzer_sys::fuzz_target;

use coffer_types::{Amount, HolderAddress};

fuzz_target!(|data: &[u8]| {
    // The RPC layer parses amounts, rates, and addresses out of request
    // strings. None of those paths may panic on arbitrary input.
    if let Ok(s) = std::str::from_utf8(data) {
        let _ = s.parse::<Amount>();
        let _ = s.parse::<u64>();
        let _ = HolderAddress::parse(s);
    }
});
