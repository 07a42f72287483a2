#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Attempt to deserialize arbitrary bytes as the persisted record types.
    // The goal is to ensure deserialization never panics on malformed input.

    // Try deserializing as an account record
    let _ = bincode::deserialize::<coffer_store::Account>(data);

    // Try deserializing as an Amount
    let _ = bincode::deserialize::<coffer_types::Amount>(data);

    // Try deserializing as a Rate
    let _ = bincode::deserialize::<coffer_types::Rate>(data);

    // Try deserializing as a Timestamp
    let _ = bincode::deserialize::<coffer_types::Timestamp>(data);
});
