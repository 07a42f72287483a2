#![no_main]

use libfuzzer_sys::fuzz_target;

use coffer_service::ServiceConfig;

fuzz_target!(|data: &[u8]| {
    // Config files are operator-supplied; parsing one must never panic,
    // whatever the file contains.
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(config) = ServiceConfig::from_toml_str(s) {
            let _ = config.vault();
            let _ = config.role_table();
            let _ = config.genesis_balances();
        }
    }
});
