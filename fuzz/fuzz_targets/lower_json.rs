#![no_main]

use libfuzzer_sys::fuzz_target;
use tscc::CppCodegen;

fuzz_target!(|data: &[u8]| {
    // Arbitrary input must be rejected with an error, never a panic
    if let Ok(s) = std::str::from_utf8(data) {
        let _ = CppCodegen::new().generate_from_json(s, &[]);
    }
});
