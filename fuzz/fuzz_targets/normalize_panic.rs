#![no_main]
use evalkey_notation::normalize;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // The rewriter is total: arbitrary input must neither panic nor drift.
    // We use lossy conversion to maximize coverage of inputs that are
    // "almost" text.
    let s = String::from_utf8_lossy(data);
    let once = normalize(&s);
    assert_eq!(normalize(&once), once);
});
