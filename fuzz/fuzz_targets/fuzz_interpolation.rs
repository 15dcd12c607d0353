#![no_main]

use knit_text::{FnLookup, MissingKey, interpolation_keys, resolve, scan};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|text: &str| {
    let mut last_end = 0;
    for marker in scan(text) {
        assert!(marker.start >= last_end);
        last_end = marker.end;
    }

    let literal = resolve(text, &FnLookup(|_: &str| None::<String>), MissingKey::Literal);
    assert_eq!(literal.text, text);
    assert_eq!(literal.missing.len(), interpolation_keys(text).len());

    let _ = resolve(text, &FnLookup(|key: &str| Some(key.repeat(2))), MissingKey::Empty);
});
