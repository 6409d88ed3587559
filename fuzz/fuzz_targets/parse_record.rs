#![no_main]

use iso2709::{Field, Record};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(record) = Record::parse(data) else {
        return;
    };
    // Fragments are re-read at the maximum length, which need not match
    // what was serialized.
    if record.entries().iter().any(Field::is_fragment) {
        return;
    }
    if let Ok(bytes) = record.serialize() {
        let reparsed = Record::parse(&bytes).expect("serialized record must parse");
        assert_eq!(reparsed, record);
    }
});
