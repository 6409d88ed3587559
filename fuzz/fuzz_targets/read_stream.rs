#![no_main]

use iso2709::RecordStreamReader;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut reader = RecordStreamReader::new(data);
    for _ in reader.by_ref().take(1024) {}
    assert!(reader.position() <= data.len() as u64);
});
