//! Common test helpers shared across the integration test suite.

use iso2709::{ControlNumberField, DataField, FixedField, Record, Subfield};

/// Creates an empty record with two-byte indicators and identifiers.
pub fn create_test_record() -> Record {
    Record::new(2, 2).expect("valid widths")
}

/// Creates a UNIMARC-shaped record with a control number, a fixed field and
/// a few data fields.
pub fn create_realistic_record() -> Record {
    let mut record = create_test_record();
    let widths = record.widths();

    let mut control = ControlNumberField::new(0);
    control.set_value(b"CAL 012000123456");
    record.add_entry(control.into()).unwrap();

    let mut modified = FixedField::new(b"005", 0).unwrap();
    modified.set_value(b"20200520170000.0");
    record.add_entry(modified.into()).unwrap();

    let mut isbn = DataField::new(b"010", widths).unwrap();
    isbn.set_indicator(b"  ").unwrap();
    isbn.add_subfield(Subfield::with_content(b"a", b"978-7-02-002040-2"))
        .unwrap();
    isbn.add_subfield(Subfield::with_content(b"d", b"CNY59.70")).unwrap();
    record.add_entry(isbn.into()).unwrap();

    let mut title = DataField::new(b"200", widths).unwrap();
    title.set_indicator(b"1 ").unwrap();
    title
        .add_subfield(Subfield::with_content(b"a", b"Hong lou meng"))
        .unwrap();
    title
        .add_subfield(Subfield::with_content(b"f", b"Cao Xueqin zhu"))
        .unwrap();
    record.add_entry(title.into()).unwrap();

    let mut subject = DataField::new(b"606", widths).unwrap();
    subject.set_indicator(b"0 ").unwrap();
    subject
        .add_subfield(Subfield::with_content(b"a", b"Chang pian xiao shuo"))
        .unwrap();
    subject
        .add_subfield(Subfield::with_content(b"y", b"Zhongguo"))
        .unwrap();
    record.add_entry(subject.into()).unwrap();

    record
}

/// Serializes `record`, panicking on failure.
#[allow(dead_code)]
pub fn serialize(record: &Record) -> Vec<u8> {
    record.serialize().expect("record serializes")
}

/// Replaces the five-digit length prefix of a serialized record.
#[allow(dead_code)]
pub fn set_declared_length(bytes: &mut [u8], length: usize) {
    bytes[..5].copy_from_slice(format!("{length:05}").as_bytes());
}
