//! Build a CNMARC-style record from scratch, print it, and write it to stdout
//! or a file.
//!
//! ```text
//! cargo run --example build_record -- [output.iso]
//! ```

use anyhow::Result;
use iso2709::{
    CodecConfig, ControlNumberField, DataField, FixedField, Record, RecordStreamWriter, Subfield,
    TextEncoding,
};
use std::fs::File;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let config = CodecConfig {
        encoding: TextEncoding::for_label("gb18030")?,
        ..CodecConfig::default()
    };

    let mut record = Record::builder(2, 2).status(b'c').build()?;
    let widths = record.widths();

    let mut control = ControlNumberField::new(widths.implementation_defined);
    control.set_value(b"CAL 012000123456");
    record.add_entry(control.into())?;

    let mut modified = FixedField::new(b"005", widths.implementation_defined)?;
    modified.set_value(b"20200520170000.0");
    record.add_entry(modified.into())?;

    let mut title = DataField::new(b"200", widths)?;
    title.set_indicator(b"1 ")?;
    title.add_subfield(Subfield::with_text(b"a", "红楼梦", &config)?)?;
    title.add_subfield(Subfield::with_text(b"f", "曹雪芹著", &config)?)?;
    record.add_entry(title.into())?;

    let mut subject = DataField::new(b"606", widths)?;
    subject.set_indicator(b"0 ")?;
    subject.add_subfield(Subfield::with_text(b"a", "长篇小说", &config)?)?;
    subject.add_subfield(Subfield::with_text(b"y", "中国", &config)?)?;
    subject.add_subfield(Subfield::with_text(b"z", "清代", &config)?)?;
    record.add_entry(subject.into())?;

    record.sort_directory();
    eprintln!("{}", record.to_display_string(&config));

    match std::env::args().nth(1) {
        Some(path) => {
            let mut writer = RecordStreamWriter::new(File::create(path)?);
            writer.write_record(&record)?;
            writer.finish()?;
        },
        None => {
            let mut writer = RecordStreamWriter::new(std::io::stdout().lock());
            writer.write_record(&record)?;
            writer.finish()?;
        },
    }
    Ok(())
}
