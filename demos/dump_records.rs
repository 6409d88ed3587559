//! Print every record in an ISO 2709 file and copy the readable ones to a
//! second file.
//!
//! ```text
//! RUST_LOG=iso2709=debug cargo run --example dump_records -- input.iso [encoding] [output.iso]
//! ```

use anyhow::{bail, Context, Result};
use iso2709::{CodecConfig, RecordStreamReader, RecordStreamWriter, TextEncoding};
use std::fs::File;
use std::io::BufWriter;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let mut args = std::env::args().skip(1);
    let Some(input) = args.next() else {
        bail!("usage: dump_records <input.iso> [encoding] [output.iso]");
    };
    let encoding = match args.next() {
        Some(label) => TextEncoding::for_label(&label)?,
        None => TextEncoding::utf8(),
    };
    let config = CodecConfig {
        encoding,
        ..CodecConfig::default()
    };

    let file = File::open(&input).with_context(|| format!("opening {input}"))?;
    let mut reader = RecordStreamReader::new(file);
    let mut writer = match args.next() {
        Some(output) => Some(RecordStreamWriter::new(BufWriter::new(
            File::create(&output).with_context(|| format!("creating {output}"))?,
        ))),
        None => None,
    };

    let mut failed = 0;
    for result in reader.by_ref() {
        match result {
            Ok(record) => {
                println!("{}", record.to_display_string(&config));
                println!("----------------------------------------");
                if let Some(writer) = writer.as_mut() {
                    writer.write_record(&record)?;
                }
            },
            Err(e) => {
                failed += 1;
                eprintln!("skipping record: {e}");
            },
        }
    }
    if let Some(writer) = writer.as_mut() {
        writer.finish()?;
    }

    eprintln!(
        "{} records read, {failed} failed, {} bytes consumed",
        reader.records_read(),
        reader.position()
    );
    Ok(())
}
