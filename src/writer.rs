//! Writing ISO 2709 records to byte sinks.
//!
//! [`RecordStreamWriter`] serializes [`Record`] instances back-to-back, with
//! nothing between them, to any destination implementing [`std::io::Write`].
//!
//! # Examples
//!
//! ```
//! use iso2709::{ControlNumberField, Record, RecordStreamReader, RecordStreamWriter};
//!
//! let mut record = Record::new(2, 2)?;
//! let mut control = ControlNumberField::new(0);
//! control.set_value(b"12345");
//! record.add_entry(control.into())?;
//!
//! let mut buffer = Vec::new();
//! {
//!     let mut writer = RecordStreamWriter::new(&mut buffer);
//!     writer.write_record(&record)?;
//!     writer.write_record(&record)?;
//!     writer.finish()?;
//! }
//!
//! let records: Vec<_> = RecordStreamReader::new(&buffer[..]).collect::<Result<_, _>>()?;
//! assert_eq!(records.len(), 2);
//! # Ok::<(), iso2709::MarcError>(())
//! ```

use crate::error::{MarcError, Result};
use crate::record::Record;
use std::io::Write;
use tracing::debug;

/// Sequential writer for ISO 2709 records.
#[derive(Debug)]
pub struct RecordStreamWriter<W: Write> {
    writer: W,
    records_written: usize,
    finished: bool,
}

impl<W: Write> RecordStreamWriter<W> {
    /// Create a new writer.
    pub fn new(writer: W) -> Self {
        RecordStreamWriter {
            writer,
            records_written: 0,
            finished: false,
        }
    }

    /// Serialize `record` and write it.
    ///
    /// The record is fully serialized before anything is written, so a
    /// record that fails to serialize leaves the sink untouched.
    ///
    /// # Errors
    ///
    /// Returns [`MarcError::InvalidArgument`] after [`RecordStreamWriter::finish`],
    /// the errors of [`Record::serialize`], or an I/O error.
    pub fn write_record(&mut self, record: &Record) -> Result<()> {
        if self.finished {
            return Err(MarcError::InvalidArgument(
                "cannot write to a finished writer".to_string(),
            ));
        }
        let bytes = record.serialize()?;
        self.writer.write_all(&bytes)?;
        self.records_written += 1;
        Ok(())
    }

    /// Flush the writer and mark it as finished.
    ///
    /// # Errors
    ///
    /// Returns an error if flushing the underlying writer fails.
    pub fn finish(&mut self) -> Result<()> {
        self.writer.flush()?;
        self.finished = true;
        debug!(records = self.records_written, "finished record stream");
        Ok(())
    }

    /// Number of records written so far.
    #[must_use]
    pub fn records_written(&self) -> usize {
        self.records_written
    }

    /// Unwrap the underlying sink.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FixedField;
    use crate::leader::DirectoryMap;

    #[test]
    fn test_records_are_written_back_to_back() {
        let record = Record::new(2, 2).unwrap();
        let mut writer = RecordStreamWriter::new(Vec::new());
        writer.write_record(&record).unwrap();
        writer.write_record(&record).unwrap();
        assert_eq!(writer.records_written(), 2);

        let bytes = writer.into_inner();
        assert_eq!(bytes.len(), 2 * record.length());
        assert_eq!(bytes[record.length() - 1], 0x1D);
    }

    #[test]
    fn test_write_after_finish() {
        let record = Record::new(2, 2).unwrap();
        let mut writer = RecordStreamWriter::new(Vec::new());
        writer.finish().unwrap();
        assert!(matches!(
            writer.write_record(&record),
            Err(MarcError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_failed_serialization_writes_nothing() {
        let mut record = Record::builder(0, 0)
            .directory_map(DirectoryMap::new(2, 1, 0).unwrap())
            .build()
            .unwrap();
        for tag in [b"005", b"006"] {
            let mut field = FixedField::new(tag, 0).unwrap();
            field.set_value(b"0123456789");
            record.add_entry(field.into()).unwrap();
        }

        let mut writer = RecordStreamWriter::new(Vec::new());
        assert!(matches!(
            writer.write_record(&record),
            Err(MarcError::CapacityExceeded(_))
        ));
        assert_eq!(writer.records_written(), 0);
        assert!(writer.into_inner().is_empty());
    }
}
