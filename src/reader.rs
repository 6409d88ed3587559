//! Reading ISO 2709 records from byte streams.
//!
//! [`RecordStreamReader`] pulls one self-delimited record at a time out of
//! any [`std::io::Read`] source and hands it to [`Record::parse`]. Files seen
//! in the wild are rarely clean, so the reader absorbs two producer quirks:
//!
//! - line breaks (or other configured gap bytes) between records, and
//! - a declared record length that leaves out the record terminator, in which
//!   case the reader scans forward to the terminator.
//!
//! # Examples
//!
//! ```no_run
//! use iso2709::RecordStreamReader;
//! use std::fs::File;
//!
//! let file = File::open("records.iso")?;
//! let mut reader = RecordStreamReader::new(file);
//!
//! while let Some(record) = reader.next_record()? {
//!     println!("{} fields", record.len());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use crate::config::ReaderOptions;
use crate::error::{MarcError, Result};
use crate::fixed_buffer::parse_decimal;
use crate::record::{Record, RECORD_TERMINATOR};
use bytes::{Buf, Bytes, BytesMut};
use std::io::{ErrorKind, Read};
use tracing::{debug, warn};

/// Below this many remaining bytes the stream holds no further record.
pub const MIN_STREAM_RECORD_LEN: usize = 26;

const LENGTH_PREFIX_LEN: usize = 5;
const READ_CHUNK: usize = 8 * 1024;

/// Sequential reader for ISO 2709 records.
///
/// Stream-level failures (I/O errors, truncation, an unreadable length
/// prefix) end iteration. A record that is extracted but fails to parse is
/// reported and the reader moves on to the next one.
#[derive(Debug)]
pub struct RecordStreamReader<R: Read> {
    reader: R,
    buffer: BytesMut,
    gap_bytes: Vec<u8>,
    eof: bool,
    failed: bool,
    position: u64,
    records_read: usize,
}

impl<R: Read> RecordStreamReader<R> {
    /// Create a reader that skips carriage returns and line feeds between
    /// records.
    pub fn new(reader: R) -> Self {
        Self::with_options(reader, ReaderOptions::default())
    }

    /// Create a reader with explicit options.
    pub fn with_options(reader: R, options: ReaderOptions) -> Self {
        RecordStreamReader {
            reader,
            buffer: BytesMut::with_capacity(READ_CHUNK),
            gap_bytes: options.gap_bytes,
            eof: false,
            failed: false,
            position: 0,
            records_read: 0,
        }
    }

    /// Replace the set of bytes skipped between records.
    ///
    /// ```
    /// use iso2709::RecordStreamReader;
    ///
    /// let reader = RecordStreamReader::new(&b""[..]).with_gap_bytes(*b" \r\n");
    /// assert_eq!(reader.gap_bytes(), b" \r\n");
    /// ```
    #[must_use]
    pub fn with_gap_bytes(mut self, gap_bytes: impl Into<Vec<u8>>) -> Self {
        self.gap_bytes = gap_bytes.into();
        self
    }

    /// The bytes skipped between records.
    #[must_use]
    pub fn gap_bytes(&self) -> &[u8] {
        &self.gap_bytes
    }

    /// Number of record blocks extracted so far, including ones that later
    /// failed to parse.
    #[must_use]
    pub fn records_read(&self) -> usize {
        self.records_read
    }

    /// Bytes consumed from the underlying stream.
    #[must_use]
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Read and parse the next record.
    ///
    /// Returns `Ok(None)` once fewer than 26 bytes remain, or only gap bytes
    /// remain.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`RecordStreamReader::next_raw_record`] and of
    /// [`Record::parse`]. After a parse error the reader is positioned at the
    /// next record.
    pub fn next_record(&mut self) -> Result<Option<Record>> {
        match self.next_raw_record()? {
            Some(block) => Record::parse(&block).map(Some),
            None => Ok(None),
        }
    }

    /// Extract the next record's bytes without parsing them.
    ///
    /// The block starts with the five-digit length prefix and ends with the
    /// record terminator. When the declared length stops short of the
    /// terminator, the bytes up to it are discarded and the terminator is
    /// appended to the block.
    ///
    /// # Errors
    ///
    /// - [`MarcError::MalformedRecord`] if the length prefix is not five
    ///   digits or declares fewer than five bytes
    /// - [`MarcError::UnexpectedEndOfStream`] if the stream ends inside the
    ///   declared length or before a record terminator is found
    /// - [`MarcError::IoError`] if the underlying reader fails
    pub fn next_raw_record(&mut self) -> Result<Option<Bytes>> {
        let result = self.extract_block();
        if result.is_err() {
            self.failed = true;
        }
        result
    }

    fn extract_block(&mut self) -> Result<Option<Bytes>> {
        if !self.fill_to(MIN_STREAM_RECORD_LEN)? {
            return Ok(None);
        }
        if !self.skip_gap_bytes()? {
            return Ok(None);
        }

        if !self.fill_to(LENGTH_PREFIX_LEN)? {
            return Err(MarcError::UnexpectedEndOfStream(format!(
                "stream ends inside a record length prefix at byte {}",
                self.position
            )));
        }
        let declared = parse_decimal(&self.buffer[..LENGTH_PREFIX_LEN]).map_err(|e| {
            MarcError::MalformedRecord(format!(
                "invalid record length prefix at byte {}: {e}",
                self.position
            ))
        })?;
        if declared < LENGTH_PREFIX_LEN {
            return Err(MarcError::MalformedRecord(format!(
                "record at byte {} declares a length of {declared}",
                self.position
            )));
        }

        if !self.fill_to(declared)? {
            return Err(MarcError::UnexpectedEndOfStream(format!(
                "record at byte {} declares {declared} bytes, only {} remain",
                self.position,
                self.buffer.len()
            )));
        }
        let mut block = self.buffer.split_to(declared);
        self.position += declared as u64;

        if block.last() != Some(&RECORD_TERMINATOR) {
            let discarded = self.discard_through_terminator()?;
            warn!(
                position = self.position,
                discarded, "declared record length stops short of the record terminator"
            );
            block.extend_from_slice(&[RECORD_TERMINATOR]);
        }

        self.records_read += 1;
        Ok(Some(block.freeze()))
    }

    /// Skip gap bytes. Returns false if the stream ends first.
    fn skip_gap_bytes(&mut self) -> Result<bool> {
        let mut skipped = 0;
        loop {
            if !self.fill_to(1)? {
                if skipped > 0 {
                    debug!(skipped, "stream ends in gap bytes");
                }
                return Ok(false);
            }
            let run = self
                .buffer
                .iter()
                .take_while(|b| self.gap_bytes.contains(*b))
                .count();
            if run == 0 {
                break;
            }
            self.consume(run);
            skipped += run;
        }
        if skipped > 0 {
            debug!(skipped, position = self.position, "skipped gap bytes");
        }
        Ok(true)
    }

    /// Discard bytes up to and including the next record terminator.
    /// Returns the number of bytes discarded before the terminator.
    fn discard_through_terminator(&mut self) -> Result<usize> {
        let mut discarded = 0;
        loop {
            if let Some(index) = memchr::memchr(RECORD_TERMINATOR, &self.buffer) {
                self.consume(index + 1);
                return Ok(discarded + index);
            }
            discarded += self.buffer.len();
            self.consume(self.buffer.len());
            if !self.fill_to(1)? {
                return Err(MarcError::UnexpectedEndOfStream(format!(
                    "no record terminator before end of stream ({discarded} bytes scanned)"
                )));
            }
        }
    }

    fn consume(&mut self, count: usize) {
        self.buffer.advance(count);
        self.position += count as u64;
    }

    /// Buffer at least `needed` bytes. Returns false if the stream ends first.
    fn fill_to(&mut self, needed: usize) -> Result<bool> {
        let mut chunk = [0u8; READ_CHUNK];
        while self.buffer.len() < needed && !self.eof {
            match self.reader.read(&mut chunk) {
                Ok(0) => self.eof = true,
                Ok(n) => self.buffer.extend_from_slice(&chunk[..n]),
                Err(e) if e.kind() == ErrorKind::Interrupted => {},
                Err(e) => return Err(MarcError::IoError(e)),
            }
        }
        Ok(self.buffer.len() >= needed)
    }
}

impl<R: Read> Iterator for RecordStreamReader<R> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        self.next_record().transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{ControlNumberField, DataField};
    use crate::subfield::Subfield;
    use std::io::Cursor;

    fn record_bytes(control_number: &[u8]) -> Vec<u8> {
        let mut record = Record::new(2, 2).unwrap();
        let mut control = ControlNumberField::new(0);
        control.set_value(control_number);
        record.add_entry(control.into()).unwrap();
        let mut title = DataField::new(b"200", record.widths()).unwrap();
        title.set_indicator(b"1 ").unwrap();
        title
            .add_subfield(Subfield::with_content(b"a", b"Title"))
            .unwrap();
        record.add_entry(title.into()).unwrap();
        record.serialize().unwrap()
    }

    fn control_number(record: &Record) -> Vec<u8> {
        record.entry_at(0).unwrap().serialize()
    }

    #[test]
    fn test_reads_records_separated_by_line_breaks() {
        let mut data = record_bytes(b"one");
        data.extend_from_slice(b"\r\n");
        data.extend_from_slice(&record_bytes(b"two"));
        data.extend_from_slice(b"\r\n");

        let mut reader = RecordStreamReader::new(Cursor::new(data));
        let first = reader.next_record().unwrap().unwrap();
        let second = reader.next_record().unwrap().unwrap();
        assert_eq!(control_number(&first), b"one\x1E");
        assert_eq!(control_number(&second), b"two\x1E");
        assert!(reader.next_record().unwrap().is_none());
        assert_eq!(reader.records_read(), 2);
    }

    #[test]
    fn test_empty_stream() {
        let mut reader = RecordStreamReader::new(Cursor::new(Vec::new()));
        assert!(reader.next_record().unwrap().is_none());
    }

    #[test]
    fn test_short_trailing_padding_is_end_of_stream() {
        let mut data = record_bytes(b"one");
        data.extend_from_slice(b"00012garbage");
        let mut reader = RecordStreamReader::new(Cursor::new(data));
        assert!(reader.next_record().unwrap().is_some());
        assert!(reader.next_record().unwrap().is_none());
    }

    #[test]
    fn test_gap_bytes_to_end_of_stream() {
        let mut data = record_bytes(b"one");
        data.extend(std::iter::repeat(b'\n').take(40));
        let mut reader = RecordStreamReader::new(Cursor::new(data));
        assert!(reader.next_record().unwrap().is_some());
        assert!(reader.next_record().unwrap().is_none());
    }

    #[test]
    fn test_declared_length_without_terminator() {
        let mut first = record_bytes(b"one");
        let short = format!("{:05}", first.len() - 1);
        first[..5].copy_from_slice(short.as_bytes());
        let first_len = first.len() as u64;

        let mut data = first.clone();
        data.extend_from_slice(&record_bytes(b"two"));

        let mut reader = RecordStreamReader::new(Cursor::new(data));
        let block = reader.next_raw_record().unwrap().unwrap();
        assert_eq!(block.last(), Some(&RECORD_TERMINATOR));
        assert_eq!(block.len(), first.len());
        assert_eq!(reader.position(), first_len);

        let second = reader.next_record().unwrap().unwrap();
        assert_eq!(control_number(&second), b"two\x1E");
    }

    #[test]
    fn test_junk_before_terminator_is_discarded() {
        let mut first = record_bytes(b"one");
        first.pop();
        first.extend_from_slice(b"junk\x1D");

        let mut reader = RecordStreamReader::new(Cursor::new(first.clone()));
        let record = reader.next_record().unwrap().unwrap();
        assert_eq!(control_number(&record), b"one\x1E");
        assert_eq!(reader.position(), first.len() as u64);
    }

    #[test]
    fn test_truncated_body() {
        let mut data = record_bytes(b"one");
        data.truncate(data.len() - 10);
        let mut reader = RecordStreamReader::new(Cursor::new(data));
        assert!(matches!(
            reader.next_record(),
            Err(MarcError::UnexpectedEndOfStream(_))
        ));
    }

    #[test]
    fn test_missing_terminator_at_end_of_stream() {
        let mut data = record_bytes(b"one");
        data.pop();
        let short = format!("{:05}", data.len());
        data[..5].copy_from_slice(short.as_bytes());
        let mut reader = RecordStreamReader::new(Cursor::new(data));
        assert!(matches!(
            reader.next_record(),
            Err(MarcError::UnexpectedEndOfStream(_))
        ));
    }

    #[test]
    fn test_non_digit_length_prefix() {
        let mut data = record_bytes(b"one");
        data[2] = b'x';
        let mut reader = RecordStreamReader::new(Cursor::new(data));
        assert!(matches!(
            reader.next_record(),
            Err(MarcError::MalformedRecord(_))
        ));
    }

    #[test]
    fn test_custom_gap_bytes() {
        let mut data = b"  ".to_vec();
        data.extend_from_slice(&record_bytes(b"one"));
        let mut reader = RecordStreamReader::new(Cursor::new(data)).with_gap_bytes(*b" ");
        assert!(reader.next_record().unwrap().is_some());
    }

    #[test]
    fn test_parse_error_does_not_stop_iteration() {
        let mut bad = record_bytes(b"bad");
        let directory_end = 24 + 12 * 2;
        bad[directory_end] = b'X';

        let mut data = bad;
        data.extend_from_slice(&record_bytes(b"good"));

        let results: Vec<Result<Record>> = RecordStreamReader::new(Cursor::new(data)).collect();
        assert_eq!(results.len(), 2);
        assert!(matches!(results[0], Err(MarcError::MalformedRecord(_))));
        let good = results[1].as_ref().unwrap();
        assert_eq!(control_number(good), b"good\x1E");
    }

    #[test]
    fn test_iteration_stops_after_stream_error() {
        let mut data = record_bytes(b"one");
        data.truncate(40);
        let results: Vec<Result<Record>> = RecordStreamReader::new(Cursor::new(data)).collect();
        assert_eq!(results.len(), 1);
        assert!(results[0].is_err());
    }
}
