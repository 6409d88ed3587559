//! Parallel record parsing using Rayon.
//!
//! [`Record::parse`] is stateless, so once raw record blocks have been pulled
//! off a stream (see [`RecordStreamReader::next_raw_record`]) they can be
//! parsed on Rayon's work-stealing pool. Results keep the input order.
//!
//! # Examples
//!
//! ```no_run
//! use iso2709::parallel::parse_batch_parallel;
//! use iso2709::RecordStreamReader;
//! use std::fs::File;
//!
//! let mut reader = RecordStreamReader::new(File::open("records.iso")?);
//! let mut blocks = Vec::new();
//! while let Some(block) = reader.next_raw_record()? {
//!     blocks.push(block);
//! }
//!
//! let records = parse_batch_parallel(&blocks)?;
//! println!("Parsed {} records in parallel", records.len());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! [`RecordStreamReader::next_raw_record`]: crate::RecordStreamReader::next_raw_record

use crate::error::{MarcError, Result};
use crate::record::Record;
use rayon::prelude::*;

/// Parse every block in parallel, failing on the first block that does not
/// parse.
///
/// # Errors
///
/// Returns the error of a failing block, prefixed with its index.
pub fn parse_batch_parallel<B>(blocks: &[B]) -> Result<Vec<Record>>
where
    B: AsRef<[u8]> + Sync,
{
    blocks
        .par_iter()
        .enumerate()
        .map(|(index, block)| Record::parse(block.as_ref()).map_err(|e| at_index(index, e)))
        .collect()
}

/// Parse every block in parallel, keeping one result per block.
pub fn parse_each_parallel<B>(blocks: &[B]) -> Vec<Result<Record>>
where
    B: AsRef<[u8]> + Sync,
{
    blocks
        .par_iter()
        .map(|block| Record::parse(block.as_ref()))
        .collect()
}

fn at_index(index: usize, error: MarcError) -> MarcError {
    match error {
        MarcError::MalformedRecord(msg) => {
            MarcError::MalformedRecord(format!("block {index}: {msg}"))
        },
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::ControlNumberField;

    fn block(control_number: &str) -> Vec<u8> {
        let mut record = Record::new(2, 2).unwrap();
        let mut control = ControlNumberField::new(0);
        control.set_value(control_number.as_bytes());
        record.add_entry(control.into()).unwrap();
        record.serialize().unwrap()
    }

    #[test]
    fn test_parse_batch_keeps_order() {
        let blocks: Vec<Vec<u8>> = (0..64).map(|i| block(&format!("{i:04}"))).collect();
        let records = parse_batch_parallel(&blocks).unwrap();
        assert_eq!(records.len(), 64);
        for (i, record) in records.iter().enumerate() {
            assert_eq!(record.serialize().unwrap(), blocks[i]);
        }
    }

    #[test]
    fn test_parse_batch_empty() {
        let blocks: Vec<Vec<u8>> = Vec::new();
        assert!(parse_batch_parallel(&blocks).unwrap().is_empty());
    }

    #[test]
    fn test_parse_batch_reports_failing_block() {
        let mut blocks = vec![block("a"), block("b"), block("c")];
        blocks[1].truncate(10);
        let err = parse_batch_parallel(&blocks).unwrap_err();
        assert!(matches!(err, MarcError::MalformedRecord(ref msg) if msg.starts_with("block 1:")));
    }

    #[test]
    fn test_parse_each_keeps_failures_in_place() {
        let blocks: Vec<&[u8]> = vec![b"short", b"also short"];
        let results = parse_each_parallel(&blocks);
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(Result::is_err));
    }
}
