//! Error types for ISO 2709 operations.
//!
//! This module provides the [`MarcError`] type for all codec operations
//! and the [`Result`] convenience type.

use thiserror::Error;

/// Error type for all codec operations.
///
/// Every structural violation found while parsing is surfaced through one of
/// these variants; a record is either parsed completely or not at all.
#[derive(Error, Debug)]
pub enum MarcError {
    /// The record bytes are structurally invalid: header too short, directory
    /// not terminated, stride mismatch, or a non-digit where digits belong.
    #[error("Malformed record: {0}")]
    MalformedRecord(String),

    /// An entry's configured widths disagree with the record it is added to.
    #[error("Structure mismatch: {0}")]
    StructureMismatch(String),

    /// A value does not fit the fixed width reserved for it.
    #[error("Capacity exceeded: {0}")]
    CapacityExceeded(String),

    /// A subfield operation was attempted on a field that has no subfields.
    #[error("Invalid field access: {0}")]
    InvalidFieldAccess(String),

    /// The stream ended inside a record.
    #[error("Unexpected end of stream: {0}")]
    UnexpectedEndOfStream(String),

    /// A required argument was empty or out of range.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A byte range expected to hold ASCII decimal digits did not.
    #[error("Format error: {0}")]
    FormatError(String),

    /// Text could not be converted under the configured encoding.
    #[error("Encoding error: {0}")]
    EncodingError(String),

    /// IO error from the underlying source/destination.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Convenience type alias for [`std::result::Result`] with [`MarcError`].
pub type Result<T> = std::result::Result<T, MarcError>;
