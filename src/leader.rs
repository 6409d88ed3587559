//! ISO 2709 record leader parsing and rendering.
//!
//! The leader is a 24-byte fixed-length header at the start of every record.
//! Unlike MARC 21, which fixes most of its values, ISO 2709 keeps the widths
//! that drive the rest of the parse in the leader itself.
//!
//! # Structure
//!
//! - Positions 0-4: Record length (5 digits)
//! - Position 5: Record status
//! - Positions 6-9: Implementation codes
//! - Position 10: Indicator width (1 digit)
//! - Position 11: Subfield identifier width (1 digit)
//! - Positions 12-16: Base address of data (5 digits)
//! - Positions 17-19: User-defined
//! - Positions 20-23: Directory map: field length digit count, start
//!   position digit count, implementation-defined byte count, reserved

use crate::error::{MarcError, Result};
use crate::fixed_buffer::{parse_decimal, FixedByteBuffer};
use std::fmt;

/// Length of the leader in bytes.
pub const LEADER_LEN: usize = 24;

/// Default status for new records (`n`, new).
pub const DEFAULT_STATUS: u8 = b'n';
/// Default implementation codes for new records.
pub const DEFAULT_IMPLEMENTATION_CODE: &[u8; 4] = b"am0 ";
/// Default user-defined bytes for new records.
pub const DEFAULT_USER_DEFINED: &[u8; 3] = b"   ";
/// Default directory map: 4 length digits, 5 start position digits, no
/// implementation-defined bytes.
pub const DEFAULT_DIRECTORY_MAP: &[u8; 4] = b"450 ";

/// Leader positions 20-23: the layout of each directory entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DirectoryMap(FixedByteBuffer);

impl DirectoryMap {
    /// Build a map from its three meaningful digits. The reserved fourth
    /// byte is a space.
    ///
    /// # Errors
    ///
    /// Returns [`MarcError::InvalidArgument`] if a count is not a single digit.
    pub fn new(
        field_length_digits: usize,
        start_position_digits: usize,
        implementation_defined_width: usize,
    ) -> Result<Self> {
        let mut bytes = [b' '; 4];
        for (slot, (name, value)) in bytes.iter_mut().zip([
            ("field length digit count", field_length_digits),
            ("start position digit count", start_position_digits),
            ("implementation-defined width", implementation_defined_width),
        ]) {
            *slot = digit_byte(name, value)?;
        }
        Ok(DirectoryMap(FixedByteBuffer::from_bytes(&bytes)))
    }

    /// Wrap four leader bytes, checking that the first three are digits.
    ///
    /// # Errors
    ///
    /// Returns [`MarcError::MalformedRecord`] if `bytes` is not four bytes or
    /// any of the first three is not a digit.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != 4 || !bytes[..3].iter().all(u8::is_ascii_digit) {
            return Err(MarcError::MalformedRecord(format!(
                "invalid directory map '{}'",
                String::from_utf8_lossy(bytes)
            )));
        }
        Ok(DirectoryMap(FixedByteBuffer::from_bytes(bytes)))
    }

    /// The raw four bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    fn digit(&self, index: usize) -> usize {
        usize::from(self.0.as_bytes()[index] - b'0')
    }

    /// Number of digits in each entry's field length.
    #[must_use]
    pub fn field_length_digits(&self) -> usize {
        self.digit(0)
    }

    /// Number of digits in each entry's start position.
    #[must_use]
    pub fn start_position_digits(&self) -> usize {
        self.digit(1)
    }

    /// Number of implementation-defined bytes in each entry.
    #[must_use]
    pub fn implementation_defined_width(&self) -> usize {
        self.digit(2)
    }

    /// Bytes per directory entry: the tag plus the three widths.
    #[must_use]
    pub fn entry_size(&self) -> usize {
        3 + self.field_length_digits()
            + self.start_position_digits()
            + self.implementation_defined_width()
    }

    /// The exclusive upper bound on a field length: `10^digits`.
    #[must_use]
    pub fn field_length_limit(&self) -> usize {
        10usize.pow(u32::try_from(self.field_length_digits()).unwrap_or(0))
    }
}

impl Default for DirectoryMap {
    fn default() -> Self {
        DirectoryMap(FixedByteBuffer::from_bytes(DEFAULT_DIRECTORY_MAP))
    }
}

/// Record leader - 24 bytes at the start of every record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Leader {
    /// Record length (5 digits) - positions 0-4
    pub record_length: usize,
    /// Record status - position 5
    pub status: u8,
    /// Implementation codes - positions 6-9
    pub implementation_code: FixedByteBuffer,
    /// Indicator width (1 digit) - position 10
    pub indicator_width: usize,
    /// Subfield identifier width (1 digit) - position 11
    pub identifier_width: usize,
    /// Base address of data (5 digits) - positions 12-16
    pub base_address: usize,
    /// User-defined - positions 17-19
    pub user_defined: FixedByteBuffer,
    /// Directory map - positions 20-23
    pub directory_map: DirectoryMap,
}

impl Leader {
    /// Parse a leader from the first 24 bytes of `bytes`.
    ///
    /// # Errors
    ///
    /// Returns [`MarcError::MalformedRecord`] if fewer than 24 bytes are
    /// given, or a digit position holds anything but an ASCII digit.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < LEADER_LEN {
            return Err(MarcError::MalformedRecord(format!(
                "Leader must be at least 24 bytes, got {}",
                bytes.len()
            )));
        }

        Ok(Leader {
            record_length: leader_number(&bytes[0..5], "record length")?,
            status: bytes[5],
            implementation_code: FixedByteBuffer::from_bytes(&bytes[6..10]),
            indicator_width: leader_number(&bytes[10..11], "indicator width")?,
            identifier_width: leader_number(&bytes[11..12], "identifier width")?,
            base_address: leader_number(&bytes[12..17], "base address")?,
            user_defined: FixedByteBuffer::from_bytes(&bytes[17..20]),
            directory_map: DirectoryMap::from_bytes(&bytes[20..24])?,
        })
    }

    /// Serialize the leader to 24 bytes.
    ///
    /// # Errors
    ///
    /// Returns [`MarcError::CapacityExceeded`] if the record length or base
    /// address needs more than five digits, or a width more than one.
    pub fn as_bytes(&self) -> Result<Vec<u8>> {
        let mut bytes = Vec::with_capacity(LEADER_LEN);
        push_number(&mut bytes, self.record_length, 5, "record length")?;
        bytes.push(self.status);
        bytes.extend_from_slice(self.implementation_code.as_bytes());
        push_number(&mut bytes, self.indicator_width, 1, "indicator width")?;
        push_number(&mut bytes, self.identifier_width, 1, "identifier width")?;
        push_number(&mut bytes, self.base_address, 5, "base address")?;
        bytes.extend_from_slice(self.user_defined.as_bytes());
        bytes.extend_from_slice(self.directory_map.as_bytes());

        if bytes.len() != LEADER_LEN {
            return Err(MarcError::InvalidArgument(format!(
                "leader segments add up to {} bytes, expected 24",
                bytes.len()
            )));
        }
        Ok(bytes)
    }
}

impl fmt::Display for Leader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:05}{}{}{}{}{:05}{}{}",
            self.record_length,
            self.status.escape_ascii(),
            self.implementation_code.as_bytes().escape_ascii(),
            self.indicator_width,
            self.identifier_width,
            self.base_address,
            self.user_defined.as_bytes().escape_ascii(),
            self.directory_map.as_bytes().escape_ascii(),
        )
    }
}

fn leader_number(bytes: &[u8], name: &str) -> Result<usize> {
    parse_decimal(bytes).map_err(|e| MarcError::MalformedRecord(format!("Invalid {name}: {e}")))
}

fn digit_byte(name: &str, value: usize) -> Result<u8> {
    u8::try_from(value)
        .ok()
        .filter(|v| *v <= 9)
        .map(|v| b'0' + v)
        .ok_or_else(|| MarcError::InvalidArgument(format!("{name} must be 0-9, got {value}")))
}

/// Append `value` as a zero-padded decimal of exactly `digits` digits.
///
/// # Errors
///
/// Returns [`MarcError::CapacityExceeded`] if the value does not fit.
pub(crate) fn push_number(out: &mut Vec<u8>, value: usize, digits: usize, name: &str) -> Result<()> {
    let rendered = format!("{value:0digits$}");
    if digits == 0 || rendered.len() > digits {
        return Err(MarcError::CapacityExceeded(format!(
            "{name} {value} does not fit in {digits} digits"
        )));
    }
    out.extend_from_slice(rendered.as_bytes());
    Ok(())
}
