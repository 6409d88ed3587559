//! Fixed-capacity byte buffers for tags, indicators and header segments.
//!
//! ISO 2709 stores most of its structural data in short, fixed-width byte
//! runs: the three-byte tag, the indicator, the leader's implementation code
//! and the four-digit directory map. [`FixedByteBuffer`] models one such run.
//! Its capacity is chosen at construction and never changes; assignment
//! overwrites the buffer from the left.

use crate::encoding::TextEncoding;
use crate::error::{MarcError, Result};
use smallvec::SmallVec;
use std::cmp::Ordering;
use std::fmt;

/// A byte run of fixed capacity.
///
/// # Examples
///
/// ```
/// use iso2709::FixedByteBuffer;
///
/// let mut map = FixedByteBuffer::with_capacity(4);
/// map.set_value(b"450 ")?;
/// assert_eq!(map.as_int(0, 1)?, 4);
/// assert_eq!(map.as_int(1, 1)?, 5);
/// assert!(map.set_value(b"45000").is_err());
/// # Ok::<(), iso2709::MarcError>(())
/// ```
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct FixedByteBuffer {
    raw: SmallVec<[u8; 8]>,
}

impl FixedByteBuffer {
    /// Create a zero-filled buffer of the given capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        FixedByteBuffer {
            raw: SmallVec::from_elem(0, capacity),
        }
    }

    /// Create a buffer whose capacity and content are both taken from `bytes`.
    #[must_use]
    pub fn from_bytes(bytes: &[u8]) -> Self {
        FixedByteBuffer {
            raw: SmallVec::from_slice(bytes),
        }
    }

    /// The fixed capacity of this buffer.
    #[must_use]
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    /// Whether the buffer has zero capacity.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// The raw bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.raw
    }

    /// Copy `bytes` into the buffer, left-aligned.
    ///
    /// Bytes past the end of `bytes` keep whatever value they held before.
    ///
    /// # Errors
    ///
    /// Returns [`MarcError::CapacityExceeded`] if `bytes` is longer than the
    /// buffer's capacity. The buffer is left untouched in that case.
    pub fn set_value(&mut self, bytes: &[u8]) -> Result<()> {
        if bytes.len() > self.raw.len() {
            return Err(MarcError::CapacityExceeded(format!(
                "{} bytes do not fit a buffer of capacity {}",
                bytes.len(),
                self.raw.len()
            )));
        }
        self.raw[..bytes.len()].copy_from_slice(bytes);
        Ok(())
    }

    /// Read `count` bytes starting at `offset` as an unsigned decimal number.
    ///
    /// # Errors
    ///
    /// Returns [`MarcError::InvalidArgument`] if the range falls outside the
    /// buffer, or [`MarcError::FormatError`] if the range is empty or holds
    /// anything other than ASCII digits.
    pub fn as_int(&self, offset: usize, count: usize) -> Result<usize> {
        parse_decimal(self.slice(offset, count)?)
    }

    /// Decode `count` bytes starting at `offset` as text.
    ///
    /// # Errors
    ///
    /// Returns [`MarcError::InvalidArgument`] if the range falls outside the
    /// buffer.
    pub fn as_text(&self, offset: usize, count: usize, encoding: &TextEncoding) -> Result<String> {
        Ok(encoding.decode(self.slice(offset, count)?))
    }

    /// The whole buffer as ASCII text, with non-ASCII bytes replaced.
    ///
    /// Tags and indicators are ASCII by convention, so this is what pattern
    /// matching and display use.
    #[must_use]
    pub fn to_ascii_string(&self) -> String {
        self.raw
            .iter()
            .map(|&b| if b.is_ascii() { b as char } else { '\u{FFFD}' })
            .collect()
    }

    fn slice(&self, offset: usize, count: usize) -> Result<&[u8]> {
        let end = offset.checked_add(count).filter(|&end| end <= self.raw.len());
        match end {
            Some(end) => Ok(&self.raw[offset..end]),
            None => Err(MarcError::InvalidArgument(format!(
                "range {offset}+{count} is outside a buffer of capacity {}",
                self.raw.len()
            ))),
        }
    }
}

/// Parse a run of ASCII digits as an unsigned decimal number.
///
/// # Errors
///
/// Returns [`MarcError::FormatError`] for an empty run, a non-digit byte, or
/// a value that overflows `usize`.
pub(crate) fn parse_decimal(bytes: &[u8]) -> Result<usize> {
    if bytes.is_empty() {
        return Err(MarcError::FormatError("expected digits, got nothing".to_string()));
    }
    let mut result = 0usize;
    for &byte in bytes {
        if !byte.is_ascii_digit() {
            return Err(MarcError::FormatError(format!(
                "expected digits, got byte 0x{byte:02X} in {:?}",
                String::from_utf8_lossy(bytes)
            )));
        }
        result = result
            .checked_mul(10)
            .and_then(|r| r.checked_add(usize::from(byte - b'0')))
            .ok_or_else(|| MarcError::FormatError("numeric field overflows".to_string()))?;
    }
    Ok(result)
}

impl Ord for FixedByteBuffer {
    /// Byte-wise comparison bounded by the left operand's length.
    ///
    /// Walking the left buffer, a position past the end of the right buffer
    /// makes the left one greater; otherwise the first differing byte decides.
    /// If the walk completes, equal lengths compare equal and a shorter left
    /// buffer compares less.
    fn cmp(&self, other: &Self) -> Ordering {
        for (i, &byte) in self.raw.iter().enumerate() {
            match other.raw.get(i) {
                None => return Ordering::Greater,
                Some(&theirs) if theirs != byte => return byte.cmp(&theirs),
                Some(_) => {},
            }
        }
        if self.raw.len() == other.raw.len() {
            Ordering::Equal
        } else {
            Ordering::Less
        }
    }
}

impl PartialOrd for FixedByteBuffer {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Debug for FixedByteBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FixedByteBuffer({:?})", self.raw.escape_ascii().to_string())
    }
}
