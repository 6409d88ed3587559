//! Configuration passed explicitly into display, text and stream operations.
//!
//! Nothing here is process-global: two callers with different encodings or
//! display characters can work on records concurrently without interfering.

use crate::encoding::TextEncoding;

/// Carriage return and line feed, the noise most producers leave between records.
pub const DEFAULT_GAP_BYTES: [u8; 2] = [0x0D, 0x0A];

/// Options for rendering and constructing text content.
///
/// # Examples
///
/// ```
/// use iso2709::{CodecConfig, TextEncoding};
///
/// let config = CodecConfig {
///     encoding: TextEncoding::for_label("gb18030")?,
///     ..Default::default()
/// };
/// assert_eq!(config.subfield_display_char, '$');
/// # Ok::<(), iso2709::MarcError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodecConfig {
    /// Mapping between content bytes and text.
    pub encoding: TextEncoding,

    /// Character shown in place of the subfield delimiter (0x1F) when a
    /// subfield is displayed.
    pub subfield_display_char: char,
}

impl Default for CodecConfig {
    fn default() -> Self {
        CodecConfig {
            encoding: TextEncoding::utf8(),
            subfield_display_char: '$',
        }
    }
}

/// Options for [`RecordStreamReader`](crate::reader::RecordStreamReader).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReaderOptions {
    /// Byte values skipped between records.
    pub gap_bytes: Vec<u8>,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        ReaderOptions {
            gap_bytes: DEFAULT_GAP_BYTES.to_vec(),
        }
    }
}
