//! Character encoding support for record content.
//!
//! ISO 2709 does not fix a character set: UNIMARC/CNMARC exports are often
//! GB18030, older Western exports a Windows code page, modern ones UTF-8.
//! The codec itself only moves bytes; text is involved only when content is
//! displayed or built from a `&str`. [`TextEncoding`] is the caller-supplied
//! mapping used at those points, backed by `encoding_rs`.

use crate::error::{MarcError, Result};

/// A byte<->text mapping for field and subfield content.
///
/// # Examples
///
/// ```
/// use iso2709::TextEncoding;
///
/// let gb = TextEncoding::for_label("gb18030")?;
/// let bytes = gb.encode("中文")?;
/// assert_eq!(bytes.len(), 4);
/// assert_eq!(gb.decode(&bytes), "中文");
/// # Ok::<(), iso2709::MarcError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextEncoding(&'static encoding_rs::Encoding);

impl TextEncoding {
    /// UTF-8.
    #[must_use]
    pub fn utf8() -> Self {
        TextEncoding(encoding_rs::UTF_8)
    }

    /// Look up an encoding by its WHATWG label, such as `"gb18030"`,
    /// `"windows-1252"` or `"utf-8"`.
    ///
    /// # Errors
    ///
    /// Returns [`MarcError::InvalidArgument`] if the label is unknown.
    pub fn for_label(label: &str) -> Result<Self> {
        encoding_rs::Encoding::for_label(label.trim().as_bytes())
            .map(TextEncoding)
            .ok_or_else(|| MarcError::InvalidArgument(format!("unknown encoding label '{label}'")))
    }

    /// Wrap an `encoding_rs` encoding directly.
    #[must_use]
    pub fn from_encoding(encoding: &'static encoding_rs::Encoding) -> Self {
        TextEncoding(encoding)
    }

    /// Canonical name of the encoding.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.0.name()
    }

    /// Decode bytes to text. Malformed sequences become U+FFFD.
    #[must_use]
    pub fn decode(&self, bytes: &[u8]) -> String {
        self.0.decode_without_bom_handling(bytes).0.into_owned()
    }

    /// Encode text to bytes.
    ///
    /// # Errors
    ///
    /// Returns [`MarcError::EncodingError`] if `text` contains characters the
    /// encoding cannot represent.
    pub fn encode(&self, text: &str) -> Result<Vec<u8>> {
        let (bytes, _, had_errors) = self.0.encode(text);
        if had_errors {
            return Err(MarcError::EncodingError(format!(
                "text cannot be represented in {}",
                self.0.name()
            )));
        }
        Ok(bytes.into_owned())
    }
}

impl Default for TextEncoding {
    fn default() -> Self {
        Self::utf8()
    }
}
