//! Subfields: delimited data elements inside a data field.

use crate::config::CodecConfig;
use crate::error::Result;
use crate::fixed_buffer::FixedByteBuffer;
use std::cmp::Ordering;

/// Subfield delimiter (0x1F). Every subfield identifier starts with it.
pub const SUBFIELD_DELIMITER: u8 = 0x1F;

/// A subfield within a data field.
///
/// The identifier always begins with [`SUBFIELD_DELIMITER`], followed by zero
/// or more identifier-code bytes (`identifier_width - 1` of them inside a
/// record). The content is raw bytes and carries no terminator.
///
/// # Examples
///
/// ```
/// use iso2709::{CodecConfig, Subfield};
///
/// let mut subfield = Subfield::new(b"a");
/// subfield.set_value(b"The Great Gatsby");
/// assert_eq!(subfield.identifier().as_bytes(), b"\x1Fa");
/// assert_eq!(subfield.length(), 18);
/// assert_eq!(
///     subfield.to_display_string(&CodecConfig::default()),
///     "$aThe Great Gatsby"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Subfield {
    identifier: FixedByteBuffer,
    content: Vec<u8>,
}

impl Subfield {
    /// Create an empty subfield. The delimiter is prepended to `identifier`
    /// unless it is already there.
    #[must_use]
    pub fn new(identifier: &[u8]) -> Self {
        let identifier = if identifier.first() == Some(&SUBFIELD_DELIMITER) {
            FixedByteBuffer::from_bytes(identifier)
        } else {
            let mut bytes = Vec::with_capacity(identifier.len() + 1);
            bytes.push(SUBFIELD_DELIMITER);
            bytes.extend_from_slice(identifier);
            FixedByteBuffer::from_bytes(&bytes)
        };
        Subfield {
            identifier,
            content: Vec::new(),
        }
    }

    /// Create a subfield with content.
    #[must_use]
    pub fn with_content(identifier: &[u8], content: &[u8]) -> Self {
        let mut subfield = Subfield::new(identifier);
        subfield.set_value(content);
        subfield
    }

    /// Create a subfield whose content is `text` under the configured encoding.
    ///
    /// # Errors
    ///
    /// Returns [`MarcError::EncodingError`](crate::MarcError::EncodingError)
    /// if the text cannot be encoded.
    pub fn with_text(identifier: &[u8], text: &str, config: &CodecConfig) -> Result<Self> {
        let mut subfield = Subfield::new(identifier);
        subfield.set_text(text, config)?;
        Ok(subfield)
    }

    /// The identifier, delimiter included.
    #[must_use]
    pub fn identifier(&self) -> &FixedByteBuffer {
        &self.identifier
    }

    /// The identifier code: the bytes after the delimiter.
    #[must_use]
    pub fn code(&self) -> &[u8] {
        &self.identifier.as_bytes()[1..]
    }

    /// The raw content.
    #[must_use]
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// Replace the content.
    pub fn set_value(&mut self, content: &[u8]) {
        self.content.clear();
        self.content.extend_from_slice(content);
    }

    /// Replace the content with `text` under the configured encoding.
    ///
    /// # Errors
    ///
    /// Returns [`MarcError::EncodingError`](crate::MarcError::EncodingError)
    /// if the text cannot be encoded. The content is unchanged in that case.
    pub fn set_text(&mut self, text: &str, config: &CodecConfig) -> Result<()> {
        self.content = config.encoding.encode(text)?;
        Ok(())
    }

    /// Serialized length: identifier plus content.
    #[must_use]
    pub fn length(&self) -> usize {
        self.identifier.len() + self.content.len()
    }

    /// Identifier bytes followed by content bytes, with no terminator.
    #[must_use]
    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.length());
        self.write_to(&mut out);
        out
    }

    pub(crate) fn write_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(self.identifier.as_bytes());
        out.extend_from_slice(&self.content);
    }

    /// Order two subfields by identifier.
    #[must_use]
    pub fn cmp_by_identifier(&self, other: &Self) -> Ordering {
        self.identifier.cmp(&other.identifier)
    }

    /// Display form: the configured delimiter character, the identifier code,
    /// then the decoded content.
    #[must_use]
    pub fn to_display_string(&self, config: &CodecConfig) -> String {
        let mut out = String::new();
        out.push(config.subfield_display_char);
        out.push_str(&config.encoding.decode(self.code()));
        out.push_str(&config.encoding.decode(&self.content));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::TextEncoding;

    #[test]
    fn test_delimiter_is_prepended_once() {
        let plain = Subfield::new(b"a");
        let delimited = Subfield::new(b"\x1Fa");
        assert_eq!(plain.identifier(), delimited.identifier());
        assert_eq!(plain.code(), b"a");
    }

    #[test]
    fn test_empty_identifier() {
        let subfield = Subfield::new(b"");
        assert_eq!(subfield.identifier().as_bytes(), &[SUBFIELD_DELIMITER]);
        assert!(subfield.code().is_empty());
    }

    #[test]
    fn test_serialize_has_no_terminator() {
        let subfield = Subfield::with_content(b"b", b"BAR");
        assert_eq!(subfield.serialize(), b"\x1FbBAR");
        assert_eq!(subfield.length(), 5);
    }

    #[test]
    fn test_display_with_custom_config() {
        let config = CodecConfig {
            encoding: TextEncoding::for_label("gb18030").unwrap(),
            subfield_display_char: '|',
        };
        let subfield = Subfield::with_text(b"f", "中文测试", &config).unwrap();
        assert_eq!(subfield.content().len(), 8);
        assert_eq!(subfield.to_display_string(&config), "|f中文测试");
    }

    #[test]
    fn test_identifier_ordering() {
        let a = Subfield::with_content(b"a", b"zzz");
        let b = Subfield::with_content(b"b", b"aaa");
        assert_eq!(a.cmp_by_identifier(&b), Ordering::Less);
        assert_eq!(b.cmp_by_identifier(&a), Ordering::Greater);
    }
}
