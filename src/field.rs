//! Directory fields: the content model of a record.
//!
//! Every directory entry of a record becomes one [`Field`]. The variant is
//! chosen once, from the tag, by [`FieldKind::for_tag`]:
//!
//! - `"001"` is the record's control number ([`ControlNumberField`])
//! - `"002"`–`"009"`, `"00A"`–`"00Z"` and `"00a"`–`"00z"` are control fields
//!   ([`FixedField`])
//! - everything else is a data field ([`DataField`]) with an indicator and,
//!   when the record's identifier width is non-zero, a sequence of subfields
//!
//! Control content is stored raw and always ends in [`FIELD_TERMINATOR`].
//! Data field content in subfield mode is stored split, and the terminator is
//! added back by [`DataField::serialize`].
//!
//! A field's serialized form excludes its indicator: the record writes the
//! indicator bytes itself, right before the field's bytes. [`Field::length`]
//! however counts them, since the directory length covers both.

use crate::config::CodecConfig;
use crate::error::{MarcError, Result};
use crate::fixed_buffer::FixedByteBuffer;
use crate::pattern::TextPattern;
use crate::subfield::{Subfield, SUBFIELD_DELIMITER};
use std::cmp::Ordering;

/// Field terminator (0x1E).
pub const FIELD_TERMINATOR: u8 = 0x1E;

/// Tag of the control number field.
pub const CONTROL_NUMBER_TAG: &[u8; 3] = b"001";

/// Which variant a tag dispatches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// Tag `"001"`.
    ControlNumber,
    /// Tag `"00"` followed by `2`–`9`, `A`–`Z` or `a`–`z`.
    Fixed,
    /// Any other tag.
    Data,
}

impl FieldKind {
    /// Classify a tag.
    ///
    /// ```
    /// use iso2709::FieldKind;
    ///
    /// assert_eq!(FieldKind::for_tag(b"001"), FieldKind::ControlNumber);
    /// assert_eq!(FieldKind::for_tag(b"008"), FieldKind::Fixed);
    /// assert_eq!(FieldKind::for_tag(b"00X"), FieldKind::Fixed);
    /// assert_eq!(FieldKind::for_tag(b"000"), FieldKind::Data);
    /// assert_eq!(FieldKind::for_tag(b"245"), FieldKind::Data);
    /// ```
    #[must_use]
    pub fn for_tag(tag: &[u8]) -> FieldKind {
        match tag {
            [b'0', b'0', b'1'] => FieldKind::ControlNumber,
            [b'0', b'0', b'2'..=b'9' | b'A'..=b'Z' | b'a'..=b'z'] => FieldKind::Fixed,
            _ => FieldKind::Data,
        }
    }
}

/// The per-record widths every field is built with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FieldWidths {
    /// Indicator bytes at the start of each data field.
    pub indicator: usize,
    /// Subfield identifier bytes, delimiter included. Zero means data fields
    /// hold raw content instead of subfields.
    pub identifier: usize,
    /// Implementation-defined bytes in each directory entry.
    pub implementation_defined: usize,
}

/// Attributes shared by every directory entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct EntryHeader {
    tag: FixedByteBuffer,
    implementation_defined: FixedByteBuffer,
    is_fragment: bool,
}

impl EntryHeader {
    fn new(tag: &[u8], implementation_defined_width: usize) -> Result<Self> {
        if tag.len() != 3 {
            return Err(MarcError::InvalidArgument(format!(
                "tag must be 3 bytes, got {}",
                tag.len()
            )));
        }
        Ok(EntryHeader {
            tag: FixedByteBuffer::from_bytes(tag),
            implementation_defined: FixedByteBuffer::with_capacity(implementation_defined_width),
            is_fragment: false,
        })
    }
}

/// Raw content that always ends in a field terminator.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct TerminatedContent(Vec<u8>);

impl TerminatedContent {
    fn new() -> Self {
        TerminatedContent(vec![FIELD_TERMINATOR])
    }

    fn set(&mut self, bytes: &[u8]) {
        self.0.clear();
        self.0.extend_from_slice(bytes);
        if self.0.last() != Some(&FIELD_TERMINATOR) {
            self.0.push(FIELD_TERMINATOR);
        }
    }

    fn with_terminator(&self) -> &[u8] {
        &self.0
    }

    fn without_terminator(&self) -> &[u8] {
        &self.0[..self.0.len() - 1]
    }
}

fn check_kind(tag: &[u8], expected: FieldKind) -> Result<()> {
    let actual = FieldKind::for_tag(tag);
    if actual == expected {
        Ok(())
    } else {
        Err(MarcError::InvalidArgument(format!(
            "tag '{}' belongs to a {actual:?} field, not {expected:?}",
            String::from_utf8_lossy(tag)
        )))
    }
}

fn check_width(name: &str, width: usize) -> Result<()> {
    if width > 9 {
        return Err(MarcError::InvalidArgument(format!(
            "{name} width must be a single digit, got {width}"
        )));
    }
    Ok(())
}

/// The control number field (tag `"001"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ControlNumberField {
    header: EntryHeader,
    content: TerminatedContent,
}

impl ControlNumberField {
    /// Create an empty control number field.
    #[must_use]
    pub fn new(implementation_defined_width: usize) -> Self {
        ControlNumberField {
            header: EntryHeader {
                tag: FixedByteBuffer::from_bytes(CONTROL_NUMBER_TAG),
                implementation_defined: FixedByteBuffer::with_capacity(
                    implementation_defined_width,
                ),
                is_fragment: false,
            },
            content: TerminatedContent::new(),
        }
    }

    /// Build from the field's raw byte span.
    #[must_use]
    pub fn parse(implementation_defined_width: usize, bytes: &[u8]) -> Self {
        let mut field = ControlNumberField::new(implementation_defined_width);
        field.set_value(bytes);
        field
    }

    /// Store raw content, appending a field terminator if absent.
    pub fn set_value(&mut self, bytes: &[u8]) {
        self.content.set(bytes);
    }

    /// Content without its terminator.
    #[must_use]
    pub fn value(&self) -> &[u8] {
        self.content.without_terminator()
    }

    /// Serialized length, terminator included.
    #[must_use]
    pub fn length(&self) -> usize {
        self.content.0.len()
    }

    /// Raw content, terminator included.
    #[must_use]
    pub fn serialize(&self) -> Vec<u8> {
        self.content.with_terminator().to_vec()
    }
}

/// A control field (`"002"`–`"009"`, `"00A"`–`"00Z"`, `"00a"`–`"00z"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FixedField {
    header: EntryHeader,
    content: TerminatedContent,
}

impl FixedField {
    /// Create an empty control field.
    ///
    /// # Errors
    ///
    /// Returns [`MarcError::InvalidArgument`] if `tag` is not three bytes or
    /// does not name a control field.
    pub fn new(tag: &[u8], implementation_defined_width: usize) -> Result<Self> {
        let header = EntryHeader::new(tag, implementation_defined_width)?;
        check_kind(tag, FieldKind::Fixed)?;
        Ok(FixedField {
            header,
            content: TerminatedContent::new(),
        })
    }

    /// Build from the field's raw byte span.
    ///
    /// # Errors
    ///
    /// Same as [`FixedField::new`].
    pub fn parse(tag: &[u8], implementation_defined_width: usize, bytes: &[u8]) -> Result<Self> {
        let mut field = FixedField::new(tag, implementation_defined_width)?;
        field.set_value(bytes);
        Ok(field)
    }

    /// Store raw content, appending a field terminator if absent.
    pub fn set_value(&mut self, bytes: &[u8]) {
        self.content.set(bytes);
    }

    /// Content without its terminator.
    #[must_use]
    pub fn value(&self) -> &[u8] {
        self.content.without_terminator()
    }

    /// Serialized length, terminator included.
    #[must_use]
    pub fn length(&self) -> usize {
        self.content.0.len()
    }

    /// Raw content, terminator included.
    #[must_use]
    pub fn serialize(&self) -> Vec<u8> {
        self.content.with_terminator().to_vec()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum DataContent {
    Raw(TerminatedContent),
    Subfields(Vec<Subfield>),
}

/// A data field: indicator plus either raw content or subfields.
///
/// # Examples
///
/// ```
/// use iso2709::{DataField, FieldWidths, Subfield};
///
/// let widths = FieldWidths { indicator: 2, identifier: 2, implementation_defined: 0 };
/// let mut field = DataField::new(b"245", widths)?;
/// field.set_indicator(b"10")?;
/// field.add_subfield(Subfield::with_content(b"a", b"Title"))?;
/// field.add_subfield(Subfield::with_content(b"c", b"Author"))?;
///
/// assert_eq!(field.serialize(), b"\x1FaTitle\x1FcAuthor\x1E");
/// assert_eq!(field.length(), 2 + 7 + 8 + 1);
/// # Ok::<(), iso2709::MarcError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DataField {
    header: EntryHeader,
    indicator: FixedByteBuffer,
    identifier_width: usize,
    content: DataContent,
}

impl DataField {
    /// Create an empty data field.
    ///
    /// # Errors
    ///
    /// Returns [`MarcError::InvalidArgument`] if `tag` is not three bytes,
    /// names a control field, or a width is not a single digit.
    pub fn new(tag: &[u8], widths: FieldWidths) -> Result<Self> {
        let header = EntryHeader::new(tag, widths.implementation_defined)?;
        check_kind(tag, FieldKind::Data)?;
        check_width("indicator", widths.indicator)?;
        check_width("identifier", widths.identifier)?;
        let content = if widths.identifier == 0 {
            DataContent::Raw(TerminatedContent::new())
        } else {
            DataContent::Subfields(Vec::new())
        };
        Ok(DataField {
            header,
            indicator: FixedByteBuffer::with_capacity(widths.indicator),
            identifier_width: widths.identifier,
            content,
        })
    }

    /// Build from the field's raw byte span (indicator included).
    ///
    /// With a zero identifier width everything after the indicator is kept as
    /// raw content. Otherwise the span is split at each subfield delimiter:
    /// a subfield's identifier is the `identifier_width` bytes starting at the
    /// delimiter, its content runs to the next delimiter or the end of the
    /// span, and a trailing field terminator is left out of the content.
    /// Bytes between the indicator and the first delimiter belong to no
    /// subfield and are not kept.
    ///
    /// # Errors
    ///
    /// Returns [`MarcError::MalformedRecord`] if the span is shorter than the
    /// indicator or ends inside a subfield identifier, and the errors of
    /// [`DataField::new`].
    pub fn parse(tag: &[u8], widths: FieldWidths, bytes: &[u8]) -> Result<Self> {
        let mut field = DataField::new(tag, widths)?;
        if bytes.len() < widths.indicator {
            return Err(MarcError::MalformedRecord(format!(
                "field {} is {} bytes, shorter than its indicator",
                field.header.tag.to_ascii_string(),
                bytes.len()
            )));
        }
        let (indicator, body) = bytes.split_at(widths.indicator);
        field.indicator.set_value(indicator)?;

        match &mut field.content {
            DataContent::Raw(raw) => raw.set(body),
            DataContent::Subfields(subfields) => {
                split_subfields(body, widths.identifier, subfields).map_err(|offset| {
                    MarcError::MalformedRecord(format!(
                        "field {} ends inside the subfield identifier at offset {offset}",
                        field.header.tag.to_ascii_string()
                    ))
                })?;
            },
        }
        Ok(field)
    }

    /// The indicator bytes.
    #[must_use]
    pub fn indicator(&self) -> &FixedByteBuffer {
        &self.indicator
    }

    /// Overwrite the indicator.
    ///
    /// # Errors
    ///
    /// Returns [`MarcError::CapacityExceeded`] if `bytes` is longer than the
    /// indicator width.
    pub fn set_indicator(&mut self, bytes: &[u8]) -> Result<()> {
        self.indicator.set_value(bytes)
    }

    /// The widths this field was built with.
    #[must_use]
    pub fn widths(&self) -> FieldWidths {
        FieldWidths {
            indicator: self.indicator.len(),
            identifier: self.identifier_width,
            implementation_defined: self.header.implementation_defined.len(),
        }
    }

    /// Store raw content, appending a field terminator if absent.
    ///
    /// # Errors
    ///
    /// Returns [`MarcError::InvalidFieldAccess`] when the field holds
    /// subfields; use the subfield operations instead.
    pub fn set_value(&mut self, bytes: &[u8]) -> Result<()> {
        match &mut self.content {
            DataContent::Raw(raw) => {
                raw.set(bytes);
                Ok(())
            },
            DataContent::Subfields(_) => Err(MarcError::InvalidFieldAccess(
                "content of a field with subfields is set through its subfields".to_string(),
            )),
        }
    }

    /// Raw content without its terminator.
    ///
    /// # Errors
    ///
    /// Returns [`MarcError::InvalidFieldAccess`] when the field holds subfields.
    pub fn value(&self) -> Result<&[u8]> {
        match &self.content {
            DataContent::Raw(raw) => Ok(raw.without_terminator()),
            DataContent::Subfields(_) => Err(MarcError::InvalidFieldAccess(
                "field content is split into subfields".to_string(),
            )),
        }
    }

    fn subfield_vec(&self) -> Result<&Vec<Subfield>> {
        match &self.content {
            DataContent::Subfields(subfields) => Ok(subfields),
            DataContent::Raw(_) => Err(no_subfields()),
        }
    }

    fn subfield_vec_mut(&mut self) -> Result<&mut Vec<Subfield>> {
        match &mut self.content {
            DataContent::Subfields(subfields) => Ok(subfields),
            DataContent::Raw(_) => Err(no_subfields()),
        }
    }

    /// All subfields, in order.
    ///
    /// # Errors
    ///
    /// Returns [`MarcError::InvalidFieldAccess`] when the identifier width is 0.
    pub fn subfields(&self) -> Result<&[Subfield]> {
        self.subfield_vec().map(Vec::as_slice)
    }

    /// Subfields whose identifier code matches `pattern`.
    ///
    /// With an identifier width of 1 there is no code to match against, so
    /// nothing matches.
    ///
    /// # Errors
    ///
    /// Returns [`MarcError::InvalidFieldAccess`] when the identifier width is
    /// 0, or [`MarcError::InvalidArgument`] for an unusable pattern.
    pub fn subfields_matching<P: TextPattern>(&self, pattern: P) -> Result<Vec<&Subfield>> {
        pattern.validate()?;
        let subfields = self.subfield_vec()?;
        if self.identifier_width == 1 {
            return Ok(Vec::new());
        }
        Ok(subfields
            .iter()
            .filter(|sf| pattern.is_match_text(&String::from_utf8_lossy(sf.code())))
            .collect())
    }

    /// The subfield at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`MarcError::InvalidFieldAccess`] when the identifier width is
    /// 0, or [`MarcError::InvalidArgument`] if `index` is out of range.
    pub fn subfield_at(&self, index: usize) -> Result<&Subfield> {
        let subfields = self.subfield_vec()?;
        subfields.get(index).ok_or_else(|| out_of_range(index, subfields.len()))
    }

    /// Mutable access to the subfield at `index`.
    ///
    /// # Errors
    ///
    /// Same as [`DataField::subfield_at`].
    pub fn subfield_at_mut(&mut self, index: usize) -> Result<&mut Subfield> {
        let subfields = self.subfield_vec_mut()?;
        let len = subfields.len();
        subfields.get_mut(index).ok_or_else(|| out_of_range(index, len))
    }

    /// Append a subfield.
    ///
    /// # Errors
    ///
    /// Returns [`MarcError::InvalidFieldAccess`] when the identifier width is
    /// 0, or [`MarcError::StructureMismatch`] if the subfield's identifier
    /// length differs from the field's identifier width.
    pub fn add_subfield(&mut self, subfield: Subfield) -> Result<()> {
        let width = self.identifier_width;
        let subfields = self.subfield_vec_mut()?;
        if subfield.identifier().len() != width {
            return Err(MarcError::StructureMismatch(format!(
                "subfield identifier is {} bytes, field expects {width}",
                subfield.identifier().len()
            )));
        }
        subfields.push(subfield);
        Ok(())
    }

    /// Remove every subfield whose identifier code matches `pattern`.
    /// Returns the number removed.
    ///
    /// # Errors
    ///
    /// Same as [`DataField::subfields_matching`].
    pub fn remove_subfields<P: TextPattern>(&mut self, pattern: P) -> Result<usize> {
        pattern.validate()?;
        let width = self.identifier_width;
        let subfields = self.subfield_vec_mut()?;
        if width == 1 {
            return Ok(0);
        }
        let before = subfields.len();
        subfields.retain(|sf| !pattern.is_match_text(&String::from_utf8_lossy(sf.code())));
        Ok(before - subfields.len())
    }

    /// Remove and return the subfield at `index`.
    ///
    /// # Errors
    ///
    /// Same as [`DataField::subfield_at`].
    pub fn remove_subfield_at(&mut self, index: usize) -> Result<Subfield> {
        let subfields = self.subfield_vec_mut()?;
        if index >= subfields.len() {
            return Err(out_of_range(index, subfields.len()));
        }
        Ok(subfields.remove(index))
    }

    /// Sort subfields by identifier. The sort is stable.
    ///
    /// # Errors
    ///
    /// Returns [`MarcError::InvalidFieldAccess`] when the identifier width is 0.
    pub fn sort_subfields(&mut self) -> Result<()> {
        self.subfield_vec_mut()?.sort_by(Subfield::cmp_by_identifier);
        Ok(())
    }

    /// Serialized length: indicator, content and terminator.
    #[must_use]
    pub fn length(&self) -> usize {
        self.indicator.len()
            + match &self.content {
                DataContent::Raw(raw) => raw.0.len(),
                DataContent::Subfields(subfields) => {
                    subfields.iter().map(Subfield::length).sum::<usize>() + 1
                },
            }
    }

    /// Content bytes following the indicator, terminator included.
    #[must_use]
    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.length());
        self.write_to(&mut out);
        out
    }

    fn write_to(&self, out: &mut Vec<u8>) {
        match &self.content {
            DataContent::Raw(raw) => out.extend_from_slice(raw.with_terminator()),
            DataContent::Subfields(subfields) => {
                for subfield in subfields {
                    subfield.write_to(out);
                }
                out.push(FIELD_TERMINATOR);
            },
        }
    }
}

/// Split a data field body into subfields.
///
/// On failure returns the offset of the delimiter whose identifier runs past
/// the end of `body`.
fn split_subfields(
    body: &[u8],
    identifier_width: usize,
    subfields: &mut Vec<Subfield>,
) -> std::result::Result<(), usize> {
    let mut i = match memchr::memchr(SUBFIELD_DELIMITER, body) {
        Some(first) => first,
        None => return Ok(()),
    };
    while i < body.len() {
        let content_start = i + identifier_width;
        if content_start > body.len() {
            return Err(i);
        }
        let next = memchr::memchr(SUBFIELD_DELIMITER, &body[content_start..])
            .map_or(body.len(), |pos| content_start + pos);
        let mut content_end = next;
        if content_end > content_start && body[content_end - 1] == FIELD_TERMINATOR {
            content_end -= 1;
        }
        subfields.push(Subfield::with_content(
            &body[i..content_start],
            &body[content_start..content_end],
        ));
        i = next;
    }
    Ok(())
}

fn no_subfields() -> MarcError {
    MarcError::InvalidFieldAccess("field has no subfields (identifier width is 0)".to_string())
}

fn out_of_range(index: usize, len: usize) -> MarcError {
    MarcError::InvalidArgument(format!("index {index} out of range for {len} items"))
}

/// One directory entry of a record.
///
/// # Examples
///
/// ```
/// use iso2709::{CodecConfig, ControlNumberField, Field, FieldKind};
///
/// let mut control = ControlNumberField::new(0);
/// control.set_value(b"ocm12345");
/// let field = Field::from(control);
///
/// assert_eq!(field.kind(), FieldKind::ControlNumber);
/// assert_eq!(field.serialize(), b"ocm12345\x1E");
/// assert_eq!(field.to_display_string(&CodecConfig::default()), "001 ocm12345");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Field {
    /// Tag `"001"`.
    ControlNumber(ControlNumberField),
    /// Control fields `"002"`–`"00z"`.
    Fixed(FixedField),
    /// Data fields.
    Data(DataField),
}

impl Field {
    /// Build the variant selected by `tag` from the field's raw byte span.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`DataField::parse`] for data field tags, or
    /// [`MarcError::InvalidArgument`] if `tag` is not three bytes.
    pub fn parse(tag: &[u8], widths: FieldWidths, bytes: &[u8]) -> Result<Field> {
        match FieldKind::for_tag(tag) {
            FieldKind::ControlNumber => Ok(Field::ControlNumber(ControlNumberField::parse(
                widths.implementation_defined,
                bytes,
            ))),
            FieldKind::Fixed => Ok(Field::Fixed(FixedField::parse(
                tag,
                widths.implementation_defined,
                bytes,
            )?)),
            FieldKind::Data => Ok(Field::Data(DataField::parse(tag, widths, bytes)?)),
        }
    }

    fn header(&self) -> &EntryHeader {
        match self {
            Field::ControlNumber(f) => &f.header,
            Field::Fixed(f) => &f.header,
            Field::Data(f) => &f.header,
        }
    }

    fn header_mut(&mut self) -> &mut EntryHeader {
        match self {
            Field::ControlNumber(f) => &mut f.header,
            Field::Fixed(f) => &mut f.header,
            Field::Data(f) => &mut f.header,
        }
    }

    /// The variant of this field.
    #[must_use]
    pub fn kind(&self) -> FieldKind {
        match self {
            Field::ControlNumber(_) => FieldKind::ControlNumber,
            Field::Fixed(_) => FieldKind::Fixed,
            Field::Data(_) => FieldKind::Data,
        }
    }

    /// The three-byte tag.
    #[must_use]
    pub fn tag(&self) -> &FixedByteBuffer {
        &self.header().tag
    }

    /// The implementation-defined bytes of the directory entry.
    #[must_use]
    pub fn implementation_defined(&self) -> &FixedByteBuffer {
        &self.header().implementation_defined
    }

    /// Overwrite the implementation-defined bytes.
    ///
    /// # Errors
    ///
    /// Returns [`MarcError::CapacityExceeded`] if `bytes` is longer than the
    /// configured width.
    pub fn set_implementation_defined(&mut self, bytes: &[u8]) -> Result<()> {
        self.header_mut().implementation_defined.set_value(bytes)
    }

    /// Whether this entry is one chunk of a longer field.
    #[must_use]
    pub fn is_fragment(&self) -> bool {
        self.header().is_fragment
    }

    /// Mark or unmark this entry as a fragment. A fragment's directory length
    /// is written as all zeros.
    pub fn set_fragment(&mut self, is_fragment: bool) {
        self.header_mut().is_fragment = is_fragment;
    }

    /// The indicator, for data fields with a non-zero indicator width.
    #[must_use]
    pub fn indicator(&self) -> Option<&FixedByteBuffer> {
        match self {
            Field::Data(f) if !f.indicator.is_empty() => Some(&f.indicator),
            _ => None,
        }
    }

    /// The data field, if this is one.
    #[must_use]
    pub fn as_data(&self) -> Option<&DataField> {
        match self {
            Field::Data(f) => Some(f),
            _ => None,
        }
    }

    /// Mutable access to the data field, if this is one.
    pub fn as_data_mut(&mut self) -> Option<&mut DataField> {
        match self {
            Field::Data(f) => Some(f),
            _ => None,
        }
    }

    fn data_or_err(&self) -> Result<&DataField> {
        self.as_data().ok_or_else(|| self.control_access_error())
    }

    fn data_or_err_mut(&mut self) -> Result<&mut DataField> {
        if let Field::Data(f) = self {
            Ok(f)
        } else {
            Err(self.control_access_error())
        }
    }

    fn control_access_error(&self) -> MarcError {
        MarcError::InvalidFieldAccess(format!(
            "control field {} has no subfields",
            self.tag().to_ascii_string()
        ))
    }

    /// Serialized length, indicator included.
    #[must_use]
    pub fn length(&self) -> usize {
        match self {
            Field::ControlNumber(f) => f.length(),
            Field::Fixed(f) => f.length(),
            Field::Data(f) => f.length(),
        }
    }

    /// Field bytes as they follow the indicator in the data area.
    #[must_use]
    pub fn serialize(&self) -> Vec<u8> {
        match self {
            Field::ControlNumber(f) => f.serialize(),
            Field::Fixed(f) => f.serialize(),
            Field::Data(f) => f.serialize(),
        }
    }

    pub(crate) fn write_to(&self, out: &mut Vec<u8>) {
        match self {
            Field::ControlNumber(f) => out.extend_from_slice(f.content.with_terminator()),
            Field::Fixed(f) => out.extend_from_slice(f.content.with_terminator()),
            Field::Data(f) => f.write_to(out),
        }
    }

    /// Store raw content, appending a field terminator if absent.
    ///
    /// # Errors
    ///
    /// Returns [`MarcError::InvalidFieldAccess`] for a data field that holds
    /// subfields.
    pub fn set_value(&mut self, bytes: &[u8]) -> Result<()> {
        match self {
            Field::ControlNumber(f) => f.set_value(bytes),
            Field::Fixed(f) => f.set_value(bytes),
            Field::Data(f) => return f.set_value(bytes),
        }
        Ok(())
    }

    /// Store `text`, encoded under the configured encoding, as raw content.
    ///
    /// # Errors
    ///
    /// Returns [`MarcError::EncodingError`] if the text cannot be encoded, and
    /// the errors of [`Field::set_value`].
    pub fn set_text(&mut self, text: &str, config: &CodecConfig) -> Result<()> {
        let bytes = config.encoding.encode(text)?;
        self.set_value(&bytes)
    }

    /// All subfields.
    ///
    /// # Errors
    ///
    /// Returns [`MarcError::InvalidFieldAccess`] for control fields and for
    /// data fields with a zero identifier width.
    pub fn subfields(&self) -> Result<&[Subfield]> {
        self.data_or_err()?.subfields()
    }

    /// Subfields whose identifier code matches `pattern`.
    ///
    /// # Errors
    ///
    /// See [`DataField::subfields_matching`]; control fields fail with
    /// [`MarcError::InvalidFieldAccess`].
    pub fn subfields_matching<P: TextPattern>(&self, pattern: P) -> Result<Vec<&Subfield>> {
        self.data_or_err()?.subfields_matching(pattern)
    }

    /// Append a subfield.
    ///
    /// # Errors
    ///
    /// See [`DataField::add_subfield`]; control fields fail with
    /// [`MarcError::InvalidFieldAccess`].
    pub fn add_subfield(&mut self, subfield: Subfield) -> Result<()> {
        self.data_or_err_mut()?.add_subfield(subfield)
    }

    /// Remove subfields whose identifier code matches `pattern`.
    ///
    /// # Errors
    ///
    /// See [`DataField::remove_subfields`]; control fields fail with
    /// [`MarcError::InvalidFieldAccess`].
    pub fn remove_subfields<P: TextPattern>(&mut self, pattern: P) -> Result<usize> {
        self.data_or_err_mut()?.remove_subfields(pattern)
    }

    /// Order two fields by tag.
    #[must_use]
    pub fn cmp_by_tag(&self, other: &Self) -> Ordering {
        self.tag().cmp(other.tag())
    }

    /// Human-readable form: the tag, a space, then the content. Data fields
    /// show their indicator before the content, and each subfield in its
    /// display form.
    #[must_use]
    pub fn to_display_string(&self, config: &CodecConfig) -> String {
        let mut out = self.tag().to_ascii_string();
        out.push(' ');
        match self {
            Field::ControlNumber(f) => out.push_str(&config.encoding.decode(f.value())),
            Field::Fixed(f) => out.push_str(&config.encoding.decode(f.value())),
            Field::Data(f) => {
                out.push_str(&f.indicator.to_ascii_string());
                match &f.content {
                    DataContent::Raw(raw) => {
                        out.push_str(&config.encoding.decode(raw.without_terminator()));
                    },
                    DataContent::Subfields(subfields) => {
                        for subfield in subfields {
                            out.push_str(&subfield.to_display_string(config));
                        }
                    },
                }
            },
        }
        out
    }
}

impl From<ControlNumberField> for Field {
    fn from(field: ControlNumberField) -> Self {
        Field::ControlNumber(field)
    }
}

impl From<FixedField> for Field {
    fn from(field: FixedField) -> Self {
        Field::Fixed(field)
    }
}

impl From<DataField> for Field {
    fn from(field: DataField) -> Self {
        Field::Data(field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SUBFIELDS: FieldWidths = FieldWidths {
        indicator: 2,
        identifier: 2,
        implementation_defined: 0,
    };

    const RAW: FieldWidths = FieldWidths {
        indicator: 0,
        identifier: 0,
        implementation_defined: 0,
    };

    #[test]
    fn test_tag_dispatch() {
        let config = CodecConfig::default();
        let control = Field::parse(b"001", RAW, b"123\x1E").unwrap();
        let fixed = Field::parse(b"008", RAW, b"200101s2020\x1E").unwrap();
        let data = Field::parse(b"245", SUBFIELDS, b"10\x1FaTitle\x1E").unwrap();

        assert_eq!(control.kind(), FieldKind::ControlNumber);
        assert_eq!(fixed.kind(), FieldKind::Fixed);
        assert_eq!(data.kind(), FieldKind::Data);
        assert_eq!(fixed.to_display_string(&config), "008 200101s2020");
    }

    #[test]
    fn test_subfield_splitting() {
        let field = DataField::parse(b"245", SUBFIELDS, b"10\x1FaFOO\x1FbBAR\x1E").unwrap();
        let subfields = field.subfields().unwrap();

        assert_eq!(field.indicator().as_bytes(), b"10");
        assert_eq!(subfields.len(), 2);
        assert_eq!(subfields[0].identifier().as_bytes(), b"\x1Fa");
        assert_eq!(subfields[0].content(), b"FOO");
        assert_eq!(subfields[1].identifier().as_bytes(), b"\x1Fb");
        assert_eq!(subfields[1].content(), b"BAR");
    }

    #[test]
    fn test_subfield_splitting_without_indicator() {
        let widths = FieldWidths {
            indicator: 0,
            identifier: 2,
            implementation_defined: 0,
        };
        let field = DataField::parse(b"200", widths, b"\x1FaFOO\x1FbBAR\x1E").unwrap();
        assert_eq!(field.subfields().unwrap().len(), 2);
        assert_eq!(field.serialize(), b"\x1FaFOO\x1FbBAR\x1E");
    }

    #[test]
    fn test_subfield_splitting_keeps_empty_content() {
        let field = DataField::parse(b"500", SUBFIELDS, b"  \x1Fa\x1Fb\x1E").unwrap();
        let subfields = field.subfields().unwrap();
        assert_eq!(subfields.len(), 2);
        assert!(subfields[0].content().is_empty());
        assert!(subfields[1].content().is_empty());
    }

    #[test]
    fn test_subfield_identifier_runs_past_span() {
        let result = DataField::parse(b"245", SUBFIELDS, b"10\x1FaX\x1F");
        assert!(matches!(result, Err(MarcError::MalformedRecord(_))));
    }

    #[test]
    fn test_span_shorter_than_indicator() {
        let result = DataField::parse(b"245", SUBFIELDS, b"1");
        assert!(matches!(result, Err(MarcError::MalformedRecord(_))));
    }

    #[test]
    fn test_wide_identifier() {
        let widths = FieldWidths {
            indicator: 1,
            identifier: 3,
            implementation_defined: 0,
        };
        let field = DataField::parse(b"100", widths, b"0\x1Fab12\x1Fcd34\x1E").unwrap();
        let subfields = field.subfields().unwrap();
        assert_eq!(subfields[0].code(), b"ab");
        assert_eq!(subfields[0].content(), b"12");
        assert_eq!(subfields[1].code(), b"cd");
        assert_eq!(subfields[1].content(), b"34");
    }

    #[test]
    fn test_raw_data_field() {
        let mut field = DataField::new(b"300", RAW).unwrap();
        field.set_value(b"raw content").unwrap();
        assert_eq!(field.serialize(), b"raw content\x1E");
        assert_eq!(field.length(), 12);
        assert_eq!(field.value().unwrap(), b"raw content");
        assert!(matches!(field.subfields(), Err(MarcError::InvalidFieldAccess(_))));
        assert!(matches!(
            field.add_subfield(Subfield::new(b"a")),
            Err(MarcError::InvalidFieldAccess(_))
        ));
    }

    #[test]
    fn test_raw_parse_appends_missing_terminator() {
        let field = DataField::parse(b"300", RAW, b"no terminator").unwrap();
        assert_eq!(field.serialize(), b"no terminator\x1E");
    }

    #[test]
    fn test_set_value_rejected_in_subfield_mode() {
        let mut field = DataField::new(b"245", SUBFIELDS).unwrap();
        assert!(matches!(
            field.set_value(b"x"),
            Err(MarcError::InvalidFieldAccess(_))
        ));
    }

    #[test]
    fn test_control_field_terminator_handling() {
        let mut field = ControlNumberField::new(0);
        assert_eq!(field.serialize(), b"\x1E");
        field.set_value(b"abc\x1E");
        assert_eq!(field.serialize(), b"abc\x1E");
        field.set_value(b"abc");
        assert_eq!(field.serialize(), b"abc\x1E");
        assert_eq!(field.length(), 4);
        assert_eq!(field.value(), b"abc");
    }

    #[test]
    fn test_subfield_access_on_control_field() {
        let mut field = Field::from(FixedField::new(b"005", 0).unwrap());
        assert!(matches!(field.subfields(), Err(MarcError::InvalidFieldAccess(_))));
        assert!(matches!(
            field.add_subfield(Subfield::new(b"a")),
            Err(MarcError::InvalidFieldAccess(_))
        ));
        assert!(matches!(
            field.remove_subfields("a"),
            Err(MarcError::InvalidFieldAccess(_))
        ));
        assert!(field.indicator().is_none());
    }

    #[test]
    fn test_constructor_tag_checks() {
        assert!(matches!(
            FixedField::new(b"245", 0),
            Err(MarcError::InvalidArgument(_))
        ));
        assert!(matches!(
            DataField::new(b"008", SUBFIELDS),
            Err(MarcError::InvalidArgument(_))
        ));
        assert!(matches!(
            DataField::new(b"24", SUBFIELDS),
            Err(MarcError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_add_subfield_identifier_width_mismatch() {
        let mut field = DataField::new(b"245", SUBFIELDS).unwrap();
        let result = field.add_subfield(Subfield::new(b"ab"));
        assert!(matches!(result, Err(MarcError::StructureMismatch(_))));
        assert!(field.subfields().unwrap().is_empty());
    }

    #[test]
    fn test_subfield_lookup_and_removal() {
        let mut field =
            DataField::parse(b"650", SUBFIELDS, b" 0\x1FaNovels\x1FxAmerican\x1FaFiction\x1E")
                .unwrap();

        assert_eq!(field.subfields_matching("a").unwrap().len(), 2);
        assert_eq!(field.subfield_at(1).unwrap().content(), b"American");
        assert!(matches!(
            field.subfield_at(3),
            Err(MarcError::InvalidArgument(_))
        ));

        assert_eq!(field.remove_subfields("a").unwrap(), 2);
        assert_eq!(field.subfields().unwrap().len(), 1);

        let removed = field.remove_subfield_at(0).unwrap();
        assert_eq!(removed.code(), b"x");
        assert!(field.subfields().unwrap().is_empty());
    }

    #[test]
    fn test_single_byte_identifier_cannot_be_matched() {
        let widths = FieldWidths {
            indicator: 0,
            identifier: 1,
            implementation_defined: 0,
        };
        let mut field = DataField::parse(b"200", widths, b"\x1FONE\x1FTWO\x1E").unwrap();
        assert_eq!(field.subfields().unwrap().len(), 2);
        assert!(field.subfields_matching("O").unwrap().is_empty());
        assert_eq!(field.remove_subfields("O").unwrap(), 0);
    }

    #[test]
    fn test_sort_subfields() {
        let mut field = DataField::parse(b"245", SUBFIELDS, b"10\x1Fcz\x1Fay\x1Fbx\x1E").unwrap();
        field.sort_subfields().unwrap();
        let codes: Vec<&[u8]> = field.subfields().unwrap().iter().map(Subfield::code).collect();
        assert_eq!(codes, [&b"a"[..], &b"b"[..], &b"c"[..]]);
    }

    #[test]
    fn test_data_field_display() {
        let config = CodecConfig::default();
        let field = Field::parse(b"245", SUBFIELDS, b"10\x1FaTitle\x1FcAuthor\x1E").unwrap();
        assert_eq!(field.to_display_string(&config), "245 10$aTitle$cAuthor");
    }

    #[test]
    fn test_implementation_defined_capacity() {
        let widths = FieldWidths {
            implementation_defined: 2,
            ..SUBFIELDS
        };
        let mut field = Field::from(DataField::new(b"245", widths).unwrap());
        assert_eq!(field.implementation_defined().len(), 2);
        field.set_implementation_defined(b"xy").unwrap();
        assert!(matches!(
            field.set_implementation_defined(b"xyz"),
            Err(MarcError::CapacityExceeded(_))
        ));
    }
}
