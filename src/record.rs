//! ISO 2709 record structure and whole-record parse/serialize.
//!
//! A [`Record`] owns its header attributes and an ordered list of
//! [`Field`]s. The record length and base address are never stored; both are
//! derived from the current fields whenever they are needed, so editing a
//! field can never leave a stale header behind.
//!
//! # Examples
//!
//! Build, serialize and parse back:
//!
//! ```
//! use iso2709::{ControlNumberField, DataField, Record, Subfield};
//!
//! let mut record = Record::new(2, 2)?;
//!
//! let mut control = ControlNumberField::new(0);
//! control.set_value(b"1234567890");
//! record.add_entry(control.into())?;
//!
//! let mut title = DataField::new(b"200", record.widths())?;
//! title.set_indicator(b"1 ")?;
//! title.add_subfield(Subfield::with_content(b"a", b"Title"))?;
//! record.add_entry(title.into())?;
//!
//! let bytes = record.serialize()?;
//! assert_eq!(bytes.len(), record.length());
//! assert_eq!(Record::parse(&bytes)?, record);
//! # Ok::<(), iso2709::MarcError>(())
//! ```

use crate::config::CodecConfig;
use crate::error::{MarcError, Result};
use crate::field::{Field, FieldWidths, FIELD_TERMINATOR};
use crate::fixed_buffer::{parse_decimal, FixedByteBuffer};
use crate::leader::{
    push_number, DirectoryMap, Leader, DEFAULT_IMPLEMENTATION_CODE, DEFAULT_STATUS,
    DEFAULT_USER_DEFINED, LEADER_LEN,
};
use crate::pattern::TextPattern;
use tracing::{debug, warn};

/// Record terminator (0x1D).
pub const RECORD_TERMINATOR: u8 = 0x1D;

/// Smallest parseable record: the leader plus the directory terminator.
pub const MIN_RECORD_LEN: usize = LEADER_LEN + 1;

/// An ISO 2709 record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    status: u8,
    implementation_code: FixedByteBuffer,
    user_defined: FixedByteBuffer,
    directory_map: DirectoryMap,
    indicator_width: usize,
    identifier_width: usize,
    fields: Vec<Field>,
}

impl Record {
    /// Create an empty record with the default header: status `n`,
    /// implementation codes `"am0 "`, blank user-defined bytes and a `"450 "`
    /// directory map.
    ///
    /// # Errors
    ///
    /// Returns [`MarcError::InvalidArgument`] if a width is not a single digit.
    pub fn new(indicator_width: usize, identifier_width: usize) -> Result<Self> {
        for (name, width) in [("indicator", indicator_width), ("identifier", identifier_width)] {
            if width > 9 {
                return Err(MarcError::InvalidArgument(format!(
                    "{name} width must be 0-9, got {width}"
                )));
            }
        }
        Ok(Record {
            status: DEFAULT_STATUS,
            implementation_code: FixedByteBuffer::from_bytes(DEFAULT_IMPLEMENTATION_CODE),
            user_defined: FixedByteBuffer::from_bytes(DEFAULT_USER_DEFINED),
            directory_map: DirectoryMap::default(),
            indicator_width,
            identifier_width,
            fields: Vec::new(),
        })
    }

    /// Create a builder for fluently constructing records.
    ///
    /// # Examples
    ///
    /// ```
    /// use iso2709::{DirectoryMap, FixedField, Record};
    ///
    /// let mut fixed = FixedField::new(b"005", 2)?;
    /// fixed.set_value(b"20200520170000.0");
    ///
    /// let record = Record::builder(2, 2)
    ///     .status(b'c')
    ///     .directory_map(DirectoryMap::new(4, 5, 2)?)
    ///     .field(fixed.into())
    ///     .build()?;
    ///
    /// assert_eq!(record.entry_size(), 14);
    /// # Ok::<(), iso2709::MarcError>(())
    /// ```
    #[must_use]
    pub fn builder(indicator_width: usize, identifier_width: usize) -> RecordBuilder {
        RecordBuilder {
            indicator_width,
            identifier_width,
            status: DEFAULT_STATUS,
            implementation_code: *DEFAULT_IMPLEMENTATION_CODE,
            user_defined: *DEFAULT_USER_DEFINED,
            directory_map: DirectoryMap::default(),
            fields: Vec::new(),
        }
    }

    /// Parse a complete record.
    ///
    /// The trailing record terminator is not required: some producers
    /// declare a length that leaves it out.
    ///
    /// # Errors
    ///
    /// Returns [`MarcError::MalformedRecord`] if the input is shorter than 25
    /// bytes, a numeric position holds non-digits, the directory length is
    /// not a whole number of entries, the directory is not terminated by a
    /// field terminator, or an entry points outside the input.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < MIN_RECORD_LEN {
            return Err(MarcError::MalformedRecord(format!(
                "record must be at least {MIN_RECORD_LEN} bytes, got {}",
                bytes.len()
            )));
        }

        let leader = Leader::from_bytes(bytes)?;
        let map = leader.directory_map.clone();
        let entry_size = map.entry_size();
        let base_address = leader.base_address;

        if base_address < MIN_RECORD_LEN || (base_address - MIN_RECORD_LEN) % entry_size != 0 {
            return Err(MarcError::MalformedRecord(format!(
                "base address {base_address} does not close a directory of {entry_size}-byte entries"
            )));
        }
        if base_address > bytes.len() || bytes[base_address - 1] != FIELD_TERMINATOR {
            return Err(MarcError::MalformedRecord(
                "directory is not terminated by a field terminator".to_string(),
            ));
        }

        let widths = FieldWidths {
            indicator: leader.indicator_width,
            identifier: leader.identifier_width,
            implementation_defined: map.implementation_defined_width(),
        };
        let directory = &bytes[LEADER_LEN..base_address - 1];
        let mut fields = Vec::with_capacity(directory.len() / entry_size);

        for entry in directory.chunks_exact(entry_size) {
            let (tag, rest) = entry.split_at(3);
            let (length_digits, rest) = rest.split_at(map.field_length_digits());
            let (start_digits, implementation_defined) =
                rest.split_at(map.start_position_digits());

            let mut length = directory_number(length_digits, tag, "length")?;
            let start = directory_number(start_digits, tag, "start position")?;
            let is_fragment = length == 0;
            if is_fragment {
                length = map.field_length_limit() - 1;
                warn!(
                    tag = %String::from_utf8_lossy(tag),
                    length,
                    "directory entry is a fragment of a longer field"
                );
            }

            let begin = base_address + start;
            let end = begin + length;
            if end > bytes.len() {
                return Err(MarcError::MalformedRecord(format!(
                    "field {} spans bytes {begin}..{end} of a {}-byte record",
                    String::from_utf8_lossy(tag),
                    bytes.len()
                )));
            }

            let mut field = Field::parse(tag, widths, &bytes[begin..end])?;
            if widths.implementation_defined > 0 {
                field.set_implementation_defined(implementation_defined)?;
            }
            field.set_fragment(is_fragment);
            fields.push(field);
        }

        debug!(
            fields = fields.len(),
            length = leader.record_length,
            "parsed record"
        );

        Ok(Record {
            status: leader.status,
            implementation_code: leader.implementation_code,
            user_defined: leader.user_defined,
            directory_map: map,
            indicator_width: leader.indicator_width,
            identifier_width: leader.identifier_width,
            fields,
        })
    }

    /// Serialize to the ISO 2709 wire layout: leader, directory, directory
    /// terminator, field data in directory order, record terminator.
    ///
    /// # Errors
    ///
    /// Returns [`MarcError::CapacityExceeded`] if a field length or start
    /// position does not fit its directory digits, or the record length or
    /// base address needs more than five digits.
    pub fn serialize(&self) -> Result<Vec<u8>> {
        let map = &self.directory_map;
        let mut directory = Vec::with_capacity(self.fields.len() * map.entry_size() + 1);
        let mut offset = 0;

        for field in &self.fields {
            let length = field.length();
            let declared = if field.is_fragment() { 0 } else { length };
            directory.extend_from_slice(field.tag().as_bytes());
            push_number(&mut directory, declared, map.field_length_digits(), "field length")?;
            push_number(&mut directory, offset, map.start_position_digits(), "start position")?;
            directory.extend_from_slice(field.implementation_defined().as_bytes());
            offset += length;
        }
        directory.push(FIELD_TERMINATOR);

        let base_address = LEADER_LEN + directory.len();
        let record_length = base_address + offset + 1;

        let mut out = self.leader_with(record_length, base_address).as_bytes()?;
        out.reserve(record_length - LEADER_LEN);
        out.extend_from_slice(&directory);
        for field in &self.fields {
            if let Some(indicator) = field.indicator() {
                out.extend_from_slice(indicator.as_bytes());
            }
            field.write_to(&mut out);
        }
        out.push(RECORD_TERMINATOR);

        debug!(fields = self.fields.len(), length = out.len(), "serialized record");
        Ok(out)
    }

    fn leader_with(&self, record_length: usize, base_address: usize) -> Leader {
        Leader {
            record_length,
            status: self.status,
            implementation_code: self.implementation_code.clone(),
            indicator_width: self.indicator_width,
            identifier_width: self.identifier_width,
            base_address,
            user_defined: self.user_defined.clone(),
            directory_map: self.directory_map.clone(),
        }
    }

    /// The leader this record would be serialized with.
    #[must_use]
    pub fn leader(&self) -> Leader {
        self.leader_with(self.length(), self.base_address())
    }

    /// Record status (leader position 5).
    #[must_use]
    pub fn status(&self) -> u8 {
        self.status
    }

    /// Set the record status.
    pub fn set_status(&mut self, status: u8) {
        self.status = status;
    }

    /// Implementation codes (leader positions 6-9).
    #[must_use]
    pub fn implementation_code(&self) -> &FixedByteBuffer {
        &self.implementation_code
    }

    /// Overwrite the implementation codes.
    ///
    /// # Errors
    ///
    /// Returns [`MarcError::CapacityExceeded`] for more than four bytes.
    pub fn set_implementation_code(&mut self, bytes: &[u8]) -> Result<()> {
        self.implementation_code.set_value(bytes)
    }

    /// User-defined bytes (leader positions 17-19).
    #[must_use]
    pub fn user_defined(&self) -> &FixedByteBuffer {
        &self.user_defined
    }

    /// Overwrite the user-defined bytes.
    ///
    /// # Errors
    ///
    /// Returns [`MarcError::CapacityExceeded`] for more than three bytes.
    pub fn set_user_defined(&mut self, bytes: &[u8]) -> Result<()> {
        self.user_defined.set_value(bytes)
    }

    /// Directory map (leader positions 20-23).
    #[must_use]
    pub fn directory_map(&self) -> &DirectoryMap {
        &self.directory_map
    }

    /// Indicator width of every data field.
    #[must_use]
    pub fn indicator_width(&self) -> usize {
        self.indicator_width
    }

    /// Subfield identifier width of every data field.
    #[must_use]
    pub fn identifier_width(&self) -> usize {
        self.identifier_width
    }

    /// The widths a field must be built with to be added to this record.
    #[must_use]
    pub fn widths(&self) -> FieldWidths {
        FieldWidths {
            indicator: self.indicator_width,
            identifier: self.identifier_width,
            implementation_defined: self.directory_map.implementation_defined_width(),
        }
    }

    /// Bytes per directory entry.
    #[must_use]
    pub fn entry_size(&self) -> usize {
        self.directory_map.entry_size()
    }

    /// Base address of the data area: leader, directory and its terminator.
    #[must_use]
    pub fn base_address(&self) -> usize {
        LEADER_LEN + self.entry_size() * self.fields.len() + 1
    }

    /// Total serialized length, record terminator included.
    #[must_use]
    pub fn length(&self) -> usize {
        self.base_address() + self.fields.iter().map(Field::length).sum::<usize>() + 1
    }

    /// Number of directory entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the record has no directory entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// All fields, in directory order.
    #[must_use]
    pub fn entries(&self) -> &[Field] {
        &self.fields
    }

    /// Fields whose tag matches `pattern`.
    ///
    /// # Errors
    ///
    /// Returns [`MarcError::InvalidArgument`] for an unusable pattern.
    pub fn entries_matching<P: TextPattern>(&self, pattern: P) -> Result<Vec<&Field>> {
        pattern.validate()?;
        Ok(self
            .fields
            .iter()
            .filter(|field| pattern.is_match_text(&field.tag().to_ascii_string()))
            .collect())
    }

    /// The field at `index`.
    #[must_use]
    pub fn entry_at(&self, index: usize) -> Option<&Field> {
        self.fields.get(index)
    }

    /// Mutable access to the field at `index`.
    ///
    /// Widths cannot be changed through this handle. Lengths can, and are
    /// checked against the directory again at [`Record::serialize`].
    pub fn entry_at_mut(&mut self, index: usize) -> Option<&mut Field> {
        self.fields.get_mut(index)
    }

    /// Append a field to the directory.
    ///
    /// # Errors
    ///
    /// - [`MarcError::StructureMismatch`] if the field's implementation-defined
    ///   width differs from the directory map's, or a data field's indicator
    ///   or identifier width differs from the record's
    /// - [`MarcError::CapacityExceeded`] if the field's length cannot be
    ///   written in the directory's field length digits
    ///
    /// The record is unchanged on error.
    pub fn add_entry(&mut self, field: Field) -> Result<()> {
        let expected = self.widths();
        if field.implementation_defined().len() != expected.implementation_defined {
            return Err(MarcError::StructureMismatch(format!(
                "field {} has {} implementation-defined bytes, the directory expects {}",
                field.tag().to_ascii_string(),
                field.implementation_defined().len(),
                expected.implementation_defined
            )));
        }

        let limit = self.directory_map.field_length_limit();
        if field.length() >= limit {
            return Err(MarcError::CapacityExceeded(format!(
                "field {} is {} bytes, the directory holds lengths below {limit}",
                field.tag().to_ascii_string(),
                field.length()
            )));
        }

        if let Some(data) = field.as_data() {
            if data.widths() != expected {
                return Err(MarcError::StructureMismatch(format!(
                    "field {} has indicator/identifier widths {}/{}, the record expects {}/{}",
                    field.tag().to_ascii_string(),
                    data.widths().indicator,
                    data.widths().identifier,
                    expected.indicator,
                    expected.identifier
                )));
            }
        }

        self.fields.push(field);
        Ok(())
    }

    /// Remove every field whose tag matches `pattern`. Returns the number removed.
    ///
    /// # Errors
    ///
    /// Returns [`MarcError::InvalidArgument`] for an unusable pattern.
    pub fn remove_entries<P: TextPattern>(&mut self, pattern: P) -> Result<usize> {
        pattern.validate()?;
        let before = self.fields.len();
        self.fields
            .retain(|field| !pattern.is_match_text(&field.tag().to_ascii_string()));
        Ok(before - self.fields.len())
    }

    /// Remove and return the field at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`MarcError::InvalidArgument`] if `index` is out of range.
    pub fn remove_entry_at(&mut self, index: usize) -> Result<Field> {
        if index >= self.fields.len() {
            return Err(MarcError::InvalidArgument(format!(
                "index {index} out of range for {} entries",
                self.fields.len()
            )));
        }
        Ok(self.fields.remove(index))
    }

    /// Sort the directory by tag. The sort is stable, so fields sharing a
    /// tag keep their relative order. Never done implicitly.
    pub fn sort_directory(&mut self) {
        self.fields.sort_by(Field::cmp_by_tag);
    }

    /// Human-readable form: the leader on the first line, then one line per
    /// field.
    #[must_use]
    pub fn to_display_string(&self, config: &CodecConfig) -> String {
        let mut out = self.leader().to_string();
        for field in &self.fields {
            out.push('\n');
            out.push_str(&field.to_display_string(config));
        }
        out
    }
}

fn directory_number(bytes: &[u8], tag: &[u8], name: &str) -> Result<usize> {
    parse_decimal(bytes).map_err(|e| {
        MarcError::MalformedRecord(format!(
            "directory entry {} has an invalid {name}: {e}",
            String::from_utf8_lossy(tag)
        ))
    })
}

/// Builder for [`Record`].
#[derive(Debug)]
pub struct RecordBuilder {
    indicator_width: usize,
    identifier_width: usize,
    status: u8,
    implementation_code: [u8; 4],
    user_defined: [u8; 3],
    directory_map: DirectoryMap,
    fields: Vec<Field>,
}

impl RecordBuilder {
    /// Set the record status.
    #[must_use]
    pub fn status(mut self, status: u8) -> Self {
        self.status = status;
        self
    }

    /// Set the implementation codes.
    #[must_use]
    pub fn implementation_code(mut self, code: [u8; 4]) -> Self {
        self.implementation_code = code;
        self
    }

    /// Set the user-defined bytes.
    #[must_use]
    pub fn user_defined(mut self, bytes: [u8; 3]) -> Self {
        self.user_defined = bytes;
        self
    }

    /// Set the directory map.
    #[must_use]
    pub fn directory_map(mut self, map: DirectoryMap) -> Self {
        self.directory_map = map;
        self
    }

    /// Append a field.
    #[must_use]
    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    /// Build the record, adding each field through [`Record::add_entry`].
    ///
    /// # Errors
    ///
    /// Returns the errors of [`Record::new`] and [`Record::add_entry`].
    pub fn build(self) -> Result<Record> {
        let mut record = Record::new(self.indicator_width, self.identifier_width)?;
        record.status = self.status;
        record.implementation_code = FixedByteBuffer::from_bytes(&self.implementation_code);
        record.user_defined = FixedByteBuffer::from_bytes(&self.user_defined);
        record.directory_map = self.directory_map;
        for field in self.fields {
            record.add_entry(field)?;
        }
        Ok(record)
    }
}
