#![warn(missing_docs)]

//! # iso2709
//!
//! Reading, writing and editing records in the ISO 2709 exchange format, the
//! binary container behind MARC 21, UNIMARC and CNMARC.
//!
//! An ISO 2709 record is a 24-byte leader, a directory of fixed-width entries
//! and a data area. The leader itself declares the widths used everywhere
//! else: indicator and subfield identifier widths, and the digit counts of
//! each directory entry. This crate keeps those widths as data rather than
//! assuming MARC 21's, so records from any profile round-trip byte for byte.
//!
//! ## Quick Start
//!
//! ### Reading records
//!
//! ```no_run
//! use iso2709::{CodecConfig, RecordStreamReader, TextEncoding};
//! use std::fs::File;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = CodecConfig {
//!     encoding: TextEncoding::for_label("gb18030")?,
//!     ..CodecConfig::default()
//! };
//!
//! let reader = RecordStreamReader::new(File::open("records.iso")?);
//! for record in reader {
//!     println!("{}", record?.to_display_string(&config));
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ### Building and writing records
//!
//! ```
//! use iso2709::{DataField, Record, RecordStreamWriter, Subfield};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut record = Record::new(2, 2)?;
//!
//! let mut title = DataField::new(b"200", record.widths())?;
//! title.set_indicator(b"1 ")?;
//! title.add_subfield(Subfield::with_content(b"a", b"The Great Gatsby"))?;
//! title.add_subfield(Subfield::with_content(b"f", b"F. Scott Fitzgerald"))?;
//! record.add_entry(title.into())?;
//!
//! let mut buffer = Vec::new();
//! let mut writer = RecordStreamWriter::new(&mut buffer);
//! writer.write_record(&record)?;
//! writer.finish()?;
//! assert_eq!(buffer.len(), record.length());
//! # Ok(())
//! # }
//! ```
//!
//! ### Finding fields
//!
//! ```
//! use iso2709::{pattern, DataField, Record, Subfield};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut record = Record::new(2, 2)?;
//! for tag in [b"600", b"650", b"700"] {
//!     let mut field = DataField::new(tag, record.widths())?;
//!     field.add_subfield(Subfield::with_content(b"a", b"Subject"))?;
//!     record.add_entry(field.into())?;
//! }
//!
//! assert_eq!(record.entries_matching(pattern::regex("^6")?)?.len(), 2);
//! assert_eq!(record.remove_entries(|tag: &str| tag == "700")?, 1);
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`record`] — [`Record`]: leader attributes, directory, parse and serialize
//! - [`field`] — The three field variants and the [`Field`] sum type
//! - [`subfield`] — [`Subfield`]
//! - [`leader`] — The 24-byte [`Leader`] and its [`DirectoryMap`]
//! - [`fixed_buffer`] — [`FixedByteBuffer`] for fixed-width byte runs
//! - [`reader`] — [`RecordStreamReader`] for sequential streams
//! - [`writer`] — [`RecordStreamWriter`]
//! - [`parallel`] — Rayon-backed batch parsing
//! - [`encoding`] / [`config`] — Text encoding and display configuration
//! - [`pattern`] — Tag and identifier matching
//! - [`error`] — Error types and result type

pub mod config;
pub mod encoding;
pub mod error;
pub mod field;
pub mod fixed_buffer;
pub mod leader;
pub mod parallel;
pub mod pattern;
pub mod reader;
pub mod record;
pub mod subfield;
pub mod writer;

pub use config::{CodecConfig, ReaderOptions};
pub use encoding::TextEncoding;
pub use error::{MarcError, Result};
pub use field::{ControlNumberField, DataField, Field, FieldKind, FieldWidths, FixedField};
pub use fixed_buffer::FixedByteBuffer;
pub use leader::{DirectoryMap, Leader};
pub use pattern::TextPattern;
pub use reader::RecordStreamReader;
pub use record::{Record, RecordBuilder};
pub use subfield::Subfield;
pub use writer::RecordStreamWriter;
