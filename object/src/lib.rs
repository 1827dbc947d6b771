//! This crate contains the loading of whole DICOM files
//! into trees of data elements.
//!
//! A DICOM file is made of a 128-byte preamble,
//! the magic code `DICM`,
//! and a data set in Explicit VR Little Endian.
//! Loading a file can be done with the function [`open_file`].
//! For additional reading options, use [`OpenFileOptions`].
//!
//! # Example
//!
//! ```no_run
//! use dicom_tree_core::Tag;
//! use dicom_tree_object::open_file;
//!
//! let file = open_file("0001.dcm")?;
//! for element in file.find_elements_by_tag(Tag(0x0010, 0x0010)) {
//!     println!("{}", element);
//! }
//! # Result::<(), dicom_tree_object::ReadError>::Ok(())
//! ```
//!
//! The entire data set is loaded into memory,
//! including the value bytes of every element.
//! Nested sequences and items of undefined length
//! are available as the [children](DataElement::children)
//! of the element which opened them.
use dicom_tree_core::{DataElement, Header, Tag, Walk};
use snafu::{Backtrace, Snafu};
use std::fmt;
use std::path::{Path, PathBuf};

pub mod file;

pub use crate::file::{from_reader, open_file, OpenFileOptions};
pub use dicom_tree_parser::dataset::DataSetReaderOptions;

/// The length of the file preamble in bytes.
pub const PREAMBLE_LEN: usize = 128;

/// The magic code right after the preamble.
pub const DICM_MAGIC_CODE: [u8; 4] = [b'D', b'I', b'C', b'M'];

/// An error which may occur when loading a DICOM file
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum ReadError {
    #[snafu(display("Could not open file '{}'", filename.display()))]
    OpenFile {
        filename: std::path::PathBuf,
        backtrace: Backtrace,
        source: std::io::Error,
    },
    /// Could not read preamble bytes
    ReadPreambleBytes {
        backtrace: Backtrace,
        source: std::io::Error,
    },
    /// Could not read the magic code
    ReadMagicCode {
        backtrace: Backtrace,
        source: std::io::Error,
    },
    #[snafu(display(
        "Invalid DICOM file: expected magic code `DICM`, found {:?}",
        String::from_utf8_lossy(magic)
    ))]
    NotDicom { magic: [u8; 4], backtrace: Backtrace },
    #[snafu(display("Could not parse data set"))]
    ParseDataSet {
        #[snafu(backtrace)]
        source: dicom_tree_parser::dataset::read::Error,
    },
}

impl ReadError {
    /// Whether the file ended before its structure was complete,
    /// be it in the preamble, the magic code or the data set.
    pub fn is_truncated(&self) -> bool {
        match self {
            ReadError::ReadPreambleBytes { source, .. } | ReadError::ReadMagicCode { source, .. } => {
                source.kind() == std::io::ErrorKind::UnexpectedEof
            }
            ReadError::ParseDataSet { source } => source.is_truncated(),
            ReadError::OpenFile { .. } | ReadError::NotDicom { .. } => false,
        }
    }
}

pub type Result<T, E = ReadError> = std::result::Result<T, E>;

/// A fully loaded DICOM file:
/// the preamble and the tree of data elements that follows the magic code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DicomFile {
    path: Option<PathBuf>,
    preamble: [u8; PREAMBLE_LEN],
    dataset: Vec<DataElement>,
}

impl DicomFile {
    /// Assemble a DICOM file from its parts.
    pub fn new(
        path: Option<PathBuf>,
        preamble: [u8; PREAMBLE_LEN],
        dataset: Vec<DataElement>,
    ) -> Self {
        DicomFile {
            path,
            preamble,
            dataset,
        }
    }

    /// The path of the file this was loaded from,
    /// if it was loaded from the file system.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// The raw 128 bytes before the magic code.
    pub fn preamble(&self) -> &[u8; PREAMBLE_LEN] {
        &self.preamble
    }

    /// The top level data elements, in stream order.
    pub fn dataset(&self) -> &[DataElement] {
        &self.dataset
    }

    /// Discard the path and preamble,
    /// keeping only the top level data elements.
    pub fn into_dataset(self) -> Vec<DataElement> {
        self.dataset
    }

    /// Retrieve all top level elements with the given tag,
    /// in stream order.
    pub fn find_elements_by_tag<T: Into<Tag>>(&self, tag: T) -> Vec<&DataElement> {
        let tag = tag.into();
        self.dataset.iter().filter(|e| e.tag() == tag).collect()
    }

    /// Traverse the whole element tree depth first,
    /// yielding each element with its nesting depth.
    pub fn walk(&self) -> Walk<'_> {
        Walk::new(&self.dataset)
    }
}

impl fmt::Display for DicomFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.path {
            Some(path) => write!(f, "DICOM({}, size={})", path.display(), self.dataset.len()),
            None => write!(f, "DICOM(<stream>, size={})", self.dataset.len()),
        }
    }
}
