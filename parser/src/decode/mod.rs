//! This module contains the DICOM data element header decoding logic.
//!
//! Decoders here only resolve the tag, VR and length of an element.
//! Reading the value bytes that follow is left to the
//! [stateful decoder](crate::stateful::decode).

use dicom_tree_core::{ElementHeader, Tag};
use snafu::{Backtrace, Snafu};
use std::io::{self, ErrorKind, Read};

pub mod explicit_le;

pub use self::explicit_le::ExplicitVRLittleEndianDecoder;

/// Module-level error type:
/// for errors which may occur while decoding element headers.
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum Error {
    #[snafu(display("Failed to read the header's tag field: {}", source))]
    ReadTag {
        backtrace: Backtrace,
        source: io::Error,
    },
    #[snafu(display("Truncated tag field: only {} of 4 bytes available", read))]
    TruncatedTag { read: usize, backtrace: Backtrace },
    #[snafu(display("Failed to read the header's item length field: {}", source))]
    ReadItemLength {
        tag: Tag,
        backtrace: Backtrace,
        source: io::Error,
    },
    #[snafu(display("Failed to read the value representation of {}: {}", tag, source))]
    ReadVr {
        tag: Tag,
        backtrace: Backtrace,
        source: io::Error,
    },
    #[snafu(display("Failed to read the reserved bytes of {}: {}", tag, source))]
    ReadReserved {
        tag: Tag,
        backtrace: Backtrace,
        source: io::Error,
    },
    #[snafu(display("Failed to read the element length field of {}: {}", tag, source))]
    ReadLength {
        tag: Tag,
        backtrace: Backtrace,
        source: io::Error,
    },
}

impl Error {
    /// Whether the error was caused by the input ending
    /// in the middle of a fixed-size header field.
    pub fn is_truncated(&self) -> bool {
        match self {
            Error::TruncatedTag { .. } => true,
            Error::ReadTag { source, .. }
            | Error::ReadItemLength { source, .. }
            | Error::ReadVr { source, .. }
            | Error::ReadReserved { source, .. }
            | Error::ReadLength { source, .. } => source.kind() == ErrorKind::UnexpectedEof,
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Type trait for reading and decoding DICOM element headers
/// from a data source.
///
/// A clean end of the source before a new header is not an error:
/// the methods return `None` in that case.
pub trait Decode {
    /// Fetch and decode the next data element header from the given source.
    /// On success, returns the header
    /// and the exact number of bytes read from the source.
    fn decode_header<S>(&self, source: &mut S) -> Result<Option<(ElementHeader, usize)>>
    where
        S: ?Sized + Read;

    /// Decode a DICOM attribute tag from the given source.
    fn decode_tag<S>(&self, source: &mut S) -> Result<Option<Tag>>
    where
        S: ?Sized + Read;
}
