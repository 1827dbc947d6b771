//! This module provides the element reading abstraction:
//! a decoder bound to a data source,
//! which reads one whole data element (header and value) at a time
//! and keeps track of the number of bytes consumed.

use crate::decode::{self, Decode, ExplicitVRLittleEndianDecoder};
use dicom_tree_core::{DataElement, ElementBody, ElementHeader, Tag};
use snafu::{ensure, Backtrace, OptionExt, ResultExt, Snafu};
use std::io::{self, ErrorKind, Read};

/// The maximum number of bytes reserved up front for a value,
/// regardless of its declared length.
/// Larger values grow the buffer as the bytes actually arrive.
const PREALLOC_LIMIT: u32 = 0x10_0000;

#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum Error {
    #[snafu(display("Could not decode element header at position {}", position))]
    DecodeElementHeader {
        position: u64,
        #[snafu(backtrace)]
        source: decode::Error,
    },
    #[snafu(display("Could not read {} value bytes for element tagged {}", len, tag))]
    ReadValueData {
        tag: Tag,
        len: u32,
        backtrace: Backtrace,
        source: io::Error,
    },
    #[snafu(display("Element tagged {} has no VR but is not an item nor a delimiter", tag))]
    MissingVr { tag: Tag, backtrace: Backtrace },
    #[snafu(display(
        "Truncated value of element tagged {}: expected {} bytes but only {} were available",
        tag,
        len,
        read
    ))]
    TruncatedValue {
        tag: Tag,
        len: u32,
        read: u64,
        backtrace: Backtrace,
    },
}

impl Error {
    /// Whether the error was caused by the input ending
    /// before a fixed-size field or a declared-length value was complete.
    pub fn is_truncated(&self) -> bool {
        match self {
            Error::DecodeElementHeader { source, .. } => source.is_truncated(),
            Error::ReadValueData { source, .. } => source.kind() == ErrorKind::UnexpectedEof,
            Error::TruncatedValue { .. } => true,
            Error::MissingVr { .. } => false,
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// A stateful abstraction for reading data elements one by one.
/// The decoder owns its source for the whole reading process,
/// never reading past the extent declared by each length field.
#[derive(Debug)]
pub struct StatefulDecoder<S, D = ExplicitVRLittleEndianDecoder> {
    from: S,
    decoder: D,
    position: u64,
}

impl<S> StatefulDecoder<S> {
    /// Create a new element reader over the given source,
    /// using the Explicit VR Little Endian header layout.
    pub fn new(from: S) -> Self {
        StatefulDecoder::new_with(from, ExplicitVRLittleEndianDecoder, 0)
    }
}

impl<S, D> StatefulDecoder<S, D> {
    /// Create a new element reader with the given header decoder
    /// and a starting position, used for reporting only.
    pub fn new_with(from: S, decoder: D, position: u64) -> Self {
        StatefulDecoder {
            from,
            decoder,
            position,
        }
    }

    /// Retrieve the exact number of bytes read so far,
    /// counted from the starting position.
    #[inline]
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Unwrap the underlying data source.
    pub fn into_inner(self) -> S {
        self.from
    }
}

impl<S, D> StatefulDecoder<S, D>
where
    S: Read,
    D: Decode,
{
    /// Decode the next data element header.
    ///
    /// Returns `None` if the source ended right at this position.
    pub fn decode_header(&mut self) -> Result<Option<ElementHeader>> {
        let position = self.position;
        let out = self
            .decoder
            .decode_header(&mut self.from)
            .context(DecodeElementHeaderSnafu { position })?;
        Ok(out.map(|(header, bytes_read)| {
            self.position += bytes_read as u64;
            header
        }))
    }

    /// Read the next data element from the source.
    ///
    /// The value bytes are read eagerly when the length is defined.
    /// Elements of undefined length are returned without data nor children,
    /// as their content is only known after the nested elements are read.
    ///
    /// Returns `None` if the source ended right before a new element,
    /// which signals the end of input rather than an error.
    pub fn read_element(&mut self) -> Result<Option<DataElement>> {
        let header = match self.decode_header()? {
            Some(header) => header,
            None => return Ok(None),
        };

        tracing::trace!(
            "{} {} (len = {}) at position {}",
            header.tag,
            header.vr.map(|vr| vr.to_string()).unwrap_or_default(),
            header.len,
            self.position
        );

        let body = match header.len.get() {
            None => ElementBody::undefined(),
            Some(len) => ElementBody::defined(self.read_value(header.tag, len)?),
        };

        build_element(header, body).map(Some)
    }

    /// Read exactly `len` value bytes, failing on a short read.
    fn read_value(&mut self, tag: Tag, len: u32) -> Result<Vec<u8>> {
        let mut data = Vec::with_capacity(len.min(PREALLOC_LIMIT) as usize);
        let read = (&mut self.from)
            .take(u64::from(len))
            .read_to_end(&mut data)
            .context(ReadValueDataSnafu { tag, len })? as u64;
        self.position += read;
        ensure!(
            read == u64::from(len),
            TruncatedValueSnafu { tag, len, read }
        );
        Ok(data)
    }
}

fn build_element(header: ElementHeader, body: ElementBody) -> Result<DataElement> {
    match header.vr {
        Some(vr) => Ok(DataElement::new(header.tag, vr, body)),
        None => DataElement::structural(header.tag, body)
            .context(MissingVrSnafu { tag: header.tag }),
    }
}

/// Read a single data element from the given source.
///
/// This is a convenience function for a one-off element read
/// with a [`StatefulDecoder`].
/// Returns `None` if the source has no more bytes.
pub fn read_element<S>(source: &mut S) -> Result<Option<DataElement>>
where
    S: ?Sized + Read,
{
    StatefulDecoder::new(source).read_element()
}
