//! Explicit VR Little Endian header decoding

use crate::decode::{
    Decode, ReadItemLengthSnafu, ReadLengthSnafu, ReadReservedSnafu, ReadTagSnafu, ReadVrSnafu,
    Result, TruncatedTagSnafu,
};
use crate::util::read_up_to;
use byteordered::byteorder::{ByteOrder, LittleEndian};
use dicom_tree_core::{ElementHeader, Length, Tag, VrCode};
use snafu::ResultExt;
use std::io::Read;

/// A data element header decoder for the Explicit VR Little Endian encoding.
#[derive(Debug, Default, Clone)]
pub struct ExplicitVRLittleEndianDecoder;

impl Decode for ExplicitVRLittleEndianDecoder {
    fn decode_header<S>(&self, mut source: &mut S) -> Result<Option<(ElementHeader, usize)>>
    where
        S: ?Sized + Read,
    {
        // retrieve tag
        let tag = match self.decode_tag(&mut source)? {
            Some(tag) => tag,
            None => return Ok(None),
        };

        let mut buf = [0u8; 4];
        if tag.is_reserved() {
            // item and delimiters do not have VR or reserved field
            source
                .read_exact(&mut buf)
                .context(ReadItemLengthSnafu { tag })?;
            let len = LittleEndian::read_u32(&buf);
            return Ok(Some((
                ElementHeader::new(tag, None, Length(len)),
                8, // tag + len
            )));
        }

        // retrieve explicit VR
        source
            .read_exact(&mut buf[0..2])
            .context(ReadVrSnafu { tag })?;
        let vr = VrCode::from_binary([buf[0], buf[1]]);
        let bytes_read;

        // retrieve data length
        let len = if vr.has_short_length() {
            // PS3.5 7.1.2:
            // for VRs of AE, AS, AT, CS, DA, DS, DT, FL, FD, IS, LO, LT, PN,
            // SH, SL, SS, ST, TM, UI, UL and US the Value Length Field is the
            // 16-bit unsigned integer following the two byte VR Field
            source
                .read_exact(&mut buf[0..2])
                .context(ReadLengthSnafu { tag })?;
            bytes_read = 8;
            u32::from(LittleEndian::read_u16(&buf[0..2]))
        } else {
            // for all other VRs the 16 bits following the two byte VR Field
            // are reserved, and the Value Length Field is a 32-bit unsigned
            // integer
            source
                .read_exact(&mut buf[0..2])
                .context(ReadReservedSnafu { tag })?;
            source
                .read_exact(&mut buf)
                .context(ReadLengthSnafu { tag })?;
            bytes_read = 12;
            LittleEndian::read_u32(&buf)
        };

        Ok(Some((ElementHeader::new(tag, Some(vr), Length(len)), bytes_read)))
    }

    fn decode_tag<S>(&self, source: &mut S) -> Result<Option<Tag>>
    where
        S: ?Sized + Read,
    {
        let mut buf = [0u8; 4];
        match read_up_to(source, &mut buf).context(ReadTagSnafu)? {
            0 => Ok(None),
            4 => Ok(Some(Tag(
                LittleEndian::read_u16(&buf[0..2]),
                LittleEndian::read_u16(&buf[2..4]),
            ))),
            read => TruncatedTagSnafu { read }.fail(),
        }
    }
}
