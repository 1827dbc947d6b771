//! This modules contains the basic data types required for interpreting
//! DICOM data element headers:
//! the attribute tag, the value length, and the value representation code.

use snafu::{Backtrace, Snafu};
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

/// The tag of an item header.
pub const ITEM: Tag = Tag(0xFFFE, 0xE000);
/// The tag of an item delimitation header.
pub const ITEM_DELIMITATION: Tag = Tag(0xFFFE, 0xE00D);
/// The tag of a sequence delimitation header.
pub const SEQUENCE_DELIMITATION: Tag = Tag(0xFFFE, 0xE0DD);

/// Error type for issues parsing a value representation code from text.
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum ParseVrError {
    /// The code must have exactly two ASCII characters.
    #[snafu(display("Invalid value representation code {:?}", code))]
    InvalidCode { code: String, backtrace: Backtrace },
}

/// Trait for any DICOM entity (element or item) which may have a length.
pub trait HasLength {
    /// Retrieve the value data's length as specified by the data element or
    /// item, in bytes.
    ///
    /// It is named `length` to make it distinct from the conventional method
    /// signature `len(&self) -> usize` for the number of elements of a
    /// collection.
    fn length(&self) -> Length;

    /// Check whether the value is empty (0 length).
    fn is_empty(&self) -> bool {
        self.length() == Length(0)
    }
}

/// A trait for a data type containing a DICOM header.
#[allow(clippy::len_without_is_empty)]
pub trait Header: HasLength {
    /// Retrieve the element's tag as a `(group, element)` tuple.
    fn tag(&self) -> Tag;

    /// Check whether this is the header of an item.
    fn is_item(&self) -> bool {
        self.tag() == ITEM
    }

    /// Check whether this is the header of an item delimiter.
    fn is_item_delimiter(&self) -> bool {
        self.tag() == ITEM_DELIMITATION
    }

    /// Check whether this is the header of a sequence delimiter.
    fn is_sequence_delimiter(&self) -> bool {
        self.tag() == SEQUENCE_DELIMITATION
    }
}

/// Idiomatic alias for a tag's group number.
pub type GroupNumber = u16;
/// Idiomatic alias for a tag's element number.
pub type ElementNumber = u16;

/// The data type for DICOM data element tags.
///
/// Both `(u16, u16)` and `[u16; 2]` can be
/// efficiently converted to this type as well.
#[derive(PartialEq, Eq, Hash, PartialOrd, Ord, Clone, Copy)]
pub struct Tag(pub GroupNumber, pub ElementNumber);

impl Tag {
    /// Getter for the tag's group value.
    #[inline]
    pub fn group(self) -> GroupNumber {
        self.0
    }

    /// Getter for the tag's element value.
    #[inline]
    pub fn element(self) -> ElementNumber {
        self.1
    }

    /// Check whether this is one of the three tags
    /// reserved for items and delimiters,
    /// which are never followed by a VR field.
    #[inline]
    pub fn is_reserved(self) -> bool {
        self == ITEM || self == ITEM_DELIMITATION || self == SEQUENCE_DELIMITATION
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Tag({:#06X?}, {:#06X?})", self.0, self.1)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({:04X},{:04X})", self.0, self.1)
    }
}

impl PartialEq<(u16, u16)> for Tag {
    fn eq(&self, other: &(u16, u16)) -> bool {
        self.0 == other.0 && self.1 == other.1
    }
}

impl From<(u16, u16)> for Tag {
    #[inline]
    fn from(value: (u16, u16)) -> Tag {
        Tag(value.0, value.1)
    }
}

impl From<[u16; 2]> for Tag {
    #[inline]
    fn from(value: [u16; 2]) -> Tag {
        Tag(value[0], value[1])
    }
}

/// A type for representing data set content length, in bytes.
/// An internal value of `0xFFFF_FFFF` represents an undefined
/// (unspecified) length, which is resolved by a later delimiter
/// in the stream.
///
/// Unlike a bare integer, the undefined sentinel never leaks out
/// through [`get`](Length::get):
///
/// ```
/// # use dicom_tree_core::Length;
/// assert_eq!(Length::UNDEFINED.get(), None);
/// assert_eq!(Length::new(0xFFFF_FFFF), Length::UNDEFINED);
/// assert_eq!(Length::new(16).get(), Some(16));
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Length(pub u32);

const UNDEFINED_LEN: u32 = 0xFFFF_FFFF;

impl Length {
    /// A length that is undefined.
    pub const UNDEFINED: Self = Length(UNDEFINED_LEN);

    /// Create a new length value from its internal representation.
    /// This is equivalent to `Length(len)`.
    #[inline]
    pub fn new(len: u32) -> Self {
        Length(len)
    }

    /// Check whether this length is undefined (unknown).
    #[inline]
    pub fn is_undefined(self) -> bool {
        self.0 == UNDEFINED_LEN
    }

    /// Check whether this length is well defined (not undefined).
    #[inline]
    pub fn is_defined(self) -> bool {
        !self.is_undefined()
    }

    /// Fetch the concrete length value, if available.
    /// Returns `None` if it represents an undefined length.
    #[inline]
    pub fn get(self) -> Option<u32> {
        match self.0 {
            UNDEFINED_LEN => None,
            v => Some(v),
        }
    }
}

impl From<u32> for Length {
    #[inline]
    fn from(o: u32) -> Self {
        Length(o)
    }
}

impl From<Option<u32>> for Length {
    #[inline]
    fn from(o: Option<u32>) -> Self {
        o.map(Length).unwrap_or(Length::UNDEFINED)
    }
}

impl fmt::Debug for Length {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.0 {
            UNDEFINED_LEN => f.write_str("Length(Undefined)"),
            l => f.debug_tuple("Length").field(&l).finish(),
        }
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.0 {
            UNDEFINED_LEN => f.write_str("U/L"),
            l => write!(f, "{}", &l),
        }
    }
}

/// The value representations whose Value Length Field
/// is the 16-bit unsigned integer following the two byte VR Field
/// (PS3.5 7.1.2).
/// All other codes are followed by two reserved bytes
/// and a 32-bit length.
pub const SHORT_LENGTH_VRS: [[u8; 2]; 21] = [
    *b"AE", *b"AS", *b"AT", *b"CS", *b"DA", *b"DS", *b"DT", *b"FL", *b"FD", *b"IS", *b"LO",
    *b"LT", *b"PN", *b"SH", *b"SL", *b"SS", *b"ST", *b"TM", *b"UI", *b"UL", *b"US",
];

/// A two-byte value representation code, exactly as found in the stream.
///
/// No dictionary is consulted,
/// so codes outside the standard set are kept as they are.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VrCode(pub [u8; 2]);

impl VrCode {
    /// Obtain the code from its two bytes.
    #[inline]
    pub fn from_binary(chars: [u8; 2]) -> Self {
        VrCode(chars)
    }

    /// Retrieve a copy of this code's byte representation.
    #[inline]
    pub fn to_bytes(self) -> [u8; 2] {
        self.0
    }

    /// Retrieve the code as text.
    ///
    /// Bytes which do not form valid UTF-8 are replaced
    /// with the Unicode replacement character.
    pub fn as_str(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.0)
    }

    /// Whether this code is in the fixed set of representations
    /// using an explicit 16-bit length field.
    #[inline]
    pub fn has_short_length(self) -> bool {
        SHORT_LENGTH_VRS.contains(&self.0)
    }
}

impl fmt::Debug for VrCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "VrCode({:?})", self.as_str())
    }
}

impl fmt::Display for VrCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.as_str())
    }
}

/// Obtain the value representation code corresponding to the given string.
/// The string should hold exactly two ASCII characters.
impl FromStr for VrCode {
    type Err = ParseVrError;

    fn from_str(string: &str) -> Result<Self, Self::Err> {
        match string.as_bytes() {
            [a, b] if a.is_ascii() && b.is_ascii() => Ok(VrCode([*a, *b])),
            _ => InvalidCodeSnafu { code: string }.fail(),
        }
    }
}

/// The header of a data element as decoded from the stream:
/// the tag, the VR code when the tag is not reserved,
/// and the value length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElementHeader {
    /// DICOM tag
    pub tag: Tag,
    /// Value representation, absent for items and delimiters
    pub vr: Option<VrCode>,
    /// Element length
    pub len: Length,
}

impl ElementHeader {
    /// Create a new element header with the given properties.
    pub fn new<T: Into<Tag>>(tag: T, vr: Option<VrCode>, len: Length) -> Self {
        ElementHeader {
            tag: tag.into(),
            vr,
            len,
        }
    }

    /// Retrieve the element's value representation, if any.
    #[inline]
    pub fn vr(&self) -> Option<VrCode> {
        self.vr
    }

    /// The number of bytes this header takes in the stream.
    pub fn encoded_len(&self) -> u64 {
        match self.vr {
            None => 8,
            Some(vr) if vr.has_short_length() => 8,
            Some(_) => 12,
        }
    }
}

impl HasLength for ElementHeader {
    #[inline]
    fn length(&self) -> Length {
        self.len
    }
}

impl Header for ElementHeader {
    #[inline]
    fn tag(&self) -> Tag {
        self.tag
    }
}
