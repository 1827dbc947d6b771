//! The element model: a closed sum type over the generic data element
//! and the three structural elements (item, item delimitation and
//! sequence delimitation).
//!
//! Every variant shares the same [`ElementBody`]:
//! a length, the raw value bytes when the length is defined,
//! and the nested children when it is not.

use crate::header::{
    ElementHeader, HasLength, Header, Length, Tag, VrCode, ITEM, ITEM_DELIMITATION,
    SEQUENCE_DELIMITATION,
};
use std::fmt;

/// The value part shared by all element variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementBody {
    len: Length,
    data: Option<Vec<u8>>,
    children: Vec<DataElement>,
}

impl ElementBody {
    /// Create the body of an element with a defined length,
    /// which is the byte length of `data`.
    ///
    /// # Panic
    ///
    /// This function will panic if the data is too large
    /// to be described by a defined 32-bit length.
    pub fn defined(data: Vec<u8>) -> Self {
        assert!(
            data.len() < 0xFFFF_FFFF,
            "value data too large for a defined length"
        );
        ElementBody {
            len: Length(data.len() as u32),
            data: Some(data),
            children: Vec::new(),
        }
    }

    /// Create the body of an element with an undefined length.
    /// It has no value data and no children yet.
    pub fn undefined() -> Self {
        ElementBody {
            len: Length::UNDEFINED,
            data: None,
            children: Vec::new(),
        }
    }

    /// The value length, never the raw undefined sentinel
    /// when read through [`Length::get`].
    #[inline]
    pub fn length(&self) -> Length {
        self.len
    }

    /// The raw value bytes, absent when the length is undefined.
    #[inline]
    pub fn data(&self) -> Option<&[u8]> {
        self.data.as_deref()
    }

    /// The nested elements, in stream order.
    #[inline]
    pub fn children(&self) -> &[DataElement] {
        &self.children
    }
}

/// A data element of a DICOM data set.
///
/// Elements with a reserved tag are always represented by
/// one of the structural variants, which carry no VR.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataElement {
    /// A regular data element with its VR code.
    Generic {
        /// the element's tag, never one of the reserved tags
        tag: Tag,
        /// the value representation code as read
        vr: VrCode,
        /// length, data and children
        body: ElementBody,
    },
    /// Item `(FFFE,E000)`
    Item(ElementBody),
    /// Item Delimitation `(FFFE,E00D)`
    ItemDelimitation(ElementBody),
    /// Sequence Delimitation `(FFFE,E0DD)`
    SequenceDelimitation(ElementBody),
}

impl DataElement {
    /// Create a data element from its tag, VR and body.
    ///
    /// If the tag is one of the reserved item or delimiter tags,
    /// the respective structural variant is created
    /// and the VR is discarded.
    pub fn new<T: Into<Tag>>(tag: T, vr: VrCode, body: ElementBody) -> Self {
        let tag = tag.into();
        match tag {
            ITEM => DataElement::Item(body),
            ITEM_DELIMITATION => DataElement::ItemDelimitation(body),
            SEQUENCE_DELIMITATION => DataElement::SequenceDelimitation(body),
            _ => DataElement::Generic { tag, vr, body },
        }
    }

    /// Create the structural element for the given reserved tag.
    /// Returns `None` if the tag is not reserved.
    pub fn structural(tag: Tag, body: ElementBody) -> Option<Self> {
        match tag {
            ITEM => Some(DataElement::Item(body)),
            ITEM_DELIMITATION => Some(DataElement::ItemDelimitation(body)),
            SEQUENCE_DELIMITATION => Some(DataElement::SequenceDelimitation(body)),
            _ => None,
        }
    }

    /// Retrieve the value representation code.
    /// Structural elements have none.
    pub fn vr(&self) -> Option<VrCode> {
        match self {
            DataElement::Generic { vr, .. } => Some(*vr),
            _ => None,
        }
    }

    /// Retrieve the element's body.
    pub fn body(&self) -> &ElementBody {
        match self {
            DataElement::Generic { body, .. }
            | DataElement::Item(body)
            | DataElement::ItemDelimitation(body)
            | DataElement::SequenceDelimitation(body) => body,
        }
    }

    fn body_mut(&mut self) -> &mut ElementBody {
        match self {
            DataElement::Generic { body, .. }
            | DataElement::Item(body)
            | DataElement::ItemDelimitation(body)
            | DataElement::SequenceDelimitation(body) => body,
        }
    }

    /// Obtain the header of this element.
    pub fn header(&self) -> ElementHeader {
        ElementHeader::new(self.tag(), self.vr(), self.length())
    }

    /// The raw value bytes, absent when the length is undefined.
    #[inline]
    pub fn data(&self) -> Option<&[u8]> {
        self.body().data()
    }

    /// The nested elements, in stream order.
    #[inline]
    pub fn children(&self) -> &[DataElement] {
        self.body().children()
    }

    /// Whether the length of this element is undefined,
    /// meaning that its content is given by its children.
    #[inline]
    pub fn is_length_undefined(&self) -> bool {
        self.length().is_undefined()
    }

    /// Whether this element closes the current nesting level
    /// (item delimitation or sequence delimitation).
    #[inline]
    pub fn is_delimiter(&self) -> bool {
        matches!(
            self,
            DataElement::ItemDelimitation(_) | DataElement::SequenceDelimitation(_)
        )
    }

    /// Attach the complete sequence of nested elements,
    /// replacing any previous children.
    pub fn with_children(mut self, children: Vec<DataElement>) -> Self {
        self.body_mut().children = children;
        self
    }

    /// The number of stream bytes occupied by this element,
    /// including the header, the value data and all descendants.
    pub fn encoded_len(&self) -> u64 {
        let data_len = self.data().map_or(0, |d| d.len() as u64);
        self.header().encoded_len()
            + data_len
            + self.children().iter().map(DataElement::encoded_len).sum::<u64>()
    }

    /// Iterate over this element and all of its descendants, depth-first,
    /// along with their nesting depth (0 for this element).
    pub fn iter(&self) -> Walk<'_> {
        Walk {
            stack: vec![(0, self)],
        }
    }
}

impl HasLength for DataElement {
    #[inline]
    fn length(&self) -> Length {
        self.body().length()
    }
}

impl Header for DataElement {
    fn tag(&self) -> Tag {
        match self {
            DataElement::Generic { tag, .. } => *tag,
            DataElement::Item(_) => ITEM,
            DataElement::ItemDelimitation(_) => ITEM_DELIMITATION,
            DataElement::SequenceDelimitation(_) => SEQUENCE_DELIMITATION,
        }
    }
}

impl fmt::Display for DataElement {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let body = self.body();
        match self {
            DataElement::Generic { tag, vr, .. } => write!(f, "DataElement({}, vr={}, ", tag, vr)?,
            DataElement::Item(_) => f.write_str("Item(")?,
            DataElement::ItemDelimitation(_) => f.write_str("ItemDelimitation(")?,
            DataElement::SequenceDelimitation(_) => f.write_str("SequenceDelimitation(")?,
        }
        write!(
            f,
            "vl={}, children={})",
            body.length(),
            body.children().len()
        )
    }
}

/// A depth-first iterator over a tree of data elements,
/// yielding each element with its nesting depth.
#[derive(Debug, Clone)]
pub struct Walk<'a> {
    stack: Vec<(usize, &'a DataElement)>,
}

impl<'a> Walk<'a> {
    /// Walk over a sequence of sibling elements and their descendants.
    pub fn new(elements: &'a [DataElement]) -> Self {
        Walk {
            stack: elements.iter().rev().map(|e| (0, e)).collect(),
        }
    }
}

impl<'a> Iterator for Walk<'a> {
    type Item = (usize, &'a DataElement);

    fn next(&mut self) -> Option<Self::Item> {
        let (depth, elem) = self.stack.pop()?;
        self.stack
            .extend(elem.children().iter().rev().map(|child| (depth + 1, child)));
        Some((depth, elem))
    }
}
