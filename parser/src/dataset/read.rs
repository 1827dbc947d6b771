//! This module contains the recursive data set reader,
//! which builds the tree of data elements from a byte source.
//!
//! Elements of undefined length are resolved by reading their nested
//! content right after them, up to and including the delimitation element
//! that closes it. Nesting is tracked by the call stack,
//! bounded by [`DataSetReaderOptions::max_depth`].
use crate::stateful::decode::{Error as DecoderError, StatefulDecoder};
use dicom_tree_core::{DataElement, Header, Tag};
use snafu::{ensure, Backtrace, ResultExt, Snafu};
use std::io::Read;

#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum Error {
    #[snafu(display("Could not read data element"))]
    ReadElement {
        #[snafu(backtrace)]
        source: DecoderError,
    },
    #[snafu(display(
        "Nesting limit of {} levels exceeded by element tagged {} at position {}",
        max_depth,
        tag,
        position
    ))]
    DepthLimitExceeded {
        max_depth: u32,
        tag: Tag,
        position: u64,
        backtrace: Backtrace,
    },
}

impl Error {
    /// Whether the error was caused by the input ending
    /// in the middle of an element.
    pub fn is_truncated(&self) -> bool {
        match self {
            Error::ReadElement { source } => source.is_truncated(),
            Error::DepthLimitExceeded { .. } => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// The default maximum nesting depth of undefined length content.
pub const DEFAULT_MAX_DEPTH: u32 = 64;

/// The set of options for the data set reader.
#[derive(Debug, Copy, Clone, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub struct DataSetReaderOptions {
    /// the maximum number of nested undefined length levels
    pub max_depth: u32,
}

impl Default for DataSetReaderOptions {
    fn default() -> Self {
        DataSetReaderOptions {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl DataSetReaderOptions {
    /// Replace the maximum nesting depth of the options.
    pub fn max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }
}

/// A reader for retrieving the full tree of a DICOM data set
/// from an arbitrary data source.
#[derive(Debug)]
pub struct DataSetReader<S> {
    /// the element reader
    parser: StatefulDecoder<S>,
    /// the options of this reader
    options: DataSetReaderOptions,
}

impl<S> DataSetReader<S>
where
    S: Read,
{
    /// Create a new data set reader over the given source.
    pub fn new(source: S, options: DataSetReaderOptions) -> Self {
        DataSetReader {
            parser: StatefulDecoder::new(source),
            options,
        }
    }

    /// Read the data set to the end of the source,
    /// or until a delimitation element closes the current level.
    pub fn read_dataset(&mut self) -> Result<Vec<DataElement>> {
        self.read_level(0)
    }

    /// Retrieve the exact number of bytes read so far.
    #[inline]
    pub fn position(&self) -> u64 {
        self.parser.position()
    }

    /// Unwrap the underlying data source.
    pub fn into_inner(self) -> S {
        self.parser.into_inner()
    }

    fn read_level(&mut self, depth: u32) -> Result<Vec<DataElement>> {
        let mut elements = Vec::new();
        loop {
            let element = match self.parser.read_element().context(ReadElementSnafu)? {
                Some(element) => element,
                None => {
                    if depth > 0 {
                        tracing::warn!(
                            "Data ended at depth {} without a delimitation element",
                            depth
                        );
                    }
                    break;
                }
            };

            let element = if element.is_length_undefined() {
                ensure!(
                    depth < self.options.max_depth,
                    DepthLimitExceededSnafu {
                        max_depth: self.options.max_depth,
                        tag: element.tag(),
                        position: self.parser.position(),
                    }
                );
                tracing::debug!(
                    "Entering undefined length element {} at depth {}",
                    element.tag(),
                    depth + 1
                );
                let children = self.read_level(depth + 1)?;
                element.with_children(children)
            } else {
                element
            };

            let end_of_level = element.is_delimiter();
            if end_of_level && depth == 0 {
                tracing::warn!(
                    "Delimitation element {} outside of any undefined length element",
                    element.tag()
                );
            }
            elements.push(element);
            if end_of_level {
                break;
            }
        }
        Ok(elements)
    }
}

/// Read a whole data set from the given source with the default options.
pub fn read_dataset<S>(source: S) -> Result<Vec<DataElement>>
where
    S: Read,
{
    DataSetReader::new(source, Default::default()).read_dataset()
}

#[cfg(test)]
mod tests {
    use super::{read_dataset, DataSetReader, DataSetReaderOptions, Error};
    use dicom_tree_core::header::{HasLength, Header, ITEM, ITEM_DELIMITATION, SEQUENCE_DELIMITATION};
    use dicom_tree_core::{DataElement, Length, Tag, VrCode};

    fn validate_dataset_reader(data: &[u8], ground_truth: &[(usize, Tag, Length)]) -> Vec<DataElement> {
        let mut reader = DataSetReader::new(data, DataSetReaderOptions::default());
        let dataset = reader
            .read_dataset()
            .expect("should read the data set without an error");

        let visited: Vec<_> = dicom_tree_core::Walk::new(&dataset)
            .map(|(depth, e)| (depth, e.tag(), e.length()))
            .collect();
        assert_eq!(visited, ground_truth);

        assert_eq!(
            reader.position(),
            data.len() as u64,
            "Decoder position did not match end of data",
        );
        let covered: u64 = dataset.iter().map(DataElement::encoded_len).sum();
        assert_eq!(covered, data.len() as u64);
        dataset
    }

    #[test]
    fn read_defined_length_elements() {
        #[rustfmt::skip]
        static DATA: &[u8] = &[
            0x08, 0x00, 0x00, 0x00, b'U', b'L', 0x04, 0x00, // (0008,0000) UL, len = 4
                0x01, 0x02, 0x03, 0x04,
            0x20, 0x00, 0x00, 0x40, b'L', b'T', 0x04, 0x00, // (0020,4000) LT, len = 4
                b'T', b'E', b'S', b'T',
        ];

        let dataset = validate_dataset_reader(
            DATA,
            &[
                (0, Tag(0x0008, 0x0000), Length(4)),
                (0, Tag(0x0020, 0x4000), Length(4)),
            ],
        );
        assert_eq!(dataset[1].data(), Some(&b"TEST"[..]));
    }

    #[test]
    fn read_sequence_undefined_length() {
        #[rustfmt::skip]
        static DATA: &[u8] = &[
            0x18, 0x00, 0x11, 0x60, // sequence tag: (0018,6011) SequenceOfUltrasoundRegions
            b'S', b'Q', // VR
            0x00, 0x00, // reserved
            0xff, 0xff, 0xff, 0xff, // length: undefined
            // -- 12 --
            0xfe, 0xff, 0x00, 0xe0, // item start tag
            0xff, 0xff, 0xff, 0xff, // item length: undefined
            // -- 20 --
            0x18, 0x00, 0x12, 0x60, b'U', b'S', 0x02, 0x00, 0x01, 0x00, // (0018, 6012) RegionSpatialformat, len = 2, value = 1
            // -- 30 --
            0xfe, 0xff, 0x0d, 0xe0, 0x00, 0x00, 0x00, 0x00, // item end
            // -- 38 --
            0xfe, 0xff, 0x00, 0xe0, // item start tag
            0xff, 0xff, 0xff, 0xff, // item length: undefined
            // -- 46 --
            0x18, 0x00, 0x12, 0x60, b'U', b'S', 0x02, 0x00, 0x04, 0x00, // (0018, 6012) RegionSpatialformat, len = 2, value = 4
            // -- 56 --
            0xfe, 0xff, 0x0d, 0xe0, 0x00, 0x00, 0x00, 0x00, // item end
            // -- 64 --
            0xfe, 0xff, 0xdd, 0xe0, 0x00, 0x00, 0x00, 0x00, // sequence end
            // -- 72 --
            0x20, 0x00, 0x00, 0x40, b'L', b'T', 0x04, 0x00, // (0020,4000) ImageComments, len = 4
            b'T', b'E', b'S', b'T', // value = "TEST"
        ];

        let dataset = validate_dataset_reader(
            DATA,
            &[
                (0, Tag(0x0018, 0x6011), Length::UNDEFINED),
                (1, ITEM, Length::UNDEFINED),
                (2, Tag(0x0018, 0x6012), Length(2)),
                (2, ITEM_DELIMITATION, Length(0)),
                (1, ITEM, Length::UNDEFINED),
                (2, Tag(0x0018, 0x6012), Length(2)),
                (2, ITEM_DELIMITATION, Length(0)),
                (1, SEQUENCE_DELIMITATION, Length(0)),
                (0, Tag(0x0020, 0x4000), Length(4)),
            ],
        );

        let seq = &dataset[0];
        assert_eq!(seq.vr(), Some(VrCode(*b"SQ")));
        assert_eq!(seq.data(), None);
        assert!(seq.children().last().unwrap().is_sequence_delimiter());
        for item in &seq.children()[..2] {
            assert!(item.children().last().unwrap().is_item_delimiter());
        }
    }

    #[test]
    fn defined_length_item_is_not_descended() {
        // items with a defined length keep their content as raw bytes
        #[rustfmt::skip]
        static DATA: &[u8] = &[
            0x08, 0x00, 0x40, 0x11, b'S', b'Q', 0x00, 0x00, 0xff, 0xff, 0xff, 0xff,
            0xfe, 0xff, 0x00, 0xe0, 0x0a, 0x00, 0x00, 0x00, // item, len = 10
                0x18, 0x00, 0x12, 0x60, b'U', b'S', 0x02, 0x00, 0x04, 0x00,
            0xfe, 0xff, 0xdd, 0xe0, 0x00, 0x00, 0x00, 0x00, // sequence end
        ];

        let dataset = validate_dataset_reader(
            DATA,
            &[
                (0, Tag(0x0008, 0x1140), Length::UNDEFINED),
                (1, ITEM, Length(10)),
                (1, SEQUENCE_DELIMITATION, Length(0)),
            ],
        );
        assert_eq!(dataset[0].children()[0].data().map(<[u8]>::len), Some(10));
    }

    #[test]
    fn read_empty_sequence() {
        #[rustfmt::skip]
        static DATA: &[u8] = &[
            0x08, 0x00, 0x18, 0x22, b'S', b'Q', 0x00, 0x00, 0xff, 0xff, 0xff, 0xff,
            0xfe, 0xff, 0xdd, 0xe0, 0x00, 0x00, 0x00, 0x00, // sequence end
            0x20, 0x00, 0x00, 0x40, b'L', b'T', 0x02, 0x00, b'O', b'K',
        ];

        validate_dataset_reader(
            DATA,
            &[
                (0, Tag(0x0008, 0x2218), Length::UNDEFINED),
                (1, SEQUENCE_DELIMITATION, Length(0)),
                (0, Tag(0x0020, 0x4000), Length(2)),
            ],
        );
    }

    #[test]
    fn nested_sequences() {
        #[rustfmt::skip]
        static DATA: &[u8] = &[
            0x08, 0x00, 0x40, 0x11, b'S', b'Q', 0x00, 0x00, 0xff, 0xff, 0xff, 0xff,
            0xfe, 0xff, 0x00, 0xe0, 0xff, 0xff, 0xff, 0xff,
                0x40, 0x00, 0x60, 0xa1, b'S', b'Q', 0x00, 0x00, 0xff, 0xff, 0xff, 0xff,
                    0xfe, 0xff, 0x00, 0xe0, 0xff, 0xff, 0xff, 0xff,
                    0xfe, 0xff, 0x0d, 0xe0, 0x00, 0x00, 0x00, 0x00,
                0xfe, 0xff, 0xdd, 0xe0, 0x00, 0x00, 0x00, 0x00,
            0xfe, 0xff, 0x0d, 0xe0, 0x00, 0x00, 0x00, 0x00,
            0xfe, 0xff, 0xdd, 0xe0, 0x00, 0x00, 0x00, 0x00,
        ];

        validate_dataset_reader(
            DATA,
            &[
                (0, Tag(0x0008, 0x1140), Length::UNDEFINED),
                (1, ITEM, Length::UNDEFINED),
                (2, Tag(0x0040, 0xA160), Length::UNDEFINED),
                (3, ITEM, Length::UNDEFINED),
                (4, ITEM_DELIMITATION, Length(0)),
                (3, SEQUENCE_DELIMITATION, Length(0)),
                (2, ITEM_DELIMITATION, Length(0)),
                (1, SEQUENCE_DELIMITATION, Length(0)),
            ],
        );
    }

    #[test]
    fn top_level_delimiter_stops_reading() {
        #[rustfmt::skip]
        static DATA: &[u8] = &[
            0xfe, 0xff, 0xdd, 0xe0, 0x00, 0x00, 0x00, 0x00, // sequence end
            0x20, 0x00, 0x00, 0x40, b'L', b'T', 0x02, 0x00, b'O', b'K',
        ];

        let mut reader = DataSetReader::new(DATA, Default::default());
        let dataset = reader.read_dataset().unwrap();
        assert_eq!(dataset.len(), 1);
        assert!(dataset[0].is_sequence_delimiter());
        assert_eq!(reader.position(), 8);
    }

    #[test]
    fn stream_ends_inside_undefined_length() {
        #[rustfmt::skip]
        static DATA: &[u8] = &[
            0x08, 0x00, 0x40, 0x11, b'S', b'Q', 0x00, 0x00, 0xff, 0xff, 0xff, 0xff,
            0xfe, 0xff, 0x00, 0xe0, 0xff, 0xff, 0xff, 0xff,
            0x18, 0x00, 0x12, 0x60, b'U', b'S', 0x02, 0x00, 0x04, 0x00,
        ];

        let dataset = read_dataset(DATA).unwrap();
        assert_eq!(dataset.len(), 1);
        let item = &dataset[0].children()[0];
        assert!(item.is_item());
        assert_eq!(item.children().len(), 1);
        assert!(!item.children()[0].is_delimiter());
    }

    #[test]
    fn truncated_nested_element_fails() {
        #[rustfmt::skip]
        static DATA: &[u8] = &[
            0x08, 0x00, 0x40, 0x11, b'S', b'Q', 0x00, 0x00, 0xff, 0xff, 0xff, 0xff,
            0xfe, 0xff, 0x00, 0xe0, 0xff, 0xff, 0xff, 0xff,
            0x18, 0x00, 0x12, 0x60, b'U', b'S', 0x02, 0x00, 0x04,
        ];

        let err = read_dataset(DATA).unwrap_err();
        assert!(err.is_truncated());
        assert!(matches!(err, Error::ReadElement { .. }));
    }

    #[test]
    fn depth_limit() {
        // three nested undefined length items
        #[rustfmt::skip]
        static DATA: &[u8] = &[
            0xfe, 0xff, 0x00, 0xe0, 0xff, 0xff, 0xff, 0xff,
            0xfe, 0xff, 0x00, 0xe0, 0xff, 0xff, 0xff, 0xff,
            0xfe, 0xff, 0x00, 0xe0, 0xff, 0xff, 0xff, 0xff,
            0xfe, 0xff, 0x0d, 0xe0, 0x00, 0x00, 0x00, 0x00,
            0xfe, 0xff, 0x0d, 0xe0, 0x00, 0x00, 0x00, 0x00,
            0xfe, 0xff, 0x0d, 0xe0, 0x00, 0x00, 0x00, 0x00,
        ];

        let ok = DataSetReader::new(DATA, DataSetReaderOptions::default().max_depth(3))
            .read_dataset()
            .unwrap();
        assert_eq!(ok.len(), 1);

        let err = DataSetReader::new(DATA, DataSetReaderOptions::default().max_depth(2))
            .read_dataset()
            .unwrap_err();
        match err {
            Error::DepthLimitExceeded {
                max_depth,
                tag,
                position,
                ..
            } => {
                assert_eq!(max_depth, 2);
                assert_eq!(tag, ITEM);
                assert_eq!(position, 24);
            }
            e => panic!("unexpected error {:?}", e),
        }
    }

    #[test]
    fn undefined_length_delimiter_recurses_then_stops() {
        #[rustfmt::skip]
        static DATA: &[u8] = &[
            0xfe, 0xff, 0x00, 0xe0, 0xff, 0xff, 0xff, 0xff, // item, undefined
                0xfe, 0xff, 0x0d, 0xe0, 0xff, 0xff, 0xff, 0xff, // item delimiter, undefined
                    0xfe, 0xff, 0xdd, 0xe0, 0x00, 0x00, 0x00, 0x00, // sequence end
            0x20, 0x00, 0x00, 0x40, b'L', b'T', 0x02, 0x00, b'O', b'K',
        ];

        validate_dataset_reader(
            DATA,
            &[
                (0, ITEM, Length::UNDEFINED),
                (1, ITEM_DELIMITATION, Length::UNDEFINED),
                (2, SEQUENCE_DELIMITATION, Length(0)),
                (0, Tag(0x0020, 0x4000), Length(2)),
            ],
        );
    }
}
