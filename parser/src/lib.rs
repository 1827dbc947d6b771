//! This crate provides the reading of DICOM data sets
//! into in-memory trees of data elements.
//! All APIs are based on synchronous I/O.
//!
//! The layers are, from bottom to top:
//!
//! - [`decode`]: decoding of element headers (tag, VR, length),
//!   choosing the length field width by VR.
//! - [`stateful::decode`]: reading of whole elements
//!   from a source, one at a time.
//! - [`dataset`]: the recursive reading of a data set,
//!   descending into undefined length elements until a delimiter
//!   or the end of the source.
//!
//! ```
//! use dicom_tree_parser::read_dataset;
//!
//! #[rustfmt::skip]
//! let data: &[u8] = &[
//!     0x08, 0x00, 0x00, 0x00, b'U', b'L', 0x04, 0x00,
//!     0x01, 0x02, 0x03, 0x04,
//! ];
//! let dataset = read_dataset(data)?;
//! assert_eq!(dataset.len(), 1);
//! assert_eq!(dataset[0].data(), Some(&[1, 2, 3, 4][..]));
//! # Ok::<(), dicom_tree_parser::dataset::read::Error>(())
//! ```

pub mod dataset;
pub mod decode;
pub mod stateful;

mod util;

pub use dataset::{read_dataset, DataSetReader, DataSetReaderOptions};
pub use stateful::decode::{read_element, StatefulDecoder};
