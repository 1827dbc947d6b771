//! Interpretation of DICOM data sets as trees of data elements.
pub mod read;

pub use self::read::{read_dataset, DataSetReader, DataSetReaderOptions, DEFAULT_MAX_DEPTH};
