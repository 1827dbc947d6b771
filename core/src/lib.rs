#![crate_type = "lib"]
#![deny(trivial_numeric_casts, unsafe_code, unstable_features)]
#![warn(
    missing_debug_implementations,
    unused_qualifications,
    unused_import_braces
)]

//! This is the core library of the DICOM element tree,
//! containing the data structures produced by the parser.
//!
//! The current structure of this crate is as follows:
//!
//! - [`header`] comprises the data types for DICOM element headers:
//!   tags, value lengths and value representation codes.
//! - [`element`] holds the element model,
//!   a closed sum type with one generic variant
//!   and three structural variants for items and delimiters.
//!
//! [`element`]: ./element/index.html
//! [`header`]: ./header/index.html

pub mod element;
pub mod header;

pub use element::{DataElement, ElementBody, Walk};
pub use header::{ElementHeader, HasLength, Header, Length, Tag, VrCode};
