//! XML output of DICOM element trees.
//!
//! A loaded [`DicomFile`] is written as a single `DICOM` root node
//! holding the preamble,
//! followed by one node per data element in stream order.
//! Nested content of undefined length elements
//! is written inside the node of the element which opened it.
//!
//! # Example
//!
//! ```
//! # use dicom_tree_core::{DataElement, ElementBody, Tag, VrCode};
//! # use dicom_tree_object::DicomFile;
//! use dicom_tree_xml::{ValueEncoding, XmlOptions};
//!
//! let file = DicomFile::new(None, [0; 128], vec![
//!     DataElement::new(Tag(0x0008, 0x0000), VrCode(*b"UL"), ElementBody::defined(vec![1, 2, 3, 4])),
//! ]);
//!
//! let xml = XmlOptions::new()
//!     .encoding(ValueEncoding::Hex)
//!     .indent(0)
//!     .declaration(false)
//!     .to_string(&file)?;
//! assert!(xml.ends_with(
//!     r#"<DataElement group="0x0008" elem="0x0000" vr="UL" vl="4">01020304</DataElement></DICOM>"#
//! ));
//! # Ok::<(), dicom_tree_xml::Error>(())
//! ```
use dicom_tree_object::DicomFile;
use snafu::{Backtrace, ResultExt, Snafu};
use std::fmt::{self, Display, Formatter};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

mod ser;

use crate::ser::XmlSerializer;

/// An error which may occur when writing XML output
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum Error {
    #[snafu(display("Could not write XML output"))]
    WriteXml {
        backtrace: Backtrace,
        source: std::io::Error,
    },
    #[snafu(display("Could not create file '{}'", filename.display()))]
    CreateFile {
        filename: std::path::PathBuf,
        backtrace: Backtrace,
        source: std::io::Error,
    },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Enumeration of the ways to write value bytes as node text.
#[derive(Debug, Default, Copy, Clone, Eq, Hash, PartialEq)]
pub enum ValueEncoding {
    /// Standard base64 with padding.
    ///
    /// This is the default behavior.
    #[default]
    Base64,
    /// Lowercase hexadecimal, two digits per byte.
    Hex,
    /// The bytes as UTF-8 text.
    /// Invalid sequences and characters not allowed in XML
    /// are replaced with U+FFFD.
    Text,
}

impl ValueEncoding {
    /// Encode the given value bytes into node text.
    pub fn encode(self, data: &[u8]) -> String {
        match self {
            ValueEncoding::Base64 => {
                use base64::Engine;
                base64::engine::general_purpose::STANDARD.encode(data)
            }
            ValueEncoding::Hex => hex::encode(data),
            ValueEncoding::Text => xml_safe(&String::from_utf8_lossy(data)),
        }
    }
}

/// Replace the characters not allowed in XML with U+FFFD.
pub(crate) fn xml_safe(text: &str) -> String {
    text.chars()
        .map(|c| if is_xml_char(c) { c } else { '\u{FFFD}' })
        .collect()
}

/// Whether the character may appear in an XML 1.0 document.
fn is_xml_char(c: char) -> bool {
    matches!(c,
        '\t' | '\n' | '\r'
        | '\u{20}'..='\u{D7FF}'
        | '\u{E000}'..='\u{FFFD}'
        | '\u{10000}'..='\u{10FFFF}')
}

impl Display for ValueEncoding {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ValueEncoding::Base64 => f.write_str("base64"),
            ValueEncoding::Hex => f.write_str("hex"),
            ValueEncoding::Text => f.write_str("text"),
        }
    }
}

impl FromStr for ValueEncoding {
    type Err = ValueEncodingError;
    fn from_str(encoding: &str) -> Result<Self, Self::Err> {
        match encoding {
            "base64" => Ok(ValueEncoding::Base64),
            "hex" => Ok(ValueEncoding::Hex),
            "text" => Ok(ValueEncoding::Text),
            _ => Err(ValueEncodingError),
        }
    }
}

/// The error raised when providing an invalid value encoding.
#[derive(Debug, Default, Copy, Clone, Eq, Hash, PartialEq)]
pub struct ValueEncodingError;

impl Display for ValueEncodingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("invalid value encoding (expected base64, hex or text)")
    }
}

impl std::error::Error for ValueEncodingError {}

/// Options and flags to configure the XML output.
///
/// # Example
///
/// ```no_run
/// # use dicom_tree_xml::{ValueEncoding, XmlOptions};
/// let file = dicom_tree_object::open_file("path/to/file.dcm")?;
/// XmlOptions::new()
///     .encoding(ValueEncoding::Text)
///     .indent(4)
///     .write_file(&file, "path/to/file.xml")?;
/// # Result::<(), Box<dyn std::error::Error>>::Ok(())
/// ```
#[derive(Debug, Copy, Clone, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub struct XmlOptions {
    /// how value bytes are written as text
    pub encoding: ValueEncoding,
    /// the number of spaces per nesting level (0 writes everything in one line)
    pub indent: usize,
    /// whether to write the XML declaration
    pub declaration: bool,
}

impl Default for XmlOptions {
    fn default() -> Self {
        XmlOptions {
            encoding: ValueEncoding::default(),
            indent: 2,
            declaration: true,
        }
    }
}

impl XmlOptions {
    pub fn new() -> Self {
        Default::default()
    }

    /// Set how value bytes are written as node text.
    pub fn encoding(mut self, encoding: ValueEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Set the number of spaces per nesting level.
    /// Zero disables indentation.
    pub fn indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    /// Set whether to start the document with an XML declaration.
    pub fn declaration(mut self, declaration: bool) -> Self {
        self.declaration = declaration;
        self
    }

    /// Write the XML document of the given file to a writer.
    pub fn to_writer<W>(&self, file: &DicomFile, to: W) -> Result<()>
    where
        W: Write,
    {
        XmlSerializer::new(to, self)
            .serialize(file)
            .context(WriteXmlSnafu)
    }

    /// Write the XML document of the given file to a byte vector.
    pub fn to_vec(&self, file: &DicomFile) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        self.to_writer(file, &mut out)?;
        Ok(out)
    }

    /// Write the XML document of the given file to a string.
    pub fn to_string(&self, file: &DicomFile) -> Result<String> {
        let out = self.to_vec(file)?;
        // all events are built from string slices
        Ok(String::from_utf8_lossy(&out).into_owned())
    }

    /// Create a file at the given path
    /// and write the XML document of the given DICOM file into it.
    pub fn write_file<P>(&self, file: &DicomFile, path: P) -> Result<()>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let out = File::create(path).with_context(|_| CreateFileSnafu { filename: path })?;
        let mut out = BufWriter::new(out);
        self.to_writer(file, &mut out)?;
        out.flush().context(WriteXmlSnafu)?;
        tracing::debug!("XML output written to {}", path.display());
        Ok(())
    }
}

/// Write the XML document of the given file to a writer,
/// with the default options.
pub fn to_writer<W>(file: &DicomFile, to: W) -> Result<()>
where
    W: Write,
{
    XmlOptions::new().to_writer(file, to)
}

/// Write the XML document of the given file to a byte vector,
/// with the default options.
pub fn to_vec(file: &DicomFile) -> Result<Vec<u8>> {
    XmlOptions::new().to_vec(file)
}

/// Write the XML document of the given file to a string,
/// with the default options.
pub fn to_string(file: &DicomFile) -> Result<String> {
    XmlOptions::new().to_string(file)
}

/// Write the XML document of the given file to a new file,
/// with the default options.
pub fn write_file<P>(file: &DicomFile, path: P) -> Result<()>
where
    P: AsRef<Path>,
{
    XmlOptions::new().write_file(file, path)
}
