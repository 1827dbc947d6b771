use crate::{
    DicomFile, NotDicomSnafu, OpenFileSnafu, ParseDataSetSnafu, ReadMagicCodeSnafu,
    ReadPreambleBytesSnafu, Result, DICM_MAGIC_CODE, PREAMBLE_LEN,
};
use dicom_tree_parser::dataset::{DataSetReader, DataSetReaderOptions};
use snafu::{ensure, ResultExt};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

/// Create a DICOM file tree by reading from a byte source.
///
/// This function assumes the standard file encoding structure:
/// 128-byte preamble, magic code, and the data set.
pub fn from_reader<F>(file: F) -> Result<DicomFile>
where
    F: Read,
{
    OpenFileOptions::new().from_reader(file)
}

/// Create a DICOM file tree by reading from a file.
///
/// This function assumes the standard file encoding structure:
/// 128-byte preamble, magic code, and the data set.
pub fn open_file<P>(path: P) -> Result<DicomFile>
where
    P: AsRef<Path>,
{
    OpenFileOptions::new().open_file(path)
}

/// A builder type for opening a DICOM file with additional options.
///
/// # Example
///
/// Create a `OpenFileOptions`,
/// call adaptor methods in a chain,
/// and finish the operation with [`.open_file()`](OpenFileOptions::open_file).
///
/// ```no_run
/// # use dicom_tree_object::OpenFileOptions;
/// let file = OpenFileOptions::new()
///     .max_depth(16)
///     .open_file("path/to/file.dcm")?;
/// # Result::<(), Box<dyn std::error::Error>>::Ok(())
/// ```
#[derive(Debug, Default, Copy, Clone)]
#[non_exhaustive]
pub struct OpenFileOptions {
    reader_options: DataSetReaderOptions,
}

impl OpenFileOptions {
    pub fn new() -> Self {
        OpenFileOptions::default()
    }

    /// Set the maximum nesting depth of undefined length content.
    ///
    /// Files nesting deeper than this fail to load.
    pub fn max_depth(mut self, max_depth: u32) -> Self {
        self.reader_options = self.reader_options.max_depth(max_depth);
        self
    }

    /// Replace all options of the underlying data set reader.
    pub fn reader_options(mut self, options: DataSetReaderOptions) -> Self {
        self.reader_options = options;
        self
    }

    /// Open the file at the given path.
    ///
    /// The file is closed once the data set is read,
    /// whether or not reading succeeded.
    pub fn open_file<P>(self, path: P) -> Result<DicomFile>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let file =
            BufReader::new(File::open(path).with_context(|_| OpenFileSnafu { filename: path })?);
        self.read_all(file, Some(path.to_path_buf()))
    }

    /// Obtain a DICOM file tree by reading from a byte source.
    ///
    /// This method assumes the standard file encoding structure:
    /// 128-byte preamble, magic code, and the data set.
    pub fn from_reader<R>(self, from: R) -> Result<DicomFile>
    where
        R: Read,
    {
        self.read_all(from, None)
    }

    fn read_all<R>(self, mut from: R, path: Option<PathBuf>) -> Result<DicomFile>
    where
        R: Read,
    {
        let mut preamble = [0u8; PREAMBLE_LEN];
        from.read_exact(&mut preamble)
            .context(ReadPreambleBytesSnafu)?;

        let mut magic = [0u8; 4];
        from.read_exact(&mut magic).context(ReadMagicCodeSnafu)?;
        ensure!(magic == DICM_MAGIC_CODE, NotDicomSnafu { magic });

        let mut reader = DataSetReader::new(from, self.reader_options);
        let dataset = reader.read_dataset().context(ParseDataSetSnafu)?;

        tracing::debug!(
            "Loaded {} top level elements ({} elements in total) from {} data set bytes",
            dataset.len(),
            dicom_tree_core::Walk::new(&dataset).count(),
            reader.position()
        );

        Ok(DicomFile::new(path, preamble, dataset))
    }
}
