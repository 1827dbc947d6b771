//! A CLI tool for converting a DICOM file
//! into an XML document of its element tree.
use clap::Parser;
use dicom_tree_object::OpenFileOptions;
use dicom_tree_xml::{ValueEncoding, XmlOptions};
use snafu::{Report, ResultExt, Whatever};
use std::path::PathBuf;
use tracing::{error, Level};

/// Exit code for when an error emerged while reading the DICOM file.
const ERROR_READ: i32 = -2;
/// Exit code for when an error emerged while writing the XML output.
const ERROR_WRITE: i32 = -3;

/// Convert a DICOM file into XML
#[derive(Debug, Parser)]
#[command(version)]
struct App {
    /// Path to the DICOM file to convert
    file: PathBuf,

    /// Path to the output XML file
    /// (default is to replace input extension with `.xml`, `-` for stdout)
    #[arg(short = 'o', long = "out")]
    output: Option<PathBuf>,

    /// How value bytes are written (base64, hex or text)
    #[arg(long = "encoding", default_value = "base64")]
    encoding: ValueEncoding,

    /// Number of spaces per nesting level (0 for a single line)
    #[arg(long = "indent", default_value = "2")]
    indent: usize,

    /// Maximum nesting depth of sequences and items
    #[arg(long = "max-depth", default_value = "64")]
    max_depth: u32,

    /// Print more information about the conversion
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,
}

fn main() {
    let App {
        file,
        output,
        encoding,
        indent,
        max_depth,
        verbose,
    } = App::parse();

    tracing::subscriber::set_global_default(
        tracing_subscriber::FmtSubscriber::builder()
            .with_max_level(if verbose { Level::DEBUG } else { Level::INFO })
            .with_writer(std::io::stderr)
            .finish(),
    )
    .whatever_context("Could not set up global logging subscriber")
    .unwrap_or_else(|e: Whatever| {
        eprintln!("[ERROR] {}", Report::from_error(e));
    });

    let obj = OpenFileOptions::new()
        .max_depth(max_depth)
        .open_file(&file)
        .unwrap_or_else(|e| {
            error!("{}", Report::from_error(e));
            std::process::exit(ERROR_READ);
        });

    if verbose {
        eprintln!("{}: {} elements", obj, obj.walk().count());
    }

    let options = XmlOptions::new().encoding(encoding).indent(indent);

    let output = output.unwrap_or_else(|| {
        let mut path = file.clone();
        path.set_extension("xml");
        path
    });

    let result = if output.as_os_str() == "-" {
        options.to_writer(&obj, std::io::stdout().lock())
    } else {
        options.write_file(&obj, &output)
    };

    result.unwrap_or_else(|e| {
        error!("{}", Report::from_error(e));
        std::process::exit(ERROR_WRITE);
    });

    if verbose && output.as_os_str() != "-" {
        eprintln!("XML saved to {}", output.display());
    }
}
