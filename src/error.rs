//! Error taxonomy shared by commands, the script runner and the codecs.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditError {
    /// Wrong number of arguments after a command name.
    #[error("'{command}' expects {expected} argument(s), got {actual} (usage: {usage})")]
    Arity {
        command: String,
        usage: String,
        expected: usize,
        actual: usize,
    },

    /// An argument that must be parsed (e.g. a brightness delta) was malformed.
    #[error("'{command}': invalid {what} '{value}'")]
    InvalidArgument {
        command: String,
        what: &'static str,
        value: String,
    },

    #[error("unknown command '{0}'")]
    UnknownCommand(String),

    /// An operand image name is not present in the session cache.
    #[error("no image named '{0}' has been loaded")]
    MissingOperand(String),

    /// Operands of a multi-image command have different dimensions.
    #[error("image '{name}' is {actual_w}x{actual_h}, expected {expected_w}x{expected_h} to match '{reference}'")]
    DimensionMismatch {
        name: String,
        reference: String,
        expected_w: usize,
        expected_h: usize,
        actual_w: usize,
        actual_h: usize,
    },

    /// A script or image file could not be opened or read.
    #[error("could not read {}: {source}", .path.display())]
    Source {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A file could not be written.
    #[error("could not write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("script {} is already running", .0.display())]
    RecursiveScript(PathBuf),

    #[error("script nesting is limited to {0} levels")]
    ScriptDepth(usize),

    /// Malformed image data.
    #[error("malformed image data in {}: {reason}", .path.display())]
    Format { path: PathBuf, reason: String },

    /// Errors reported by the `image` crate codecs.
    #[error("could not decode or encode {}: {source}", .path.display())]
    Codec {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("unsupported image format '{0}'")]
    UnsupportedFormat(String),

    /// Grid rows of differing lengths handed to an image constructor.
    #[error("ragged pixel grid: row {row} has {actual} cells, expected {expected}")]
    RaggedGrid {
        row: usize,
        expected: usize,
        actual: usize,
    },

    /// Convolution kernels must be square with an odd side.
    #[error("invalid kernel: {0}")]
    InvalidKernel(String),

    /// Failure writing to the session output sink.
    #[error("output error: {0}")]
    Io(#[from] std::io::Error),
}

impl EditError {
    /// Build a `Format` error for the given path.
    pub fn format(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        EditError::Format {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EditError>;
