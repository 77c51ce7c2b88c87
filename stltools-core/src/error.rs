//! Error types for reading, transforming and writing meshes.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for stltools operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while processing an STL model.
#[derive(Debug, Error)]
pub enum Error {
    /// The input bytes are not a recognizable STL file.
    #[error("not a valid STL file: {0}")]
    Format(String),

    /// A mathematical precondition was violated.
    #[error("domain error: {0}")]
    Domain(String),

    /// The object name is not valid text in the requested encoding.
    #[error("object name is not valid {encoding}")]
    Decode {
        /// Name of the encoding that was used.
        encoding: &'static str,
    },

    /// The requested text encoding is not known.
    #[error("unknown text encoding: {0}")]
    UnknownEncoding(String),

    /// An error raised while processing a named file.
    #[error("{}: {source}", path.display())]
    File {
        /// The offending file.
        path: PathBuf,
        /// What went wrong.
        #[source]
        source: Box<Error>,
    },

    /// I/O error from the standard library.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The PDF document could not be assembled.
    #[error("PDF error: {0}")]
    Pdf(String),
}

impl Error {
    /// Create a `Format` error with the given message.
    #[must_use]
    pub fn format(message: impl Into<String>) -> Self {
        Self::Format(message.into())
    }

    /// Create a `Domain` error with the given message.
    #[must_use]
    pub fn domain(message: impl Into<String>) -> Self {
        Self::Domain(message.into())
    }

    /// Attach the path of the file being processed.
    #[must_use]
    pub fn in_file(self, path: impl Into<PathBuf>) -> Self {
        Self::File {
            path: path.into(),
            source: Box::new(self),
        }
    }
}
