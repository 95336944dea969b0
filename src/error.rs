//! Error types for the docxfree library.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for docxfree operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while removing protection from a document.
///
/// Documents without a settings part, without protection, or with
/// encryption are not errors; see [`crate::Outcome`].
#[derive(Error, Debug)]
pub enum Error {
    /// The source file is missing or is not a ZIP archive.
    #[error("opening archive {}: {message}", path.display())]
    ArchiveOpen { path: PathBuf, message: String },

    /// An entry stream could not be opened or fully read.
    #[error("reading entry {entry}: {message}")]
    ArchiveRead { entry: String, message: String },

    /// The settings part is not well-formed XML.
    #[error("decoding XML: {0}")]
    XmlDecode(String),

    /// The settings part could not be re-serialized.
    #[error("encoding XML: {0}")]
    XmlEncode(String),

    /// The destination archive could not be created or written.
    #[error("writing archive {}: {message}", path.display())]
    ArchiveWrite { path: PathBuf, message: String },

    /// A directory could not be listed or created.
    #[error("directory {}: {message}", path.display())]
    Directory { path: PathBuf, message: String },
}

impl Error {
    pub(crate) fn open(path: impl Into<PathBuf>, err: impl std::fmt::Display) -> Self {
        Error::ArchiveOpen {
            path: path.into(),
            message: err.to_string(),
        }
    }

    pub(crate) fn read(entry: impl Into<String>, err: impl std::fmt::Display) -> Self {
        Error::ArchiveRead {
            entry: entry.into(),
            message: err.to_string(),
        }
    }

    pub(crate) fn write(path: impl Into<PathBuf>, err: impl std::fmt::Display) -> Self {
        Error::ArchiveWrite {
            path: path.into(),
            message: err.to_string(),
        }
    }

    pub(crate) fn directory(path: impl Into<PathBuf>, err: impl std::fmt::Display) -> Self {
        Error::Directory {
            path: path.into(),
            message: err.to_string(),
        }
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::XmlDecode(err.to_string())
    }
}
