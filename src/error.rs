//! Error types for BSA archive operations.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Result type for BSA operations
pub type Result<T> = std::result::Result<T, Error>;

/// BSA error types
///
/// | Class | Variant | Recoverable |
/// |-------|---------|-------------|
/// | Format | [`Format`][Self::Format] | no, the archive is unusable |
/// | Lookup | [`NotFound`][Self::NotFound] | yes, try another source |
/// | Storage | [`Io`][Self::Io] | no retry is attempted |
/// | Programming | [`Misuse`][Self::Misuse] | no, fix the caller |
///
/// Errors raised while reading an entry stream are plain [`std::io::Error`]s
/// because they come out of [`std::io::Read::read`].
#[derive(Error, Debug)]
pub enum Error {
    /// The archive is malformed, truncated, or not a v103 BSA.
    #[error("BSA error: {message} (archive: {})", path.display())]
    Format { path: PathBuf, message: String },

    /// No entry with the requested name.
    #[error("File not found: {name} (archive: {})", path.display())]
    NotFound { path: PathBuf, name: String },

    /// The backing storage failed.
    #[error("I/O error: {source} (archive: {})", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The API was used in a way that can never succeed.
    #[error("Misuse: {message}")]
    Misuse { message: String },
}

impl Error {
    pub fn format(path: &Path, message: impl Into<String>) -> Self {
        Self::Format {
            path: path.to_path_buf(),
            message: message.into(),
        }
    }

    pub fn not_found(path: &Path, name: impl Into<String>) -> Self {
        Self::NotFound {
            path: path.to_path_buf(),
            name: name.into(),
        }
    }

    pub fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn misuse(message: impl Into<String>) -> Self {
        Self::Misuse {
            message: message.into(),
        }
    }

    /// Translate an I/O error hit while decoding `what`.
    ///
    /// Running out of bytes means the archive is shorter than its header
    /// claims, which is a format problem rather than a storage one.
    pub(crate) fn decoding(path: &Path, what: &str, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::UnexpectedEof {
            Self::format(path, format!("archive truncated while reading {what}"))
        } else {
            Self::io(path, source)
        }
    }

    pub fn is_format(&self) -> bool {
        matches!(self, Self::Format { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_io(&self) -> bool {
        matches!(self, Self::Io { .. })
    }

    pub fn is_misuse(&self) -> bool {
        matches!(self, Self::Misuse { .. })
    }

    /// Archive the error refers to, if any.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Format { path, .. } | Self::NotFound { path, .. } | Self::Io { path, .. } => {
                Some(path)
            }
            Self::Misuse { .. } => None,
        }
    }
}
