//! Error types for squadplan-core.

use std::path::{Path, PathBuf};

/// Errors that can occur while loading, saving, or computing on a
/// resource-planning configuration.
///
/// All variants carry enough context to produce a diagnostic message
/// without access to the original request.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The configuration file does not exist.
    #[error("Config file not found: {}", path.display())]
    NotFound {
        /// Path that was looked up
        path: PathBuf,
    },

    /// The configuration path points at a directory.
    #[error("Config path is a directory: {}", path.display())]
    InvalidPath {
        /// Offending path
        path: PathBuf,
    },

    /// Malformed XML or a document that does not match the schema.
    #[error("Parse error: {message}")]
    Parse {
        /// What went wrong
        message: String,
    },

    /// A numeric field could not be coerced.
    #[error("Type error: {field} = {value:?} is not a valid {expected}")]
    Type {
        /// Location of the value, e.g. `squad 'Alpha' engineers.BE`
        field: String,
        /// Raw value as found in the document
        value: String,
        /// Expected kind (`float` or `integer`)
        expected: &'static str,
    },

    /// Writing the configuration file failed.
    #[error("Write error for {}: {source}", path.display())]
    Write {
        /// Destination path
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },

    /// Reading the configuration file failed for a reason other than
    /// absence or being a directory.
    #[error("I/O error for {}: {source}", path.display())]
    Io {
        /// Path being read
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },

    /// Serialising the document failed.
    #[error("Encode error: {message}")]
    Encode {
        /// What went wrong
        message: String,
    },

    /// A category label cannot be written as an XML attribute name, or is
    /// not in the configured allow-list.
    #[error("Invalid category label: {label:?}")]
    InvalidLabel {
        /// Offending label
        label: String,
    },

    /// Settings that make an operation impossible (e.g. a weekend covering
    /// the whole week).
    #[error("Invalid configuration: {message}")]
    InvalidConfiguration {
        /// What is wrong with the settings
        message: String,
    },

    /// Date arithmetic left the representable calendar range.
    #[error("Date out of range: {message}")]
    DateOutOfRange {
        /// Description of the overflowing computation
        message: String,
    },

    /// The file changed since the caller last read it.
    #[error("Version conflict: expected {expected}, found {actual}")]
    VersionConflict {
        /// Version token supplied by the caller
        expected: String,
        /// Version token of the file on disk
        actual: String,
    },
}

/// Convenience `Result` type alias for squadplan-core operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Creates a new parse error.
    pub fn parse<S: Into<String>>(message: S) -> Self {
        Error::Parse {
            message: message.into(),
        }
    }

    /// Creates a new invalid-configuration error.
    pub fn invalid_configuration<S: Into<String>>(message: S) -> Self {
        Error::InvalidConfiguration {
            message: message.into(),
        }
    }

    /// Creates a write error for `path`.
    pub fn write(path: &Path, source: std::io::Error) -> Self {
        Error::Write {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Short machine-readable name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::NotFound { .. } => "not_found",
            Error::InvalidPath { .. } => "invalid_path",
            Error::Parse { .. } => "parse_error",
            Error::Type { .. } => "type_error",
            Error::Write { .. } => "write_error",
            Error::Io { .. } => "io_error",
            Error::Encode { .. } => "encode_error",
            Error::InvalidLabel { .. } => "invalid_label",
            Error::InvalidConfiguration { .. } => "invalid_configuration",
            Error::DateOutOfRange { .. } => "date_out_of_range",
            Error::VersionConflict { .. } => "version_conflict",
        }
    }
}
