//! Error types for the walk crate.

use std::path::PathBuf;

use dirdelta_types::TypeError;

/// Errors that abort a tree enumeration.
#[derive(Debug, thiserror::Error)]
pub enum TraversalError {
    /// The walk root is missing or is not a directory.
    #[error("invalid root {path}: {reason}")]
    InvalidRoot { path: PathBuf, reason: String },

    /// A followed symbolic link points back to one of its own ancestors.
    #[error("symlink cycle: {path} points back to ancestor {ancestor}")]
    Cycle { path: PathBuf, ancestor: PathBuf },

    /// An entry could not be read (permissions, vanished directory, ...).
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A path beneath the root is not valid UTF-8.
    #[error("path is not valid UTF-8: {0}")]
    NonUtf8Path(PathBuf),

    /// A relative path could not be normalized.
    #[error(transparent)]
    InvalidPath(#[from] TypeError),
}

/// Convenience alias for walk results.
pub type WalkResult<T> = Result<T, TraversalError>;
