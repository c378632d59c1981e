//! Error types for the tags crate.

use std::path::PathBuf;

/// Errors raised while loading tag rules.
#[derive(Debug, thiserror::Error)]
pub enum TagError {
    /// A row of the rule table is malformed.
    #[error("invalid tag rule at line {line}: {reason}")]
    Validation { line: usize, reason: String },

    /// The rule table could not be read.
    #[error("cannot read tag table {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience alias for tag results.
pub type TagResult<T> = Result<T, TagError>;
