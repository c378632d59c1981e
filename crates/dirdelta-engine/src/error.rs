//! Error types for the comparison engine.

use std::path::PathBuf;

use dirdelta_tags::TagError;
use dirdelta_walk::TraversalError;

/// Fatal conditions that abort one directory-pair comparison.
#[derive(Debug, thiserror::Error)]
pub enum CompareError {
    /// A root is missing or not a directory, or the configuration is invalid.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Enumerating one of the trees failed.
    #[error("traversal of {root} failed: {source}")]
    Traversal {
        root: PathBuf,
        #[source]
        source: TraversalError,
    },

    /// A listed file could not be read during comparison.
    #[error("cannot read {path}: {source}")]
    FileAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The tag rule table is malformed.
    #[error("invalid tag rules: {0}")]
    Validation(TagError),
}

impl CompareError {
    /// Map a walk failure, treating a bad root as a configuration problem.
    pub fn from_traversal(root: impl Into<PathBuf>, source: TraversalError) -> Self {
        match source {
            TraversalError::InvalidRoot { path, reason } => {
                CompareError::Configuration(format!("root {} {reason}", path.display()))
            }
            source => CompareError::Traversal {
                root: root.into(),
                source,
            },
        }
    }
}

impl From<TagError> for CompareError {
    fn from(err: TagError) -> Self {
        match err {
            TagError::Io { path, source } => CompareError::Configuration(format!(
                "cannot read tag table {}: {source}",
                path.display()
            )),
            validation => CompareError::Validation(validation),
        }
    }
}

/// Convenience alias for engine results.
pub type CompareResult<T> = Result<T, CompareError>;
