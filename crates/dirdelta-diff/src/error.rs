//! Error types for the diff crate.

/// Errors that can occur when applying hunks back onto a line sequence.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum DiffError {
    /// A hunk starts before the previous hunk ended or past the input.
    #[error("hunk starting at old line {start} is out of range (input has {len} lines)")]
    HunkOutOfRange { start: usize, len: usize },

    /// A context or deleted line does not match the input.
    #[error("hunk mismatch at old line {line}: expected {expected:?}, found {found:?}")]
    Mismatch {
        line: usize,
        expected: String,
        found: String,
    },

    /// A hunk line carried a kind that only opcodes may carry.
    #[error("hunk line at position {0} is tagged replace")]
    UnexpectedReplaceLine(usize),
}

/// A diff stopped early because its caller asked it to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[error("diff interrupted")]
pub struct Interrupted;

/// Convenience alias for diff results.
pub type DiffResult<T> = Result<T, DiffError>;
