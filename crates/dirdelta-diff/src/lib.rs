//! Diff engine for dirdelta.
//!
//! Aligns sequences with a greedy longest-match algorithm, groups the
//! resulting opcodes into context-windowed unified hunks, and refines
//! replaced lines at character level. The `*_until` variants take a stop
//! check and return [`Interrupted`] once it fires.
//!
//! # Key Types
//!
//! - [`SequenceMatcher`] / [`Opcode`] -- Matching blocks and edit opcodes
//! - [`LineDiff`] / [`Hunk`] / [`DiffLine`] -- Line-level unified diff
//! - [`InlineDiff`] / [`InlineSpan`] -- Character-level spans for replace pairs

pub mod error;
pub mod intraline;
pub mod matcher;
pub mod unified;

pub use error::{DiffError, DiffResult, Interrupted};
pub use intraline::{
    char_tags, intraline, intraline_until, refine_hunk, refine_hunk_until, InlineDiff, InlineSpan,
};
pub use matcher::{Match, Opcode, SequenceMatcher};
pub use unified::{
    apply_hunks, diff_text, diff_text_until, hunk_from_group, split_lines, unified_diff,
    unified_diff_until, DiffLine, Hunk, LineDiff, DEFAULT_CONTEXT,
};
