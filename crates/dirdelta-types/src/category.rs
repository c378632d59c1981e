use std::fmt;

use serde::{Deserialize, Serialize};

/// The outcome of comparing one relative path across two trees.
///
/// Every path in the union of both trees receives exactly one category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Present in both trees with byte-identical content.
    Identical,
    /// Present in both trees, textually different; carries a line diff.
    Changed,
    /// Present only under the second root.
    Added,
    /// Present only under the first root.
    Removed,
    /// Present in both trees and byte-different, summarized by content hash
    /// instead of a line diff.
    HashOnly,
    /// The per-file comparison was cancelled or ran past its deadline.
    Incomplete,
}

impl Category {
    /// All categories, in report order.
    pub const ALL: [Category; 6] = [
        Category::Identical,
        Category::Changed,
        Category::Added,
        Category::Removed,
        Category::HashOnly,
        Category::Incomplete,
    ];

    /// Stable lowercase label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Identical => "identical",
            Category::Changed => "changed",
            Category::Added => "added",
            Category::Removed => "removed",
            Category::HashOnly => "hash_only",
            Category::Incomplete => "incomplete",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tag for a run of aligned items, at line or character granularity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiffSpanKind {
    Equal,
    Insert,
    Delete,
    Replace,
}

impl fmt::Display for DiffSpanKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DiffSpanKind::Equal => "equal",
            DiffSpanKind::Insert => "insert",
            DiffSpanKind::Delete => "delete",
            DiffSpanKind::Replace => "replace",
        };
        f.write_str(s)
    }
}
