//! Comparison report types.
//!
//! A [`ComparisonResult`] holds one [`FileRecord`] per path found in either
//! tree, sorted by path, plus a [`Summary`] of the category counts.

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

use dirdelta_diff::Hunk;
use dirdelta_types::{Category, FileMeta, FilePath};
use serde::{Deserialize, Serialize};

/// The outcome for one relative path.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    pub path: FilePath,
    pub category: Category,
    /// Unified hunks; non-empty only for `Changed`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hunks: Vec<Hunk>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub tags: BTreeSet<String>,
    /// Metadata of the file under the first root, if it exists there.
    pub old_meta: Option<FileMeta>,
    /// Metadata of the file under the second root, if it exists there.
    pub new_meta: Option<FileMeta>,
    /// Set when a byte-differing file was not valid UTF-8 and fell back to
    /// hash comparison.
    #[serde(default)]
    pub decode_fallback: bool,
}

impl FileRecord {
    fn bare(
        path: FilePath,
        category: Category,
        old_meta: Option<FileMeta>,
        new_meta: Option<FileMeta>,
    ) -> Self {
        Self {
            path,
            category,
            hunks: Vec::new(),
            tags: BTreeSet::new(),
            old_meta,
            new_meta,
            decode_fallback: false,
        }
    }

    pub fn identical(path: FilePath, old_meta: FileMeta, new_meta: FileMeta) -> Self {
        Self::bare(path, Category::Identical, Some(old_meta), Some(new_meta))
    }

    pub fn changed(path: FilePath, hunks: Vec<Hunk>, old_meta: FileMeta, new_meta: FileMeta) -> Self {
        Self {
            hunks,
            ..Self::bare(path, Category::Changed, Some(old_meta), Some(new_meta))
        }
    }

    /// A byte-differing file compared by digest only. Both metadata values
    /// are expected to carry their hash.
    pub fn hash_only(path: FilePath, old_meta: FileMeta, new_meta: FileMeta) -> Self {
        Self::bare(path, Category::HashOnly, Some(old_meta), Some(new_meta))
    }

    /// Like [`FileRecord::hash_only`], marking the UTF-8 decode fallback.
    pub fn decode_fallback(path: FilePath, old_meta: FileMeta, new_meta: FileMeta) -> Self {
        Self {
            decode_fallback: true,
            ..Self::hash_only(path, old_meta, new_meta)
        }
    }

    pub fn added(path: FilePath, new_meta: FileMeta) -> Self {
        Self::bare(path, Category::Added, None, Some(new_meta))
    }

    pub fn removed(path: FilePath, old_meta: FileMeta) -> Self {
        Self::bare(path, Category::Removed, Some(old_meta), None)
    }

    /// A file whose comparison was cancelled or ran past its deadline.
    pub fn incomplete(path: FilePath) -> Self {
        Self::bare(path, Category::Incomplete, None, None)
    }

    pub fn with_tags(mut self, tags: BTreeSet<String>) -> Self {
        self.tags = tags;
        self
    }

    /// Lines added across all hunks.
    pub fn additions(&self) -> usize {
        self.hunks.iter().map(Hunk::additions).sum()
    }

    /// Lines deleted across all hunks.
    pub fn deletions(&self) -> usize {
        self.hunks.iter().map(Hunk::deletions).sum()
    }
}

/// Per-category counts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub identical: usize,
    pub changed: usize,
    pub added: usize,
    pub removed: usize,
    pub hash_only: usize,
    pub incomplete: usize,
    /// Number of distinct paths across both trees.
    pub total: usize,
}

impl Summary {
    /// Count the categories of `records`.
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a FileRecord>) -> Self {
        records
            .into_iter()
            .fold(Self::default(), |acc, r| acc.merge(Self::single(r.category)))
    }

    fn single(category: Category) -> Self {
        let mut s = Self {
            total: 1,
            ..Self::default()
        };
        *s.slot(category) = 1;
        s
    }

    fn slot(&mut self, category: Category) -> &mut usize {
        match category {
            Category::Identical => &mut self.identical,
            Category::Changed => &mut self.changed,
            Category::Added => &mut self.added,
            Category::Removed => &mut self.removed,
            Category::HashOnly => &mut self.hash_only,
            Category::Incomplete => &mut self.incomplete,
        }
    }

    /// Sum two partial counts.
    pub fn merge(self, other: Self) -> Self {
        Self {
            identical: self.identical + other.identical,
            changed: self.changed + other.changed,
            added: self.added + other.added,
            removed: self.removed + other.removed,
            hash_only: self.hash_only + other.hash_only,
            incomplete: self.incomplete + other.incomplete,
            total: self.total + other.total,
        }
    }

    /// Count for a single category.
    pub fn count(&self, category: Category) -> usize {
        match category {
            Category::Identical => self.identical,
            Category::Changed => self.changed,
            Category::Added => self.added,
            Category::Removed => self.removed,
            Category::HashOnly => self.hash_only,
            Category::Incomplete => self.incomplete,
        }
    }

    /// Returns `true` if `total` equals the sum of the category counts.
    pub fn is_consistent(&self) -> bool {
        Category::ALL.iter().map(|c| self.count(*c)).sum::<usize>() == self.total
    }

    /// Returns `true` if every path compared identical.
    pub fn is_clean(&self) -> bool {
        self.identical == self.total
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} files: {} identical, {} changed, {} added, {} removed, {} hash-only",
            self.total, self.identical, self.changed, self.added, self.removed, self.hash_only
        )?;
        if self.incomplete > 0 {
            write!(f, ", {} incomplete", self.incomplete)?;
        }
        Ok(())
    }
}

/// The full result of comparing two directory trees.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonResult {
    root1: PathBuf,
    root2: PathBuf,
    records: Vec<FileRecord>,
    summary: Summary,
}

impl ComparisonResult {
    /// Build a result, sorting the records by path and computing the summary.
    pub fn new(root1: impl Into<PathBuf>, root2: impl Into<PathBuf>, mut records: Vec<FileRecord>) -> Self {
        records.sort_by(|a, b| a.path.cmp(&b.path));
        let summary = Summary::from_records(&records);
        Self {
            root1: root1.into(),
            root2: root2.into(),
            records,
            summary,
        }
    }

    pub fn root1(&self) -> &Path {
        &self.root1
    }

    pub fn root2(&self) -> &Path {
        &self.root2
    }

    /// All records, sorted by path.
    pub fn records(&self) -> &[FileRecord] {
        &self.records
    }

    pub fn summary(&self) -> &Summary {
        &self.summary
    }

    /// Look up the record for `path`.
    pub fn record(&self, path: &str) -> Option<&FileRecord> {
        self.records
            .binary_search_by(|r| r.path.as_str().cmp(path))
            .ok()
            .map(|i| &self.records[i])
    }

    pub fn by_category(&self, category: Category) -> impl Iterator<Item = &FileRecord> {
        self.records.iter().filter(move |r| r.category == category)
    }

    pub fn with_tag<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a FileRecord> {
        self.records.iter().filter(move |r| r.tags.contains(tag))
    }

    /// Records that are not `Identical`.
    pub fn differences(&self) -> impl Iterator<Item = &FileRecord> {
        self.records
            .iter()
            .filter(|r| r.category != Category::Identical)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(s: &str) -> FilePath {
        FilePath::new(s).unwrap()
    }

    fn sample() -> ComparisonResult {
        ComparisonResult::new(
            "/left",
            "/right",
            vec![
                FileRecord::removed(path("z.txt"), FileMeta::new(3)),
                FileRecord::identical(path("a.txt"), FileMeta::new(1), FileMeta::new(1)),
                FileRecord::added(path("m/n.txt"), FileMeta::new(2))
                    .with_tags(["new".to_string()].into()),
                FileRecord::incomplete(path("slow.log")),
            ],
        )
    }

    #[test]
    fn records_are_sorted_and_counted() {
        let result = sample();
        let paths: Vec<&str> = result.records().iter().map(|r| r.path.as_str()).collect();
        assert_eq!(paths, vec!["a.txt", "m/n.txt", "slow.log", "z.txt"]);

        let s = result.summary();
        assert_eq!(s.total, 4);
        assert_eq!(s.identical, 1);
        assert_eq!(s.added, 1);
        assert_eq!(s.removed, 1);
        assert_eq!(s.incomplete, 1);
        assert!(s.is_consistent());
        assert!(!s.is_clean());
    }

    #[test]
    fn lookup_by_path() {
        let result = sample();
        assert_eq!(result.record("z.txt").unwrap().category, Category::Removed);
        assert!(result.record("missing").is_none());
    }

    #[test]
    fn filters() {
        let result = sample();
        assert_eq!(result.by_category(Category::Added).count(), 1);
        assert_eq!(result.with_tag("new").count(), 1);
        assert_eq!(result.differences().count(), 3);
    }

    #[test]
    fn metadata_follows_existing_side() {
        let added = FileRecord::added(path("x"), FileMeta::new(1));
        assert!(added.old_meta.is_none());
        assert!(added.new_meta.is_some());

        let removed = FileRecord::removed(path("x"), FileMeta::new(1));
        assert!(removed.old_meta.is_some());
        assert!(removed.new_meta.is_none());
    }

    #[test]
    fn decode_fallback_is_hash_only() {
        let r = FileRecord::decode_fallback(path("bin"), FileMeta::new(1), FileMeta::new(2));
        assert_eq!(r.category, Category::HashOnly);
        assert!(r.decode_fallback);
    }

    #[test]
    fn summary_merge_and_display() {
        let a = Summary::from_records(&sample().records()[..2]);
        let b = Summary::from_records(&sample().records()[2..]);
        let merged = a.merge(b);
        assert_eq!(&merged, sample().summary());
        assert_eq!(
            merged.to_string(),
            "4 files: 1 identical, 0 changed, 1 added, 1 removed, 0 hash-only, 1 incomplete"
        );
    }

    #[test]
    fn serde_round_trip() {
        let result = sample();
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("\"category\":\"added\""));
        let back: ComparisonResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back, result);
    }
}
