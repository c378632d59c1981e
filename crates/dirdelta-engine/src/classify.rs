//! Per-path classification of two directory trees.
//!
//! Both roots are walked independently. Paths present in both trees are
//! compared in parallel; paths present in only one are `Added` or
//! `Removed`. The records are sorted and summarized into a
//! [`ComparisonResult`].

use std::fs::File;
use std::path::Path;
use std::time::Instant;

use dirdelta_diff::diff_text_until;
use dirdelta_tags::TagIndex;
use dirdelta_types::{ContentDigest, ContentHasher, FileMeta, FilePath};
use dirdelta_walk::{check_root, TreeWalker};
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::cancel::{CancelToken, FileBudget};
use crate::config::CompareConfig;
use crate::error::{CompareError, CompareResult};
use crate::report::{ComparisonResult, FileRecord};

/// Compares two directory trees under one configuration.
///
/// The engine is immutable and `Sync`; one instance can serve many
/// comparisons, including concurrent ones.
#[derive(Clone, Debug, Default)]
pub struct ClassificationEngine {
    config: CompareConfig,
    tags: TagIndex,
    cancel: CancelToken,
}

impl ClassificationEngine {
    /// Create an engine with no tag rules.
    pub fn new(config: CompareConfig) -> Self {
        Self {
            config,
            tags: TagIndex::default(),
            cancel: CancelToken::new(),
        }
    }

    /// Create an engine, loading the tag table named by the configuration.
    pub fn from_config(config: CompareConfig) -> CompareResult<Self> {
        let tags = config.load_tags()?;
        Ok(Self::new(config).with_tags(tags))
    }

    pub fn with_tags(mut self, tags: TagIndex) -> Self {
        self.tags = tags;
        self
    }

    /// Share an externally owned cancellation token.
    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn config(&self) -> &CompareConfig {
        &self.config
    }

    pub fn tags(&self) -> &TagIndex {
        &self.tags
    }

    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    /// Compare `root1` (old) against `root2` (new).
    pub fn classify(&self, root1: &Path, root2: &Path) -> CompareResult<ComparisonResult> {
        let started = Instant::now();
        info!(
            root1 = %root1.display(),
            root2 = %root2.display(),
            "comparing directory trees"
        );

        for root in [root1, root2] {
            check_root(root).map_err(|e| CompareError::from_traversal(root, e))?;
        }

        let walker = TreeWalker::new(self.config.walk_options());
        let left = walker
            .walk(root1)
            .map_err(|e| CompareError::from_traversal(root1, e))?;
        let right = walker
            .walk(root2)
            .map_err(|e| CompareError::from_traversal(root2, e))?;

        let common: Vec<&FilePath> = left.intersection(&right).collect();
        let mut records: Vec<FileRecord> = common
            .par_iter()
            .map(|path| self.compare_pair(root1, root2, path))
            .collect::<CompareResult<_>>()?;

        for path in left.difference(&right) {
            let meta = read_meta(&path.to_native(root1))?;
            records.push(self.finish(FileRecord::removed(path.clone(), meta)));
        }
        for path in right.difference(&left) {
            let meta = read_meta(&path.to_native(root2))?;
            records.push(self.finish(FileRecord::added(path.clone(), meta)));
        }

        let result = ComparisonResult::new(root1, root2, records);
        let summary = result.summary();
        info!(
            total = summary.total,
            identical = summary.identical,
            changed = summary.changed,
            added = summary.added,
            removed = summary.removed,
            hash_only = summary.hash_only,
            incomplete = summary.incomplete,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "comparison finished"
        );
        Ok(result)
    }

    /// Classify one path present in both trees.
    fn compare_pair(&self, root1: &Path, root2: &Path, path: &FilePath) -> CompareResult<FileRecord> {
        let budget = FileBudget::start(&self.cancel, self.config.file_timeout());
        if budget.exhausted() {
            return Ok(self.abandon(path));
        }

        let old_path = path.to_native(root1);
        let new_path = path.to_native(root2);
        let old_meta = read_meta(&old_path)?;
        let new_meta = read_meta(&new_path)?;

        if path.extension().is_some_and(|ext| self.config.is_hash_ext(ext)) {
            let old_hash = hash_file(&old_path)?;
            let new_hash = hash_file(&new_path)?;
            if budget.exhausted() {
                return Ok(self.abandon(path));
            }
            let record = if old_meta.size == new_meta.size && old_hash == new_hash {
                FileRecord::identical(path.clone(), old_meta, new_meta)
            } else {
                FileRecord::hash_only(
                    path.clone(),
                    old_meta.with_hash(old_hash),
                    new_meta.with_hash(new_hash),
                )
            };
            return Ok(self.finish(record));
        }

        let old_bytes = read_bytes(&old_path)?;
        let new_bytes = read_bytes(&new_path)?;
        if budget.exhausted() {
            return Ok(self.abandon(path));
        }
        if old_bytes == new_bytes {
            return Ok(self.finish(FileRecord::identical(path.clone(), old_meta, new_meta)));
        }

        let (old_text, new_text) =
            match (std::str::from_utf8(&old_bytes), std::str::from_utf8(&new_bytes)) {
                (Ok(old), Ok(new)) => (old, new),
                _ => {
                    warn!(path = %path, "content is not valid UTF-8, comparing by hash");
                    let record = FileRecord::decode_fallback(
                        path.clone(),
                        old_meta.with_hash(ContentHasher::hash(&old_bytes)),
                        new_meta.with_hash(ContentHasher::hash(&new_bytes)),
                    );
                    return Ok(self.finish(record));
                }
            };

        let stop = || budget.exhausted();
        let diff = match diff_text_until(old_text, new_text, self.config.context_lines, &stop) {
            Ok(diff) if !budget.exhausted() => diff,
            _ => return Ok(self.abandon(path)),
        };

        Ok(self.finish(FileRecord::changed(path.clone(), diff.hunks, old_meta, new_meta)))
    }

    fn abandon(&self, path: &FilePath) -> FileRecord {
        warn!(path = %path, "comparison cancelled");
        self.finish(FileRecord::incomplete(path.clone()))
    }

    /// Attach tags and log the outcome.
    fn finish(&self, record: FileRecord) -> FileRecord {
        debug!(path = %record.path, category = %record.category, "classified");
        let tags = self.tags.tags_for(&record.path);
        record.with_tags(tags)
    }
}

/// Compare two trees with a one-off engine built from `config`.
pub fn classify(root1: &Path, root2: &Path, config: &CompareConfig) -> CompareResult<ComparisonResult> {
    ClassificationEngine::from_config(config.clone())?.classify(root1, root2)
}

fn read_meta(path: &Path) -> CompareResult<FileMeta> {
    std::fs::metadata(path)
        .map(|m| FileMeta::from_metadata(&m))
        .map_err(|source| CompareError::FileAccess {
            path: path.to_path_buf(),
            source,
        })
}

fn read_bytes(path: &Path) -> CompareResult<Vec<u8>> {
    std::fs::read(path).map_err(|source| CompareError::FileAccess {
        path: path.to_path_buf(),
        source,
    })
}

fn hash_file(path: &Path) -> CompareResult<ContentDigest> {
    File::open(path)
        .and_then(ContentHasher::hash_reader)
        .map_err(|source| CompareError::FileAccess {
            path: path.to_path_buf(),
            source,
        })
}
