//! Batch comparison of many directory pairs.
//!
//! Each pair runs on a tokio blocking task. A failing pair is recorded in
//! its entry and does not stop the others.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::classify::ClassificationEngine;
use crate::error::{CompareError, CompareResult};
use crate::report::ComparisonResult;

/// One directory pair to compare.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchJob {
    pub name: String,
    pub dir1: PathBuf,
    pub dir2: PathBuf,
}

impl BatchJob {
    pub fn new(name: impl Into<String>, dir1: impl Into<PathBuf>, dir2: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            dir1: dir1.into(),
            dir2: dir2.into(),
        }
    }

    /// Parse a job list of `dir1,dir2[,name]` rows.
    ///
    /// The first non-blank row is a header. Jobs without a name are named
    /// after their row number.
    pub fn parse_list(text: &str) -> CompareResult<Vec<Self>> {
        let mut jobs = Vec::new();
        let mut header_seen = false;

        for (idx, raw) in text.lines().enumerate() {
            let line_no = idx + 1;
            if raw.trim().is_empty() {
                continue;
            }
            if !header_seen {
                header_seen = true;
                continue;
            }

            let fields: Vec<&str> = raw.split(',').map(str::trim).collect();
            let job = match fields.as_slice() {
                [dir1, dir2] if !dir1.is_empty() && !dir2.is_empty() => {
                    Self::new(format!("job-{line_no}"), *dir1, *dir2)
                }
                [dir1, dir2, name] if !dir1.is_empty() && !dir2.is_empty() && !name.is_empty() => {
                    Self::new(*name, *dir1, *dir2)
                }
                _ => {
                    return Err(CompareError::Configuration(format!(
                        "job list line {line_no}: expected `dir1,dir2[,name]`"
                    )))
                }
            };
            jobs.push(job);
        }
        Ok(jobs)
    }

    /// Read and parse a job list file.
    pub fn load_list(path: &Path) -> CompareResult<Vec<Self>> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            CompareError::Configuration(format!("cannot read job list {}: {e}", path.display()))
        })?;
        Self::parse_list(&text)
    }
}

/// Result of one batch pair.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BatchOutcome {
    Completed { result: ComparisonResult },
    Failed { error: String },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchEntry {
    pub job: BatchJob,
    pub outcome: BatchOutcome,
}

impl BatchEntry {
    pub fn result(&self) -> Option<&ComparisonResult> {
        match &self.outcome {
            BatchOutcome::Completed { result } => Some(result),
            BatchOutcome::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            BatchOutcome::Completed { .. } => None,
            BatchOutcome::Failed { error } => Some(error),
        }
    }
}

/// All batch entries, in job order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
    pub entries: Vec<BatchEntry>,
}

impl BatchReport {
    pub fn succeeded(&self) -> impl Iterator<Item = &BatchEntry> {
        self.entries.iter().filter(|e| e.result().is_some())
    }

    pub fn failed(&self) -> impl Iterator<Item = &BatchEntry> {
        self.entries.iter().filter(|e| e.error().is_some())
    }
}

/// Compare every job concurrently and collect the outcomes in job order.
pub async fn run_batch(jobs: Vec<BatchJob>, engine: Arc<ClassificationEngine>) -> BatchReport {
    info!(jobs = jobs.len(), "starting batch");

    let handles: Vec<_> = jobs
        .into_iter()
        .map(|job| {
            let engine = Arc::clone(&engine);
            let (dir1, dir2) = (job.dir1.clone(), job.dir2.clone());
            let handle = tokio::task::spawn_blocking(move || engine.classify(&dir1, &dir2));
            (job, handle)
        })
        .collect();

    let mut entries = Vec::with_capacity(handles.len());
    for (job, handle) in handles {
        let outcome = match handle.await {
            Ok(Ok(result)) => BatchOutcome::Completed { result },
            Ok(Err(err)) => {
                warn!(job = %job.name, error = %err, "batch job failed");
                BatchOutcome::Failed {
                    error: err.to_string(),
                }
            }
            Err(join) => {
                warn!(job = %job.name, error = %join, "batch job did not finish");
                BatchOutcome::Failed {
                    error: format!("task failed: {join}"),
                }
            }
        };
        entries.push(BatchEntry { job, outcome });
    }

    let report = BatchReport { entries };
    info!(
        succeeded = report.succeeded().count(),
        failed = report.failed().count(),
        "batch finished"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CompareConfig;

    #[test]
    fn parse_list_with_and_without_names() {
        let jobs = BatchJob::parse_list("dir1,dir2,name\n\n/a,/b,first\n/c , /d\n").unwrap();
        assert_eq!(
            jobs,
            vec![
                BatchJob::new("first", "/a", "/b"),
                BatchJob::new("job-4", "/c", "/d"),
            ]
        );
    }

    #[test]
    fn parse_list_rejects_malformed_rows() {
        let err = BatchJob::parse_list("h\n/a\n").unwrap_err();
        assert!(matches!(err, CompareError::Configuration(msg) if msg.contains("line 2")));
        assert!(BatchJob::parse_list("h\n/a,,x\n").is_err());
        assert!(BatchJob::parse_list("h\n/a,/b,c,d\n").is_err());
    }

    #[test]
    fn header_only_list_is_empty() {
        assert!(BatchJob::parse_list("dir1,dir2\n").unwrap().is_empty());
    }

    #[tokio::test]
    async fn failing_pair_does_not_stop_others() {
        let tmp = tempfile::tempdir().unwrap();
        let left = tmp.path().join("l");
        let right = tmp.path().join("r");
        std::fs::create_dir(&left).unwrap();
        std::fs::create_dir(&right).unwrap();
        std::fs::write(left.join("a.txt"), "1\n").unwrap();
        std::fs::write(right.join("a.txt"), "2\n").unwrap();

        let jobs = vec![
            BatchJob::new("ok", &left, &right),
            BatchJob::new("missing", tmp.path().join("nope"), &right),
            BatchJob::new("self", &left, &left),
        ];
        let engine = Arc::new(ClassificationEngine::new(CompareConfig::default()));
        let report = run_batch(jobs, engine).await;

        let names: Vec<&str> = report.entries.iter().map(|e| e.job.name.as_str()).collect();
        assert_eq!(names, vec!["ok", "missing", "self"]);
        assert_eq!(report.succeeded().count(), 2);
        assert_eq!(report.failed().count(), 1);

        assert_eq!(report.entries[0].result().unwrap().summary().changed, 1);
        assert!(report.entries[1].error().unwrap().contains("does not exist"));
        assert!(report.entries[2].result().unwrap().summary().is_clean());
    }

    #[tokio::test]
    async fn empty_batch() {
        let engine = Arc::new(ClassificationEngine::default());
        let report = run_batch(Vec::new(), engine).await;
        assert!(report.entries.is_empty());
    }

    #[test]
    fn outcome_serializes_with_status_tag() {
        let entry = BatchEntry {
            job: BatchJob::new("x", "/a", "/b"),
            outcome: BatchOutcome::Failed {
                error: "boom".into(),
            },
        };
        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains("\"status\":\"failed\""));
        let back: BatchEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(back, entry);
    }
}
