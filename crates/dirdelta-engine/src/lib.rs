//! Comparison engine for dirdelta.
//!
//! Walks two directory trees, classifies every relative path, computes
//! line and intraline diffs for changed text files, and assembles the
//! result into an immutable report.
//!
//! # Key Types
//!
//! - [`ClassificationEngine`] — Compares two roots under a [`CompareConfig`]
//! - [`ComparisonResult`] — Sorted per-path [`FileRecord`]s plus a [`Summary`]
//! - [`CancelToken`] — Shared flag that turns in-flight files into `Incomplete`
//! - [`BatchJob`] / [`BatchReport`] — Many directory pairs, run concurrently
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use dirdelta_engine::{classify, CompareConfig};
//!
//! let config = CompareConfig::default().with_hash_exts(["jar"]);
//! let result = classify(Path::new("release-1"), Path::new("release-2"), &config)?;
//! println!("{}", result.summary());
//! # Ok::<(), dirdelta_engine::CompareError>(())
//! ```

pub mod batch;
pub mod cancel;
pub mod classify;
pub mod config;
pub mod error;
pub mod report;

pub use batch::{run_batch, BatchEntry, BatchJob, BatchOutcome, BatchReport};
pub use cancel::CancelToken;
pub use classify::{classify, ClassificationEngine};
pub use config::CompareConfig;
pub use error::{CompareError, CompareResult};
pub use report::{ComparisonResult, FileRecord, Summary};
