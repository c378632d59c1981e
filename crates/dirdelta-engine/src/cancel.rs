//! Cooperative cancellation for per-file comparisons.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Shared flag that asks every in-flight file comparison to stop.
///
/// Clones share the same flag.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// The cancellation state seen by one file comparison: the shared token plus
/// an optional deadline for this file alone.
#[derive(Debug)]
pub(crate) struct FileBudget<'a> {
    token: &'a CancelToken,
    deadline: Option<Instant>,
}

impl<'a> FileBudget<'a> {
    /// Start the clock for one file.
    pub(crate) fn start(token: &'a CancelToken, timeout: Option<Duration>) -> Self {
        Self {
            token,
            deadline: timeout.map(|t| Instant::now() + t),
        }
    }

    /// Returns `true` once the token is cancelled or the deadline has passed.
    pub(crate) fn exhausted(&self) -> bool {
        self.token.is_cancelled() || self.deadline.is_some_and(|d| Instant::now() >= d)
    }
}
