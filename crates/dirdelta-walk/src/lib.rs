//! Tree enumeration for dirdelta.
//!
//! Lists every regular file under a root as a normalized [`FilePath`],
//! following symlinks by default and refusing to loop on link cycles.
//!
//! [`FilePath`]: dirdelta_types::FilePath

pub mod error;
pub mod walker;

pub use error::{TraversalError, WalkResult};
pub use walker::{check_root, walk, TreeWalker, WalkOptions};
