//! Tag overlay for dirdelta.
//!
//! Tags are labels attached to report rows by path-fragment matching. They
//! never influence classification; they exist so a renderer can filter.

pub mod error;
pub mod index;

pub use error::{TagError, TagResult};
pub use index::{TagIndex, TagRule};
