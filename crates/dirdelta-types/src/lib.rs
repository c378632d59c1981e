//! Foundation types for dirdelta.
//!
//! This crate provides the identity and classification types shared by the
//! walker, the diff engine, and the comparison engine. Every other dirdelta
//! crate depends on `dirdelta-types`.
//!
//! # Key Types
//!
//! - [`FilePath`] — Normalized path relative to a comparison root (the join key)
//! - [`Category`] — Per-path comparison outcome
//! - [`DiffSpanKind`] — Equal/Insert/Delete/Replace tag for line and character runs
//! - [`FileMeta`] — Size, mtime, and optional digest of one side
//! - [`ContentDigest`] / [`ContentHasher`] — BLAKE3 content hashing

pub mod category;
pub mod digest;
pub mod error;
pub mod meta;
pub mod path;

pub use category::{Category, DiffSpanKind};
pub use digest::{ContentDigest, ContentHasher};
pub use error::TypeError;
pub use meta::FileMeta;
pub use path::FilePath;
