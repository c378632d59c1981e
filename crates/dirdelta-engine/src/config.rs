use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use dirdelta_diff::DEFAULT_CONTEXT;
use dirdelta_tags::TagIndex;
use dirdelta_walk::WalkOptions;
use serde::{Deserialize, Serialize};

use crate::error::{CompareError, CompareResult};

/// Settings for one comparison run.
///
/// Every field has a default, so a TOML file only needs the keys it
/// overrides.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompareConfig {
    /// Unchanged lines kept before and after each change in a hunk.
    pub context_lines: usize,
    /// Extensions (without the dot, matched case-sensitively) compared by
    /// content hash instead of line diff.
    pub ignore_hash_exts: BTreeSet<String>,
    /// Follow symbolic links while walking.
    pub follow_links: bool,
    /// Per-file time limit in seconds; files over it are reported as
    /// incomplete.
    pub file_timeout_secs: Option<u64>,
    /// Optional two-column tag table (`tag,path_fragment`, header row first).
    pub tag_table: Option<PathBuf>,
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            context_lines: DEFAULT_CONTEXT,
            ignore_hash_exts: BTreeSet::new(),
            follow_links: true,
            file_timeout_secs: None,
            tag_table: None,
        }
    }
}

impl CompareConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> CompareResult<Self> {
        toml::from_str(text).map_err(|e| CompareError::Configuration(e.to_string()))
    }

    /// Read a TOML configuration file.
    pub fn load(path: &Path) -> CompareResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            CompareError::Configuration(format!("cannot read config {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&text)
    }

    pub fn with_context_lines(mut self, context_lines: usize) -> Self {
        self.context_lines = context_lines;
        self
    }

    pub fn with_hash_exts<I, S>(mut self, exts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignore_hash_exts
            .extend(exts.into_iter().map(|e| e.into().trim_start_matches('.').to_string()));
        self
    }

    pub fn with_follow_links(mut self, follow_links: bool) -> Self {
        self.follow_links = follow_links;
        self
    }

    pub fn with_file_timeout(mut self, secs: u64) -> Self {
        self.file_timeout_secs = Some(secs);
        self
    }

    pub fn with_tag_table(mut self, path: impl Into<PathBuf>) -> Self {
        self.tag_table = Some(path.into());
        self
    }

    /// The per-file time limit, if any.
    pub fn file_timeout(&self) -> Option<Duration> {
        self.file_timeout_secs.map(Duration::from_secs)
    }

    /// Walker options derived from this configuration.
    pub fn walk_options(&self) -> WalkOptions {
        WalkOptions {
            follow_links: self.follow_links,
        }
    }

    /// Returns `true` if `ext` is routed to hash comparison.
    pub fn is_hash_ext(&self, ext: &str) -> bool {
        self.ignore_hash_exts.contains(ext)
    }

    /// Load the configured tag table, or an empty index when none is set.
    pub fn load_tags(&self) -> CompareResult<TagIndex> {
        match &self.tag_table {
            Some(path) => Ok(TagIndex::load(path)?),
            None => Ok(TagIndex::default()),
        }
    }
}
