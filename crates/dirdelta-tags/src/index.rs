//! Tag rules and the path → tags lookup.

use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{TagError, TagResult};

/// Associates `tag` with every path containing `path_fragment`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagRule {
    pub tag: String,
    pub path_fragment: String,
}

impl TagRule {
    /// Create a new rule.
    pub fn new(tag: impl Into<String>, path_fragment: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            path_fragment: path_fragment.into(),
        }
    }

    /// Returns `true` if the fragment occurs anywhere in `path`.
    pub fn matches(&self, path: &str) -> bool {
        path.contains(self.path_fragment.as_str())
    }
}

/// Lookup from file path to the union of the tags of all matching rules.
///
/// Matching is plain substring containment; there is no glob or regex
/// syntax.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TagIndex {
    rules: Vec<TagRule>,
}

impl TagIndex {
    /// Build an index from rules, in order.
    pub fn new(rules: Vec<TagRule>) -> Self {
        Self { rules }
    }

    /// Parse a two-column `tag,path_fragment` table.
    ///
    /// The first non-blank row is a header and is skipped. Blank rows are
    /// ignored and unquoted fields are trimmed. A field wrapped in double
    /// quotes may contain commas, and `""` inside it stands for one quote.
    /// Any other row must have exactly two non-empty fields.
    pub fn parse_table(text: &str) -> TagResult<Self> {
        let mut rules = Vec::new();
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

            let fields = split_row(raw).map_err(|reason| TagError::Validation {
                line: line_no,
                reason: reason.into(),
            })?;
            if fields.len() != 2 {
                return Err(TagError::Validation {
                    line: line_no,
                    reason: format!("expected 2 fields, found {}", fields.len()),
                });
            }
            if fields[0].is_empty() {
                return Err(TagError::Validation {
                    line: line_no,
                    reason: "tag must not be empty".into(),
                });
            }
            if fields[1].is_empty() {
                return Err(TagError::Validation {
                    line: line_no,
                    reason: "path fragment must not be empty".into(),
                });
            }
            rules.push(TagRule::new(fields[0].as_str(), fields[1].as_str()));
        }

        debug!(rules = rules.len(), "parsed tag table");
        Ok(Self { rules })
    }

    /// Read and parse a tag table from disk.
    pub fn load(path: &Path) -> TagResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| TagError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse_table(&text)
    }

    /// The rules, in load order.
    pub fn rules(&self) -> &[TagRule] {
        &self.rules
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns `true` if there are no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// All tags whose rule fragment occurs in `path`, sorted and deduplicated.
    pub fn tags_for(&self, path: impl AsRef<str>) -> BTreeSet<String> {
        let path = path.as_ref();
        self.rules
            .iter()
            .filter(|rule| rule.matches(path))
            .map(|rule| rule.tag.clone())
            .collect()
    }
}

/// Split one table row on commas, honoring double-quoted fields.
fn split_row(raw: &str) -> Result<Vec<String>, &'static str> {
    let mut fields = Vec::new();
    let mut chars = raw.chars().peekable();

    loop {
        while chars.next_if(|c| c.is_whitespace()).is_some() {}

        if chars.next_if_eq(&'"').is_some() {
            let mut field = String::new();
            loop {
                match chars.next() {
                    Some('"') if chars.next_if_eq(&'"').is_some() => field.push('"'),
                    Some('"') => break,
                    Some(c) => field.push(c),
                    None => return Err("unterminated quoted field"),
                }
            }
            while chars.next_if(|c| c.is_whitespace()).is_some() {}
            fields.push(field);
            match chars.next() {
                None => return Ok(fields),
                Some(',') => continue,
                Some(_) => return Err("unexpected text after quoted field"),
            }
        }

        let mut field = String::new();
        loop {
            match chars.next() {
                None => {
                    fields.push(field.trim().to_string());
                    return Ok(fields);
                }
                Some(',') => break,
                Some(c) => field.push(c),
            }
        }
        fields.push(field.trim().to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dirdelta_types::FilePath;

    #[test]
    fn substring_match_tags_path() {
        let index = TagIndex::new(vec![TagRule::new("critical", "a.txt")]);
        let tags = index.tags_for("docs/a.txt");
        assert!(tags.contains("critical"));
        assert!(index.tags_for("docs/b.txt").is_empty());
    }

    #[test]
    fn matching_is_case_sensitive_substring() {
        let index = TagIndex::new(vec![TagRule::new("cfg", "config/")]);
        assert!(!index.tags_for("src/myconfig/x").is_empty());
        assert!(index.tags_for("Config/x").is_empty());
    }

    #[test]
    fn multiple_rules_union_and_dedupe() {
        let index = TagIndex::new(vec![
            TagRule::new("backend", "src/"),
            TagRule::new("rust", ".rs"),
            TagRule::new("backend", "server"),
        ]);
        let tags = index.tags_for("src/server.rs");
        assert_eq!(
            tags.into_iter().collect::<Vec<_>>(),
            vec!["backend".to_string(), "rust".to_string()]
        );
    }

    #[test]
    fn accepts_file_paths() {
        let index = TagIndex::new(vec![TagRule::new("jar", ".jar")]);
        let path = FilePath::new("lib/app.jar").unwrap();
        assert!(index.tags_for(&path).contains("jar"));
    }

    #[test]
    fn parse_skips_header_and_blank_lines() {
        let text = "tag,path\n\ncritical, a.txt \n\"docs\",\"README\"\n";
        let index = TagIndex::parse_table(text).unwrap();
        assert_eq!(
            index.rules(),
            &[TagRule::new("critical", "a.txt"), TagRule::new("docs", "README")]
        );
    }

    #[test]
    fn quoted_fields_may_contain_commas() {
        let text = "tag,path\n\"a,b\",frag\nquoted,\"say \"\"hi\"\"\"\n";
        let index = TagIndex::parse_table(text).unwrap();
        assert_eq!(
            index.rules(),
            &[TagRule::new("a,b", "frag"), TagRule::new("quoted", "say \"hi\"")]
        );
    }

    #[test]
    fn malformed_quoting_is_validation_error() {
        let err = TagIndex::parse_table("tag,path\n\"open,frag\n").unwrap_err();
        assert!(matches!(err, TagError::Validation { line: 2, ref reason } if reason.contains("unterminated")));
        let err = TagIndex::parse_table("tag,path\n\"a\"b,frag\n").unwrap_err();
        assert!(matches!(err, TagError::Validation { line: 2, .. }));
    }

    #[test]
    fn header_only_table_is_empty() {
        let index = TagIndex::parse_table("tag,path\n").unwrap();
        assert!(index.is_empty());
    }

    #[test]
    fn wrong_field_count_is_validation_error() {
        let err = TagIndex::parse_table("tag,path\ncritical,a.txt\noops\n").unwrap_err();
        match err {
            TagError::Validation { line, reason } => {
                assert_eq!(line, 3);
                assert!(reason.contains("found 1"));
            }
            other => panic!("expected Validation, got {other:?}"),
        }

        let err = TagIndex::parse_table("tag,path\na,b,c\n").unwrap_err();
        assert!(matches!(err, TagError::Validation { line: 2, .. }));
    }

    #[test]
    fn empty_fields_are_rejected() {
        assert!(TagIndex::parse_table("h,h\n,frag\n").is_err());
        assert!(TagIndex::parse_table("h,h\ntag,\n").is_err());
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tags.csv");
        std::fs::write(&path, "tag,fragment\nsecret,.env\n").unwrap();
        let index = TagIndex::load(&path).unwrap();
        assert_eq!(index.len(), 1);

        let err = TagIndex::load(&dir.path().join("missing.csv")).unwrap_err();
        assert!(matches!(err, TagError::Io { .. }));
    }
}
