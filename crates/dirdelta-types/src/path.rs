use std::fmt;
use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// A file path relative to a comparison root.
///
/// `FilePath` is the join key between the two trees being compared. It is
/// stored in a normalized form so that two walks over different roots produce
/// comparable keys:
///
/// - components are separated by `/`
/// - no leading `/`, no `.` components, no empty components
/// - no `..` components
///
/// Comparison is byte-wise and therefore case-sensitive. The derived `Ord`
/// gives the lexicographic order used for deterministic reports.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FilePath(String);

impl FilePath {
    /// Parse and normalize a relative path string.
    ///
    /// `/` is always a separator; `\` is additionally treated as one on
    /// Windows.
    pub fn new(raw: impl Into<String>) -> Result<Self, TypeError> {
        let raw = raw.into();
        let invalid = |reason: &str| TypeError::InvalidPath {
            path: raw.clone(),
            reason: reason.to_string(),
        };

        if raw.is_empty() {
            return Err(invalid("path must not be empty"));
        }
        if raw.starts_with('/') || (cfg!(windows) && raw.starts_with('\\')) {
            return Err(invalid("path must be relative"));
        }

        let mut parts = Vec::new();
        for part in raw.split(|c| c == '/' || (cfg!(windows) && c == '\\')) {
            match part {
                "" | "." => continue,
                ".." => return Err(invalid("path must not contain '..'")),
                other => parts.push(other),
            }
        }

        if parts.is_empty() {
            return Err(invalid("path has no file component"));
        }

        Ok(Self(parts.join("/")))
    }

    /// Build a `FilePath` from a native relative path (as produced by
    /// stripping a walk root).
    pub fn from_relative(path: &Path) -> Result<Self, TypeError> {
        let display = path.to_string_lossy().into_owned();
        let mut parts = Vec::new();
        for component in path.components() {
            match component {
                Component::Normal(name) => {
                    let name = name.to_str().ok_or_else(|| TypeError::InvalidPath {
                        path: display.clone(),
                        reason: "path is not valid UTF-8".into(),
                    })?;
                    parts.push(name);
                }
                Component::CurDir => continue,
                Component::ParentDir => {
                    return Err(TypeError::InvalidPath {
                        path: display,
                        reason: "path must not contain '..'".into(),
                    })
                }
                Component::RootDir | Component::Prefix(_) => {
                    return Err(TypeError::InvalidPath {
                        path: display,
                        reason: "path must be relative".into(),
                    })
                }
            }
        }

        if parts.is_empty() {
            return Err(TypeError::InvalidPath {
                path: display,
                reason: "path must not be empty".into(),
            });
        }

        Ok(Self(parts.join("/")))
    }

    /// The normalized `/`-separated string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The last path component.
    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }

    /// The extension of the file name, without the dot.
    ///
    /// Dotfiles such as `.gitignore` have no extension. The result is not
    /// case-folded.
    pub fn extension(&self) -> Option<&str> {
        let name = self.file_name();
        match name.rfind('.') {
            Some(0) | None => None,
            Some(idx) if idx + 1 == name.len() => None,
            Some(idx) => Some(&name[idx + 1..]),
        }
    }

    /// Resolve this path beneath `root` using native separators.
    pub fn to_native(&self, root: &Path) -> PathBuf {
        let mut out = root.to_path_buf();
        for part in self.0.split('/') {
            out.push(part);
        }
        out
    }
}

impl fmt::Debug for FilePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FilePath({:?})", self.0)
    }
}

impl fmt::Display for FilePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for FilePath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for FilePath {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for FilePath {
    type Error = TypeError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<FilePath> for String {
    fn from(path: FilePath) -> Self {
        path.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn normalizes_redundant_separators() {
        let p = FilePath::new("./src//lib.rs").unwrap();
        assert_eq!(p.as_str(), "src/lib.rs");
    }

    #[test]
    fn rejects_empty_and_dot_only() {
        assert!(FilePath::new("").is_err());
        assert!(FilePath::new("./").is_err());
    }

    #[test]
    fn rejects_absolute() {
        let err = FilePath::new("/etc/passwd").unwrap_err();
        assert!(matches!(err, TypeError::InvalidPath { .. }));
    }

    #[test]
    fn rejects_parent_traversal() {
        assert!(FilePath::new("a/../b").is_err());
    }

    #[test]
    fn case_sensitive_equality() {
        let lower = FilePath::new("readme.md").unwrap();
        let upper = FilePath::new("README.md").unwrap();
        assert_ne!(lower, upper);
    }

    #[test]
    fn extension_rules() {
        assert_eq!(FilePath::new("lib/app.jar").unwrap().extension(), Some("jar"));
        assert_eq!(FilePath::new("a.tar.gz").unwrap().extension(), Some("gz"));
        assert_eq!(FilePath::new("APP.JAR").unwrap().extension(), Some("JAR"));
        assert_eq!(FilePath::new(".gitignore").unwrap().extension(), None);
        assert_eq!(FilePath::new("Makefile").unwrap().extension(), None);
        assert_eq!(FilePath::new("trailing.").unwrap().extension(), None);
    }

    #[test]
    fn file_name_is_last_component() {
        assert_eq!(FilePath::new("a/b/c.txt").unwrap().file_name(), "c.txt");
        assert_eq!(FilePath::new("top").unwrap().file_name(), "top");
    }

    #[test]
    fn from_relative_matches_new() {
        let native: PathBuf = ["dir", "sub", "file.txt"].iter().collect();
        let from_native = FilePath::from_relative(&native).unwrap();
        assert_eq!(from_native, FilePath::new("dir/sub/file.txt").unwrap());
    }

    #[test]
    fn to_native_joins_under_root() {
        let p = FilePath::new("x/y.txt").unwrap();
        let resolved = p.to_native(Path::new("root"));
        assert_eq!(resolved, Path::new("root").join("x").join("y.txt"));
    }

    #[test]
    fn lexicographic_order() {
        let mut paths = vec![
            FilePath::new("b.txt").unwrap(),
            FilePath::new("a/z.txt").unwrap(),
            FilePath::new("a.txt").unwrap(),
        ];
        paths.sort();
        let names: Vec<_> = paths.iter().map(|p| p.as_str()).collect();
        assert_eq!(names, vec!["a.txt", "a/z.txt", "b.txt"]);
    }

    #[test]
    fn serde_uses_plain_string() {
        let p = FilePath::new("src/main.rs").unwrap();
        let json = serde_json::to_string(&p).unwrap();
        assert_eq!(json, "\"src/main.rs\"");
        let parsed: FilePath = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, p);
        assert!(serde_json::from_str::<FilePath>("\"../x\"").is_err());
    }

    proptest! {
        #[test]
        fn normalization_is_idempotent(parts in proptest::collection::vec("[a-z0-9_]{1,8}", 1..5)) {
            let raw = parts.join("//./");
            let once = FilePath::new(raw).unwrap();
            let twice = FilePath::new(once.as_str()).unwrap();
            prop_assert_eq!(once, twice);
        }
    }
}
