//! Recursive enumeration of the regular files under a root.

use std::collections::BTreeSet;
use std::io;
use std::path::Path;

use dirdelta_types::FilePath;
use tracing::debug;
use walkdir::WalkDir;

use crate::error::{TraversalError, WalkResult};

/// Options controlling how a tree is enumerated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WalkOptions {
    /// Follow symbolic links. When `false`, links are skipped entirely.
    pub follow_links: bool,
}

impl Default for WalkOptions {
    fn default() -> Self {
        Self { follow_links: true }
    }
}

/// Enumerates the set of relative file paths under a root directory.
#[derive(Clone, Debug, Default)]
pub struct TreeWalker {
    options: WalkOptions,
}

impl TreeWalker {
    /// Create a walker with the given options.
    pub fn new(options: WalkOptions) -> Self {
        Self { options }
    }

    /// The options this walker was built with.
    pub fn options(&self) -> &WalkOptions {
        &self.options
    }

    /// Collect every regular file beneath `root`, relative to `root`.
    ///
    /// The set iterates in lexicographic order. Dangling links and special
    /// files are skipped; a link cycle, an unreadable directory, or a
    /// non-UTF-8 name aborts the walk.
    pub fn walk(&self, root: &Path) -> WalkResult<BTreeSet<FilePath>> {
        check_root(root)?;

        let mut files = BTreeSet::new();
        let walker = WalkDir::new(root)
            .follow_links(self.options.follow_links)
            .sort_by_file_name();

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    if let Some(ancestor) = err.loop_ancestor() {
                        return Err(TraversalError::Cycle {
                            path: err.path().map(Path::to_path_buf).unwrap_or_default(),
                            ancestor: ancestor.to_path_buf(),
                        });
                    }
                    let path = err.path().map(Path::to_path_buf).unwrap_or_default();
                    if is_dangling_link(&path, &err) {
                        debug!(path = %path.display(), "skipping dangling symlink");
                        continue;
                    }
                    let source = err
                        .into_io_error()
                        .unwrap_or_else(|| io::Error::other("walk failed"));
                    return Err(TraversalError::Io { path, source });
                }
            };

            let file_type = entry.file_type();
            if file_type.is_dir() {
                continue;
            }
            if file_type.is_symlink() {
                debug!(path = %entry.path().display(), "skipping symlink");
                continue;
            }
            if !file_type.is_file() {
                debug!(path = %entry.path().display(), "skipping special file");
                continue;
            }

            let rel = entry
                .path()
                .strip_prefix(root)
                .map_err(|_| TraversalError::InvalidRoot {
                    path: root.to_path_buf(),
                    reason: format!("entry {} escaped the root", entry.path().display()),
                })?;
            if rel.to_str().is_none() {
                return Err(TraversalError::NonUtf8Path(entry.path().to_path_buf()));
            }
            files.insert(FilePath::from_relative(rel)?);
        }

        debug!(root = %root.display(), files = files.len(), "walk complete");
        Ok(files)
    }
}

/// Walk `root` with default options.
pub fn walk(root: &Path) -> WalkResult<BTreeSet<FilePath>> {
    TreeWalker::default().walk(root)
}

/// Verify that `root` exists and is a directory.
pub fn check_root(root: &Path) -> WalkResult<()> {
    match std::fs::metadata(root) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(TraversalError::InvalidRoot {
            path: root.to_path_buf(),
            reason: "not a directory".into(),
        }),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Err(TraversalError::InvalidRoot {
            path: root.to_path_buf(),
            reason: "does not exist".into(),
        }),
        Err(e) => Err(TraversalError::Io {
            path: root.to_path_buf(),
            source: e,
        }),
    }
}

fn is_dangling_link(path: &Path, err: &walkdir::Error) -> bool {
    let not_found = err
        .io_error()
        .is_some_and(|e| e.kind() == io::ErrorKind::NotFound);
    not_found
        && std::fs::symlink_metadata(path)
            .map(|m| m.file_type().is_symlink())
            .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn names(set: &BTreeSet<FilePath>) -> Vec<&str> {
        set.iter().map(FilePath::as_str).collect()
    }

    #[test]
    fn lists_nested_files_in_order() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("b/c")).unwrap();
        fs::write(dir.path().join("z.txt"), "z").unwrap();
        fs::write(dir.path().join("a.txt"), "a").unwrap();
        fs::write(dir.path().join("b/c/deep.txt"), "d").unwrap();
        fs::write(dir.path().join("b/mid.txt"), "m").unwrap();

        let files = walk(dir.path()).unwrap();
        assert_eq!(names(&files), vec!["a.txt", "b/c/deep.txt", "b/mid.txt", "z.txt"]);
    }

    #[test]
    fn empty_directories_contribute_nothing() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("empty/nested")).unwrap();
        assert!(walk(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn missing_root_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let err = walk(&dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, TraversalError::InvalidRoot { .. }));
    }

    #[test]
    fn file_root_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("f.txt");
        fs::write(&file, "x").unwrap();
        let err = walk(&file).unwrap_err();
        assert!(matches!(err, TraversalError::InvalidRoot { reason, .. } if reason == "not a directory"));
    }

    #[test]
    fn walk_is_stable_across_runs() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["q", "b", "x", "a"] {
            fs::write(dir.path().join(name), name).unwrap();
        }
        assert_eq!(walk(dir.path()).unwrap(), walk(dir.path()).unwrap());
    }

    #[cfg(unix)]
    mod links {
        use super::*;
        use std::os::unix::fs::symlink;

        #[test]
        fn followed_file_link_uses_link_path() {
            let dir = tempfile::tempdir().unwrap();
            fs::write(dir.path().join("target.txt"), "t").unwrap();
            symlink(dir.path().join("target.txt"), dir.path().join("alias.txt")).unwrap();

            let files = walk(dir.path()).unwrap();
            assert_eq!(names(&files), vec!["alias.txt", "target.txt"]);
        }

        #[test]
        fn unfollowed_links_are_skipped() {
            let dir = tempfile::tempdir().unwrap();
            fs::write(dir.path().join("target.txt"), "t").unwrap();
            symlink(dir.path().join("target.txt"), dir.path().join("alias.txt")).unwrap();

            let walker = TreeWalker::new(WalkOptions { follow_links: false });
            let files = walker.walk(dir.path()).unwrap();
            assert_eq!(names(&files), vec!["target.txt"]);
        }

        #[test]
        fn dangling_link_is_skipped() {
            let dir = tempfile::tempdir().unwrap();
            fs::write(dir.path().join("real.txt"), "r").unwrap();
            symlink(dir.path().join("gone.txt"), dir.path().join("broken.txt")).unwrap();

            let files = walk(dir.path()).unwrap();
            assert_eq!(names(&files), vec!["real.txt"]);
        }

        #[test]
        fn cycle_is_an_error() {
            let dir = tempfile::tempdir().unwrap();
            fs::create_dir(dir.path().join("sub")).unwrap();
            fs::write(dir.path().join("sub/file.txt"), "f").unwrap();
            symlink(dir.path(), dir.path().join("sub/loop")).unwrap();

            let err = walk(dir.path()).unwrap_err();
            assert!(matches!(err, TraversalError::Cycle { .. }), "got {err:?}");
        }
    }
}
