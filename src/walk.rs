//! Lazy traversal of the source tree.
//!
//! [`TreeWalker`] yields every descendant of the source root exactly once,
//! sorted by file name within each directory, with directories yielded
//! before their contents.  Entries whose base name is in the [`SkipSet`]
//! are dropped, and a skipped directory is never descended into.
use std::collections::BTreeSet;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

use crate::error::MirrorError;

/// Base names that are never mirrored.
///
/// # Examples
///
/// ```
/// use gdot::walk::SkipSet;
/// use std::ffi::OsStr;
///
/// let skip = SkipSet::default().with_names(["node_modules"]);
/// assert!(skip.contains(OsStr::new(".git")));
/// assert!(skip.contains(OsStr::new("node_modules")));
/// assert!(!skip.contains(OsStr::new(".bashrc")));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkipSet(BTreeSet<OsString>);

impl SkipSet {
    /// Names skipped on every run.
    pub const DEFAULT_NAMES: [&'static str; 2] = [".git", ".gitignore"];

    /// A skip set holding no names at all.
    #[must_use]
    pub const fn empty() -> Self {
        Self(BTreeSet::new())
    }

    /// Add `names` to the set.
    #[must_use]
    pub fn with_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.0.extend(names.into_iter().map(Into::into));
        self
    }

    /// Returns `true` if entries called `name` are skipped.
    #[must_use]
    pub fn contains(&self, name: &OsStr) -> bool {
        self.0.contains(name)
    }
}

impl Default for SkipSet {
    fn default() -> Self {
        Self::empty().with_names(Self::DEFAULT_NAMES)
    }
}

/// What a visited entry is, as far as mirroring cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// A real directory; replicated as a directory.
    Directory,
    /// Anything else (regular file, symlink, socket, ...); linked.
    Other,
}

/// A single node of the source tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Path of the node as reached from the source root.
    pub path: PathBuf,
    /// Path of the node relative to the source root.
    pub relative: PathBuf,
    /// Directory or not.
    pub kind: EntryKind,
}

impl Entry {
    /// Build an entry from its parts.
    #[must_use]
    pub const fn new(path: PathBuf, relative: PathBuf, kind: EntryKind) -> Self {
        Self {
            path,
            relative,
            kind,
        }
    }

    /// Where this entry lands under `target_root`.
    ///
    /// ```
    /// use gdot::walk::{Entry, EntryKind};
    /// use std::path::{Path, PathBuf};
    ///
    /// let entry = Entry::new(
    ///     PathBuf::from("/dotfiles/foo/bar.txt"),
    ///     PathBuf::from("foo/bar.txt"),
    ///     EntryKind::Other,
    /// );
    /// assert_eq!(
    ///     entry.target_in(Path::new("/home/u")),
    ///     Path::new("/home/u").join("foo/bar.txt")
    /// );
    /// ```
    #[must_use]
    pub fn target_in(&self, target_root: &Path) -> PathBuf {
        target_root.join(&self.relative)
    }
}

/// Iterator over the mirrorable entries of a source tree.
///
/// Finite and single-pass: once exhausted (or after yielding an error the
/// caller stops on) it is not restarted.
#[derive(Debug)]
pub struct TreeWalker {
    root: PathBuf,
    skip: SkipSet,
    inner: walkdir::IntoIter,
}

impl TreeWalker {
    /// Start walking `root`.  Nothing touches the filesystem until the
    /// first call to [`Iterator::next`].
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, skip: SkipSet) -> Self {
        let root = root.into();
        let inner = walkdir::WalkDir::new(&root)
            .min_depth(1)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter();
        Self { root, skip, inner }
    }

    fn to_entry(&self, dent: &walkdir::DirEntry) -> Result<Entry, MirrorError> {
        let relative = dent
            .path()
            .strip_prefix(&self.root)
            .map_err(|_| MirrorError::Path {
                path: dent.path().to_path_buf(),
                root: self.root.clone(),
            })?;
        let kind = if dent.file_type().is_dir() {
            EntryKind::Directory
        } else {
            EntryKind::Other
        };
        Ok(Entry::new(
            dent.path().to_path_buf(),
            relative.to_path_buf(),
            kind,
        ))
    }
}

impl Iterator for TreeWalker {
    type Item = Result<Entry, MirrorError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let dent = match self.inner.next()? {
                Ok(dent) => dent,
                Err(source) => {
                    let path = source
                        .path()
                        .map_or_else(|| self.root.clone(), Path::to_path_buf);
                    return Some(Err(MirrorError::Walk { path, source }));
                }
            };

            if self.skip.contains(dent.file_name()) {
                if dent.file_type().is_dir() {
                    self.inner.skip_current_dir();
                }
                continue;
            }

            return Some(self.to_entry(&dent));
        }
    }
}
