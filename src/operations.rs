//! Filesystem operation abstractions for dependency injection.
//!
//! Provides the [`FileSystemOps`] trait so that the mirror walk can be
//! unit-tested without touching the real target tree.  Production code uses
//! [`SystemFileSystemOps`]; tests use `MockFileSystemOps`.

use std::io;
use std::path::Path;

/// The write side of the filesystem contract consumed by the mirror walk.
///
/// Reading the source tree goes through [`crate::walk::TreeWalker`]; this
/// trait only covers what happens on the target side.
pub trait FileSystemOps: Send + Sync + std::fmt::Debug {
    /// Create `path` and every missing ancestor.
    ///
    /// Succeeds when the directory already exists.
    ///
    /// # Errors
    ///
    /// Returns an error if any component cannot be created.
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Returns `true` if anything occupies `path`, without following a
    /// symlink at `path` (a dangling symlink counts as present).
    fn symlink_exists(&self, path: &Path) -> bool;

    /// Create a symbolic link at `link` pointing to `source`.
    ///
    /// # Errors
    ///
    /// Returns an error if the link cannot be created, including when
    /// `link` is already occupied.
    fn symlink(&self, source: &Path, link: &Path) -> io::Result<()>;
}

/// Production [`FileSystemOps`] implementation that delegates to [`std::fs`].
#[derive(Debug, Default)]
pub struct SystemFileSystemOps;

impl FileSystemOps for SystemFileSystemOps {
    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        std::fs::create_dir_all(path)
    }

    fn symlink_exists(&self, path: &Path) -> bool {
        path.symlink_metadata().is_ok()
    }

    fn symlink(&self, source: &Path, link: &Path) -> io::Result<()> {
        create_symlink(source, link)
    }
}

#[cfg(unix)]
fn create_symlink(source: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(source, link)
}

/// Windows needs to know up front whether the link points at a directory.
#[cfg(windows)]
fn create_symlink(source: &Path, link: &Path) -> io::Result<()> {
    if source.is_dir() {
        std::os::windows::fs::symlink_dir(source, link)
    } else {
        std::os::windows::fs::symlink_file(source, link)
    }
}

/// Mock [`FileSystemOps`] for unit tests.
///
/// Pre-configure occupied paths and failure points with the builder-style
/// methods; every successful call is recorded so tests can assert on the
/// exact sequence of side effects.
///
/// # Example
///
/// ```ignore
/// use gdot::operations::MockFileSystemOps;
///
/// let fs = MockFileSystemOps::new()
///     .with_existing("/home/u/.bashrc")
///     .failing_dir("/home/u/locked");
/// ```
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MockFileSystemOps {
    existing: std::sync::Mutex<std::collections::HashSet<std::path::PathBuf>>,
    failing_dirs: Vec<std::path::PathBuf>,
    failing_links: Vec<std::path::PathBuf>,
    calls: std::sync::Mutex<Vec<MockCall>>,
}

/// A side effect recorded by [`MockFileSystemOps`].
#[cfg(test)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    /// `create_dir_all(path)` succeeded.
    CreateDir(std::path::PathBuf),
    /// `symlink(source, link)` succeeded.
    Symlink {
        /// Link target.
        source: std::path::PathBuf,
        /// Link path.
        link: std::path::PathBuf,
    },
}

#[cfg(test)]
impl MockFileSystemOps {
    /// Create an empty mock with nothing configured.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `path` as already occupied.
    #[must_use]
    pub fn with_existing(self, path: impl Into<std::path::PathBuf>) -> Self {
        self.lock_existing().insert(path.into());
        self
    }

    /// Make `create_dir_all(path)` fail with `PermissionDenied`.
    #[must_use]
    pub fn failing_dir(mut self, path: impl Into<std::path::PathBuf>) -> Self {
        self.failing_dirs.push(path.into());
        self
    }

    /// Make `symlink(_, link)` fail with `PermissionDenied`.
    #[must_use]
    pub fn failing_link(mut self, link: impl Into<std::path::PathBuf>) -> Self {
        self.failing_links.push(link.into());
        self
    }

    /// Return every recorded side effect in call order.
    #[must_use]
    pub fn calls(&self) -> Vec<MockCall> {
        self.calls
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    fn lock_existing(
        &self,
    ) -> std::sync::MutexGuard<'_, std::collections::HashSet<std::path::PathBuf>> {
        self.existing
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn record(&self, call: MockCall) {
        self.calls
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(call);
    }
}

#[cfg(test)]
impl FileSystemOps for MockFileSystemOps {
    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        if self.failing_dirs.iter().any(|p| p == path) {
            return Err(io::Error::from(io::ErrorKind::PermissionDenied));
        }
        self.lock_existing().insert(path.to_path_buf());
        self.record(MockCall::CreateDir(path.to_path_buf()));
        Ok(())
    }

    fn symlink_exists(&self, path: &Path) -> bool {
        self.lock_existing().contains(path)
    }

    fn symlink(&self, source: &Path, link: &Path) -> io::Result<()> {
        if self.failing_links.iter().any(|p| p == link) {
            return Err(io::Error::from(io::ErrorKind::PermissionDenied));
        }
        if !self.lock_existing().insert(link.to_path_buf()) {
            return Err(io::Error::from(io::ErrorKind::AlreadyExists));
        }
        self.record(MockCall::Symlink {
            source: source.to_path_buf(),
            link: link.to_path_buf(),
        });
        Ok(())
    }
}
