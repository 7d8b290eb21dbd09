// Shared helpers for integration tests.
//
// Provides a pair of temporary directories standing in for a dotfiles
// checkout and a home directory, plus a fluent builder so each test can lay
// out its trees without repeating filesystem boilerplate.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::path::Path;

use gdot::roots::Roots;

/// An isolated source/target pair backed by [`tempfile::TempDir`]s.
///
/// Both directories are deleted when the context is dropped.
pub struct IntegrationTestContext {
    /// Temporary directory playing the dotfiles checkout.
    pub source: tempfile::TempDir,
    /// Temporary directory playing `$HOME`.
    pub home: tempfile::TempDir,
}

impl IntegrationTestContext {
    /// Create a context with two empty trees.
    pub fn new() -> Self {
        Self {
            source: tempfile::tempdir().expect("create source dir"),
            home: tempfile::tempdir().expect("create home dir"),
        }
    }

    /// Path to the source root.
    pub fn source_path(&self) -> &Path {
        self.source.path()
    }

    /// Path to the target root.
    pub fn home_path(&self) -> &Path {
        self.home.path()
    }

    /// Roots pointing at this context's trees.
    pub fn roots(&self) -> Roots {
        Roots::new(self.source.path().to_path_buf(), self.home.path().to_path_buf())
    }

    /// Every path under the home tree, relative and `/`-separated, sorted,
    /// with a trailing `/` on real directories and `@` on symlinks.
    pub fn home_listing(&self) -> Vec<String> {
        listing(self.home.path())
    }
}

/// Sorted listing of `root` in the format described on
/// [`IntegrationTestContext::home_listing`].
pub fn listing(root: &Path) -> Vec<String> {
    let mut out: Vec<String> = walkdir::WalkDir::new(root)
        .min_depth(1)
        .follow_links(false)
        .into_iter()
        .map(|e| {
            let e = e.expect("walk tree");
            let rel = e
                .path()
                .strip_prefix(root)
                .expect("strip root")
                .to_string_lossy()
                .replace('\\', "/");
            let ft = e.file_type();
            if ft.is_symlink() {
                format!("{rel}@")
            } else if ft.is_dir() {
                format!("{rel}/")
            } else {
                rel
            }
        })
        .collect();
    out.sort();
    out
}

/// Fluent builder for [`IntegrationTestContext`].
pub struct TestContextBuilder {
    ctx: IntegrationTestContext,
}

impl TestContextBuilder {
    /// Begin building a new context with empty trees.
    pub fn new() -> Self {
        Self {
            ctx: IntegrationTestContext::new(),
        }
    }

    /// Write `content` to `rel` inside the source tree, creating parents.
    pub fn with_file(self, rel: &str, content: &str) -> Self {
        write_file(&self.ctx.source.path().join(rel), content);
        self
    }

    /// Create the directory `rel` inside the source tree.
    pub fn with_dir(self, rel: &str) -> Self {
        std::fs::create_dir_all(self.ctx.source.path().join(rel)).expect("create source dir");
        self
    }

    /// Write `content` to `rel` inside the home tree, creating parents.
    pub fn with_home_file(self, rel: &str, content: &str) -> Self {
        write_file(&self.ctx.home.path().join(rel), content);
        self
    }

    /// Create the directory `rel` inside the home tree.
    pub fn with_home_dir(self, rel: &str) -> Self {
        std::fs::create_dir_all(self.ctx.home.path().join(rel)).expect("create home dir");
        self
    }

    /// Finish building and return the configured context.
    pub fn build(self) -> IntegrationTestContext {
        self.ctx
    }
}

fn write_file(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create parent dir");
    }
    std::fs::write(path, content).expect("write file");
}
