//! The mirror walk: replicate directories and link files into the target tree.
//!
//! For every entry produced by a [`TreeWalker`] the walk computes
//! `target = target_root / relative` and then:
//!
//! - **directory**: `create_dir_all(target)`; pre-existing directories are fine.
//! - **anything else**: make sure the parent exists, refuse if something
//!   already occupies `target` (checked without following symlinks), and
//!   otherwise create a symlink `target -> source`.
//!
//! A dry run reports each of those actions and performs none of them.
//! Every failure is a hard stop except target collisions under
//! [`CollisionPolicy::Continue`], which are collected and reported at the end.
use std::path::{Path, PathBuf};

use crate::error::MirrorError;
use crate::logging::Log;
use crate::operations::FileSystemOps;
use crate::roots::Roots;
use crate::walk::{Entry, EntryKind, SkipSet, TreeWalker};

/// What to do when a link path is already occupied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CollisionPolicy {
    /// Stop the whole run at the first occupied target.
    #[default]
    Abort,
    /// Leave occupied targets alone, keep linking everything else, and fail
    /// at the end with the full list of conflicts.
    Continue,
}

/// Knobs for a single mirror run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MirrorOptions {
    /// Report actions instead of performing them.
    pub dry_run: bool,
    /// Base names that are neither mirrored nor descended into.
    pub skip: SkipSet,
    /// Behaviour on occupied link paths.
    pub collisions: CollisionPolicy,
}

/// Tally of what a run did (or, for a dry run, would have done).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MirrorSummary {
    /// Directories created or ensured.
    pub directories: usize,
    /// Symlinks created.
    pub links: usize,
    /// Occupied link paths left untouched (keep-going runs only).
    pub conflicts: Vec<PathBuf>,
}

/// Mirror `roots.source` into `roots.target`.
///
/// # Errors
///
/// Returns the first hard-stop [`MirrorError`]; see [`Mirror::apply`].
pub fn mirror(
    roots: &Roots,
    options: &MirrorOptions,
    fs: &dyn FileSystemOps,
    log: &dyn Log,
) -> Result<MirrorSummary, MirrorError> {
    Mirror::new(roots, options, fs, log).run()
}

/// A configured mirror run.
pub struct Mirror<'a> {
    roots: &'a Roots,
    options: &'a MirrorOptions,
    fs: &'a dyn FileSystemOps,
    log: &'a dyn Log,
}

impl std::fmt::Debug for Mirror<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mirror")
            .field("roots", &self.roots)
            .field("options", &self.options)
            .field("fs", &self.fs)
            .field("log", &"<dyn Log>")
            .finish()
    }
}

impl<'a> Mirror<'a> {
    /// Bundle everything a run needs.
    #[must_use]
    pub const fn new(
        roots: &'a Roots,
        options: &'a MirrorOptions,
        fs: &'a dyn FileSystemOps,
        log: &'a dyn Log,
    ) -> Self {
        Self {
            roots,
            options,
            fs,
            log,
        }
    }

    /// Walk the source root and mirror every entry.
    ///
    /// # Errors
    ///
    /// Returns the first hard-stop [`MirrorError`]; see [`Mirror::apply`].
    pub fn run(&self) -> Result<MirrorSummary, MirrorError> {
        self.apply(TreeWalker::new(
            self.roots.source.clone(),
            self.options.skip.clone(),
        ))
    }

    /// Mirror a sequence of entries, in order.
    ///
    /// The sequence is consumed once.  Entries with an empty relative path
    /// (the source root itself) are ignored.
    ///
    /// # Errors
    ///
    /// Stops at and returns the first error yielded by `entries`, or:
    /// - [`MirrorError::DirectoryCreate`] if a target directory (or a link's
    ///   parent) cannot be created,
    /// - [`MirrorError::TargetExists`] if a link path is occupied and the
    ///   policy is [`CollisionPolicy::Abort`],
    /// - [`MirrorError::LinkCreate`] if the symlink cannot be created,
    /// - [`MirrorError::Conflicts`] after the walk if the policy is
    ///   [`CollisionPolicy::Continue`] and any link path was occupied.
    pub fn apply<I>(&self, entries: I) -> Result<MirrorSummary, MirrorError>
    where
        I: IntoIterator<Item = Result<Entry, MirrorError>>,
    {
        let mut summary = MirrorSummary::default();

        for entry in entries {
            let entry = entry?;
            if entry.relative.as_os_str().is_empty() {
                continue;
            }
            let target = entry.target_in(&self.roots.target);
            match entry.kind {
                EntryKind::Directory => self.mirror_dir(&target, &mut summary)?,
                EntryKind::Other => self.mirror_file(&entry.path, &target, &mut summary)?,
            }
        }

        let verb = if self.options.dry_run {
            "would be created"
        } else {
            "created"
        };
        self.log.debug(&format!(
            "{} directories, {} symlinks {verb}",
            summary.directories, summary.links
        ));

        if summary.conflicts.is_empty() {
            Ok(summary)
        } else {
            Err(MirrorError::Conflicts {
                paths: summary.conflicts,
            })
        }
    }

    fn mirror_dir(&self, target: &Path, summary: &mut MirrorSummary) -> Result<(), MirrorError> {
        if self.options.dry_run {
            self.log.dry_run(&format!(
                "Directory would be created: {}",
                target.display()
            ));
        } else {
            self.ensure_dir(target)?;
            self.log
                .info(&format!("Directory created: {}", target.display()));
        }
        summary.directories += 1;
        Ok(())
    }

    fn mirror_file(
        &self,
        source: &Path,
        target: &Path,
        summary: &mut MirrorSummary,
    ) -> Result<(), MirrorError> {
        if self.options.dry_run {
            self.log.dry_run(&format!(
                "Symlink would be created: {} -> {}",
                target.display(),
                source.display()
            ));
            summary.links += 1;
            return Ok(());
        }

        if let Some(parent) = target.parent() {
            self.ensure_dir(parent)?;
        }

        if self.fs.symlink_exists(target) {
            return match self.options.collisions {
                CollisionPolicy::Abort => Err(MirrorError::TargetExists {
                    path: target.to_path_buf(),
                }),
                CollisionPolicy::Continue => {
                    self.log
                        .warn(&format!("target already exists: {}", target.display()));
                    summary.conflicts.push(target.to_path_buf());
                    Ok(())
                }
            };
        }

        self.fs
            .symlink(source, target)
            .map_err(|e| MirrorError::LinkCreate {
                link: target.to_path_buf(),
                source_path: source.to_path_buf(),
                source: e,
            })?;
        self.log.info(&format!(
            "Symlink created: {} -> {}",
            target.display(),
            source.display()
        ));
        summary.links += 1;
        Ok(())
    }

    fn ensure_dir(&self, path: &Path) -> Result<(), MirrorError> {
        self.fs
            .create_dir_all(path)
            .map_err(|e| MirrorError::DirectoryCreate {
                path: path.to_path_buf(),
                source: e,
            })
    }
}

#[cfg(test)]
#[allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::panic
)]
mod tests {
    use super::*;
    use crate::logging::{BufferedLog, Level};
    use crate::operations::{MockCall, MockFileSystemOps, SystemFileSystemOps};

    fn roots() -> Roots {
        Roots::new(PathBuf::from("/dotfiles"), PathBuf::from("/home/u"))
    }

    fn dir(relative: &str) -> Result<Entry, MirrorError> {
        Ok(Entry::new(
            Path::new("/dotfiles").join(relative),
            PathBuf::from(relative),
            EntryKind::Directory,
        ))
    }

    fn file(relative: &str) -> Result<Entry, MirrorError> {
        Ok(Entry::new(
            Path::new("/dotfiles").join(relative),
            PathBuf::from(relative),
            EntryKind::Other,
        ))
    }

    fn real() -> MirrorOptions {
        MirrorOptions::default()
    }

    fn dry() -> MirrorOptions {
        MirrorOptions {
            dry_run: true,
            ..MirrorOptions::default()
        }
    }

    fn keep_going() -> MirrorOptions {
        MirrorOptions {
            collisions: CollisionPolicy::Continue,
            ..MirrorOptions::default()
        }
    }

    fn link(source: &str, link: &str) -> MockCall {
        MockCall::Symlink {
            source: source.into(),
            link: link.into(),
        }
    }

    // -----------------------------------------------------------------------
    // Real runs against the mock filesystem
    // -----------------------------------------------------------------------

    #[test]
    fn directory_then_file_creates_dir_and_link() {
        let (roots, opts) = (roots(), real());
        let (fs, log) = (MockFileSystemOps::new(), BufferedLog::new());

        let summary = Mirror::new(&roots, &opts, &fs, &log)
            .apply([dir("foo"), file("foo/bar.txt")])
            .unwrap();

        assert_eq!(
            fs.calls(),
            vec![
                MockCall::CreateDir("/home/u/foo".into()),
                MockCall::CreateDir("/home/u/foo".into()),
                link("/dotfiles/foo/bar.txt", "/home/u/foo/bar.txt"),
            ]
        );
        assert_eq!(
            log.messages(Level::Info),
            vec![
                "Directory created: /home/u/foo",
                "Symlink created: /home/u/foo/bar.txt -> /dotfiles/foo/bar.txt",
            ]
        );
        assert_eq!(summary.directories, 1);
        assert_eq!(summary.links, 1);
        assert!(summary.conflicts.is_empty());
    }

    #[test]
    fn target_path_is_target_root_joined_with_relative() {
        let (roots, opts) = (roots(), real());
        let (fs, log) = (MockFileSystemOps::new(), BufferedLog::new());

        Mirror::new(&roots, &opts, &fs, &log)
            .apply([file(".config/nvim/init.lua")])
            .unwrap();

        assert!(fs.calls().contains(&link(
            "/dotfiles/.config/nvim/init.lua",
            "/home/u/.config/nvim/init.lua"
        )));
    }

    #[test]
    fn mapping_does_not_depend_on_order() {
        let (roots, opts) = (roots(), real());
        let forward = MockFileSystemOps::new();
        let backward = MockFileSystemOps::new();
        let log = BufferedLog::new();

        Mirror::new(&roots, &opts, &forward, &log)
            .apply([file("a"), file("b")])
            .unwrap();
        Mirror::new(&roots, &opts, &backward, &log)
            .apply([file("b"), file("a")])
            .unwrap();

        let links = |fs: &MockFileSystemOps| {
            let mut calls: Vec<MockCall> = fs
                .calls()
                .into_iter()
                .filter(|c| matches!(c, MockCall::Symlink { .. }))
                .collect();
            calls.sort_by_key(|c| format!("{c:?}"));
            calls
        };
        assert_eq!(links(&forward), links(&backward));
    }

    #[test]
    fn parent_directory_is_created_for_file() {
        let (roots, opts) = (roots(), real());
        let (fs, log) = (MockFileSystemOps::new(), BufferedLog::new());

        Mirror::new(&roots, &opts, &fs, &log)
            .apply([file("deep/er/file")])
            .unwrap();

        assert_eq!(fs.calls()[0], MockCall::CreateDir("/home/u/deep/er".into()));
    }

    #[test]
    fn root_entry_is_ignored() {
        let (roots, opts) = (roots(), real());
        let (fs, log) = (MockFileSystemOps::new(), BufferedLog::new());

        let summary = Mirror::new(&roots, &opts, &fs, &log)
            .apply([dir("")])
            .unwrap();

        assert!(fs.calls().is_empty());
        assert!(log.messages(Level::Info).is_empty());
        assert_eq!(summary, MirrorSummary::default());
    }

    #[test]
    fn existing_target_aborts_whole_run() {
        let (roots, opts) = (roots(), real());
        let fs = MockFileSystemOps::new().with_existing("/home/u/a");
        let log = BufferedLog::new();

        let err = Mirror::new(&roots, &opts, &fs, &log)
            .apply([file("a"), file("b")])
            .unwrap_err();

        assert!(
            matches!(&err, MirrorError::TargetExists { path } if path == Path::new("/home/u/a")),
            "got {err:?}"
        );
        assert!(
            !fs.calls()
                .iter()
                .any(|c| matches!(c, MockCall::Symlink { .. })),
            "nothing may be linked after the first collision"
        );
    }

    #[test]
    fn keep_going_links_the_rest_and_reports_every_conflict() {
        let (roots, opts) = (roots(), keep_going());
        let fs = MockFileSystemOps::new()
            .with_existing("/home/u/a")
            .with_existing("/home/u/c");
        let log = BufferedLog::new();

        let err = Mirror::new(&roots, &opts, &fs, &log)
            .apply([file("a"), file("b"), file("c")])
            .unwrap_err();

        match err {
            MirrorError::Conflicts { paths } => assert_eq!(
                paths,
                vec![PathBuf::from("/home/u/a"), PathBuf::from("/home/u/c")]
            ),
            other => panic!("expected Conflicts, got {other:?}"),
        }
        assert!(fs.calls().contains(&link("/dotfiles/b", "/home/u/b")));
        assert_eq!(log.messages(Level::Warn).len(), 2);
    }

    #[test]
    fn keep_going_without_conflicts_succeeds() {
        let (roots, opts) = (roots(), keep_going());
        let (fs, log) = (MockFileSystemOps::new(), BufferedLog::new());

        let summary = Mirror::new(&roots, &opts, &fs, &log)
            .apply([file("a")])
            .unwrap();

        assert_eq!(summary.links, 1);
    }

    #[test]
    fn directory_create_failure_aborts() {
        let (roots, opts) = (roots(), real());
        let fs = MockFileSystemOps::new().failing_dir("/home/u/locked");
        let log = BufferedLog::new();

        let err = Mirror::new(&roots, &opts, &fs, &log)
            .apply([dir("locked"), file("later")])
            .unwrap_err();

        assert!(
            matches!(&err, MirrorError::DirectoryCreate { path, .. } if path == Path::new("/home/u/locked")),
            "got {err:?}"
        );
        assert!(fs.calls().is_empty());
    }

    #[test]
    fn parent_create_failure_is_directory_error() {
        let (roots, opts) = (roots(), real());
        let fs = MockFileSystemOps::new().failing_dir("/home/u/locked");
        let log = BufferedLog::new();

        let err = Mirror::new(&roots, &opts, &fs, &log)
            .apply([file("locked/file")])
            .unwrap_err();

        assert!(matches!(err, MirrorError::DirectoryCreate { .. }), "got {err:?}");
    }

    #[test]
    fn link_failure_aborts() {
        let (roots, opts) = (roots(), real());
        let fs = MockFileSystemOps::new().failing_link("/home/u/a");
        let log = BufferedLog::new();

        let err = Mirror::new(&roots, &opts, &fs, &log)
            .apply([file("a"), file("b")])
            .unwrap_err();

        assert!(
            matches!(&err, MirrorError::LinkCreate { link, source_path, .. }
                if link == Path::new("/home/u/a") && source_path == Path::new("/dotfiles/a")),
            "got {err:?}"
        );
        assert!(!fs.calls().contains(&link("/dotfiles/b", "/home/u/b")));
    }

    #[test]
    fn entry_error_stops_the_walk() {
        let (roots, opts) = (roots(), real());
        let (fs, log) = (MockFileSystemOps::new(), BufferedLog::new());
        let escaped = Err(MirrorError::Path {
            path: PathBuf::from("/elsewhere/x"),
            root: PathBuf::from("/dotfiles"),
        });

        let err = Mirror::new(&roots, &opts, &fs, &log)
            .apply([file("a"), escaped, file("b")])
            .unwrap_err();

        assert!(matches!(err, MirrorError::Path { .. }), "got {err:?}");
        assert!(fs.calls().contains(&link("/dotfiles/a", "/home/u/a")));
        assert!(!fs.calls().contains(&link("/dotfiles/b", "/home/u/b")));
    }

    #[test]
    fn tally_is_logged_at_debug() {
        let (roots, opts) = (roots(), real());
        let (fs, log) = (MockFileSystemOps::new(), BufferedLog::new());

        Mirror::new(&roots, &opts, &fs, &log)
            .apply([dir("d"), file("d/a"), file("d/b")])
            .unwrap();

        assert_eq!(
            log.messages(Level::Debug),
            vec!["1 directories, 2 symlinks created"]
        );
    }

    // -----------------------------------------------------------------------
    // Dry runs
    // -----------------------------------------------------------------------

    #[test]
    fn dry_run_reports_without_touching_the_filesystem() {
        let (roots, opts) = (roots(), dry());
        let (fs, log) = (MockFileSystemOps::new(), BufferedLog::new());

        let summary = Mirror::new(&roots, &opts, &fs, &log)
            .apply([dir("sub"), file("file")])
            .unwrap();

        assert!(fs.calls().is_empty());
        assert_eq!(
            log.messages(Level::DryRun),
            vec![
                "Directory would be created: /home/u/sub",
                "Symlink would be created: /home/u/file -> /dotfiles/file",
            ]
        );
        assert!(log.messages(Level::Info).is_empty());
        assert_eq!((summary.directories, summary.links), (1, 1));
    }

    #[test]
    fn dry_run_ignores_existing_targets() {
        let (roots, opts) = (roots(), dry());
        let fs = MockFileSystemOps::new().with_existing("/home/u/a");
        let log = BufferedLog::new();

        Mirror::new(&roots, &opts, &fs, &log)
            .apply([file("a")])
            .unwrap();

        assert_eq!(log.messages(Level::DryRun).len(), 1);
    }

    #[test]
    fn dry_run_tally_uses_conditional_wording() {
        let (roots, opts) = (roots(), dry());
        let (fs, log) = (MockFileSystemOps::new(), BufferedLog::new());

        Mirror::new(&roots, &opts, &fs, &log)
            .apply([file("a")])
            .unwrap();

        assert_eq!(
            log.messages(Level::Debug),
            vec!["0 directories, 1 symlinks would be created"]
        );
    }

    // -----------------------------------------------------------------------
    // Real filesystem
    // -----------------------------------------------------------------------

    #[cfg(unix)]
    #[test]
    fn run_mirrors_a_real_tree() {
        let source = tempfile::tempdir().unwrap();
        let home = tempfile::tempdir().unwrap();
        std::fs::create_dir(source.path().join("foo")).unwrap();
        std::fs::write(source.path().join("foo/bar.txt"), "bar").unwrap();
        std::fs::write(source.path().join(".gitignore"), "*.swp").unwrap();

        let roots = Roots::new(source.path().to_path_buf(), home.path().to_path_buf());
        let log = BufferedLog::new();
        let summary = mirror(&roots, &real(), &SystemFileSystemOps, &log).unwrap();

        let link_path = home.path().join("foo/bar.txt");
        assert!(home.path().join("foo").is_dir());
        assert_eq!(
            std::fs::read_link(&link_path).unwrap(),
            source.path().join("foo/bar.txt")
        );
        assert!(!home.path().join(".gitignore").exists());
        assert_eq!((summary.directories, summary.links), (1, 1));
        assert_eq!(log.messages(Level::Info).len(), 2);
    }

    #[cfg(unix)]
    #[test]
    fn run_refuses_existing_dangling_symlink() {
        let source = tempfile::tempdir().unwrap();
        let home = tempfile::tempdir().unwrap();
        std::fs::write(source.path().join(".bashrc"), "").unwrap();
        let occupied = home.path().join(".bashrc");
        std::os::unix::fs::symlink("/nonexistent", &occupied).unwrap();

        let roots = Roots::new(source.path().to_path_buf(), home.path().to_path_buf());
        let err = mirror(&roots, &real(), &SystemFileSystemOps, &BufferedLog::new()).unwrap_err();

        assert!(matches!(err, MirrorError::TargetExists { .. }), "got {err:?}");
        assert_eq!(
            std::fs::read_link(&occupied).unwrap(),
            PathBuf::from("/nonexistent")
        );
    }
}
