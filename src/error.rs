//! Error taxonomy for the mirror walk.
//!
//! Library code returns [`MirrorError`]; the binary converts it to
//! [`anyhow::Error`] at the `main` boundary via the standard `?` operator.
//!
//! # Error hierarchy
//!
//! ```text
//! MirrorError
//! ├── Environment     working or home directory unavailable
//! ├── Path            relative path could not be computed
//! ├── Walk            directory listing failed
//! ├── DirectoryCreate create_dir_all failed
//! ├── TargetExists    something already lives at the link path
//! ├── LinkCreate      symlink syscall failed
//! └── Conflicts       keep-going run finished with conflicts
//! ```

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort a mirror run.
#[derive(Error, Debug)]
pub enum MirrorError {
    /// The working directory or the home directory could not be resolved.
    #[error("cannot resolve {what}")]
    Environment {
        /// Which root failed (`"current working directory"` or `"home directory"`).
        what: &'static str,
        /// Underlying I/O error, when the platform reported one.
        #[source]
        source: Option<io::Error>,
    },

    /// A visited entry does not live under the source root.
    #[error("failed to get relative path of {} under {}", path.display(), root.display())]
    Path {
        /// Entry that was visited.
        path: PathBuf,
        /// Source root it was expected to live under.
        root: PathBuf,
    },

    /// Listing the source tree failed.
    #[error("failed to read source tree at {}", path.display())]
    Walk {
        /// Path being read when the failure occurred.
        path: PathBuf,
        /// Underlying walk error.
        #[source]
        source: walkdir::Error,
    },

    /// A target directory could not be created.
    #[error("failed to create directory {}", path.display())]
    DirectoryCreate {
        /// Directory that could not be created.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The link path is already occupied by a file, directory or symlink.
    #[error("target already exists: {}", path.display())]
    TargetExists {
        /// The occupied link path.
        path: PathBuf,
    },

    /// The symlink itself could not be created.
    #[error("failed to create symlink {} -> {}", link.display(), source_path.display())]
    LinkCreate {
        /// Path where the link was to be created.
        link: PathBuf,
        /// Path the link was to point at.
        source_path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// A keep-going run left one or more targets untouched because they
    /// already existed.
    #[error("{} target(s) already exist: {}", paths.len(), display_paths(paths))]
    Conflicts {
        /// Every conflicting link path, in traversal order.
        paths: Vec<PathBuf>,
    },
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use std::error::Error as StdError;

    #[test]
    fn environment_display() {
        let e = MirrorError::Environment {
            what: "home directory",
            source: None,
        };
        assert_eq!(e.to_string(), "cannot resolve home directory");
        assert!(e.source().is_none());
    }

    #[test]
    fn environment_keeps_io_source() {
        let e = MirrorError::Environment {
            what: "current working directory",
            source: Some(io::Error::new(io::ErrorKind::NotFound, "gone")),
        };
        assert!(e.source().is_some());
    }

    #[test]
    fn path_display_names_both_paths() {
        let e = MirrorError::Path {
            path: PathBuf::from("/elsewhere/file"),
            root: PathBuf::from("/dotfiles"),
        };
        assert!(e.to_string().contains("/elsewhere/file"));
        assert!(e.to_string().contains("/dotfiles"));
    }

    #[test]
    fn directory_create_display() {
        let e = MirrorError::DirectoryCreate {
            path: PathBuf::from("/home/u/.config"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(e.to_string(), "failed to create directory /home/u/.config");
        assert!(e.source().is_some());
    }

    #[test]
    fn target_exists_display() {
        let e = MirrorError::TargetExists {
            path: PathBuf::from("/home/u/foo/bar.txt"),
        };
        assert_eq!(e.to_string(), "target already exists: /home/u/foo/bar.txt");
    }

    #[test]
    fn link_create_display() {
        let e = MirrorError::LinkCreate {
            link: PathBuf::from("/home/u/.bashrc"),
            source_path: PathBuf::from("/dotfiles/.bashrc"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(
            e.to_string(),
            "failed to create symlink /home/u/.bashrc -> /dotfiles/.bashrc"
        );
        assert!(e.source().is_some());
    }

    #[test]
    fn conflicts_display_lists_every_path() {
        let e = MirrorError::Conflicts {
            paths: vec![PathBuf::from("/h/a"), PathBuf::from("/h/b")],
        };
        assert_eq!(e.to_string(), "2 target(s) already exist: /h/a, /h/b");
    }

    #[test]
    fn converts_to_anyhow() {
        let e = MirrorError::TargetExists {
            path: PathBuf::from("x"),
        };
        let _anyhow_err: anyhow::Error = e.into();
    }

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn mirror_error_is_send_sync() {
        assert_send_sync::<MirrorError>();
    }
}
