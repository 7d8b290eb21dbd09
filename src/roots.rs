//! Source and target roots, resolved once at the program boundary.
use std::path::{Path, PathBuf};

use crate::error::MirrorError;

/// The two trees a mirror run operates on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Roots {
    /// Tree being mirrored (the working directory at invocation time).
    pub source: PathBuf,
    /// Tree receiving directories and links (the user's home directory).
    pub target: PathBuf,
}

impl Roots {
    /// Build roots from explicit paths.
    #[must_use]
    pub const fn new(source: PathBuf, target: PathBuf) -> Self {
        Self { source, target }
    }

    /// Resolve the source root from the current working directory and the
    /// target root from the user's home directory.
    ///
    /// # Errors
    ///
    /// Returns [`MirrorError::Environment`] if either directory cannot be
    /// determined.
    pub fn resolve() -> Result<Self, MirrorError> {
        let cwd = std::env::current_dir().map_err(|e| MirrorError::Environment {
            what: "current working directory",
            source: Some(e),
        })?;
        let home = dirs::home_dir().ok_or(MirrorError::Environment {
            what: "home directory",
            source: None,
        })?;
        Ok(Self::new(simplify(&cwd), home))
    }
}

/// Strip the `\\?\` verbatim prefix Windows may put on the working directory
/// so link targets and messages stay readable.  A no-op elsewhere.
fn simplify(path: &Path) -> PathBuf {
    dunce::simplified(path).to_path_buf()
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn resolve_uses_current_dir_as_source() {
        let roots = Roots::resolve().unwrap();
        let cwd = std::env::current_dir().unwrap();
        assert_eq!(roots.source, simplify(&cwd));
        assert!(roots.source.is_absolute());
    }

    #[test]
    fn resolve_uses_home_dir_as_target() {
        let roots = Roots::resolve().unwrap();
        assert_eq!(Some(roots.target), dirs::home_dir());
    }

    #[test]
    fn simplify_keeps_plain_paths() {
        assert_eq!(simplify(Path::new("/home/u")), PathBuf::from("/home/u"));
    }
}
