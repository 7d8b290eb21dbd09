//! Dotfile linking engine.
//!
//! Mirrors a source tree (normally the working directory) into a target
//! tree (normally `$HOME`): directories are replicated as real directories,
//! everything else becomes a symlink pointing back into the source.
//!
//! The public API is organised into small layers:
//!
//! - **[`roots`]**: resolve the source and target roots once, up front
//! - **[`walk`]**: lazy, sorted traversal of the source tree with skip rules
//! - **[`operations`]**: the target-side filesystem contract (injectable)
//! - **[`mirror`](mod@mirror)**: consume the traversal and act on each entry
//! - **[`logging`]**: console and file output via `tracing`
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod cli;
pub mod error;
pub mod logging;
pub mod mirror;
pub mod operations;
pub mod roots;
pub mod walk;

pub use error::MirrorError;
pub use mirror::{CollisionPolicy, Mirror, MirrorOptions, MirrorSummary, mirror};
pub use roots::Roots;
