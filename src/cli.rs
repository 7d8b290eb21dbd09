//! Command-line surface: a single flat command with no subcommands.
use std::path::PathBuf;

use clap::Parser;

use crate::mirror::{CollisionPolicy, MirrorOptions};
use crate::walk::SkipSet;

/// Command-line entry point for gdot.
#[derive(Parser, Debug)]
#[command(
    name = "gdot",
    about = "Creates symlinks for files and directories within the current working directory to the user's home directory",
    version = option_env!("GDOT_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"))
)]
pub struct Cli {
    /// Perform a dry run without creating symlinks
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Report every existing target and keep linking the rest instead of
    /// stopping at the first one
    #[arg(short, long)]
    pub keep_going: bool,

    /// Additional file or directory names to leave out (.git and .gitignore
    /// are always left out)
    #[arg(long, value_delimiter = ',', value_name = "NAME")]
    pub exclude: Vec<String>,

    /// Also write a timestamped log of the run (debug lines included) to PATH
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    /// Translate the parsed flags into mirror options.
    #[must_use]
    pub fn mirror_options(&self) -> MirrorOptions {
        MirrorOptions {
            dry_run: self.dry_run,
            skip: SkipSet::default().with_names(self.exclude.iter().map(String::as_str)),
            collisions: if self.keep_going {
                CollisionPolicy::Continue
            } else {
                CollisionPolicy::Abort
            },
        }
    }
}
