//! `gdot` command-line entry point.

use std::process::ExitCode;

use anyhow::{Context as _, Result};
use clap::Parser;

use gdot::cli::Cli;
use gdot::logging::{self, Logger};
use gdot::operations::SystemFileSystemOps;
use gdot::roots::Roots;

fn main() -> ExitCode {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = Cli::parse();
    let file_ok = logging::init_subscriber(args.verbose, args.log_file.as_deref());
    let log = Logger::new(if file_ok { args.log_file.clone() } else { None });
    if !file_ok
        && let Some(path) = &args.log_file
    {
        log.warn(&format!("cannot write log file {}", path.display()));
    }

    match run(&args, &log) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log.error(&format!("{e:#}"));
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Cli, log: &Logger) -> Result<()> {
    let version = option_env!("GDOT_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"));
    log.debug(&format!("gdot {version}"));

    let roots = Roots::resolve()?;
    log.debug(&format!("source: {}", roots.source.display()));
    log.debug(&format!("target: {}", roots.target.display()));
    if let Some(path) = log.log_path() {
        log.debug(&format!("log: {}", path.display()));
    }

    let options = args.mirror_options();
    gdot::mirror(&roots, &options, &SystemFileSystemOps, log)
        .context("failed to create symlinks")?;
    Ok(())
}
