#![cfg(unix)]
#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::wildcard_imports,
    clippy::indexing_slicing
)]
//! End-to-end tests for the `gdot` binary.
//!
//! Each test runs the compiled binary with its working directory set to a
//! temporary source tree and `HOME` pointed at a temporary home tree, then
//! checks the exit status, the console transcript, and the resulting tree.

mod common;

use std::process::{Command, Output};

use common::{IntegrationTestContext, TestContextBuilder};

/// Run `gdot` inside `ctx` with `HOME` as the only location hint, so any
/// file the binary writes on its own would show up in the home tree.
fn run_gdot(ctx: &IntegrationTestContext, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_gdot"))
        .args(args)
        .current_dir(ctx.source_path())
        .env("HOME", ctx.home_path())
        .env_remove("XDG_CACHE_HOME")
        .env_remove("XDG_STATE_HOME")
        .output()
        .expect("spawn gdot")
}

fn stdout(out: &Output) -> String {
    String::from_utf8_lossy(&out.stdout).into_owned()
}

fn stderr(out: &Output) -> String {
    String::from_utf8_lossy(&out.stderr).into_owned()
}

/// Replace the temporary roots in `text` with `<src>` and `<home>`.
fn normalize(ctx: &IntegrationTestContext, text: &str) -> String {
    let source = std::fs::canonicalize(ctx.source_path()).unwrap();
    text.replace(&source.display().to_string(), "<src>")
        .replace(&ctx.source_path().display().to_string(), "<src>")
        .replace(&ctx.home_path().display().to_string(), "<home>")
}

// ---------------------------------------------------------------------------
// Successful runs
// ---------------------------------------------------------------------------

#[test]
fn install_exits_zero_and_links_files() {
    let ctx = TestContextBuilder::new()
        .with_file("foo/bar.txt", "bar")
        .with_file(".gitignore", "")
        .build();

    let out = run_gdot(&ctx, &[]);

    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert_eq!(ctx.home_listing(), vec!["foo/", "foo/bar.txt@"]);
    insta::assert_snapshot!(normalize(&ctx, stdout(&out).trim_end()), @r"
    Directory created: <home>/foo
    Symlink created: <home>/foo/bar.txt -> <src>/foo/bar.txt
    ");
    assert!(stderr(&out).is_empty());
}

#[test]
fn dotfiles_may_track_anything_under_cache() {
    let ctx = TestContextBuilder::new()
        .with_file(".cache/gdot/gdot.log", "tracked")
        .build();

    let out = run_gdot(&ctx, &[]);

    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert_eq!(
        ctx.home_listing(),
        vec![".cache/", ".cache/gdot/", ".cache/gdot/gdot.log@"]
    );
}

#[test]
fn log_file_flag_writes_only_the_named_file() {
    let ctx = TestContextBuilder::new().with_file(".bashrc", "").build();
    let logs = tempfile::tempdir().unwrap();
    let log_path = logs.path().join("run.log");

    let out = run_gdot(&ctx, &["--log-file", log_path.to_str().unwrap()]);

    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert_eq!(ctx.home_listing(), vec![".bashrc@"]);
    let log = std::fs::read_to_string(&log_path).unwrap();
    assert!(log.contains("Symlink created: "), "log: {log}");
    assert!(log.contains("[debug] 0 directories, 1 symlinks created"), "log: {log}");
}

#[test]
fn unwritable_log_file_warns_and_still_links() {
    let ctx = TestContextBuilder::new().with_file(".bashrc", "").build();
    let logs = tempfile::tempdir().unwrap();
    let log_path = logs.path().join("missing/run.log");

    let out = run_gdot(&ctx, &["--log-file", log_path.to_str().unwrap()]);

    assert!(out.status.success());
    assert!(stderr(&out).contains("Warning: cannot write log file"));
    assert_eq!(ctx.home_listing(), vec![".bashrc@"]);
}

#[test]
fn verbose_prints_debug_lines() {
    let ctx = TestContextBuilder::new().with_file(".bashrc", "").build();

    let out = run_gdot(&ctx, &["--verbose"]);

    assert!(out.status.success());
    assert!(stdout(&out).contains("0 directories, 1 symlinks created"));
}

// ---------------------------------------------------------------------------
// Dry run
// ---------------------------------------------------------------------------

#[test]
fn dry_run_prints_two_lines_and_changes_nothing() {
    let ctx = TestContextBuilder::new()
        .with_file("foo/bar.txt", "bar")
        .with_file(".git/HEAD", "")
        .build();

    let out = run_gdot(&ctx, &["--dry-run"]);

    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert!(ctx.home_listing().is_empty());
    let text = stdout(&out);
    assert_eq!(text.lines().filter(|l| l.starts_with("[Dry Run] ")).count(), 2);
    insta::assert_snapshot!(normalize(&ctx, text.trim_end()), @r"
    [Dry Run] Directory would be created: <home>/foo
    [Dry Run] Symlink would be created: <home>/foo/bar.txt -> <src>/foo/bar.txt
    ");
}

// ---------------------------------------------------------------------------
// Failures
// ---------------------------------------------------------------------------

#[test]
fn existing_target_exits_one_with_message() {
    let ctx = TestContextBuilder::new()
        .with_file("foo/bar.txt", "new")
        .with_home_file("foo/bar.txt", "old")
        .build();

    let out = run_gdot(&ctx, &[]);

    assert_eq!(out.status.code(), Some(1));
    let err = normalize(&ctx, &stderr(&out));
    assert!(
        err.contains("target already exists: <home>/foo/bar.txt"),
        "stderr: {err}"
    );
    assert_eq!(
        std::fs::read_to_string(ctx.home_path().join("foo/bar.txt")).unwrap(),
        "old"
    );
}

#[test]
fn keep_going_exits_one_after_linking_the_rest() {
    let ctx = TestContextBuilder::new()
        .with_file("a", "")
        .with_file("b", "")
        .with_home_file("a", "occupied")
        .build();

    let out = run_gdot(&ctx, &["-k"]);

    assert_eq!(out.status.code(), Some(1));
    assert_eq!(ctx.home_listing(), vec!["a", "b@"]);
    let err = normalize(&ctx, &stderr(&out));
    assert!(err.contains("Warning: target already exists: <home>/a"), "stderr: {err}");
    assert!(err.contains("1 target(s) already exist: <home>/a"), "stderr: {err}");
}

#[test]
fn exclude_flag_leaves_names_out() {
    let ctx = TestContextBuilder::new()
        .with_file("README.md", "")
        .with_file(".zshrc", "")
        .build();

    let out = run_gdot(&ctx, &["--exclude", "README.md"]);

    assert!(out.status.success());
    assert_eq!(ctx.home_listing(), vec![".zshrc@"]);
}

#[test]
fn unexpected_argument_is_rejected() {
    let ctx = IntegrationTestContext::new();

    let out = run_gdot(&ctx, &["somewhere"]);

    assert!(!out.status.success());
    assert!(ctx.home_listing().is_empty());
}

#[test]
fn version_flag_prints_name() {
    let ctx = IntegrationTestContext::new();

    let out = run_gdot(&ctx, &["--version"]);

    assert!(out.status.success());
    assert!(stdout(&out).starts_with("gdot "));
}
