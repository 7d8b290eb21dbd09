//! Build script: embeds the gdot version string at compile time.

use std::process::Command;

fn main() {
    // GDOT_VERSION from the environment wins (release builds); otherwise ask git.
    if let Ok(version) = std::env::var("GDOT_VERSION") {
        println!("cargo:rustc-env=GDOT_VERSION={version}");
    } else if let Ok(output) = Command::new("git")
        .args(["describe", "--tags", "--always", "--dirty"])
        .output()
        && output.status.success()
    {
        let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if !version.is_empty() {
            println!("cargo:rustc-env=GDOT_VERSION={version}");
        }
    }

    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/");
    println!("cargo:rerun-if-env-changed=GDOT_VERSION");
}
