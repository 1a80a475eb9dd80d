//! Build script to stamp the CLI version at compile time.
//!
//! Order of precedence: an explicit `DERIBIT_CLI_VERSION` in the build
//! environment, then `git describe`, then the package version.

use std::path::PathBuf;
use std::process::Command;

const VERSION_VAR: &str = "DERIBIT_CLI_VERSION";

fn main() {
    // Packagers building from a tarball pin the version this way
    println!("cargo:rerun-if-env-changed={}", VERSION_VAR);

    // The crate sits two levels below the repository root
    if let Some(git_dir) = git_dir() {
        println!("cargo:rerun-if-changed={}", git_dir.join("HEAD").display());
        println!("cargo:rerun-if-changed={}", git_dir.join("refs").display());
    }

    let version = std::env::var(VERSION_VAR)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .or_else(git_version)
        .unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string());

    println!("cargo:rustc-env={}={}", VERSION_VAR, version);
}

fn git_dir() -> Option<PathBuf> {
    let dir = git(&["rev-parse", "--absolute-git-dir"])?;
    Some(PathBuf::from(dir))
}

fn git_version() -> Option<String> {
    // Tagged releases describe as `v0.3.1`, local work as `v0.3.1-4-gabc123-dirty`
    let version = git(&["describe", "--tags", "--always", "--dirty"])?;

    // Strip the tag prefix so it matches the Cargo version format
    Some(version.strip_prefix('v').unwrap_or(&version).to_string())
}

/// Runs git and returns its trimmed stdout, or `None` unless it succeeds
/// with output.
fn git(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;

    if !output.status.success() {
        return None;
    }

    let stdout = String::from_utf8(output.stdout).ok()?;
    let stdout = stdout.trim();

    if stdout.is_empty() {
        return None;
    }

    Some(stdout.to_string())
}
