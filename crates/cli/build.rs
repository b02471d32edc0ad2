use std::env;
use std::process::Command;

// Version metadata for `lexcanon --version`.
//
// LEXCANON_BUILD_COMMIT overrides the git lookup for source tarballs and
// distro builds that have no .git directory.
fn main() {
    println!("cargo:rerun-if-env-changed=LEXCANON_BUILD_COMMIT");
    println!("cargo:rerun-if-changed=../../.git/HEAD");
    println!("cargo:rerun-if-changed=../../.git/index");

    let commit = env::var("LEXCANON_BUILD_COMMIT")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .or_else(git_describe)
        .unwrap_or_else(|| "unknown".to_string());
    println!("cargo:rustc-env=LEXCANON_COMMIT={}", commit.trim());

    let target = env::var("TARGET").unwrap_or_else(|_| "unknown".to_string());
    println!("cargo:rustc-env=LEXCANON_TARGET={target}");
}

/// Short hash, suffixed `-dirty` when the tree has local edits.
fn git_describe() -> Option<String> {
    let output = Command::new("git")
        .args(["describe", "--always", "--dirty", "--abbrev=7", "--exclude", "*"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    String::from_utf8(output.stdout).ok()
}
