//! Stamps the `revguess` startup banner
//!
//! `main` logs `GIT_HASH`, `BUILD_TIMESTAMP` and `BUILD_PROFILE` at debug
//! level so a log excerpt identifies the exact binary that wrote it.

use std::process::Command;

fn main() {
    emit("GIT_HASH", commit().unwrap_or_else(|| "unknown".to_string()));
    emit(
        "BUILD_TIMESTAMP",
        chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
    );
    emit(
        "BUILD_PROFILE",
        std::env::var("PROFILE").unwrap_or_else(|_| "unknown".to_string()),
    );
}

/// Short commit id, `None` outside a git checkout
fn commit() -> Option<String> {
    let output = Command::new("git")
        .args(["rev-parse", "--short=8", "HEAD"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let hash = String::from_utf8(output.stdout).ok()?;
    Some(hash.trim().to_string())
}

fn emit(name: &str, value: String) {
    println!("cargo:rustc-env={}={}", name, value);
}
