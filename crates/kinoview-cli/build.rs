#![allow(missing_docs)]

use std::process::Command;

fn main() {
    let git_hash = Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()
        .filter(|output| output.status.success())
        .and_then(|output| String::from_utf8(output.stdout).ok())
        .map_or_else(|| String::from("unknown"), |hash| hash.trim().to_owned());

    println!("cargo:rustc-env=GIT_HASH={git_hash}");
}
