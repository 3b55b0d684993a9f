// Path: crates/foundations/tests/common/mod.rs

//! Shared fixtures: scripted fake node binaries.
#![allow(dead_code)]

use std::path::{Path, PathBuf};

/// Writes an executable shell script that prints `lines` and then sleeps,
/// standing in for a node binary.
pub fn fake_node(dir: &Path, name: &str, lines: &[&str]) -> PathBuf {
    let mut body = String::from("#!/bin/sh\n");
    for line in lines {
        body.push_str(&format!("echo \"{line}\"\n"));
    }
    body.push_str("exec sleep 600\n");
    write_script(dir, name, &body)
}

/// Writes an executable shell script that prints `lines` and exits
/// immediately.
pub fn exiting_node(dir: &Path, name: &str, lines: &[&str]) -> PathBuf {
    let mut body = String::from("#!/bin/sh\n");
    for line in lines {
        body.push_str(&format!("echo \"{line}\"\n"));
    }
    body.push_str("exit 0\n");
    write_script(dir, name, &body)
}

fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;
    let path = dir.join(name);
    std::fs::write(&path, body).expect("write fake node script");
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
        .expect("chmod fake node script");
    path
}
