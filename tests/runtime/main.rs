//! Integration tests for Layer 3: Runtime
//!
//! Tests the command language end to end: scripts, the REPL loop over a
//! scripted editor, and configuration files.

mod config;

use std::fs;
use std::path::PathBuf;
use std::process;

/// Writes `contents` to a fresh file in the temp directory.
pub fn temp_file(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("encore-{}-{name}", process::id()));
    fs::write(&path, contents).unwrap();
    path
}
