//! Shared helpers for driving the `txpipe` binary end to end.

#![allow(dead_code)]

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use tempfile::TempDir;

/// Stand-in for Stage I: lines tagged `P:` go to stdout (performance),
/// lines tagged `R:` go to stderr (rating), anything else is dropped.
pub const SPLITTER: &str = r#"#!/bin/sh
while IFS= read -r line || [ -n "$line" ]; do
  case "$line" in
    P:*) printf '%s\n' "${line#P:}" ;;
    R:*) printf '%s\n' "${line#R:}" >&2 ;;
  esac
done
"#;

pub struct Workspace {
    pub dir: TempDir,
    pub source: PathBuf,
}

impl Workspace {
    pub fn new() -> Self {
        Self::with_source(SPLITTER)
    }

    pub fn with_source(script: &str) -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let source = dir.path().join("transformer1");
        write_script(&source, script);
        Self { dir, source }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Run the binary with this workspace's script as Stage I, under `sh`
    /// (a just-written file can hit ETXTBSY if exec'd directly).
    pub fn run(&self, args: &[&str], stdin: &str) -> Output {
        let script = self.source.to_str().expect("utf-8 path");
        let mut full: Vec<&str> = vec!["--source", "sh", "--source-arg", script];
        full.extend_from_slice(args);
        run_txpipe(&full, stdin)
    }
}

pub fn write_script(path: &Path, script: &str) {
    fs::write(path, script).expect("write script");
}

pub fn run_txpipe(args: &[&str], stdin: &str) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_txpipe"))
        .args(args)
        .env_remove("RUST_LOG")
        .env_remove("TXPIPE_SOURCE")
        .env_remove("TXPIPE_STRICT")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn txpipe");

    let mut input = child.stdin.take().expect("piped stdin");
    let data = stdin.to_string();
    let writer = std::thread::spawn(move || {
        // The pipeline may exit before reading everything; that is fine here.
        let _ = input.write_all(data.as_bytes());
    });

    let output = child.wait_with_output().expect("wait txpipe");
    writer.join().expect("stdin writer");
    output
}

pub fn stdout(out: &Output) -> String {
    String::from_utf8(out.stdout.clone()).expect("utf-8 stdout")
}

pub fn stderr(out: &Output) -> String {
    String::from_utf8(out.stderr.clone()).expect("utf-8 stderr")
}
