//
// Copyright (c) 2026 Jeff Garzik
//
// This file is part of the posixutils-rs project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

//! Common test helpers for maketar integration tests

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;
use std::process::{Command, Output};

/// One archive member as seen by an independent tar reader
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub path: String,
    pub size: u64,
    pub mtime: u64,
    pub typeflag: u8,
    pub data: Vec<u8>,
}

/// Run maketar with given arguments and return output
pub fn run_maketar(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_maketar"))
        .args(args)
        .output()
        .expect("Failed to run maketar")
}

/// Create a.txt and sub/b.txt under `dir`
pub fn create_test_files(dir: &Path) {
    let mut f = File::create(dir.join("a.txt")).unwrap();
    writeln!(f, "Hello, world!").unwrap();

    fs::create_dir(dir.join("sub")).unwrap();
    let mut f = File::create(dir.join("sub/b.txt")).unwrap();
    writeln!(f, "Nested file content").unwrap();
}

/// Parse an archive with the `tar` crate, sorted by path
pub fn read_members(archive: &[u8]) -> Vec<Member> {
    let mut ar = tar::Archive::new(archive);
    let mut members = Vec::new();
    for entry in ar.entries().expect("Failed to read archive") {
        let mut entry = entry.expect("Invalid archive entry");
        let path = entry.path().unwrap().to_string_lossy().into_owned();
        let size = entry.header().size().unwrap();
        let mtime = entry.header().mtime().unwrap();
        let typeflag = entry.header().entry_type().as_byte();
        let mut data = Vec::new();
        entry.read_to_end(&mut data).unwrap();
        members.push(Member {
            path,
            size,
            mtime,
            typeflag,
            data,
        });
    }
    members.sort_by(|a, b| a.path.cmp(&b.path));
    members
}

pub fn member_paths(members: &[Member]) -> Vec<&str> {
    members.iter().map(|m| m.path.as_str()).collect()
}

/// Check block alignment and the end-of-archive marker
pub fn assert_well_formed(archive: &[u8]) {
    assert_eq!(archive.len() % 512, 0, "archive not block aligned");
    assert!(archive.len() >= 1024, "archive too short");
    assert!(
        archive[archive.len() - 1024..].iter().all(|&b| b == 0),
        "missing end-of-archive marker"
    );
}

/// Assert command succeeded
pub fn assert_success(output: &Output, context: &str) {
    assert!(
        output.status.success(),
        "{} failed with status {:?}\nstderr: {}",
        context,
        output.status,
        String::from_utf8_lossy(&output.stderr)
    );
}

/// Assert command failed
pub fn assert_failure(output: &Output, context: &str) {
    assert!(
        !output.status.success(),
        "{} should have failed but succeeded\nstderr: {}",
        context,
        String::from_utf8_lossy(&output.stderr)
    );
}

/// Get stderr as string
pub fn stderr_str(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}
