//
// Copyright (c) 2026 Jeff Garzik
//
// This file is part of the posixutils-rs project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

//! maketar command line tests

use crate::common::*;
use libflate::gzip;
use std::fs;
use std::io::Read;
use tempfile::TempDir;

#[test]
fn test_write_to_file() {
    let temp = TempDir::new().unwrap();
    let src = temp.path().join("source");
    fs::create_dir(&src).unwrap();
    create_test_files(&src);
    let archive = temp.path().join("out.tar");

    let output = run_maketar(&["-f", archive.to_str().unwrap(), src.to_str().unwrap()]);
    assert_success(&output, "maketar -f");

    let data = fs::read(&archive).unwrap();
    assert_well_formed(&data);
    assert_eq!(member_paths(&read_members(&data)), ["a.txt", "sub/b.txt"]);
}

#[test]
fn test_write_to_stdout() {
    let temp = TempDir::new().unwrap();
    create_test_files(temp.path());

    let output = run_maketar(&[temp.path().to_str().unwrap()]);
    assert_success(&output, "maketar to stdout");
    assert_well_formed(&output.stdout);
    assert_eq!(
        member_paths(&read_members(&output.stdout)),
        ["a.txt", "sub/b.txt"]
    );
}

#[test]
fn test_gzip_output() {
    let temp = TempDir::new().unwrap();
    let src = temp.path().join("source");
    fs::create_dir(&src).unwrap();
    create_test_files(&src);
    let archive = temp.path().join("out.tar.gz");

    let output = run_maketar(&["-z", "-f", archive.to_str().unwrap(), src.to_str().unwrap()]);
    assert_success(&output, "maketar -z");

    let compressed = fs::read(&archive).unwrap();
    assert_eq!(&compressed[..2], &[0x1f, 0x8b]);
    let mut data = Vec::new();
    gzip::Decoder::new(&compressed[..])
        .unwrap()
        .read_to_end(&mut data)
        .unwrap();
    assert_well_formed(&data);
    assert_eq!(member_paths(&read_members(&data)), ["a.txt", "sub/b.txt"]);
}

#[test]
fn test_dirs_and_no_ustar() {
    let temp = TempDir::new().unwrap();
    create_test_files(temp.path());

    let output = run_maketar(&["--dirs", temp.path().to_str().unwrap()]);
    assert_success(&output, "maketar --dirs");
    assert_eq!(
        member_paths(&read_members(&output.stdout)),
        ["a.txt", "sub/", "sub/b.txt"]
    );

    let output = run_maketar(&["--no-ustar", "--chunk-size", "3", temp.path().to_str().unwrap()]);
    assert_success(&output, "maketar --no-ustar");
    assert!(output.stdout[257..512].iter().all(|&b| b == 0));
    let members = read_members(&output.stdout);
    assert_eq!(member_paths(&members), ["a.txt", "sub/b.txt"]);
    assert_eq!(members[0].data, b"Hello, world!\n");
}

#[cfg(unix)]
#[test]
fn test_unreadable_file_sets_exit_status() {
    let temp = TempDir::new().unwrap();
    let src = temp.path().join("source");
    fs::create_dir(&src).unwrap();
    create_test_files(&src);
    std::os::unix::fs::symlink("missing", src.join("broken")).unwrap();
    let archive = temp.path().join("out.tar");

    let output = run_maketar(&["-f", archive.to_str().unwrap(), src.to_str().unwrap()]);
    assert_failure(&output, "maketar with dangling symlink");
    assert!(stderr_str(&output).contains("broken"));

    let data = fs::read(&archive).unwrap();
    assert_well_formed(&data);
    assert_eq!(member_paths(&read_members(&data)), ["a.txt", "sub/b.txt"]);
}

#[test]
fn test_requires_directory() {
    let output = run_maketar(&[]);
    assert_failure(&output, "maketar without operands");
}

#[test]
fn test_help_lists_options() {
    let output = run_maketar(&["--help"]);
    assert_success(&output, "maketar --help");
    let help = String::from_utf8_lossy(&output.stdout);
    assert!(help.contains("write a ustar archive of directory trees"));
    assert!(help.contains("Compress the archive using gzip"));
    assert!(help.contains("--chunk-size"));
}
