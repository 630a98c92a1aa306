//
// Copyright (c) 2026 Jeff Garzik
//
// This file is part of the posixutils-rs project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

//! Filesystem access used by directory packing

use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Size and modification time of a file about to be archived
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStat {
    pub size: u64,
    pub modified: SystemTime,
}

/// The filesystem operations a directory walk needs
pub trait FileTree {
    type File: Read;

    /// Subdirectories of `dir` to descend into
    fn list_dirs(&self, dir: &Path) -> io::Result<Vec<PathBuf>>;

    /// Files of `dir` to archive
    fn list_files(&self, dir: &Path) -> io::Result<Vec<PathBuf>>;

    fn stat(&self, path: &Path) -> io::Result<FileStat>;

    fn open(&self, path: &Path) -> io::Result<Self::File>;
}

/// The host filesystem
#[derive(Debug, Default, Clone, Copy)]
pub struct HostTree;

/// How a directory member is handled by the walk
enum Kind {
    Dir,
    File,
    Skip,
}

fn classify(entry: &fs::DirEntry) -> io::Result<Kind> {
    let file_type = entry.file_type()?;
    if file_type.is_dir() {
        return Ok(Kind::Dir);
    }
    if file_type.is_file() {
        return Ok(Kind::File);
    }
    if file_type.is_symlink() {
        return match fs::metadata(entry.path()) {
            // Links to directories are not followed, so cycles cannot occur
            Ok(m) if m.is_dir() => Ok(Kind::Skip),
            Ok(m) if m.is_file() => Ok(Kind::File),
            Ok(_) => Ok(Kind::Skip),
            // Dangling: let open() report it
            Err(_) => Ok(Kind::File),
        };
    }
    Ok(Kind::Skip)
}

fn list(dir: &Path, want_dirs: bool) -> io::Result<Vec<PathBuf>> {
    let mut out = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let keep = match classify(&entry)? {
            Kind::Dir => want_dirs,
            Kind::File => !want_dirs,
            Kind::Skip => {
                if !want_dirs {
                    log::debug!("{}: not a regular file, skipping", entry.path().display());
                }
                false
            }
        };
        if keep {
            out.push(entry.path());
        }
    }
    Ok(out)
}

impl FileTree for HostTree {
    type File = File;

    fn list_dirs(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        list(dir, true)
    }

    fn list_files(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        list(dir, false)
    }

    fn stat(&self, path: &Path) -> io::Result<FileStat> {
        let metadata = fs::metadata(path)?;
        Ok(FileStat {
            size: metadata.len(),
            modified: metadata.modified()?,
        })
    }

    fn open(&self, path: &Path) -> io::Result<File> {
        File::open(path)
    }
}
