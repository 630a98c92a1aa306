//
// Copyright (c) 2026 Jeff Garzik
//
// This file is part of the posixutils-rs project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

//! Streaming archive writer

use crate::entry::TarEntry;
use crate::error::{TarError, TarResult};
use crate::header::{encode_header, BLOCK_SIZE};
use crate::tree::{FileStat, FileTree, HostTree};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Default size of the buffer used to copy file payloads
pub const DEFAULT_CHUNK_SIZE: usize = 10 * 1000 * 1000;

/// Padding and the end-of-archive marker are sliced from this block
static ZERO_BLOCK: [u8; BLOCK_SIZE] = [0u8; BLOCK_SIZE];

/// Options for archive creation
#[derive(Debug, Clone)]
pub struct PackOptions {
    /// Write ustar fields in headers built from the filesystem
    pub ustar: bool,
    /// Emit a directory entry before the contents of each subdirectory
    pub directory_entries: bool,
    /// Payload copy buffer size in bytes
    pub chunk_size: usize,
}

impl Default for PackOptions {
    fn default() -> Self {
        PackOptions {
            ustar: true,
            directory_entries: false,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

/// Outcome of packing a directory tree
#[derive(Debug, Default)]
pub struct PackReport {
    /// Number of headers written
    pub entries: usize,
    /// Files that were skipped or could not be read completely
    pub failures: Vec<TarError>,
}

impl PackReport {
    /// True if every file found was archived in full
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Record a file or directory that was left out
    fn skip(&mut self, path: &Path, source: io::Error) {
        log::warn!("{}: {}, skipping", path.display(), source);
        self.failures.push(TarError::SourceRead {
            path: path.to_path_buf(),
            source,
        });
    }

    /// Record a file whose entry was written but zero-filled
    fn incomplete(&mut self, path: &Path, err: TarError) {
        let source = match err {
            TarError::SourceRead { source, .. } => source,
            other => io::Error::new(io::ErrorKind::UnexpectedEof, other.to_string()),
        };
        log::warn!("{}: {}, padded with zeros", path.display(), source);
        self.failures.push(TarError::SourceRead {
            path: path.to_path_buf(),
            source,
        });
    }
}

/// Writes tar entries to a byte sink.
///
/// The packer owns whatever sink it is given: pass a `File` to hand the
/// file over, or `&mut File` to keep it.  [`TarPacker::finish`] must be
/// called once after the last entry; dropping the packer does not write
/// the end-of-archive marker.
pub struct TarPacker<W: Write> {
    writer: W,
    options: PackOptions,
    buf: Vec<u8>,
    finished: bool,
}

impl<W: Write> TarPacker<W> {
    pub fn new(writer: W) -> Self {
        Self::with_options(writer, PackOptions::default())
    }

    pub fn with_options(writer: W, options: PackOptions) -> Self {
        TarPacker {
            writer,
            options,
            buf: Vec::new(),
            finished: false,
        }
    }

    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    /// Give the sink back to the caller
    pub fn into_inner(self) -> W {
        self.writer
    }

    /// Write one entry: its header, exactly `entry.size` payload bytes
    /// from `data`, and zero padding to the next block boundary.
    ///
    /// If `data` fails or ends early, the missing bytes are written as
    /// zeros so the archive stays aligned, and the read error is returned.
    /// Bytes beyond `entry.size` are never read.
    pub fn add_entry<R: Read>(&mut self, entry: TarEntry, mut data: R) -> TarResult<()> {
        self.check_open()?;

        let header = encode_header(&entry)?;
        self.writer.write_all(&header)?;

        let size = entry.size;
        if size > 0 && self.buf.is_empty() {
            self.buf = vec![0u8; self.options.chunk_size.max(1)];
        }

        let mut copied: u64 = 0;
        let mut read_err = None;
        while copied < size {
            let want = std::cmp::min(size - copied, self.buf.len() as u64) as usize;
            match data.read(&mut self.buf[..want]) {
                Ok(0) => break,
                Ok(n) => {
                    self.writer.write_all(&self.buf[..n])?;
                    copied += n as u64;
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    read_err = Some(e);
                    break;
                }
            }
        }

        self.write_zeros(size - copied)?;
        self.write_zeros(padding_needed(size))?;

        if let Some(source) = read_err {
            return Err(TarError::SourceRead {
                path: PathBuf::from(&entry.name),
                source,
            });
        }
        if copied < size {
            return Err(TarError::SizeMismatch {
                expected: size,
                actual: copied,
            });
        }

        log::debug!("added {} ({} bytes)", entry.name, size);
        Ok(())
    }

    /// Archive a single file from the host filesystem under `name`
    pub fn add_file(&mut self, path: &Path, name: &str) -> TarResult<()> {
        self.check_open()?;
        let (stat, file) = open_file(&HostTree, path).map_err(|source| TarError::SourceRead {
            path: path.to_path_buf(),
            source,
        })?;
        let entry = self.file_entry(name.to_string(), &stat);
        self.add_entry(entry, file)
    }

    /// Archive every file below `root`, named relative to it.
    ///
    /// Files that cannot be opened are logged, recorded in the report and
    /// skipped.  Files that fail part way through stay in the archive,
    /// zero-filled, and are recorded too.  Any other error aborts the walk.
    pub fn add_directory(&mut self, root: &Path) -> TarResult<PackReport> {
        self.add_directory_from(&HostTree, root)
    }

    /// Like [`TarPacker::add_directory`], reading through `tree`
    pub fn add_directory_from<T: FileTree>(
        &mut self,
        tree: &T,
        root: &Path,
    ) -> TarResult<PackReport> {
        self.check_open()?;

        let mut report = PackReport::default();
        let mut dirs: Vec<PathBuf> = vec![root.to_path_buf()];

        while let Some(dir) = dirs.pop() {
            match tree.list_dirs(&dir) {
                Ok(subdirs) => {
                    for sub in subdirs {
                        let name = match relative_name(root, &sub) {
                            Ok(name) => name,
                            Err(e) => {
                                report.skip(&sub, e);
                                continue;
                            }
                        };
                        if self.options.directory_entries {
                            self.add_dir_entry(tree, &sub, name)?;
                            report.entries += 1;
                        }
                        dirs.push(sub);
                    }
                }
                Err(e) => {
                    report.skip(&dir, e);
                    continue;
                }
            }

            let files = match tree.list_files(&dir) {
                Ok(files) => files,
                Err(e) => {
                    report.skip(&dir, e);
                    continue;
                }
            };

            for file in files {
                let opened = relative_name(root, &file)
                    .and_then(|name| open_file(tree, &file).map(|opened| (name, opened)));
                let (name, (stat, reader)) = match opened {
                    Ok(opened) => opened,
                    Err(e) => {
                        report.skip(&file, e);
                        continue;
                    }
                };

                let entry = self.file_entry(name, &stat);
                match self.add_entry(entry, reader) {
                    Ok(()) => report.entries += 1,
                    Err(e) if e.is_recoverable() => {
                        report.entries += 1;
                        report.incomplete(&file, e);
                    }
                    Err(e) => return Err(e),
                }
            }
        }

        log::info!(
            "{}: {} entries, {} failed",
            root.display(),
            report.entries,
            report.failures.len()
        );
        Ok(report)
    }

    /// Write the end-of-archive marker and flush the sink.  Only the
    /// first call writes anything.
    pub fn finish(&mut self) -> TarResult<()> {
        self.check_open()?;
        self.finished = true;
        self.writer.write_all(&ZERO_BLOCK)?;
        self.writer.write_all(&ZERO_BLOCK)?;
        self.writer.flush()?;
        Ok(())
    }

    fn check_open(&self) -> TarResult<()> {
        if self.finished {
            Err(TarError::Finished)
        } else {
            Ok(())
        }
    }

    /// Regular file entry for a file found on disk
    fn file_entry(&self, name: String, stat: &FileStat) -> TarEntry {
        TarEntry::new(name)
            .with_size(stat.size)
            .with_modified(stat.modified)
            .with_ustar(self.options.ustar)
    }

    fn add_dir_entry<T: FileTree>(&mut self, tree: &T, path: &Path, name: String) -> TarResult<()> {
        let modified = match tree.stat(path) {
            Ok(stat) => stat.modified,
            Err(e) => {
                log::warn!("{}: {}", path.display(), e);
                SystemTime::UNIX_EPOCH
            }
        };
        let entry = TarEntry::directory(name)
            .with_modified(modified)
            .with_ustar(self.options.ustar);
        self.add_entry(entry, io::empty())
    }

    fn write_zeros(&mut self, mut count: u64) -> TarResult<()> {
        while count > 0 {
            let n = std::cmp::min(count, BLOCK_SIZE as u64) as usize;
            self.writer.write_all(&ZERO_BLOCK[..n])?;
            count -= n as u64;
        }
        Ok(())
    }
}

/// Stat and open a file ahead of writing its header
fn open_file<T: FileTree>(tree: &T, path: &Path) -> io::Result<(FileStat, T::File)> {
    let stat = tree.stat(path)?;
    let file = tree.open(path)?;
    Ok((stat, file))
}

/// Archive name of `path`: relative to `root`, `/` separated.
///
/// A name that is not valid UTF-8 cannot be stored as it is on disk, so
/// it is an `InvalidData` error rather than a lossy copy.
fn relative_name(root: &Path, path: &Path) -> io::Result<String> {
    let rel = path.strip_prefix(root).unwrap_or(path);
    let mut parts = Vec::new();
    for component in rel.components() {
        match component.as_os_str().to_str() {
            Some(part) => parts.push(part),
            None => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    "file name is not valid UTF-8",
                ))
            }
        }
    }
    Ok(parts.join("/"))
}

/// Zero bytes that bring a payload of `size` bytes to a block boundary
fn padding_needed(size: u64) -> u64 {
    let block = BLOCK_SIZE as u64;
    (block - size % block) % block
}
