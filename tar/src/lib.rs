//
// Copyright (c) 2026 Jeff Garzik
//
// This file is part of the posixutils-rs project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

//! Streaming writer for POSIX tar archives with the ustar extension.
//!
//! An archive is a sequence of 512-byte blocks: for each entry one header
//! block followed by its payload padded to a block boundary, terminated by
//! two all-zero blocks.  [`TarPacker`] writes that sequence strictly
//! forward to any [`std::io::Write`] sink, so the sink may be a plain file,
//! a pipe or a compressing filter.

pub mod entry;
pub mod error;
pub mod header;
pub mod packer;
pub mod tree;

pub use entry::{EntryType, Permissions, TarEntry};
pub use error::{TarError, TarResult};
pub use header::{encode_header, split_name, BLOCK_SIZE};
pub use packer::{PackOptions, PackReport, TarPacker, DEFAULT_CHUNK_SIZE};
pub use tree::{FileStat, FileTree, HostTree};
