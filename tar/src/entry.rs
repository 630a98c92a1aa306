//
// Copyright (c) 2026 Jeff Garzik
//
// This file is part of the posixutils-rs project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

//! Archive entry descriptors

use std::ops::BitOr;
use std::time::SystemTime;

/// File type bits stored in the mode field alongside the permissions
const S_IFREG: u32 = 0o100000;
const S_IFDIR: u32 = 0o040000;

/// Type of archive entry, as recorded in the typeflag byte
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EntryType {
    /// Regular file
    #[default]
    Regular,
    /// Hard link to another archive member
    Hardlink,
    /// Symbolic link
    Symlink,
    /// Character device
    CharDevice,
    /// Block device
    BlockDevice,
    /// Directory
    Directory,
    /// FIFO (named pipe)
    Fifo,
    /// Contiguous file
    Contiguous,
    /// Global extended header
    GlobalExtendedHeader,
    /// Per-file extended header
    ExtendedHeader,
}

impl EntryType {
    /// ASCII typeflag written at offset 156
    pub fn typeflag(self) -> u8 {
        match self {
            EntryType::Regular => b'0',
            EntryType::Hardlink => b'1',
            EntryType::Symlink => b'2',
            EntryType::CharDevice => b'3',
            EntryType::BlockDevice => b'4',
            EntryType::Directory => b'5',
            EntryType::Fifo => b'6',
            EntryType::Contiguous => b'7',
            EntryType::GlobalExtendedHeader => b'g',
            EntryType::ExtendedHeader => b'x',
        }
    }

    /// Map a typeflag back to an entry type.  Old archives mark regular
    /// files with a NUL byte.
    pub fn from_typeflag(flag: u8) -> Option<EntryType> {
        match flag {
            b'0' | b'\0' => Some(EntryType::Regular),
            b'1' => Some(EntryType::Hardlink),
            b'2' => Some(EntryType::Symlink),
            b'3' => Some(EntryType::CharDevice),
            b'4' => Some(EntryType::BlockDevice),
            b'5' => Some(EntryType::Directory),
            b'6' => Some(EntryType::Fifo),
            b'7' => Some(EntryType::Contiguous),
            b'g' => Some(EntryType::GlobalExtendedHeader),
            b'x' => Some(EntryType::ExtendedHeader),
            _ => None,
        }
    }

    /// Type bits composed into the mode field
    fn mode_bits(self) -> u32 {
        match self {
            EntryType::Directory => S_IFDIR,
            _ => S_IFREG,
        }
    }
}

/// Read/write/execute capabilities for one class of user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Permissions(u32);

impl Permissions {
    pub const NONE: Permissions = Permissions(0);
    pub const EXECUTE: Permissions = Permissions(1);
    pub const WRITE: Permissions = Permissions(2);
    pub const READ: Permissions = Permissions(4);
    pub const ALL: Permissions = Permissions(7);

    /// The three permission bits
    pub fn bits(self) -> u32 {
        self.0
    }

    pub fn contains(self, other: Permissions) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for Permissions {
    type Output = Permissions;

    fn bitor(self, rhs: Permissions) -> Permissions {
        Permissions(self.0 | rhs.0)
    }
}

/// Metadata for one archive member.
///
/// The ustar name prefix is not stored here: the header encoder derives it
/// from `name` when the name does not fit the 100-byte field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TarEntry {
    /// Path of the member within the archive, `/` separated
    pub name: String,
    /// Type and permission bits
    pub mode: u32,
    /// Owner user ID
    pub uid: u64,
    /// Owner group ID
    pub gid: u64,
    /// Number of payload bytes that follow the header
    pub size: u64,
    /// Modification time, stored truncated to whole seconds
    pub modified: SystemTime,
    /// Type of entry
    pub entry_type: EntryType,
    /// Target of a hard or symbolic link
    pub link_target: String,
    /// Write the ustar magic and extended fields
    pub ustar: bool,
    /// Owner user name (ustar)
    pub uname: String,
    /// Owner group name (ustar)
    pub gname: String,
    /// Device major number (ustar)
    pub devmajor: u64,
    /// Device minor number (ustar)
    pub devminor: u64,
}

impl TarEntry {
    /// Create a regular file entry with all permissions granted
    pub fn new(name: impl Into<String>) -> Self {
        TarEntry {
            name: name.into(),
            mode: S_IFREG | 0o777,
            uid: 0,
            gid: 0,
            size: 0,
            modified: SystemTime::UNIX_EPOCH,
            entry_type: EntryType::Regular,
            link_target: String::new(),
            ustar: true,
            uname: String::new(),
            gname: String::new(),
            devmajor: 0,
            devminor: 0,
        }
    }

    /// Create a directory entry.  Directory names carry a trailing slash.
    pub fn directory(name: impl Into<String>) -> Self {
        let mut name = name.into();
        if !name.ends_with('/') {
            name.push('/');
        }
        TarEntry {
            mode: S_IFDIR | 0o777,
            entry_type: EntryType::Directory,
            ..TarEntry::new(name)
        }
    }

    pub fn with_size(mut self, size: u64) -> Self {
        self.size = size;
        self
    }

    pub fn with_modified(mut self, modified: SystemTime) -> Self {
        self.modified = modified;
        self
    }

    pub fn with_ustar(mut self, ustar: bool) -> Self {
        self.ustar = ustar;
        self
    }

    /// Replace the permission bits, keeping the type bits for this entry
    pub fn set_permissions(&mut self, owner: Permissions, group: Permissions, other: Permissions) {
        self.mode = self.entry_type.mode_bits()
            | (owner.bits() << 6)
            | (group.bits() << 3)
            | other.bits();
    }

    /// Check if this is a directory
    pub fn is_dir(&self) -> bool {
        self.entry_type == EntryType::Directory
    }
}
