//
// Copyright (c) 2026 Jeff Garzik
//
// This file is part of the posixutils-rs project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

//! Header block encoding
//!
//! [`encode_header`] turns a [`TarEntry`] into one 512-byte block: the
//! v7 fields (name, mode, ids, size, mtime, checksum, typeflag, link
//! target) in bytes 0..257, followed by the ustar magic, owner names,
//! device numbers and name prefix when the entry asks for them.  Unused
//! bytes are NUL.
//!
//! Nothing is truncated to make it fit.  A string longer than its field
//! is [`TarError::NameTooLong`], a number with more octal digits than its
//! field is [`TarError::FieldOverflow`], and the caller decides what to do.

use crate::entry::TarEntry;
use crate::error::{TarError, TarResult};
use std::time::SystemTime;

pub const BLOCK_SIZE: usize = 512;

const NAME_LEN: usize = 100;
const LINKNAME_LEN: usize = 100;
const UNAME_LEN: usize = 32;
const GNAME_LEN: usize = 32;
const PREFIX_LEN: usize = 155;

// Header field offsets
const NAME_OFF: usize = 0;
const MODE_OFF: usize = 100;
const UID_OFF: usize = 108;
const GID_OFF: usize = 116;
const SIZE_OFF: usize = 124;
const MTIME_OFF: usize = 136;
const CHKSUM_OFF: usize = 148;
const TYPEFLAG_OFF: usize = 156;
const LINKNAME_OFF: usize = 157;
const MAGIC_OFF: usize = 257;
const VERSION_OFF: usize = 263;
const UNAME_OFF: usize = 265;
const GNAME_OFF: usize = 297;
const DEVMAJOR_OFF: usize = 329;
const DEVMINOR_OFF: usize = 337;
const PREFIX_OFF: usize = 345;

const CHKSUM_LEN: usize = 8;

// Octal digits per numeric field; each is followed by a NUL
const ID_DIGITS: usize = 7;
const SIZE_DIGITS: usize = 11;

/// Longest name that fits the name field with its terminator
const NAME_MAX: usize = NAME_LEN - 1;
/// Longest prefix that fits the prefix field with its terminator
const PREFIX_MAX: usize = PREFIX_LEN - 1;

/// Encode an entry into a single header block.
///
/// The block is assembled in memory and the checksum patched in last, so
/// the caller only ever writes finished blocks to its sink.
pub fn encode_header(entry: &TarEntry) -> TarResult<[u8; BLOCK_SIZE]> {
    if entry.name.is_empty() {
        return Err(TarError::EmptyName);
    }

    let (prefix, name) = if entry.ustar {
        split_name(&entry.name)?
    } else if entry.name.len() > NAME_MAX {
        return Err(TarError::NameTooLong {
            field: "name",
            value: entry.name.clone(),
        });
    } else {
        (String::new(), entry.name.clone())
    };

    let mut header = [0u8; BLOCK_SIZE];

    write_string(&mut header, NAME_OFF, NAME_LEN, "name", &name)?;
    write_octal(&mut header, MODE_OFF, ID_DIGITS, "mode", entry.mode as u64)?;
    write_octal(&mut header, UID_OFF, ID_DIGITS, "uid", entry.uid)?;
    write_octal(&mut header, GID_OFF, ID_DIGITS, "gid", entry.gid)?;
    write_octal(&mut header, SIZE_OFF, SIZE_DIGITS, "size", entry.size)?;
    write_octal(
        &mut header,
        MTIME_OFF,
        SIZE_DIGITS,
        "mtime",
        epoch_seconds(entry.modified),
    )?;

    header[TYPEFLAG_OFF] = entry.entry_type.typeflag();
    write_string(
        &mut header,
        LINKNAME_OFF,
        LINKNAME_LEN,
        "link target",
        &entry.link_target,
    )?;

    if entry.ustar {
        header[MAGIC_OFF..MAGIC_OFF + 6].copy_from_slice(b"ustar\0");
        header[VERSION_OFF..VERSION_OFF + 2].copy_from_slice(b"00");
        write_string(&mut header, UNAME_OFF, UNAME_LEN, "user name", &entry.uname)?;
        write_string(&mut header, GNAME_OFF, GNAME_LEN, "group name", &entry.gname)?;
        write_octal(&mut header, DEVMAJOR_OFF, ID_DIGITS, "devmajor", entry.devmajor)?;
        write_octal(&mut header, DEVMINOR_OFF, ID_DIGITS, "devminor", entry.devminor)?;
        write_string(&mut header, PREFIX_OFF, PREFIX_LEN, "name prefix", &prefix)?;
    }

    let checksum = calculate_checksum(&header);
    let digits = format!("{:06o}", checksum);
    header[CHKSUM_OFF..CHKSUM_OFF + 6].copy_from_slice(digits.as_bytes());
    header[CHKSUM_OFF + 6] = 0;
    header[CHKSUM_OFF + 7] = b' ';

    Ok(header)
}

/// Split a path into a ustar `(prefix, name)` pair.
///
/// Paths of up to 99 bytes are returned whole with an empty prefix.
/// Longer paths move leading `/`-separated segments into the prefix until
/// the remaining name fits; `prefix + "/" + name` is always the original
/// path.
pub fn split_name(path: &str) -> TarResult<(String, String)> {
    if path.len() <= NAME_MAX {
        return Ok((String::new(), path.to_string()));
    }

    let segments: Vec<&str> = path.split('/').collect();
    for cut in 1..segments.len() {
        let prefix = segments[..cut].join("/");
        if prefix.len() > PREFIX_MAX {
            break;
        }
        // an empty prefix would drop the leading '/' of an absolute path
        if prefix.is_empty() {
            continue;
        }
        let name = segments[cut..].join("/");
        if name.is_empty() {
            break;
        }
        if name.len() <= NAME_MAX {
            return Ok((prefix, name));
        }
    }

    Err(TarError::NameTooLong {
        field: "name",
        value: path.to_string(),
    })
}

/// Unsigned byte sum of the block, reading the checksum field as if it
/// held eight spaces whatever it contains now
fn calculate_checksum(header: &[u8; BLOCK_SIZE]) -> u32 {
    let field = &header[CHKSUM_OFF..CHKSUM_OFF + CHKSUM_LEN];
    let total: u32 = header.iter().map(|&b| u32::from(b)).sum();
    let stored: u32 = field.iter().map(|&b| u32::from(b)).sum();
    total - stored + CHKSUM_LEN as u32 * u32::from(b' ')
}

/// Whole seconds since the epoch; earlier times have no encoding here
fn epoch_seconds(time: SystemTime) -> u64 {
    match time.duration_since(SystemTime::UNIX_EPOCH) {
        Ok(d) => d.as_secs(),
        Err(_) => {
            log::warn!("modification time before 1970, storing 0");
            0
        }
    }
}

/// Write a string into a NUL-terminated field of `len` bytes
fn write_string(
    header: &mut [u8; BLOCK_SIZE],
    off: usize,
    len: usize,
    field: &'static str,
    s: &str,
) -> TarResult<()> {
    let bytes = s.as_bytes();
    if bytes.len() > len - 1 {
        return Err(TarError::NameTooLong {
            field,
            value: s.to_string(),
        });
    }
    header[off..off + bytes.len()].copy_from_slice(bytes);
    Ok(())
}

/// Write a zero-padded octal number of exactly `digits` digits.  The byte
/// after the digits stays NUL.
fn write_octal(
    header: &mut [u8; BLOCK_SIZE],
    off: usize,
    digits: usize,
    field: &'static str,
    val: u64,
) -> TarResult<()> {
    let s = format!("{:0width$o}", val, width = digits);
    if s.len() > digits {
        return Err(TarError::FieldOverflow {
            field,
            value: val,
            digits,
        });
    }
    header[off..off + digits].copy_from_slice(s.as_bytes());
    Ok(())
}
