//
// Copyright (c) 2026 Jeff Garzik
//
// This file is part of the posixutils-rs project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

use std::io;
use std::path::PathBuf;

/// Error type for archive creation
#[derive(thiserror::Error, Debug)]
pub enum TarError {
    /// A name cannot be represented in its header field(s)
    #[error("{field} too long: {value}")]
    NameTooLong { field: &'static str, value: String },

    /// A numeric value needs more octal digits than its field holds
    #[error("{field} value {value} does not fit in {digits} octal digits")]
    FieldOverflow {
        field: &'static str,
        value: u64,
        digits: usize,
    },

    /// The output sink rejected a write or flush
    #[error("write error: {0}")]
    SinkWrite(#[from] io::Error),

    /// A file could not be opened or read
    #[error("{}: {source}", path.display())]
    SourceRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The payload did not supply as many bytes as the header declared
    #[error("payload ended after {actual} of {expected} bytes")]
    SizeMismatch { expected: u64, actual: u64 },

    /// Entry names must not be empty
    #[error("entry name is empty")]
    EmptyName,

    /// The end-of-archive marker has already been written
    #[error("archive already finished")]
    Finished,
}

impl TarError {
    /// Whether a directory walk may skip the failing file and continue.
    ///
    /// Read errors and short sources affect one file and leave the archive
    /// block aligned.  Any other error leaves a sink the walk cannot repair.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            TarError::SourceRead { .. } | TarError::SizeMismatch { .. }
        )
    }
}

/// Result type for archive creation
pub type TarResult<T> = Result<T, TarError>;
