#![forbid(unsafe_code)]

//! Failures at the filesystem boundary.
//!
//! None of these are fatal: the session turns each one into a line on the
//! status log and keeps running.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FsError {
    /// Listing a directory failed; the panel falls back to an empty listing.
    #[error("cannot read directory {}: {source}", .path.display())]
    Enumeration { path: PathBuf, source: io::Error },

    /// Stat of a single entry failed; only that entry's fields degrade.
    #[error("cannot read metadata of {}: {source}", .path.display())]
    Metadata { path: PathBuf, source: io::Error },

    #[error("{} already exists", .path.display())]
    CreateCollision { path: PathBuf },

    #[error("cannot create {}: {source}", .path.display())]
    CreateIo { path: PathBuf, source: io::Error },

    #[error("invalid name {name:?}")]
    InvalidName { name: String },

    #[error("cannot delete {}: {source}", .path.display())]
    Delete { path: PathBuf, source: io::Error },

    #[error("cannot copy {} to {}: {source}", .src.display(), .dest.display())]
    CopyItem {
        src: PathBuf,
        dest: PathBuf,
        source: io::Error,
    },
}

impl FsError {
    /// Maps a create failure, splitting out the "already exists" case.
    pub fn create(path: PathBuf, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::AlreadyExists {
            FsError::CreateCollision { path }
        } else {
            FsError::CreateIo { path, source }
        }
    }
}
