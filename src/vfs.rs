#![forbid(unsafe_code)]

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::fs_ops::copy_entry;
use crate::model::{EntryKind, Stat};

/// The filesystem capabilities the panes and the clipboard rely on.
pub trait FileSystem {
    /// Direct children of `dir`, in listing order.
    fn list_dir(&self, dir: &Path) -> io::Result<Vec<PathBuf>>;
    fn stat(&self, path: &Path) -> io::Result<Stat>;
    /// Creates an empty file; fails with `AlreadyExists` instead of truncating.
    fn create_file(&self, path: &Path) -> io::Result<()>;
    fn create_dir(&self, path: &Path) -> io::Result<()>;
    fn remove_file(&self, path: &Path) -> io::Result<()>;
    fn remove_dir_all(&self, path: &Path) -> io::Result<()>;
    fn copy_recursive(&self, src: &Path, dest: &Path) -> io::Result<()>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

impl FileSystem for LocalFs {
    fn list_dir(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        let mut paths = Vec::new();
        for item in fs::read_dir(dir)? {
            paths.push(item?.path());
        }
        Ok(paths)
    }

    fn stat(&self, path: &Path) -> io::Result<Stat> {
        let metadata = fs::metadata(path)?;
        let kind = if metadata.is_dir() { EntryKind::Dir } else { EntryKind::File };
        Ok(Stat {
            kind,
            len: (kind == EntryKind::File).then(|| metadata.len()),
            modified: metadata.modified().ok(),
        })
    }

    fn create_file(&self, path: &Path) -> io::Result<()> {
        fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .map(drop)
    }

    fn create_dir(&self, path: &Path) -> io::Result<()> {
        fs::create_dir(path)
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }

    fn remove_dir_all(&self, path: &Path) -> io::Result<()> {
        fs::remove_dir_all(path)
    }

    fn copy_recursive(&self, src: &Path, dest: &Path) -> io::Result<()> {
        copy_entry(src, dest)
    }
}
