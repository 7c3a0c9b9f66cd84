#![forbid(unsafe_code)]

use std::io;
use std::path::{Path, PathBuf};

use crate::error::FsError;
use crate::model::{Clipboard, CollisionPolicy, EntryKind};
use crate::vfs::FileSystem;

/// Outcome of one paste, itemized.
#[derive(Debug, Default)]
pub struct PasteReport {
    pub copied: Vec<PathBuf>,
    pub failures: Vec<FsError>,
}

impl Clipboard {
    /// Adds `paths` to the clipboard. Returns how many were new.
    pub fn mark<I>(&mut self, paths: I) -> usize
    where
        I: IntoIterator<Item = PathBuf>,
    {
        let before = self.paths.len();
        self.paths.extend(paths);
        self.paths.len() - before
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Copies every held path into `dest_dir` under its own base name, then
    /// empties the clipboard whatever happened. Failed items are not kept.
    pub fn paste_into(
        &mut self,
        fs: &dyn FileSystem,
        dest_dir: &Path,
        policy: CollisionPolicy,
    ) -> PasteReport {
        let mut report = PasteReport::default();
        for src in std::mem::take(&mut self.paths) {
            let Some(name) = src.file_name() else {
                report.failures.push(copy_failure(
                    &src,
                    dest_dir,
                    io::Error::new(io::ErrorKind::InvalidInput, "source has no file name"),
                ));
                continue;
            };
            let dest = dest_dir.join(name);
            match paste_one(fs, &src, &dest, policy) {
                Ok(()) => report.copied.push(dest),
                Err(source) => report.failures.push(copy_failure(&src, &dest, source)),
            }
        }
        report
    }
}

fn paste_one(
    fs: &dyn FileSystem,
    src: &Path,
    dest: &Path,
    policy: CollisionPolicy,
) -> io::Result<()> {
    let src_stat = fs.stat(src)?;
    if src_stat.kind == EntryKind::Dir && dest.starts_with(src) {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "cannot copy a directory into itself",
        ));
    }
    // Target is the source itself or one of its ancestors.
    if src.starts_with(dest) {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "destination is the source or contains it",
        ));
    }
    if let Ok(existing) = fs.stat(dest) {
        match policy {
            CollisionPolicy::Fail => {
                return Err(io::Error::new(
                    io::ErrorKind::AlreadyExists,
                    "destination already exists",
                ));
            }
            CollisionPolicy::Overwrite => match existing.kind {
                EntryKind::Dir => fs.remove_dir_all(dest)?,
                EntryKind::File => fs.remove_file(dest)?,
            },
        }
    }
    fs.copy_recursive(src, dest)
}

fn copy_failure(src: &Path, dest: &Path, source: io::Error) -> FsError {
    FsError::CopyItem {
        src: src.to_path_buf(),
        dest: dest.to_path_buf(),
        source,
    }
}
