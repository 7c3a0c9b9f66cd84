#![forbid(unsafe_code)]

use std::cmp::Ordering;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};

use crate::error::FsError;
use crate::model::{Entry, EntryKind, SortMode};
use crate::vfs::FileSystem;

pub const NOT_AVAILABLE: &str = "N/A";

/// Lists `dir` through `fs`. Only the listing itself can fail; a broken stat
/// on one child degrades that child's fields.
pub fn read_entries(
    fs: &dyn FileSystem,
    dir: &Path,
    sort_mode: SortMode,
) -> Result<Vec<Entry>, FsError> {
    let paths = fs.list_dir(dir).map_err(|source| FsError::Enumeration {
        path: dir.to_path_buf(),
        source,
    })?;
    let mut entries = Vec::with_capacity(paths.len());
    for path in paths {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let entry = match fs.stat(&path) {
            Ok(stat) => Entry {
                name,
                kind: stat.kind,
                size: stat.len,
                modified: stat.modified,
                path,
            },
            Err(source) => {
                let err = FsError::Metadata { path: path.clone(), source };
                tracing::debug!(%err, "metadata unavailable");
                Entry {
                    name,
                    path,
                    kind: EntryKind::File,
                    size: None,
                    modified: None,
                }
            }
        };
        entries.push(entry);
    }

    if sort_mode == SortMode::Name {
        entries.sort_by(|a, b| match (a.is_dir(), b.is_dir()) {
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            _ => cmp_name(a, b),
        });
    }
    Ok(entries)
}

pub fn cmp_name(a: &Entry, b: &Entry) -> Ordering {
    a.name.to_lowercase().cmp(&b.name.to_lowercase())
}

pub fn sort_label(mode: SortMode) -> &'static str {
    match mode {
        SortMode::Unsorted => "Unsorted",
        SortMode::Name => "Name",
    }
}

/// "DIR" for directories, "<n> B" for files, "N/A" when the size is unknown.
pub fn size_label(entry: &Entry) -> String {
    match (entry.kind, entry.size) {
        (EntryKind::Dir, _) => "DIR".to_string(),
        (EntryKind::File, Some(size)) => format!("{size} B"),
        (EntryKind::File, None) => NOT_AVAILABLE.to_string(),
    }
}

/// Local wall-clock time at minute resolution.
pub fn format_time(time: Option<SystemTime>, offset: UtcOffset) -> String {
    let Some(time) = time else {
        return NOT_AVAILABLE.to_string();
    };
    let fmt = format_description!("[year]-[month]-[day] [hour]:[minute]");
    OffsetDateTime::from(time)
        .to_offset(offset)
        .format(&fmt)
        .unwrap_or_else(|_| NOT_AVAILABLE.to_string())
}

/// Resolves a user-typed name to a child of `dir`.
pub fn child_path(dir: &Path, name: &str) -> Result<PathBuf, FsError> {
    let name = name.trim();
    let invalid = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains('/')
        || name.contains(std::path::MAIN_SEPARATOR);
    if invalid {
        return Err(FsError::InvalidName { name: name.to_string() });
    }
    Ok(dir.join(name))
}

/// Copies `src` to `dest`. Symbolic links are recreated, never followed.
pub fn copy_entry(src: &Path, dest: &Path) -> io::Result<()> {
    copy_by_type(src, dest, fs::symlink_metadata(src)?.file_type())
}

fn copy_by_type(src: &Path, dest: &Path, file_type: fs::FileType) -> io::Result<()> {
    if file_type.is_symlink() {
        copy_symlink(src, dest)
    } else if file_type.is_dir() {
        copy_dir_recursive(src, dest)
    } else {
        fs::copy(src, dest)?;
        Ok(())
    }
}

pub fn copy_dir_recursive(src: &Path, dest: &Path) -> io::Result<()> {
    if !dest.exists() {
        fs::create_dir_all(dest)?;
    }
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let target = dest.join(entry.file_name());
        copy_by_type(&entry.path(), &target, entry.file_type()?)?;
    }
    Ok(())
}

#[cfg(unix)]
fn copy_symlink(src: &Path, dest: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(fs::read_link(src)?, dest)
}

#[cfg(not(unix))]
fn copy_symlink(src: &Path, _dest: &Path) -> io::Result<()> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        format!("cannot copy symbolic link {}", src.display()),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vfs::memory::MemoryFs;
    use std::time::Duration;
    use tempfile::TempDir;

    fn entry(name: &str, kind: EntryKind, size: Option<u64>) -> Entry {
        Entry {
            name: name.to_string(),
            path: PathBuf::from("/x").join(name),
            kind,
            size,
            modified: None,
        }
    }

    #[test]
    fn size_labels() {
        assert_eq!(size_label(&entry("b", EntryKind::Dir, None)), "DIR");
        assert_eq!(size_label(&entry("y.txt", EntryKind::File, Some(0))), "0 B");
        assert_eq!(size_label(&entry("x.txt", EntryKind::File, Some(10))), "10 B");
        assert_eq!(size_label(&entry("gone", EntryKind::File, None)), "N/A");
    }

    #[test]
    fn time_is_truncated_to_minutes() {
        let t = SystemTime::UNIX_EPOCH + Duration::from_secs(86_400 + 3_600 + 125);
        assert_eq!(format_time(Some(t), UtcOffset::UTC), "1970-01-02 01:02");
        assert_eq!(format_time(None, UtcOffset::UTC), "N/A");
    }

    #[test]
    fn time_uses_given_offset() {
        let t = SystemTime::UNIX_EPOCH;
        let offset = UtcOffset::from_hms(2, 0, 0).unwrap();
        assert_eq!(format_time(Some(t), offset), "1970-01-01 02:00");
    }

    #[test]
    fn child_path_rejects_bad_names() {
        let dir = Path::new("/tmp/a");
        assert_eq!(child_path(dir, " new.txt ").unwrap(), dir.join("new.txt"));
        for bad in ["", "  ", ".", "..", "x/y"] {
            assert!(matches!(child_path(dir, bad), Err(FsError::InvalidName { .. })));
        }
    }

    #[test]
    fn broken_stat_degrades_one_entry() {
        let fs = MemoryFs::new();
        fs.file("/a/ok.txt", b"hello").file("/a/bad.txt", b"zz");
        fs.break_stat("/a/bad.txt");
        let entries = read_entries(&fs, Path::new("/a"), SortMode::Unsorted).unwrap();
        assert_eq!(entries.len(), 2);
        let bad = entries.iter().find(|e| e.name == "bad.txt").unwrap();
        assert_eq!(bad.size, None);
        assert_eq!(bad.modified, None);
        let ok = entries.iter().find(|e| e.name == "ok.txt").unwrap();
        assert_eq!(ok.size, Some(5));
    }

    #[test]
    fn listing_failure_is_enumeration_error() {
        let fs = MemoryFs::new();
        fs.dir("/locked");
        fs.make_unreadable("/locked");
        let err = read_entries(&fs, Path::new("/locked"), SortMode::Unsorted).unwrap_err();
        assert!(matches!(err, FsError::Enumeration { .. }));
    }

    #[test]
    fn name_sort_puts_dirs_first() {
        let fs = MemoryFs::new();
        fs.file("/a/B.txt", b"").file("/a/a.txt", b"").dir("/a/zdir");
        let names: Vec<String> = read_entries(&fs, Path::new("/a"), SortMode::Name)
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, ["zdir", "a.txt", "B.txt"]);
    }

    #[test]
    fn copy_dir_recursive_keeps_structure() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("src");
        fs::create_dir_all(src.join("inner")).unwrap();
        fs::write(src.join("top.txt"), b"top").unwrap();
        fs::write(src.join("inner/deep.txt"), b"deep").unwrap();

        let dest = tmp.path().join("dest");
        copy_entry(&src, &dest).unwrap();
        assert_eq!(fs::read(dest.join("top.txt")).unwrap(), b"top");
        assert_eq!(fs::read(dest.join("inner/deep.txt")).unwrap(), b"deep");
    }

    #[cfg(unix)]
    #[test]
    fn symlink_cycle_is_copied_as_a_link() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("src");
        fs::create_dir_all(&src).unwrap();
        fs::write(src.join("f.txt"), b"f").unwrap();
        std::os::unix::fs::symlink(".", src.join("loop")).unwrap();

        let dest = tmp.path().join("dest");
        copy_entry(&src, &dest).unwrap();
        assert_eq!(fs::read(dest.join("f.txt")).unwrap(), b"f");
        let link = dest.join("loop");
        assert!(fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
        assert_eq!(fs::read_link(&link).unwrap(), Path::new("."));
        assert_eq!(fs::read_dir(&dest).unwrap().count(), 2);
    }
}
