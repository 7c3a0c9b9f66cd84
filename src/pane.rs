#![forbid(unsafe_code)]

use std::path::PathBuf;

use crate::error::FsError;
use crate::fs_ops::{child_path, read_entries};
use crate::model::{Entry, EntryKind, Pane, PendingDelete, RefreshMode, Snapshot};
use crate::vfs::FileSystem;

impl Pane {
    /// Rebuilds the snapshot of `cwd`.
    ///
    /// On a listing failure the pane still ends up consistent (empty
    /// snapshot, cursor 0, same `cwd`) and the failure is handed back for
    /// reporting. The selection is never pruned here.
    pub fn refresh(&mut self, fs: &dyn FileSystem, mode: RefreshMode) -> Result<(), FsError> {
        let result = match read_entries(fs, &self.cwd, self.sort_mode) {
            Ok(entries) => {
                self.snapshot = Snapshot {
                    dir: self.cwd.clone(),
                    entries,
                };
                Ok(())
            }
            Err(err) => {
                self.snapshot = Snapshot::empty(&self.cwd);
                Err(err)
            }
        };

        self.cursor = match mode {
            RefreshMode::Reset => 0,
            RefreshMode::Keep => self.cursor.min(self.snapshot.len().saturating_sub(1)),
        };
        result
    }

    pub fn selected_entry(&self) -> Option<&Entry> {
        self.snapshot.entries.get(self.cursor)
    }

    pub fn move_cursor(&mut self, delta: isize) {
        if self.snapshot.is_empty() {
            self.cursor = 0;
            return;
        }
        let last = self.snapshot.len() - 1;
        self.cursor = self.cursor.saturating_add_signed(delta).min(last);
    }

    pub fn cursor_up(&mut self) {
        self.move_cursor(-1);
    }

    pub fn cursor_down(&mut self) {
        self.move_cursor(1);
    }

    /// Descends into the directory under the cursor. Returns whether the pane
    /// moved.
    pub fn enter_selected(&mut self, fs: &dyn FileSystem) -> Result<bool, FsError> {
        let Some(entry) = self.selected_entry() else {
            return Ok(false);
        };
        if !entry.is_dir() {
            return Ok(false);
        }
        let target = entry.path.clone();
        self.change_dir(fs, target)?;
        Ok(true)
    }

    /// Moves to the parent directory; a no-op where no parent exists.
    pub fn go_parent(&mut self, fs: &dyn FileSystem) -> Result<bool, FsError> {
        let Some(parent) = self.cwd.parent() else {
            return Ok(false);
        };
        let parent = parent.to_path_buf();
        self.change_dir(fs, parent)?;
        Ok(true)
    }

    fn change_dir(&mut self, fs: &dyn FileSystem, dir: PathBuf) -> Result<(), FsError> {
        self.cwd = dir;
        self.clear_selection();
        self.refresh(fs, RefreshMode::Reset)
    }

    pub fn toggle_select(&mut self) {
        let Some(entry) = self.selected_entry() else { return };
        let path = entry.path.clone();
        if !self.selected.remove(&path) {
            self.selected.insert(path);
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected.clear();
    }

    pub fn create_file(&mut self, fs: &dyn FileSystem, name: &str) -> Result<PathBuf, FsError> {
        let path = child_path(&self.cwd, name)?;
        fs.create_file(&path)
            .map_err(|source| FsError::create(path.clone(), source))?;
        self.refresh(fs, RefreshMode::Keep)?;
        Ok(path)
    }

    pub fn create_dir(&mut self, fs: &dyn FileSystem, name: &str) -> Result<PathBuf, FsError> {
        let path = child_path(&self.cwd, name)?;
        fs.create_dir(&path)
            .map_err(|source| FsError::create(path.clone(), source))?;
        self.refresh(fs, RefreshMode::Keep)?;
        Ok(path)
    }

    /// Captures what a delete at the cursor would remove. Touches nothing.
    pub fn request_delete(&self) -> Option<PendingDelete> {
        let entry = self.selected_entry()?;
        Some(PendingDelete {
            path: entry.path.clone(),
            name: entry.name.clone(),
            kind: entry.kind,
        })
    }

    /// Removes the pending target (directories recursively) and refreshes,
    /// even on failure, since a recursive delete may stop halfway.
    pub fn execute_delete(
        &mut self,
        fs: &dyn FileSystem,
        pending: &PendingDelete,
    ) -> Result<(), FsError> {
        let removed = match pending.kind {
            EntryKind::Dir => fs.remove_dir_all(&pending.path),
            EntryKind::File => fs.remove_file(&pending.path),
        };
        let refreshed = self.refresh(fs, RefreshMode::Keep);
        removed.map_err(|source| FsError::Delete {
            path: pending.path.clone(),
            source,
        })?;
        refreshed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SortMode;
    use crate::vfs::memory::MemoryFs;
    use std::path::Path;

    fn sample_fs() -> MemoryFs {
        let fs = MemoryFs::new();
        fs.file("/tmp/a/x.txt", b"0123456789")
            .file("/tmp/a/y.txt", b"")
            .dir("/tmp/a/b")
            .file("/tmp/a/b/inner.txt", b"inner");
        fs
    }

    fn open(fs: &MemoryFs, dir: &str) -> Pane {
        let mut pane = Pane::new(PathBuf::from(dir), SortMode::Name);
        pane.refresh(fs, RefreshMode::Reset).unwrap();
        pane
    }

    fn cursor_to(pane: &mut Pane, name: &str) {
        pane.cursor = pane
            .snapshot
            .entries
            .iter()
            .position(|e| e.name == name)
            .unwrap();
    }

    #[test]
    fn refresh_lists_direct_children() {
        let fs = sample_fs();
        let pane = open(&fs, "/tmp/a");
        assert_eq!(pane.snapshot.len(), 3);
        assert_eq!(pane.snapshot.get("y.txt").unwrap().size, Some(0));
        assert_eq!(pane.snapshot.get("x.txt").unwrap().size, Some(10));
        assert!(pane.snapshot.get("b").unwrap().is_dir());
        assert!(pane.snapshot.get("inner.txt").is_none());
    }

    #[test]
    fn cursor_moves_are_clamped() {
        let fs = sample_fs();
        let mut pane = open(&fs, "/tmp/a");
        pane.cursor_up();
        assert_eq!(pane.cursor, 0);
        for _ in 0..10 {
            pane.cursor_down();
        }
        assert_eq!(pane.cursor, 2);
    }

    #[test]
    fn cursor_on_empty_snapshot_stays_zero() {
        let fs = MemoryFs::new();
        fs.dir("/empty");
        let mut pane = open(&fs, "/empty");
        pane.cursor_down();
        pane.cursor_up();
        assert_eq!(pane.cursor, 0);
        assert!(pane.selected_entry().is_none());
        pane.toggle_select();
        assert!(pane.selected.is_empty());
    }

    #[test]
    fn refresh_clamps_cursor_after_shrink() {
        let fs = sample_fs();
        let mut pane = open(&fs, "/tmp/a");
        pane.cursor = 2;
        fs.remove("/tmp/a/x.txt");
        fs.remove("/tmp/a/y.txt");
        pane.refresh(&fs, RefreshMode::Keep).unwrap();
        assert_eq!(pane.snapshot.len(), 1);
        assert_eq!(pane.cursor, 0);
    }

    #[test]
    fn toggle_twice_restores_selection() {
        let fs = sample_fs();
        let mut pane = open(&fs, "/tmp/a");
        cursor_to(&mut pane, "y.txt");
        pane.toggle_select();
        assert!(pane.selected.contains(Path::new("/tmp/a/y.txt")));
        let before = pane.selected.clone();
        pane.cursor_down();
        pane.toggle_select();
        pane.toggle_select();
        assert_eq!(pane.selected, before);
    }

    #[test]
    fn enter_then_parent_round_trips() {
        let fs = sample_fs();
        let mut pane = open(&fs, "/tmp/a");
        cursor_to(&mut pane, "b");
        pane.toggle_select();

        assert!(pane.enter_selected(&fs).unwrap());
        assert_eq!(pane.cwd, Path::new("/tmp/a/b"));
        assert_eq!(pane.cursor, 0);
        assert!(pane.selected.is_empty());

        assert!(pane.go_parent(&fs).unwrap());
        assert_eq!(pane.cwd, Path::new("/tmp/a"));
        assert_eq!(pane.cursor, 0);
        assert!(pane.selected.is_empty());
    }

    #[test]
    fn enter_on_file_is_noop() {
        let fs = sample_fs();
        let mut pane = open(&fs, "/tmp/a");
        cursor_to(&mut pane, "x.txt");
        pane.toggle_select();
        assert!(!pane.enter_selected(&fs).unwrap());
        assert_eq!(pane.cwd, Path::new("/tmp/a"));
        assert_eq!(pane.selected.len(), 1);
    }

    #[test]
    fn parent_at_root_is_noop() {
        let fs = sample_fs();
        let mut pane = open(&fs, "/");
        assert!(!pane.go_parent(&fs).unwrap());
        assert_eq!(pane.cwd, Path::new("/"));
    }

    #[test]
    fn unreadable_directory_leaves_pane_navigable() {
        let fs = sample_fs();
        fs.make_unreadable("/tmp/a/b");
        let mut pane = open(&fs, "/tmp/a");
        cursor_to(&mut pane, "b");

        let err = pane.enter_selected(&fs).unwrap_err();
        assert!(matches!(err, FsError::Enumeration { .. }));
        assert_eq!(pane.cwd, Path::new("/tmp/a/b"));
        assert_eq!(pane.snapshot.dir, Path::new("/tmp/a/b"));
        assert!(pane.snapshot.is_empty());
        assert_eq!(pane.cursor, 0);

        assert!(pane.go_parent(&fs).unwrap());
        assert_eq!(pane.snapshot.len(), 3);
    }

    #[test]
    fn create_file_refreshes_and_keeps_cursor_index() {
        let fs = sample_fs();
        let mut pane = open(&fs, "/tmp/a");
        pane.cursor = 2;
        let path = pane.create_file(&fs, "new.txt").unwrap();
        assert_eq!(path, Path::new("/tmp/a/new.txt"));
        assert_eq!(pane.snapshot.len(), 4);
        assert_eq!(pane.cursor, 2);
        assert_eq!(fs.content("/tmp/a/new.txt").unwrap(), b"");
    }

    #[test]
    fn create_file_does_not_truncate_existing() {
        let fs = sample_fs();
        let mut pane = open(&fs, "/tmp/a");
        let err = pane.create_file(&fs, "x.txt").unwrap_err();
        assert!(matches!(err, FsError::CreateCollision { .. }));
        assert_eq!(fs.content("/tmp/a/x.txt").unwrap(), b"0123456789");
    }

    #[test]
    fn create_dir_collision_keeps_snapshot() {
        let fs = sample_fs();
        let mut pane = open(&fs, "/tmp/a");
        let before = pane.snapshot.clone();
        let err = pane.create_dir(&fs, "b").unwrap_err();
        assert!(matches!(err, FsError::CreateCollision { .. }));
        assert_eq!(pane.snapshot, before);
    }

    #[test]
    fn create_in_locked_dir_is_io_failure() {
        let fs = sample_fs();
        fs.lock("/tmp/a");
        let mut pane = open(&fs, "/tmp/a");
        let err = pane.create_dir(&fs, "fresh").unwrap_err();
        assert!(matches!(err, FsError::CreateIo { .. }));
    }

    #[test]
    fn request_delete_is_pure() {
        let fs = sample_fs();
        let mut pane = open(&fs, "/tmp/a");
        cursor_to(&mut pane, "b");
        let pending = pane.request_delete().unwrap();
        assert_eq!(pending.kind, EntryKind::Dir);
        assert_eq!(pending.name, "b");
        assert!(fs.exists("/tmp/a/b/inner.txt"));
        assert_eq!(pane.snapshot.len(), 3);
    }

    #[test]
    fn delete_directory_is_recursive() {
        let fs = sample_fs();
        let mut pane = open(&fs, "/tmp/a");
        cursor_to(&mut pane, "b");
        let pending = pane.request_delete().unwrap();
        pane.execute_delete(&fs, &pending).unwrap();
        assert!(!fs.exists("/tmp/a/b"));
        assert!(!fs.exists("/tmp/a/b/inner.txt"));
        assert_eq!(pane.snapshot.len(), 2);
    }

    #[test]
    fn deleting_only_entry_empties_snapshot() {
        let fs = MemoryFs::new();
        fs.file("/solo/only.txt", b"1");
        let mut pane = open(&fs, "/solo");
        let pending = pane.request_delete().unwrap();
        pane.execute_delete(&fs, &pending).unwrap();
        assert!(pane.snapshot.is_empty());
        assert_eq!(pane.cursor, 0);
        assert!(pane.request_delete().is_none());
    }

    #[test]
    fn delete_keeps_stale_selection() {
        let fs = sample_fs();
        let mut pane = open(&fs, "/tmp/a");
        cursor_to(&mut pane, "x.txt");
        pane.toggle_select();
        let pending = pane.request_delete().unwrap();
        pane.execute_delete(&fs, &pending).unwrap();
        assert!(pane.selected.contains(Path::new("/tmp/a/x.txt")));
    }

    #[test]
    fn failed_delete_is_reported() {
        let fs = sample_fs();
        fs.lock("/tmp/a/x.txt");
        let mut pane = open(&fs, "/tmp/a");
        cursor_to(&mut pane, "x.txt");
        let pending = pane.request_delete().unwrap();
        let err = pane.execute_delete(&fs, &pending).unwrap_err();
        assert!(matches!(err, FsError::Delete { .. }));
        assert_eq!(pane.snapshot.len(), 3);
    }
}
