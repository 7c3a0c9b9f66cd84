#![forbid(unsafe_code)]

use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Dir,
}

/// One child of a listed directory. Replaced, never edited, on refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub name: String,
    pub path: PathBuf,
    pub kind: EntryKind,
    /// Byte count for files; `None` for directories or when stat failed.
    pub size: Option<u64>,
    pub modified: Option<SystemTime>,
}

impl Entry {
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Dir
    }
}

/// Point-in-time listing of one directory's direct children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub dir: PathBuf,
    pub entries: Vec<Entry>,
}

impl Snapshot {
    pub fn empty(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
            entries: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[cfg(test)]
    pub fn get(&self, name: &str) -> Option<&Entry> {
        self.entries.iter().find(|e| e.name == name)
    }
}

/// What `stat` reports for a path. `None` fields degrade to "N/A".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stat {
    pub kind: EntryKind,
    pub len: Option<u64>,
    pub modified: Option<SystemTime>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivePane {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    /// Order of the directory listing API.
    #[default]
    Unsorted,
    /// Directories first, then case-insensitive name.
    Name,
}

/// What paste does when the target name already exists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollisionPolicy {
    #[default]
    Fail,
    Overwrite,
}

#[derive(Debug, Clone, Copy)]
pub enum RefreshMode {
    Reset,
    Keep,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    CursorUp,
    CursorDown,
    LeftPane,
    RightPane,
    ToggleSelect,
    ClearSelection,
    Mark,
    Paste,
    NewFile,
    NewDir,
    Delete,
    Enter,
    Parent,
    Reload,
    Quit,
}

#[derive(Debug, Clone, Copy)]
pub struct KeyBinding {
    pub key: char,
    pub label: &'static str,
    pub command: Command,
}

/// Delete target captured before asking the user; executing it is separate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingDelete {
    pub path: PathBuf,
    pub name: String,
    pub kind: EntryKind,
}

#[derive(Debug)]
pub struct Pane {
    pub cwd: PathBuf,
    pub snapshot: Snapshot,
    pub cursor: usize,
    pub selected: HashSet<PathBuf>,
    pub sort_mode: SortMode,
}

impl Pane {
    pub fn new(cwd: PathBuf, sort_mode: SortMode) -> Self {
        Self {
            snapshot: Snapshot::empty(&cwd),
            cwd,
            cursor: 0,
            selected: HashSet::new(),
            sort_mode,
        }
    }
}

/// Paths marked for transfer, shared by both panes.
#[derive(Debug, Default)]
pub struct Clipboard {
    pub paths: BTreeSet<PathBuf>,
}
