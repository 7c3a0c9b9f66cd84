#![forbid(unsafe_code)]

use std::io;
use std::path::{Path, PathBuf};

use time::UtcOffset;

use crate::diag::StatusLog;
use crate::error::FsError;
use crate::keymap::command_for;
use crate::model::{
    ActivePane, Clipboard, CollisionPolicy, Command, EntryKind, Pane, RefreshMode, SortMode,
};
use crate::ui::render_screen;
use crate::vfs::FileSystem;

/// The terminal side of the session: draws pre-formatted lines and supplies
/// keys, names and yes/no answers.
pub trait Console {
    fn draw(&mut self, lines: &[String]) -> io::Result<()>;
    fn read_key(&mut self) -> io::Result<char>;
    /// `None` when the user backs out of the prompt.
    fn read_line(&mut self, label: &str) -> io::Result<Option<String>>;
    fn confirm(&mut self, question: &str) -> io::Result<bool>;
    /// Rows available for entries in each panel, when the console knows.
    fn view_height(&self) -> Option<usize> {
        None
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Settings {
    pub panel_width: usize,
    pub sort_mode: SortMode,
    pub collision: CollisionPolicy,
    pub offset: UtcOffset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

#[derive(Debug, Clone, Copy)]
enum CreateKind {
    File,
    Dir,
}

#[derive(Debug)]
pub struct Session<F> {
    left: Pane,
    right: Pane,
    active: ActivePane,
    clipboard: Clipboard,
    fs: F,
    status: StatusLog,
    settings: Settings,
}

impl<F: FileSystem> Session<F> {
    pub fn new(fs: F, left_dir: PathBuf, right_dir: PathBuf, settings: Settings) -> Self {
        let mut session = Self {
            left: Pane::new(left_dir, settings.sort_mode),
            right: Pane::new(right_dir, settings.sort_mode),
            active: ActivePane::Left,
            clipboard: Clipboard::default(),
            fs,
            status: StatusLog::default(),
            settings,
        };
        session.reload();
        session
    }

    pub fn left(&self) -> &Pane {
        &self.left
    }

    pub fn right(&self) -> &Pane {
        &self.right
    }

    pub fn active(&self) -> ActivePane {
        self.active
    }

    pub fn clipboard(&self) -> &Clipboard {
        &self.clipboard
    }

    pub fn status(&self) -> &StatusLog {
        &self.status
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn active_pane(&self) -> &Pane {
        match self.active {
            ActivePane::Left => &self.left,
            ActivePane::Right => &self.right,
        }
    }

    fn active_parts(&mut self) -> (&mut Pane, &F) {
        let pane = match self.active {
            ActivePane::Left => &mut self.left,
            ActivePane::Right => &mut self.right,
        };
        (pane, &self.fs)
    }

    fn inactive_parts(&mut self) -> (&mut Pane, &F) {
        let pane = match self.active {
            ActivePane::Left => &mut self.right,
            ActivePane::Right => &mut self.left,
        };
        (pane, &self.fs)
    }

    /// Renders, reads and dispatches until the quit command.
    pub fn run(&mut self, console: &mut dyn Console) -> io::Result<()> {
        loop {
            let lines = render_screen(self, console.view_height());
            console.draw(&lines)?;
            let key = console.read_key()?;
            if self.handle_key(key, console)? == Flow::Quit {
                tracing::info!("quit");
                return Ok(());
            }
        }
    }

    /// Runs one command. Only console failures escape; filesystem failures
    /// end up in the status log.
    pub fn handle_key(&mut self, key: char, console: &mut dyn Console) -> io::Result<Flow> {
        self.status.clear();
        let Some(command) = command_for(key) else {
            self.status.notice(format!("Unknown command '{key}'"));
            return Ok(Flow::Continue);
        };
        tracing::debug!(?command, active = ?self.active, "dispatch");

        match command {
            Command::CursorUp => self.active_parts().0.cursor_up(),
            Command::CursorDown => self.active_parts().0.cursor_down(),
            Command::LeftPane => self.active = ActivePane::Left,
            Command::RightPane => self.active = ActivePane::Right,
            Command::ToggleSelect => self.active_parts().0.toggle_select(),
            Command::ClearSelection => self.active_parts().0.clear_selection(),
            Command::Mark => self.mark(),
            Command::Paste => self.paste(),
            Command::NewFile => self.create(console, CreateKind::File)?,
            Command::NewDir => self.create(console, CreateKind::Dir)?,
            Command::Delete => self.delete(console)?,
            Command::Enter => {
                let (pane, fs) = self.active_parts();
                let result = pane.enter_selected(fs);
                self.report(result);
            }
            Command::Parent => {
                let (pane, fs) = self.active_parts();
                let result = pane.go_parent(fs);
                self.report(result);
            }
            Command::Reload => self.reload(),
            Command::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    fn report<T>(&mut self, result: Result<T, FsError>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                self.status.error(&err);
                None
            }
        }
    }

    fn reload(&mut self) {
        let fs = &self.fs;
        let results = [
            self.left.refresh(fs, RefreshMode::Keep),
            self.right.refresh(fs, RefreshMode::Keep),
        ];
        for result in results {
            self.report(result);
        }
    }

    /// Keeps the other panel in step when it shows the directory just changed.
    fn refresh_inactive_if_showing(&mut self, dir: &Path) {
        let (pane, fs) = self.inactive_parts();
        if pane.cwd == dir {
            let result = pane.refresh(fs, RefreshMode::Keep);
            self.report(result);
        }
    }

    fn mark(&mut self) {
        let paths: Vec<PathBuf> = self.active_pane().selected.iter().cloned().collect();
        if paths.is_empty() {
            self.status.notice("Nothing selected (select entries with m first)");
            return;
        }
        let added = self.clipboard.mark(paths);
        self.status.notice(format!(
            "{added} item(s) added, {} on clipboard",
            self.clipboard.len()
        ));
    }

    fn paste(&mut self) {
        if self.clipboard.is_empty() {
            self.status.notice("Clipboard is empty");
            return;
        }
        let total = self.clipboard.len();
        let dest = self.active_pane().cwd.clone();
        let report = self
            .clipboard
            .paste_into(&self.fs, &dest, self.settings.collision);
        for failure in &report.failures {
            self.status.error(failure);
        }
        self.status.notice(format!(
            "Pasted {} of {total} item(s) into {}",
            report.copied.len(),
            dest.display()
        ));

        let (pane, fs) = self.active_parts();
        let result = pane.refresh(fs, RefreshMode::Keep);
        self.report(result);
        self.refresh_inactive_if_showing(&dest);
    }

    fn create(&mut self, console: &mut dyn Console, kind: CreateKind) -> io::Result<()> {
        let label = match kind {
            CreateKind::File => "New file name: ",
            CreateKind::Dir => "New directory name: ",
        };
        let Some(name) = console.read_line(label)? else {
            self.status.notice("Cancelled");
            return Ok(());
        };
        let (pane, fs) = self.active_parts();
        let result = match kind {
            CreateKind::File => pane.create_file(fs, &name),
            CreateKind::Dir => pane.create_dir(fs, &name),
        };
        if let Some(path) = self.report(result) {
            self.status.notice(format!("Created {}", path.display()));
            let dir = self.active_pane().cwd.clone();
            self.refresh_inactive_if_showing(&dir);
        }
        Ok(())
    }

    fn delete(&mut self, console: &mut dyn Console) -> io::Result<()> {
        let Some(pending) = self.active_pane().request_delete() else {
            self.status.notice("Nothing to delete");
            return Ok(());
        };
        let question = match pending.kind {
            EntryKind::Dir => format!("Delete directory \"{}\" and all its contents? (y/n)", pending.name),
            EntryKind::File => format!("Delete \"{}\"? (y/n)", pending.name),
        };
        if !console.confirm(&question)? {
            self.status.notice("Delete cancelled");
            return Ok(());
        }

        let (pane, fs) = self.active_parts();
        let result = pane.execute_delete(fs, &pending);
        if self.report(result).is_some() {
            self.status.notice(format!("Deleted {}", pending.name));
        }
        let dir = self.active_pane().cwd.clone();
        self.refresh_inactive_if_showing(&dir);
        Ok(())
    }
}
